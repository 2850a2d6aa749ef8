pub mod access;
pub mod blog;
pub mod comment;
pub mod contact;
pub mod diary;
pub mod error;
pub mod gallery;
pub mod identity;
pub mod iter_util;
pub mod user;

use identity::Identity;

use entrait::entrait_export as entrait;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UserId<T = uuid::Uuid>(pub T);

impl UserId<uuid::Uuid> {
    pub fn into_id(self) -> uuid::Uuid {
        self.0
    }

    pub fn some(self) -> UserId<Option<uuid::Uuid>> {
        UserId(Some(self.0))
    }
}

///
/// Mockable system abstraction
///
#[entrait(mock_api=SystemMock)]
pub trait System {
    fn get_current_time(&self) -> time::OffsetDateTime;
}

///
/// Mockable config accessor
///
#[entrait(mock_api=GetConfigMock)]
pub trait GetConfig {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384>;

    /// The identity configured as site owner, which overrides visibility on
    /// diary entries and guards the mailbox and gallery administration.
    fn get_site_owner(&self) -> &Identity;
}

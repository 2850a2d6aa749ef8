use entrait::entrait_export as entrait;

use super::password::PasswordHash;
use crate::error::PfResult;
use crate::identity::Identity;
use crate::UserId;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credentials {
    pub email: Identity,
    pub password_hash: PasswordHash,
}

#[derive(Clone, Default)]
pub struct UserUpdate<'a> {
    pub email: Option<&'a Identity>,
    pub username: Option<&'a str>,
    pub password_hash: Option<PasswordHash>,
    pub image: Option<&'a str>,
}

#[entrait(UserRepoImpl, delegate_by = DelegateUserRepo, mock_api=UserRepoMock)]
pub trait UserRepo {
    async fn insert_user(
        &self,
        username: &str,
        email: &Identity,
        password_hash: PasswordHash,
    ) -> PfResult<(User, Credentials)>;

    async fn find_user_credentials_by_id(
        &self,
        user_id: UserId,
    ) -> PfResult<Option<(User, Credentials)>>;

    async fn find_user_credentials_by_email(
        &self,
        email: &Identity,
    ) -> PfResult<Option<(User, Credentials)>>;

    async fn update_user(
        &self,
        current_user_id: UserId,
        update: UserUpdate<'_>,
    ) -> PfResult<(User, Credentials)>;
}

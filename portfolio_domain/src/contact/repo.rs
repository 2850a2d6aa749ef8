use crate::error::PfResult;
use crate::identity::Identity;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Message {
    pub message_id: i64,
    pub name: String,
    pub email: Identity,
    pub subject: String,
    pub message: String,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

#[entrait(ContactRepoImpl, delegate_by = DelegateContactRepo, mock_api=ContactRepoMock)]
pub trait ContactRepo {
    async fn insert_message(
        &self,
        name: &str,
        email: &Identity,
        subject: &str,
        message: &str,
    ) -> PfResult<Message>;

    /// All messages, newest first.
    async fn select_messages(&self) -> PfResult<Vec<Message>>;

    /// Returns `None` when there is no such message.
    async fn set_message_read(&self, message_id: i64, read: bool) -> PfResult<Option<Message>>;

    /// Returns whether a message was deleted.
    async fn remove_message(&self, message_id: i64) -> PfResult<bool>;
}

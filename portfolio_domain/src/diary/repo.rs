use crate::access::{Owned, Visibility};
use crate::error::PfResult;
use crate::identity::Identity;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Entry {
    pub entry_id: i64,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub is_public: bool,
    pub owner: Identity,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Owned for Entry {
    fn owner(&self) -> &Identity {
        &self.owner
    }

    fn visibility(&self) -> Visibility {
        if self.is_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

#[derive(Default)]
pub struct EntryUpdate<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub mood: Option<&'a str>,
    pub is_public: Option<bool>,
}

#[entrait(DiaryRepoImpl, delegate_by = DelegateDiaryRepo, mock_api=DiaryRepoMock)]
pub trait DiaryRepo {
    /// All entries, newest first.
    async fn select_entries(&self) -> PfResult<Vec<Entry>>;

    async fn find_entry(&self, entry_id: i64) -> PfResult<Option<Entry>>;

    async fn insert_entry(
        &self,
        owner: &Identity,
        title: &str,
        content: &str,
        mood: Option<&str>,
        is_public: bool,
    ) -> PfResult<Entry>;

    async fn patch_entry(&self, entry_id: i64, update: EntryUpdate<'_>) -> PfResult<Entry>;

    async fn remove_entry(&self, entry_id: i64) -> PfResult<()>;
}

pub mod repo;

use crate::access::can_access;
use crate::error::*;
use crate::identity::Identity;
use crate::user::auth::*;
use crate::GetConfig;
use repo::DiaryRepo;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub is_public: bool,
    pub owner: Identity,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<repo::Entry> for DiaryEntry {
    fn from(entry: repo::Entry) -> Self {
        Self {
            id: entry.entry_id,
            title: entry.title,
            content: entry.content,
            mood: entry.mood,
            is_public: entry.is_public,
            owner: entry.owner,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EntryCreate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EntryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub is_public: Option<bool>,
}

#[entrait(pub DiaryApi, mock_api=DiaryApiMock)]
pub mod api {
    use super::*;

    pub async fn list_entries(
        deps: &(impl Authenticate + GetConfig + DiaryRepo),
        token: Option<Token>,
    ) -> PfResult<Vec<DiaryEntry>> {
        let session = deps.opt_authenticate(token)?;
        let requester = Session::identity(session.as_ref());
        let site_owner = Some(deps.get_site_owner());

        Ok(deps
            .select_entries()
            .await?
            .into_iter()
            .filter(|entry| can_access(entry, requester, site_owner).can_read)
            .map(Into::into)
            .collect())
    }

    pub async fn fetch_entry(
        deps: &(impl Authenticate + GetConfig + DiaryRepo),
        token: Option<Token>,
        entry_id: i64,
    ) -> PfResult<DiaryEntry> {
        let session = deps.opt_authenticate(token)?;
        let requester = Session::identity(session.as_ref());
        let entry = deps
            .find_entry(entry_id)
            .await?
            .ok_or(PfError::DiaryEntryNotFound)?;

        can_access(&entry, requester, Some(deps.get_site_owner())).read_or_deny(requester)?;
        Ok(entry.into())
    }

    pub async fn create_entry(
        deps: &(impl Authenticate + DiaryRepo),
        token: Token,
        entry: EntryCreate,
    ) -> PfResult<DiaryEntry> {
        let session = deps.authenticate(token)?;
        let title = entry.title.trim();
        if title.is_empty() {
            return Err(PfError::unprocessable_entity([("title", "can't be blank")]));
        }

        let inserted = deps
            .insert_entry(
                &session.identity,
                title,
                &entry.content,
                entry.mood.as_deref(),
                entry.is_public,
            )
            .await?;

        tracing::info!(entry_id = inserted.entry_id, "created diary entry");
        Ok(inserted.into())
    }

    pub async fn update_entry(
        deps: &(impl Authenticate + GetConfig + DiaryRepo),
        token: Token,
        entry_id: i64,
        entry_update: EntryUpdate,
    ) -> PfResult<DiaryEntry> {
        let session = deps.authenticate(token)?;
        let title = entry_update.title.as_deref().map(str::trim);
        if title == Some("") {
            return Err(PfError::unprocessable_entity([("title", "can't be blank")]));
        }
        writable_entry(deps, &session, entry_id).await?;

        deps.patch_entry(
            entry_id,
            repo::EntryUpdate {
                title,
                content: entry_update.content.as_deref(),
                mood: entry_update.mood.as_deref(),
                is_public: entry_update.is_public,
            },
        )
        .await
        .map(Into::into)
    }

    pub async fn delete_entry(
        deps: &(impl Authenticate + GetConfig + DiaryRepo),
        token: Token,
        entry_id: i64,
    ) -> PfResult<()> {
        let session = deps.authenticate(token)?;
        writable_entry(deps, &session, entry_id).await?;
        deps.remove_entry(entry_id).await?;

        tracing::info!(entry_id, "deleted diary entry");
        Ok(())
    }

    async fn writable_entry(
        deps: &(impl GetConfig + DiaryRepo),
        session: &Session,
        entry_id: i64,
    ) -> PfResult<repo::Entry> {
        let entry = deps
            .find_entry(entry_id)
            .await?
            .ok_or(PfError::DiaryEntryNotFound)?;
        let requester = Some(&session.identity);

        can_access(&entry, requester, Some(deps.get_site_owner())).write_or_deny(requester)?;
        Ok(entry)
    }
}

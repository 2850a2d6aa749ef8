use crate::GetDb;

use portfolio_domain::diary::repo::*;
use portfolio_domain::error::{PfError, PfResult};
use portfolio_domain::identity::Identity;

use entrait::*;
use futures::TryStreamExt;
use time::OffsetDateTime;

pub struct PgDiaryRepo;

#[derive(sqlx::FromRow)]
struct EntryRow {
    entry_id: i64,
    title: String,
    content: String,
    mood: Option<String>,
    is_public: bool,
    owner: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Self {
            entry_id: row.entry_id,
            title: row.title,
            content: row.content,
            mood: row.mood,
            is_public: row.is_public,
            owner: Identity::new(row.owner),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[entrait]
impl portfolio_domain::diary::repo::DiaryRepoImpl for PgDiaryRepo {
    pub async fn select_entries(deps: &impl GetDb) -> PfResult<Vec<Entry>> {
        let entries: Vec<Entry> = sqlx::query_as::<_, EntryRow>(
            // language=PostgreSQL
            r#"
            SELECT entry_id, title, content, mood, is_public, owner, created_at, updated_at
            FROM app.diary_entry
            ORDER BY created_at DESC, entry_id DESC
            "#,
        )
        .fetch(&deps.get_db().pg_pool)
        .map_ok(Entry::from)
        .try_collect()
        .await?;

        Ok(entries)
    }

    pub async fn find_entry(deps: &impl GetDb, entry_id: i64) -> PfResult<Option<Entry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            // language=PostgreSQL
            r#"
            SELECT entry_id, title, content, mood, is_public, owner, created_at, updated_at
            FROM app.diary_entry
            WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn insert_entry(
        deps: &impl GetDb,
        owner: &Identity,
        title: &str,
        content: &str,
        mood: Option<&str>,
        is_public: bool,
    ) -> PfResult<Entry> {
        let row = sqlx::query_as::<_, EntryRow>(
            // language=PostgreSQL
            r#"
            INSERT INTO app.diary_entry (owner, title, content, mood, is_public)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING entry_id, title, content, mood, is_public, owner, created_at, updated_at
            "#,
        )
        .bind(owner.as_str())
        .bind(title)
        .bind(content)
        .bind(mood)
        .bind(is_public)
        .fetch_one(&deps.get_db().pg_pool)
        .await?;

        Ok(row.into())
    }

    pub async fn patch_entry(
        deps: &impl GetDb,
        entry_id: i64,
        update: EntryUpdate<'_>,
    ) -> PfResult<Entry> {
        let row = sqlx::query_as::<_, EntryRow>(
            // language=PostgreSQL
            r#"
            UPDATE app.diary_entry SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                mood = COALESCE($3, mood),
                is_public = COALESCE($4, is_public),
                updated_at = now()
            WHERE entry_id = $5
            RETURNING entry_id, title, content, mood, is_public, owner, created_at, updated_at
            "#,
        )
        .bind(update.title)
        .bind(update.content)
        .bind(update.mood)
        .bind(update.is_public)
        .bind(entry_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?
        .ok_or(PfError::DiaryEntryNotFound)?;

        Ok(row.into())
    }

    pub async fn remove_entry(deps: &impl GetDb, entry_id: i64) -> PfResult<()> {
        let result = sqlx::query("DELETE FROM app.diary_entry WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&deps.get_db().pg_pool)
            .await?;

        if result.rows_affected() == 0 {
            Err(PfError::DiaryEntryNotFound)
        } else {
            Ok(())
        }
    }
}

use crate::GetDb;

use portfolio_domain::contact::repo::*;
use portfolio_domain::error::PfResult;
use portfolio_domain::identity::Identity;

use entrait::*;
use futures::TryStreamExt;
use time::OffsetDateTime;

pub struct PgContactRepo;

#[derive(sqlx::FromRow)]
struct MessageRow {
    message_id: i64,
    name: String,
    email: String,
    subject: String,
    message: String,
    read: bool,
    created_at: OffsetDateTime,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            message_id: row.message_id,
            name: row.name,
            email: Identity::new(row.email),
            subject: row.subject,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[entrait]
impl portfolio_domain::contact::repo::ContactRepoImpl for PgContactRepo {
    pub async fn insert_message(
        deps: &impl GetDb,
        name: &str,
        email: &Identity,
        subject: &str,
        message: &str,
    ) -> PfResult<Message> {
        let row = sqlx::query_as::<_, MessageRow>(
            // language=PostgreSQL
            r#"
            INSERT INTO app.contact_message (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING message_id, name, email, subject, message, read, created_at
            "#,
        )
        .bind(name)
        .bind(email.as_str())
        .bind(subject)
        .bind(message)
        .fetch_one(&deps.get_db().pg_pool)
        .await?;

        Ok(row.into())
    }

    pub async fn select_messages(deps: &impl GetDb) -> PfResult<Vec<Message>> {
        let messages: Vec<Message> = sqlx::query_as::<_, MessageRow>(
            // language=PostgreSQL
            r#"
            SELECT message_id, name, email, subject, message, read, created_at
            FROM app.contact_message
            ORDER BY created_at DESC, message_id DESC
            "#,
        )
        .fetch(&deps.get_db().pg_pool)
        .map_ok(Message::from)
        .try_collect()
        .await?;

        Ok(messages)
    }

    pub async fn set_message_read(
        deps: &impl GetDb,
        message_id: i64,
        read: bool,
    ) -> PfResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            // language=PostgreSQL
            r#"
            UPDATE app.contact_message SET read = $1
            WHERE message_id = $2
            RETURNING message_id, name, email, subject, message, read, created_at
            "#,
        )
        .bind(read)
        .bind(message_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn remove_message(deps: &impl GetDb, message_id: i64) -> PfResult<bool> {
        let result = sqlx::query("DELETE FROM app.contact_message WHERE message_id = $1")
            .bind(message_id)
            .execute(&deps.get_db().pg_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

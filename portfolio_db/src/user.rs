use crate::DbResultExt;
use crate::GetDb;

use portfolio_domain::error::{PfError, PfResult};
use portfolio_domain::identity::Identity;
use portfolio_domain::user::password::PasswordHash;
use portfolio_domain::user::repo::*;
use portfolio_domain::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgUserRepo;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    image: Option<String>,
}

impl UserRow {
    fn into_user(self) -> (User, Credentials) {
        (
            User {
                user_id: UserId(self.user_id),
                username: self.username,
                image: self.image,
            },
            Credentials {
                email: Identity::new(self.email),
                password_hash: self.password_hash.into(),
            },
        )
    }
}

#[entrait]
impl portfolio_domain::user::repo::UserRepoImpl for PgUserRepo {
    pub async fn insert_user(
        deps: &impl GetDb,
        username: &str,
        email: &Identity,
        password_hash: PasswordHash,
    ) -> PfResult<(User, Credentials)> {
        let mut tx = deps.get_db().pg_pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO app.user (username, email, password_hash) VALUES ($1, $2, $3) RETURNING user_id"#,
        )
        .bind(username)
        .bind(email.as_str())
        .bind(password_hash.0.as_str())
        .fetch_one(&mut *tx)
        .await
        .on_constraint("user_username_key", |_| PfError::UsernameTaken)
        .on_constraint("user_email_key", |_| PfError::EmailTaken)?;

        tx.commit().await?;

        Ok((
            User {
                user_id: UserId(id),
                username: username.to_string(),
                image: None,
            },
            Credentials {
                email: email.clone(),
                password_hash,
            },
        ))
    }

    pub async fn find_user_credentials_by_id(
        deps: &impl GetDb,
        UserId(user_id): UserId,
    ) -> PfResult<Option<(User, Credentials)>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"SELECT user_id, email, username, password_hash, image FROM app.user WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    pub async fn find_user_credentials_by_email(
        deps: &impl GetDb,
        email: &Identity,
    ) -> PfResult<Option<(User, Credentials)>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"SELECT user_id, email, username, password_hash, image FROM app.user WHERE email = $1"#,
        )
        .bind(email.as_str())
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    pub async fn update_user(
        deps: &impl GetDb,
        current_user_id: UserId,
        update: UserUpdate<'_>,
    ) -> PfResult<(User, Credentials)> {
        let mut tx = deps.get_db().pg_pool.begin().await?;

        let previous_email: String =
            sqlx::query_scalar(r#"SELECT email FROM app.user WHERE user_id = $1 FOR UPDATE"#)
                .bind(current_user_id.0)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(PfError::CurrentUserDoesNotExist)?;

        let row: UserRow = sqlx::query_as(
            // language=PostgreSQL
            r#"
            UPDATE app.user SET
                email = COALESCE($1, email),
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                image = COALESCE($4, image),
                updated_at = now()
            WHERE user_id = $5
            RETURNING user_id, email, username, password_hash, image
            "#,
        )
        .bind(update.email.map(Identity::as_str))
        .bind(update.username)
        .bind(update.password_hash.map(|hash| hash.0))
        .bind(update.image)
        .bind(current_user_id.0)
        .fetch_one(&mut *tx)
        .await
        .on_constraint("user_username_key", |_| PfError::UsernameTaken)
        .on_constraint("user_email_key", |_| PfError::EmailTaken)?;

        // Ownership is keyed by email, so it moves along with the account.
        if row.email != previous_email {
            for statement in [
                r#"UPDATE app.post SET owner = $2 WHERE owner = $1"#,
                r#"UPDATE app.diary_entry SET owner = $2 WHERE owner = $1"#,
                r#"UPDATE app.comment_like SET email = $2 WHERE email = $1"#,
                r#"UPDATE app.admin SET email = $2 WHERE email = $1"#,
            ] {
                sqlx::query(statement)
                    .bind(&previous_email)
                    .bind(&row.email)
                    .execute(&mut *tx)
                    .await?;
            }
            tracing::info!(user_id = %row.user_id, "moved owned resources to new email");
        }

        tx.commit().await?;

        Ok(row.into_user())
    }
}

use crate::GetDb;

use portfolio_domain::comment::repo::Comment;
use portfolio_domain::error::*;
use portfolio_domain::identity::Identity;
use portfolio_domain::UserId;

use entrait::*;
use futures::TryStreamExt;
use time::OffsetDateTime;
use uuid::Uuid;

pub struct PgCommentRepo;

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: i64,
    post_id: Uuid,
    parent_id: Option<i64>,
    content: String,
    created_at: OffsetDateTime,
    author_name: String,
    author_email: String,
    author_avatar: Option<String>,
    liked_by: Vec<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            comment_id: row.comment_id,
            post_id: row.post_id,
            parent_id: row.parent_id,
            content: row.content,
            created_at: row.created_at,
            author_name: row.author_name,
            author_email: Identity::new(row.author_email),
            author_avatar: row.author_avatar,
            liked_by: row.liked_by.into_iter().map(Identity::new).collect(),
        }
    }
}

// language=PostgreSQL
const SELECT_COMMENTS: &str = r#"
    SELECT
        comment.comment_id,
        comment.post_id,
        comment.parent_id,
        comment.content,
        comment.created_at,
        author.username author_name,
        author.email author_email,
        author.image author_avatar,
        ARRAY(
            SELECT email FROM app.comment_like likes
            WHERE likes.comment_id = comment.comment_id
            ORDER BY email
        ) liked_by
    FROM app.post_comment comment
    INNER JOIN app.user author USING (user_id)
"#;

#[entrait]
impl portfolio_domain::comment::repo::CommentRepoImpl for PgCommentRepo {
    pub async fn select_comments(deps: &impl GetDb, post_id: Uuid) -> PfResult<Vec<Comment>> {
        let comments: Vec<Comment> = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENTS} WHERE comment.post_id = $1 ORDER BY comment.created_at DESC, comment.comment_id DESC"
        ))
        .bind(post_id)
        .fetch(&deps.get_db().pg_pool)
        .map_ok(Comment::from)
        .try_collect()
        .await?;

        Ok(comments)
    }

    pub async fn find_comment(
        deps: &impl GetDb,
        post_id: Uuid,
        comment_id: i64,
    ) -> PfResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENTS} WHERE comment.post_id = $1 AND comment.comment_id = $2"
        ))
        .bind(post_id)
        .bind(comment_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await?;

        Ok(comment.map(Into::into))
    }

    pub async fn insert_comment(
        deps: &impl GetDb,
        author: UserId,
        post_id: Uuid,
        parent_id: Option<i64>,
        content: &str,
    ) -> PfResult<Comment> {
        let mut tx = deps.get_db().pg_pool.begin().await?;

        let comment_id: i64 = sqlx::query_scalar(
            // language=PostgreSQL
            r#"
            INSERT INTO app.post_comment (post_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING comment_id
            "#,
        )
        .bind(post_id)
        .bind(author.0)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        let comment = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENTS} WHERE comment.comment_id = $1"
        ))
        .bind(comment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(comment.into())
    }

    pub async fn set_comment_like(
        deps: &impl GetDb,
        comment_id: i64,
        identity: &Identity,
        liked: bool,
    ) -> PfResult<Comment> {
        let mut tx = deps.get_db().pg_pool.begin().await?;

        let query = if liked {
            // language=PostgreSQL
            "INSERT INTO app.comment_like (comment_id, email) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        } else {
            // language=PostgreSQL
            "DELETE FROM app.comment_like WHERE comment_id = $1 AND email = $2"
        };

        sqlx::query(query)
            .bind(comment_id)
            .bind(identity.as_str())
            .execute(&mut *tx)
            .await?;

        let comment = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENTS} WHERE comment.comment_id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PfError::CommentNotFound)?;

        tx.commit().await?;

        Ok(comment.into())
    }
}

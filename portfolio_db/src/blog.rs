use crate::DbResultExt;
use crate::GetDb;

use portfolio_domain::blog::repo::*;
use portfolio_domain::blog::PostStatus;
use portfolio_domain::error::{PfError, PfResult};
use portfolio_domain::identity::Identity;

use entrait::*;
use futures::TryStreamExt;
use time::OffsetDateTime;
use uuid::Uuid;

pub struct PgBlogRepo;

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    slug: String,
    title: String,
    summary: String,
    body: String,
    tag_list: Vec<String>,
    status: String,
    owner: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<PostRow> for Post {
    type Error = PfError;

    fn try_from(row: PostRow) -> PfResult<Self> {
        Ok(Post {
            post_id: row.post_id,
            slug: row.slug,
            title: row.title,
            summary: row.summary,
            body: row.body,
            tag_list: row.tag_list,
            status: row.status.parse()?,
            owner: Identity::new(row.owner),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const POST_COLUMNS: &str =
    "post_id, slug, title, summary, body, tag_list, status, owner, created_at, updated_at";

#[entrait]
impl portfolio_domain::blog::repo::BlogRepoImpl for PgBlogRepo {
    pub async fn select_posts(deps: &impl GetDb, filter: Filter<'_>) -> PfResult<Vec<Post>> {
        let query = format!(
            // language=PostgreSQL
            r#"
            SELECT {POST_COLUMNS}
            FROM app.post
            WHERE (
                $1::text IS NULL OR slug = $1
            ) AND (
                $2::text IS NULL OR tag_list @> array[$2]
            )
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, PostRow>(&query)
            .bind(filter.slug)
            .bind(filter.tag)
            .fetch(&deps.get_db().pg_pool)
            .map_err(PfError::from)
            .and_then(|row| async move { Post::try_from(row) })
            .try_collect()
            .await
    }

    pub async fn insert_post(
        deps: &impl GetDb,
        owner: &Identity,
        slug: &str,
        title: &str,
        summary: &str,
        body: &str,
        tag_list: &[String],
        status: PostStatus,
    ) -> PfResult<Post> {
        let query = format!(
            // language=PostgreSQL
            r#"
            INSERT INTO app.post (owner, slug, title, summary, body, tag_list, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {POST_COLUMNS}
            "#
        );

        sqlx::query_as::<_, PostRow>(&query)
            .bind(owner.as_str())
            .bind(slug)
            .bind(title)
            .bind(summary)
            .bind(body)
            .bind(tag_list)
            .bind(status.as_str())
            .fetch_one(&deps.get_db().pg_pool)
            .await
            .on_constraint("post_slug_key", |_| {
                PfError::DuplicatePostSlug(slug.to_string())
            })?
            .try_into()
    }

    pub async fn patch_post(
        deps: &impl GetDb,
        post_id: Uuid,
        update: PostUpdate<'_>,
    ) -> PfResult<()> {
        let new_slug = update.slug;

        sqlx::query(
            // language=PostgreSQL
            r#"
            UPDATE app.post SET
                slug = COALESCE($1, slug),
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                body = COALESCE($4, body),
                status = COALESCE($5, status),
                updated_at = now()
            WHERE post_id = $6
            "#,
        )
        .bind(update.slug)
        .bind(update.title)
        .bind(update.summary)
        .bind(update.body)
        .bind(update.status.map(|status| status.as_str()))
        .bind(post_id)
        .execute(&deps.get_db().pg_pool)
        .await
        .on_constraint("post_slug_key", |_| {
            PfError::DuplicatePostSlug(new_slug.unwrap_or_default().to_string())
        })?;

        Ok(())
    }

    pub async fn remove_post(deps: &impl GetDb, post_id: Uuid) -> PfResult<()> {
        let result = sqlx::query("DELETE FROM app.post WHERE post_id = $1")
            .bind(post_id)
            .execute(&deps.get_db().pg_pool)
            .await?;

        if result.rows_affected() == 0 {
            Err(PfError::PostNotFound)
        } else {
            Ok(())
        }
    }

    pub async fn is_admin(deps: &impl GetDb, identity: &Identity) -> PfResult<bool> {
        let is_admin: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app.admin WHERE email = $1)")
                .bind(identity.as_str())
                .fetch_one(&deps.get_db().pg_pool)
                .await?;

        Ok(is_admin)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::create_test_db;

    use assert_matches::*;

    pub async fn insert_test_post(
        db: &impl BlogRepo,
        slug: &str,
        status: PostStatus,
    ) -> PfResult<Post> {
        db.insert_post(
            &Identity::new("author@example.com"),
            slug,
            "Title",
            "Summary",
            "Body",
            &["rust".to_string()],
            status,
        )
        .await
    }

    #[tokio::test]
    #[ignore = "needs a running postgres at DATABASE_URL"]
    async fn should_insert_then_select_post_by_slug_and_tag() -> PfResult<()> {
        let db = create_test_db().await;
        let inserted = insert_test_post(&db, "slug", PostStatus::Published).await?;
        insert_test_post(&db, "other", PostStatus::Draft).await?;

        let by_slug = db
            .select_posts(Filter {
                slug: Some("slug"),
                ..Default::default()
            })
            .await?;
        assert_eq!(vec![inserted], by_slug);

        let by_tag = db
            .select_posts(Filter {
                tag: Some("rust"),
                ..Default::default()
            })
            .await?;
        assert_eq!(2, by_tag.len());
        assert_eq!("other", by_tag[0].slug);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a running postgres at DATABASE_URL"]
    async fn duplicate_slug_should_fail() -> PfResult<()> {
        let db = create_test_db().await;
        insert_test_post(&db, "slug", PostStatus::Draft).await?;

        assert_matches!(
            insert_test_post(&db, "slug", PostStatus::Draft).await,
            Err(PfError::DuplicatePostSlug(slug)) if slug == "slug"
        );
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a running postgres at DATABASE_URL"]
    async fn should_patch_then_remove_post() -> PfResult<()> {
        let db = create_test_db().await;
        let post = insert_test_post(&db, "slug", PostStatus::Draft).await?;

        db.patch_post(
            post.post_id,
            PostUpdate {
                slug: Some("new-slug"),
                status: Some(PostStatus::Private),
                ..Default::default()
            },
        )
        .await?;

        let patched = db
            .select_posts(Filter {
                slug: Some("new-slug"),
                ..Default::default()
            })
            .await?;
        assert_eq!(PostStatus::Private, patched[0].status);
        assert_eq!("Title", patched[0].title);

        db.remove_post(post.post_id).await?;
        assert_matches!(db.remove_post(post.post_id).await, Err(PfError::PostNotFound));
        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs a running postgres at DATABASE_URL"]
    async fn admin_table_decides_blog_admins() -> PfResult<()> {
        let db = create_test_db().await;
        sqlx::query("INSERT INTO app.admin (email) VALUES ('admin@example.com')")
            .execute(&db.get_db().pg_pool)
            .await?;

        assert!(db.is_admin(&Identity::new("Admin@Example.com")).await?);
        assert!(!db.is_admin(&Identity::new("author@example.com")).await?);
        Ok(())
    }
}

use crate::GetDb;

use portfolio_domain::error::PfResult;
use portfolio_domain::gallery::repo::*;

use entrait::*;
use futures::TryStreamExt;

pub struct PgGalleryRepo;

#[derive(sqlx::FromRow)]
struct PhotoRow {
    photo_id: i64,
    title: String,
    description: String,
    url: String,
    taken_at: Option<time::Date>,
    created_at: time::OffsetDateTime,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Self {
            photo_id: row.photo_id,
            title: row.title,
            description: row.description,
            url: row.url,
            taken_at: row.taken_at,
            created_at: row.created_at,
        }
    }
}

#[entrait]
impl portfolio_domain::gallery::repo::GalleryRepoImpl for PgGalleryRepo {
    pub async fn select_photos(deps: &impl GetDb) -> PfResult<Vec<Photo>> {
        let photos: Vec<Photo> = sqlx::query_as::<_, PhotoRow>(
            // language=PostgreSQL
            r#"
            SELECT photo_id, title, description, url, taken_at, created_at
            FROM app.photo
            ORDER BY created_at DESC, photo_id DESC
            "#,
        )
        .fetch(&deps.get_db().pg_pool)
        .map_ok(Photo::from)
        .try_collect()
        .await?;

        Ok(photos)
    }

    pub async fn insert_photo(deps: &impl GetDb, photo: NewPhoto<'_>) -> PfResult<Photo> {
        let row = sqlx::query_as::<_, PhotoRow>(
            // language=PostgreSQL
            r#"
            INSERT INTO app.photo (title, description, url, taken_at)
            VALUES ($1, $2, $3, $4)
            RETURNING photo_id, title, description, url, taken_at, created_at
            "#,
        )
        .bind(photo.title)
        .bind(photo.description)
        .bind(photo.url)
        .bind(photo.taken_at)
        .fetch_one(&deps.get_db().pg_pool)
        .await?;

        Ok(row.into())
    }

    pub async fn remove_photo(deps: &impl GetDb, photo_id: i64) -> PfResult<bool> {
        let result = sqlx::query("DELETE FROM app.photo WHERE photo_id = $1")
            .bind(photo_id)
            .execute(&deps.get_db().pg_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

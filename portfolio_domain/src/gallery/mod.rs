pub mod repo;

use crate::access::site_owner_or_deny;
use crate::error::*;
use crate::user::auth::*;
use crate::GetConfig;
use repo::GalleryRepo;

use entrait::entrait_export as entrait;
use time::{Date, OffsetDateTime};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(with = "calendar_date::option")]
    pub taken_at: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<repo::Photo> for Photo {
    fn from(photo: repo::Photo) -> Self {
        Self {
            id: photo.photo_id,
            title: photo.title,
            description: photo.description,
            url: photo.url,
            taken_at: photo.taken_at,
            created_at: photo.created_at,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default, with = "calendar_date::option")]
    pub taken_at: Option<Date>,
}

#[entrait(pub GalleryApi, mock_api=GalleryApiMock)]
pub mod api {
    use super::*;

    pub async fn list_photos(deps: &impl GalleryRepo) -> PfResult<Vec<Photo>> {
        Ok(deps
            .select_photos()
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub async fn add_photo(
        deps: &(impl Authenticate + GetConfig + GalleryRepo),
        token: Token,
        photo: PhotoCreate,
    ) -> PfResult<Photo> {
        let session = deps.authenticate(token)?;
        site_owner_or_deny(&session.identity, deps.get_site_owner())?;

        let title = photo.title.trim();
        let url = photo.url.trim();
        let mut errors = vec![];
        if title.is_empty() {
            errors.push(("title", "can't be blank"));
        }
        if url.is_empty() {
            errors.push(("url", "can't be blank"));
        }
        if !errors.is_empty() {
            return Err(PfError::unprocessable_entity(errors));
        }

        let inserted = deps
            .insert_photo(repo::NewPhoto {
                title,
                description: photo.description.trim(),
                url,
                taken_at: photo.taken_at,
            })
            .await?;

        tracing::info!(photo_id = inserted.photo_id, "added photo");
        Ok(inserted.into())
    }

    pub async fn delete_photo(
        deps: &(impl Authenticate + GetConfig + GalleryRepo),
        token: Token,
        photo_id: i64,
    ) -> PfResult<()> {
        let session = deps.authenticate(token)?;
        site_owner_or_deny(&session.identity, deps.get_site_owner())?;

        if deps.remove_photo(photo_id).await? {
            Ok(())
        } else {
            Err(PfError::PhotoNotFound)
        }
    }
}

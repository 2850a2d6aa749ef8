use crate::error::PfResult;

use entrait::entrait_export as entrait;
use time::{Date, OffsetDateTime};

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Photo {
    pub photo_id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub taken_at: Option<Date>,
    pub created_at: OffsetDateTime,
}

pub struct NewPhoto<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub taken_at: Option<Date>,
}

#[entrait(GalleryRepoImpl, delegate_by = DelegateGalleryRepo, mock_api=GalleryRepoMock)]
pub trait GalleryRepo {
    /// All photos, newest first.
    async fn select_photos(&self) -> PfResult<Vec<Photo>>;

    async fn insert_photo(&self, photo: NewPhoto<'_>) -> PfResult<Photo>;

    /// Returns whether a photo was deleted.
    async fn remove_photo(&self, photo_id: i64) -> PfResult<bool>;
}

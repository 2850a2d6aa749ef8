use super::PostStatus;
use crate::access::{Owned, Visibility};
use crate::error::PfResult;
use crate::identity::Identity;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Post {
    pub post_id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub status: PostStatus,
    pub owner: Identity,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Owned for Post {
    fn owner(&self) -> &Identity {
        &self.owner
    }

    fn visibility(&self) -> Visibility {
        match self.status {
            PostStatus::Published => Visibility::Public,
            PostStatus::Private => Visibility::Private,
            PostStatus::Draft => Visibility::Draft,
        }
    }
}

#[derive(Default, Debug)]
pub struct Filter<'a> {
    pub slug: Option<&'a str>,
    pub tag: Option<&'a str>,
}

#[derive(Default, Debug)]
pub struct PostUpdate<'a> {
    pub slug: Option<&'a str>,
    pub title: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub body: Option<&'a str>,
    pub status: Option<PostStatus>,
}

#[entrait(BlogRepoImpl, delegate_by = DelegateBlogRepo, mock_api=BlogRepoMock)]
pub trait BlogRepo {
    /// Posts of every status matching the filter, newest first.
    async fn select_posts(&self, filter: Filter<'_>) -> PfResult<Vec<Post>>;

    async fn insert_post(
        &self,
        owner: &Identity,
        slug: &str,
        title: &str,
        summary: &str,
        body: &str,
        tag_list: &[String],
        status: PostStatus,
    ) -> PfResult<Post>;

    async fn patch_post(&self, post_id: Uuid, update: PostUpdate<'_>) -> PfResult<()>;

    async fn remove_post(&self, post_id: Uuid) -> PfResult<()>;

    /// Whether the identity is listed in the blog admin table.
    async fn is_admin(&self, identity: &Identity) -> PfResult<bool>;
}

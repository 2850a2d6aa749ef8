use crate::error::PfResult;
use crate::identity::Identity;
use crate::UserId;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Comment {
    pub comment_id: i64,
    pub post_id: Uuid,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub author_name: String,
    pub author_email: Identity,
    pub author_avatar: Option<String>,
    pub liked_by: Vec<Identity>,
}

#[entrait(CommentRepoImpl, delegate_by = DelegateCommentRepo, mock_api=CommentRepoMock)]
pub trait CommentRepo {
    /// All comments of a post, newest first.
    async fn select_comments(&self, post_id: Uuid) -> PfResult<Vec<Comment>>;

    async fn find_comment(&self, post_id: Uuid, comment_id: i64) -> PfResult<Option<Comment>>;

    async fn insert_comment(
        &self,
        author: UserId,
        post_id: Uuid,
        parent_id: Option<i64>,
        content: &str,
    ) -> PfResult<Comment>;

    /// Add or remove `identity` from the likers of a comment and return the result.
    async fn set_comment_like(
        &self,
        comment_id: i64,
        identity: &Identity,
        liked: bool,
    ) -> PfResult<Comment>;
}

pub mod repo;

use crate::blog::repo::BlogRepo;
use crate::blog::{find_post, readable_post, PostStatus};
use crate::error::*;
use crate::identity::Identity;
use crate::user::auth::*;
use repo::CommentRepo;

use entrait::entrait_export as entrait;
use itertools::Itertools;
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: Identity,
    pub avatar: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub blog_id: Uuid,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author: Author,
    pub likes: usize,
    pub liked_by: Vec<Identity>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<repo::Comment> for Comment {
    fn from(db: repo::Comment) -> Self {
        Self {
            id: db.comment_id,
            blog_id: db.post_id,
            parent_id: db.parent_id,
            content: db.content,
            author: Author {
                name: db.author_name,
                email: db.author_email,
                avatar: db.author_avatar,
            },
            likes: db.liked_by.len(),
            liked_by: db.liked_by,
            created_at: db.created_at,
        }
    }
}

/// A top-level comment with its replies attached.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ThreadedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Nest a flat comment list two levels deep.
///
/// Top-level comments keep their input order and replies keep their relative
/// order under their parent. Replies whose parent is not a top-level comment
/// in the list are dropped.
pub fn build_threads(comments: Vec<Comment>) -> Vec<ThreadedComment> {
    let (top_level, replies): (Vec<_>, Vec<_>) = comments
        .into_iter()
        .partition(|comment| comment.parent_id.is_none());

    let mut replies_by_parent: HashMap<i64, Vec<Comment>> = replies
        .into_iter()
        .filter_map(|reply| Some((reply.parent_id?, reply)))
        .into_group_map();

    top_level
        .into_iter()
        .map(|comment| ThreadedComment {
            replies: replies_by_parent.remove(&comment.id).unwrap_or_default(),
            comment,
        })
        .collect()
}

/// Replies may only be attached to top-level comments.
pub fn validate_parent(parent: &Comment) -> PfResult<()> {
    match parent.parent_id {
        None => Ok(()),
        Some(_) => Err(PfError::MaxNestingLevel),
    }
}

#[entrait(pub CommentApi, mock_api=CommentApiMock)]
pub mod api {
    use super::*;

    pub async fn list_comments(
        deps: &(impl Authenticate + BlogRepo + CommentRepo),
        token: Option<Token>,
        slug: &str,
    ) -> PfResult<Vec<ThreadedComment>> {
        let session = deps.opt_authenticate(token)?;
        let post = readable_post(deps, session.as_ref(), slug).await?;
        let comments = deps.select_comments(post.post_id).await?;

        Ok(build_threads(comments.into_iter().map(Into::into).collect()))
    }

    pub async fn add_comment(
        deps: &(impl Authenticate + BlogRepo + CommentRepo),
        token: Token,
        slug: &str,
        new_comment: NewComment,
    ) -> PfResult<Comment> {
        let session = deps.authenticate(token)?;
        let content = new_comment.content.trim();
        if content.is_empty() {
            return Err(PfError::unprocessable_entity([("content", "can't be blank")]));
        }

        let post = find_post(deps, slug)
            .await?
            .filter(|post| post.status == PostStatus::Published)
            .ok_or(PfError::PostNotFound)?;

        if let Some(parent_id) = new_comment.parent_id {
            let parent: Comment = deps
                .find_comment(post.post_id, parent_id)
                .await?
                .ok_or(PfError::CommentNotFound)?
                .into();
            validate_parent(&parent)?;
        }

        let comment = deps
            .insert_comment(session.user_id, post.post_id, new_comment.parent_id, content)
            .await?;

        tracing::info!(comment_id = comment.comment_id, slug, "added comment");

        Ok(comment.into())
    }

    /// Like the comment, or take the like back if the requester already liked it.
    pub async fn like_comment(
        deps: &(impl Authenticate + BlogRepo + CommentRepo),
        token: Token,
        slug: &str,
        comment_id: i64,
    ) -> PfResult<Comment> {
        let session = deps.authenticate(token)?;
        let post = readable_post(deps, Some(&session), slug).await?;
        let comment = deps
            .find_comment(post.post_id, comment_id)
            .await?
            .ok_or(PfError::CommentNotFound)?;

        let liked = !comment
            .liked_by
            .iter()
            .any(|liker| liker.matches(&session.identity));

        deps.set_comment_like(comment_id, &session.identity, liked)
            .await
            .map(Into::into)
    }
}

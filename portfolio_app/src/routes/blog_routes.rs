use portfolio_domain::blog;
use portfolio_domain::comment;
use portfolio_domain::error::PfResult;
use portfolio_domain::user::auth::Token;

use axum::extract::{Extension, Path, Query};
use axum::routing::{get, post};
use axum::Json;

#[derive(serde::Deserialize, serde::Serialize, Debug)]
struct PostBody<T = blog::BlogPost> {
    post: T,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct MultiplePostsBody {
    posts: Vec<blog::BlogPost>,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct CommentBody<T = comment::Comment> {
    comment: T,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct MultipleCommentsBody {
    comments: Vec<comment::ThreadedComment>,
}

pub struct BlogRoutes<D>(std::marker::PhantomData<D>);

impl<D: Sized + Clone + Send + Sync + 'static> BlogRoutes<D>
where
    D: blog::api::BlogApi + comment::api::CommentApi,
{
    pub fn router() -> axum::Router {
        axum::Router::new().nest(
            "/posts",
            axum::Router::new()
                .route("/", get(Self::list_posts).post(Self::create_post))
                .route(
                    "/:slug",
                    get(Self::get_post)
                        .put(Self::update_post)
                        .delete(Self::delete_post),
                )
                .route(
                    "/:slug/comments",
                    get(Self::list_comments).post(Self::add_comment),
                )
                .route("/:slug/comments/:comment_id/like", post(Self::like_comment)),
        )
    }

    async fn list_posts(
        Extension(deps): Extension<D>,
        token: Option<Token>,
        Query(query): Query<blog::ListPostsQuery>,
    ) -> PfResult<Json<MultiplePostsBody>> {
        Ok(Json(MultiplePostsBody {
            posts: deps.list_posts(token, query).await?,
        }))
    }

    async fn get_post(
        Extension(deps): Extension<D>,
        token: Option<Token>,
        Path(slug): Path<String>,
    ) -> PfResult<Json<PostBody>> {
        Ok(Json(PostBody {
            post: deps.fetch_post(token, &slug).await?,
        }))
    }

    async fn create_post(
        Extension(deps): Extension<D>,
        token: Token,
        Json(body): Json<PostBody<blog::PostCreate>>,
    ) -> PfResult<Json<PostBody>> {
        Ok(Json(PostBody {
            post: deps.create_post(token, body.post).await?,
        }))
    }

    async fn update_post(
        Extension(deps): Extension<D>,
        token: Token,
        Path(slug): Path<String>,
        Json(body): Json<PostBody<blog::PostUpdate>>,
    ) -> PfResult<Json<PostBody>> {
        Ok(Json(PostBody {
            post: deps.update_post(token, &slug, body.post).await?,
        }))
    }

    async fn delete_post(
        Extension(deps): Extension<D>,
        token: Token,
        Path(slug): Path<String>,
    ) -> PfResult<()> {
        deps.delete_post(token, &slug).await
    }

    async fn list_comments(
        Extension(deps): Extension<D>,
        token: Option<Token>,
        Path(slug): Path<String>,
    ) -> PfResult<Json<MultipleCommentsBody>> {
        Ok(Json(MultipleCommentsBody {
            comments: deps.list_comments(token, &slug).await?,
        }))
    }

    async fn add_comment(
        Extension(deps): Extension<D>,
        token: Token,
        Path(slug): Path<String>,
        Json(body): Json<CommentBody<comment::NewComment>>,
    ) -> PfResult<Json<CommentBody>> {
        Ok(Json(CommentBody {
            comment: deps.add_comment(token, &slug, body.comment).await?,
        }))
    }

    async fn like_comment(
        Extension(deps): Extension<D>,
        token: Token,
        Path((slug, comment_id)): Path<(String, i64)>,
    ) -> PfResult<Json<CommentBody>> {
        Ok(Json(CommentBody {
            comment: deps.like_comment(token, &slug, comment_id).await?,
        }))
    }
}

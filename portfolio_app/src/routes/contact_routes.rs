use portfolio_domain::contact;
use portfolio_domain::error::PfResult;
use portfolio_domain::user::auth::Token;

use axum::extract::{Extension, Path};
use axum::routing::{post, put};
use axum::Json;

#[derive(serde::Deserialize, serde::Serialize, Debug)]
struct MessageBody<T = contact::ContactMessage> {
    message: T,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct MultipleMessagesBody {
    messages: Vec<contact::ContactMessage>,
}

pub struct ContactRoutes<D>(std::marker::PhantomData<D>);

impl<D: Sized + Clone + Send + Sync + 'static> ContactRoutes<D>
where
    D: contact::api::ContactApi,
{
    pub fn router() -> axum::Router {
        axum::Router::new().nest(
            "/contact",
            axum::Router::new()
                .route("/", post(Self::submit_message).get(Self::list_messages))
                .route(
                    "/:message_id",
                    put(Self::mark_read).delete(Self::delete_message),
                ),
        )
    }

    async fn submit_message(
        Extension(deps): Extension<D>,
        Json(body): Json<MessageBody<contact::NewMessage>>,
    ) -> PfResult<Json<MessageBody>> {
        Ok(Json(MessageBody {
            message: deps.submit_message(body.message).await?,
        }))
    }

    async fn list_messages(
        Extension(deps): Extension<D>,
        token: Token,
    ) -> PfResult<Json<MultipleMessagesBody>> {
        Ok(Json(MultipleMessagesBody {
            messages: deps.list_messages(token).await?,
        }))
    }

    async fn mark_read(
        Extension(deps): Extension<D>,
        token: Token,
        Path(message_id): Path<i64>,
        Json(body): Json<MessageBody<contact::MarkRead>>,
    ) -> PfResult<Json<MessageBody>> {
        Ok(Json(MessageBody {
            message: deps.mark_read(token, message_id, body.message).await?,
        }))
    }

    async fn delete_message(
        Extension(deps): Extension<D>,
        token: Token,
        Path(message_id): Path<i64>,
    ) -> PfResult<()> {
        deps.delete_message(token, message_id).await
    }
}

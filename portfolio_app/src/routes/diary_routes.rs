use portfolio_domain::diary;
use portfolio_domain::error::PfResult;
use portfolio_domain::user::auth::Token;

use axum::extract::{Extension, Path};
use axum::routing::get;
use axum::Json;

#[derive(serde::Deserialize, serde::Serialize, Debug)]
struct EntryBody<T = diary::DiaryEntry> {
    entry: T,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct MultipleEntriesBody {
    entries: Vec<diary::DiaryEntry>,
}

pub struct DiaryRoutes<D>(std::marker::PhantomData<D>);

impl<D: Sized + Clone + Send + Sync + 'static> DiaryRoutes<D>
where
    D: diary::api::DiaryApi,
{
    pub fn router() -> axum::Router {
        axum::Router::new().nest(
            "/diary",
            axum::Router::new()
                .route("/", get(Self::list_entries).post(Self::create_entry))
                .route(
                    "/:entry_id",
                    get(Self::get_entry)
                        .put(Self::update_entry)
                        .delete(Self::delete_entry),
                ),
        )
    }

    async fn list_entries(
        Extension(deps): Extension<D>,
        token: Option<Token>,
    ) -> PfResult<Json<MultipleEntriesBody>> {
        Ok(Json(MultipleEntriesBody {
            entries: deps.list_entries(token).await?,
        }))
    }

    async fn get_entry(
        Extension(deps): Extension<D>,
        token: Option<Token>,
        Path(entry_id): Path<i64>,
    ) -> PfResult<Json<EntryBody>> {
        Ok(Json(EntryBody {
            entry: deps.fetch_entry(token, entry_id).await?,
        }))
    }

    async fn create_entry(
        Extension(deps): Extension<D>,
        token: Token,
        Json(body): Json<EntryBody<diary::EntryCreate>>,
    ) -> PfResult<Json<EntryBody>> {
        Ok(Json(EntryBody {
            entry: deps.create_entry(token, body.entry).await?,
        }))
    }

    async fn update_entry(
        Extension(deps): Extension<D>,
        token: Token,
        Path(entry_id): Path<i64>,
        Json(body): Json<EntryBody<diary::EntryUpdate>>,
    ) -> PfResult<Json<EntryBody>> {
        Ok(Json(EntryBody {
            entry: deps.update_entry(token, entry_id, body.entry).await?,
        }))
    }

    async fn delete_entry(
        Extension(deps): Extension<D>,
        token: Token,
        Path(entry_id): Path<i64>,
    ) -> PfResult<()> {
        deps.delete_entry(token, entry_id).await
    }
}

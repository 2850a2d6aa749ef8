use portfolio_domain::error::PfResult;
use portfolio_domain::gallery;
use portfolio_domain::user::auth::Token;

use axum::extract::{Extension, Path};
use axum::routing::{delete, get};
use axum::Json;

#[derive(serde::Deserialize, serde::Serialize, Debug)]
struct PhotoBody<T = gallery::Photo> {
    photo: T,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct MultiplePhotosBody {
    photos: Vec<gallery::Photo>,
}

pub struct GalleryRoutes<D>(std::marker::PhantomData<D>);

impl<D: Sized + Clone + Send + Sync + 'static> GalleryRoutes<D>
where
    D: gallery::api::GalleryApi,
{
    pub fn router() -> axum::Router {
        axum::Router::new().nest(
            "/gallery",
            axum::Router::new()
                .route("/", get(Self::list_photos).post(Self::add_photo))
                .route("/:photo_id", delete(Self::delete_photo)),
        )
    }

    async fn list_photos(Extension(deps): Extension<D>) -> PfResult<Json<MultiplePhotosBody>> {
        Ok(Json(MultiplePhotosBody {
            photos: deps.list_photos().await?,
        }))
    }

    async fn add_photo(
        Extension(deps): Extension<D>,
        token: Token,
        Json(body): Json<PhotoBody<gallery::PhotoCreate>>,
    ) -> PfResult<Json<PhotoBody>> {
        Ok(Json(PhotoBody {
            photo: deps.add_photo(token, body.photo).await?,
        }))
    }

    async fn delete_photo(
        Extension(deps): Extension<D>,
        token: Token,
        Path(photo_id): Path<i64>,
    ) -> PfResult<()> {
        deps.delete_photo(token, photo_id).await
    }
}

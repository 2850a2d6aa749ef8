mod blog_routes;
mod contact_routes;
mod diary_routes;
mod gallery_routes;
mod user_routes;

use crate::app::App;

use axum::routing::Router;
use entrait::Impl;

/// Axum API router for the real app.
pub fn api_router() -> axum::Router {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(user_routes::UserRoutes::<Impl<App>>::router())
            .merge(blog_routes::BlogRoutes::<Impl<App>>::router())
            .merge(diary_routes::DiaryRoutes::<Impl<App>>::router())
            .merge(contact_routes::ContactRoutes::<Impl<App>>::router())
            .merge(gallery_routes::GalleryRoutes::<Impl<App>>::router()),
    )
}

pub mod app;
pub mod config;

mod routes;

#[cfg(test)]
mod test_util;

use anyhow::Context;
use entrait::Impl;
use tower::ServiceBuilder;

pub async fn serve(app: app::App) -> anyhow::Result<()> {
    let bind_address = app.config.bind_address.clone();

    let router = routes::api_router().layer(
        ServiceBuilder::new()
            .layer(axum::extract::Extension(Impl::new(app)))
            // Enables logging. Use `RUST_LOG=tower_http=debug`
            .layer(tower_http::trace::TraceLayer::new_for_http()),
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("could not bind to {bind_address}"))?;

    tracing::info!(%bind_address, "listening");

    axum::serve(listener, router)
        .await
        .context("error running HTTP server")
}

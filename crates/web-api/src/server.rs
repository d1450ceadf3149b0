use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use pricepilot_orchestrator::Pipeline;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    pipeline: Arc<Pipeline>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/products", get(handlers::list_products))
            .route("/api/run", post(handlers::trigger_run))
            .route(
                "/api/recommendations/:id/apply",
                post(handlers::apply_recommendation),
            )
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.pipeline.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

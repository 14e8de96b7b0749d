pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let operator = Router::new()
        .route("/api/admin/me", get(routes::admin::me))
        // Room
        .route("/api/room/reset", post(routes::room::reset_day))
        // Orders
        .route("/api/orders", get(routes::orders::list_orders))
        .route("/api/orders/days", get(routes::orders::list_order_days))
        // Vendor catalog
        .route(
            "/api/vendors",
            get(routes::vendors::list_vendors).post(routes::vendors::create_vendor),
        )
        .route(
            "/api/vendors/{id}",
            put(routes::vendors::update_vendor).delete(routes::vendors::delete_vendor),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.auth.clone(),
            auth::require_operator,
        ));

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/admin/login", post(routes::admin::login))
        // Room
        .route("/api/room/today", get(routes::room::get_today))
        .route("/api/room/draw", post(routes::room::draw))
        .route("/api/room/lock", post(routes::room::lock))
        .route("/api/room/{date}", get(routes::room::get_for_date))
        // Orders
        .route("/api/orders", post(routes::orders::submit_order))
        // Vendor catalog
        .route("/api/vendors/random", get(routes::vendors::random_vendor))
        .merge(operator)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the drink room API server.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the server on a pre-bound listener.
///
/// Accepting a bound `TcpListener` lets the caller read the actual port
/// before starting (useful when `port = 0`).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let region = app_state.config.default_region.clone();
    let app = build_router(app_state);

    tracing::info!(%region, "drinkroom API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}

// server.rs - Router assembly and startup

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{AppConfig, ServerConfig};
use crate::database::models::{AddressingMode, CodeExample, Pattern};
use crate::database::{ContentStore, DatabaseManager, PgStore};
use crate::editor::WorkspaceSlot;
use crate::handlers::{protected, public};
use crate::middleware::access_gate;
use crate::state::{seeded_memory_store, AppState};

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    Router::new()
        .merge(public_routes())
        .merge(dashboard_routes())
        .layer(from_fn_with_state(state.clone(), access_gate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, docs, health};

    Router::new()
        .route("/", get(docs::get))
        .route("/sections/:slug", get(docs::section_get))
        .route("/health", get(health::get))
        .route("/login", get(auth::login_get).post(auth::login_post))
        .route("/logout", post(auth::logout_post))
}

fn dashboard_routes() -> Router<AppState> {
    use protected::dashboard;

    Router::new()
        .route("/dashboard", get(dashboard::get))
        .route("/dashboard/reload", post(dashboard::reload))
        .merge(record_routes::<AddressingMode>("addressing-modes"))
        .merge(record_routes::<Pattern>("patterns"))
        .merge(record_routes::<CodeExample>("code-examples"))
}

fn record_routes<T: WorkspaceSlot>(segment: &str) -> Router<AppState> {
    use protected::records;

    Router::new()
        .route(&format!("/dashboard/{}", segment), post(records::create::<T>))
        .route(
            &format!("/dashboard/{}/:id", segment),
            axum::routing::patch(records::update::<T>).delete(records::delete::<T>),
        )
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Postgres when DATABASE_URL is set, otherwise the bundled fixtures in memory
pub async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    match &config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            info!("Using postgres content store");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            let store = seeded_memory_store().await?;
            info!("DATABASE_URL not set, using in-memory store seeded from bundled fixtures");
            Ok(store)
        }
    }
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;
    let store = build_store(&config).await?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config, store)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("MCS-51 docs listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FixedCredentials;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let store = seeded_memory_store().await.unwrap();
        app(AppState::new(
            AppConfig::development(),
            store,
            Arc::new(FixedCredentials::default()),
        ))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn gate_runs_in_front_of_dashboard_routes() {
        let response = test_app().await.oneshot(get("/dashboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn refuses_to_start_without_a_session_secret() {
        let err = serve(AppConfig::staging()).await.unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[tokio::test]
    async fn public_routes_are_served_anonymously() {
        for uri in ["/", "/health", "/login", "/sections/arithmetic"] {
            let response = test_app().await.oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }
}

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use std::sync::Arc;

use crate::{Error, auth, fails, users};
use engine::Engine;

/// Runtime knobs the routing layer needs.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Secret used to sign and verify session tokens.
    pub token_secret: String,
    /// Frontend origin allowed to make credentialed requests.
    pub frontend_origin: String,
    /// Set the `Secure` flag on session cookies (TLS deployments).
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub config: Arc<ServerConfig>,
}

async fn ping() -> &'static str {
    "Pong"
}

/// Rejects write requests whose body is not declared as JSON.
async fn require_json(request: Request, next: Next) -> Response {
    if request.method() == Method::POST || request.method() == Method::PUT {
        let declared_json = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim_start().starts_with("application/json"));

        if !declared_json {
            return (
                StatusCode::BAD_REQUEST,
                Json(Error {
                    error: "Content-Type must be application/json".to_string(),
                }),
            )
                .into_response();
        }
    }

    next.run(request).await
}

/// Credentialed CORS for the configured frontend origin.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match config.frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(err) => tracing::error!("invalid frontend origin, cross-origin calls will fail: {err}"),
    }

    cors
}

pub fn router(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);

    // The JSON guard covers the entity/user routes only; the auth routes
    // accept bodyless posts (logout).
    let api = Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/entities", get(fails::list).post(fails::create))
        .route(
            "/api/entities/{id}",
            get(fails::get).put(fails::update).delete(fails::remove),
        )
        .route("/api/entities/user/{user_id}", get(fails::list_by_user))
        .route_layer(middleware::from_fn(require_json));

    Router::new()
        .route("/ping", get(ping))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/status", get(auth::status))
        .merge(api)
        .layer(cors)
        .with_state(state)
}

pub async fn run(engine: Engine, config: ServerConfig) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        config: Arc::new(config),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

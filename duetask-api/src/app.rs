/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use duetask_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = duetask_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        security::SecurityHeadersLayer,
        session::{require_login, session_layer},
    },
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret for session and pending-subscription cookies
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }

    /// Whether cookies are marked `Secure`
    pub fn cookie_secure(&self) -> bool {
        self.config.api.cookie_secure
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET      /health            # Health check (public)
/// ├── GET      /static/*          # Service worker, script, stylesheet
/// ├── GET      /                  # List or landing page
/// ├── GET,POST /signup
/// ├── GET,POST /login
/// ├── GET      /logout
/// ├── POST     /save-token        # JSON, session optional
/// ├── GET,POST /add               # login required (redirect)
/// ├── GET,POST /edit_todo/:id     # login required (redirect)
/// ├── GET      /delete/:id        # login required (redirect)
/// └── POST     /updatetodo/:id    # JSON, login required (redirect)
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Session resolution (every request)
/// 4. Login gates (per route group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, health, push, todos};

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(todos::index))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/save-token", post(push::save_token));

    // Anonymous callers are sent to the login form
    let protected_routes = Router::new()
        .route("/add", get(todos::add_form).post(todos::add))
        .route("/edit_todo/:id", get(todos::edit_form).post(todos::edit))
        .route("/delete/:id", get(todos::delete))
        .route("/updatetodo/:id", post(todos::update_status))
        .route_layer(from_fn(require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&state.config.api.static_dir))
        .layer(from_fn_with_state(state.clone(), session_layer))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

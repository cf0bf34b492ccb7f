/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use blogforge_api::{app::{build_router, AppState}, config::Config};
/// use blogforge_shared::{db::pool::create_pool, store::PgStore};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let pool = create_pool(&config.database).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), None, config);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use blogforge_shared::{
    auth::{
        authorization::{role_gate_middleware, ADMIN_ONLY},
        jwt::TokenService,
        middleware::jwt_auth_middleware,
    },
    redis::RedisClient,
    services::{AccountService, ArticleService, CategoryService, CommentService, TagService},
    store::Store,
    upload::UploadStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Multipart framing allowance on top of the file size cap
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub accounts: AccountService,
    pub articles: ArticleService,
    pub categories: CategoryService,
    pub tags: TagService,
    pub comments: CommentService,
    pub uploads: UploadStore,

    /// `None` when running without Redis (tests)
    pub redis: Option<RedisClient>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services over one store
    pub fn new(store: Arc<dyn Store>, redis: Option<RedisClient>, config: Config) -> Self {
        let tokens = TokenService::new(config.jwt.token_config());
        let uploads = UploadStore::new(config.upload.clone(), config.server.public_base_url.clone());

        Self {
            accounts: AccountService::new(store.clone(), tokens.clone()),
            articles: ArticleService::new(store.clone()),
            categories: CategoryService::new(store.clone()),
            tags: TagService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            store,
            tokens,
            uploads,
            redis,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                       public
/// ├── /uploads/*                        static files
/// └── /api/v1/
///     ├── register, login, refresh      public
///     ├── GET articles[/:id][/comments] public
///     ├── GET categories[/:id], tags    public
///     ├── user/*, upload, article and
///     │   comment mutations             bearer token
///     └── /admin/*                      bearer token + admin role
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication and role gate (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{articles, auth, categories, comments, health, tags, upload, users};

    let jwt = || middleware::from_fn_with_state(state.tokens.clone(), jwt_auth_middleware);

    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/articles", get(articles::list_articles))
        .route("/articles/:id", get(articles::get_article))
        .route("/articles/:id/comments", get(comments::list_comments))
        .route("/categories", get(categories::list_categories))
        .route("/categories/:id", get(categories::get_category))
        .route("/tags", get(tags::list_tags));

    let upload_limit = usize::try_from(state.uploads.config().max_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    // Route layers only wrap matched routes, so unknown paths still 404
    let user_routes = Router::new()
        .route("/user/profile", get(users::get_profile).put(users::update_profile))
        .route("/user/password", put(users::change_password))
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/articles", post(articles::create_article))
        .route(
            "/articles/:id",
            put(articles::update_article).delete(articles::delete_article),
        )
        .route("/articles/:id/like", post(articles::like_article))
        .route("/articles/:id/comments", post(comments::create_comment))
        .route("/comments/:id", delete(comments::delete_comment))
        .route_layer(jwt());

    // The last route_layer runs first: token check, then role gate
    let admin_routes = Router::new()
        .route("/users/:id", get(users::get_user))
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/tags", post(tags::create_tag))
        .route("/tags/:id", delete(tags::delete_tag))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, role_gate_middleware))
        .route_layer(jwt());

    let v1_routes = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", v1_routes)
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.server.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

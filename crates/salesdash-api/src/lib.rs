//! HTTP JSON API server
//!
//! Routes are organized into modules:
//! - routes::auth: Sign-up, sign-in, sign-out, session lookup
//! - routes::sales: Sale list, detail, create, update, soft delete
//! - routes::customers / employees / products: Reference data CRUD
//! - routes::analytics: Dashboard aggregates
//! - routes::admin: User role management
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::Router;
use salesdash_config::Config;
use salesdash_core::{roles, AuthService, Role, SalesRepository, SessionUser, StoreRef};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: StoreRef,
    pub repo: SalesRepository,
    pub auth: Arc<AuthService>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: StoreRef, auth: Arc<AuthService>, config: Config) -> Self {
        Self {
            repo: SalesRepository::new(store.clone()),
            store,
            auth,
            config,
        }
    }
}

/// Bearer token from the Authorization header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Resolve the signed-in user for a request, or 401
pub(crate) fn session_user(state: &AppState, headers: &HeaderMap) -> ApiResult<SessionUser> {
    bearer_token(headers)
        .and_then(|token| state.auth.session(token))
        .ok_or(ApiError::Unauthorized)
}

/// Resolve the signed-in user and their role
pub(crate) async fn session_with_role(
    state: &AppState,
    headers: &HeaderMap,
) -> ApiResult<(SessionUser, Role)> {
    let user = session_user(state, headers)?;
    let role = roles::resolve_role(&state.store, &user.id).await;
    Ok((user, role))
}

/// Resolve the signed-in user, rejecting non-admins with 403
pub(crate) async fn admin_user(state: &AppState, headers: &HeaderMap) -> ApiResult<SessionUser> {
    let user = session_user(state, headers)?;
    roles::require_admin(&state.store, &user.id).await?;
    Ok(user)
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::admin::{api_set_user_role, api_users};
    use routes::analytics::{api_customer_summaries, api_monthly_sales, api_overview};
    use routes::auth::{api_session, api_sign_in, api_sign_out, api_sign_up};
    use routes::customers::{
        api_customer_create, api_customer_delete, api_customer_detail, api_customer_update,
        api_customers,
    };
    use routes::employees::{
        api_employee_create, api_employee_delete, api_employee_detail, api_employee_update,
        api_employees,
    };
    use routes::products::{
        api_price_create, api_prices, api_product_create, api_product_delete, api_product_detail,
        api_product_update, api_products,
    };
    use routes::sales::{
        api_sale_create, api_sale_delete, api_sale_detail, api_sale_update, api_sales,
    };
    use routes::settings::{api_settings, api_settings_metadata};

    Router::new()
        .route("/api/health", get(health_check))
        // Auth
        .route("/api/auth/signup", post(api_sign_up))
        .route("/api/auth/login", post(api_sign_in))
        .route("/api/auth/logout", post(api_sign_out))
        .route("/api/auth/session", get(api_session))
        // Reference data
        .route("/api/customers", get(api_customers).post(api_customer_create))
        .route(
            "/api/customers/:custno",
            get(api_customer_detail)
                .put(api_customer_update)
                .delete(api_customer_delete),
        )
        .route("/api/employees", get(api_employees).post(api_employee_create))
        .route(
            "/api/employees/:empno",
            get(api_employee_detail)
                .put(api_employee_update)
                .delete(api_employee_delete),
        )
        .route("/api/products", get(api_products).post(api_product_create))
        .route(
            "/api/products/:prodcode",
            get(api_product_detail)
                .put(api_product_update)
                .delete(api_product_delete),
        )
        .route(
            "/api/products/:prodcode/prices",
            get(api_prices).post(api_price_create),
        )
        // Sales
        .route("/api/sales", get(api_sales).post(api_sale_create))
        .route("/api/sales/:transno", get(api_sale_detail).put(api_sale_update))
        .route("/api/sales/:transno/delete", post(api_sale_delete))
        // Analytics
        .route("/api/analytics/overview", get(api_overview))
        .route("/api/analytics/monthly", get(api_monthly_sales))
        .route("/api/analytics/customers", get(api_customer_summaries))
        // Admin
        .route("/api/admin/users", get(api_users))
        .route("/api/admin/users/:id/role", put(api_set_user_role))
        // Settings
        .route("/api/settings", get(api_settings))
        .route("/api/settings/metadata", get(api_settings_metadata))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Creates the router, binds to the configured address, and serves
/// requests until shutdown.
pub async fn start_server(
    config: Config,
    store: StoreRef,
    auth: Arc<AuthService>,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(store, auth, config);

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting salesdash server on http://{}", addr);
    log::info!("JSON API available under /api/*");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

// File: services/coursehub_backend/src/lib.rs
pub mod app_state;

use app_state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use coursehub_common::AuthVerifier;
use coursehub_config::{AppConfig, ServerConfig};
use coursehub_db::{DbClient, Repositories};
use http::{header, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_CURRENCY: &str = "usd";

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub stripe: bool,
}

async fn welcome() -> &'static str {
    "Welcome to the Coursehub API!"
}

#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.is_healthy().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        stripe: state.stripe_enabled(),
    };
    (status, Json(body))
}

/// CORS for the storefront. No configured origins means any origin.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Assembles every router under `/api` with the CORS and tracing layers.
pub fn build_app(config: Arc<AppConfig>, db: DbClient) -> Router {
    let repos = Repositories::new(&db);
    let auth = AuthVerifier::new(&config.auth);
    let state = AppState::new(config.clone(), db);
    let currency = config
        .stripe
        .as_ref()
        .map_or(DEFAULT_CURRENCY, |stripe| stripe.currency.as_str());

    #[allow(unused_mut)] // only mutated with the stripe feature
    let mut api_router = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .with_state(state)
        .merge(coursehub_catalog::routes(repos.clone(), auth.clone(), currency));

    #[cfg(feature = "stripe")]
    {
        match config.stripe.as_ref() {
            Some(stripe_config) if coursehub_common::is_stripe_enabled(&config) => {
                info!("Stripe checkout enabled");
                api_router = api_router.merge(coursehub_stripe::routes(
                    Arc::new(stripe_config.clone()),
                    repos.clone(),
                    auth.clone(),
                ));
            }
            _ => info!("Stripe checkout disabled"),
        }
    }

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_ui());
    }

    app.layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
}

#[cfg(feature = "openapi")]
fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    use coursehub_catalog::doc::CatalogApiDoc;
    #[cfg(feature = "stripe")]
    use coursehub_stripe::doc::StripeApiDoc;
    use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
    use utoipa::{Modify, OpenApi};
    use utoipa_swagger_ui::SwaggerUi;

    struct BearerAuth;

    impl Modify for BearerAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }

    // Define the Merged OpenAPI Documentation struct
    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Coursehub API",
            version = "0.1.0",
            description = "Course catalog, checkout and progress tracking",
            license(name = "MIT", url = "https://opensource.org/licenses/MIT")
        ),
        modifiers(&BearerAuth),
        servers((url = "/api", description = "Main API Prefix")),
    )]
    struct ApiDoc;

    let mut openapi_doc = ApiDoc::openapi();
    openapi_doc.merge(CatalogApiDoc::openapi());
    #[cfg(feature = "stripe")]
    openapi_doc.merge(StripeApiDoc::openapi());
    info!("Adding Swagger UI at /api/docs");

    SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc)
}

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use serde_json::{json, Value};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::api::geografia::{GeoFilter, GeoInput, Nivel};
use crate::auth::oauth::{HttpIdentityProvider, IdentityProvider};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::handlers::{protected, public};
use crate::middleware::{session_auth_middleware, AdminUser};

/// Router wired to the configured OAuth provider
pub fn app() -> Router {
    let provider = HttpIdentityProvider::new(config::config().oauth.clone());
    app_with_provider(Arc::new(provider))
}

pub fn app_with_provider(provider: Arc<dyn IdentityProvider>) -> Router {
    let max_body = config::config().server.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Session required
        .merge(protected_routes().layer(middleware::from_fn(session_auth_middleware)))
        // Global middleware
        .layer(Extension(provider))
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn protected_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(ticket_routes())
        .merge(empresa_routes())
        .merge(geografia_routes())
        .merge(usuario_routes())
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn auth_public_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/api/auth/signin", get(auth::signin_get))
        .route("/api/auth/callback", get(auth::callback_get))
        .route("/api/auth/signout", post(auth::signout_post))
}

fn auth_routes() -> Router {
    use protected::auth;

    Router::new().route("/api/auth/session", get(auth::session_get))
}

fn ticket_routes() -> Router {
    use protected::tickets;

    Router::new()
        .route("/api/tickets", get(tickets::ticket_list).post(tickets::ticket_create))
        .route(
            "/api/tickets/:id",
            get(tickets::ticket_get)
                .put(tickets::ticket_update)
                .delete(tickets::ticket_delete),
        )
        .route(
            "/api/tickets/:id/accion",
            get(tickets::accion_list).post(tickets::accion_create),
        )
        .route(
            "/api/tickets/:id/accion/:accion_id",
            put(tickets::accion_update).delete(tickets::accion_delete),
        )
}

fn empresa_routes() -> Router {
    use protected::empresas::{contacto, direccion, empresa, importar, sucursal, ubicacion};

    Router::new()
        .route("/api/empresas", get(empresa::list).post(empresa::create))
        .route("/api/empresas/importar", post(importar::post))
        .route(
            "/api/empresas/:id",
            get(empresa::get).put(empresa::update).delete(empresa::delete),
        )
        .route(
            "/api/empresas/:id/sucursales",
            get(sucursal::list).post(sucursal::create),
        )
        .route(
            "/api/sucursales/:id",
            get(sucursal::get).put(sucursal::update).delete(sucursal::delete),
        )
        .route(
            "/api/empresas/:id/contactos",
            get(contacto::list).post(contacto::create),
        )
        .route(
            "/api/contactos/:id",
            get(contacto::get).put(contacto::update).delete(contacto::delete),
        )
        .route("/api/ubicaciones", get(ubicacion::list).post(ubicacion::create))
        .route(
            "/api/ubicaciones/:id",
            get(ubicacion::get).put(ubicacion::update).delete(ubicacion::delete),
        )
        .route("/api/direcciones", post(direccion::create))
        .route("/api/direcciones/:id", get(direccion::get).put(direccion::update))
}

fn geografia_routes() -> Router {
    use protected::geografia::{backup, listing, mutation};

    let mut router = Router::new()
        .route("/api/geografia/buscar", get(listing::buscar))
        .route("/api/geografia/backup", get(backup::get))
        .route("/api/geografia/restore", post(backup::restore));

    // One static path per level; a `:nivel` segment would shadow the static routes above
    for nivel in Nivel::ALL {
        let collection = format!("/api/geografia/{}", nivel.table());
        let item = format!("{}/:id", collection);

        router = router
            .route(
                &collection,
                get(move |query: ApiQuery<GeoFilter>| listing::list(nivel, query)).post(
                    move |admin: AdminUser, body: ApiJson<GeoInput>| mutation::create(nivel, admin, body),
                ),
            )
            .route(
                &item,
                put(move |admin: AdminUser, id: ApiPath<i32>, body: ApiJson<GeoInput>| {
                    mutation::update(nivel, admin, id, body)
                })
                .delete(move |admin: AdminUser, id: ApiPath<i32>| mutation::delete(nivel, admin, id)),
            );
    }
    router
}

fn usuario_routes() -> Router {
    use protected::usuarios;

    Router::new()
        .route("/api/usuarios", get(usuarios::list).post(usuarios::create))
        .route("/api/usuarios/:id", put(usuarios::update))
}

async fn root() -> axum::Json<Value> {
    axum::Json(json!({
        "success": true,
        "data": {
            "name": "AccessPoint Control",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/auth/{signin,callback,session,signout}",
                "tickets": "/api/tickets[/:id[/accion[/:accionId]]]",
                "empresas": "/api/empresas[/:id[/sucursales|/contactos]], /api/empresas/importar",
                "sucursales": "/api/sucursales/:id",
                "ubicaciones": "/api/ubicaciones[/:id]",
                "contactos": "/api/contactos/:id",
                "direcciones": "/api/direcciones[/:id]",
                "geografia": "/api/geografia/{paises,regiones,provincias,comunas}[/:id], /api/geografia/{buscar,backup,restore}",
                "usuarios": "/api/usuarios[/:id]",
                "health": "/health",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(json!({
                    "success": false,
                    "error": "Base de datos no disponible",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": { "status": "degraded", "timestamp": now, "database": "unavailable" }
                })),
            )
        }
    }
}

//! Capa HTTP: rutas, extractores y traducción de errores.

pub mod docs;
pub mod enhancer;
pub mod error;
pub mod extract;
pub mod health;
pub mod optimize;
pub mod outcome;
pub mod runs;
pub mod sessions;
pub mod share;
pub mod specs;
pub mod users;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// `*` acepta cualquier origen; si no, lista separada por comas. Los
/// orígenes que no son cabeceras válidas se descartan con un aviso.
fn cors_layer(origins: &str) -> CorsLayer {
  let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
  if origins.trim() == "*" {
    return base.allow_origin(Any);
  }
  let list: Vec<HeaderValue> = origins.split(',')
                                      .map(str::trim)
                                      .filter(|o| !o.is_empty())
                                      .filter_map(|o| match HeaderValue::from_str(o) {
                                        Ok(v) => Some(v),
                                        Err(_) => {
                                          tracing::warn!("origen CORS inválido ignorado: {}", o);
                                          None
                                        }
                                      })
                                      .collect();
  base.allow_origin(AllowOrigin::list(list))
}

async fn not_found() -> impl IntoResponse {
  (StatusCode::NOT_FOUND, Json(json!({ "ok": false, "error": "Not found" })))
}

pub fn router(state: AppState) -> Router {
  let cors = cors_layer(&state.settings.cors_origin);
  let body_limit = state.settings.body_limit_bytes;

  Router::new().route("/api/health", get(health::health))
               .route("/api/settings", get(health::settings))
               .route("/api/users", post(users::ensure_user))
               .route("/api/users/:id", get(users::get_user))
               .route("/api/docs", get(docs::list).post(docs::create))
               .route("/api/docs/:id", get(docs::read).put(docs::update).delete(docs::delete))
               .route("/api/share/:doc_id", post(share::create))
               .route("/api/share/resolve/:token", get(share::resolve))
               .route("/api/specs", get(specs::list).post(specs::create))
               .route("/api/specs/:id", get(specs::read).patch(specs::update))
               .route("/api/specs/:id/compile", post(specs::compile))
               .route("/api/specs/:id/evaluate", post(specs::evaluate))
               .route("/api/specs/:id/compile-and-evaluate", post(specs::compile_and_evaluate))
               .route("/api/specs/:id/evaluations", get(specs::evaluations))
               .route("/api/question-sessions", post(sessions::start))
               .route("/api/question-sessions/:id", get(sessions::read))
               .route("/api/question-sessions/:id/answer", post(sessions::answer))
               .route("/api/question-sessions/:id/finalize", post(sessions::finalize))
               .route("/api/question-sessions/:id/snapshot", post(sessions::snapshot))
               .route("/api/question-sessions/:id/snapshot/latest", get(sessions::latest_snapshot))
               .route("/api/question-sessions/:id/questions/:question_id/regenerate", post(sessions::regenerate))
               .route("/api/runs", get(runs::list).post(runs::create))
               .route("/api/runs/:id", get(runs::read))
               .route("/api/runs/:id/errors", get(runs::errors).post(runs::add_error))
               .route("/api/runs/:id/repair", post(runs::repair))
               .route("/api/runs/:id/outcomes", post(runs::outcome_check))
               .route("/api/enhancer/:mode", post(enhancer::enhance))
               .route("/api/outcome", post(outcome::generate))
               .route("/api/optimize", post(optimize::optimize))
               .fallback(not_found)
               .layer(DefaultBodyLimit::disable())
               .layer(RequestBodyLimitLayer::new(body_limit))
               .layer(cors)
               .layer(TraceLayer::new_for_http())
               .with_state(state)
}

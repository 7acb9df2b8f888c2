//! promptly: API HTTP de Promptly
//!
//! Expone sobre axum el asistente de preguntas, las specs y su compilación a
//! prompt, los runs con sus errores y planes de reparación, el enhancer, el
//! generador de resultados y el panel de optimización simulado. La lógica
//! vive en `promptly-workflow`; aquí solo se traducen peticiones y errores.

pub mod api;
pub mod config;
pub mod state;
pub mod telemetry;

pub use api::router;
pub use config::Settings;
pub use state::AppState;

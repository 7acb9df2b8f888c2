// telemetry.rs
//
// Inicialización de logs del servidor: tracing-subscriber con filtro por
// `RUST_LOG` (por defecto `info`) y puente para los registros del facade
// `log` que emiten los crates de librería.
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Instala el subscriber global. Llamarla dos veces no es un error: el
/// segundo intento se ignora.
pub fn init() {
  if let Err(e) = tracing_log::LogTracer::init() {
    eprintln!("no se pudo instalar el puente log -> tracing: {}", e);
  }
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
  let subscriber = tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(true));
  if tracing::subscriber::set_global_default(subscriber).is_err() {
    tracing::debug!("subscriber global ya instalado");
  }
}

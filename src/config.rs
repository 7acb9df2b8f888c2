// config.rs
//
// Configuración del servidor leída del entorno (con `.env` si existe). Las
// partes del proveedor y de los servicios se delegan en sus propios crates.
use promptly_persistence::DEFAULT_SQLITE_PATH;
use promptly_providers::ProviderConfig;
use promptly_workflow::WorkflowConfig;
use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_CORS_ORIGIN: &str = "*";
pub const DEFAULT_LINK_BASE: &str = "http://localhost:8080/share/";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub port: u16,
  pub bind_addr: String,
  pub app_env: String,
  pub database_url: String,
  /// `*` o una lista de orígenes separada por comas.
  pub cors_origin: String,
  /// Prefijo de las URLs de enlaces compartidos; el token se añade al final.
  pub link_base: String,
  pub body_limit_bytes: usize,
  pub provider: ProviderConfig,
  pub workflow: WorkflowConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self { port: DEFAULT_PORT,
           bind_addr: DEFAULT_BIND_ADDR.to_string(),
           app_env: DEFAULT_APP_ENV.to_string(),
           database_url: DEFAULT_SQLITE_PATH.to_string(),
           cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
           link_base: DEFAULT_LINK_BASE.to_string(),
           body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
           provider: ProviderConfig::default(),
           workflow: WorkflowConfig::default() }
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
  let raw = non_empty_var(key)?;
  match raw.parse() {
    Ok(v) => Some(v),
    Err(_) => {
      log::warn!("valor inválido para {}: {:?}; se usa el valor por defecto", key, raw);
      None
    }
  }
}

impl Settings {
  /// Lee `PORT`, `BIND_ADDR`, `APP_ENV`, `SQLITE_PATH`/`DATABASE_URL`,
  /// `CORS_ORIGIN`, `LINK_BASE` y `BODY_LIMIT_BYTES`, más la configuración
  /// del proveedor y de los servicios.
  pub fn from_env() -> Self {
    dotenvy::dotenv().ok();
    let defaults = Self::default();
    Self { port: parsed_var("PORT").unwrap_or(defaults.port),
           bind_addr: non_empty_var("BIND_ADDR").unwrap_or(defaults.bind_addr),
           app_env: non_empty_var("APP_ENV").unwrap_or(defaults.app_env),
           database_url: non_empty_var("SQLITE_PATH").or_else(|| non_empty_var("DATABASE_URL"))
                                                     .unwrap_or(defaults.database_url),
           cors_origin: non_empty_var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
           link_base: non_empty_var("LINK_BASE").unwrap_or(defaults.link_base),
           body_limit_bytes: parsed_var::<usize>("BODY_LIMIT_BYTES").filter(|n| *n > 0)
                                                                    .unwrap_or(defaults.body_limit_bytes),
           provider: ProviderConfig::from_env(),
           workflow: WorkflowConfig::from_env() }
  }

  pub fn listen_addr(&self) -> String {
    format!("{}:{}", self.bind_addr, self.port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_documented_values() {
    let s = Settings::default();
    assert_eq!(s.listen_addr(), "0.0.0.0:8080");
    assert_eq!(s.body_limit_bytes, 2_097_152);
    assert_eq!(s.database_url, "./data/app.db");
    assert!(s.provider.api_key.is_none());
  }
}

// connection.rs
//
// Pool r2d2 de conexiones SQLite compartido por los repositorios Diesel. Cada
// conexión nueva activa WAL, `busy_timeout` y claves foráneas.
use crate::PersistenceError;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;
use std::sync::Arc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Ruta por defecto cuando no hay `SQLITE_PATH` ni `DATABASE_URL`.
pub const DEFAULT_SQLITE_PATH: &str = "./data/app.db";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
        .map_err(diesel::r2d2::Error::QueryError)
  }
}

/// Base de datos abierta y migrada. Clonarla comparte el mismo pool.
#[derive(Clone)]
pub struct Database {
  pool: Arc<DbPool>,
}

impl Database {
  /// Abre (o crea) la base en `database_url` y aplica las migraciones
  /// pendientes. Crea el directorio padre si no existe.
  pub fn open(database_url: &str) -> Result<Self, PersistenceError> {
    if database_url.trim().is_empty() {
      return Err(PersistenceError::Config("database path is empty".into()));
    }
    ensure_parent_dir(database_url)?;
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder().max_size(4)
                              .connection_customizer(Box::new(SqlitePragmas))
                              .build(manager)
                              .map_err(|e| PersistenceError::Pool(e.to_string()))?;
    let db = Database { pool: Arc::new(pool) };
    db.run_migrations()?;
    log::info!("base de datos SQLite lista en {}", database_url);
    Ok(db)
  }

  /// Lee `SQLITE_PATH` (o `DATABASE_URL`) del entorno; por defecto
  /// `./data/app.db`.
  pub fn open_from_env() -> Result<Self, PersistenceError> {
    dotenvy::dotenv().ok();
    let url = std::env::var("SQLITE_PATH").or_else(|_| std::env::var("DATABASE_URL"))
                                          .unwrap_or_else(|_| DEFAULT_SQLITE_PATH.into());
    Self::open(&url)
  }

  fn run_migrations(&self) -> Result<(), PersistenceError> {
    let mut conn = self.pool.get().map_err(|e| PersistenceError::Pool(e.to_string()))?;
    let applied = conn.run_pending_migrations(MIGRATIONS)
                      .map_err(|e| PersistenceError::Migration(e.to_string()))?;
    if !applied.is_empty() {
      log::info!("migraciones aplicadas: {}", applied.len());
    }
    Ok(())
  }

  pub fn conn(&self) -> Result<DbConn, PersistenceError> {
    self.pool.get().map_err(|e| PersistenceError::Pool(e.to_string()))
  }
}

fn ensure_parent_dir(database_url: &str) -> Result<(), PersistenceError> {
  if database_url.starts_with("file:") || database_url == ":memory:" {
    return Ok(());
  }
  match Path::new(database_url).parent() {
    Some(dir) if !dir.as_os_str().is_empty() => {
      std::fs::create_dir_all(dir).map_err(|e| PersistenceError::Config(format!("{}: {}", dir.display(), e)))
    }
    _ => Ok(()),
  }
}

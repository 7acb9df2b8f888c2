use anyhow::Context;
use promptly::{router, telemetry, AppState, Settings};
use promptly_persistence::{Database, DieselDomainRepository, DieselWizardRepository};
use promptly_providers::ChatProvider;
use std::sync::Arc;

/// Servidor HTTP de Promptly.
///
/// Lee la configuración del entorno, abre la base SQLite (aplicando las
/// migraciones embebidas), construye el proveedor LLM y sirve la API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    telemetry::init();

    let db = Database::open(&settings.database_url)
        .with_context(|| format!("no se pudo abrir la base de datos {}", settings.database_url))?;
    let domain = Arc::new(DieselDomainRepository::new(db.clone()));
    let wizard = Arc::new(DieselWizardRepository::new(db));

    let provider = settings.provider.build().context("no se pudo construir el proveedor LLM")?;
    if provider.is_enabled() {
        tracing::info!("proveedor LLM activo, modelo por defecto {}", provider.default_model());
    } else {
        tracing::warn!("LLM deshabilitado: las rutas de IA responderán 503");
    }

    let addr = settings.listen_addr();
    let state = AppState::new(settings, domain, wizard, provider);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", addr))?;
    tracing::info!("Promptly escuchando en http://{}", addr);
    axum::serve(listener, app).await.context("el servidor terminó con error")?;
    Ok(())
}

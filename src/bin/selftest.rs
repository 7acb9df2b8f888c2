use anyhow::{bail, Context};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const REQUIRED_VARS: [&str; 1] = ["OPENAI_API_KEY"];

/// Comprobación rápida de un despliegue: variables obligatorias presentes y
/// `/api/health` respondiendo. Termina con código distinto de cero si algo
/// falla.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let missing: Vec<&str> = REQUIRED_VARS
        .iter()
        .copied()
        .filter(|k| env::var(k).map(|v| v.trim().is_empty()).unwrap_or(true))
        .collect();
    if missing.is_empty() {
        println!("[ok] variables de entorno");
    } else {
        println!("[fallo] faltan variables: {}", missing.join(", "));
    }

    let base = env::var("SELFTEST_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let url = format!("{}/api/health", base.trim_end_matches('/'));
    let health = check_health(&url).await;
    match &health {
        Ok(()) => println!("[ok] {}", url),
        Err(e) => println!("[fallo] {}: {:#}", url, e),
    }

    if !missing.is_empty() || health.is_err() {
        bail!("selftest fallido");
    }
    println!("selftest correcto");
    Ok(())
}

async fn check_health(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("no se pudo crear el cliente HTTP")?;
    let resp = client.get(url).send().await.context("petición fallida")?;
    if !resp.status().is_success() {
        bail!("estado HTTP {}", resp.status());
    }
    let body: serde_json::Value = resp.json().await.context("respuesta no es JSON")?;
    if body["ok"] != serde_json::Value::Bool(true) {
        bail!("respuesta inesperada: {}", body);
    }
    Ok(())
}

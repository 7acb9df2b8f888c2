#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use promptly::{router, AppState, Settings};
use promptly_domain::InMemoryDomainRepository;
use promptly_providers::{ChatProvider, DisabledProvider, ScriptedProvider};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tower::ServiceExt;
use wizard::InMemoryWizardRepository;

pub struct TestApp {
  pub router: Router,
  pub provider: Option<Arc<ScriptedProvider>>,
}

fn build(provider: Arc<dyn ChatProvider>, scripted: Option<Arc<ScriptedProvider>>) -> TestApp {
  let settings = Settings { link_base: "http://test/share/".into(), ..Settings::default() };
  let state = AppState::new(settings,
                            Arc::new(InMemoryDomainRepository::new()),
                            Arc::new(InMemoryWizardRepository::new()),
                            provider);
  TestApp { router: router(state), provider: scripted }
}

/// Aplicación con un proveedor que responde lo encolado.
pub fn scripted_app() -> TestApp {
  let provider = Arc::new(ScriptedProvider::new("gpt-test"));
  build(provider.clone(), Some(provider))
}

/// Aplicación sin clave de API.
pub fn disabled_app() -> TestApp {
  build(Arc::new(DisabledProvider::new("gpt-4.1-mini")), None)
}

impl TestApp {
  pub fn scripted(&self) -> &ScriptedProvider {
    self.provider.as_deref().expect("scripted provider")
  }

  pub async fn call(&self, method: Method, uri: &str, user: Option<&str>, body: Option<JsonValue>)
                    -> (StatusCode, JsonValue) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      req = req.header("x-user-id", user);
    }
    let body = match body {
      Some(v) => {
        req = req.header("content-type", "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    self.send(req.body(body).unwrap()).await
  }

  pub async fn send(&self, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = self.router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { JsonValue::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  pub async fn get(&self, uri: &str, user: Option<&str>) -> (StatusCode, JsonValue) {
    self.call(Method::GET, uri, user, None).await
  }

  pub async fn post(&self, uri: &str, user: Option<&str>, body: JsonValue) -> (StatusCode, JsonValue) {
    self.call(Method::POST, uri, user, Some(body)).await
  }

  /// Crea (o recupera) un usuario por email y devuelve su id.
  pub async fn user(&self, email: &str) -> String {
    let (status, body) = self.post("/api/users", None, json!({ "email": email })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["user"]["id"].as_str().unwrap().to_string()
  }
}

pub fn spec_body(title: &str) -> JsonValue {
  json!({
    "title": title,
    "kind": "webapp",
    "summary": "Recipes for everyone",
    "tech_stack": { "frontend": "react" },
    "spec": { "title": title, "features": ["search"] }
  })
}

use crate::domain_repository::{DomainRepository, InMemoryDomainRepository};
use crate::spec::{Spec, SpecInput};
use crate::{DomainError, DEMO_USER_ID};
use serde_json::json;

pub struct DomainStubs;

impl DomainStubs {
    /// Spec de ejemplo con campos suficientes para que el compilador emita
    /// bloques opcionales.
    pub fn sample_spec_input(title: &str) -> SpecInput {
        let spec = json!({
            "title": title,
            "project_goal": "Track personal reading habits",
            "actors": ["reader"],
            "requirements": ["add books", "mark as read"],
            "constraints": {"offline": true}
        });
        SpecInput { title: title.to_string(),
                    kind: Some("webapp".to_string()),
                    summary: Some("Reading tracker".to_string()),
                    tech_stack: None,
                    pages: None,
                    data_model: None,
                    constraints: None,
                    status: None,
                    spec: spec.as_object().cloned().unwrap_or_default() }
    }

    /// Repositorio en memoria con el usuario demo y una spec suya.
    pub fn sample_repo() -> Result<(InMemoryDomainRepository, Spec), DomainError> {
        let repo = InMemoryDomainRepository::new();
        let spec = Spec::create(DEMO_USER_ID, Self::sample_spec_input("Reading tracker"))?;
        let spec = repo.create_spec(spec)?;
        Ok((repo, spec))
    }
}

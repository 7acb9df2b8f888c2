use crate::compiler::CompiledPromptRecord;
use crate::doc::{Doc, Share};
use crate::evaluation::Evaluation;
use crate::outcome::{OutcomeCandidate, OutcomeRun};
use crate::run::{Run, RunError, RunFilter, RunStatus};
use crate::spec::{Spec, SpecFilter};
use crate::user::{normalize_email, User};
use crate::DomainError;
use serde_json::Value as JsonValue;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Trait que define las operaciones de persistencia del dominio: usuarios,
/// documentos, specs, prompts compilados, runs, evaluaciones y resultados.
pub trait DomainRepository: Send + Sync {
    /// Devuelve el usuario con ese email, creándolo si no existe.
    fn ensure_user(&self, email: &str) -> Result<User, DomainError>;
    fn get_user(&self, id: &str) -> Result<Option<User>, DomainError>;

    fn create_doc(&self, doc: Doc) -> Result<Doc, DomainError>;
    fn get_doc(&self, id: &str) -> Result<Option<Doc>, DomainError>;
    /// Documentos del propietario, el más reciente primero.
    fn list_docs(&self, owner_id: &str) -> Result<Vec<Doc>, DomainError>;
    fn update_doc(&self, doc: &Doc) -> Result<(), DomainError>;
    /// Elimina el documento y sus enlaces compartidos. Devuelve `false` si no
    /// existía o pertenece a otro usuario.
    fn delete_doc(&self, id: &str, owner_id: &str) -> Result<bool, DomainError>;

    fn create_share(&self, share: Share) -> Result<Share, DomainError>;
    fn get_share_by_token(&self, token: &str) -> Result<Option<Share>, DomainError>;

    fn create_spec(&self, spec: Spec) -> Result<Spec, DomainError>;
    fn get_spec(&self, id: &str) -> Result<Option<Spec>, DomainError>;
    fn update_spec(&self, spec: &Spec) -> Result<(), DomainError>;
    /// Página de specs que cumplen el filtro y el total sin paginar.
    fn list_specs(&self, filter: &SpecFilter) -> Result<(Vec<Spec>, i64), DomainError>;

    fn save_compiled_prompt(&self, record: CompiledPromptRecord) -> Result<CompiledPromptRecord, DomainError>;
    fn latest_compiled_prompt(&self, spec_id: &str) -> Result<Option<CompiledPromptRecord>, DomainError>;

    fn create_run(&self, run: Run) -> Result<Run, DomainError>;
    fn get_run(&self, id: &str) -> Result<Option<Run>, DomainError>;
    fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>, DomainError>;
    /// Guarda la salida cruda y marca el run como `success`.
    fn complete_run_success(&self, id: &str, raw_output: JsonValue) -> Result<(), DomainError>;
    fn set_run_status(&self, id: &str, status: RunStatus) -> Result<(), DomainError>;
    fn add_run_error(&self, error: RunError) -> Result<RunError, DomainError>;
    /// Errores del run en orden cronológico.
    fn list_run_errors(&self, run_id: &str) -> Result<Vec<RunError>, DomainError>;

    /// Marca el run como `failed` y registra exactamente un error.
    fn complete_run_failure(&self, id: &str, error_type: &str, details: &str, detected_by: &str) -> Result<RunError, DomainError> {
        self.set_run_status(id, RunStatus::Failed)?;
        self.add_run_error(RunError::new(id, error_type, details, detected_by))
    }

    fn save_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, DomainError>;
    /// Evaluaciones de la spec, la más reciente primero.
    fn list_evaluations(&self, spec_id: &str) -> Result<Vec<Evaluation>, DomainError>;

    fn save_outcome_run(&self, run: OutcomeRun) -> Result<OutcomeRun, DomainError>;
    fn get_outcome_run(&self, id: &str) -> Result<Option<OutcomeRun>, DomainError>;
    fn save_outcome_candidate(&self, candidate: OutcomeCandidate) -> Result<OutcomeCandidate, DomainError>;
    fn list_outcome_candidates(&self, outcome_run_id: &str) -> Result<Vec<OutcomeCandidate>, DomainError>;
}

/// Implementación en memoria para tests y desarrollo. Comprueba las mismas
/// referencias que las claves foráneas de SQLite.
pub struct InMemoryDomainRepository {
    users: Arc<Mutex<HashMap<String, User>>>,
    docs: Arc<Mutex<HashMap<String, Doc>>>,
    shares: Arc<Mutex<HashMap<String, Share>>>,
    specs: Arc<Mutex<HashMap<String, Spec>>>,
    compiled: Arc<Mutex<Vec<CompiledPromptRecord>>>,
    runs: Arc<Mutex<HashMap<String, Run>>>,
    run_errors: Arc<Mutex<Vec<RunError>>>,
    evaluations: Arc<Mutex<Vec<Evaluation>>>,
    outcome_runs: Arc<Mutex<HashMap<String, OutcomeRun>>>,
    outcome_candidates: Arc<Mutex<Vec<OutcomeCandidate>>>,
}

impl InMemoryDomainRepository {
    /// Repositorio vacío salvo por el usuario demo.
    pub fn new() -> Self {
        let mut users = HashMap::new();
        let demo = User::demo();
        users.insert(demo.id.clone(), demo);
        Self { users: Arc::new(Mutex::new(users)),
               docs: Arc::new(Mutex::new(HashMap::new())),
               shares: Arc::new(Mutex::new(HashMap::new())),
               specs: Arc::new(Mutex::new(HashMap::new())),
               compiled: Arc::new(Mutex::new(Vec::new())),
               runs: Arc::new(Mutex::new(HashMap::new())),
               run_errors: Arc::new(Mutex::new(Vec::new())),
               evaluations: Arc::new(Mutex::new(Vec::new())),
               outcome_runs: Arc::new(Mutex::new(HashMap::new())),
               outcome_candidates: Arc::new(Mutex::new(Vec::new())) }
    }

    // Helper to map poisoned mutex errors into DomainError
    fn lock_map<'a, T>(&'a self, m: &'a Mutex<T>, name: &str) -> Result<std::sync::MutexGuard<'a, T>, DomainError> {
        m.lock()
         .map_err(|e| DomainError::ExternalError(format!("Mutex '{}' poisoned: {}", name, e)))
    }

    fn require(found: bool, what: &str, id: &str) -> Result<(), DomainError> {
        if found {
            Ok(())
        } else {
            Err(DomainError::ValidationError(format!("FOREIGN KEY constraint failed: {} {} does not exist", what, id)))
        }
    }
}

impl DomainRepository for InMemoryDomainRepository {
    fn ensure_user(&self, email: &str) -> Result<User, DomainError> {
        let email = normalize_email(email)?;
        let mut users = self.lock_map(&self.users, "users")?;
        if let Some(existing) = users.values().find(|u| u.email == email) {
            return Ok(existing.clone());
        }
        let user = User::new(&email)?;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        let users = self.lock_map(&self.users, "users")?;
        Ok(users.get(id).cloned())
    }

    fn create_doc(&self, doc: Doc) -> Result<Doc, DomainError> {
        let exists = self.lock_map(&self.users, "users")?.contains_key(&doc.owner_id);
        Self::require(exists, "user", &doc.owner_id)?;
        let mut docs = self.lock_map(&self.docs, "docs")?;
        docs.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    fn get_doc(&self, id: &str) -> Result<Option<Doc>, DomainError> {
        let docs = self.lock_map(&self.docs, "docs")?;
        Ok(docs.get(id).cloned())
    }

    fn list_docs(&self, owner_id: &str) -> Result<Vec<Doc>, DomainError> {
        let docs = self.lock_map(&self.docs, "docs")?;
        let mut items: Vec<Doc> = docs.values().filter(|d| d.owner_id == owner_id).cloned().collect();
        items.sort_by_key(|d| Reverse(d.updated_at.clone()));
        Ok(items)
    }

    fn update_doc(&self, doc: &Doc) -> Result<(), DomainError> {
        let mut docs = self.lock_map(&self.docs, "docs")?;
        match docs.get_mut(&doc.id) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("Doc {}", doc.id))),
        }
    }

    fn delete_doc(&self, id: &str, owner_id: &str) -> Result<bool, DomainError> {
        let mut docs = self.lock_map(&self.docs, "docs")?;
        let owned = docs.get(id).map(|d| d.owner_id == owner_id).unwrap_or(false);
        if !owned {
            return Ok(false);
        }
        // primero los enlaces, luego el documento
        let mut shares = self.lock_map(&self.shares, "shares")?;
        shares.retain(|_, s| s.doc_id != id);
        docs.remove(id);
        Ok(true)
    }

    fn create_share(&self, share: Share) -> Result<Share, DomainError> {
        let exists = self.lock_map(&self.docs, "docs")?.contains_key(&share.doc_id);
        Self::require(exists, "doc", &share.doc_id)?;
        let mut shares = self.lock_map(&self.shares, "shares")?;
        shares.insert(share.id.clone(), share.clone());
        Ok(share)
    }

    fn get_share_by_token(&self, token: &str) -> Result<Option<Share>, DomainError> {
        let shares = self.lock_map(&self.shares, "shares")?;
        Ok(shares.values().find(|s| s.token == token).cloned())
    }

    fn create_spec(&self, spec: Spec) -> Result<Spec, DomainError> {
        let exists = self.lock_map(&self.users, "users")?.contains_key(&spec.owner_id);
        Self::require(exists, "user", &spec.owner_id)?;
        let mut specs = self.lock_map(&self.specs, "specs")?;
        specs.insert(spec.id.clone(), spec.clone());
        Ok(spec)
    }

    fn get_spec(&self, id: &str) -> Result<Option<Spec>, DomainError> {
        let specs = self.lock_map(&self.specs, "specs")?;
        Ok(specs.get(id).cloned())
    }

    fn update_spec(&self, spec: &Spec) -> Result<(), DomainError> {
        let mut specs = self.lock_map(&self.specs, "specs")?;
        match specs.get_mut(&spec.id) {
            Some(slot) => {
                *slot = spec.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("Spec {}", spec.id))),
        }
    }

    fn list_specs(&self, filter: &SpecFilter) -> Result<(Vec<Spec>, i64), DomainError> {
        let specs = self.lock_map(&self.specs, "specs")?;
        let mut items: Vec<Spec> = specs.values().filter(|s| filter.matches(s)).cloned().collect();
        items.sort_by_key(|s| Reverse(s.updated_at.clone()));
        let total = items.len() as i64;
        let page = items.into_iter()
                        .skip(filter.offset.max(0) as usize)
                        .take(filter.limit.max(0) as usize)
                        .collect();
        Ok((page, total))
    }

    fn save_compiled_prompt(&self, record: CompiledPromptRecord) -> Result<CompiledPromptRecord, DomainError> {
        let exists = self.lock_map(&self.specs, "specs")?.contains_key(&record.spec_id);
        Self::require(exists, "spec", &record.spec_id)?;
        let mut compiled = self.lock_map(&self.compiled, "compiled_prompts")?;
        compiled.push(record.clone());
        Ok(record)
    }

    fn latest_compiled_prompt(&self, spec_id: &str) -> Result<Option<CompiledPromptRecord>, DomainError> {
        let compiled = self.lock_map(&self.compiled, "compiled_prompts")?;
        // a igual marca de tiempo gana el último insertado
        Ok(compiled.iter()
                   .filter(|c| c.spec_id == spec_id)
                   .fold(None::<&CompiledPromptRecord>, |acc, c| match acc {
                       Some(best) if best.created_at > c.created_at => Some(best),
                       _ => Some(c),
                   })
                   .cloned())
    }

    fn create_run(&self, run: Run) -> Result<Run, DomainError> {
        let mut runs = self.lock_map(&self.runs, "runs")?;
        runs.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    fn get_run(&self, id: &str) -> Result<Option<Run>, DomainError> {
        let runs = self.lock_map(&self.runs, "runs")?;
        Ok(runs.get(id).cloned())
    }

    fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>, DomainError> {
        let runs = self.lock_map(&self.runs, "runs")?;
        let mut items: Vec<Run> = runs.values().filter(|r| filter.matches(r)).cloned().collect();
        items.sort_by_key(|r| Reverse(r.created_at.clone()));
        items.truncate(filter.limit.max(0) as usize);
        Ok(items)
    }

    fn complete_run_success(&self, id: &str, raw_output: JsonValue) -> Result<(), DomainError> {
        let mut runs = self.lock_map(&self.runs, "runs")?;
        if let Some(run) = runs.get_mut(id) {
            run.raw_output = Some(raw_output);
            run.status = RunStatus::Success;
        }
        Ok(())
    }

    fn set_run_status(&self, id: &str, status: RunStatus) -> Result<(), DomainError> {
        let mut runs = self.lock_map(&self.runs, "runs")?;
        if let Some(run) = runs.get_mut(id) {
            run.status = status;
        }
        Ok(())
    }

    fn add_run_error(&self, error: RunError) -> Result<RunError, DomainError> {
        let exists = self.lock_map(&self.runs, "runs")?.contains_key(&error.run_id);
        Self::require(exists, "run", &error.run_id)?;
        let mut errors = self.lock_map(&self.run_errors, "run_errors")?;
        errors.push(error.clone());
        Ok(error)
    }

    fn list_run_errors(&self, run_id: &str) -> Result<Vec<RunError>, DomainError> {
        let errors = self.lock_map(&self.run_errors, "run_errors")?;
        let mut items: Vec<RunError> = errors.iter().filter(|e| e.run_id == run_id).cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    fn save_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, DomainError> {
        let spec_exists = self.lock_map(&self.specs, "specs")?.contains_key(&evaluation.spec_id);
        Self::require(spec_exists, "spec", &evaluation.spec_id)?;
        let cp_exists = self.lock_map(&self.compiled, "compiled_prompts")?
                            .iter()
                            .any(|c| c.id == evaluation.compiled_prompt_id);
        Self::require(cp_exists, "compiled prompt", &evaluation.compiled_prompt_id)?;
        let mut evaluations = self.lock_map(&self.evaluations, "evaluations")?;
        evaluations.push(evaluation.clone());
        Ok(evaluation)
    }

    fn list_evaluations(&self, spec_id: &str) -> Result<Vec<Evaluation>, DomainError> {
        let evaluations = self.lock_map(&self.evaluations, "evaluations")?;
        let mut items: Vec<Evaluation> = evaluations.iter().filter(|e| e.spec_id == spec_id).cloned().collect();
        items.reverse();
        items.sort_by_key(|e| Reverse(e.created_at.clone()));
        Ok(items)
    }

    fn save_outcome_run(&self, run: OutcomeRun) -> Result<OutcomeRun, DomainError> {
        let mut outcome_runs = self.lock_map(&self.outcome_runs, "outcome_runs")?;
        outcome_runs.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    fn get_outcome_run(&self, id: &str) -> Result<Option<OutcomeRun>, DomainError> {
        let outcome_runs = self.lock_map(&self.outcome_runs, "outcome_runs")?;
        Ok(outcome_runs.get(id).cloned())
    }

    fn save_outcome_candidate(&self, candidate: OutcomeCandidate) -> Result<OutcomeCandidate, DomainError> {
        let exists = self.lock_map(&self.outcome_runs, "outcome_runs")?.contains_key(&candidate.outcome_run_id);
        Self::require(exists, "outcome run", &candidate.outcome_run_id)?;
        let mut candidates = self.lock_map(&self.outcome_candidates, "outcome_candidates")?;
        candidates.push(candidate.clone());
        Ok(candidate)
    }

    fn list_outcome_candidates(&self, outcome_run_id: &str) -> Result<Vec<OutcomeCandidate>, DomainError> {
        let candidates = self.lock_map(&self.outcome_candidates, "outcome_candidates")?;
        let mut items: Vec<OutcomeCandidate> = candidates.iter()
                                                         .filter(|c| c.outcome_run_id == outcome_run_id)
                                                         .cloned()
                                                         .collect();
        items.sort_by_key(|c| c.candidate_index);
        Ok(items)
    }
}

impl Default for InMemoryDomainRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutex_poisoning_returns_error() {
        use std::thread;

        let repo = InMemoryDomainRepository::new();

        // Envenenar el mutex de specs haciendo panic con el lock tomado
        let specs_arc = repo.specs.clone();
        let handle = thread::spawn(move || {
            let _g = specs_arc.lock().unwrap();
            panic!("force poison");
        });
        let _ = handle.join();

        let res = repo.get_spec("spec_x");
        match res {
            Err(crate::DomainError::ExternalError(_)) => (),
            other => panic!("expected ExternalError, got {:?}", other),
        }
    }

    #[test]
    fn demo_user_is_seeded() -> Result<(), DomainError> {
        let repo = InMemoryDomainRepository::new();
        assert!(repo.get_user(crate::DEMO_USER_ID)?.is_some());
        Ok(())
    }
}

use crate::connection::{Database, DbConn};
use crate::schema;
use crate::schema::compiled_prompts::dsl as cp_dsl;
use crate::schema::docs::dsl as docs_dsl;
use crate::schema::evaluations::dsl as eval_dsl;
use crate::schema::outcome_candidates::dsl as cand_dsl;
use crate::schema::outcome_runs::dsl as outcome_dsl;
use crate::schema::run_errors::dsl as re_dsl;
use crate::schema::runs::dsl as runs_dsl;
use crate::schema::shares::dsl as shares_dsl;
use crate::schema::specs::dsl as specs_dsl;
use crate::schema::users::dsl as users_dsl;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;
use promptly_domain::{normalize_email, CompiledPromptRecord, Doc, DomainError, DomainRepository, Evaluation,
                      OutcomeCandidate, OutcomeRun, PromptBlock, Run, RunError, RunFilter, RunStatus, Share, Spec,
                      SpecFilter, SpecStatus, User};
use serde_json::Value as JsonValue;

/// Repo Diesel (SQLite) que implementa `DomainRepository`.
#[derive(Clone)]
pub struct DieselDomainRepository {
  db: Database,
}

impl DieselDomainRepository {
  pub fn new(db: Database) -> Self {
    Self { db }
  }

  fn conn(&self) -> Result<DbConn, DomainError> {
    Ok(self.db.conn()?)
  }
}

fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T, DomainError> {
  res.map_err(|e| match e {
       DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
         DomainError::ValidationError(info.message().to_string())
       }
       DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
         DomainError::Conflict(info.message().to_string())
       }
       other => DomainError::ExternalError(format!("db: {}", other)),
     })
}

fn json_text(v: &JsonValue) -> Result<String, DomainError> {
  Ok(serde_json::to_string(v)?)
}

fn opt_json_text(v: Option<&JsonValue>) -> Result<Option<String>, DomainError> {
  v.map(json_text).transpose()
}

/// El texto guardado que no sea JSON válido se devuelve como cadena.
fn parse_json(raw: &str) -> JsonValue {
  serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn parse_opt_json(raw: Option<String>) -> Option<JsonValue> {
  raw.as_deref().map(parse_json)
}

// Filas Diesel
#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::users, check_for_backend(Sqlite))]
struct UserRow {
  id: String,
  email: String,
  created_at: String,
}

impl From<UserRow> for User {
  fn from(r: UserRow) -> Self {
    User { id: r.id, email: r.email, created_at: r.created_at }
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::docs, check_for_backend(Sqlite))]
struct DocRow {
  id: String,
  owner_id: String,
  title: String,
  content: String,
  version: i64,
  created_at: String,
  updated_at: String,
}

impl From<&Doc> for DocRow {
  fn from(d: &Doc) -> Self {
    DocRow { id: d.id.clone(),
             owner_id: d.owner_id.clone(),
             title: d.title.clone(),
             content: d.content.clone(),
             version: d.version,
             created_at: d.created_at.clone(),
             updated_at: d.updated_at.clone() }
  }
}

impl From<DocRow> for Doc {
  fn from(r: DocRow) -> Self {
    Doc { id: r.id,
          owner_id: r.owner_id,
          title: r.title,
          content: r.content,
          version: r.version,
          created_at: r.created_at,
          updated_at: r.updated_at }
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::shares, check_for_backend(Sqlite))]
struct ShareRow {
  id: String,
  doc_id: String,
  token: String,
  mode: String,
  created_at: String,
  expires_at: Option<String>,
}

impl ShareRow {
  fn into_domain(self) -> Result<Share, DomainError> {
    Ok(Share { id: self.id,
               doc_id: self.doc_id,
               token: self.token,
               mode: self.mode.parse()?,
               created_at: self.created_at,
               expires_at: self.expires_at })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = schema::specs, check_for_backend(Sqlite), treat_none_as_null = true)]
struct SpecRow {
  id: String,
  owner_id: String,
  project_id: Option<String>,
  session_id: Option<String>,
  kind: Option<String>,
  title: String,
  summary: Option<String>,
  tech_stack: Option<String>,
  pages: Option<String>,
  data_model: Option<String>,
  constraints: Option<String>,
  spec_json: String,
  status: Option<String>,
  version: i64,
  created_at: String,
  updated_at: String,
}

impl SpecRow {
  fn from_domain(s: &Spec) -> Result<Self, DomainError> {
    Ok(SpecRow { id: s.id.clone(),
                 owner_id: s.owner_id.clone(),
                 project_id: s.project_id.clone(),
                 session_id: s.session_id.clone(),
                 kind: s.kind.clone(),
                 title: s.title.clone(),
                 summary: s.summary.clone(),
                 tech_stack: opt_json_text(s.tech_stack.as_ref())?,
                 pages: opt_json_text(s.pages.as_ref())?,
                 data_model: opt_json_text(s.data_model.as_ref())?,
                 constraints: opt_json_text(s.constraints.as_ref())?,
                 spec_json: json_text(&s.spec)?,
                 status: Some(s.status.as_str().to_string()),
                 version: s.version,
                 created_at: s.created_at.clone(),
                 updated_at: s.updated_at.clone() })
  }

  fn into_domain(self) -> Result<Spec, DomainError> {
    let status = match self.status.as_deref() {
      Some(raw) => raw.parse()?,
      None => SpecStatus::default(),
    };
    Ok(Spec { id: self.id,
              owner_id: self.owner_id,
              project_id: self.project_id,
              session_id: self.session_id,
              kind: self.kind,
              title: self.title,
              summary: self.summary,
              tech_stack: parse_opt_json(self.tech_stack),
              pages: parse_opt_json(self.pages),
              data_model: parse_opt_json(self.data_model),
              constraints: parse_opt_json(self.constraints),
              spec: parse_json(&self.spec_json),
              status,
              version: self.version,
              created_at: self.created_at,
              updated_at: self.updated_at })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::compiled_prompts, check_for_backend(Sqlite))]
struct CompiledPromptRow {
  id: String,
  spec_id: String,
  compiled_json: String,
  explanation: Option<String>,
  created_at: String,
}

impl CompiledPromptRow {
  fn into_domain(self) -> Result<CompiledPromptRecord, DomainError> {
    let blocks: Vec<PromptBlock> = serde_json::from_str(&self.compiled_json)?;
    Ok(CompiledPromptRecord { id: self.id,
                              spec_id: self.spec_id,
                              blocks,
                              explanation: self.explanation,
                              created_at: self.created_at })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::runs, check_for_backend(Sqlite))]
struct RunRow {
  id: String,
  spec_id: Option<String>,
  spec_version: Option<String>,
  model: Option<String>,
  status: String,
  input_blocks: Option<String>,
  raw_output: Option<String>,
  created_at: String,
}

impl RunRow {
  fn from_domain(r: &Run) -> Result<Self, DomainError> {
    Ok(RunRow { id: r.id.clone(),
                spec_id: r.spec_id.clone(),
                spec_version: r.spec_version.clone(),
                model: r.model.clone(),
                status: r.status.as_str().to_string(),
                input_blocks: opt_json_text(r.input_blocks.as_ref())?,
                raw_output: opt_json_text(r.raw_output.as_ref())?,
                created_at: r.created_at.clone() })
  }

  fn into_domain(self) -> Result<Run, DomainError> {
    Ok(Run { id: self.id,
             spec_id: self.spec_id,
             spec_version: self.spec_version,
             model: self.model,
             status: self.status.parse()?,
             input_blocks: parse_opt_json(self.input_blocks),
             raw_output: parse_opt_json(self.raw_output),
             created_at: self.created_at })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::run_errors, check_for_backend(Sqlite))]
struct RunErrorRow {
  id: String,
  run_id: String,
  error_type: Option<String>,
  details: Option<String>,
  detected_by: Option<String>,
  created_at: String,
}

impl From<&RunError> for RunErrorRow {
  fn from(e: &RunError) -> Self {
    RunErrorRow { id: e.id.clone(),
                  run_id: e.run_id.clone(),
                  error_type: Some(e.error_type.clone()),
                  details: Some(e.details.clone()),
                  detected_by: Some(e.detected_by.clone()),
                  created_at: e.created_at.clone() }
  }
}

impl From<RunErrorRow> for RunError {
  fn from(r: RunErrorRow) -> Self {
    RunError { id: r.id,
               run_id: r.run_id,
               error_type: r.error_type.unwrap_or_default(),
               details: r.details.unwrap_or_default(),
               detected_by: r.detected_by.unwrap_or_default(),
               created_at: r.created_at }
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::evaluations, check_for_backend(Sqlite))]
struct EvaluationRow {
  id: String,
  spec_id: String,
  compiled_prompt_id: String,
  run_id: Option<String>,
  model: Option<String>,
  score: Option<f64>,
  verdict: Option<String>,
  summary: Option<String>,
  details: Option<String>,
  created_at: String,
}

impl EvaluationRow {
  fn from_domain(e: &Evaluation) -> Result<Self, DomainError> {
    Ok(EvaluationRow { id: e.id.clone(),
                       spec_id: e.spec_id.clone(),
                       compiled_prompt_id: e.compiled_prompt_id.clone(),
                       run_id: e.run_id.clone(),
                       model: Some(e.model.clone()),
                       score: Some(e.score),
                       verdict: Some(e.verdict.clone()),
                       summary: Some(e.summary.clone()),
                       details: Some(json_text(&e.details)?),
                       created_at: e.created_at.clone() })
  }
}

impl From<EvaluationRow> for Evaluation {
  fn from(r: EvaluationRow) -> Self {
    Evaluation { id: r.id,
                 spec_id: r.spec_id,
                 compiled_prompt_id: r.compiled_prompt_id,
                 run_id: r.run_id,
                 model: r.model.unwrap_or_default(),
                 score: r.score.unwrap_or(0.0),
                 verdict: r.verdict.unwrap_or_default(),
                 summary: r.summary.unwrap_or_default(),
                 details: parse_opt_json(r.details).unwrap_or(JsonValue::Null),
                 created_at: r.created_at }
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::outcome_runs, check_for_backend(Sqlite))]
struct OutcomeRunRow {
  id: String,
  spec_id: Option<String>,
  run_id: Option<String>,
  task: String,
  input: Option<String>,
  style: Option<String>,
  constraints: Option<String>,
  n: i64,
  model: Option<String>,
  status: String,
  best_candidate_id: Option<String>,
  request_json: Option<String>,
  result_json: Option<String>,
  created_at: String,
}

impl OutcomeRunRow {
  fn from_domain(r: &OutcomeRun) -> Result<Self, DomainError> {
    Ok(OutcomeRunRow { id: r.id.clone(),
                       spec_id: r.spec_id.clone(),
                       run_id: r.run_id.clone(),
                       task: r.task.clone(),
                       input: r.input.clone(),
                       style: r.style.clone(),
                       constraints: r.constraints.clone(),
                       n: r.n,
                       model: r.model.clone(),
                       status: r.status.clone(),
                       best_candidate_id: r.best_candidate_id.clone(),
                       request_json: Some(json_text(&r.request)?),
                       result_json: Some(json_text(&r.result)?),
                       created_at: r.created_at.clone() })
  }
  fn into_domain(self) -> OutcomeRun {
    OutcomeRun { id: self.id,
                 spec_id: self.spec_id,
                 run_id: self.run_id,
                 task: self.task,
                 input: self.input,
                 style: self.style,
                 constraints: self.constraints,
                 n: self.n,
                 model: self.model,
                 status: self.status,
                 best_candidate_id: self.best_candidate_id,
                 request: parse_opt_json(self.request_json).unwrap_or(JsonValue::Null),
                 result: parse_opt_json(self.result_json).unwrap_or(JsonValue::Null),
                 created_at: self.created_at }
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::outcome_candidates, check_for_backend(Sqlite))]
struct OutcomeCandidateRow {
  id: String,
  outcome_run_id: String,
  candidate_index: i64,
  content: String,
  llm_score: Option<f64>,
  final_score: Option<f64>,
  tests_passed: Option<bool>,
  tests_json: Option<String>,
  created_at: String,
}

impl OutcomeCandidateRow {
  fn from_domain(c: &OutcomeCandidate) -> Result<Self, DomainError> {
    Ok(OutcomeCandidateRow { id: c.id.clone(),
                             outcome_run_id: c.outcome_run_id.clone(),
                             candidate_index: c.candidate_index,
                             content: c.content.clone(),
                             llm_score: c.llm_score,
                             final_score: c.final_score,
                             tests_passed: c.tests_passed,
                             tests_json: Some(json_text(&c.tests)?),
                             created_at: c.created_at.clone() })
  }
}

impl From<OutcomeCandidateRow> for OutcomeCandidate {
  fn from(r: OutcomeCandidateRow) -> Self {
    OutcomeCandidate { id: r.id,
                       outcome_run_id: r.outcome_run_id,
                       candidate_index: r.candidate_index,
                       content: r.content,
                       llm_score: r.llm_score,
                       final_score: r.final_score,
                       tests_passed: r.tests_passed,
                       tests: parse_opt_json(r.tests_json).unwrap_or(JsonValue::Null),
                       created_at: r.created_at }
  }
}

fn escape_like(term: &str) -> String {
  let mut out = String::with_capacity(term.len());
  for c in term.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// Consulta de specs con los filtros aplicados, sin orden ni paginación.
fn filtered_specs(filter: &SpecFilter) -> schema::specs::BoxedQuery<'static, Sqlite> {
  let mut query = specs_dsl::specs.filter(specs_dsl::owner_id.eq(filter.owner_id.clone()))
                                  .into_boxed();
  if let Some(p) = &filter.project_id {
    query = query.filter(specs_dsl::project_id.eq(p.clone()));
  }
  if let Some(s) = &filter.status {
    query = query.filter(specs_dsl::status.eq(s.clone()));
  }
  if let Some(k) = &filter.kind {
    query = query.filter(specs_dsl::kind.eq(k.clone()));
  }
  if let Some(term) = filter.search_term() {
    // LIKE en SQLite ignora mayúsculas solo para ASCII; `%` y `_` del término
    // se buscan literalmente.
    let pattern = format!("%{}%", escape_like(term));
    query = query.filter(specs_dsl::title
                           .like(pattern.clone())
                           .escape('\\')
                           .or(specs_dsl::summary.like(pattern).escape('\\')));
  }
  query
}

impl DomainRepository for DieselDomainRepository {
  fn ensure_user(&self, email: &str) -> Result<User, DomainError> {
    let email = normalize_email(email)?;
    let mut conn = self.conn()?;
    let find = |conn: &mut DbConn| {
      map_db_err(users_dsl::users.filter(users_dsl::email.eq(&email))
                                 .select(UserRow::as_select())
                                 .first(conn)
                                 .optional())
    };
    if let Some(existing) = find(&mut conn)? {
      return Ok(existing.into());
    }
    let user = User::new(&email)?;
    let row = UserRow { id: user.id.clone(), email: user.email.clone(), created_at: user.created_at.clone() };
    match map_db_err(diesel::insert_into(users_dsl::users).values(&row).execute(&mut conn)) {
      Ok(_) => Ok(user),
      // otro proceso lo creó entre la consulta y el insert
      Err(DomainError::Conflict(_)) => find(&mut conn)?.map(User::from)
                                                       .ok_or_else(|| DomainError::NotFound(format!("User {}", email))),
      Err(e) => Err(e),
    }
  }

  fn get_user(&self, id: &str) -> Result<Option<User>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(users_dsl::users.find(id).select(UserRow::as_select()).first(&mut conn).optional())?;
    Ok(row.map(User::from))
  }

  fn create_doc(&self, doc: Doc) -> Result<Doc, DomainError> {
    let mut conn = self.conn()?;
    map_db_err(diesel::insert_into(docs_dsl::docs).values(DocRow::from(&doc)).execute(&mut conn))?;
    Ok(doc)
  }

  fn get_doc(&self, id: &str) -> Result<Option<Doc>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(docs_dsl::docs.find(id).select(DocRow::as_select()).first(&mut conn).optional())?;
    Ok(row.map(Doc::from))
  }

  fn list_docs(&self, owner_id: &str) -> Result<Vec<Doc>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(docs_dsl::docs.filter(docs_dsl::owner_id.eq(owner_id))
                                        .order(docs_dsl::updated_at.desc())
                                        .select(DocRow::as_select())
                                        .load(&mut conn))?;
    Ok(rows.into_iter().map(Doc::from).collect())
  }

  fn update_doc(&self, doc: &Doc) -> Result<(), DomainError> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::update(docs_dsl::docs.find(&doc.id)).set((docs_dsl::title.eq(&doc.title),
                                                                          docs_dsl::content.eq(&doc.content),
                                                                          docs_dsl::version.eq(doc.version),
                                                                          docs_dsl::updated_at.eq(&doc.updated_at)))
                                                                    .execute(&mut conn))?;
    if n == 0 {
      return Err(DomainError::NotFound(format!("Doc {}", doc.id)));
    }
    Ok(())
  }

  fn delete_doc(&self, id: &str, owner_id: &str) -> Result<bool, DomainError> {
    let mut conn = self.conn()?;
    map_db_err(conn.transaction::<bool, DieselError, _>(|conn| {
                     let owned = docs_dsl::docs.filter(docs_dsl::id.eq(id).and(docs_dsl::owner_id.eq(owner_id)))
                                               .count()
                                               .get_result::<i64>(conn)?;
                     if owned == 0 {
                       return Ok(false);
                     }
                     diesel::delete(shares_dsl::shares.filter(shares_dsl::doc_id.eq(id))).execute(conn)?;
                     diesel::delete(docs_dsl::docs.find(id)).execute(conn)?;
                     Ok(true)
                   }))
  }

  fn create_share(&self, share: Share) -> Result<Share, DomainError> {
    let mut conn = self.conn()?;
    let row = ShareRow { id: share.id.clone(),
                         doc_id: share.doc_id.clone(),
                         token: share.token.clone(),
                         mode: share.mode.as_str().to_string(),
                         created_at: share.created_at.clone(),
                         expires_at: share.expires_at.clone() };
    map_db_err(diesel::insert_into(shares_dsl::shares).values(&row).execute(&mut conn))?;
    Ok(share)
  }

  fn get_share_by_token(&self, token: &str) -> Result<Option<Share>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(shares_dsl::shares.filter(shares_dsl::token.eq(token))
                                           .select(ShareRow::as_select())
                                           .first(&mut conn)
                                           .optional())?;
    row.map(ShareRow::into_domain).transpose()
  }

  fn create_spec(&self, spec: Spec) -> Result<Spec, DomainError> {
    let mut conn = self.conn()?;
    let row = SpecRow::from_domain(&spec)?;
    map_db_err(diesel::insert_into(specs_dsl::specs).values(&row).execute(&mut conn))?;
    Ok(spec)
  }

  fn get_spec(&self, id: &str) -> Result<Option<Spec>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(specs_dsl::specs.find(id).select(SpecRow::as_select()).first(&mut conn).optional())?;
    row.map(SpecRow::into_domain).transpose()
  }

  fn update_spec(&self, spec: &Spec) -> Result<(), DomainError> {
    let mut conn = self.conn()?;
    let row = SpecRow::from_domain(spec)?;
    let n = map_db_err(diesel::update(specs_dsl::specs.find(&spec.id)).set(&row).execute(&mut conn))?;
    if n == 0 {
      return Err(DomainError::NotFound(format!("Spec {}", spec.id)));
    }
    Ok(())
  }

  fn list_specs(&self, filter: &SpecFilter) -> Result<(Vec<Spec>, i64), DomainError> {
    let mut conn = self.conn()?;
    let total = map_db_err(filtered_specs(filter).count().get_result::<i64>(&mut conn))?;
    let rows = map_db_err(filtered_specs(filter).order(specs_dsl::updated_at.desc())
                                                .limit(filter.limit.max(0))
                                                .offset(filter.offset.max(0))
                                                .select(SpecRow::as_select())
                                                .load(&mut conn))?;
    let items = rows.into_iter().map(SpecRow::into_domain).collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
  }

  fn save_compiled_prompt(&self, record: CompiledPromptRecord) -> Result<CompiledPromptRecord, DomainError> {
    let mut conn = self.conn()?;
    let row = CompiledPromptRow { id: record.id.clone(),
                                  spec_id: record.spec_id.clone(),
                                  compiled_json: serde_json::to_string(&record.blocks)?,
                                  explanation: record.explanation.clone(),
                                  created_at: record.created_at.clone() };
    map_db_err(diesel::insert_into(cp_dsl::compiled_prompts).values(&row).execute(&mut conn))?;
    Ok(record)
  }

  fn latest_compiled_prompt(&self, spec_id: &str) -> Result<Option<CompiledPromptRecord>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(cp_dsl::compiled_prompts.filter(cp_dsl::spec_id.eq(spec_id))
                                                 .order(cp_dsl::created_at.desc())
                                                 .then_order_by(sql::<BigInt>("rowid DESC"))
                                                 .select(CompiledPromptRow::as_select())
                                                 .first(&mut conn)
                                                 .optional())?;
    row.map(CompiledPromptRow::into_domain).transpose()
  }

  fn create_run(&self, run: Run) -> Result<Run, DomainError> {
    let mut conn = self.conn()?;
    let row = RunRow::from_domain(&run)?;
    map_db_err(diesel::insert_into(runs_dsl::runs).values(&row).execute(&mut conn))?;
    Ok(run)
  }

  fn get_run(&self, id: &str) -> Result<Option<Run>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(runs_dsl::runs.find(id).select(RunRow::as_select()).first(&mut conn).optional())?;
    row.map(RunRow::into_domain).transpose()
  }

  fn list_runs(&self, filter: &RunFilter) -> Result<Vec<Run>, DomainError> {
    let mut conn = self.conn()?;
    let mut query = runs_dsl::runs.into_boxed();
    if let Some(spec_id) = &filter.spec_id {
      query = query.filter(runs_dsl::spec_id.eq(spec_id.clone()));
    }
    if let Some(status) = &filter.status {
      query = query.filter(runs_dsl::status.eq(status.clone()));
    }
    let rows = map_db_err(query.order(runs_dsl::created_at.desc())
                               .limit(filter.limit.max(0))
                               .select(RunRow::as_select())
                               .load(&mut conn))?;
    rows.into_iter().map(RunRow::into_domain).collect()
  }

  fn complete_run_success(&self, id: &str, raw_output: JsonValue) -> Result<(), DomainError> {
    let mut conn = self.conn()?;
    let text = json_text(&raw_output)?;
    map_db_err(diesel::update(runs_dsl::runs.find(id)).set((runs_dsl::raw_output.eq(Some(text)),
                                                            runs_dsl::status.eq(RunStatus::Success.as_str())))
                                                      .execute(&mut conn))?;
    Ok(())
  }

  fn set_run_status(&self, id: &str, status: RunStatus) -> Result<(), DomainError> {
    let mut conn = self.conn()?;
    map_db_err(diesel::update(runs_dsl::runs.find(id)).set(runs_dsl::status.eq(status.as_str()))
                                                      .execute(&mut conn))?;
    Ok(())
  }

  fn add_run_error(&self, error: RunError) -> Result<RunError, DomainError> {
    let mut conn = self.conn()?;
    map_db_err(diesel::insert_into(re_dsl::run_errors).values(RunErrorRow::from(&error)).execute(&mut conn))?;
    Ok(error)
  }

  fn list_run_errors(&self, run_id: &str) -> Result<Vec<RunError>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(re_dsl::run_errors.filter(re_dsl::run_id.eq(run_id))
                                            .order(re_dsl::created_at.asc())
                                            .then_order_by(sql::<BigInt>("rowid ASC"))
                                            .select(RunErrorRow::as_select())
                                            .load(&mut conn))?;
    Ok(rows.into_iter().map(RunError::from).collect())
  }

  fn save_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, DomainError> {
    let mut conn = self.conn()?;
    let row = EvaluationRow::from_domain(&evaluation)?;
    map_db_err(diesel::insert_into(eval_dsl::evaluations).values(&row).execute(&mut conn))?;
    Ok(evaluation)
  }

  fn list_evaluations(&self, spec_id: &str) -> Result<Vec<Evaluation>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(eval_dsl::evaluations.filter(eval_dsl::spec_id.eq(spec_id))
                                               .order(eval_dsl::created_at.desc())
                                               .then_order_by(sql::<BigInt>("rowid DESC"))
                                               .select(EvaluationRow::as_select())
                                               .load(&mut conn))?;
    Ok(rows.into_iter().map(Evaluation::from).collect())
  }

  fn save_outcome_run(&self, run: OutcomeRun) -> Result<OutcomeRun, DomainError> {
    let mut conn = self.conn()?;
    let row = OutcomeRunRow::from_domain(&run)?;
    map_db_err(diesel::insert_into(outcome_dsl::outcome_runs).values(&row).execute(&mut conn))?;
    Ok(run)
  }

  fn get_outcome_run(&self, id: &str) -> Result<Option<OutcomeRun>, DomainError> {
    let mut conn = self.conn()?;
    let row = map_db_err(outcome_dsl::outcome_runs.find(id)
                                                  .select(OutcomeRunRow::as_select())
                                                  .first(&mut conn)
                                                  .optional())?;
    Ok(row.map(OutcomeRunRow::into_domain))
  }

  fn save_outcome_candidate(&self, candidate: OutcomeCandidate) -> Result<OutcomeCandidate, DomainError> {
    let mut conn = self.conn()?;
    let row = OutcomeCandidateRow::from_domain(&candidate)?;
    map_db_err(diesel::insert_into(cand_dsl::outcome_candidates).values(&row).execute(&mut conn))?;
    Ok(candidate)
  }

  fn list_outcome_candidates(&self, outcome_run_id: &str) -> Result<Vec<OutcomeCandidate>, DomainError> {
    let mut conn = self.conn()?;
    let rows = map_db_err(cand_dsl::outcome_candidates.filter(cand_dsl::outcome_run_id.eq(outcome_run_id))
                                                      .order(cand_dsl::candidate_index.asc())
                                                      .select(OutcomeCandidateRow::as_select())
                                                      .load(&mut conn))?;
    Ok(rows.into_iter().map(OutcomeCandidate::from).collect())
  }
}

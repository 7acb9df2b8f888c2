// Repositorio Diesel de las sesiones del asistente de preguntas.
use crate::connection::{Database, DbConn};
use crate::schema;
use crate::schema::question_actions::dsl as act_dsl;
use crate::schema::question_answers::dsl as ans_dsl;
use crate::schema::question_questions::dsl as qq_dsl;
use crate::schema::question_sessions::dsl as qs_dsl;
use crate::schema::question_snapshots::dsl as snap_dsl;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;
use serde_json::Value as JsonValue;
use wizard::errors::Result;
use wizard::{now_ts, Answer, Question, QuestionOption, QuestionSession, SessionAction, SessionSnapshot, SessionStatus,
             WizardError, WizardRepository};

#[derive(Clone)]
pub struct DieselWizardRepository {
  db: Database,
}

impl DieselWizardRepository {
  pub fn new(db: Database) -> Self {
    Self { db }
  }

  fn conn(&self) -> Result<DbConn> {
    Ok(self.db.conn()?)
  }
}

fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T> {
  res.map_err(|e| match e {
       DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
         WizardError::Conflict(info.message().to_string())
       }
       other => WizardError::Storage(format!("db: {}", other)),
     })
}

fn to_text<T: serde::Serialize>(v: &T) -> Result<String> {
  Ok(serde_json::to_string(v)?)
}

fn from_text(raw: Option<String>) -> Option<JsonValue> {
  raw.and_then(|s| serde_json::from_str(&s).ok())
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::question_sessions, check_for_backend(Sqlite))]
struct SessionRow {
  id: String,
  owner_id: Option<String>,
  initial_description: String,
  kind: Option<String>,
  status: String,
  intent_json: Option<String>,
  spec_json: Option<String>,
  compiled_prompt_json: Option<String>,
  explanation: Option<String>,
  created_at: String,
  updated_at: String,
}

impl SessionRow {
  fn from_domain(s: &QuestionSession) -> Result<Self> {
    Ok(SessionRow { id: s.id.clone(),
                    owner_id: s.owner_id.clone(),
                    initial_description: s.initial_description.clone(),
                    kind: s.kind.clone(),
                    status: s.status.as_str().to_string(),
                    intent_json: s.intent.as_ref().map(to_text).transpose()?,
                    spec_json: s.spec.as_ref().map(to_text).transpose()?,
                    compiled_prompt_json: s.compiled_prompt.as_ref().map(to_text).transpose()?,
                    explanation: s.explanation.clone(),
                    created_at: s.created_at.clone(),
                    updated_at: s.updated_at.clone() })
  }

  fn into_domain(self) -> Result<QuestionSession> {
    Ok(QuestionSession { id: self.id,
                         owner_id: self.owner_id,
                         initial_description: self.initial_description,
                         kind: self.kind,
                         status: self.status.parse()?,
                         intent: from_text(self.intent_json),
                         spec: from_text(self.spec_json),
                         compiled_prompt: from_text(self.compiled_prompt_json),
                         explanation: self.explanation,
                         created_at: self.created_at,
                         updated_at: self.updated_at })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::question_questions, check_for_backend(Sqlite))]
struct QuestionRow {
  id: String,
  session_id: String,
  question_type: String,
  content: String,
  options_json: Option<String>,
  order_index: i64,
}

impl QuestionRow {
  fn from_domain(q: &Question) -> Result<Self> {
    Ok(QuestionRow { id: q.id.clone(),
                     session_id: q.session_id.clone(),
                     question_type: q.question_type.as_str().to_string(),
                     content: q.content.clone(),
                     options_json: q.options.as_ref().map(to_text).transpose()?,
                     order_index: q.order_index })
  }

  fn into_domain(self) -> Result<Question> {
    let options = match self.options_json {
      Some(raw) => serde_json::from_str::<Option<Vec<QuestionOption>>>(&raw)?,
      None => None,
    };
    Ok(Question { id: self.id,
                  session_id: self.session_id,
                  question_type: self.question_type.parse()?,
                  content: self.content,
                  options,
                  order_index: self.order_index })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::question_answers, check_for_backend(Sqlite))]
struct AnswerRow {
  id: String,
  session_id: String,
  question_id: String,
  answer_json: String,
  created_at: String,
}

impl From<AnswerRow> for Answer {
  fn from(r: AnswerRow) -> Self {
    Answer { id: r.id,
             session_id: r.session_id,
             question_id: r.question_id,
             value: from_text(Some(r.answer_json)).unwrap_or(JsonValue::Null),
             created_at: r.created_at }
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::question_actions, check_for_backend(Sqlite))]
struct ActionRow {
  id: String,
  session_id: String,
  action: String,
  payload: Option<String>,
  created_at: String,
}

impl ActionRow {
  fn into_domain(self) -> Result<SessionAction> {
    Ok(SessionAction { id: self.id,
                       session_id: self.session_id,
                       action: self.action.parse()?,
                       payload: self.payload,
                       created_at: self.created_at })
  }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::question_snapshots, check_for_backend(Sqlite))]
struct SnapshotRow {
  id: String,
  session_id: String,
  snapshot_json: String,
  created_at: String,
}

impl WizardRepository for DieselWizardRepository {
  fn create_session(&self, session: &QuestionSession) -> Result<()> {
    let mut conn = self.conn()?;
    let row = SessionRow::from_domain(session)?;
    map_db_err(diesel::insert_into(qs_dsl::question_sessions).values(&row).execute(&mut conn))?;
    Ok(())
  }

  fn get_session(&self, session_id: &str) -> Result<Option<QuestionSession>> {
    let mut conn = self.conn()?;
    let row = map_db_err(qs_dsl::question_sessions.find(session_id)
                                                  .select(SessionRow::as_select())
                                                  .first(&mut conn)
                                                  .optional())?;
    row.map(SessionRow::into_domain).transpose()
  }

  fn set_status(&self, session_id: &str, status: SessionStatus) -> Result<()> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::update(qs_dsl::question_sessions.find(session_id)).set((qs_dsl::status.eq(status.as_str()),
                                                                                       qs_dsl::updated_at.eq(now_ts())))
                                                                                 .execute(&mut conn))?;
    if n == 0 {
      return Err(WizardError::NotFound("Session not found".into()));
    }
    Ok(())
  }

  fn complete_session(&self,
                      session_id: &str,
                      intent: Option<JsonValue>,
                      spec: JsonValue,
                      compiled_prompt: JsonValue,
                      explanation: Option<String>)
                      -> Result<()> {
    let mut conn = self.conn()?;
    let intent_text = intent.as_ref().map(to_text).transpose()?;
    let n = map_db_err(diesel::update(qs_dsl::question_sessions.find(session_id))
                         .set((qs_dsl::status.eq(SessionStatus::Completed.as_str()),
                               qs_dsl::intent_json.eq(intent_text),
                               qs_dsl::spec_json.eq(Some(to_text(&spec)?)),
                               qs_dsl::compiled_prompt_json.eq(Some(to_text(&compiled_prompt)?)),
                               qs_dsl::explanation.eq(explanation),
                               qs_dsl::updated_at.eq(now_ts())))
                         .execute(&mut conn))?;
    if n == 0 {
      return Err(WizardError::NotFound("Session not found".into()));
    }
    Ok(())
  }

  fn insert_question(&self, question: &Question) -> Result<()> {
    let mut conn = self.conn()?;
    let row = QuestionRow::from_domain(question)?;
    map_db_err(diesel::insert_into(qq_dsl::question_questions).values(&row).execute(&mut conn))?;
    Ok(())
  }

  fn get_question(&self, session_id: &str, question_id: &str) -> Result<Option<Question>> {
    let mut conn = self.conn()?;
    let row = map_db_err(qq_dsl::question_questions.filter(qq_dsl::id.eq(question_id)
                                                                     .and(qq_dsl::session_id.eq(session_id)))
                                                   .select(QuestionRow::as_select())
                                                   .first(&mut conn)
                                                   .optional())?;
    row.map(QuestionRow::into_domain).transpose()
  }

  fn list_questions(&self, session_id: &str) -> Result<Vec<Question>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(qq_dsl::question_questions.filter(qq_dsl::session_id.eq(session_id))
                                                    .order(qq_dsl::order_index.asc())
                                                    .then_order_by(sql::<BigInt>("rowid ASC"))
                                                    .select(QuestionRow::as_select())
                                                    .load(&mut conn))?;
    rows.into_iter().map(QuestionRow::into_domain).collect()
  }

  fn upsert_answer(&self, answer: &Answer) -> Result<()> {
    if self.get_question(&answer.session_id, &answer.question_id)?.is_none() {
      return Err(WizardError::Storage(format!("FOREIGN KEY constraint failed: question {}", answer.question_id)));
    }
    let mut conn = self.conn()?;
    let row = AnswerRow { id: answer.id.clone(),
                          session_id: answer.session_id.clone(),
                          question_id: answer.question_id.clone(),
                          answer_json: to_text(&answer.value)?,
                          created_at: answer.created_at.clone() };
    map_db_err(conn.transaction::<(), DieselError, _>(|conn| {
                     diesel::delete(ans_dsl::question_answers.filter(ans_dsl::session_id.eq(&row.session_id)
                                                                                        .and(ans_dsl::question_id.eq(&row.question_id))))
                       .execute(conn)?;
                     diesel::insert_into(ans_dsl::question_answers).values(&row).execute(conn)?;
                     Ok(())
                   }))
  }

  fn delete_answer(&self, session_id: &str, question_id: &str) -> Result<()> {
    let mut conn = self.conn()?;
    map_db_err(diesel::delete(ans_dsl::question_answers.filter(ans_dsl::session_id.eq(session_id)
                                                                                  .and(ans_dsl::question_id.eq(question_id))))
                 .execute(&mut conn))?;
    Ok(())
  }

  fn list_answers(&self, session_id: &str) -> Result<Vec<Answer>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(ans_dsl::question_answers.filter(ans_dsl::session_id.eq(session_id))
                                                   .order(sql::<BigInt>("rowid ASC"))
                                                   .select(AnswerRow::as_select())
                                                   .load(&mut conn))?;
    Ok(rows.into_iter().map(Answer::from).collect())
  }

  fn record_action(&self, action: &SessionAction) -> Result<()> {
    let mut conn = self.conn()?;
    let row = ActionRow { id: action.id.clone(),
                          session_id: action.session_id.clone(),
                          action: action.action.as_str().to_string(),
                          payload: action.payload.clone(),
                          created_at: action.created_at.clone() };
    map_db_err(diesel::insert_into(act_dsl::question_actions).values(&row).execute(&mut conn))?;
    Ok(())
  }

  fn list_actions(&self, session_id: &str) -> Result<Vec<SessionAction>> {
    let mut conn = self.conn()?;
    let rows = map_db_err(act_dsl::question_actions.filter(act_dsl::session_id.eq(session_id))
                                                   .order(sql::<BigInt>("rowid ASC"))
                                                   .select(ActionRow::as_select())
                                                   .load(&mut conn))?;
    rows.into_iter().map(ActionRow::into_domain).collect()
  }

  fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
    let mut conn = self.conn()?;
    let row = SnapshotRow { id: snapshot.id.clone(),
                            session_id: snapshot.session_id.clone(),
                            snapshot_json: to_text(&snapshot.snapshot)?,
                            created_at: snapshot.created_at.clone() };
    map_db_err(diesel::insert_into(snap_dsl::question_snapshots).values(&row).execute(&mut conn))?;
    Ok(())
  }

  fn load_latest_snapshot(&self, session_id: &str) -> Result<Option<SessionSnapshot>> {
    let mut conn = self.conn()?;
    let row = map_db_err(snap_dsl::question_snapshots.filter(snap_dsl::session_id.eq(session_id))
                                                     .order(sql::<BigInt>("rowid DESC"))
                                                     .select(SnapshotRow::as_select())
                                                     .first(&mut conn)
                                                     .optional())?;
    Ok(row.map(|r| SessionSnapshot { id: r.id,
                                     session_id: r.session_id,
                                     snapshot: from_text(Some(r.snapshot_json)).unwrap_or(JsonValue::Null),
                                     created_at: r.created_at }))
  }
}

//! Pipeline controller: generate, validate, execute, then (maybe) explain.
//!
//! `process_query` never fails. Stage errors and stage panics end up in
//! `AgentState::error`, and `timing["total"]` is always recorded.

use crate::agent::execution::execute_sql;
use crate::agent::explanation::explain_results;
use crate::agent::generation::generate_sql;
use crate::agent::routing::{route, Route};
use crate::agent::state::{AgentState, Stage};
use crate::agent::validation::validate_sql;
use crate::config::AgentConfig;
use crate::db::{lazy_pool, Database, PgDatabase};
use crate::error::{AgentError, Result};
use crate::llm::{LanguageModel, LlmClient};
use crate::schema::SCHEMA_DESCRIPTION;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const EMPTY_QUERY_MESSAGE: &str = "query is empty";

pub struct SqlAgent<L, D> {
    llm: Arc<L>,
    db: Arc<D>,
    schema: Arc<str>,
}

impl<L, D> Clone for SqlAgent<L, D> {
    fn clone(&self) -> Self {
        Self {
            llm: Arc::clone(&self.llm),
            db: Arc::clone(&self.db),
            schema: Arc::clone(&self.schema),
        }
    }
}

impl SqlAgent<LlmClient, PgDatabase> {
    /// OpenAI-compatible model plus a lazily connecting PostgreSQL pool.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let llm = LlmClient::from_config(&config.llm)?;
        let pool = lazy_pool(&config.database)?;
        info!("Using model {}", llm.model());
        Ok(Self::new(Arc::new(llm), Arc::new(PgDatabase::new(pool))))
    }
}

impl<L, D> SqlAgent<L, D>
where
    L: LanguageModel + 'static,
    D: Database + 'static,
{
    pub fn new(llm: Arc<L>, db: Arc<D>) -> Self {
        Self {
            llm,
            db,
            schema: Arc::from(SCHEMA_DESCRIPTION),
        }
    }

    /// Replace the schema description given to the model.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Arc::from(schema.into());
        self
    }

    pub async fn process_query(&self, nl_text: &str) -> AgentState {
        let span = info_span!("process_query", request_id = %Uuid::new_v4());
        self.run(nl_text).instrument(span).await
    }

    async fn run(&self, nl_text: &str) -> AgentState {
        info!("Processing query: '{}'", nl_text);
        let started = Instant::now();
        let mut state = AgentState::new(nl_text);

        if nl_text.trim().is_empty() {
            warn!("Rejecting empty query");
            state.error = Some(EMPTY_QUERY_MESSAGE.to_string());
        } else {
            self.run_stages(&mut state).await;
        }

        let total = started.elapsed().as_secs_f64();
        state.record_total(total);

        match state.error {
            Some(ref e) => warn!("Query finished with error in {:.2}s: {}", total, e),
            None => info!("Query processed successfully in {:.2}s", total),
        }
        state
    }

    async fn run_stages(&self, state: &mut AgentState) {
        self.generate(state).await;
        self.validate(state).await;

        // Rejected SQL never reaches the database
        if state.is_valid() {
            self.execute(state).await;
        } else {
            info!("Skipping execution of rejected SQL");
        }

        if route(state) == Route::Explain {
            self.explain(state).await;
        }
    }

    async fn generate(&self, state: &mut AgentState) {
        let started = Instant::now();
        let llm = Arc::clone(&self.llm);
        let schema = Arc::clone(&self.schema);
        let query = state.query.clone();

        let outcome = run_guarded(Stage::GenerateSql, async move {
            generate_sql(&*llm, &query, &schema).await
        })
        .await;

        match outcome {
            Ok(generation) => {
                state.sql = generation.sql;
                state.explanation = generation.explanation;
                state.transcript.extend(generation.transcript);
            }
            Err(e) => {
                error!("SQL generation failed: {}", e);
                state.error = Some(e.to_string());
            }
        }
        state.record_timing(Stage::GenerateSql, started.elapsed().as_secs_f64());
    }

    async fn validate(&self, state: &mut AgentState) {
        let started = Instant::now();
        let sql = state.sql.clone();

        let outcome = run_guarded(Stage::ValidateSql, async move { Ok(validate_sql(&sql)) }).await;

        match outcome {
            Ok(validation) => {
                if !validation.is_valid {
                    state.error =
                        Some(AgentError::Validation(validation.message.clone()).to_string());
                }
                state.validation = Some(validation);
            }
            Err(e) => state.error = Some(e.to_string()),
        }
        state.record_timing(Stage::ValidateSql, started.elapsed().as_secs_f64());
    }

    async fn execute(&self, state: &mut AgentState) {
        let started = Instant::now();
        let db = Arc::clone(&self.db);
        let sql = state.sql.clone();

        let outcome =
            run_guarded(Stage::ExecuteSql, async move { execute_sql(&*db, &sql).await }).await;

        match outcome {
            Ok(rows) => {
                state.results = Some(rows);
                state.error = None;
            }
            // Nothing ran, so earlier results stay as they were
            Err(e @ AgentError::Connection(_)) => state.error = Some(e.to_string()),
            Err(e) => {
                state.results = None;
                state.error = Some(e.to_string());
            }
        }
        state.record_timing(Stage::ExecuteSql, started.elapsed().as_secs_f64());
    }

    async fn explain(&self, state: &mut AgentState) {
        let started = Instant::now();
        let llm = Arc::clone(&self.llm);
        let sql = state.sql.clone();
        let results = state.results.clone();

        let outcome = run_guarded(Stage::ExplainResults, async move {
            explain_results(&*llm, &sql, results.as_deref()).await
        })
        .await;

        match outcome {
            Ok(Some(narration)) => {
                state.result_explanation = Some(narration.text);
                state.transcript.extend(narration.transcript);
            }
            Ok(None) => {}
            // Earlier sql/results/explanation are kept
            Err(e) => {
                error!("Result explanation failed: {}", e);
                state.error = Some(e.to_string());
            }
        }
        state.record_timing(Stage::ExplainResults, started.elapsed().as_secs_f64());
    }
}

/// Run one stage on its own task so a panic inside it becomes an
/// [`AgentError::Internal`] instead of unwinding through the controller.
/// The controller awaits the task before doing anything else.
async fn run_guarded<T, F>(stage: Stage, stage_future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(stage_future.in_current_span()).await {
        Ok(outcome) => outcome,
        Err(join_error) => {
            let reason = if join_error.is_panic() {
                panic_message(join_error.into_panic())
            } else {
                join_error.to_string()
            };
            error!("{} stage aborted: {}", stage, reason);
            Err(AgentError::Internal(format!("{} stage aborted: {}", stage, reason)))
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

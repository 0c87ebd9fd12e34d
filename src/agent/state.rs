//! Request-scoped state threaded through the pipeline stages.

use crate::db::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    GenerateSql,
    ValidateSql,
    ExecuteSql,
    ExplainResults,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::GenerateSql => "generate_sql",
            Stage::ValidateSql => "validate_sql",
            Stage::ExecuteSql => "execute_sql",
            Stage::ExplainResults => "explain_results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const TOTAL_TIMING_KEY: &str = "total";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything known about one request. Built by the controller, returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub query: String,
    pub sql: String,
    pub validation: Option<Validation>,
    /// `None`: not computed or cleared by a failed execution. `Some(empty)`: zero rows.
    pub results: Option<Vec<Row>>,
    pub explanation: String,
    pub result_explanation: Option<String>,
    pub error: Option<String>,
    pub transcript: Vec<ChatTurn>,
    /// Seconds per stage, plus `total`.
    pub timing: BTreeMap<String, f64>,
}

impl AgentState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sql: String::new(),
            validation: None,
            results: None,
            explanation: String::new(),
            result_explanation: None,
            error: None,
            transcript: Vec::new(),
            timing: BTreeMap::new(),
        }
    }

    pub fn record_timing(&mut self, stage: Stage, seconds: f64) {
        self.timing.insert(stage.as_str().to_string(), seconds);
    }

    pub fn record_total(&mut self, seconds: f64) {
        self.timing.insert(TOTAL_TIMING_KEY.to_string(), seconds);
    }

    pub fn stage_seconds(&self, stage: Stage) -> Option<f64> {
        self.timing.get(stage.as_str()).copied()
    }

    pub fn total_seconds(&self) -> Option<f64> {
        self.timing.get(TOTAL_TIMING_KEY).copied()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.as_ref().map_or(false, |v| v.is_valid)
    }

    pub fn has_error(&self) -> bool {
        self.error.as_deref().map_or(false, |e| !e.is_empty())
    }

    pub fn row_count(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }
}

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod schema;

// Database module for PostgreSQL
pub mod db;

pub use agent::{AgentState, SqlAgent};
pub use error::{AgentError, Result};

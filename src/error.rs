use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("could not extract JSON from the model response")]
    GenerationParse,

    #[error("failed to generate SQL query: {0}")]
    Generation(String),

    #[error("{0}")]
    Validation(String),

    #[error("failed to connect to the database: {0}")]
    Connection(String),

    #[error("failed to execute query: {0}")]
    Execution(String),

    #[error("failed to explain results: {0}")]
    Explanation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("failed to process the request: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

//! SQL generation: natural-language question to `(sql, explanation)`.

use crate::agent::response::parse_sql_answer;
use crate::agent::state::ChatTurn;
use crate::error::{AgentError, Result};
use crate::llm::LanguageModel;
use crate::schema::RELATIONSHIPS;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Empty when the model answer could not be parsed.
    pub sql: String,
    pub explanation: String,
    pub transcript: Vec<ChatTurn>,
}

pub fn build_system_prompt(schema: &str) -> String {
    format!(
        r#"You are a PostgreSQL expert. Your task is to turn questions asked in natural language into valid SQL queries.

The database has the following schema:
{schema}

Relationships:
{relationships}

Guidelines:
1. Use the appropriate JOINs to relate the tables
2. Use aliases to improve readability (e.g. c for clientes)
3. Write read-only SELECT statements only
4. Optimize the queries for performance
5. Add explanatory SQL comments when needed
6. Give a clear explanation of what the query does
7. Do not use functions or syntax that PostgreSQL does not support
8. Always return meaningful, well-formatted results

Examples:
1. "Quais clientes compraram um Notebook?" joins clientes, transacoes and produtos, filtering products whose name contains "Notebook".
2. "Quanto cada cliente gastou no total?" groups transactions by customer and sums their totals.
3. "Quem tem saldo suficiente para comprar um Smartphone?" compares customer balances with smartphone prices.

Answer only with JSON in the following format:
{{"query": "the SQL query here", "explanation": "explanation of the query here"}}"#,
        schema = schema.trim(),
        relationships = RELATIONSHIPS,
    )
}

pub fn build_user_prompt(query: &str) -> String {
    format!("Generate a SQL query that answers the following question: '{}'", query)
}

/// Ask the model for SQL. An unparsable answer is not an error: it yields empty
/// SQL and a diagnostic explanation, which validation then rejects.
pub async fn generate_sql<L>(llm: &L, query: &str, schema: &str) -> Result<Generation>
where
    L: LanguageModel + ?Sized,
{
    info!("Generating SQL for query: '{}'", query);

    let system_prompt = build_system_prompt(schema);
    let user_prompt = build_user_prompt(query);

    debug!("Sending request to the language model");
    let content = llm
        .generate(&system_prompt, &user_prompt)
        .await
        .map_err(|e| AgentError::Generation(e.to_string()))?;

    let (sql, explanation) = match parse_sql_answer(&content) {
        Ok(answer) => (answer.query, answer.explanation),
        Err(e) => {
            warn!("Model answer is neither JSON nor a fenced JSON block");
            error!("{}", e);
            (String::new(), e.to_string())
        }
    };

    if !sql.is_empty() {
        info!("SQL generated: {}", preview(&sql));
    }

    Ok(Generation {
        sql,
        explanation,
        transcript: vec![
            ChatTurn::system(system_prompt),
            ChatTurn::user(user_prompt),
            ChatTurn::assistant(content),
        ],
    })
}

/// First 100 characters, for log lines.
pub(crate) fn preview(sql: &str) -> String {
    let mut chars = sql.chars();
    let head: String = chars.by_ref().take(100).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::state::Role;
    use crate::schema::SCHEMA_DESCRIPTION;
    use async_trait::async_trait;

    struct MockLlm(std::result::Result<String, String>);

    #[async_trait]
    impl LanguageModel for MockLlm {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
            self.0.clone().map_err(AgentError::Llm)
        }
    }

    #[test]
    fn test_system_prompt_carries_schema_and_format() {
        let prompt = build_system_prompt(SCHEMA_DESCRIPTION);
        assert!(prompt.contains("CREATE TABLE clientes"));
        assert!(prompt.contains("CREATE TABLE transacoes"));
        assert!(prompt.contains(RELATIONSHIPS));
        assert!(prompt.contains(r#"{"query": "#));
    }

    #[tokio::test]
    async fn test_generate_sql_from_raw_json() {
        let llm = MockLlm(Ok(
            r#"{"query": "SELECT nome FROM clientes", "explanation": "Customer names"}"#.to_string(),
        ));
        let generation = generate_sql(&llm, "Who are the customers?", SCHEMA_DESCRIPTION)
            .await
            .unwrap();

        assert_eq!(generation.sql, "SELECT nome FROM clientes");
        assert_eq!(generation.explanation, "Customer names");
        let roles: Vec<Role> = generation.transcript.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert!(generation.transcript[1].content.contains("Who are the customers?"));
    }

    #[tokio::test]
    async fn test_unparsable_answer_yields_placeholder() {
        let llm = MockLlm(Ok("I cannot help with that.".to_string()));
        let generation = generate_sql(&llm, "q", SCHEMA_DESCRIPTION).await.unwrap();

        assert!(generation.sql.is_empty());
        assert_eq!(generation.explanation, AgentError::GenerationParse.to_string());
        assert_eq!(generation.transcript.len(), 3);
        assert_eq!(generation.transcript[2].content, "I cannot help with that.");
    }

    #[tokio::test]
    async fn test_model_failure_is_generation_error() {
        let llm = MockLlm(Err("timeout".to_string()));
        let err = generate_sql(&llm, "q", SCHEMA_DESCRIPTION).await.unwrap_err();
        assert!(matches!(err, AgentError::Generation(_)));
        assert!(err.to_string().starts_with("failed to generate SQL query"));
    }

    #[test]
    fn test_preview_truncates_long_sql() {
        let long = "x".repeat(150);
        assert_eq!(preview(&long).len(), 103);
        assert_eq!(preview("SELECT 1"), "SELECT 1");
    }
}

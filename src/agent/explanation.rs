//! Narrates query results in natural language.

use crate::agent::state::ChatTurn;
use crate::db::Row;
use crate::error::{AgentError, Result};
use crate::llm::LanguageModel;
use tracing::{info, warn};

pub const SYSTEM_PROMPT: &str = "You are a data analysis and SQL expert. Your task is to explain the \
results of a SQL query clearly and concisely. Give insights about the data and explain what the \
results mean in the context of the original question. Be objective and direct.";

#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    pub text: String,
    pub transcript: Vec<ChatTurn>,
}

pub fn build_user_prompt(sql: &str, rows: &[Row]) -> Result<String> {
    let rendered = serde_json::to_string_pretty(rows)?;
    Ok(format!(
        "SQL query: {}\n\nResults (JSON):\n{}\n\nPlease explain these results clearly and concisely.",
        sql, rendered
    ))
}

/// `Ok(None)` when there are no results to explain.
pub async fn explain_results<L>(
    llm: &L,
    sql: &str,
    results: Option<&[Row]>,
) -> Result<Option<Narration>>
where
    L: LanguageModel + ?Sized,
{
    let rows = match results {
        Some(rows) => rows,
        None => {
            warn!("No results to explain");
            return Ok(None);
        }
    };

    info!("Explaining {} result rows", rows.len());

    let user_prompt =
        build_user_prompt(sql, rows).map_err(|e| AgentError::Explanation(e.to_string()))?;
    let text = llm
        .generate(SYSTEM_PROMPT, &user_prompt)
        .await
        .map_err(|e| AgentError::Explanation(e.to_string()))?;

    info!("Result explanation generated");
    Ok(Some(Narration {
        transcript: vec![
            ChatTurn::system(SYSTEM_PROMPT),
            ChatTurn::user(user_prompt),
            ChatTurn::assistant(text.clone()),
        ],
        text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingLlm {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for RecordingLlm {
        async fn generate(&self, _system: &str, user: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user.to_string());
            self.reply.clone().map_err(AgentError::Llm)
        }
    }

    fn rows() -> Vec<Row> {
        let mut row = Row::new();
        row.insert("nome".to_string(), json!("Daniel Santos"));
        vec![row]
    }

    #[tokio::test]
    async fn test_no_results_is_noop() {
        let llm = RecordingLlm {
            reply: Ok("x".into()),
            prompts: Mutex::new(vec![]),
        };
        let narration = explain_results(&llm, "SELECT 1", None).await.unwrap();
        assert!(narration.is_none());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_contains_sql_and_rows() {
        let llm = RecordingLlm {
            reply: Ok("Daniel bought a notebook.".into()),
            prompts: Mutex::new(vec![]),
        };
        let rows = rows();
        let narration = explain_results(&llm, "SELECT nome FROM clientes", Some(&rows))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(narration.text, "Daniel bought a notebook.");
        assert_eq!(narration.transcript.len(), 3);
        let prompt = &llm.prompts.lock().unwrap()[0];
        assert!(prompt.contains("SELECT nome FROM clientes"));
        assert!(prompt.contains("Daniel Santos"));
    }

    #[tokio::test]
    async fn test_model_failure_is_explanation_error() {
        let llm = RecordingLlm {
            reply: Err("rate limited".into()),
            prompts: Mutex::new(vec![]),
        };
        let rows = rows();
        let err = explain_results(&llm, "SELECT 1", Some(&rows)).await.unwrap_err();
        assert!(matches!(err, AgentError::Explanation(_)));
        assert!(err.to_string().contains("rate limited"));
    }
}

//! Parsing of the model's `{"query": ..., "explanation": ...}` answer.
//!
//! Two rules, tried in order: the whole response as JSON, then the contents of
//! each fenced code block. Anything else is [`AgentError::GenerationParse`].

use crate::error::{AgentError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("fenced block pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SqlAnswer {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub explanation: String,
}

pub fn parse_sql_answer(content: &str) -> Result<SqlAnswer> {
    if let Ok(answer) = serde_json::from_str::<SqlAnswer>(content.trim()) {
        return Ok(answer);
    }

    FENCED_BLOCK
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .find_map(|block| serde_json::from_str::<SqlAnswer>(block.as_str().trim()).ok())
        .ok_or(AgentError::GenerationParse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_raw_json() {
        let answer = parse_sql_answer(
            r#"{"query": "SELECT nome FROM clientes", "explanation": "Lists customers"}"#,
        )
        .unwrap();
        assert_eq!(answer.query, "SELECT nome FROM clientes");
        assert_eq!(answer.explanation, "Lists customers");
    }

    #[test]
    fn test_parses_json_fenced_block() {
        let content = "Here you go:\n```json\n{\"query\": \"SELECT 1\", \"explanation\": \"one\"}\n```\nDone.";
        let answer = parse_sql_answer(content).unwrap();
        assert_eq!(answer.query, "SELECT 1");
        assert_eq!(answer.explanation, "one");
    }

    #[test]
    fn test_parses_untagged_fence() {
        let content = "```\n{\"query\": \"SELECT 2\", \"explanation\": \"two\"}\n```";
        assert_eq!(parse_sql_answer(content).unwrap().query, "SELECT 2");
    }

    #[test]
    fn test_skips_fences_that_are_not_the_answer() {
        let content = "```sql\nSELECT 3\n```\n```json\n{\"query\": \"SELECT 3\", \"explanation\": \"three\"}\n```";
        assert_eq!(parse_sql_answer(content).unwrap().explanation, "three");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let answer = parse_sql_answer(r#"{"explanation": "no sql"}"#).unwrap();
        assert!(answer.query.is_empty());
    }

    #[test]
    fn test_unparsable_text_is_generation_parse_error() {
        let err = parse_sql_answer("SELECT * FROM clientes").unwrap_err();
        assert!(matches!(err, AgentError::GenerationParse));

        let err = parse_sql_answer("```json\nnot json\n```").unwrap_err();
        assert!(matches!(err, AgentError::GenerationParse));

        assert!(parse_sql_answer(r#""just a string""#).is_err());
    }
}

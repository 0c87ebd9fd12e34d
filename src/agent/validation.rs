//! Lexical safety screen for generated SQL.
//!
//! This is a substring deny-list, not a parser: a keyword inside a string
//! literal (`WHERE nome = 'Update Pro'`) is rejected too.

use crate::agent::generation::preview;
use crate::agent::state::Validation;
use tracing::{error, info, warn};

pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "TRUNCATE", "CREATE", "GRANT", "REVOKE",
];

pub const FORBIDDEN_MESSAGE: &str = "only SELECT queries are permitted";
pub const EMPTY_MESSAGE: &str = "generated SQL is empty";
pub const VALID_MESSAGE: &str = "query is valid";

/// First deny-listed keyword found anywhere in `sql`, ignoring case.
pub fn find_forbidden_keyword(sql: &str) -> Option<&'static str> {
    let upper = sql.to_uppercase();
    FORBIDDEN_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| upper.contains(keyword))
}

pub fn validate_sql(sql: &str) -> Validation {
    info!("Validating SQL: {}", preview(sql));

    let mut validation = Validation {
        is_valid: true,
        message: VALID_MESSAGE.to_string(),
    };

    if let Some(keyword) = find_forbidden_keyword(sql) {
        warn!("SQL contains forbidden keyword {}", keyword);
        validation = Validation {
            is_valid: false,
            message: FORBIDDEN_MESSAGE.to_string(),
        };
    }

    // Emptiness wins over the deny-list verdict
    if sql.trim().is_empty() {
        warn!("SQL is empty");
        validation = Validation {
            is_valid: false,
            message: EMPTY_MESSAGE.to_string(),
        };
    }

    if validation.is_valid {
        info!("SQL validated successfully");
    } else {
        error!("Validation failed: {}", validation.message);
    }

    validation
}

use crate::agent::state::AgentState;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Explain,
    Terminate,
}

/// Decide whether the results go on to be explained.
pub fn route(state: &AgentState) -> Route {
    debug!("Deciding next step");

    if state.sql.is_empty() {
        warn!("No SQL generated, terminating");
        return Route::Terminate;
    }

    if !state.is_valid() {
        warn!("Validation failed, terminating");
        return Route::Terminate;
    }

    if let Some(error) = state.error.as_deref().filter(|e| !e.is_empty()) {
        warn!("Error found: {}, terminating", error);
        return Route::Terminate;
    }

    if state.results.as_ref().map_or(true, Vec::is_empty) {
        warn!("No results, terminating");
        return Route::Terminate;
    }

    info!("Continuing to result explanation");
    Route::Explain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::state::Validation;
    use crate::db::Row;
    use serde_json::json;

    fn ready_state() -> AgentState {
        let mut row = Row::new();
        row.insert("id".to_string(), json!(1));
        row.insert("nome".to_string(), json!("Ana Silva"));

        let mut state = AgentState::new("List all customers");
        state.sql = "SELECT * FROM clientes".to_string();
        state.validation = Some(Validation {
            is_valid: true,
            message: "query is valid".to_string(),
        });
        state.results = Some(vec![row]);
        state.explanation = "Lists all customers".to_string();
        state
    }

    #[test]
    fn test_continue_when_everything_succeeded() {
        assert_eq!(route(&ready_state()), Route::Explain);
    }

    #[test]
    fn test_terminate_without_sql() {
        let mut state = ready_state();
        state.sql.clear();
        assert_eq!(route(&state), Route::Terminate);
    }

    #[test]
    fn test_terminate_on_invalid_or_missing_validation() {
        let mut state = ready_state();
        state.validation = Some(Validation {
            is_valid: false,
            message: "nope".to_string(),
        });
        assert_eq!(route(&state), Route::Terminate);

        state.validation = None;
        assert_eq!(route(&state), Route::Terminate);
    }

    #[test]
    fn test_terminate_on_error() {
        let mut state = ready_state();
        state.error = Some("failed to execute query".to_string());
        assert_eq!(route(&state), Route::Terminate);
    }

    #[test]
    fn test_terminate_on_absent_or_empty_results() {
        let mut state = ready_state();
        state.results = Some(vec![]);
        assert_eq!(route(&state), Route::Terminate);

        state.results = None;
        assert_eq!(route(&state), Route::Terminate);
    }

    #[test]
    fn test_route_does_not_modify_state() {
        let state = ready_state();
        let before = state.clone();
        let _ = route(&state);
        assert_eq!(state, before);
    }
}

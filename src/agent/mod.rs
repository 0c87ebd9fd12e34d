//! Natural-language to SQL request pipeline.

pub mod execution;
pub mod explanation;
pub mod generation;
pub mod pipeline;
pub mod response;
pub mod routing;
pub mod state;
pub mod validation;

pub use pipeline::SqlAgent;
pub use routing::{route, Route};
pub use state::{AgentState, ChatTurn, Role, Stage, Validation};

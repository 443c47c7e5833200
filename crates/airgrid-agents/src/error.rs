//! Error types for the `airgrid-agents` crate.

/// Errors that can occur when constructing agents or value functions.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A decay-based value function was configured with an unusable
    /// parameter. This is a programmer error caught at construction
    /// time, not a runtime condition to recover from.
    #[error("invalid value function: {reason}")]
    InvalidValueFunction {
        /// What is wrong with the configuration.
        reason: String,
    },
}

//! Error type shared by the loaders, the store and the drivers
//!
//! The projection engine, scenario generator and classifier never return
//! errors; they degrade to defined numeric defaults instead.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter violates the domain invariants
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("unknown business model: {0}")]
    UnknownModel(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("version {version} not found for simulation {simulation_id}")]
    VersionNotFound { simulation_id: String, version: u32 },

    /// Templates and scenarios must carry a name
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("at least 2 simulations are required for a comparison, got {0}")]
    NotEnoughSimulations(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        SimError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = SimError::invalid("marketShare", "must be within [0, 1], got 1.5");
        assert_eq!(
            err.to_string(),
            "invalid parameter `marketShare`: must be within [0, 1], got 1.5"
        );

        let err = SimError::not_found("simulation", "sim-000042");
        assert_eq!(err.to_string(), "simulation not found: sim-000042");
    }
}

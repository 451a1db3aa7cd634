use thiserror::Error;

/// Coarse classification of every error the engine surfaces.
/// Callers branch on this rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Upstream
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Raised by a collaborator (e.g. duplicate cohort membership), passed through unchanged
    #[error("conflict: {0}")]
    Conflict(String),

    /// The collaborator itself failed
    #[error("upstream failure: {0}")]
    Upstream(String)
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::Validation(_) => ErrorCategory::Validation,
            EngineError::NotFound { .. } => ErrorCategory::NotFound,
            EngineError::Conflict(_) => ErrorCategory::Conflict,
            EngineError::Upstream(_) => ErrorCategory::Upstream
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string()
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::Validation(ValidationError::InvalidField {
            field,
            reason: reason.into()
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("baseline rating for player {player_id} is already set")]
    BaselineAlreadySet { player_id: String },

    #[error("session '{name}' is not an initial training assessment")]
    NotAnAssessment { name: String },

    #[error("run {run_id} has no darts in any assessed segment")]
    NoAssessedSegments { run_id: String },

    #[error("no classification found for routine {routine_no}")]
    MissingRoutine { routine_no: i32 },

    #[error("routine {routine_no} step {step_no} has no step type")]
    MissingStepType { routine_no: i32, step_no: i32 },

    #[error("routine {routine_no} step {step_no} has unrecognized step type '{step_type}'")]
    UnrecognizedStepType {
        routine_no: i32,
        step_no: i32,
        step_type: String
    },

    #[error("routine {routine_no} mixes step types {first} and {second}")]
    MixedRoutineTypes {
        routine_no: i32,
        first: String,
        second: String
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_validation() {
        let err: EngineError = ValidationError::MissingRoutine { routine_no: 2 }.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_category_not_found() {
        assert_eq!(EngineError::not_found("player", 7).category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_upstream_passes_message_through() {
        let err = EngineError::Upstream("connection reset".to_string());
        assert_eq!(err.category(), ErrorCategory::Upstream);
        assert_eq!(err.to_string(), "upstream failure: connection reset");
    }

    #[test]
    fn test_unrecognized_step_type_message() {
        let err = ValidationError::UnrecognizedStepType {
            routine_no: 3,
            step_no: 1,
            step_type: "bullseye".to_string()
        };
        assert_eq!(
            err.to_string(),
            "routine 3 step 1 has unrecognized step type 'bullseye'"
        );
    }
}

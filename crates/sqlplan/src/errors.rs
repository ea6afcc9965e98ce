use sqlparser::parser::ParserError;
use sqlparser::tokenizer::TokenizerError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The grammar failed to parse the input.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A recognized statement shape that has no plan equivalent.
    #[error("unsupported syntax: {0}")]
    UnsupportedSyntax(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// A literal or option value that is malformed for where it appears.
    #[error("{0}")]
    InvalidValue(String),

    /// Input that violates a plan invariant, e.g. a nullable primary key.
    #[error("{0}")]
    Validation(String),

    /// A case that should never be reached.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlanError {
    pub fn unsupported_syntax(msg: impl Into<String>) -> Self {
        PlanError::UnsupportedSyntax(msg.into())
    }

    pub fn unsupported_feature(msg: impl Into<String>) -> Self {
        PlanError::UnsupportedFeature(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        PlanError::InvalidValue(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        PlanError::Validation(msg.into())
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        PlanError::Syntax(msg.into())
    }

    /// Returns true if this error indicates a defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, PlanError::Internal(_))
    }
}

impl From<ParserError> for PlanError {
    fn from(value: ParserError) -> Self {
        match value {
            ParserError::TokenizerError(msg) | ParserError::ParserError(msg) => {
                PlanError::Syntax(msg)
            }
            ParserError::RecursionLimitExceeded => {
                PlanError::Syntax("recursion limit exceeded".to_string())
            }
        }
    }
}

impl From<TokenizerError> for PlanError {
    fn from(value: TokenizerError) -> Self {
        PlanError::Syntax(value.to_string())
    }
}

pub type Result<T, E = PlanError> = std::result::Result<T, E>;

/// Build an internal error from format arguments.
macro_rules! internal {
    ($($arg:tt)*) => {
        $crate::errors::PlanError::Internal(std::format!($($arg)*))
    };
}
pub(crate) use internal;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_errors_are_syntax() {
        let err: PlanError = ParserError::ParserError("Expected: an expression".to_string()).into();
        assert_eq!(PlanError::Syntax("Expected: an expression".to_string()), err);
        assert!(!err.is_internal());
    }

    #[test]
    fn internal_macro() {
        let err = internal!("unknown privilege {}", 3);
        assert!(err.is_internal());
        assert_eq!("internal error: unknown privilege 3", err.to_string());
    }
}

use thiserror::Error;

/// Error type for the calcplot crate.
///
/// Every failure is scoped to the single request that produced it; nothing
/// in the crate keeps state that an error could leave half-updated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Bad sampling interval or sample count
    #[error("InvalidRange: {0}")]
    InvalidRange(String),
    /// Syntax outside the supported grammar, or a name outside the registry
    #[error("InvalidExpression: {0}")]
    InvalidExpression(String),
    /// Argument outside the domain of a function (log, sqrt, ...)
    #[error("DomainError: {0}")]
    DomainError(String),
    /// Division by zero
    #[error("DivisionByZero: division by zero")]
    DivisionByZero,
    /// Result too large to represent
    #[error("Overflow: {0}")]
    Overflow(String),
    /// CSV coercion failure or empty filtered data
    #[error("DataFormatError: {0}")]
    DataFormatError(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::DataFormatError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::DataFormatError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DataFormatError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn messages() {
        assert_eq!(
            Error::DivisionByZero.to_string(),
            "DivisionByZero: division by zero"
        );
        assert_eq!(
            Error::InvalidExpression("unknown name 'y'".into()).to_string(),
            "InvalidExpression: unknown name 'y'"
        );
    }

    #[test]
    fn io_errors_are_data_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        assert!(matches!(Error::from(io), Error::DataFormatError(_)));
    }
}

use std::fmt;

/// Structural engine failure (encoding, programming-contract breakage).
///
/// Insufficient project data is never an `EngineError`: it is a `Skip`
/// outcome carried in the evaluation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError(pub String);

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine error: {}", self.0)
    }
}

impl std::error::Error for EngineError {}

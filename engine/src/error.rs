//! Engine error types.

use thiserror::Error;

/// Errors the engine can report. Cancellation is not an error (see `simulate`,
/// which returns `Ok(None)` instead).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The caller's `SimulationInput` violates its input contract.
    #[error("invalid simulation input: {0}")]
    InvalidInput(String),

    /// An internal invariant was violated (empty shoe before reshuffle, an
    /// advisor call returning no action, split depth exceeding the bound).
    /// These are unreachable under a correct implementation and exist so a
    /// bug surfaces as a typed error rather than a panic.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

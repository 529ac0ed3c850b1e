//! Error types for quantum-number operations

use thiserror::Error;

use crate::quantum_number::Period;
use crate::sequence::SortForm;

/// Result type for quantum-number operations
pub type Result<T> = std::result::Result<T, QuantumNumberError>;

/// Errors that can occur when building or combining quantum numbers and sequences
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantumNumberError {
    /// Operands carry a different number of components (or signs)
    #[error("Arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// The same component carries different periods in the two operands
    #[error("Incompatible period for component {component}: {left} vs {right}")]
    IncompatiblePeriod {
        component: usize,
        left: Period,
        right: Period,
    },

    /// Operands belong to different quantum-number families
    #[error("Incompatible quantum-number types: {left} vs {right}")]
    IncompatibleType { left: String, right: String },

    /// Boundary or count array does not describe a valid block layout
    #[error("Invalid sequence layout: {0}")]
    InvalidSequenceLayout(String),

    /// Contents do not satisfy the declared sort form
    #[error("Contents violate the {form} form: {reason}")]
    FormViolation { form: SortForm, reason: String },

    /// Block index or flat position out of range
    #[error("Index {index} out of bounds [0, {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// An operation needs at least one operand
    #[error("At least one operand must be given")]
    EmptyOperands,

    /// A product operand repeats a value, so its provenance would be ambiguous
    #[error("Operand {operand} of a product has repeated values")]
    RepeatedFactorValue { operand: usize },

    /// Enumeration requested over a component without a finite period
    #[error("Component {component} has an unbounded period and cannot be enumerated")]
    UnboundedComponent { component: usize },

    /// An unbounded component left the `i64` range
    #[error("Component {component} overflows the integer range")]
    ComponentOverflow { component: usize },

    /// Periods must be positive
    #[error("Period must be positive, got {0}")]
    InvalidPeriod(i64),

    /// Signs must be +1 or -1
    #[error("Sign must be +1 or -1, got {0}")]
    InvalidSign(i64),
}

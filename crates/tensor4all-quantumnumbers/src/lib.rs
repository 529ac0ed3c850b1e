//! Abelian quantum numbers and compressed quantum-number sequences.
//!
//! This crate provides the bookkeeping of conserved quantities used to index
//! block-structured tensors (e.g. particle-number or momentum conserving
//! tensor networks).
//!
//! # Overview
//!
//! - [`QuantumNumber`]: a fixed-arity integer tuple whose components have
//!   finite or unbounded [`Period`]s, described by a shared [`QnDescriptor`]
//! - [`Momenta`]: enumeration of every value of a finite family, with a dense
//!   mixed-radix index
//! - [`AbelianNumberSequence`]: a long ordered multiset of quantum numbers
//!   stored as `(value, range)` blocks, tagged with a [`SortForm`]
//! - Sequence algebra: [`AbelianNumberSequence::sort`], `filter`, `permute`,
//!   `find_all`, and the free functions [`union`], [`kron`] and [`prod`]
//! - [`decompose`]: bounded search for position tuples whose signed sum hits
//!   a target
//!
//! Indices are 0-based and ranges are half-open throughout.
//!
//! # Quick Start
//!
//! ```
//! use tensor4all_quantumnumbers::{
//!     prod, AbelianNumberSequence, Period, QnDescriptor, QuantumNumber, Sign,
//! };
//!
//! // A spin-1/2 site: Sz = -1/2, +1/2 in units of 1/2
//! let sz = QnDescriptor::new("Sz", &[("Sz", Period::Unbounded)]).unwrap();
//! let site = AbelianNumberSequence::from_count_pairs(vec![
//!     (QuantumNumber::new(&sz, &[-1]).unwrap(), 1),
//!     (QuantumNumber::new(&sz, &[1]).unwrap(), 1),
//! ])
//! .unwrap();
//!
//! // Two sites: the total-Sz sectors -1, 0, +1 with multiplicities 1, 2, 1
//! let (pair, records) = prod(&[&site, &site], &[Sign::Plus, Sign::Plus]).unwrap();
//! assert_eq!(pair.to_string(), "QNS(3, 4)");
//! assert_eq!(pair.count(1), 2);
//!
//! // The zero sector is filled by (down, up) then (up, down)
//! let zero = QuantumNumber::zero(&sz);
//! let sources: Vec<_> = records[&zero].values().cloned().collect();
//! assert_eq!(sources, vec![1..2, 2..3]);
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`] with [`QuantumNumberError`]:
//!
//! ```
//! use tensor4all_quantumnumbers::{QnDescriptor, QuantumNumber, QuantumNumberError};
//!
//! let a = QuantumNumber::new(&QnDescriptor::cyclic(4).unwrap(), &[1]).unwrap();
//! let b = QuantumNumber::new(&QnDescriptor::charge(), &[1]).unwrap();
//! assert!(matches!(a.try_add(&b), Err(QuantumNumberError::IncompatiblePeriod { .. })));
//! ```
//!
//! # Logging
//!
//! Diagnostics are emitted through `tracing`; the crate never installs a
//! subscriber.

mod algebra;
mod decompose;
mod error;
mod momenta;
mod quantum_number;
mod sequence;
mod space;

pub use algebra::{kron, prod, union, ProductRecord};
pub use decompose::{decompose, DecomposeMethod, DecomposeOptions};
pub use error::{QuantumNumberError, Result};
pub use momenta::{Momenta, MomentaIter};
pub use quantum_number::{Period, QnDescriptor, QuantumNumber, Sign};
pub use sequence::{AbelianNumberSequence, SortForm, View};
pub use space::Symmetry;

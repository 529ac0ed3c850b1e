//! Abelian quantum numbers
//!
//! A quantum number is a fixed-arity tuple of integers. Each component has a
//! [`Period`]: finite components live in `[0, p)` and wrap around, unbounded
//! components are plain integers. The arity, component names and periods form
//! a [`QnDescriptor`] which every value carries by reference.

use std::fmt;
use std::ops::{Mul, Neg};
use std::sync::Arc;

use crate::error::{QuantumNumberError, Result};

/// Period of one quantum-number component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    /// Component is reduced modulo the given positive integer.
    Finite(i64),
    /// Component is an unbounded integer (non-compact symmetry).
    Unbounded,
}

impl Period {
    /// Create a finite period, rejecting non-positive values.
    pub fn finite(period: i64) -> Result<Self> {
        if period <= 0 {
            return Err(QuantumNumberError::InvalidPeriod(period));
        }
        Ok(Period::Finite(period))
    }

    /// Returns true for finite periods.
    #[inline]
    pub fn is_finite(self) -> bool {
        matches!(self, Period::Finite(_))
    }

    /// Map an integer onto the component's lattice.
    #[inline]
    pub fn wrap(self, value: i64) -> i64 {
        match self {
            Period::Finite(p) => value.rem_euclid(p),
            Period::Unbounded => value,
        }
    }

    /// Map a real value onto the component's lattice.
    ///
    /// Values are rounded to the nearest integer, then wrapped for finite periods.
    #[inline]
    pub fn regularize(self, value: f64) -> i64 {
        self.wrap(value.round() as i64)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Finite(p) => write!(f, "{p}"),
            Period::Unbounded => write!(f, "inf"),
        }
    }
}

/// Static description of a quantum-number family.
///
/// Two quantum numbers can only be combined when their descriptors agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QnDescriptor {
    name: String,
    component_names: Vec<String>,
    periods: Vec<Period>,
}

impl QnDescriptor {
    /// Create a descriptor from a family name and `(component, period)` pairs.
    ///
    /// # Example
    /// ```
    /// use tensor4all_quantumnumbers::{Period, QnDescriptor};
    ///
    /// let desc = QnDescriptor::new("ParticleMomentum", &[
    ///     ("N", Period::Unbounded),
    ///     ("k", Period::finite(4).unwrap()),
    /// ])
    /// .unwrap();
    /// assert_eq!(desc.arity(), 2);
    /// ```
    pub fn new(name: &str, components: &[(&str, Period)]) -> Result<Arc<Self>> {
        for &(_, period) in components {
            if let Period::Finite(p) = period {
                if p <= 0 {
                    return Err(QuantumNumberError::InvalidPeriod(p));
                }
            }
        }
        Ok(Arc::new(Self {
            name: name.to_string(),
            component_names: components.iter().map(|(n, _)| n.to_string()).collect(),
            periods: components.iter().map(|&(_, p)| p).collect(),
        }))
    }

    /// A single U(1) charge `N`.
    pub fn charge() -> Arc<Self> {
        Arc::new(Self {
            name: "Charge".to_string(),
            component_names: vec!["N".to_string()],
            periods: vec![Period::Unbounded],
        })
    }

    /// A single Z_n residue `r`.
    pub fn cyclic(n: i64) -> Result<Arc<Self>> {
        Self::new("Cyclic", &[("r", Period::finite(n)?)])
    }

    /// Particle number `N` and spin projection `Sz`, both unbounded.
    ///
    /// `Sz` is counted in units of 1/2 so that it stays integral.
    pub fn spinful_particle() -> Arc<Self> {
        Arc::new(Self {
            name: "SpinfulParticle".to_string(),
            component_names: vec!["N".to_string(), "Sz".to_string()],
            periods: vec![Period::Unbounded, Period::Unbounded],
        })
    }

    /// Lattice momentum with one finite component `k1, k2, ...` per period.
    pub fn momentum(periods: &[i64]) -> Result<Arc<Self>> {
        let names: Vec<String> = (1..=periods.len()).map(|i| format!("k{i}")).collect();
        let mut components = Vec::with_capacity(periods.len());
        for (name, &p) in names.iter().zip(periods) {
            components.push((name.as_str(), Period::finite(p)?));
        }
        Self::new("Momentum", &components)
    }

    /// Family name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component names
    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }

    /// Component periods
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Number of components
    pub fn arity(&self) -> usize {
        self.periods.len()
    }

    /// Check that values described by `other` can be combined with ours.
    pub fn check_compatible(&self, other: &QnDescriptor) -> Result<()> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        if self.arity() != other.arity() {
            return Err(QuantumNumberError::ArityMismatch {
                expected: self.arity(),
                actual: other.arity(),
            });
        }
        for (component, (&left, &right)) in self.periods.iter().zip(&other.periods).enumerate() {
            if left != right {
                return Err(QuantumNumberError::IncompatiblePeriod {
                    component,
                    left,
                    right,
                });
            }
        }
        if self.name != other.name || self.component_names != other.component_names {
            return Err(QuantumNumberError::IncompatibleType {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        Ok(())
    }
}

/// An Abelian quantum number.
///
/// Equality compares components and descriptor. Ordering is lexicographic
/// over the components; the descriptor only breaks ties between families.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantumNumber {
    values: Vec<i64>,
    descriptor: Arc<QnDescriptor>,
}

impl QuantumNumber {
    /// Create a quantum number, wrapping finite components into `[0, p)`.
    ///
    /// # Example
    /// ```
    /// use tensor4all_quantumnumbers::{QnDescriptor, QuantumNumber};
    ///
    /// let z3 = QnDescriptor::cyclic(3).unwrap();
    /// let q = QuantumNumber::new(&z3, &[-1]).unwrap();
    /// assert_eq!(q.components(), &[2]);
    /// ```
    pub fn new(descriptor: &Arc<QnDescriptor>, values: &[i64]) -> Result<Self> {
        if values.len() != descriptor.arity() {
            return Err(QuantumNumberError::ArityMismatch {
                expected: descriptor.arity(),
                actual: values.len(),
            });
        }
        Ok(Self {
            values: values
                .iter()
                .zip(descriptor.periods())
                .map(|(&v, p)| p.wrap(v))
                .collect(),
            descriptor: Arc::clone(descriptor),
        })
    }

    /// The group identity (all components zero).
    pub fn zero(descriptor: &Arc<QnDescriptor>) -> Self {
        Self {
            values: vec![0; descriptor.arity()],
            descriptor: Arc::clone(descriptor),
        }
    }

    /// Map a real-valued row onto the integer lattice.
    ///
    /// Values never cause a failure; only a row of the wrong length does.
    pub fn regularize(descriptor: &Arc<QnDescriptor>, raw: &[f64]) -> Result<Self> {
        if raw.len() != descriptor.arity() {
            return Err(QuantumNumberError::ArityMismatch {
                expected: descriptor.arity(),
                actual: raw.len(),
            });
        }
        Ok(Self {
            values: raw
                .iter()
                .zip(descriptor.periods())
                .map(|(&v, p)| p.regularize(v))
                .collect(),
            descriptor: Arc::clone(descriptor),
        })
    }

    /// Regularize a row-major batch of raw values, one quantum number per row.
    pub fn regularize_rows(descriptor: &Arc<QnDescriptor>, raw: &[f64]) -> Result<Vec<Self>> {
        let arity = descriptor.arity();
        if arity == 0 {
            return Ok(Vec::new());
        }
        if raw.len() % arity != 0 {
            return Err(QuantumNumberError::InvalidSequenceLayout(format!(
                "buffer of length {} is not a whole number of rows of {arity} components",
                raw.len()
            )));
        }
        raw.chunks(arity)
            .map(|row| Self::regularize(descriptor, row))
            .collect()
    }

    /// Descriptor of the family this value belongs to
    pub fn descriptor(&self) -> &Arc<QnDescriptor> {
        &self.descriptor
    }

    /// Number of components
    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Component values
    pub fn components(&self) -> &[i64] {
        &self.values
    }

    /// Value of one component
    pub fn component(&self, i: usize) -> Option<i64> {
        self.values.get(i).copied()
    }

    /// Component periods
    pub fn periods(&self) -> &[Period] {
        self.descriptor.periods()
    }

    /// A quantum number is a scalar label; multiplicity lives in sequences.
    #[inline]
    pub fn dimension(&self) -> usize {
        1
    }

    /// Group addition.
    ///
    /// Fails with `ComponentOverflow` if an unbounded component leaves the
    /// `i64` range.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a + b)
    }

    /// Group subtraction.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a - b)
    }

    /// Integer multiple `k * self`, checked on unbounded components.
    pub fn try_scale(&self, k: i64) -> Result<Self> {
        let values = self
            .values
            .iter()
            .zip(self.descriptor.periods())
            .enumerate()
            .map(|(component, (&v, &p))| settle(component, p, i128::from(v) * i128::from(k)))
            .collect::<Result<_>>()?;
        Ok(Self {
            values,
            descriptor: Arc::clone(&self.descriptor),
        })
    }

    /// Integer multiple `k * self`.
    ///
    /// # Panics
    /// Panics if an unbounded component overflows `i64`; use
    /// [`try_scale`](Self::try_scale) to handle that case.
    pub fn scale(&self, k: i64) -> Self {
        match self.try_scale(k) {
            Ok(q) => q,
            Err(err) => panic!("{err}"),
        }
    }

    /// `n`-fold combination of the value with itself (`pow(0)` is the identity).
    ///
    /// # Panics
    /// Panics under the same condition as [`scale`](Self::scale).
    pub fn pow(&self, n: u32) -> Self {
        self.scale(i64::from(n))
    }

    fn combine(&self, other: &Self, op: impl Fn(i128, i128) -> i128) -> Result<Self> {
        self.descriptor.check_compatible(&other.descriptor)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .zip(self.descriptor.periods())
            .enumerate()
            .map(|(component, ((&a, &b), &p))| {
                settle(component, p, op(i128::from(a), i128::from(b)))
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            values,
            descriptor: Arc::clone(&self.descriptor),
        })
    }
}

/// Bring a widened component result back onto the lattice.
fn settle(component: usize, period: Period, value: i128) -> Result<i64> {
    let value = match period {
        Period::Finite(m) => value.rem_euclid(i128::from(m)),
        Period::Unbounded => value,
    };
    i64::try_from(value).map_err(|_| QuantumNumberError::ComponentOverflow { component })
}

impl Neg for &QuantumNumber {
    type Output = QuantumNumber;

    fn neg(self) -> QuantumNumber {
        self.scale(-1)
    }
}

impl Neg for QuantumNumber {
    type Output = QuantumNumber;

    fn neg(self) -> QuantumNumber {
        self.scale(-1)
    }
}

impl Mul<i64> for &QuantumNumber {
    type Output = QuantumNumber;

    fn mul(self, k: i64) -> QuantumNumber {
        self.scale(k)
    }
}

impl fmt::Display for QuantumNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.descriptor.name())?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for QuantumNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Sign applied to every value of an operand before combination.
///
/// Models bra/ket or particle/hole conjugation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    /// Integer value (+1 or -1)
    pub fn value(self) -> i64 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }

    /// Apply the sign to a quantum number.
    pub fn apply(self, qn: &QuantumNumber) -> QuantumNumber {
        match self {
            Sign::Plus => qn.clone(),
            Sign::Minus => -qn,
        }
    }
}

impl TryFrom<i64> for Sign {
    type Error = QuantumNumberError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Sign::Plus),
            -1 => Ok(Sign::Minus),
            other => Err(QuantumNumberError::InvalidSign(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge_momentum() -> Arc<QnDescriptor> {
        QnDescriptor::new("CM", &[("N", Period::Unbounded), ("k", Period::Finite(4))]).unwrap()
    }

    #[test]
    fn test_new_wraps_finite_components() {
        let d = charge_momentum();
        let q = QuantumNumber::new(&d, &[-3, 7]).unwrap();
        assert_eq!(q.components(), &[-3, 3]);
        assert_eq!(q.dimension(), 1);
    }

    #[test]
    fn test_new_arity_mismatch() {
        let d = charge_momentum();
        let err = QuantumNumber::new(&d, &[1]).unwrap_err();
        assert_eq!(
            err,
            QuantumNumberError::ArityMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_arithmetic_wraps() {
        let d = charge_momentum();
        let a = QuantumNumber::new(&d, &[1, 3]).unwrap();
        let b = QuantumNumber::new(&d, &[-1, 1]).unwrap();
        assert_eq!(a.try_add(&b).unwrap().components(), &[0, 0]);
        assert_eq!(a.try_sub(&b).unwrap().components(), &[2, 2]);
        assert_eq!((-&a).components(), &[-1, 1]);
        assert_eq!(a.pow(3).components(), &[3, 1]);
        assert_eq!(a.pow(0), QuantumNumber::zero(&d));
        assert_eq!((&a * -2).components(), &[-2, 2]);
    }

    #[test]
    fn test_incompatible_period() {
        let a = QuantumNumber::new(&QnDescriptor::cyclic(4).unwrap(), &[1]).unwrap();
        let b = QuantumNumber::new(&QnDescriptor::cyclic(3).unwrap(), &[1]).unwrap();
        assert!(matches!(
            a.try_add(&b),
            Err(QuantumNumberError::IncompatiblePeriod { component: 0, .. })
        ));
    }

    #[test]
    fn test_finite_vs_unbounded_is_incompatible() {
        let finite = QnDescriptor::new("X", &[("x", Period::Finite(5))]).unwrap();
        let unbounded = QnDescriptor::new("X", &[("x", Period::Unbounded)]).unwrap();
        let a = QuantumNumber::new(&finite, &[1]).unwrap();
        let b = QuantumNumber::new(&unbounded, &[1]).unwrap();
        assert_eq!(
            a.try_sub(&b).unwrap_err(),
            QuantumNumberError::IncompatiblePeriod {
                component: 0,
                left: Period::Finite(5),
                right: Period::Unbounded
            }
        );
    }

    #[test]
    fn test_different_families_refused() {
        let a = QuantumNumber::new(&QnDescriptor::charge(), &[1]).unwrap();
        let other = QnDescriptor::new("Other", &[("N", Period::Unbounded)]).unwrap();
        let b = QuantumNumber::new(&other, &[1]).unwrap();
        assert!(matches!(
            a.try_add(&b),
            Err(QuantumNumberError::IncompatibleType { .. })
        ));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let d = charge_momentum();
        let q1 = QuantumNumber::new(&d, &[1, 3]).unwrap();
        let q2 = QuantumNumber::new(&d, &[-1, 1]).unwrap();
        let q3 = QuantumNumber::new(&d, &[1, 0]).unwrap();
        assert!(q2 < q1);
        assert!(q3 < q1);
        assert!(q2 < q3);
    }

    #[test]
    fn test_regularize() {
        let d = charge_momentum();
        let q = QuantumNumber::regularize(&d, &[1.6, -1.2]).unwrap();
        assert_eq!(q.components(), &[2, 3]);

        let rows = QuantumNumber::regularize_rows(&d, &[0.4, 4.0, -2.5, 9.7]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].components(), &[0, 0]);
        assert_eq!(rows[1].components(), &[-3, 2]);
    }

    #[test]
    fn test_regularize_rows_ragged_buffer() {
        let d = charge_momentum();
        let err = QuantumNumber::regularize_rows(&d, &[1.0, 2.0, 3.0]).unwrap_err();
        match err {
            QuantumNumberError::InvalidSequenceLayout(msg) => assert!(msg.contains("length 3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unbounded_overflow_is_reported() {
        let d = charge_momentum();
        let big = QuantumNumber::new(&d, &[i64::MAX, 1]).unwrap();
        let one = QuantumNumber::new(&d, &[1, 3]).unwrap();
        assert_eq!(
            big.try_add(&one).unwrap_err(),
            QuantumNumberError::ComponentOverflow { component: 0 }
        );
        assert_eq!(
            big.try_scale(2).unwrap_err(),
            QuantumNumberError::ComponentOverflow { component: 0 }
        );
        assert_eq!(big.try_sub(&one).unwrap().components(), &[i64::MAX - 1, 2]);
        assert_eq!((-&big).components(), &[-i64::MAX, 3]);

        let z = QnDescriptor::cyclic(i64::MAX).unwrap();
        let near = QuantumNumber::new(&z, &[i64::MAX - 1]).unwrap();
        assert_eq!(near.try_add(&near).unwrap().components(), &[i64::MAX - 2]);
    }

    #[test]
    fn test_display() {
        let d = charge_momentum();
        let q = QuantumNumber::new(&d, &[1, 3]).unwrap();
        assert_eq!(q.to_string(), "CM(1, 3)");
        assert_eq!(format!("{:?}", QuantumNumber::zero(&QnDescriptor::charge())), "Charge(0)");
    }

    #[test]
    fn test_families() {
        assert_eq!(QnDescriptor::charge().periods(), &[Period::Unbounded]);
        assert_eq!(QnDescriptor::cyclic(6).unwrap().periods(), &[Period::Finite(6)]);
        assert_eq!(QnDescriptor::spinful_particle().component_names(), &["N", "Sz"]);
        let k = QnDescriptor::momentum(&[2, 3]).unwrap();
        assert_eq!(k.component_names(), &["k1", "k2"]);
        assert_eq!(k.periods(), &[Period::Finite(2), Period::Finite(3)]);
        assert_eq!(QnDescriptor::cyclic(0).unwrap_err(), QuantumNumberError::InvalidPeriod(0));
    }

    #[test]
    fn test_sign() {
        let q = QuantumNumber::new(&QnDescriptor::charge(), &[2]).unwrap();
        assert_eq!(Sign::Minus.apply(&q).components(), &[-2]);
        assert_eq!(Sign::Plus.apply(&q), q);
        assert_eq!(Sign::try_from(-1).unwrap(), Sign::Minus);
        assert_eq!(Sign::try_from(2).unwrap_err(), QuantumNumberError::InvalidSign(2));
        assert_eq!(Sign::Minus.value(), -1);
    }
}

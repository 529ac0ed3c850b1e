//! Enumeration of all values of a finite quantum-number family

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::error::{QuantumNumberError, Result};
use crate::quantum_number::{Period, QnDescriptor, QuantumNumber};

/// All valid values of a family whose components all have finite periods.
///
/// Values are ordered mixed-radix lexicographically with the first component
/// most significant, so that `index = Σ c_i · Π_{j>i} p_j`.
///
/// # Example
/// ```
/// use tensor4all_quantumnumbers::{Momenta, QnDescriptor, QuantumNumber};
///
/// let k = QnDescriptor::momentum(&[2, 3]).unwrap();
/// let momenta = Momenta::new(&k).unwrap();
/// assert_eq!(momenta.len(), 6);
///
/// let q = QuantumNumber::new(&k, &[1, 2]).unwrap();
/// assert_eq!(momenta.index_of(&q).unwrap(), 5);
/// assert_eq!(momenta.get(5).unwrap(), q);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Momenta {
    descriptor: Arc<QnDescriptor>,
    radices: Vec<usize>,
}

impl Momenta {
    /// Create the enumerator, refusing families with unbounded components.
    pub fn new(descriptor: &Arc<QnDescriptor>) -> Result<Self> {
        let radices = descriptor
            .periods()
            .iter()
            .enumerate()
            .map(|(component, period)| match *period {
                Period::Finite(p) => Ok(p as usize),
                Period::Unbounded => Err(QuantumNumberError::UnboundedComponent { component }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            descriptor: Arc::clone(descriptor),
            radices,
        })
    }

    /// The family being enumerated
    pub fn descriptor(&self) -> &Arc<QnDescriptor> {
        &self.descriptor
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.radices.iter().product()
    }

    /// Returns true if there are no values (never the case for valid periods)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at a dense index.
    pub fn get(&self, index: usize) -> Result<QuantumNumber> {
        let len = self.len();
        if index >= len {
            return Err(QuantumNumberError::IndexOutOfBounds { index, len });
        }
        let mut values = vec![0i64; self.radices.len()];
        let mut rest = index;
        for (slot, &radix) in values.iter_mut().zip(&self.radices).rev() {
            *slot = (rest % radix) as i64;
            rest /= radix;
        }
        QuantumNumber::new(&self.descriptor, &values)
    }

    /// Dense index of a value.
    pub fn index_of(&self, qn: &QuantumNumber) -> Result<usize> {
        self.descriptor.check_compatible(qn.descriptor())?;
        Ok(qn
            .components()
            .iter()
            .zip(&self.radices)
            .fold(0usize, |acc, (&c, &radix)| acc * radix + c as usize))
    }

    /// Iterate over all values in index order.
    pub fn iter(&self) -> MomentaIter<'_> {
        MomentaIter {
            momenta: self,
            next: 0,
            end: self.len(),
        }
    }
}

impl<'a> IntoIterator for &'a Momenta {
    type Item = QuantumNumber;
    type IntoIter = MomentaIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the values of a [`Momenta`] enumerator.
#[derive(Debug, Clone)]
pub struct MomentaIter<'a> {
    momenta: &'a Momenta,
    next: usize,
    end: usize,
}

impl Iterator for MomentaIter<'_> {
    type Item = QuantumNumber;

    fn next(&mut self) -> Option<QuantumNumber> {
        if self.next >= self.end {
            return None;
        }
        let item = self.momenta.get(self.next).ok();
        self.next += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MomentaIter<'_> {}

impl FusedIterator for MomentaIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_order() {
        let k = QnDescriptor::momentum(&[2, 3]).unwrap();
        let momenta = Momenta::new(&k).unwrap();
        let all: Vec<Vec<i64>> = momenta.iter().map(|q| q.components().to_vec()).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn test_index_bijection() {
        let k = QnDescriptor::momentum(&[3, 2, 4]).unwrap();
        let momenta = Momenta::new(&k).unwrap();
        for (i, q) in momenta.iter().enumerate() {
            assert_eq!(momenta.index_of(&q).unwrap(), i);
        }
        assert_eq!(momenta.iter().len(), 24);
    }

    #[test]
    fn test_restartable() {
        let momenta = Momenta::new(&QnDescriptor::cyclic(4).unwrap()).unwrap();
        let first: Vec<_> = momenta.iter().collect();
        let second: Vec<_> = (&momenta).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unbounded_refused() {
        let err = Momenta::new(&QnDescriptor::charge()).unwrap_err();
        assert_eq!(err, QuantumNumberError::UnboundedComponent { component: 0 });
    }

    #[test]
    fn test_get_out_of_bounds() {
        let momenta = Momenta::new(&QnDescriptor::cyclic(3).unwrap()).unwrap();
        assert!(matches!(
            momenta.get(3),
            Err(QuantumNumberError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }
}

//! Decomposition of a target quantum number over several sequences.
//!
//! Finds tuples `(i_1, ..., i_m)` of flat positions, one per sequence, with
//! `Σ_j signs[j] · value(seq_j, i_j) == target`.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{QuantumNumberError, Result};
use crate::quantum_number::{QuantumNumber, Sign};
use crate::sequence::AbelianNumberSequence;

/// Search strategy for [`decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecomposeMethod {
    /// Enumerate the Cartesian product in lexicographic order (first factor
    /// outermost). Returns the lexicographically first `nmax` solutions.
    #[default]
    Exhaustive,
    /// Draw uniformly random position tuples and keep the distinct valid ones.
    /// Neither complete nor ordered.
    Randomized,
}

/// Options for [`decompose`].
///
/// # Example
///
/// ```
/// use tensor4all_quantumnumbers::DecomposeOptions;
///
/// let opts = DecomposeOptions::randomized()
///     .with_nmax(5)
///     .with_max_samples(10_000);
/// assert_eq!(opts.nmax, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DecomposeOptions {
    /// Maximum number of solutions to return.
    pub nmax: usize,
    /// Search strategy.
    pub method: DecomposeMethod,
    /// Number of random draws before the randomized search gives up.
    ///
    /// Ignored by the exhaustive search.
    pub max_samples: usize,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            nmax: 20,
            method: DecomposeMethod::Exhaustive,
            max_samples: 100_000,
        }
    }
}

impl DecomposeOptions {
    /// Options for the exhaustive search.
    pub fn exhaustive() -> Self {
        Self {
            method: DecomposeMethod::Exhaustive,
            ..Default::default()
        }
    }

    /// Options for the randomized search.
    pub fn randomized() -> Self {
        Self {
            method: DecomposeMethod::Randomized,
            ..Default::default()
        }
    }

    /// Set the maximum number of solutions.
    pub fn with_nmax(mut self, nmax: usize) -> Self {
        self.nmax = nmax;
        self
    }

    /// Set the sampling budget of the randomized search.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }
}

/// Find up to `options.nmax` position tuples whose signed sum equals `target`.
///
/// An unreachable target yields an empty result, not an error. The random
/// source is only used by [`DecomposeMethod::Randomized`]; pass a seeded RNG
/// for reproducible results.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use tensor4all_quantumnumbers::{
///     decompose, AbelianNumberSequence, DecomposeOptions, QnDescriptor, QuantumNumber, Sign,
/// };
///
/// let n = QnDescriptor::charge();
/// let q = |v| QuantumNumber::new(&n, &[v]).unwrap();
/// let site = AbelianNumberSequence::from_count_pairs(vec![(q(0), 1), (q(1), 1)]).unwrap();
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let found = decompose(
///     &q(1),
///     &[&site, &site],
///     &[Sign::Plus, Sign::Plus],
///     &DecomposeOptions::exhaustive(),
///     &mut rng,
/// )
/// .unwrap();
/// assert_eq!(found, vec![vec![0, 1], vec![1, 0]]);
/// ```
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(factors = sequences.len(), nmax = options.nmax, method = ?options.method)
)]
pub fn decompose<R: Rng + ?Sized>(
    target: &QuantumNumber,
    sequences: &[&AbelianNumberSequence],
    signs: &[Sign],
    options: &DecomposeOptions,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>> {
    if sequences.is_empty() {
        return Err(QuantumNumberError::EmptyOperands);
    }
    if signs.len() != sequences.len() {
        return Err(QuantumNumberError::ArityMismatch {
            expected: sequences.len(),
            actual: signs.len(),
        });
    }
    for seq in sequences {
        if let Some(descriptor) = seq.descriptor() {
            target.descriptor().check_compatible(descriptor)?;
        }
    }
    if options.nmax == 0 || sequences.iter().any(|seq| seq.dimension() == 0) {
        return Ok(Vec::new());
    }

    let found = match options.method {
        DecomposeMethod::Exhaustive => exhaustive(target, sequences, signs, options.nmax)?,
        DecomposeMethod::Randomized => randomized(target, sequences, signs, options, rng)?,
    };
    tracing::debug!(solutions = found.len(), "decomposition finished");
    Ok(found)
}

fn exhaustive(
    target: &QuantumNumber,
    sequences: &[&AbelianNumberSequence],
    signs: &[Sign],
    nmax: usize,
) -> Result<Vec<Vec<usize>>> {
    let signed: Vec<Vec<QuantumNumber>> = sequences
        .iter()
        .zip(signs)
        .map(|(seq, &sign)| seq.contents().iter().map(|q| sign.apply(q)).collect())
        .collect();
    let mut search = Exhaustive {
        target,
        sequences,
        signed,
        nmax,
        dead: HashSet::new(),
        prefix: Vec::with_capacity(sequences.len()),
        found: Vec::new(),
    };
    let zero = QuantumNumber::zero(target.descriptor());
    search.descend(0, &zero)?;
    Ok(search.found)
}

/// Depth-first enumeration in lexicographic order.
///
/// All positions of one block share the same subtree, so a `(depth, partial
/// sum)` state that produced no solution is remembered and skipped.
struct Exhaustive<'a> {
    target: &'a QuantumNumber,
    sequences: &'a [&'a AbelianNumberSequence],
    signed: Vec<Vec<QuantumNumber>>,
    nmax: usize,
    dead: HashSet<(usize, QuantumNumber)>,
    prefix: Vec<usize>,
    found: Vec<Vec<usize>>,
}

impl Exhaustive<'_> {
    /// Returns whether the subtree rooted at this state contains a solution.
    fn descend(&mut self, depth: usize, partial: &QuantumNumber) -> Result<bool> {
        if depth == self.sequences.len() {
            if partial == self.target {
                self.found.push(self.prefix.clone());
                return Ok(true);
            }
            return Ok(false);
        }
        if self.dead.contains(&(depth, partial.clone())) {
            return Ok(false);
        }

        let seq = self.sequences[depth];
        let mut any = false;
        for block in 0..seq.len() {
            let next = partial.try_add(&self.signed[depth][block])?;
            for position in seq.range(block) {
                if self.found.len() >= self.nmax {
                    return Ok(true);
                }
                self.prefix.push(position);
                let hit = self.descend(depth + 1, &next)?;
                self.prefix.pop();
                if !hit {
                    // the remaining positions of this block lead to the same subtree
                    break;
                }
                any = true;
            }
        }
        if !any {
            self.dead.insert((depth, partial.clone()));
        }
        Ok(any)
    }
}

fn randomized<R: Rng + ?Sized>(
    target: &QuantumNumber,
    sequences: &[&AbelianNumberSequence],
    signs: &[Sign],
    options: &DecomposeOptions,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>> {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut found = Vec::new();
    let mut samples = 0;
    while found.len() < options.nmax && samples < options.max_samples {
        samples += 1;
        let mut tuple = Vec::with_capacity(sequences.len());
        let mut sum = QuantumNumber::zero(target.descriptor());
        for (seq, &sign) in sequences.iter().zip(signs) {
            let position = rng.gen_range(0..seq.dimension());
            let block = seq.find_block(position, 0)?;
            sum = sum.try_add(&sign.apply(seq.value(block)))?;
            tuple.push(position);
        }
        if &sum == target && seen.insert(tuple.clone()) {
            found.push(tuple);
        }
    }
    if found.len() < options.nmax {
        tracing::warn!(
            samples,
            found = found.len(),
            nmax = options.nmax,
            "sampling budget exhausted before nmax solutions were found"
        );
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum_number::QnDescriptor;
    use crate::sequence::SortForm;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn q(v: i64) -> QuantumNumber {
        QuantumNumber::new(&QnDescriptor::charge(), &[v]).unwrap()
    }

    fn seq(values: &[i64], counts: &[usize]) -> AbelianNumberSequence {
        let contents = values.iter().map(|&v| q(v)).collect();
        AbelianNumberSequence::from_counts(contents, counts, SortForm::General).unwrap()
    }

    fn brute_force(
        target: &QuantumNumber,
        sequences: &[&AbelianNumberSequence],
        signs: &[Sign],
    ) -> Vec<Vec<usize>> {
        let flats: Vec<Vec<QuantumNumber>> = sequences
            .iter()
            .zip(signs)
            .map(|(s, &sign)| s.iter_expanded().map(|v| sign.apply(v)).collect())
            .collect();
        let mut out = Vec::new();
        let mut idx = vec![0usize; sequences.len()];
        loop {
            let mut sum = q(0);
            for (j, &i) in idx.iter().enumerate() {
                sum = sum.try_add(&flats[j][i]).unwrap();
            }
            if &sum == target {
                out.push(idx.clone());
            }
            let mut axis = idx.len();
            loop {
                if axis == 0 {
                    return out;
                }
                axis -= 1;
                idx[axis] += 1;
                if idx[axis] < flats[axis].len() {
                    break;
                }
                idx[axis] = 0;
            }
        }
    }

    #[test]
    fn test_exhaustive_matches_brute_force() {
        let a = seq(&[0, 1, 0], &[2, 1, 1]);
        let b = seq(&[1, -1], &[1, 2]);
        let c = seq(&[2, 0, 1], &[1, 1, 2]);
        let signs = [Sign::Plus, Sign::Minus, Sign::Plus];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for target in -2..=4 {
            let expected = brute_force(&q(target), &[&a, &b, &c], &signs);
            let all = decompose(
                &q(target),
                &[&a, &b, &c],
                &signs,
                &DecomposeOptions::exhaustive().with_nmax(usize::MAX),
                &mut rng,
            )
            .unwrap();
            assert_eq!(all, expected, "target {target}");

            let first = decompose(
                &q(target),
                &[&a, &b, &c],
                &signs,
                &DecomposeOptions::exhaustive().with_nmax(3),
                &mut rng,
            )
            .unwrap();
            assert_eq!(first, expected.into_iter().take(3).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_unreachable_target_is_empty() {
        let a = seq(&[0, 1], &[1, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for options in [
            DecomposeOptions::exhaustive(),
            DecomposeOptions::randomized().with_max_samples(500),
        ] {
            let signs = [Sign::Plus, Sign::Plus];
            let found = decompose(&q(5), &[&a, &a], &signs, &options, &mut rng).unwrap();
            assert!(found.is_empty());
        }
    }

    #[test]
    fn test_randomized_is_subset_and_reproducible() {
        let a = seq(&[0, 1], &[2, 2]);
        let b = seq(&[0, 1, 2], &[1, 1, 1]);
        let signs = [Sign::Plus, Sign::Plus];
        let valid: HashSet<Vec<usize>> =
            brute_force(&q(2), &[&a, &b], &signs).into_iter().collect();
        let options = DecomposeOptions::randomized().with_nmax(4);

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let first = decompose(&q(2), &[&a, &b], &signs, &options, &mut rng).unwrap();
        assert_eq!(first.len(), 4);
        let distinct: HashSet<_> = first.iter().cloned().collect();
        assert_eq!(distinct.len(), first.len());
        assert!(first.iter().all(|t| valid.contains(t)));

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let second = decompose(&q(2), &[&a, &b], &signs, &options, &mut rng).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_argument_validation() {
        let a = seq(&[0], &[1]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let opts = DecomposeOptions::default();
        assert_eq!(
            decompose(&q(0), &[], &[], &opts, &mut rng).unwrap_err(),
            QuantumNumberError::EmptyOperands
        );
        assert!(matches!(
            decompose(&q(0), &[&a], &[Sign::Plus, Sign::Plus], &opts, &mut rng),
            Err(QuantumNumberError::ArityMismatch { .. })
        ));
        let z2 = QuantumNumber::new(&QnDescriptor::cyclic(2).unwrap(), &[0]).unwrap();
        assert!(matches!(
            decompose(&z2, &[&a], &[Sign::Plus], &opts, &mut rng),
            Err(QuantumNumberError::IncompatiblePeriod { .. })
        ));
    }
}

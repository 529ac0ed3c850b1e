//! Compressed quantum-number sequences.
//!
//! An [`AbelianNumberSequence`] stores a long ordered multiset of quantum
//! numbers as a short list of blocks. Block `i` carries one value and covers
//! the flat positions `indptr[i]..indptr[i + 1]`.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::error::{QuantumNumberError, Result};
use crate::quantum_number::{QnDescriptor, QuantumNumber};

/// Invariant class of a sequence's blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortForm {
    /// Each value occurs in at most one block; blocks keep insertion order.
    Unique,
    /// Values may repeat across blocks in any order.
    #[default]
    General,
    /// Values are unique and blocks are sorted ascending.
    Canonical,
}

impl fmt::Display for SortForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortForm::Unique => "Unique",
            SortForm::General => "General",
            SortForm::Canonical => "Canonical",
        };
        write!(f, "{name}")
    }
}

/// Granularity at which indices address a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Indices address blocks.
    Compression,
    /// Indices address individual flat positions.
    Expansion,
}

/// A compressed sequence of Abelian quantum numbers.
///
/// Equality and hashing include the [`SortForm`]: two sequences with the same
/// blocks but different declared forms are not equal. Use
/// [`same_content`](Self::same_content) for a form-insensitive comparison.
///
/// # Example
/// ```
/// use tensor4all_quantumnumbers::{AbelianNumberSequence, QnDescriptor, QuantumNumber, SortForm};
///
/// let n = QnDescriptor::charge();
/// let q0 = QuantumNumber::new(&n, &[0]).unwrap();
/// let q1 = QuantumNumber::new(&n, &[1]).unwrap();
///
/// let seq =
///     AbelianNumberSequence::from_counts(vec![q0, q1], &[1, 2], SortForm::Canonical).unwrap();
/// assert_eq!(seq.dimension(), 3);
/// assert_eq!(seq.len(), 2);
/// assert_eq!(seq.range(1), 1..3);
/// assert_eq!(seq.to_string(), "QNS(2, 3)");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AbelianNumberSequence {
    contents: Vec<QuantumNumber>,
    /// Block boundaries: `[0, c0, c0+c1, ..., dimension]`.
    indptr: Vec<usize>,
    form: SortForm,
}

impl AbelianNumberSequence {
    /// Create a sequence from block values and boundaries.
    ///
    /// `indptr` must have one more entry than `contents`, start at 0 and be
    /// strictly increasing. The contents must share one descriptor and
    /// satisfy the declared form.
    pub fn new(contents: Vec<QuantumNumber>, indptr: Vec<usize>, form: SortForm) -> Result<Self> {
        if indptr.len() != contents.len() + 1 {
            return Err(QuantumNumberError::InvalidSequenceLayout(format!(
                "boundary array must have length {}, got {}",
                contents.len() + 1,
                indptr.len()
            )));
        }
        if indptr[0] != 0 {
            return Err(QuantumNumberError::InvalidSequenceLayout(format!(
                "boundary array must start at 0, got {}",
                indptr[0]
            )));
        }
        if let Some(i) = indptr.windows(2).position(|w| w[1] <= w[0]) {
            return Err(QuantumNumberError::InvalidSequenceLayout(format!(
                "boundaries must be strictly increasing, block {i} spans {}..{}",
                indptr[i],
                indptr[i + 1]
            )));
        }
        check_same_family(&contents)?;
        check_form(&contents, form)?;
        Ok(Self {
            contents,
            indptr,
            form,
        })
    }

    /// Create a sequence from block values and per-block counts.
    pub fn from_counts(
        contents: Vec<QuantumNumber>,
        counts: &[usize],
        form: SortForm,
    ) -> Result<Self> {
        if counts.len() != contents.len() {
            return Err(QuantumNumberError::InvalidSequenceLayout(format!(
                "expected {} counts, got {}",
                contents.len(),
                counts.len()
            )));
        }
        Self::new(contents, counts_to_indptr(counts), form)
    }

    /// Create a Unique-form sequence from an ordered value -> count mapping.
    pub fn from_count_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (QuantumNumber, usize)>,
    {
        let (contents, counts): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self::from_counts(contents, &counts, SortForm::Unique)
    }

    /// Create a Unique-form sequence from an ordered value -> range mapping.
    ///
    /// The ranges must tile `0..dimension` contiguously in the given order.
    pub fn from_range_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (QuantumNumber, Range<usize>)>,
    {
        let mut contents = Vec::new();
        let mut indptr = vec![0];
        for (qn, range) in pairs {
            let expected = indptr[indptr.len() - 1];
            if range.start != expected {
                return Err(QuantumNumberError::InvalidSequenceLayout(format!(
                    "range for {qn} starts at {}, expected {expected}",
                    range.start
                )));
            }
            contents.push(qn);
            indptr.push(range.end);
        }
        Self::new(contents, indptr, SortForm::Unique)
    }

    /// Assemble a sequence whose invariants the caller has already established.
    pub(crate) fn from_parts(
        contents: Vec<QuantumNumber>,
        indptr: Vec<usize>,
        form: SortForm,
    ) -> Self {
        debug_assert_eq!(indptr.len(), contents.len() + 1);
        Self {
            contents,
            indptr,
            form,
        }
    }

    /// Declared sort form
    #[inline]
    pub fn form(&self) -> SortForm {
        self.form
    }

    /// Block values
    #[inline]
    pub fn contents(&self) -> &[QuantumNumber] {
        &self.contents
    }

    /// Block boundaries (`len() + 1` entries)
    #[inline]
    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    /// Descriptor shared by the values, `None` for an empty sequence.
    pub fn descriptor(&self) -> Option<&Arc<QnDescriptor>> {
        self.contents.first().map(|q| q.descriptor())
    }

    /// Total number of flat positions (sum of counts).
    #[inline]
    pub fn dimension(&self) -> usize {
        *self.indptr.last().unwrap_or(&0)
    }

    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns true if the sequence has no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Count of block `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn count(&self, i: usize) -> usize {
        self.indptr[i + 1] - self.indptr[i]
    }

    /// Flat range covered by block `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn range(&self, i: usize) -> Range<usize> {
        self.indptr[i]..self.indptr[i + 1]
    }

    /// Value of block `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn value(&self, i: usize) -> &QuantumNumber {
        &self.contents[i]
    }

    /// Find the block containing a flat position.
    ///
    /// The search starts at block `guess` and bisects only on the side the
    /// position lies on, so sequential access is close to O(1). The answer
    /// does not depend on the guess; guesses past the end are clamped.
    pub fn find_block(&self, position: usize, guess: usize) -> Result<usize> {
        let dim = self.dimension();
        if position >= dim {
            return Err(QuantumNumberError::IndexOutOfBounds {
                index: position,
                len: dim,
            });
        }
        let guess = guess.min(self.len() - 1);
        let range = self.range(guess);
        if position < range.start {
            Ok(self.indptr[..guess].partition_point(|&start| start <= position) - 1)
        } else if position >= range.end {
            let after = &self.indptr[guess + 1..self.len()];
            Ok(guess + after.partition_point(|&start| start <= position))
        } else {
            Ok(guess)
        }
    }

    /// Value at a flat position.
    pub fn value_at_position(&self, position: usize) -> Result<&QuantumNumber> {
        let block = self.find_block(position, 0)?;
        Ok(&self.contents[block])
    }

    /// Iterate over `(value, range)` pairs in block order.
    pub fn blocks(&self) -> impl Iterator<Item = (&QuantumNumber, Range<usize>)> + Clone + '_ {
        self.contents
            .iter()
            .zip(self.indptr.windows(2))
            .map(|(q, w)| (q, w[0]..w[1]))
    }

    /// Iterate over `(value, count)` pairs in block order.
    pub fn counted_blocks(&self) -> impl Iterator<Item = (&QuantumNumber, usize)> + Clone + '_ {
        self.contents
            .iter()
            .zip(self.indptr.windows(2))
            .map(|(q, w)| (q, w[1] - w[0]))
    }

    /// Iterate lazily over the value of every flat position.
    pub fn iter_expanded(&self) -> impl Iterator<Item = &QuantumNumber> + Clone + '_ {
        self.counted_blocks()
            .flat_map(|(q, count)| std::iter::repeat(q).take(count))
    }

    /// Owning block index of every flat position.
    pub fn expand_indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.dimension());
        for (block, (_, count)) in self.counted_blocks().enumerate() {
            out.extend(std::iter::repeat(block).take(count));
        }
        out
    }

    /// Value of every flat position.
    pub fn expand_contents(&self) -> Vec<QuantumNumber> {
        self.iter_expanded().cloned().collect()
    }

    /// Export as an ordered value -> count list.
    pub fn to_count_pairs(&self) -> Vec<(QuantumNumber, usize)> {
        self.counted_blocks().map(|(q, c)| (q.clone(), c)).collect()
    }

    /// Export as an ordered value -> range list.
    pub fn to_range_pairs(&self) -> Vec<(QuantumNumber, Range<usize>)> {
        self.blocks().map(|(q, r)| (q.clone(), r)).collect()
    }

    /// Compare blocks while ignoring the declared form.
    pub fn same_content(&self, other: &Self) -> bool {
        self.contents == other.contents && self.indptr == other.indptr
    }
}

impl Default for AbelianNumberSequence {
    fn default() -> Self {
        Self::from_parts(Vec::new(), vec![0], SortForm::General)
    }
}

impl From<QuantumNumber> for AbelianNumberSequence {
    fn from(qn: QuantumNumber) -> Self {
        Self::from_parts(vec![qn], vec![0, 1], SortForm::Unique)
    }
}

/// `{}` renders the short form `QNS(blocks, dimension)`; `{:#}` lists every block.
impl fmt::Display for AbelianNumberSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(f, "QNS({}, {})", self.len(), self.dimension());
        }
        write!(f, "QNS(")?;
        for (i, (q, range)) in self.blocks().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{q}=>{range:?}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for AbelianNumberSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#} [{}]", self, self.form)
    }
}

pub(crate) fn counts_to_indptr(counts: &[usize]) -> Vec<usize> {
    let mut indptr = Vec::with_capacity(counts.len() + 1);
    indptr.push(0);
    let mut cumsum = 0;
    for &count in counts {
        cumsum += count;
        indptr.push(cumsum);
    }
    indptr
}

fn check_same_family(contents: &[QuantumNumber]) -> Result<()> {
    if let Some((first, rest)) = contents.split_first() {
        for q in rest {
            first.descriptor().check_compatible(q.descriptor())?;
        }
    }
    Ok(())
}

fn check_form(contents: &[QuantumNumber], form: SortForm) -> Result<()> {
    match form {
        SortForm::General => Ok(()),
        SortForm::Unique => {
            let mut seen = HashSet::with_capacity(contents.len());
            for q in contents {
                if !seen.insert(q) {
                    return Err(QuantumNumberError::FormViolation {
                        form,
                        reason: format!("{q} appears in more than one block"),
                    });
                }
            }
            Ok(())
        }
        SortForm::Canonical => {
            if let Some(w) = contents.windows(2).find(|w| w[0] >= w[1]) {
                return Err(QuantumNumberError::FormViolation {
                    form,
                    reason: format!("{} is not strictly below {}", w[0], w[1]),
                });
            }
            Ok(())
        }
    }
}

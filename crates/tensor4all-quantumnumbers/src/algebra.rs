//! Sequence algebra: canonicalization, selection, direct sums and tensor products.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use crate::error::{QuantumNumberError, Result};
use crate::quantum_number::{QuantumNumber, Sign};
use crate::sequence::{counts_to_indptr, AbelianNumberSequence, SortForm, View};

/// Provenance of a canonical tensor product.
///
/// Maps every distinct result value to the source-value tuples (one value per
/// operand) that produced it, each with the flat sub-range it occupies in the
/// canonical result. Iteration order is ascending on both levels.
pub type ProductRecord = BTreeMap<QuantumNumber, BTreeMap<Vec<QuantumNumber>, Range<usize>>>;

impl AbelianNumberSequence {
    /// Canonicalize the sequence.
    ///
    /// Returns the Canonical-form sequence together with the forward
    /// permutation of flat positions: for every old position `i`,
    /// `expand_contents()[i] == canonical.expand_contents()[permutation[i]]`.
    /// Blocks with equal values keep their relative order.
    ///
    /// # Example
    /// ```
    /// use tensor4all_quantumnumbers::{AbelianNumberSequence, QnDescriptor, QuantumNumber};
    ///
    /// let n = QnDescriptor::charge();
    /// let q = |v| QuantumNumber::new(&n, &[v]).unwrap();
    /// let seq = AbelianNumberSequence::from_count_pairs(vec![(q(1), 2), (q(0), 1)]).unwrap();
    ///
    /// let (sorted, permutation) = seq.sort();
    /// assert_eq!(sorted.contents(), &[q(0), q(1)]);
    /// assert_eq!(permutation, vec![1, 2, 0]);
    /// ```
    pub fn sort(&self) -> (Self, Vec<usize>) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.value(a).cmp(self.value(b)));

        let mut permutation = vec![0; self.dimension()];
        let mut contents: Vec<QuantumNumber> = Vec::new();
        let mut indptr = vec![0];
        let mut cursor = 0;
        for &block in &order {
            let range = self.range(block);
            for (offset, old) in range.clone().enumerate() {
                permutation[old] = cursor + offset;
            }
            cursor += range.len();
            if contents.last() == Some(self.value(block)) {
                if let Some(end) = indptr.last_mut() {
                    *end = cursor;
                }
            } else {
                contents.push(self.value(block).clone());
                indptr.push(cursor);
            }
        }
        tracing::debug!(
            blocks_in = self.len(),
            blocks_out = contents.len(),
            dimension = cursor,
            "sorted quantum-number sequence"
        );
        (
            Self::from_parts(contents, indptr, SortForm::Canonical),
            permutation,
        )
    }

    /// Keep only the blocks whose value is one of `targets`.
    ///
    /// Block order, counts and the declared form are preserved. No match
    /// yields an empty sequence.
    pub fn filter(&self, targets: &[QuantumNumber]) -> Self {
        let targets: HashSet<&QuantumNumber> = targets.iter().collect();
        let mut contents = Vec::new();
        let mut counts = Vec::new();
        for (q, count) in self.counted_blocks() {
            if targets.contains(q) {
                contents.push(q.clone());
                counts.push(count);
            }
        }
        Self::from_parts(contents, counts_to_indptr(&counts), self.form())
    }

    /// Select and reorder blocks (`View::Compression`) or flat positions
    /// (`View::Expansion`). Repeats and omissions are allowed.
    ///
    /// The result is always in General form. In the expansion view every
    /// selected position becomes a block of count one.
    pub fn permute(&self, indices: &[usize], view: View) -> Result<Self> {
        let mut contents = Vec::with_capacity(indices.len());
        let mut counts = Vec::with_capacity(indices.len());
        match view {
            View::Compression => {
                for &i in indices {
                    if i >= self.len() {
                        return Err(QuantumNumberError::IndexOutOfBounds {
                            index: i,
                            len: self.len(),
                        });
                    }
                    contents.push(self.value(i).clone());
                    counts.push(self.count(i));
                }
            }
            View::Expansion => {
                let mut guess = 0;
                for &position in indices {
                    guess = self.find_block(position, guess)?;
                    contents.push(self.value(guess).clone());
                    counts.push(1);
                }
            }
        }
        Ok(Self::from_parts(contents, counts_to_indptr(&counts), SortForm::General))
    }

    /// All block indices (`View::Compression`) or flat positions
    /// (`View::Expansion`) holding `value`, in ascending order.
    pub fn find_all(&self, value: &QuantumNumber, view: View) -> Vec<usize> {
        let blocks = self
            .contents()
            .iter()
            .enumerate()
            .filter(|(_, q)| *q == value)
            .map(|(i, _)| i);
        match view {
            View::Compression => blocks.collect(),
            View::Expansion => blocks.flat_map(|i| self.range(i)).collect(),
        }
    }
}

fn check_operands(operands: &[&AbelianNumberSequence], signs: &[Sign]) -> Result<()> {
    if operands.is_empty() {
        return Err(QuantumNumberError::EmptyOperands);
    }
    if signs.len() != operands.len() {
        return Err(QuantumNumberError::ArityMismatch {
            expected: operands.len(),
            actual: signs.len(),
        });
    }
    // Empty operands carry no family, so compare against the first one that does
    let Some(reference) = operands.iter().find_map(|seq| seq.descriptor()) else {
        return Ok(());
    };
    for seq in operands {
        if let Some(descriptor) = seq.descriptor() {
            reference.check_compatible(descriptor)?;
        }
    }
    Ok(())
}

fn signed_blocks(seq: &AbelianNumberSequence, sign: Sign) -> Vec<(QuantumNumber, usize)> {
    seq.counted_blocks()
        .map(|(q, count)| (sign.apply(q), count))
        .collect()
}

/// Direct sum: the signed blocks of every operand, concatenated in order.
///
/// The result is in General form and its dimension is the sum of the
/// operands' dimensions. A single quantum number enters as
/// `AbelianNumberSequence::from(qn)`.
pub fn union(operands: &[&AbelianNumberSequence], signs: &[Sign]) -> Result<AbelianNumberSequence> {
    check_operands(operands, signs)?;
    let mut contents = Vec::new();
    let mut counts = Vec::new();
    for (seq, &sign) in operands.iter().zip(signs) {
        for (q, count) in signed_blocks(seq, sign) {
            contents.push(q);
            counts.push(count);
        }
    }
    Ok(AbelianNumberSequence::from_parts(
        contents,
        counts_to_indptr(&counts),
        SortForm::General,
    ))
}

/// Tensor product of the operands' blocks.
///
/// Blocks are enumerated row-major with the first operand outermost: for two
/// operands, block `(a, b)` lands at position `a * B.len() + b`, with value
/// `signs[0]·vA + signs[1]·vB` and count `countA * countB`. The result is in
/// General form.
///
/// # Example
/// ```
/// use tensor4all_quantumnumbers::{kron, AbelianNumberSequence, QnDescriptor, QuantumNumber, Sign};
///
/// let n = QnDescriptor::charge();
/// let q = |v| QuantumNumber::new(&n, &[v]).unwrap();
/// let a = AbelianNumberSequence::from_count_pairs(vec![(q(2), 2)]).unwrap();
/// let b = AbelianNumberSequence::from_count_pairs(vec![(q(1), 3)]).unwrap();
///
/// let k = kron(&[&a, &b], &[Sign::Plus, Sign::Minus]).unwrap();
/// assert_eq!(k.len(), 1);
/// assert_eq!(k.count(0), 6);
/// assert_eq!(k.value(0).components(), &[1]);
/// ```
pub fn kron(operands: &[&AbelianNumberSequence], signs: &[Sign]) -> Result<AbelianNumberSequence> {
    check_operands(operands, signs)?;
    let mut blocks = signed_blocks(operands[0], signs[0]);
    for (seq, &sign) in operands.iter().zip(signs).skip(1) {
        let factor = signed_blocks(seq, sign);
        let mut next = Vec::with_capacity(blocks.len() * factor.len());
        for (left, left_count) in &blocks {
            for (right, right_count) in &factor {
                next.push((left.try_add(right)?, left_count * right_count));
            }
        }
        blocks = next;
    }
    let (contents, counts): (Vec<_>, Vec<_>) = blocks.into_iter().unzip();
    Ok(AbelianNumberSequence::from_parts(
        contents,
        counts_to_indptr(&counts),
        SortForm::General,
    ))
}

/// Canonical tensor product with provenance.
///
/// Equivalent to sorting [`kron`], and additionally records which tuple of
/// source values (unsigned, one per operand) fills which sub-range of the
/// canonical result. Within one result value the sub-ranges follow the
/// row-major order of `kron` and tile the value's block exactly.
///
/// Every operand must hold distinct values (Unique or Canonical content) so
/// that each source tuple owns one contiguous sub-range.
#[tracing::instrument(level = "debug", skip_all, fields(operands = operands.len()))]
pub fn prod(
    operands: &[&AbelianNumberSequence],
    signs: &[Sign],
) -> Result<(AbelianNumberSequence, ProductRecord)> {
    check_operands(operands, signs)?;
    for (operand, seq) in operands.iter().enumerate() {
        let mut seen = HashSet::with_capacity(seq.len());
        if !seq.contents().iter().all(|q| seen.insert(q)) {
            return Err(QuantumNumberError::RepeatedFactorValue { operand });
        }
    }

    // (value, source values, count) in kron order
    let mut blocks: Vec<(QuantumNumber, Vec<QuantumNumber>, usize)> = operands[0]
        .counted_blocks()
        .map(|(q, count)| (signs[0].apply(q), vec![q.clone()], count))
        .collect();
    for (seq, &sign) in operands.iter().zip(signs).skip(1) {
        let mut next = Vec::with_capacity(blocks.len() * seq.len());
        for (left, sources, left_count) in &blocks {
            for (q, right_count) in seq.counted_blocks() {
                let mut tuple = sources.clone();
                tuple.push(q.clone());
                next.push((left.try_add(&sign.apply(q))?, tuple, left_count * right_count));
            }
        }
        blocks = next;
    }
    blocks.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records = ProductRecord::new();
    let mut contents: Vec<QuantumNumber> = Vec::new();
    let mut indptr = vec![0];
    let mut cursor = 0;
    for (value, sources, count) in blocks {
        let range = cursor..cursor + count;
        cursor += count;
        if contents.last() == Some(&value) {
            if let Some(end) = indptr.last_mut() {
                *end = cursor;
            }
        } else {
            contents.push(value.clone());
            indptr.push(cursor);
        }
        records.entry(value).or_default().insert(sources, range);
    }
    tracing::debug!(
        blocks = contents.len(),
        dimension = cursor,
        "built canonical product"
    );
    Ok((
        AbelianNumberSequence::from_parts(contents, indptr, SortForm::Canonical),
        records,
    ))
}

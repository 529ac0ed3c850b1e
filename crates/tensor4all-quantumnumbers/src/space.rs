//! Quantum-number sequences as the block structure of a tensor index.

use crate::error::Result;
use crate::quantum_number::QuantumNumber;
use crate::sequence::AbelianNumberSequence;

/// Block structure of a symmetric index space.
///
/// A space is split into consecutive blocks, each labelled by a sector.
/// Tensor code only needs the block sizes and the position -> block lookup;
/// the sector label decides which blocks of different indices may couple.
pub trait Symmetry {
    /// Label of one block.
    type Sector;

    /// Total dimension of the space (sum of all block dimensions).
    fn total_dim(&self) -> usize;

    /// Dimensions of the blocks, in block order.
    fn block_dims(&self) -> Vec<usize>;

    /// Sector of block `block`, `None` past the last block.
    fn sector(&self, block: usize) -> Option<&Self::Sector>;

    /// Block holding the flat position `position`.
    fn block_of(&self, position: usize) -> Result<usize>;
}

impl Symmetry for AbelianNumberSequence {
    type Sector = QuantumNumber;

    fn total_dim(&self) -> usize {
        self.dimension()
    }

    fn block_dims(&self) -> Vec<usize> {
        self.counted_blocks().map(|(_, count)| count).collect()
    }

    fn sector(&self, block: usize) -> Option<&QuantumNumber> {
        self.contents().get(block)
    }

    fn block_of(&self, position: usize) -> Result<usize> {
        self.find_block(position, 0)
    }
}

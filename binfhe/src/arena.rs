use crate::concurrency::alloc::{AlignedBuffer, Allocator, SystemAllocator};
use crate::rgsw::GadgetMatrix;
use math::error::{Error, Result};

/// Shape of a stack of gadget matrices sharing one flat buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    /// Number of matrices.
    pub matrices: usize,
    /// Rows per matrix.
    pub rows: usize,
    /// Polynomials per row.
    pub cols: usize,
    pub channels: usize,
    pub n: usize,
}

impl ArenaLayout {
    #[inline(always)]
    pub fn channel_stride(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn poly_stride(&self) -> usize {
        self.n * self.channels
    }

    #[inline(always)]
    pub fn row_stride(&self) -> usize {
        self.cols * self.poly_stride()
    }

    #[inline(always)]
    pub fn matrix_stride(&self) -> usize {
        self.rows * self.row_stride()
    }

    pub fn words(&self) -> usize {
        self.matrices * self.matrix_stride()
    }
}

/// Flat storage for evaluation keys, addressed as
/// `matrix * matrix_stride + row * row_stride + col * poly_stride + channel * n + coeff`.
/// Index checks only run in debug builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyArena {
    layout: ArenaLayout,
    data: AlignedBuffer,
}

impl KeyArena {
    pub fn new(layout: ArenaLayout) -> Result<Self> {
        Self::new_in(layout, &SystemAllocator, 0)
    }

    pub fn new_in(layout: ArenaLayout, alloc: &dyn Allocator, node: usize) -> Result<Self> {
        Ok(Self {
            layout,
            data: alloc.alloc_aligned(layout.words(), node)?,
        })
    }

    /// Wraps words read back from storage.
    pub fn from_words(layout: ArenaLayout, words: &[u64]) -> Result<Self> {
        if words.len() != layout.words() {
            return Err(Error::ParameterMismatch(format!(
                "{} words given for an arena of {} words",
                words.len(),
                layout.words()
            )));
        }
        let mut arena: KeyArena = Self::new(layout)?;
        arena.data.as_mut().copy_from_slice(words);
        Ok(arena)
    }

    /// Deep copy placed on another memory domain.
    pub fn replicate(&self, alloc: &dyn Allocator, node: usize) -> Result<Self> {
        Ok(Self {
            layout: self.layout,
            data: self.data.replicate(alloc, node)?,
        })
    }

    #[inline(always)]
    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    #[inline(always)]
    pub fn matrices(&self) -> usize {
        self.layout.matrices
    }

    pub fn words(&self) -> &[u64] {
        self.data.as_ref()
    }

    #[inline(always)]
    pub fn matrix(&self, m: usize) -> GadgetMatrix<&[u64]> {
        #[cfg(debug_assertions)]
        {
            assert!(m < self.layout.matrices, "matrix {} >= {}", m, self.layout.matrices);
        }
        let stride: usize = self.layout.matrix_stride();
        GadgetMatrix::from_data(
            &self.data.as_ref()[m * stride..(m + 1) * stride],
            self.layout.rows,
            self.layout.cols,
            self.layout.channels,
            self.layout.n,
        )
    }

    #[inline(always)]
    pub fn matrix_mut(&mut self, m: usize) -> GadgetMatrix<&mut [u64]> {
        #[cfg(debug_assertions)]
        {
            assert!(m < self.layout.matrices, "matrix {} >= {}", m, self.layout.matrices);
        }
        let stride: usize = self.layout.matrix_stride();
        let (rows, cols, channels, n) = (
            self.layout.rows,
            self.layout.cols,
            self.layout.channels,
            self.layout.n,
        );
        GadgetMatrix::from_data(
            &mut self.data.as_mut()[m * stride..(m + 1) * stride],
            rows,
            cols,
            channels,
            n,
        )
    }

    /// Coefficient `coeff` of channel `channel` of polynomial (m, row, col).
    #[inline(always)]
    pub fn coeff(&self, m: usize, row: usize, col: usize, channel: usize, coeff: usize) -> u64 {
        let l: &ArenaLayout = &self.layout;
        #[cfg(debug_assertions)]
        {
            assert!(m < l.matrices && row < l.rows && col < l.cols);
            assert!(channel < l.channels && coeff < l.n);
        }
        self.data.as_ref()[m * l.matrix_stride()
            + row * l.row_stride()
            + col * l.poly_stride()
            + channel * l.channel_stride()
            + coeff]
    }
}

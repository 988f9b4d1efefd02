//! Block height measurement
//!
//! Pagination never looks at a rendering engine directly. It asks a
//! [`BlockMeasurer`] how tall blocks are at a given container width and
//! font size; the GUI measures with its text layout, tests use fixed heights.

use crate::types::{Block, Result};

pub trait BlockMeasurer {
    /// Rendered height of a single block
    fn block_height(&self, block: &Block, width: f32, font_size: f32) -> Result<f32>;

    /// Rendered height of a run of blocks stacked vertically.
    ///
    /// Implementations that add spacing between blocks override this.
    fn stack_height(&self, blocks: &[Block], width: f32, font_size: f32) -> Result<f32> {
        blocks.iter().try_fold(0.0, |total, block| {
            Ok(total + self.block_height(block, width, font_size)?)
        })
    }
}

impl<M: BlockMeasurer + ?Sized> BlockMeasurer for &M {
    fn block_height(&self, block: &Block, width: f32, font_size: f32) -> Result<f32> {
        (**self).block_height(block, width, font_size)
    }

    fn stack_height(&self, blocks: &[Block], width: f32, font_size: f32) -> Result<f32> {
        (**self).stack_height(blocks, width, font_size)
    }
}

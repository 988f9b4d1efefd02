//! Pagination of blocks into fixed-height page regions

use crate::types::{Block, ComposeError, Page, Pagination, Result};

use super::BlockMeasurer;

/// Flow `blocks` into pages whose content region is `width` × `height`.
///
/// Blocks are never split. A block taller than the region on its own gets a
/// page to itself. If the measurer fails, the whole document is returned as
/// a single page and the result is flagged as degraded.
pub fn layout<M: BlockMeasurer + ?Sized>(
    blocks: &[Block],
    width: f32,
    height: f32,
    font_size: f32,
    measurer: &M,
) -> Pagination {
    if blocks.is_empty() {
        return Pagination::default();
    }

    match paginate(blocks, width, height, font_size, measurer) {
        Ok(pages) => {
            log::debug!(
                "Laid out {} blocks into {} pages ({}x{} @ {}px)",
                blocks.len(),
                pages.len(),
                width,
                height,
                font_size
            );
            Pagination {
                pages,
                degraded: false,
            }
        }
        Err(e) => {
            log::warn!("Layout degraded to a single page: {}", e);
            Pagination {
                pages: vec![Page::new(blocks.to_vec())],
                degraded: true,
            }
        }
    }
}

fn paginate<M: BlockMeasurer + ?Sized>(
    blocks: &[Block],
    width: f32,
    height: f32,
    font_size: f32,
    measurer: &M,
) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    let mut current: Vec<Block> = Vec::new();

    for block in blocks {
        current.push(block.clone());

        let measured = measurer.stack_height(&current, width, font_size)?;
        if !measured.is_finite() {
            return Err(ComposeError::Measure(format!(
                "non-finite height {} for {} blocks",
                measured,
                current.len()
            )));
        }

        if measured > height {
            // Close the page without the block that overflowed it
            if let Some(overflowing) = current.pop() {
                if !current.is_empty() {
                    pages.push(Page::new(std::mem::take(&mut current)));
                }
                current.push(overflowing);
            }
        }
    }

    if !current.is_empty() {
        pages.push(Page::new(current));
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Heights keyed by block markup; unknown blocks measure 0
    struct FixedHeights(HashMap<String, f32>);

    impl FixedHeights {
        fn new(entries: &[(&Block, f32)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(block, h)| (block.markup().to_string(), *h))
                    .collect(),
            )
        }
    }

    impl BlockMeasurer for FixedHeights {
        fn block_height(&self, block: &Block, _width: f32, _font_size: f32) -> Result<f32> {
            Ok(self.0.get(block.markup()).copied().unwrap_or(0.0))
        }
    }

    fn block(n: usize) -> Block {
        Block::new(format!("<p>{n}</p>"))
    }

    #[test]
    fn test_exact_fit_stays_on_page() {
        let blocks = vec![block(1), block(2)];
        let measurer = FixedHeights::new(&[(&blocks[0], 400.0), (&blocks[1], 450.0)]);

        let result = layout(&blocks, 630.0, 850.0, 16.0, &measurer);
        assert_eq!(result.page_count(), 1);
        assert!(!result.degraded);
    }

    #[test]
    fn test_oversized_block_between_small_ones() {
        let blocks = vec![block(1), block(2), block(3)];
        let measurer = FixedHeights::new(&[
            (&blocks[0], 100.0),
            (&blocks[1], 2000.0),
            (&blocks[2], 100.0),
        ]);

        let result = layout(&blocks, 630.0, 850.0, 16.0, &measurer);
        assert_eq!(result.page_count(), 3);
        assert_eq!(result.pages[0].blocks, vec![block(1)]);
        assert_eq!(result.pages[1].blocks, vec![block(2)]);
        assert_eq!(result.pages[2].blocks, vec![block(3)]);
    }

    #[test]
    fn test_non_finite_height_degrades() {
        let blocks = vec![block(1), block(2)];
        let measurer = FixedHeights::new(&[(&blocks[0], f32::NAN)]);

        let result = layout(&blocks, 630.0, 850.0, 16.0, &measurer);
        assert!(result.degraded);
        assert_eq!(result.pages, vec![Page::new(blocks)]);
    }
}

use a4_compose::*;
use proptest::prelude::*;

/// Block height is the number in the block's markup, e.g. `<p>300</p>`
struct NumberedHeights;

impl BlockMeasurer for NumberedHeights {
    fn block_height(&self, block: &Block, _width: f32, _font_size: f32) -> Result<f32> {
        block
            .text()
            .trim()
            .parse::<f32>()
            .map_err(|e| ComposeError::Measure(e.to_string()))
    }
}

/// Scales line count with font size and wraps against the width
struct TextMeasurer;

impl BlockMeasurer for TextMeasurer {
    fn block_height(&self, block: &Block, width: f32, font_size: f32) -> Result<f32> {
        let chars_per_line = (width / (font_size * 0.5)).floor().max(1.0);
        let lines = (block.text().chars().count() as f32 / chars_per_line).ceil().max(1.0);
        Ok(lines * font_size * constants::LINE_HEIGHT_FACTOR)
    }
}

struct Unavailable;

impl BlockMeasurer for Unavailable {
    fn block_height(&self, _block: &Block, _width: f32, _font_size: f32) -> Result<f32> {
        Err(ComposeError::Measure("renderer not mounted".to_string()))
    }
}

fn blocks(heights: &[u32]) -> Vec<Block> {
    heights
        .iter()
        .map(|h| Block::new(format!("<p>{h}</p>")))
        .collect()
}

fn page_heights(result: &Pagination) -> Vec<Vec<u32>> {
    result
        .pages
        .iter()
        .map(|page| {
            page.blocks
                .iter()
                .map(|b| b.text().trim().parse().unwrap())
                .collect()
        })
        .collect()
}

#[test]
fn test_empty_document_has_no_pages() {
    let result = layout(&[], 630.0, 850.0, 16.0, &NumberedHeights);
    assert_eq!(result.page_count(), 0);
    assert!(!result.degraded);
}

#[test]
fn test_overflow_starts_new_page() {
    let result = layout(&blocks(&[300, 400, 500]), 630.0, 850.0, 16.0, &NumberedHeights);
    assert_eq!(page_heights(&result), vec![vec![300, 400], vec![500]]);
}

#[test]
fn test_taller_region_holds_more() {
    let result = layout(&blocks(&[300, 400, 500]), 630.0, 1200.0, 16.0, &NumberedHeights);
    assert_eq!(page_heights(&result), vec![vec![300, 400, 500]]);
}

#[test]
fn test_oversized_block_gets_own_page() {
    let result = layout(&blocks(&[2000]), 630.0, 850.0, 16.0, &NumberedHeights);
    assert_eq!(page_heights(&result), vec![vec![2000]]);

    let result = layout(&blocks(&[100, 2000, 100]), 630.0, 850.0, 16.0, &NumberedHeights);
    assert_eq!(page_heights(&result), vec![vec![100], vec![2000], vec![100]]);
}

#[test]
fn test_measurement_failure_degrades_to_single_page() {
    let input = blocks(&[300, 400, 500, 600]);
    let result = layout(&input, 630.0, 850.0, 16.0, &Unavailable);
    assert!(result.degraded);
    assert_eq!(result.page_count(), 1);
    assert_eq!(result.pages[0].blocks, input);
}

#[test]
fn test_larger_font_needs_more_pages() {
    let text = "lorem ipsum dolor sit amet ".repeat(20);
    let input: Vec<Block> = (0..30)
        .map(|_| Block::new(format!("<p>{text}</p>")))
        .collect();

    let small = layout(&input, 630.0, 850.0, 12.0, &TextMeasurer);
    let large = layout(&input, 630.0, 850.0, 32.0, &TextMeasurer);
    assert!(large.page_count() > small.page_count());
}

#[test]
fn test_narrower_region_needs_more_pages() {
    let text = "wrap me ".repeat(40);
    let input: Vec<Block> = (0..20)
        .map(|_| Block::new(format!("<p>{text}</p>")))
        .collect();

    let wide = layout(&input, 630.0, 850.0, 16.0, &TextMeasurer);
    let narrow = layout(&input, 200.0, 850.0, 16.0, &TextMeasurer);
    assert!(narrow.page_count() > wide.page_count());
}

proptest! {
    #[test]
    fn prop_pages_partition_blocks_in_order(
        heights in prop::collection::vec(1u32..1500, 0..40),
        region in 100u32..1500,
    ) {
        let input = blocks(&heights);
        let result = layout(&input, 630.0, region as f32, 16.0, &NumberedHeights);

        let flattened: Vec<Block> = result.blocks().cloned().collect();
        prop_assert_eq!(flattened, input);
        prop_assert!(result.pages.iter().all(|page| !page.blocks.is_empty()));

        for page in page_heights(&result) {
            let total: u32 = page.iter().sum();
            // Only a lone block may exceed the region
            prop_assert!(total <= region || page.len() == 1);
        }
    }

    #[test]
    fn prop_layout_is_idempotent(
        heights in prop::collection::vec(1u32..1500, 0..40),
        region in 100u32..1500,
    ) {
        let input = blocks(&heights);
        let first = layout(&input, 630.0, region as f32, 16.0, &NumberedHeights);
        let second = layout(&input, 630.0, region as f32, 16.0, &NumberedHeights);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_greedy_fill(
        heights in prop::collection::vec(1u32..1500, 1..40),
        region in 100u32..1500,
    ) {
        let input = blocks(&heights);
        let result = layout(&input, 630.0, region as f32, 16.0, &NumberedHeights);
        let pages = page_heights(&result);

        // The first block of each following page would not have fit
        for pair in pages.windows(2) {
            let used: u32 = pair[0].iter().sum();
            prop_assert!((used + pair[1][0]) as f32 > region as f32);
        }
    }
}

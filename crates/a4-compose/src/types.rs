use std::sync::Arc;
use thiserror::Error;

use crate::markup;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Unsupported input: {0}")]
    Input(String),
    #[error("Conversion error: {0}")]
    Conversion(String),
    #[error("Capture of page {page} failed: {reason}")]
    Capture { page: usize, reason: String },
    #[error("Assembly error: {0}")]
    Assembly(String),
    #[error("Capability not ready: {0}")]
    NotReady(&'static str),
    #[error("Measurement unavailable: {0}")]
    Measure(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to export")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// A point in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The content region rectangle, in canvas pixels.
///
/// Width and height drive pagination; x and y only affect where the
/// region is drawn on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for GeometryBox {
    fn default() -> Self {
        Self {
            x: 80.0,
            y: 120.0,
            width: 630.0,
            height: 850.0,
        }
    }
}

impl GeometryBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when width and height differ from `other`
    pub fn size_differs(&self, other: &GeometryBox) -> bool {
        self.width != other.width || self.height != other.height
    }
}

/// Minimum content region dimensions per axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MinSize {
    pub width: f32,
    pub height: f32,
}

impl Default for MinSize {
    fn default() -> Self {
        Self::uniform(100.0)
    }
}

impl MinSize {
    pub fn uniform(min: f32) -> Self {
        Self {
            width: min,
            height: min,
        }
    }
}

/// Block-level element categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
    List,
    Table,
    Other,
}

/// One top-level content element.
///
/// A block has no intrinsic height: it is measured against the current
/// container width and font size every time pagination runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    markup: Arc<str>,
}

impl Block {
    pub fn new(markup: impl Into<Arc<str>>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn kind(&self) -> BlockKind {
        match markup::leading_tag(&self.markup).as_deref() {
            Some("h1") => BlockKind::Heading(1),
            Some("h2") => BlockKind::Heading(2),
            Some("h3") => BlockKind::Heading(3),
            Some("h4") => BlockKind::Heading(4),
            Some("h5") => BlockKind::Heading(5),
            Some("h6") => BlockKind::Heading(6),
            Some("p") => BlockKind::Paragraph,
            Some("li") => BlockKind::ListItem,
            Some("ul") | Some("ol") => BlockKind::List,
            Some("table") => BlockKind::Table,
            _ => BlockKind::Other,
        }
    }

    /// Plain text with tags stripped and block-level breaks kept as newlines
    pub fn text(&self) -> String {
        markup::plain_text(&self.markup)
    }
}

/// A loaded document: ordered blocks, immutable once loaded
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub name: String,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    /// Split markup into top-level blocks
    pub fn from_markup(name: impl Into<String>, markup: &str) -> Self {
        Self::new(name, markup::split_blocks(markup))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One output page: a run of consecutive blocks
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn markup(&self) -> String {
        self.blocks.iter().map(Block::markup).collect()
    }
}

/// Result of a layout pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pagination {
    pub pages: Vec<Page>,
    /// Set when measurement failed and the whole document was placed on one page
    pub degraded: bool,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All blocks in page order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|page| page.blocks.iter())
    }
}

/// A background image applied to every page
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Template {
    pub name: String,
    pub url: String,
}

impl Template {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

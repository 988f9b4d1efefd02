pub mod constants;
mod composer;
pub mod export;
mod geometry;
mod layout;
mod loader;
pub mod markup;
mod options;
mod types;

pub use composer::Composer;
pub use export::{
    Artifact, ArtifactAssembler, ExportMode, ExportModeSwitch, ExportPipeline, PageRasterizer,
    PdfAssembler, PlacementMm, PreviewHandle,
};
pub use geometry::*;
pub use layout::*;
pub use loader::*;
pub use options::*;
pub use types::*;

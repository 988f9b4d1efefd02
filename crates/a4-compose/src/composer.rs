//! Composer session state
//!
//! Ties a loaded document, the selected template, the font size and the
//! content region together, and keeps the pagination in step with them.

use crate::geometry::{Affordances, GeometryChange, GeometryModel, NoCapture, PointerCapture};
use crate::layout::{BlockMeasurer, layout};
use crate::options::ComposerOptions;
use crate::types::*;

#[derive(Debug)]
pub struct Composer<C: PointerCapture = NoCapture> {
    options: ComposerOptions,
    document: Option<Document>,
    template: Option<Template>,
    font_size: f32,
    geometry: GeometryModel<C>,
    pagination: Pagination,
}

impl Composer<NoCapture> {
    pub fn new(options: ComposerOptions) -> Self {
        Self::with_capture(options, NoCapture)
    }
}

impl Default for Composer<NoCapture> {
    fn default() -> Self {
        Self::new(ComposerOptions::default())
    }
}

impl<C: PointerCapture> Composer<C> {
    pub fn with_capture(options: ComposerOptions, capture: C) -> Self {
        let geometry = GeometryModel::with_capture(options.default_box, options.min_region, capture);
        let font_size = options.clamp_font_size(options.font_size);
        Self {
            options,
            document: None,
            template: None,
            font_size,
            geometry,
            pagination: Pagination::default(),
        }
    }

    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn geometry(&self) -> &GeometryModel<C> {
        &self.geometry
    }

    pub fn bounds(&self) -> GeometryBox {
        self.geometry.bounds()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pages(&self) -> &[Page] {
        &self.pagination.pages
    }

    pub fn exporting(&self) -> bool {
        self.geometry.export_mode()
    }

    pub fn affordances(&self, page_index: usize) -> Affordances {
        self.geometry.affordances(page_index)
    }

    /// Replace the current document and paginate it
    pub fn load_document<M: BlockMeasurer + ?Sized>(&mut self, document: Document, measurer: &M) {
        self.document = Some(document);
        self.relayout(measurer);
    }

    pub fn select_template(&mut self, template: Template) {
        log::debug!("Selected template {}", template.name);
        self.template = Some(template);
    }

    /// Set the font size, clamped to the configured range, and paginate again
    pub fn set_font_size<M: BlockMeasurer + ?Sized>(&mut self, size: f32, measurer: &M) {
        let clamped = self.options.clamp_font_size(size);
        if clamped != self.font_size {
            self.font_size = clamped;
            self.relayout(measurer);
        }
    }

    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        self.geometry.begin_drag(pointer)
    }

    pub fn begin_resize(&mut self, pointer: Point) -> bool {
        self.geometry.begin_resize(pointer)
    }

    /// Forward pointer movement to the active gesture; a resize repaginates
    pub fn pointer_moved<M: BlockMeasurer + ?Sized>(
        &mut self,
        pointer: Point,
        measurer: &M,
    ) -> Option<GeometryChange> {
        let change = self.geometry.pointer_moved(pointer);
        if change.is_some_and(GeometryChange::needs_layout) {
            self.relayout(measurer);
        }
        change
    }

    pub fn end_gesture(&mut self) {
        self.geometry.end();
    }

    pub fn set_export_mode(&mut self, active: bool) {
        self.geometry.set_export_mode(active);
    }

    /// Clear the document and template and restore font size and region
    pub fn reset(&mut self) {
        self.document = None;
        self.template = None;
        self.font_size = self.options.clamp_font_size(self.options.font_size);
        self.geometry.reset();
        self.pagination = Pagination::default();
        log::info!("Composer reset");
    }

    /// Paginate the current document against the current region and font size
    pub fn relayout<M: BlockMeasurer + ?Sized>(&mut self, measurer: &M) {
        let bounds = self.geometry.bounds();
        self.pagination = match &self.document {
            Some(document) => layout(
                &document.blocks,
                bounds.width,
                bounds.height,
                self.font_size,
                measurer,
            ),
            None => Pagination::default(),
        };
    }
}

use a4_compose::*;
use image::RgbaImage;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    ExportMode(bool),
    Capture { page: usize, scale: f32 },
    AddPage,
    Place { width: u32, area: PlacementMm },
    Finish,
}

type Log = Arc<Mutex<Vec<Event>>>;

struct RecordingSwitch {
    log: Log,
}

impl ExportModeSwitch for RecordingSwitch {
    fn set_export_mode(&mut self, active: bool) {
        self.log.lock().unwrap().push(Event::ExportMode(active));
    }
}

struct RecordingRasterizer {
    log: Log,
    fail_on: Option<usize>,
    captured_at: Vec<tokio::time::Instant>,
}

impl PageRasterizer for RecordingRasterizer {
    async fn capture(&mut self, page_index: usize, _page: &Page, scale: f32) -> Result<RgbaImage> {
        self.captured_at.push(tokio::time::Instant::now());
        self.log.lock().unwrap().push(Event::Capture {
            page: page_index,
            scale,
        });
        if self.fail_on == Some(page_index) {
            return Err(ComposeError::NotReady("page not rendered"));
        }
        // Page index encoded in the width
        Ok(RgbaImage::new(10 + page_index as u32, 14))
    }
}

struct RecordingAssembler {
    log: Log,
    placed: usize,
    fail_place_on: Option<usize>,
}

impl RecordingAssembler {
    fn new(log: Log) -> Self {
        Self {
            log,
            placed: 0,
            fail_place_on: None,
        }
    }
}

impl ArtifactAssembler for RecordingAssembler {
    async fn add_page(&mut self) -> Result<()> {
        self.log.lock().unwrap().push(Event::AddPage);
        Ok(())
    }

    async fn place_image(&mut self, image: RgbaImage, area: PlacementMm) -> Result<()> {
        if self.fail_place_on == Some(self.placed) {
            return Err(ComposeError::Assembly("image could not be embedded".to_string()));
        }
        self.placed += 1;
        self.log.lock().unwrap().push(Event::Place {
            width: image.width(),
            area,
        });
        Ok(())
    }

    async fn finish(self) -> Result<Vec<u8>> {
        self.log.lock().unwrap().push(Event::Finish);
        Ok(b"%PDF-1.7 recorded".to_vec())
    }
}

fn pages(count: usize) -> Vec<Page> {
    (0..count)
        .map(|n| Page::new(vec![Block::new(format!("<p>page {n}</p>"))]))
        .collect()
}

fn fixtures(fail_on: Option<usize>) -> (Log, RecordingRasterizer, RecordingAssembler, RecordingSwitch) {
    let log: Log = Arc::default();
    (
        log.clone(),
        RecordingRasterizer {
            log: log.clone(),
            fail_on,
            captured_at: Vec::new(),
        },
        RecordingAssembler::new(log.clone()),
        RecordingSwitch { log },
    )
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("output should be a valid PDF")
        .get_pages()
        .len()
}

#[tokio::test(start_paused = true)]
async fn test_pages_captured_in_order_inside_export_mode() {
    let (log, mut rasterizer, assembler, mut switch) = fixtures(None);
    let dir = tempfile::tempdir().unwrap();
    let mode = ExportMode::download_in(dir.path(), "document.pdf");

    ExportPipeline::default()
        .export(&pages(3), &mode, &mut rasterizer, assembler, &mut switch)
        .await
        .unwrap();

    let area = PlacementMm::full_page((210.0, 297.0));
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Event::ExportMode(true),
            Event::Capture { page: 0, scale: 2.0 },
            Event::Place { width: 10, area },
            Event::Capture { page: 1, scale: 2.0 },
            Event::AddPage,
            Event::Place { width: 11, area },
            Event::Capture { page: 2, scale: 2.0 },
            Event::AddPage,
            Event::Place { width: 12, area },
            Event::ExportMode(false),
            Event::Finish,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_capture_waits_for_settle_interval() {
    let (log, mut rasterizer, assembler, mut switch) = fixtures(None);
    let dir = tempfile::tempdir().unwrap();
    let mode = ExportMode::download_in(dir.path(), "document.pdf");
    let pipeline = ExportPipeline::default();

    let started = tokio::time::Instant::now();
    pipeline
        .export(&pages(1), &mode, &mut rasterizer, assembler, &mut switch)
        .await
        .unwrap();

    let first_capture = rasterizer.captured_at[0];
    assert!(first_capture.duration_since(started) >= Duration::from_millis(200));
    assert_eq!(log.lock().unwrap()[0], Event::ExportMode(true));
}

#[tokio::test(start_paused = true)]
async fn test_assembly_failure_stops_capturing_and_restores_mode() {
    let (log, mut rasterizer, mut assembler, mut switch) = fixtures(None);
    assembler.fail_place_on = Some(1);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("document.pdf");
    let mode = ExportMode::Download {
        path: target.clone(),
    };

    let result = ExportPipeline::default()
        .export(&pages(3), &mode, &mut rasterizer, assembler, &mut switch)
        .await;

    assert!(matches!(result, Err(ComposeError::Assembly(_))));
    let events = log.lock().unwrap().clone();
    assert_eq!(events.last(), Some(&Event::ExportMode(false)));
    assert!(!events.contains(&Event::Capture { page: 2, scale: 2.0 }));
    assert!(!events.contains(&Event::Finish));
    assert_eq!(rasterizer.captured_at.len(), 2);
    assert!(!target.exists());
}

#[tokio::test(start_paused = true)]
async fn test_capture_failure_restores_mode_and_delivers_nothing() {
    let (log, mut rasterizer, assembler, mut switch) = fixtures(Some(1));
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("document.pdf");
    let mode = ExportMode::Download {
        path: target.clone(),
    };

    let result = ExportPipeline::default()
        .export(&pages(3), &mode, &mut rasterizer, assembler, &mut switch)
        .await;

    match result {
        Err(ComposeError::Capture { page, .. }) => assert_eq!(page, 1),
        other => panic!("Expected Capture error, got {:?}", other),
    }

    let events = log.lock().unwrap();
    assert_eq!(events.last(), Some(&Event::ExportMode(false)));
    assert!(!events.contains(&Event::Finish));
    assert!(!events.contains(&Event::Capture { page: 2, scale: 2.0 }));
    assert!(!target.exists());
}

#[tokio::test(start_paused = true)]
async fn test_no_pages_is_rejected_before_export_mode() {
    let (log, mut rasterizer, assembler, mut switch) = fixtures(None);

    let result = ExportPipeline::default()
        .export(&[], &ExportMode::Preview, &mut rasterizer, assembler, &mut switch)
        .await;

    assert!(matches!(result, Err(ComposeError::NoPages)));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_download_writes_a4_pdf() {
    let (_log, mut rasterizer, _assembler, mut switch) = fixtures(None);
    let dir = tempfile::tempdir().unwrap();
    let mode = ExportMode::download_in(dir.path(), "document.pdf");

    let artifact = ExportPipeline::default()
        .export(
            &pages(2),
            &mode,
            &mut rasterizer,
            PdfAssembler::new("document", (210.0, 297.0)),
            &mut switch,
        )
        .await
        .unwrap();

    let path = dir.path().join("document.pdf");
    assert!(matches!(&artifact, Artifact::Saved(saved) if *saved == path));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(page_count(&bytes), 2);

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let (_, first_page) = doc.get_pages().into_iter().next().unwrap();
    let media_box = doc
        .get_dictionary(first_page)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect::<Vec<_>>();
    // A4 in points
    assert!((media_box[2] - 595.28).abs() < 0.5);
    assert!((media_box[3] - 841.89).abs() < 0.5);
}

#[tokio::test(start_paused = true)]
async fn test_preview_is_transient() {
    let (_log, mut rasterizer, _assembler, mut switch) = fixtures(None);

    let artifact = ExportPipeline::default()
        .export(
            &pages(1),
            &ExportMode::Preview,
            &mut rasterizer,
            PdfAssembler::new("preview", (210.0, 297.0)),
            &mut switch,
        )
        .await
        .unwrap();

    let Artifact::Preview(handle) = artifact else {
        panic!("Expected a preview");
    };
    let path = handle.path().to_path_buf();
    assert!(handle.url().starts_with("file://"));
    assert_eq!(page_count(&std::fs::read(&path).unwrap()), 1);

    drop(handle);
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_geometry_model_leaves_export_mode() {
    let (_log, mut rasterizer, assembler, _switch) = fixtures(Some(0));
    let mut geometry = GeometryModel::new(GeometryBox::default(), MinSize::default());

    let result = ExportPipeline::default()
        .export(&pages(2), &ExportMode::Preview, &mut rasterizer, assembler, &mut geometry)
        .await;

    assert!(result.is_err());
    assert!(!geometry.export_mode());
    assert_eq!(geometry.affordances(0), Affordances::FULL);
}

#[tokio::test(start_paused = true)]
async fn test_custom_settings_are_used() {
    let (log, mut rasterizer, assembler, mut switch) = fixtures(None);
    let settings = ExportSettings {
        capture_scale: 3.0,
        page_size_mm: (148.0, 210.0),
        ..ExportSettings::default()
    };

    ExportPipeline::new(settings)
        .export(&pages(1), &ExportMode::Preview, &mut rasterizer, assembler, &mut switch)
        .await
        .unwrap();

    let events = log.lock().unwrap();
    assert!(events.contains(&Event::Capture { page: 0, scale: 3.0 }));
    assert!(events.contains(&Event::Place {
        width: 10,
        area: PlacementMm::full_page((148.0, 210.0)),
    }));
}

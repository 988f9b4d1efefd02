use a4_compose::*;

#[test]
fn test_defaults_are_valid() {
    let options = ComposerOptions::default();
    assert!(options.validate().is_ok());
    assert_eq!(options.font_size, 16.0);
    assert_eq!(options.canvas_size, (794.0, 1123.0));
    assert_eq!(options.export.capture_scale, 2.0);
    assert_eq!(options.export.page_size_mm, (210.0, 297.0));
    assert_eq!(options.export.settle_ms, 200);
    assert_eq!(options.export.default_filename, "document.pdf");
    assert_eq!(options.templates.len(), 5);
}

#[test]
fn test_validation_min_region_range() {
    let mut options = ComposerOptions::default();

    options.min_region = MinSize::uniform(120.0);
    assert!(options.validate().is_ok());

    options.min_region = MinSize::uniform(99.0);
    assert!(matches!(options.validate(), Err(ComposeError::Config(_))));

    options.min_region = MinSize {
        width: 110.0,
        height: 121.0,
    };
    match options.validate() {
        Err(ComposeError::Config(msg)) => assert!(msg.contains("height")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_validation_font_size() {
    let mut options = ComposerOptions::default();

    options.font_size = 41.0;
    assert!(options.validate().is_err());

    options.font_size = 20.0;
    options.font_size_range = (30.0, 10.0);
    assert!(options.validate().is_err());

    options.font_size_range = (10.0, 40.0);
    assert!(options.validate().is_ok());
}

#[test]
fn test_validation_default_box_smaller_than_minimum() {
    let mut options = ComposerOptions::default();
    options.default_box = GeometryBox::new(0.0, 0.0, 90.0, 500.0);
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_export_settings() {
    let mut options = ComposerOptions::default();
    options.export.capture_scale = 0.0;
    assert!(options.validate().is_err());

    let mut options = ComposerOptions::default();
    options.export.page_size_mm = (210.0, -1.0);
    assert!(options.validate().is_err());

    let mut options = ComposerOptions::default();
    options.export.default_filename = "  ".to_string();
    assert!(options.validate().is_err());
}

#[test]
fn test_font_size_clamping() {
    let options = ComposerOptions::default();
    assert_eq!(options.clamp_font_size(4.0), 10.0);
    assert_eq!(options.clamp_font_size(18.0), 18.0);
    assert_eq!(options.clamp_font_size(90.0), 40.0);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a4-composer.json");

    let mut options = ComposerOptions::default();
    options.font_size = 22.0;
    options.min_region = MinSize::uniform(120.0);
    options.export.default_filename = "letter.pdf".to_string();
    options.templates.truncate(2);

    options.save(&path).await.unwrap();
    let loaded = ComposerOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a4-composer.json");
    tokio::fs::write(&path, r#"{ "font_size": 12.0, "export": { "settle_ms": 50 } }"#)
        .await
        .unwrap();

    let loaded = ComposerOptions::load(&path).await.unwrap();
    assert_eq!(loaded.font_size, 12.0);
    assert_eq!(loaded.export.settle_ms, 50);
    assert_eq!(loaded.export.capture_scale, 2.0);
    assert_eq!(loaded.default_box, GeometryBox::default());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a4-composer.json");

    tokio::fs::write(&path, "{ not json").await.unwrap();
    assert!(matches!(
        ComposerOptions::load(&path).await,
        Err(ComposeError::Config(_))
    ));

    tokio::fs::write(&path, r#"{ "font_size": 2.0 }"#).await.unwrap();
    assert!(matches!(
        ComposerOptions::load(&path).await,
        Err(ComposeError::Config(_))
    ));
}

use rust_photo_slideshow::config::{CanvasSize, Configuration, LogLevel};
use rust_photo_slideshow::fonts::FontStyle;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.slide_interval, Duration::from_secs(5));
    assert_eq!(cfg.min_slide_interval, Duration::from_secs(3));
    assert_eq!(cfg.max_slide_interval, Duration::from_secs(120));
    assert!(cfg.autoplay);
    assert_eq!(cfg.canvas, CanvasSize::new(1920, 1080));
    assert_eq!(cfg.playlist.name, "playlist");
    assert!(cfg.playlist.is_auto_suffix());
    assert_eq!(cfg.caption.max_rows, 2);
    assert_eq!(cfg.caption.color_argb().unwrap(), 0xffff_ff00);
    assert_eq!(cfg.log_level, LogLevel::Info);
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
slide-interval: 10s
min-slide-interval: 2s
max-slide-interval: 1m
autoplay: false
canvas:
  width: 1280
  height: 720
playlist:
  name: slides
  suffix: 16x9
caption:
  max-rows: 3
  position-percent: 85
  font-size: 30
  font-style: bold
fonts:
  - name: font30_title
    size: 30
    style: bold
broken-image-path: "/usr/share/slideshow/broken.png"
log-level: warning
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.slide_interval, Duration::from_secs(10));
    assert_eq!(cfg.max_slide_interval, Duration::from_secs(60));
    assert!(!cfg.autoplay);
    assert_eq!(cfg.canvas, CanvasSize::new(1280, 720));
    assert_eq!(cfg.playlist.name, "slides");
    assert_eq!(cfg.playlist.extension, "m3u");
    assert!(!cfg.playlist.is_auto_suffix());
    assert_eq!(cfg.caption.max_rows, 3);
    assert!((cfg.caption.anchor_fraction() - 0.85).abs() < f32::EPSILON);
    assert_eq!(cfg.fonts.len(), 1);
    assert_eq!(cfg.fonts[0].style, Some(FontStyle::Bold));
    assert_eq!(
        cfg.broken_image_path,
        Some(PathBuf::from("/usr/share/slideshow/broken.png"))
    );
    assert_eq!(cfg.log_level.as_filter(), "warn");

    let request = cfg.font_request();
    assert_eq!(request.size, 30);
    assert_eq!(request.style, Some(FontStyle::Bold));
}

#[test]
fn initial_interval_is_clamped_into_bounds() {
    let yaml = "slide-interval: 1s\nmin-slide-interval: 3s\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        cfg.validated().unwrap().slide_interval,
        Duration::from_secs(3)
    );
}

#[test]
fn rejects_unknown_keys() {
    let yaml = "photo-library-path: /photos\n";
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn rejects_inverted_bounds() {
    let yaml = "min-slide-interval: 30s\nmax-slide-interval: 10s\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn rejects_bad_caption_color() {
    let yaml = "caption:\n  color: white\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("caption"));
}

#[test]
fn rejects_zero_canvas() {
    let yaml = "canvas:\n  width: 0\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "artifact-quality: 75\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.artifact_quality, 75);
}

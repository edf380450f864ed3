use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::error::Error;
use crate::fonts::{FontFace, FontRequest, FontStyle};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Initial auto-advance interval.
    #[serde(with = "humantime_serde")]
    pub slide_interval: Duration,
    /// Lower bound for speed-down.
    #[serde(with = "humantime_serde")]
    pub min_slide_interval: Duration,
    /// Upper bound for speed-up.
    #[serde(with = "humantime_serde")]
    pub max_slide_interval: Duration,
    /// Amount added/removed by a single speed-up/speed-down.
    #[serde(with = "humantime_serde")]
    pub slide_interval_step: Duration,
    /// Start the session auto-advancing.
    pub autoplay: bool,
    /// Fixed output canvas every slide is rendered to.
    pub canvas: CanvasSize,
    /// Playlist naming policy.
    pub playlist: PlaylistSettings,
    /// Caption overlay settings.
    pub caption: CaptionSettings,
    /// Fonts available on the host, consulted when picking the caption font.
    pub fonts: Vec<FontFace>,
    /// Image shown in place of slides that cannot be decoded.
    pub broken_image_path: Option<PathBuf>,
    /// Parent directory for rendered artifacts (defaults to the system temp dir).
    pub cache_dir: Option<PathBuf>,
    /// JPEG quality of rendered artifacts.
    pub artifact_quality: u8,
    pub log_level: LogLevel,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(mut self) -> Result<Self> {
        ensure!(
            self.min_slide_interval <= self.max_slide_interval,
            "min-slide-interval must not exceed max-slide-interval"
        );
        ensure!(
            self.slide_interval_step > Duration::ZERO,
            "slide-interval-step must be positive"
        );
        ensure!(
            self.min_slide_interval > Duration::ZERO,
            "min-slide-interval must be positive"
        );
        ensure!(
            (1..=100).contains(&self.artifact_quality),
            "artifact-quality must be between 1 and 100"
        );
        self.canvas.validate().context("invalid canvas")?;
        self.caption.validate().context("invalid caption settings")?;
        self.slide_interval = self
            .slide_interval
            .clamp(self.min_slide_interval, self.max_slide_interval);
        Ok(self)
    }

    /// Preferred caption font as requested by the caption settings.
    pub fn font_request(&self) -> FontRequest {
        FontRequest {
            name: self.caption.font_name.clone(),
            size: self.caption.font_size,
            style: self.caption.font_style,
        }
    }

    const fn default_slide_interval() -> Duration {
        Duration::from_secs(5)
    }

    const fn default_min_slide_interval() -> Duration {
        Duration::from_secs(3)
    }

    const fn default_max_slide_interval() -> Duration {
        Duration::from_secs(120)
    }

    const fn default_slide_interval_step() -> Duration {
        Duration::from_secs(1)
    }

    const fn default_artifact_quality() -> u8 {
        90
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            slide_interval: Self::default_slide_interval(),
            min_slide_interval: Self::default_min_slide_interval(),
            max_slide_interval: Self::default_max_slide_interval(),
            slide_interval_step: Self::default_slide_interval_step(),
            autoplay: true,
            canvas: CanvasSize::default(),
            playlist: PlaylistSettings::default(),
            caption: CaptionSettings::default(),
            fonts: Vec::new(),
            broken_image_path: None,
            cache_dir: None,
            artifact_quality: Self::default_artifact_quality(),
            log_level: LogLevel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.width > 0, "canvas.width must be greater than zero");
        ensure!(self.height > 0, "canvas.height must be greater than zero");
        Ok(())
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PlaylistSettings {
    /// Base name, e.g. `playlist` for `playlist_16x9.m3u`.
    pub name: String,
    pub extension: String,
    /// `auto` to pick the preset closest to the canvas ratio, or a literal
    /// suffix such as `16x9`.
    pub suffix: String,
}

impl PlaylistSettings {
    pub fn is_auto_suffix(&self) -> bool {
        self.suffix.eq_ignore_ascii_case("auto")
    }
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            name: "playlist".into(),
            extension: "m3u".into(),
            suffix: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CaptionSettings {
    pub visible: bool,
    pub max_rows: usize,
    /// Vertical anchor of the caption bottom edge, percent of canvas height.
    pub position_percent: f32,
    /// `None` lets the font catalog pick by size.
    pub font_name: Option<String>,
    pub font_size: u32,
    pub font_style: Option<FontStyle>,
    /// Average glyph width over glyph height.
    pub char_aspect_ratio: f32,
    /// AARRGGBB, e.g. `0xffffff00`.
    pub color: String,
}

impl CaptionSettings {
    pub fn anchor_fraction(&self) -> f32 {
        self.position_percent / 100.0
    }

    pub fn color_argb(&self) -> Result<u32> {
        let digits = self
            .color
            .strip_prefix("0x")
            .or_else(|| self.color.strip_prefix("0X"))
            .unwrap_or(&self.color);
        ensure!(
            digits.len() == 8,
            "caption.color must be 8 hex digits (AARRGGBB)"
        );
        u32::from_str_radix(digits, 16)
            .with_context(|| format!("caption.color {:?} is not hexadecimal", self.color))
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.max_rows >= 1, "caption.max-rows must be at least 1");
        ensure!(
            (0.0..=100.0).contains(&self.position_percent),
            "caption.position-percent must be between 0 and 100"
        );
        ensure!(
            self.char_aspect_ratio.is_finite() && self.char_aspect_ratio > 0.0,
            "caption.char-aspect-ratio must be positive"
        );
        ensure!(self.font_size > 0, "caption.font-size must be positive");
        self.color_argb()?;
        Ok(())
    }
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            visible: true,
            max_rows: 2,
            position_percent: 90.0,
            font_name: None,
            font_size: 36,
            font_style: None,
            char_aspect_ratio: 0.37,
            color: "0xffffff00".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

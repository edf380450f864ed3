//! Playlist parsing and the policy that picks which playlist file to read.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::{CanvasSize, PlaylistSettings};
use crate::error::{Error, GeometryError, PlaylistError};
use crate::events::Notification;
use crate::processing::geometry::CropGeometry;

/// Aspect-ratio presets a playlist can be authored for.
pub const FRAME_RATIOS: [&str; 4] = ["24x9", "16x9", "3x2", "4x3"];

const IDENTITY_BYTES: usize = 6;

/// Stable identity of a slide: the first 12 hex digits of the SHA-256 of
/// its file name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlideId([u8; IDENTITY_BYTES]);

impl SlideId {
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut id = [0u8; IDENTITY_BYTES];
        id.copy_from_slice(&digest[..IDENTITY_BYTES]);
        Self(id)
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlideId({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub id: SlideId,
    /// Path relative to the slideshow directory, as written in the playlist.
    pub filename: String,
    /// `WxH+X+Y`, checked against the image only at render time.
    pub geometry: String,
}

impl Slide {
    pub fn path_in(&self, directory: &Path) -> PathBuf {
        directory.join(&self.filename)
    }
}

/// Ordered, circular list of slides. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    order: Vec<SlideId>,
    slides: HashMap<SlideId, Slide>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[SlideId] {
        &self.order
    }

    pub fn get(&self, id: SlideId) -> Option<&Slide> {
        self.slides.get(&id)
    }

    /// Slides in playlist order; repeated entries appear repeatedly.
    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.order.iter().filter_map(|id| self.slides.get(id))
    }

    fn register(&mut self, filename: &str, geometry: &str) {
        let id = SlideId::from_name(filename);
        if let Some(existing) = self.slides.get(&id).filter(|s| s.filename != filename) {
            warn!(
                slide = %id,
                kept = filename,
                replaced = %existing.filename,
                "slide identity collision"
            );
        }
        self.order.push(id);
        self.slides.insert(
            id,
            Slide {
                id,
                filename: filename.to_string(),
                geometry: geometry.to_string(),
            },
        );
    }
}

/// A playlist together with everything that went wrong while reading it.
#[derive(Debug, Default)]
pub struct PlaylistLoad {
    pub playlist: Playlist,
    pub warnings: Vec<PlaylistError>,
}

impl PlaylistLoad {
    /// What the user should be told about this load, if anything.
    pub fn notification(&self) -> Option<Notification> {
        if self.playlist.is_empty() {
            let mut message = String::from("No slides to show.");
            if let Some(missing) = self
                .warnings
                .iter()
                .find(|w| matches!(w, PlaylistError::Missing { .. }))
            {
                message = format!("{message} {missing}");
            }
            return Some(Notification::warning("Empty playlist", message));
        }
        let skipped = self
            .warnings
            .iter()
            .filter(|w| matches!(w, PlaylistError::Parse { .. }))
            .count();
        (skipped > 0).then(|| {
            Notification::warning(
                "Invalid playlist entries",
                format!("{skipped} malformed entries were skipped."),
            )
        })
    }
}

pub struct PlaylistLoader;

impl PlaylistLoader {
    /// Read and parse `path`. Never fails: an unreadable file yields an
    /// empty playlist plus a [`PlaylistError::Missing`] warning.
    pub fn load(path: &Path) -> PlaylistLoad {
        debug!(path = %path.display(), "reading playlist");
        let load = match std::fs::read_to_string(path) {
            Ok(text) => Self::parse_str(&text),
            Err(source) => {
                let err = PlaylistError::Missing {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("{err}");
                PlaylistLoad {
                    playlist: Playlist::default(),
                    warnings: vec![err],
                }
            }
        };
        info!(
            path = %path.display(),
            slides = load.playlist.len(),
            "playlist loaded"
        );
        load
    }

    pub fn parse_str(text: &str) -> PlaylistLoad {
        let mut load = PlaylistLoad::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, geometry)) = line.split_once('|') else {
                debug!(line = index + 1, "skipping line without separator");
                continue;
            };
            let (name, geometry) = (name.trim(), geometry.trim());
            if name.is_empty() || !has_geometry_shape(geometry) {
                let err = PlaylistError::Parse {
                    line: index + 1,
                    entry: line.to_string(),
                };
                warn!("{err}");
                load.warnings.push(err);
                continue;
            }
            load.playlist.register(name, geometry);
        }
        load
    }
}

/// Zero extents parse as far as the playlist is concerned; the pipeline
/// falls back to the full image for them.
fn has_geometry_shape(geometry: &str) -> bool {
    !matches!(
        geometry.parse::<CropGeometry>(),
        Err(GeometryError::Malformed(_))
    )
}

/// The preset closest to the canvas aspect ratio; the first one wins ties.
pub fn select_frame_ratio(canvas: CanvasSize) -> &'static str {
    let target = canvas.aspect_ratio();
    let mut best = FRAME_RATIOS[0];
    let mut best_diff = f64::MAX;
    for preset in FRAME_RATIOS {
        let diff = (preset_ratio(preset) - target).abs();
        if diff < best_diff {
            best_diff = diff;
            best = preset;
        }
    }
    info!(ratio = best, "selected frame ratio");
    best
}

fn preset_ratio(preset: &str) -> f64 {
    preset
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<f64>().ok()?, h.parse::<f64>().ok()?)))
        .map_or(0.0, |(w, h)| w / h)
}

/// `<dir>/<name>_<ratio>.<ext>` when it exists, otherwise `<dir>/<name>.<ext>`.
pub fn resolve_playlist_path(
    directory: &Path,
    settings: &PlaylistSettings,
    canvas: CanvasSize,
) -> PathBuf {
    let ratio = if settings.is_auto_suffix() {
        select_frame_ratio(canvas).to_string()
    } else {
        settings.suffix.clone()
    };
    let preferred = directory.join(format!(
        "{}_{}.{}",
        settings.name, ratio, settings.extension
    ));
    if preferred.is_file() {
        return preferred;
    }
    let fallback = directory.join(format!("{}.{}", settings.name, settings.extension));
    debug!(
        preferred = %preferred.display(),
        fallback = %fallback.display(),
        "ratio specific playlist not found"
    );
    fallback
}

/// Where the slides live and which playlist describes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub directory: PathBuf,
    pub playlist: PathBuf,
}

impl LaunchTarget {
    /// A file names the playlist itself; a directory gets the playlist
    /// picked by [`resolve_playlist_path`]. A missing directory is fatal.
    pub fn resolve(
        path: &Path,
        settings: &PlaylistSettings,
        canvas: CanvasSize,
    ) -> Result<Self, Error> {
        if path.is_file() {
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            return Ok(Self {
                directory,
                playlist: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(Error::MissingDirectory(path.to_path_buf()));
        }
        Ok(Self {
            directory: path.to_path_buf(),
            playlist: resolve_playlist_path(path, settings, canvas),
        })
    }
}

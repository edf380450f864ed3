use std::path::PathBuf;

use thiserror::Error;

/// Fatal-at-entry errors. Everything raised inside the render loop is
/// recovered locally and surfaces as a notification instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The slideshow directory does not exist.
    #[error("slideshow directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Problems found while reading a playlist. Never fatal.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// A line that looked like an entry but could not be split into a
    /// name and a well-formed geometry.
    #[error("line {line}: malformed playlist entry {entry:?}")]
    Parse { line: usize, entry: String },

    /// The playlist could not be resolved or read.
    #[error("cannot read playlist {}: {source}", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// The requested crop rectangle cannot be applied to the source image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("geometry {0:?} does not match WxH+X+Y")]
    Malformed(String),

    #[error("geometry {0:?} has a zero width or height")]
    ZeroExtent(String),

    #[error("{axis}-offset {offset} beyond image extent {extent}")]
    OffsetOutOfBounds { axis: Axis, offset: u32, extent: u32 },
}

/// The source image could not be turned into pixels.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// EXIF metadata missing or unreadable. Callers fall back silently.
#[derive(Debug, Error)]
#[error("exif metadata unavailable: {0}")]
pub struct MetadataError(#[from] pub exif::Error);

/// An input token that maps to no action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action key {0:?}")]
pub struct UnknownAction(pub String);

/// Failures of the render cache storage.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("render cache storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode rendered artifact: {0}")]
    Encode(#[from] image::ImageError),

    /// All slots are held by the keep-set and the requested slide is not
    /// part of it.
    #[error("render cache is full and every entry is in the keep-set")]
    NoEvictableSlot,
}

//! Bounded store of rendered slides.
//!
//! Every render is written to a path that has never been used before, so a
//! display that caches bitmaps by path can never show stale content. The
//! storage directory is owned by the cache and removed with it.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::navigator::SlideTriple;
use crate::playlist::SlideId;
use crate::processing::transform::{RenderIssue, RenderedSlide};

/// Previous, current and next.
pub const CACHE_CAPACITY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSlide {
    /// Canvas-sized JPEG.
    pub path: PathBuf,
    pub caption: Option<String>,
}

#[derive(Debug)]
pub struct CacheLookup {
    pub entry: CachedSlide,
    /// No transform work was done.
    pub hit: bool,
    /// Problems the pipeline recovered from while rendering a miss.
    pub issues: Vec<RenderIssue>,
}

#[derive(Debug)]
pub struct RenderCache {
    dir: TempDir,
    entries: HashMap<SlideId, CachedSlide>,
    quality: u8,
}

impl RenderCache {
    /// Create the storage directory under `parent`, or the system temp dir.
    pub fn new(parent: Option<&Path>, quality: u8) -> Result<Self, CacheError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("photo-slideshow-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!(dir = %dir.path().display(), "render cache created");
        Ok(Self {
            dir,
            entries: HashMap::with_capacity(CACHE_CAPACITY),
            quality,
        })
    }

    pub fn directory(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: SlideId) -> Option<&CachedSlide> {
        self.entries.get(&id)
    }

    /// Cached identities, sorted for stable comparisons.
    pub fn ids(&self) -> Vec<SlideId> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Return the cached render of `id`, rendering it with `render` on a
    /// miss.
    ///
    /// When the cache is full one entry outside `keep` is evicted first.
    pub fn get_or_render<F>(
        &mut self,
        id: SlideId,
        keep: &SlideTriple,
        render: F,
    ) -> Result<CacheLookup, CacheError>
    where
        F: FnOnce() -> RenderedSlide,
    {
        if let Some(entry) = self.entries.get(&id) {
            debug!(slide = %id, "cache hit");
            return Ok(CacheLookup {
                entry: entry.clone(),
                hit: true,
                issues: Vec::new(),
            });
        }
        debug!(slide = %id, "cache miss");

        if self.entries.len() >= CACHE_CAPACITY {
            let victim = self
                .entries
                .keys()
                .copied()
                .find(|cached| !keep.contains(*cached))
                .ok_or(CacheError::NoEvictableSlot)?;
            self.evict(victim);
        }

        let rendered = render();
        let path = self.store(&rendered.canvas)?;
        debug!(slide = %id, path = %path.display(), "stored render");
        let entry = CachedSlide {
            path,
            caption: rendered.caption,
        };
        self.entries.insert(id, entry.clone());
        Ok(CacheLookup {
            entry,
            hit: false,
            issues: rendered.issues,
        })
    }

    /// Drop every entry outside `keep`.
    pub fn retain_only(&mut self, keep: &SlideTriple) {
        let stale: Vec<_> = self
            .entries
            .keys()
            .copied()
            .filter(|id| !keep.contains(*id))
            .collect();
        for id in stale {
            self.evict(id);
        }
    }

    pub fn clear(&mut self) {
        let all: Vec<_> = self.entries.keys().copied().collect();
        for id in all {
            self.evict(id);
        }
    }

    /// Remove all storage, the directory included.
    pub fn close(mut self) -> Result<(), CacheError> {
        self.clear();
        self.dir.close()?;
        Ok(())
    }

    fn evict(&mut self, id: SlideId) {
        if let Some(entry) = self.entries.remove(&id) {
            debug!(slide = %id, path = %entry.path.display(), "evicting");
            if let Err(err) = std::fs::remove_file(&entry.path) {
                warn!(path = %entry.path.display(), "cannot remove cached render: {err}");
            }
        }
    }

    fn store(&self, canvas: &RgbImage) -> Result<PathBuf, CacheError> {
        let (file, path) = tempfile::Builder::new()
            .prefix("slide-")
            .suffix(".jpg")
            .tempfile_in(self.dir.path())?
            .keep()
            .map_err(|err| err.error)?;
        if let Err(err) = self.encode(file, canvas) {
            let _ = std::fs::remove_file(&path);
            return Err(err);
        }
        Ok(path)
    }

    fn encode(&self, file: File, canvas: &RgbImage) -> Result<(), CacheError> {
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, self.quality).encode_image(canvas)?;
        writer.flush()?;
        Ok(())
    }
}

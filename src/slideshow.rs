//! Render core of a slideshow session: playlist, cursor, cache and
//! pipeline, without any timer or display concerns.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::RenderCache;
use crate::config::Configuration;
use crate::error::CacheError;
use crate::events::{Direction, Notification};
use crate::fonts::SelectedFont;
use crate::navigator::{SlideNavigator, SlideTriple};
use crate::playlist::{Playlist, SlideId};
use crate::processing::caption::{CaptionLayoutEngine, CaptionPlacement};
use crate::processing::transform::{RenderIssue, TransformPipeline};

/// Everything the display needs for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideView {
    pub id: SlideId,
    pub filename: String,
    /// Freshly written canvas-sized artifact.
    pub image: PathBuf,
    pub caption: Option<String>,
    /// Placement of `caption`, regardless of whether captions are shown.
    pub caption_layout: CaptionPlacement,
    /// Problems recovered from while rendering this slide.
    pub notifications: Vec<Notification>,
}

pub struct Slideshow {
    directory: PathBuf,
    playlist: Playlist,
    navigator: SlideNavigator,
    cache: RenderCache,
    pipeline: TransformPipeline,
    captions: CaptionLayoutEngine,
    /// Notifications of prefetched slides, delivered once they are shown.
    pending: HashMap<SlideId, Vec<Notification>>,
    current: Option<SlideView>,
}

impl Slideshow {
    pub fn new(
        directory: PathBuf,
        playlist: Playlist,
        cfg: &Configuration,
        font: SelectedFont,
    ) -> Result<Self> {
        let cache = RenderCache::new(cfg.cache_dir.as_deref(), cfg.artifact_quality)
            .context("cannot create render cache")?;
        let pipeline = TransformPipeline::new(cfg.canvas, cfg.broken_image_path.as_deref());
        let color = cfg.caption.color_argb()?;
        let captions = CaptionLayoutEngine::new(cfg.canvas, &cfg.caption, font, color);
        let navigator = SlideNavigator::new(playlist.order().to_vec());
        info!(
            directory = %directory.display(),
            slides = playlist.len(),
            "slideshow ready"
        );
        Ok(Self {
            directory,
            playlist,
            navigator,
            cache,
            pipeline,
            captions,
            pending: HashMap::new(),
            current: None,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_view(&self) -> Option<&SlideView> {
        self.current.as_ref()
    }

    pub fn cached_ids(&self) -> Vec<SlideId> {
        self.cache.ids()
    }

    /// Move one slide and render it. `None` on an empty playlist.
    pub fn advance(&mut self, direction: Direction) -> Result<Option<SlideView>, CacheError> {
        let Some(triple) = self.navigator.advance(direction) else {
            debug!("empty playlist, nothing to show");
            return Ok(None);
        };
        self.cache.retain_only(&triple);
        self.pending.retain(|id, _| triple.contains(*id));

        let id = triple.current;
        self.render(id, &triple)?;
        let Some(entry) = self.cache.get(id) else {
            return Ok(None);
        };
        let filename = self.filename(id);
        let view = SlideView {
            id,
            filename,
            image: entry.path.clone(),
            caption: entry.caption.clone(),
            caption_layout: self.captions.place(entry.caption.as_deref()),
            notifications: self.pending.remove(&id).unwrap_or_default(),
        };
        info!(slide = %id, file = %view.filename, "slide changed");
        self.current = Some(view.clone());
        Ok(Some(view))
    }

    /// Render the neighbours of the current slide so the next move in
    /// either direction is a cache hit.
    pub fn prefetch(&mut self) -> Result<(), CacheError> {
        let Some(triple) = self.navigator.current() else {
            return Ok(());
        };
        self.render(triple.next, &triple)?;
        self.render(triple.previous, &triple)?;
        self.cache.retain_only(&triple);
        Ok(())
    }

    /// Release all cached artifacts.
    pub fn close(self) -> Result<(), CacheError> {
        debug!("closing slideshow");
        self.cache.close()
    }

    fn render(&mut self, id: SlideId, keep: &SlideTriple) -> Result<(), CacheError> {
        let Some(slide) = self.playlist.get(id) else {
            return Ok(());
        };
        let path = slide.path_in(&self.directory);
        let pipeline = &self.pipeline;
        let lookup = self
            .cache
            .get_or_render(id, keep, || pipeline.render_file(&path, &slide.geometry))?;
        if !lookup.issues.is_empty() {
            let notes = lookup
                .issues
                .iter()
                .map(|issue| issue_notification(&slide.filename, issue))
                .collect();
            self.pending.insert(id, notes);
        }
        Ok(())
    }

    fn filename(&self, id: SlideId) -> String {
        self.playlist
            .get(id)
            .map(|slide| slide.filename.clone())
            .unwrap_or_default()
    }
}

fn issue_notification(filename: &str, issue: &RenderIssue) -> Notification {
    match issue {
        RenderIssue::Geometry(err) => {
            Notification::warning("Invalid geometry", format!("{filename}: {err}"))
        }
        RenderIssue::Decode(err) => {
            Notification::warning("Cannot load image", format!("{filename}: {err}"))
        }
    }
}

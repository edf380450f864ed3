//! Orientation fix, crop-or-letterbox and resize of a source image onto
//! the fixed output canvas.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tracing::{debug, error, info, warn};

use crate::config::CanvasSize;
use crate::error::{Axis, DecodeError, GeometryError};
use crate::metadata::ExifMetadata;
use crate::processing::geometry::{CropGeometry, center_offset, resize_to_contain};

/// Overflow below this many thousandths (0.7%) of the image extent is
/// treated as a rounding artefact of the upstream geometry and absorbed.
pub const SLIVER_TOLERANCE_PER_MILLE: u64 = 7;

const PLACEHOLDER_SIZE: (u32, u32) = (160, 120);
const PLACEHOLDER_BACKGROUND: Rgb<u8> = Rgb([70, 70, 70]);
const PLACEHOLDER_CROSS: Rgb<u8> = Rgb([190, 50, 50]);

/// Something that went wrong while rendering one slide. Both kinds are
/// recovered inside the pipeline.
#[derive(Debug)]
pub enum RenderIssue {
    /// The crop could not be applied; the full image was used instead.
    Geometry(GeometryError),
    /// The image could not be decoded; the placeholder was used instead.
    Decode(DecodeError),
}

/// Output of one pipeline run. `canvas` is always canvas-sized.
#[derive(Debug)]
pub struct RenderedSlide {
    pub canvas: RgbImage,
    pub caption: Option<String>,
    pub issues: Vec<RenderIssue>,
}

impl RenderedSlide {
    pub fn is_broken(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, RenderIssue::Decode(_)))
    }
}

/// Source rectangle to copy and where its scaled copy lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub crop_x: u32,
    pub crop_y: u32,
    pub crop_w: u32,
    pub crop_h: u32,
    pub scaled_w: u32,
    pub scaled_h: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl CropPlan {
    /// Compute the plan for a validated crop on an `image_w` x `image_h`
    /// source.
    ///
    /// Small overflows are absorbed by moving the crop inward. Larger ones
    /// are kept: the visible part is scaled with the zoom implied by the
    /// full requested extent and centred, leaving black bars where the
    /// request ran past the image. Scaled sizes and bar widths are both
    /// floored.
    pub fn new(geometry: CropGeometry, image_w: u32, image_h: u32, canvas: CanvasSize) -> Self {
        let (gx, gw) = absorb_sliver(geometry.x, geometry.width, image_w, Axis::X);
        let (gy, gh) = absorb_sliver(geometry.y, geometry.height, image_h, Axis::Y);

        let over_x = overflow(gx, gw, image_w);
        let over_y = overflow(gy, gh, image_h);
        let crop_w = gw - over_x;
        let crop_h = gh - over_y;

        Self {
            crop_x: gx as u32,
            crop_y: gy as u32,
            crop_w: crop_w as u32,
            crop_h: crop_h as u32,
            scaled_w: zoom(crop_w, canvas.width, gw),
            scaled_h: zoom(crop_h, canvas.height, gh),
            offset_x: zoom(over_x, canvas.width, 2 * gw),
            offset_y: zoom(over_y, canvas.height, 2 * gh),
        }
    }

    fn is_empty(&self) -> bool {
        self.crop_w == 0 || self.crop_h == 0 || self.scaled_w == 0 || self.scaled_h == 0
    }
}

/// `value * canvas / extent`, floored.
fn zoom(value: u64, canvas: u32, extent: u64) -> u32 {
    if extent == 0 {
        return 0;
    }
    u32::try_from(value * u64::from(canvas) / extent).unwrap_or(u32::MAX)
}

fn overflow(offset: u64, extent: u64, limit: u32) -> u64 {
    (offset + extent).saturating_sub(u64::from(limit))
}

fn absorb_sliver(offset: u32, extent: u32, limit: u32, axis: Axis) -> (u64, u64) {
    let (offset, extent, limit) = (u64::from(offset), u64::from(extent), u64::from(limit));
    let end = offset + extent;
    if end <= limit || limit == 0 {
        return (offset, extent);
    }
    let excess = end - limit;
    if excess * 1000 >= limit * SLIVER_TOLERANCE_PER_MILLE {
        return (offset, extent);
    }
    info!(
        %axis,
        excess,
        percent = excess as f64 * 100.0 / limit as f64,
        "fixing black border"
    );
    if excess > offset {
        // Shift would go negative: pin at zero and shrink instead.
        (0, extent - (excess - offset))
    } else {
        (offset - excess, extent)
    }
}

/// Decode `bytes` and rotate according to the EXIF orientation.
///
/// Orientation 3 turns 180 degrees, 6 turns 90 degrees clockwise (270
/// counter-clockwise) and 8 turns 90 degrees counter-clockwise. Other
/// values, mirrored ones included, leave the image alone.
pub fn load_oriented(bytes: &[u8]) -> Result<(RgbImage, ExifMetadata), DecodeError> {
    let img = image::load_from_memory(bytes)?.to_rgb8();
    let meta = ExifMetadata::read_or_default(bytes);
    let orientation = meta.orientation();
    let img = match orientation {
        3 => imageops::rotate180(&img),
        6 => imageops::rotate90(&img),
        8 => imageops::rotate270(&img),
        _ => img,
    };
    debug!(orientation, width = img.width(), height = img.height(), "decoded");
    Ok((img, meta))
}

#[derive(Debug, Clone)]
pub struct TransformPipeline {
    canvas: CanvasSize,
    placeholder: RgbImage,
}

impl TransformPipeline {
    /// `broken_image` replaces the built-in placeholder when it can be read.
    pub fn new(canvas: CanvasSize, broken_image: Option<&Path>) -> Self {
        let placeholder = broken_image
            .and_then(|path| match image::open(path) {
                Ok(img) => Some(img.to_rgb8()),
                Err(err) => {
                    warn!(path = %path.display(), "cannot load broken-image asset: {err}");
                    None
                }
            })
            .unwrap_or_else(builtin_placeholder);
        Self {
            canvas,
            placeholder,
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Render the file at `path`; a missing file is reported as a decode
    /// failure like any other unreadable image.
    pub fn render_file(&self, path: &Path, geometry: &str) -> RenderedSlide {
        debug!(path = %path.display(), "opening image file");
        match std::fs::read(path) {
            Ok(bytes) => self.render_bytes(&bytes, geometry),
            Err(source) => self.broken(
                Vec::new(),
                DecodeError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            ),
        }
    }

    pub fn render_bytes(&self, bytes: &[u8], geometry: &str) -> RenderedSlide {
        let mut issues = Vec::new();
        match self.compose(bytes, geometry, &mut issues) {
            Ok((canvas, caption)) => RenderedSlide {
                canvas,
                caption,
                issues,
            },
            Err(err) => self.broken(issues, err),
        }
    }

    fn compose(
        &self,
        bytes: &[u8],
        geometry: &str,
        issues: &mut Vec<RenderIssue>,
    ) -> Result<(RgbImage, Option<String>), DecodeError> {
        let (image, meta) = load_oriented(bytes)?;
        let (image_w, image_h) = image.dimensions();

        let crop = match geometry
            .parse::<CropGeometry>()
            .and_then(|g| g.check_offsets(image_w, image_h).map(|()| g))
        {
            Ok(crop) => crop,
            Err(err) => {
                warn!(geometry, image_w, image_h, "invalid geometry: {err}");
                issues.push(RenderIssue::Geometry(err));
                CropGeometry::full(image_w, image_h)
            }
        };

        let plan = CropPlan::new(crop, image_w, image_h, self.canvas);
        debug!(?plan, "crop plan");
        let mut canvas = RgbImage::new(self.canvas.width, self.canvas.height);
        if plan.is_empty() {
            warn!(%crop, "no visible image area left after cropping");
        } else {
            let visible =
                imageops::crop_imm(&image, plan.crop_x, plan.crop_y, plan.crop_w, plan.crop_h)
                    .to_image();
            let scaled = imageops::resize(&visible, plan.scaled_w, plan.scaled_h, FilterType::Triangle);
            imageops::replace(
                &mut canvas,
                &scaled,
                i64::from(plan.offset_x),
                i64::from(plan.offset_y),
            );
        }
        Ok((canvas, meta.caption()))
    }

    fn broken(&self, mut issues: Vec<RenderIssue>, err: DecodeError) -> RenderedSlide {
        error!("rendering broken-image placeholder: {err}");
        issues.push(RenderIssue::Decode(err));
        RenderedSlide {
            canvas: self.placeholder_canvas(),
            caption: None,
            issues,
        }
    }

    /// The placeholder scaled to fit (aspect preserved) and centred on black.
    pub fn placeholder_canvas(&self) -> RgbImage {
        let (w, h) = resize_to_contain(
            self.canvas.width,
            self.canvas.height,
            self.placeholder.width(),
            self.placeholder.height(),
        );
        let scaled = imageops::resize(&self.placeholder, w, h, FilterType::Triangle);
        let (x, y) = center_offset(w, h, self.canvas.width, self.canvas.height);
        let mut canvas = RgbImage::new(self.canvas.width, self.canvas.height);
        imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
        canvas
    }
}

/// Grey card with a red diagonal cross.
fn builtin_placeholder() -> RgbImage {
    let (w, h) = PLACEHOLDER_SIZE;
    let slope = f64::from(h) / f64::from(w);
    RgbImage::from_fn(w, h, |x, y| {
        let along = f64::from(x) * slope;
        let y = f64::from(y);
        let on_cross = (y - along).abs() < 5.0 || (y - (f64::from(h) - along)).abs() < 5.0;
        if on_cross {
            PLACEHOLDER_CROSS
        } else {
            PLACEHOLDER_BACKGROUND
        }
    })
}

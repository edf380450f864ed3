use std::fmt;
use std::str::FromStr;

use crate::error::{Axis, GeometryError};

/// Region of interest inside a source image, written `WxH+X+Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropGeometry {
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
        }
    }

    /// Offsets must land inside the image; extents may overflow (that is
    /// what produces letterboxing).
    pub fn check_offsets(&self, image_w: u32, image_h: u32) -> Result<(), GeometryError> {
        if self.x > image_w {
            return Err(GeometryError::OffsetOutOfBounds {
                axis: Axis::X,
                offset: self.x,
                extent: image_w,
            });
        }
        if self.y > image_h {
            return Err(GeometryError::OffsetOutOfBounds {
                axis: Axis::Y,
                offset: self.y,
                extent: image_h,
            });
        }
        Ok(())
    }
}

impl FromStr for CropGeometry {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GeometryError::Malformed(s.to_string());
        let number = |part: &str| -> Result<u32, GeometryError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };

        let (size, offsets) = s.trim().split_once('+').ok_or_else(malformed)?;
        let (w, h) = size.split_once('x').ok_or_else(malformed)?;
        let (x, y) = offsets.split_once('+').ok_or_else(malformed)?;
        let geometry = Self {
            width: number(w)?,
            height: number(h)?,
            x: number(x)?,
            y: number(y)?,
        };
        if geometry.width == 0 || geometry.height == 0 {
            return Err(GeometryError::ZeroExtent(s.to_string()));
        }
        Ok(geometry)
    }
}

impl fmt::Display for CropGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Placement of a surface on the canvas. `y` may be negative when a tall
/// caption grows above the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Largest size with the source aspect ratio that fits inside the canvas.
pub fn resize_to_contain(canvas_w: u32, canvas_h: u32, src_w: u32, src_h: u32) -> (u32, u32) {
    let iw = f64::from(src_w.max(1));
    let ih = f64::from(src_h.max(1));
    let zoom = (f64::from(canvas_w) / iw).min(f64::from(canvas_h) / ih);
    let w = (iw * zoom) as u32;
    let h = (ih * zoom) as u32;
    (w.clamp(1, canvas_w.max(1)), h.clamp(1, canvas_h.max(1)))
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}

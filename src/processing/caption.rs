//! On-canvas geometry of the caption text and its background panel.

use crate::config::{CanvasSize, CaptionSettings};
use crate::fonts::SelectedFont;
use crate::processing::geometry::Rect;

/// Panels narrower than this fraction of the canvas get widened.
const SHORT_CAPTION_FRACTION: f32 = 0.33;
const SHORT_CAPTION_WIDENING: f32 = 1.3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLayout {
    /// Caption text after row truncation.
    pub text: String,
    pub rows: usize,
    /// Text surface; spans the canvas width, text is centred inside it.
    pub text_box: Rect,
    /// Semi-transparent backing panel behind the text.
    pub panel: Rect,
    pub font_name: String,
    pub color_argb: u32,
}

/// Either both surfaces are hidden or both are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionPlacement {
    Hidden,
    Shown(CaptionLayout),
}

#[derive(Debug, Clone)]
pub struct CaptionLayoutEngine {
    canvas: CanvasSize,
    max_rows: usize,
    font: SelectedFont,
    char_aspect_ratio: f32,
    anchor_fraction: f32,
    color_argb: u32,
}

impl CaptionLayoutEngine {
    pub fn new(
        canvas: CanvasSize,
        settings: &CaptionSettings,
        font: SelectedFont,
        color_argb: u32,
    ) -> Self {
        Self {
            canvas,
            max_rows: settings.max_rows.max(1),
            font,
            char_aspect_ratio: settings.char_aspect_ratio,
            anchor_fraction: settings.anchor_fraction(),
            color_argb,
        }
    }

    pub fn place(&self, caption: Option<&str>) -> CaptionPlacement {
        let Some(caption) = caption else {
            return CaptionPlacement::Hidden;
        };
        let lines: Vec<&str> = caption.split('\n').take(self.max_rows).collect();
        let rows = lines.len();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let font_size = self.font.size as f32;
        let height = self.font.size * rows as u32;
        let bottom = (self.canvas.height as f32 * self.anchor_fraction) as i32;
        let y = bottom - height as i32;

        let mut panel_w = (longest as f32 * font_size * self.char_aspect_ratio) as u32;
        if (panel_w as f32 / self.canvas.width as f32) < SHORT_CAPTION_FRACTION {
            panel_w = (panel_w as f32 * SHORT_CAPTION_WIDENING) as u32;
        }
        let panel_w = panel_w.min(self.canvas.width);
        let panel_x = ((self.canvas.width - panel_w) / 2) as i32;

        CaptionPlacement::Shown(CaptionLayout {
            text: lines.join("\n"),
            rows,
            text_box: Rect::new(0, y, self.canvas.width, height),
            panel: Rect::new(panel_x, y, panel_w, height),
            font_name: self.font.name.clone(),
            color_argb: self.color_argb,
        })
    }
}

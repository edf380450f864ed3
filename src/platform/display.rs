use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::events::{Notification, NotificationLevel};
use crate::processing::caption::CaptionPlacement;
use crate::processing::geometry::Rect;

/// The picture surface: where the artifact is painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSurface {
    pub path: PathBuf,
    pub visible: bool,
    pub rect: Rect,
}

/// Whatever paints pixels for the slideshow.
///
/// Paths handed to [`DisplaySink::show_image`] are never reused for other
/// content, so a sink may cache bitmaps by path.
pub trait DisplaySink: Send {
    fn show_image(&mut self, surface: &ImageSurface);

    /// `Hidden` hides both the text and its backing panel.
    fn show_caption(&mut self, caption: &CaptionPlacement);

    fn notify(&mut self, notification: &Notification);

    /// Hint that the host should keep the screen awake.
    fn inhibit_screensaver(&mut self, _inhibit: bool) {}
}

/// Sink that only reports what would be shown. Used by the binary.
#[derive(Debug, Default)]
pub struct TracingDisplay {
    shown: usize,
}

impl DisplaySink for TracingDisplay {
    fn show_image(&mut self, surface: &ImageSurface) {
        self.shown += 1;
        info!(
            path = %surface.path.display(),
            visible = surface.visible,
            width = surface.rect.width,
            height = surface.rect.height,
            shown = self.shown,
            "show image"
        );
    }

    fn show_caption(&mut self, caption: &CaptionPlacement) {
        match caption {
            CaptionPlacement::Hidden => debug!("caption hidden"),
            CaptionPlacement::Shown(layout) => info!(
                text = %layout.text,
                y = layout.text_box.y,
                panel_x = layout.panel.x,
                panel_width = layout.panel.width,
                font = %layout.font_name,
                "show caption"
            ),
        }
    }

    fn notify(&mut self, n: &Notification) {
        match n.level {
            NotificationLevel::Info => info!(heading = %n.heading, "{}", n.message),
            NotificationLevel::Warning => warn!(heading = %n.heading, "{}", n.message),
            NotificationLevel::Error => error!(heading = %n.heading, "{}", n.message),
        }
    }

    fn inhibit_screensaver(&mut self, inhibit: bool) {
        debug!(inhibit, "screensaver inhibition");
    }
}

//! Caption font selection against the fonts the host offers.

use serde::Deserialize;
use tracing::info;

/// Font every host is expected to provide.
pub const FALLBACK_FONT_NAME: &str = "font13";
pub const FALLBACK_FONT_SIZE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    Regular,
    Bold,
}

/// One face advertised by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FontFace {
    pub name: String,
    pub size: u32,
    #[serde(default)]
    pub style: Option<FontStyle>,
}

impl FontFace {
    fn is_bold(&self) -> bool {
        self.style == Some(FontStyle::Bold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    /// Exact name wins over size when set.
    pub name: Option<String>,
    pub size: u32,
    /// Mandatory boldness when set.
    pub style: Option<FontStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFont {
    pub name: String,
    pub size: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    faces: Vec<FontFace>,
}

impl FontCatalog {
    pub fn new(faces: Vec<FontFace>) -> Self {
        Self { faces }
    }

    /// Pick the best matching face.
    ///
    /// Faces whose boldness contradicts `request.style` are skipped. A face
    /// named exactly like `request.name` is taken immediately; otherwise the
    /// face closest in size wins, as long as it is closer than the requested
    /// size itself. Without any candidate the fallback font is returned.
    /// An empty catalog means the host exposes no metrics, so the request
    /// is honoured as-is.
    pub fn select(&self, request: &FontRequest) -> SelectedFont {
        if self.faces.is_empty() {
            return SelectedFont {
                name: request
                    .name
                    .clone()
                    .unwrap_or_else(|| FALLBACK_FONT_NAME.to_string()),
                size: request.size,
            };
        }

        let mut selected = SelectedFont {
            name: FALLBACK_FONT_NAME.to_string(),
            size: FALLBACK_FONT_SIZE,
        };
        let mut min_diff = request.size;
        for face in &self.faces {
            match request.style {
                Some(FontStyle::Regular) if face.is_bold() => continue,
                Some(FontStyle::Bold) if !face.is_bold() => continue,
                _ => {}
            }
            if request.name.as_deref() == Some(face.name.as_str()) {
                selected = SelectedFont {
                    name: face.name.clone(),
                    size: face.size,
                };
                break;
            }
            let diff = request.size.abs_diff(face.size);
            if diff < min_diff {
                min_diff = diff;
                selected = SelectedFont {
                    name: face.name.clone(),
                    size: face.size,
                };
            }
        }
        info!(font = %selected.name, size = selected.size, "selected caption font");
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(name: &str, size: u32, style: Option<FontStyle>) -> FontFace {
        FontFace {
            name: name.into(),
            size,
            style,
        }
    }

    fn catalog() -> FontCatalog {
        FontCatalog::new(vec![
            face("font13", 24, None),
            face("font30_title", 30, Some(FontStyle::Bold)),
            face("font36", 36, None),
            face("font37", 37, Some(FontStyle::Bold)),
            face("font45", 45, None),
        ])
    }

    #[test]
    fn exact_name_wins_over_size() {
        let picked = catalog().select(&FontRequest {
            name: Some("font45".into()),
            size: 30,
            style: None,
        });
        assert_eq!(picked.name, "font45");
        assert_eq!(picked.size, 45);
    }

    #[test]
    fn closest_size_when_no_name() {
        let picked = catalog().select(&FontRequest {
            name: None,
            size: 38,
            style: None,
        });
        assert_eq!(picked.name, "font37");
    }

    #[test]
    fn style_filter_excludes_bold() {
        let picked = catalog().select(&FontRequest {
            name: None,
            size: 38,
            style: Some(FontStyle::Regular),
        });
        assert_eq!(picked.name, "font36");
    }

    #[test]
    fn style_filter_excludes_regular() {
        let picked = catalog().select(&FontRequest {
            name: Some("font36".into()),
            size: 29,
            style: Some(FontStyle::Bold),
        });
        assert_eq!(picked.name, "font30_title");
    }

    #[test]
    fn no_candidate_falls_back() {
        let picked = FontCatalog::new(vec![face("huge", 200, None)]).select(&FontRequest {
            name: None,
            size: 36,
            style: None,
        });
        assert_eq!(picked.name, FALLBACK_FONT_NAME);
        assert_eq!(picked.size, FALLBACK_FONT_SIZE);
    }

    #[test]
    fn empty_catalog_keeps_request() {
        let picked = FontCatalog::default().select(&FontRequest {
            name: None,
            size: 40,
            style: None,
        });
        assert_eq!(picked.size, 40);
    }
}

//! EXIF orientation and UserComment caption extraction.

use std::io::Cursor;

use exif::{In, Tag, Value};
use tracing::debug;

use crate::error::MetadataError;

/// Orientation assumed when the tag is missing or unreadable.
pub const DEFAULT_ORIENTATION: u16 = 1;

/// Code point at or above which a little-endian UCS-2 guess is considered
/// implausible for the first character.
const UCS2_IMPLAUSIBLE_FIRST_CHAR: u32 = 0x4000;

/// Byte order of a UCS-2 comment payload. Writers disagree with their own
/// TIFF container often enough that the container order is never trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// The two tags the slideshow cares about, lifted out of the EXIF block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifMetadata {
    orientation: Option<u16>,
    user_comment: Option<Vec<u8>>,
}

impl ExifMetadata {
    /// Parse EXIF from an encoded image (JPEG, PNG, WebP, TIFF...).
    pub fn read(bytes: &[u8]) -> Result<Self, MetadataError> {
        let exif = exif::Reader::new().read_from_container(&mut Cursor::new(bytes))?;
        let orientation = exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .and_then(|v| u16::try_from(v).ok());
        let user_comment = exif
            .get_field(Tag::UserComment, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Undefined(raw, _) => Some(raw.clone()),
                Value::Byte(raw) => Some(raw.clone()),
                Value::Ascii(parts) => Some(parts.concat()),
                _ => None,
            });
        debug!(?orientation, has_comment = user_comment.is_some(), "exif read");
        Ok(Self {
            orientation,
            user_comment,
        })
    }

    /// Like [`ExifMetadata::read`] but unreadable metadata degrades to the
    /// defaults (orientation 1, no caption) without a user-facing warning.
    pub fn read_or_default(bytes: &[u8]) -> Self {
        match Self::read(bytes) {
            Ok(meta) => meta,
            Err(err) => {
                debug!("{err}");
                Self::default()
            }
        }
    }

    pub fn orientation(&self) -> u16 {
        self.orientation.unwrap_or(DEFAULT_ORIENTATION)
    }

    pub fn caption(&self) -> Option<String> {
        self.user_comment
            .as_deref()
            .and_then(|raw| decode_user_comment(raw, None))
    }
}

/// Decode a raw UserComment value: an 8-byte character code followed by
/// the payload.
///
/// `hint` settles UCS-2 payloads that decode cleanly both ways; without
/// one the first character decides. Returns `None` for empty results so
/// callers never see `Some("")`.
pub fn decode_user_comment(raw: &[u8], hint: Option<ByteOrder>) -> Option<String> {
    let split = raw.len().min(8);
    let code_id = raw[..split].to_ascii_uppercase();
    let payload = &raw[split..];

    let text = if code_id.starts_with(b"ASCII") {
        debug!("user comment charset: ASCII");
        decode_ascii(null_terminate(payload))
    } else if code_id.starts_with(b"JIS") {
        debug!("user comment charset: Shift-JIS");
        decode_shift_jis(null_terminate(payload))
    } else if code_id.starts_with(b"UNICODE") {
        debug!("user comment charset: UCS-2");
        guess_ucs2(payload, hint)
    } else if code_id.len() == 8 && code_id.iter().all(|b| *b == 0) {
        debug!("user comment charset: undefined, assuming UTF-8");
        decode_utf8_ignoring(null_terminate(payload))
    } else {
        debug!("user comment charset: unknown, assuming UTF-8");
        decode_utf8_ignoring(null_terminate(raw))
            .trim_start()
            .to_string()
    };

    let text = trim_end(&text);
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn trim_end(s: &str) -> &str {
    s.trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
}

fn null_terminate(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|b| char::from(*b))
        .collect()
}

fn decode_shift_jis(bytes: &[u8]) -> String {
    let (text, _) = encoding_rs::SHIFT_JIS.decode_without_bom_handling(bytes);
    text.chars().filter(|c| *c != char::REPLACEMENT_CHARACTER).collect()
}

/// UTF-8 decode that drops invalid sequences instead of replacing them.
fn decode_utf8_ignoring(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                // `valid_up_to` guarantees this prefix is UTF-8.
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match err.error_len() {
                    Some(skip) => bytes = &rest[skip..],
                    None => return out,
                }
            }
        }
    }
}

/// Strict UCS-2/UTF-16 decode; `None` on odd length or unpaired surrogates.
fn decode_ucs2(bytes: &[u8], order: ByteOrder) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| match order {
        ByteOrder::LittleEndian => u16::from_le_bytes([pair[0], pair[1]]),
        ByteOrder::BigEndian => u16::from_be_bytes([pair[0], pair[1]]),
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Both orders are tried; an empty (or failed) decode counts as failure.
fn guess_ucs2(payload: &[u8], hint: Option<ByteOrder>) -> String {
    let decode = |order| {
        decode_ucs2(payload, order)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let little = decode(ByteOrder::LittleEndian);
    let big = decode(ByteOrder::BigEndian);

    let guess = if little.is_empty() && big.is_empty() {
        ByteOrder::LittleEndian
    } else if !little.is_empty() && hint == Some(ByteOrder::LittleEndian) {
        ByteOrder::LittleEndian
    } else if !big.is_empty() && hint == Some(ByteOrder::BigEndian) {
        ByteOrder::BigEndian
    } else if little
        .chars()
        .next()
        .is_none_or(|c| u32::from(c) >= UCS2_IMPLAUSIBLE_FIRST_CHAR)
    {
        ByteOrder::BigEndian
    } else {
        ByteOrder::LittleEndian
    };
    debug!(?guess, "guessed UCS-2 byte order");
    match guess {
        ByteOrder::LittleEndian => little,
        ByteOrder::BigEndian => big,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(prefix: &[u8; 8], payload: &[u8]) -> Vec<u8> {
        let mut raw = prefix.to_vec();
        raw.extend_from_slice(payload);
        raw
    }

    fn utf16(text: &str, order: ByteOrder) -> Vec<u8> {
        text.encode_utf16()
            .flat_map(|u| match order {
                ByteOrder::LittleEndian => u.to_le_bytes(),
                ByteOrder::BigEndian => u.to_be_bytes(),
            })
            .collect()
    }

    #[test]
    fn ascii_is_truncated_at_nul_and_trimmed() {
        let raw = tagged(b"ASCII\0\0\0", b"Sunset at the lake  \0garbage");
        assert_eq!(
            decode_user_comment(&raw, None).as_deref(),
            Some("Sunset at the lake")
        );
    }

    #[test]
    fn ascii_drops_high_bytes() {
        let raw = tagged(b"ascii\0\0\0", b"caf\xe9");
        assert_eq!(decode_user_comment(&raw, None).as_deref(), Some("caf"));
    }

    #[test]
    fn shift_jis_payload() {
        // "日本" in Shift-JIS
        let raw = tagged(b"JIS\0\0\0\0\0", &[0x93, 0xfa, 0x96, 0x7b, 0x00]);
        assert_eq!(decode_user_comment(&raw, None).as_deref(), Some("日本"));
    }

    #[test]
    fn unicode_little_endian_without_hint() {
        let raw = tagged(b"UNICODE\0", &utf16("Hello", ByteOrder::LittleEndian));
        assert_eq!(decode_user_comment(&raw, None).as_deref(), Some("Hello"));
    }

    #[test]
    fn unicode_big_endian_without_hint() {
        let raw = tagged(b"UNICODE\0", &utf16("Hello", ByteOrder::BigEndian));
        assert_eq!(decode_user_comment(&raw, None).as_deref(), Some("Hello"));
    }

    #[test]
    fn unicode_hint_breaks_the_tie() {
        // U+4E2D U+6587 ("中文") reads as U+2D4E U+8765 the other way round.
        let payload = utf16("中文", ByteOrder::BigEndian);
        let raw = tagged(b"UNICODE\0", &payload);
        assert_eq!(
            decode_user_comment(&raw, Some(ByteOrder::BigEndian)).as_deref(),
            Some("中文")
        );
        let payload = utf16("中文", ByteOrder::LittleEndian);
        let raw = tagged(b"UNICODE\0", &payload);
        assert_eq!(
            decode_user_comment(&raw, Some(ByteOrder::LittleEndian)).as_deref(),
            Some("中文")
        );
    }

    #[test]
    fn unicode_odd_length_is_no_caption() {
        let raw = tagged(b"UNICODE\0", &[0x41, 0x00, 0x42]);
        assert_eq!(decode_user_comment(&raw, None), None);
    }

    #[test]
    fn undefined_code_means_utf8() {
        let raw = tagged(&[0; 8], "Città vecchia\0\0\0".as_bytes());
        assert_eq!(
            decode_user_comment(&raw, None).as_deref(),
            Some("Città vecchia")
        );
    }

    #[test]
    fn unknown_code_decodes_whole_value() {
        let raw = b"Plain comment without code\n".to_vec();
        assert_eq!(
            decode_user_comment(&raw, None).as_deref(),
            Some("Plain comment without code")
        );
    }

    #[test]
    fn invalid_utf8_bytes_are_ignored() {
        let raw = tagged(&[0; 8], b"ok\xff\xfeay");
        assert_eq!(decode_user_comment(&raw, None).as_deref(), Some("okay"));
    }

    #[test]
    fn blank_comment_is_none() {
        let raw = tagged(b"ASCII\0\0\0", b"     \0");
        assert_eq!(decode_user_comment(&raw, None), None);
        assert_eq!(decode_user_comment(&[0; 8], None), None);
    }

    #[test]
    fn unreadable_exif_uses_defaults() {
        let meta = ExifMetadata::read_or_default(b"not an image at all");
        assert_eq!(meta.orientation(), DEFAULT_ORIENTATION);
        assert_eq!(meta.caption(), None);
    }
}

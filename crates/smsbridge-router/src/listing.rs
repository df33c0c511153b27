// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding and parsing of the `getModules?modules=smsList` response.

use encoding_rs::Encoding;
use smsbridge_core::{RawSmsEntry, SmsBridgeError};
use tracing::warn;

/// Characters of the decoded listing written to the debug log.
pub const LOG_PREVIEW_CHARS: usize = 600;

/// Characters of an unparseable payload kept in the error.
pub const ERROR_PREVIEW_CHARS: usize = 300;

/// The first `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Resolve a WHATWG encoding label ("utf-8", "latin1", "gbk", ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, SmsBridgeError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SmsBridgeError::Config(format!("unknown text encoding `{label}`")))
}

/// Decode the listing bytes with the configured encoding.
///
/// Malformed sequences are replaced with U+FFFD and reported as a warning.
pub fn decode_body(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        warn!(
            encoding = encoding.name(),
            "listing contains bytes invalid for the configured encoding; message text may be garbled"
        );
    }
    text.into_owned()
}

/// Parse decoded listing text into the phone list at `smsList.phoneList`.
///
/// A missing or null path is an empty listing.
pub fn parse_listing(text: &str) -> Result<Vec<RawSmsEntry>, SmsBridgeError> {
    let parse_error = |message: String, source: serde_json::Error| SmsBridgeError::Parse {
        message,
        preview: preview(text, ERROR_PREVIEW_CHARS),
        source: Some(Box::new(source)),
    };

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| parse_error(format!("listing is not valid JSON: {e}"), e))?;

    match value.pointer("/smsList/phoneList") {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| parse_error(format!("unexpected phoneList shape: {e}"), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_phone_list() {
        let text = r#"{"smsList":{"phoneList":[
            {"phone":"+33612345678","note":[{"content":"hi","time":1000}]},
            {"phone":"+33700000000","note":[]}
        ]}}"#;
        let entries = parse_listing(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phone, "+33612345678");
        assert_eq!(entries[0].note[0].content, "hi");
        assert_eq!(entries[0].note[0].time_ms, 1_000_000);
        assert!(entries[1].note.is_empty());
    }

    #[test]
    fn missing_path_is_empty_listing() {
        assert!(parse_listing("{}").unwrap().is_empty());
        assert!(parse_listing(r#"{"smsList":{}}"#).unwrap().is_empty());
        assert!(parse_listing(r#"{"smsList":null}"#).unwrap().is_empty());
        assert!(parse_listing(r#"{"smsList":{"phoneList":null}}"#).unwrap().is_empty());
        assert!(parse_listing(r#"{"smsList":"disabled"}"#).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_carries_truncated_preview() {
        let text = format!("<html>{}</html>", "x".repeat(1000));
        let err = parse_listing(&text).unwrap_err();
        match err {
            SmsBridgeError::Parse { preview, .. } => {
                assert_eq!(preview.chars().count(), ERROR_PREVIEW_CHARS);
                assert!(preview.starts_with("<html>"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_phone_list_shape_is_parse_error() {
        let err = parse_listing(r#"{"smsList":{"phoneList":{"phone":"+1"}}}"#).unwrap_err();
        assert!(matches!(err, SmsBridgeError::Parse { .. }));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("ab", 10), "ab");
    }

    #[test]
    fn decodes_latin1_and_gbk() {
        let latin1 = resolve_encoding("latin1").unwrap();
        assert_eq!(decode_body(b"caf\xe9", latin1), "café");

        let gbk = resolve_encoding("gbk").unwrap();
        assert_eq!(decode_body(b"\xc4\xe3\xba\xc3", gbk), "你好");
    }

    #[test]
    fn utf8_decode_strips_bom_and_replaces_invalid_bytes() {
        let utf8 = resolve_encoding("utf-8").unwrap();
        assert_eq!(decode_body(b"\xef\xbb\xbf{}", utf8), "{}");
        assert_eq!(decode_body(b"caf\xe9", utf8), "caf\u{fffd}");
    }

    #[test]
    fn unknown_label_is_config_error() {
        assert!(matches!(
            resolve_encoding("klingon-8"),
            Err(SmsBridgeError::Config(_))
        ));
    }
}

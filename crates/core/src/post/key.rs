//! Object key policy for post images.
//!
//! Keys look like `Images/<field>_<unix-millis><ext>`. The timestamp makes
//! each upload distinct and the original extension is kept so the content
//! type can be inferred when the object is served.

use std::path::Path;

use chrono::{DateTime, Utc};

/// Prefix under which all post images are stored.
pub const IMAGE_KEY_PREFIX: &str = "Images";

const DEFAULT_FIELD_NAME: &str = "image";

/// Derive the object key for an image uploaded in form field `field_name`
/// with client file name `file_name` at instant `at`.
#[must_use]
pub fn image_key(field_name: &str, file_name: &str, at: DateTime<Utc>) -> String {
    let field = if field_name.is_empty() {
        DEFAULT_FIELD_NAME.to_string()
    } else {
        sanitize_segment(field_name)
    };

    format!(
        "{IMAGE_KEY_PREFIX}/{field}_{}{}",
        at.timestamp_millis(),
        extension_of(file_name)
    )
}

/// The file name's extension including the leading dot, or `""`.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", sanitize_segment(ext)))
        .unwrap_or_default()
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Every key lives under the prefix and ends in the original extension.
        #[test]
        fn prop_key_keeps_extension(
            field in "[a-zA-Z0-9_-]{0,20}",
            stem in "[a-zA-Z0-9_-]{1,30}",
            ext in "[a-zA-Z0-9]{1,5}",
            millis in 0i64..4_102_444_800_000,
        ) {
            let at = DateTime::<Utc>::from_timestamp_millis(millis).expect("in range");
            let key = image_key(&field, &format!("{stem}.{ext}"), at);

            let prefix = format!("{IMAGE_KEY_PREFIX}/");
            let expected_suffix = format!("_{millis}.{ext}");
            prop_assert!(key.starts_with(&prefix));
            prop_assert!(key.ends_with(&expected_suffix));
        }
    }

    proptest! {
        // Whatever the client sends, keys stay within a safe character set.
        #[test]
        fn prop_key_chars_are_safe(field in ".*", file in ".*") {
            let key = image_key(&field, &file, Utc::now());
            let rest = key.strip_prefix("Images/").expect("prefix");
            for c in rest.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in key: {}", c);
            }
        }
    }
}

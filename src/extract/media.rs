//! Single media item embedded in a media page.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::compile_static_regex;
use crate::record::MediaRecord;

// Media pages register the item as `Pb.Data.Shared.put(Pb.Data.Shared.MEDIA, {...});`
static MEDIA_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"Pb\.Data\.Shared\.put\(Pb\.Data\.Shared\.MEDIA,(.*?)\);")
});

/// Builds the record for the media item on a media page.
#[must_use]
pub fn extract_record(content: &str) -> Option<MediaRecord> {
    let blob = MEDIA_CALL_RE.captures(content)?.get(1)?.as_str().trim();
    let object: Value = match serde_json::from_str(blob) {
        Ok(value) => value,
        Err(error) => {
            debug!(error = %error, "media blob is not valid JSON");
            return None;
        }
    };
    MediaRecord::from_json(&object)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::record::MediaKind;

    #[test]
    fn test_extract_record_from_media_call() {
        let html = r#"<script>
            Pb.Data.Shared.put(Pb.Data.Shared.MEDIA, {"name":"cat.jpg","title":"Cat","originalUrl":"http://i1.example.com/albums/cat.jpg~original","mediaType":"image","username":"daxda"});
        </script>"#;
        let record = extract_record(html).unwrap();
        assert_eq!(record.filename, "cat.jpg");
        assert_eq!(record.direct_url, "http://i1.example.com/albums/cat.jpg");
        assert_eq!(record.kind, MediaKind::Image);
    }

    #[test]
    fn test_extract_record_missing_call_is_none() {
        assert!(extract_record("<html>no media here</html>").is_none());
    }

    #[test]
    fn test_extract_record_malformed_json_is_none() {
        let html = "Pb.Data.Shared.put(Pb.Data.Shared.MEDIA, {name: broken});";
        assert!(extract_record(html).is_none());
    }

    #[test]
    fn test_extract_record_without_original_url_is_none() {
        let html = r#"Pb.Data.Shared.put(Pb.Data.Shared.MEDIA, {"name":"x.jpg"});"#;
        assert!(extract_record(html).is_none());
    }
}

//! Output file naming: sanitization and collision-free paths.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Name used when a record's file name sanitizes to nothing.
const FALLBACK_NAME: &str = "media.bin";

/// Makes a site-supplied file name safe to join onto the output directory.
///
/// Replaces characters invalid on common filesystems (`/ \ : * ? " < > |`)
/// and control characters with `_`. Names that would still form a path
/// component such as `..` have their dots replaced too.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return FALLBACK_NAME.to_string();
    }
    if is_plain_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_plain_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}

/// Splits `photo.jpg` into `("photo", ".jpg")`.
///
/// Names without an extension, or whose only dot is the first character,
/// have an empty extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

/// Returns `dir/<name>`, or the first free `dir/<stem>(n)<ext>` for n = 1, 2, ...
///
/// `name` is sanitized first.
///
/// # Errors
///
/// Returns the IO error when the existence of a candidate cannot be checked.
pub async fn unique_path(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let name = sanitize_filename(name);
    let candidate = dir.join(&name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let (stem, ext) = split_extension(&name);
    for n in 1u64.. {
        let path = dir.join(format!("{stem}({n}){ext}"));
        if !tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }
    }
    Ok(candidate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename_replaces_invalid_chars() {
        assert_eq!(sanitize_filename("a/b.jpg"), "a_b.jpg");
        assert_eq!(sanitize_filename("a\\b:c*d?.jpg"), "a_b_c_d_.jpg");
        assert_eq!(sanitize_filename("x<y>|z\".png"), "x_y__z_.png");
        assert_eq!(sanitize_filename("cat (1).jpg"), "cat (1).jpg");
    }

    #[test]
    fn test_sanitize_filename_rewrites_dot_segments() {
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename("."), "_");
        assert_eq!(sanitize_filename("///"), FALLBACK_NAME);
        assert_eq!(sanitize_filename(""), FALLBACK_NAME);
    }

    #[tokio::test]
    async fn test_unique_path_returns_plain_name_when_free() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            unique_path(temp.path(), "photo.jpg").await.unwrap(),
            temp.path().join("photo.jpg")
        );
    }

    #[tokio::test]
    async fn test_unique_path_counts_past_existing_copies() {
        let temp = TempDir::new().unwrap();
        for name in ["photo.jpg", "photo(1).jpg", "photo(2).jpg"] {
            std::fs::write(temp.path().join(name), b"x").unwrap();
        }
        assert_eq!(
            unique_path(temp.path(), "photo.jpg").await.unwrap(),
            temp.path().join("photo(3).jpg")
        );
        // Same answer until the file is actually written.
        assert_eq!(
            unique_path(temp.path(), "photo.jpg").await.unwrap(),
            temp.path().join("photo(3).jpg")
        );
    }

    #[tokio::test]
    async fn test_unique_path_without_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("README"), b"x").unwrap();
        assert_eq!(
            unique_path(temp.path(), "README").await.unwrap(),
            temp.path().join("README(1)")
        );
    }

    #[tokio::test]
    async fn test_unique_path_stays_inside_directory() {
        let temp = TempDir::new().unwrap();
        for malicious in ["../../etc/passwd", "..", "a/../../b"] {
            let path = unique_path(temp.path(), malicious).await.unwrap();
            assert!(path.starts_with(temp.path()), "escaped: {}", path.display());
            assert!(!path.components().any(|c| c == Component::ParentDir));
        }
    }
}

//! Filename validation and sanitization.

use crate::error::{Error, Result};

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename could name another directory.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized = replace_reserved(name, &[':', '*', '?', '"', '<', '>', '|']);

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    reject_dot_component(&sanitized)?;
    Ok(sanitized)
}

/// Sanitize an album directory name.
///
/// Album titles come from page data, so separators are replaced rather than
/// rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized = replace_reserved(name, &['/', '\\', ':', '*', '?', '"', '<', '>', '|']);
    // Windows refuses trailing dots and spaces in directory names
    let sanitized = sanitized.trim().trim_end_matches('.').to_string();

    if sanitized.is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    reject_dot_component(&sanitized)?;
    Ok(sanitized)
}

/// Rejects names that resolve to the current or parent directory.
fn reject_dot_component(name: &str) -> Result<()> {
    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }
    Ok(())
}

fn replace_reserved(name: &str, reserved: &[char]) -> String {
    name.chars()
        .map(|c| {
            if reserved.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_valid() {
        assert_eq!(sanitize_filename("normal.txt").unwrap(), "normal.txt");
        assert_eq!(sanitize_filename("file:name.txt").unwrap(), "file_name.txt");
        assert_eq!(
            sanitize_filename("file*with?special.txt").unwrap(),
            "file_with_special.txt"
        );
    }

    #[test]
    fn test_sanitize_filename_path_traversal() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("..\\windows\\system32").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename(".").is_err());
    }

    #[test]
    fn test_sanitize_filename_allows_inner_dots() {
        assert_eq!(sanitize_filename("a..b").unwrap(), "a..b");
        assert_eq!(sanitize_filename("final..cut.jpg").unwrap(), "final..cut.jpg");
        assert_eq!(sanitize_filename("...").unwrap(), "...");
    }

    #[test]
    fn test_sanitize_filename_path_separators() {
        assert!(sanitize_filename("path/to/file.txt").is_err());
        assert!(sanitize_filename("path\\to\\file.txt").is_err());
    }

    #[test]
    fn test_sanitize_filename_null_bytes() {
        assert!(sanitize_filename("file\0name.txt").is_err());
    }

    #[test]
    fn test_sanitize_filename_empty() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("   ").is_err());
    }

    #[test]
    fn test_sanitize_path_component_valid() {
        assert_eq!(
            sanitize_path_component("Summer Trip").unwrap(),
            "Summer Trip"
        );
        assert_eq!(
            sanitize_path_component("AC/DC: Live").unwrap(),
            "AC_DC_ Live"
        );
        assert_eq!(sanitize_path_component(" album. ").unwrap(), "album");
    }

    #[test]
    fn test_sanitize_path_component_traversal() {
        assert!(sanitize_path_component("..").is_err());
        assert!(sanitize_path_component(" . ").is_err());
        assert_eq!(sanitize_path_component("../evil").unwrap(), ".._evil");
        assert_eq!(sanitize_path_component("foo/../bar").unwrap(), "foo_.._bar");
    }

    #[test]
    fn test_sanitize_path_component_allows_inner_dots() {
        assert_eq!(sanitize_path_component("Summer...").unwrap(), "Summer");
        assert_eq!(sanitize_path_component("a..b").unwrap(), "a..b");
    }
}

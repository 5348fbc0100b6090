use std::path::PathBuf;

use dirs_next::home_dir;
use once_cell::sync::Lazy;
use regex::Regex;

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Base name used for exported artifacts: the file name minus a trailing
/// `.yaml`, `.yml` or `.json` (case-insensitive), or `fallback` when nothing remains.
pub fn document_base_name(file_name: &str, fallback: &str) -> String {
    let trimmed = file_name.trim();
    let base = DOCUMENT_EXTENSION
        .find(trimmed)
        .map(|found| &trimmed[..found.start()])
        .unwrap_or(trimmed);
    if base.is_empty() { fallback.to_string() } else { base.to_string() }
}

/// True when the file name carries a YAML extension.
pub fn is_yaml_file_name(file_name: &str) -> bool {
    let lower = file_name.trim().to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml")
}

static DOCUMENT_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(ya?ml|json)$").expect("document extension regex should compile"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_document_extensions() {
        assert_eq!(document_base_name("qvi.yaml", "workflow"), "qvi");
        assert_eq!(document_base_name("qvi.YML", "workflow"), "qvi");
        assert_eq!(document_base_name("qvi-config.json", "config"), "qvi-config");
        assert_eq!(document_base_name("notes.txt", "config"), "notes.txt");
    }

    #[test]
    fn empty_base_uses_fallback() {
        assert_eq!(document_base_name("", "workflow"), "workflow");
        assert_eq!(document_base_name(".json", "config"), "config");
    }

    #[test]
    fn detects_yaml_names() {
        assert!(is_yaml_file_name("a.yml"));
        assert!(is_yaml_file_name("a.YAML"));
        assert!(!is_yaml_file_name("a.json"));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/x"), home.join("x"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}

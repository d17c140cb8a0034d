// src/config.rs

use crate::game::search::SearchConfig;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const PROFILES_DIR: &str = "profiles";

fn profile_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

pub fn save_profile(dir: &Path, name: &str, config: &SearchConfig) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(config)?;
    fs::File::create(profile_path(dir, name))?.write_all(json.as_bytes())
}

pub fn load_profile(dir: &Path, name: &str) -> io::Result<SearchConfig> {
    let json = fs::read_to_string(profile_path(dir, name))?;
    serde_json::from_str(&json).map_err(io::Error::from)
}

/// Names of the profiles stored in `dir`, sorted.
pub fn get_profiles(dir: &Path) -> io::Result<Vec<String>> {
    let mut profiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                profiles.push(name.to_string());
            }
        }
    }
    profiles.sort();
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_profile_round_trip() {
        let dir = tempdir().unwrap();
        let config = SearchConfig {
            use_best_node_search: false,
            time_relaxation: 0.5,
            max_depth: Some(6),
            seed: Some(7),
            ..SearchConfig::default()
        };
        save_profile(dir.path(), "narrow", &config).unwrap();
        assert_eq!(load_profile(dir.path(), "narrow").unwrap(), config);
    }

    #[test]
    fn test_save_creates_the_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("profiles");
        save_profile(&nested, "default", &SearchConfig::default()).unwrap();
        assert_eq!(get_profiles(&nested).unwrap(), vec!["default".to_string()]);
    }

    #[test]
    fn test_get_profiles_lists_json_files_only() {
        let dir = tempdir().unwrap();
        save_profile(dir.path(), "fast", &SearchConfig::default()).unwrap();
        save_profile(dir.path(), "deep", &SearchConfig::default()).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();
        fs::create_dir(dir.path().join("archive.json")).unwrap();
        assert_eq!(get_profiles(dir.path()).unwrap(), vec!["deep", "fast"]);
    }

    #[test]
    fn test_partial_profile_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lean.json"), r#"{ "use_transposition_table": false }"#).unwrap();
        let config = load_profile(dir.path(), "lean").unwrap();
        assert!(!config.use_transposition_table);
        assert_eq!(config.immediate_search_threshold, SearchConfig::default().immediate_search_threshold);
    }

    #[test]
    fn test_missing_and_malformed_profiles_fail() {
        let dir = tempdir().unwrap();
        assert_eq!(
            load_profile(dir.path(), "absent").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        assert!(load_profile(dir.path(), "broken").is_err());
    }
}

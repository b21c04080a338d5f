//! Last-searched-city preference, stored as a single plaintext line.

use std::fs;
use std::path::Path;

/// A missing or blank file is not an error; the built-in default applies.
pub fn load(path: impl AsRef<Path>, default: &str) -> String {
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let city = contents.trim();
            if city.is_empty() {
                default.to_string()
            } else {
                city.to_string()
            }
        }
        Err(_) => default.to_string(),
    }
}

/// Best-effort write; a failure is logged and swallowed.
pub fn save(path: impl AsRef<Path>, value: &str) {
    if let Err(err) = fs::write(&path, value) {
        tracing::warn!(
            path = %path.as_ref().display(),
            %err,
            "could not save city preference"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_saved_city() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_city.txt");
        save(&path, "Reykjavik");
        assert_eq!(load(&path, "London"), "Reykjavik");
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(dir.path().join("absent.txt"), "London"), "London");
    }

    #[test]
    fn blank_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_city.txt");
        save(&path, "  \n");
        assert_eq!(load(&path, "London"), "London");
    }
}

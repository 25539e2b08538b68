use std::path::{Path, PathBuf};

pub(crate) const BASE_DIR_ENV: &str = "IMAGE_TRANSLATOR_RUST_DIR";
const HOME_SUBDIR: &str = ".image-translator-rust";

pub(crate) fn settings_dir() -> Option<PathBuf> {
    if let Some(dir) = base_dir_override() {
        return Some(dir);
    }
    default_base_dir()
}

pub(crate) fn prefs_path() -> PathBuf {
    if let Some(dir) = base_dir_override() {
        return dir.join("data").join("user_prefs.json");
    }
    default_base_dir()
        .map(|dir| dir.join("data").join("user_prefs.json"))
        .unwrap_or_else(|| PathBuf::from("data").join("user_prefs.json"))
}

pub(crate) fn expand_path(value: &str) -> Option<PathBuf> {
    normalize_dir(value)
}

fn base_dir_override() -> Option<PathBuf> {
    std::env::var(BASE_DIR_ENV)
        .ok()
        .and_then(|value| normalize_dir(&value))
}

fn default_base_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(HOME_SUBDIR))
        }
    })
}

fn normalize_dir(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_tilde(trimmed);
    Some(normalize_path(PathBuf::from(expanded)))
}

fn normalize_path(path: PathBuf) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        normalized.push(component.as_os_str());
    }
    normalized
}

fn expand_tilde(value: &str) -> String {
    if value == "~" || value.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let home = home.trim();
            if home.is_empty() {
                return value.to_string();
            }
            if value == "~" {
                return home.to_string();
            }
            return format!("{}{}", home, &value[1..]);
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn prefs_path_lives_under_home_dir() {
        with_temp_home(|home| {
            let path = prefs_path();
            assert_eq!(path, home.join(HOME_SUBDIR).join("data/user_prefs.json"));
        });
    }

    #[test]
    fn expand_path_resolves_tilde() {
        with_temp_home(|home| {
            let path = expand_path("~/fonts/NotoSans.ttf").expect("path");
            assert_eq!(path, home.join("fonts/NotoSans.ttf"));
            assert!(expand_path("   ").is_none());
        });
    }
}

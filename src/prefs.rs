use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Durable per-user target-language preferences, stored as a JSON object
/// keyed by the stringified user id.
#[derive(Debug)]
pub struct UserPrefs {
    path: PathBuf,
    default_language: String,
    lock: Mutex<()>,
}

impl UserPrefs {
    pub fn new(path: impl Into<PathBuf>, default_language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_language: default_language.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn get_lang(&self, user_id: u64) -> String {
        let _guard = self.lock.lock().unwrap_or_else(|err| err.into_inner());
        load_prefs(&self.path)
            .remove(&user_id.to_string())
            .unwrap_or_else(|| self.default_language.clone())
    }

    pub fn set_lang(&self, user_id: u64, lang: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|err| err.into_inner());
        let mut prefs = load_prefs(&self.path);
        prefs.insert(user_id.to_string(), lang.to_string());
        save_prefs(&self.path, &prefs)?;
        info!("set language for user {} to {}", user_id, lang);
        Ok(())
    }
}

fn load_prefs(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        return BTreeMap::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));
    match parsed {
        Ok(prefs) => prefs,
        Err(err) => {
            warn!(
                "could not read preferences file {}, starting fresh: {}",
                path.display(),
                err
            );
            BTreeMap::new()
        }
    }
}

fn save_prefs(path: &Path, prefs: &BTreeMap<String, String>) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create preferences dir: {}", dir.display()))?;
    }
    let content = serde_json::to_string_pretty(prefs)?;
    fs::write(path, content)
        .with_context(|| format!("failed to write preferences: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_user_gets_default_language() {
        let dir = tempdir().expect("tempdir");
        let prefs = UserPrefs::new(dir.path().join("prefs.json"), "en");
        assert_eq!(prefs.get_lang(42), "en");
    }

    #[test]
    fn set_lang_persists_across_instances() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/data/prefs.json");
        UserPrefs::new(&path, "en").set_lang(7, "ja").expect("set");

        let reopened = UserPrefs::new(&path, "en");
        assert_eq!(reopened.get_lang(7), "ja");
        assert_eq!(reopened.get_lang(8), "en");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"7\": \"ja\""));
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").expect("write");
        let prefs = UserPrefs::new(&path, "fr");
        assert_eq!(prefs.get_lang(1), "fr");

        prefs.set_lang(1, "de").expect("set overwrites corrupt file");
        assert_eq!(prefs.get_lang(1), "de");
    }
}

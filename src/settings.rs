use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::ScriptFamily;
use crate::paths;
use crate::translate::BackendKind;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub default_language: String,
    pub prefs_path: Option<PathBuf>,
    pub families: Vec<ScriptFamily>,
    pub border_width: u32,
    pub font_path: Option<PathBuf>,
    pub font_family: Option<String>,
    pub translator_backend: BackendKind,
    pub translator_endpoint: Option<String>,
    pub translator_api_key: Option<String>,
    pub translator_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            prefs_path: None,
            families: ScriptFamily::ALL.to_vec(),
            border_width: 4,
            font_path: None,
            font_family: None,
            translator_backend: BackendKind::Google,
            translator_endpoint: None,
            translator_api_key: None,
            translator_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn prefs_path(&self) -> PathBuf {
        self.prefs_path.clone().unwrap_or_else(paths::prefs_path)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    system: Option<SystemSettings>,
    ocr: Option<OcrSettings>,
    translator: Option<TranslatorSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct SystemSettings {
    default_language: Option<String>,
    prefs_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSettings {
    families: Option<Vec<String>>,
    border_width: Option<u32>,
    font_path: Option<String>,
    font_family: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslatorSettings {
    backend: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];

    if let Some(home) = paths::settings_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge_str(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed)
    }

    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(system) = incoming.system {
            if let Some(lang) = system.default_language {
                if !lang.trim().is_empty() {
                    self.default_language = lang.trim().to_string();
                }
            }
            if let Some(path) = system.prefs_path {
                self.prefs_path = paths::expand_path(&path);
            }
        }
        if let Some(ocr) = incoming.ocr {
            if let Some(names) = ocr.families {
                let mut families = Vec::with_capacity(names.len());
                for name in names {
                    let family: ScriptFamily = name.parse()?;
                    if !families.contains(&family) {
                        families.push(family);
                    }
                }
                if families.is_empty() {
                    return Err(anyhow!("[ocr] families must not be empty"));
                }
                self.families = families;
            }
            if let Some(width) = ocr.border_width {
                self.border_width = width;
            }
            if let Some(path) = ocr.font_path {
                self.font_path = paths::expand_path(&path);
            }
            if let Some(family) = ocr.font_family {
                if !family.trim().is_empty() {
                    self.font_family = Some(family);
                }
            }
        }
        if let Some(translator) = incoming.translator {
            if let Some(backend) = translator.backend {
                self.translator_backend = backend.parse()?;
            }
            if let Some(endpoint) = translator.endpoint {
                if !endpoint.trim().is_empty() {
                    self.translator_endpoint = Some(endpoint.trim().to_string());
                }
            }
            if let Some(key) = translator.api_key {
                if !key.trim().is_empty() {
                    self.translator_api_key = Some(key);
                }
            }
            if let Some(secs) = translator.timeout_secs {
                if secs > 0 {
                    self.translator_timeout_secs = secs;
                }
            }
        }
        Ok(())
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = paths::settings_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::process::Command;

pub fn list_tesseract_languages() -> Result<Vec<String>> {
    let output = Command::new("tesseract")
        .arg("--list-langs")
        .output()
        .with_context(|| "failed to run tesseract --list-langs (is it installed?)")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("tesseract --list-langs failed: {}", stderr.trim()));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_language_list(&stdout))
}

fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every requested pack must be installed; a family recognizing only part of
/// its scripts would score misleadingly against the others.
pub(super) fn require_languages(requested: &[&str]) -> Result<String> {
    let available = list_tesseract_languages()?;
    check_languages(requested, &available)
}

fn check_languages(requested: &[&str], available: &[String]) -> Result<String> {
    let missing: Vec<&str> = requested
        .iter()
        .copied()
        .filter(|lang| !available.iter().any(|value| value == lang))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!(
            "tesseract language pack(s) not installed: {}",
            missing.join(", ")
        ));
    }
    Ok(requested.join("+"))
}

pub(super) fn run_tesseract_tsv(path: &Path, languages: &str) -> Result<String> {
    let output = Command::new("tesseract")
        .arg(path)
        .arg("stdout")
        .arg("-l")
        .arg(languages)
        .arg("--oem")
        .arg("1")
        .arg("--psm")
        .arg("11")
        .arg("tsv")
        .output()
        .with_context(|| "failed to run tesseract (is it installed?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("tesseract failed: {}", stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_list_skips_header() {
        let stdout = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\njpn\n\nosd\n";
        assert_eq!(parse_language_list(stdout), vec!["eng", "jpn", "osd"]);
    }

    #[test]
    fn missing_packs_fail_construction() {
        let available = vec!["eng".to_string(), "jpn".to_string()];
        assert_eq!(check_languages(&["jpn", "eng"], &available).unwrap(), "jpn+eng");
        let err = check_languages(&["kor", "eng"], &available).unwrap_err();
        assert!(err.to_string().contains("kor"));
    }
}

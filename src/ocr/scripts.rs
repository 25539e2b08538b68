use anyhow::anyhow;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A group of writing systems whose recognition models can share one pass.
/// CJK scripts cannot be mixed with each other or with Latin-only alphabets,
/// so each gets its own family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFamily {
    Latin,
    Chinese,
    Japanese,
    Korean,
    Cyrillic,
    Arabic,
    Devanagari,
}

impl ScriptFamily {
    /// Fixed enumeration order; the first family wins score ties.
    pub const ALL: [ScriptFamily; 7] = [
        ScriptFamily::Latin,
        ScriptFamily::Chinese,
        ScriptFamily::Japanese,
        ScriptFamily::Korean,
        ScriptFamily::Cyrillic,
        ScriptFamily::Arabic,
        ScriptFamily::Devanagari,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptFamily::Latin => "latin",
            ScriptFamily::Chinese => "chinese",
            ScriptFamily::Japanese => "japanese",
            ScriptFamily::Korean => "korean",
            ScriptFamily::Cyrillic => "cyrillic",
            ScriptFamily::Arabic => "arabic",
            ScriptFamily::Devanagari => "devanagari",
        }
    }

    /// Language codes the family's reader recognizes.
    pub fn languages(&self) -> &'static [&'static str] {
        match self {
            ScriptFamily::Latin => &["en"],
            ScriptFamily::Chinese => &["ch_sim", "en"],
            ScriptFamily::Japanese => &["ja", "en"],
            ScriptFamily::Korean => &["ko", "en"],
            ScriptFamily::Cyrillic => &["ru", "uk", "be", "bg", "mn"],
            ScriptFamily::Arabic => &["ar", "fa", "ur"],
            ScriptFamily::Devanagari => &["hi", "mr", "ne"],
        }
    }

    /// Tesseract traineddata names for the same language set.
    pub fn tesseract_languages(&self) -> &'static [&'static str] {
        match self {
            ScriptFamily::Latin => &["eng"],
            ScriptFamily::Chinese => &["chi_sim", "eng"],
            ScriptFamily::Japanese => &["jpn", "eng"],
            ScriptFamily::Korean => &["kor", "eng"],
            ScriptFamily::Cyrillic => &["rus", "ukr", "bel", "bul", "mon"],
            ScriptFamily::Arabic => &["ara", "fas", "urd"],
            ScriptFamily::Devanagari => &["hin", "mar", "nep"],
        }
    }
}

impl fmt::Display for ScriptFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptFamily {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        ScriptFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == needle)
            .ok_or_else(|| anyhow!("unknown script family '{}'", value.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Cyrillic".parse::<ScriptFamily>().unwrap(), ScriptFamily::Cyrillic);
        assert!("runic".parse::<ScriptFamily>().is_err());
    }

    #[test]
    fn every_family_maps_to_tesseract_languages() {
        for family in ScriptFamily::ALL {
            assert_eq!(
                family.languages().len(),
                family.tesseract_languages().len(),
                "{family}"
            );
        }
    }
}

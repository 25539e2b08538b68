//! Display-name to language-code catalog used for user-facing selection.

const AUTOCOMPLETE_LIMIT: usize = 25;

const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Russian", "ru"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Chinese (Simplified)", "zh-CN"),
    ("Chinese (Traditional)", "zh-TW"),
    ("Arabic", "ar"),
    ("Hindi", "hi"),
    ("Turkish", "tr"),
    ("Vietnamese", "vi"),
    ("Thai", "th"),
    ("Indonesian", "id"),
    ("Dutch", "nl"),
    ("Polish", "pl"),
    ("Ukrainian", "uk"),
    ("Czech", "cs"),
    ("Swedish", "sv"),
    ("Danish", "da"),
    ("Finnish", "fi"),
    ("Norwegian", "no"),
    ("Hungarian", "hu"),
    ("Romanian", "ro"),
    ("Greek", "el"),
    ("Hebrew", "he"),
    ("Malay", "ms"),
    ("Filipino", "tl"),
    ("Bengali", "bn"),
    ("Tamil", "ta"),
    ("Telugu", "te"),
    ("Urdu", "ur"),
    ("Persian", "fa"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageCatalog;

impl LanguageCatalog {
    pub fn entries(&self) -> impl Iterator<Item = Language> + '_ {
        SUPPORTED_LANGUAGES
            .iter()
            .map(|&(name, code)| Language { name, code })
    }

    /// Entries ordered by display name.
    pub fn sorted(&self) -> Vec<Language> {
        let mut entries: Vec<Language> = self.entries().collect();
        entries.sort_by(|a, b| a.name.cmp(b.name));
        entries
    }

    /// Resolves free-form user input to a code: exact code, then exact name,
    /// then the first name containing the input (all case-insensitive).
    pub fn resolve(&self, input: &str) -> Option<&'static str> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(lang) = self.entries().find(|lang| lang.code.to_lowercase() == needle) {
            return Some(lang.code);
        }
        if let Some(lang) = self.entries().find(|lang| lang.name.to_lowercase() == needle) {
            return Some(lang.code);
        }
        self.entries()
            .find(|lang| lang.name.to_lowercase().contains(&needle))
            .map(|lang| lang.code)
    }

    pub fn display_name<'a>(&self, code: &'a str) -> &'a str {
        self.entries()
            .find(|lang| lang.code == code)
            .map(|lang| lang.name)
            .unwrap_or(code)
    }

    pub fn autocomplete(&self, current: &str) -> Vec<Language> {
        let needle = current.trim().to_lowercase();
        self.sorted()
            .into_iter()
            .filter(|lang| {
                lang.name.to_lowercase().contains(&needle)
                    || lang.code.to_lowercase().contains(&needle)
            })
            .take(AUTOCOMPLETE_LIMIT)
            .collect()
    }

    pub fn format_listing(&self) -> String {
        self.sorted()
            .iter()
            .map(|lang| format!("{} ({})", lang.name, lang.code))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_code_then_name_then_partial() {
        let catalog = LanguageCatalog;
        assert_eq!(catalog.resolve("zh-cn"), Some("zh-CN"));
        assert_eq!(catalog.resolve("  Japanese "), Some("ja"));
        assert_eq!(catalog.resolve("chin"), Some("zh-CN"));
        assert_eq!(catalog.resolve("klingon"), None);
        assert_eq!(catalog.resolve(""), None);
    }

    #[test]
    fn display_name_falls_back_to_code() {
        let catalog = LanguageCatalog;
        assert_eq!(catalog.display_name("es"), "Spanish");
        assert_eq!(catalog.display_name("xx"), "xx");
    }

    #[test]
    fn autocomplete_matches_name_or_code() {
        let catalog = LanguageCatalog;
        let names: Vec<&str> = catalog.autocomplete("zh").iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Chinese (Simplified)", "Chinese (Traditional)"]);
        assert_eq!(catalog.autocomplete("").len(), 25);
    }
}

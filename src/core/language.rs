use serde::{Deserialize, Serialize};

/// Languages the assessment pipeline can prompt, parse and report in.
///
/// The pipeline computes in one configured working language; other
/// languages are reached through the translation helper at the output
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    Korean,
    #[default]
    English,
    Chinese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Korean, Language::English, Language::Chinese];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Korean => "Korean",
            Language::English => "English",
            Language::Chinese => "Chinese",
        }
    }

    /// Parse a language selector as it arrives from callers ("Korean",
    /// "ko", "en", ...). Unrecognized values fall back to English.
    pub fn parse(value: &str) -> Language {
        match value.trim().to_ascii_lowercase().as_str() {
            "korean" | "ko" | "kr" => Language::Korean,
            "chinese" | "zh" | "cn" => Language::Chinese,
            _ => Language::English,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_codes_and_names() {
        assert_eq!(Language::parse("Korean"), Language::Korean);
        assert_eq!(Language::parse("ko"), Language::Korean);
        assert_eq!(Language::parse("zh"), Language::Chinese);
        assert_eq!(Language::parse("en"), Language::English);
        assert_eq!(Language::parse("klingon"), Language::English);
    }
}

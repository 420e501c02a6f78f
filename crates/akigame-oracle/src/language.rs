//! Supported languages and themes.
//!
//! A language code is a region, optionally suffixed with a theme:
//! `en`, `en_animals`, `fr_objects`. English names (`french`,
//! `german_animals`) are accepted as aliases.

use std::fmt;

use akigame_core::error::OracleError;

/// What the oracle guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Real or fictional characters.
    Characters,
    /// Animals.
    Animals,
    /// Objects.
    Objects,
}

impl Theme {
    /// Value of the `theme` query parameter.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Characters => "c",
            Self::Animals => "a",
            Self::Objects => "o",
        }
    }
}

/// A supported region/theme pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    code: &'static str,
    region: &'static str,
    theme: Theme,
}

const LANGUAGES: &[Language] = &[
    Language::new("en", "en", Theme::Characters),
    Language::new("en_animals", "en", Theme::Animals),
    Language::new("en_objects", "en", Theme::Objects),
    Language::new("ar", "ar", Theme::Characters),
    Language::new("cn", "cn", Theme::Characters),
    Language::new("de", "de", Theme::Characters),
    Language::new("de_animals", "de", Theme::Animals),
    Language::new("es", "es", Theme::Characters),
    Language::new("es_animals", "es", Theme::Animals),
    Language::new("fr", "fr", Theme::Characters),
    Language::new("fr_animals", "fr", Theme::Animals),
    Language::new("fr_objects", "fr", Theme::Objects),
    Language::new("il", "il", Theme::Characters),
    Language::new("it", "it", Theme::Characters),
    Language::new("it_animals", "it", Theme::Animals),
    Language::new("jp", "jp", Theme::Characters),
    Language::new("jp_animals", "jp", Theme::Animals),
    Language::new("kr", "kr", Theme::Characters),
    Language::new("nl", "nl", Theme::Characters),
    Language::new("pl", "pl", Theme::Characters),
    Language::new("pt", "pt", Theme::Characters),
    Language::new("ru", "ru", Theme::Characters),
    Language::new("tr", "tr", Theme::Characters),
    Language::new("id", "id", Theme::Characters),
];

const ALIASES: &[(&str, &str)] = &[
    ("english", "en"),
    ("english_animals", "en_animals"),
    ("english_objects", "en_objects"),
    ("arabic", "ar"),
    ("chinese", "cn"),
    ("german", "de"),
    ("german_animals", "de_animals"),
    ("spanish", "es"),
    ("spanish_animals", "es_animals"),
    ("french", "fr"),
    ("french_animals", "fr_animals"),
    ("french_objects", "fr_objects"),
    ("hebrew", "il"),
    ("italian", "it"),
    ("italian_animals", "it_animals"),
    ("japanese", "jp"),
    ("japanese_animals", "jp_animals"),
    ("korean", "kr"),
    ("dutch", "nl"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("russian", "ru"),
    ("turkish", "tr"),
    ("indonesian", "id"),
];

impl Language {
    const fn new(code: &'static str, region: &'static str, theme: Theme) -> Self {
        Self {
            code,
            region,
            theme,
        }
    }

    /// Resolves a code or alias, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::InvalidLanguage` for anything not in the table.
    pub fn parse(raw: &str) -> Result<Self, OracleError> {
        let folded = raw.trim().to_lowercase().replace([' ', '-'], "_");
        let code = ALIASES
            .iter()
            .find(|(alias, _)| *alias == folded)
            .map_or(folded.as_str(), |(_, code)| code);
        LANGUAGES
            .iter()
            .find(|language| language.code == code)
            .copied()
            .ok_or_else(|| OracleError::InvalidLanguage(raw.trim().to_owned()))
    }

    /// Every supported language.
    pub fn all() -> impl Iterator<Item = Self> {
        LANGUAGES.iter().copied()
    }

    /// Canonical code, e.g. `fr_objects`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.code
    }

    /// Region sent as the `lang` query parameter.
    #[must_use]
    pub const fn region(self) -> &'static str {
        self.region
    }

    /// Theme of the game.
    #[must_use]
    pub const fn theme(self) -> Theme {
        self.theme
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

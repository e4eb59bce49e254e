//! Language catalogue
//!
//! The backend translates between Quechua and Spanish only. Codes are ISO 639-1
//! and validated through `isolang` before being matched against the supported set.

use isolang::Language;
use serde::Serialize;

use crate::shared::error::{AppError, AppResult};

pub const QUECHUA: &str = "qu";
pub const SPANISH: &str = "es";

pub const MIN_TEXT_LENGTH: usize = 1;
pub const MAX_TEXT_LENGTH: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedLanguage {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    pub flag: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslationDirection {
    pub from: &'static str,
    pub to: &'static str,
    pub label: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[SupportedLanguage] = &[
    SupportedLanguage {
        code: QUECHUA,
        name: "Quechua",
        native_name: "Runa Simi",
        flag: "🏔️",
    },
    SupportedLanguage {
        code: SPANISH,
        name: "Spanish",
        native_name: "Español",
        flag: "🇪🇸",
    },
];

pub const TRANSLATION_DIRECTIONS: &[TranslationDirection] = &[
    TranslationDirection { from: QUECHUA, to: SPANISH, label: "Quechua → Español" },
    TranslationDirection { from: SPANISH, to: QUECHUA, label: "Español → Quechua" },
];

const QUECHUA_EXAMPLES: &[&str] = &[
    "Napaykullayki",
    "Imaynalla kashanki",
    "Allinmi kasani",
    "Mama warmi",
    "Inti sumaq",
    "Munakuyki",
];

const SPANISH_EXAMPLES: &[&str] = &[
    "Hola",
    "¿Cómo estás?",
    "Estoy bien",
    "Mujer madre",
    "Sol hermoso",
    "Te amo",
];

/// Look up a supported language by code (case-insensitive, surrounding space ignored).
pub fn find(code: &str) -> Option<&'static SupportedLanguage> {
    let code = code.trim().to_ascii_lowercase();
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Validate a language code and return its canonical form.
///
/// Codes that are not ISO 639-1 at all and codes the backend does not
/// translate are both rejected with the same user-facing message.
pub fn validate_code(code: &str) -> AppResult<&'static str> {
    let normalized = code.trim().to_ascii_lowercase();
    let known = Language::from_639_1(&normalized).is_some();
    match find(&normalized) {
        Some(lang) if known => Ok(lang.code),
        _ => Err(AppError::Validation(format!("Idioma no soportado: {}", code.trim()))),
    }
}

/// Example phrases offered for a source language; empty for unknown codes.
pub fn examples(code: &str) -> &'static [&'static str] {
    match find(code).map(|lang| lang.code) {
        Some(QUECHUA) => QUECHUA_EXAMPLES,
        Some(SPANISH) => SPANISH_EXAMPLES,
        _ => &[],
    }
}

pub fn direction(from: &str, to: &str) -> Option<&'static TranslationDirection> {
    let from = from.trim().to_ascii_lowercase();
    let to = to.trim().to_ascii_lowercase();
    TRANSLATION_DIRECTIONS
        .iter()
        .find(|dir| dir.from == from && dir.to == to)
}

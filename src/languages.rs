//! Supported language registry.
//!
//! The codes are the common denominator understood by the recognition,
//! translation, and synthesis engines this crate is pointed at. Configuration
//! validation rejects anything outside this table.

/// Supported languages as (name, code) pairs.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("english", "en"),
    ("spanish", "es"),
    ("french", "fr"),
    ("german", "de"),
    ("italian", "it"),
    ("portuguese", "pt"),
    ("russian", "ru"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("chinese_simplified", "zh-CN"),
    ("chinese_traditional", "zh-TW"),
    ("arabic", "ar"),
    ("hindi", "hi"),
    ("bengali", "bn"),
    ("dutch", "nl"),
    ("turkish", "tr"),
    ("vietnamese", "vi"),
    ("thai", "th"),
    ("polish", "pl"),
    ("swedish", "sv"),
    ("norwegian", "no"),
    ("danish", "da"),
    ("finnish", "fi"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("indonesian", "id"),
    ("malay", "ms"),
    ("filipino", "fil"),
    ("urdu", "ur"),
    ("persian", "fa"),
    ("ukrainian", "uk"),
    ("czech", "cs"),
    ("romanian", "ro"),
    ("hungarian", "hu"),
];

/// Look up the language code for a (lowercase) language name.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    LANGUAGES
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, code)| *code)
}

/// Look up the language name for a code.
pub fn name_for_code(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Returns true if the code is in the registry.
pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|(_, c)| *c == code)
}

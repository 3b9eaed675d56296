use crate::locale::LocaleDescriptor;
use crate::models::Product;
use crate::utils;
use chrono::{Locale, TimeZone, Utc};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Canonical calendar order, in normalized form.
pub const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "marco",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const UNKNOWN_MONTH: usize = usize::MAX;

pub fn is_combining_mark(c: char) -> bool {
    unicode_normalization::char::is_combining_mark(c)
}

/// Case-folds and strips diacritics: `"Março "` -> `"marco"`.
pub fn normalize_month_label(label: &str) -> String {
    label
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Zero-based calendar index of a recognized month label.
pub fn month_index(label: &str) -> Option<usize> {
    let normalized = normalize_month_label(label);
    MONTHS.iter().position(|m| *m == normalized)
}

/// Collation key for base-sensitivity comparisons: accents and case are
/// ignored, as in a "base" strength collator.
pub fn collation_key(text: &str, language: &str) -> String {
    let folded: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    match language {
        // Dotted and dotless i are distinct base letters.
        "tr" | "az" => folded.replace('I', "ı").to_lowercase(),
        _ => folded.to_lowercase(),
    }
}

pub fn compare_text(a: &str, b: &str, language: &str) -> Ordering {
    collation_key(a, language)
        .cmp(&collation_key(b, language))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Recognized months by calendar position, then everything else; ties break
/// lexically in the source language.
pub fn order_months<'a, I>(labels: I, source_language: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ordered: Vec<&str> = labels.into_iter().collect();
    ordered.sort_by(|a, b| {
        let ai = month_index(a).unwrap_or(UNKNOWN_MONTH);
        let bi = month_index(b).unwrap_or(UNKNOWN_MONTH);
        ai.cmp(&bi).then_with(|| compare_text(a, b, source_language))
    });
    ordered
}

fn calendar_locale(locale: &LocaleDescriptor) -> Option<Locale> {
    let mut candidates = vec![locale.posix_name()];
    if locale.region.is_empty() {
        let region = match locale.language.as_str() {
            "en" => "US".to_string(),
            "pt" => "BR".to_string(),
            "ja" => "JP".to_string(),
            "zh" => "CN".to_string(),
            "ko" => "KR".to_string(),
            "sv" => "SE".to_string(),
            "da" => "DK".to_string(),
            "cs" => "CZ".to_string(),
            "el" => "GR".to_string(),
            "uk" => "UA".to_string(),
            "hi" => "IN".to_string(),
            other => other.to_uppercase(),
        };
        candidates.push(format!("{}_{}", locale.language, region));
    }
    candidates
        .iter()
        .find_map(|name| Locale::try_from(name.as_str()).ok())
}

/// Renders a recognized month as the visitor's long month name; anything
/// else is returned unchanged.
pub fn translate_month_label(label: &str, locale: &LocaleDescriptor) -> String {
    let Some(index) = month_index(label) else {
        return label.to_string();
    };
    let Some(calendar) = calendar_locale(locale) else {
        return label.to_string();
    };
    match Utc.with_ymd_and_hms(2024, index as u32 + 1, 15, 12, 0, 0).single() {
        Some(date) => date.format_localized("%B", calendar).to_string(),
        None => label.to_string(),
    }
}

pub fn sort_products<'a>(products: &'a [Product], locale: &LocaleDescriptor) -> Vec<&'a Product> {
    let mut sorted: Vec<&Product> = products.iter().collect();
    sorted.sort_by(|a, b| compare_text(a.label(), b.label(), &locale.language));
    sorted
}

/// Case-insensitive substring match on the display name. Invalid products
/// never match, whatever the search term.
pub fn filter_products<'a>(products: &[&'a Product], search_term: &str) -> Vec<&'a Product> {
    let term = search_term.trim();
    let matcher = if term.is_empty() {
        None
    } else {
        Some(utils::create_regex(term).map_err(|_| term.to_lowercase()))
    };
    products
        .iter()
        .copied()
        .filter(|p| p.is_valid())
        .filter(|p| match &matcher {
            None => true,
            Some(Ok(re)) => re.is_match(p.label()),
            // Term too long to compile: plain lowercase containment.
            Some(Err(lowered)) => p.label().to_lowercase().contains(lowered.as_str()),
        })
        .collect()
}

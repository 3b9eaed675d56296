//! Visitor locale detection.
//!
//! The descriptor is derived once per page load from the visitor's reported
//! language preferences (the `Accept-Language` header) and never changes
//! afterwards.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleDescriptor {
    pub locale: String,
    pub language: String,
    pub region: String,
}

impl Default for LocaleDescriptor {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            language: "pt".to_string(),
            region: "BR".to_string(),
        }
    }
}

impl LocaleDescriptor {
    /// Normalizes a raw tag such as `en_US` into `en-US`.
    ///
    /// Returns `None` when the tag has no usable language subtag.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().replace('_', "-");
        let mut parts = cleaned.split('-').filter(|p| !p.is_empty());

        let language = parts.next()?.to_lowercase();
        if language == "*" || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        // Script subtags (four letters, e.g. `zh-Hant-TW`) are skipped for the region.
        let region = parts
            .find(|p| p.len() != 4 && p.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|r| r.to_uppercase())
            .unwrap_or_default();

        let locale = if region.is_empty() {
            language.clone()
        } else {
            format!("{}-{}", language, region)
        };

        Some(Self { locale, language, region })
    }

    /// Resolves the first usable preference, falling back to `default`
    /// (and then to Brazilian Portuguese) when nothing can be parsed.
    pub fn resolve<'a, I>(preferences: I, default: &str) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        preferences
            .into_iter()
            .find_map(Self::parse)
            .or_else(|| Self::parse(default))
            .unwrap_or_default()
    }

    /// Resolves a descriptor from an `Accept-Language` header value,
    /// honouring quality weights.
    pub fn from_accept_language(header: Option<&str>, default: &str) -> Self {
        let mut weighted: Vec<(f32, usize, &str)> = header
            .unwrap_or("")
            .split(',')
            .enumerate()
            .filter_map(|(pos, item)| {
                let mut fields = item.split(';');
                let tag = fields.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let q = fields
                    .filter_map(|f| f.trim().strip_prefix("q="))
                    .find_map(|v| v.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (q > 0.0).then_some((q, pos, tag))
            })
            .collect();

        weighted.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        Self::resolve(weighted.into_iter().map(|(_, _, tag)| tag), default)
    }

    /// POSIX-style name (`pt_BR`) used to look up calendar data.
    pub fn posix_name(&self) -> String {
        if self.region.is_empty() {
            self.language.clone()
        } else {
            format!("{}_{}", self.language, self.region)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_underscore_and_case() {
        let d = LocaleDescriptor::parse("EN_us").unwrap();
        assert_eq!(d.locale, "en-US");
        assert_eq!(d.language, "en");
        assert_eq!(d.region, "US");
    }

    #[test]
    fn test_parse_language_only() {
        let d = LocaleDescriptor::parse("fr").unwrap();
        assert_eq!(d.locale, "fr");
        assert_eq!(d.region, "");
    }

    #[test]
    fn test_parse_skips_script_subtag() {
        let d = LocaleDescriptor::parse("zh-Hant-TW").unwrap();
        assert_eq!(d.language, "zh");
        assert_eq!(d.region, "TW");
    }

    #[test]
    fn test_malformed_input_falls_back_to_portuguese() {
        assert_eq!(LocaleDescriptor::resolve(["", "*", "12"], ""), LocaleDescriptor::default());
        let d = LocaleDescriptor::from_accept_language(None, "pt-BR");
        assert_eq!(d.locale, "pt-BR");
    }

    #[test]
    fn test_accept_language_quality_order() {
        let d = LocaleDescriptor::from_accept_language(Some("de;q=0.5, en-GB;q=0.9, *;q=0.1"), "pt-BR");
        assert_eq!(d.locale, "en-GB");
    }

    #[test]
    fn test_accept_language_ignores_zero_weight() {
        let d = LocaleDescriptor::from_accept_language(Some("es;q=0, it-IT"), "pt-BR");
        assert_eq!(d.language, "it");
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "nome", default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Set once translation has run; never part of the source document.
    #[serde(skip)]
    pub display_name: Option<String>,
    #[serde(rename = "link_afiliado", default, deserialize_with = "null_as_default")]
    pub affiliate_link: String,
    #[serde(rename = "icone", default, deserialize_with = "string_or_none")]
    pub icon: Option<String>,
    #[serde(rename = "novo", default, deserialize_with = "truthy")]
    pub is_new: bool,
}

impl Product {
    pub fn new(name: &str, affiliate_link: &str) -> Self {
        Self {
            name: name.to_string(),
            affiliate_link: affiliate_link.to_string(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.name,
        }
    }

    /// Products without a name or a link are never rendered nor listed.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.affiliate_link.trim().is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Only a string is an icon; any other value falls back to the placeholder.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Loose truthiness for the "new" flag: `1` and `"sim"` count, `0` and `""` do not.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

/// Month label -> products, exactly as the source document lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub months: BTreeMap<String, Vec<Product>>,
}

impl Catalog {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        // Entries that are not objects are tolerated and dropped as invalid products.
        // A null month is an empty month.
        let doc: BTreeMap<String, Option<Vec<serde_json::Value>>> = serde_json::from_str(raw)?;
        let months = doc
            .into_iter()
            .map(|(month, entries)| {
                let products = entries
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|v| serde_json::from_value::<Product>(v).ok())
                    .collect();
                (month, products)
            })
            .collect();
        Ok(Self { months })
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn month_labels(&self) -> Vec<&str> {
        self.months.keys().map(String::as_str).collect()
    }

    pub fn products(&self, month: &str) -> &[Product] {
        self.months.get(month).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn products_mut(&mut self) -> impl Iterator<Item = &mut Product> {
        self.months.values_mut().flat_map(|v| v.iter_mut())
    }
}

// App Configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_catalog_source")]
    pub catalog_source: String,
    #[serde(default = "default_translate_url")]
    pub translate_url: String,
    #[serde(default = "default_true")]
    pub translation_enabled: bool,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_placeholder_icon")]
    pub placeholder_icon: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            catalog_source: default_catalog_source(),
            translate_url: default_translate_url(),
            translation_enabled: true,
            source_language: default_source_language(),
            default_locale: default_locale(),
            cache_path: default_cache_path(),
            static_dir: default_static_dir(),
            placeholder_icon: default_placeholder_icon(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.catalog_source.trim().is_empty() {
            return Err("CATALOG_SOURCE must not be empty".to_string());
        }
        if !(self.translate_url.starts_with("http://") || self.translate_url.starts_with("https://")) {
            return Err(format!(
                "TRANSLATE_URL must be an http(s) URL, got '{}'",
                self.translate_url
            ));
        }
        if self.source_language.trim().is_empty() {
            return Err("SOURCE_LANGUAGE must not be empty".to_string());
        }
        Ok(())
    }

    pub fn source_language(&self) -> String {
        self.source_language.trim().to_lowercase()
    }
}

fn default_port() -> u16 { 3010 }
fn default_catalog_source() -> String { "produtos.json".to_string() }
fn default_translate_url() -> String { "https://api.mymemory.translated.net/get".to_string() }
fn default_true() -> bool { true }
fn default_source_language() -> String { "pt".to_string() }
fn default_locale() -> String { "pt-BR".to_string() }
fn default_cache_path() -> String { "translation-cache.json".to_string() }
fn default_static_dir() -> String { "static".to_string() }
fn default_placeholder_icon() -> String {
    "https://via.placeholder.com/72x72.png?text=%F0%9F%9B%8D%EF%B8%8F".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_optional_fields_keep_product() {
        let catalog = Catalog::from_json(
            r#"{"janeiro": [
                {"nome": "Fone", "link_afiliado": "http://f", "novo": 1, "icone": false},
                {"nome": "Mouse", "link_afiliado": "http://m", "novo": "sim"},
                {"nome": "Cabo", "link_afiliado": "http://c", "novo": 0, "icone": 42}
            ]}"#,
        )
        .unwrap();

        let products = catalog.products("janeiro");
        assert_eq!(products.len(), 3);
        assert!(products[0].is_new);
        assert_eq!(products[0].icon, None);
        assert!(products[1].is_new);
        assert!(!products[2].is_new);
        assert_eq!(products[2].icon, None);
        assert!(products.iter().all(Product::is_valid));
    }

    #[test]
    fn test_missing_name_or_link_is_invalid() {
        let catalog = Catalog::from_json(
            r#"{"maio": [{"nome": null, "link_afiliado": "http://x"}, {"nome": "A"}, "texto"]}"#,
        )
        .unwrap();
        let products = catalog.products("maio");
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn test_null_month_is_empty() {
        let catalog =
            Catalog::from_json(r#"{"janeiro": null, "fevereiro": [{"nome": "A", "link_afiliado": "http://a"}]}"#)
                .unwrap();
        assert_eq!(catalog.month_labels(), vec!["fevereiro", "janeiro"]);
        assert!(catalog.products("janeiro").is_empty());
    }

    #[test]
    fn test_non_array_month_is_malformed() {
        assert!(Catalog::from_json(r#"{"janeiro": "nada"}"#).is_err());
    }
}

//! Interface copy and its on-the-fly localization.
//!
//! Two registries live in `languages/pt.json`: `ui` holds the strings the
//! renderer reaches for by key (toggle labels, badges, empty states) and
//! `page` holds the static copy around the catalog (title, search form,
//! footer). Both are written in the source language and translated as whole
//! batches through [`TranslationService`].

use crate::translation::TranslationService;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::OnceCell;

const SOURCE_COPY: &str = include_str!("../languages/pt.json");

#[derive(Debug, Clone, Default, Deserialize)]
struct CopyFile {
    #[serde(default)]
    ui: BTreeMap<String, String>,
    #[serde(default)]
    page: BTreeMap<String, String>,
}

/// Source-language copy shared by every page load.
#[derive(Debug, Clone)]
pub struct I18n {
    ui: Arc<BTreeMap<String, String>>,
    page: Arc<BTreeMap<String, String>>,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl I18n {
    pub fn new() -> Self {
        let copy: CopyFile = serde_json::from_str(SOURCE_COPY).unwrap_or_else(|e| {
            tracing::error!("Embedded interface copy is invalid: {}", e);
            CopyFile::default()
        });
        Self::from_maps(copy.ui, copy.page)
    }

    pub fn from_maps(ui: BTreeMap<String, String>, page: BTreeMap<String, String>) -> Self {
        Self {
            ui: Arc::new(ui),
            page: Arc::new(page),
        }
    }

    pub fn ui_defaults(&self) -> UiStrings {
        UiStrings::new((*self.ui).clone())
    }

    pub fn static_page(&self) -> StaticPage {
        StaticPage::new((*self.page).clone())
    }
}

/// Interface strings by symbolic key.
#[derive(Debug, Clone, Default)]
pub struct UiStrings {
    defaults: BTreeMap<String, String>,
    localized: HashMap<String, String>,
}

impl UiStrings {
    pub fn new(defaults: BTreeMap<String, String>) -> Self {
        Self {
            defaults,
            localized: HashMap::new(),
        }
    }

    /// Localized text, else the source default, else the key itself.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.localized
            .get(key)
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }
}

/// Translates every default string in a single batch. When the target is the
/// source language the defaults come back untouched.
pub async fn localize_ui_strings(
    defaults: &UiStrings,
    service: &TranslationService,
    target_language: &str,
) -> UiStrings {
    if !service.needs_translation(target_language) {
        return defaults.clone();
    }

    let translated = service
        .translate_batch(defaults.defaults.values().map(String::as_str), target_language)
        .await;

    let localized = defaults
        .defaults
        .iter()
        .filter_map(|(key, text)| translated.get(text).map(|t| (key.clone(), t.clone())))
        .collect();

    UiStrings {
        defaults: defaults.defaults.clone(),
        localized,
    }
}

/// Static copy of one page load.
///
/// The originals are captured when the page is created and localization reads
/// only from that snapshot, so text produced by a previous pass is never fed
/// back into the translator. The localized copy is computed at most once.
#[derive(Debug)]
pub struct StaticPage {
    originals: BTreeMap<String, String>,
    localized: OnceCell<BTreeMap<String, String>>,
}

impl StaticPage {
    pub fn new(originals: BTreeMap<String, String>) -> Self {
        Self {
            originals,
            localized: OnceCell::new(),
        }
    }

    pub async fn localize(&self, service: &TranslationService, target_language: &str) -> &BTreeMap<String, String> {
        self.localized
            .get_or_init(|| async move {
                if !service.needs_translation(target_language) {
                    return self.originals.clone();
                }
                let translated = service
                    .translate_batch(self.originals.values().map(String::as_str), target_language)
                    .await;
                self.originals
                    .iter()
                    .map(|(key, text)| {
                        let value = translated.get(text).cloned().unwrap_or_else(|| text.clone());
                        (key.clone(), value)
                    })
                    .collect()
            })
            .await
    }

    pub fn originals(&self) -> &BTreeMap<String, String> {
        &self.originals
    }

    pub fn is_localized(&self) -> bool {
        self.localized.initialized()
    }

    /// Current text for `key`: localized when available, original otherwise.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.localized
            .get()
            .and_then(|m| m.get(key))
            .or_else(|| self.originals.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }
}

#[cfg(test)]
#[path = "i18n_tests.rs"]
mod i18n_tests;

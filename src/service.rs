use crate::api::{CatalogError, CatalogSource};
use crate::html::{to_html, Element};
use crate::i18n::{localize_ui_strings, I18n};
use crate::locale::LocaleDescriptor;
use crate::models::{AppConfig, Catalog};
use crate::render::{render_page, PageState, Renderer};
use crate::structured_data::build_listing;
use crate::translation::TranslationService;
use anyhow::Result;
use std::sync::Arc;

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;

/// Result of one page load.
pub struct PageView {
    pub document: Element,
    pub catalog_error: Option<CatalogError>,
}

impl PageView {
    pub fn to_html(&self) -> Result<String> {
        to_html(&self.document)
    }
}

pub struct ShowcaseService<S: CatalogSource + ?Sized> {
    pub source: Arc<S>,
    pub translations: Arc<TranslationService>,
    pub i18n: I18n,
    pub renderer: Renderer,
    pub config: AppConfig,
}

impl<S: CatalogSource + ?Sized> ShowcaseService<S> {
    pub fn new(source: Arc<S>, translations: Arc<TranslationService>, i18n: I18n, config: AppConfig) -> Self {
        let renderer = Renderer::new(&config.source_language(), &config.placeholder_icon);
        Self {
            source,
            translations,
            i18n,
            renderer,
            config,
        }
    }

    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let catalog = self.source.fetch().await?;
        tracing::debug!(
            "Loaded catalog with {} months and {} products",
            catalog.months.len(),
            catalog.months.values().map(Vec::len).sum::<usize>()
        );
        Ok(catalog)
    }

    /// Attaches a display name to every product. Names that cannot be
    /// translated keep their original text.
    pub async fn translate_catalog(&self, catalog: &mut Catalog, target_language: &str) {
        let names: Vec<String> = catalog
            .months
            .values()
            .flatten()
            .filter(|p| !p.name.is_empty())
            .map(|p| p.name.clone())
            .collect();

        let translated = self
            .translations
            .translate_batch(names.iter().map(String::as_str), target_language)
            .await;

        for product in catalog.products_mut() {
            let display = translated
                .get(&product.name)
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| product.name.clone());
            product.display_name = Some(display);
        }
    }

    /// Load, localize, translate, render, emit structured data.
    pub async fn render(&self, locale: &LocaleDescriptor, search_term: &str) -> PageView {
        let language = locale.language.as_str();
        let loaded = self.load_catalog().await;

        let page = self.i18n.static_page();
        let defaults = self.i18n.ui_defaults();
        let (ui, _) = tokio::join!(
            localize_ui_strings(&defaults, &self.translations, language),
            page.localize(&self.translations, language),
        );

        let (content, listing, catalog_error) = match loaded {
            Ok(mut catalog) => {
                self.translate_catalog(&mut catalog, language).await;
                let listing = build_listing(&catalog, locale, &self.renderer.source_language);
                let state = PageState {
                    catalog,
                    ui,
                    locale: locale.clone(),
                    search_term: search_term.to_string(),
                };
                (self.renderer.render(&state), listing, None)
            }
            Err(e) => {
                tracing::error!("Failed to load catalog from {}: {}", self.config.catalog_source, e);
                (self.renderer.render_error(&ui), None, Some(e))
            }
        };

        PageView {
            document: render_page(&page, locale, search_term, content, listing.as_ref()),
            catalog_error,
        }
    }
}

use super::*;
use crate::api::{TranslateError, Translator};
use crate::cache::TranslationCache;
use crate::store::MemoryStore;
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub Translator {}
    #[async_trait]
    impl Translator for Translator {
        async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
    }
}

fn service(translator: MockTranslator) -> TranslationService {
    TranslationService::new(
        Arc::new(translator),
        TranslationCache::new(Arc::new(MemoryStore::new())),
        "pt",
        true,
    )
}

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_embedded_copy_has_required_keys() {
    let i18n = I18n::new();
    let ui = i18n.ui_defaults();
    for key in ["show", "hide", "newBadge", "emptyMonth", "emptyCatalog", "noResults", "loadError", "iconAlt"] {
        assert_ne!(ui.get(key), key, "missing ui key {}", key);
    }
    let page = i18n.static_page();
    for key in ["title", "heading", "searchLabel", "searchPlaceholder", "footer"] {
        assert_ne!(page.text(key), key, "missing page key {}", key);
    }
}

#[test]
fn test_unknown_key_resolves_to_itself() {
    let ui = UiStrings::new(map(&[("show", "Mostrar")]));
    assert_eq!(ui.get("show"), "Mostrar");
    assert_eq!(ui.get("doesNotExist"), "doesNotExist");
}

#[tokio::test]
async fn test_ui_strings_unchanged_for_source_language() {
    let mut translator = MockTranslator::new();
    translator.expect_translate().times(0);
    let service = service(translator);

    let defaults = UiStrings::new(map(&[("show", "Mostrar"), ("hide", "Esconder")]));
    let out = localize_ui_strings(&defaults, &service, "pt").await;
    assert_eq!(out.get("hide"), "Esconder");
}

#[tokio::test]
async fn test_ui_strings_translated_in_one_batch() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .times(2)
        .returning(|text, _, _| match text {
            "Mostrar" => Ok("Show".to_string()),
            _ => Err(TranslateError::MissingText),
        });
    let service = service(translator);

    let defaults = UiStrings::new(map(&[("show", "Mostrar"), ("hide", "Esconder")]));
    let out = localize_ui_strings(&defaults, &service, "en").await;
    assert_eq!(out.get("show"), "Show");
    // Failed translation keeps the source text.
    assert_eq!(out.get("hide"), "Esconder");
}

#[tokio::test]
async fn test_static_page_localizes_once_from_snapshot() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .times(2)
        .returning(|text, _, _| Ok(format!("[{}]", text)));
    let service = service(translator);

    let page = StaticPage::new(map(&[("title", "Achadinhos"), ("footer", "Links de afiliado")]));
    assert!(!page.is_localized());
    assert_eq!(page.text("title"), "Achadinhos");

    page.localize(&service, "en").await;
    let again = page.localize(&service, "en").await;

    assert_eq!(again["title"], "[Achadinhos]");
    assert_eq!(page.text("footer"), "[Links de afiliado]");
    assert!(page.is_localized());
}

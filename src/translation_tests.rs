use super::*;
use crate::api::TranslateError;
use crate::cache::STORAGE_KEY;
use crate::store::{KeyValueStore, MemoryStore, StoreError};
use async_trait::async_trait;
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};

mock! {
    pub Translator {}
    #[async_trait]
    impl Translator for Translator {
        async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
    }
}

/// Counts writes so the single-write-per-batch rule can be observed.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }
}

fn service_with(translator: MockTranslator, store: Arc<dyn KeyValueStore>) -> TranslationService {
    TranslationService::new(Arc::new(translator), TranslationCache::new(store), "pt", true)
}

#[tokio::test]
async fn test_source_language_is_identity_without_calls() {
    let mut translator = MockTranslator::new();
    translator.expect_translate().times(0);
    let service = service_with(translator, Arc::new(MemoryStore::new()));

    let out = service.translate_batch(["Fone", "Mouse"], "pt").await;
    assert_eq!(out.get("Fone").map(String::as_str), Some("Fone"));
    assert_eq!(out.get("Mouse").map(String::as_str), Some("Mouse"));
}

#[tokio::test]
async fn test_disabled_service_is_identity() {
    let mut translator = MockTranslator::new();
    translator.expect_translate().times(0);
    let service = TranslationService::new(
        Arc::new(translator),
        TranslationCache::new(Arc::new(MemoryStore::new())),
        "pt",
        false,
    );

    let out = service.translate_batch(["Fone"], "en").await;
    assert_eq!(out["Fone"], "Fone");
}

#[tokio::test]
async fn test_duplicates_issue_one_call_per_distinct_text() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .withf(|text, source, target| text == "Fone" && source == "pt" && target == "en")
        .times(1)
        .returning(|_, _, _| Ok("Headphones".to_string()));
    translator
        .expect_translate()
        .withf(|text, _, _| text == "Mouse")
        .times(1)
        .returning(|_, _, _| Ok("Mouse".to_string()));
    let service = service_with(translator, Arc::new(MemoryStore::new()));

    let out = service.translate_batch(["Fone", "Mouse", "Fone", "Fone"], "en").await;
    assert_eq!(out.len(), 2);
    assert_eq!(out["Fone"], "Headphones");
}

#[tokio::test]
async fn test_second_batch_is_served_from_cache() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .times(2)
        .returning(|text, _, _| Ok(format!("{} (en)", text)));
    let store = Arc::new(CountingStore::default());
    let service = service_with(translator, store.clone());

    let first = service.translate_batch(["Fone", "Mouse"], "en").await;
    let second = service.translate_batch(["Mouse", "Fone"], "en").await;

    assert_eq!(first, second);
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_is_local_to_one_text() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .withf(|text, _, _| text == "Fone")
        .returning(|_, _, _| Err(TranslateError::Status(500)));
    translator
        .expect_translate()
        .withf(|text, _, _| text == "Mouse")
        .returning(|_, _, _| Ok("Maus".to_string()));
    let store = Arc::new(MemoryStore::new());
    let service = service_with(translator, store.clone());

    let out = service.translate_batch(["Fone", "Mouse"], "de").await;
    assert_eq!(out["Fone"], "Fone");
    assert_eq!(out["Mouse"], "Maus");

    // Only the successful translation is persisted.
    let persisted: HashMap<String, String> =
        serde_json::from_str(&store.get(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted["de::Mouse"], "Maus");
}

#[tokio::test]
async fn test_persisted_cache_avoids_remote_calls() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(STORAGE_KEY, r#"{"en::Fone":"Headphones","en::Mouse":"Mouse"}"#)
        .unwrap();
    let mut translator = MockTranslator::new();
    translator.expect_translate().times(0);
    let service = service_with(translator, store);

    let out = service.translate_batch(["Fone", "Mouse"], "en").await;
    assert_eq!(out["Fone"], "Headphones");
}

#[tokio::test]
async fn test_all_cached_batch_does_not_write() {
    let store = Arc::new(CountingStore::default());
    store.inner.set(STORAGE_KEY, r#"{"en::Fone":"Headphones"}"#).unwrap();
    let mut translator = MockTranslator::new();
    translator.expect_translate().times(0);
    let service = service_with(translator, store.clone());

    service.translate_batch(["Fone"], "en").await;
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_texts_are_retried_next_batch() {
    let mut translator = MockTranslator::new();
    let mut seq = mockall::Sequence::new();
    translator
        .expect_translate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Err(TranslateError::MissingText));
    translator
        .expect_translate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok("Headphones".to_string()));
    let service = service_with(translator, Arc::new(MemoryStore::new()));

    assert_eq!(service.translate_batch(["Fone"], "en").await["Fone"], "Fone");
    assert_eq!(service.translate_batch(["Fone"], "en").await["Fone"], "Headphones");
}

#[tokio::test]
async fn test_in_flight_requests_are_cleared_after_batch() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .returning(|text, _, _| Ok(text.to_uppercase()));
    let service = service_with(translator, Arc::new(MemoryStore::new()));

    service.translate_batch(["a", "b", "c"], "en").await;
    assert_eq!(service.in_flight.pending(), 0);
}

/// Records how many requests were still in flight whenever the cache is saved.
#[derive(Default)]
struct InFlightAtSaveStore {
    inner: MemoryStore,
    service: std::sync::OnceLock<std::sync::Weak<TranslationService>>,
    in_flight_at_save: std::sync::Mutex<Vec<usize>>,
}

impl KeyValueStore for InFlightAtSaveStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(service) = self.service.get().and_then(|w| w.upgrade()) {
            self.in_flight_at_save.lock().unwrap().push(service.in_flight.pending());
        }
        self.inner.set(key, value)
    }
}

#[tokio::test]
async fn test_translations_are_cached_before_in_flight_is_cleared() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .times(2)
        .returning(|text, _, _| Ok(format!("{} (en)", text)));
    let store = Arc::new(InFlightAtSaveStore::default());
    let service = Arc::new(service_with(translator, store.clone()));
    store.service.set(Arc::downgrade(&service)).unwrap();

    service.translate_batch(["Fone", "Mouse"], "en").await;

    assert_eq!(*store.in_flight_at_save.lock().unwrap(), vec![2]);
    assert_eq!(service.in_flight.pending(), 0);
}

use crate::api::Translator;
use crate::cache::{cache_key, TranslationCache};
use crate::coalesce::Coalescer;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

/// Best-effort batch translation backed by the persistent cache.
///
/// A text whose remote translation fails maps to itself and is left out of
/// the cache so a later batch can retry it.
pub struct TranslationService {
    translator: Arc<dyn Translator>,
    cache: TranslationCache,
    source_language: String,
    enabled: bool,
    session: RwLock<Option<HashMap<String, String>>>,
    in_flight: Coalescer<String, Option<String>>,
}

impl TranslationService {
    pub fn new(
        translator: Arc<dyn Translator>,
        cache: TranslationCache,
        source_language: &str,
        enabled: bool,
    ) -> Self {
        Self {
            translator,
            cache,
            source_language: source_language.to_lowercase(),
            enabled,
            session: RwLock::new(None),
            in_flight: Coalescer::new(),
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn needs_translation(&self, target_language: &str) -> bool {
        self.enabled && !target_language.eq_ignore_ascii_case(&self.source_language)
    }

    /// The persisted cache is read once per process; later batches reuse the
    /// session copy.
    fn cached_entries(&self) -> HashMap<String, String> {
        if let Ok(session) = self.session.read() {
            if let Some(entries) = session.as_ref() {
                return entries.clone();
            }
        }
        let loaded = self.cache.load();
        tracing::debug!("Loaded {} cached translations", loaded.len());
        if let Ok(mut session) = self.session.write() {
            session.get_or_insert_with(|| loaded.clone());
        }
        loaded
    }

    fn commit(&self, resolved: HashMap<String, String>) {
        let snapshot = match self.session.write() {
            Ok(mut session) => {
                let entries = session.get_or_insert_with(HashMap::new);
                entries.extend(resolved);
                entries.clone()
            }
            Err(_) => return,
        };
        self.cache.save(&snapshot);
    }

    pub async fn translate_batch<'a, I>(&self, texts: I, target_language: &str) -> HashMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = texts.into_iter().collect();

        if !self.needs_translation(target_language) {
            return distinct.into_iter().map(|t| (t.to_string(), t.to_string())).collect();
        }

        let target = target_language.to_lowercase();
        let cached = self.cached_entries();
        let mut result = HashMap::with_capacity(distinct.len());
        let mut pending = Vec::new();

        for text in distinct {
            if text.trim().is_empty() {
                result.insert(text.to_string(), text.to_string());
                continue;
            }
            let key = cache_key(&target, text);
            if let Some(hit) = cached.get(&key) {
                result.insert(text.to_string(), hit.clone());
                continue;
            }

            let translator = self.translator.clone();
            let source = self.source_language.clone();
            let owned_text = text.to_string();
            let owned_target = target.clone();
            let (future, started) = self.in_flight.join(key.clone(), move || async move {
                match translator.translate(&owned_text, &source, &owned_target).await {
                    Ok(translated) => Some(translated),
                    Err(e) => {
                        tracing::warn!("Keeping original text for '{}': {}", owned_text, e);
                        None
                    }
                }
            });
            pending.push((text, key, future, started));
        }

        if pending.is_empty() {
            return result;
        }

        tracing::debug!(
            "Translating {} texts to '{}' ({} served from cache)",
            pending.len(),
            target,
            result.len()
        );

        // Every request is dispatched above before anything is awaited.
        let outcomes =
            futures_util::future::join_all(pending.iter().map(|(_, _, future, _)| future.clone())).await;

        let mut resolved = HashMap::new();
        for ((text, key, _, _), outcome) in pending.iter().zip(outcomes) {
            match outcome {
                Some(translated) => {
                    result.insert(text.to_string(), translated.clone());
                    resolved.insert(key.clone(), translated);
                }
                None => {
                    result.insert(text.to_string(), text.to_string());
                }
            }
        }

        // Commit before forgetting: a concurrent batch must find either the
        // cached entry or the in-flight future.
        if !resolved.is_empty() {
            self.commit(resolved);
        }
        self.in_flight
            .forget(pending.iter().filter(|(.., started)| *started).map(|(_, key, ..)| key));
        result
    }
}

#[cfg(test)]
#[path = "translation_tests.rs"]
mod translation_tests;

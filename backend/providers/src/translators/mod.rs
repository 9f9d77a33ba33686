//! Translation adapters.
//!
//! Callers treat every error as "keep the original text", so adapters report
//! failures honestly instead of echoing their input.

pub mod libretranslate;
pub mod llm;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;
use vani_core::{Language, Translator};

/// Returns text unchanged. Used when translation is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn name(&self) -> &str {
        "none"
    }

    async fn translate(&self, text: &str, _target: Language) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Memoizes successful translations.
///
/// Canned fallbacks are translated over and over; this keeps them off the
/// network after the first hit.
pub struct CachedTranslator<T> {
    inner: T,
    cache: Cache<(Language, String), String>,
}

impl<T: Translator> CachedTranslator<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(1024)
                .time_to_idle(Duration::from_secs(600))
                .build(),
        }
    }
}

#[async_trait]
impl<T: Translator> Translator for CachedTranslator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let key = (target, text.to_string());
        if let Some(hit) = self.cache.get(&key) {
            debug!(target_lang = %target, "translation cache hit");
            return Ok(hit);
        }
        let translated = self.inner.translate(text, target).await?;
        self.cache.insert(key, translated.clone());
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTranslator {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Translator for CountingTranslator {
        fn name(&self) -> &str {
            "counting"
        }

        async fn translate(&self, text: &str, target: Language) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("offline");
            }
            Ok(format!("[{target}] {text}"))
        }
    }

    #[tokio::test]
    async fn passthrough_is_identity() {
        let out = PassthroughTranslator.translate("hello", Language::Hi).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn cache_serves_repeat_requests() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedTranslator::new(CountingTranslator { calls: calls.clone(), fail: false });

        let first = cached.translate("Which formula?", Language::Hi).await.unwrap();
        let second = cached.translate("Which formula?", Language::Hi).await.unwrap();
        cached.translate("Which formula?", Language::Ta).await.unwrap();

        assert_eq!(first, "[hi] Which formula?");
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedTranslator::new(CountingTranslator { calls: calls.clone(), fail: true });

        assert!(cached.translate("x", Language::Kn).await.is_err());
        assert!(cached.translate("x", Language::Kn).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

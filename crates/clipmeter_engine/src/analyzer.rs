use std::sync::Arc;

use clipmeter_core::{
    char_count, signature, word_count, AnalysisResult, CacheError, LruCache, Outcome,
    PipelineError, TextSnapshot,
};
use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::sync::mpsc;

use crate::control::SignatureLimit;
use crate::TokenCounter;

/// Turns snapshots into metrics, memoizing the outcome per distinct text.
///
/// Failed counts are memoized too: the same text keeps producing the same
/// error until it is evicted.
pub struct Analyzer {
    cache: LruCache<String, Outcome<AnalysisResult>>,
    counter: Arc<dyn TokenCounter>,
    signature_limit: SignatureLimit,
}

impl Analyzer {
    pub fn new(
        cache_capacity: usize,
        counter: Arc<dyn TokenCounter>,
        signature_limit: SignatureLimit,
    ) -> Result<Self, CacheError> {
        Ok(Self {
            cache: LruCache::new(cache_capacity)?,
            counter,
            signature_limit,
        })
    }

    pub fn analyze(&mut self, item: Outcome<TextSnapshot>) -> Outcome<AnalysisResult> {
        let snapshot = item?;

        if let Some(cached) = self.cache.get(snapshot.as_str()) {
            engine_debug!("cache hit bytes={}", snapshot.as_str().len());
            return cached.clone();
        }

        let outcome = self.compute(snapshot.as_str());
        if let Some((evicted, _)) = self.cache.put(snapshot.into_string(), outcome.clone()) {
            engine_debug!("cache evicted entry bytes={}", evicted.len());
        }
        outcome
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, text: &str) -> Outcome<AnalysisResult> {
        engine_debug!("cache miss bytes={}", text.len());
        let token_count = self.counter.count(text).map_err(|err| {
            engine_warn!("token count failed: {}", err);
            PipelineError::from(err)
        })?;

        Ok(AnalysisResult {
            token_count,
            word_count: word_count(text),
            char_count: char_count(text),
            signature: signature(text, self.signature_limit.get()),
            source_text: text.to_string(),
        })
    }

    /// Drains `input` until it closes or nobody listens on `output`.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<Outcome<TextSnapshot>>,
        output: mpsc::Sender<Outcome<AnalysisResult>>,
    ) {
        loop {
            let item = tokio::select! {
                item = input.recv() => item,
                _ = output.closed() => None,
            };
            let Some(item) = item else {
                break;
            };
            let result = self.analyze(item);
            if output.send(result).await.is_err() {
                break;
            }
        }
        engine_info!("analyzer stopped with {} cached entries", self.cache.len());
    }
}

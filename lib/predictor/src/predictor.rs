//! Category Predictor
//!
//! Runs one description through correction, cleaning, encoding and
//! matching. The catalog and its embeddings are computed once at build time
//! and only read afterwards, so a single predictor can be shared by any
//! number of concurrent requests without locking.

use crate::config::{PredictorConfig, DEFAULT_ENCODE_TIMEOUT, DEFAULT_MAX_CONCURRENT_ENCODES};
use catmatch_core::{
    best_match, Catalog, CorrectionTable, Error, PredictionResult, Result, TextNormalizer, Vector,
};
use catmatch_embedding::{create_provider, EmbeddingProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Query used by [`CategoryPredictor::self_test`]
pub const SELF_TEST_QUERY: &str = "test motor";

pub struct CategoryPredictor {
    catalog: Catalog,
    normalizer: TextNormalizer,
    provider: Arc<dyn EmbeddingProvider>,
    catalog_embeddings: Vec<Vector>,
    encode_timeout: Duration,
    encode_permits: Arc<Semaphore>,
}

impl CategoryPredictor {
    /// Load the catalog, initialise the configured model and embed every
    /// category. Blocking; may download model files on first run.
    pub fn from_config(config: &PredictorConfig) -> Result<Self> {
        let catalog = Catalog::from_path(&config.catalog_path)?;
        let provider = create_provider(&config.embedding)?;

        PredictorBuilder::new(catalog, provider)
            .encode_timeout(config.encode_timeout())
            .max_concurrent_encodes(config.max_concurrent_encodes)
            .build()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn model_name(&self) -> &str {
        self.provider.name()
    }

    pub fn embedding_dim(&self) -> usize {
        self.provider.dimensions()
    }

    /// Predict the category for one description.
    ///
    /// Only a blank description is an error (`Validation`). Any failure after
    /// that degrades to [`PredictionResult::unknown`].
    pub async fn predict_single(&self, description: &str) -> Result<PredictionResult> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::Validation(
                "Please provide a product description".to_string(),
            ));
        }

        match self.try_predict(description).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(query = description, error = %e, "prediction failed, reporting unknown category");
                Ok(PredictionResult::unknown(description))
            }
        }
    }

    /// Predict every non-blank description independently, in input order.
    ///
    /// Blank entries are dropped. An empty list, or one with nothing but
    /// blank entries, is a `Validation` error.
    pub async fn predict_batch<S: AsRef<str>>(
        &self,
        descriptions: &[S],
    ) -> Result<Vec<PredictionResult>> {
        if descriptions.is_empty() {
            return Err(Error::Validation(
                "Please provide product descriptions".to_string(),
            ));
        }

        let valid: Vec<&str> = descriptions
            .iter()
            .map(|d| d.as_ref().trim())
            .filter(|d| !d.is_empty())
            .collect();
        if valid.is_empty() {
            return Err(Error::Validation(
                "Please provide valid product descriptions".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(valid.len());
        for description in valid {
            results.push(self.predict_single(description).await?);
        }
        Ok(results)
    }

    /// Run a fixed sample prediction; `true` when it matched a real category.
    pub async fn self_test(&self) -> bool {
        match self.predict_single(SELF_TEST_QUERY).await {
            Ok(result) => !result.is_unknown(),
            Err(_) => false,
        }
    }

    async fn try_predict(&self, description: &str) -> Result<PredictionResult> {
        let suggestions = self.normalizer.suggestions_for(description);
        let used_query = self.normalizer.correct_spelling(description);
        let processed = self.normalizer.clean(&used_query);

        let vector = self.encode(processed).await?;

        let best = best_match(&vector, &self.catalog_embeddings).map_err(|e| match e {
            Error::Prediction(_) => e,
            other => Error::Prediction(other.to_string()),
        })?;
        let entry = self.catalog.get(best.index).ok_or_else(|| {
            Error::Prediction(format!("match index {} outside catalog", best.index))
        })?;

        debug!(
            query = description,
            used_query = %used_query,
            category = %entry.name,
            score = best.score,
            "category matched"
        );

        Ok(PredictionResult::matched(
            description,
            used_query,
            entry,
            best.score,
            suggestions,
        ))
    }

    /// Encode on the blocking pool, bounded by the configured timeout.
    ///
    /// A timed-out model call cannot be cancelled and keeps running on the
    /// blocking pool. It holds its permit until it returns, so a hung model
    /// occupies at most `max_concurrent_encodes` threads; later requests
    /// wait for a permit inside the same timeout instead of spawning more.
    async fn encode(&self, text: String) -> Result<Vector> {
        let permits = Arc::clone(&self.encode_permits);
        let provider = Arc::clone(&self.provider);
        let work = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|e| Error::Prediction(format!("encoder closed: {}", e)))?;
            let vector = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                provider.embed(&text)
            })
            .await
            .map_err(|e| Error::Prediction(format!("embedding task failed: {}", e)))??;
            Ok::<_, Error>(vector)
        };

        match tokio::time::timeout(self.encode_timeout, work).await {
            Ok(Ok(vector)) => Ok(vector),
            Ok(Err(Error::Prediction(msg))) => Err(Error::Prediction(msg)),
            Ok(Err(e)) => Err(Error::Prediction(e.to_string())),
            Err(_) => Err(Error::Prediction(format!(
                "embedding timed out after {} ms",
                self.encode_timeout.as_millis()
            ))),
        }
    }
}

/// Builder for [`CategoryPredictor`] with custom corrections or timeout
pub struct PredictorBuilder {
    catalog: Catalog,
    provider: Arc<dyn EmbeddingProvider>,
    corrections: CorrectionTable,
    encode_timeout: Duration,
    max_concurrent_encodes: usize,
}

impl PredictorBuilder {
    pub fn new(catalog: Catalog, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            catalog,
            provider,
            corrections: CorrectionTable::builtin(),
            encode_timeout: DEFAULT_ENCODE_TIMEOUT,
            max_concurrent_encodes: DEFAULT_MAX_CONCURRENT_ENCODES,
        }
    }

    pub fn corrections(mut self, corrections: CorrectionTable) -> Self {
        self.corrections = corrections;
        self
    }

    pub fn encode_timeout(mut self, timeout: Duration) -> Self {
        self.encode_timeout = timeout;
        self
    }

    pub fn max_concurrent_encodes(mut self, limit: usize) -> Self {
        self.max_concurrent_encodes = limit;
        self
    }

    /// Embed every category name once. Blocking.
    pub fn build(self) -> Result<CategoryPredictor> {
        if self.encode_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "encode timeout must be positive".to_string(),
            ));
        }
        if self.max_concurrent_encodes == 0 {
            return Err(Error::InvalidConfig(
                "max concurrent encodes must be positive".to_string(),
            ));
        }

        let normalizer = TextNormalizer::new(self.corrections);
        let names: Vec<String> = self.catalog.names().map(|n| normalizer.clean(n)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let catalog_embeddings = self
            .provider
            .embed_batch(&name_refs)
            .map_err(|e| Error::ModelLoad(format!("cannot embed catalog: {}", e)))?;

        if catalog_embeddings.len() != self.catalog.len() {
            return Err(Error::ModelLoad(format!(
                "expected {} catalog embeddings, got {}",
                self.catalog.len(),
                catalog_embeddings.len()
            )));
        }
        let dim = self.provider.dimensions();
        if let Some(bad) = catalog_embeddings.iter().find(|v| v.dim() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim(),
            });
        }

        info!(
            categories = self.catalog.len(),
            model = self.provider.name(),
            dim,
            "catalog embeddings ready"
        );

        Ok(CategoryPredictor {
            catalog: self.catalog,
            normalizer,
            provider: self.provider,
            catalog_embeddings,
            encode_timeout: self.encode_timeout,
            encode_permits: Arc::new(Semaphore::new(self.max_concurrent_encodes)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catmatch_core::{CategoryEntry, CategoryId, UNKNOWN_CATEGORY};
    use catmatch_embedding::HashingProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            CategoryEntry::new(1i64, "Water Pump"),
            CategoryEntry::new(2i64, "Washing Machine"),
            CategoryEntry::new(3i64, "Electric Motor"),
        ])
        .unwrap()
    }

    fn predictor() -> CategoryPredictor {
        PredictorBuilder::new(catalog(), Arc::new(HashingProvider::default()))
            .build()
            .unwrap()
    }

    /// Hashing provider that counts calls after construction and can be
    /// told to fail, stall or return zeros.
    struct ScriptedProvider {
        inner: HashingProvider,
        calls: AtomicUsize,
        mode: Mode,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Normal,
        Fail,
        Stall,
        Zero,
    }

    impl ScriptedProvider {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                inner: HashingProvider::default(),
                calls: AtomicUsize::new(0),
                mode,
            })
        }
    }

    impl EmbeddingProvider for ScriptedProvider {
        fn embed(&self, text: &str) -> Result<Vector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Normal => self.inner.embed(text),
                Mode::Fail => Err(Error::Prediction("backend unavailable".to_string())),
                Mode::Stall => {
                    std::thread::sleep(Duration::from_millis(300));
                    self.inner.embed(text)
                }
                Mode::Zero => Ok(Vector::new(vec![0.0; self.inner.dimensions()])),
            }
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
            texts.iter().map(|t| self.inner.embed(t)).collect()
        }

        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn scripted(mode: Mode) -> (CategoryPredictor, Arc<ScriptedProvider>) {
        scripted_with_permits(mode, DEFAULT_MAX_CONCURRENT_ENCODES)
    }

    fn scripted_with_permits(
        mode: Mode,
        permits: usize,
    ) -> (CategoryPredictor, Arc<ScriptedProvider>) {
        let provider = ScriptedProvider::new(mode);
        let predictor = PredictorBuilder::new(catalog(), provider.clone())
            .encode_timeout(Duration::from_millis(50))
            .max_concurrent_encodes(permits)
            .build()
            .unwrap();
        (predictor, provider)
    }

    #[tokio::test]
    async fn test_corrected_query_matches() {
        let predictor = predictor();
        let result = predictor.predict_single("wasing machn").await.unwrap();

        assert_eq!(result.original_query, "wasing machn");
        assert_eq!(result.used_query, "washing machine");
        assert_eq!(result.predicted_category_id, Some(CategoryId::Integer(2)));
        assert_eq!(result.predicted_category_name, "Washing Machine");
        assert!(result.confidence_score > 0.99);
        assert_eq!(
            result.spelling_suggestions,
            vec![
                "'wasing' might be 'washing'".to_string(),
                "'machn' might be 'machine'".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_used_query_is_always_corrected_form() {
        let predictor = predictor();
        let result = predictor.predict_single("Electric MOTOR").await.unwrap();
        assert_eq!(result.original_query, "Electric MOTOR");
        assert_eq!(result.used_query, "electric motor");
        assert!(result.spelling_suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_rejected_before_pipeline() {
        let (predictor, provider) = scripted(Mode::Normal);
        for input in ["", "   ", "\t\n"] {
            let err = predictor.predict_single(input).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_unknown() {
        let (predictor, _) = scripted(Mode::Fail);
        let result = predictor.predict_single("motr pmp").await.unwrap();

        assert!(result.is_unknown());
        assert_eq!(result.predicted_category_name, UNKNOWN_CATEGORY);
        assert_eq!(result.used_query, "motr pmp");
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.spelling_suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_unknown() {
        let (predictor, _) = scripted(Mode::Stall);
        let result = predictor.predict_single("water pump").await.unwrap();
        assert!(result.is_unknown());
        assert_eq!(result.confidence_score, 0.0);
    }

    #[tokio::test]
    async fn test_stalled_encodes_bounded_by_permits() {
        let (predictor, provider) = scripted_with_permits(Mode::Stall, 1);

        // first call times out but its model call keeps the only permit
        assert!(predictor.predict_single("water pump").await.unwrap().is_unknown());
        assert!(predictor.predict_single("electric motor").await.unwrap().is_unknown());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // permit comes back once the stalled call returns
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(predictor.predict_single("water pump").await.unwrap().is_unknown());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_predictor_concurrent_calls() {
        let predictor = Arc::new(predictor());
        let inputs = ["wasing machn", "water pmp", "electric motr", "motr", "pump"];

        let mut expected = Vec::new();
        for input in inputs {
            expected.push(predictor.predict_single(input).await.unwrap());
        }

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            for (i, &input) in inputs.iter().enumerate() {
                let predictor = Arc::clone(&predictor);
                tasks.spawn(async move { (i, predictor.predict_single(input).await.unwrap()) });
            }
        }

        let mut seen = 0;
        while let Some(joined) = tasks.join_next().await {
            let (i, result) = joined.unwrap();
            assert_eq!(result, expected[i]);
            seen += 1;
        }
        assert_eq!(seen, inputs.len() * 8);
    }

    #[tokio::test]
    async fn test_zero_embedding_scores_zero() {
        let (predictor, _) = scripted(Mode::Zero);
        let result = predictor.predict_single("water pump").await.unwrap();
        assert_eq!(result.predicted_category_id, Some(CategoryId::Integer(1)));
        assert_eq!(result.confidence_score, 0.0);
    }

    #[tokio::test]
    async fn test_batch_equals_singles() {
        let predictor = predictor();
        let inputs = ["wasing machn", "water pmp", "electric motr"];
        let batch = predictor.predict_batch(&inputs).await.unwrap();

        assert_eq!(batch.len(), 3);
        for (input, result) in inputs.iter().zip(&batch) {
            assert_eq!(result, &predictor.predict_single(input).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_batch_drops_blank_entries() {
        let predictor = predictor();
        let batch = predictor.predict_batch(&["", "  motr oil "]).await.unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].original_query, "motr oil");
        assert_eq!(batch[0].used_query, "motor oil");
        assert!(!batch[0].is_unknown());
    }

    #[tokio::test]
    async fn test_batch_validation() {
        let predictor = predictor();
        let empty: [&str; 0] = [];
        let err = predictor.predict_batch(&empty).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Please provide product descriptions");

        let err = predictor.predict_batch(&["", " "]).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Please provide valid product descriptions");
    }

    #[tokio::test]
    async fn test_batch_continues_after_failures() {
        let (predictor, provider) = scripted(Mode::Fail);
        let batch = predictor.predict_batch(&["a", "b", "c"]).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|r| r.is_unknown()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_self_test() {
        assert!(predictor().self_test().await);

        let (failing, _) = scripted(Mode::Fail);
        assert!(!failing.self_test().await);
    }

    #[test]
    fn test_zero_encode_limit_rejected() {
        let result = PredictorBuilder::new(catalog(), Arc::new(HashingProvider::default()))
            .max_concurrent_encodes(0)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = PredictorBuilder::new(catalog(), Arc::new(HashingProvider::default()))
            .encode_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_config() {
        use catmatch_embedding::{EmbeddingConfig, ProviderKind};
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "category_id,name\n1,Blower\n1,Blower\n2,Geyser").unwrap();
        file.flush().unwrap();

        let config = PredictorConfig {
            catalog_path: file.path().to_path_buf(),
            embedding: EmbeddingConfig {
                provider: ProviderKind::Hashing,
                ..Default::default()
            },
            ..Default::default()
        };
        let predictor = CategoryPredictor::from_config(&config).unwrap();
        assert_eq!(predictor.catalog().len(), 2);
        assert_eq!(predictor.model_name(), "feature-hashing");
    }
}

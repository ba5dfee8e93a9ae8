//! The classification seam and the provided ranking classifier.
//!
//! The inference engine itself is opaque to this crate: anything that can
//! produce raw per-class scores for a fixed-length waveform plugs in behind
//! [`ScoreModel`]. [`RankedClassifier`] wraps such a model with the shared
//! post-processing - logistic confidences, descending rank, top-K, label
//! resolution - and with lazy, memoized loading of the model and its label
//! catalog.

mod labels;

pub use labels::LabelCatalog;

use std::path::PathBuf;

/// Default number of ranked predictions kept per classification.
pub const DEFAULT_TOP_K: usize = 3;

use crate::error::AnalyzerError;
use crate::scene::{Prediction, SceneResult};

/// A classification collaborator: fixed-length waveform in, ranked labels
/// out.
///
/// Implementations own their model lifecycle. `classify` is expected to
/// self-load on first use (via [`ensure_loaded`](Self::ensure_loaded)), so
/// construction stays cheap.
pub trait SceneClassifier: Send {
    /// Loads the model and any label data. Idempotent; safe to call from
    /// the first classification request.
    fn ensure_loaded(&mut self) -> Result<(), AnalyzerError>;

    /// Classifies one window of normalized samples, returning ranked
    /// predictions (highest confidence first, at most top-K).
    fn classify(&mut self, window: &[f32]) -> Result<SceneResult, AnalyzerError>;

    /// Releases model resources. A later `ensure_loaded` may reload.
    fn unload(&mut self) {}
}

/// The raw forward pass behind [`RankedClassifier`].
///
/// Returns one unnormalized score per class; order defines the class index
/// used for label lookup.
pub trait ScoreModel: Send {
    /// Loads model resources. Called once by the owning classifier.
    fn load(&mut self) -> Result<(), AnalyzerError>;

    /// Runs the forward pass over a fixed-length waveform.
    fn forward(&mut self, waveform: &[f32]) -> Result<Vec<f32>, AnalyzerError>;
}

/// Wraps a [`ScoreModel`] with ranking and label resolution.
///
/// Construction is cheap; the model and the label catalog load on the first
/// call to [`ensure_loaded`](SceneClassifier::ensure_loaded) (or implicitly
/// on the first `classify`). Scores map to confidences through a logistic
/// transform, rank descending, and truncate to `top_k`; a class index
/// beyond the catalog falls back to a synthetic `class#<index>` label.
pub struct RankedClassifier<M: ScoreModel> {
    model: M,
    label_candidates: Vec<PathBuf>,
    labels: Option<LabelCatalog>,
    loaded: bool,
    top_k: usize,
}

impl<M: ScoreModel> RankedClassifier<M> {
    /// Creates a classifier over `model`, resolving labels from the first
    /// readable catalog among `label_candidates` and keeping `top_k` ranked
    /// predictions (conventionally [`DEFAULT_TOP_K`]).
    pub fn new<P>(model: M, label_candidates: impl IntoIterator<Item = P>, top_k: usize) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            model,
            label_candidates: label_candidates.into_iter().map(Into::into).collect(),
            labels: None,
            loaded: false,
            top_k,
        }
    }

    fn rank(&self, scores: &[f32]) -> SceneResult {
        if scores.is_empty() {
            return SceneResult::default();
        }
        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .map(|&score| sigmoid(score))
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.top_k);

        let predictions = ranked
            .into_iter()
            .map(|(index, confidence)| Prediction {
                label: self
                    .labels
                    .as_ref()
                    .map_or_else(|| LabelCatalog::fallback(index), |c| c.label_or_fallback(index)),
                confidence,
            })
            .collect();
        SceneResult::new(predictions)
    }
}

impl<M: ScoreModel> SceneClassifier for RankedClassifier<M> {
    fn ensure_loaded(&mut self) -> Result<(), AnalyzerError> {
        if self.loaded {
            return Ok(());
        }
        self.model.load()?;
        self.labels = Some(LabelCatalog::load(&self.label_candidates)?);
        self.loaded = true;
        tracing::info!(
            labels = self.labels.as_ref().map_or(0, LabelCatalog::len),
            "classifier loaded"
        );
        Ok(())
    }

    fn classify(&mut self, window: &[f32]) -> Result<SceneResult, AnalyzerError> {
        self.ensure_loaded()?;
        let scores = self.model.forward(window)?;
        Ok(self.rank(&scores))
    }

    fn unload(&mut self) {
        self.labels = None;
        self.loaded = false;
    }
}

/// Numerically stable logistic transform.
fn sigmoid(value: f32) -> f32 {
    if value >= 0.0 {
        1.0 / (1.0 + (-value).exp())
    } else {
        let e = value.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedScores {
        scores: Vec<f32>,
        loads: Arc<AtomicUsize>,
    }

    impl ScoreModel for FixedScores {
        fn load(&mut self) -> Result<(), AnalyzerError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn forward(&mut self, _waveform: &[f32]) -> Result<Vec<f32>, AnalyzerError> {
            Ok(self.scores.clone())
        }
    }

    fn catalog_file(lines: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{lines}").unwrap();
        file
    }

    fn classifier_with(
        scores: Vec<f32>,
        catalog: &tempfile::NamedTempFile,
    ) -> (RankedClassifier<FixedScores>, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let model = FixedScores {
            scores,
            loads: loads.clone(),
        };
        let classifier = RankedClassifier::new(model, [catalog.path().to_path_buf()], 3);
        (classifier, loads)
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(100.0) <= 1.0 && sigmoid(100.0) > 0.999);
        assert!(sigmoid(-100.0) >= 0.0 && sigmoid(-100.0) < 0.001);
        // Extreme positive input must not overflow to NaN.
        assert!(sigmoid(1000.0).is_finite());
    }

    #[test]
    fn test_ranked_descending_top_k() {
        let catalog = catalog_file(
            "index,mid,display_name\n0,/m/0,Speech\n1,/m/1,Music\n2,/m/2,Rain\n3,/m/3,Wind\n",
        );
        let (mut classifier, _) = classifier_with(vec![0.1, 2.0, -3.0, 1.0], &catalog);

        let result = classifier.classify(&[0.0; 16]).unwrap();
        assert_eq!(result.len(), 3);
        let labels: Vec<&str> = result
            .predictions()
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Music", "Wind", "Speech"]);
        let confidences: Vec<f32> = result.predictions().iter().map(|p| p.confidence).collect();
        assert!(confidences.windows(2).all(|w| w[0] >= w[1]));
        assert!(confidences.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn test_out_of_range_index_gets_synthetic_label() {
        let catalog = catalog_file("index,mid,display_name\n0,/m/0,Speech\n");
        let (mut classifier, _) = classifier_with(vec![0.0, 5.0], &catalog);

        let result = classifier.classify(&[0.0; 16]).unwrap();
        assert_eq!(result.top().unwrap().label, "class#1");
    }

    #[test]
    fn test_empty_scores_empty_result() {
        let catalog = catalog_file("index,mid,display_name\n0,/m/0,Speech\n");
        let (mut classifier, _) = classifier_with(Vec::new(), &catalog);

        let result = classifier.classify(&[0.0; 16]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_ensure_loaded_is_memoized() {
        let catalog = catalog_file("index,mid,display_name\n0,/m/0,Speech\n");
        let (mut classifier, loads) = classifier_with(vec![1.0], &catalog);

        classifier.ensure_loaded().unwrap();
        classifier.ensure_loaded().unwrap();
        classifier.classify(&[0.0; 16]).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unload_then_reload() {
        let catalog = catalog_file("index,mid,display_name\n0,/m/0,Speech\n");
        let (mut classifier, loads) = classifier_with(vec![1.0], &catalog);

        classifier.classify(&[0.0; 16]).unwrap();
        classifier.unload();
        classifier.classify(&[0.0; 16]).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_catalog_fails_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let model = FixedScores {
            scores: vec![1.0],
            loads,
        };
        let mut classifier =
            RankedClassifier::new(model, ["/nonexistent/labels.csv"], 3);
        let err = classifier.ensure_loaded().unwrap_err();
        assert!(matches!(err, AnalyzerError::Classifier { .. }));
    }
}

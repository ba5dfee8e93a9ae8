//! Classification output types.

use std::fmt;

/// A single ranked label with its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Display label for the acoustic scene.
    pub label: String,
    /// Confidence in `[0, 1]`, produced by the classifier's logistic
    /// transform over raw scores.
    pub confidence: f32,
}

/// The ranked result of classifying one window of audio.
///
/// Predictions are ordered by confidence, highest first, and truncated to
/// the configured top-K. The result is immutable once produced.
///
/// # Example
///
/// ```
/// use scene_audio::{Prediction, SceneResult};
///
/// let result = SceneResult::new(vec![Prediction {
///     label: "Rain".to_string(),
///     confidence: 0.87,
/// }]);
/// assert_eq!(result.top().unwrap().label, "Rain");
/// assert_eq!(format!("{result}"), "1. Rain confidence=0.87");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneResult {
    predictions: Vec<Prediction>,
}

impl SceneResult {
    /// Creates a result from already-ranked predictions.
    #[must_use]
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }

    /// Returns the ranked predictions, highest confidence first.
    #[must_use]
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Returns the highest-confidence prediction, if any.
    #[must_use]
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    /// Returns the number of predictions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Returns `true` if the classifier produced no output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl fmt::Display for SceneResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predictions.is_empty() {
            return write!(f, "no classifier output");
        }
        for (rank, prediction) in self.predictions.iter().enumerate() {
            if rank > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}. {} confidence={:.2}",
                rank + 1,
                prediction.label,
                prediction.confidence
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, confidence: f32) -> Prediction {
        Prediction {
            label: label.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_top_is_first() {
        let result = SceneResult::new(vec![
            prediction("Speech", 0.92),
            prediction("Music", 0.41),
        ]);
        assert_eq!(result.top().unwrap().label, "Speech");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_display_numbered_lines() {
        let result = SceneResult::new(vec![
            prediction("Speech", 0.92),
            prediction("Music", 0.41),
            prediction("Wind", 0.05),
        ]);
        assert_eq!(
            format!("{result}"),
            "1. Speech confidence=0.92\n2. Music confidence=0.41\n3. Wind confidence=0.05"
        );
    }

    #[test]
    fn test_display_empty() {
        let result = SceneResult::default();
        assert!(result.is_empty());
        assert_eq!(format!("{result}"), "no classifier output");
    }
}

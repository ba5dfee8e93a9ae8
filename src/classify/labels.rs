//! Label catalog loading.
//!
//! Catalogs are CSV files in the AudioSet style: a header row, then one row
//! per class index carrying a machine identifier and one or more display
//! names. Display names may contain commas inside quoted fields.

use std::fs;
use std::path::Path;

use crate::error::AnalyzerError;

/// Class-index to display-label table.
#[derive(Debug)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    /// Loads the first readable catalog from an ordered candidate list.
    ///
    /// Tried in order; the first file that can be read wins. If none can,
    /// the error lists every attempt and its failure.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self, AnalyzerError> {
        let mut failures = Vec::new();
        for path in candidates {
            let path = path.as_ref();
            match fs::read_to_string(path) {
                Ok(text) => {
                    tracing::debug!(path = %path.display(), "label catalog loaded");
                    return Ok(Self::parse(&text));
                }
                Err(err) => failures.push(format!("{}: {err}", path.display())),
            }
        }
        Err(AnalyzerError::classifier(format!(
            "no readable label catalog ({})",
            failures.join("; ")
        )))
    }

    /// Parses catalog text: header skipped, blank lines skipped, one label
    /// per remaining line.
    ///
    /// # Example
    ///
    /// ```
    /// use scene_audio::classify::LabelCatalog;
    ///
    /// let catalog = LabelCatalog::parse("index,mid,display_name\n0,/m/09x0r,Speech\n");
    /// assert_eq!(catalog.get(0), Some("Speech"));
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let labels = text
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(display_name)
            .collect();
        Self { labels }
    }

    /// Returns the label for a class index, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Returns the label for a class index, or the synthetic placeholder
    /// when the index is out of range.
    #[must_use]
    pub fn label_or_fallback(&self, index: usize) -> String {
        self.get(index)
            .map_or_else(|| Self::fallback(index), str::to_string)
    }

    /// The synthetic placeholder label for an unknown class index.
    #[must_use]
    pub fn fallback(index: usize) -> String {
        format!("class#{index}")
    }

    /// Returns the number of labels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the catalog holds no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Picks the display name from one catalog row.
///
/// Preference order: column 3 when present and non-blank (a localized
/// display name), then column 2 (the canonical display name), then column 1,
/// then the whole line for degenerate rows. Surrounding quotes are trimmed.
fn display_name(line: &str) -> String {
    let fields = split_unquoted_commas(line);
    let picked = match fields.as_slice() {
        [_, _, _, fourth, ..] if !fourth.trim().is_empty() => fourth,
        [_, _, third, ..] => third,
        [_, second] => second,
        _ => line,
    };
    picked.trim().trim_matches('"').to_string()
}

/// Splits on commas that sit outside double-quoted fields.
fn split_unquoted_commas(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, byte) in line.bytes().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

use crate::TextSnapshot;

/// Decides which source readings count as a change worth emitting.
///
/// A reading is emitted when it differs from the baseline and is not blank;
/// the emitted text becomes the new baseline. Blank readings leave the
/// baseline untouched, so copying whitespace and then the previous text again
/// emits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeDetector {
    baseline: Option<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(baseline: impl Into<String>) -> Self {
        Self {
            baseline: Some(baseline.into()),
        }
    }

    pub fn baseline(&self) -> Option<&str> {
        self.baseline.as_deref()
    }

    /// Replaces the baseline without emitting, e.g. after a resume.
    pub fn reset(&mut self, baseline: Option<String>) {
        self.baseline = baseline;
    }

    pub fn observe(&mut self, current: String) -> Option<TextSnapshot> {
        if self.baseline.as_deref() == Some(current.as_str()) {
            return None;
        }
        if current.trim().is_empty() {
            return None;
        }
        self.baseline = Some(current.clone());
        Some(TextSnapshot::from(current))
    }
}

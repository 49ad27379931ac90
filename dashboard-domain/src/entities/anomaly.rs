// Anomaly entity
// Keys whose count sits above mean + 2 * stddev of their grouping

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedKey {
    pub key: String,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct AnomalyReport {
    pub key_column: String,
    pub keys_considered: usize,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub threshold: Option<f64>,
    /// Sorted by descending count.
    pub flagged: Vec<FlaggedKey>,
}

impl AnomalyReport {
    pub fn is_flagged(&self, key: &str) -> bool {
        self.flagged.iter().any(|f| f.key == key)
    }
}

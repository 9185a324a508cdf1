//! Metric lookup used by condition expressions

use super::PlantSubmission;

/// Metric codes understood by condition expressions
pub const METRIC_CODES: [&str; 13] = [
    "AGE", "YLD", "THC", "CBD", "CBG", "CBN", "TRP", "TRC", "CLR", "STC", "ARI", "ARC", "CTM",
];

/// Metric value for evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    List(Vec<i32>),
}

impl PlantSubmission {
    /// Value of a metric code; unknown codes read as zero
    pub fn metric(&self, code: &str) -> PropertyValue {
        let value = match code {
            "AGE" => self.plant_age_days as f64,
            "YLD" => self.yield_grams,
            "THC" => self.cannabinoids.thc,
            "CBD" => self.cannabinoids.cbd,
            "CBG" => self.cannabinoids.cbg,
            "CBN" => self.cannabinoids.cbn,
            "TRP" => self.terpenes.total_percent,
            "TRC" => self.visual.trichome_density,
            "CLR" => self.visual.color_score,
            "STC" => self.visual.structure_score,
            "ARI" => self.aroma.intensity,
            "ARC" => self.aroma.complexity,
            "CTM" => return PropertyValue::List(self.contaminants.clone()),
            _ => 0.0,
        };
        PropertyValue::Number(value)
    }
}

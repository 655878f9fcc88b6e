use serde::Deserialize;

use crate::error::FieldIssue;

pub const WEIGHT_KG: (f64, f64) = (25.0, 400.0);
pub const BODY_FAT_PCT: (f64, f64) = (0.0, 100.0);
pub const GIRTH_CM: (f64, f64) = (30.0, 300.0);

/// Body of `POST /biometrics`. Only the weight is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBiometricRequest {
    pub weight_kg: f64,
    #[serde(default)]
    pub body_fat_pct: Option<f64>,
    #[serde(default)]
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub chest_cm: Option<f64>,
}

fn check(issues: &mut Vec<FieldIssue>, field: &str, value: Option<f64>, (lo, hi): (f64, f64)) {
    if let Some(v) = value {
        if !(lo..=hi).contains(&v) {
            issues.push(FieldIssue::new(field, format!("must be between {lo} and {hi}")));
        }
    }
}

impl LogBiometricRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();
        check(&mut issues, "weightKg", Some(self.weight_kg), WEIGHT_KG);
        check(&mut issues, "bodyFatPct", self.body_fat_pct, BODY_FAT_PCT);
        check(&mut issues, "waistCm", self.waist_cm, GIRTH_CM);
        check(&mut issues, "chestCm", self.chest_cm, GIRTH_CM);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> LogBiometricRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn weight_alone_is_enough() {
        let req = body(json!({"weightKg": 82.5}));
        assert!(req.validate().is_ok());
        assert!(req.body_fat_pct.is_none());
    }

    #[test]
    fn explicit_nulls_are_accepted() {
        let req = body(json!({"weightKg": 70, "bodyFatPct": null, "waistCm": null}));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn every_out_of_range_measurement_is_reported() {
        let req = body(json!({
            "weightKg": 401,
            "bodyFatPct": 100.5,
            "waistCm": 29,
            "chestCm": 120
        }));
        let issues = req.validate().unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["weightKg", "bodyFatPct", "waistCm"]);
    }

    #[test]
    fn missing_weight_does_not_deserialize() {
        let parsed: Result<LogBiometricRequest, _> = serde_json::from_value(json!({"waistCm": 80}));
        assert!(parsed.is_err());
    }
}

//! Physical evaluation report snapshot
//!
//! Every numeric field is optional: the API omits measurements that were
//! not taken, and the exports render those as placeholders rather than
//! dropping rows.

use serde::{Deserialize, Deserializer, Serialize};

/// Full report payload for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation: EvaluationRecord,
    pub student: StudentRef,
    #[serde(default)]
    pub summary: ReportSummary,
}

impl EvaluationReport {
    /// Conditions flagged by the summary or by the record, with the record's notes
    pub fn reported_conditions(&self) -> Vec<HealthFlag<'_>> {
        let summary = self.summary.health_conditions;
        self.evaluation
            .health_flags()
            .into_iter()
            .zip([summary.cardiopathy, summary.hypertension, summary.diabetes])
            .filter(|(flag, in_summary)| flag.present || *in_summary)
            .map(|(flag, _)| HealthFlag { present: true, ..flag })
            .collect()
    }
}

/// Reads `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The evaluated student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Flat anthropometric record as stored server-side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationRecord {
    pub id: Option<i64>,
    pub student_id: Option<i64>,
    /// ISO date (or date-time) of the assessment
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,

    pub weight_kg: Option<f64>,
    pub height_m: Option<f64>,
    pub imc: Option<f64>,
    pub fat_percentage: Option<f64>,
    pub lean_mass_percentage: Option<f64>,
    pub basal_metabolism: Option<f64>,
    pub body_age: Option<f64>,
    pub visceral_fat: Option<f64>,
    pub heart_rate_rest: Option<f64>,

    #[serde(deserialize_with = "null_as_default")]
    pub cardiopathy: bool,
    pub cardiopathy_notes: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hypertension: bool,
    pub hypertension_notes: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub diabetes: bool,
    pub diabetes_notes: Option<String>,

    pub skinfold_triceps: Option<f64>,
    pub skinfold_subscapular: Option<f64>,
    pub skinfold_subaxillary: Option<f64>,
    pub skinfold_suprailiac: Option<f64>,
    pub skinfold_abdominal: Option<f64>,
    pub skinfold_quadriceps: Option<f64>,
    pub skinfold_calf: Option<f64>,

    pub perimeter_chest: Option<f64>,
    pub perimeter_arm_r: Option<f64>,
    pub perimeter_arm_l: Option<f64>,
    pub perimeter_arm_contracted_r: Option<f64>,
    pub perimeter_arm_contracted_l: Option<f64>,
    pub perimeter_forearm_r: Option<f64>,
    pub perimeter_forearm_l: Option<f64>,
    pub perimeter_waist: Option<f64>,
    pub perimeter_abdominal: Option<f64>,
    pub perimeter_hip: Option<f64>,
    pub perimeter_thigh_r: Option<f64>,
    pub perimeter_thigh_l: Option<f64>,
    pub perimeter_leg_r: Option<f64>,
    pub perimeter_leg_l: Option<f64>,

    pub wells_sit_reach_test: Option<f64>,
    pub trunk_flexion_test: Option<f64>,

    pub notes: Option<String>,
}

/// A labelled measurement as shown in every export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub label: &'static str,
    pub value: Option<f64>,
}

impl Measurement {
    const fn new(label: &'static str, value: Option<f64>) -> Self {
        Self { label, value }
    }
}

impl EvaluationRecord {
    /// Skinfold thicknesses (mm) in display order
    pub fn skinfolds(&self) -> [Measurement; 7] {
        [
            Measurement::new("Tríceps", self.skinfold_triceps),
            Measurement::new("Subescapular", self.skinfold_subscapular),
            Measurement::new("Subaxilar", self.skinfold_subaxillary),
            Measurement::new("Suprailíaca", self.skinfold_suprailiac),
            Measurement::new("Abdominal", self.skinfold_abdominal),
            Measurement::new("Quadríceps", self.skinfold_quadriceps),
            Measurement::new("Panturrilha", self.skinfold_calf),
        ]
    }

    /// Body perimeters (cm) in display order
    pub fn perimeters(&self) -> [Measurement; 14] {
        [
            Measurement::new("Tórax", self.perimeter_chest),
            Measurement::new("Braço Direito", self.perimeter_arm_r),
            Measurement::new("Braço Esquerdo", self.perimeter_arm_l),
            Measurement::new("Braço Contratado D", self.perimeter_arm_contracted_r),
            Measurement::new("Braço Contratado E", self.perimeter_arm_contracted_l),
            Measurement::new("Antebraço Direito", self.perimeter_forearm_r),
            Measurement::new("Antebraço Esquerdo", self.perimeter_forearm_l),
            Measurement::new("Cintura", self.perimeter_waist),
            Measurement::new("Abdominal", self.perimeter_abdominal),
            Measurement::new("Quadril", self.perimeter_hip),
            Measurement::new("Coxa Direita", self.perimeter_thigh_r),
            Measurement::new("Coxa Esquerda", self.perimeter_thigh_l),
            Measurement::new("Perna Direita", self.perimeter_leg_r),
            Measurement::new("Perna Esquerda", self.perimeter_leg_l),
        ]
    }

    /// Flags with their optional free-text notes, including unflagged ones
    pub fn health_flags(&self) -> [HealthFlag<'_>; 3] {
        [
            HealthFlag {
                label: "Cardiopatia",
                present: self.cardiopathy,
                notes: self.cardiopathy_notes.as_deref(),
            },
            HealthFlag {
                label: "Hipertensão",
                present: self.hypertension,
                notes: self.hypertension_notes.as_deref(),
            },
            HealthFlag {
                label: "Diabetes",
                present: self.diabetes,
                notes: self.diabetes_notes.as_deref(),
            },
        ]
    }

    /// Notes trimmed, `None` when blank
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// One health condition as reported on the evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthFlag<'a> {
    pub label: &'static str,
    pub present: bool,
    pub notes: Option<&'a str>,
}

/// Server-computed summary attached to a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSummary {
    pub key_metrics: KeyMetrics,
    pub comparison_with_previous: Option<Comparison>,
    pub health_conditions: HealthConditions,
    pub evaluation_number: Option<u32>,
    pub total_evaluations: Option<u32>,
}

/// Headline metrics shown at the top of a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMetrics {
    pub weight_kg: Option<f64>,
    pub imc: Option<f64>,
    pub fat_percentage: Option<f64>,
    pub lean_mass_percentage: Option<f64>,
    pub basal_metabolism: Option<f64>,
    pub body_age: Option<f64>,
    pub visceral_fat: Option<f64>,
}

/// Deltas against the student's previous evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comparison {
    pub weight_change_kg: Option<f64>,
    pub imc_change: Option<f64>,
    pub fat_percentage_change: Option<f64>,
    pub previous_date: Option<String>,
    pub trend: Option<Trend>,
}

/// Direction of the student's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Maintaining,
    #[serde(other)]
    NeedsAttention,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Improving => "Melhorando",
            Trend::Maintaining => "Mantendo",
            Trend::NeedsAttention => "Precisa de atenção",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConditions {
    #[serde(deserialize_with = "null_as_default")]
    pub cardiopathy: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub hypertension: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub diabetes: bool,
}

impl HealthConditions {
    pub fn any(&self) -> bool {
        self.cardiopathy || self.hypertension || self.diabetes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPARSE_REPORT: &str = r#"{
        "evaluation": { "id": 7, "date": "2024-03-05", "weight_kg": 81.5, "notes": "  " },
        "student": { "id": 3, "name": "Ana Souza" },
        "summary": {
            "key_metrics": { "weight_kg": 81.5 },
            "comparison_with_previous": { "weight_change_kg": -1.2, "trend": "improving" },
            "evaluation_number": 2,
            "total_evaluations": 4
        }
    }"#;

    #[test]
    fn test_sparse_payload_deserializes() {
        let report: EvaluationReport = serde_json::from_str(SPARSE_REPORT).unwrap();
        assert_eq!(report.student.name, "Ana Souza");
        assert_eq!(report.evaluation.weight_kg, Some(81.5));
        assert_eq!(report.evaluation.height_m, None);
        assert!(!report.evaluation.diabetes);
        assert_eq!(report.summary.evaluation_number, Some(2));
        let comparison = report.summary.comparison_with_previous.unwrap();
        assert_eq!(comparison.trend, Some(Trend::Improving));
    }

    #[test]
    fn test_unknown_trend_needs_attention() {
        let comparison: Comparison = serde_json::from_str(r#"{"trend": "worsening"}"#).unwrap();
        assert_eq!(comparison.trend, Some(Trend::NeedsAttention));
        assert_eq!(Trend::NeedsAttention.label(), "Precisa de atenção");
    }

    #[test]
    fn test_blank_notes_are_absent() {
        let report: EvaluationReport = serde_json::from_str(SPARSE_REPORT).unwrap();
        assert_eq!(report.evaluation.notes_text(), None);

        let record = EvaluationRecord {
            notes: Some(" x ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.notes_text(), Some("x"));
    }

    #[test]
    fn test_measurement_tables_keep_order() {
        let record = EvaluationRecord {
            skinfold_calf: Some(9.0),
            perimeter_leg_l: Some(36.5),
            ..Default::default()
        };
        let skinfolds = record.skinfolds();
        assert_eq!(skinfolds[0].label, "Tríceps");
        assert_eq!(skinfolds[6].value, Some(9.0));

        let perimeters = record.perimeters();
        assert_eq!(perimeters[0].label, "Tórax");
        assert_eq!(perimeters[13].label, "Perna Esquerda");
        assert_eq!(perimeters[13].value, Some(36.5));
    }

    #[test]
    fn test_null_flags_and_text_read_as_default() {
        let report: EvaluationReport = serde_json::from_str(
            r#"{
                "evaluation": { "date": null, "cardiopathy": null, "hypertension": true, "diabetes": null },
                "student": { "name": null },
                "summary": { "health_conditions": { "diabetes": null } }
            }"#,
        )
        .unwrap();
        assert_eq!(report.evaluation.date, "");
        assert!(!report.evaluation.cardiopathy);
        assert!(report.evaluation.hypertension);
        assert!(!report.evaluation.diabetes);
        assert_eq!(report.student.name, "");
        assert!(!report.summary.health_conditions.any());
    }

    #[test]
    fn test_reported_conditions_merge_summary_and_record() {
        let report: EvaluationReport = serde_json::from_str(
            r#"{
                "evaluation": { "date": "2024-03-05", "diabetes_notes": "Tipo 2", "cardiopathy": true },
                "student": { "name": "Ana" },
                "summary": { "health_conditions": { "diabetes": true } }
            }"#,
        )
        .unwrap();
        let conditions = report.reported_conditions();
        let labels: Vec<&str> = conditions.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Cardiopatia", "Diabetes"]);
        assert!(conditions.iter().all(|c| c.present));
        assert_eq!(conditions[1].notes, Some("Tipo 2"));
    }

    #[test]
    fn test_health_flags() {
        let record = EvaluationRecord {
            hypertension: true,
            hypertension_notes: Some("controlada".to_string()),
            ..Default::default()
        };
        let flags = record.health_flags();
        assert!(!flags[0].present);
        assert!(flags[1].present);
        assert_eq!(flags[1].notes, Some("controlada"));

        let conditions = HealthConditions {
            hypertension: true,
            ..Default::default()
        };
        assert!(conditions.any());
        assert!(!HealthConditions::default().any());
    }
}

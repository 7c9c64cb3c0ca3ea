//! Derived classifications shown next to the raw metrics

use crate::EvaluationRecord;

/// WHO-style BMI band used in the report header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiClass {
    pub fn from_bmi(bmi: Option<f64>) -> Option<Self> {
        let bmi = bmi.filter(|b| *b > 0.0)?;
        Some(if bmi < 18.5 {
            BmiClass::Underweight
        } else if bmi < 25.0 {
            BmiClass::Normal
        } else if bmi < 30.0 {
            BmiClass::Overweight
        } else {
            BmiClass::Obese
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiClass::Underweight => "Abaixo do peso",
            BmiClass::Normal => "Peso normal",
            BmiClass::Overweight => "Sobrepeso",
            BmiClass::Obese => "Obesidade",
        }
    }
}

/// Body classification combining BMI with body fat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyClass {
    Underweight,
    Obese,
    Overweight,
    Normal,
    Athletic,
}

impl BodyClass {
    /// Display order of the classification chart
    pub const ALL: [BodyClass; 5] = [
        BodyClass::Underweight,
        BodyClass::Obese,
        BodyClass::Overweight,
        BodyClass::Normal,
        BodyClass::Athletic,
    ];

    /// Absent BMI or fat percentage count as zero.
    pub fn classify(bmi: Option<f64>, fat_percentage: Option<f64>) -> Self {
        let bmi = bmi.unwrap_or(0.0);
        let fat = fat_percentage.unwrap_or(0.0);
        if bmi < 18.5 {
            BodyClass::Underweight
        } else if bmi < 25.0 && fat < 15.0 {
            BodyClass::Athletic
        } else if bmi < 25.0 {
            BodyClass::Normal
        } else if bmi < 30.0 {
            BodyClass::Overweight
        } else if fat > 25.0 {
            BodyClass::Obese
        } else {
            BodyClass::Overweight
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodyClass::Underweight => "Abaixo do Peso",
            BodyClass::Obese => "Obeso",
            BodyClass::Overweight => "Sobrepeso",
            BodyClass::Normal => "Normal",
            BodyClass::Athletic => "Atlético",
        }
    }

    /// Position on the 1..=5 scale
    pub fn score(&self) -> u8 {
        match self {
            BodyClass::Underweight => 1,
            BodyClass::Obese => 2,
            BodyClass::Overweight => 3,
            BodyClass::Normal => 4,
            BodyClass::Athletic => 5,
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            BodyClass::Underweight => [59, 130, 246],
            BodyClass::Obese => [239, 68, 68],
            BodyClass::Overweight => [245, 158, 11],
            BodyClass::Normal => [34, 197, 94],
            BodyClass::Athletic => [16, 185, 129],
        }
    }
}

/// Waist-based perimeter ratios
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerimeterRatios {
    pub waist_hip: f64,
    pub waist_chest: f64,
    /// Waist over height, in percent
    pub waist_height_pct: f64,
}

impl PerimeterRatios {
    /// Missing or zero perimeters are treated as 1 so the ratios stay finite.
    pub fn from_record(record: &EvaluationRecord) -> Self {
        let or_one = |v: Option<f64>| v.filter(|x| *x != 0.0).unwrap_or(1.0);
        let waist = or_one(record.perimeter_waist);
        let hip = or_one(record.perimeter_hip);
        let chest = or_one(record.perimeter_chest);
        let height_cm = or_one(record.height_m) * 100.0;
        Self {
            waist_hip: waist / hip,
            waist_chest: waist / chest,
            waist_height_pct: waist / height_cm * 100.0,
        }
    }
}

//! Fixed chart slots
//!
//! Containers register under these keys; the document generator looks them
//! up by key at capture time, so renaming one degrades that chart to a
//! placeholder.

use capture::ElementSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartSlot {
    FatDistribution,
    MuscleBalance,
    BodyComposition,
    PerimeterRatio,
    BodyClassification,
}

impl ChartSlot {
    /// Capture and print order
    pub const ALL: [ChartSlot; 5] = [
        ChartSlot::FatDistribution,
        ChartSlot::MuscleBalance,
        ChartSlot::BodyComposition,
        ChartSlot::PerimeterRatio,
        ChartSlot::BodyClassification,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ChartSlot::FatDistribution => "fat-distribution",
            ChartSlot::MuscleBalance => "muscle-balance",
            ChartSlot::BodyComposition => "body-composition",
            ChartSlot::PerimeterRatio => "perimeter-ratio",
            ChartSlot::BodyClassification => "body-classification",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartSlot::FatDistribution => "Distribuição de Gordura Corporal",
            ChartSlot::MuscleBalance => "Equilíbrio Muscular",
            ChartSlot::BodyComposition => "Gordura vs Massa Muscular",
            ChartSlot::PerimeterRatio => "Relação de Perímetros",
            ChartSlot::BodyClassification => "Classificação Corporal",
        }
    }

    /// Stem used when the chart is saved as its own file
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartSlot::FatDistribution => "distribuicao_gordura",
            ChartSlot::MuscleBalance => "equilibrio_muscular",
            ChartSlot::BodyComposition => "composicao",
            ChartSlot::PerimeterRatio => "relacao_perimetros",
            ChartSlot::BodyClassification => "classificacao",
        }
    }

    /// On-screen layout size in logical pixels
    pub fn layout_size(&self) -> ElementSize {
        match self {
            ChartSlot::BodyClassification => ElementSize::new(250.0, 250.0),
            _ => ElementSize::new(480.0, 300.0),
        }
    }
}

impl std::fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for slot in ChartSlot::ALL {
            assert_eq!(ChartSlot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(ChartSlot::from_key("fat_distribution"), None);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = ChartSlot::ALL.iter().map(|s| s.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }
}

use serde::{Deserialize, Serialize};

use super::super::domain::Grade;

/// Engine configuration: scoring tables plus how many regions to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub interest: InterestTable,
    pub regions: RegionWeights,
    pub top_regions: usize,
}

impl EngineConfig {
    pub fn with_top_regions(top_regions: usize) -> Self {
        Self {
            top_regions,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interest: InterestTable::default(),
            regions: RegionWeights::default(),
            top_regions: 3,
        }
    }
}

/// How a policy's categories line up with the user's stated interests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMatch {
    Both,
    BigOnly,
    MidOnly,
    Neither,
}

/// Interest score per category match. A mid-category match outweighs a broad one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestTable {
    pub both: f64,
    pub big_only: f64,
    pub mid_only: f64,
    pub neither: f64,
}

impl InterestTable {
    pub fn score(&self, category_match: CategoryMatch) -> f64 {
        match category_match {
            CategoryMatch::Both => self.both,
            CategoryMatch::BigOnly => self.big_only,
            CategoryMatch::MidOnly => self.mid_only,
            CategoryMatch::Neither => self.neither,
        }
    }
}

impl Default for InterestTable {
    fn default() -> Self {
        Self {
            both: 2.8,
            big_only: 2.3,
            mid_only: 2.5,
            neither: 2.0,
        }
    }
}

/// Multiplier applied to a sub-score depending on a yes/no priority answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityMultiplier {
    pub yes: f64,
    pub no: f64,
}

impl PriorityMultiplier {
    /// `"Y"` and `"N"` select a multiplier; any other answer leaves the score unchanged.
    pub fn factor(&self, answer: Option<&str>) -> f64 {
        match answer.map(str::trim) {
            Some("Y") => self.yes,
            Some("N") => self.no,
            _ => 1.0,
        }
    }
}

/// Preference-ordered weight tables for region infrastructure scoring.
///
/// `priorities[g]` lists every grade ordered by closeness to the selected grade `g`;
/// the grade at position `i` of that list receives `weights[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionWeights {
    pub weights: [f64; 5],
    pub priorities: [[Grade; 5]; 5],
    pub transport: PriorityMultiplier,
    pub housing: PriorityMultiplier,
}

impl RegionWeights {
    /// Weight of `region` for a user who selected `selected`. Unknown grades weigh 0.
    pub fn weight(&self, selected: Option<Grade>, region: Option<Grade>) -> f64 {
        let (Some(selected), Some(region)) = (selected, region) else {
            return 0.0;
        };

        self.priorities[selected.index()]
            .iter()
            .position(|grade| *grade == region)
            .map(|position| self.weights[position])
            .unwrap_or(0.0)
    }
}

impl Default for RegionWeights {
    fn default() -> Self {
        use Grade::{A, B, C, D, E};

        Self {
            weights: [1.5, 1.2, 1.0, 0.8, 0.5],
            priorities: [
                [A, B, C, D, E],
                [B, C, A, D, E],
                [C, D, B, E, A],
                [D, E, C, B, A],
                [E, D, C, B, A],
            ],
            transport: PriorityMultiplier { yes: 1.2, no: 0.8 },
            housing: PriorityMultiplier { yes: 0.8, no: 1.2 },
        }
    }
}

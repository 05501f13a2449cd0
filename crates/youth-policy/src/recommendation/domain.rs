use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Region code reserved for policies that apply to every region.
pub const NATIONWIDE_REGION_CODE: &str = "99999";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseId(pub String);

/// Identifies one submitted survey and therefore one recommendation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunKey {
    pub user_id: UserId,
    pub response_id: ResponseId,
}

impl RunKey {
    pub fn new(user_id: impl Into<String>, response_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            response_id: ResponseId(response_id.into()),
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} / response {}", self.user_id.0, self.response_id.0)
    }
}

/// A single selected option for a survey question. Multi-select questions produce
/// several answers with the same `question_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    pub question_id: String,
    pub option_code: String,
}

impl SurveyAnswer {
    pub fn new(question_id: impl Into<String>, option_code: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            option_code: option_code.into(),
        }
    }
}

/// Eligibility constraint on one policy dimension after sentinel codes are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// The policy table carries no value for this dimension.
    Unconstrained,
    /// The policy table carries the dimension's "any value" code.
    Wildcard,
    Specific(String),
}

impl Requirement {
    pub fn specific(code: impl Into<String>) -> Self {
        Self::Specific(code.into())
    }

    /// Returns the code that must be matched, if any.
    pub fn required_code(&self) -> Option<&str> {
        match self {
            Requirement::Specific(code) => Some(code),
            Requirement::Unconstrained | Requirement::Wildcard => None,
        }
    }
}

/// Where a policy applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyRegion {
    Nationwide,
    Local(String),
}

impl PolicyRegion {
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if code == NATIONWIDE_REGION_CODE {
            Self::Nationwide
        } else {
            Self::Local(code.to_string())
        }
    }

    pub fn code(&self) -> &str {
        match self {
            PolicyRegion::Nationwide => NATIONWIDE_REGION_CODE,
            PolicyRegion::Local(code) => code,
        }
    }

    pub fn is_nationwide(&self) -> bool {
        matches!(self, PolicyRegion::Nationwide)
    }

    pub fn is_local_to(&self, region_code: &str) -> bool {
        matches!(self, PolicyRegion::Local(code) if code == region_code)
    }
}

/// Flattened, scoring-ready view of a policy row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCandidate {
    pub policy_code: String,
    pub region: PolicyRegion,
    pub min_age: u32,
    pub max_age: u32,
    pub school: Requirement,
    pub business: Requirement,
    pub marital: Requirement,
    pub job: Requirement,
    pub big_category: Option<String>,
    pub mid_category: Option<String>,
}

/// Infrastructure letter grade. Regions are graded `A` to `D`; survey selections may
/// also use `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E];

    /// Parses a single letter, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "E" => Some(Grade::E),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Grade::A => 0,
            Grade::B => 1,
            Grade::C => 2,
            Grade::D => 3,
            Grade::E => 4,
        }
    }
}

/// Regional infrastructure grades; `None` means the grade is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfraProfile {
    pub region_code: String,
    pub medical_infra: Option<Grade>,
    pub medical_access: Option<Grade>,
    pub transport: Option<Grade>,
    pub housing: Option<Grade>,
}

impl RegionInfraProfile {
    pub fn unknown(region_code: impl Into<String>) -> Self {
        Self {
            region_code: region_code.into(),
            medical_infra: None,
            medical_access: None,
            transport: None,
            housing: None,
        }
    }
}

/// Region reference entry used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Full policy record returned to callers of the grouped view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDetail {
    pub policy_code: String,
    pub title: String,
    pub summary: Option<String>,
    pub agency: Option<String>,
    pub apply_url: Option<String>,
}

/// Region selected for a user together with its composite infrastructure score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedRegion {
    pub region_code: String,
    pub total_infra_score: f64,
}

/// Persisted recommendation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: UserId,
    pub response_id: ResponseId,
    /// Sequence number of the run that produced this row, starting at 1.
    pub run: u64,
    pub computed_at: DateTime<Utc>,
    pub region_code: String,
    pub policy_code: String,
    pub rank_group: u32,
    pub rank: u32,
}

impl Recommendation {
    pub fn is_nationwide(&self) -> bool {
        self.region_code == NATIONWIDE_REGION_CODE
    }
}

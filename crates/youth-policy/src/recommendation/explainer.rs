use serde::Serialize;

use super::domain::{Grade, RegionInfraProfile};

/// Infrastructure dimensions a region is graded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfraDimension {
    MedicalInfra,
    MedicalAccess,
    Transport,
    Housing,
}

impl InfraDimension {
    pub const ALL: [InfraDimension; 4] = [
        InfraDimension::MedicalInfra,
        InfraDimension::MedicalAccess,
        InfraDimension::Transport,
        InfraDimension::Housing,
    ];

    const fn index(self) -> usize {
        match self {
            InfraDimension::MedicalInfra => 0,
            InfraDimension::MedicalAccess => 1,
            InfraDimension::Transport => 2,
            InfraDimension::Housing => 3,
        }
    }

    pub fn grade_of(self, profile: &RegionInfraProfile) -> Option<Grade> {
        match self {
            InfraDimension::MedicalInfra => profile.medical_infra,
            InfraDimension::MedicalAccess => profile.medical_access,
            InfraDimension::Transport => profile.transport,
            InfraDimension::Housing => profile.housing,
        }
    }
}

// Rows follow `InfraDimension::index`; columns are A, B, C, D, unknown.
const REASONS: [[&str; 5]; 4] = [
    [
        "Hospitals and clinics are plentiful, so medical care is readily available.",
        "Medical facilities are well supplied for everyday needs.",
        "Medical facilities cover basic needs, though specialist care may be limited.",
        "Medical facilities are scarce, so some care may require travel to nearby cities.",
        "No data is available on the region's medical facilities.",
    ],
    [
        "Medical facilities are close by and quick to reach.",
        "Most medical facilities can be reached within a short trip.",
        "Reaching medical facilities takes a moderate amount of time.",
        "Medical facilities are far away, so access takes planning.",
        "No data is available on access to medical facilities.",
    ],
    [
        "Public transport is dense and frequent, making car-free living easy.",
        "Public transport covers most daily trips.",
        "Public transport is available but less frequent.",
        "Public transport is limited, so a car is often necessary.",
        "No data is available on the region's transport network.",
    ],
    [
        "Housing is affordable with a good supply of homes.",
        "Housing costs are reasonable for young residents.",
        "Housing costs are moderate and supply is average.",
        "Housing is expensive or in short supply.",
        "No data is available on the region's housing conditions.",
    ],
];

/// Sentence describing one dimension of a region. Grades outside `A`..`D` use the
/// unknown sentence.
pub fn reason(dimension: InfraDimension, grade: Option<Grade>) -> &'static str {
    let column = match grade {
        Some(Grade::A) => 0,
        Some(Grade::B) => 1,
        Some(Grade::C) => 2,
        Some(Grade::D) => 3,
        Some(Grade::E) | None => 4,
    };
    REASONS[dimension.index()][column]
}

/// One sentence per dimension, in `InfraDimension::ALL` order.
pub fn explain(profile: &RegionInfraProfile) -> Vec<&'static str> {
    InfraDimension::ALL
        .iter()
        .map(|dimension| reason(*dimension, dimension.grade_of(profile)))
        .collect()
}

/// Justification of a recommended region for display next to its group.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReasonView {
    pub username: String,
    pub rank_group: u32,
    pub region_display_name: String,
    pub reasons: Vec<String>,
}

//! Policy and region recommendation for a submitted youth survey.
//!
//! A run filters the policy table down to what the respondent is eligible for, scores
//! those policies by interest, scores candidate regions by infrastructure preference,
//! and stores a ranked policy list for each of the best regions. The grouped and
//! region-reason views read those rows back for display.

pub mod answers;
pub mod domain;
pub mod engine;
pub mod explainer;
pub mod grouper;
pub mod reference;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use answers::{questions, AnswerIndex};
pub use domain::{
    Grade, PolicyCandidate, PolicyDetail, PolicyRegion, Recommendation, RecommendedRegion,
    Region, RegionInfraProfile, Requirement, ResponseId, RunKey, SurveyAnswer, UserId,
    NATIONWIDE_REGION_CODE,
};
pub use engine::{EngineConfig, EngineError, RecommendationEngine, RecommendationPlan};
pub use explainer::RegionReasonView;
pub use grouper::{
    region_display_name, RankedPolicyView, RecommendationGroupView, RecommendationGrouper,
};
pub use reference::{ReferenceCatalog, ReferenceDataError};
pub use repository::{
    RecommendationRepository, RepositoryError, RerunPolicy, StoredRun, SurveyAnswerSource,
};
pub use router::recommendation_router;
pub use service::{RecommendationRun, RecommendationService, RecommendationServiceError};

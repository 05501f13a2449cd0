use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::recommendation::domain::{
    Grade, PolicyCandidate, PolicyDetail, PolicyRegion, Recommendation, Region,
    RegionInfraProfile, Requirement, ResponseId, RunKey, SurveyAnswer, UserId,
};
use crate::recommendation::engine::{EngineConfig, RecommendationEngine};
use crate::recommendation::reference::ReferenceCatalog;
use crate::recommendation::repository::{
    latest_run, RecommendationRepository, RepositoryError, RerunPolicy, StoredRun,
    SurveyAnswerSource,
};
use crate::recommendation::{recommendation_router, AnswerIndex, RecommendationService};

pub(super) const SEOUL: &str = "11000";
pub(super) const BUSAN: &str = "26000";
pub(super) const DAEGU: &str = "27000";
pub(super) const GYEONGBUK: &str = "47000";

pub(super) fn key() -> RunKey {
    RunKey::new("youth-01", "resp-1")
}

/// Policy with no eligibility constraints.
pub(super) fn open_policy(code: &str, region: &str, big: &str, mid: &str) -> PolicyCandidate {
    PolicyCandidate {
        policy_code: code.to_string(),
        region: PolicyRegion::from_code(region),
        min_age: 0,
        max_age: 0,
        school: Requirement::Unconstrained,
        business: Requirement::Unconstrained,
        marital: Requirement::Unconstrained,
        job: Requirement::Unconstrained,
        big_category: Some(big.to_string()),
        mid_category: Some(mid.to_string()),
    }
}

pub(super) fn index(pairs: &[(&str, &str)]) -> AnswerIndex {
    AnswerIndex::from_answers(&survey(pairs))
}

pub(super) fn survey(pairs: &[(&str, &str)]) -> Vec<SurveyAnswer> {
    pairs
        .iter()
        .map(|(question, option)| SurveyAnswer::new(*question, *option))
        .collect()
}

pub(super) fn default_survey() -> Vec<SurveyAnswer> {
    survey(&[
        ("Q1", "25"),
        ("Q2", "0049005"),
        ("Q3", "0014002"),
        ("Q3", "0014005"),
        ("Q4", "55002"),
        ("Q5", "0013001"),
        ("Q6", "Jobs"),
        ("Q7", "Startup"),
        ("Q8", "A"),
        ("Q9", "A"),
        ("Q10", "Y"),
        ("Q11", "A"),
        ("Q12", "N"),
        ("Q13", "B"),
    ])
}

pub(super) fn default_index() -> AnswerIndex {
    AnswerIndex::from_answers(&default_survey())
}

pub(super) fn profile(code: &str, grades: [Option<Grade>; 4]) -> RegionInfraProfile {
    let [medical_infra, medical_access, transport, housing] = grades;
    RegionInfraProfile {
        region_code: code.to_string(),
        medical_infra,
        medical_access,
        transport,
        housing,
    }
}

pub(super) fn policies() -> Vec<PolicyCandidate> {
    let mut seoul_job = open_policy("P-SEOUL-JOB", SEOUL, "Jobs", "Startup");
    seoul_job.min_age = 19;
    seoul_job.max_age = 34;
    seoul_job.school = Requirement::Wildcard;
    seoul_job.business = Requirement::Wildcard;

    let mut seoul_house = open_policy("P-SEOUL-HOUSE", SEOUL, "Housing", "Rent");
    seoul_house.max_age = 39;
    seoul_house.school = Requirement::specific("0049007");

    let mut busan_job = open_policy("P-BUSAN-JOB", BUSAN, "Jobs", "Employment");
    busan_job.business = Requirement::specific("0014005");

    let mut daegu_senior = open_policy("P-DAEGU-OLD", DAEGU, "Jobs", "Startup");
    daegu_senior.min_age = 40;

    let nation_edu = open_policy("P-NATION-EDU", "99999", "Education", "Scholarship");
    let nation_job = open_policy("P-NATION-JOB", "99999", "Jobs", "Startup");

    let mut nation_married = open_policy("P-NATION-MARRIED", "99999", "Welfare", "Newlywed");
    nation_married.marital = Requirement::specific("55001");

    vec![
        seoul_job,
        seoul_house,
        busan_job,
        daegu_senior,
        nation_edu,
        nation_job,
        nation_married,
    ]
}

pub(super) fn infra() -> Vec<RegionInfraProfile> {
    use Grade::{A, B, C};
    vec![
        profile(SEOUL, [Some(A), Some(A), Some(A), Some(B)]),
        profile(BUSAN, [Some(B), Some(B), Some(B), Some(B)]),
        profile(DAEGU, [Some(C), Some(C), Some(C), Some(C)]),
        RegionInfraProfile::unknown(GYEONGBUK),
    ]
}

pub(super) fn regions() -> Vec<Region> {
    vec![
        Region {
            code: SEOUL.to_string(),
            name: "Seoul".to_string(),
            description: Some("Capital region with dense transit".to_string()),
        },
        Region {
            code: BUSAN.to_string(),
            name: "Busan".to_string(),
            description: None,
        },
        Region {
            code: DAEGU.to_string(),
            name: "Daegu".to_string(),
            description: None,
        },
    ]
}

pub(super) fn details() -> Vec<PolicyDetail> {
    policies()
        .into_iter()
        .map(|policy| PolicyDetail {
            title: format!("{} programme", policy.policy_code),
            policy_code: policy.policy_code,
            summary: None,
            agency: Some("Youth Policy Office".to_string()),
            apply_url: None,
        })
        .collect()
}

pub(super) fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::new(policies(), infra(), regions(), details())
}

pub(super) fn engine() -> RecommendationEngine {
    RecommendationEngine::new(EngineConfig::default())
}

pub(super) fn row(region: &str, policy: &str, rank_group: u32, rank: u32) -> Recommendation {
    Recommendation {
        user_id: UserId("youth-01".to_string()),
        response_id: ResponseId("resp-1".to_string()),
        run: 1,
        computed_at: Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        region_code: region.to_string(),
        policy_code: policy.to_string(),
        rank_group,
        rank,
    }
}

/// `(region, policy, rank_group, rank)` tuples, ignoring run metadata.
pub(super) fn placements(rows: &[Recommendation]) -> Vec<(String, String, u32, u32)> {
    rows.iter()
        .map(|row| {
            (
                row.region_code.clone(),
                row.policy_code.clone(),
                row.rank_group,
                row.rank,
            )
        })
        .collect()
}

#[derive(Default, Clone)]
pub(super) struct MemorySurveys {
    answers: Arc<Mutex<HashMap<RunKey, Vec<SurveyAnswer>>>>,
}

impl MemorySurveys {
    pub(super) fn with(key: RunKey, answers: Vec<SurveyAnswer>) -> Self {
        let surveys = Self::default();
        surveys.set(key, answers);
        surveys
    }

    /// Swaps the answers behind `key`, standing in for a changed upstream source.
    pub(super) fn set(&self, key: RunKey, answers: Vec<SurveyAnswer>) {
        self.answers
            .lock()
            .expect("survey mutex poisoned")
            .insert(key, answers);
    }
}

impl SurveyAnswerSource for MemorySurveys {
    fn answers(&self, key: &RunKey) -> Result<Vec<SurveyAnswer>, RepositoryError> {
        let guard = self.answers.lock().expect("survey mutex poisoned");
        Ok(guard.get(key).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) runs: Arc<Mutex<HashMap<RunKey, Vec<StoredRun>>>>,
}

impl MemoryRepository {
    /// Rows of every stored run for `key`, oldest run first.
    pub(super) fn all_rows(&self, key: &RunKey) -> Vec<Recommendation> {
        let guard = self.runs.lock().expect("repository mutex poisoned");
        guard
            .get(key)
            .map(|runs| runs.iter().flat_map(|stored| stored.rows.clone()).collect())
            .unwrap_or_default()
    }

    pub(super) fn run_numbers(&self, key: &RunKey) -> Vec<u64> {
        let guard = self.runs.lock().expect("repository mutex poisoned");
        guard
            .get(key)
            .map(|runs| runs.iter().map(|stored| stored.run).collect())
            .unwrap_or_default()
    }
}

impl RecommendationRepository for MemoryRepository {
    fn replace(&self, key: &RunKey, run: StoredRun) -> Result<(), RepositoryError> {
        let mut guard = self.runs.lock().expect("repository mutex poisoned");
        guard.insert(key.clone(), vec![run]);
        Ok(())
    }

    fn append(&self, key: &RunKey, run: StoredRun) -> Result<(), RepositoryError> {
        let mut guard = self.runs.lock().expect("repository mutex poisoned");
        guard.entry(key.clone()).or_default().push(run);
        Ok(())
    }

    fn latest(&self, key: &RunKey) -> Result<Option<StoredRun>, RepositoryError> {
        let guard = self.runs.lock().expect("repository mutex poisoned");
        Ok(guard.get(key).and_then(|runs| latest_run(runs)))
    }
}

pub(super) struct UnavailableRepository;

impl RecommendationRepository for UnavailableRepository {
    fn replace(&self, _key: &RunKey, _run: StoredRun) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn append(&self, _key: &RunKey, _run: StoredRun) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest(&self, _key: &RunKey) -> Result<Option<StoredRun>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    rerun: RerunPolicy,
) -> (
    RecommendationService<MemorySurveys, MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let (service, _, repository) = build_service_with_surveys(rerun);
    (service, repository)
}

pub(super) fn build_service_with_surveys(
    rerun: RerunPolicy,
) -> (
    RecommendationService<MemorySurveys, MemoryRepository>,
    Arc<MemorySurveys>,
    Arc<MemoryRepository>,
) {
    let surveys = Arc::new(MemorySurveys::with(key(), default_survey()));
    let repository = Arc::new(MemoryRepository::default());
    let service = RecommendationService::with_engine(
        surveys.clone(),
        repository.clone(),
        Arc::new(catalog()),
        engine(),
        rerun,
        4,
    );
    (service, surveys, repository)
}

pub(super) fn router_with_service<R>(service: RecommendationService<MemorySurveys, R>) -> axum::Router
where
    R: RecommendationRepository + 'static,
{
    recommendation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

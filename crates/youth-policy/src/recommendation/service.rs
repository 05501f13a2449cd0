use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::RecommendationConfig;

use super::answers::AnswerIndex;
use super::domain::{Recommendation, RecommendedRegion, RegionInfraProfile, RunKey};
use super::engine::{EngineConfig, EngineError, RecommendationEngine};
use super::explainer::{explain, RegionReasonView};
use super::grouper::{RecommendationGroupView, RecommendationGrouper};
use super::reference::ReferenceCatalog;
use super::repository::{
    RecommendationRepository, RepositoryError, RerunPolicy, StoredRun, SurveyAnswerSource,
};

/// Service composing the survey source, reference catalog, engine, and repository.
pub struct RecommendationService<S, R> {
    surveys: Arc<S>,
    repository: Arc<R>,
    catalog: Arc<ReferenceCatalog>,
    engine: Arc<RecommendationEngine>,
    rerun: RerunPolicy,
    group_policy_limit: usize,
    run_locks: Mutex<HashMap<RunKey, Arc<Mutex<()>>>>,
}

/// Outcome of one recommendation run.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRun {
    pub key: RunKey,
    pub run: u64,
    pub computed_at: DateTime<Utc>,
    pub regions: Vec<RecommendedRegion>,
    pub recommendations: Vec<Recommendation>,
}

impl<S, R> RecommendationService<S, R>
where
    S: SurveyAnswerSource + 'static,
    R: RecommendationRepository + 'static,
{
    pub fn new(
        surveys: Arc<S>,
        repository: Arc<R>,
        catalog: Arc<ReferenceCatalog>,
        config: &RecommendationConfig,
    ) -> Self {
        let engine = RecommendationEngine::new(EngineConfig::with_top_regions(config.top_regions));
        Self::with_engine(
            surveys,
            repository,
            catalog,
            engine,
            config.rerun_policy,
            config.group_policy_limit,
        )
    }

    pub fn with_engine(
        surveys: Arc<S>,
        repository: Arc<R>,
        catalog: Arc<ReferenceCatalog>,
        engine: RecommendationEngine,
        rerun: RerunPolicy,
        group_policy_limit: usize,
    ) -> Self {
        Self {
            surveys,
            repository,
            catalog,
            engine: Arc::new(engine),
            rerun,
            group_policy_limit,
            run_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Run the engine for a survey response and persist the resulting rows.
    ///
    /// Runs for the same key are serialized so that, under [`RerunPolicy::Replace`],
    /// repeating a run leaves exactly one row set behind.
    pub fn recompute(&self, key: &RunKey) -> Result<RecommendationRun, RecommendationServiceError> {
        let lock = self.run_lock(key)?;
        let outcome = match lock.lock() {
            Ok(_guard) => self.run(key),
            Err(_) => Err(RepositoryError::Unavailable(
                "recommendation run lock poisoned".into(),
            )
            .into()),
        };
        self.release_run_lock(key, lock);
        outcome
    }

    fn run(&self, key: &RunKey) -> Result<RecommendationRun, RecommendationServiceError> {
        let answers = self.surveys.answers(key)?;
        if answers.is_empty() {
            return Err(RecommendationServiceError::SurveyNotFound(key.clone()));
        }

        let index = AnswerIndex::from_answers(&answers);
        let plan = self.engine.plan(&index, &self.catalog)?;

        let run = self
            .repository
            .latest(key)?
            .map(|stored| stored.run)
            .unwrap_or(0)
            + 1;
        let computed_at = Utc::now();
        let recommendations: Vec<Recommendation> = plan
            .entries
            .iter()
            .map(|entry| Recommendation {
                user_id: key.user_id.clone(),
                response_id: key.response_id.clone(),
                run,
                computed_at,
                region_code: entry.region_code.clone(),
                policy_code: entry.policy_code.clone(),
                rank_group: entry.rank_group,
                rank: entry.rank,
            })
            .collect();

        let stored = StoredRun {
            run,
            computed_at,
            rows: recommendations.clone(),
        };
        match self.rerun {
            RerunPolicy::Replace => self.repository.replace(key, stored)?,
            RerunPolicy::Append => self.repository.append(key, stored)?,
        }

        info!(
            %key,
            run,
            regions = plan.regions.len(),
            eligible = plan.eligible_policies,
            rows = recommendations.len(),
            rerun = self.rerun.label(),
            "recommendation run stored"
        );

        Ok(RecommendationRun {
            key: key.clone(),
            run,
            computed_at,
            regions: plan.regions,
            recommendations,
        })
    }

    /// Grouped view of the latest run, best region first.
    pub fn groups(
        &self,
        key: &RunKey,
    ) -> Result<Vec<RecommendationGroupView>, RecommendationServiceError> {
        let rows = self.latest_rows(key)?;
        let grouper = RecommendationGrouper::new(&self.catalog, self.group_policy_limit);
        Ok(grouper.group(&rows))
    }

    /// Infrastructure justification for each selected region of the latest run.
    pub fn region_reasons(
        &self,
        key: &RunKey,
        username: &str,
    ) -> Result<Vec<RegionReasonView>, RecommendationServiceError> {
        Ok(self
            .groups(key)?
            .into_iter()
            .map(|group| {
                let profile = self
                    .catalog
                    .infra_for(&group.selected_region_code)
                    .cloned()
                    .unwrap_or_else(|| RegionInfraProfile::unknown(&group.selected_region_code));
                RegionReasonView {
                    username: username.to_string(),
                    rank_group: group.rank_group,
                    region_display_name: group.region_display_name,
                    reasons: explain(&profile).into_iter().map(str::to_string).collect(),
                }
            })
            .collect())
    }

    // A stored run without rows is a successful run with nothing eligible.
    fn latest_rows(&self, key: &RunKey) -> Result<Vec<Recommendation>, RecommendationServiceError> {
        self.repository
            .latest(key)?
            .map(|stored| stored.rows)
            .ok_or_else(|| RecommendationServiceError::NotFound(key.clone()))
    }

    fn run_lock(&self, key: &RunKey) -> Result<Arc<Mutex<()>>, RepositoryError> {
        let mut locks = self
            .run_locks
            .lock()
            .map_err(|_| RepositoryError::Unavailable("run lock registry poisoned".into()))?;
        Ok(locks.entry(key.clone()).or_default().clone())
    }

    // Drops the registry entry once no other caller holds or waits on it. Clones are
    // only taken under the registry lock, so the count cannot grow during the check.
    fn release_run_lock(&self, key: &RunKey, lock: Arc<Mutex<()>>) {
        let Ok(mut locks) = self.run_locks.lock() else {
            return;
        };
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_run_locks(&self) -> usize {
        self.run_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationServiceError {
    #[error("no survey answers recorded for {0}")]
    SurveyNotFound(RunKey),
    #[error("no recommendations recorded for {0}")]
    NotFound(RunKey),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

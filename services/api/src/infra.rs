use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use youth_policy::recommendation::repository::latest_run;
use youth_policy::recommendation::{
    RecommendationRepository, RepositoryError, RunKey, StoredRun, SurveyAnswer,
    SurveyAnswerSource,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{what} mutex poisoned")))
}

/// Survey responses submitted through the API, kept for the life of the process.
#[derive(Default, Clone)]
pub(crate) struct InMemorySurveyStore {
    answers: Arc<Mutex<HashMap<RunKey, Vec<SurveyAnswer>>>>,
}

impl InMemorySurveyStore {
    /// Stores the answers of a response. Submitted responses are immutable, so a
    /// second submission for the same key is a conflict.
    pub(crate) fn record(
        &self,
        key: RunKey,
        answers: Vec<SurveyAnswer>,
    ) -> Result<(), RepositoryError> {
        match lock(&self.answers, "survey")?.entry(key) {
            Entry::Occupied(entry) => Err(RepositoryError::Conflict(format!(
                "survey answers already submitted for {}",
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                entry.insert(answers);
                Ok(())
            }
        }
    }
}

impl SurveyAnswerSource for InMemorySurveyStore {
    fn answers(&self, key: &RunKey) -> Result<Vec<SurveyAnswer>, RepositoryError> {
        let guard = lock(&self.answers, "survey")?;
        Ok(guard.get(key).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRecommendationRepository {
    runs: Arc<Mutex<HashMap<RunKey, Vec<StoredRun>>>>,
}

impl RecommendationRepository for InMemoryRecommendationRepository {
    fn replace(&self, key: &RunKey, run: StoredRun) -> Result<(), RepositoryError> {
        lock(&self.runs, "recommendation")?.insert(key.clone(), vec![run]);
        Ok(())
    }

    fn append(&self, key: &RunKey, run: StoredRun) -> Result<(), RepositoryError> {
        lock(&self.runs, "recommendation")?
            .entry(key.clone())
            .or_default()
            .push(run);
        Ok(())
    }

    fn latest(&self, key: &RunKey) -> Result<Option<StoredRun>, RepositoryError> {
        let guard = lock(&self.runs, "recommendation")?;
        Ok(guard.get(key).and_then(|runs| latest_run(runs)))
    }
}

/// Parses a `QUESTION=OPTION` pair; multi-select options may be joined with `,`.
pub(crate) fn parse_answer(raw: &str) -> Result<SurveyAnswer, String> {
    let (question, option) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=OPTION, got '{raw}'"))?;
    let (question, option) = (question.trim(), option.trim());
    if question.is_empty() || option.is_empty() {
        return Err(format!("question and option must both be set in '{raw}'"));
    }
    Ok(SurveyAnswer::new(question, option))
}

#[cfg(test)]
mod tests {
    use super::*;
    use youth_policy::recommendation::{Recommendation, ResponseId, UserId};

    fn stored(run: u64, policies: &[&str]) -> StoredRun {
        let computed_at = chrono::Utc::now();
        StoredRun {
            run,
            computed_at,
            rows: policies
                .iter()
                .map(|policy| Recommendation {
                    user_id: UserId("u".to_string()),
                    response_id: ResponseId("r".to_string()),
                    run,
                    computed_at,
                    region_code: "11000".to_string(),
                    policy_code: policy.to_string(),
                    rank_group: 1,
                    rank: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn parses_question_option_pairs() {
        let answer = parse_answer("Q3 = 0014002,0014005").expect("valid pair");
        assert_eq!(answer.question_id, "Q3");
        assert_eq!(answer.option_code, "0014002,0014005");

        assert!(parse_answer("Q1").is_err());
        assert!(parse_answer("=25").is_err());
        assert!(parse_answer("Q1=").is_err());
    }

    #[test]
    fn survey_store_rejects_resubmitted_answers() {
        let store = InMemorySurveyStore::default();
        let key = RunKey::new("u", "r");

        store
            .record(key.clone(), vec![SurveyAnswer::new("Q1", "25")])
            .expect("stored");
        let error = store
            .record(key.clone(), vec![SurveyAnswer::new("Q1", "60")])
            .expect_err("second submission");

        assert!(matches!(error, RepositoryError::Conflict(_)));
        let answers = store.answers(&key).expect("readable");
        assert_eq!(answers, vec![SurveyAnswer::new("Q1", "25")]);
        assert!(store
            .answers(&RunKey::new("u", "other"))
            .expect("readable")
            .is_empty());
    }

    #[test]
    fn repository_reads_only_the_latest_run() {
        let repository = InMemoryRecommendationRepository::default();
        let key = RunKey::new("u", "r");
        assert!(repository.latest(&key).expect("latest").is_none());

        repository.append(&key, stored(1, &["A"])).expect("append");
        repository.append(&key, stored(2, &[])).expect("append");
        let latest = repository.latest(&key).expect("latest").expect("run stored");
        assert_eq!(latest.run, 2);
        assert!(latest.rows.is_empty());

        repository.replace(&key, stored(3, &["C"])).expect("replace");
        let latest = repository.latest(&key).expect("latest").expect("run stored");
        assert_eq!(latest.rows[0].policy_code, "C");
    }
}

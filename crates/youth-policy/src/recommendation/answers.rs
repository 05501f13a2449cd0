use std::collections::HashMap;

use super::domain::SurveyAnswer;

/// Survey question identifiers consumed by the engine.
pub mod questions {
    pub const AGE: &str = "Q1";
    pub const SCHOOL: &str = "Q2";
    pub const BUSINESS: &str = "Q3";
    pub const MARITAL: &str = "Q4";
    pub const JOB: &str = "Q5";
    pub const BIG_CATEGORY: &str = "Q6";
    pub const MID_CATEGORY: &str = "Q7";
    pub const MEDICAL_INFRA: &str = "Q8";
    pub const MEDICAL_ACCESS: &str = "Q9";
    pub const TRANSPORT_PRIORITY: &str = "Q10";
    pub const TRANSPORT_GRADE: &str = "Q11";
    pub const HOUSING_PRIORITY: &str = "Q12";
    pub const HOUSING_GRADE: &str = "Q13";
}

const MULTI_SELECT_SEPARATOR: char = ',';

/// Lookup of one survey response, keyed by question id.
///
/// Answers to multi-select questions are joined with `,` in the order they were
/// supplied, so the same answer list always yields the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerIndex {
    answers: HashMap<String, String>,
}

impl AnswerIndex {
    pub fn from_answers<'a, I>(answers: I) -> Self
    where
        I: IntoIterator<Item = &'a SurveyAnswer>,
    {
        let mut index: HashMap<String, String> = HashMap::new();
        for answer in answers {
            index
                .entry(answer.question_id.clone())
                .and_modify(|joined| {
                    joined.push(MULTI_SELECT_SEPARATOR);
                    joined.push_str(&answer.option_code);
                })
                .or_insert_with(|| answer.option_code.clone());
        }
        Self { answers: index }
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    /// Age from `Q1`; absent or non-numeric answers count as 0.
    pub fn age(&self) -> u32 {
        self.get(questions::AGE)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Individual codes of a multi-select answer.
    pub fn codes<'a>(&'a self, question_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.get(question_id)
            .unwrap_or_default()
            .split(MULTI_SELECT_SEPARATOR)
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

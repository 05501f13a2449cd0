use super::super::answers::{questions, AnswerIndex};
use super::super::domain::PolicyCandidate;
use super::config::{CategoryMatch, InterestTable};

pub fn category_match(policy: &PolicyCandidate, answers: &AnswerIndex) -> CategoryMatch {
    let big = matches_answer(
        policy.big_category.as_deref(),
        answers.get(questions::BIG_CATEGORY),
    );
    let mid = matches_answer(
        policy.mid_category.as_deref(),
        answers.get(questions::MID_CATEGORY),
    );

    match (big, mid) {
        (true, true) => CategoryMatch::Both,
        (true, false) => CategoryMatch::BigOnly,
        (false, true) => CategoryMatch::MidOnly,
        (false, false) => CategoryMatch::Neither,
    }
}

pub fn score(policy: &PolicyCandidate, answers: &AnswerIndex, table: &InterestTable) -> f64 {
    table.score(category_match(policy, answers))
}

fn matches_answer(category: Option<&str>, answer: Option<&str>) -> bool {
    matches!((category, answer), (Some(category), Some(answer)) if category == answer)
}

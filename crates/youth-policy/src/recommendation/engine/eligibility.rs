use serde::{Deserialize, Serialize};

use super::super::answers::{questions, AnswerIndex};
use super::super::domain::{PolicyCandidate, Requirement};

/// First rule that excluded a policy for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ineligibility {
    BelowMinimumAge { minimum: u32, actual: u32 },
    AboveMaximumAge { maximum: u32, actual: u32 },
    SchoolLevel { required: String, actual: Option<String> },
    BusinessType { required: String },
    MaritalStatus { required: String },
    JobStatus { required: String },
}

impl Ineligibility {
    pub fn summary(&self) -> String {
        match self {
            Ineligibility::BelowMinimumAge { minimum, actual } => {
                format!("age {actual} below minimum {minimum}")
            }
            Ineligibility::AboveMaximumAge { maximum, actual } => {
                format!("age {actual} above maximum {maximum}")
            }
            Ineligibility::SchoolLevel { required, actual } => match actual {
                Some(actual) => format!("school level {actual} exceeds required {required}"),
                None => format!("school level unanswered (required {required})"),
            },
            Ineligibility::BusinessType { required } => {
                format!("business type {required} not selected")
            }
            Ineligibility::MaritalStatus { required } => {
                format!("marital status must be {required}")
            }
            Ineligibility::JobStatus { required } => format!("job status must be {required}"),
        }
    }
}

/// Applies every eligibility rule; the first failing rule is reported.
pub fn check(policy: &PolicyCandidate, answers: &AnswerIndex) -> Result<(), Ineligibility> {
    check_age(policy, answers.age())?;
    check_school(&policy.school, answers.get(questions::SCHOOL))?;
    check_business(&policy.business, answers)?;
    check_exact(&policy.marital, answers.get(questions::MARITAL))
        .map_err(|required| Ineligibility::MaritalStatus { required })?;
    check_exact(&policy.job, answers.get(questions::JOB))
        .map_err(|required| Ineligibility::JobStatus { required })?;
    Ok(())
}

pub fn is_eligible(policy: &PolicyCandidate, answers: &AnswerIndex) -> bool {
    check(policy, answers).is_ok()
}

fn check_age(policy: &PolicyCandidate, age: u32) -> Result<(), Ineligibility> {
    if policy.min_age > 0 && age < policy.min_age {
        return Err(Ineligibility::BelowMinimumAge {
            minimum: policy.min_age,
            actual: age,
        });
    }
    if policy.max_age > 0 && age > policy.max_age {
        return Err(Ineligibility::AboveMaximumAge {
            maximum: policy.max_age,
            actual: age,
        });
    }
    Ok(())
}

// School codes are ordered: a lower user code means the user meets a higher bar.
fn check_school(requirement: &Requirement, answer: Option<&str>) -> Result<(), Ineligibility> {
    let Some(required) = requirement.required_code() else {
        return Ok(());
    };

    let within = match (answer.and_then(parse_level), parse_level(required)) {
        (Some(actual), Some(required)) => actual <= required,
        _ => false,
    };

    if within {
        Ok(())
    } else {
        Err(Ineligibility::SchoolLevel {
            required: required.to_string(),
            actual: answer.map(str::to_string),
        })
    }
}

fn parse_level(code: &str) -> Option<u64> {
    code.trim().parse().ok()
}

fn check_business(requirement: &Requirement, answers: &AnswerIndex) -> Result<(), Ineligibility> {
    let Some(required) = requirement.required_code() else {
        return Ok(());
    };

    if answers
        .codes(questions::BUSINESS)
        .any(|code| code == required.trim())
    {
        Ok(())
    } else {
        Err(Ineligibility::BusinessType {
            required: required.to_string(),
        })
    }
}

fn check_exact(requirement: &Requirement, answer: Option<&str>) -> Result<(), String> {
    let Some(required) = requirement.required_code() else {
        return Ok(());
    };

    match answer {
        Some(answer) if answer.trim().eq_ignore_ascii_case(required.trim()) => Ok(()),
        _ => Err(required.to_string()),
    }
}

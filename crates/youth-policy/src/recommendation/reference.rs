//! Reference tables consumed by the engine, loaded from CSV exports.
//!
//! Sentinel codes in the policy table are resolved here so the rest of the crate
//! only sees [`Requirement`] and [`PolicyRegion`] variants.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use super::domain::{
    Grade, PolicyCandidate, PolicyDetail, PolicyRegion, Region, RegionInfraProfile, Requirement,
};

const SCHOOL_WILDCARD: &str = "0049010";
const BUSINESS_WILDCARD: &str = "0014010";
const MARITAL_WILDCARD: &str = "55003";
const JOB_WILDCARD: &str = "0013010";

pub const POLICIES_FILE: &str = "policies.csv";
pub const REGION_INFRA_FILE: &str = "region_infra.csv";
pub const REGIONS_FILE: &str = "regions.csv";
pub const POLICY_DETAILS_FILE: &str = "policy_details.csv";

#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("failed to open reference table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {table} data: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("region {region_code} appears more than once in the region infrastructure table")]
    DuplicateRegion { region_code: String },
}

/// Read-only snapshot of every table a recommendation run needs.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    policies: Vec<PolicyCandidate>,
    infra: Vec<RegionInfraProfile>,
    regions: HashMap<String, Region>,
    details: HashMap<String, PolicyDetail>,
}

impl ReferenceCatalog {
    pub fn new(
        policies: Vec<PolicyCandidate>,
        infra: Vec<RegionInfraProfile>,
        regions: Vec<Region>,
        details: Vec<PolicyDetail>,
    ) -> Self {
        Self {
            policies,
            infra,
            regions: regions
                .into_iter()
                .map(|region| (region.code.clone(), region))
                .collect(),
            details: details
                .into_iter()
                .map(|detail| (detail.policy_code.clone(), detail))
                .collect(),
        }
    }

    /// Loads the four standard table files from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ReferenceDataError> {
        let dir = dir.as_ref();
        Ok(Self::new(
            parse_policies(open(dir, POLICIES_FILE)?)?,
            parse_region_infra(open(dir, REGION_INFRA_FILE)?)?,
            parse_regions(open(dir, REGIONS_FILE)?)?,
            parse_policy_details(open(dir, POLICY_DETAILS_FILE)?)?,
        ))
    }

    pub fn policies(&self) -> &[PolicyCandidate] {
        &self.policies
    }

    /// Candidate regions in table order.
    pub fn infra_profiles(&self) -> &[RegionInfraProfile] {
        &self.infra
    }

    pub fn infra_for(&self, region_code: &str) -> Option<&RegionInfraProfile> {
        self.infra
            .iter()
            .find(|profile| profile.region_code == region_code)
    }

    pub fn region(&self, region_code: &str) -> Option<&Region> {
        self.regions.get(region_code)
    }

    pub fn policy_detail(&self, policy_code: &str) -> Option<&PolicyDetail> {
        self.details.get(policy_code)
    }
}

fn open(dir: &Path, file: &str) -> Result<File, ReferenceDataError> {
    let path = dir.join(file);
    File::open(&path).map_err(|source| ReferenceDataError::Io { path, source })
}

fn rows<R, T>(reader: R, table: &'static str) -> Result<Vec<T>, ReferenceDataError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<T>()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| ReferenceDataError::Csv { table, source })
}

pub fn parse_policies<R: Read>(reader: R) -> Result<Vec<PolicyCandidate>, ReferenceDataError> {
    let rows: Vec<PolicyRow> = rows(reader, "policy")?;
    Ok(rows.into_iter().map(PolicyRow::into_candidate).collect())
}

/// Each region may appear once; a repeated code would be scored as two candidates.
pub fn parse_region_infra<R: Read>(
    reader: R,
) -> Result<Vec<RegionInfraProfile>, ReferenceDataError> {
    let rows: Vec<RegionInfraRow> = rows(reader, "region infrastructure")?;
    let mut seen = HashSet::new();
    rows.into_iter()
        .map(|row| {
            if !seen.insert(row.region_code.clone()) {
                return Err(ReferenceDataError::DuplicateRegion {
                    region_code: row.region_code,
                });
            }
            Ok(RegionInfraProfile {
                region_code: row.region_code,
                medical_infra: parse_grade(row.medical_infra_grade),
                medical_access: parse_grade(row.medical_access_grade),
                transport: parse_grade(row.transport_grade),
                housing: parse_grade(row.housing_grade),
            })
        })
        .collect()
}

pub fn parse_regions<R: Read>(reader: R) -> Result<Vec<Region>, ReferenceDataError> {
    let rows: Vec<RegionRow> = rows(reader, "region")?;
    Ok(rows
        .into_iter()
        .map(|row| Region {
            code: row.region_code,
            name: row.region_name,
            description: row.description,
        })
        .collect())
}

pub fn parse_policy_details<R: Read>(reader: R) -> Result<Vec<PolicyDetail>, ReferenceDataError> {
    let rows: Vec<PolicyDetailRow> = rows(reader, "policy detail")?;
    Ok(rows
        .into_iter()
        .map(|row| PolicyDetail {
            policy_code: row.policy_code,
            title: row.title,
            summary: row.summary,
            agency: row.agency,
            apply_url: row.apply_url,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct PolicyRow {
    policy_code: String,
    region_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    min_age: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    max_age: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    school_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    biz_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    mrg_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    job_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    big_category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    mid_category: Option<String>,
}

impl PolicyRow {
    fn into_candidate(self) -> PolicyCandidate {
        PolicyCandidate {
            region: PolicyRegion::from_code(&self.region_code),
            policy_code: self.policy_code,
            min_age: parse_age(self.min_age.as_deref()),
            max_age: parse_age(self.max_age.as_deref()),
            school: requirement(self.school_code, SCHOOL_WILDCARD),
            business: requirement(self.biz_code, BUSINESS_WILDCARD),
            marital: requirement(self.mrg_code, MARITAL_WILDCARD),
            job: requirement(self.job_code, JOB_WILDCARD),
            big_category: self.big_category,
            mid_category: self.mid_category,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegionInfraRow {
    region_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    medical_infra_grade: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    medical_access_grade: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    transport_grade: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    housing_grade: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    region_code: String,
    region_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PolicyDetailRow {
    policy_code: String,
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    agency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    apply_url: Option<String>,
}

fn requirement(code: Option<String>, wildcard: &str) -> Requirement {
    match code {
        None => Requirement::Unconstrained,
        Some(code) if code == wildcard => Requirement::Wildcard,
        Some(code) => Requirement::Specific(code),
    }
}

// Ages outside the table's numeric range are treated as "no bound".
fn parse_age(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.parse().ok()).unwrap_or(0)
}

fn parse_grade(raw: Option<String>) -> Option<Grade> {
    raw.as_deref().and_then(Grade::parse)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

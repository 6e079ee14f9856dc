//! Core type definitions

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Hosting platform Codecov attributes a repository to
///
/// The string form is the path segment used by the Codecov v2 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CoverageService {
    /// github.com
    #[default]
    GitHub,
    /// GitHub Enterprise Server
    GitHubEnterprise,
    /// gitlab.com
    GitLab,
    /// Self-managed GitLab
    GitLabEnterprise,
    /// bitbucket.org
    Bitbucket,
    /// Bitbucket Server
    BitbucketServer,
}

impl CoverageService {
    /// Every known service, in declaration order
    pub const ALL: [CoverageService; 6] = [
        Self::GitHub,
        Self::GitHubEnterprise,
        Self::GitLab,
        Self::GitLabEnterprise,
        Self::Bitbucket,
        Self::BitbucketServer,
    ];

    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitHubEnterprise => "github_enterprise",
            Self::GitLab => "gitlab",
            Self::GitLabEnterprise => "gitlab_enterprise",
            Self::Bitbucket => "bitbucket",
            Self::BitbucketServer => "bitbucket_server",
        }
    }
}

impl fmt::Display for CoverageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| format!("unknown coverage service: {s}"))
    }
}

/// Coverage figure read from the coverage service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageReport {
    /// Percentage in `0.0..=100.0`, e.g. `87.5`
    pub coverage_percentage: f64,
}

/// Geckoboard field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Numeric value
    Number,
    /// ISO 8601 date-time
    Datetime,
}

/// One field declaration in a dataset schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Field type
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Display name
    pub name: &'static str,
    /// Omitted from the body when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Fields of the coverage dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaFields {
    /// Coverage percentage
    pub coverage: FieldSpec,
    /// Publish instant
    pub timestamp: FieldSpec,
}

/// Body of the dataset create/update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSchema {
    /// Field declarations
    pub fields: SchemaFields,
    /// Records sharing these field values replace each other
    pub unique_by: Vec<&'static str>,
}

impl DatasetSchema {
    /// The coverage-over-time schema: required number plus a unique timestamp
    pub fn coverage() -> Self {
        Self {
            fields: SchemaFields {
                coverage: FieldSpec {
                    kind: FieldType::Number,
                    name: "Coverage",
                    optional: Some(false),
                },
                timestamp: FieldSpec {
                    kind: FieldType::Datetime,
                    name: "Date",
                    optional: None,
                },
            },
            unique_by: vec!["timestamp"],
        }
    }
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self::coverage()
    }
}

/// One coverage record appended to the dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    /// Coverage percentage
    pub coverage: f64,
    /// Publish instant
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl DataPoint {
    /// Build a record stamped with the current wall-clock time
    pub fn now(report: CoverageReport) -> Self {
        Self::at(report, Utc::now())
    }

    /// Build a record for a fixed instant
    pub fn at(report: CoverageReport, timestamp: DateTime<Utc>) -> Self {
        Self {
            coverage: report.coverage_percentage,
            timestamp,
        }
    }
}

/// `2024-05-01T12:30:00.000Z`, the shape Geckoboard and JavaScript dates agree on
fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Body of the append call; Geckoboard expects a `data` array
#[derive(Debug, Serialize)]
pub struct DataPayload<'a> {
    /// Records to append
    pub data: [&'a DataPoint; 1],
}

impl<'a> DataPayload<'a> {
    /// Wrap a single record
    pub fn single(point: &'a DataPoint) -> Self {
        Self { data: [point] }
    }
}

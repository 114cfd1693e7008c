use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the raw `subscribers` table, untouched apart from SQL-value
/// stringification. Numeric columns arrive as NULL, numbers, or free text;
/// coercion happens during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubscriber {
    pub uuid: i64,
    pub dob: String,
    /// Serialized mapping holding name, email and phone.
    pub contact_info: String,
    /// Single comma-delimited string: street, city, state, zip.
    pub mailing_address: String,
    pub job_id: Option<String>,
    pub current_career_path_id: Option<String>,
    pub num_course_taken: Option<String>,
    pub time_spent_hrs: Option<String>,
}

/// A subscriber row after normalization: derived fields computed, contact
/// info and address flattened, numerics coerced but not yet defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSubscriber {
    pub uuid: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub age: i64,
    pub age_group: i64,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub job_id: Option<f64>,
    pub current_career_path_id: Option<f64>,
    pub num_course_taken: Option<f64>,
    pub time_spent_hrs: Option<f64>,
}

/// A usable subscriber row: the null-based checks passed and policy
/// defaults have been applied, so every numeric is concrete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanSubscriber {
    pub uuid: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub age: i64,
    pub age_group: i64,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub job_id: f64,
    pub current_career_path_id: f64,
    pub num_course_taken: f64,
    pub time_spent_hrs: f64,
}

/// Career path lookup row. A sentinel `{0, "not_applicable", 0}` exists
/// exactly once after preparation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CareerPath {
    pub career_path_id: i64,
    pub career_path_name: String,
    pub hours_to_complete: i64,
}

/// Job lookup row. Exact duplicates are removed during preparation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: i64,
    pub job_category: String,
    pub avg_salary: i64,
}

/// The left-join of a cleansed subscriber with its resolved career path
/// and job. Unit of the cleansed store: created once per uuid, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub uuid: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub age: i64,
    pub age_group: i64,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub num_course_taken: f64,
    pub time_spent_hrs: f64,
    pub current_career_path_id: f64,
    pub career_path_name: String,
    pub hours_to_complete: i64,
    pub job_id: f64,
    pub job_category: String,
    pub avg_salary: i64,
}

/// Why a subscriber row was routed to quarantine instead of the cleansed
/// store. Malformed per-row data quarantines rather than aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefectReason {
    MissingCourseCount,
    MissingJobId,
    MalformedAddress,
    MalformedContactInfo,
    UnparseableDob,
}

impl DefectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectReason::MissingCourseCount => "missing_course_count",
            DefectReason::MissingJobId => "missing_job_id",
            DefectReason::MalformedAddress => "malformed_address",
            DefectReason::MalformedContactInfo => "malformed_contact_info",
            DefectReason::UnparseableDob => "unparseable_dob",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "missing_course_count" => Some(DefectReason::MissingCourseCount),
            "missing_job_id" => Some(DefectReason::MissingJobId),
            "malformed_address" => Some(DefectReason::MalformedAddress),
            "malformed_contact_info" => Some(DefectReason::MalformedContactInfo),
            "unparseable_dob" => Some(DefectReason::UnparseableDob),
            _ => None,
        }
    }
}

impl fmt::Display for DefectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscriber row that failed a usability check, kept with its raw field
/// values so remediation can re-ingest it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantinedRecord {
    pub subscriber: RawSubscriber,
    pub reason: DefectReason,
}

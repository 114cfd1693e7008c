//! Reference Table Preparer: makes the lookup tables total so every
//! foreign key among usable subscribers resolves.

use std::collections::HashSet;

use crate::domain::{CareerPath, JobRecord};

pub const SENTINEL_CAREER_PATH_ID: i64 = 0;
pub const SENTINEL_CAREER_PATH_NAME: &str = "not_applicable";

/// Insert the "not applicable" sentinel if no row with its id exists.
/// Idempotent: repeated preparation never duplicates the sentinel.
pub fn prepare_career_paths(mut paths: Vec<CareerPath>) -> Vec<CareerPath> {
    let has_sentinel = paths
        .iter()
        .any(|p| p.career_path_id == SENTINEL_CAREER_PATH_ID);
    if !has_sentinel {
        paths.push(CareerPath {
            career_path_id: SENTINEL_CAREER_PATH_ID,
            career_path_name: SENTINEL_CAREER_PATH_NAME.to_string(),
            hours_to_complete: 0,
        });
    }
    paths
}

/// Drop exact duplicate job rows (all-column equality), keeping first
/// occurrence order.
pub fn prepare_jobs(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert(job.clone()))
        .collect()
}

//! Orchestrator: one invocation performs one full
//! read–transform–validate–write cycle against the configured stores.

use std::collections::HashMap;

use chrono::Local;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::changelog;
use crate::cleanse;
use crate::config::PipelineConfig;
use crate::delta;
use crate::domain::{AggregatedRecord, CareerPath, CleanSubscriber, JobRecord};
use crate::error::Result;
use crate::reference;
use crate::store::{CleansedStore, RawStore};
use crate::validate::{self, ValidationFailure};

/// Result of a complete pipeline run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub rows_added: usize,
    pub rows_quarantined: usize,
    /// Changelog version written, None when the run produced no new data.
    pub version: Option<u32>,
}

/// Left-join usable subscribers with the prepared reference tables. Rows
/// whose foreign keys do not resolve are returned as orphan uuids; the
/// null-freedom check turns any orphan into a run abort.
pub fn join_references(
    usable: &[CleanSubscriber],
    paths: &[CareerPath],
    jobs: &[JobRecord],
) -> (Vec<AggregatedRecord>, Vec<i64>) {
    let path_by_id: HashMap<i64, &CareerPath> =
        paths.iter().map(|p| (p.career_path_id, p)).collect();
    let job_by_id: HashMap<i64, &JobRecord> = jobs.iter().map(|j| (j.job_id, j)).collect();

    let mut joined = Vec::with_capacity(usable.len());
    let mut orphans = Vec::new();

    for s in usable {
        let path = path_by_id.get(&(s.current_career_path_id as i64));
        let job = job_by_id.get(&(s.job_id as i64));
        match (path, job) {
            (Some(path), Some(job)) => joined.push(AggregatedRecord {
                uuid: s.uuid,
                name: s.name.clone(),
                dob: s.dob,
                age: s.age,
                age_group: s.age_group,
                email: s.email.clone(),
                phone: s.phone.clone(),
                street: s.street.clone(),
                city: s.city.clone(),
                state: s.state.clone(),
                zip_code: s.zip_code.clone(),
                num_course_taken: s.num_course_taken,
                time_spent_hrs: s.time_spent_hrs,
                current_career_path_id: s.current_career_path_id,
                career_path_name: path.career_path_name.clone(),
                hours_to_complete: path.hours_to_complete,
                job_id: s.job_id,
                job_category: job.job_category.clone(),
                avg_salary: job.avg_salary,
            }),
            _ => orphans.push(s.uuid),
        }
    }

    (joined, orphans)
}

fn gate(check: std::result::Result<(), ValidationFailure>) -> Result<()> {
    check.map_err(|failure| {
        error!(%failure, "validation failed, aborting run without commit");
        failure.into()
    })
}

/// Run the complete pipeline once.
#[instrument(skip(config))]
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let raw = RawStore::open(config.raw_db_path())?;
    let subscribers = raw.read_subscribers()?;
    let career_paths = raw.read_career_paths()?;
    let jobs = raw.read_jobs()?;
    info!(
        subscribers = subscribers.len(),
        career_paths = career_paths.len(),
        jobs = jobs.len(),
        "raw snapshot read"
    );

    let mut cleansed = CleansedStore::open(config.cleansed_db_path())?;
    let committed = cleansed.aggregated_keys()?;
    let quarantined = cleansed.quarantined_keys()?;

    let fresh = delta::select_new(subscribers, &committed, |s| s.uuid);
    info!(new_subscribers = fresh.len(), "delta selected");

    let today = Local::now().date_naive();
    let outcome = cleanse::partition(&fresh, today);

    let new_defective = delta::select_new(outcome.defective, &quarantined, |q| q.subscriber.uuid);
    if !new_defective.is_empty() {
        cleansed.append_quarantined(&new_defective)?;
    }

    if outcome.usable.is_empty() {
        info!("no new data");
        return Ok(RunSummary {
            rows_added: 0,
            rows_quarantined: new_defective.len(),
            version: None,
        });
    }

    let career_paths = reference::prepare_career_paths(career_paths);
    let jobs = reference::prepare_jobs(jobs);

    gate(validate::check_job_refs(&outcome.usable, &jobs))?;
    gate(validate::check_career_path_refs(&outcome.usable, &career_paths))?;

    let (joined, orphans) = join_references(&outcome.usable, &career_paths, &jobs);

    if !committed.is_empty() {
        let existing = cleansed.aggregated_columns()?;
        gate(validate::check_schema(
            &existing,
            &CleansedStore::expected_columns(),
        ))?;
    }
    gate(validate::check_null_free(&orphans))?;

    cleansed.append_aggregated(&joined)?;
    let exported = cleansed.export_csv(config.export_csv_path())?;
    info!(rows = exported, "export snapshot rewritten");

    let version = changelog::prepend_entry(
        &config.changelog_path,
        joined.len(),
        new_defective.len(),
    )?;
    info!(version, rows_added = joined.len(), "run committed");

    Ok(RunSummary {
        rows_added: joined.len(),
        rows_quarantined: new_defective.len(),
        version: Some(version),
    })
}

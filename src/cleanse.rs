//! Record Cleanser: normalizes a batch and partitions it into usable rows
//! and defective rows bound for quarantine.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{CleanSubscriber, DefectReason, QuarantinedRecord, RawSubscriber};
use crate::normalize;

/// Result of cleansing one batch. The defective set is kept, not dropped;
/// it becomes quarantine input.
#[derive(Debug, Default)]
pub struct CleanseOutcome {
    pub usable: Vec<CleanSubscriber>,
    pub defective: Vec<QuarantinedRecord>,
}

/// Partition a raw batch. A row is defective when normalization reports a
/// per-row defect, or when `num_course_taken` or `job_id` is null after
/// coercion. Missing `current_career_path_id` / `time_spent_hrs` are not
/// disqualifying; they default to 0.
pub fn partition(rows: &[RawSubscriber], today: NaiveDate) -> CleanseOutcome {
    let mut outcome = CleanseOutcome::default();

    for raw in rows {
        let normalized = match normalize::normalize(raw, today) {
            Ok(row) => row,
            Err(reason) => {
                debug!(uuid = raw.uuid, %reason, "row quarantined");
                outcome.defective.push(QuarantinedRecord {
                    subscriber: raw.clone(),
                    reason,
                });
                continue;
            }
        };

        let reason = if normalized.num_course_taken.is_none() {
            Some(DefectReason::MissingCourseCount)
        } else if normalized.job_id.is_none() {
            Some(DefectReason::MissingJobId)
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(uuid = raw.uuid, %reason, "row quarantined");
            outcome.defective.push(QuarantinedRecord {
                subscriber: raw.clone(),
                reason,
            });
            continue;
        }

        outcome.usable.push(CleanSubscriber {
            uuid: normalized.uuid,
            name: normalized.name,
            dob: normalized.dob,
            age: normalized.age,
            age_group: normalized.age_group,
            email: normalized.email,
            phone: normalized.phone,
            street: normalized.street,
            city: normalized.city,
            state: normalized.state,
            zip_code: normalized.zip_code,
            job_id: normalized.job_id.unwrap_or(0.0),
            current_career_path_id: normalized.current_career_path_id.unwrap_or(0.0),
            num_course_taken: normalized.num_course_taken.unwrap_or(0.0),
            time_spent_hrs: normalized.time_spent_hrs.unwrap_or(0.0),
        });
    }

    outcome
}

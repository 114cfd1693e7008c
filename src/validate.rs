//! Integrity Validator: typed check outcomes that must all pass before a
//! commit is allowed. Each check returns a structured failure with its
//! diagnostic payload; the orchestrator logs and aborts, leaving persisted
//! state untouched.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::domain::{CareerPath, CleanSubscriber, JobRecord};

/// A named column with its declared SQL type, used for schema-stability
/// comparison between the existing store and the batch about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub decl_type: String,
}

impl ColumnDef {
    pub fn new(name: &str, decl_type: &str) -> Self {
        Self {
            name: name.to_string(),
            decl_type: decl_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMismatch {
    pub column: String,
    pub existing: String,
    pub batch: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("missing career_path_id(s) {missing:?} in career paths table")]
    MissingCareerPaths { missing: Vec<i64> },

    #[error("missing job_id(s) {missing:?} in jobs table")]
    MissingJobs { missing: Vec<i64> },

    #[error("{count} joined row(s) contain unresolved reference fields, uuids {uuids:?}")]
    NullsInJoin { count: usize, uuids: Vec<i64> },

    #[error("column count mismatch: existing store has {existing} column(s), batch has {batch}")]
    ColumnCountMismatch { existing: usize, batch: usize },

    #[error("column type mismatch: {mismatches:?}")]
    SchemaMismatch { mismatches: Vec<ColumnMismatch> },
}

/// Every distinct career path id among usable rows must resolve in the
/// prepared career path table.
pub fn check_career_path_refs(
    usable: &[CleanSubscriber],
    paths: &[CareerPath],
) -> Result<(), ValidationFailure> {
    let known: HashSet<i64> = paths.iter().map(|p| p.career_path_id).collect();
    let missing: BTreeSet<i64> = usable
        .iter()
        .map(|s| s.current_career_path_id as i64)
        .filter(|id| !known.contains(id))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::MissingCareerPaths {
            missing: missing.into_iter().collect(),
        })
    }
}

/// Every distinct job id among usable rows must resolve in the prepared
/// jobs table.
pub fn check_job_refs(
    usable: &[CleanSubscriber],
    jobs: &[JobRecord],
) -> Result<(), ValidationFailure> {
    let known: HashSet<i64> = jobs.iter().map(|j| j.job_id).collect();
    let missing: BTreeSet<i64> = usable
        .iter()
        .map(|s| s.job_id as i64)
        .filter(|id| !known.contains(id))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::MissingJobs {
            missing: missing.into_iter().collect(),
        })
    }
}

/// Null-freedom over the joined batch: any join orphan means an unresolved
/// foreign key slipped past the referential checks and the run must abort.
pub fn check_null_free(orphan_uuids: &[i64]) -> Result<(), ValidationFailure> {
    if orphan_uuids.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::NullsInJoin {
            count: orphan_uuids.len(),
            uuids: orphan_uuids.to_vec(),
        })
    }
}

/// Schema stability: the existing aggregated table must carry the same
/// column count and per-column declared types as the batch layout. Only
/// meaningful when a prior cleansed store exists; the caller gates on that.
pub fn check_schema(existing: &[ColumnDef], batch: &[ColumnDef]) -> Result<(), ValidationFailure> {
    if existing.len() != batch.len() {
        return Err(ValidationFailure::ColumnCountMismatch {
            existing: existing.len(),
            batch: batch.len(),
        });
    }

    let mut mismatches = Vec::new();
    for expected in batch {
        let found = existing.iter().find(|c| c.name == expected.name);
        match found {
            Some(col) if col.decl_type.eq_ignore_ascii_case(&expected.decl_type) => {}
            Some(col) => mismatches.push(ColumnMismatch {
                column: expected.name.clone(),
                existing: col.decl_type.clone(),
                batch: expected.decl_type.clone(),
            }),
            None => mismatches.push(ColumnMismatch {
                column: expected.name.clone(),
                existing: "<absent>".to_string(),
                batch: expected.decl_type.clone(),
            }),
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::SchemaMismatch { mismatches })
    }
}

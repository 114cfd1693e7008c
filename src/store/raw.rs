//! Read-only access to the raw snapshot source: three SQLite tables read
//! in full on every run.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::Connection;

use crate::domain::{CareerPath, JobRecord, RawSubscriber};
use crate::error::Result;

pub struct RawStore {
    conn: Connection,
}

/// Stringify a raw SQL value so type coercion stays a normalization
/// concern. NULL and blobs map to None.
fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(_) => None,
    }
}

impl RawStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn read_subscribers(&self) -> Result<Vec<RawSubscriber>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, dob, contact_info, mailing_address, job_id,
                    current_career_path_id, num_course_taken, time_spent_hrs
             FROM subscribers",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RawSubscriber {
                uuid: row.get(0)?,
                dob: row.get::<_, Value>(1).map(text_of)?.unwrap_or_default(),
                contact_info: row.get::<_, Value>(2).map(text_of)?.unwrap_or_default(),
                mailing_address: row.get::<_, Value>(3).map(text_of)?.unwrap_or_default(),
                job_id: row.get::<_, Value>(4).map(text_of)?,
                current_career_path_id: row.get::<_, Value>(5).map(text_of)?,
                num_course_taken: row.get::<_, Value>(6).map(text_of)?,
                time_spent_hrs: row.get::<_, Value>(7).map(text_of)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn read_career_paths(&self) -> Result<Vec<CareerPath>> {
        let mut stmt = self.conn.prepare(
            "SELECT career_path_id, career_path_name, hours_to_complete FROM career_paths",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CareerPath {
                career_path_id: row.get(0)?,
                career_path_name: row.get(1)?,
                hours_to_complete: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn read_jobs(&self) -> Result<Vec<JobRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT job_id, job_category, avg_salary FROM jobs")?;
        let rows = stmt.query_map([], |row| {
            Ok(JobRecord {
                job_id: row.get(0)?,
                job_category: row.get(1)?,
                avg_salary: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_columns_read_as_nullable_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.db");

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE subscribers (
                uuid INTEGER PRIMARY KEY,
                dob TEXT,
                contact_info TEXT,
                mailing_address TEXT,
                job_id,
                current_career_path_id,
                num_course_taken,
                time_spent_hrs
            );
            INSERT INTO subscribers VALUES
                (1, '1990-01-01', '{}', 'a, b, c, d', 2, NULL, '5', 3.5);
            "#,
        )
        .unwrap();
        drop(conn);

        let store = RawStore::open(&path).unwrap();
        let rows = store.read_subscribers().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job_id.as_deref(), Some("2"));
        assert_eq!(rows[0].current_career_path_id, None);
        assert_eq!(rows[0].num_course_taken.as_deref(), Some("5"));
        assert_eq!(rows[0].time_spent_hrs.as_deref(), Some("3.5"));
    }
}

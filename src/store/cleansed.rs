//! The cleansed sink: aggregated and quarantine tables in one SQLite
//! database, plus the flat CSV export snapshot. Appends are transactional
//! and keyed reads back the delta selection.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::info;

use crate::domain::{AggregatedRecord, DefectReason, QuarantinedRecord, RawSubscriber};
use crate::error::Result;
use crate::validate::ColumnDef;

/// Column layout of the aggregated table; the schema-stability gate
/// compares an existing store against this.
const AGGREGATED_COLUMNS: &[(&str, &str)] = &[
    ("uuid", "INTEGER"),
    ("name", "TEXT"),
    ("dob", "TEXT"),
    ("age", "INTEGER"),
    ("age_group", "INTEGER"),
    ("email", "TEXT"),
    ("phone", "TEXT"),
    ("street", "TEXT"),
    ("city", "TEXT"),
    ("state", "TEXT"),
    ("zip_code", "TEXT"),
    ("num_course_taken", "REAL"),
    ("time_spent_hrs", "REAL"),
    ("current_career_path_id", "REAL"),
    ("career_path_name", "TEXT"),
    ("hours_to_complete", "INTEGER"),
    ("job_id", "REAL"),
    ("job_category", "TEXT"),
    ("avg_salary", "INTEGER"),
];

pub struct CleansedStore {
    conn: Connection,
}

impl CleansedStore {
    /// Open (or create) the cleansed database. A missing store is an empty
    /// baseline, not an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS aggregated (
                uuid INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                dob TEXT NOT NULL,
                age INTEGER NOT NULL,
                age_group INTEGER NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                street TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                zip_code TEXT NOT NULL,
                num_course_taken REAL NOT NULL,
                time_spent_hrs REAL NOT NULL,
                current_career_path_id REAL NOT NULL,
                career_path_name TEXT NOT NULL,
                hours_to_complete INTEGER NOT NULL,
                job_id REAL NOT NULL,
                job_category TEXT NOT NULL,
                avg_salary INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS quarantine (
                uuid INTEGER PRIMARY KEY,
                dob TEXT,
                contact_info TEXT,
                mailing_address TEXT,
                job_id TEXT,
                current_career_path_id TEXT,
                num_course_taken TEXT,
                time_spent_hrs TEXT,
                reason TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    /// The batch column layout appended by this store.
    pub fn expected_columns() -> Vec<ColumnDef> {
        AGGREGATED_COLUMNS
            .iter()
            .map(|(name, decl_type)| ColumnDef::new(name, decl_type))
            .collect()
    }

    /// The existing aggregated table's columns, from SQLite's own catalog.
    pub fn aggregated_columns(&self) -> Result<Vec<ColumnDef>> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(aggregated)")?;
        let cols = stmt.query_map([], |row| {
            Ok(ColumnDef {
                name: row.get(1)?,
                decl_type: row.get(2)?,
            })
        })?;
        Ok(cols.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn aggregated_keys(&self) -> Result<HashSet<i64>> {
        self.keys_of("SELECT uuid FROM aggregated")
    }

    pub fn quarantined_keys(&self) -> Result<HashSet<i64>> {
        self.keys_of("SELECT uuid FROM quarantine")
    }

    fn keys_of(&self, sql: &str) -> Result<HashSet<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let keys = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        Ok(keys.collect::<rusqlite::Result<HashSet<_>>>()?)
    }

    /// Append the joined batch inside one transaction.
    pub fn append_aggregated(&mut self, rows: &[AggregatedRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO aggregated (
                    uuid, name, dob, age, age_group, email, phone,
                    street, city, state, zip_code,
                    num_course_taken, time_spent_hrs,
                    current_career_path_id, career_path_name, hours_to_complete,
                    job_id, job_category, avg_salary
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                          ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            )?;
            for r in rows {
                stmt.execute(params![
                    r.uuid,
                    r.name,
                    r.dob.to_string(),
                    r.age,
                    r.age_group,
                    r.email,
                    r.phone,
                    r.street,
                    r.city,
                    r.state,
                    r.zip_code,
                    r.num_course_taken,
                    r.time_spent_hrs,
                    r.current_career_path_id,
                    r.career_path_name,
                    r.hours_to_complete,
                    r.job_id,
                    r.job_category,
                    r.avg_salary,
                ])?;
            }
        }
        tx.commit()?;
        info!(rows = rows.len(), "appended aggregated rows");
        Ok(())
    }

    /// Append new quarantine rows inside one transaction.
    pub fn append_quarantined(&mut self, rows: &[QuarantinedRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO quarantine (
                    uuid, dob, contact_info, mailing_address, job_id,
                    current_career_path_id, num_course_taken, time_spent_hrs, reason
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for r in rows {
                let s = &r.subscriber;
                stmt.execute(params![
                    s.uuid,
                    s.dob,
                    s.contact_info,
                    s.mailing_address,
                    s.job_id,
                    s.current_career_path_id,
                    s.num_course_taken,
                    s.time_spent_hrs,
                    r.reason.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        info!(rows = rows.len(), "appended quarantined rows");
        Ok(())
    }

    /// Read the full aggregated table back, insertion order.
    pub fn read_aggregated(&self) -> Result<Vec<AggregatedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, dob, age, age_group, email, phone,
                    street, city, state, zip_code,
                    num_course_taken, time_spent_hrs,
                    current_career_path_id, career_path_name, hours_to_complete,
                    job_id, job_category, avg_salary
             FROM aggregated ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            let dob_text: String = row.get(2)?;
            let dob = NaiveDate::parse_from_str(&dob_text, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(AggregatedRecord {
                uuid: row.get(0)?,
                name: row.get(1)?,
                dob,
                age: row.get(3)?,
                age_group: row.get(4)?,
                email: row.get(5)?,
                phone: row.get(6)?,
                street: row.get(7)?,
                city: row.get(8)?,
                state: row.get(9)?,
                zip_code: row.get(10)?,
                num_course_taken: row.get(11)?,
                time_spent_hrs: row.get(12)?,
                current_career_path_id: row.get(13)?,
                career_path_name: row.get(14)?,
                hours_to_complete: row.get(15)?,
                job_id: row.get(16)?,
                job_category: row.get(17)?,
                avg_salary: row.get(18)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Read the full quarantine table back, insertion order.
    pub fn read_quarantined(&self) -> Result<Vec<QuarantinedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, dob, contact_info, mailing_address, job_id,
                    current_career_path_id, num_course_taken, time_spent_hrs, reason
             FROM quarantine ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            let reason_text: String = row.get(8)?;
            let reason = DefectReason::from_str(&reason_text).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    format!("unknown defect reason: {reason_text}").into(),
                )
            })?;
            Ok(QuarantinedRecord {
                subscriber: RawSubscriber {
                    uuid: row.get(0)?,
                    dob: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    contact_info: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    mailing_address: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    job_id: row.get(4)?,
                    current_career_path_id: row.get(5)?,
                    num_course_taken: row.get(6)?,
                    time_spent_hrs: row.get(7)?,
                },
                reason,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overwrite the flat export snapshot with the full aggregated table.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let rows = self.read_aggregated()?;
        let mut writer = csv::Writer::from_path(path)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DefectReason;

    fn record(uuid: i64) -> AggregatedRecord {
        AggregatedRecord {
            uuid,
            name: "Test Person".to_string(),
            dob: NaiveDate::from_ymd_opt(1992, 4, 3).unwrap(),
            age: 32,
            age_group: 30,
            email: "t@example.com".to_string(),
            phone: "555-0101".to_string(),
            street: "1 Main St".to_string(),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            zip_code: "97201".to_string(),
            num_course_taken: 5.0,
            time_spent_hrs: 12.5,
            current_career_path_id: 1.0,
            career_path_name: "data engineering".to_string(),
            hours_to_complete: 20,
            job_id: 2.0,
            job_category: "analyst".to_string(),
            avg_salary: 70000,
        }
    }

    #[test]
    fn aggregated_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CleansedStore::open(dir.path().join("cleansed.db")).unwrap();

        store.append_aggregated(&[record(1), record(2)]).unwrap();
        let keys = store.aggregated_keys().unwrap();
        assert_eq!(keys, [1, 2].into_iter().collect());

        let rows = store.read_aggregated().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], record(1));
    }

    #[test]
    fn quarantine_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CleansedStore::open(dir.path().join("cleansed.db")).unwrap();

        let quarantined = QuarantinedRecord {
            subscriber: RawSubscriber {
                uuid: 9,
                dob: "1990-01-01".to_string(),
                contact_info: "{}".to_string(),
                mailing_address: "a, b, c".to_string(),
                job_id: None,
                current_career_path_id: None,
                num_course_taken: Some("4".to_string()),
                time_spent_hrs: None,
            },
            reason: DefectReason::MalformedAddress,
        };
        store.append_quarantined(std::slice::from_ref(&quarantined)).unwrap();

        assert_eq!(store.quarantined_keys().unwrap(), [9].into_iter().collect());
        assert_eq!(store.read_quarantined().unwrap(), vec![quarantined]);
    }

    #[test]
    fn catalog_columns_match_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CleansedStore::open(dir.path().join("cleansed.db")).unwrap();

        let existing = store.aggregated_columns().unwrap();
        let expected = CleansedStore::expected_columns();
        assert_eq!(existing.len(), expected.len());
        for (found, wanted) in existing.iter().zip(&expected) {
            assert_eq!(found.name, wanted.name);
            assert!(found.decl_type.eq_ignore_ascii_case(&wanted.decl_type));
        }
    }

    #[test]
    fn csv_export_overwrites_with_full_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CleansedStore::open(dir.path().join("cleansed.db")).unwrap();
        let csv_path = dir.path().join("export.csv");

        store.append_aggregated(&[record(1)]).unwrap();
        assert_eq!(store.export_csv(&csv_path).unwrap(), 1);

        store.append_aggregated(&[record(2)]).unwrap();
        assert_eq!(store.export_csv(&csv_path).unwrap(), 2);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        // header + two data lines
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().next().unwrap().starts_with("uuid,name,dob"));
    }
}

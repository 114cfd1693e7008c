//! Per-row schema normalization: derived fields, flattening of the
//! contact-info mapping, address splitting and numeric coercion. Pure;
//! the caller supplies "today" so age math is deterministic under test.

use chrono::{Datelike, NaiveDate};

use crate::domain::{DefectReason, NormalizedSubscriber, RawSubscriber};

/// Whole years between `dob` and `today`, using exact month/day comparison:
/// the year is not counted until the birthday has actually passed.
pub fn compute_age(dob: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = i64::from(today.year()) - i64::from(dob.year());
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Decade bucket: 0, 10, 20, ...
pub fn age_bucket(age: i64) -> i64 {
    (age / 10) * 10
}

/// Coerce a raw SQL value to a nullable float. Empty or non-numeric text
/// coerces to None rather than failing the row.
pub fn coerce_numeric(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// The flattened fields of the serialized contact-info mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Parse the serialized contact-info mapping. The source serializes a
/// mapping that is usually valid JSON; single-quoted variants are
/// normalized before a retry.
pub fn parse_contact_info(raw: &str) -> Result<ContactInfo, DefectReason> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&raw.replace('\'', "\"")))
        .map_err(|_| DefectReason::MalformedContactInfo)?;

    let object = value.as_object().ok_or(DefectReason::MalformedContactInfo)?;
    let field = |key: &str| {
        object
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    Ok(ContactInfo {
        name: field("name"),
        email: field("email"),
        phone: field("phone"),
    })
}

/// The four components of a mailing address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Split a mailing address on commas into exactly four parts. Any other
/// part count is a per-row defect, not a run failure.
pub fn split_mailing_address(raw: &str) -> Result<MailingAddress, DefectReason> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [street, city, state, zip_code] => Ok(MailingAddress {
            street: (*street).to_string(),
            city: (*city).to_string(),
            state: (*state).to_string(),
            zip_code: (*zip_code).to_string(),
        }),
        _ => Err(DefectReason::MalformedAddress),
    }
}

/// Normalize one raw subscriber row. Defects are returned, never panicked;
/// the cleanser routes them to quarantine.
pub fn normalize(
    raw: &RawSubscriber,
    today: NaiveDate,
) -> Result<NormalizedSubscriber, DefectReason> {
    let dob = NaiveDate::parse_from_str(raw.dob.trim(), "%Y-%m-%d")
        .map_err(|_| DefectReason::UnparseableDob)?;
    let contact = parse_contact_info(&raw.contact_info)?;
    let address = split_mailing_address(&raw.mailing_address)?;

    let age = compute_age(dob, today);

    Ok(NormalizedSubscriber {
        uuid: raw.uuid,
        name: contact.name,
        dob,
        age,
        age_group: age_bucket(age),
        email: contact.email,
        phone: contact.phone,
        street: address.street,
        city: address.city,
        state: address.state,
        zip_code: address.zip_code,
        job_id: coerce_numeric(raw.job_id.as_deref()),
        current_career_path_id: coerce_numeric(raw.current_career_path_id.as_deref()),
        num_course_taken: coerce_numeric(raw.num_course_taken.as_deref()),
        time_spent_hrs: coerce_numeric(raw.time_spent_hrs.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_not_counted_until_birthday_passes() {
        let dob = date(2000, 6, 15);
        assert_eq!(compute_age(dob, date(2024, 6, 14)), 23);
        assert_eq!(compute_age(dob, date(2024, 6, 15)), 24);
        assert_eq!(compute_age(dob, date(2024, 6, 16)), 24);
    }

    #[test]
    fn age_buckets_floor_to_decade() {
        assert_eq!(age_bucket(27), 20);
        assert_eq!(age_bucket(30), 30);
        assert_eq!(age_bucket(9), 0);
    }

    #[test]
    fn numeric_coercion_tolerates_garbage() {
        assert_eq!(coerce_numeric(Some("4")), Some(4.0));
        assert_eq!(coerce_numeric(Some(" 7.5 ")), Some(7.5));
        assert_eq!(coerce_numeric(Some("")), None);
        assert_eq!(coerce_numeric(Some("n/a")), None);
        assert_eq!(coerce_numeric(None), None);
    }

    #[test]
    fn contact_info_parses_json_and_single_quoted_variants() {
        let json = r#"{"name": "Ada Lovelace", "email": "ada@example.com", "phone": "555-0100"}"#;
        let parsed = parse_contact_info(json).unwrap();
        assert_eq!(parsed.name, "Ada Lovelace");
        assert_eq!(parsed.email, "ada@example.com");

        let pyish = "{'name': 'Ada Lovelace', 'email': 'ada@example.com', 'phone': '555-0100'}";
        assert_eq!(parse_contact_info(pyish).unwrap(), parsed);

        assert_eq!(
            parse_contact_info("not a mapping"),
            Err(DefectReason::MalformedContactInfo)
        );
    }

    #[test]
    fn address_must_split_into_exactly_four_parts() {
        let ok = split_mailing_address("12 Elm St, Springfield, IL, 62704").unwrap();
        assert_eq!(ok.street, "12 Elm St");
        assert_eq!(ok.zip_code, "62704");

        assert_eq!(
            split_mailing_address("12 Elm St, Springfield, IL"),
            Err(DefectReason::MalformedAddress)
        );
        assert_eq!(
            split_mailing_address("12 Elm St, Springfield, IL, 62704, Apt 3"),
            Err(DefectReason::MalformedAddress)
        );
    }

    #[test]
    fn normalize_produces_flattened_row() {
        let raw = RawSubscriber {
            uuid: 7,
            dob: "1997-03-02".to_string(),
            contact_info: r#"{"name": "Grace Hopper", "email": "grace@example.com", "phone": "555-0199"}"#.to_string(),
            mailing_address: "1 Navy Way, Arlington, VA, 22202".to_string(),
            job_id: Some("3".to_string()),
            current_career_path_id: None,
            num_course_taken: Some("12".to_string()),
            time_spent_hrs: Some("40.5".to_string()),
        };
        let row = normalize(&raw, date(2024, 3, 1)).unwrap();
        assert_eq!(row.name, "Grace Hopper");
        assert_eq!(row.age, 26);
        assert_eq!(row.age_group, 20);
        assert_eq!(row.city, "Arlington");
        assert_eq!(row.job_id, Some(3.0));
        assert_eq!(row.current_career_path_id, None);
        assert_eq!(row.time_spent_hrs, Some(40.5));
    }

    #[test]
    fn unparseable_dob_is_a_row_defect() {
        let raw = RawSubscriber {
            uuid: 8,
            dob: "March 2nd".to_string(),
            contact_info: r#"{"name": "X", "email": "", "phone": ""}"#.to_string(),
            mailing_address: "a, b, c, d".to_string(),
            job_id: None,
            current_career_path_id: None,
            num_course_taken: None,
            time_spent_hrs: None,
        };
        assert_eq!(
            normalize(&raw, date(2024, 1, 1)),
            Err(DefectReason::UnparseableDob)
        );
    }
}

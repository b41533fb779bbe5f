//! Partial registration updates from the profile editor
//!
//! The editor posts back whatever fields it displayed. Null values mean
//! "leave unchanged", computed/read-only fields are ignored, and anything
//! else outside the editable set is rejected so it never reaches SQL.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use super::ValidationError;

/// Columns of `registrations` the profile editor may change.
pub const EDITABLE_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "preferred_name",
    "gender",
    "birth_date",
    "shirt_size",
    "phone_number",
    "email",
    "father_name",
    "father_email",
    "father_phone_number",
    "mother_name",
    "mother_email",
    "mother_phone_number",
    "stake_name",
    "unit_name",
    "bishop_name",
    "bishop_email",
    "medical_information",
    "dietary_information",
    "status",
];

/// Fields the editor echoes back but which are derived or immutable.
const IGNORED_FIELDS: &[&str] = &["fsy_id", "age", "full_name", "participant_type", "created_at"];

/// A single column assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
}

/// Validated set of column assignments for one registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    fields: Vec<(&'static str, FieldValue)>,
}

impl ProfileUpdate {
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = Vec::new();

        for (key, value) in body {
            if value.is_null() || IGNORED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            let column = EDITABLE_FIELDS
                .iter()
                .copied()
                .find(|f| *f == key)
                .ok_or_else(|| ValidationError::InvalidVariant {
                    field: "profile field",
                    value: key.clone(),
                })?;

            let text = value.as_str().ok_or(ValidationError::InvalidFormat {
                field: column,
                reason: "must be a string",
            })?;

            let value = if column == "birth_date" {
                FieldValue::Date(parse_birth_date(text)?)
            } else {
                FieldValue::Text(text.to_owned())
            };
            fields.push((column, value));
        }

        if fields.is_empty() {
            return Err(ValidationError::Rule {
                message: "No fields to update",
            });
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }
}

/// Accept `YYYY-MM-DD` or a full ISO timestamp and keep only the date.
pub fn parse_birth_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| ValidationError::InvalidFormat {
            field: "birth_date",
            reason: "expected an ISO date (YYYY-MM-DD)",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(v: Value) -> Result<ProfileUpdate, ValidationError> {
        ProfileUpdate::from_json(v.as_object().unwrap())
    }

    #[test]
    fn keeps_editable_fields_and_skips_nulls() {
        let u = update(json!({
            "first_name": "Maria",
            "preferred_name": null,
            "shirt_size": "M"
        }))
        .unwrap();

        assert_eq!(u.fields().len(), 2);
        assert!(u
            .fields()
            .contains(&("first_name", FieldValue::Text("Maria".into()))));
    }

    #[test]
    fn ignores_read_only_fields() {
        let u = update(json!({"age": 16, "fsy_id": 1001, "email": "m@example.com"})).unwrap();
        assert_eq!(
            u.fields(),
            &[("email", FieldValue::Text("m@example.com".into()))]
        );
    }

    #[test]
    fn rejects_unknown_columns() {
        let err = update(json!({"password_hash": "x"})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { .. }));

        let err = update(json!({"status = 'Approved' --": "x"})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { .. }));
    }

    #[test]
    fn rejects_empty_update() {
        let err = update(json!({"first_name": null})).unwrap_err();
        assert_eq!(err.to_string(), "No fields to update");
    }

    #[test]
    fn birth_date_accepts_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2008, 5, 14).unwrap();
        assert_eq!(parse_birth_date("2008-05-14").unwrap(), expected);
        assert_eq!(parse_birth_date("2008-05-14T00:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_birth_date("2008-05-14T08:00:00").unwrap(), expected);
        assert!(parse_birth_date("14/05/2008").is_err());
    }

    #[test]
    fn non_string_values_are_rejected() {
        let err = update(json!({"gender": 1})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { field: "gender", .. }));
    }
}

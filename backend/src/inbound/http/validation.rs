//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path segments and JSON bodies arrive as raw strings and values; these
//! helpers turn them into domain identifiers or `InvalidRequest` errors that
//! carry the offending field in `details`.

use serde_json::{Value, json};

use crate::domain::{Availability, CandidateId, Error, ScheduleId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidInteger,
    OutOfRange,
    InvalidType,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidInteger => "invalid_integer",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::InvalidType => "invalid_type",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const SCHEDULE_ID: FieldName = FieldName::new("scheduleId");
pub(crate) const USER_ID: FieldName = FieldName::new("userId");
pub(crate) const CANDIDATE_ID: FieldName = FieldName::new("candidateId");
pub(crate) const AVAILABILITY: FieldName = FieldName::new("availability");
pub(crate) const COMMENT: FieldName = FieldName::new("comment");

fn field_error(field: FieldName, code: ErrorCode, message: String, value: Option<&str>) -> Error {
    let mut details = json!({
        "field": field.as_str(),
        "code": code.as_str(),
    });
    if let (Some(value), Some(map)) = (value, details.as_object_mut()) {
        map.insert("value".to_owned(), Value::String(value.to_owned()));
    }
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
        None,
    )
}

pub(crate) fn parse_schedule_id(value: &str) -> Result<ScheduleId, Error> {
    value.parse().map_err(|_| {
        field_error(
            SCHEDULE_ID,
            ErrorCode::InvalidUuid,
            "scheduleId must be a valid UUID".to_owned(),
            Some(value),
        )
    })
}

fn parse_non_negative(value: &str, field: FieldName) -> Result<i64, Error> {
    match value.parse::<i64>() {
        Ok(parsed) if parsed >= 0 => Ok(parsed),
        _ => {
            let name = field.as_str();
            Err(field_error(
                field,
                ErrorCode::InvalidInteger,
                format!("{name} must be a non-negative integer"),
                Some(value),
            ))
        }
    }
}

pub(crate) fn parse_user_id(value: &str) -> Result<UserId, Error> {
    let raw = parse_non_negative(value, USER_ID)?;
    UserId::new(raw).map_err(|err| {
        field_error(
            USER_ID,
            ErrorCode::InvalidInteger,
            err.to_string(),
            Some(value),
        )
    })
}

pub(crate) fn parse_candidate_id(value: &str) -> Result<CandidateId, Error> {
    parse_non_negative(value, CANDIDATE_ID).map(CandidateId::new)
}

/// Read the `availability` member of a JSON body.
///
/// A missing or `null` member means absent (0). Numbers and numeric strings
/// are accepted; anything outside 0..=2 is rejected.
pub(crate) fn parse_availability(value: Option<&Value>) -> Result<Availability, Error> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(Availability::default()),
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    let Some(raw) = raw else {
        return Err(field_error(
            AVAILABILITY,
            ErrorCode::InvalidType,
            "availability must be an integer".to_owned(),
            value.map(Value::to_string).as_deref(),
        ));
    };
    Availability::try_from(raw).map_err(|err| {
        field_error(
            AVAILABILITY,
            ErrorCode::OutOfRange,
            err.to_string(),
            Some(&raw.to_string()),
        )
    })
}

/// Read the `comment` member of a JSON body; it must be present as a string.
pub(crate) fn parse_comment(value: Option<&Value>) -> Result<String, Error> {
    match value {
        Some(Value::String(text)) => Ok(text.clone()),
        None | Some(Value::Null) => Err(missing_field_error(COMMENT)),
        Some(other) => Err(field_error(
            COMMENT,
            ErrorCode::InvalidType,
            "comment must be a string".to_owned(),
            Some(&other.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;
    use rstest::rstest;

    fn detail_code(error: &Error) -> Option<&str> {
        error.details()?.get("code")?.as_str()
    }

    #[rstest]
    fn schedule_ids_must_be_uuids() {
        let err = parse_schedule_id("not-a-uuid").expect_err("invalid");
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(detail_code(&err), Some("invalid_uuid"));
        assert!(parse_schedule_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    }

    #[rstest]
    #[case("-1")]
    #[case("abc")]
    #[case("1.5")]
    fn user_ids_reject_non_integers(#[case] raw: &str) {
        let err = parse_user_id(raw).expect_err("invalid");
        assert_eq!(detail_code(&err), Some("invalid_integer"));
    }

    #[rstest]
    fn candidate_ids_parse_integers() {
        assert_eq!(
            parse_candidate_id("42").expect("valid"),
            CandidateId::new(42)
        );
    }

    #[rstest]
    #[case(None, Availability::Absent)]
    #[case(Some(json!(null)), Availability::Absent)]
    #[case(Some(json!(1)), Availability::Unknown)]
    #[case(Some(json!("2")), Availability::Present)]
    fn availability_accepts_numbers_and_defaults(
        #[case] value: Option<Value>,
        #[case] expected: Availability,
    ) {
        assert_eq!(
            parse_availability(value.as_ref()).expect("valid"),
            expected
        );
    }

    #[rstest]
    #[case(json!(3), "out_of_range")]
    #[case(json!(-1), "out_of_range")]
    #[case(json!("yes"), "invalid_type")]
    #[case(json!(1.5), "invalid_type")]
    fn availability_rejects_bad_values(#[case] value: Value, #[case] code: &str) {
        let err = parse_availability(Some(&value)).expect_err("invalid");
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(detail_code(&err), Some(code));
    }

    #[rstest]
    fn comment_is_required() {
        let err = parse_comment(None).expect_err("missing");
        assert_eq!(detail_code(&err), Some("missing_field"));
        assert_eq!(
            parse_comment(Some(&json!("hello"))).expect("valid"),
            "hello"
        );
    }
}

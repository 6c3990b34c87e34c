use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{BookingRequest, FitnessClass, NewClassRequest, ValidBookingRequest};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("regex compiles"));

pub const CLASS_TYPES: [&str; 3] = ["Yoga", "Zumba", "HIIT"];

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, BookingError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BookingError::MissingField(field)),
    }
}

pub fn validate_booking_request(
    request: &BookingRequest,
) -> Result<ValidBookingRequest, BookingError> {
    let class_id = required(&request.class_id, "class_id")?;
    let user_name = required(&request.user_name, "user_name")?;
    let user_email = required(&request.user_email, "user_email")?;

    if !is_valid_email(user_email) {
        return Err(BookingError::InvalidEmail);
    }
    // No class can carry a malformed id.
    let class_id = Uuid::parse_str(class_id).map_err(|_| BookingError::ClassNotFound)?;

    Ok(ValidBookingRequest {
        class_id,
        user_name: user_name.to_string(),
        user_email: user_email.to_string(),
    })
}

pub fn validate_lookup_email(email: Option<&str>) -> Result<&str, BookingError> {
    match email.map(str::trim) {
        None | Some("") => Err(BookingError::MissingField("email")),
        Some(email) if is_valid_email(email) => Ok(email),
        Some(_) => Err(BookingError::InvalidEmail),
    }
}

/// Resolves an optional IANA zone name, falling back to `default` only when
/// no name was given.
pub fn resolve_timezone(name: Option<&str>, default: Tz) -> Result<Tz, BookingError> {
    match name.map(str::trim) {
        None | Some("") => Ok(default),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| BookingError::InvalidTimezone(name.to_string())),
    }
}

/// Accepts RFC 3339 with an offset, or a naive ISO date-time interpreted in `local`.
pub fn parse_class_date_time(value: &str, local: Tz) -> Result<DateTime<Utc>, BookingError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or(BookingError::InvalidDateTime)?;
    local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(BookingError::InvalidDateTime)
}

pub fn validate_new_class(
    request: &NewClassRequest,
    local: Tz,
    now: DateTime<Utc>,
) -> Result<FitnessClass, BookingError> {
    let name = required(&request.name, "name")?;
    let instructor = required(&request.instructor, "instructor")?;
    let date_time = required(&request.date_time, "date_time")?;
    let capacity = request.capacity.ok_or(BookingError::MissingField("capacity"))?;

    if !CLASS_TYPES.contains(&name) {
        return Err(BookingError::InvalidClassType);
    }
    let date_time = parse_class_date_time(date_time, local)?;
    if date_time <= now {
        return Err(BookingError::ScheduleInPast);
    }
    let capacity = match u32::try_from(capacity) {
        Ok(c) if c > 0 => c,
        _ => return Err(BookingError::InvalidCapacity),
    };

    Ok(FitnessClass::new(name, instructor, date_time, capacity))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn booking_request(class_id: &str, name: &str, email: &str) -> BookingRequest {
        BookingRequest {
            class_id: Some(class_id.to_string()),
            user_name: Some(name.to_string()),
            user_email: Some(email.to_string()),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("first.last-1@mail.example.co.uk"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn test_validate_booking_request_ok() {
        let id = Uuid::new_v4();
        let valid =
            validate_booking_request(&booking_request(&id.to_string(), " John ", "john@example.com"))
                .unwrap();
        assert_eq!(valid.class_id, id);
        assert_eq!(valid.user_name, "John");
        assert_eq!(valid.user_email, "john@example.com");
    }

    #[test]
    fn test_validate_booking_request_missing_fields() {
        let mut request = booking_request(&Uuid::new_v4().to_string(), "John", "john@example.com");
        request.user_name = Some("   ".to_string());
        assert!(matches!(
            validate_booking_request(&request),
            Err(BookingError::MissingField("user_name"))
        ));

        request.class_id = None;
        assert!(matches!(
            validate_booking_request(&request),
            Err(BookingError::MissingField("class_id"))
        ));
    }

    #[test]
    fn test_validate_booking_request_bad_values() {
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            validate_booking_request(&booking_request(&id, "John", "invalid-email")),
            Err(BookingError::InvalidEmail)
        ));
        assert!(matches!(
            validate_booking_request(&booking_request("not-a-uuid", "John", "john@example.com")),
            Err(BookingError::ClassNotFound)
        ));
    }

    #[test]
    fn test_validate_lookup_email() {
        assert_eq!(validate_lookup_email(Some("a@x.com")).unwrap(), "a@x.com");
        assert!(matches!(
            validate_lookup_email(None),
            Err(BookingError::MissingField("email"))
        ));
        assert!(matches!(
            validate_lookup_email(Some("nope")),
            Err(BookingError::InvalidEmail)
        ));
    }

    #[test]
    fn test_resolve_timezone() {
        let default = chrono_tz::Asia::Kolkata;
        assert_eq!(resolve_timezone(None, default).unwrap(), default);
        assert_eq!(
            resolve_timezone(Some("America/New_York"), default).unwrap(),
            chrono_tz::America::New_York
        );
        assert!(matches!(
            resolve_timezone(Some("Mars/Olympus"), default),
            Err(BookingError::InvalidTimezone(name)) if name == "Mars/Olympus"
        ));
    }

    #[test]
    fn test_parse_class_date_time() {
        let kolkata = chrono_tz::Asia::Kolkata;
        let naive = parse_class_date_time("2099-06-08T10:00:00", kolkata).unwrap();
        assert_eq!(naive.to_rfc3339(), "2099-06-08T04:30:00+00:00");

        let offset = parse_class_date_time("2099-06-08T10:00:00-04:00", kolkata).unwrap();
        assert_eq!(offset.to_rfc3339(), "2099-06-08T14:00:00+00:00");

        assert!(matches!(
            parse_class_date_time("tomorrow", kolkata),
            Err(BookingError::InvalidDateTime)
        ));
    }

    #[test]
    fn test_validate_new_class() {
        let now = Utc::now();
        let tz = chrono_tz::Asia::Kolkata;
        let request = NewClassRequest {
            name: Some("Yoga".to_string()),
            instructor: Some("Jane Doe".to_string()),
            date_time: Some((now + Duration::days(2)).to_rfc3339()),
            capacity: Some(10),
        };
        let class = validate_new_class(&request, tz, now).unwrap();
        assert_eq!(class.capacity, 10);
        assert_eq!(class.available_slots, 10);

        let pilates = NewClassRequest {
            name: Some("Pilates".to_string()),
            ..request.clone()
        };
        assert!(matches!(
            validate_new_class(&pilates, tz, now),
            Err(BookingError::InvalidClassType)
        ));

        let past = NewClassRequest {
            date_time: Some((now - Duration::hours(1)).to_rfc3339()),
            ..request.clone()
        };
        assert!(matches!(
            validate_new_class(&past, tz, now),
            Err(BookingError::ScheduleInPast)
        ));

        let empty = NewClassRequest {
            capacity: Some(0),
            ..request
        };
        assert!(matches!(
            validate_new_class(&empty, tz, now),
            Err(BookingError::InvalidCapacity)
        ));
    }
}

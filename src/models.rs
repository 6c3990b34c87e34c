use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A scheduled class as stored. `date_time` is always UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessClass {
    pub id: Uuid,
    pub name: String,
    pub instructor: String,
    pub date_time: DateTime<Utc>,
    pub capacity: u32,
    pub available_slots: u32,
}

impl FitnessClass {
    pub fn new(
        name: impl Into<String>,
        instructor: impl Into<String>,
        date_time: DateTime<Utc>,
        capacity: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            instructor: instructor.into(),
            date_time,
            capacity,
            available_slots: capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub class_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub booking_time: DateTime<Utc>,
}

/// A booking joined with the class it references.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub class_name: String,
    pub class_date_time: DateTime<Utc>,
}

/// Raw `POST /api/book` body. Every field is optional so presence can be
/// reported as a validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookingRequest {
    pub class_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

/// A booking request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBookingRequest {
    pub class_id: Uuid,
    pub user_name: String,
    pub user_email: String,
}

/// Raw `POST /api/classes` body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewClassRequest {
    pub name: Option<String>,
    pub instructor: Option<String>,
    #[schema(example = "2025-06-08T10:00:00")]
    pub date_time: Option<String>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassView {
    pub id: Uuid,
    pub name: String,
    pub instructor: String,
    #[schema(format = "date-time", example = "2025-06-08T10:00:00+05:30")]
    pub date_time: String,
    pub capacity: u32,
    pub available_slots: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingView {
    pub id: Uuid,
    pub class_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    #[schema(format = "date-time")]
    pub booking_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingDetailsView {
    pub id: Uuid,
    pub class_id: Uuid,
    pub class_name: String,
    #[schema(format = "date-time")]
    pub date_time: String,
    pub user_name: String,
    pub user_email: String,
    #[schema(format = "date-time")]
    pub booking_time: String,
}

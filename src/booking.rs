use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{Booking, ValidBookingRequest};
use crate::store::{BookingStore, ClaimOutcome};

/// Books one slot of `request.class_id` for the requesting client.
///
/// Checks run in a fixed order: class exists, class starts after `now`, a slot
/// is free, the email has not booked this class yet. The final write re-checks
/// the slot count and uniqueness atomically, so a request that loses a race
/// after passing the reads still fails with `ClassFull` or `DuplicateBooking`.
pub async fn book(
    store: &dyn BookingStore,
    request: ValidBookingRequest,
    now: DateTime<Utc>,
) -> Result<Booking, BookingError> {
    let class = store
        .find_class(request.class_id)
        .await?
        .ok_or_else(|| {
            warn!(class_id = %request.class_id, "booking attempt for unknown class");
            BookingError::ClassNotFound
        })?;

    if class.date_time <= now {
        warn!(class_id = %class.id, "attempt to book past class");
        return Err(BookingError::ClassInPast);
    }

    if class.available_slots == 0 {
        warn!(class_id = %class.id, "attempt to overbook class");
        return Err(BookingError::ClassFull);
    }

    if store
        .booking_exists(class.id, &request.user_email)
        .await?
    {
        warn!(class_id = %class.id, email = %request.user_email, "duplicate booking attempt");
        return Err(BookingError::DuplicateBooking);
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        class_id: class.id,
        user_name: request.user_name,
        user_email: request.user_email,
        booking_time: now,
    };

    match store.claim_slot(&booking).await? {
        ClaimOutcome::Booked => {
            info!(booking_id = %booking.id, class_id = %class.id, "booking created");
            Ok(booking)
        }
        ClaimOutcome::NoSlot => {
            warn!(class_id = %class.id, "last slot taken by a concurrent booking");
            Err(BookingError::ClassFull)
        }
        ClaimOutcome::Duplicate => {
            warn!(class_id = %class.id, email = %booking.user_email, "concurrent duplicate booking");
            Err(BookingError::DuplicateBooking)
        }
    }
}

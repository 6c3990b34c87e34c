use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::error::BookingError;
use crate::models::{Booking, BookingDetails, BookingDetailsView, BookingView, ClassView, FitnessClass};
use crate::store::BookingStore;

/// ISO-8601 with an explicit offset, in `tz`.
pub fn render_timestamp(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).to_rfc3339()
}

pub fn class_view(class: &FitnessClass, tz: Tz) -> ClassView {
    ClassView {
        id: class.id,
        name: class.name.clone(),
        instructor: class.instructor.clone(),
        date_time: render_timestamp(class.date_time, tz),
        capacity: class.capacity,
        available_slots: class.available_slots,
    }
}

pub fn booking_view(booking: &Booking, tz: Tz) -> BookingView {
    BookingView {
        id: booking.id,
        class_id: booking.class_id,
        user_name: booking.user_name.clone(),
        user_email: booking.user_email.clone(),
        booking_time: render_timestamp(booking.booking_time, tz),
    }
}

fn booking_details_view(details: &BookingDetails, tz: Tz) -> BookingDetailsView {
    let booking = &details.booking;
    BookingDetailsView {
        id: booking.id,
        class_id: booking.class_id,
        class_name: details.class_name.clone(),
        date_time: render_timestamp(details.class_date_time, tz),
        user_name: booking.user_name.clone(),
        user_email: booking.user_email.clone(),
        booking_time: render_timestamp(booking.booking_time, tz),
    }
}

/// Every stored class, past ones included, in insertion order.
pub async fn list_classes(store: &dyn BookingStore, tz: Tz) -> Result<Vec<ClassView>, BookingError> {
    let classes = store.list_classes().await?;
    info!("Retrieved {} classes for timezone {tz}", classes.len());
    Ok(classes.iter().map(|c| class_view(c, tz)).collect())
}

/// `email` must already be validated.
pub async fn list_bookings_by_email(
    store: &dyn BookingStore,
    email: &str,
    tz: Tz,
) -> Result<Vec<BookingDetailsView>, BookingError> {
    let bookings = store.bookings_by_email(email).await?;
    info!("Retrieved {} bookings for {email}", bookings.len());
    Ok(bookings
        .iter()
        .map(|b| booking_details_view(b, tz))
        .collect())
}

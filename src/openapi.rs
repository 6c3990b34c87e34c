use utoipa::OpenApi;

use crate::models::{BookingDetailsView, BookingRequest, BookingView, ClassView, NewClassRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_classes,
        crate::handlers::create_class,
        crate::handlers::book_class,
        crate::handlers::get_bookings
    ),
    components(schemas(
        ClassView,
        NewClassRequest,
        BookingRequest,
        BookingView,
        BookingDetailsView
    )),
    tags(
        (name = "booking", description = "Fitness class scheduling and booking")
    ),
)]
pub struct ApiDoc;

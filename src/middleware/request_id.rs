//! Request-id middleware.
//!
//! Every request gets an `x-request-id` (generated when the caller did not
//! send one) and the same value is echoed on the response, so a support
//! ticket can be matched to its log lines.

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub fn x_request_id() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header = x_request_id();
    (
        SetRequestIdLayer::new(header.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header),
    )
}

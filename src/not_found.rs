//! Defines the route handler for the page to display when a route is not found.
use axum::{http::StatusCode, response::Response};

use crate::html::error_response;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Not Found",
        "404",
        "Something's missing.",
        "Sorry, we can't find that page. You'll find lots to explore on the budget page.",
    )
}

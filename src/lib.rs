//! Harvest Ledger is a web app for managing farms, crops, tasks, expenses and budgets.
//!
//! The heart of the crate is the analytics layer: pure functions that turn
//! expense, budget and crop collections into totals, category breakdowns,
//! monthly trends, budget utilization/variance and profit projections.
//! The rest of the library serves those results as HTML pages and a JSON API
//! backed by in-memory record stores.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod analytics;
mod api;
mod app_state;
mod budget;
mod budget_forms;
mod budget_page;
mod charts;
mod config;
mod crop;
mod dashboard;
mod date;
mod endpoints;
mod expense;
mod expense_forms;
mod expenses_page;
mod farm;
mod forms;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod store;
mod task;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use analytics::{
    BudgetDonut, BudgetHealth, BudgetOverview, BudgetSelection, BudgetStatus, CategoryBreakdown,
    CategoryGroup, ChartSeries, CropEstimate, ExpenseFilter, ExpenseWindow, FarmComparison,
    FarmSelection, MonthlyTrend, PeriodSelection, ProfitProjection, budget_donut,
    category_breakdown, estimate_crop, farm_comparison, group_by_category, monthly_trend,
    projected_profit, sum_expenses, total_amount, utilization, variance,
};
pub use app_state::AppState;
pub use budget::{Budget, BudgetCategory, BudgetData, BudgetId, BudgetPeriod};
pub use config::{AnalyticsConfig, CropEconomics, CropTable};
pub use crop::{Crop, CropData, CropId, CropStatus};
pub use date::{month_label, parse_date};
pub use expense::{Expense, ExpenseCategory, ExpenseData, ExpenseId};
pub use farm::{Farm, FarmData, FarmId};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use store::{Record, RecordId, RecordStore, Seed, Stores};
pub use task::{Task, TaskData, TaskId, task_completion_rate, upcoming_tasks};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A date string could not be parsed as a `YYYY-MM-DD` calendar date.
    ///
    /// Dates are parsed once when raw input is turned into a record or a
    /// filter, so this error surfaces at the boundary instead of silently
    /// skewing sums and orderings further down.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// An amount of money was negative where only non-negative amounts are allowed.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(f64),

    /// A required text field was empty or only whitespace.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A query parameter did not name a known farm, period, window or category.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A record store already holds the largest possible ID, so no new
    /// record can be created.
    #[error("no more {0} IDs are available")]
    IdsExhausted(&'static str),

    /// Could not acquire the record store lock.
    #[error("could not acquire the record store lock")]
    StoreLockError,

    /// The seed file could not be read or parsed.
    #[error("could not load seed data: {0}")]
    SeedFile(String),

    /// The analytics configuration file could not be read or parsed.
    #[error("could not load analytics configuration: {0}")]
    ConfigFile(String),

    /// The configured timezone is not a known canonical timezone name.
    #[error("could not get local timezone \"{0}\"")]
    InvalidTimezoneError(String),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidDate(_)
            | Error::NegativeAmount(_)
            | Error::EmptyField(_)
            | Error::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::StoreLockError
            | Error::IdsExhausted(_)
            | Error::SeedFile(_)
            | Error::ConfigFile(_)
            | Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as a JSON body `{"error": "..."}` for API clients.
    fn into_json_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            return (
                status_code,
                Json(json!({ "error": "an unexpected error occurred" })),
            )
                .into_response();
        }

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }

    /// Render the error as an HTML alert for the htmx record forms.
    pub(crate) fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match &self {
            Error::NotFound => html::error_alert(
                "Record not found",
                "Try refreshing the page to see if the record has already been deleted.",
            ),
            error if status_code == StatusCode::BAD_REQUEST => {
                html::error_alert("Invalid form data", &error.to_string())
            }
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                html::error_alert(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
            }
        };

        (status_code, alert).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => not_found::get_404_not_found_response(),
            Error::InvalidDate(_)
            | Error::NegativeAmount(_)
            | Error::EmptyField(_)
            | Error::InvalidSelection(_) => html::error_response(
                StatusCode::BAD_REQUEST,
                "Bad Request",
                "400",
                &self.to_string(),
                "Check the link or filter values and try again.",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                internal_server_error::InternalServerError::default().into_response()
            }
        }
    }
}

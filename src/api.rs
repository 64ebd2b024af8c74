//! The JSON API: CRUD over the record stores and the analytics results.
//!
//! Errors are returned as `{"error": "..."}` with the matching status code.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    analytics::{
        BudgetOverview, BudgetSelection, CategoryBreakdown, ExpenseFilter, MonthlyTrend,
        group_by_category, monthly_trend, sum_expenses,
    },
    budget::Budget,
    config::AnalyticsConfig,
    crop::Crop,
    endpoints::{self, format_endpoint},
    expense::Expense,
    farm::{Farm, FarmId},
    store::{RecordId, Stored, Stores},
    task::Task,
};

/// The state needed by the API handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// The record stores.
    pub stores: Arc<Mutex<Stores>>,
    /// The crop table used for the budget overview.
    pub analytics_config: Arc<AnalyticsConfig>,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            stores: state.stores.clone(),
            analytics_config: state.analytics_config.clone(),
        }
    }
}

/// A record type that is served under its own API route.
pub(crate) trait ApiResource: Stored + Serialize + Send + Sync + 'static {
    /// The route for a single record, e.g. [endpoints::FARM_API].
    const ITEM_ENDPOINT: &'static str;
}

impl ApiResource for Farm {
    const ITEM_ENDPOINT: &'static str = endpoints::FARM_API;
}

impl ApiResource for Crop {
    const ITEM_ENDPOINT: &'static str = endpoints::CROP_API;
}

impl ApiResource for Task {
    const ITEM_ENDPOINT: &'static str = endpoints::TASK_API;
}

impl ApiResource for Expense {
    const ITEM_ENDPOINT: &'static str = endpoints::EXPENSE_API;
}

impl ApiResource for Budget {
    const ITEM_ENDPOINT: &'static str = endpoints::BUDGET_API;
}

fn lock_stores(stores: &Mutex<Stores>) -> Result<MutexGuard<'_, Stores>, Error> {
    stores
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
        .map_err(|_| Error::StoreLockError)
}

fn json_or_error<T: Serialize>(status_code: StatusCode, result: Result<T, Error>) -> Response {
    match result {
        Ok(value) => (status_code, Json(value)).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// List every record of type `R`.
pub(crate) async fn list_records<R: ApiResource>(State(state): State<ApiState>) -> Response {
    let result = lock_stores(&state.stores).map(|stores| R::store(&stores).list().to_vec());

    json_or_error(StatusCode::OK, result)
}

/// Get the record of type `R` with the ID in the path.
///
/// Responds with 404 if there is no such record.
pub(crate) async fn get_record<R: ApiResource>(
    State(state): State<ApiState>,
    Path(id): Path<RecordId>,
) -> Response {
    let result = lock_stores(&state.stores)
        .and_then(|stores| R::store(&stores).get(id).cloned());

    json_or_error(StatusCode::OK, result)
}

/// Validate the request body and store it as a new record of type `R`.
///
/// Responds with 201 and the new record's route in the `Location` header.
pub(crate) async fn create_record<R: ApiResource>(
    State(state): State<ApiState>,
    Json(data): Json<R::Data>,
) -> Response
where
    R::Data: Send,
{
    let result = lock_stores(&state.stores)
        .and_then(|mut stores| R::store_mut(&mut stores).create(data))
        .inspect_err(|error| tracing::warn!("could not create {}: {error}", R::NAME));

    match result {
        Ok(record) => (
            StatusCode::CREATED,
            [(LOCATION, format_endpoint(R::ITEM_ENDPOINT, record.id()))],
            Json(record),
        )
            .into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// Replace the fields of the record of type `R` with the ID in the path.
pub(crate) async fn update_record<R: ApiResource>(
    State(state): State<ApiState>,
    Path(id): Path<RecordId>,
    Json(data): Json<R::Data>,
) -> Response
where
    R::Data: Send,
{
    let result = lock_stores(&state.stores)
        .and_then(|mut stores| R::store_mut(&mut stores).update(id, data))
        .inspect_err(|error| tracing::warn!("could not update {} {id}: {error}", R::NAME));

    json_or_error(StatusCode::OK, result)
}

/// Delete the record of type `R` with the ID in the path.
///
/// Responds with 204 on success.
pub(crate) async fn delete_record<R: ApiResource>(
    State(state): State<ApiState>,
    Path(id): Path<RecordId>,
) -> Response {
    let result = lock_stores(&state.stores)
        .and_then(|mut stores| R::store_mut(&mut stores).delete(id));

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// The query string of the expense analytics route.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseAnalyticsQuery {
    /// Skip expenses before this date, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Skip expenses after this date, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Only include this expense category.
    pub category: Option<String>,
    /// Only include this farm.
    pub farm_id: Option<FarmId>,
}

#[derive(Debug, Serialize)]
struct ExpenseAnalytics<'a> {
    total: f64,
    breakdown: CategoryBreakdown<'a>,
    trend: MonthlyTrend,
}

/// The total, category breakdown and monthly trend of the expenses selected by the query.
pub async fn get_expense_analytics(
    State(state): State<ApiState>,
    Query(query): Query<ExpenseAnalyticsQuery>,
) -> Response {
    let filter = match ExpenseFilter::parse(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.category.as_deref(),
        query.farm_id,
    ) {
        Ok(filter) => filter,
        Err(error) => return error.into_json_response(),
    };

    let stores = match lock_stores(&state.stores) {
        Ok(stores) => stores,
        Err(error) => return error.into_json_response(),
    };
    let expenses = stores.expenses.list();

    let analytics = ExpenseAnalytics {
        total: sum_expenses(expenses, &filter),
        breakdown: group_by_category(filter.apply(expenses)),
        trend: monthly_trend(expenses, &filter),
    };

    Json(analytics).into_response()
}

/// The query string of the budget analytics route.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetAnalyticsQuery {
    /// A farm ID or "all".
    pub farm: Option<String>,
    /// "monthly", "annual" or "all".
    pub period: Option<String>,
}

/// The budget overview for the farm and period selected by the query.
pub async fn get_budget_analytics(
    State(state): State<ApiState>,
    Query(query): Query<BudgetAnalyticsQuery>,
) -> Response {
    let result = BudgetSelection::parse(query.farm.as_deref(), query.period.as_deref())
        .and_then(|selection| {
            let stores = lock_stores(&state.stores)?;

            Ok(BudgetOverview::compute(
                selection,
                stores.budgets.list(),
                stores.expenses.list(),
                stores.crops.list(),
                &state.analytics_config.crop_table,
            ))
        });

    json_or_error(StatusCode::OK, result)
}

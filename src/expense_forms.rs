//! Pages and endpoints for adding, editing and deleting expenses.
//!
//! The forms are submitted with htmx. On success the endpoints redirect back
//! to the expenses page, otherwise they respond with an alert that htmx swaps
//! into the page's alert container.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of rejecting the request like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    endpoints::{self, format_endpoint},
    expense::{ExpenseCategory, ExpenseData, ExpenseId},
    farm::{Farm, FarmId},
    forms::{RecordFormState, farm_select},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The values the expense form fields start with.
struct ExpenseFormDefaults<'a> {
    farm_id: Option<FarmId>,
    category: ExpenseCategory,
    amount: Option<f64>,
    date: Date,
    description: &'a str,
    vendor: &'a str,
}

fn expense_form_fields(farms: &[Farm], defaults: &ExpenseFormDefaults) -> Markup {
    html!(
        (farm_select(farms, defaults.farm_id))

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select id="category" name="category" required class=(FORM_SELECT_STYLE)
            {
                @for category in ExpenseCategory::ALL {
                    option value=(category) selected[category == defaults.category]
                    { (category.label()) }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                id="amount"
                type="number"
                name="amount"
                step="0.01"
                min="0"
                placeholder="0.00"
                value=[defaults.amount]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="Description"
                value=(defaults.description)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="vendor" class=(FORM_LABEL_STYLE) { "Vendor (optional)" }

            input
                id="vendor"
                type="text"
                name="vendor"
                placeholder="Vendor"
                value=(defaults.vendor)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    )
}

/// Where the expense form is sent: a new expense is posted, an existing one is put.
#[derive(Clone, Copy)]
enum ExpenseFormTarget {
    Create,
    Update(ExpenseId),
}

fn expense_form_view(
    target: ExpenseFormTarget,
    farms: &[Farm],
    defaults: &ExpenseFormDefaults,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let (title, submit_text) = match target {
        ExpenseFormTarget::Create => ("Add Expense", "Add Expense"),
        ExpenseFormTarget::Update(_) => ("Edit Expense", "Save Expense"),
    };

    let form = match target {
        ExpenseFormTarget::Create => html!(
            form
                hx-post=(endpoints::EXPENSES_VIEW)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (expense_form_fields(farms, defaults))
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
            }
        ),
        ExpenseFormTarget::Update(expense_id) => html!(
            form
                hx-put=(format_endpoint(endpoints::EXPENSE_FORM, expense_id))
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (expense_form_fields(farms, defaults))
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
            }
        ),
    };

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold w-full mb-4" { (title) }

            @if farms.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "Add a farm before recording expenses."
                }
            } @else {
                (form)
            }
        }
    );

    base(title, &[], &content)
}

/// Display the form for adding an expense, dated today.
pub async fn get_new_expense_page(
    State(state): State<RecordFormState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let stores = state.lock_stores()?;

    let defaults = ExpenseFormDefaults {
        farm_id: None,
        category: ExpenseCategory::Seeds,
        amount: None,
        date: today,
        description: "",
        vendor: "",
    };

    Ok(
        expense_form_view(ExpenseFormTarget::Create, stores.farms.list(), &defaults)
            .into_response(),
    )
}

/// Display the form for editing the expense with the ID in the path.
pub async fn get_edit_expense_page(
    State(state): State<RecordFormState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let stores = state.lock_stores()?;
    let expense = stores.expenses.get(expense_id)?;

    let defaults = ExpenseFormDefaults {
        farm_id: Some(expense.farm_id),
        category: expense.category,
        amount: Some(expense.amount),
        date: expense.date,
        description: &expense.description,
        vendor: expense.vendor.as_deref().unwrap_or_default(),
    };

    Ok(expense_form_view(
        ExpenseFormTarget::Update(expense_id),
        stores.farms.list(),
        &defaults,
    )
    .into_response())
}

/// A route handler for adding an expense, redirects to the expenses page on success.
pub async fn create_expense_endpoint(
    State(state): State<RecordFormState>,
    Form(data): Form<ExpenseData>,
) -> Response {
    let result = state
        .lock_stores()
        .and_then(|mut stores| stores.expenses.create(data));

    if let Err(error) = result {
        tracing::warn!("could not create expense: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for replacing an expense, redirects to the expenses page on success.
pub async fn update_expense_endpoint(
    State(state): State<RecordFormState>,
    Path(expense_id): Path<ExpenseId>,
    Form(data): Form<ExpenseData>,
) -> Response {
    let result = state
        .lock_stores()
        .and_then(|mut stores| stores.expenses.update(expense_id, data));

    if let Err(error) = result {
        tracing::warn!("could not update expense {expense_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for deleting an expense, redirects to the expenses page on success.
pub async fn delete_expense_endpoint(
    State(state): State<RecordFormState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let result = state
        .lock_stores()
        .and_then(|mut stores| stores.expenses.delete(expense_id));

    if let Err(error) = result {
        tracing::warn!("could not delete expense {expense_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

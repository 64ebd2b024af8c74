//! Pages and endpoints for adding, editing and deleting budgets.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    budget::{BudgetCategory, BudgetData, BudgetId, BudgetPeriod},
    date::first_day_of_month,
    endpoints::{self, format_endpoint},
    expense::ExpenseCategory,
    farm::{Farm, FarmId},
    forms::{RecordFormState, farm_select},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::local_today,
};

struct BudgetFormDefaults<'a> {
    farm_id: Option<FarmId>,
    period: BudgetPeriod,
    category: BudgetCategory,
    budget_amount: Option<f64>,
    start_date: Date,
    projected_yield: Option<f64>,
    notes: &'a str,
}

fn budget_form_fields(farms: &[Farm], defaults: &BudgetFormDefaults) -> Markup {
    html!(
        (farm_select(farms, defaults.farm_id))

        div
        {
            label for="period" class=(FORM_LABEL_STYLE) { "Period" }

            select id="period" name="period" required class=(FORM_SELECT_STYLE)
            {
                option value="monthly" selected[defaults.period == BudgetPeriod::Monthly] { "Monthly" }
                option value="annual" selected[defaults.period == BudgetPeriod::Annual] { "Annual" }
            }
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select id="category" name="category" required class=(FORM_SELECT_STYLE)
            {
                option value="total" selected[defaults.category == BudgetCategory::Total]
                { "Total Budget" }

                @for category in ExpenseCategory::ALL {
                    option
                        value=(category)
                        selected[defaults.category == BudgetCategory::Category(category)]
                    { (category.label()) }
                }
            }
        }

        div
        {
            label for="budget_amount" class=(FORM_LABEL_STYLE) { "Budget Amount" }

            input
                id="budget_amount"
                type="number"
                name="budget_amount"
                step="0.01"
                min="0"
                placeholder="0.00"
                value=[defaults.budget_amount]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }

            input
                id="start_date"
                type="date"
                name="start_date"
                value=(defaults.start_date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="projected_yield" class=(FORM_LABEL_STYLE) { "Projected Yield (optional)" }

            input
                id="projected_yield"
                type="number"
                name="projected_yield"
                step="any"
                min="0"
                value=[defaults.projected_yield]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="notes" class=(FORM_LABEL_STYLE) { "Notes (optional)" }

            input
                id="notes"
                type="text"
                name="notes"
                value=(defaults.notes)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    )
}

fn budget_form_view(
    budget_id: Option<BudgetId>,
    farms: &[Farm],
    defaults: &BudgetFormDefaults,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();
    let title = if budget_id.is_some() {
        "Edit Budget"
    } else {
        "Add Budget"
    };

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold w-full mb-4" { (title) }

            @if farms.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "Add a farm before setting budgets."
                }
            } @else {
                @match budget_id {
                    Some(budget_id) => {
                        form
                            hx-put=(format_endpoint(endpoints::BUDGET_FORM, budget_id))
                            hx-target-error="#alert-container"
                            class="w-full space-y-4 md:space-y-6"
                        {
                            (budget_form_fields(farms, defaults))
                            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Budget" }
                        }
                    }
                    None => {
                        form
                            hx-post=(endpoints::BUDGET_VIEW)
                            hx-target-error="#alert-container"
                            class="w-full space-y-4 md:space-y-6"
                        {
                            (budget_form_fields(farms, defaults))
                            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Budget" }
                        }
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// Display the form for adding a monthly budget starting this month.
pub async fn get_new_budget_page(State(state): State<RecordFormState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let stores = state.lock_stores()?;

    let defaults = BudgetFormDefaults {
        farm_id: None,
        period: BudgetPeriod::Monthly,
        category: BudgetCategory::Total,
        budget_amount: None,
        start_date: first_day_of_month(today),
        projected_yield: None,
        notes: "",
    };

    Ok(budget_form_view(None, stores.farms.list(), &defaults).into_response())
}

/// Display the form for editing the budget with the ID in the path.
pub async fn get_edit_budget_page(
    State(state): State<RecordFormState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let stores = state.lock_stores()?;
    let budget = stores.budgets.get(budget_id)?;

    let defaults = BudgetFormDefaults {
        farm_id: Some(budget.farm_id),
        period: budget.period,
        category: budget.category,
        budget_amount: Some(budget.budget_amount),
        start_date: budget.start_date,
        projected_yield: budget.projected_yield,
        notes: budget.notes.as_deref().unwrap_or_default(),
    };

    Ok(budget_form_view(Some(budget_id), stores.farms.list(), &defaults).into_response())
}

fn redirect_to_budget_page() -> Response {
    (
        HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for adding a budget, redirects to the budget page on success.
pub async fn create_budget_endpoint(
    State(state): State<RecordFormState>,
    Form(data): Form<BudgetData>,
) -> Response {
    match state
        .lock_stores()
        .and_then(|mut stores| stores.budgets.create(data))
    {
        Ok(_) => redirect_to_budget_page(),
        Err(error) => {
            tracing::warn!("could not create budget: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for replacing a budget, redirects to the budget page on success.
pub async fn update_budget_endpoint(
    State(state): State<RecordFormState>,
    Path(budget_id): Path<BudgetId>,
    Form(data): Form<BudgetData>,
) -> Response {
    match state
        .lock_stores()
        .and_then(|mut stores| stores.budgets.update(budget_id, data))
    {
        Ok(_) => redirect_to_budget_page(),
        Err(error) => {
            tracing::warn!("could not update budget {budget_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a budget, redirects to the budget page on success.
pub async fn delete_budget_endpoint(
    State(state): State<RecordFormState>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    match state
        .lock_stores()
        .and_then(|mut stores| stores.budgets.delete(budget_id))
    {
        Ok(()) => redirect_to_budget_page(),
        Err(error) => {
            tracing::warn!("could not delete budget {budget_id}: {error}");
            error.into_alert_response()
        }
    }
}

//! The expenses page: totals, category breakdown, budget progress and
//! monthly trend for the expenses in a time window.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    analytics::{
        CategoryBreakdown, ExpenseFilter, ExpenseWindow, FarmSelection, budget_donut,
        category_breakdown, group_by_category, monthly_trend, sum_expenses, utilization, variance,
    },
    charts::{PageChart, category_chart, charts_script, charts_view, donut_chart, trend_chart},
    config::AnalyticsConfig,
    endpoints::{self, format_endpoint},
    expense::{Expense, ExpenseCategory},
    farm::{Farm, farm_name},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, ECHARTS_SCRIPT_URL, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, format_percent, summary_card,
    },
    navigation::NavBar,
    store::Stores,
    timezone::local_today,
};

/// The state needed for displaying the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    /// The record stores to read expenses and farms from.
    pub stores: Arc<Mutex<Stores>>,
    /// Holds the total budget the page measures spending against.
    pub analytics_config: Arc<AnalyticsConfig>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            stores: state.stores.clone(),
            analytics_config: state.analytics_config.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the expenses page.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// "all", "this_month", "last_month" or "this_year".
    pub window: Option<String>,
    /// A farm ID or "all".
    pub farm: Option<String>,
    /// An expense category or "all".
    pub category: Option<String>,
}

/// The parsed query string.
#[derive(Debug, Clone, Copy, Default)]
struct ExpensesSelection {
    window: ExpenseWindow,
    farm: FarmSelection,
    category: Option<ExpenseCategory>,
}

impl ExpensesSelection {
    fn parse(query: &ExpensesQuery) -> Result<Self, Error> {
        let category = match query.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(category) => Some(category.parse()?),
        };

        Ok(Self {
            window: query
                .window
                .as_deref()
                .map(str::parse::<ExpenseWindow>)
                .transpose()?
                .unwrap_or_default(),
            farm: query
                .farm
                .as_deref()
                .map(str::parse::<FarmSelection>)
                .transpose()?
                .unwrap_or_default(),
            category,
        })
    }
}

/// The figures shown in the summary cards.
struct ExpenseSummary {
    total: f64,
    count: usize,
    total_budget: f64,
}

impl ExpenseSummary {
    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Display the expenses in the window, farm and category from the query string.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let selection = ExpensesSelection::parse(&query)
        .inspect_err(|error| tracing::warn!("invalid expenses page query: {error}"))?;
    let today = local_today(&state.local_timezone)?;

    let filter = selection
        .window
        .to_filter(today)
        .for_farm(selection.farm.farm_id())
        .with_category(selection.category);

    let stores = state
        .stores
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
        .map_err(|_| Error::StoreLockError)?;

    let expenses = stores.expenses.list();
    let mut selected: Vec<&Expense> = filter.apply(expenses).collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));

    let summary = ExpenseSummary {
        total: sum_expenses(expenses, &filter),
        count: selected.len(),
        total_budget: state.analytics_config.default_total_budget,
    };
    let breakdown = group_by_category(filter.apply(expenses));
    let charts = build_charts(expenses, &filter, &summary);

    Ok(expenses_view(
        selection,
        stores.farms.list(),
        &summary,
        &breakdown,
        &selected,
        &charts,
    )
    .into_response())
}

fn build_charts(
    expenses: &[Expense],
    filter: &ExpenseFilter,
    summary: &ExpenseSummary,
) -> Vec<PageChart> {
    if summary.count == 0 {
        return Vec::new();
    }

    vec![
        PageChart::new("trend-chart", &trend_chart(&monthly_trend(expenses, filter))),
        PageChart::new(
            "category-chart",
            &category_chart(&category_breakdown(expenses, filter)),
        ),
        PageChart::new(
            "budget-chart",
            &donut_chart(&budget_donut(summary.total, summary.total_budget)),
        ),
    ]
}

fn filter_form(selection: ExpensesSelection, farms: &[Farm]) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::EXPENSES_VIEW)
            class="flex flex-col sm:flex-row sm:items-end gap-4 w-full mb-6"
        {
            div
            {
                label for="window" class=(FORM_LABEL_STYLE) { "Time" }

                select id="window" name="window" class=(FORM_SELECT_STYLE)
                {
                    @for window in ExpenseWindow::ALL {
                        option value=(window) selected[selection.window == window]
                        { (window.label()) }
                    }
                }
            }

            div
            {
                label for="farm" class=(FORM_LABEL_STYLE) { "Farm" }

                select id="farm" name="farm" class=(FORM_SELECT_STYLE)
                {
                    option value="all" selected[selection.farm == FarmSelection::All] { "All Farms" }

                    @for farm in farms {
                        option
                            value=(farm.id)
                            selected[selection.farm == FarmSelection::Farm(farm.id)]
                        { (farm.name) }
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_SELECT_STYLE)
                {
                    option value="all" selected[selection.category.is_none()] { "All Categories" }

                    @for category in ExpenseCategory::ALL {
                        option value=(category) selected[selection.category == Some(category)]
                        { (category.label()) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    )
}

fn summary_cards(summary: &ExpenseSummary) -> Markup {
    let budget_variance = variance(summary.total_budget, summary.total);

    html!(
        section class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4 w-full mb-6"
        {
            (summary_card("total-expenses", "Total Expenses", &format_currency(summary.total), None))
            (summary_card("transaction-count", "Transactions", &summary.count.to_string(), None))
            (summary_card("average-expense", "Average", &format_currency(summary.average()), None))
            (summary_card(
                "budget-progress",
                "Budget Progress",
                &format_percent(utilization(summary.total_budget, summary.total)),
                None,
            ))
            (summary_card(
                "expense-budget-variance",
                "Budget Variance",
                &format!("{}{}", if budget_variance > 0.0 { "+" } else { "" }, format_percent(budget_variance)),
                Some(&format!("{} budgeted", format_currency(summary.total_budget))),
            ))
        }
    )
}

fn category_table(breakdown: &CategoryBreakdown, total: f64) -> Markup {
    html!(
        div class="relative overflow-x-auto shadow-md rounded w-full mb-6"
        {
            table id="categories" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                    }
                }

                tbody
                {
                    @for group in breakdown.iter() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (group.category.label()) }
                            td class=(TABLE_CELL_STYLE) { (group.count) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(group.total)) }
                            td class=(TABLE_CELL_STYLE) { (format_percent(utilization(total, group.total))) }
                        }
                    }
                }
            }
        }
    )
}

fn expense_table(expenses: &[&Expense], farms: &[Farm]) -> Markup {
    html!(
        div class="relative overflow-x-auto shadow-md rounded w-full"
        {
            table id="expenses" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Farm" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Vendor" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (expense.date) }
                            td class=(TABLE_CELL_STYLE) { (expense.description) }
                            td class=(TABLE_CELL_STYLE) { (expense.category.label()) }
                            td class=(TABLE_CELL_STYLE) { (farm_name(farms, expense.farm_id)) }
                            td class=(TABLE_CELL_STYLE) { (expense.vendor.as_deref().unwrap_or("-")) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(expense.amount)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-4"
                                {
                                    a
                                        href=(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id))
                                        class=(LINK_STYLE)
                                    {
                                        "Edit"
                                    }

                                    button
                                        hx-delete=(format_endpoint(endpoints::EXPENSE_FORM, expense.id))
                                        hx-confirm={
                                            "Are you sure you want to delete '"
                                            (expense.description) "'?"
                                        }
                                        hx-target-error="#alert-container"
                                        class=(BUTTON_DELETE_STYLE)
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn expenses_view(
    selection: ExpensesSelection,
    farms: &[Farm],
    summary: &ExpenseSummary,
    breakdown: &CategoryBreakdown,
    expenses: &[&Expense],
    charts: &[PageChart],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl" }
        {
            div class="flex flex-col sm:flex-row sm:items-end sm:justify-between gap-4 w-full mb-6"
            {
                div
                {
                    h1 class="text-3xl font-bold" { "Expense Tracking" }
                    p class="text-gray-600 dark:text-gray-400 mt-2"
                    {
                        "Monitor and break down your farm-related expenses."
                    }
                }

                a id="add-expense" href=(endpoints::NEW_EXPENSE_VIEW) class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Expense"
                }
            }

            (filter_form(selection, farms))

            @if expenses.is_empty() {
                p class="w-full text-center text-gray-600 dark:text-gray-400 py-8"
                {
                    "No expenses found for the selected filters."
                }
            } @else {
                (summary_cards(summary))
                (charts_view(charts))

                h2 class="text-xl font-semibold w-full mb-4" { "By Category" }
                (category_table(breakdown, summary.total))

                h2 class="text-xl font-semibold w-full mb-4" { "Expenses" }
                (expense_table(expenses, farms))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(charts),
    ];

    base("Expenses", &scripts, &content)
}

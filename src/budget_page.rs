//! The budget page: budgeted against actual spending, per-budget status and
//! projected profit for a farm and budget period.

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
        BudgetHealth, BudgetOverview, BudgetSelection, BudgetStatus, FarmSelection,
        PeriodSelection, farm_comparison,
    },
    budget::{Budget, BudgetPeriod},
    charts::{PageChart, charts_script, charts_view, farm_comparison_chart},
    config::AnalyticsConfig,
    endpoints::{self, format_endpoint},
    farm::{Farm, farm_name},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, ECHARTS_SCRIPT_URL, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, format_percent, summary_card,
    },
    navigation::NavBar,
    store::Stores,
};

/// The state needed for displaying the budget page.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    /// The record stores to read budgets, expenses, crops and farms from.
    pub stores: Arc<Mutex<Stores>>,
    /// The crop table used for the profit projection.
    pub analytics_config: Arc<AnalyticsConfig>,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            stores: state.stores.clone(),
            analytics_config: state.analytics_config.clone(),
        }
    }
}

/// The query string of the budget page.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    /// A farm ID or "all".
    pub farm: Option<String>,
    /// "monthly", "annual" or "all".
    pub period: Option<String>,
}

/// A row in the budget table.
struct BudgetRow<'a> {
    budget: &'a Budget,
    farm_name: &'a str,
    status: &'a BudgetStatus,
}

/// Display the budget overview for the farm and period in the query string.
pub async fn get_budget_page(
    State(state): State<BudgetPageState>,
    Query(query): Query<BudgetQuery>,
) -> Result<Response, Error> {
    let selection = BudgetSelection::parse(query.farm.as_deref(), query.period.as_deref())
        .inspect_err(|error| tracing::warn!("invalid budget page query: {error}"))?;

    let stores = state
        .stores
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
        .map_err(|_| Error::StoreLockError)?;

    let farms = stores.farms.list();
    let budgets = stores.budgets.list();

    let overview = BudgetOverview::compute(
        selection,
        budgets,
        stores.expenses.list(),
        stores.crops.list(),
        &state.analytics_config.crop_table,
    );

    let rows: Vec<BudgetRow> = overview
        .budgets
        .iter()
        .filter_map(|status| {
            let budget = stores.budgets.get(status.budget_id).ok()?;

            Some(BudgetRow {
                budget,
                farm_name: farm_name(farms, budget.farm_id),
                status,
            })
        })
        .collect();

    let comparison = farm_comparison(
        farms
            .iter()
            .filter(|farm| selection.farm.includes(farm.id)),
        budgets.iter().filter(|budget| selection.includes(budget)),
        stores.expenses.list(),
    );
    let charts = if farms.is_empty() {
        Vec::new()
    } else {
        vec![PageChart::new(
            "farm-comparison-chart",
            &farm_comparison_chart(&comparison),
        )]
    };

    Ok(budget_view(selection, farms, &overview, &rows, &charts).into_response())
}

fn period_label(selection: PeriodSelection) -> &'static str {
    match selection {
        PeriodSelection::Period(BudgetPeriod::Monthly) => "Monthly",
        PeriodSelection::Period(BudgetPeriod::Annual) => "Annual",
        PeriodSelection::All => "All Periods",
    }
}

fn health_badge(health: BudgetHealth) -> Markup {
    let style = match health {
        BudgetHealth::OnTrack => "text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300",
        BudgetHealth::NearLimit => {
            "text-yellow-800 bg-yellow-100 dark:bg-yellow-900 dark:text-yellow-300"
        }
        BudgetHealth::OverBudget => "text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300",
    };

    html!(
        span class={ "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full " (style) }
        {
            (health.label())
        }
    )
}

fn filter_form(selection: BudgetSelection, farms: &[Farm]) -> Markup {
    let periods = [
        PeriodSelection::Period(BudgetPeriod::Monthly),
        PeriodSelection::Period(BudgetPeriod::Annual),
        PeriodSelection::All,
    ];

    html!(
        form
            method="get"
            action=(endpoints::BUDGET_VIEW)
            class="flex flex-col sm:flex-row sm:items-end gap-4 w-full mb-6"
        {
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
                label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                select id="period" name="period" class=(FORM_SELECT_STYLE)
                {
                    @for period in periods {
                        option value=(period) selected[selection.period == period]
                        { (period_label(period)) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    )
}

fn summary_cards(overview: &BudgetOverview) -> Markup {
    let projection = &overview.projection;

    html!(
        section class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4 w-full mb-6"
        {
            (summary_card("total-budgeted", "Total Budgeted", &format_currency(overview.total_budgeted), None))
            (summary_card(
                "current-expenses",
                "Current Expenses",
                &format_currency(overview.current_expenses),
                Some(&format!("{} of budget used", format_percent(overview.utilization))),
            ))
            (summary_card(
                "budget-variance",
                "Budget Variance",
                &format!("{}{}", if overview.variance > 0.0 { "+" } else { "" }, format_percent(overview.variance)),
                None,
            ))
            (summary_card(
                "projected-revenue",
                "Projected Revenue",
                &format_currency(projection.projected_revenue),
                None,
            ))
            (summary_card(
                "projected-profit",
                "Projected Profit",
                &format_currency(projection.projected_profit),
                Some(&format!("{} with actual spending", format_currency(projection.actual_profit))),
            ))
            (summary_card(
                "profit-variance",
                "Profit Variance",
                &format_currency(projection.variance),
                None,
            ))
        }
    )
}

fn budget_table(rows: &[BudgetRow]) -> Markup {
    if rows.is_empty() {
        return html!(
            p class="w-full text-center text-gray-600 dark:text-gray-400 py-8"
            {
                "No budgets match the selected filters."
            }
        );
    }

    html!(
        div class="relative overflow-x-auto shadow-md rounded w-full"
        {
            table id="budgets" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Farm" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Dates" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Used" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (row.farm_name) }
                            td class=(TABLE_CELL_STYLE) { (row.budget.category.display_name()) }
                            td class=(TABLE_CELL_STYLE) { (period_label(PeriodSelection::Period(row.budget.period))) }
                            td class=(TABLE_CELL_STYLE) { (row.status.start_date) " to " (row.status.last_date) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(row.budget.budget_amount)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(row.status.spent)) }
                            td class=(TABLE_CELL_STYLE) { (format_percent(row.status.utilization)) }
                            td class=(TABLE_CELL_STYLE) { (health_badge(row.status.health)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-4"
                                {
                                    a
                                        href=(format_endpoint(endpoints::EDIT_BUDGET_VIEW, row.budget.id))
                                        class=(LINK_STYLE)
                                    {
                                        "Edit"
                                    }

                                    button
                                        hx-delete=(format_endpoint(endpoints::BUDGET_FORM, row.budget.id))
                                        hx-confirm={
                                            "Are you sure you want to delete the "
                                            (row.budget.category.display_name()) " budget for "
                                            (row.farm_name) "?"
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

fn budget_view(
    selection: BudgetSelection,
    farms: &[Farm],
    overview: &BudgetOverview,
    rows: &[BudgetRow],
    charts: &[PageChart],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl" }
        {
            div class="flex flex-col sm:flex-row sm:items-end sm:justify-between gap-4 w-full mb-6"
            {
                div
                {
                    h1 class="text-3xl font-bold" { "Budget Overview" }
                    p class="text-gray-600 dark:text-gray-400 mt-2"
                    {
                        "Track budgets against spending and the profit your crops are expected to bring in."
                    }
                }

                a id="add-budget" href=(endpoints::NEW_BUDGET_VIEW) class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Budget"
                }
            }

            (filter_form(selection, farms))
            (summary_cards(overview))
            (charts_view(charts))

            h2 class="text-xl font-semibold w-full mb-4" { "Budgets" }
            (budget_table(rows))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(charts),
    ];

    base("Budget", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        Error,
        budget_page::{BudgetPageState, BudgetQuery, get_budget_page},
        endpoints,
        store::Stores,
        test_utils::{
            assert_form_method_and_action, assert_form_select, assert_form_submit_button,
            assert_status_ok, assert_valid_html, must_get_form, must_select_text,
            parse_html_document, seeded_stores, test_state,
        },
    };

    fn page_state(stores: Stores) -> State<BudgetPageState> {
        let state = test_state(stores);

        State(BudgetPageState {
            stores: state.stores,
            analytics_config: state.analytics_config,
        })
    }

    fn query(farm: Option<&str>, period: Option<&str>) -> Query<BudgetQuery> {
        Query(BudgetQuery {
            farm: farm.map(str::to_owned),
            period: period.map(str::to_owned),
        })
    }

    #[tokio::test]
    async fn defaults_to_monthly_budgets_for_every_farm() {
        let response = get_budget_page(page_state(seeded_stores()), query(None, None))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(must_select_text(&html, "#total-budgeted"), ["$150.00"]);
        assert_eq!(must_select_text(&html, "#current-expenses"), ["$600.00"]);
        assert_eq!(must_select_text(&html, "#budget-variance"), ["+300.0%"]);

        let rows = must_select_text(&html, "#budgets tbody tr");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("North Field"));
        assert!(rows[0].contains("$200.00"));
        assert!(rows[0].contains("Over budget"));

        let chart_selector = Selector::parse("#farm-comparison-chart").unwrap();
        assert!(html.select(&chart_selector).next().is_some());
    }

    #[tokio::test]
    async fn narrows_to_a_farm_and_period() {
        let response = get_budget_page(page_state(seeded_stores()), query(Some("2"), Some("all")))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(must_select_text(&html, "#total-budgeted"), ["$5,000.00"]);
        assert_eq!(must_select_text(&html, "#current-expenses"), ["$300.00"]);
        assert_eq!(must_select_text(&html, "#projected-revenue"), ["$625.00"]);

        let rows = must_select_text(&html, "#budgets tbody tr");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("South Orchard"));
        assert!(rows[0].contains("On track"));
    }

    #[tokio::test]
    async fn farm_comparison_only_charts_the_selected_farm() {
        let response = get_budget_page(page_state(seeded_stores()), query(Some("1"), Some("all")))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let scripts = must_select_text(&html, "head script").concat();

        assert!(scripts.contains("North Field"));
        assert!(
            !scripts.contains("South Orchard"),
            "unselected farms should not be charted"
        );
    }

    #[tokio::test]
    async fn budget_rows_link_to_edit_and_delete() {
        let response = get_budget_page(page_state(seeded_stores()), query(None, Some("all")))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let add_link = html
            .select(&Selector::parse("#add-budget").unwrap())
            .next()
            .expect("No add budget link found");
        assert_eq!(add_link.value().attr("href"), Some(endpoints::NEW_BUDGET_VIEW));

        let edit_links: Vec<_> = html
            .select(&Selector::parse("#budgets tbody tr a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(edit_links, ["/budget/1/edit", "/budget/2/edit"]);

        let delete_targets: Vec<_> = html
            .select(&Selector::parse("#budgets tbody tr button").unwrap())
            .filter_map(|button| button.value().attr("hx-delete"))
            .collect();
        assert_eq!(delete_targets, ["/budget/1", "/budget/2"]);

        assert_form_method_and_action(&must_get_form(&html), "get", endpoints::BUDGET_VIEW);
    }

    #[tokio::test]
    async fn filter_form_keeps_the_selection() {
        let response = get_budget_page(page_state(seeded_stores()), query(Some("1"), Some("annual")))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);

        assert_form_method_and_action(&form, "get", endpoints::BUDGET_VIEW);
        assert_form_select(&form, "farm", &["all", "1", "2"], "1");
        assert_form_select(&form, "period", &["monthly", "annual", "all"], "annual");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn shows_empty_state_without_budgets() {
        let response = get_budget_page(page_state(Stores::default()), query(None, None))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No budgets match the selected filters."));
        assert_eq!(must_select_text(&html, "#total-budgeted"), ["$0.00"]);
    }

    #[tokio::test]
    async fn unknown_period_is_a_bad_request() {
        let result = get_budget_page(page_state(seeded_stores()), query(None, Some("weekly"))).await;

        let Err(error) = result else {
            panic!("want an error for an unknown period");
        };
        assert!(matches!(error, Error::InvalidSelection(_)));

        let response = axum::response::IntoResponse::into_response(error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! The dashboard: farm, crop and task counts, this month's spending, the
//! tasks coming up this week and how far along each crop is.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error,
    analytics::{ExpenseWindow, sum_expenses},
    crop::{Crop, CropStatus},
    endpoints,
    farm::{Farm, farm_name},
    html::{
        CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, summary_card,
    },
    navigation::NavBar,
    store::Stores,
    task::{Task, task_completion_rate, upcoming_tasks},
    timezone::local_today,
};

/// How many days ahead the upcoming task list looks.
const UPCOMING_TASK_DAYS: i64 = 7;
/// The most upcoming tasks shown on the dashboard.
const UPCOMING_TASK_LIMIT: usize = 5;

/// The state needed for displaying the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The record stores to summarise.
    pub stores: Arc<Mutex<Stores>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            stores: state.stores.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the dashboard as of today in the local timezone.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let stores = state
        .stores
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
        .map_err(|_| Error::StoreLockError)?;

    Ok(dashboard_view(today, &stores).into_response())
}

fn summary_cards(today: Date, stores: &Stores) -> Markup {
    let tasks = stores.tasks.list();
    let active_crops = stores
        .crops
        .list()
        .iter()
        .filter(|crop| crop.status == CropStatus::Growing)
        .count();
    let pending_tasks = tasks.iter().filter(|task| !task.completed).count();
    let monthly_expenses = sum_expenses(
        stores.expenses.list(),
        &ExpenseWindow::ThisMonth.to_filter(today),
    );

    html!(
        section class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4 w-full mb-6"
        {
            (summary_card("total-farms", "Total Farms", &stores.farms.list().len().to_string(), None))
            (summary_card("active-crops", "Active Crops", &active_crops.to_string(), None))
            (summary_card("pending-tasks", "Pending Tasks", &pending_tasks.to_string(), None))
            (summary_card("monthly-expenses", "This Month's Expenses", &format_currency(monthly_expenses), None))
            (summary_card(
                "task-completion",
                "Task Completion",
                &format!("{}%", task_completion_rate(tasks)),
                None,
            ))
        }
    )
}

fn task_list(id: &str, tasks: &[&Task], farms: &[Farm], empty_message: &str) -> Markup {
    html!(
        @if tasks.is_empty() {
            p class="text-gray-600 dark:text-gray-400" { (empty_message) }
        } @else {
            ul id=(id) class="space-y-2"
            {
                @for task in tasks {
                    li class="flex justify-between gap-4"
                    {
                        span
                        {
                            span class="font-medium" { (task.title) }
                            " "
                            span class="text-gray-500 dark:text-gray-400" { (farm_name(farms, task.farm_id)) }
                        }
                        span { (task.due_date) }
                    }
                }
            }
        }
    )
}

fn crop_table(today: Date, crops: &[Crop], farms: &[Farm]) -> Markup {
    if crops.is_empty() {
        return html!(
            p class="w-full text-center text-gray-600 dark:text-gray-400 py-8"
            {
                "No crops have been planted yet."
            }
        );
    }

    html!(
        div class="relative overflow-x-auto shadow-md rounded w-full"
        {
            table id="crops" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Crop" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Farm" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Days Growing" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Days to Harvest" }
                    }
                }

                tbody
                {
                    @for crop in crops {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                (crop.name)
                                @if let Some(variety) = &crop.variety {
                                    " (" (variety) ")"
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (farm_name(farms, crop.farm_id)) }
                            td class=(TABLE_CELL_STYLE) { (crop.status.as_str()) }
                            td class=(TABLE_CELL_STYLE) { (crop.growth_days(today)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @match crop.days_to_harvest(today) {
                                    Some(days) if days < 0 => { (days.abs()) " overdue" }
                                    Some(days) => { (days) }
                                    None => { "-" }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn dashboard_view(today: Date, stores: &Stores) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let farms = stores.farms.list();
    let tasks = stores.tasks.list();

    let mut upcoming = upcoming_tasks(tasks, today, UPCOMING_TASK_DAYS);
    upcoming.truncate(UPCOMING_TASK_LIMIT);

    let mut overdue: Vec<&Task> = tasks
        .iter()
        .filter(|task| !task.completed && task.is_overdue(today))
        .collect();
    overdue.sort_by_key(|task| task.due_date);

    let content = html!(
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl" }
        {
            div class="w-full mb-6"
            {
                h1 class="text-3xl font-bold" { "Farm Dashboard" }
                p class="text-gray-600 dark:text-gray-400 mt-2"
                {
                    "An overview of your farms, crops and the work coming up."
                }
            }

            (summary_cards(today, stores))

            div class="grid grid-cols-1 lg:grid-cols-2 gap-4 w-full mb-6"
            {
                div class=(CARD_STYLE)
                {
                    h2 class="text-xl font-semibold mb-4" { "Upcoming Tasks" }
                    (task_list("upcoming-tasks", &upcoming, farms, "No tasks due in the next week."))
                }

                div class=(CARD_STYLE)
                {
                    h2 class="text-xl font-semibold mb-4" { "Overdue Tasks" }
                    (task_list("overdue-tasks", &overdue, farms, "Nothing is overdue."))
                }
            }

            h2 class="text-xl font-semibold w-full mb-4" { "Crops" }
            (crop_table(today, stores.crops.list(), farms))
        }
    );

    base("Dashboard", &[], &content)
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use axum_test::TestServer;
    use time::{Date, Duration};

    use crate::{
        build_router,
        crop::{CropData, CropStatus},
        dashboard::{DashboardState, get_dashboard_page},
        endpoints,
        expense::{ExpenseCategory, ExpenseData},
        farm::FarmData,
        store::Stores,
        task::TaskData,
        test_utils::{
            assert_status_ok, assert_valid_html, must_select_text, parse_html_document,
            seeded_stores, test_state,
        },
        timezone::local_today,
    };

    fn task(title: &str, due_date: Date, completed: bool) -> TaskData {
        TaskData {
            farm_id: 1,
            crop_id: None,
            title: title.to_owned(),
            due_date: due_date.to_string(),
            completed,
        }
    }

    /// A farm with tasks and a crop dated relative to `today`.
    fn stores_around(today: Date) -> Stores {
        let mut stores = Stores::default();

        stores
            .farms
            .create(FarmData {
                name: "Hillside".to_owned(),
                location: None,
                size_acres: None,
            })
            .unwrap();

        for (title, days, completed) in [
            ("Fix fence", 3, false),
            ("Spray weeds", 1, false),
            ("Order seed", 10, false),
            ("Clean shed", -2, false),
            ("Sharpen blades", 2, true),
        ] {
            stores
                .tasks
                .create(task(title, today + Duration::days(days), completed))
                .unwrap();
        }

        stores
            .crops
            .create(CropData {
                farm_id: 1,
                name: "Wheat".to_owned(),
                variety: Some("Winter".to_owned()),
                status: CropStatus::Growing,
                planting_date: (today - Duration::days(30)).to_string(),
                expected_harvest: Some((today + Duration::days(45)).to_string()),
            })
            .unwrap();
        stores
            .crops
            .create(CropData {
                farm_id: 1,
                name: "Barley".to_owned(),
                variety: None,
                status: CropStatus::Harvesting,
                planting_date: (today - Duration::days(100)).to_string(),
                expected_harvest: Some((today - Duration::days(4)).to_string()),
            })
            .unwrap();

        stores
            .expenses
            .create(ExpenseData {
                farm_id: 1,
                category: ExpenseCategory::Fuel,
                amount: 42.5,
                date: today.to_string(),
                description: "Diesel".to_owned(),
                vendor: None,
            })
            .unwrap();

        stores
    }

    fn page_state(stores: Stores) -> State<DashboardState> {
        let state = test_state(stores);

        State(DashboardState {
            stores: state.stores,
            local_timezone: state.local_timezone,
        })
    }

    #[tokio::test]
    async fn summarises_farms_crops_and_tasks() {
        let today = local_today("Etc/UTC").unwrap();

        let response = get_dashboard_page(page_state(stores_around(today)))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(must_select_text(&html, "#total-farms"), ["1"]);
        assert_eq!(must_select_text(&html, "#active-crops"), ["1"]);
        assert_eq!(must_select_text(&html, "#pending-tasks"), ["4"]);
        assert_eq!(must_select_text(&html, "#monthly-expenses"), ["$42.50"]);
        assert_eq!(must_select_text(&html, "#task-completion"), ["20%"]);
    }

    #[tokio::test]
    async fn lists_this_weeks_tasks_soonest_first() {
        let today = local_today("Etc/UTC").unwrap();

        let response = get_dashboard_page(page_state(stores_around(today)))
            .await
            .unwrap();

        let html = parse_html_document(response).await;

        let upcoming = must_select_text(&html, "#upcoming-tasks li");
        assert_eq!(upcoming.len(), 2, "got {upcoming:?}");
        assert!(upcoming[0].starts_with("Spray weeds"));
        assert!(upcoming[1].starts_with("Fix fence"));

        let overdue = must_select_text(&html, "#overdue-tasks li");
        assert_eq!(overdue.len(), 1, "got {overdue:?}");
        assert!(overdue[0].starts_with("Clean shed"));
    }

    #[tokio::test]
    async fn shows_crop_growth_and_harvest_countdown() {
        let today = local_today("Etc/UTC").unwrap();

        let response = get_dashboard_page(page_state(stores_around(today)))
            .await
            .unwrap();

        let html = parse_html_document(response).await;

        let cells = must_select_text(&html, "#crops tbody td");
        assert_eq!(
            cells,
            [
                "Wheat (Winter)",
                "Hillside",
                "growing",
                "30",
                "45",
                "Barley",
                "Hillside",
                "harvesting",
                "100",
                "4 overdue",
            ]
        );
    }

    #[tokio::test]
    async fn dashboard_is_routed() {
        let server = TestServer::try_new(build_router(test_state(seeded_stores())))
            .expect("Could not create test server.");

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_ok();
        let text = response.text();
        assert!(text.contains("Farm Dashboard"));
        // The seeded tasks are from 2024, so the open one is overdue.
        assert!(text.contains("Irrigate corn"));
        assert!(text.contains("No tasks due in the next week."));
    }

    #[tokio::test]
    async fn empty_stores_show_empty_states() {
        let response = get_dashboard_page(page_state(Stores::default()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(must_select_text(&html, "#task-completion"), ["0%"]);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Nothing is overdue."));
        assert!(text.contains("No crops have been planted yet."));
    }
}

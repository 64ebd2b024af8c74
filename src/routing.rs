//! Application router configuration with the page, form, analytics and record routes.

use axum::{
    Router,
    response::Redirect,
    routing::{get, put},
};

use crate::{
    AppState,
    api::{
        create_record, delete_record, get_budget_analytics, get_expense_analytics, get_record,
        list_records, update_record,
    },
    budget::Budget,
    budget_forms::{
        create_budget_endpoint, delete_budget_endpoint, get_edit_budget_page,
        get_new_budget_page, update_budget_endpoint,
    },
    budget_page::get_budget_page,
    crop::Crop,
    dashboard::get_dashboard_page,
    endpoints,
    expense::Expense,
    expense_forms::{
        create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        get_new_expense_page, update_expense_endpoint,
    },
    expenses_page::get_expenses_page,
    farm::Farm,
    not_found::get_404_not_found,
    task::Task,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::BUDGET_VIEW,
            get(get_budget_page).post(create_budget_endpoint),
        )
        .route(
            endpoints::EXPENSES_VIEW,
            get(get_expenses_page).post(create_expense_endpoint),
        );

    let form_routes = Router::new()
        .route(endpoints::NEW_BUDGET_VIEW, get(get_new_budget_page))
        .route(endpoints::EDIT_BUDGET_VIEW, get(get_edit_budget_page))
        .route(
            endpoints::BUDGET_FORM,
            put(update_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(
            endpoints::EXPENSE_FORM,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        );

    let analytics_routes = Router::new()
        .route(endpoints::EXPENSE_ANALYTICS_API, get(get_expense_analytics))
        .route(endpoints::BUDGET_ANALYTICS_API, get(get_budget_analytics));

    let record_routes = Router::new()
        .route(
            endpoints::FARMS_API,
            get(list_records::<Farm>).post(create_record::<Farm>),
        )
        .route(
            endpoints::FARM_API,
            get(get_record::<Farm>)
                .put(update_record::<Farm>)
                .delete(delete_record::<Farm>),
        )
        .route(
            endpoints::CROPS_API,
            get(list_records::<Crop>).post(create_record::<Crop>),
        )
        .route(
            endpoints::CROP_API,
            get(get_record::<Crop>)
                .put(update_record::<Crop>)
                .delete(delete_record::<Crop>),
        )
        .route(
            endpoints::TASKS_API,
            get(list_records::<Task>).post(create_record::<Task>),
        )
        .route(
            endpoints::TASK_API,
            get(get_record::<Task>)
                .put(update_record::<Task>)
                .delete(delete_record::<Task>),
        )
        .route(
            endpoints::EXPENSES_API,
            get(list_records::<Expense>).post(create_record::<Expense>),
        )
        .route(
            endpoints::EXPENSE_API,
            get(get_record::<Expense>)
                .put(update_record::<Expense>)
                .delete(delete_record::<Expense>),
        )
        .route(
            endpoints::BUDGETS_API,
            get(list_records::<Budget>).post(create_record::<Budget>),
        )
        .route(
            endpoints::BUDGET_API,
            get(get_record::<Budget>)
                .put(update_record::<Budget>)
                .delete(delete_record::<Budget>),
        );

    page_routes
        .merge(form_routes)
        .merge(analytics_routes)
        .merge(record_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the budget page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::BUDGET_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{
        build_router, endpoints,
        test_utils::{seeded_stores, test_state},
    };

    fn get_test_server() -> TestServer {
        TestServer::try_new(build_router(test_state(seeded_stores())))
            .expect("Could not create test server.")
    }

    #[tokio::test]
    async fn pages_are_served_as_html() {
        let server = get_test_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::BUDGET_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_BUDGET_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            "/budget/1/edit",
            "/expenses/1/edit",
        ] {
            let response = server.get(endpoint).await;

            response.assert_status_ok();
            assert_eq!(
                response.header("content-type"),
                "text/html; charset=utf-8",
                "content type for {endpoint}"
            );
        }
    }

    #[tokio::test]
    async fn page_query_is_passed_to_the_handler() {
        let server = get_test_server();

        let response = server
            .get(endpoints::BUDGET_VIEW)
            .add_query_param("farm", "north")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("unknown farm"));
    }

    #[tokio::test]
    async fn expense_form_round_trip() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_VIEW)
            .form(&[
                ("farm_id", "2"),
                ("category", "fertilizer"),
                ("amount", "80"),
                ("date", "2024-03-01"),
                ("description", "Compost"),
                ("vendor", ""),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::EXPENSES_VIEW);
        assert!(server.get(endpoints::EXPENSES_VIEW).await.text().contains("Compost"));

        let response = server
            .put("/expenses/4")
            .form(&[
                ("farm_id", "2"),
                ("category", "fertilizer"),
                ("amount", "95"),
                ("date", "2024-03-01"),
                ("description", "Mulch"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let text = server.get(endpoints::EXPENSES_VIEW).await.text();
        assert!(text.contains("Mulch"));
        assert!(!text.contains("Compost"));

        server
            .delete("/expenses/4")
            .await
            .assert_status(StatusCode::SEE_OTHER);
        assert!(!server.get(endpoints::EXPENSES_VIEW).await.text().contains("Mulch"));

        server
            .delete("/expenses/4")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn budget_form_accepts_blank_optional_fields() {
        let server = get_test_server();

        let response = server
            .post(endpoints::BUDGET_VIEW)
            .form(&[
                ("farm_id", "1"),
                ("period", "annual"),
                ("category", "seeds"),
                ("budget_amount", "400"),
                ("start_date", "2024-01-01"),
                ("projected_yield", ""),
                ("notes", ""),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::BUDGET_VIEW);

        let budget = server.get("/api/budgets/3").await.json::<serde_json::Value>();
        assert_eq!(budget["category"], "seeds");
        assert_eq!(budget["projected_yield"], serde_json::Value::Null);
        assert_eq!(budget["notes"], serde_json::Value::Null);

        let response = server
            .post(endpoints::BUDGET_VIEW)
            .form(&[
                ("farm_id", "1"),
                ("period", "monthly"),
                ("category", "total"),
                ("budget_amount", "-1"),
                ("start_date", "2024-01-01"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("amount must not be negative"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/barns").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("404"));
    }
}

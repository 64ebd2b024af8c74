//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/farms/{farm_id}', use [format_endpoint].

/// The root route which redirects to the budget page.
pub const ROOT: &str = "/";
/// The overview of farms, crops and upcoming tasks.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page summarising budgets, spending and projected profit.
/// Budget forms are also posted here.
pub const BUDGET_VIEW: &str = "/budget";
/// The page for creating a budget.
pub const NEW_BUDGET_VIEW: &str = "/budget/new";
/// The page for editing a budget.
pub const EDIT_BUDGET_VIEW: &str = "/budget/{budget_id}/edit";
/// The route the budget edit form and delete button send to.
pub const BUDGET_FORM: &str = "/budget/{budget_id}";
/// The page breaking down farm expenses.
/// Expense forms are also posted here.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for creating an expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The route the expense edit form and delete button send to.
pub const EXPENSE_FORM: &str = "/expenses/{expense_id}";

/// The route for expense analytics as JSON.
pub const EXPENSE_ANALYTICS_API: &str = "/api/analytics/expenses";
/// The route for the budget overview as JSON.
pub const BUDGET_ANALYTICS_API: &str = "/api/analytics/budget";

/// The route to list and create farms.
pub const FARMS_API: &str = "/api/farms";
/// The route to access a single farm.
pub const FARM_API: &str = "/api/farms/{farm_id}";
/// The route to list and create crops.
pub const CROPS_API: &str = "/api/crops";
/// The route to access a single crop.
pub const CROP_API: &str = "/api/crops/{crop_id}";
/// The route to list and create tasks.
pub const TASKS_API: &str = "/api/tasks";
/// The route to access a single task.
pub const TASK_API: &str = "/api/tasks/{task_id}";
/// The route to list and create expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";
/// The route to list and create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to access a single budget.
pub const BUDGET_API: &str = "/api/budgets/{budget_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/farms/{farm_id}', '{farm_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

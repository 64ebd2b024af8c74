//! Budget and expense analytics.
//!
//! Pure functions over in-memory collections: nothing here touches the
//! record stores or the web layer, and every result is recomputed from its
//! inputs on each call.

mod aggregation;
mod chart_data;
mod evaluation;
mod projection;

pub use aggregation::{
    CategoryBreakdown, CategoryGroup, ExpenseFilter, ExpenseWindow, MonthlyTrend,
    group_by_category, monthly_trend, sum_expenses, total_amount,
};
pub use chart_data::{
    BudgetDonut, ChartSeries, FarmComparison, budget_donut, category_breakdown, farm_comparison,
};
pub use evaluation::{
    BudgetHealth, BudgetOverview, BudgetSelection, BudgetStatus, FarmSelection, PeriodSelection,
    utilization, variance,
};
pub use projection::{CropEstimate, ProfitProjection, estimate_crop, projected_profit};

//! Budget utilization, variance and the budget page overview.

use std::{fmt, str::FromStr};

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    analytics::{
        aggregation::total_amount,
        projection::{ProfitProjection, projected_profit},
    },
    budget::{Budget, BudgetId, BudgetPeriod},
    config::CropTable,
    crop::Crop,
    expense::Expense,
    farm::FarmId,
};

/// The utilization above which a budget is flagged as near its limit.
const NEAR_LIMIT_UTILIZATION: f64 = 80.0;

/// The percentage of `budget_amount` that `actual` uses, capped at 100.
///
/// Zero when nothing was budgeted.
pub fn utilization(budget_amount: f64, actual: f64) -> f64 {
    if budget_amount > 0.0 {
        (actual / budget_amount * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// How far `actual` is over (positive) or under (negative) `budget_amount`,
/// as a percentage of the budget.
///
/// Zero when nothing was budgeted.
pub fn variance(budget_amount: f64, actual: f64) -> f64 {
    if budget_amount > 0.0 {
        (actual - budget_amount) / budget_amount * 100.0
    } else {
        0.0
    }
}

/// How a budget is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    /// Spending is comfortably within the budget.
    OnTrack,
    /// Spending has used more than 80% of the budget.
    NearLimit,
    /// Spending has exceeded the budget.
    OverBudget,
}

impl BudgetHealth {
    /// Classify spending of `actual` against `budget_amount`.
    ///
    /// Any spending against a zero budget counts as over budget.
    pub fn classify(budget_amount: f64, actual: f64) -> Self {
        if variance(budget_amount, actual) > 0.0 || (budget_amount <= 0.0 && actual > 0.0) {
            BudgetHealth::OverBudget
        } else if utilization(budget_amount, actual) > NEAR_LIMIT_UTILIZATION {
            BudgetHealth::NearLimit
        } else {
            BudgetHealth::OnTrack
        }
    }

    /// The text shown on status badges.
    pub fn label(self) -> &'static str {
        match self {
            BudgetHealth::OnTrack => "On track",
            BudgetHealth::NearLimit => "Near limit",
            BudgetHealth::OverBudget => "Over budget",
        }
    }
}

/// The spending against one budget over its period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// The budget being evaluated.
    pub budget_id: BudgetId,
    /// The first day of the budget period.
    pub start_date: Date,
    /// The last day of the budget period.
    pub last_date: Date,
    /// The amount the farm spent during the period.
    pub spent: f64,
    /// See [utilization].
    pub utilization: f64,
    /// See [variance].
    pub variance: f64,
    /// The overall health of the budget.
    pub health: BudgetHealth,
}

impl BudgetStatus {
    /// Evaluate `budget` against the expenses of its farm that fall within
    /// the budget period.
    pub fn evaluate(budget: &Budget, expenses: &[Expense]) -> Self {
        let spent = total_amount(
            expenses
                .iter()
                .filter(|expense| expense.farm_id == budget.farm_id && budget.covers(expense.date)),
        );
        let end_date = budget.end_date();

        Self {
            budget_id: budget.id,
            start_date: budget.start_date,
            last_date: end_date.previous_day().unwrap_or(end_date),
            spent,
            utilization: utilization(budget.budget_amount, spent),
            variance: variance(budget.budget_amount, spent),
            health: BudgetHealth::classify(budget.budget_amount, spent),
        }
    }
}

/// Which farms to include in the budget analytics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FarmSelection {
    /// Every farm.
    #[default]
    All,
    /// A single farm.
    Farm(FarmId),
}

impl FarmSelection {
    /// The selected farm ID, or `None` when every farm is selected.
    pub fn farm_id(self) -> Option<FarmId> {
        match self {
            FarmSelection::All => None,
            FarmSelection::Farm(farm_id) => Some(farm_id),
        }
    }

    /// Whether records belonging to `farm_id` are selected.
    pub fn includes(self, farm_id: FarmId) -> bool {
        self.farm_id().is_none_or(|selected| selected == farm_id)
    }
}

impl fmt::Display for FarmSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FarmSelection::All => f.write_str("all"),
            FarmSelection::Farm(farm_id) => write!(f, "{farm_id}"),
        }
    }
}

impl FromStr for FarmSelection {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "" | "all" => Ok(FarmSelection::All),
            text => text
                .parse()
                .map(FarmSelection::Farm)
                .map_err(|_| Error::InvalidSelection(format!("unknown farm \"{text}\""))),
        }
    }
}

/// Which budget periods to include in the budget analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelection {
    /// Budgets of every period.
    All,
    /// Only budgets of one period.
    Period(BudgetPeriod),
}

impl Default for PeriodSelection {
    fn default() -> Self {
        PeriodSelection::Period(BudgetPeriod::Monthly)
    }
}

impl PeriodSelection {
    /// Whether budgets of `period` are selected.
    pub fn includes(self, period: BudgetPeriod) -> bool {
        match self {
            PeriodSelection::All => true,
            PeriodSelection::Period(selected) => selected == period,
        }
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSelection::All => f.write_str("all"),
            PeriodSelection::Period(period) => write!(f, "{period}"),
        }
    }
}

impl FromStr for PeriodSelection {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "" => Ok(PeriodSelection::default()),
            "all" => Ok(PeriodSelection::All),
            text => text.parse().map(PeriodSelection::Period),
        }
    }
}

/// The farm and period the budget analytics are narrowed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetSelection {
    /// The selected farms.
    pub farm: FarmSelection,
    /// The selected budget periods.
    pub period: PeriodSelection,
}

impl BudgetSelection {
    /// Build a selection from raw query values.
    ///
    /// A missing farm selects every farm, a missing period selects monthly budgets.
    ///
    /// # Errors
    /// Returns [Error::InvalidSelection] for an unknown farm or period.
    pub fn parse(farm: Option<&str>, period: Option<&str>) -> Result<Self, Error> {
        Ok(Self {
            farm: farm.map(str::parse::<FarmSelection>).transpose()?.unwrap_or_default(),
            period: period.map(str::parse::<PeriodSelection>).transpose()?.unwrap_or_default(),
        })
    }

    /// Whether `budget` matches both the farm and the period selection.
    pub fn includes(&self, budget: &Budget) -> bool {
        self.farm.includes(budget.farm_id) && self.period.includes(budget.period)
    }
}

/// The summary shown on the budget page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetOverview {
    /// Sum of the selected budgets.
    pub total_budgeted: f64,
    /// Sum of every expense of the selected farms.
    pub current_expenses: f64,
    /// See [utilization].
    pub utilization: f64,
    /// See [variance].
    pub variance: f64,
    /// Profit projected from the crops of the selected farms.
    pub projection: ProfitProjection,
    /// Per-budget status of the selected budgets, most recent start first.
    pub budgets: Vec<BudgetStatus>,
}

impl BudgetOverview {
    /// Summarize the budgets matching `selection`.
    ///
    /// Expenses and crops are narrowed by farm only, so the current expenses
    /// are not limited to the selected budgets' periods.
    pub fn compute(
        selection: BudgetSelection,
        budgets: &[Budget],
        expenses: &[Expense],
        crops: &[Crop],
        crop_table: &CropTable,
    ) -> Self {
        let mut selected_budgets: Vec<&Budget> = budgets
            .iter()
            .filter(|budget| selection.includes(budget))
            .collect();
        selected_budgets.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let farm_expenses: Vec<&Expense> = expenses
            .iter()
            .filter(|expense| selection.farm.includes(expense.farm_id))
            .collect();
        let farm_crops = crops
            .iter()
            .filter(|crop| selection.farm.includes(crop.farm_id));

        let projection = projected_profit(
            farm_crops,
            selected_budgets.iter().copied(),
            farm_expenses.iter().copied(),
            crop_table,
        );
        let total_budgeted = projection.budgeted_expenses;
        let current_expenses = projection.actual_expenses;

        Self {
            total_budgeted,
            current_expenses,
            utilization: utilization(total_budgeted, current_expenses),
            variance: variance(total_budgeted, current_expenses),
            projection,
            budgets: selected_budgets
                .into_iter()
                .map(|budget| BudgetStatus::evaluate(budget, expenses))
                .collect(),
        }
    }
}

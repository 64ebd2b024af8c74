//! Revenue and profit projections from planted crops.

use serde::Serialize;

use crate::{
    budget::Budget,
    config::CropTable,
    crop::{Crop, CropId},
    expense::Expense,
};

/// The expected harvest of one crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropEstimate {
    /// The crop the estimate is for.
    pub crop_id: CropId,
    /// Units expected from the crop at its current stage.
    pub estimated_yield: f64,
    /// Expected sale price per unit.
    pub estimated_price: f64,
}

impl CropEstimate {
    /// The expected revenue from selling the whole yield.
    pub fn revenue(&self) -> f64 {
        self.estimated_yield * self.estimated_price
    }
}

/// Estimate the yield and price of `crop` using `crop_table`.
pub fn estimate_crop(crop: &Crop, crop_table: &CropTable) -> CropEstimate {
    let economics = crop_table.lookup(&crop.name);

    CropEstimate {
        crop_id: crop.id,
        estimated_yield: economics.base_yield * crop.status.yield_multiplier(),
        estimated_price: economics.price,
    }
}

/// Projected revenue against budgeted and actual spending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfitProjection {
    /// Expected revenue from all crops.
    pub projected_revenue: f64,
    /// Sum of the budget amounts.
    pub budgeted_expenses: f64,
    /// Sum of the expense amounts.
    pub actual_expenses: f64,
    /// Revenue minus budgeted spending.
    pub projected_profit: f64,
    /// Revenue minus actual spending.
    pub actual_profit: f64,
    /// Actual profit minus projected profit. Positive when spending came in
    /// under budget.
    pub variance: f64,
}

/// Project profit for `crops` against `budgets` and `expenses`.
pub fn projected_profit<'a>(
    crops: impl IntoIterator<Item = &'a Crop>,
    budgets: impl IntoIterator<Item = &'a Budget>,
    expenses: impl IntoIterator<Item = &'a Expense>,
    crop_table: &CropTable,
) -> ProfitProjection {
    let projected_revenue = crops
        .into_iter()
        .map(|crop| estimate_crop(crop, crop_table).revenue())
        .sum::<f64>();
    let budgeted_expenses = budgets
        .into_iter()
        .map(|budget| budget.budget_amount)
        .sum::<f64>();
    let actual_expenses = expenses
        .into_iter()
        .map(|expense| expense.amount)
        .sum::<f64>();

    let projected_profit = projected_revenue - budgeted_expenses;
    let actual_profit = projected_revenue - actual_expenses;

    ProfitProjection {
        projected_revenue,
        budgeted_expenses,
        actual_expenses,
        projected_profit,
        actual_profit,
        variance: actual_profit - projected_profit,
    }
}

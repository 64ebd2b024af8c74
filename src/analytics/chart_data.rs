//! Reshapes analytics results into the label/data/color arrays charts consume.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    analytics::aggregation::{ExpenseFilter, group_by_category},
    budget::Budget,
    expense::Expense,
    farm::{Farm, FarmId},
};

const USED_BUDGET_LABEL: &str = "Used Budget";
const OVER_BUDGET_LABEL: &str = "Over Budget";
const REMAINING_BUDGET_LABEL: &str = "Remaining Budget";

const OVER_BUDGET_COLORS: [&str; 2] = ["#ef4444", "#991b1b"];
const WITHIN_BUDGET_COLORS: [&str; 2] = ["#3b82f6", "#e5e7eb"];

/// A single series of values with one label per value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    /// The label for each value.
    pub labels: Vec<String>,
    /// The values.
    pub data: Vec<f64>,
}

impl ChartSeries {
    /// Whether the series has no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Spending per category for the expenses selected by `filter`, in the
/// order each category first appears.
pub fn category_breakdown(expenses: &[Expense], filter: &ExpenseFilter) -> ChartSeries {
    let breakdown = group_by_category(filter.apply(expenses));

    let (labels, data): (Vec<String>, Vec<f64>) = breakdown
        .iter()
        .map(|group| (group.category.as_str().replace('_', " "), group.total))
        .unzip();

    ChartSeries { labels, data }
}

/// The two slices of the budget donut chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetDonut {
    /// The slice labels.
    pub labels: [&'static str; 2],
    /// The slice values.
    pub data: [f64; 2],
    /// The slice colors as hex strings.
    pub colors: [&'static str; 2],
}

impl BudgetDonut {
    /// Whether spending has exceeded the budget.
    pub fn is_over_budget(&self) -> bool {
        self.labels[1] == OVER_BUDGET_LABEL
    }
}

/// Split `total_budget` into used and remaining slices, or into the budget
/// and the overspend when `total_expenses` exceeds it.
pub fn budget_donut(total_expenses: f64, total_budget: f64) -> BudgetDonut {
    if total_expenses > total_budget {
        BudgetDonut {
            labels: [USED_BUDGET_LABEL, OVER_BUDGET_LABEL],
            data: [total_budget, total_expenses - total_budget],
            colors: OVER_BUDGET_COLORS,
        }
    } else {
        BudgetDonut {
            labels: [USED_BUDGET_LABEL, REMAINING_BUDGET_LABEL],
            data: [total_expenses, total_budget - total_expenses],
            colors: WITHIN_BUDGET_COLORS,
        }
    }
}

/// Budgeted against actual spending for each farm.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FarmComparison {
    /// The farm names.
    pub labels: Vec<String>,
    /// The budgeted amount for the farm with the same index.
    pub budgeted: Vec<f64>,
    /// The amount spent by the farm with the same index.
    pub actual: Vec<f64>,
}

fn totals_by_farm(
    records: impl IntoIterator<Item = (FarmId, f64)>,
) -> HashMap<FarmId, f64> {
    let mut totals = HashMap::new();

    for (farm_id, amount) in records {
        *totals.entry(farm_id).or_insert(0.0) += amount;
    }

    totals
}

/// Sum `budgets` and `expenses` for each of `farms`.
///
/// Farms without budgets or expenses get zeros.
pub fn farm_comparison<'a>(
    farms: impl IntoIterator<Item = &'a Farm>,
    budgets: impl IntoIterator<Item = &'a Budget>,
    expenses: impl IntoIterator<Item = &'a Expense>,
) -> FarmComparison {
    let budgeted_by_farm = totals_by_farm(
        budgets
            .into_iter()
            .map(|budget| (budget.farm_id, budget.budget_amount)),
    );
    let spent_by_farm = totals_by_farm(
        expenses
            .into_iter()
            .map(|expense| (expense.farm_id, expense.amount)),
    );

    let mut comparison = FarmComparison::default();

    for farm in farms {
        comparison.labels.push(farm.name.clone());
        comparison
            .budgeted
            .push(budgeted_by_farm.get(&farm.id).copied().unwrap_or(0.0));
        comparison
            .actual
            .push(spent_by_farm.get(&farm.id).copied().unwrap_or(0.0));
    }

    comparison
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        analytics::{
            aggregation::ExpenseFilter,
            chart_data::{
                BudgetDonut, ChartSeries, FarmComparison, budget_donut, category_breakdown,
                farm_comparison,
            },
        },
        budget::{Budget, BudgetCategory, BudgetPeriod},
        expense::{Expense, ExpenseCategory},
        farm::Farm,
    };

    fn create_test_expense(
        farm_id: i64,
        category: ExpenseCategory,
        amount: f64,
        date: Date,
    ) -> Expense {
        Expense {
            id: 1,
            farm_id,
            category,
            amount,
            date,
            description: "Test".to_owned(),
            vendor: None,
        }
    }

    fn create_test_farm(id: i64, name: &str) -> Farm {
        Farm {
            id,
            name: name.to_owned(),
            location: None,
            size_acres: None,
        }
    }

    #[test]
    fn donut_splits_overspend_from_budget() {
        assert_eq!(
            budget_donut(600.0, 500.0),
            BudgetDonut {
                labels: ["Used Budget", "Over Budget"],
                data: [500.0, 100.0],
                colors: ["#ef4444", "#991b1b"],
            }
        );
    }

    #[test]
    fn donut_shows_remaining_budget() {
        let donut = budget_donut(200.0, 500.0);

        assert_eq!(donut.labels, ["Used Budget", "Remaining Budget"]);
        assert_eq!(donut.data, [200.0, 300.0]);
        assert_eq!(donut.colors, ["#3b82f6", "#e5e7eb"]);
        assert!(!donut.is_over_budget());
    }

    #[test]
    fn donut_at_exactly_the_budget_is_not_over() {
        let donut = budget_donut(500.0, 500.0);

        assert_eq!(donut.data, [500.0, 0.0]);
        assert!(!donut.is_over_budget());
    }

    #[test]
    fn category_breakdown_applies_filter_before_grouping() {
        let expenses = [
            create_test_expense(1, ExpenseCategory::Fuel, 50.0, date!(2024 - 03 - 01)),
            create_test_expense(1, ExpenseCategory::Seeds, 20.0, date!(2024 - 03 - 02)),
            create_test_expense(2, ExpenseCategory::Labor, 99.0, date!(2024 - 03 - 02)),
            create_test_expense(1, ExpenseCategory::Fuel, 25.0, date!(2024 - 03 - 03)),
        ];

        let series = category_breakdown(&expenses, &ExpenseFilter::default().for_farm(Some(1)));

        assert_eq!(
            series,
            ChartSeries {
                labels: vec!["fuel".to_owned(), "seeds".to_owned()],
                data: vec![75.0, 20.0],
            }
        );
    }

    #[test]
    fn category_breakdown_of_nothing_is_empty() {
        assert!(category_breakdown(&[], &ExpenseFilter::default()).is_empty());
    }

    #[test]
    fn farm_comparison_sums_per_farm() {
        let farms = [create_test_farm(1, "North"), create_test_farm(2, "South")];
        let budgets = [
            Budget {
                id: 1,
                farm_id: 1,
                period: BudgetPeriod::Monthly,
                budget_amount: 1000.0,
                start_date: date!(2024 - 01 - 01),
                category: BudgetCategory::Total,
                projected_yield: None,
                notes: None,
            },
            Budget {
                id: 2,
                farm_id: 1,
                period: BudgetPeriod::Monthly,
                budget_amount: 250.0,
                start_date: date!(2024 - 02 - 01),
                category: BudgetCategory::Total,
                projected_yield: None,
                notes: None,
            },
        ];
        let expenses = [
            create_test_expense(2, ExpenseCategory::Fuel, 40.0, date!(2024 - 01 - 05)),
            create_test_expense(1, ExpenseCategory::Fuel, 60.0, date!(2024 - 01 - 05)),
            create_test_expense(2, ExpenseCategory::Fuel, 10.0, date!(2024 - 02 - 05)),
        ];

        let comparison = farm_comparison(&farms, &budgets, &expenses);

        assert_eq!(
            comparison,
            FarmComparison {
                labels: vec!["North".to_owned(), "South".to_owned()],
                budgeted: vec![1250.0, 0.0],
                actual: vec![60.0, 50.0],
            }
        );
    }
}

//! Farm budgets over a monthly or annual period.

use std::{fmt, ops::Range, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    date::{add_months, parse_date},
    expense::ExpenseCategory,
    farm::FarmId,
    store::{Record, RecordId},
};

/// Alias for the integer type used for budget IDs.
pub type BudgetId = RecordId;

/// How long a budget lasts from its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    /// One calendar month from the start date.
    Monthly,
    /// One calendar year from the start date.
    Annual,
}

impl BudgetPeriod {
    /// The identifier used in JSON and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Annual => "annual",
        }
    }

    /// The first day after a budget starting on `start` has ended.
    ///
    /// A budget covers the half-open range `start..period_end(start)`.
    /// Returns `None` if that day is past the last supported date.
    pub fn period_end(self, start: Date) -> Option<Date> {
        match self {
            BudgetPeriod::Monthly => add_months(start, 1),
            BudgetPeriod::Annual => add_months(start, 12),
        }
    }

    /// The half-open range of dates covered by a budget starting on `start`.
    pub fn window(self, start: Date) -> Range<Date> {
        start..self.period_end(start).unwrap_or(Date::MAX)
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "annual" => Ok(BudgetPeriod::Annual),
            other => Err(Error::InvalidSelection(format!(
                "unknown budget period \"{other}\""
            ))),
        }
    }
}

/// What a budget limits: total farm spending or a single expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BudgetCategory {
    /// All spending on the farm.
    #[default]
    Total,
    /// Spending in one expense category.
    Category(ExpenseCategory),
}

impl BudgetCategory {
    /// The name shown in budget headings, e.g. "Total Budget" or "fuel".
    pub fn display_name(self) -> String {
        match self {
            BudgetCategory::Total => "Total Budget".to_owned(),
            BudgetCategory::Category(category) => category.as_str().replace('_', " "),
        }
    }
}

impl FromStr for BudgetCategory {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "" | "total" => Ok(BudgetCategory::Total),
            other => other.parse().map(BudgetCategory::Category),
        }
    }
}

impl TryFrom<String> for BudgetCategory {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BudgetCategory> for String {
    fn from(value: BudgetCategory) -> Self {
        match value {
            BudgetCategory::Total => "total".to_owned(),
            BudgetCategory::Category(category) => category.as_str().to_owned(),
        }
    }
}

/// A spending limit for a farm over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The farm the budget applies to.
    pub farm_id: FarmId,
    /// How long the budget lasts.
    pub period: BudgetPeriod,
    /// The amount budgeted, never negative.
    pub budget_amount: f64,
    /// The first day the budget applies to.
    pub start_date: Date,
    /// What the budget limits.
    pub category: BudgetCategory,
    /// The yield the farmer expects over the period.
    pub projected_yield: Option<f64>,
    /// Free text notes.
    pub notes: Option<String>,
}

impl Budget {
    /// The first day after the budget has ended.
    pub fn end_date(&self) -> Date {
        self.period.window(self.start_date).end
    }

    /// Whether `date` falls inside the budget's period.
    pub fn covers(&self, date: Date) -> bool {
        self.period.window(self.start_date).contains(&date)
    }
}

/// The raw fields for creating or replacing a [Budget].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BudgetData {
    /// The farm the budget applies to.
    pub farm_id: FarmId,
    /// How long the budget lasts.
    pub period: BudgetPeriod,
    /// The amount budgeted.
    pub budget_amount: f64,
    /// The first day the budget applies to, as `YYYY-MM-DD`.
    pub start_date: String,
    /// What the budget limits, defaults to the farm total.
    #[serde(default)]
    pub category: BudgetCategory,
    /// The yield the farmer expects over the period.
    #[serde(default)]
    pub projected_yield: Option<f64>,
    /// Free text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Budget {
    type Data = BudgetData;

    const NAME: &'static str = "budget";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_data(id: RecordId, data: BudgetData) -> Result<Self, Error> {
        if data.budget_amount < 0.0 || data.budget_amount.is_nan() {
            return Err(Error::NegativeAmount(data.budget_amount));
        }

        let start_date = parse_date(&data.start_date)?;
        if data.period.period_end(start_date).is_none() {
            return Err(Error::InvalidDate(data.start_date));
        }

        Ok(Self {
            id,
            farm_id: data.farm_id,
            period: data.period,
            budget_amount: data.budget_amount,
            start_date,
            category: data.category,
            projected_yield: data.projected_yield,
            notes: data.notes.filter(|notes| !notes.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        budget::{Budget, BudgetCategory, BudgetData, BudgetPeriod},
        expense::ExpenseCategory,
        store::Record,
    };

    fn budget_data(period: BudgetPeriod, start_date: &str) -> BudgetData {
        BudgetData {
            farm_id: 1,
            period,
            budget_amount: 1000.0,
            start_date: start_date.to_owned(),
            category: BudgetCategory::Total,
            projected_yield: None,
            notes: None,
        }
    }

    #[test]
    fn monthly_budget_ends_one_month_after_start() {
        let budget = Budget::from_data(1, budget_data(BudgetPeriod::Monthly, "2024-01-15")).unwrap();

        assert_eq!(budget.end_date(), date!(2024 - 02 - 15));
        assert!(budget.covers(date!(2024 - 01 - 15)));
        assert!(budget.covers(date!(2024 - 02 - 14)));
        assert!(!budget.covers(date!(2024 - 02 - 15)));
        assert!(!budget.covers(date!(2024 - 01 - 14)));
    }

    #[test]
    fn annual_budget_ends_one_year_after_start() {
        let budget = Budget::from_data(1, budget_data(BudgetPeriod::Annual, "2024-03-01")).unwrap();

        assert_eq!(budget.end_date(), date!(2025 - 03 - 01));
        assert!(budget.covers(date!(2025 - 02 - 28)));
    }

    #[test]
    fn rejects_negative_budget_amount() {
        let mut data = budget_data(BudgetPeriod::Monthly, "2024-01-01");
        data.budget_amount = -5.0;

        assert_eq!(Budget::from_data(1, data), Err(Error::NegativeAmount(-5.0)));
    }

    #[test]
    fn rejects_invalid_start_date() {
        assert_eq!(
            Budget::from_data(1, budget_data(BudgetPeriod::Monthly, "01/01/2024")),
            Err(Error::InvalidDate("01/01/2024".to_owned()))
        );
    }

    #[test]
    fn rejects_budget_ending_past_the_last_supported_date() {
        assert_eq!(
            Budget::from_data(1, budget_data(BudgetPeriod::Annual, "9999-06-01")),
            Err(Error::InvalidDate("9999-06-01".to_owned()))
        );
        assert_eq!(
            Budget::from_data(1, budget_data(BudgetPeriod::Monthly, "9999-12-15")),
            Err(Error::InvalidDate("9999-12-15".to_owned()))
        );

        let budget = Budget::from_data(1, budget_data(BudgetPeriod::Monthly, "9999-11-15")).unwrap();
        assert_eq!(budget.end_date(), date!(9999 - 12 - 15));
    }

    #[test]
    fn category_defaults_to_total() {
        let data: BudgetData = serde_json::from_str(
            r#"{"farm_id": 2, "period": "annual", "budget_amount": 5000, "start_date": "2024-01-01"}"#,
        )
        .unwrap();

        assert_eq!(data.category, BudgetCategory::Total);
    }

    #[test]
    fn category_parses_expense_categories() {
        let data: BudgetData = serde_json::from_str(
            r#"{"farm_id": 2, "period": "monthly", "budget_amount": 50,
                "start_date": "2024-01-01", "category": "fertilizer"}"#,
        )
        .unwrap();

        assert_eq!(
            data.category,
            BudgetCategory::Category(ExpenseCategory::Fertilizer)
        );
        assert_eq!(String::from(data.category), "fertilizer");
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = serde_json::from_str::<BudgetData>(
            r#"{"farm_id": 2, "period": "monthly", "budget_amount": 50,
                "start_date": "2024-01-01", "category": "snacks"}"#,
        );

        assert!(result.is_err());
    }
}

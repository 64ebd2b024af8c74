//! Expense aggregation: filtered totals, category buckets and monthly series.
//!
//! Every function here is pure. Empty input gives zero or empty output, never
//! an error, and calling a function twice on the same input gives the same
//! result.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    date::{add_months, first_day_of_month, last_day_of_month, month_label, parse_optional_date},
    expense::{Expense, ExpenseCategory},
    farm::FarmId,
};

/// Criteria for selecting expenses.
///
/// Each field that is set must match for an expense to be selected. Date
/// bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Skip expenses before this date.
    pub start_date: Option<Date>,
    /// Skip expenses after this date.
    pub end_date: Option<Date>,
    /// Only keep expenses in this category.
    pub category: Option<ExpenseCategory>,
    /// Only keep expenses for this farm.
    pub farm_id: Option<FarmId>,
}

impl ExpenseFilter {
    /// Build a filter from raw query values. Missing or blank values do not filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] for a malformed date, or
    /// [Error::InvalidSelection] for an unknown category.
    pub fn parse(
        start_date: Option<&str>,
        end_date: Option<&str>,
        category: Option<&str>,
        farm_id: Option<FarmId>,
    ) -> Result<Self, Error> {
        let category = match category.map(str::trim) {
            None | Some("") => None,
            Some(category) => Some(category.parse()?),
        };

        Ok(Self {
            start_date: parse_optional_date(start_date)?,
            end_date: parse_optional_date(end_date)?,
            category,
            farm_id,
        })
    }

    /// The same filter restricted to `farm_id`, or unrestricted by farm for `None`.
    pub fn for_farm(self, farm_id: Option<FarmId>) -> Self {
        Self { farm_id, ..self }
    }

    /// The same filter restricted to `category`, or any category for `None`.
    pub fn with_category(self, category: Option<ExpenseCategory>) -> Self {
        Self { category, ..self }
    }

    /// Whether `expense` satisfies every criterion of the filter.
    pub fn matches(&self, expense: &Expense) -> bool {
        self.start_date.is_none_or(|start| expense.date >= start)
            && self.end_date.is_none_or(|end| expense.date <= end)
            && self.category.is_none_or(|category| expense.category == category)
            && self.farm_id.is_none_or(|farm_id| expense.farm_id == farm_id)
    }

    /// The expenses that satisfy the filter, in their original order.
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> impl Iterator<Item = &'a Expense> {
        expenses.iter().filter(move |expense| self.matches(expense))
    }
}

/// The sum of the amounts of `expenses`.
pub fn total_amount<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> f64 {
    expenses.into_iter().map(|expense| expense.amount).sum()
}

/// The sum of the amounts of the expenses selected by `filter`.
pub fn sum_expenses(expenses: &[Expense], filter: &ExpenseFilter) -> f64 {
    total_amount(filter.apply(expenses))
}

/// The expenses that share a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup<'a> {
    /// The shared category.
    pub category: ExpenseCategory,
    /// The sum of the amounts in the group.
    pub total: f64,
    /// The number of expenses in the group.
    pub count: usize,
    /// The expenses in the group, in their original order.
    #[serde(skip)]
    pub records: Vec<&'a Expense>,
}

/// Expenses grouped by category, in the order each category was first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryBreakdown<'a> {
    groups: Vec<CategoryGroup<'a>>,
}

impl<'a> CategoryBreakdown<'a> {
    /// The group for `category`, if any expense has that category.
    pub fn get(&self, category: ExpenseCategory) -> Option<&CategoryGroup<'a>> {
        self.groups.iter().find(|group| group.category == category)
    }

    /// The groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryGroup<'a>> {
        self.groups.iter()
    }

    /// The number of distinct categories.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The sum of all group totals.
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|group| group.total).sum()
    }
}

/// Group `expenses` by category.
///
/// Every expense lands in exactly one group, so the group counts add up to
/// the number of expenses and the group totals add up to their sum.
pub fn group_by_category<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
) -> CategoryBreakdown<'a> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();

    for expense in expenses {
        match groups
            .iter_mut()
            .find(|group| group.category == expense.category)
        {
            Some(group) => {
                group.total += expense.amount;
                group.count += 1;
                group.records.push(expense);
            }
            None => groups.push(CategoryGroup {
                category: expense.category,
                total: expense.amount,
                count: 1,
                records: vec![expense],
            }),
        }
    }

    CategoryBreakdown { groups }
}

/// Spending per calendar month as parallel label and value arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// Month labels in chronological order, e.g. "Jan 2024".
    pub labels: Vec<String>,
    /// The amount spent in the month with the same index in `labels`.
    pub data: Vec<f64>,
}

/// Sum the expenses selected by `filter` per calendar month.
///
/// Only months with at least one expense appear; gaps are not filled in.
pub fn monthly_trend(expenses: &[Expense], filter: &ExpenseFilter) -> MonthlyTrend {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    for expense in filter.apply(expenses) {
        *totals.entry(first_day_of_month(expense.date)).or_insert(0.0) += expense.amount;
    }

    let (labels, data): (Vec<String>, Vec<f64>) = totals
        .into_iter()
        .map(|(month, total)| (month_label(month), total))
        .unzip();

    MonthlyTrend { labels, data }
}

/// A window of time relative to today used to narrow the expenses page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpenseWindow {
    /// Every expense.
    #[default]
    All,
    /// Expenses in the current calendar month.
    ThisMonth,
    /// Expenses in the previous calendar month.
    LastMonth,
    /// Expenses in the current calendar year.
    ThisYear,
}

impl ExpenseWindow {
    /// Every window, in the order they are offered on the page.
    pub const ALL: [ExpenseWindow; 4] = [
        ExpenseWindow::All,
        ExpenseWindow::ThisMonth,
        ExpenseWindow::LastMonth,
        ExpenseWindow::ThisYear,
    ];

    /// The identifier used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseWindow::All => "all",
            ExpenseWindow::ThisMonth => "this_month",
            ExpenseWindow::LastMonth => "last_month",
            ExpenseWindow::ThisYear => "this_year",
        }
    }

    /// The name shown in the window selector.
    pub fn label(self) -> &'static str {
        match self {
            ExpenseWindow::All => "All Time",
            ExpenseWindow::ThisMonth => "This Month",
            ExpenseWindow::LastMonth => "Last Month",
            ExpenseWindow::ThisYear => "This Year",
        }
    }

    /// A date filter covering the window, given the current date `today`.
    pub fn to_filter(self, today: Date) -> ExpenseFilter {
        let (start_date, end_date) = match self {
            ExpenseWindow::All => return ExpenseFilter::default(),
            ExpenseWindow::ThisMonth => (first_day_of_month(today), last_day_of_month(today)),
            ExpenseWindow::LastMonth => match add_months(first_day_of_month(today), -1) {
                Some(last_month) => (last_month, last_day_of_month(last_month)),
                // Nothing can be dated before the first supported month.
                None => (Date::MAX, Date::MIN),
            },
            ExpenseWindow::ThisYear => (
                today.replace_month(Month::January).map_or(today, first_day_of_month),
                last_day_of_month(today.replace_month(Month::December).unwrap_or(today)),
            ),
        };

        ExpenseFilter {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..ExpenseFilter::default()
        }
    }
}

impl fmt::Display for ExpenseWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseWindow {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "" => Ok(ExpenseWindow::All),
            text => ExpenseWindow::ALL
                .into_iter()
                .find(|window| window.as_str() == text)
                .ok_or_else(|| Error::InvalidSelection(format!("unknown time window \"{text}\""))),
        }
    }
}

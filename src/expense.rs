//! Farm expenses and their spending categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    date::parse_date,
    farm::FarmId,
    store::{Record, RecordId},
};

/// Alias for the integer type used for expense IDs.
pub type ExpenseId = RecordId;

/// The fixed set of spending categories an expense can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Seeds and plants.
    Seeds,
    /// Fertilizer.
    Fertilizer,
    /// Pesticides.
    Pesticides,
    /// Fuel.
    Fuel,
    /// Equipment purchases.
    Equipment,
    /// Maintenance and repairs.
    Maintenance,
    /// Labor.
    Labor,
    /// Utilities.
    Utilities,
    /// Insurance.
    Insurance,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Every category, in display order.
    pub const ALL: [ExpenseCategory; 10] = [
        ExpenseCategory::Seeds,
        ExpenseCategory::Fertilizer,
        ExpenseCategory::Pesticides,
        ExpenseCategory::Fuel,
        ExpenseCategory::Equipment,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Labor,
        ExpenseCategory::Utilities,
        ExpenseCategory::Insurance,
        ExpenseCategory::Other,
    ];

    /// The identifier used in JSON and query strings, e.g. "seeds".
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseCategory::Seeds => "seeds",
            ExpenseCategory::Fertilizer => "fertilizer",
            ExpenseCategory::Pesticides => "pesticides",
            ExpenseCategory::Fuel => "fuel",
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Maintenance => "maintenance",
            ExpenseCategory::Labor => "labor",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::Other => "other",
        }
    }

    /// The human friendly name shown in forms and selectors.
    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Seeds => "Seeds & Plants",
            ExpenseCategory::Fertilizer => "Fertilizer",
            ExpenseCategory::Pesticides => "Pesticides",
            ExpenseCategory::Fuel => "Fuel",
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Labor => "Labor",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Insurance => "Insurance",
            ExpenseCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == text.trim())
            .ok_or_else(|| Error::InvalidSelection(format!("unknown expense category \"{text}\"")))
    }
}

/// Money spent on a farm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The farm the money was spent on.
    pub farm_id: FarmId,
    /// What the money was spent on.
    pub category: ExpenseCategory,
    /// The amount spent, never negative.
    pub amount: f64,
    /// When the money was spent.
    pub date: Date,
    /// A short description of the purchase.
    pub description: String,
    /// Who the money was paid to.
    pub vendor: Option<String>,
}

/// The raw fields for creating or replacing an [Expense].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExpenseData {
    /// The farm the money was spent on.
    pub farm_id: FarmId,
    /// What the money was spent on.
    pub category: ExpenseCategory,
    /// The amount spent.
    pub amount: f64,
    /// When the money was spent, as `YYYY-MM-DD`.
    pub date: String,
    /// A short description of the purchase.
    pub description: String,
    /// Who the money was paid to.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl Record for Expense {
    type Data = ExpenseData;

    const NAME: &'static str = "expense";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_data(id: RecordId, data: ExpenseData) -> Result<Self, Error> {
        if data.amount < 0.0 || data.amount.is_nan() {
            return Err(Error::NegativeAmount(data.amount));
        }

        let description = data.description.trim();
        if description.is_empty() {
            return Err(Error::EmptyField("expense description"));
        }

        Ok(Self {
            id,
            farm_id: data.farm_id,
            category: data.category,
            amount: data.amount,
            date: parse_date(&data.date)?,
            description: description.to_owned(),
            vendor: data
                .vendor
                .map(|vendor| vendor.trim().to_owned())
                .filter(|vendor| !vendor.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        expense::{Expense, ExpenseCategory, ExpenseData},
        store::Record,
    };

    fn expense_data(amount: f64, date: &str) -> ExpenseData {
        ExpenseData {
            farm_id: 1,
            category: ExpenseCategory::Fuel,
            amount,
            date: date.to_owned(),
            description: "Diesel for the tractor".to_owned(),
            vendor: Some("  ".to_owned()),
        }
    }

    #[test]
    fn builds_expense_from_valid_data() {
        let expense = Expense::from_data(5, expense_data(120.5, "2024-04-02")).unwrap();

        assert_eq!(expense.id, 5);
        assert_eq!(expense.date, date!(2024 - 04 - 02));
        assert_eq!(expense.amount, 120.5);
        assert_eq!(expense.vendor, None, "blank vendor should be dropped");
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert!(Expense::from_data(1, expense_data(0.0, "2024-04-02")).is_ok());
    }

    #[test]
    fn rejects_negative_amount() {
        assert_eq!(
            Expense::from_data(1, expense_data(-0.01, "2024-04-02")),
            Err(Error::NegativeAmount(-0.01))
        );
    }

    #[test]
    fn rejects_invalid_date() {
        assert_eq!(
            Expense::from_data(1, expense_data(10.0, "2024-04-31")),
            Err(Error::InvalidDate("2024-04-31".to_owned()))
        );
    }

    #[test]
    fn categories_round_trip_through_their_identifiers() {
        for category in ExpenseCategory::ALL {
            assert_eq!(category.as_str().parse::<ExpenseCategory>(), Ok(category));
        }

        assert!(matches!(
            "groceries".parse::<ExpenseCategory>(),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn category_deserializes_from_snake_case() {
        let category: ExpenseCategory = serde_json::from_str("\"maintenance\"").unwrap();

        assert_eq!(category, ExpenseCategory::Maintenance);
    }
}

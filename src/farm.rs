//! Farms: the owners of crops, tasks, expenses and budgets.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    store::{Record, RecordId},
};

/// Alias for the integer type used for farm IDs.
pub type FarmId = RecordId;

/// A farm.
///
/// Crops, tasks, expenses and budgets refer to a farm by [FarmId]. The
/// reference is advisory: deleting a farm does not delete its records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Farm {
    /// The ID of the farm.
    pub id: FarmId,
    /// The display name of the farm.
    pub name: String,
    /// Where the farm is, free text.
    pub location: Option<String>,
    /// The size of the farm in acres.
    pub size_acres: Option<f64>,
}

/// The raw fields for creating or replacing a [Farm].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FarmData {
    /// The display name of the farm.
    pub name: String,
    /// Where the farm is, free text.
    #[serde(default)]
    pub location: Option<String>,
    /// The size of the farm in acres.
    #[serde(default)]
    pub size_acres: Option<f64>,
}

impl Record for Farm {
    type Data = FarmData;

    const NAME: &'static str = "farm";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_data(id: RecordId, data: FarmData) -> Result<Self, Error> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(Error::EmptyField("farm name"));
        }

        if let Some(size) = data.size_acres.filter(|size| *size < 0.0) {
            return Err(Error::NegativeAmount(size));
        }

        Ok(Self {
            id,
            name: name.to_owned(),
            location: data.location.filter(|location| !location.trim().is_empty()),
            size_acres: data.size_acres,
        })
    }
}

/// The name of the farm with `farm_id`, or "Unknown farm" if it is not in `farms`.
pub fn farm_name(farms: &[Farm], farm_id: FarmId) -> &str {
    farms
        .iter()
        .find(|farm| farm.id == farm_id)
        .map_or("Unknown farm", |farm| farm.name.as_str())
}

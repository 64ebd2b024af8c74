//! Crops planted on a farm and their growth stage.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    date::{parse_date, parse_optional_date},
    farm::FarmId,
    store::{Record, RecordId},
};

/// Alias for the integer type used for crop IDs.
pub type CropId = RecordId;

/// The growth stage of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStatus {
    /// Seeds are in the ground.
    #[default]
    Planted,
    /// Seeds have sprouted.
    Germinating,
    /// Plants are growing.
    Growing,
    /// Plants are flowering.
    Flowering,
    /// The crop is being harvested.
    Harvesting,
    /// The crop has been harvested.
    Harvested,
}

impl CropStatus {
    /// The identifier used in JSON, e.g. "growing".
    pub fn as_str(self) -> &'static str {
        match self {
            CropStatus::Planted => "planted",
            CropStatus::Germinating => "germinating",
            CropStatus::Growing => "growing",
            CropStatus::Flowering => "flowering",
            CropStatus::Harvesting => "harvesting",
            CropStatus::Harvested => "harvested",
        }
    }

    /// The share of the base yield a crop at this stage is expected to produce.
    ///
    /// Only crops that are being harvested count at full yield.
    pub fn yield_multiplier(self) -> f64 {
        match self {
            CropStatus::Harvesting => 1.0,
            _ => 0.8,
        }
    }
}

/// A crop planted on a farm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crop {
    /// The ID of the crop.
    pub id: CropId,
    /// The farm the crop is planted on.
    pub farm_id: FarmId,
    /// The name of the crop, e.g. "Corn".
    pub name: String,
    /// The variety, e.g. "Sweet".
    pub variety: Option<String>,
    /// The growth stage.
    pub status: CropStatus,
    /// When the crop was planted.
    pub planting_date: Date,
    /// When the crop is expected to be ready for harvest.
    pub expected_harvest: Option<Date>,
}

impl Crop {
    /// The number of days between planting and `today`.
    ///
    /// The distance is absolute, so a planting date in the future also
    /// yields a positive count.
    pub fn growth_days(&self, today: Date) -> i64 {
        (today - self.planting_date).whole_days().abs()
    }

    /// The number of days from `today` until the expected harvest.
    ///
    /// Negative when the expected harvest date has passed, `None` when no
    /// harvest date has been set.
    pub fn days_to_harvest(&self, today: Date) -> Option<i64> {
        self.expected_harvest
            .map(|harvest| (harvest - today).whole_days())
    }
}

/// The raw fields for creating or replacing a [Crop].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CropData {
    /// The farm the crop is planted on.
    pub farm_id: FarmId,
    /// The name of the crop.
    pub name: String,
    /// The variety.
    #[serde(default)]
    pub variety: Option<String>,
    /// The growth stage, defaults to planted.
    #[serde(default)]
    pub status: CropStatus,
    /// When the crop was planted, as `YYYY-MM-DD`.
    pub planting_date: String,
    /// When the crop is expected to be ready, as `YYYY-MM-DD`.
    #[serde(default)]
    pub expected_harvest: Option<String>,
}

impl Record for Crop {
    type Data = CropData;

    const NAME: &'static str = "crop";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_data(id: RecordId, data: CropData) -> Result<Self, Error> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(Error::EmptyField("crop name"));
        }

        Ok(Self {
            id,
            farm_id: data.farm_id,
            name: name.to_owned(),
            variety: data.variety.filter(|variety| !variety.trim().is_empty()),
            status: data.status,
            planting_date: parse_date(&data.planting_date)?,
            expected_harvest: parse_optional_date(data.expected_harvest.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        crop::{Crop, CropData, CropStatus},
        store::Record,
    };

    fn corn(expected_harvest: Option<&str>) -> Crop {
        Crop::from_data(
            1,
            CropData {
                farm_id: 1,
                name: " Corn ".to_owned(),
                variety: None,
                status: CropStatus::Growing,
                planting_date: "2024-04-01".to_owned(),
                expected_harvest: expected_harvest.map(str::to_owned),
            },
        )
        .unwrap()
    }

    #[test]
    fn trims_name() {
        assert_eq!(corn(None).name, "Corn");
    }

    #[test]
    fn growth_days_counts_from_planting() {
        let crop = corn(None);

        assert_eq!(crop.growth_days(date!(2024 - 04 - 01)), 0);
        assert_eq!(crop.growth_days(date!(2024 - 05 - 01)), 30);
        assert_eq!(crop.growth_days(date!(2024 - 03 - 30)), 2);
    }

    #[test]
    fn days_to_harvest_is_signed() {
        let crop = corn(Some("2024-08-15"));

        assert_eq!(crop.days_to_harvest(date!(2024 - 08 - 05)), Some(10));
        assert_eq!(crop.days_to_harvest(date!(2024 - 08 - 20)), Some(-5));
        assert_eq!(corn(None).days_to_harvest(date!(2024 - 08 - 20)), None);
    }

    #[test]
    fn only_harvesting_crops_count_at_full_yield() {
        assert_eq!(CropStatus::Harvesting.yield_multiplier(), 1.0);
        assert_eq!(CropStatus::Growing.yield_multiplier(), 0.8);
        assert_eq!(CropStatus::Harvested.yield_multiplier(), 0.8);
    }

    #[test]
    fn status_defaults_to_planted() {
        let data: CropData = serde_json::from_str(
            r#"{"farm_id": 1, "name": "Wheat", "planting_date": "2024-09-01"}"#,
        )
        .unwrap();

        assert_eq!(data.status, CropStatus::Planted);
    }

    #[test]
    fn rejects_invalid_harvest_date() {
        let result = Crop::from_data(
            1,
            CropData {
                farm_id: 1,
                name: "Corn".to_owned(),
                variety: None,
                status: CropStatus::Planted,
                planting_date: "2024-04-01".to_owned(),
                expected_harvest: Some("soon".to_owned()),
            },
        );

        assert_eq!(result, Err(Error::InvalidDate("soon".to_owned())));
    }
}

//! In-memory record stores for farms, crops, tasks, expenses and budgets.
//!
//! Each entity type gets a [RecordStore] with the same CRUD contract: new
//! records get the ID `max existing ID + 1` (or 1 for an empty store), and
//! lookups, updates and deletes of unknown IDs fail with [Error::NotFound].
//! The stores are held by [Stores], which the application state shares
//! behind a mutex so each test and each server instance gets its own data.

use std::{fs, path::Path};

use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    Error,
    budget::{Budget, BudgetData},
    crop::{Crop, CropData},
    expense::{Expense, ExpenseData},
    farm::{Farm, FarmData},
    task::{Task, TaskData},
};

/// Alias for the integer type used for record IDs.
pub type RecordId = i64;

/// A record that can be kept in a [RecordStore].
pub trait Record: Clone + Sized {
    /// The raw, unvalidated fields used to create or replace a record.
    type Data: DeserializeOwned;

    /// The entity name used in log messages, e.g. "expense".
    const NAME: &'static str;

    /// The unique ID of the record.
    fn id(&self) -> RecordId;

    /// Validate `data` and build a record with the given `id`.
    ///
    /// # Errors
    /// Returns a validation error such as [Error::InvalidDate] if a field is invalid.
    fn from_data(id: RecordId, data: Self::Data) -> Result<Self, Error>;
}

/// Selects the store for a record type out of [Stores].
pub(crate) trait Stored: Record {
    fn store(stores: &Stores) -> &RecordStore<Self>;

    fn store_mut(stores: &mut Stores) -> &mut RecordStore<Self>;
}

/// A collection of records of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore<R> {
    records: Vec<R>,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> RecordStore<R> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    pub fn with_records(records: Vec<R>) -> Self {
        Self { records }
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[R] {
        &self.records
    }

    /// Get the record with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no record with `id`.
    pub fn get(&self, id: RecordId) -> Result<&R, Error> {
        self.records
            .iter()
            .find(|record| record.id() == id)
            .ok_or(Error::NotFound)
    }

    /// Validate `data` and add it as a new record.
    ///
    /// # Errors
    /// Returns a validation error if `data` is invalid, or
    /// [Error::IdsExhausted] if the largest ID is already `i64::MAX`.
    pub fn create(&mut self, data: R::Data) -> Result<R, Error> {
        let id = self.next_id()?;
        let record = R::from_data(id, data)?;

        tracing::debug!("created {} {}", R::NAME, id);
        self.records.push(record.clone());

        Ok(record)
    }

    /// Replace the fields of the record with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no record with `id`, or a
    /// validation error if `data` is invalid.
    pub fn update(&mut self, id: RecordId, data: R::Data) -> Result<R, Error> {
        let index = self.position(id)?;
        let record = R::from_data(id, data)?;

        tracing::debug!("updated {} {}", R::NAME, id);
        self.records[index] = record.clone();

        Ok(record)
    }

    /// Delete the record with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no record with `id`.
    pub fn delete(&mut self, id: RecordId) -> Result<(), Error> {
        let index = self.position(id)?;

        tracing::debug!("deleted {} {}", R::NAME, id);
        self.records.remove(index);

        Ok(())
    }

    fn position(&self, id: RecordId) -> Result<usize, Error> {
        self.records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(Error::NotFound)
    }

    fn next_id(&self) -> Result<RecordId, Error> {
        match self.records.iter().map(Record::id).max() {
            None => Ok(1),
            Some(max_id) => max_id
                .checked_add(1)
                .ok_or(Error::IdsExhausted(R::NAME)),
        }
    }
}

/// The record stores for every entity in the application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stores {
    /// The farms.
    pub farms: RecordStore<Farm>,
    /// The crops planted on the farms.
    pub crops: RecordStore<Crop>,
    /// The farm tasks.
    pub tasks: RecordStore<Task>,
    /// The farm expenses.
    pub expenses: RecordStore<Expense>,
    /// The farm budgets.
    pub budgets: RecordStore<Budget>,
}

/// A seed entry: the raw fields of a record plus the ID it should keep.
#[derive(Debug, Deserialize)]
struct SeedEntry<D> {
    #[serde(rename = "Id", alias = "id")]
    id: RecordId,
    #[serde(flatten)]
    data: D,
}

/// Initial data for [Stores], usually read from a JSON file.
#[derive(Debug, Deserialize)]
pub struct Seed {
    #[serde(default)]
    farms: Vec<SeedEntry<FarmData>>,
    #[serde(default)]
    crops: Vec<SeedEntry<CropData>>,
    #[serde(default)]
    tasks: Vec<SeedEntry<TaskData>>,
    #[serde(default)]
    expenses: Vec<SeedEntry<ExpenseData>>,
    #[serde(default)]
    budgets: Vec<SeedEntry<BudgetData>>,
}

impl Seed {
    /// Parse seed data from a JSON string.
    ///
    /// # Errors
    /// Returns [Error::SeedFile] if `text` is not valid seed JSON.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|error| Error::SeedFile(error.to_string()))
    }

    /// Read seed data from a JSON file at `path`.
    ///
    /// # Errors
    /// Returns [Error::SeedFile] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)
            .map_err(|error| Error::SeedFile(format!("{}: {error}", path.display())))?;

        Self::from_json(&text)
    }
}

fn seed_store<R: Record<Data = D>, D>(entries: Vec<SeedEntry<D>>) -> Result<RecordStore<R>, Error> {
    let mut records: Vec<R> = Vec::with_capacity(entries.len());

    for entry in entries {
        if records.iter().any(|record| record.id() == entry.id) {
            return Err(Error::SeedFile(format!(
                "duplicate {} ID {}",
                R::NAME,
                entry.id
            )));
        }

        records.push(R::from_data(entry.id, entry.data)?);
    }

    Ok(RecordStore::with_records(records))
}

impl Stores {
    /// Build stores from seed data, validating every record.
    ///
    /// # Errors
    /// Returns [Error::SeedFile] on duplicate IDs, or the validation error of
    /// the first invalid record.
    pub fn from_seed(seed: Seed) -> Result<Self, Error> {
        let stores = Self {
            farms: seed_store(seed.farms)?,
            crops: seed_store(seed.crops)?,
            tasks: seed_store(seed.tasks)?,
            expenses: seed_store(seed.expenses)?,
            budgets: seed_store(seed.budgets)?,
        };

        tracing::info!(
            "loaded {} farms, {} crops, {} tasks, {} expenses and {} budgets",
            stores.farms.list().len(),
            stores.crops.list().len(),
            stores.tasks.list().len(),
            stores.expenses.list().len(),
            stores.budgets.list().len(),
        );

        Ok(stores)
    }
}

impl Stored for Farm {
    fn store(stores: &Stores) -> &RecordStore<Self> {
        &stores.farms
    }

    fn store_mut(stores: &mut Stores) -> &mut RecordStore<Self> {
        &mut stores.farms
    }
}

impl Stored for Crop {
    fn store(stores: &Stores) -> &RecordStore<Self> {
        &stores.crops
    }

    fn store_mut(stores: &mut Stores) -> &mut RecordStore<Self> {
        &mut stores.crops
    }
}

impl Stored for Task {
    fn store(stores: &Stores) -> &RecordStore<Self> {
        &stores.tasks
    }

    fn store_mut(stores: &mut Stores) -> &mut RecordStore<Self> {
        &mut stores.tasks
    }
}

impl Stored for Expense {
    fn store(stores: &Stores) -> &RecordStore<Self> {
        &stores.expenses
    }

    fn store_mut(stores: &mut Stores) -> &mut RecordStore<Self> {
        &mut stores.expenses
    }
}

impl Stored for Budget {
    fn store(stores: &Stores) -> &RecordStore<Self> {
        &stores.budgets
    }

    fn store_mut(stores: &mut Stores) -> &mut RecordStore<Self> {
        &mut stores.budgets
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        farm::{Farm, FarmData},
        store::{RecordStore, Seed, Stores},
    };

    fn farm_data(name: &str) -> FarmData {
        FarmData {
            name: name.to_owned(),
            location: None,
            size_acres: None,
        }
    }

    #[test]
    fn first_record_gets_id_one() {
        let mut store = RecordStore::<Farm>::new();

        let farm = store.create(farm_data("Green Acres")).unwrap();

        assert_eq!(farm.id, 1);
        assert_eq!(store.list(), &[farm]);
    }

    #[test]
    fn new_ids_follow_the_largest_existing_id() {
        let mut store = RecordStore::<Farm>::new();
        store.create(farm_data("A")).unwrap();
        store.create(farm_data("B")).unwrap();
        store.create(farm_data("C")).unwrap();
        store.delete(2).unwrap();

        let farm = store.create(farm_data("D")).unwrap();

        assert_eq!(farm.id, 4);
    }

    #[test]
    fn deleting_the_highest_id_lets_it_be_reused() {
        let mut store = RecordStore::<Farm>::new();
        store.create(farm_data("A")).unwrap();
        store.create(farm_data("B")).unwrap();
        store.delete(2).unwrap();

        let farm = store.create(farm_data("C")).unwrap();

        assert_eq!(farm.id, 2);
    }

    #[test]
    fn get_update_and_delete_missing_ids_fail() {
        let mut store = RecordStore::<Farm>::new();

        assert_eq!(store.get(7), Err(Error::NotFound));
        assert_eq!(store.update(7, farm_data("X")), Err(Error::NotFound));
        assert_eq!(store.delete(7), Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let mut store = RecordStore::<Farm>::new();
        store.create(farm_data("Old name")).unwrap();

        let updated = store.update(1, farm_data("New name")).unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(store.get(1).unwrap().name, "New name");
    }

    #[test]
    fn invalid_data_is_not_stored() {
        let mut store = RecordStore::<Farm>::new();

        let result = store.create(farm_data("   "));

        assert_eq!(result, Err(Error::EmptyField("farm name")));
        assert!(store.list().is_empty());
    }

    #[test]
    fn seeds_keep_their_ids() {
        let seed = Seed::from_json(
            r#"{
                "farms": [{"Id": 3, "name": "Hillside"}],
                "expenses": [{
                    "id": 9, "farm_id": 3, "category": "fuel", "amount": 42.5,
                    "date": "2024-03-04", "description": "Diesel"
                }]
            }"#,
        )
        .unwrap();

        let mut stores = Stores::from_seed(seed).unwrap();

        assert_eq!(stores.farms.get(3).unwrap().name, "Hillside");
        assert_eq!(stores.expenses.get(9).unwrap().amount, 42.5);
        assert_eq!(stores.farms.create(farm_data("Next")).unwrap().id, 4);
    }

    #[test]
    fn seed_with_invalid_date_fails() {
        let seed = Seed::from_json(
            r#"{"expenses": [{
                "id": 1, "farm_id": 1, "category": "seeds", "amount": 1.0,
                "date": "2024-02-31", "description": "Seed corn"
            }]}"#,
        )
        .unwrap();

        assert_eq!(
            Stores::from_seed(seed),
            Err(Error::InvalidDate("2024-02-31".to_owned()))
        );
    }

    #[test]
    fn seed_with_duplicate_ids_fails() {
        let seed =
            Seed::from_json(r#"{"farms": [{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]}"#)
                .unwrap();

        assert!(matches!(Stores::from_seed(seed), Err(Error::SeedFile(_))));
    }

    #[test]
    fn demo_seed_file_is_valid() {
        let seed = Seed::from_json(include_str!("../data/seed.json")).unwrap();

        let stores = Stores::from_seed(seed).unwrap();

        assert_eq!(stores.farms.list().len(), 2);
        assert_eq!(stores.expenses.list().len(), 7);
        assert_eq!(stores.budgets.list().len(), 3);
    }

    #[test]
    fn create_fails_when_ids_are_exhausted() {
        let seed = Seed::from_json(&format!(
            r#"{{"farms": [{{"id": {}, "name": "Edge"}}]}}"#,
            i64::MAX
        ))
        .unwrap();
        let mut stores = Stores::from_seed(seed).unwrap();

        assert_eq!(
            stores.farms.create(farm_data("Next")),
            Err(Error::IdsExhausted("farm"))
        );
        assert_eq!(stores.farms.list().len(), 1);
    }
}

use crate::{
    AppState,
    config::AnalyticsConfig,
    store::{Seed, Stores},
};

/// Two farms with crops, tasks, expenses and budgets spread over early 2024.
const TEST_SEED: &str = r#"{
    "farms": [
        {"id": 1, "name": "North Field", "location": "Valley Rd", "size_acres": 120.5},
        {"id": 2, "name": "South Orchard"}
    ],
    "crops": [
        {"id": 1, "farm_id": 1, "name": "Corn", "status": "growing", "planting_date": "2024-03-15"},
        {"id": 2, "farm_id": 2, "name": "Tomatoes", "status": "harvesting", "planting_date": "2024-02-01"}
    ],
    "tasks": [
        {"id": 1, "farm_id": 1, "crop_id": 1, "title": "Irrigate corn", "due_date": "2024-04-10"},
        {"id": 2, "farm_id": 2, "title": "Prune trees", "due_date": "2024-04-02", "completed": true}
    ],
    "expenses": [
        {"id": 1, "farm_id": 1, "category": "seeds", "amount": 100.0, "date": "2024-01-10", "description": "Corn seed"},
        {"id": 2, "farm_id": 1, "category": "fuel", "amount": 200.0, "date": "2024-02-05", "description": "Diesel", "vendor": "Fuel Co"},
        {"id": 3, "farm_id": 2, "category": "labor", "amount": 300.0, "date": "2024-02-20", "description": "Pickers"}
    ],
    "budgets": [
        {"id": 1, "farm_id": 1, "period": "monthly", "budget_amount": 150.0, "start_date": "2024-02-01"},
        {"id": 2, "farm_id": 2, "period": "annual", "budget_amount": 5000.0, "start_date": "2024-01-01"}
    ]
}"#;

pub(crate) fn seeded_stores() -> Stores {
    let seed = Seed::from_json(TEST_SEED).expect("Could not parse test seed");

    Stores::from_seed(seed).expect("Could not build test stores")
}

pub(crate) fn test_state(stores: Stores) -> AppState {
    AppState::new(stores, AnalyticsConfig::default(), "Etc/UTC")
}

//! Shared state and inputs for the expense and budget forms.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    farm::{Farm, FarmId},
    html::{FORM_LABEL_STYLE, FORM_SELECT_STYLE},
    store::Stores,
};

/// The state needed by the record form pages and endpoints.
#[derive(Debug, Clone)]
pub struct RecordFormState {
    /// The record stores the forms read from and write to.
    pub stores: Arc<Mutex<Stores>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            stores: state.stores.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl RecordFormState {
    pub(crate) fn lock_stores(&self) -> Result<MutexGuard<'_, Stores>, Error> {
        self.stores
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
            .map_err(|_| Error::StoreLockError)
    }
}

/// A labelled select for the farm a record belongs to.
pub(crate) fn farm_select(farms: &[Farm], selected: Option<FarmId>) -> Markup {
    html!(
        div
        {
            label for="farm_id" class=(FORM_LABEL_STYLE) { "Farm" }

            select id="farm_id" name="farm_id" required class=(FORM_SELECT_STYLE)
            {
                @for (index, farm) in farms.iter().enumerate() {
                    option
                        value=(farm.id)
                        selected[selected.map_or(index == 0, |farm_id| farm_id == farm.id)]
                    { (farm.name) }
                }
            }
        }
    )
}

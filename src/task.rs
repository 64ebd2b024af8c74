//! Farm tasks and helpers for summarising their progress.

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error,
    crop::CropId,
    date::parse_date,
    farm::FarmId,
    store::{Record, RecordId},
};

/// Alias for the integer type used for task IDs.
pub type TaskId = RecordId;

/// A job to be done on a farm, optionally tied to a crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// The ID of the task.
    pub id: TaskId,
    /// The farm the task is for.
    pub farm_id: FarmId,
    /// The crop the task is for, if any.
    pub crop_id: Option<CropId>,
    /// What needs to be done.
    pub title: String,
    /// When the task should be done by.
    pub due_date: Date,
    /// Whether the task has been done.
    pub completed: bool,
}

impl Task {
    /// Whether the task was due before `today`.
    pub fn is_overdue(&self, today: Date) -> bool {
        self.due_date < today
    }
}

/// The raw fields for creating or replacing a [Task].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskData {
    /// The farm the task is for.
    pub farm_id: FarmId,
    /// The crop the task is for.
    #[serde(default)]
    pub crop_id: Option<CropId>,
    /// What needs to be done.
    pub title: String,
    /// When the task should be done by, as `YYYY-MM-DD`.
    pub due_date: String,
    /// Whether the task has been done.
    #[serde(default)]
    pub completed: bool,
}

impl Record for Task {
    type Data = TaskData;

    const NAME: &'static str = "task";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_data(id: RecordId, data: TaskData) -> Result<Self, Error> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyField("task title"));
        }

        Ok(Self {
            id,
            farm_id: data.farm_id,
            crop_id: data.crop_id,
            title: title.to_owned(),
            due_date: parse_date(&data.due_date)?,
            completed: data.completed,
        })
    }
}

/// The percentage of `tasks` that are completed, rounded to the nearest
/// whole number. Zero when there are no tasks.
pub fn task_completion_rate(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }

    let completed = tasks.iter().filter(|task| task.completed).count();

    (completed as f64 / tasks.len() as f64 * 100.0).round() as u32
}

/// The incomplete tasks due after `today` and before `today + days`,
/// soonest first.
pub fn upcoming_tasks(tasks: &[Task], today: Date, days: i64) -> Vec<&Task> {
    let horizon = today.saturating_add(Duration::days(days));

    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|task| !task.completed && task.due_date > today && task.due_date < horizon)
        .collect();
    upcoming.sort_by_key(|task| task.due_date);

    upcoming
}

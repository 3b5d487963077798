use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: u32,
    description: String,
    status: Status,
    created_at: DateTime<Utc>,
    // Older task files were written with an `updatedAT` key.
    #[serde(alias = "updatedAT")]
    updated_at: DateTime<Utc>,
}

impl Task {
    fn new(id: u32, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            description,
            status: Status::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refreshes `updated_at`, never letting it fall behind `created_at`.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Todo,
    Doing,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "doing" => Ok(Status::Doing),
            "done" => Ok(Status::Done),
            _ => Err(Error::Validation(format!(
                "invalid status '{s}'. Use 'todo', 'doing', or 'done'"
            ))),
        }
    }
}

/// The full ordered task collection, stored on disk as a bare JSON array.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Eq, PartialEq)]
#[serde(transparent)]
pub struct TaskRepository {
    tasks: Vec<Task>,
}

impl TaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// One more than the highest id in the collection, or 1 when it is empty.
    /// Deleting the task with the highest id frees that id for the next add.
    pub fn next_id(&self) -> Result<u32> {
        self.tasks
            .iter()
            .map(Task::id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| Error::Validation("no task IDs left".to_string()))
    }

    /// Checks loaded tasks: ids positive and unique, `updatedAt` not before
    /// `createdAt`. Returns a description of the first violation.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if task.id == 0 {
                return Err("task ID 0 is not allowed".to_string());
            }
            if !seen.insert(task.id) {
                return Err(format!("task ID {} appears more than once", task.id));
            }
            if task.updated_at < task.created_at {
                return Err(format!(
                    "task ID {} was updated before it was created",
                    task.id
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a new `todo` task and returns its id.
    pub fn add(&mut self, description: String) -> Result<u32> {
        self.add_at(description, Utc::now())
    }

    pub fn update(&mut self, id: u32, description: String) -> Result<&Task> {
        self.update_at(id, description, Utc::now())
    }

    /// Removes the task with `id`, keeping the remaining tasks in order.
    pub fn delete(&mut self, id: u32) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(Error::NotFound(id))?;
        debug!(id, "deleting task");
        Ok(self.tasks.remove(index))
    }

    /// Sets the status of a task. Any status may follow any other.
    pub fn mark(&mut self, id: u32, status: Status) -> Result<&Task> {
        self.mark_at(id, status, Utc::now())
    }

    /// Tasks matching `filter` (all of them for `None`), in insertion order.
    pub fn list(&self, filter: Option<Status>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| filter.is_none_or(|status| task.status == status))
            .collect()
    }

    fn add_at(&mut self, description: String, now: DateTime<Utc>) -> Result<u32> {
        let id = self.next_id()?;
        debug!(id, "adding task");
        self.tasks.push(Task::new(id, description, now));
        Ok(id)
    }

    fn update_at(&mut self, id: u32, description: String, now: DateTime<Utc>) -> Result<&Task> {
        let task = self.find_mut(id)?;
        task.description = description;
        task.touch(now);
        Ok(&*task)
    }

    fn mark_at(&mut self, id: u32, status: Status, now: DateTime<Utc>) -> Result<&Task> {
        let task = self.find_mut(id)?;
        task.status = status;
        task.touch(now);
        Ok(&*task)
    }

    fn find_mut(&mut self, id: u32) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::NotFound(id))
    }
}


#[cfg(test)]
mod next_id_tests {
    use super::*;

    #[test]
    fn test_new_repository_starts_with_id_one() {
        let repo = TaskRepository::new();
        assert_eq!(
            repo.next_id().unwrap(),
            1,
            "New repository should start with id 1"
        );
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut repo = TaskRepository::new();

        let ids: Vec<u32> = (0..5)
            .map(|n| repo.add(format!("Task {n}")).unwrap())
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_removed_id_below_maximum_is_not_reused() {
        // Arrange
        let mut repo = TaskRepository::new();
        repo.add("Task 1".to_string()).unwrap();
        repo.add("Task 2".to_string()).unwrap();
        repo.add("Task 3".to_string()).unwrap();

        // Act
        repo.delete(2).unwrap();
        let id = repo.add("Task 4".to_string()).unwrap();

        // Assert
        assert_eq!(id, 4, "New task should get ID 4, not reuse the removed ID 2");
    }

    #[test]
    fn test_deleting_highest_id_frees_it_for_next_add() {
        // Arrange
        let mut repo = TaskRepository::new();
        repo.add("Task 1".to_string()).unwrap();
        repo.add("Task 2".to_string()).unwrap();
        repo.add("Task 3".to_string()).unwrap();

        // Act
        repo.delete(3).unwrap();
        let id = repo.add("Task 3 again".to_string()).unwrap();

        // Assert
        assert_eq!(id, 3, "Next id follows the highest remaining id");
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_add_fails_when_ids_are_exhausted() {
        // Arrange
        let json = format!(
            r#"[{{
                "id": {},
                "description": "last",
                "status": "todo",
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            }}]"#,
            u32::MAX
        );
        let mut repo: TaskRepository = serde_json::from_str(&json).unwrap();
        let before = repo.clone();

        // Act
        let result = repo.add("one too many".to_string());

        // Assert
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(repo, before);
    }

    #[test]
    fn test_next_id_follows_maximum_loaded_id() {
        // Arrange
        let json = r#"
        [
            {
                "id": 100,
                "description": "Task 100",
                "status": "todo",
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            },
            {
                "id": 7,
                "description": "Task 7",
                "status": "done",
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-02T00:00:00Z"
            }
        ]
        "#;

        // Act
        let mut repo: TaskRepository = serde_json::from_str(json).unwrap();
        let id = repo.add("Task 101".to_string()).unwrap();

        // Assert
        assert_eq!(id, 101, "New id should be one above the highest id");
    }

    #[test]
    fn test_legacy_updated_at_key_is_accepted() {
        // Arrange
        let json = r#"[{
            "id": 1,
            "description": "legacy",
            "status": "doing",
            "createdAt": "2024-05-01T10:00:00+02:00",
            "updatedAT": "2024-05-01T11:00:00+02:00"
        }]"#;

        // Act
        let repo: TaskRepository = serde_json::from_str(json).unwrap();
        let reserialized = serde_json::to_string(&repo).unwrap();

        // Assert
        let task = repo.get(1).unwrap();
        assert_eq!(task.status(), Status::Doing);
        assert_eq!(task.updated_at().to_rfc3339(), "2024-05-01T09:00:00+00:00");
        assert!(reserialized.contains("\"updatedAt\""));
        assert!(!reserialized.contains("\"updatedAT\""));
    }
}

pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod task;

pub use error::{Error, Result};
pub use storage::{JsonFileStore, TaskStore};
pub use task::{Status, Task, TaskRepository};

use crate::error::{Error, Result};
use crate::task::TaskRepository;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Loads and saves the whole task collection in one piece.
pub trait TaskStore {
    fn load(&self) -> Result<TaskRepository>;
    fn save(&self, tasks: &TaskRepository) -> Result<()>;
}

/// A pretty-printed JSON array in a single file.
///
/// Every save rewrites the file completely. There is no locking, so two
/// invocations running at the same time leave whichever saved last.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Empty, blank, NUL-led or `null` content holds no tasks.
fn is_effectively_empty(contents: &[u8]) -> bool {
    if contents.first() == Some(&0) {
        return true;
    }
    let trimmed = contents.trim_ascii();
    trimmed.is_empty() || trimmed == b"null"
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<TaskRepository> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file missing, starting empty");
                return Ok(TaskRepository::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if is_effectively_empty(&contents) {
            debug!(path = %self.path.display(), "task file is empty");
            return Ok(TaskRepository::new());
        }

        let tasks: TaskRepository =
            serde_json::from_slice(&contents).map_err(|source| Error::Decode {
                path: self.path.clone(),
                source,
            })?;
        tasks.validate().map_err(|reason| Error::Invalid {
            path: self.path.clone(),
            reason,
        })?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn save(&self, tasks: &TaskRepository) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(tasks).map_err(Error::Encode)?;
        json.push(b'\n');
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

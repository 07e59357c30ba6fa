//! Image catalog and asynchronous image fetching.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::error::DependencyError;
use crate::unit::Reply;

/// A fetched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub type FetchReply = Reply<Result<Image, DependencyError>>;

pub trait ImageService: Send + Sync {
    /// Names of every image that can be fetched.
    fn catalog(&self) -> Result<Vec<String>, DependencyError>;

    /// Start fetching `name`. The result arrives through `reply`.
    fn fetch(&self, name: &str, reply: FetchReply);

    /// Block until every in-flight fetch has posted its result.
    fn settle(&self) {}
}

/// Serves images from a directory, reading each one on a worker thread.
pub struct DiskImageService {
    dir: PathBuf,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl DiskImageService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unavailable(&self, reason: impl ToString) -> DependencyError {
        DependencyError::Unavailable {
            service: "image store",
            reason: reason.to_string(),
        }
    }
}

fn read_image(dir: &Path, name: &str) -> Result<Image, DependencyError> {
    // Names come from the catalog; anything with a separator is not one of ours.
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
        return Err(DependencyError::NotFound {
            what: name.to_string(),
        });
    }
    let path = dir.join(name);
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Image {
            name: name.to_string(),
            bytes,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(DependencyError::NotFound {
            what: name.to_string(),
        }),
        Err(err) => Err(DependencyError::Failed(format!(
            "reading {}: {err}",
            path.display()
        ))),
    }
}

impl ImageService for DiskImageService {
    fn catalog(&self) -> Result<Vec<String>, DependencyError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|err| self.unavailable(err))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| self.unavailable(err))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn fetch(&self, name: &str, reply: FetchReply) {
        let dir = self.dir.clone();
        let name = name.to_string();
        tracing::debug!(image = %name, ticket = %reply.ticket(), "Fetching image");
        let handle = std::thread::spawn(move || {
            let result = read_image(&dir, &name);
            reply.complete(result);
        });
        let mut workers = self.workers.lock();
        workers.retain(|worker| !worker.is_finished());
        workers.push(handle);
    }

    fn settle(&self) {
        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("Image worker panicked");
            }
        }
    }
}

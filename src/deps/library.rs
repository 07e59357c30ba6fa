//! Ledger of downloaded images, shared by every screen that shows it.

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub name: String,
    pub bytes: usize,
}

pub trait Library: Send + Sync {
    fn record(&self, entry: LibraryEntry);

    fn count(&self) -> usize;

    fn entries(&self) -> Vec<LibraryEntry>;

    /// Remove everything, returning how many entries were dropped.
    fn clear(&self) -> usize;
}

#[derive(Default)]
pub struct MemoryLibrary {
    entries: Mutex<Vec<LibraryEntry>>,
}

impl Library for MemoryLibrary {
    fn record(&self, entry: LibraryEntry) {
        tracing::debug!(image = %entry.name, bytes = entry.bytes, "Recorded download");
        self.entries.lock().push(entry);
    }

    fn count(&self) -> usize {
        self.entries.lock().len()
    }

    fn entries(&self) -> Vec<LibraryEntry> {
        self.entries.lock().clone()
    }

    fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        entries.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn record_and_clear() {
        let library = MemoryLibrary::default();
        library.record(LibraryEntry {
            name: "a.png".into(),
            bytes: 3,
        });
        library.record(LibraryEntry {
            name: "b.png".into(),
            bytes: 5,
        });
        assert_eq!(library.count(), 2);
        assert_eq!(library.entries()[1].name, "b.png");
        assert_eq!(library.clear(), 2);
        assert_eq!(library.count(), 0);
    }

    #[test]
    fn shared_across_threads() {
        let library = Arc::new(MemoryLibrary::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let library = Arc::clone(&library);
                std::thread::spawn(move || {
                    library.record(LibraryEntry {
                        name: format!("{i}.png"),
                        bytes: i,
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(library.count(), 4);
    }
}

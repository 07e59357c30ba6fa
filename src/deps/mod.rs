//! Business dependencies and the interface-keyed table they are wired from.
//!
//! Every dependency is reached through a trait object. The table is keyed by
//! the interface type (`dyn ImageService`, ...), never by an implementation,
//! which is what makes substitution in tests possible.

mod images;
mod library;
mod session;
mod surface;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

pub use images::{DiskImageService, FetchReply, Image, ImageService};
pub use library::{Library, LibraryEntry, MemoryLibrary};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use surface::LogSurfaceProvider;

use crate::error::CompositionError;

#[derive(Clone)]
struct Entry {
    interface: &'static str,
    handle: Arc<dyn Any + Send + Sync>,
}

/// Interface → instance table.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: HashMap<TypeId, Entry>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` as the implementation of interface `T`, replacing
    /// any earlier one.
    pub fn provide<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                interface: type_name::<T>(),
                handle: Arc::new(service),
            },
        );
        self
    }

    /// Builder form of [`provide`](Self::provide).
    pub fn with<T>(mut self, service: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.provide(service);
        self
    }

    pub fn resolve<T>(&self) -> Result<Arc<T>, CompositionError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.handle.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or(CompositionError::MissingDependency {
                interface: type_name::<T>(),
            })
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Take every entry of `other`, replacing entries for the same interface.
    pub fn merge(&mut self, other: Dependencies) {
        self.entries.extend(other.entries);
    }

    /// Registered interface names, sorted.
    pub fn interfaces(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries.values().map(|e| e.interface).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.interfaces()).finish()
    }
}

//! Engine registry: maps engine ids to live engines.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::engine::Engine;

/// Opaque engine handle, `engine-<n>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EngineId(String);

impl EngineId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EngineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub type SharedEngine = Arc<Mutex<Engine>>;

#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<String, SharedEngine>,
    next_id: u64,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an engine under a fresh id. Ids are never reused.
    pub fn insert(&mut self, engine: Engine) -> EngineId {
        self.next_id += 1;
        let id = EngineId(format!("engine-{}", self.next_id));
        self.engines
            .insert(id.0.clone(), Arc::new(Mutex::new(engine)));
        id
    }

    pub fn get(&self, id: &str) -> Option<SharedEngine> {
        self.engines.get(id).cloned()
    }

    pub fn remove(&mut self, id: &str) -> Option<SharedEngine> {
        self.engines.remove(id)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

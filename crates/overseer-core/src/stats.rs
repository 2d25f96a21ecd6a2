//! Namespaced counters.
//!
//! Counters are grouped by namespace (`tasks`, `disks`, `channels`, ...)
//! and persisted under `stats.<namespace>.<id>`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::PersistentState;

pub const TASKS: &str = "tasks";
pub const DISKS: &str = "disks";
pub const CHANNELS: &str = "channels";
pub const HACKS: &str = "hacks";
pub const VERDICTS: &str = "verdicts";
pub const RESEARCH: &str = "research";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    counters: BTreeMap<String, BTreeMap<String, i64>>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: &str, id: &str) -> i64 {
        self.counters
            .get(namespace)
            .and_then(|ns| ns.get(id))
            .copied()
            .unwrap_or(0)
    }

    pub fn add(&mut self, namespace: &str, id: &str, delta: i64) {
        let counter = self
            .counters
            .entry(namespace.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert(0);
        *counter += delta;
    }

    pub fn increment(&mut self, namespace: &str, id: &str) {
        self.add(namespace, id, 1);
    }

    pub fn decrement(&mut self, namespace: &str, id: &str) {
        self.add(namespace, id, -1);
    }

    /// Overwrites a gauge.
    pub fn set(&mut self, namespace: &str, id: &str, value: i64) {
        self.counters
            .entry(namespace.to_string())
            .or_default()
            .insert(id.to_string(), value);
    }

    pub fn namespace(&self, namespace: &str) -> impl Iterator<Item = (&str, i64)> {
        self.counters
            .get(namespace)
            .into_iter()
            .flat_map(|ns| ns.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Reads every `stats.<namespace>.<id>` number; anything else is skipped.
    pub fn load(state: &PersistentState) -> Self {
        let mut stats = Self::new();
        let Some(Value::Object(namespaces)) = state.get_value("stats") else {
            return stats;
        };
        for (namespace, ids) in namespaces {
            let Value::Object(ids) = ids else { continue };
            for (id, value) in ids {
                if let Some(n) = value.as_i64() {
                    stats.set(namespace, id, n);
                }
            }
        }
        stats
    }

    pub fn store(&self, state: &mut PersistentState) {
        for (namespace, ids) in &self.counters {
            for (id, value) in ids {
                state.set_value(&format!("stats.{namespace}.{id}"), Value::from(*value));
            }
        }
    }
}

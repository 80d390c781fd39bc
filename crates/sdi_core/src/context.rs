//! Per-run context handed to each station.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::station::LogEntry;

/// State shared by the stations of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Unique run identifier
    pub run_id: Uuid,
    /// The submitted process description, trimmed
    pub input: String,
    pub started_at: DateTime<Utc>,
    /// Values stations hand to later stations
    pub values: HashMap<String, serde_json::Value>,
    /// Log lines collected across stations
    pub logs: Vec<LogEntry>,
}

impl RunContext {
    pub fn new(run_id: Uuid, input: impl Into<String>) -> Self {
        Self {
            run_id,
            input: input.into(),
            started_at: Utc::now(),
            values: HashMap::new(),
            logs: Vec::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_values() {
        let mut ctx = RunContext::new(Uuid::new_v4(), "a pump and a tank");
        ctx.set("tokens", serde_json::json!(4));
        assert_eq!(ctx.get("tokens"), Some(&serde_json::json!(4)));
        assert!(ctx.get("missing").is_none());
    }
}

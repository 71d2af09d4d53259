//! The repair action trace: an append-only, serializable record of every
//! action attempted during a run, mirroring the teacher's tape in spirit
//! (an audit trail alongside the derived result) without its binary framing
//! -- the coverage report this feeds is a JSON document, so the trace is
//! kept as canonical JSON rather than a separate wire format.

use serde_json::{json, Value};

use schema_core::diag::canonical_json_bytes;

use crate::action::RepairAction;

/// One attempted action and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub cycle: u32,
    pub action: RepairAction,
    pub score_before: u32,
    pub score_after: u32,
    pub accepted: bool,
}

impl ActionRecord {
    fn to_json(&self) -> Value {
        json!({
            "cycle": self.cycle,
            "keyword": self.action.keyword(),
            "scoreBefore": self.score_before,
            "scoreAfter": self.score_after,
            "accepted": self.accepted,
        })
    }
}

/// The ordered trace of every action attempted across a repair run.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    records: Vec<ActionRecord>,
}

impl ActionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ActionRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.records.iter().filter(|r| r.accepted).count()
    }

    /// Render the trace as canonical JSON bytes, for embedding into a
    /// coverage report or hashing for reproducibility checks.
    #[must_use]
    pub fn to_canonical_json_bytes(&self) -> Vec<u8> {
        let entries: Vec<Value> = self.records.iter().map(ActionRecord::to_json).collect();
        canonical_json_bytes(&json!({"actions": entries}))
    }
}

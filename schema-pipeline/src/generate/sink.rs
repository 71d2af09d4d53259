//! The write-only coverage sink generators push events into.
//!
//! Mirrors the teacher's Design Notes §9 "write-only sink" hook: a
//! generator records what it covered as a side effect, rather than every
//! call threading a `Vec<CoverageEvent>` back up through its return value.

use schema_core::pointer::Pointer;

/// One unit of coverage a generator produced while synthesizing an
/// instance: "this dimension, at this schema location, via this
/// operation, landed at this instance location."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEvent {
    pub canon_path: Pointer,
    pub dimension: &'static str,
    pub operation_key: String,
    pub instance_path: Pointer,
}

/// Append-only collector for [`CoverageEvent`]s across one `generate()` call.
#[derive(Debug, Clone, Default)]
pub struct CoverageSink {
    events: Vec<CoverageEvent>,
}

impl CoverageSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CoverageEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[CoverageEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events_in_push_order() {
        let mut sink = CoverageSink::new();
        sink.push(CoverageEvent {
            canon_path: Pointer::root(),
            dimension: "structure",
            operation_key: "required".to_string(),
            instance_path: Pointer::root(),
        });
        sink.push(CoverageEvent {
            canon_path: Pointer::root(),
            dimension: "boundary",
            operation_key: "minimum".to_string(),
            instance_path: Pointer::root(),
        });
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.events()[0].dimension, "structure");
    }
}

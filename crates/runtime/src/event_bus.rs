/// What happened, in engine terms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    BoundariesLoaded,
    StatisticsLoaded,
    LoadFailed,
    LevelActivated,
    StatisticsRefreshed,
    SelectionChanged,
}

/// Frame-indexed engine event.
///
/// Structured text for now; `kind` is what tests and tools match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub tick: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Append-only event log drained by the host.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, tick: u64, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            tick,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

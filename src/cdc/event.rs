//! Table events and the listener interface.

use std::fmt;

/// What happened to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableEventKind {
    Selected,
    Inserted,
    Updated,
    Deleted,
    Created,
    Dropped,
}

impl fmt::Display for TableEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableEventKind::Selected => "selected",
            TableEventKind::Inserted => "inserted",
            TableEventKind::Updated => "updated",
            TableEventKind::Deleted => "deleted",
            TableEventKind::Created => "created",
            TableEventKind::Dropped => "dropped",
        };
        f.write_str(name)
    }
}

/// One table-level event fired by the storage engine.
///
/// `statement` is the query text that caused the event, in whichever
/// dialect the user wrote it (e.g. `TANAM KE users (1, 'Ayu', 17)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEvent {
    pub kind: TableEventKind,
    pub table: String,
    pub statement: String,
}

impl TableEvent {
    pub fn new(kind: TableEventKind, table: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            statement: statement.into(),
        }
    }
}

/// Receives table events.
///
/// Every method defaults to doing nothing, so a listener only overrides the
/// events it cares about. Listeners are called on the mutation path and must
/// not fail it: report problems through logging instead.
pub trait TableEventListener: Send + Sync {
    fn on_table_selected(&self, _table: &str, _statement: &str) {}

    fn on_table_inserted(&self, _table: &str, _statement: &str) {}

    fn on_table_updated(&self, _table: &str, _statement: &str) {}

    fn on_table_deleted(&self, _table: &str, _statement: &str) {}

    fn on_table_created(&self, _table: &str, _statement: &str) {}

    fn on_table_dropped(&self, _table: &str, _statement: &str) {}

    /// Route an event to the matching `on_*` method.
    fn on_event(&self, event: &TableEvent) {
        let (table, statement) = (event.table.as_str(), event.statement.as_str());
        match event.kind {
            TableEventKind::Selected => self.on_table_selected(table, statement),
            TableEventKind::Inserted => self.on_table_inserted(table, statement),
            TableEventKind::Updated => self.on_table_updated(table, statement),
            TableEventKind::Deleted => self.on_table_deleted(table, statement),
            TableEventKind::Created => self.on_table_created(table, statement),
            TableEventKind::Dropped => self.on_table_dropped(table, statement),
        }
    }
}

/// Fans each event out to every registered listener, in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn TableEventListener>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe<L: TableEventListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver an event to every listener.
    pub fn publish(&self, event: &TableEvent) {
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every callback as "kind:table".
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl TableEventListener for Recorder {
        fn on_table_inserted(&self, table: &str, _statement: &str) {
            self.seen.lock().push(format!("inserted:{}", table));
        }

        fn on_table_dropped(&self, table: &str, _statement: &str) {
            self.seen.lock().push(format!("dropped:{}", table));
        }
    }

    #[test]
    fn test_on_event_dispatches_by_kind() {
        let recorder = Recorder::default();
        recorder.on_event(&TableEvent::new(TableEventKind::Inserted, "users", "TANAM KE users (1)"));
        recorder.on_event(&TableEvent::new(TableEventKind::Selected, "users", "PANEN * DARI users"));
        recorder.on_event(&TableEvent::new(TableEventKind::Dropped, "karet", "BAKAR LAHAN karet"));

        // Selected falls through to the default no-op.
        assert_eq!(*recorder.seen.lock(), vec!["inserted:users", "dropped:karet"]);
    }

    #[test]
    fn test_bus_fans_out_to_all_listeners() {
        let first = Recorder::default();
        let second = Recorder::default();

        let mut bus = EventBus::new();
        assert!(bus.is_empty());
        bus.subscribe(first.clone());
        bus.subscribe(second.clone());
        assert_eq!(bus.len(), 2);

        bus.publish(&TableEvent::new(TableEventKind::Inserted, "users", "TANAM KE users (2)"));

        assert_eq!(first.seen.lock().len(), 1);
        assert_eq!(second.seen.lock().len(), 1);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TableEventKind::Updated.to_string(), "updated");
        assert_eq!(format!("{:?}", EventBus::new()), "EventBus { listeners: 0 }");
    }
}

use std::fmt;

use super::document::ModelDoc;

/// Which entity collection an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vertex,
    Edge,
    Surface,
}

/// Lifecycle step of a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityChange {
    Created,
    Removed,
    Selected,
    Deselected,
}

/// Per-entity notification, aimed at observers such as a property inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEvent {
    pub kind: EntityKind,
    /// Persistent id of the entity.
    pub id: String,
    pub change: EntityChange,
}

/// A completed logical edit: the action label plus the model state after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub action: String,
    pub snapshot: ModelDoc,
}

/// Everything a [`Model`](super::Model) broadcasts to its listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// One per logical mutation; the history signal.
    Changed(ChangeEvent),
    /// Fine-grained entity lifecycle.
    Entity(EntityEvent),
    /// The whole entity graph was swapped (import, undo, redo, jump).
    Replaced,
}

/// Handle returned by [`Model::on_change`](super::Model::on_change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&ModelEvent)>;

/// Ordered listener registry. Delivery is synchronous, in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Callback)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn dispatch(&mut self, event: &ModelEvent) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatch_follows_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();

        let first = Rc::clone(&log);
        listeners.add(Box::new(move |_| first.borrow_mut().push(1)));
        let second = Rc::clone(&log);
        listeners.add(Box::new(move |_| second.borrow_mut().push(2)));

        listeners.dispatch(&ModelEvent::Replaced);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn removed_listener_is_silent() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::default();
        let counter = Rc::clone(&hits);
        let id = listeners.add(Box::new(move |_| *counter.borrow_mut() += 1));

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.dispatch(&ModelEvent::Replaced);
        assert_eq!(*hits.borrow(), 0);
    }
}

//! Editor event subscriptions.
//!
//! Hosts report window lifecycle events by firing them on an [`EventBus`].
//! Controllers subscribe at creation to keep dependent windows consistent,
//! e.g. closing a border window when its content window goes away.

use std::fmt;

use crate::error::Result;
use crate::host::{BufferId, Host};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEvent {
    /// A buffer stopped being displayed in a window.
    BufWinLeave(BufferId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&mut dyn Host, &EditorEvent) -> Result<()>>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&mut dyn Host, &EditorEvent) -> Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in subscription order. A failing
    /// listener is logged and does not stop the others.
    pub fn fire(&mut self, host: &mut dyn Host, event: &EditorEvent) {
        tracing::trace!(?event, listeners = self.listeners.len(), "firing event");
        for (id, listener) in &mut self.listeners {
            if let Err(err) = listener(host, event) {
                tracing::error!(subscription = ?id, ?event, error = %err, "event listener failed");
            }
        }
    }

    /// Fire every event in `events`, in order.
    pub fn fire_all<I>(&mut self, host: &mut dyn Host, events: I)
    where
        I: IntoIterator<Item = EditorEvent>,
    {
        for event in events {
            self.fire(host, &event);
        }
    }
}

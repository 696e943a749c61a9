use std::sync::{Arc, Weak};

use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::Mutex;

/// Notification sent by [`InfoClick`](super::InfoClick) to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoClickEvent {
    /// A click query started (`true`) or finished (`false`). Used to show a busy cursor.
    BusyChanged(bool),
    /// All probes of a click completed and the results were stored. Sent exactly once per click that was not
    /// superseded by a newer one.
    LoadFinished {
        /// Number of results.
        count: usize,
    },
    /// Selected result changed.
    SelectionChanged(Option<usize>),
}

/// Receiver of [`InfoClickEvent`]s.
pub trait EventListener: MaybeSend + MaybeSync {
    /// Handles the event.
    fn on_event(&self, event: &InfoClickEvent);
}

impl<T: Fn(&InfoClickEvent) + MaybeSend + MaybeSync> EventListener for T {
    fn on_event(&self, event: &InfoClickEvent) {
        self(event)
    }
}

type ListenerList = Mutex<Vec<(u64, Arc<dyn EventListener>)>>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: Mutex<u64>,
    list: Arc<ListenerList>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, listener: impl EventListener + 'static) -> Subscription {
        let id = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            *next_id
        };
        self.list.lock().push((id, Arc::new(listener)));

        Subscription {
            id,
            list: Arc::downgrade(&self.list),
        }
    }

    pub(crate) fn emit(&self, event: InfoClickEvent) {
        // Listeners may subscribe or unsubscribe from the callback.
        let listeners: Vec<_> = self
            .list
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener.on_event(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.list.lock().len()
    }
}

/// Handle of a registered listener. The listener is removed when the handle is dropped.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    list: Weak<ListenerList>,
}

impl Subscription {
    /// Keeps the listener registered for the lifetime of the aggregator.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            list.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

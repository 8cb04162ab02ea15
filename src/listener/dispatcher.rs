//! Ordered, re-entrancy-safe listener notification (§4.4).
//!
//! Listeners are held in a copy-on-write `Vec` so a notification's snapshot
//! is stable under concurrent add/remove. A notification pass is a deque
//! drained FIFO: a listener callback that triggers another notification gets
//! its batch appended, not interleaved, and the outer drain keeps going until
//! the deque is empty (never recursing into `notify` itself).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::events::{dispatch_to, PlayerEvent, PlayerListener};

struct Batch {
    listeners: Arc<Vec<Arc<dyn PlayerListener>>>,
    events: Vec<PlayerEvent>,
}

/// Owns the listener list and the pending-notification deque for a
/// [`crate::player::Player`].
pub struct ListenerDispatcher {
    listeners: Mutex<Arc<Vec<Arc<dyn PlayerListener>>>>,
    queue: Mutex<VecDeque<Batch>>,
    draining: Mutex<bool>,
}

impl Default for ListenerDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Arc::new(Vec::new())),
            queue: Mutex::new(VecDeque::new()),
            draining: Mutex::new(false),
        }
    }

    /// Add a listener. Effective for notifications enqueued after this call
    /// returns; never retroactive for a notification pass already in
    /// progress (§4.4 item 3).
    pub fn add_listener(&self, listener: Arc<dyn PlayerListener>) {
        let mut listeners = self.listeners.lock().unwrap();
        let mut next = (**listeners).clone();
        next.push(listener);
        *listeners = Arc::new(next);
    }

    /// Remove every listener pointer-equal to `listener`. Same timing
    /// guarantee as [`Self::add_listener`].
    pub fn remove_listener(&self, listener: &Arc<dyn PlayerListener>) {
        let mut listeners = self.listeners.lock().unwrap();
        let next: Vec<Arc<dyn PlayerListener>> =
            (**listeners).iter().filter(|l| !Arc::ptr_eq(l, listener)).cloned().collect();
        *listeners = Arc::new(next);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Enqueue one `PlaybackInfo` update's worth of sub-events (already in
    /// §4.4 order) and drain the deque if this call is the outermost one.
    pub fn notify(&self, events: Vec<PlayerEvent>) {
        if events.is_empty() {
            return;
        }
        let snapshot = self.listeners.lock().unwrap().clone();
        self.queue.lock().unwrap().push_back(Batch { listeners: snapshot, events });

        let mut draining = self.draining.lock().unwrap();
        if *draining {
            // A callback from an outer `notify` triggered this one: the
            // batch is now queued and the outer drain loop will reach it.
            return;
        }
        *draining = true;
        drop(draining);

        loop {
            let next = self.queue.lock().unwrap().pop_front();
            let Some(batch) = next else { break };
            for listener in batch.listeners.iter() {
                for event in &batch.events {
                    dispatch_to(listener.as_ref(), event);
                }
            }
        }

        *self.draining.lock().unwrap() = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlaybackState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingListener {
        order: Mutex<Vec<&'static str>>,
    }

    impl PlayerListener for RecordingListener {
        fn on_timeline_changed(&self, _timeline: &crate::timeline::Timeline, _reason: crate::state::TimelineChangeReason) {
            self.order.lock().unwrap().push("timeline");
        }
        fn on_position_discontinuity(&self, _reason: crate::state::DiscontinuityReason) {
            self.order.lock().unwrap().push("discontinuity");
        }
        fn on_player_state_changed(&self, _play_when_ready: bool, _state: PlaybackState) {
            self.order.lock().unwrap().push("state");
        }
        fn on_seek_processed(&self) {
            self.order.lock().unwrap().push("seek_processed");
        }
    }

    fn sample_events() -> Vec<PlayerEvent> {
        vec![
            PlayerEvent::TimelineChanged(crate::timeline::Timeline::EMPTY, crate::state::TimelineChangeReason::PlaylistChanged),
            PlayerEvent::PositionDiscontinuity(crate::state::DiscontinuityReason::Seek),
            PlayerEvent::PlayerStateChanged { play_when_ready: true, state: PlaybackState::Buffering },
            PlayerEvent::SeekProcessed,
        ]
    }

    #[test]
    fn dispatches_sub_events_in_order() {
        let dispatcher = ListenerDispatcher::new();
        let listener = Arc::new(RecordingListener { order: Mutex::new(Vec::new()) });
        dispatcher.add_listener(listener.clone());

        dispatcher.notify(sample_events());

        assert_eq!(*listener.order.lock().unwrap(), vec!["timeline", "discontinuity", "state", "seek_processed"]);
    }

    #[test]
    fn two_listeners_observe_identical_sequences() {
        let dispatcher = ListenerDispatcher::new();
        let a = Arc::new(RecordingListener { order: Mutex::new(Vec::new()) });
        let b = Arc::new(RecordingListener { order: Mutex::new(Vec::new()) });
        dispatcher.add_listener(a.clone());
        dispatcher.add_listener(b.clone());

        dispatcher.notify(sample_events());

        assert_eq!(*a.order.lock().unwrap(), *b.order.lock().unwrap());
    }

    struct ReentrantListener {
        dispatcher: *const ListenerDispatcher,
        fired: AtomicUsize,
    }
    // SAFETY: test-only; the dispatcher outlives the listener within each test.
    unsafe impl Send for ReentrantListener {}
    unsafe impl Sync for ReentrantListener {}

    impl PlayerListener for ReentrantListener {
        fn on_seek_processed(&self) {
            let count = self.fired.fetch_add(1, Ordering::SeqCst);
            if count == 0 {
                let dispatcher = unsafe { &*self.dispatcher };
                dispatcher.notify(vec![PlayerEvent::SeekProcessed]);
            }
        }
    }

    #[test]
    fn reentrant_notification_is_appended_not_interleaved() {
        let dispatcher = ListenerDispatcher::new();
        let listener = Arc::new(ReentrantListener { dispatcher: &dispatcher, fired: AtomicUsize::new(0) });
        dispatcher.add_listener(listener.clone());

        dispatcher.notify(vec![PlayerEvent::SeekProcessed]);

        assert_eq!(listener.fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_added_during_callback_only_sees_subsequent_batches() {
        struct Adder {
            dispatcher: *const ListenerDispatcher,
            added: Arc<RecordingListener>,
        }
        unsafe impl Send for Adder {}
        unsafe impl Sync for Adder {}
        impl PlayerListener for Adder {
            fn on_seek_processed(&self) {
                let dispatcher = unsafe { &*self.dispatcher };
                dispatcher.add_listener(self.added.clone());
            }
        }

        let dispatcher = ListenerDispatcher::new();
        let added = Arc::new(RecordingListener { order: Mutex::new(Vec::new()) });
        let adder = Arc::new(Adder { dispatcher: &dispatcher, added: added.clone() });
        dispatcher.add_listener(adder);

        dispatcher.notify(vec![PlayerEvent::SeekProcessed]);
        assert!(added.order.lock().unwrap().is_empty());

        dispatcher.notify(vec![PlayerEvent::SeekProcessed]);
        assert_eq!(*added.order.lock().unwrap(), vec!["seek_processed"]);
    }
}

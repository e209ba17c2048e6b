//! crossbeam plumbing between the core and whichever front end listens.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{Event, PipelineEvent, PipelinePhase};

/// Reporting handle passed into every run.
///
/// Clones share one queue, so rayon workers can report fingerprint
/// progress while the pass itself reports decisions.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Report an event; dropped once nobody is listening
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    /// Announce that a run moved into `phase`
    pub fn phase(&self, phase: PipelinePhase) {
        self.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }
}

/// Listening end, drained by a progress thread
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Events in send order, ending once every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Open an unbounded event queue
pub fn channel() -> (EventSender, EventReceiver) {
    let (sender, receiver) = unbounded();
    (
        EventSender { inner: sender },
        EventReceiver { inner: receiver },
    )
}

/// A sender with no listener, for runs nobody watches
pub fn null_sender() -> EventSender {
    channel().0
}

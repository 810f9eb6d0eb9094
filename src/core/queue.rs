use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::CaptureTerminated;
use crate::packet::CapturedPacket;

/// Notifications sent to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    PacketsAvailable,
    /// The capture primitive ended unexpectedly; sent once per session.
    Terminated(CaptureTerminated),
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<CapturedPacket>,
    /// Producers holding an older epoch are sealed.
    epoch: u64,
    /// A `PacketsAvailable` was sent and not yet consumed by an empty pop.
    notified: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<QueueState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Consumer side of the queue between the capture thread and the UI.
///
/// Producers never block. The consumer is woken by an edge-triggered
/// `CaptureEvent::PacketsAvailable`: one event may stand for many packets,
/// and the next one is only armed once `try_pop` finds the queue empty, so
/// consumers drain until `None` on every event.
#[derive(Debug)]
pub struct DeliveryQueue {
    shared: Arc<Shared>,
    events: Sender<CaptureEvent>,
}

impl DeliveryQueue {
    pub fn new() -> (Self, Receiver<CaptureEvent>) {
        let (events, receiver) = mpsc::channel();
        let queue = Self {
            shared: Arc::new(Shared::default()),
            events,
        };
        (queue, receiver)
    }

    /// Opens a new producer epoch. Senders from earlier epochs stop
    /// delivering.
    pub fn sender(&self) -> PacketSender {
        let mut state = self.shared.lock();
        state.epoch += 1;

        PacketSender {
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
            epoch: state.epoch,
        }
    }

    /// Closes the current epoch. Once this returns no push can land until
    /// a new sender is opened; packets already queued stay poppable.
    pub fn seal(&self) {
        self.shared.lock().epoch += 1;
    }

    pub fn try_pop(&self) -> Option<CapturedPacket> {
        let mut state = self.shared.lock();
        let packet = state.items.pop_front();
        if packet.is_none() {
            state.notified = false;
        }
        packet
    }

    /// Pops until the queue is empty, re-arming the notification.
    pub fn drain(&self) -> Drain<'_> {
        Drain { queue: self }
    }

    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops everything still queued.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        state.items.clear();
        state.notified = false;
    }
}

pub struct Drain<'a> {
    queue: &'a DeliveryQueue,
}

impl Iterator for Drain<'_> {
    type Item = CapturedPacket;

    fn next(&mut self) -> Option<CapturedPacket> {
        self.queue.try_pop()
    }
}

/// Producer side, owned by one capture thread.
#[derive(Debug)]
pub struct PacketSender {
    shared: Arc<Shared>,
    events: Sender<CaptureEvent>,
    epoch: u64,
}

impl PacketSender {
    /// Appends a packet without blocking. Returns `false` if this sender
    /// has been sealed, in which case the packet is dropped.
    pub fn push(&self, packet: CapturedPacket) -> bool {
        let notify = {
            let mut state = self.shared.lock();
            if state.epoch != self.epoch {
                return false;
            }
            state.items.push_back(packet);
            !std::mem::replace(&mut state.notified, true)
        };

        if notify {
            // a gone receiver just means nobody is listening any more
            let _ = self.events.send(CaptureEvent::PacketsAvailable);
        }
        true
    }

    /// Reports that the capture ended on its own. Ignored once sealed.
    pub fn terminate(&self, reason: CaptureTerminated) -> bool {
        if !self.is_open() {
            return false;
        }
        let _ = self.events.send(CaptureEvent::Terminated(reason));
        true
    }

    pub fn is_open(&self) -> bool {
        self.shared.lock().epoch == self.epoch
    }
}

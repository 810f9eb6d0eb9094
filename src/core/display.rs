use std::collections::VecDeque;

use crate::packet::CapturedPacket;

/// Default number of rows kept.
pub const MAXSIZE: usize = 1024;

/// FIFO of the most recent packets, oldest evicted first.
///
/// Rows are kept in strictly increasing sequence order, so lookups by
/// sequence number are a binary search. Inserting a packet whose sequence
/// does not advance past the newest row means a new capture session has
/// begun; the rows from the old session are dropped first.
#[derive(Debug)]
pub struct DisplayBuffer {
    rows: VecDeque<CapturedPacket>,
    capacity: usize,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAXSIZE)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a packet, evicting the oldest row when full. Returns the
    /// number of rows dropped.
    pub fn insert(&mut self, packet: CapturedPacket) -> usize {
        let mut dropped = 0;

        if self.rows.back().is_some_and(|last| last.sequence() >= packet.sequence()) {
            dropped = self.rows.len();
            self.rows.clear();
        }

        while self.rows.len() >= self.capacity {
            self.rows.pop_front();
            dropped += 1;
        }

        self.rows.push_back(packet);
        dropped
    }

    /// Looks a packet up by sequence number.
    pub fn get(&self, sequence: u64) -> Option<&CapturedPacket> {
        self.position(sequence).and_then(|index| self.rows.get(index))
    }

    /// Row index of a sequence number, if still buffered.
    pub fn position(&self, sequence: u64) -> Option<usize> {
        self.rows.binary_search_by_key(&sequence, CapturedPacket::sequence).ok()
    }

    /// Row by index, oldest first.
    pub fn row(&self, index: usize) -> Option<&CapturedPacket> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CapturedPacket> + ExactSizeIterator {
        self.rows.iter()
    }

    pub fn last(&self) -> Option<&CapturedPacket> {
        self.rows.back()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

//! Discrete-event scheduler for PPU timing events

use bincode::{Decode, Encode};
use std::array;
use std::cmp::Ordering;
use strum::EnumCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, strum::EnumCount)]
pub enum PpuEvent {
    // BG fetch window of a visible line closes; compose the line and signal HBlank DMA
    LineFetchEnd = 0,
    HDrawEnd,
    HBlankEnd,
    VBlankHDrawEnd,
    VBlankHBlankEnd,
    HBlankIrq,
    Dummy,
}

impl PpuEvent {
    fn as_bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
struct HeapEntry {
    event: PpuEvent,
    cycles: u64,
    // Events due on the same cycle fire in insertion order
    sequence: u64,
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cycles.cmp(&other.cycles).then(self.sequence.cmp(&other.sequence))
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Scheduler {
    heap: [HeapEntry; PpuEvent::COUNT],
    len: usize,
    scheduled_bits: u8,
    next_sequence: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        // Initialize with a dummy event to avoid ever needing to check if the heap is empty
        Self {
            heap: array::from_fn(|_| HeapEntry {
                event: PpuEvent::Dummy,
                cycles: u64::MAX,
                sequence: u64::MAX,
            }),
            len: 1,
            scheduled_bits: PpuEvent::Dummy.as_bit(),
            next_sequence: 0,
        }
    }

    // Insert if event is not present, reschedule if it is present
    pub fn insert_or_update(&mut self, event: PpuEvent, cycles: u64) {
        log::trace!("Inserting event {event:?} at cycles {cycles}");

        let entry = HeapEntry { event, cycles, sequence: self.next_sequence };
        self.next_sequence += 1;

        if self.scheduled_bits & event.as_bit() != 0 {
            if let Some(i) = self.heap[..self.len].iter().position(|entry| entry.event == event) {
                let old_entry = self.heap[i];
                self.heap[i] = entry;
                self.restore_heap(i, old_entry);
                return;
            }
        }
        self.scheduled_bits |= event.as_bit();

        self.heap[self.len] = entry;
        self.len += 1;
        self.heap_up(self.len - 1);
    }

    pub fn is_event_ready(&self, cycles: u64) -> bool {
        self.heap[0].event != PpuEvent::Dummy && cycles >= self.heap[0].cycles
    }

    pub fn next_event_cycles(&self) -> u64 {
        self.heap[0].cycles
    }

    /// Pop the earliest event if it is due at or before `cycles`, along with the cycle it was
    /// scheduled for.
    pub fn pop(&mut self, cycles: u64) -> Option<(PpuEvent, u64)> {
        if !self.is_event_ready(cycles) {
            return None;
        }

        let HeapEntry { event, cycles, .. } = self.heap[0];
        self.heap.swap(0, self.len - 1);
        self.len -= 1;
        self.heap_down(0);
        self.scheduled_bits &= !event.as_bit();

        log::trace!("Popped event {event:?} at cycles {cycles}");

        Some((event, cycles))
    }

    fn restore_heap(&mut self, i: usize, old_entry: HeapEntry) {
        match self.heap[i].cmp(&old_entry) {
            Ordering::Less => self.heap_up(i),
            Ordering::Greater => self.heap_down(i),
            Ordering::Equal => {}
        }
    }

    fn heap_up(&mut self, mut i: usize) {
        while i != 0 {
            let parent = (i - 1) / 2;
            if self.heap[parent] <= self.heap[i] {
                return;
            }

            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn heap_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            if left >= self.len {
                return;
            }
            let right = left + 1;

            let smallest_child =
                if right < self.len && self.heap[right] < self.heap[left] { right } else { left };

            if self.heap[smallest_child] >= self.heap[i] {
                return;
            }

            self.heap.swap(i, smallest_child);
            i = smallest_child;
        }
    }
}

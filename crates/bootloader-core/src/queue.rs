//! Bounded single-producer/single-consumer ring of received packets.
//!
//! The transport ingress is the producer, the supervisor is the consumer.
//! The producer writes the slot contents and the valid flag before advancing
//! `head`; the consumer reads the valid flag before the contents and clears
//! it before advancing `tail`. Under that discipline the ring is safe for one
//! producer and one consumer without locks; a host driving ingress from an
//! interrupt must pin both sides to that ordering.

use crate::packet::Packet;

/// Number of packet slots in the receive ring.
pub const QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    packet: Packet,
    valid: bool,
}

/// Fixed-capacity FIFO of received packets.
#[derive(Debug, Clone)]
pub struct PacketQueue {
    slots: [Slot; QUEUE_CAPACITY],
    head: usize,
    tail: usize,
    count: usize,
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketQueue {
    /// Creates an empty receive ring.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [Slot {
                packet: Packet::new(),
                valid: false,
            }; QUEUE_CAPACITY],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Copies one framed packet into the head slot.
    ///
    /// Returns `false` without touching the ring when every slot is
    /// occupied; the caller counts the drop and the peer retransmits.
    pub fn enqueue(&mut self, bytes: &[u8]) -> bool {
        if self.count == QUEUE_CAPACITY {
            return false;
        }

        let slot = &mut self.slots[self.head];
        slot.packet = Packet::from_bytes(bytes);
        slot.valid = true;
        self.head = (self.head + 1) % QUEUE_CAPACITY;
        self.count += 1;
        true
    }

    /// Removes and returns the oldest buffered packet.
    pub fn dequeue(&mut self) -> Option<Packet> {
        if self.count == 0 {
            return None;
        }

        let slot = &mut self.slots[self.tail];
        if !slot.valid {
            return None;
        }
        let packet = slot.packet;
        slot.valid = false;
        self.tail = (self.tail + 1) % QUEUE_CAPACITY;
        self.count -= 1;
        Some(packet)
    }

    /// Returns the number of buffered packets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` when no packets are buffered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` when every slot is occupied.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.count == QUEUE_CAPACITY
    }

    /// Discards all buffered packets and resets the indices.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.valid = false;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}

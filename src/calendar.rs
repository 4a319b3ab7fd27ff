//! Per-doctor schedule management.
//!
//! A `Doctor` owns its slot list and its routine queue. Slots are inserted
//! at the head; the only ordering relied upon is "lowest free slot id" when
//! allocating a booking.

use crate::models::{DoctorId, Slot, SlotId, TokenId};
use crate::routine_queue::RoutineQueue;
use std::fmt;

/// Ordered collection of a doctor's slots, newest first.
///
/// Slot ids are not checked for uniqueness; with duplicates, every by-id
/// operation acts on the first (most recently added) match.
#[derive(Debug, Clone, Default)]
pub struct SlotList {
    slots: Vec<Slot>,
}

impl SlotList {
    pub fn new() -> Self {
        SlotList { slots: Vec::new() }
    }

    /// Add a slot at the head of the list.
    pub fn insert(&mut self, slot: Slot) {
        self.slots.insert(0, slot);
    }

    /// Remove the first slot with `slot_id`.
    pub fn delete(&mut self, slot_id: SlotId) -> Option<Slot> {
        let idx = self.slots.iter().position(|s| s.slot_id == slot_id)?;
        Some(self.slots.remove(idx))
    }

    pub fn get(&self, slot_id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.slot_id == slot_id)
    }

    /// The free slot with the lowest id, found by a full scan.
    pub fn find_next_free(&self) -> Option<&Slot> {
        self.slots
            .iter()
            .filter(|s| !s.booked)
            .min_by_key(|s| s.slot_id)
    }

    /// Mutable access to the slot `find_next_free` would return.
    ///
    /// Booking goes through this handle so the flag lands on the slot that
    /// was found, even when an older slot shares its id.
    pub fn find_next_free_mut(&mut self) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .filter(|s| !s.booked)
            .min_by_key(|s| s.slot_id)
    }

    /// Set the booked flag on the first slot with `slot_id`.
    /// Returns `false` when no such slot exists.
    pub fn set_booked(&mut self, slot_id: SlotId, booked: bool) -> bool {
        match self.slots.iter_mut().find(|s| s.slot_id == slot_id) {
            Some(slot) => {
                slot.booked = booked;
                true
            }
            None => false,
        }
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.booked).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }
}

/// A doctor with their schedule and routine queue.
#[derive(Debug, Clone)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub specialization: String,
    pub slots: SlotList,
    pub queue: RoutineQueue,
    pub served_count: u32,
}

impl Doctor {
    pub fn new(id: DoctorId, name: String, specialization: String, queue_capacity: usize) -> Self {
        Doctor {
            id,
            name,
            specialization,
            slots: SlotList::new(),
            queue: RoutineQueue::new(queue_capacity),
            served_count: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.count()
    }

    pub fn queued_tokens(&self) -> Vec<TokenId> {
        self.queue.snapshot()
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dr.{} {} ({}, slots={}, pending={})",
            self.id,
            self.name,
            self.specialization,
            self.slots.len(),
            self.queue.count()
        )
    }
}

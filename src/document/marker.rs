//! Sticky markers: offsets that follow the text they point at.
//!
//! Markers live in a per-document arena. The arena is shifted in the same
//! call that mutates the buffer, so a marker offset read after any edit is
//! already correct. Callers only ever hold a [`Marker`] handle.

use crate::error::{EditError, Result};

/// Opaque handle to a sticky offset.
///
/// Handles are generational: once released, the handle stops resolving even
/// if its slot is reused by a later marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    offset: Option<usize>,
}

/// Arena of live marker offsets.
#[derive(Debug, Clone, Default)]
pub struct MarkerArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl MarkerArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, offset: usize) -> Marker {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.offset = Some(offset);
            return Marker {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            offset: Some(offset),
        });
        Marker {
            index,
            generation: 0,
        }
    }

    pub fn offset(&self, marker: Marker) -> Result<usize> {
        self.slots
            .get(marker.index as usize)
            .filter(|slot| slot.generation == marker.generation)
            .and_then(|slot| slot.offset)
            .ok_or(EditError::StaleMarker)
    }

    /// Move a live marker. Used by the caret, which re-anchors on every set.
    pub fn set_offset(&mut self, marker: Marker, offset: usize) -> Result<()> {
        let slot = self
            .slots
            .get_mut(marker.index as usize)
            .filter(|slot| slot.generation == marker.generation && slot.offset.is_some())
            .ok_or(EditError::StaleMarker)?;
        slot.offset = Some(offset);
        Ok(())
    }

    /// Release a marker. Releasing twice is harmless.
    pub fn release(&mut self, marker: Marker) {
        let Some(slot) = self.slots.get_mut(marker.index as usize) else {
            return;
        };
        if slot.generation != marker.generation || slot.offset.is_none() {
            return;
        }
        slot.offset = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(marker.index);
        self.live -= 1;
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Insert of `len` chars at `at`: every marker at or after `at` moves right.
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        if len == 0 {
            return;
        }
        for offset in self.slots.iter_mut().filter_map(|s| s.offset.as_mut()) {
            if *offset >= at {
                *offset += len;
            }
        }
    }

    /// Removal of `start..end`: markers inside clamp to `start`, markers after
    /// move left by the removed length.
    pub fn shift_for_remove(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let removed = end - start;
        for offset in self.slots.iter_mut().filter_map(|s| s.offset.as_mut()) {
            if *offset >= end {
                *offset -= removed;
            } else if *offset > start {
                *offset = start;
            }
        }
    }
}

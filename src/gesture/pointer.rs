use std::time::Instant;

use crate::geometry::Vec2;

/// One finger (or pointer) in a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Stable for the lifetime of the touch.
    pub id: u64,
    pub position: Vec2,
    pub pressed: bool,
}

impl Contact {
    pub fn down(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
            pressed: true,
        }
    }

    pub fn up(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
            pressed: false,
        }
    }
}

/// Snapshot of every contact on a surface at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSample {
    pub time: Instant,
    pub contacts: Vec<Contact>,
}

impl PointerSample {
    pub fn new(time: Instant, contacts: Vec<Contact>) -> Self {
        Self { time, contacts }
    }

    /// A sample with no contacts at all, as delivered when input is lost.
    pub fn empty(time: Instant) -> Self {
        Self {
            time,
            contacts: Vec::new(),
        }
    }

    pub fn pressed_count(&self) -> usize {
        self.contacts.iter().filter(|c| c.pressed).count()
    }

    pub fn pressed(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(|c| c.pressed)
    }
}

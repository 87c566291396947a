//! Boxes of the image currently open in the annotation canvas.

use crate::model::PixelBox;
use crate::palette::ClassMigration;

/// Ordered boxes for one image. Cleared or replaced whenever the image
/// changes; never shared across images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxStore {
    boxes: Vec<PixelBox>,
}

impl BoxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, b: PixelBox) {
        self.boxes.push(b);
    }

    /// Remove the most recent box. No-op on an empty store.
    pub fn undo_last(&mut self) -> Option<PixelBox> {
        self.boxes.pop()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn replace_all(&mut self, boxes: Vec<PixelBox>) {
        self.boxes = boxes;
    }

    pub fn boxes(&self) -> &[PixelBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Renumber classes after a palette removal. Boxes of the removed class
    /// are dropped; returns how many.
    pub fn apply_migration(&mut self, migration: &ClassMigration) -> usize {
        let before = self.boxes.len();
        self.boxes.retain_mut(|b| match migration.remap(b.cls) {
            Some(cls) => {
                b.cls = cls;
                true
            }
            None => false,
        });
        before - self.boxes.len()
    }
}

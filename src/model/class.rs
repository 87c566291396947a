//! Class palette entries.

use serde::{Deserialize, Serialize};

/// A class: display name and CSS hex color. Identified by its position in
/// the palette, never by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub color: String,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

//! Class palette: the ordered list of classes every renderer colors by.
//!
//! A class is referenced everywhere by its index, so the palette is
//! append-only by convention. Renaming and recoloring are always safe.
//! Removing anything but the last entry would shift the indices of every
//! later class; that is refused with [`PaletteError::ReindexRequired`]
//! unless the caller goes through [`ClassPalette::remove_with_migration`]
//! and applies the returned [`ClassMigration`] to its boxes.

use yolocam_view::{Color, ColorParseError};

use crate::api::{ApiError, CaptureBackend, ClassesMeta};
use crate::constants::{FALLBACK_CLASS_COLOR, FALLBACK_CLASS_NAME, SUGGESTED_PALETTE};
use crate::model::{ClassEntry, ClassIndex};

/// Errors raised by palette edits.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("class index {index} out of range (palette has {len} classes)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Removing this entry would renumber later classes.
    #[error("removing class {index} would renumber classes {index}..{len}; use an explicit migration")]
    ReindexRequired { index: usize, len: usize },

    #[error("the palette must keep at least one class")]
    WouldBeEmpty,

    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),
}

/// Suggested color for a class index.
pub fn default_color(index: usize) -> &'static str {
    SUGGESTED_PALETTE[index % SUGGESTED_PALETTE.len()]
}

/// `rgba(r,g,b,a)` for a `#rgb`/`#rrggbb` color.
pub fn rgba_css(color: &str, alpha: f32) -> Result<String, ColorParseError> {
    Ok(Color::from_hex(color)?.to_rgba_css(alpha))
}

/// Index remapping produced by removing a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMigration {
    /// The class that no longer exists.
    pub removed: ClassIndex,
}

impl ClassMigration {
    /// New index for a box of class `cls`, or `None` if its class was
    /// removed.
    pub fn remap(&self, cls: ClassIndex) -> Option<ClassIndex> {
        match cls.cmp(&self.removed) {
            std::cmp::Ordering::Less => Some(cls),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(cls - 1),
        }
    }
}

/// Ordered class list plus the class currently selected for new boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPalette {
    entries: Vec<ClassEntry>,
    selected: usize,
}

impl Default for ClassPalette {
    fn default() -> Self {
        Self::fallback()
    }
}

impl ClassPalette {
    /// Build from loaded entries; an empty list gives the fallback palette.
    pub fn new(entries: Vec<ClassEntry>) -> Self {
        if entries.is_empty() {
            return Self::fallback();
        }
        Self {
            entries,
            selected: 0,
        }
    }

    /// The single-class palette used when nothing could be loaded.
    pub fn fallback() -> Self {
        Self {
            entries: vec![ClassEntry::new(FALLBACK_CLASS_NAME, FALLBACK_CLASS_COLOR)],
            selected: 0,
        }
    }

    /// Build from raw backend entries, filling a missing name with
    /// `class_{i}` and a missing color with the suggested one.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Option<String>)>,
    {
        let entries = raw
            .into_iter()
            .enumerate()
            .map(|(i, (name, color))| {
                ClassEntry::new(
                    name.unwrap_or_else(|| format!("class_{}", i)),
                    color.unwrap_or_else(|| default_color(i).to_string()),
                )
            })
            .collect();
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    pub fn get(&self, cls: ClassIndex) -> Option<&ClassEntry> {
        self.entries.get(cls as usize)
    }

    /// Class name, or the index itself for an unknown class.
    pub fn name(&self, cls: ClassIndex) -> String {
        self.get(cls)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| cls.to_string())
    }

    /// Class color as a CSS string; unknown classes get the suggested one.
    pub fn color_css(&self, cls: ClassIndex) -> &str {
        match self.get(cls) {
            Some(e) => &e.color,
            None => default_color(cls as usize),
        }
    }

    /// Parsed class color. A stored color that does not parse falls back
    /// to the suggested color for the index.
    pub fn color(&self, cls: ClassIndex) -> Color {
        Color::from_hex(self.color_css(cls))
            .or_else(|_| Color::from_hex(default_color(cls as usize)))
            .unwrap_or(Color::RED)
    }

    /// Glow color (`rgba(...)`) for overlay boxes of this class.
    pub fn glow_css(&self, cls: ClassIndex, alpha: f32) -> String {
        self.color(cls).to_rgba_css(alpha)
    }

    /// Body for `POST /annotate/classes_meta`.
    pub fn to_meta(&self) -> ClassesMeta {
        ClassesMeta {
            classes: self.entries.clone(),
        }
    }

    pub fn selected(&self) -> ClassIndex {
        self.selected as ClassIndex
    }

    pub fn select(&mut self, cls: ClassIndex) -> Result<(), PaletteError> {
        let index = self.check_index(cls as usize)?;
        self.selected = index;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<usize, PaletteError> {
        if index < self.entries.len() {
            Ok(index)
        } else {
            Err(PaletteError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    /// Add a class at the end; returns its index. Without a color the
    /// suggested one for the new index is used.
    pub fn append(&mut self, name: &str, color: Option<&str>) -> Result<ClassIndex, PaletteError> {
        let index = self.entries.len();
        let color = match color {
            Some(c) => Color::from_hex(c).map(|_| c.to_string())?,
            None => default_color(index).to_string(),
        };
        self.entries.push(ClassEntry::new(name, color));
        Ok(index as ClassIndex)
    }

    pub fn rename(&mut self, cls: ClassIndex, name: &str) -> Result<(), PaletteError> {
        let index = self.check_index(cls as usize)?;
        self.entries[index].name = name.to_string();
        Ok(())
    }

    pub fn recolor(&mut self, cls: ClassIndex, color: &str) -> Result<(), PaletteError> {
        let index = self.check_index(cls as usize)?;
        Color::from_hex(color)?;
        self.entries[index].color = color.to_string();
        Ok(())
    }

    /// Remove a class without renumbering anything. Only the last entry
    /// qualifies.
    pub fn remove(&mut self, cls: ClassIndex) -> Result<ClassEntry, PaletteError> {
        let index = self.check_index(cls as usize)?;
        if index + 1 != self.entries.len() {
            return Err(PaletteError::ReindexRequired {
                index,
                len: self.entries.len(),
            });
        }
        self.remove_at(index)
    }

    /// Remove any class and return the index migration callers must apply
    /// to every box (in memory and in label files) referencing later
    /// classes.
    pub fn remove_with_migration(&mut self, cls: ClassIndex) -> Result<ClassMigration, PaletteError> {
        let index = self.check_index(cls as usize)?;
        let entry = self.remove_at(index)?;
        log::info!("Removed class {} '{}' with index migration", index, entry.name);
        Ok(ClassMigration { removed: cls })
    }

    fn remove_at(&mut self, index: usize) -> Result<ClassEntry, PaletteError> {
        if self.entries.len() == 1 {
            return Err(PaletteError::WouldBeEmpty);
        }
        let entry = self.entries.remove(index);
        if self.selected == index {
            self.selected = 0;
        } else if self.selected > index {
            self.selected -= 1;
        }
        Ok(entry)
    }
}

/// Load the palette from the backend. A failed or empty load gives the
/// single fallback class so the canvas always has something to draw with.
pub async fn load_palette<B: CaptureBackend>(backend: &B) -> ClassPalette {
    match backend.classes_meta().await {
        Ok(raw) if !raw.classes.is_empty() => {
            let palette = raw.into_palette();
            log::info!("Loaded {} classes", palette.len());
            palette
        }
        Ok(_) => {
            log::warn!("Backend has no class metadata; using fallback class");
            ClassPalette::fallback()
        }
        Err(e) => {
            log::warn!("Failed to load class metadata: {}", e);
            ClassPalette::fallback()
        }
    }
}

/// Persist palette edits.
pub async fn save_palette<B: CaptureBackend>(backend: &B, palette: &ClassPalette) -> Result<(), ApiError> {
    backend.save_classes_meta(&palette.to_meta()).await?;
    log::info!("Saved {} classes", palette.len());
    Ok(())
}

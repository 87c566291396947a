//! Live capture grid: ten cells showing the latest captures, plus the
//! highlight that marks the cell being scanned.

use yolocam_view::{Bounds, Point};

use crate::api::LiveState;
use crate::constants::{GRID_CELLS, GRID_COLUMNS};
use crate::model::CaptureItem;
use crate::palette::ClassPalette;
use crate::render::OverlayLayer;

/// Placeholder text of an empty cell (1-based, two digits).
pub fn slot_label(index: usize) -> String {
    format!("Slot {:02}", index + 1)
}

/// Cell being scanned: the newest capture while running, capped at the last
/// cell.
pub fn active_index(running: bool, item_count: usize, cell_count: usize) -> Option<usize> {
    if !running || item_count == 0 || cell_count == 0 {
        return None;
    }
    Some((item_count - 1).min(cell_count - 1))
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
    Capture {
        item: CaptureItem,
        /// Image source with a cache buster.
        src: String,
        overlay: OverlayLayer,
    },
    Slot {
        label: String,
    },
}

impl GridCell {
    pub fn slot(index: usize) -> Self {
        GridCell::Slot {
            label: slot_label(index),
        }
    }

    pub fn is_slot(&self) -> bool {
        matches!(self, GridCell::Slot { .. })
    }
}

/// Live cell geometry. Implementations must measure on every call since
/// layout can reflow between ticks.
pub trait GridGeometry {
    /// The grid container.
    fn grid_rect(&self) -> Bounds;

    /// A cell, in the same coordinate space as [`GridGeometry::grid_rect`].
    fn cell_rect(&self, index: usize) -> Option<Bounds>;
}

/// Fixed rows-of-columns geometry for headless use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGridGeometry {
    pub origin: Point,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
    pub columns: usize,
    pub cells: usize,
}

impl UniformGridGeometry {
    pub fn new(cell_width: f64, cell_height: f64, gap: f64) -> Self {
        Self {
            origin: Point::zero(),
            cell_width,
            cell_height,
            gap,
            columns: GRID_COLUMNS,
            cells: GRID_CELLS,
        }
    }

    fn rows(&self) -> usize {
        self.cells.div_ceil(self.columns.max(1))
    }
}

impl GridGeometry for UniformGridGeometry {
    fn grid_rect(&self) -> Bounds {
        let cols = self.columns.max(1) as f64;
        let rows = self.rows() as f64;
        Bounds::new(
            self.origin.x,
            self.origin.y,
            cols * self.cell_width + (cols - 1.0).max(0.0) * self.gap,
            rows * self.cell_height + (rows - 1.0).max(0.0) * self.gap,
        )
    }

    fn cell_rect(&self, index: usize) -> Option<Bounds> {
        if index >= self.cells {
            return None;
        }
        let columns = self.columns.max(1);
        let (row, col) = (index / columns, index % columns);
        Some(Bounds::new(
            self.origin.x + col as f64 * (self.cell_width + self.gap),
            self.origin.y + row as f64 * (self.cell_height + self.gap),
            self.cell_width,
            self.cell_height,
        ))
    }
}

/// Everything an observer needs to draw the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSnapshot {
    pub cells: Vec<GridCell>,
    pub active: Option<usize>,
    /// Highlight rectangle relative to the grid; `None` when hidden.
    pub highlight: Option<Bounds>,
}

#[derive(Debug, Clone)]
pub struct CaptureGrid {
    cells: Vec<GridCell>,
    active: Option<usize>,
    highlight: Option<Bounds>,
}

impl Default for CaptureGrid {
    fn default() -> Self {
        Self::new(GRID_CELLS)
    }
}

impl CaptureGrid {
    pub fn new(cell_count: usize) -> Self {
        Self {
            cells: (0..cell_count).map(GridCell::slot).collect(),
            active: None,
            highlight: None,
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn highlight(&self) -> Option<Bounds> {
        self.highlight
    }

    /// Repopulate from a `/state` reply and move the highlight. `stamp` is
    /// the cache-buster appended to every image source.
    pub fn apply<G: GridGeometry + ?Sized>(&mut self, state: &LiveState, stamp: u128, geometry: &G) {
        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = match state.items.get(i) {
                Some(item) => GridCell::Capture {
                    src: item.cache_busted_url(stamp),
                    item: item.clone(),
                    overlay: OverlayLayer::new(),
                },
                None => GridCell::slot(i),
            };
        }

        // a stopped capture has no scanning cell, whatever `running` says
        let active = if state.stopped {
            None
        } else {
            active_index(state.running, state.items.len(), self.cells.len())
        };
        if active != self.active {
            log::debug!("active cell {:?} -> {:?}", self.active, active);
        }
        self.active = active;
        self.highlight = active.and_then(|i| highlight_rect(geometry, i));
    }

    /// Lay out the box overlay of a capture cell once its image decoded.
    pub fn cell_image_loaded(
        &mut self,
        index: usize,
        container: (f64, f64),
        natural: (f64, f64),
        palette: &ClassPalette,
    ) -> bool {
        match self.cells.get_mut(index) {
            Some(GridCell::Capture { item, overlay, .. }) => {
                overlay.render_normalized(container, natural, &item.boxes, palette)
            }
            _ => false,
        }
    }

    pub fn hide_highlight(&mut self) {
        self.active = None;
        self.highlight = None;
    }

    /// Back to ten empty slots with no highlight.
    pub fn clear(&mut self) {
        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = GridCell::slot(i);
        }
        self.hide_highlight();
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            cells: self.cells.clone(),
            active: self.active,
            highlight: self.highlight,
        }
    }
}

/// Rectangle of cell `index` relative to the grid container.
pub fn highlight_rect<G: GridGeometry + ?Sized>(geometry: &G, index: usize) -> Option<Bounds> {
    let grid = geometry.grid_rect();
    geometry
        .cell_rect(index)
        .map(|cell| cell.relative_to(grid.position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NormalizedBox;

    fn state(running: bool, n: usize) -> LiveState {
        LiveState {
            running,
            stopped: false,
            items: (0..n)
                .map(|i| CaptureItem::new(format!("/static/captures/img_{:02}.jpg", i + 1), vec![NormalizedBox::new(0, 0.5, 0.5, 0.5, 0.5)]))
                .collect(),
        }
    }

    fn geometry() -> UniformGridGeometry {
        let mut g = UniformGridGeometry::new(100.0, 80.0, 10.0);
        g.origin = Point::new(50.0, 20.0);
        g
    }

    #[test]
    fn test_active_index() {
        assert_eq!(active_index(true, 4, 10), Some(3));
        assert_eq!(active_index(true, 25, 10), Some(9));
        assert_eq!(active_index(true, 0, 10), None);
        assert_eq!(active_index(false, 4, 10), None);
    }

    #[test]
    fn test_four_items_running() {
        let mut grid = CaptureGrid::default();
        grid.apply(&state(true, 4), 42, &geometry());
        assert_eq!(grid.active(), Some(3));
        for cell in &grid.cells()[..4] {
            assert!(!cell.is_slot());
        }
        for (i, cell) in grid.cells().iter().enumerate().skip(4) {
            assert_eq!(cell, &GridCell::Slot { label: slot_label(i) });
        }
        assert!(matches!(
            &grid.cells()[0],
            GridCell::Capture { src, .. } if src == "/static/captures/img_01.jpg?t=42"
        ));
        // cell 3 is in the first row, fourth column
        assert_eq!(grid.highlight(), Some(Bounds::new(330.0, 0.0, 100.0, 80.0)));
    }

    #[test]
    fn test_highlight_second_row() {
        let mut grid = CaptureGrid::default();
        grid.apply(&state(true, 7), 0, &geometry());
        assert_eq!(grid.highlight(), Some(Bounds::new(110.0, 90.0, 100.0, 80.0)));
    }

    #[test]
    fn test_not_running_hides_highlight() {
        let mut grid = CaptureGrid::default();
        grid.apply(&state(true, 2), 0, &geometry());
        grid.apply(&state(false, 2), 0, &geometry());
        assert_eq!(grid.active(), None);
        assert_eq!(grid.highlight(), None);
    }

    #[test]
    fn test_stopped_hides_highlight_while_running() {
        let mut grid = CaptureGrid::default();
        grid.apply(&state(true, 2), 0, &geometry());
        assert!(grid.highlight().is_some());
        let mut stopped = state(true, 2);
        stopped.stopped = true;
        grid.apply(&stopped, 0, &geometry());
        assert_eq!(grid.active(), None);
        assert_eq!(grid.highlight(), None);
        assert!(!grid.cells()[1].is_slot());
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(slot_label(0), "Slot 01");
        assert_eq!(slot_label(9), "Slot 10");
    }

    #[test]
    fn test_clear() {
        let mut grid = CaptureGrid::default();
        grid.apply(&state(true, 10), 0, &geometry());
        grid.clear();
        assert!(grid.cells().iter().all(GridCell::is_slot));
        assert_eq!(grid.snapshot().highlight, None);
    }

    #[test]
    fn test_cell_overlay() {
        let mut grid = CaptureGrid::default();
        grid.apply(&state(true, 1), 0, &geometry());
        let palette = ClassPalette::fallback();
        assert!(grid.cell_image_loaded(0, (100.0, 80.0), (200.0, 160.0), &palette));
        assert!(!grid.cell_image_loaded(5, (100.0, 80.0), (200.0, 160.0), &palette));
        let GridCell::Capture { overlay, .. } = &grid.cells()[0] else {
            panic!("expected capture cell");
        };
        assert_eq!(overlay.layout().unwrap().boxes[0].rect, Bounds::new(25.0, 20.0, 50.0, 40.0));
    }

    #[test]
    fn test_uniform_geometry() {
        let g = UniformGridGeometry::new(100.0, 80.0, 10.0);
        assert_eq!(g.grid_rect(), Bounds::new(0.0, 0.0, 540.0, 170.0));
        assert_eq!(g.cell_rect(10), None);
    }
}

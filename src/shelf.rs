use crate::physics::SHELF_THICKNESS_PX;
use crate::viewport::{Breakpoint, ViewportSize};

// Shelf rows as fractions of viewport height
const DESKTOP_SHELF_ROWS: [(f32, &str); 3] = [(0.3, "Top Shelf"), (0.55, "Middle Shelf"), (0.8, "Bottom Shelf")];
const MOBILE_SHELF_ROWS: [(f32, &str); 2] = [(0.4, "Upper Shelf"), (0.75, "Lower Shelf")];
const DESKTOP_SHELF_WIDTH: f32 = 0.7;
const MOBILE_SHELF_WIDTH: f32 = 0.9;

// Grid mode
const DESKTOP_GRID_COLUMNS: usize = 4;
const MOBILE_GRID_COLUMNS: usize = 2;
const GRID_TOP_MARGIN_PX: f32 = 96.0;

/// Gap left between a resting cookie and the shelf surface when placed.
pub const SETTLE_GAP_PX: f32 = 2.0;

/// A static horizontal boundary segment, in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub center: [f32; 2],
    pub width: f32,
    pub label: String,
}

impl Shelf {
    pub fn new(center: [f32; 2], width: f32, label: impl Into<String>) -> Self {
        Self { center, width, label: label.into() }
    }

    pub fn left(&self) -> f32 {
        self.center[0] - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center[0] + self.width / 2.0
    }

    /// y of the resting surface.
    pub fn top(&self) -> f32 {
        self.center[1] - SHELF_THICKNESS_PX / 2.0
    }

    pub fn spans(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }
}

/// Shelves for the given viewport. Count and arrangement depend on the breakpoint.
pub fn layout_shelves(viewport: ViewportSize, breakpoint: Breakpoint) -> Vec<Shelf> {
    if viewport.is_degenerate() {
        return Vec::new();
    }
    let (rows, width_fraction): (&[(f32, &str)], f32) = match breakpoint {
        Breakpoint::Desktop => (&DESKTOP_SHELF_ROWS, DESKTOP_SHELF_WIDTH),
        Breakpoint::Mobile => (&MOBILE_SHELF_ROWS, MOBILE_SHELF_WIDTH),
    };
    rows.iter()
        .map(|(row, label)| {
            Shelf::new(
                [viewport.width / 2.0, viewport.height * row],
                viewport.width * width_fraction,
                *label,
            )
        })
        .collect()
}

/// Resting spot for the `index`-th of `count` cookies, assigned round-robin over `shelves`.
///
/// Cookies sharing a shelf are spread evenly across its span. Returns `None` when
/// there are no shelves.
pub fn organized_position(shelves: &[Shelf], index: usize, count: usize, radius_px: f32) -> Option<[f32; 2]> {
    if shelves.is_empty() {
        return None;
    }
    let shelf = &shelves[index % shelves.len()];
    let slot = index / shelves.len();
    let per_shelf = count.div_ceil(shelves.len()).max(1);
    let spacing = shelf.width / per_shelf as f32;
    let x = shelf.left() + (slot as f32 + 0.5) * spacing;
    let y = shelf.top() - radius_px - SETTLE_GAP_PX;
    Some([x, y])
}

/// Cell centers for the static grid presentation.
pub fn grid_layout(viewport: ViewportSize, breakpoint: Breakpoint, count: usize) -> Vec<[f32; 2]> {
    if viewport.is_degenerate() {
        return Vec::new();
    }
    let columns = match breakpoint {
        Breakpoint::Desktop => DESKTOP_GRID_COLUMNS,
        Breakpoint::Mobile => MOBILE_GRID_COLUMNS,
    };
    let cell = viewport.width / columns as f32;
    (0..count)
        .map(|i| {
            let col = i % columns;
            let row = i / columns;
            [
                (col as f32 + 0.5) * cell,
                GRID_TOP_MARGIN_PX + (row as f32 + 0.5) * cell,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_and_mobile_shelf_counts() {
        let desktop = layout_shelves(ViewportSize::new(1200.0, 800.0), Breakpoint::Desktop);
        let mobile = layout_shelves(ViewportSize::new(400.0, 800.0), Breakpoint::Mobile);
        assert_eq!(desktop.len(), 3);
        assert_eq!(mobile.len(), 2);
        for shelf in &desktop {
            assert!(shelf.left() > 0.0 && shelf.right() < 1200.0);
        }
    }

    #[test]
    fn test_degenerate_viewport_has_no_shelves() {
        assert!(layout_shelves(ViewportSize::new(0.0, 0.0), Breakpoint::Desktop).is_empty());
    }

    #[test]
    fn test_organized_positions_stay_on_assigned_shelf() {
        let shelves = layout_shelves(ViewportSize::new(1200.0, 800.0), Breakpoint::Desktop);
        for i in 0..7 {
            let [x, y] = organized_position(&shelves, i, 7, 40.0).unwrap();
            let shelf = &shelves[i % 3];
            assert!(shelf.spans(x), "x {x} outside {}", shelf.label);
            assert!(y < shelf.top());
        }
    }

    #[test]
    fn test_organized_position_without_shelves() {
        assert_eq!(organized_position(&[], 0, 4, 40.0), None);
    }

    #[test]
    fn test_grid_layout_wraps_columns() {
        let cells = grid_layout(ViewportSize::new(1200.0, 800.0), Breakpoint::Desktop, 5);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0][1], cells[3][1]);
        assert!(cells[4][1] > cells[0][1]);
        assert_eq!(cells[4][0], cells[0][0]);
    }
}

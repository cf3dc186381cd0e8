//! Presentation of the dense grid.
//!
//! Everything here is a pure function of the grid, the hovered coordinate and
//! the active color. Nothing in this module mutates the cache.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::cell::{Cell, CellKey};
use crate::grid::DenseGrid;

pub const NEUTRAL_BACKGROUND: &str = "#ffffff";
pub const HIGHLIGHT_ALPHA: f32 = 0.3;

const PAGE_TEMPLATE: &str = include_str!("static/index.html");

/// The user-selected color for active cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveColor {
    r: u8,
    g: u8,
    b: u8,
}

impl ActiveColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        ActiveColor { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn tint(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

impl Default for ActiveColor {
    fn default() -> Self {
        ActiveColor::rgb(0x4c, 0xaf, 0x50)
    }
}

impl FromStr for ActiveColor {
    type Err = String;

    /// Parses `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, got {s:?}"))?;
        let channel = |at: usize| {
            u8::from_str_radix(&digits[at..at + 2], 16).map_err(|e| format!("{s:?}: {e}"))
        };
        Ok(ActiveColor::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Pointer position over the grid. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    hovered: Option<CellKey>,
}

impl HoverState {
    pub fn enter(&mut self, row: i32, column: i32) {
        self.hovered = Some(CellKey::new(row, column));
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<CellKey> {
        self.hovered
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    None,
    /// Shares the hovered row or column.
    Shared,
    /// Is the hovered cell.
    Main,
}

/// How one cell should be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellVisual {
    pub key: CellKey,
    pub active: bool,
    pub highlight: Highlight,
    pub background: String,
}

impl CellVisual {
    pub fn class_name(&self) -> String {
        let mut class = String::from("cell");
        if self.active {
            class.push_str(" active");
        }
        match self.highlight {
            Highlight::None => {}
            Highlight::Shared => class.push_str(" highlight"),
            Highlight::Main => class.push_str(" highlight main-highlight"),
        }
        class
    }
}

pub fn cell_visual(cell: &Cell, hovered: Option<CellKey>, color: &ActiveColor) -> CellVisual {
    let highlight = match hovered {
        Some(h) if h == cell.key() => Highlight::Main,
        Some(h) if h.row == cell.row || h.column == cell.column => Highlight::Shared,
        _ => Highlight::None,
    };
    let background = match (cell.is_active, highlight) {
        (true, _) | (false, Highlight::Main) => color.hex(),
        (false, Highlight::Shared) => color.tint(HIGHLIGHT_ALPHA),
        (false, Highlight::None) => NEUTRAL_BACKGROUND.to_string(),
    };
    CellVisual {
        key: cell.key(),
        active: cell.is_active,
        highlight,
        background,
    }
}

pub fn render_grid(grid: &DenseGrid, hovered: Option<CellKey>, color: &ActiveColor) -> Vec<CellVisual> {
    grid.cells()
        .iter()
        .map(|cell| cell_visual(cell, hovered, color))
        .collect()
}

/// Input received on a focused or clicked cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellInput {
    Click,
    Key(String),
}

impl CellInput {
    /// Click, Enter and Space all toggle the cell.
    pub fn toggles(&self) -> bool {
        match self {
            CellInput::Click => true,
            CellInput::Key(key) => key == "Enter" || key == " ",
        }
    }
}

/// Plain-text rendering for terminals.
///
/// `#` active, `@` hovered, `+` shares the hovered row or column, `.` idle.
pub fn render_text(grid: &DenseGrid, hovered: Option<CellKey>) -> String {
    let color = ActiveColor::default();
    let mut out = String::from("   ");
    for column in 0..grid.size() {
        let _ = write!(out, "{:>2}", column);
    }
    out.push('\n');
    for (row, cells) in grid.rows().enumerate() {
        let _ = write!(out, "{:>2} ", row);
        for cell in cells {
            let visual = cell_visual(cell, hovered, &color);
            let glyph = match (visual.active, visual.highlight) {
                (true, _) => '#',
                (false, Highlight::Main) => '@',
                (false, Highlight::Shared) => '+',
                (false, Highlight::None) => '.',
            };
            out.push(' ');
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Server-side rendering of the grid page served at `/`.
pub fn render_page(grid: &DenseGrid, color: &ActiveColor) -> String {
    let mut cells = String::new();
    for visual in render_grid(grid, None, color) {
        let order = grid
            .get(visual.key.row, visual.key.column)
            .map_or(0, |c| c.activation_order);
        let _ = writeln!(
            cells,
            r#"<div class="{}" style="background-color: {}" data-row="{}" data-column="{}" data-order="{}" role="button" tabindex="0"></div>"#,
            visual.class_name(),
            visual.background,
            visual.key.row,
            visual.key.column,
            order,
        );
    }
    PAGE_TEMPLATE
        .replace("{{grid_size}}", &grid.size().to_string())
        .replace("{{color}}", &color.hex())
        .replace("{{cells}}", &cells)
}

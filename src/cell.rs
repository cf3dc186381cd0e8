use serde::{Deserialize, Serialize};

/// Zero-based grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub row: i32,
    pub column: i32,
}

impl CellKey {
    pub fn new(row: i32, column: i32) -> Self {
        CellKey { row, column }
    }

    /// True when both coordinates fall inside a `grid_size` x `grid_size` grid.
    pub fn in_bounds(&self, grid_size: usize) -> bool {
        self.row >= 0
            && self.column >= 0
            && (self.row as usize) < grid_size
            && (self.column as usize) < grid_size
    }
}

/// State of one grid cell as exchanged with the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row: i32,
    pub column: i32,
    pub is_active: bool,
    #[serde(default)]
    pub activation_order: i32,
}

impl Cell {
    pub fn inactive(row: i32, column: i32) -> Self {
        Cell {
            row,
            column,
            is_active: false,
            activation_order: 0,
        }
    }

    pub fn active(row: i32, column: i32, activation_order: i32) -> Self {
        Cell {
            row,
            column,
            is_active: true,
            activation_order,
        }
    }

    pub fn key(&self) -> CellKey {
        CellKey::new(self.row, self.column)
    }
}

/// Body of `POST /api/update`, echoed back on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdate {
    pub row: i32,
    pub column: i32,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_order: Option<i32>,
}

impl CellUpdate {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.row, self.column)
    }

    /// The cell the store should hold after applying this update.
    ///
    /// Inactive cells never keep an activation order, and a missing order
    /// defaults to 0.
    pub fn to_cell(&self) -> Cell {
        if self.is_active {
            Cell::active(self.row, self.column, self.activation_order.unwrap_or(0))
        } else {
            Cell::inactive(self.row, self.column)
        }
    }
}

impl From<&Cell> for CellUpdate {
    fn from(cell: &Cell) -> Self {
        CellUpdate {
            row: cell.row,
            column: cell.column,
            is_active: cell.is_active,
            activation_order: Some(cell.activation_order),
        }
    }
}

/// A stored row of the cell table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub id: u32,
    pub row: i32,
    pub column: i32,
    pub is_active: bool,
    pub activation_order: i32,
}

impl CellRecord {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.row, self.column)
    }

    pub fn cell(&self) -> Cell {
        Cell {
            row: self.row,
            column: self.column,
            is_active: self.is_active,
            activation_order: self.activation_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_order_defaults_to_zero() {
        let update: CellUpdate =
            serde_json::from_str(r#"{"row":1,"column":2,"isActive":true}"#).unwrap();
        assert_eq!(update.activation_order, None);
        assert_eq!(update.to_cell(), Cell::active(1, 2, 0));
    }

    #[test]
    fn deactivation_clears_order() {
        let update = CellUpdate {
            row: 0,
            column: 0,
            is_active: false,
            activation_order: Some(9),
        };
        assert_eq!(update.to_cell(), Cell::inactive(0, 0));
    }

    #[test]
    fn cell_uses_camel_case_fields() {
        let json = serde_json::to_value(Cell::active(3, 4, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"row": 3, "column": 4, "isActive": true, "activationOrder": 1})
        );
    }

    #[test]
    fn cell_accepts_records_with_ids() {
        let cell: Cell = serde_json::from_str(
            r#"{"id":7,"row":3,"column":4,"isActive":true,"activationOrder":1}"#,
        )
        .unwrap();
        assert_eq!(cell, Cell::active(3, 4, 1));
    }

    #[test]
    fn bounds_check() {
        assert!(CellKey::new(0, 9).in_bounds(10));
        assert!(!CellKey::new(10, 0).in_bounds(10));
        assert!(!CellKey::new(-1, 0).in_bounds(10));
    }
}

use crate::cell::{Cell, CellKey};

/// Dense `size` x `size` view over a sparse set of persisted cells.
///
/// Coordinates without a record are inactive with order 0. Records outside
/// the grid are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl DenseGrid {
    pub fn from_sparse<'a>(sparse: impl IntoIterator<Item = &'a Cell>, size: usize) -> Self {
        let mut cells: Vec<Cell> = (0..size * size)
            .map(|i| Cell::inactive((i / size) as i32, (i % size) as i32))
            .collect();
        for cell in sparse {
            if let Some(index) = cell_index(size, cell.key()) {
                cells[index] = cell.clone();
            }
        }
        DenseGrid { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: i32, column: i32) -> Option<&Cell> {
        cell_index(self.size, CellKey::new(row, column)).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major slices of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_active).count()
    }
}

pub fn cell_index(size: usize, key: CellKey) -> Option<usize> {
    key.in_bounds(size)
        .then(|| key.row as usize * size + key.column as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_store_gives_all_inactive_cells() {
        let grid = DenseGrid::from_sparse(&[], 10);
        assert_eq!(grid.len(), 100);
        assert_eq!(grid.active_count(), 0);
        assert!(grid.cells().iter().all(|c| c.activation_order == 0));
    }

    #[test]
    fn every_coordinate_appears_once() {
        for size in [1usize, 3, 10] {
            let grid = DenseGrid::from_sparse(&[Cell::active(0, 0, 1)], size);
            let keys: HashSet<CellKey> = grid.cells().iter().map(Cell::key).collect();
            assert_eq!(grid.len(), size * size);
            assert_eq!(keys.len(), size * size);
            for row in 0..size as i32 {
                for column in 0..size as i32 {
                    assert!(keys.contains(&CellKey::new(row, column)));
                }
            }
        }
    }

    #[test]
    fn persisted_cells_override_defaults() {
        let sparse = vec![Cell::active(3, 4, 1), Cell::active(42, 0, 2)];
        let grid = DenseGrid::from_sparse(&sparse, 10);

        assert_eq!(grid.get(3, 4), Some(&Cell::active(3, 4, 1)));
        assert_eq!(grid.active_count(), 1);
        assert_eq!(grid.get(42, 0), None);
    }

    #[test]
    fn rows_are_row_major() {
        let grid = DenseGrid::from_sparse(&[Cell::active(1, 2, 1)], 3);
        let rows: Vec<&[Cell]> = grid.rows().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1][2].is_active);
        assert_eq!(rows[2][0].key(), CellKey::new(2, 0));
    }

    #[test]
    fn zero_sized_grid_is_empty() {
        let grid = DenseGrid::from_sparse(&[Cell::active(0, 0, 1)], 0);
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
    }
}

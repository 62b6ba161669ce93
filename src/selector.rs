/// Direction for moving the selector cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// Cursor over a grid of cells, of which only some can be selected
///
/// Rows are report card rows and columns are tasks; a cell is selectable
/// when the task has output. Payloads are looked up by the caller using
/// the selected `(row, column)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    cells: Vec<Vec<bool>>,
    row: usize,
    column: usize,
}

impl Selector {
    /// Create a selector over a grid, with the cursor at the origin
    pub fn from_grid(cells: Vec<Vec<bool>>) -> Self {
        Self {
            cells,
            row: 0,
            column: 0,
        }
    }

    /// Place the cursor on `(row, column)`
    pub fn with_selection(mut self, row: usize, column: usize) -> Self {
        self.row = row;
        self.column = column;
        self
    }

    fn is_selectable(&self, row: usize, column: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// Currently selected `(row, column)`
    pub fn selected(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    fn first_in_row(&self, row: usize) -> Option<usize> {
        self.cells.get(row)?.iter().position(|&cell| cell)
    }

    /// Move the cursor `step` cells in `direction` to the nearest selectable cell
    ///
    /// Vertical moves keep the column when the target row has it selectable,
    /// otherwise they take the first selectable cell of that row. Returns
    /// whether the cursor moved; it never wraps around.
    pub fn move_cursor(&mut self, direction: Direction, step: usize) -> bool {
        let target = match direction {
            Direction::Up => match self.row.checked_sub(step) {
                Some(from) => (0..=from).rev().find_map(|row| self.target_in_row(row)),
                None => None,
            },
            Direction::Down => {
                (self.row + step..self.cells.len()).find_map(|row| self.target_in_row(row))
            }
            Direction::Left => match self.column.checked_sub(step) {
                Some(from) => (0..=from)
                    .rev()
                    .find(|&column| self.is_selectable(self.row, column))
                    .map(|column| (self.row, column)),
                None => None,
            },
            Direction::Right => {
                let width = self.cells.get(self.row).map_or(0, Vec::len);
                (self.column + step..width)
                    .find(|&column| self.is_selectable(self.row, column))
                    .map(|column| (self.row, column))
            }
        };

        match target {
            Some((row, column)) => {
                self.row = row;
                self.column = column;
                true
            }
            None => false,
        }
    }

    fn target_in_row(&self, row: usize) -> Option<(usize, usize)> {
        if self.is_selectable(row, self.column) {
            return Some((row, self.column));
        }
        self.first_in_row(row).map(|column| (row, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Rows separated by `|`, `x` marks a selectable cell
    fn grid(layout: &str) -> Vec<Vec<bool>> {
        layout
            .split('|')
            .map(|row| row.chars().map(|c| c == 'x').collect())
            .collect()
    }

    #[rstest]
    #[case::move_one_left("_x_", (0, 2), Direction::Left, (0, 1), true)]
    #[case::jump_columns_left("x_x", (0, 2), Direction::Left, (0, 0), true)]
    #[case::no_move_left("__x", (0, 2), Direction::Left, (0, 2), false)]
    #[case::no_move_left_border("x", (0, 0), Direction::Left, (0, 0), false)]
    #[case::move_one_right("xx_", (0, 0), Direction::Right, (0, 1), true)]
    #[case::jump_columns_right("x_x", (0, 0), Direction::Right, (0, 2), true)]
    #[case::no_move_right("x__", (0, 0), Direction::Right, (0, 0), false)]
    #[case::no_move_right_border("__x", (0, 2), Direction::Right, (0, 2), false)]
    #[case::down_same_column("_x_|_x_", (0, 1), Direction::Down, (1, 1), true)]
    #[case::down_different_column("_x_|__x", (0, 1), Direction::Down, (1, 2), true)]
    #[case::down_nearest_row_first("_x_|x__|__x", (0, 1), Direction::Down, (1, 0), true)]
    #[case::jump_rows_down("_x_|___|__x", (0, 1), Direction::Down, (2, 2), true)]
    #[case::no_move_down("___|_x_|___", (1, 1), Direction::Down, (1, 1), false)]
    #[case::no_move_down_border("_x_", (0, 1), Direction::Down, (0, 1), false)]
    #[case::up_same_column("_x_|_x_", (1, 1), Direction::Up, (0, 1), true)]
    #[case::up_different_column("_x_|__x", (1, 2), Direction::Up, (0, 1), true)]
    #[case::jump_rows_up("_x_|___|__x", (2, 2), Direction::Up, (0, 1), true)]
    #[case::no_move_up("___|_x_|___", (1, 1), Direction::Up, (1, 1), false)]
    #[case::no_move_up_border("_x_", (0, 1), Direction::Up, (0, 1), false)]
    fn selector_move_cursor(
        #[case] layout: &str,
        #[case] from: (usize, usize),
        #[case] direction: Direction,
        #[case] expected: (usize, usize),
        #[case] moved: bool,
    ) {
        let mut selector = Selector::from_grid(grid(layout)).with_selection(from.0, from.1);

        assert_eq!(selector.move_cursor(direction, 1), moved);
        assert_eq!(selector.selected(), expected);
    }

    #[test]
    fn selector_move_cursor_with_larger_step_skips_cells() {
        let mut selector = Selector::from_grid(grid("xxx")).with_selection(0, 0);

        assert!(selector.move_cursor(Direction::Right, 2));
        assert_eq!(selector.selected(), (0, 2));
        assert!(!selector.move_cursor(Direction::Left, 3));
    }

    #[test]
    fn selector_skips_ragged_rows_without_the_column() {
        let mut selector = Selector::from_grid(vec![vec![false, false, true], vec![true]])
            .with_selection(0, 2);

        assert!(selector.move_cursor(Direction::Down, 1));
        assert_eq!(selector.selected(), (1, 0));
        assert!(!selector.move_cursor(Direction::Right, 1));
    }
}

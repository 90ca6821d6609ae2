use rand::Rng;
use tracing::debug;

use super::state::Position;

/// The single food item on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    position: Position,
    /// Random draws tried before scanning for a free cell
    max_attempts: u32,
}

impl Food {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            position: Position::new(0, 0),
            max_attempts,
        }
    }

    /// Create food at a specific position
    pub fn at(position: Position, max_attempts: u32) -> Self {
        Self {
            position,
            max_attempts,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Move to a random cell not covered by `snake_body`.
    ///
    /// Samples uniformly until a free cell turns up. After `max_attempts`
    /// misses the free cells are listed and one is picked uniformly, so a
    /// nearly full board still resolves. Returns `None` and leaves the food
    /// where it was when the snake covers every cell.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        grid_width: i32,
        grid_height: i32,
        snake_body: &[Position],
    ) -> Option<Position> {
        if grid_width <= 0 || grid_height <= 0 {
            return None;
        }

        let cells = grid_width as usize * grid_height as usize;
        let occupied = snake_body
            .iter()
            .filter(|segment| segment.is_within(grid_width, grid_height))
            .count();
        if occupied >= cells && Self::free_cells(grid_width, grid_height, snake_body).is_empty() {
            debug!(cells, "no free cell left for food");
            return None;
        }

        for _ in 0..self.max_attempts {
            let candidate = Position::new(
                rng.gen_range(0..grid_width),
                rng.gen_range(0..grid_height),
            );
            if !Self::collides_with_snake(candidate, snake_body) {
                self.position = candidate;
                return Some(candidate);
            }
        }

        let free = Self::free_cells(grid_width, grid_height, snake_body);
        if free.is_empty() {
            return None;
        }
        let candidate = free[rng.gen_range(0..free.len())];
        debug!(
            attempts = self.max_attempts,
            free = free.len(),
            "food placed by free-cell scan"
        );
        self.position = candidate;
        Some(candidate)
    }

    /// Exact coordinate match against any segment
    pub fn collides_with_snake(position: Position, snake_body: &[Position]) -> bool {
        snake_body.contains(&position)
    }

    /// Whether a head at `head` overlaps this food.
    ///
    /// Compares the two cells as pixel rectangles rather than by equality so
    /// the test still holds if positions are ever drawn off the grid lines.
    pub fn is_eaten_by(&self, head: Position, cell_size: u32) -> bool {
        let size = cell_size as i64;
        let (head_x, head_y) = (head.x as i64 * size, head.y as i64 * size);
        let (food_x, food_y) = (self.position.x as i64 * size, self.position.y as i64 * size);

        head_x < food_x + size
            && head_x + size > food_x
            && head_y < food_y + size
            && head_y + size > food_y
    }

    fn free_cells(grid_width: i32, grid_height: i32, snake_body: &[Position]) -> Vec<Position> {
        (0..grid_height)
            .flat_map(|y| (0..grid_width).map(move |x| Position::new(x, y)))
            .filter(|cell| !Self::collides_with_snake(*cell, snake_body))
            .collect()
    }
}

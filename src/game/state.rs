use super::action::Direction;

/// A position on the game grid, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// True when inside [0, width) x [0, height)
    pub fn is_within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }

    pub fn manhattan_distance(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    body: Vec<Position>,
    /// Heading committed by the last move
    direction: Direction,
    /// Heading requested by input, committed on the next move
    next_direction: Direction,
    /// Keep the tail on the next move
    pending_growth: bool,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self {
            body,
            direction,
            next_direction: direction,
            pending_growth: false,
        }
    }

    /// Build a snake from explicit segments, head first
    ///
    /// Returns `None` for an empty body.
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Self {
            body,
            direction,
            next_direction: direction,
            pending_growth: false,
        })
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next_direction(&self) -> Direction {
        self.next_direction
    }

    pub fn is_growing(&self) -> bool {
        self.pending_growth
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Check if position is covered by any segment, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Queue a heading for the next move.
    ///
    /// A request for the exact opposite of the committed heading is dropped,
    /// otherwise the head would turn straight into the neck.
    pub fn set_direction(&mut self, requested: Direction) {
        if !self.direction.is_opposite(requested) {
            self.next_direction = requested;
        }
    }

    /// Advance one cell, committing the queued heading first
    pub fn move_snake(&mut self) {
        self.direction = self.next_direction;
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.insert(0, new_head);

        if !self.pending_growth {
            self.body.pop();
        }
        self.pending_growth = false;
    }

    /// Lengthen by one on the next move
    pub fn grow(&mut self) {
        self.pending_growth = true;
    }

    /// Classify what the head has hit, if anything
    pub fn collision(&self, grid_width: i32, grid_height: i32) -> Option<CollisionType> {
        let head = self.head();

        if !head.is_within(grid_width, grid_height) {
            return Some(CollisionType::Wall);
        }

        if self.collides_with_body(head) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// True if the head is off the grid or on top of another segment
    pub fn check_collision(&self, grid_width: i32, grid_height: i32) -> bool {
        self.collision(grid_width, grid_height).is_some()
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (never true: construction rejects it)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

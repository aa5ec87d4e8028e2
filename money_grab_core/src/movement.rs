use serde::{Deserialize, Serialize};

use crate::{Direction, PixelPosition, Position, coords::CoordinateMapper, maze::Maze};

/// Whether a step from `pos` in `direction` lands on an in-bounds open cell.
pub fn can_move(maze: &Maze, pos: Position, direction: Direction) -> bool {
    if direction.is_none() {
        return false;
    }
    maze.grid
        .neighbor(pos, direction)
        .is_some_and(|next| maze.is_open(next))
}

/// Open neighbours of `pos`, in [`Direction::ALL`] order.
pub fn valid_moves(maze: &Maze, pos: Position) -> Vec<(Direction, Position)> {
    Direction::ALL
        .into_iter()
        .filter(|d| can_move(maze, pos, *d))
        .filter_map(|d| pos.step(d).map(|next| (d, next)))
        .collect()
}

/// Continuous motion state of an agent: where it is in both coordinate
/// systems, where it is heading and what the controller asked for next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub grid_pos: Position,
    pub pixel_pos: PixelPosition,
    pub current: Direction,
    pub queued: Direction,
    /// Cell the agent was last centred on before the current crossing.
    pub last_cell: Position,
}

impl Motion {
    /// Stationary at the centre of `pos`.
    pub fn at(pos: Position, mapper: &CoordinateMapper) -> Self {
        Motion {
            grid_pos: pos,
            pixel_pos: mapper.grid_to_pixel(pos),
            current: Direction::None,
            queued: Direction::None,
            last_cell: pos,
        }
    }

    /// Buffers a direction; it is applied on the next aligned tick where it is legal.
    pub fn queue(&mut self, direction: Direction) {
        self.queued = direction;
    }

    pub fn is_aligned(&self, mapper: &CoordinateMapper) -> bool {
        mapper.is_aligned(self.pixel_pos)
    }

    /// Jumps to the centre of `pos` and forgets any heading.
    pub fn teleport(&mut self, pos: Position, mapper: &CoordinateMapper) {
        *self = Motion::at(pos, mapper);
    }

    /// Advances one tick. Returns the cell just arrived at when the move ends
    /// aligned on a cell centre; cell-entry effects hang off that.
    ///
    /// # Arguments
    ///
    /// * `maze`: Walls that block the move.
    /// * `mapper`: Grid/pixel conversion and the alignment tolerance.
    /// * `speed`: Pixels travelled this tick.
    pub fn advance(&mut self, maze: &Maze, mapper: &CoordinateMapper, speed: f32) -> Option<Position> {
        if self.is_aligned(mapper) {
            self.pixel_pos = mapper.grid_to_pixel(self.grid_pos);
            self.last_cell = self.grid_pos;
            if !self.queued.is_none() && can_move(maze, self.grid_pos, self.queued) {
                self.current = self.queued;
                self.queued = Direction::None;
            }
            if !self.current.is_none() && !can_move(maze, self.grid_pos, self.current) {
                self.current = Direction::None;
            }
        }
        if self.current.is_none() {
            return None;
        }

        self.pixel_pos = mapper.displace(self.pixel_pos, self.current, speed);
        self.grid_pos = mapper.pixel_to_grid(self.pixel_pos);
        if self.is_aligned(mapper) {
            self.pixel_pos = mapper.grid_to_pixel(self.grid_pos);
            Some(self.grid_pos)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn corridor() -> Maze {
        Maze::parse(
            "
            #######
            S.....#
            #.###.#
            #.....X
            #######
            ",
        )
        .unwrap()
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(20.0, 1.0)
    }

    #[test]
    fn can_move_checks_walls_and_bounds() {
        let maze = corridor();
        let start = maze.entrance;
        assert!(!can_move(&maze, start, Direction::Left));
        assert!(!can_move(&maze, start, Direction::Up));
        assert!(can_move(&maze, start, Direction::Right));
        assert!(!can_move(&maze, start, Direction::None));
        let moves: Vec<Direction> = valid_moves(&maze, Position::new(1, 1))
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        assert_eq!(moves, vec![Direction::Down, Direction::Left, Direction::Right]);
    }

    #[test]
    fn crossing_one_cell_takes_cell_over_speed_ticks() {
        let maze = corridor();
        let m = mapper();
        let mut motion = Motion::at(maze.entrance, &m);
        motion.queue(Direction::Right);
        let arrivals: Vec<_> = (0..10).map(|_| motion.advance(&maze, &m, 2.0)).collect();
        assert!(arrivals[..9].iter().all(Option::is_none));
        assert_eq!(arrivals[9], Some(Position::new(1, 1)));
        assert_eq!(motion.queued, Direction::None);
        assert_eq!(motion.last_cell, maze.entrance);
    }

    #[test]
    fn blocked_turn_stays_queued_until_legal() {
        let maze = corridor();
        let m = mapper();
        let mut motion = Motion::at(maze.entrance, &m);
        motion.queue(Direction::Down);
        assert_eq!(motion.advance(&maze, &m, 2.0), None);
        assert_eq!(motion.current, Direction::None);
        assert_eq!(motion.queued, Direction::Down);

        motion.current = Direction::Right;
        for _ in 0..10 {
            motion.advance(&maze, &m, 2.0);
        }
        assert_eq!(motion.grid_pos, Position::new(1, 1));
        motion.advance(&maze, &m, 2.0);
        assert_eq!(motion.current, Direction::Down);
        assert_eq!(motion.queued, Direction::None);
    }

    #[test]
    fn stops_dead_at_a_wall() {
        let maze = corridor();
        let m = mapper();
        let mut motion = Motion::at(Position::new(1, 4), &m);
        motion.queue(Direction::Right);
        for _ in 0..40 {
            motion.advance(&maze, &m, 2.0);
        }
        assert_eq!(motion.grid_pos, Position::new(1, 5));
        assert_eq!(motion.current, Direction::None);
        assert_eq!(motion.pixel_pos, m.grid_to_pixel(Position::new(1, 5)));
    }

    #[test]
    fn random_input_never_enters_a_wall() {
        let maze = Maze::generate(2);
        let m = mapper();
        let mut rng = StdRng::seed_from_u64(7);
        let mut motion = Motion::at(maze.entrance, &m);
        for _ in 0..5_000 {
            if rng.random_bool(0.1) {
                motion.queue(Direction::ALL[rng.random_range(0..4)]);
            }
            motion.advance(&maze, &m, 2.0);
            assert!(maze.is_open(motion.grid_pos), "entered wall at {:?}", motion.grid_pos);
        }
    }
}

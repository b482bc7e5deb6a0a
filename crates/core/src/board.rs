//! board representation - dense edge-category array over normalized edges
//! turn state machine: push/pop steps, finish, winner

use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::{Direction, Edge, Point};
use crate::shape::Shape;

/// Steps of one turn. Turns rarely run longer than a dozen steps, so they
/// stay inline.
pub type Steps = SmallVec<[Direction; 16]>;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    #[inline(always)]
    pub const fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: u8) -> Option<Player> {
        match index {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }
}

impl Not for Player {
    type Output = Player;

    fn not(self) -> Player {
        self.opponent()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EdgeCategory {
    /// Part of the outline or a gate wall. Never changes during play.
    Border = 0,
    /// Not claimed yet.
    Empty = 1,
    /// Claimed by an already committed turn.
    Old = 2,
    /// Claimed by the turn in progress.
    New = 3,
}

impl EdgeCategory {
    #[inline(always)]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<EdgeCategory> {
        match code {
            0 => Some(EdgeCategory::Border),
            1 => Some(EdgeCategory::Empty),
            2 => Some(EdgeCategory::Old),
            3 => Some(EdgeCategory::New),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    /// Includes the two gate rows.
    pub height: i32,
}

/// Key space of the edge array: (x, y, normalized direction).
pub(crate) fn edge_shape(half_width: i32, half_height: i32) -> Shape<3> {
    Shape::new([(-half_width, half_width), (-half_height, half_height), (0, 3)])
}

/// Full game state: geometry, ball, claimed edges, whose turn it is and the
/// steps of the turn in progress.
///
/// The board is a rectangle with a gate notch in the middle of the top and
/// bottom lines. Player One attacks the bottom gate, player Two the top one.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Board {
    width: i32,
    height: i32,
    ball: Point,
    shape: Shape<3>,
    edges: Vec<EdgeCategory>,
    current_player: Player,
    current_move: Steps,
}

impl Board {
    /// Empty board with the ball on the center spot.
    ///
    /// `height` excludes the gates; both dimensions must be positive and even.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width > 0 && width % 2 == 0,
            "board width must be positive and even, got {width}"
        );
        assert!(
            height > 0 && height % 2 == 0,
            "board height must be positive and even, got {height}"
        );

        let height = height + 2;
        let shape = edge_shape(width / 2, height / 2);
        let mut board = Self {
            width,
            height,
            ball: Point::ORIGIN,
            edges: vec![EdgeCategory::Empty; shape.size()],
            shape,
            current_player: Player::One,
            current_move: Steps::new(),
        };
        board.carve_outline();
        board
    }

    /// Assembles a board from already validated parts.
    pub(crate) fn from_parts(
        size: Size,
        ball: Point,
        edges: Vec<EdgeCategory>,
        current_player: Player,
        current_move: Steps,
    ) -> Self {
        let shape = edge_shape(size.width / 2, size.height / 2);
        debug_assert_eq!(edges.len(), shape.size());
        Self {
            width: size.width,
            height: size.height,
            ball,
            shape,
            edges,
            current_player,
            current_move,
        }
    }

    fn carve_outline(&mut self) {
        let hw = self.half_width();
        let hh = self.half_height();
        let line = hh - 1;

        // side lines
        for y in -line..line {
            self.set_edge_category(Edge::new(Point::new(hw, y), Direction::North), EdgeCategory::Border);
            self.set_edge_category(Edge::new(Point::new(-hw, y), Direction::North), EdgeCategory::Border);
        }

        // goal lines, leaving the two-unit opening in front of each gate
        for x in -hw..hw {
            if x == -1 || x == 0 {
                continue;
            }
            for row in [line, -line] {
                self.set_edge_category(Edge::new(Point::new(x, row), Direction::East), EdgeCategory::Border);
            }
        }

        // gates: back wall and two side walls
        for row in [hh, -hh] {
            for x in [-1, 0] {
                self.set_edge_category(Edge::new(Point::new(x, row), Direction::East), EdgeCategory::Border);
            }
        }
        for x in [-1, 1] {
            self.set_edge_category(Edge::new(Point::new(x, line), Direction::North), EdgeCategory::Border);
            self.set_edge_category(Edge::new(Point::new(x, -line), Direction::South), EdgeCategory::Border);
        }
    }

    // Size.

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height including both gate rows.
    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline(always)]
    pub fn half_width(&self) -> i32 {
        self.width / 2
    }

    /// Row of the gates: the ball at `+half_height` or `-half_height` is a goal.
    #[inline(always)]
    pub fn half_height(&self) -> i32 {
        self.height / 2
    }

    /// Gate row the player is trying to reach.
    pub fn goal_row(&self, player: Player) -> i32 {
        match player {
            Player::One => -self.half_height(),
            Player::Two => self.half_height(),
        }
    }

    // Ball.

    #[inline(always)]
    pub fn ball(&self) -> Point {
        self.ball
    }

    /// Editor-only placement. The point must be inside.
    pub fn set_ball(&mut self, ball: Point) {
        debug_assert!(self.is_point_inside(ball), "ball {ball:?} outside the board");
        self.ball = ball;
    }

    // Points.

    pub fn is_point_inside(&self, p: Point) -> bool {
        let (ax, ay) = (p.x.abs(), p.y.abs());
        let hh = self.half_height();
        if ax > self.half_width() || ay > hh {
            return false;
        }
        // gate rows only exist around the centerline
        ay < hh || ax <= 1
    }

    /// All points inside, row by row from the bottom gate up.
    pub fn points_inside(&self) -> Vec<Point> {
        let hw = self.half_width();
        let hh = self.half_height();
        let mut points = Vec::new();
        for y in -hh..=hh {
            for x in -hw..=hw {
                let p = Point::new(x, y);
                if self.is_point_inside(p) {
                    points.push(p);
                }
            }
        }
        points
    }

    pub fn count_visited_edges_around(&self, p: Point) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&dir| self.is_edge_visited(Edge::new(p, dir)))
            .count()
    }

    // Edges.

    /// Both ends inside, except the diagonals that would cut across a gate
    /// corner.
    pub fn is_edge_inside(&self, edge: Edge) -> bool {
        let (a, b) = (edge.start(), edge.end());
        if !self.is_point_inside(a) || !self.is_point_inside(b) {
            return false;
        }
        !(self.cuts_gate_corner(a, b) || self.cuts_gate_corner(b, a))
    }

    #[inline]
    fn cuts_gate_corner(&self, gate: Point, other: Point) -> bool {
        gate.y.abs() == self.half_height() && other.x.abs() == 2
    }

    #[inline]
    fn edge_index(&self, edge: Edge) -> usize {
        let edge = edge.normalized();
        let start = edge.start();
        self.shape
            .map([start.x, start.y, edge.direction().index() as i32])
    }

    pub fn edge_category(&self, edge: Edge) -> EdgeCategory {
        debug_assert!(self.is_edge_inside(edge), "edge {edge:?} outside the board");
        self.edges[self.edge_index(edge)]
    }

    pub fn set_edge_category(&mut self, edge: Edge, category: EdgeCategory) {
        debug_assert!(self.is_edge_inside(edge), "edge {edge:?} outside the board");
        let index = self.edge_index(edge);
        self.edges[index] = category;
    }

    /// Border, Old and New edges are visited.
    pub fn is_edge_visited(&self, edge: Edge) -> bool {
        self.is_edge_inside(edge) && self.edge_category(edge) != EdgeCategory::Empty
    }

    /// Every edge inside the board once, in normalized form.
    pub fn edges_inside(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for p in self.points_inside() {
            for dir in Direction::NORMALIZED {
                let edge = Edge::new(p, dir);
                if self.is_edge_inside(edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Raw storage, indexed by the edge shape.
    pub(crate) fn edge_slots(&self) -> &[EdgeCategory] {
        &self.edges
    }

    // Current player.

    #[inline(always)]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Editor-only.
    pub fn set_current_player(&mut self, player: Player) {
        self.current_player = player;
    }

    // Current move.

    #[inline(always)]
    pub fn current_move(&self) -> &[Direction] {
        &self.current_move
    }

    /// The turn may end once it has a step and the ball sits on a point with
    /// more than one visited edge around it.
    pub fn can_finish_move(&self) -> bool {
        !self.current_move.is_empty() && self.count_visited_edges_around(self.ball) > 1
    }

    /// A finishable turn is also a forced stop: no further step is allowed.
    pub fn can_step_in_direction(&self, dir: Direction) -> bool {
        if self.can_finish_move() {
            return false;
        }
        let edge = Edge::new(self.ball, dir);
        self.is_edge_inside(edge) && self.edge_category(edge) == EdgeCategory::Empty
    }

    /// Like [`Board::can_step_in_direction`], addressed by the target point.
    pub fn can_step_to(&self, target: Point) -> bool {
        let offset = Point::new(target.x - self.ball.x, target.y - self.ball.y);
        Direction::from_offset(offset).is_some_and(|dir| self.can_step_in_direction(dir))
    }

    pub fn can_push_some_step(&self) -> bool {
        Direction::ALL
            .iter()
            .any(|&dir| self.can_step_in_direction(dir))
    }

    /// Claims the edge in `dir` for the current turn and moves the ball.
    pub fn push_step(&mut self, dir: Direction) {
        debug_assert!(
            self.can_step_in_direction(dir),
            "illegal step {dir:?} from {:?}",
            self.ball
        );
        let edge = Edge::new(self.ball, dir);
        self.set_edge_category(edge, EdgeCategory::New);
        self.current_move.push(dir);
        self.ball = edge.end();
    }

    /// Takes back the last step of the current turn. None if there is none.
    pub fn pop_step(&mut self) -> Option<Direction> {
        let dir = self.current_move.pop()?;
        let edge = Edge::new(self.ball, dir.opposite());
        debug_assert_eq!(self.edge_category(edge), EdgeCategory::New);
        self.set_edge_category(edge, EdgeCategory::Empty);
        self.ball = edge.end();
        Some(dir)
    }

    pub fn clear_current_move(&mut self) {
        while self.pop_step().is_some() {}
    }

    /// Commits the current turn: its edges become Old and the other player
    /// moves next. Returns the committed steps.
    pub fn finish_move(&mut self) -> Steps {
        debug_assert!(self.can_finish_move(), "turn cannot be finished yet");
        debug_assert!(self.winner().is_none(), "game already decided");
        let steps = std::mem::take(&mut self.current_move);
        self.retag_path(&steps, EdgeCategory::New, EdgeCategory::Old);
        self.current_player = self.current_player.opponent();
        steps
    }

    /// Exact inverse of [`Board::finish_move`].
    pub(crate) fn undo_finish_move(&mut self, steps: Steps) {
        debug_assert!(self.current_move.is_empty());
        self.current_player = self.current_player.opponent();
        self.retag_path(&steps, EdgeCategory::Old, EdgeCategory::New);
        self.current_move = steps;
    }

    /// Walks `steps` backwards from the ball, switching every edge on the way
    /// from `from` to `to`.
    fn retag_path(&mut self, steps: &[Direction], from: EdgeCategory, to: EdgeCategory) {
        let mut point = self.ball;
        for &dir in steps.iter().rev() {
            let edge = Edge::new(point, dir.opposite());
            debug_assert_eq!(self.edge_category(edge), from);
            self.set_edge_category(edge, to);
            point = edge.end();
        }
    }

    /// The winner, if the game is decided.
    ///
    /// Either the ball is in a gate, or the player to move can neither finish
    /// nor extend the turn and loses.
    pub fn winner(&self) -> Option<Player> {
        let hh = self.half_height();
        if self.ball.y == hh {
            return Some(Player::Two);
        }
        if self.ball.y == -hh {
            return Some(Player::One);
        }
        if !self.can_finish_move() && !self.can_push_some_step() {
            return Some(self.current_player.opponent());
        }
        None
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hw = self.half_width();
        let hh = self.half_height();
        let rows = (4 * hh + 1) as usize;
        let cols = (4 * hw + 1) as usize;
        let mut grid = vec![vec![' '; cols]; rows];
        let cell = |p: Point| ((2 * (hh - p.y)) as usize, (2 * (p.x + hw)) as usize);

        for edge in self.edges_inside() {
            if !self.is_edge_visited(edge) {
                continue;
            }
            let (r1, c1) = cell(edge.start());
            let (r2, c2) = cell(edge.end());
            let (r, c) = ((r1 + r2) / 2, (c1 + c2) / 2);
            let mark = match edge.direction() {
                Direction::North => '|',
                Direction::East => '-',
                Direction::NorthEast => '/',
                _ => '\\',
            };
            grid[r][c] = match (grid[r][c], mark) {
                ('/', '\\') | ('\\', '/') => 'X',
                _ => mark,
            };
        }
        for p in self.points_inside() {
            let (r, c) = cell(p);
            grid[r][c] = if p == self.ball { 'o' } else { '.' };
        }

        for row in grid {
            let line: String = row.into_iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

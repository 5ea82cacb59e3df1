//! Occupancy map keyed by grid coordinate
//!
//! Each cell records the identifier of the vine that owns it, and no cell is ever
//! owned by two vines. Storage is a dense array indexed `[y, x]` so lookups by
//! `Point` are bounds-checked and allocation free.

use crate::io::error::{GenerationError, Result};
use crate::model::point::{Direction, Point};
use crate::model::vine::Vine;
use ndarray::Array2;
use std::collections::{BTreeSet, VecDeque};

/// Mapping from cell to owning vine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    owners: Array2<Option<String>>,
    occupied: usize,
}

impl OccupancyGrid {
    /// Create an empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            owners: Array2::from_elem((height, width), None),
            occupied: 0,
        }
    }

    /// Build a grid from a vine set
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` if a vine leaves the grid or overlaps another vine
    pub fn from_vines(width: usize, height: usize, vines: &[Vine]) -> Result<Self> {
        let mut grid = Self::new(width, height);
        for vine in vines {
            grid.place_vine(vine)?;
        }
        Ok(grid)
    }

    /// Grid width
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of cells
    pub const fn total_cells(&self) -> usize {
        self.width * self.height
    }

    /// Number of owned cells
    pub const fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Number of unowned cells
    pub const fn empty_count(&self) -> usize {
        self.total_cells() - self.occupied
    }

    /// Fraction of cells owned by vines
    pub fn coverage(&self) -> f64 {
        if self.total_cells() == 0 {
            return 0.0;
        }
        self.occupied as f64 / self.total_cells() as f64
    }

    /// Test whether a point lies on the grid
    pub const fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.width
            && (point.y as usize) < self.height
    }

    const fn index(&self, point: Point) -> Option<[usize; 2]> {
        if self.in_bounds(point) {
            Some([point.y as usize, point.x as usize])
        } else {
            None
        }
    }

    /// Identifier of the vine owning a cell
    pub fn owner(&self, point: Point) -> Option<&str> {
        self.index(point)
            .and_then(|index| self.owners.get(index))
            .and_then(Option::as_deref)
    }

    /// Test whether a cell is on the grid and unowned
    pub fn is_free(&self, point: Point) -> bool {
        self.index(point)
            .and_then(|index| self.owners.get(index))
            .is_some_and(Option::is_none)
    }

    /// Claim a single cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` if the cell is off the grid or already owned
    pub fn occupy(&mut self, point: Point, vine_id: &str) -> Result<()> {
        let outside = || GenerationError::InvalidVine {
            vine_id: vine_id.to_string(),
            reason: format!("cell {point} lies outside the grid"),
        };
        let Some(index) = self.index(point) else {
            return Err(outside());
        };
        match self.owners.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(vine_id.to_string());
                self.occupied += 1;
                Ok(())
            }
            Some(Some(owner)) => Err(GenerationError::InvalidVine {
                vine_id: vine_id.to_string(),
                reason: format!("cell {point} is already owned by {owner}"),
            }),
            _ => Err(outside()),
        }
    }

    /// Release a cell, returning its previous owner
    pub fn release(&mut self, point: Point) -> Option<String> {
        let previous = self
            .index(point)
            .and_then(|index| self.owners.get_mut(index))
            .and_then(Option::take);
        if previous.is_some() {
            self.occupied -= 1;
        }
        previous
    }

    /// Claim every cell of a vine, leaving the grid untouched on failure
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` if any cell is off the grid or already owned
    pub fn place_vine(&mut self, vine: &Vine) -> Result<()> {
        if let Some(&point) = vine
            .ordered_path
            .iter()
            .find(|&&point| !self.is_free(point))
        {
            let reason = self.owner(point).map_or_else(
                || format!("cell {point} lies outside the grid"),
                |owner| format!("cell {point} is already owned by {owner}"),
            );
            return Err(GenerationError::InvalidVine {
                vine_id: vine.id.clone(),
                reason,
            });
        }
        for &point in &vine.ordered_path {
            self.occupy(point, &vine.id)?;
        }
        Ok(())
    }

    /// Release every cell owned by a vine
    pub fn remove_vine(&mut self, vine: &Vine) {
        for &point in &vine.ordered_path {
            if self.owner(point) == Some(vine.id.as_str()) {
                self.release(point);
            }
        }
    }

    /// Number of free orthogonal neighbours
    pub fn free_neighbors(&self, point: Point) -> usize {
        point
            .neighbors()
            .into_iter()
            .filter(|&neighbor| self.is_free(neighbor))
            .count()
    }

    /// Unowned cells in row-major order, bottom row first
    pub fn empty_cells(&self) -> Vec<Point> {
        self.cells().filter(|&point| self.is_free(point)).collect()
    }

    /// Every cell in row-major order, bottom row first
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Point::new(x as i32, y as i32))
        })
    }

    /// Owned cells with their owners in row-major order
    pub fn occupied_cells(&self) -> Vec<(Point, &str)> {
        self.cells()
            .filter_map(|point| self.owner(point).map(|owner| (point, owner)))
            .collect()
    }

    /// Test whether a cell touches the grid border
    pub const fn is_edge(&self, point: Point) -> bool {
        self.in_bounds(point)
            && (point.x == 0
                || point.y == 0
                || point.x as usize == self.width - 1
                || point.y as usize == self.height - 1)
    }

    /// Cells between a head and the grid edge in the given direction
    pub fn corridor(&self, head: Point, direction: Direction) -> impl Iterator<Item = Point> + '_ {
        std::iter::successors(Some(head.step(direction)), move |point| {
            Some(point.step(direction))
        })
        .take_while(move |&point| self.in_bounds(point))
    }

    /// Test whether a corridor holds no cell owned by another vine
    ///
    /// Cells owned by `ignore` are treated as empty.
    pub fn is_corridor_clear(&self, head: Point, direction: Direction, ignore: Option<&str>) -> bool {
        self.corridor(head, direction)
            .all(|point| self.owner(point).is_none_or(|owner| Some(owner) == ignore))
    }

    /// Distinct owners of the cells in the four corridors leaving a cell
    pub fn corridor_owners(&self, origin: Point) -> BTreeSet<String> {
        Direction::ALL
            .into_iter()
            .flat_map(|direction| self.corridor(origin, direction))
            .filter_map(|point| self.owner(point).map(str::to_string))
            .collect()
    }

    /// Steps from a cell to the edge in a direction
    pub const fn distance_to_edge(&self, point: Point, direction: Direction) -> usize {
        let distance = match direction {
            Direction::Left => point.x,
            Direction::Right => self.width as i32 - 1 - point.x,
            Direction::Down => point.y,
            Direction::Up => self.height as i32 - 1 - point.y,
        };
        if distance < 0 { 0 } else { distance as usize }
    }

    /// Direction of the nearest edge, ties resolved left, right, down, up
    pub fn nearest_edge_direction(&self, point: Point) -> Direction {
        self.directions_by_edge_distance(point)
            .first()
            .copied()
            .unwrap_or(Direction::Left)
    }

    /// All directions ordered by distance to the edge, ties resolved left, right, down, up
    pub fn directions_by_edge_distance(&self, point: Point) -> Vec<Direction> {
        let mut directions = vec![
            Direction::Left,
            Direction::Right,
            Direction::Down,
            Direction::Up,
        ];
        directions.sort_by_key(|&direction| self.distance_to_edge(point, direction));
        directions
    }

    /// Count empty cells reachable from an empty edge cell
    ///
    /// Cells in `reserved` are treated as owned. Reachability is what lets a
    /// later vine still find an exit corridor.
    pub fn edge_reachable_empty(&self, reserved: &[Point]) -> usize {
        let mut visited = Array2::from_elem((self.height, self.width), false);
        for &point in reserved {
            if let Some(cell) = self.index(point).and_then(|index| visited.get_mut(index)) {
                *cell = true;
            }
        }

        let mut queue = VecDeque::new();
        for point in self.cells() {
            if self.is_edge(point) && self.is_free(point) {
                if let Some(cell) = self.index(point).and_then(|index| visited.get_mut(index)) {
                    if !*cell {
                        *cell = true;
                        queue.push_back(point);
                    }
                }
            }
        }

        let mut reached = 0;
        while let Some(point) = queue.pop_front() {
            reached += 1;
            for neighbor in point.neighbors() {
                if !self.is_free(neighbor) {
                    continue;
                }
                if let Some(cell) = self.index(neighbor).and_then(|index| visited.get_mut(index)) {
                    if !*cell {
                        *cell = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        reached
    }
}

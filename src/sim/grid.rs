//! Level grid parsed from a character map
//!
//! Legend: `W` wall, `B` destructible block, `P` player spawn, `E` enemy
//! spawn, anything else floor. Tile `(x, y)` is centred at world position
//! `(x * grid_size, y * grid_size)`.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geom::Aabb;
use crate::error::LevelError;

/// Kind of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Block,
    #[default]
    Floor,
    PlayerSpawn,
    EnemySpawn,
}

impl TileKind {
    pub fn from_char(c: char) -> Self {
        match c {
            'W' => TileKind::Wall,
            'B' => TileKind::Block,
            'P' => TileKind::PlayerSpawn,
            'E' => TileKind::EnemySpawn,
            _ => TileKind::Floor,
        }
    }

    /// Walls and intact blocks stop movement
    pub fn is_blocking(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Block)
    }
}

/// One cell of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub kind: TileKind,
}

/// The authored arena layout
pub const DEFAULT_LEVEL: [&str; 13] = [
    "WWWWWWWWWWWWWWW",
    "WP  B   B B B W",
    "W WBW WB B WBWW",
    "W B B B   B   W",
    "WWWBW BW WB WBW",
    "W   B   B B   W",
    "WWWB WBWB BW WW",
    "W B   B   B B W",
    "WW WBWBWWWW WBW",
    "W B BWW E WW  W",
    "WWWBW BW WB WBW",
    "W     B W B   W",
    "WWWWWWWWWWWWWWW",
];

/// Static tile layout with one-way block destruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Current tiles, row-major
    tiles: Vec<TileKind>,
    /// Tiles as loaded, for restart
    layout: Vec<TileKind>,
    /// Blocks destroyed since load/reset, in destruction order
    destroyed: Vec<IVec2>,
    player_spawn: IVec2,
    enemy_spawns: Vec<IVec2>,
}

impl Grid {
    /// Parse a rectangular character map
    pub fn load<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let height = rows.len();
        if height == 0 {
            return Err(LevelError::invalid("level has no rows"));
        }

        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(LevelError::invalid("level rows are empty"));
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut player_spawn = None;
        let mut enemy_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != width {
                return Err(LevelError::invalid(format!(
                    "row {y} has length {len}, expected {width}"
                )));
            }

            for (x, c) in row.chars().enumerate() {
                let kind = TileKind::from_char(c);
                let cell = IVec2::new(x as i32, y as i32);
                match kind {
                    TileKind::PlayerSpawn => {
                        if player_spawn.is_none() {
                            player_spawn = Some(cell);
                        } else {
                            log::warn!("Ignoring extra player spawn at ({}, {})", x, y);
                        }
                    }
                    TileKind::EnemySpawn => enemy_spawns.push(cell),
                    _ => {}
                }
                tiles.push(kind);
            }
        }

        let Some(player_spawn) = player_spawn else {
            return Err(LevelError::invalid("level has no player spawn 'P'"));
        };

        log::info!(
            "Loaded {}x{} level with {} enemy spawn(s)",
            width,
            height,
            enemy_spawns.len()
        );

        Ok(Self {
            width,
            height,
            layout: tiles.clone(),
            tiles,
            destroyed: Vec::new(),
            player_spawn,
            enemy_spawns,
        })
    }

    /// Parse a level from newline-separated text
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        Self::load(&rows)
    }

    /// The built-in arena
    pub fn default_level() -> Self {
        match Self::load(&DEFAULT_LEVEL) {
            Ok(grid) => grid,
            Err(e) => unreachable!("built-in level is valid: {e}"),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn player_spawn(&self) -> IVec2 {
        self.player_spawn
    }

    pub fn enemy_spawns(&self) -> &[IVec2] {
        &self.enemy_spawns
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    /// Bounds-checked tile lookup
    pub fn tile_at(&self, x: i32, y: i32) -> Result<Tile, LevelError> {
        let idx = self.index(x, y).ok_or(LevelError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        Ok(Tile {
            x,
            y,
            kind: self.tiles[idx],
        })
    }

    /// Wall or intact block. Outside the grid counts as blocking.
    pub fn is_blocking(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .map(|idx| self.tiles[idx].is_blocking())
            .unwrap_or(true)
    }

    /// Permanent wall. Outside the grid counts as wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .map(|idx| self.tiles[idx] == TileKind::Wall)
            .unwrap_or(true)
    }

    /// Turn a block into floor. Returns whether a block was destroyed.
    pub fn destroy_block_at(&mut self, x: i32, y: i32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if self.tiles[idx] != TileKind::Block {
            return false;
        }
        self.tiles[idx] = TileKind::Floor;
        self.destroyed.push(IVec2::new(x, y));
        log::debug!("Block destroyed at ({}, {})", x, y);
        true
    }

    /// Blocks destroyed since load or the last reset
    pub fn destroyed_blocks(&self) -> &[IVec2] {
        &self.destroyed
    }

    /// Restore the layout as loaded
    pub fn reset(&mut self) {
        self.tiles.copy_from_slice(&self.layout);
        self.destroyed.clear();
    }

    /// Grid cell containing a world position
    pub fn cell_of(pos: Vec2, grid_size: f32) -> IVec2 {
        (pos / grid_size).round().as_ivec2()
    }

    /// World position of a cell's centre
    pub fn world_pos(cell: IVec2, grid_size: f32) -> Vec2 {
        cell.as_vec2() * grid_size
    }

    /// Collision bounds of every blocking tile overlapping `area`
    pub fn blocking_bounds_near(&self, area: &Aabb, grid_size: f32, tile_size: f32) -> Vec<Aabb> {
        let lo = (area.min / grid_size).floor().as_ivec2() - IVec2::ONE;
        let hi = (area.max / grid_size).ceil().as_ivec2() + IVec2::ONE;

        let mut out = Vec::new();
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                if self.index(x, y).is_none() || !self.is_blocking(x, y) {
                    continue;
                }
                let bounds = Aabb::from_center(Self::world_pos(IVec2::new(x, y), grid_size), tile_size);
                if bounds.intersects(area) {
                    out.push(bounds);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_legend() {
        let grid = Grid::load(&["WBP", "E.x"]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.tile_at(0, 0).unwrap().kind, TileKind::Wall);
        assert_eq!(grid.tile_at(1, 0).unwrap().kind, TileKind::Block);
        assert_eq!(grid.tile_at(2, 0).unwrap().kind, TileKind::PlayerSpawn);
        assert_eq!(grid.tile_at(0, 1).unwrap().kind, TileKind::EnemySpawn);
        assert_eq!(grid.tile_at(1, 1).unwrap().kind, TileKind::Floor);
        assert_eq!(grid.tile_at(2, 1).unwrap().kind, TileKind::Floor);
        assert_eq!(grid.player_spawn(), IVec2::new(2, 0));
        assert_eq!(grid.enemy_spawns(), &[IVec2::new(0, 1)]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Grid::load(&["WWW", "WP"]).unwrap_err();
        assert!(matches!(err, LevelError::InvalidLevel { .. }));
    }

    #[test]
    fn test_missing_player_rejected() {
        let err = Grid::load(&["WWW", "W W"]).unwrap_err();
        assert!(matches!(err, LevelError::InvalidLevel { .. }));

        let empty: [&str; 0] = [];
        assert!(Grid::load(&empty).is_err());
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = Grid::load(&["WBP"]).unwrap();
        assert_eq!(
            grid.tile_at(3, 0),
            Err(LevelError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 1
            })
        );
        assert!(grid.tile_at(-1, 0).is_err());
        assert!(grid.tile_at(0, 1).is_err());
        assert!(grid.is_blocking(-1, 0));
        assert!(grid.is_wall(0, 5));
    }

    #[test]
    fn test_destroy_block_once() {
        let mut grid = Grid::load(&["WBP"]).unwrap();
        assert!(grid.is_blocking(1, 0));
        assert!(grid.destroy_block_at(1, 0));
        assert!(!grid.is_blocking(1, 0));
        assert!(!grid.destroy_block_at(1, 0));
        assert_eq!(grid.destroyed_blocks(), &[IVec2::new(1, 0)]);

        // Walls and floor are never destroyed
        assert!(!grid.destroy_block_at(0, 0));
        assert!(!grid.destroy_block_at(2, 0));
        assert!(!grid.destroy_block_at(9, 9));
        assert_eq!(grid.tile_at(0, 0).unwrap().kind, TileKind::Wall);
    }

    #[test]
    fn test_reset_restores_blocks() {
        let mut grid = Grid::load(&["WBBP"]).unwrap();
        grid.destroy_block_at(1, 0);
        grid.destroy_block_at(2, 0);
        grid.reset();
        assert!(grid.destroyed_blocks().is_empty());
        assert_eq!(grid.tile_at(1, 0).unwrap().kind, TileKind::Block);
        assert_eq!(grid.tile_at(2, 0).unwrap().kind, TileKind::Block);
    }

    #[test]
    fn test_parse_text() {
        let grid = Grid::parse("WWW\r\nWPW\nWWW\n").unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.player_spawn(), IVec2::new(1, 1));
    }

    #[test]
    fn test_default_level() {
        let grid = Grid::default_level();
        assert_eq!(grid.width(), 15);
        assert_eq!(grid.height(), 13);
        assert_eq!(grid.player_spawn(), IVec2::new(1, 1));
        assert_eq!(grid.enemy_spawns(), &[IVec2::new(8, 9)]);
    }

    #[test]
    fn test_world_cell_conversion() {
        let cell = IVec2::new(3, 4);
        let pos = Grid::world_pos(cell, 50.0);
        assert_eq!(pos, Vec2::new(150.0, 200.0));
        assert_eq!(Grid::cell_of(pos + Vec2::new(20.0, -20.0), 50.0), cell);
    }

    #[test]
    fn test_blocking_bounds_near() {
        let grid = Grid::load(&["WWW", "WPW", "WWW"]).unwrap();
        let body = Aabb::from_center(Vec2::new(50.0, 50.0), 30.0);
        // Body sits inside the spawn tile, touching no wall
        assert!(grid.blocking_bounds_near(&body, 50.0, 48.0).is_empty());

        let shifted = Aabb::from_center(Vec2::new(70.0, 50.0), 30.0);
        let hits = grid.blocking_bounds_near(&shifted, 50.0, 48.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].center(), Vec2::new(100.0, 50.0));
    }
}

use crate::world::camera::Camera;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Tile id that renders nothing and can never be solid
pub const EMPTY_TILE: u32 = 0;

/// Level description as fetched from JSON
/// - layers are row-major arrays of tile ids, index = row * columns + column
/// - tile id 0 is an empty spot (upper layers need it for see-through)
/// - `solid` lists the tile ids that block movement on any layer
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Level {
    pub columns: i32,
    pub rows: i32,
    pub tile_size: i32,
    pub solid: Vec<u32>,
    pub layers: Vec<Vec<u32>>,
}

/// Validated tile map model
/// - all pixel math bottoms out here: point -> tile index, tile -> pixel
///   origin, solidity sampling, visible-range for the scrolling view
pub struct TileMap {
    columns: i32,
    rows: i32,
    tile_size: i32,
    solid: Vec<u32>,
    layers: Vec<Vec<u32>>,
}

/// Window of tiles a camera can see, both ends inclusive
/// - offsets are <= 0 and shift the first tile partially offscreen so the
///   view scrolls smoothly between tile boundaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRange {
    pub start_column: i32,
    pub end_column: i32,
    pub start_row: i32,
    pub end_row: i32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl TileMap {
    pub fn from_level(level: Level) -> Result<Self> {
        if level.columns <= 0 || level.rows <= 0 || level.tile_size <= 0 {
            return Err(anyhow!(
                "Level dimensions must be positive : {} columns x {} rows, tile size {}",
                level.columns,
                level.rows,
                level.tile_size
            ));
        }

        let expected = (level.columns * level.rows) as usize;
        for (index, layer) in level.layers.iter().enumerate() {
            if layer.len() != expected {
                return Err(anyhow!(
                    "Layer {} has {} tiles, expected {}",
                    index,
                    layer.len(),
                    expected
                ));
            }
        }

        Ok(TileMap {
            columns: level.columns,
            rows: level.rows,
            tile_size: level.tile_size,
            solid: level.solid,
            layers: level.layers,
        })
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Tile id at (column, row), None outside the map or the layer list
    pub fn tile(&self, layer: usize, column: i32, row: i32) -> Option<u32> {
        if column < 0 || column >= self.columns || row < 0 || row >= self.rows {
            return None;
        }
        self.layers
            .get(layer)
            .map(|tiles| tiles[(row * self.columns + column) as usize])
    }

    pub fn is_solid(&self, tile: u32) -> bool {
        self.solid.contains(&tile)
    }

    /// True when ANY layer holds a solid tile under the world-space point
    /// - points outside the map are not solid; the border tiles are what
    ///   keep sprites inside
    pub fn is_solid_at(&self, x: f32, y: f32) -> bool {
        let column = self.column_at(x);
        let row = self.row_at(y);
        (0..self.layers.len()).any(|layer| {
            self.tile(layer, column, row)
                .map_or(false, |tile| self.is_solid(tile))
        })
    }

    pub fn column_at(&self, x: f32) -> i32 {
        (x / self.tile_size as f32).floor() as i32
    }

    pub fn row_at(&self, y: f32) -> i32 {
        (y / self.tile_size as f32).floor() as i32
    }

    /// Pixel x of a column's left edge
    pub fn tile_x(&self, column: i32) -> f32 {
        (column * self.tile_size) as f32
    }

    /// Pixel y of a row's top edge
    pub fn tile_y(&self, row: i32) -> f32 {
        (row * self.tile_size) as f32
    }

    pub fn pixel_width(&self) -> f32 {
        (self.columns * self.tile_size) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.rows * self.tile_size) as f32
    }

    /// Which tiles the camera can see, plus the partial-tile scroll offsets
    /// - one extra column/row past the viewport extent covers the partial
    ///   tile entering at the right/bottom edge
    /// - the range never reaches outside the map, so callers can draw it
    ///   without further bounds checks
    pub fn visible_tiles(&self, camera: &Camera) -> TileRange {
        let start_column = self.column_at(camera.x);
        let end_column =
            (start_column + (camera.width / self.tile_size as f32) as i32).min(self.columns - 1);
        let start_row = self.row_at(camera.y);
        let end_row =
            (start_row + (camera.height / self.tile_size as f32) as i32).min(self.rows - 1);

        TileRange {
            start_column,
            end_column,
            start_row,
            end_row,
            offset_x: self.tile_x(start_column) - camera.x,
            offset_y: self.tile_y(start_row) - camera.y,
        }
    }
}

use crate::engine::{Point, Rect, Size};
use crate::world::tilemap::TileMap;

/// The player sprite, anchored at its center
/// - pure movement + collision model; the image it is drawn with lives
///   with the game so this stays testable off-browser
pub struct Hero {
    pub position: Point,
    pub size: Size,
}

impl Hero {
    /// walking speed in pixels per second
    pub const SPEED: f32 = 256.0;

    pub fn new(position: Point, size: Size) -> Self {
        Hero { position, size }
    }

    /// Advance one step in direction (dirx, diry), each -1, 0 or 1
    /// - integrate, resolve tile collision, then clamp the center to the
    ///   map (the solid border tiles do the real containment work)
    pub fn move_by(&mut self, dirx: f32, diry: f32, delta: f32, map: &TileMap) {
        self.position.x += dirx * Self::SPEED * delta;
        self.position.y += diry * Self::SPEED * delta;

        self.collide(dirx, diry, map);

        self.position.x = self.position.x.min(map.pixel_width()).max(0.0);
        self.position.y = self.position.y.min(map.pixel_height()).max(0.0);
    }

    /// Sample the four corners of the bounding box and, on a hit, snap the
    /// axis of travel flush against the offending tile edge
    /// - vertical resolution wins when moving diagonally
    fn collide(&mut self, dirx: f32, diry: f32, map: &TileMap) {
        // the box is inclusive of its right/bottom pixel, hence the -1
        let left = self.position.x - self.size.width / 2.0;
        let right = self.position.x + self.size.width / 2.0 - 1.0;
        let top = self.position.y - self.size.height / 2.0;
        let bottom = self.position.y + self.size.height / 2.0 - 1.0;

        let collision = map.is_solid_at(left, top)
            || map.is_solid_at(right, top)
            || map.is_solid_at(right, bottom)
            || map.is_solid_at(left, bottom);
        if !collision {
            return;
        }

        if diry > 0.0 {
            // moving down : bottom edge flush with the top of the tile row
            let row = map.row_at(bottom);
            self.position.y = map.tile_y(row) - self.size.height / 2.0;
        } else if diry < 0.0 {
            // moving up : top edge flush with the bottom of the tile row
            let row = map.row_at(top);
            self.position.y = map.tile_y(row + 1) + self.size.height / 2.0;
        } else if dirx > 0.0 {
            let column = map.column_at(right);
            self.position.x = map.tile_x(column) - self.size.width / 2.0;
        } else if dirx < 0.0 {
            let column = map.column_at(left);
            self.position.x = map.tile_x(column + 1) + self.size.width / 2.0;
        }
    }

    /// World-space bounding box, top-left anchored
    pub fn bounding_box(&self) -> Rect {
        Rect::new(
            Point {
                x: self.position.x - self.size.width / 2.0,
                y: self.position.y - self.size.height / 2.0,
            },
            self.size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tilemap::Level;
    use approx::assert_relative_eq;

    const HERO_SIZE: Size = Size {
        width: 64.0,
        height: 64.0,
    };

    // 6x6 tiles of 64px with a solid (3) border, walkable (1) interior
    fn walled_map() -> TileMap {
        let mut tiles = vec![1; 36];
        for index in 0..36 {
            let column = index % 6;
            let row = index / 6;
            if column == 0 || column == 5 || row == 0 || row == 5 {
                tiles[index] = 3;
            }
        }
        TileMap::from_level(Level {
            columns: 6,
            rows: 6,
            tile_size: 64,
            solid: vec![3],
            layers: vec![tiles],
        })
        .expect("test map should validate")
    }

    fn hero_at(x: f32, y: f32) -> Hero {
        Hero::new(Point { x, y }, HERO_SIZE)
    }

    #[test]
    fn hero_moves_freely_over_walkable_tiles() {
        let map = walled_map();
        let mut hero = hero_at(96.0, 96.0);

        // one step right at 40 px worth of delta
        hero.move_by(1.0, 0.0, 40.0 / Hero::SPEED, &map);

        assert_relative_eq!(hero.position.x, 136.0);
        assert_relative_eq!(hero.position.y, 96.0);
    }

    #[test]
    fn hero_snaps_flush_against_a_wall_on_the_right() {
        let map = walled_map();
        let mut hero = hero_at(96.0, 96.0);

        // 256 px right lands inside the border column at x = 320..383
        hero.move_by(1.0, 0.0, 1.0, &map);

        // left edge of the wall minus half the sprite
        assert_relative_eq!(hero.position.x, 288.0);
        assert_relative_eq!(hero.position.y, 96.0);
    }

    #[test]
    fn hero_snaps_flush_against_a_wall_on_the_left() {
        let map = walled_map();
        let mut hero = hero_at(96.0, 96.0);

        // 64 px left pushes the box into the border column
        hero.move_by(-1.0, 0.0, 64.0 / Hero::SPEED, &map);

        assert_relative_eq!(hero.position.x, 96.0);
    }

    #[test]
    fn hero_snaps_flush_against_floor_and_ceiling() {
        let map = walled_map();

        let mut falling = hero_at(96.0, 96.0);
        falling.move_by(0.0, 1.0, 1.0, &map);
        assert_relative_eq!(falling.position.y, 288.0);

        let mut rising = hero_at(96.0, 96.0);
        rising.move_by(0.0, -1.0, 64.0 / Hero::SPEED, &map);
        assert_relative_eq!(rising.position.y, 96.0);
    }

    #[test]
    fn diagonal_collision_resolves_the_vertical_axis_first() {
        let map = walled_map();
        let mut hero = hero_at(288.0, 288.0);

        // 64 px down-right pushes all four corners into the border corner
        hero.move_by(1.0, 1.0, 64.0 / Hero::SPEED, &map);

        // y snapped back above the wall, x left where the move put it
        assert_relative_eq!(hero.position.y, 288.0);
        assert_relative_eq!(hero.position.x, 352.0);
    }

    #[test]
    fn hero_center_never_leaves_the_map() {
        let map = walled_map();
        let mut hero = hero_at(96.0, 96.0);

        // a step so large every corner samples outside the map, where
        // nothing is solid - the clamp is what stops the hero
        hero.move_by(-1.0, 0.0, 1.0, &map);

        assert_relative_eq!(hero.position.x, 0.0);
    }

    #[test]
    fn bounding_box_is_centered_on_the_position() {
        let hero = hero_at(96.0, 96.0);
        let bounds = hero.bounding_box();

        assert_relative_eq!(bounds.left(), 64.0);
        assert_relative_eq!(bounds.top(), 64.0);
        assert_relative_eq!(bounds.right(), 128.0);
        assert_relative_eq!(bounds.bottom(), 128.0);
    }
}

use crate::engine::{Point, Rect, Size};
use crate::world::tilemap::TileMap;

/// Viewport into the map, in world pixels
/// - follows a target point, clamped so the view never leaves the map
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    max_x: f32,
    max_y: f32,
}

impl Camera {
    pub fn new(map: &TileMap, width: f32, height: f32) -> Self {
        Camera {
            x: 0.0,
            y: 0.0,
            width,
            height,
            max_x: map.pixel_width() - width,
            max_y: map.pixel_height() - height,
        }
    }

    /// Center the view on the target, then clamp each axis to the map
    /// - min before max : a map smaller than the viewport leaves max
    ///   negative, and the camera must pin to 0 in that case
    pub fn center_on(&mut self, target: Point) {
        self.x = (target.x - self.width / 2.0).min(self.max_x).max(0.0);
        self.y = (target.y - self.height / 2.0).min(self.max_y).max(0.0);
    }

    pub fn world_to_screen(&self, point: Point) -> Point {
        Point {
            x: point.x - self.x,
            y: point.y - self.y,
        }
    }

    /// Screen-space rectangle covered by the camera
    pub fn viewport(&self) -> Rect {
        Rect::new(
            Point { x: 0.0, y: 0.0 },
            Size {
                width: self.width,
                height: self.height,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tilemap::Level;
    use approx::assert_relative_eq;

    // 8x8 tiles of 64px -> 512x512 world
    fn test_map() -> TileMap {
        TileMap::from_level(Level {
            columns: 8,
            rows: 8,
            tile_size: 64,
            solid: vec![],
            layers: vec![vec![1; 64]],
        })
        .expect("test map should validate")
    }

    #[test]
    fn camera_centers_on_target_away_from_edges() {
        let map = test_map();
        let mut camera = Camera::new(&map, 256.0, 256.0);

        camera.center_on(Point { x: 256.0, y: 200.0 });

        assert_relative_eq!(camera.x, 128.0);
        assert_relative_eq!(camera.y, 72.0);
    }

    #[test]
    fn camera_clamps_at_top_left() {
        let map = test_map();
        let mut camera = Camera::new(&map, 256.0, 256.0);

        camera.center_on(Point { x: 40.0, y: 10.0 });

        assert_relative_eq!(camera.x, 0.0);
        assert_relative_eq!(camera.y, 0.0);
    }

    #[test]
    fn camera_clamps_at_bottom_right() {
        let map = test_map();
        let mut camera = Camera::new(&map, 256.0, 256.0);

        camera.center_on(Point { x: 500.0, y: 480.0 });

        // max scroll = 512 - 256
        assert_relative_eq!(camera.x, 256.0);
        assert_relative_eq!(camera.y, 256.0);
    }

    #[test]
    fn camera_pins_to_origin_when_map_is_smaller_than_viewport() {
        let map = test_map();
        let mut camera = Camera::new(&map, 1024.0, 1024.0);

        camera.center_on(Point { x: 400.0, y: 400.0 });

        assert_relative_eq!(camera.x, 0.0);
        assert_relative_eq!(camera.y, 0.0);
    }

    #[test]
    fn world_to_screen_subtracts_the_camera_origin() {
        let map = test_map();
        let mut camera = Camera::new(&map, 256.0, 256.0);
        camera.center_on(Point { x: 256.0, y: 256.0 });

        let screen = camera.world_to_screen(Point { x: 256.0, y: 200.0 });

        // centered target lands in the middle of the view
        assert_relative_eq!(screen.x, 128.0);
        assert_relative_eq!(screen.y, 72.0);
    }
}

use crate::browser;
use crate::engine;
#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{Game, KeyState, Point, Rect, Renderer, Size};
use crate::world::tilemap::EMPTY_TILE;
use crate::world::{Camera, Hero, Level, TileMap};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use web_sys::HtmlImageElement;

/// seconds advanced by one fixed update step
const SECONDS_PER_TICK: f32 = engine::FRAME_SIZE / 1000.0;

const HERO_START: Point = Point { x: 160.0, y: 160.0 };
const HERO_SIZE: Size = Size {
    width: 64.0,
    height: 64.0,
};

pub enum TileWalker {
    /// Initial state while resources are being loaded
    /// Transition to `Loaded` once initialization is complete
    Loading,

    /// Active game state with the world assembled
    Loaded(World),
}

pub struct World {
    map: TileMap,
    tileset: HtmlImageElement,
    hero_image: HtmlImageElement,
    hero: Hero,
    camera: Camera,
}

impl TileWalker {
    const LEVEL_PATH: &'static str = "level.json";
    const TILESET_PATH: &'static str = "tiles.png";
    const HERO_PATH: &'static str = "character.png";

    // matches the canvas element size
    const VIEWPORT_WIDTH: f32 = 512.0;
    const VIEWPORT_HEIGHT: f32 = 512.0;

    pub fn new() -> Self {
        TileWalker::Loading
    }

    async fn load_level() -> Result<Level> {
        browser::fetch_json::<Level>(Self::LEVEL_PATH)
            .await
            .with_context(|| format!("Failed to load level from : {}", Self::LEVEL_PATH))
    }

    async fn load_tileset() -> Result<HtmlImageElement> {
        engine::load_image(Self::TILESET_PATH)
            .await
            .with_context(|| format!("Failed to load tileset from : {}", Self::TILESET_PATH))
    }

    async fn load_hero_image() -> Result<HtmlImageElement> {
        engine::load_image(Self::HERO_PATH)
            .await
            .with_context(|| format!("Failed to load hero image from : {}", Self::HERO_PATH))
    }
}

impl Default for TileWalker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Game for TileWalker {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            TileWalker::Loading => {
                // independent resources load simultaneously, total time is
                // the slowest of the three
                let (level_result, tileset_result, hero_result) =
                    join!(Self::load_level(), Self::load_tileset(), Self::load_hero_image());
                let map = TileMap::from_level(level_result?)?;
                let tileset = tileset_result?;
                let hero_image = hero_result?;

                let hero = Hero::new(HERO_START, HERO_SIZE);
                let mut camera = Camera::new(&map, Self::VIEWPORT_WIDTH, Self::VIEWPORT_HEIGHT);
                camera.center_on(hero.position);

                log!(
                    "level loaded : {}x{} tiles, {} layers",
                    map.columns(),
                    map.rows(),
                    map.layer_count()
                );

                Ok(Box::new(TileWalker::Loaded(World {
                    map,
                    tileset,
                    hero_image,
                    hero,
                    camera,
                })))
            }
            TileWalker::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let TileWalker::Loaded(world) = self {
            let mut dirx = 0.0;
            let mut diry = 0.0;
            if keystate.is_pressed("ArrowLeft") {
                dirx -= 1.0;
            }
            if keystate.is_pressed("ArrowRight") {
                dirx += 1.0;
            }
            if keystate.is_pressed("ArrowUp") {
                diry -= 1.0;
            }
            if keystate.is_pressed("ArrowDown") {
                diry += 1.0;
            }

            world.hero.move_by(dirx, diry, SECONDS_PER_TICK, &world.map);
            world.camera.center_on(world.hero.position);
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let TileWalker::Loaded(world) = self {
            renderer.clear(&world.camera.viewport());

            // draw order matters : ground, then the hero, then every
            // overhang layer on top of both
            world.draw_layer(renderer, 0);
            world.draw_hero(renderer);
            for layer in 1..world.map.layer_count() {
                world.draw_layer(renderer, layer);
            }
        }
    }
}

impl World {
    /// Scroll-render one layer : only the tiles the camera can see, the
    /// first column/row shifted partially offscreen by the range offsets
    fn draw_layer(&self, renderer: &Renderer, layer: usize) {
        let tile_size = self.map.tile_size() as f32;
        let range = self.map.visible_tiles(&self.camera);

        for column in range.start_column..=range.end_column {
            for row in range.start_row..=range.end_row {
                let Some(tile) = self.map.tile(layer, column, row) else {
                    continue;
                };
                if tile == EMPTY_TILE {
                    continue;
                }

                // the tileset is a single-row strip with tile id 1 at the
                // origin
                let frame = Rect::new(
                    Point {
                        x: (tile - 1) as f32 * tile_size,
                        y: 0.0,
                    },
                    Size {
                        width: tile_size,
                        height: tile_size,
                    },
                );
                // round to whole pixels so adjacent tiles don't leave seams
                let destination = Rect::new(
                    Point {
                        x: ((column - range.start_column) as f32 * tile_size + range.offset_x)
                            .round(),
                        y: ((row - range.start_row) as f32 * tile_size + range.offset_y).round(),
                    },
                    Size {
                        width: tile_size,
                        height: tile_size,
                    },
                );
                renderer.draw_image(&self.tileset, &frame, &destination);
            }
        }
    }

    fn draw_hero(&self, renderer: &Renderer) {
        let bounds = self.hero.bounding_box();
        let destination = Rect::new(self.camera.world_to_screen(bounds.position), bounds.size);

        renderer.draw_entire_image(&self.hero_image, &destination.position);

        #[cfg(debug_assertions)]
        destination.draw_debug(renderer);
    }
}

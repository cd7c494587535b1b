// The map/camera/hero trio - everything with actual coordinate math.
// game.rs composes these with the loaded images; nothing in here touches
// the DOM, so the whole module tests off-browser.

pub mod camera;
pub mod hero;
pub mod tilemap;

pub use camera::Camera;
pub use hero::Hero;
pub use tilemap::{Level, TileMap};

use wasm_bindgen::prelude::*;

#[macro_use]
mod browser;
mod engine;
mod game;
mod world;

use engine::GameLoop;
use game::TileWalker;

/// Main entry for the Webassembly module
/// - installs the panic hook
/// - hands the game to the loop on a local async task
#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    browser::spawn_local(async move {
        let game = TileWalker::new();

        GameLoop::start(game)
            .await
            .expect("Could not start game loop");
    });

    Ok(())
}

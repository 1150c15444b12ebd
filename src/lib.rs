// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod sprite;

use crate::config::GameConfig;
use crate::engine::{GameLoop, Point, Renderer};
use crate::game::CrackerChase;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - reads the optional config object
/// - loads every resource
/// - shows the start screen, G starts a run
#[wasm_bindgen]
pub fn main_js(config: JsValue) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let config = GameConfig::from_js(config)
        .map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(CrackerChase::new(config)).await {
            error!("Cracker Chase could not start : {:#?}", err);
            show_failure(&err);
        }
    });

    Ok(())
}

/// A start screen never appears after a failed load, say why on the canvas
fn show_failure(err: &anyhow::Error) {
    let context = match browser::context() {
        Ok(context) => context,
        Err(_) => return,
    };
    let renderer = Renderer::new(context);
    renderer.set_font("20px Arial");
    renderer.set_fill_style("red");
    renderer.fill_text(
        &format!("Could not start : {}", err),
        &Point { x: 10.0, y: 30.0 },
    );
}

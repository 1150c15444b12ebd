//! Browser only, run with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use cracker_chase::config::{Assets, GameConfig};
use cracker_chase::engine::{load_audio, load_image, Game};
use cracker_chase::game::CrackerChase;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// 1x1 transparent gif, loads without a server
const PIXEL: &str = "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

fn mount_canvas() {
    let body = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
        .unwrap();
    body.set_inner_html(r#"<canvas id="canvas" width="800" height="600"></canvas>"#);
}

#[wasm_bindgen_test]
async fn missing_image_is_a_load_error() {
    let err = load_image("no-such-cheese.png").await.unwrap_err();
    assert!(format!("{:#}", err).contains("no-such-cheese.png"));
}

#[wasm_bindgen_test]
async fn missing_sound_is_a_load_error() {
    let err = load_audio("sounds/no-such-burp.wav").await.unwrap_err();
    assert!(format!("{:#}", err).contains("no-such-burp.wav"));
}

#[wasm_bindgen_test]
fn undefined_config_means_defaults() {
    let config = GameConfig::from_js(JsValue::UNDEFINED).unwrap();
    assert_eq!(config, GameConfig::default());
}

#[wasm_bindgen_test]
fn js_config_overrides_only_given_fields() {
    let value = js_sys::JSON::parse(r#"{ "cracker_count": 3, "seed": 9 }"#).unwrap();
    let config = GameConfig::from_js(value).unwrap();
    assert_eq!(config.cracker_count, 3);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.tomato_count, 5);
}

#[wasm_bindgen_test]
fn malformed_config_is_rejected() {
    let value = js_sys::JSON::parse(r#"{ "cracker_count": "lots" }"#).unwrap();
    assert!(GameConfig::from_js(value).is_err());
}

#[wasm_bindgen_test]
async fn one_missing_sound_fails_initialize() {
    mount_canvas();
    let config = GameConfig {
        cracker_count: 2,
        tomato_count: 1,
        assets: Assets {
            background: PIXEL.to_string(),
            cheese: PIXEL.to_string(),
            cracker: PIXEL.to_string(),
            tomato: PIXEL.to_string(),
            burp: "sounds/missing.wav".to_string(),
        },
        ..GameConfig::default()
    };

    let err = match CrackerChase::new(config).initialize().await {
        Ok(_) => panic!("initialize succeeded without its sound"),
        Err(err) => err,
    };
    assert!(format!("{:#}", err).contains("sounds/missing.wav"));
}

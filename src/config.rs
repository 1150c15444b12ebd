use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

/// Tunables for a session, every field falls back to the classic game
///
/// From JS any subset may be passed :
/// ```js
/// main_js({ tomato_count: 8, seed: 42 })
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub cracker_count: usize,
    pub tomato_count: usize,
    /// frames before the first tomato enters
    pub first_entry_delay: u32,
    /// extra frames for every following tomato
    pub entry_delay_step: u32,
    pub cheese_speed: f64,
    pub acceleration: f64,
    /// added to a tomato's acceleration per frame of entry delay, late
    /// tomatoes are faster
    pub acceleration_ramp: f64,
    pub friction: f64,
    pub cracker_reward: u32,
    /// fixed seed for repeatable cracker placement, entropy otherwise
    pub seed: Option<u64>,
    pub assets: Assets,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            cracker_count: 30,
            tomato_count: 5,
            first_entry_delay: 300,
            entry_delay_step: 600,
            cheese_speed: 5.0,
            acceleration: 0.1,
            acceleration_ramp: 0.0001,
            friction: 0.99,
            cracker_reward: 10,
            seed: None,
            assets: Assets::default(),
        }
    }
}

/// Locations of every image/audio resource, relative to the page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Assets {
    pub background: String,
    pub cheese: String,
    pub cracker: String,
    pub tomato: String,
    pub burp: String,
}

impl Default for Assets {
    fn default() -> Self {
        Assets {
            background: "picnic.jpeg".to_string(),
            cheese: "cheese.png".to_string(),
            cracker: "cracker.png".to_string(),
            tomato: "tomato.png".to_string(),
            burp: "sounds/burp.wav".to_string(),
        }
    }
}

impl GameConfig {
    /// `undefined` / `null` means defaults
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(GameConfig::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| anyhow!("Invalid game config : {}", err))
    }

    /// Entry delay of the `index`th tomato
    pub fn entry_delay(&self, index: usize) -> u32 {
        let step = self.entry_delay_step.saturating_mul(index as u32);
        self.first_entry_delay.saturating_add(step)
    }

    pub fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_game() {
        let config = GameConfig::default();
        assert_eq!(config.cracker_count, 30);
        assert_eq!(config.tomato_count, 5);
        assert_eq!(config.cracker_reward, 10);
        assert_eq!(config.assets.burp, "sounds/burp.wav");
    }

    #[test]
    fn entry_delays_are_staggered() {
        let config = GameConfig::default();
        let delays: Vec<u32> = (0..5).map(|i| config.entry_delay(i)).collect();
        assert_eq!(delays, vec![300, 900, 1500, 2100, 2700]);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "tomato_count": 2, "assets": { "cheese": "brie.png" } }"#)
                .unwrap();
        assert_eq!(config.tomato_count, 2);
        assert_eq!(config.cracker_count, 30);
        assert_eq!(config.assets.cheese, "brie.png");
        assert_eq!(config.assets.tomato, "tomato.png");
    }

    #[test]
    fn seeded_rng_is_repeatable() {
        let config = GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        };
        let (mut a, mut b) = (config.rng(), config.rng());
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

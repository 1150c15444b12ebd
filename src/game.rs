use crate::browser;
use crate::config::GameConfig;
use crate::engine::input::KeyState;
use crate::engine::{self, Game, Point, Renderer, Size, Sound};
use crate::sprite::state::Pursuit;
use crate::sprite::{Background, Cheese, Cracker, Sprite, Tomato};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::try_join;
use rand::RngCore;

/// TABLE
/// ┌──────────────────────── Cracker Chase Overview ─────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐  update   ┌──────────────┐  update   ┌───────────┐   │
/// │    │  engine.rs  ├──────────►│ CrackerChase ├──────────►│   Chase   │   │
/// │    │  GameLoop   │  draw     │  (Loading /  │  draw     │  sprites  │   │
/// │    │             ├──────────►│   Loaded)    ├──────────►│  score    │   │
/// │    └─────────────┘           └──────────────┘           └─────┬─────┘   │
/// │                                                               │         │
/// ├──────────────────────── Per Frame Update Order ───────────────┴─────────┤
/// │  1. Background : nothing                                                │
/// │  2. Crackers   : touched by the cheese? score + move + burp             │
/// │  3. Cheese     : key edges -> velocity -> clamped position              │
/// │  4. Tomatoes   : count frames, chase once entered, catch -> game over   │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum CrackerChase {
    /// Resources are still loading, nothing to update or draw
    Loading(GameConfig),

    /// Every image and sound is ready
    Loaded(Chase),
}

impl CrackerChase {
    const START_KEY: &'static str = "KeyG";

    pub fn new(config: GameConfig) -> Self {
        CrackerChase::Loading(config)
    }
}

#[async_trait(?Send)]
impl Game for CrackerChase {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            CrackerChase::Loading(config) => {
                let canvas = browser::canvas()?;
                let canvas_size = Size {
                    width: canvas.width().into(),
                    height: canvas.height().into(),
                };
                let mut chase = Chase::new(config, canvas_size, config.rng());
                chase.load_resources(&config.assets.burp).await?;
                log!("Cracker Chase : {} sprites loaded", chase.sprites.count());
                Ok(Box::new(CrackerChase::Loaded(chase)))
            }
            CrackerChase::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let CrackerChase::Loaded(chase) = self {
            let was_running = chase.is_running();
            chase.update(keystate);
            if was_running && !chase.is_running() {
                log!(
                    "Game over, score {} high score {}",
                    chase.score(),
                    chase.high_score().unwrap_or_default()
                );
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let CrackerChase::Loaded(chase) = self {
            chase.draw(renderer);
        }
    }

    fn draw_start_screen(&self, renderer: &Renderer) {
        if let CrackerChase::Loaded(chase) = self {
            chase.draw_start_screen(renderer);
        }
    }

    fn is_running(&self) -> bool {
        matches!(self, CrackerChase::Loaded(chase) if chase.is_running())
    }

    fn is_start_key(&self, code: &str) -> bool {
        code == Self::START_KEY
    }

    fn run(&mut self) {
        if let CrackerChase::Loaded(chase) = self {
            chase.run();
            log!("Run started");
        }
    }
}

/// Every sprite, kept by kind so each can be updated with what it needs
/// - collection order : background, crackers, cheese, tomatoes
pub struct Sprites {
    background: Background,
    crackers: Vec<Cracker>,
    cheese: Cheese,
    tomatoes: Vec<Tomato>,
}

impl Sprites {
    fn new(config: &GameConfig, canvas: Size) -> Self {
        let assets = &config.assets;
        Sprites {
            background: Background::new(assets.background.as_str(), canvas),
            crackers: (0..config.cracker_count)
                .map(|_| Cracker::new(assets.cracker.as_str(), canvas))
                .collect(),
            cheese: Cheese::new(assets.cheese.as_str(), canvas, config.cheese_speed),
            tomatoes: (0..config.tomato_count)
                .map(|index| {
                    let entry_delay = config.entry_delay(index);
                    let pursuit = Pursuit {
                        acceleration: config.acceleration
                            + f64::from(entry_delay) * config.acceleration_ramp,
                        friction: config.friction,
                    };
                    Tomato::new(assets.tomato.as_str(), canvas, entry_delay, pursuit)
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Sprite> {
        std::iter::once(&self.background as &dyn Sprite)
            .chain(self.crackers.iter().map(|cracker| cracker as &dyn Sprite))
            .chain(std::iter::once(&self.cheese as &dyn Sprite))
            .chain(self.tomatoes.iter().map(|tomato| tomato as &dyn Sprite))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn Sprite> {
        std::iter::once(&mut self.background as &mut dyn Sprite)
            .chain(self.crackers.iter_mut().map(|cracker| cracker as &mut dyn Sprite))
            .chain(std::iter::once(&mut self.cheese as &mut dyn Sprite))
            .chain(self.tomatoes.iter_mut().map(|tomato| tomato as &mut dyn Sprite))
    }

    pub fn count(&self) -> usize {
        2 + self.crackers.len() + self.tomatoes.len()
    }
}

mod text {
    pub const TITLE_FONT: &str = "50px Arial";
    pub const FONT: &str = "40px Arial";
    pub const SHADOW: &str = "black";
    pub const COLOR: &str = "red";
    pub const SHADOW_OFFSET: f64 = 2.0;
}

/// A loaded session, score and high score live here across runs
pub struct Chase {
    canvas: Size,
    sprites: Sprites,
    score: u32,
    high_score: Option<u32>,
    running: bool,
    reward: u32,
    rng: Box<dyn RngCore>,
}

impl Chase {
    pub fn new(config: &GameConfig, canvas: Size, rng: Box<dyn RngCore>) -> Self {
        let mut chase = Chase {
            canvas,
            sprites: Sprites::new(config, canvas),
            score: 0,
            high_score: None,
            running: false,
            reward: config.cracker_reward,
            rng,
        };
        chase.reset();
        chase
    }

    /// Loads every sprite and the one burp clip concurrently, the first
    /// failure fails them all
    async fn load_resources(&mut self, burp: &str) -> Result<()> {
        let burp = async {
            engine::load_audio(burp)
                .await
                .with_context(|| format!("Failed to load cracker sound from : {}", burp))
        };
        let (_, burp) = try_join!(
            try_join_all(self.sprites.iter_mut().map(|sprite| sprite.load())),
            burp
        )?;

        let burp = Sound::new(burp);
        for cracker in self.sprites.crackers.iter_mut() {
            cracker.set_sound(burp.clone());
        }
        Ok(())
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// `None` until the first run ends
    pub fn high_score(&self) -> Option<u32> {
        self.high_score
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn reset(&mut self) {
        for sprite in self.sprites.iter_mut() {
            sprite.reset(self.rng.as_mut());
        }
        self.score = 0;
    }

    pub fn run(&mut self) {
        self.reset();
        self.running = true;
    }

    pub fn end(&mut self) {
        self.running = false;
        self.high_score = Some(match self.high_score {
            Some(high_score) => high_score.max(self.score),
            None => self.score,
        });
    }

    pub fn update(&mut self, keystate: &KeyState) {
        let Sprites {
            crackers,
            cheese,
            tomatoes,
            ..
        } = &mut self.sprites;

        for cracker in crackers.iter_mut() {
            if cracker.update(&*cheese, self.rng.as_mut()) {
                self.score = self.score.saturating_add(self.reward);
            }
        }

        cheese.update(keystate);

        // every tomato still moves on the frame the cheese is caught
        let mut caught = false;
        for tomato in tomatoes.iter_mut() {
            caught |= tomato.update(&*cheese);
        }
        if caught {
            self.end();
        }
    }

    pub fn draw(&self, renderer: &Renderer) {
        for sprite in self.sprites.iter() {
            sprite.draw(renderer);
        }

        renderer.set_font(text::FONT);
        renderer.set_fill_style(text::COLOR);
        renderer.fill_text(
            &format!("Score: {}", self.score),
            &Point { x: 10.0, y: 40.0 },
        );
    }

    pub fn draw_start_screen(&self, renderer: &Renderer) {
        self.sprites.background.draw(renderer);

        renderer.set_font(text::TITLE_FONT);
        self.display_message(renderer, "Cracker Chase", 70.0);

        renderer.set_font(text::FONT);
        // a high score exists once a run has ended
        if let Some(high_score) = self.high_score {
            self.display_message(renderer, &format!("High score: {}", high_score), 110.0);
            self.display_message(renderer, &format!("Your score: {}", self.score), 150.0);
        }

        self.display_message(renderer, "Welcome to Cracker Chase", 240.0);
        self.display_message(renderer, "Steer the cheese to capture the crackers", 280.0);
        self.display_message(renderer, "BEWARE THE KILLER TOMATOES", 320.0);
        self.display_message(renderer, "Arrow keys to move", 470.0);
        self.display_message(renderer, "Press G to play", 520.0);
    }

    /// Centered horizontally, red over a black drop shadow
    fn display_message(&self, renderer: &Renderer, message: &str, y: f64) {
        let x = (self.canvas.width - renderer.measure_text_width(message)) / 2.0;

        renderer.set_fill_style(text::SHADOW);
        renderer.fill_text(message, &Point { x, y });

        renderer.set_fill_style(text::COLOR);
        renderer.fill_text(
            message,
            &Point {
                x: x + text::SHADOW_OFFSET,
                y: y + text::SHADOW_OFFSET,
            },
        );
    }
}

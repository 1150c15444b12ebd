use crate::engine::{Point, Size, Sound};
use crate::sprite::{Body, Sprite};
use rand::{Rng, RngCore};

/// Draws before a cheese that covers nearly every spot gets to keep the
/// cracker where the last draw put it
const MAX_DRAWS: usize = 100;

/// Collectible, every touch by the cheese scores and sends it somewhere
/// new with a burp
pub struct Cracker {
    body: Body,
    sound: Option<Sound>,
    canvas: Size,
}

impl Cracker {
    pub fn new(source: impl Into<String>, canvas: Size) -> Self {
        Cracker {
            body: Body::new(
                source,
                Size {
                    width: canvas.width / 20.0,
                    height: canvas.height / 20.0,
                },
            ),
            sound: None,
            canvas,
        }
    }

    /// The burp, shared by every cracker
    pub fn set_sound(&mut self, sound: Sound) {
        self.sound = Some(sound);
    }

    /// Returns true when the cheese grabbed this cracker, it has already
    /// moved somewhere clear of the cheese by the time this returns
    pub fn update(&mut self, cheese: &dyn Sprite, rng: &mut dyn RngCore) -> bool {
        if !self.intersects_with(cheese) {
            return false;
        }
        self.relocate(cheese, rng);
        if let Some(sound) = &self.sound {
            sound.play();
        }
        true
    }

    // redraw until clear, uniform over the spots that miss the cheese
    fn relocate(&mut self, cheese: &dyn Sprite, rng: &mut dyn RngCore) {
        for _ in 0..MAX_DRAWS {
            self.reset(rng);
            if !self.intersects_with(cheese) {
                return;
            }
        }
    }

    // whole pixels only, floor keeps the far edge on the canvas
    fn max_position(&self) -> (u32, u32) {
        let x = (self.canvas.width - self.body.size.width).floor().max(0.0);
        let y = (self.canvas.height - self.body.size.height).floor().max(0.0);
        (x as u32, y as u32)
    }
}

impl Sprite for Cracker {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Anywhere the cracker fits entirely on the canvas
    fn reset(&mut self, rng: &mut dyn RngCore) {
        let (max_x, max_y) = self.max_position();
        self.body.position = Point {
            x: rng.gen_range(0..=max_x) as f64,
            y: rng.gen_range(0..=max_y) as f64,
        };
    }
}

use crate::engine::input::{KeyPress, KeyState};
use crate::engine::{Point, Size};
use crate::sprite::{Body, Sprite};
use rand::RngCore;

mod keys {
    pub const UP: &str = "ArrowUp";
    pub const DOWN: &str = "ArrowDown";
    pub const LEFT: &str = "ArrowLeft";
    pub const RIGHT: &str = "ArrowRight";

    pub const ARROWS: [&str; 4] = [LEFT, RIGHT, UP, DOWN];
}

/// The player
/// - a key down sets its axis to ±speed, a key up zeros the axis
/// - opposite keys are independent, releasing one stops the axis even if
///   the other is still held
/// - arrows already held when a run starts count as fresh key downs
pub struct Cheese {
    body: Body,
    velocity: Point,
    speed: f64,
    canvas: Size,
    restarted: bool,
}

impl Cheese {
    pub fn new(source: impl Into<String>, canvas: Size, speed: f64) -> Self {
        let side = canvas.width / 15.0;
        Cheese {
            body: Body::new(
                source,
                Size {
                    width: side,
                    height: side,
                },
            ),
            velocity: Point::default(),
            speed,
            canvas,
            restarted: false,
        }
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// ::update per frame
    /// - key edges -> velocity
    /// - velocity -> position, stopped at the canvas edges
    pub fn update(&mut self, keystate: &KeyState) {
        if std::mem::take(&mut self.restarted) {
            for code in keys::ARROWS {
                if keystate.is_pressed(code) {
                    self.steer(&KeyPress::KeyDown(code.to_string()));
                }
            }
        }
        for press in keystate.transitions() {
            self.steer(press);
        }

        let position = &mut self.body.position;
        position.x += self.velocity.x;
        position.y += self.velocity.y;

        // clamp without touching velocity, holding a key into a wall keeps
        // pushing but never moves past it
        let size = self.body.size;
        if position.x < 0.0 {
            position.x = 0.0;
        }
        if position.x + size.width > self.canvas.width {
            position.x = self.canvas.width - size.width;
        }
        if position.y < 0.0 {
            position.y = 0.0;
        }
        if position.y + size.height > self.canvas.height {
            position.y = self.canvas.height - size.height;
        }
    }

    fn steer(&mut self, press: &KeyPress) {
        match press {
            KeyPress::KeyDown(code) => match code.as_str() {
                keys::LEFT => self.velocity.x = -self.speed,
                keys::RIGHT => self.velocity.x = self.speed,
                keys::UP => self.velocity.y = -self.speed,
                keys::DOWN => self.velocity.y = self.speed,
                _ => {}
            },
            KeyPress::KeyUp(code) => match code.as_str() {
                keys::LEFT | keys::RIGHT => self.velocity.x = 0.0,
                keys::UP | keys::DOWN => self.velocity.y = 0.0,
                _ => {}
            },
        }
    }
}

impl Sprite for Cheese {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Centered and at rest, nothing carries over from the last run
    fn reset(&mut self, _rng: &mut dyn RngCore) {
        self.body.position = Point {
            x: (self.canvas.width - self.body.size.width) / 2.0,
            y: (self.canvas.height - self.body.size.height) / 2.0,
        };
        self.velocity = Point::default();
        self.restarted = true;
    }
}

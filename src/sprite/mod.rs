// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                           Sprite Family                                  │
// ├───────────────┬──────────────────────────────────────────────────────────┤
// │ mod.rs        │ Body (image + box) shared by value, Sprite trait,        │
// │               │ Background                                               │
// │ cheese.rs     │ player, steered by arrow keys, clamped to the canvas     │
// │ cracker.rs    │ collectible, jumps somewhere random when touched         │
// │ tomato.rs     │ chaser, Dormant → Active state machine                   │
// │ state.rs      │ tomato typestates + context (velocity, entry count)      │
// └───────────────┴──────────────────────────────────────────────────────────┘
pub mod cheese;
pub mod cracker;
pub mod state;
pub mod tomato;

pub use self::cheese::Cheese;
pub use self::cracker::Cracker;
pub use self::tomato::Tomato;

#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{self, Point, Rect, Renderer, Size};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngCore;
use web_sys::HtmlImageElement;

/// Position, size and image every sprite carries
/// - `image` stays `None` until `load_image` resolves, drawing skips it
pub struct Body {
    source: String,
    image: Option<HtmlImageElement>,
    pub position: Point,
    pub size: Size,
}

impl Body {
    pub fn new(source: impl Into<String>, size: Size) -> Self {
        Body {
            source: source.into(),
            image: None,
            position: Point::default(),
            size,
        }
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub async fn load_image(&mut self) -> Result<()> {
        let image = engine::load_image(&self.source)
            .await
            .with_context(|| format!("Failed to load sprite image from : {}", self.source))?;
        self.image = Some(image);
        Ok(())
    }

    pub fn draw(&self, renderer: &Renderer) {
        if let Some(image) = &self.image {
            renderer.draw_entire_image(image, &self.bounding_box());
        }
    }
}

/// Shared contract of everything in the sprite collection
///
/// Per frame `update` differs by what each sprite reacts to, so it lives on
/// the concrete types and the game calls it in collection order.
#[async_trait(?Send)]
pub trait Sprite {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Back to the start of a run, the origin unless overridden
    fn reset(&mut self, _rng: &mut dyn RngCore) {
        self.body_mut().position = Point::default();
    }

    async fn load(&mut self) -> Result<()> {
        self.body_mut().load_image().await
    }

    fn draw(&self, renderer: &Renderer) {
        self.body().draw(renderer);

        #[cfg(debug_assertions)]
        {
            self.bounding_box().draw_debug(renderer);
        }
    }

    fn bounding_box(&self) -> Rect {
        self.body().bounding_box()
    }

    fn intersects_with(&self, other: &dyn Sprite) -> bool {
        self.bounding_box().intersects(&other.bounding_box())
    }
}

/// Fills the canvas, no behaviour
pub struct Background {
    body: Body,
}

impl Background {
    pub fn new(source: impl Into<String>, canvas: Size) -> Self {
        Background {
            body: Body::new(source, canvas),
        }
    }
}

impl Sprite for Background {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn draw(&self, renderer: &Renderer) {
        self.body.draw(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    const CANVAS: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn background_covers_the_canvas_from_the_origin() {
        let mut background = Background::new("picnic.jpeg", CANVAS);
        background.body_mut().position = Point { x: 12.0, y: 3.0 };
        background.reset(&mut StepRng::new(0, 1));

        assert_eq!(
            background.bounding_box(),
            Rect::new(Point::default(), CANVAS)
        );
    }

    #[test]
    fn sprites_intersect_through_their_bodies() {
        let background = Background::new("picnic.jpeg", CANVAS);
        let mut far = Background::new("picnic.jpeg", Size { width: 1.0, height: 1.0 });
        far.body_mut().position = Point { x: 900.0, y: 10.0 };

        assert!(!background.intersects_with(&far));
        far.body_mut().position.x = 800.0;
        assert!(background.intersects_with(&far));
        assert!(far.intersects_with(&background));
    }
}

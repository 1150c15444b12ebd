use crate::engine::{Point, Size};
use crate::sprite::state::{Active, Dormant, IsEntering, Pursuit, TomatoContext, TomatoState};
use crate::sprite::{Body, Sprite};
use rand::RngCore;

#[derive(Debug, Copy, Clone)]
enum TomatoStateMachine {
    Dormant(TomatoState<Dormant>),
    Active(TomatoState<Active>),
}

impl From<TomatoState<Dormant>> for TomatoStateMachine {
    fn from(state: TomatoState<Dormant>) -> Self {
        TomatoStateMachine::Dormant(state)
    }
}

impl From<TomatoState<Active>> for TomatoStateMachine {
    fn from(state: TomatoState<Active>) -> Self {
        TomatoStateMachine::Active(state)
    }
}

impl TomatoStateMachine {
    /// Consumes the current state, an entering tomato takes its first step
    /// on the same frame
    fn update(self, entry_delay: u32, target: Point, pursuit: &Pursuit) -> Self {
        match self {
            TomatoStateMachine::Dormant(state) => match state.update(entry_delay) {
                IsEntering::Waiting(state) => state.into(),
                IsEntering::Entered(state) => state.chase(target, pursuit).into(),
            },
            TomatoStateMachine::Active(state) => state.update(target, pursuit).into(),
        }
    }

    fn context(&self) -> &TomatoContext {
        match self {
            TomatoStateMachine::Dormant(state) => state.context(),
            TomatoStateMachine::Active(state) => state.context(),
        }
    }
}

/// The chaser, parked just outside the top left corner until its entry
/// delay has passed
pub struct Tomato {
    body: Body,
    state: TomatoStateMachine,
    entry_delay: u32,
    pursuit: Pursuit,
}

impl Tomato {
    pub fn new(source: impl Into<String>, canvas: Size, entry_delay: u32, pursuit: Pursuit) -> Self {
        let side = canvas.width / 12.0;
        let size = Size {
            width: side,
            height: side,
        };
        let body = Body::new(source, size);
        Tomato {
            state: TomatoState::new(Self::start_position(size)).into(),
            body,
            entry_delay,
            pursuit,
        }
    }

    fn start_position(size: Size) -> Point {
        Point {
            x: -size.width,
            y: -size.height,
        }
    }

    /// Returns true when the tomato caught the cheese this frame
    pub fn update(&mut self, cheese: &dyn Sprite) -> bool {
        let target = cheese.body().position;
        self.state = self.state.update(self.entry_delay, target, &self.pursuit);
        self.body.position = self.state.context().position;

        self.is_active() && self.intersects_with(cheese)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TomatoStateMachine::Active(_))
    }

    pub fn entry_count(&self) -> u32 {
        self.state.context().entry_count
    }

    pub fn entry_delay(&self) -> u32 {
        self.entry_delay
    }

    pub fn velocity(&self) -> Point {
        self.state.context().velocity
    }

    pub fn pursuit(&self) -> &Pursuit {
        &self.pursuit
    }
}

impl Sprite for Tomato {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn reset(&mut self, _rng: &mut dyn RngCore) {
        let position = Self::start_position(self.body.size);
        self.state = TomatoState::new(position).into();
        self.body.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::Cheese;
    use rand::rngs::mock::StepRng;

    const CANVAS: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    const PURSUIT: Pursuit = Pursuit {
        acceleration: 0.13,
        friction: 0.99,
    };

    fn centered_cheese() -> Cheese {
        let mut cheese = Cheese::new("cheese.png", CANVAS, 5.0);
        cheese.reset(&mut StepRng::new(0, 1));
        cheese
    }

    fn tomato(entry_delay: u32) -> Tomato {
        let mut tomato = Tomato::new("tomato.png", CANVAS, entry_delay, PURSUIT);
        tomato.reset(&mut StepRng::new(0, 1));
        tomato
    }

    #[test]
    fn reset_parks_the_tomato_off_canvas() {
        let tomato = tomato(300);
        let side = 800.0 / 12.0;
        assert_eq!(tomato.body().position, Point { x: -side, y: -side });
        assert_eq!(tomato.velocity(), Point::default());
        assert_eq!(tomato.entry_count(), 0);
        assert!(!tomato.is_active());
    }

    #[test]
    fn dormant_tomato_counts_frames_without_moving() {
        let cheese = centered_cheese();
        let mut tomato = tomato(300);
        let parked = tomato.body().position;

        for frame in 1..300 {
            assert!(!tomato.update(&cheese));
            assert_eq!(tomato.entry_count(), frame);
            assert_eq!(tomato.body().position, parked);
        }
        assert!(!tomato.is_active());

        tomato.update(&cheese);

        assert!(tomato.is_active());
        assert_ne!(tomato.body().position, parked);
        assert!(tomato.velocity().x > 0.0);
        assert!(tomato.velocity().y > 0.0);
    }

    #[test]
    fn active_tomato_closes_in_on_the_cheese() {
        let cheese = centered_cheese();
        let mut tomato = tomato(0);
        let start = tomato.body().position;

        for _ in 0..60 {
            tomato.update(&cheese);
        }

        let now = tomato.body().position;
        assert!(now.x > start.x && now.y > start.y);
    }

    #[test]
    fn touching_the_cheese_while_active_is_a_catch() {
        let mut cheese = centered_cheese();
        cheese.body_mut().position = Point::default();
        let mut tomato = tomato(0);

        // parked corner touches the cheese at the origin after one step
        assert!(tomato.update(&cheese));
    }

    #[test]
    fn dormant_tomato_never_catches() {
        let mut cheese = centered_cheese();
        let mut tomato = tomato(10);
        // park the cheese right on top of the waiting tomato
        cheese.body_mut().position = tomato.body().position;

        assert!(!tomato.update(&cheese));
    }

    #[test]
    fn reset_returns_an_active_tomato_to_dormant() {
        let cheese = centered_cheese();
        let mut tomato = tomato(0);
        tomato.update(&cheese);
        tomato.update(&cheese);
        assert!(tomato.is_active());

        tomato.reset(&mut StepRng::new(0, 1));

        assert!(!tomato.is_active());
        assert_eq!(tomato.entry_count(), 0);
        assert_eq!(tomato.velocity(), Point::default());
    }
}

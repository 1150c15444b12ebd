//! Tomato typestates, transitions are only reachable through these methods :
//! - PUBLIC  : TomatoState, TomatoContext, IsEntering
//! - PRIVATE : the context fields can only change via the state methods
//!
//! ┌──────────── Tomato Lifecycle ────────────┐
//! │  Dormant ──(entry_count ≥ delay)─► Active │
//! │     ▲                                │    │
//! │     └──────────── reset() ◄──────────┘    │
//! └───────────────────────────────────────────┘
use crate::engine::Point;

/// Off stage, counting frames
#[derive(Debug, Copy, Clone)]
pub struct Dormant;

/// Chasing the cheese
#[derive(Debug, Copy, Clone)]
pub struct Active;

/// How hard a tomato chases
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pursuit {
    pub acceleration: f64,
    pub friction: f64,
}

pub enum IsEntering {
    Waiting(TomatoState<Dormant>),
    Entered(TomatoState<Active>),
}

#[derive(Debug, Copy, Clone)]
/// Shared data for :
/// - physics : position + velocity
/// - entry   : frames seen since reset
pub struct TomatoContext {
    pub position: Point,
    pub velocity: Point,
    pub entry_count: u32,
}

#[derive(Debug, Copy, Clone)]
pub struct TomatoState<S> {
    context: TomatoContext,
    // type-level tag only, never read
    _state: S,
}

impl<S> TomatoState<S> {
    pub fn context(&self) -> &TomatoContext {
        &self.context
    }
}

impl TomatoState<Dormant> {
    pub fn new(position: Point) -> Self {
        TomatoState {
            context: TomatoContext {
                position,
                velocity: Point::default(),
                entry_count: 0,
            },
            _state: Dormant,
        }
    }

    /// Counts the frame, entering once the count reaches `entry_delay`
    pub fn update(mut self, entry_delay: u32) -> IsEntering {
        self.context = self.context.tick();
        if self.context.entry_count < entry_delay {
            IsEntering::Waiting(self)
        } else {
            IsEntering::Entered(self.enter())
        }
    }

    fn enter(self) -> TomatoState<Active> {
        TomatoState {
            context: self.context,
            _state: Active,
        }
    }
}

impl TomatoState<Active> {
    pub fn update(mut self, target: Point, pursuit: &Pursuit) -> Self {
        self.context = self.context.tick();
        self.chase(target, pursuit)
    }

    /// One step toward `target` without counting a frame, used on the frame
    /// the tomato enters
    pub fn chase(mut self, target: Point, pursuit: &Pursuit) -> Self {
        self.context = self.context.chase(target, pursuit);
        self
    }
}

impl TomatoContext {
    fn tick(mut self) -> Self {
        self.entry_count = self.entry_count.saturating_add(1);
        self
    }

    /// ::chase
    /// - accelerate toward target on each axis
    /// - damp by friction
    /// - velocity -> position, no clamp, tomatoes may overshoot the canvas
    fn chase(mut self, target: Point, pursuit: &Pursuit) -> Self {
        self.velocity.x += toward(self.position.x, target.x, pursuit.acceleration);
        self.velocity.y += toward(self.position.y, target.y, pursuit.acceleration);

        self.velocity.x *= pursuit.friction;
        self.velocity.y *= pursuit.friction;

        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self
    }
}

// ties go negative
fn toward(from: f64, to: f64, acceleration: f64) -> f64 {
    if to > from {
        acceleration
    } else {
        -acceleration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PURSUIT: Pursuit = Pursuit {
        acceleration: 0.1,
        friction: 0.99,
    };

    #[test]
    fn dormant_waits_until_delay_is_reached() {
        let mut state = TomatoState::new(Point { x: -10.0, y: -10.0 });
        for frame in 1..3 {
            state = match state.update(3) {
                IsEntering::Waiting(state) => state,
                IsEntering::Entered(_) => panic!("entered early on frame {}", frame),
            };
            assert_eq!(state.context().entry_count, frame);
        }
        assert!(matches!(state.update(3), IsEntering::Entered(_)));
    }

    #[test]
    fn zero_delay_enters_on_first_update() {
        let state = TomatoState::new(Point::default());
        assert!(matches!(state.update(0), IsEntering::Entered(_)));
    }

    #[test]
    fn chase_accelerates_toward_target_with_friction() {
        let state = match TomatoState::new(Point::default()).update(0) {
            IsEntering::Entered(state) => state,
            IsEntering::Waiting(_) => panic!("expected to enter"),
        };

        let state = state.chase(Point { x: 100.0, y: -100.0 }, &PURSUIT);

        let context = state.context();
        assert_relative_eq!(context.velocity.x, 0.099);
        assert_relative_eq!(context.velocity.y, -0.099);
        assert_relative_eq!(context.position.x, 0.099);
        assert_relative_eq!(context.position.y, -0.099);
        // chase alone does not count a frame
        assert_eq!(context.entry_count, 1);
    }

    #[test]
    fn active_update_counts_and_keeps_accumulating() {
        let state = match TomatoState::new(Point::default()).update(0) {
            IsEntering::Entered(state) => state,
            IsEntering::Waiting(_) => panic!("expected to enter"),
        };
        let target = Point { x: 50.0, y: 50.0 };

        let state = state.update(target, &PURSUIT).update(target, &PURSUIT);

        let context = state.context();
        assert_eq!(context.entry_count, 3);
        assert_relative_eq!(context.velocity.x, (0.1 * 0.99 + 0.1) * 0.99);
    }

    #[test]
    fn entry_count_saturates() {
        let mut context = TomatoState::new(Point::default()).context;
        context.entry_count = u32::MAX;
        assert_eq!(context.tick().entry_count, u32::MAX);
    }
}

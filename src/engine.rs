use crate::browser;
use anyhow::{anyhow, Result};
// web assembly is single threaded, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::mpsc::UnboundedReceiver;
use futures::channel::oneshot::{channel, Receiver};
use futures::future::{select, Either};
use js_sys::Function;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we create the closures ourselves, so the expected type is known
    JsCast,
    JsValue,
};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlImageElement, KeyboardEvent};

use self::input::{KeyPress, KeyState};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState);
    fn draw(&self, renderer: &Renderer);
    /// Drawn once after initialize and again whenever a run ends
    fn draw_start_screen(&self, renderer: &Renderer);
    fn is_running(&self) -> bool;
    fn is_start_key(&self, code: &str) -> bool;
    fn run(&mut self);
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

/// TABLE
/// ┌──────────────────────── Frame Lifecycle ────────────────────────┐
/// │                                                                 │
/// │  start screen ──(start key)──► run() ──► frame ──► frame ──► …  │
/// │       ▲                                               │         │
/// │       └────────────── not running: stop scheduling ◄──┘         │
/// │                                                                 │
/// │  frame = drain input ─► update ─► draw ─► request next frame    │
/// └─────────────────────────────────────────────────────────────────┘
pub struct GameLoop {
    game: Box<dyn Game>,
    renderer: Renderer,
    keystate: KeyState,
    keyevent_receiver: UnboundedReceiver<KeyPress>,
}

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let game = game.initialize().await?;
        let game_loop = Rc::new(RefCell::new(GameLoop {
            game,
            renderer: Renderer::new(browser::context()?),
            keystate: KeyState::new(),
            keyevent_receiver: input::prepare_input()?,
        }));
        game_loop.borrow().draw_start_screen();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        let frame_loop = game_loop.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |_perf: f64| {
            if !frame_loop.borrow_mut().frame() {
                return;
            }
            schedule(&f);
        }));

        // a single binding that (re)starts the loop, ignored while running
        let on_start = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            if game_loop.borrow_mut().try_run(&event.code()) {
                schedule(&g);
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);
        browser::add_window_listener("keydown", &on_start)?;
        on_start.forget();

        Ok(())
    }

    /// One update + draw, returns whether another frame should follow
    fn frame(&mut self) -> bool {
        input::process_input(&mut self.keystate, &mut self.keyevent_receiver);
        self.game.update(&self.keystate);
        if !self.game.is_running() {
            self.draw_start_screen();
            return false;
        }
        self.game.draw(&self.renderer);
        true
    }

    fn try_run(&mut self, code: &str) -> bool {
        if !self.game.is_start_key(code) || self.game.is_running() {
            return false;
        }
        self.game.run();
        // edges queued behind the start screen are stale
        input::settle_input(&mut self.keystate, &mut self.keyevent_receiver);
        true
    }

    fn draw_start_screen(&self) {
        self.game.draw_start_screen(&self.renderer);
    }
}

fn schedule(frame: &SharedLoopClosure) {
    match frame.borrow().as_ref() {
        Some(closure) => {
            if let Err(err) = browser::request_animation_frame(closure) {
                error!("GameLoop: {:#?}", err);
            }
        }
        None => error!("GameLoop: Loop is None"),
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn right(&self) -> f64 {
        self.x() + self.width()
    }

    pub fn bottom(&self) -> f64 {
        self.y() + self.height()
    }

    /// Axis aligned overlap, touching edges count as overlapping
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.x()
            || self.bottom() < other.y()
            || self.x() > other.right()
            || self.y() > other.bottom())
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }

    /// Stretch the whole image over `destination`
    pub fn draw_entire_image(&self, image: &HtmlImageElement, destination: &Rect) {
        if let Err(err) = self.context.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            destination.x(),
            destination.y(),
            destination.width(),
            destination.height(),
        ) {
            error!("Could not draw image {} : {:#?}", image.src(), err);
        }
    }

    pub fn set_font(&self, font: &str) {
        self.context.set_font(font);
    }

    pub fn set_fill_style(&self, color: &str) {
        self.context.set_fill_style_str(color);
    }

    pub fn fill_text(&self, text: &str, position: &Point) {
        if let Err(err) = self.context.fill_text(text, position.x, position.y) {
            error!("Could not draw text '{}' : {:#?}", text, err);
        }
    }

    /// Width of `text` in the current font, 0.0 if the canvas refuses
    pub fn measure_text_width(&self, text: &str) -> f64 {
        match self.context.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(err) => {
                error!("Could not measure text '{}' : {:#?}", text, err);
                0.0
            }
        }
    }

    #[cfg(debug_assertions)]
    pub fn stroke_rect(&self, rect: &Rect) {
        self.context
            .stroke_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }
}

#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.stroke_rect(self);
    }
}

// ==================== Resources ====================
/// Success/error callbacks feeding a oneshot channel, whichever fires first
/// wins and the other becomes a no-op
struct LoadSignal {
    on_ready: Closure<dyn FnMut()>,
    on_error: Closure<dyn FnMut(JsValue)>,
    done: Receiver<Result<()>>,
}

impl LoadSignal {
    fn new(source: &str) -> Self {
        let (tx, rx) = channel::<Result<()>>();
        let success_tx = Rc::new(RefCell::new(Some(tx)));
        let error_tx = success_tx.clone();
        let source = source.to_owned();

        let on_ready = browser::closure_wrap(Box::new(move || {
            if let Some(tx) = success_tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        }) as Box<dyn FnMut()>);

        let on_error = browser::closure_wrap(Box::new(move |err: JsValue| {
            if let Some(tx) = error_tx.borrow_mut().take() {
                let _ = tx.send(Err(anyhow!("Error loading '{}' : {:#?}", source, err)));
            }
        }) as Box<dyn FnMut(JsValue)>);

        LoadSignal {
            on_ready,
            on_error,
            done: rx,
        }
    }

    fn on_ready(&self) -> &Function {
        self.on_ready.as_ref().unchecked_ref()
    }

    fn on_error(&self) -> &Function {
        self.on_error.as_ref().unchecked_ref()
    }

    async fn wait(&mut self) -> Result<()> {
        // outer error : both senders dropped without firing
        // inner error : the element reported a load failure
        (&mut self.done)
            .await
            .map_err(|_| anyhow!("Load callbacks dropped before firing"))?
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let mut signal = LoadSignal::new(source);
    image.set_onload(Some(signal.on_ready()));
    image.set_onerror(Some(signal.on_error()));
    image.set_src(source);

    let loaded = signal.wait().await;
    // detach before `signal` drops the closures
    image.set_onload(None);
    image.set_onerror(None);

    loaded.map(|_| image)
}

/// Browsers that hold back media until a user gesture never fire
/// canplaythrough, give up after this long
pub const AUDIO_LOAD_TIMEOUT_MS: i32 = 10_000;

/// Same contract as `load_image`, ready once the browser can play the whole
/// clip without buffering
/// * `Err` - also when nothing fired within `AUDIO_LOAD_TIMEOUT_MS`
pub async fn load_audio(source: &str) -> Result<HtmlAudioElement> {
    let audio = browser::new_audio()?;
    let mut signal = LoadSignal::new(source);
    audio.set_oncanplaythrough(Some(signal.on_ready()));
    audio.set_onerror(Some(signal.on_error()));
    audio.set_src(source);

    let loaded = match select(
        Box::pin(signal.wait()),
        Box::pin(browser::sleep(AUDIO_LOAD_TIMEOUT_MS)),
    )
    .await
    {
        Either::Left((loaded, _)) => loaded,
        Either::Right((_, _)) => Err(anyhow!(
            "Timed out loading '{}' after {} ms",
            source,
            AUDIO_LOAD_TIMEOUT_MS
        )),
    };
    // canplaythrough fires again after seeking, keep it detached
    audio.set_oncanplaythrough(None);
    audio.set_onerror(None);

    loaded.map(|_| audio)
}

/// Fire and forget audio cue, clones share one element
#[derive(Clone)]
pub struct Sound {
    element: HtmlAudioElement,
}

impl Sound {
    pub fn new(element: HtmlAudioElement) -> Self {
        Sound { element }
    }

    /// Restarts the cue if it is already playing
    pub fn play(&self) {
        self.element.set_current_time(0.0);
        match self.element.play() {
            Ok(promise) => browser::spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    log!("Could not play sound : {:#?}", err);
                }
            }),
            Err(err) => log!("Could not play sound : {:#?}", err),
        }
    }
}

// ==================== Input ====================
/// ELI5:
/// ┌────────────── Keyboard → Frame ──────────────┐
/// │ keydown/keyup listener ─► unbounded channel  │
/// │ frame start: drain channel ─► KeyState       │
/// │ update(): reads KeyState snapshot only       │
/// └──────────────────────────────────────────────┘
pub mod input {
    use crate::browser;
    use anyhow::Result;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::collections::HashSet;
    use web_sys::KeyboardEvent;

    /// A key edge, keyed by `KeyboardEvent.code` (e.g. "ArrowLeft")
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum KeyPress {
        KeyDown(String),
        KeyUp(String),
    }

    /// Keys held right now plus the edges that arrived since the last frame
    #[derive(Debug, Default)]
    pub struct KeyState {
        pressed: HashSet<String>,
        transitions: Vec<KeyPress>,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        pub fn is_pressed(&self, code: &str) -> bool {
            self.pressed.contains(code)
        }

        /// Edges for this frame, oldest first
        pub fn transitions(&self) -> &[KeyPress] {
            &self.transitions
        }

        pub fn record(&mut self, press: KeyPress) {
            match &press {
                KeyPress::KeyDown(code) => {
                    self.pressed.insert(code.clone());
                }
                KeyPress::KeyUp(code) => {
                    self.pressed.remove(code);
                }
            }
            self.transitions.push(press);
        }

        /// Forget last frame's edges, held keys stay
        pub fn begin_frame(&mut self) {
            self.transitions.clear();
        }
    }

    pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
        let (keydown_sender, keyevent_receiver) = unbounded();
        let keyup_sender = keydown_sender.clone();

        let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            let _ = keyup_sender.unbounded_send(KeyPress::KeyUp(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        browser::add_window_listener("keydown", &onkeydown)?;
        browser::add_window_listener("keyup", &onkeyup)?;
        // listeners live as long as the page
        onkeydown.forget();
        onkeyup.forget();

        Ok(keyevent_receiver)
    }

    /// Drain every queued edge into `state`, dropping last frame's edges
    pub fn process_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<KeyPress>) {
        state.begin_frame();
        // Err : queue empty for now, or every sender is gone
        while let Ok(press) = receiver.try_recv() {
            state.record(press);
        }
    }

    /// Fold queued edges into the held set without replaying them, the
    /// next frame only sees edges that arrive after this call
    pub fn settle_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<KeyPress>) {
        process_input(state, receiver);
        state.begin_frame();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn down(code: &str) -> KeyPress {
            KeyPress::KeyDown(code.to_string())
        }

        fn up(code: &str) -> KeyPress {
            KeyPress::KeyUp(code.to_string())
        }

        #[test]
        fn process_input_drains_queue_in_order() {
            let (sender, mut receiver) = unbounded();
            sender.unbounded_send(down("ArrowLeft")).unwrap();
            sender.unbounded_send(down("ArrowUp")).unwrap();
            sender.unbounded_send(up("ArrowLeft")).unwrap();

            let mut state = KeyState::new();
            process_input(&mut state, &mut receiver);

            assert_eq!(
                state.transitions(),
                &[down("ArrowLeft"), down("ArrowUp"), up("ArrowLeft")]
            );
            assert!(state.is_pressed("ArrowUp"));
            assert!(!state.is_pressed("ArrowLeft"));
        }

        #[test]
        fn held_keys_survive_frames_but_edges_do_not() {
            let (sender, mut receiver) = unbounded();
            sender.unbounded_send(down("ArrowRight")).unwrap();

            let mut state = KeyState::new();
            process_input(&mut state, &mut receiver);
            assert_eq!(state.transitions().len(), 1);

            process_input(&mut state, &mut receiver);
            assert!(state.transitions().is_empty());
            assert!(state.is_pressed("ArrowRight"));
        }

        #[test]
        fn closed_channel_keeps_last_snapshot() {
            let (sender, mut receiver) = unbounded();
            sender.unbounded_send(down("KeyG")).unwrap();
            drop(sender);

            let mut state = KeyState::new();
            process_input(&mut state, &mut receiver);
            process_input(&mut state, &mut receiver);

            assert!(state.is_pressed("KeyG"));
            assert!(state.transitions().is_empty());
        }

        #[test]
        fn settle_input_keeps_held_keys_and_drops_stale_edges() {
            let (sender, mut receiver) = unbounded();
            sender.unbounded_send(down("ArrowLeft")).unwrap();
            sender.unbounded_send(down("ArrowUp")).unwrap();
            sender.unbounded_send(up("ArrowUp")).unwrap();
            sender.unbounded_send(down("KeyG")).unwrap();

            let mut state = KeyState::new();
            settle_input(&mut state, &mut receiver);

            assert!(state.transitions().is_empty());
            assert!(state.is_pressed("ArrowLeft"));
            assert!(!state.is_pressed("ArrowUp"));

            sender.unbounded_send(up("ArrowLeft")).unwrap();
            process_input(&mut state, &mut receiver);

            assert_eq!(state.transitions(), &[up("ArrowLeft")]);
        }
    }
}

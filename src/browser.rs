use anyhow::{anyhow, Result};
use js_sys::{Function, Promise};
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlAudioElement,
    HtmlCanvasElement,
    HtmlImageElement,
};

// ==================== Macros ====================
// console.log with format! arguments
macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    }
}

// console.error with format! arguments
macro_rules! error {
    ($($t:tt)*) => {
        web_sys::console::error_1(&format!($($t)*).into())
    }
}

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
    pub const PRELOAD_AUTO: &str = "auto";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(html::CANVAS_ID)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{:#?}'", html::CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        // get_context is Result<Option<Object>, JsValue>
        // - JsValue error becomes anyhow
        // - None becomes anyhow
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn new_image() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

pub fn new_audio() -> Result<HtmlAudioElement> {
    let audio = HtmlAudioElement::new()
        .map_err(|err| anyhow!("Could not create audio element : {:#?}", err))?;
    // without preload some browsers never fire canplaythrough
    audio.set_preload(html::PRELOAD_AUTO);
    Ok(audio)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f) as Box<dyn FnMut(f64)>)
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame {:#?}", err))
}

/// Attach a listener for `event` (e.g. "keydown") on the window
/// - the caller decides whether to `forget()` the closure afterwards
pub fn add_window_listener<T: WasmClosure + ?Sized>(event: &str, listener: &Closure<T>) -> Result<()> {
    window()?
        .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen for '{}' : {:#?}", event, err))
}

/// Resolves after `millis`, the timer only runs while the page is open
pub async fn sleep(millis: i32) -> Result<()> {
    let window = window()?;
    let mut schedule = |resolve: Function, _reject: Function| {
        if let Err(err) =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
        {
            error!("Could not set timeout : {:#?}", err);
        }
    };
    JsFuture::from(Promise::new(&mut schedule))
        .await
        .map_err(|err| anyhow!("Timer failed : {:#?}", err))?;
    Ok(())
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

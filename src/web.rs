//! `wasm-bindgen` surface for the browser host.
//!
//! The host keeps the DOM and the `File` objects; everything else lives in
//! [`PaletteApp`]. Each input method returns the effects the host must run,
//! and [`WebPaletteApp::view`] returns a plain object to render from.

use js_sys::{Array, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::app::{Effect, Event, PaletteApp, UploadTicket};
use crate::color::ColorFormat;
use crate::config::AppConfig;
use crate::debounce::Millis;
use crate::dragdrop::DragEvent;
use crate::error::PaletteError;
use crate::notify::Notification;
use crate::render::{Activation, Swatch, SwatchId};
use crate::theme::{Theme, ThemePreference};
use crate::validate::CandidateFile;

// ------------------------------------------------------------
// Console logging
// ------------------------------------------------------------

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn install_logger() {
    // A second app on the same page keeps the logger already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

// ------------------------------------------------------------
// Conversions
// ------------------------------------------------------------

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

fn effects_to_js(effects: &[Effect]) -> Result<Array, JsValue> {
    let out = Array::new();
    for effect in effects {
        out.push(&to_js(effect)?);
    }
    Ok(out)
}

fn js_error(error: PaletteError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn millis(now: f64) -> Millis {
    now.max(0.0) as Millis
}

#[derive(Serialize)]
struct PreviewState {
    width: u32,
    height: u32,
    aria_label: String,
}

#[derive(Serialize)]
struct ViewState<'a> {
    format: ColorFormat,
    color_count: usize,
    busy: bool,
    aria_busy: &'static str,
    theme: Theme,
    drop_zone_active: bool,
    drop_zone_label: &'static str,
    placeholder_visible: bool,
    preview: Option<PreviewState>,
    swatches: &'a [Swatch],
    notification: Option<&'a Notification>,
    notification_role: Option<&'static str>,
}

// ------------------------------------------------------------
// Exported controller
// ------------------------------------------------------------

#[wasm_bindgen(js_name = PaletteApp)]
pub struct WebPaletteApp {
    inner: PaletteApp,
}

impl WebPaletteApp {
    fn send(&mut self, event: Event, now: f64) -> Result<Array, JsValue> {
        effects_to_js(&self.inner.handle(event, millis(now)))
    }
}

#[wasm_bindgen(js_class = PaletteApp)]
impl WebPaletteApp {
    /// `config_json` may override any subset of the defaults; `stored_theme`
    /// is the raw value read from storage.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        stored_theme: Option<String>,
        prefers_dark: bool,
    ) -> Result<WebPaletteApp, JsValue> {
        install_logger();
        let config = match config_json {
            Some(json) => AppConfig::from_json(&json).map_err(js_error)?,
            None => AppConfig::default(),
        };
        let theme = ThemePreference::resolve(stored_theme.as_deref(), prefers_dark);
        Ok(WebPaletteApp {
            inner: PaletteApp::with_config(config, theme).map_err(js_error)?,
        })
    }

    pub fn init(&mut self) {
        self.inner.init();
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }

    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&mut self, name: String, media_type: String, size: f64, now: f64) -> Result<Array, JsValue> {
        let file = CandidateFile::new(name, media_type, size as u64);
        self.send(Event::FileSelected(Some(file)), now)
    }

    #[wasm_bindgen(js_name = dragEnter)]
    pub fn drag_enter(&mut self, now: f64) -> Result<Array, JsValue> {
        self.send(Event::Drag(DragEvent::Enter), now)
    }

    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&mut self, now: f64) -> Result<Array, JsValue> {
        self.send(Event::Drag(DragEvent::Over), now)
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self, now: f64) -> Result<Array, JsValue> {
        self.send(Event::Drag(DragEvent::Leave), now)
    }

    /// Only the first dropped item matters; pass `undefined` when there is none.
    #[wasm_bindgen(js_name = dropFile)]
    pub fn drop_file(
        &mut self,
        name: Option<String>,
        media_type: Option<String>,
        size: f64,
        now: f64,
    ) -> Result<Array, JsValue> {
        let files = match (name, media_type) {
            (Some(name), Some(media_type)) => vec![CandidateFile::new(name, media_type, size as u64)],
            _ => Vec::new(),
        };
        self.send(Event::Drag(DragEvent::Drop(files)), now)
    }

    #[wasm_bindgen(js_name = fileRead)]
    pub fn file_read(&mut self, ticket: f64, bytes: Vec<u8>, now: f64) -> Result<Array, JsValue> {
        let ticket = UploadTicket(ticket as u64);
        self.send(Event::FileRead { ticket, bytes }, now)
    }

    #[wasm_bindgen(js_name = fileReadFailed)]
    pub fn file_read_failed(&mut self, ticket: f64, reason: String, now: f64) -> Result<Array, JsValue> {
        let ticket = UploadTicket(ticket as u64);
        self.send(Event::FileReadFailed { ticket, reason }, now)
    }

    #[wasm_bindgen(js_name = frameYielded)]
    pub fn frame_yielded(&mut self, now: f64) -> Result<Array, JsValue> {
        self.send(Event::FrameYielded, now)
    }

    #[wasm_bindgen(js_name = colorCountInput)]
    pub fn color_count_input(&mut self, value: u32, now: f64) -> Result<Array, JsValue> {
        self.send(Event::ColorCountInput(value as usize), now)
    }

    #[wasm_bindgen(js_name = selectFormat)]
    pub fn select_format(&mut self, format: &str, now: f64) -> Result<Array, JsValue> {
        let format: ColorFormat = format.parse().map_err(js_error)?;
        self.send(Event::FormatSelected(format), now)
    }

    /// `key` is `KeyboardEvent.key` for key presses, `undefined` for clicks.
    #[wasm_bindgen(js_name = activateSwatch)]
    pub fn activate_swatch(&mut self, id: f64, key: Option<String>, now: f64) -> Result<Array, JsValue> {
        let activation = key.map_or(Activation::Click, Activation::Key);
        let id = SwatchId(id as u64);
        self.send(Event::SwatchActivated { id, activation }, now)
    }

    #[wasm_bindgen(js_name = clipboardResult)]
    pub fn clipboard_result(&mut self, text: String, ok: bool, now: f64) -> Result<Array, JsValue> {
        self.send(Event::ClipboardResult { text, ok }, now)
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&mut self, dark: bool, now: f64) -> Result<Array, JsValue> {
        self.send(Event::ThemeToggled(Theme::from_dark(dark)), now)
    }

    #[wasm_bindgen(js_name = systemThemeChanged)]
    pub fn system_theme_changed(&mut self, prefers_dark: bool, now: f64) -> Result<Array, JsValue> {
        self.send(Event::SystemThemeChanged { prefers_dark }, now)
    }

    pub fn tick(&mut self, now: f64) -> Result<Array, JsValue> {
        effects_to_js(&self.inner.tick(millis(now)))
    }

    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner.next_deadline().map(|at| at as f64)
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        let app = &self.inner;
        let preview = app.preview().image().map(|img| PreviewState {
            width: img.width(),
            height: img.height(),
            aria_label: img.aria_label(),
        });
        let notification = app.notification();
        let state = ViewState {
            format: app.format(),
            color_count: app.color_count(),
            busy: app.is_busy(),
            aria_busy: app.busy_indicator().aria_busy(),
            theme: app.theme(),
            drop_zone_active: app.drop_zone().is_active(),
            drop_zone_label: app.drop_zone().aria_label(),
            placeholder_visible: preview.is_none(),
            preview,
            swatches: app.swatches(),
            notification,
            notification_role: notification.map(|n| n.severity.role()),
        };
        to_js(&state)
    }

    /// JPEG bytes of the current preview, or `undefined` while the placeholder shows.
    #[wasm_bindgen(js_name = previewJpeg)]
    pub fn preview_jpeg(&self) -> Result<Option<Uint8Array>, JsValue> {
        match self.inner.preview().image() {
            Some(img) => {
                let jpeg = img.encode_preview().map_err(js_error)?;
                Ok(Some(Uint8Array::from(jpeg.as_slice())))
            }
            None => Ok(None),
        }
    }
}

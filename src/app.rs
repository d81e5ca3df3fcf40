//! Application controller.
//!
//! [`PaletteApp`] owns every piece of UI state and is driven by the host:
//! user input and async completions come in as [`Event`]s, and the work only
//! the host can do (read a file, wait a frame, touch the clipboard, persist
//! the theme) goes back out as [`Effect`]s. Timers are handled by calling
//! [`PaletteApp::tick`] at [`PaletteApp::next_deadline`].
//!
//! ```text
//! FileSelected / Drop ─ validate ─> ReadFile(ticket)
//! FileRead(ticket)    ─ stale? ─ decode + scale ─ busy ─> YieldFrame
//! FrameYielded        ─ extract ─ render ─ idle
//! ```

use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorFormat};
use crate::config::AppConfig;
use crate::debounce::{Debouncer, Millis};
use crate::dragdrop::{DragEvent, DropOutcome, DropZone};
use crate::error::PaletteError;
use crate::extract::{KMeansExtractor, PaletteSource, extract_palette};
use crate::listeners::{EventKind, ListenerRegistry, Registration, Surface};
use crate::loader::{Preview, decode_scaled};
use crate::notify::{BusyIndicator, Notification, Notifier};
use crate::render::{Activation, PaletteView, Swatch, SwatchId};
use crate::theme::{Theme, ThemePreference};
use crate::validate::{CandidateFile, validate_file};

/// Sequence number of one upload. Only the latest one may touch the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UploadTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The file picker changed. `None` when the selection was cleared.
    FileSelected(Option<CandidateFile>),
    Drag(DragEvent),
    FileRead { ticket: UploadTicket, bytes: Vec<u8> },
    FileReadFailed { ticket: UploadTicket, reason: String },
    /// The host painted a frame after a `YieldFrame` request.
    FrameYielded,
    ColorCountInput(usize),
    FormatSelected(ColorFormat),
    SwatchActivated { id: SwatchId, activation: Activation },
    ClipboardResult { text: String, ok: bool },
    ThemeToggled(Theme),
    SystemThemeChanged { prefers_dark: bool },
}

impl Event {
    /// The binding this event arrives through. Completions of host work have none.
    fn binding(&self) -> Option<(Surface, EventKind)> {
        match self {
            Event::FileSelected(_) => Some((Surface::FileInput, EventKind::Change)),
            Event::Drag(drag) => Some((Surface::DropZone, drag.kind())),
            Event::ColorCountInput(_) => Some((Surface::ColorCount, EventKind::Input)),
            Event::FormatSelected(_) => Some((Surface::FormatSelector, EventKind::Change)),
            Event::SwatchActivated { .. } => Some((Surface::Palette, EventKind::Activate)),
            Event::ThemeToggled(_) => Some((Surface::ThemeToggle, EventKind::Change)),
            Event::SystemThemeChanged { .. } => Some((Surface::SystemTheme, EventKind::Change)),
            Event::FileRead { .. }
            | Event::FileReadFailed { .. }
            | Event::FrameYielded
            | Event::ClipboardResult { .. } => None,
        }
    }
}

/// Work the host performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Effect {
    /// Read the file behind `ticket` and answer with `FileRead`/`FileReadFailed`.
    ReadFile(UploadTicket),
    /// Let the busy state paint, then send `FrameYielded`.
    YieldFrame,
    /// Write the text and answer with `ClipboardResult`.
    WriteClipboard(String),
    /// Store the theme under `THEME_STORAGE_KEY`.
    PersistTheme(Theme),
}

pub struct PaletteApp<S = KMeansExtractor> {
    config: AppConfig,
    source: S,
    format: ColorFormat,
    color_count: usize,
    preview: Preview,
    palette: PaletteView,
    notifier: Notifier,
    busy: BusyIndicator,
    drop_zone: DropZone,
    count_debounce: Debouncer<usize>,
    theme: ThemePreference,
    registry: ListenerRegistry,
    registrations: Vec<Registration>,
    latest_ticket: u64,
    extraction_pending: bool,
}

impl PaletteApp<KMeansExtractor> {
    pub fn with_config(config: AppConfig, theme: ThemePreference) -> Result<Self, PaletteError> {
        Self::new(config, KMeansExtractor::default(), theme)
    }
}

impl<S: PaletteSource> PaletteApp<S> {
    /// Fails with [`PaletteError::Config`] when `config` does not validate.
    pub fn new(config: AppConfig, source: S, theme: ThemePreference) -> Result<Self, PaletteError> {
        config.validate()?;
        Ok(Self {
            color_count: config.default_color_count,
            notifier: Notifier::new(config.notification_ms),
            count_debounce: Debouncer::new(config.debounce_ms),
            config,
            source,
            format: ColorFormat::default(),
            preview: Preview::default(),
            palette: PaletteView::default(),
            busy: BusyIndicator::default(),
            drop_zone: DropZone::default(),
            theme,
            registry: ListenerRegistry::new(),
            registrations: Vec::new(),
            latest_ticket: 0,
            extraction_pending: false,
        })
    }

    /// Bind every event source. Calling it twice is a no-op.
    pub fn init(&mut self) {
        if self.is_initialized() {
            return;
        }
        let registry = &mut self.registry;
        self.registrations = vec![
            registry.register(Surface::FileInput, EventKind::Change),
            registry.register(Surface::ColorCount, EventKind::Input),
            registry.register(Surface::FormatSelector, EventKind::Change),
            registry.register(Surface::Palette, EventKind::Activate),
            registry.register(Surface::ThemeToggle, EventKind::Change),
            registry.register(Surface::SystemTheme, EventKind::Change),
            DropZone::attach(registry),
        ];
        log::info!("palette extractor initialized ({} bindings)", self.registry.len());
    }

    /// Unbind everything bound by `init` and drop pending timers.
    pub fn destroy(&mut self) {
        for registration in self.registrations.drain(..) {
            registration.dispose(&mut self.registry);
        }
        self.count_debounce.cancel();
        self.extraction_pending = false;
        self.busy.set_busy(false);
        log::info!("palette extractor destroyed");
    }

    pub fn is_initialized(&self) -> bool {
        !self.registrations.is_empty()
    }

    pub fn handle(&mut self, event: Event, now: Millis) -> Vec<Effect> {
        if !self.is_initialized() {
            log::debug!("ignoring {event:?}: controller not initialized");
            return Vec::new();
        }
        if let Some((surface, kind)) = event.binding()
            && !self.registry.is_bound(surface, kind)
        {
            log::debug!("ignoring {kind:?} on unbound {surface:?}");
            return Vec::new();
        }

        let mut effects = Vec::new();
        match event {
            Event::FileSelected(Some(file)) => self.intake(file, now, &mut effects),
            Event::FileSelected(None) => {}
            Event::Drag(drag) => match self.drop_zone.handle(drag) {
                DropOutcome::Ignored => {}
                DropOutcome::Rejected => {
                    let err = PaletteError::InvalidFileType {
                        media_type: String::new(),
                    };
                    self.notifier.notify(err.to_string(), now);
                }
                DropOutcome::Accepted(file) => self.intake(file, now, &mut effects),
            },
            Event::FileRead { ticket, bytes } => self.file_read(ticket, &bytes, now, &mut effects),
            Event::FileReadFailed { ticket, reason } => {
                if self.is_current(ticket) {
                    self.fail(PaletteError::GenericFailure(reason), now);
                }
            }
            Event::FrameYielded => self.run_extraction(now),
            Event::ColorCountInput(count) => {
                let count = self.config.clamp_color_count(count);
                self.count_debounce.call(now, count);
            }
            Event::FormatSelected(format) => {
                self.format = format;
                self.palette.relabel(format);
            }
            Event::SwatchActivated { id, activation } => {
                if let Some(text) = self.palette.activate(id, &activation, self.format) {
                    effects.push(Effect::WriteClipboard(text));
                }
            }
            Event::ClipboardResult { text, ok } => {
                if ok {
                    self.notifier.notify(format!("Copied {text} to clipboard!"), now);
                } else {
                    self.fail(PaletteError::ClipboardFailure, now);
                }
            }
            Event::ThemeToggled(theme) => {
                effects.push(Effect::PersistTheme(self.theme.choose(theme)));
            }
            Event::SystemThemeChanged { prefers_dark } => {
                self.theme.system_changed(prefers_dark);
            }
        }
        effects
    }

    /// Fire whatever timers are due at `now`.
    pub fn tick(&mut self, now: Millis) -> Vec<Effect> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.notifier.tick(now);

        let mut effects = Vec::new();
        if let Some(count) = self.count_debounce.poll(now) {
            self.color_count = count;
            log::debug!("palette size set to {count}");
            if self.preview.image().is_some() {
                self.request_extraction(&mut effects);
            }
        }
        effects
    }

    /// The earliest time `tick` has something to do.
    pub fn next_deadline(&self) -> Option<Millis> {
        match (self.notifier.deadline(), self.count_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn intake(&mut self, file: CandidateFile, now: Millis, effects: &mut Vec<Effect>) {
        if let Err(e) = validate_file(&file.media_type, file.size, &self.config) {
            log::info!("rejected {}: {e:?}", file.name);
            self.notifier.notify(e.to_string(), now);
            return;
        }
        self.latest_ticket += 1;
        let ticket = UploadTicket(self.latest_ticket);
        log::info!("accepted {} ({} bytes) as upload {}", file.name, file.size, ticket.0);
        effects.push(Effect::ReadFile(ticket));
    }

    fn is_current(&self, ticket: UploadTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    fn file_read(&mut self, ticket: UploadTicket, bytes: &[u8], now: Millis, effects: &mut Vec<Effect>) {
        if !self.is_current(ticket) {
            log::debug!("discarding stale upload {} (latest {})", ticket.0, self.latest_ticket);
            return;
        }
        match decode_scaled(bytes, self.config.max_image_width) {
            Ok(image) => {
                self.preview.show(image);
                self.request_extraction(effects);
            }
            // The previous preview (or the placeholder) stays as it was.
            Err(e) => self.fail(e, now),
        }
    }

    fn request_extraction(&mut self, effects: &mut Vec<Effect>) {
        self.busy.set_busy(true);
        if !self.extraction_pending {
            self.extraction_pending = true;
            effects.push(Effect::YieldFrame);
        }
    }

    fn run_extraction(&mut self, now: Millis) {
        if !self.extraction_pending {
            return;
        }
        self.extraction_pending = false;

        if let Some(image) = self.preview.image() {
            let colors = extract_palette(&self.source, image, self.color_count, &mut self.notifier, now);
            // An empty result keeps whatever swatches were already shown.
            if !colors.is_empty() {
                self.palette.render(&colors, self.format);
            }
        }
        self.busy.set_busy(false);
    }

    fn fail(&mut self, error: PaletteError, now: Millis) {
        log::warn!("{error:?}");
        self.notifier.notify(error.to_string(), now);
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// The palette size in effect (what the slider's value label shows).
    pub fn color_count(&self) -> usize {
        self.color_count
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn swatches(&self) -> &[Swatch] {
        self.palette.swatches()
    }

    pub fn palette(&self) -> Vec<Color> {
        self.palette.colors()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifier.visible()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_indicator(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn drop_zone(&self) -> &DropZone {
        &self.drop_zone
    }

    pub fn theme(&self) -> Theme {
        self.theme.active()
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    struct Fixed {
        calls: Cell<usize>,
        fail: Cell<bool>,
    }

    impl Fixed {
        fn new() -> Self {
            Self { calls: Cell::new(0), fail: Cell::new(false) }
        }
    }

    impl PaletteSource for Fixed {
        fn palette(&self, _: &RgbaImage, count: usize) -> Result<Vec<Color>, PaletteError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(PaletteError::ExtractionFailure("boom".into()));
            }
            Ok((0..count as u8).map(|v| Color::new(v, 0, 0)).collect())
        }
    }

    fn app() -> PaletteApp<Fixed> {
        let mut app = PaletteApp::new(
            AppConfig::default(),
            Fixed::new(),
            ThemePreference::resolve(None, false),
        )
        .unwrap();
        app.init();
        app
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([9, 9, 9, 255])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn select(app: &mut PaletteApp<Fixed>, now: Millis) -> UploadTicket {
        let effects = app.handle(
            Event::FileSelected(Some(CandidateFile::new("a.png", "image/png", 1_000))),
            now,
        );
        match effects.as_slice() {
            [Effect::ReadFile(ticket)] => *ticket,
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn busy_brackets_extraction() {
        let mut app = app();
        let ticket = select(&mut app, 0);
        let effects = app.handle(Event::FileRead { ticket, bytes: png(20, 10) }, 0);
        assert_eq!(effects, vec![Effect::YieldFrame]);
        assert!(app.is_busy());
        assert_eq!(app.source().calls.get(), 0);

        app.handle(Event::FrameYielded, 0);
        assert!(!app.is_busy());
        assert_eq!(app.source().calls.get(), 1);
        assert_eq!(app.swatches().len(), 6);
    }

    #[test]
    fn stale_upload_is_discarded() {
        let mut app = app();
        let first = select(&mut app, 0);
        let second = select(&mut app, 10);

        assert!(app.handle(Event::FileRead { ticket: first, bytes: png(30, 30) }, 20).is_empty());
        assert!(app.preview().is_placeholder());

        app.handle(Event::FileRead { ticket: second, bytes: png(40, 20) }, 30);
        assert_eq!(app.preview().image().map(|i| i.width()), Some(40));
    }

    #[test]
    fn invalid_files_never_reach_the_reader() {
        let mut app = app();
        let effects = app.handle(
            Event::FileSelected(Some(CandidateFile::new("a.pdf", "application/pdf", 10))),
            0,
        );
        assert!(effects.is_empty());
        assert_eq!(
            app.notification().unwrap().message,
            "Please upload an image file (JPG, PNG, or GIF)"
        );

        let effects = app.handle(
            Event::FileSelected(Some(CandidateFile::new("big.png", "image/png", 6_000_000))),
            0,
        );
        assert!(effects.is_empty());
        assert_eq!(app.notification().unwrap().message, "Please upload an image smaller than 5MB");
    }

    #[test]
    fn decode_failure_keeps_previous_preview() {
        let mut app = app();
        let ticket = select(&mut app, 0);
        app.handle(Event::FileRead { ticket, bytes: png(12, 12) }, 0);
        app.handle(Event::FrameYielded, 0);

        let ticket = select(&mut app, 100);
        let effects = app.handle(Event::FileRead { ticket, bytes: b"garbage".to_vec() }, 100);
        assert!(effects.is_empty());
        assert_eq!(app.preview().image().map(|i| i.width()), Some(12));
        assert_eq!(
            app.notification().unwrap().message,
            "Failed to load image. Please try another one."
        );
        assert!(!app.is_busy());
    }

    #[test]
    fn first_upload_decode_failure_keeps_placeholder() {
        let mut app = app();
        let ticket = select(&mut app, 0);
        let effects = app.handle(Event::FileRead { ticket, bytes: b"garbage".to_vec() }, 0);

        assert!(effects.is_empty());
        assert!(app.preview().is_placeholder());
        assert!(app.swatches().is_empty());
        let shown = app.notification().unwrap();
        assert_eq!(shown.message, "Failed to load image. Please try another one.");
        assert_eq!(shown.severity, crate::notify::Severity::Alert);
        assert_eq!(app.source().calls.get(), 0);
    }

    #[test]
    fn read_failure_notifies_only_for_the_latest_upload() {
        let mut app = app();
        let stale = select(&mut app, 0);
        let current = select(&mut app, 10);

        let effects = app.handle(Event::FileReadFailed { ticket: stale, reason: "aborted".into() }, 20);
        assert!(effects.is_empty());
        assert!(app.notification().is_none());

        app.handle(Event::FileReadFailed { ticket: current, reason: "NotReadableError".into() }, 30);
        assert_eq!(app.notification().unwrap().message, "An error occurred. Please try again.");
        assert!(app.preview().is_placeholder());
        assert!(!app.is_busy());
    }

    #[test]
    fn inverted_count_range_is_rejected() {
        let config = AppConfig { min_color_count: 10, max_color_count: 4, ..AppConfig::default() };
        let result = PaletteApp::new(config, Fixed::new(), ThemePreference::resolve(None, false));
        assert!(matches!(result, Err(PaletteError::Config(_))));
    }

    #[test]
    fn tick_after_destroy_is_inert() {
        let mut app = app();
        app.handle(Event::ClipboardResult { text: "#000000".into(), ok: true }, 0);
        assert!(app.notification().is_some());
        app.destroy();

        assert!(app.tick(10_000).is_empty());
        assert!(app.notification().is_some());
    }

    #[test]
    fn extraction_failure_keeps_swatches() {
        let mut app = app();
        let ticket = select(&mut app, 0);
        app.handle(Event::FileRead { ticket, bytes: png(12, 12) }, 0);
        app.handle(Event::FrameYielded, 0);
        let before = app.palette();

        app.source().fail.set(true);
        app.handle(Event::ColorCountInput(3), 1_000);
        assert_eq!(app.tick(1_300), vec![Effect::YieldFrame]);
        app.handle(Event::FrameYielded, 1_300);

        assert_eq!(app.palette(), before);
        assert!(!app.is_busy());
        assert_eq!(
            app.notification().unwrap().message,
            "Failed to extract colors. Please try another image."
        );
    }

    #[test]
    fn count_change_without_image_does_not_extract() {
        let mut app = app();
        app.handle(Event::ColorCountInput(9), 0);
        assert_eq!(app.next_deadline(), Some(300));
        assert!(app.tick(300).is_empty());
        assert_eq!(app.color_count(), 9);
        assert_eq!(app.source().calls.get(), 0);
    }

    #[test]
    fn count_input_is_clamped() {
        let mut app = app();
        app.handle(Event::ColorCountInput(500), 0);
        app.tick(300);
        assert_eq!(app.color_count(), 20);
    }

    #[test]
    fn rejected_drop_notifies_and_reads_nothing() {
        let mut app = app();
        let effects = app.handle(Event::Drag(DragEvent::Drop(vec![])), 0);
        assert!(effects.is_empty());
        assert!(app.notification().is_some());
    }

    #[test]
    fn accepted_drop_uses_the_picker_path() {
        let mut app = app();
        app.handle(Event::Drag(DragEvent::Over), 0);
        assert!(app.drop_zone().is_active());
        let effects = app.handle(
            Event::Drag(DragEvent::Drop(vec![CandidateFile::new("d.gif", "image/gif", 50)])),
            0,
        );
        assert_eq!(effects, vec![Effect::ReadFile(UploadTicket(1))]);
        assert!(!app.drop_zone().is_active());
    }

    #[test]
    fn destroy_unbinds_everything() {
        let mut app = app();
        assert!(!app.registry().is_empty());
        app.handle(Event::ColorCountInput(4), 0);
        app.destroy();

        assert!(app.registry().is_empty());
        assert_eq!(app.next_deadline(), None);
        assert!(app.handle(Event::FormatSelected(ColorFormat::Hsl), 0).is_empty());
        assert_eq!(app.format(), ColorFormat::Hex);
    }

    #[test]
    fn theme_toggle_persists_and_pins_choice() {
        let mut app = app();
        assert_eq!(app.theme(), Theme::Light);
        app.handle(Event::SystemThemeChanged { prefers_dark: true }, 0);
        assert_eq!(app.theme(), Theme::Dark);

        let effects = app.handle(Event::ThemeToggled(Theme::Light), 0);
        assert_eq!(effects, vec![Effect::PersistTheme(Theme::Light)]);
        app.handle(Event::SystemThemeChanged { prefers_dark: true }, 0);
        assert_eq!(app.theme(), Theme::Light);
    }

    #[test]
    fn clipboard_failure_is_an_alert() {
        let mut app = app();
        app.handle(Event::ClipboardResult { text: "#000000".into(), ok: false }, 0);
        let shown = app.notification().unwrap();
        assert_eq!(shown.message, "Failed to copy color code. Please try again.");
        assert_eq!(shown.severity, crate::notify::Severity::Alert);
    }
}

//! Screen driver: terminal ownership and the render/input loop
//!
//! [`Screen`] knows nothing about what is drawn. Drawing and key handling are
//! injected as two callbacks; the loop waits for a key or a tick, dispatches
//! the key if there was one, redraws, and repeats until stopped. Both callbacks
//! run on the thread that called [`Screen::start`], never concurrently.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Where key presses come from
pub trait EventSource {
    /// Wait up to `timeout` for the next key press
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyCode>>;
}

/// Key presses read from the real terminal
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.code)),
            _ => Ok(None),
        }
    }
}

/// Requests the loop of one [`Screen`] to finish. Cheap to clone and safe to
/// use from inside the screen's own callbacks.
#[derive(Debug, Clone, Default)]
pub struct ScreenHandle {
    stop: Arc<AtomicBool>,
}

impl ScreenHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }
}

type UpdateHandler = Box<dyn FnMut(&mut Frame<'_>)>;
type KeyHandler = Box<dyn FnMut(KeyCode)>;

pub struct Screen<B: Backend, E: EventSource> {
    terminal: Terminal<B>,
    events: E,
    tick: Duration,
    managed: bool,
    handle: ScreenHandle,
    on_update: Option<UpdateHandler>,
    on_key_press: Option<KeyHandler>,
}

impl Screen<CrosstermBackend<Stdout>, CrosstermEvents> {
    /// A screen on stdout. [`start`](Screen::start) switches the terminal to
    /// raw mode on the alternate screen and restores it when the loop ends.
    pub fn stdout(tick: Duration) -> io::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let mut screen = Screen::with_backend(terminal, CrosstermEvents, tick);
        screen.managed = true;
        Ok(screen)
    }
}

impl<B: Backend, E: EventSource> Screen<B, E> {
    /// A screen over any backend. The terminal mode is left alone, which is
    /// what tests driving a `TestBackend` want.
    pub fn with_backend(terminal: Terminal<B>, events: E, tick: Duration) -> Self {
        Screen {
            terminal,
            events,
            tick,
            managed: false,
            handle: ScreenHandle::default(),
            on_update: None,
            on_key_press: None,
        }
    }

    /// Set the redraw callback, called once per render tick
    pub fn on_update(&mut self, handler: impl FnMut(&mut Frame<'_>) + 'static) {
        self.on_update = Some(Box::new(handler));
    }

    /// Set the key callback, called once per key press
    pub fn on_key_press(&mut self, handler: impl FnMut(KeyCode) + 'static) {
        self.on_key_press = Some(Box::new(handler));
    }

    pub fn stop_handle(&self) -> ScreenHandle {
        self.handle.clone()
    }

    pub fn width(&self) -> u16 {
        self.terminal.size().map(|size| size.width).unwrap_or(0)
    }

    pub fn height(&self) -> u16 {
        self.terminal.size().map(|size| size.height).unwrap_or(0)
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Run one render tick now and flush it to the terminal
    pub fn refresh(&mut self) -> io::Result<()> {
        let update = &mut self.on_update;
        self.terminal.draw(|frame| {
            if let Some(update) = update.as_mut() {
                update(frame);
            }
        })?;
        Ok(())
    }

    /// Run the render/input loop until [`stop`](Screen::stop) is requested
    pub fn start(&mut self) -> io::Result<()> {
        self.handle.reset();

        let _guard = if self.managed {
            Some(RawModeGuard::enter()?)
        } else {
            None
        };
        self.terminal.clear()?;

        tracing::debug!(tick_ms = self.tick.as_millis() as u64, "screen loop started");

        self.refresh()?;
        while !self.handle.is_stopped() {
            if let Some(key) = self.events.next_key(self.tick)? {
                tracing::trace!(?key, "key press");
                if let Some(on_key_press) = self.on_key_press.as_mut() {
                    on_key_press(key);
                }
            }

            if self.handle.is_stopped() {
                break;
            }
            self.refresh()?;
        }

        tracing::debug!("screen loop finished");
        Ok(())
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

/// Raw mode and the alternate screen for as long as the guard lives
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, cursor::Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::error!(error = %e, "failed to leave raw mode");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
            tracing::error!(error = %e, "failed to leave alternate screen");
        }
    }
}

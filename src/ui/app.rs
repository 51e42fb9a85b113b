//! Dashboard controller: wires the snapshot store to the screen

use super::layout::DashboardLayout;
use super::panes;
use super::screen::{EventSource, Screen};
use super::viewport::Viewport;
use crate::snapshot::Monitor;
use crossterm::event::KeyCode;
use ratatui::{backend::Backend, Frame};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;

/// What the screen loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Drawing and navigation state, shared by the screen's two callbacks
#[derive(Debug)]
pub struct Dashboard {
    vm_name: String,
    monitor: Arc<Monitor>,
    viewport: Viewport,
}

impl Dashboard {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        Dashboard {
            vm_name: monitor.vm_name(),
            monitor,
            viewport: Viewport::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Draw every pane the current terminal size allows
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let layout = DashboardLayout::from_area(area);

        if let Some(rect) = layout.title {
            panes::render_title_pane(frame, rect, &self.vm_name, self.monitor.live());
        }

        if let Some(rect) = layout.registers {
            let registers = self.monitor.registers();
            panes::render_registers_pane(frame, rect, registers.as_ref());
        }

        if let Some(rect) = layout.stack {
            panes::render_stack_pane(frame, rect, &self.monitor.stack());
        }

        if let Some(rect) = layout.memory {
            // Hold our own reference so a poller swapping in a newer dump
            // cannot pull this one out from under the render
            let dump = self.monitor.dump().filter(|dump| !dump.is_empty());
            if let Some(dump) = &dump {
                self.viewport
                    .update(area.width, area.height, dump.memory_size());
            }
            panes::render_memory_pane(frame, rect, dump.as_deref(), &self.viewport);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> KeyAction {
        match key {
            KeyCode::Char('q') => {
                self.monitor.stop();
                return KeyAction::Quit;
            }
            KeyCode::Char('a') => self.viewport.scroll_up(1),
            KeyCode::Char('s') => self.viewport.scroll_down(1),
            KeyCode::Char('d') => self.viewport.page_up(),
            KeyCode::Char('f') => self.viewport.page_down(),
            KeyCode::Char('g') => self.viewport.reset(),
            _ => {}
        }
        KeyAction::Continue
    }
}

/// The dashboard application: a [`Monitor`] feeding a [`Screen`]
pub struct Ui<B: Backend, E: EventSource> {
    monitor: Arc<Monitor>,
    screen: Screen<B, E>,
    dashboard: Rc<RefCell<Dashboard>>,
    running: bool,
}

impl<B: Backend, E: EventSource> Ui<B, E> {
    pub fn new(monitor: Monitor, mut screen: Screen<B, E>) -> Self {
        let monitor = Arc::new(monitor);
        let dashboard = Rc::new(RefCell::new(Dashboard::new(Arc::clone(&monitor))));

        let draw = Rc::clone(&dashboard);
        screen.on_update(move |frame| draw.borrow_mut().draw(frame));

        let keys = Rc::clone(&dashboard);
        let handle = screen.stop_handle();
        screen.on_key_press(move |key| {
            if keys.borrow_mut().handle_key(key) == KeyAction::Quit {
                handle.stop();
            }
        });

        Ui {
            monitor,
            screen,
            dashboard,
            running: false,
        }
    }

    pub fn monitor(&self) -> Arc<Monitor> {
        Arc::clone(&self.monitor)
    }

    pub fn dashboard(&self) -> Rc<RefCell<Dashboard>> {
        Rc::clone(&self.dashboard)
    }

    pub fn screen(&self) -> &Screen<B, E> {
        &self.screen
    }

    /// Start polling and run the screen loop until `q` is pressed.
    ///
    /// Polling is stopped again if the screen loop fails, so no poller
    /// outlives this call.
    pub fn run(&mut self) -> io::Result<()> {
        if self.running {
            return Ok(());
        }
        self.running = true;

        tracing::info!(vm = %self.monitor.vm_name(), "dashboard running");

        self.monitor.start();
        let result = self.screen.start();
        self.monitor.stop();

        self.running = false;
        result
    }
}

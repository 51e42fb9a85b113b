// End-to-end tests for the dashboard on a headless terminal

use std::cell::OnceCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;

use vbox_monitor::snapshot::Monitor;
use vbox_monitor::ui::{Dashboard, EventSource, Screen, Ui};
use vbox_monitor::vm::{CoreDump, DebugSource, FarPointer, Registers, StackEntry, VmInfo};
use vbox_monitor::Result;

struct FixedSource {
    memory: usize,
    frames: usize,
}

impl DebugSource for FixedSource {
    fn registers(&self, _vm: &str) -> Result<Registers> {
        // Deliberately not in name order
        Ok([("ebx".to_string(), 0xFF), ("eax".to_string(), 0x1)]
            .into_iter()
            .collect())
    }

    fn stack(&self, _vm: &str) -> Result<Vec<StackEntry>> {
        Ok((0..self.frames)
            .map(|i| StackEntry {
                bp: FarPointer::new(0x10, 0x1000 + i as u64),
                ret_bp: FarPointer::new(0x10, 0x2000),
                ret_ip: FarPointer::new(0x08, 0x3000),
                args: [1, 2, 3, 4],
                ip: FarPointer::new(0x08, 0x4000),
            })
            .collect())
    }

    fn dump(&self, _vm: &str) -> Result<CoreDump> {
        Ok(CoreDump::from_bytes(
            (0..self.memory).map(|i| (i % 256) as u8).collect(),
        ))
    }

    fn running_vms(&self) -> Result<Vec<VmInfo>> {
        Ok(vec![VmInfo {
            name: "test".to_string(),
            uuid: "0".to_string(),
        }])
    }
}

fn monitor(memory: usize, frames: usize) -> Monitor {
    Monitor::new("test", Arc::new(FixedSource { memory, frames }))
}

/// Wait until every snapshot has been filled in once, then stop polling
fn settled(monitor: Monitor) -> Arc<Monitor> {
    monitor.start();
    while monitor.registers().is_none() || monitor.stack().is_empty() || monitor.dump().is_none() {
        thread::sleep(Duration::from_millis(1));
    }
    monitor.stop();
    Arc::new(monitor)
}

fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}

fn render(dashboard: &mut Dashboard, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| dashboard.draw(frame)).unwrap();
    buffer_lines(terminal.backend().buffer())
}

fn contains(lines: &[String], needle: &str) -> bool {
    lines.iter().any(|line| line.contains(needle))
}

#[test]
fn test_registers_render_sorted_and_aligned() {
    let mut dashboard = Dashboard::new(settled(monitor(64, 1)));
    let lines = render(&mut dashboard, 200, 40);

    let eax = lines
        .iter()
        .position(|l| l.contains("   EAX: 0x0000000000000001"))
        .expect("EAX row");
    let ebx = lines
        .iter()
        .position(|l| l.contains("   EBX: 0x00000000000000FF"))
        .expect("EBX row");
    assert_eq!(ebx, eax + 1);
}

#[test]
fn test_narrow_terminal_draws_title_only() {
    let mut dashboard = Dashboard::new(settled(monitor(64, 1)));
    let lines = render(&mut dashboard, 20, 30);

    assert!(contains(&lines, "VirtualBox: test"));
    assert!(!contains(&lines, "CPU Registers"));
    assert!(!contains(&lines, "Stack"));
    assert!(!contains(&lines, "Memory"));
}

#[test]
fn test_large_terminal_draws_every_pane() {
    let mut dashboard = Dashboard::new(settled(monitor(64, 1)));
    let lines = render(&mut dashboard, 200, 40);

    assert!(contains(&lines, "VirtualBox: test"));
    assert!(contains(&lines, "CPU Registers"));
    assert!(contains(&lines, " Stack "));
    assert!(contains(&lines, " Memory "));
    assert!(contains(&lines, "SS:BP:"));
    assert!(contains(&lines, " 0000000000000000: 00 01 02 03"));
}

#[test]
fn test_stack_is_capped_at_sixteen_frames() {
    let mut dashboard = Dashboard::new(settled(monitor(64, 20)));
    let lines = render(&mut dashboard, 200, 40);

    let rows = lines
        .iter()
        .filter(|l| l.contains("0010:00000000000010"))
        .count();
    assert_eq!(rows, 16);
    assert!(contains(
        &lines,
        "0010:0000000000001000 | 0010:0000000000002000 | 0008:0000000000003000 | 0x00000001 | 0x00000002 | 0x00000003 | 0x00000004 | 0008:0000000000004000"
    ));
}

#[test]
fn test_memory_pane_frame_only_without_dump() {
    let mut dashboard = Dashboard::new(Arc::new(monitor(0, 1)));
    let lines = render(&mut dashboard, 200, 40);

    assert!(contains(&lines, " Memory "));
    assert!(!contains(&lines, "offset 0x"));
    assert!(!contains(&lines, "0000000000000000:"));
}

#[test]
fn test_registers_pane_frame_only_without_snapshot() {
    let mut dashboard = Dashboard::new(Arc::new(monitor(64, 1)));
    let lines = render(&mut dashboard, 200, 40);

    assert!(contains(&lines, "CPU Registers"));

    // Registers pane occupies columns 0..30 of rows 3..25
    let pane: Vec<String> = lines[3..25]
        .iter()
        .map(|line| line.chars().take(30).collect())
        .collect();
    assert!(contains(&pane, "CPU Registers"));
    assert!(!contains(&pane, ": 0x"));
}

/// Hands out scripted keys, but only once the dashboard has drawn a frame
/// with memory in it
struct GatedKeys {
    monitor: Rc<OnceCell<Arc<Monitor>>>,
    keys: VecDeque<KeyCode>,
    primed: bool,
}

impl EventSource for GatedKeys {
    fn next_key(&mut self, _timeout: Duration) -> io::Result<Option<KeyCode>> {
        if !self.primed {
            if let Some(monitor) = self.monitor.get() {
                for _ in 0..2000 {
                    if monitor.dump().is_some() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            }
            self.primed = true;
            return Ok(None);
        }
        Ok(Some(self.keys.pop_front().unwrap_or(KeyCode::Char('q'))))
    }
}

fn run_with_keys(keys: &[KeyCode]) -> (Ui<TestBackend, GatedKeys>, Vec<String>) {
    let cell = Rc::new(OnceCell::new());
    let events = GatedKeys {
        monitor: Rc::clone(&cell),
        keys: keys.iter().copied().collect(),
        primed: false,
    };

    let terminal = Terminal::new(TestBackend::new(200, 40)).unwrap();
    let screen = Screen::with_backend(terminal, events, Duration::from_millis(1));
    let mut ui = Ui::new(monitor(4096, 2), screen);
    let _ = cell.set(ui.monitor());

    ui.run().unwrap();

    let lines = buffer_lines(ui.screen().terminal().backend().buffer());
    (ui, lines)
}

#[test]
fn test_quit_stops_polling_and_loop() {
    let (ui, _) = run_with_keys(&[KeyCode::Char('x'), KeyCode::Char('q')]);

    assert!(!ui.monitor().is_running());
    assert_eq!(ui.dashboard().borrow().viewport().offset, 0);
}

#[test]
fn test_memory_navigation_keys() {
    // 200 columns: 44 bytes per line; 40 rows: 11 lines per page
    let (ui, lines) = run_with_keys(&[
        KeyCode::Char('s'),
        KeyCode::Char('s'),
        KeyCode::Char('a'),
    ]);

    assert_eq!(ui.dashboard().borrow().viewport().offset, 44);
    assert!(contains(&lines, " 000000000000002C: 2C 2D 2E 2F"));
    assert!(contains(&lines, "│ ,-./0123"));
}

#[test]
fn test_paging_and_reset_keys() {
    let (ui, _) = run_with_keys(&[KeyCode::Char('f'), KeyCode::Char('f')]);
    assert_eq!(ui.dashboard().borrow().viewport().offset, 968);

    let (ui, _) = run_with_keys(&[KeyCode::Char('f'), KeyCode::Char('d'), KeyCode::Char('d')]);
    assert_eq!(ui.dashboard().borrow().viewport().offset, 0);

    let (ui, _) = run_with_keys(&[KeyCode::Char('f'), KeyCode::Char('s'), KeyCode::Char('g')]);
    assert_eq!(ui.dashboard().borrow().viewport().offset, 0);
}

#[test]
fn test_run_twice_restarts_cleanly() {
    let (mut ui, _) = run_with_keys(&[]);
    assert!(!ui.monitor().is_running());

    // The scripted source is drained, so the second run quits on its first key
    ui.run().unwrap();
    assert!(!ui.monitor().is_running());
}

//! Terminal spinner shown while a quiet build runs.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TICK: Duration = Duration::from_millis(100);

/// Render one spinner frame.
pub fn frame(tick: usize, message: &str) -> String {
    format!("{} {}", FRAMES[tick % FRAMES.len()], message)
}

/// A spinner drawn on stderr by a background thread.
///
/// Nothing is drawn when stderr is not a terminal. The line is cleared on
/// [`Spinner::stop`] (or drop) so later output starts on a clean line.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        if !io::stderr().is_terminal() {
            return Self {
                running,
                handle: None,
            };
        }

        let message = message.into();
        let flag = running.clone();
        let handle = thread::spawn(move || {
            let mut tick = 0usize;
            let mut stderr = io::stderr();
            while flag.load(Ordering::Relaxed) {
                let _ = write!(stderr, "\r{}", frame(tick, &message));
                let _ = stderr.flush();
                tick = tick.wrapping_add(1);
                thread::sleep(TICK);
            }
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.halt();
    }
}

//! Animated progress indicator for in-flight network checks.

use std::io::{self, Write};
use std::time::Duration;

use tokio::sync::oneshot;

const FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Braille spinner that animates on its own task and clears its line when
/// dropped.
pub struct Spinner {
    stop_tx: Option<oneshot::Sender<()>>,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let mut frame = 0usize;
            loop {
                print!("\r{} {}", FRAMES[frame % FRAMES.len()], message);
                let _ = io::stdout().flush();
                frame += 1;

                tokio::select! {
                    _ = tokio::time::sleep(FRAME_INTERVAL) => {}
                    _ = &mut stop_rx => break,
                }
            }
            clear_line();
        });

        Self {
            stop_tx: Some(stop_tx),
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        clear_line();
    }
}

fn clear_line() {
    print!("\r\x1b[K");
    let _ = io::stdout().flush();
}

/// Run a future while a spinner is shown.
pub async fn with_spinner<F, T>(message: impl Into<String>, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let _spinner = Spinner::start(message);
    future.await
}

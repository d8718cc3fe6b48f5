//! Background line reader
//!
//! Blocking reads happen on their own thread so the main loop keeps ticking.
//! Each committed line is sent through a bounded channel; the channel
//! disconnects when input reaches end-of-file.

use crossbeam_channel::{bounded, Receiver};
use std::io::{BufRead, BufReader};
use std::thread;

/// Lines buffered between the reader thread and the main loop
const LINE_CAPACITY: usize = 64;

/// Read stdin on a background thread
pub fn spawn_stdin_reader() -> Receiver<String> {
    spawn_reader(BufReader::new(std::io::stdin()))
}

/// Read `reader` line by line on a background thread
pub fn spawn_reader<R>(reader: R) -> Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = bounded(LINE_CAPACITY);

    let spawned = thread::Builder::new()
        .name("cadence-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let mut line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Stopped reading input: {}", e);
                        break;
                    }
                };
                if line.ends_with('\r') {
                    line.pop();
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
            tracing::debug!("Input reader finished");
        });

    if let Err(e) = spawned {
        tracing::error!("Failed to spawn input reader: {}", e);
    }

    rx
}

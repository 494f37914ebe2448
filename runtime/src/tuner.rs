// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (c) 2024 Takashi Sakamoto

//! The worker which consumes pitch detection frames streamed in tuner mode.
//!
//! While tuner mode is enabled the amplifier streams frames in place of its regular control
//! replies. Each frame carries the index of the detected note and the offset from its pitch in
//! cents. The worker renders them into display strings and publishes them through a channel so
//! that it never blocks on a slow consumer.

use {
    super::{transport::Connection, *},
    crossbeam_channel::{unbounded, Receiver, Sender},
    std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, Mutex,
        },
        thread,
        time::Duration,
    },
    tracing::debug,
    usb_mustang_protocols::packet::PACKET_SIZE,
};

const NOTES: [&str; 13] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "?",
];

/// The index at which the device reports no recognizable note.
const UNKNOWN_NOTE: i8 = 12;

/// The offset in cents up to which a note counts as in tune.
const IN_TUNE_CENTS: i8 = 3;

const INTERVAL: Duration = Duration::from_millis(5);

/// Render one pitch detection frame into its display string. Idle frames yield nothing.
fn render_note(note: i8, cents: i8) -> Option<String> {
    if note == -1 {
        return None;
    }

    let index = note.max(0).min(UNKNOWN_NOTE) as usize;
    let known = index != UNKNOWN_NOTE as usize;
    let sharp = known && cents > IN_TUNE_CENTS;
    let flat = known && cents < -IN_TUNE_CENTS;

    Some(format!(
        "{} {} {}",
        if sharp { ">>" } else { " " },
        NOTES[index],
        if flat { "<<" } else { " " },
    ))
}

/// The feed which consumes tuner frames on a dedicated worker and publishes display strings.
///
/// The feed is a child activity of a running session; enable tuner mode before starting it and
/// disable the mode to terminate it. Dropping the feed cancels the worker as well.
pub struct TunerFeed {
    stop: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl TunerFeed {
    /// Launch the worker on the shared transport. The stop flag comes from the session; it is
    /// raised by `set_tuner(false)` and observed once per iteration.
    pub fn start<C>(conn: Arc<Mutex<C>>, stop: Arc<AtomicBool>) -> (Self, Receiver<String>)
    where
        C: Connection + 'static,
    {
        let (tx, rx) = unbounded();
        let flag = Arc::clone(&stop);
        let worker = thread::spawn(move || feed_loop(conn, flag, tx));

        (
            Self {
                stop,
                worker: Some(worker),
            },
            rx,
        )
    }

    /// Wait for the worker to observe the stop flag and terminate.
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for TunerFeed {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                debug!("the tuner worker panicked");
            }
        }
    }
}

fn feed_loop<C: Connection>(conn: Arc<Mutex<C>>, stop: Arc<AtomicBool>, tx: Sender<String>) {
    while !stop.load(Ordering::SeqCst) {
        let frame = match conn.lock() {
            Ok(mut conn) => match conn.receive(PACKET_SIZE) {
                Ok(frame) => frame,
                Err(_) => break,
            },
            Err(_) => break,
        };

        if frame.len() >= 2 {
            if let Some(text) = render_note(frame[0] as i8, frame[1] as i8) {
                if tx.send(text).is_err() {
                    break;
                }
            }
        }

        thread::sleep(INTERVAL);
    }

    // Consume whatever the amplifier still streams so that later control traffic reads clean.
    while let Ok(mut conn) = conn.lock() {
        match conn.receive(PACKET_SIZE) {
            Ok(frame) if !frame.is_empty() => (),
            _ => break,
        }
    }

    debug!("tuner worker finished");
}

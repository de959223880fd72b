//! Terminal event reader running in a background tokio task.
//!
//! Key, mouse and resize events pass straight through. `Render` fires at a
//! fixed frame rate. `Tick` only drives the loading throbber and toast expiry,
//! so it is paced to the throbber frame and paused while neither is on screen.

use std::io;
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// One throbber frame. Toast expiry is checked on the same beat.
pub const THROBBER_FRAME: Duration = Duration::from_millis(120);

/// ~30 FPS.
pub const RENDER_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    /// Advance the throbber and expire toasts. Only sent while animating.
    Tick,
    Render,
}

/// Keep key presses, mouse and resize. Releases, repeats, focus and paste
/// events are dropped.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    animating: watch::Sender<bool>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Read the real terminal. Ticks start paused.
    pub fn spawn() -> Self {
        Self::from_stream(EventStream::new(), THROBBER_FRAME, RENDER_INTERVAL)
    }

    /// Spawn the reader over any crossterm event source.
    pub fn from_stream<S>(mut events: S, tick_rate: Duration, render_rate: Duration) -> Self
    where
        S: Stream<Item = io::Result<CrosstermEvent>> + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (animating, mut animating_rx) = watch::channel(false);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut tick_interval = tokio::time::interval(tick_rate);
            let mut render_interval = tokio::time::interval(render_rate);

            tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let ticking = *animating_rx.borrow();
                let event = tokio::select! {
                    () = task_cancel.cancelled() => break,

                    Ok(()) = animating_rx.changed() => {
                        // First frame of a new animation lands one beat later
                        tick_interval.reset();
                        continue;
                    }

                    _ = tick_interval.tick(), if ticking => Event::Tick,

                    _ = render_interval.tick() => Event::Render,

                    Some(Ok(crossterm_event)) = events.next() => {
                        match translate(crossterm_event) {
                            Some(event) => event,
                            None => continue,
                        }
                    }
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            animating,
            cancel,
        }
    }

    /// Resume or pause `Tick` events. Repeating the current state is a no-op.
    pub fn set_animating(&self, on: bool) {
        self.animating.send_if_modified(|current| {
            let changed = *current != on;
            *current = on;
            changed
        });
    }

    /// Receive the next event. Returns `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

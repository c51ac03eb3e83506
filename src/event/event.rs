use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;

use super::key::Key;

pub enum Event<I> {
    Input(I),
    Tick,
}

/// Terminal event pump. A background thread polls crossterm and forwards
/// key presses over a channel; the tick event drives periodic redraws.
pub struct Events {
    rx: mpsc::Receiver<Event<Key>>,
    _tx: mpsc::Sender<Event<Key>>,
}

impl Events {
    pub fn new(tick_rate: u64) -> Events {
        let (tx, rx) = mpsc::channel();
        let event_tx = tx.clone();

        thread::spawn(move || loop {
            let poll = crossterm::event::poll(Duration::from_millis(tick_rate)).unwrap_or(false);
            if poll {
                if let Ok(crossterm::event::Event::Key(key)) = crossterm::event::read() {
                    let key = Key::from(key);
                    if event_tx.send(Event::Input(key)).is_err() {
                        debug!("event receiver dropped, stopping input thread");
                        return;
                    }
                }
            }
            if event_tx.send(Event::Tick).is_err() {
                return;
            }
        });

        Events { rx, _tx: tx }
    }

    /// Attempt to read an event.
    pub fn next(&self) -> anyhow::Result<Event<Key>> {
        Ok(self.rx.recv()?)
    }
}

//! Terminal event abstraction.
//!
//! A reader thread blocks on crossterm and forwards events over a channel;
//! the main loop redraws only when something arrives. The thread is plain
//! `std` so the runtime never waits on it at shutdown.

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

/// Events the browser reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

impl AppEvent {
    /// Translate a crossterm event; focus changes, pastes and key
    /// releases are dropped.
    fn from_crossterm(ev: CtEvent) -> Option<Self> {
        match ev {
            CtEvent::Key(k) if k.kind != KeyEventKind::Release => Some(Self::Key(k)),
            CtEvent::Mouse(m) => Some(Self::Mouse(m)),
            CtEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Spawn the reader thread and return its channel.
pub fn spawn_event_reader() -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(ev) => ev,
            Err(err) => {
                tracing::error!("terminal event read failed: {err}");
                break;
            }
        };
        let Some(app_event) = AppEvent::from_crossterm(ev) else {
            continue;
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn releases_and_focus_are_dropped() {
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(AppEvent::from_crossterm(CtEvent::Key(release)).is_none());
        assert!(AppEvent::from_crossterm(CtEvent::FocusGained).is_none());

        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(
            AppEvent::from_crossterm(CtEvent::Key(press)),
            Some(AppEvent::Key(_))
        ));
        assert!(matches!(
            AppEvent::from_crossterm(CtEvent::Resize(80, 24)),
            Some(AppEvent::Resize(80, 24))
        ));
    }
}

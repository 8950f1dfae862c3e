use std::io;
use std::time::Duration;

use crossterm::event::Event;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Source of terminal input events. Abstracted so tests can feed scripted
/// events without a real terminal.
pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }
}

/// Crossterm-backed driver for the real terminal.
#[derive(Debug, Default)]
pub struct ConsoleInputDriver;

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        crossterm::event::read()
    }
}

/// The centralized loop that drives the UI thread.
///
/// This is the only place that polls or reads input. Background work
/// (scheduled canned replies, remote token streams) runs on its own timers
/// or threads and is drained into state on the `None` tick, which fires
/// every `poll_interval` even without input.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    /// Runs until the handler returns [`ControlFlow::Quit`]. The handler is
    /// called with `None` once per interval (tick) and with `Some(event)`
    /// for every input event. Bursts are drained in one pass so rendering
    /// does not fall behind a fast mouse-drag or paste.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(None)? {
                break;
            }
            if self.driver.poll(self.poll_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    struct Scripted {
        events: Vec<Event>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            Ok(self.events.remove(0))
        }
    }

    #[test]
    fn loop_delivers_ticks_and_events_until_quit() {
        let driver = Scripted {
            events: vec![
                Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
                Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            ],
        };
        let mut seen = Vec::new();
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(0));
        event_loop
            .run(|event| {
                match event {
                    None => seen.push('t'),
                    Some(Event::Key(key)) => {
                        if let KeyCode::Char(c) = key.code {
                            seen.push(c);
                            if c == 'q' {
                                return Ok(ControlFlow::Quit);
                            }
                        }
                    }
                    Some(_) => {}
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec!['t', 'a', 'q']);
    }
}

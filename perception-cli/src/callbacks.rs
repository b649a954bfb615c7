//! Notification subscribers
//!
//! Each sink is a bus callback that owns its writer. Write failures are
//! logged and do not stop the run.

use crate::config::OutputFormat;
use perception_decoder::{EventBus, Notification, SubscriptionId};
use std::io::Write;

/// Prints `Event : <name> started at <start> ended at <end>`
pub fn text_sink<W: Write + 'static>(mut out: W) -> impl FnMut(&Notification) -> bool {
    move |notification| {
        if let Err(e) = writeln!(out, "{}", notification).and_then(|_| out.flush()) {
            log::error!("Failed to write notification: {}", e);
        }
        false
    }
}

/// Prints one JSON object per notification
pub fn json_sink<W: Write + 'static>(mut out: W) -> impl FnMut(&Notification) -> bool {
    move |notification| {
        let line = match serde_json::to_string(notification) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to serialize notification: {}", e);
                return false;
            }
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            log::error!("Failed to write notification: {}", e);
        }
        false
    }
}

/// Register the sink for `format` on `bus`
pub fn subscribe<W: Write + 'static>(
    bus: &mut EventBus<Notification>,
    format: OutputFormat,
    out: W,
) -> SubscriptionId {
    match format {
        OutputFormat::Text => bus.register(text_sink(out)),
        OutputFormat::Json => bus.register(json_sink(out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Writer whose contents stay readable after the sink takes ownership
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_text_sink_format() {
        let buffer = SharedBuffer::default();
        let mut bus = EventBus::new();
        subscribe(&mut bus, OutputFormat::Text, buffer.clone());

        bus.fire(&Notification::new("Eyes closed", 0.5, 2.55));
        assert_eq!(
            buffer.contents(),
            "Event : Eyes closed started at 0.5 ended at 2.55\n"
        );
    }

    #[test]
    fn test_json_sink_lines() {
        let buffer = SharedBuffer::default();
        let mut bus = EventBus::new();
        subscribe(&mut bus, OutputFormat::Json, buffer.clone());

        bus.fire(&Notification::new("Eyes closed", 0.5, 2.55));
        bus.fire(&Notification::new("Looking away", 3.0, 6.0));

        let contents = buffer.contents();
        let parsed: Vec<Notification> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            parsed,
            vec![
                Notification::new("Eyes closed", 0.5, 2.55),
                Notification::new("Looking away", 3.0, 6.0),
            ]
        );
    }

    #[test]
    fn test_write_failure_does_not_panic() {
        let mut bus = EventBus::new();
        subscribe(&mut bus, OutputFormat::Text, BrokenPipe);
        assert_eq!(bus.fire(&Notification::new("Eyes closed", 0.0, 3.0)), 1);
    }
}

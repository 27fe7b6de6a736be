//! Applies window geometry writes off the taskbar thread.
//!
//! Accessibility writes can block on the window server, so they run on a
//! dedicated thread. Commands are applied strictly in submission order and
//! both writes of a command finish before the next command starts: the
//! position must be re-asserted after the resize because some applications
//! move their origin while shrinking.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{debug, info_span, trace, warn};

use crate::sys::ax::GeometryHandle;
use crate::sys::geometry::{Point, Size};
use crate::sys::window_server::WindowId;

pub const QUEUE_CAPACITY: usize = 256;

pub struct GeometryCommand {
    pub window: WindowId,
    pub handle: Arc<dyn GeometryHandle>,
    pub size: Size,
    pub position: Point,
}

static_assertions::assert_impl_all!(GeometryCommand: Send);

impl fmt::Debug for GeometryCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryCommand")
            .field("window", &self.window)
            .field("size", &self.size)
            .field("position", &self.position)
            .finish()
    }
}

#[derive(Clone)]
pub struct GeometryQueue {
    tx: Sender<GeometryCommand>,
}

pub fn queue(capacity: usize) -> (GeometryQueue, Receiver<GeometryCommand>) {
    let (tx, rx) = bounded(capacity);
    (GeometryQueue { tx }, rx)
}

impl GeometryQueue {
    /// Queues `cmd` without blocking. Returns false if the command was
    /// dropped; the next trigger for the window will plan it again.
    pub fn submit(&self, cmd: GeometryCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                warn!(window = %cmd.window, "Geometry queue full; dropping resize");
                false
            }
            Err(TrySendError::Disconnected(cmd)) => {
                debug!(window = %cmd.window, "Geometry worker is gone; dropping resize");
                false
            }
        }
    }
}

pub struct GeometryWorker;

impl GeometryWorker {
    /// Runs until every [`GeometryQueue`] for `rx` has been dropped and the
    /// remaining commands are drained.
    pub fn spawn(rx: Receiver<GeometryCommand>) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name("taskbar-geometry".to_string()).spawn(move || {
            for cmd in rx {
                Self::apply(&cmd);
            }
            trace!("Geometry worker exiting");
        })
    }

    /// Best effort. A rejected write is logged and the command abandoned.
    pub fn apply(cmd: &GeometryCommand) -> bool {
        let span = info_span!("geometry_worker::apply", window = %cmd.window);
        let _s = span.enter();

        if let Err(e) = cmd.handle.set_size(cmd.size) {
            warn!(size = ?cmd.size, "Failed to resize window: {e}");
            return false;
        }
        if let Err(e) = cmd.handle.set_position(cmd.position) {
            warn!(position = ?cmd.position, "Failed to re-assert window position: {e}");
            return false;
        }
        trace!(size = ?cmd.size, position = ?cmd.position, "Adjusted window");
        true
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::ax::AxError;

    #[derive(Debug, Clone, PartialEq)]
    enum Write {
        Size(u32, Size),
        Position(u32, Point),
    }

    struct RecordingHandle {
        id: u32,
        reject_size: bool,
        log: Arc<Mutex<Vec<Write>>>,
    }

    impl GeometryHandle for RecordingHandle {
        fn set_size(&self, size: Size) -> Result<(), AxError> {
            if self.reject_size {
                return Err(AxError::InvalidElement);
            }
            self.log.lock().push(Write::Size(self.id, size));
            Ok(())
        }

        fn set_position(&self, position: Point) -> Result<(), AxError> {
            self.log.lock().push(Write::Position(self.id, position));
            Ok(())
        }
    }

    fn command(id: u32, reject_size: bool, log: &Arc<Mutex<Vec<Write>>>) -> GeometryCommand {
        GeometryCommand {
            window: WindowId::new(id),
            handle: Arc::new(RecordingHandle { id, reject_size, log: log.clone() }),
            size: Size::new(100.0, id as f64),
            position: Point::new(0.0, id as f64),
        }
    }

    #[test_log::test]
    fn applies_commands_in_submission_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, rx) = queue(QUEUE_CAPACITY);
        let worker = GeometryWorker::spawn(rx).unwrap();

        assert!(queue.submit(command(1, false, &log)));
        assert!(queue.submit(command(2, false, &log)));
        drop(queue);
        worker.join().unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                Write::Size(1, Size::new(100.0, 1.0)),
                Write::Position(1, Point::new(0.0, 1.0)),
                Write::Size(2, Size::new(100.0, 2.0)),
                Write::Position(2, Point::new(0.0, 2.0)),
            ]
        );
    }

    #[test_log::test]
    fn rejected_command_does_not_block_later_work() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, rx) = queue(QUEUE_CAPACITY);
        let worker = GeometryWorker::spawn(rx).unwrap();

        queue.submit(command(1, true, &log));
        queue.submit(command(2, false, &log));
        drop(queue);
        worker.join().unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                Write::Size(2, Size::new(100.0, 2.0)),
                Write::Position(2, Point::new(0.0, 2.0)),
            ]
        );
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, _rx) = queue(1);

        assert!(queue.submit(command(1, false, &log)));
        assert!(!queue.submit(command(2, false, &log)));
    }

    #[test]
    fn submit_after_worker_exit_is_dropped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, rx) = queue(4);
        drop(rx);

        assert!(!queue.submit(command(1, false, &log)));
    }
}

//! Sender loop
//!
//! The single consumer of a connection's dispatch queue. It owns the
//! transport and the current baud rate, writes each command in queue order,
//! and reopens the port when a Baud command switches rates.
//!
//! States:
//! - `Draining`: pulling commands and writing them
//! - `Reconfiguring`: closing and reopening the port after a Baud command
//! - `Terminated`: queue closed and empty, transport released
//!
//! A reconfiguration runs to completion before the next command is pulled,
//! so ordering holds across a rate change.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use super::{BaudRate, Command, Transport, TransportOpener};

/// Blocking delay source used for pacing and settling
pub trait Sleeper: Send {
    /// Block for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sender loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SenderState {
    Draining,
    Reconfiguring,
    Terminated,
}

/// Timing and port settings the loop needs after open
#[derive(Debug, Clone)]
pub(crate) struct SenderSettings {
    /// Port to reopen on a baud change
    pub port_name: String,
    /// Delay before each paced byte
    pub byte_delay: Duration,
    /// Delay after reopening at a new rate
    pub settle_delay: Duration,
}

pub(crate) struct Sender {
    transport: Box<dyn Transport>,
    opener: Box<dyn TransportOpener>,
    sleeper: Box<dyn Sleeper>,
    baud: BaudRate,
    state: SenderState,
    settings: SenderSettings,
}

impl Sender {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        opener: Box<dyn TransportOpener>,
        sleeper: Box<dyn Sleeper>,
        baud: BaudRate,
        settings: SenderSettings,
    ) -> Self {
        Self {
            transport,
            opener,
            sleeper,
            baud,
            state: SenderState::Draining,
            settings,
        }
    }

    /// Drain `queue` until it is closed and empty, then release the transport
    pub(crate) fn run(mut self, mut queue: UnboundedReceiver<Command>) {
        info!(port = %self.settings.port_name, baud = %self.baud, "sender started");

        while let Some(command) = queue.blocking_recv() {
            self.dispatch(command);
        }

        self.terminate();
    }

    fn dispatch(&mut self, command: Command) {
        let data = command.encode();
        debug!(
            opcode = ?command.opcode(),
            len = data.len(),
            baud = %self.baud,
            state = ?self.state,
            "writing command"
        );
        self.transmit(&data);

        if let Some(rate) = command.baud_change() {
            self.reconfigure(rate);
        }
    }

    /// Write one encoded command using the current rate's discipline
    fn transmit(&mut self, data: &[u8]) {
        if self.baud.is_paced() {
            for (i, byte) in data.iter().enumerate() {
                self.sleeper.sleep(self.settings.byte_delay);
                if let Err(e) = self.transport.write(std::slice::from_ref(byte)) {
                    warn!(
                        "paced write failed at byte {} of {}: {} (dropping rest of command)",
                        i,
                        data.len(),
                        e
                    );
                    return;
                }
            }
        } else if let Err(e) = self.transport.write(data) {
            warn!("write of {} bytes failed: {}", data.len(), e);
        }
    }

    /// Close the port, reopen it at `rate`, and wait for the device to settle
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be reopened; the loop has no transport left
    /// to serve the rest of the queue.
    fn reconfigure(&mut self, rate: BaudRate) {
        self.state = SenderState::Reconfiguring;
        info!(from = %self.baud, to = %rate, "changing baud rate");

        if let Err(e) = self.transport.close() {
            warn!("closing port before baud change failed: {}", e);
        }
        self.baud = rate;

        match self.opener.open(&self.settings.port_name, rate) {
            Ok(transport) => self.transport = transport,
            Err(e) => {
                error!(
                    port = %self.settings.port_name,
                    baud = %rate,
                    "failed to re-open serial port after baud rate change: {}",
                    e
                );
                panic!("Failed to re-open serial port after baud rate change: {e}");
            }
        }

        self.sleeper.sleep(self.settings.settle_delay);
        self.state = SenderState::Draining;
    }

    fn terminate(&mut self) {
        if let Err(e) = self.transport.close() {
            warn!("closing port failed: {}", e);
        }
        self.state = SenderState::Terminated;
        info!(port = %self.settings.port_name, "sender terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolError;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    type Log = Arc<Mutex<Vec<String>>>;

    struct LogTransport(Log);

    impl Transport for LogTransport {
        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.0.lock().unwrap().push(format!("write {:?}", data));
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            self.0.lock().unwrap().push("close".to_string());
            Ok(())
        }
    }

    struct LogOpener(Log);

    impl TransportOpener for LogOpener {
        fn open(
            &mut self,
            _port: &str,
            baud: BaudRate,
        ) -> Result<Box<dyn Transport>, ProtocolError> {
            self.0.lock().unwrap().push(format!("open {}", baud));
            Ok(Box::new(LogTransport(self.0.clone())))
        }
    }

    struct LogSleeper(Log);

    impl Sleeper for LogSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.0.lock().unwrap().push(format!("sleep {:?}", duration));
        }
    }

    fn sender(log: &Log, baud: BaudRate) -> Sender {
        Sender::new(
            Box::new(LogTransport(log.clone())),
            Box::new(LogOpener(log.clone())),
            Box::new(LogSleeper(log.clone())),
            baud,
            SenderSettings {
                port_name: "test".to_string(),
                byte_delay: Duration::from_micros(200),
                settle_delay: Duration::from_millis(100),
            },
        )
    }

    #[test]
    fn test_burst_write() {
        let log = Log::default();
        let mut s = sender(&log, BaudRate::B57600);
        s.dispatch(Command::play_song(2).unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["write [141, 2]"]);
    }

    #[test]
    fn test_paced_write() {
        let log = Log::default();
        let mut s = sender(&log, BaudRate::B115200);
        s.dispatch(Command::play_song(2).unwrap());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["sleep 200µs", "write [141]", "sleep 200µs", "write [2]"]
        );
    }

    #[test]
    fn test_pacing_follows_rate() {
        for rate in BaudRate::ALL {
            let log = Log::default();
            let mut s = sender(&log, rate);
            s.dispatch(Command::play_song(2).unwrap());
            let expected = if rate == BaudRate::B115200 {
                vec!["sleep 200µs", "write [141]", "sleep 200µs", "write [2]"]
            } else {
                vec!["write [141, 2]"]
            };
            assert_eq!(*log.lock().unwrap(), expected, "rate {}", rate);
        }
    }

    #[test]
    fn test_reconfigure_returns_to_draining() {
        let log = Log::default();
        let mut s = sender(&log, BaudRate::B57600);
        s.dispatch(Command::baud(9600).unwrap());
        assert_eq!(s.state, SenderState::Draining);
        assert_eq!(s.baud, BaudRate::B9600);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["write [129, 5]", "close", "open 9600", "sleep 100ms"]
        );
    }

    #[test]
    fn test_run_drains_then_terminates() {
        let log = Log::default();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Command::start()).unwrap();
        tx.send(Command::full()).unwrap();
        drop(tx);

        sender(&log, BaudRate::B57600).run(rx);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["write [128]", "write [132]", "close"]
        );
    }
}

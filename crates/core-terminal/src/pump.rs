//! Stdin byte pump.
//!
//! A dedicated thread performs blocking reads on stdin and forwards chunks over
//! a bounded channel. The consumer side waits at most `byte_timeout` per byte,
//! which gives the raw-mode "return after a short timeout" read contract
//! without touching termios timing fields.

use crate::{ByteSource, TermError};
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const PUMP_CHANNEL_CAP: usize = 64;
const READ_CHUNK: usize = 256;

enum PumpMsg {
    Bytes(Vec<u8>),
    Failed(io::Error),
}

pub struct StdinPump {
    rx: Receiver<PumpMsg>,
    pending: VecDeque<u8>,
    byte_timeout: Duration,
}

impl StdinPump {
    pub fn spawn(byte_timeout: Duration) -> Self {
        let (tx, rx) = bounded(PUMP_CHANNEL_CAP);
        thread::Builder::new()
            .name("stdin-pump".into())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    let msg = match stdin.read(&mut buf) {
                        Ok(0) => {
                            debug!(target: "terminal", "stdin_eof");
                            break;
                        }
                        Ok(n) => PumpMsg::Bytes(buf[..n].to_vec()),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => PumpMsg::Failed(e),
                    };
                    let failed = matches!(msg, PumpMsg::Failed(_));
                    if tx.send(msg).is_err() || failed {
                        break;
                    }
                }
            })
            .map_or_else(
                |e| warn!(target: "terminal", ?e, "stdin_pump_spawn_failed"),
                |_| debug!(target: "terminal", ?byte_timeout, "stdin_pump_started"),
            );
        Self {
            rx,
            pending: VecDeque::new(),
            byte_timeout,
        }
    }
}

impl ByteSource for StdinPump {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        if let Some(b) = self.pending.pop_front() {
            return Ok(Some(b));
        }
        match self.rx.recv_timeout(self.byte_timeout) {
            Ok(PumpMsg::Bytes(bytes)) => {
                self.pending.extend(bytes);
                Ok(self.pending.pop_front())
            }
            Ok(PumpMsg::Failed(e)) => Err(TermError::Read(e)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TermError::Disconnected),
        }
    }
}

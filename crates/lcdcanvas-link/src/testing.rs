//! In-memory port that answers from a script.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::config::BaudRate;
use crate::port::PortOpener;

/// What the next read of the port returns
#[derive(Debug, Clone)]
pub enum Read {
    Data(Vec<u8>),
    Timeout,
    Fail,
}

impl Read {
    pub fn line(text: &str) -> Self {
        Read::Data(format!("{text}\n").into_bytes())
    }
}

#[derive(Default)]
struct Shared {
    script: RefCell<VecDeque<Read>>,
    written: RefCell<Vec<u8>>,
    opened: RefCell<Vec<(String, BaudRate)>>,
    live: Cell<usize>,
}

/// Opener handing out ports that share one script and one write log
#[derive(Clone)]
pub struct ScriptedOpener {
    shared: Rc<Shared>,
    fail: bool,
}

impl ScriptedOpener {
    pub fn new(script: Vec<Read>) -> Self {
        let shared = Shared { script: RefCell::new(script.into()), ..Shared::default() };
        Self { shared: Rc::new(shared), fail: false }
    }

    pub fn failing() -> Self {
        Self { shared: Rc::default(), fail: true }
    }

    /// Everything written so far, across every opened port
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.shared.written.borrow()).into_owned()
    }

    pub fn opened(&self) -> Vec<(String, BaudRate)> {
        self.shared.opened.borrow().clone()
    }

    /// Ports opened and not dropped yet
    pub fn open_ports(&self) -> usize {
        self.shared.live.get()
    }
}

impl PortOpener for ScriptedOpener {
    type Port = ScriptedPort;

    fn open(
        &mut self,
        name: &str,
        baud: BaudRate,
        _read_timeout: Duration,
    ) -> io::Result<ScriptedPort> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such port"));
        }
        self.shared.opened.borrow_mut().push((name.to_string(), baud));
        self.shared.live.set(self.shared.live.get() + 1);
        Ok(ScriptedPort { shared: Rc::clone(&self.shared) })
    }
}

pub struct ScriptedPort {
    shared: Rc<Shared>,
}

impl io::Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let next = self.shared.script.borrow_mut().pop_front();
        match next {
            Some(Read::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    self.shared.script.borrow_mut().push_front(Read::Data(rest));
                }
                Ok(n)
            }
            // A silent device looks like a timeout
            Some(Read::Timeout) | None => {
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
            }
            Some(Read::Fail) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged")),
        }
    }
}

impl io::Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.shared.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ScriptedPort {
    fn drop(&mut self) {
        self.shared.live.set(self.shared.live.get() - 1);
    }
}

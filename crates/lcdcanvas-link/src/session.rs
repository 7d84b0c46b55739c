//! Request/response exchange with the display.
//!
//! Every command line is answered by exactly one response line. Reads that
//! time out count as empty. An empty first read gets one more chance after
//! a short wait; whatever the second read returns is the response.

use std::io::{self, BufRead, BufReader, Write};
use std::thread;

use lcdcanvas_export::Command;
use tracing::{debug, info, warn};

use crate::config::{BaudRate, LinkConfig};
use crate::error::LinkError;
use crate::port::PortOpener;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Exclusive owner of the port to one display
pub struct LinkSession<O: PortOpener> {
    opener: O,
    config: LinkConfig,
    state: LinkState,
    port: Option<BufReader<O::Port>>,
    port_name: Option<String>,
}

impl<O: PortOpener> LinkSession<O> {
    pub fn new(opener: O, config: LinkConfig) -> Self {
        Self {
            opener,
            config,
            state: LinkState::Disconnected,
            port: None,
            port_name: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Open a port, releasing any port held before
    pub fn connect(&mut self, name: &str, baud: BaudRate) -> Result<(), LinkError> {
        self.disconnect();

        self.state = LinkState::Connecting;
        info!(port = name, %baud, "connecting");
        let port = match self.opener.open(name, baud, self.config.read_timeout) {
            Ok(port) => port,
            Err(source) => {
                self.state = LinkState::Disconnected;
                return Err(LinkError::Connection { port: name.to_string(), source });
            }
        };

        thread::sleep(self.config.settle);
        self.port = Some(BufReader::new(port));
        self.port_name = Some(name.to_string());
        self.state = LinkState::Connected;
        info!(port = name, "connected");
        Ok(())
    }

    /// Release the port
    pub fn disconnect(&mut self) {
        if self.port.take().is_some() {
            info!(port = self.port_name.as_deref().unwrap_or_default(), "disconnected");
        }
        self.port_name = None;
        self.state = LinkState::Disconnected;
    }

    /// Send one command line and return its response, possibly empty
    pub fn send_command(&mut self, line: &str) -> Result<String, LinkError> {
        let config = self.config;
        let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;
        match exchange(port, &config, line) {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(error = %err, command = line, "serial i/o failed, dropping connection");
                self.disconnect();
                Err(LinkError::Communication(err))
            }
        }
    }

    /// Send commands in order and return the response to the last one
    pub fn send_group(&mut self, commands: &[Command]) -> Result<String, LinkError> {
        let mut last = String::new();
        for command in commands {
            last = self.send_command(&command.to_string())?;
        }
        Ok(last)
    }

    /// Clear the display to black
    pub fn clear_screen(&mut self) -> Result<String, LinkError> {
        self.send_command(&Command::CLEAR_BLACK.to_string())
    }
}

fn exchange<P: io::Read + Write>(
    port: &mut BufReader<P>,
    config: &LinkConfig,
    line: &str,
) -> io::Result<String> {
    let writer = port.get_mut();
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!(command = line, "sent");

    thread::sleep(config.command_delay);
    let mut response = read_response(port)?;
    if response.is_empty() {
        warn!(command = line, "empty response, reading once more");
        thread::sleep(config.retry_delay);
        response = read_response(port)?;
    }
    debug!(%response, "received");
    Ok(response)
}

/// Read one line. A timeout ends the line early instead of failing.
fn read_response<P: io::Read>(port: &mut BufReader<P>) -> io::Result<String> {
    let mut buf = Vec::new();
    match port.read_until(b'\n', &mut buf) {
        Ok(_) => {}
        Err(err) if matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
        Err(err) => return Err(err),
    }
    Ok(String::from_utf8_lossy(&buf).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Read, ScriptedOpener};
    use lcdcanvas_core::Rgb;
    use proptest::prelude::*;

    fn connected(script: Vec<Read>) -> (LinkSession<ScriptedOpener>, ScriptedOpener) {
        let opener = ScriptedOpener::new(script);
        let mut session = LinkSession::new(opener.clone(), LinkConfig::immediate());
        session.connect("/dev/ttyTEST", BaudRate::default()).unwrap();
        (session, opener)
    }

    #[test]
    fn commands_need_a_connection() {
        let mut session = LinkSession::new(ScriptedOpener::new(vec![]), LinkConfig::immediate());
        assert_eq!(session.state(), LinkState::Disconnected);
        assert!(matches!(session.send_command("flush"), Err(LinkError::NotConnected)));
    }

    #[test]
    fn writes_newline_terminated_lines() {
        let (mut session, opener) = connected(vec![Read::line("ok"), Read::line("ok")]);
        session.send_command("setColor|1|2|3").unwrap();
        session.send_command("flush").unwrap();
        assert_eq!(opener.written(), "setColor|1|2|3\nflush\n");
        assert_eq!(opener.opened(), [("/dev/ttyTEST".to_string(), BaudRate::B115200)]);
    }

    #[test]
    fn response_is_trimmed() {
        let (mut session, _) = connected(vec![Read::line("  done \r")]);
        assert_eq!(session.send_command("flush").unwrap(), "done");
    }

    #[test]
    fn empty_then_response_uses_the_retry() {
        let (mut session, _) = connected(vec![Read::line(""), Read::line("ok")]);
        assert_eq!(session.send_command("flush").unwrap(), "ok");
    }

    #[test]
    fn timeout_counts_as_empty() {
        let (mut session, _) = connected(vec![Read::Timeout, Read::line("late")]);
        assert_eq!(session.send_command("flush").unwrap(), "late");
    }

    #[test]
    fn empty_twice_is_accepted() {
        let (mut session, _) = connected(vec![Read::Timeout, Read::Timeout]);
        assert_eq!(session.send_command("flush").unwrap(), "");
        assert!(session.is_connected());
    }

    #[test]
    fn io_failure_drops_the_connection() {
        let (mut session, _) = connected(vec![Read::Fail]);
        assert!(matches!(session.send_command("flush"), Err(LinkError::Communication(_))));
        assert_eq!(session.state(), LinkState::Disconnected);
        assert!(matches!(session.send_command("flush"), Err(LinkError::NotConnected)));
    }

    #[test]
    fn failed_open_stays_disconnected() {
        let opener = ScriptedOpener::failing();
        let mut session = LinkSession::new(opener, LinkConfig::immediate());
        let err = session.connect("/dev/missing", BaudRate::B9600).unwrap_err();
        assert!(matches!(err, LinkError::Connection { ref port, .. } if port == "/dev/missing"));
        assert_eq!(session.state(), LinkState::Disconnected);
        assert_eq!(session.port_name(), None);
    }

    #[test]
    fn reconnect_releases_the_old_port() {
        let (mut session, opener) = connected(vec![]);
        session.connect("/dev/ttyOTHER", BaudRate::B9600).unwrap();
        assert_eq!(opener.open_ports(), 1);
        assert_eq!(session.port_name(), Some("/dev/ttyOTHER"));

        session.disconnect();
        assert_eq!(opener.open_ports(), 0);
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[test]
    fn group_returns_last_response() {
        let (mut session, opener) =
            connected(vec![Read::line("a"), Read::line("b"), Read::line("c")]);
        let group = [
            Command::SetColor(Rgb::WHITE),
            Command::DrawLine { x1: 0, y1: 0, x2: 1, y2: 1 },
            Command::Flush,
        ];
        assert_eq!(session.send_group(&group).unwrap(), "c");
        assert_eq!(opener.written(), "setColor|255|255|255\ndrawLine|0|0|1|1\nflush\n");
    }

    #[test]
    fn clear_screen_sends_black_clear() {
        let (mut session, opener) = connected(vec![Read::line("ok")]);
        session.clear_screen().unwrap();
        assert_eq!(opener.written(), "clear|0|0|0\n");
    }

    proptest! {
        #[test]
        fn response_is_first_non_empty_of_two_reads(first in "[a-z]{0,3}", second in "[a-z]{0,3}") {
            let (mut session, _) = connected(vec![Read::line(&first), Read::line(&second)]);
            let expected = if first.is_empty() { second } else { first };
            prop_assert_eq!(session.send_command("flush").unwrap(), expected);
        }
    }
}

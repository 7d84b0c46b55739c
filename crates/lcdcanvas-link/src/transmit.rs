//! Sending a whole scene to the display.

use std::ops::ControlFlow;
use std::thread;

use lcdcanvas_core::Scene;
use lcdcanvas_export::{Command, translate_scene};
use tracing::{info, warn};

use crate::error::LinkError;
use crate::port::PortOpener;
use crate::session::LinkSession;

/// Outcome of a transmission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmitReport {
    /// Shapes sent
    pub items: usize,
    /// Shapes in the scene
    pub total: usize,
    /// Response to the last command of each sent shape
    pub responses: Vec<String>,
    /// Whether every shape went out
    pub completed: bool,
}

impl<O: PortOpener> LinkSession<O> {
    /// Clear the display and draw the scene shape by shape.
    ///
    /// `progress` is called with the 1-based number of the shape about to be
    /// sent and the shape count; returning `Break` stops before that shape.
    /// A shape whose final command gets no response even after the retry
    /// aborts the transmission and drops the connection.
    pub fn send_scene<F>(
        &mut self,
        scene: &Scene,
        mut progress: F,
    ) -> Result<TransmitReport, LinkError>
    where
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }

        let groups = translate_scene(scene);
        let mut report = TransmitReport { total: groups.len(), ..TransmitReport::default() };
        info!(shapes = report.total, "sending scene");

        self.send_command(&Command::CLEAR_BLACK.to_string())?;
        thread::sleep(self.config().clear_settle);

        for (index, group) in groups.iter().enumerate() {
            let item = index + 1;
            if progress(item, report.total).is_break() {
                info!(sent = report.items, total = report.total, "transmission stopped");
                return Ok(report);
            }

            let response = self.send_group(group)?;
            if response.is_empty() {
                warn!(item, "no response from the display, aborting transmission");
                self.disconnect();
                return Err(LinkError::NoResponse { item });
            }
            report.responses.push(response);
            report.items += 1;
            thread::sleep(self.config().item_delay);
        }

        report.completed = true;
        info!(sent = report.items, "scene sent");
        Ok(report)
    }
}

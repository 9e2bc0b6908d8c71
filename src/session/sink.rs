// SPDX-License-Identifier: GPL-3.0-only

//! Hardware callback adapter
//!
//! Backends invoke [`FrameSink`] from their own threads. [`ControllerSink`]
//! turns each callback into a single message on the controller's command
//! queue, so no controller state is touched off the controller task.

use super::controller::Command;
use crate::backends::camera::{BackendResult, CameraFrame, FrameSink, RawPhoto};
use crate::pipelines::photo::decode_raw_photo;
use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::trace;

/// Forwards hardware callbacks into the controller task
///
/// Holds a weak sender so that an open hardware session does not keep the
/// controller alive after every handle is dropped.
pub(crate) struct ControllerSink {
    commands: WeakUnboundedSender<Command>,
}

impl ControllerSink {
    pub(crate) fn new(commands: WeakUnboundedSender<Command>) -> Self {
        Self { commands }
    }

    fn send(&self, command: Command) {
        match self.commands.upgrade() {
            Some(sender) => {
                // Fails only while the controller task is shutting down
                let _ = sender.send(command);
            }
            None => trace!("Controller gone, dropping hardware callback"),
        }
    }
}

impl FrameSink for ControllerSink {
    fn photo_ready(&self, result: BackendResult<RawPhoto>) {
        // Decode on the hardware thread, off the controller task
        let decoded = result.and_then(decode_raw_photo);
        self.send(Command::PhotoDelivered(decoded));
    }

    fn frame_ready(&self, frame: CameraFrame) {
        self.send(Command::FrameDelivered(frame));
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Capture screen presentation logic
//!
//! [`CaptureViewModel`] is the primary client of the capture controller. It
//! turns user intents into controller calls and the controller's preview and
//! photo streams into [`Message`]s on its own queue.
//!
//! # Architecture
//!
//! - `state`: [`ViewState`] and [`Message`]
//! - `update`: Message handling
//!
//! ```text
//!  PreviewStream ─▶ consumer task ─┐
//!  PhotoStream ───▶ consumer task ─┴─▶ Message queue ─▶ CaptureViewModel::update
//! ```

mod state;
mod update;

pub use state::{Message, ViewState};

use crate::errors::CaptureError;
use crate::pipelines::photo::CapturedPhoto;
use crate::session::{CaptureController, PreviewFrame, SessionConfiguration};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Presentation state machine for the capture screen
pub struct CaptureViewModel {
    controller: CaptureController,
    messages: mpsc::UnboundedSender<Message>,
    state: ViewState,
    alert: Option<CaptureError>,
    preview: Option<PreviewFrame>,
    photo: Option<Arc<CapturedPhoto>>,
    configuration: Option<SessionConfiguration>,
    consumers: Vec<JoinHandle<()>>,
}

impl CaptureViewModel {
    /// Create a view model and the queue its channel consumers feed
    ///
    /// The caller drains the receiver and passes every message back into
    /// [`update`](Self::update).
    pub fn new(controller: CaptureController) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (messages, receiver) = mpsc::unbounded_channel();
        let view_model = Self {
            controller,
            messages,
            state: ViewState::Loading,
            alert: None,
            preview: None,
            photo: None,
            configuration: None,
            consumers: Vec::new(),
        };
        (view_model, receiver)
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Last error, until dismissed
    pub fn alert(&self) -> Option<CaptureError> {
        self.alert
    }

    /// Latest preview frame
    pub fn preview(&self) -> Option<&PreviewFrame> {
        self.preview.as_ref()
    }

    /// Photo awaiting validation, or the accepted one
    pub fn photo(&self) -> Option<&Arc<CapturedPhoto>> {
        self.photo.as_ref()
    }

    /// Configuration snapshot taken after the last settings change
    pub fn configuration(&self) -> Option<&SessionConfiguration> {
        self.configuration.as_ref()
    }

    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }

    /// Subscribe to the streams of the current start cycle
    ///
    /// Streams already taken by running consumers are left alone.
    async fn start_consumers(&mut self) {
        self.consumers.retain(|task| !task.is_finished());

        if let Ok(Some(stream)) = self.controller.preview_stream().await {
            debug!(generation = stream.generation(), "Consuming preview stream");
            let task = self.forward(stream, Message::PreviewFrame);
            self.consumers.push(task);
        }
        if let Ok(Some(stream)) = self.controller.photo_stream().await {
            debug!(generation = stream.generation(), "Consuming photo stream");
            let task = self.forward(stream, Message::PhotoCaptured);
            self.consumers.push(task);
        }
    }

    fn forward<S, T>(&self, mut stream: S, wrap: fn(T) -> Message) -> JoinHandle<()>
    where
        S: Stream<Item = T> + Unpin + Send + 'static,
        T: Send + 'static,
    {
        let messages = self.messages.clone();
        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                if messages.send(wrap(item)).is_err() {
                    break;
                }
            }
        })
    }

    fn stop_consumers(&mut self) {
        for task in self.consumers.drain(..) {
            task.abort();
        }
    }

    async fn refresh_configuration(&mut self) {
        if let Ok(configuration) = self.controller.configuration().await {
            self.configuration = Some(configuration);
        }
    }
}

impl Drop for CaptureViewModel {
    fn drop(&mut self) {
        self.stop_consumers();
    }
}

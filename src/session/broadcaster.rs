// SPDX-License-Identifier: GPL-3.0-only

//! Preview and photo distribution
//!
//! A [`FrameBroadcaster`] owns the sending half of two single-consumer
//! channels. It is written only from inside the controller task; the
//! receiving halves are handed out once each as [`PreviewStream`] and
//! [`PhotoStream`].
//!
//! - Preview is lossy: frames are dropped while paused, during warm-up,
//!   and when the consumer falls behind by more than the channel capacity.
//! - Photos are never gated and are queued even before a consumer attaches.
//!
//! A finished broadcaster cannot be reopened; the controller builds a new
//! one (with a new generation number) and consumers re-subscribe.

use crate::backends::camera::types::CameraFrame;
use crate::pipelines::photo::CapturedPhoto;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

/// Preview frame as delivered to consumers
pub type PreviewFrame = Arc<CameraFrame>;

/// Receiving half of the preview channel
#[derive(Debug)]
pub struct PreviewStream {
    receiver: mpsc::Receiver<PreviewFrame>,
    generation: u64,
}

impl PreviewStream {
    /// Broadcaster generation this stream belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Stream for PreviewStream {
    type Item = PreviewFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Receiving half of the photo channel
#[derive(Debug)]
pub struct PhotoStream {
    receiver: mpsc::UnboundedReceiver<Arc<CapturedPhoto>>,
    generation: u64,
}

impl PhotoStream {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Stream for PhotoStream {
    type Item = Arc<CapturedPhoto>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Single-writer distribution point for preview frames and photos
#[derive(Debug)]
pub struct FrameBroadcaster {
    generation: u64,
    preview_sender: Option<mpsc::Sender<PreviewFrame>>,
    photo_sender: Option<mpsc::UnboundedSender<Arc<CapturedPhoto>>>,
    preview_stream: Option<PreviewStream>,
    photo_stream: Option<PhotoStream>,
    paused: bool,
    warmup_frames: u32,
    warmup_remaining: u32,
    emitted_frames: u64,
    dropped_frames: u64,
}

impl FrameBroadcaster {
    /// Create both channels
    ///
    /// `preview_capacity` frames are buffered for a slow consumer; the first
    /// `warmup_frames` preview frames are discarded.
    pub fn new(generation: u64, preview_capacity: usize, warmup_frames: u32) -> Self {
        let (preview_sender, preview_receiver) = mpsc::channel(preview_capacity.max(1));
        let (photo_sender, photo_receiver) = mpsc::unbounded_channel();

        debug!(generation, preview_capacity, warmup_frames, "Created frame broadcaster");

        Self {
            generation,
            preview_sender: Some(preview_sender),
            photo_sender: Some(photo_sender),
            preview_stream: Some(PreviewStream {
                receiver: preview_receiver,
                generation,
            }),
            photo_stream: Some(PhotoStream {
                receiver: photo_receiver,
                generation,
            }),
            paused: false,
            warmup_frames,
            warmup_remaining: warmup_frames,
            emitted_frames: 0,
            dropped_frames: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hand out the preview stream. Only the first call returns it.
    pub fn take_preview_stream(&mut self) -> Option<PreviewStream> {
        self.preview_stream.take()
    }

    /// Hand out the photo stream. Only the first call returns it.
    pub fn take_photo_stream(&mut self) -> Option<PhotoStream> {
        self.photo_stream.take()
    }

    /// Publish a preview frame
    ///
    /// Returns whether the frame was queued for the consumer.
    pub fn emit_preview(&mut self, frame: PreviewFrame) -> bool {
        let Some(sender) = &self.preview_sender else {
            return false;
        };
        if self.paused {
            return false;
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            trace!(remaining = self.warmup_remaining, "Discarding warm-up frame");
            return false;
        }

        match sender.try_send(frame) {
            Ok(()) => {
                self.emitted_frames += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_frames += 1;
                trace!(dropped = self.dropped_frames, "Preview consumer behind, frame dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped_frames += 1;
                false
            }
        }
    }

    /// Publish a captured photo, regardless of the pause gate
    ///
    /// Returns whether the photo was queued. It is only refused after
    /// [`finish`](Self::finish) or when the consumer dropped its stream.
    pub fn emit_photo(&mut self, photo: Arc<CapturedPhoto>) -> bool {
        let Some(sender) = &self.photo_sender else {
            return false;
        };
        match sender.send(photo) {
            Ok(()) => true,
            Err(_) => {
                warn!(generation = self.generation, "Photo consumer gone, photo not delivered");
                false
            }
        }
    }

    /// Stop forwarding preview frames. Photos still flow.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Discard the next warm-up window of frames again
    ///
    /// Used after the bound device changes, when orientation metadata may lag.
    pub fn rearm_warmup(&mut self) {
        self.warmup_remaining = self.warmup_frames;
    }

    pub fn set_warmup_frames(&mut self, frames: u32) {
        self.warmup_frames = frames;
        self.warmup_remaining = self.warmup_remaining.min(frames);
    }

    /// Close both channels. Later emits are no-ops.
    ///
    /// Consumers still receive what was queued before finishing, then the
    /// streams end.
    pub fn finish(&mut self) {
        let had_preview = self.preview_sender.take().is_some();
        let had_photo = self.photo_sender.take().is_some();
        if had_preview || had_photo {
            debug!(
                generation = self.generation,
                emitted = self.emitted_frames,
                dropped = self.dropped_frames,
                "Frame broadcaster finished"
            );
        }
    }

    pub fn is_finished(&self) -> bool {
        self.preview_sender.is_none() && self.photo_sender.is_none()
    }

    /// (emitted, dropped) preview frame counters
    pub fn frame_counts(&self) -> (u64, u64) {
        (self.emitted_frames, self.dropped_frames)
    }
}

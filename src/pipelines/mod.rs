// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! - [`photo`]: Photo decoding, aspect-ratio cropping and the captured photo record

pub mod photo;

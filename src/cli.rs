// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos through the capture view model
//! - Running the preview channel

use camera_capture::backends::camera::{DeviceCatalog, PhotoCodec, Position};
use camera_capture::backends::virtual_camera::VirtualBackend;
use camera_capture::{
    AspectRatio, CaptureController, CaptureViewModel, Config, FlashMode, Message, ViewState,
};
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// How long to wait for a requested photo
const PHOTO_TIMEOUT: Duration = Duration::from_secs(15);

/// Options of the `photo` command; `None` keeps the configured value
pub struct PhotoOptions {
    pub position: Option<Position>,
    pub ratio: Option<AspectRatio>,
    pub codec: Option<PhotoCodec>,
    pub flash: Option<FlashMode>,
    pub zoom: Option<f32>,
    pub remember: bool,
}

/// Load the user configuration, falling back to defaults on any error
fn load_config() -> Config {
    match Config::default_path().and_then(|path| Config::load(&path)) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Using default configuration");
            Config::default()
        }
    }
}

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = DeviceCatalog::new(Arc::new(VirtualBackend::new()));

    for position in [Position::Back, Position::Front] {
        let devices = catalog.devices(position);
        println!("{} cameras:", position);
        if devices.is_empty() {
            println!("  (none)");
        }
        for (index, device) in devices.iter().enumerate() {
            println!("  [{}] {} ({:?})", index, device.name, device.lens);
            println!(
                "      id: {}  zoom: {:.1}x-{:.1}x  flash: {}",
                device.id,
                device.min_zoom,
                device.max_zoom,
                if device.has_flash { "yes" } else { "no" }
            );
        }
        println!();
    }

    Ok(())
}

/// Take one photo and print its metadata
pub fn take_photo(options: PhotoOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config();
    if let Some(position) = options.position {
        config.position = position;
    }
    if let Some(ratio) = options.ratio {
        config.aspect_ratio = ratio;
    }
    if let Some(codec) = options.codec {
        config.codec = codec;
    }
    if let Some(flash) = options.flash {
        config.flash = flash;
    }

    if options.remember {
        let path = Config::default_path()?;
        config.save(&path)?;
        println!("Defaults saved: {}", path.display());
    }

    let rt = tokio::runtime::Runtime::new()?;
    let photo = rt.block_on(async {
        let controller = CaptureController::new(Arc::new(VirtualBackend::new()), &config);
        let (mut view_model, mut messages) = CaptureViewModel::new(controller);

        view_model.update(Message::Appear).await;
        if let Some(alert) = view_model.alert() {
            return Err(Box::new(alert) as Box<dyn std::error::Error>);
        }
        if let Some(device) = view_model.configuration().and_then(|c| c.device.clone()) {
            println!("Using camera: {}", device);
        }

        if let Some(zoom) = options.zoom {
            view_model.update(Message::SetZoom(zoom)).await;
        }

        println!("Capturing...");
        view_model.update(Message::Capture).await;
        if let Some(alert) = view_model.alert() {
            return Err(Box::new(alert) as Box<dyn std::error::Error>);
        }

        let waited = tokio::time::timeout(PHOTO_TIMEOUT, async {
            while let Some(message) = messages.recv().await {
                view_model.update(message).await;
                if view_model.state() == ViewState::Validating {
                    break;
                }
            }
        })
        .await;
        if waited.is_err() {
            return Err("Timed out waiting for the photo".into());
        }

        view_model.update(Message::Accept).await;
        view_model
            .photo()
            .cloned()
            .ok_or_else(|| Box::<dyn std::error::Error>::from("No photo was delivered"))
    })?;

    let metadata = &photo.metadata;
    println!("Photo {}", photo.id);
    println!("  Captured:    {}", metadata.captured_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(name) = &metadata.device_name {
        println!("  Camera:      {}", name);
    }
    println!("  Codec:       {}", metadata.codec.display_name());
    println!("  Flash:       {}", metadata.flash.display_name());
    println!("  Orientation: {}", metadata.orientation);
    println!(
        "  Source:      {}x{}",
        metadata.source_width, metadata.source_height
    );
    match metadata.crop {
        Some(crop) => println!(
            "  Cropped:     {}x{} at ({}, {})",
            crop.width, crop.height, crop.x, crop.y
        ),
        None => println!("  Cropped:     no"),
    }
    if let Some(encoded) = &photo.encoded {
        println!("  Encoded:     {} bytes", encoded.len());
    }

    Ok(())
}

/// Run the preview until Ctrl+C or the optional duration elapses
pub fn run_preview(
    position: Option<Position>,
    duration: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config();
    if let Some(position) = position {
        config.position = position;
    }

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let controller = CaptureController::new(Arc::new(VirtualBackend::new()), &config);
        controller.start().await?;
        let mut preview = controller
            .preview_stream()
            .await?
            .ok_or("Preview stream already taken")?;

        println!("Previewing... (press Ctrl+C to stop)");
        let start = Instant::now();
        let limit = duration.map(Duration::from_secs);
        let mut frames: u64 = 0;
        let mut last_size = (0, 0);

        while !stop_flag.load(Ordering::SeqCst) && limit.is_none_or(|limit| start.elapsed() < limit)
        {
            match tokio::time::timeout(Duration::from_millis(100), preview.next()).await {
                Ok(Some(frame)) => {
                    frames += 1;
                    last_size = (frame.width, frame.height);
                }
                Ok(None) => break,
                Err(_) => continue,
            }

            let elapsed = start.elapsed().as_secs_f64();
            print!(
                "\rFrames: {}  {}x{}  {:.1} fps",
                frames,
                last_size.0,
                last_size.1,
                frames as f64 / elapsed.max(f64::EPSILON)
            );
            std::io::Write::flush(&mut std::io::stdout())?;
        }
        println!();

        controller.end().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}

// SPDX-License-Identifier: GPL-3.0-only

use camera_capture::backends::camera::{PhotoCodec, Position};
use camera_capture::{AspectRatio, FlashMode};
use clap::{Parser, Subcommand, ValueEnum};

mod cli;

#[derive(Parser)]
#[command(name = "camera-capture")]
#[command(about = "Drive the capture session core against the virtual camera")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras per position, best first
    List,

    /// Take a photo and print its metadata
    Photo {
        /// Camera position (default: from configuration)
        #[arg(short, long)]
        position: Option<PositionArg>,

        /// Aspect ratio crop
        #[arg(short, long)]
        ratio: Option<RatioArg>,

        /// Requested photo codec; falls back when unsupported
        #[arg(short, long)]
        codec: Option<CodecArg>,

        /// Flash mode
        #[arg(short, long)]
        flash: Option<FlashArg>,

        /// Zoom factor, clamped to the device range
        #[arg(short, long)]
        zoom: Option<f32>,

        /// Store the given options as the new defaults
        #[arg(long)]
        remember: bool,
    },

    /// Run the preview and print frame statistics until Ctrl+C
    Preview {
        /// Camera position (default: from configuration)
        #[arg(short, long)]
        position: Option<PositionArg>,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PositionArg {
    Back,
    Front,
}

impl From<PositionArg> for Position {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Back => Position::Back,
            PositionArg::Front => Position::Front,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RatioArg {
    Native,
    #[value(name = "1:1")]
    Square,
    #[value(name = "4:3")]
    FourThree,
    #[value(name = "16:9")]
    SixteenNine,
}

impl From<RatioArg> for AspectRatio {
    fn from(arg: RatioArg) -> Self {
        match arg {
            RatioArg::Native => AspectRatio::Native,
            RatioArg::Square => AspectRatio::Square,
            RatioArg::FourThree => AspectRatio::FourThree,
            RatioArg::SixteenNine => AspectRatio::SixteenNine,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CodecArg {
    Hevc,
    Jpeg,
    Png,
}

impl From<CodecArg> for PhotoCodec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Hevc => PhotoCodec::Hevc,
            CodecArg::Jpeg => PhotoCodec::Jpeg,
            CodecArg::Png => PhotoCodec::Png,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FlashArg {
    Off,
    On,
    Auto,
}

impl From<FlashArg> for FlashMode {
    fn from(arg: FlashArg) -> Self {
        match arg {
            FlashArg::Off => FlashMode::Off,
            FlashArg::On => FlashMode::On,
            FlashArg::Auto => FlashMode::Auto,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => cli::list_cameras(),
        Commands::Photo {
            position,
            ratio,
            codec,
            flash,
            zoom,
            remember,
        } => cli::take_photo(cli::PhotoOptions {
            position: position.map(Into::into),
            ratio: ratio.map(Into::into),
            codec: codec.map(Into::into),
            flash: flash.map(Into::into),
            zoom,
            remember,
        }),
        Commands::Preview { position, duration } => {
            cli::run_preview(position.map(Into::into), duration)
        }
    }
}

//! windowcast-cli: debugging frontend for the capture core.
//!
//! Drives the core without a real frame-loop host: list the capturable
//! windows, grab one frame of a window into a PNG, or run the tick loop
//! headlessly with scripted selection input.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use windowcast_core::capture::{WindowSystem, X11WindowSystem, capture_window};
use windowcast_core::driver::{CaptureDriver, negotiate_environment};
use windowcast_core::framebuffer::FrameBuffer;
use windowcast_core::host::{
    ControllerKind, Host, InputBinding, InputDevice, InputSignal, PixelFormat,
};
use windowcast_core::model::{AvInfo, FrameGeometry};

#[derive(Parser)]
#[command(name = "windowcast-cli")]
#[command(about = "CLI tool for driving and debugging the window capture core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the root's current child windows
    ListWindows,
    /// Capture one frame of a window to a PNG file
    Capture {
        /// Directory index of the window to capture
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Output file path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Run the capture loop headlessly for a fixed number of ticks
    Run {
        /// Number of ticks to run
        #[arg(long, default_value_t = 60)]
        ticks: u32,
        /// Advance the selection every N ticks (0 = never)
        #[arg(long, default_value_t = 0)]
        select_every: u32,
        /// Write the final frame to this PNG path
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("windowcast_cli=info".parse()?)
                .add_directive("windowcast_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::ListWindows => list_windows(),
        Commands::Capture { index, out } => capture_once(index, &out),
        Commands::Run { ticks, select_every, out } => run_loop(ticks, select_every, out.as_deref()),
    }
}

fn list_windows() -> Result<()> {
    let mut windows = X11WindowSystem::connect().context("connecting to the X display")?;
    let handles = windows.list_children();
    if handles.is_empty() {
        println!("no windows found");
        return Ok(());
    }
    for (index, handle) in handles.iter().enumerate() {
        match windows.source_state(*handle) {
            Ok(state) => println!(
                "{index:3}  {handle}  {}x{}  {}",
                state.width,
                state.height,
                if state.viewable { "viewable" } else { "hidden" }
            ),
            Err(reason) => println!("{index:3}  {handle}  ({reason})"),
        }
    }
    Ok(())
}

fn capture_once(index: usize, out: &Path) -> Result<()> {
    let mut windows = X11WindowSystem::connect().context("connecting to the X display")?;
    let handles = windows.list_children();
    let Some(&handle) = handles.get(index) else {
        bail!("window index {index} out of range (directory has {})", handles.len());
    };

    let state = windows
        .source_state(handle)
        .map_err(|reason| anyhow::anyhow!("window {handle} not capturable: {reason}"))?;
    if !state.capturable() {
        bail!("window {handle} is not viewable or has no size");
    }

    let mut buffer = FrameBuffer::with_default_geometry()?;
    buffer.resize(state.width, state.height)?;
    let outcome = capture_window(&mut windows, handle, &mut buffer);
    if !outcome.is_captured() {
        bail!("capture of {handle} was skipped");
    }

    write_png(out, buffer.pixels(), buffer.geometry())
}

fn run_loop(ticks: u32, select_every: u32, out: Option<&Path>) -> Result<()> {
    let mut host = HeadlessHost::new(select_every);
    negotiate_environment(&mut host);

    let windows = match X11WindowSystem::connect() {
        Ok(system) => Some(system),
        Err(err) => {
            tracing::error!("running without a display: {err}");
            None
        }
    };

    let mut driver = CaptureDriver::new(windows, &mut host)?;
    if !driver.load_content(&mut host) {
        bail!("host refused the pixel format");
    }

    for _ in 0..ticks {
        driver.run_tick(&mut host);
    }

    let (width, height, _) = host.last_geometry;
    println!("emitted {} frames, final geometry {width}x{height}", host.frames);

    if let Some(path) = out {
        write_png(path, &host.last_frame, FrameGeometry { width, height })?;
    }
    Ok(())
}

fn write_png(path: &Path, pixels: &[u8], geometry: FrameGeometry) -> Result<()> {
    let stride = geometry.stride();
    let mut rgb = image::RgbImage::new(geometry.width, geometry.height);
    for (x, y, pixel) in rgb.enumerate_pixels_mut() {
        // Memory order is B, G, R, X per pixel.
        let offset = y as usize * stride + x as usize * 4;
        *pixel = image::Rgb([pixels[offset + 2], pixels[offset + 1], pixels[offset]]);
    }
    rgb.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

/// Minimal host: accepts every declaration, scripts a periodic select-next
/// event, and keeps the most recent emitted frame.
struct HeadlessHost {
    select_every:  u32,
    tick:          u32,
    fire_next:     bool,
    frames:        u64,
    last_frame:    Vec<u8>,
    last_geometry: (u32, u32, usize),
}

impl HeadlessHost {
    fn new(select_every: u32) -> Self {
        Self {
            select_every,
            tick: 0,
            fire_next: false,
            frames: 0,
            last_frame: Vec::new(),
            last_geometry: (0, 0, 0),
        }
    }
}

impl Host for HeadlessHost {
    fn declare_pixel_format(&mut self, _format: PixelFormat) -> bool {
        true
    }

    fn declare_input_bindings(&mut self, bindings: &[InputBinding]) {
        tracing::info!("declared {} input bindings", bindings.len());
    }

    fn declare_controllers(&mut self, _kinds: &[ControllerKind]) {}

    fn declare_no_content_ok(&mut self, _ok: bool) {}

    fn poll_input(&mut self) {
        self.tick += 1;
        self.fire_next = self.select_every > 0 && self.tick % self.select_every == 0;
    }

    fn input_signal(&mut self, device: InputDevice, signal: InputSignal) -> bool {
        self.fire_next && device == InputDevice::Pointer && signal == InputSignal::WheelUp
    }

    fn emit_video_frame(&mut self, pixels: &[u8], width: u32, height: u32, stride: usize) {
        self.frames += 1;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(pixels);
        self.last_geometry = (width, height, stride);
    }

    fn publish_av_info(&mut self, info: &AvInfo) {
        tracing::info!(
            "geometry now {}x{} (aspect {:.3})",
            info.base_width,
            info.base_height,
            info.aspect_ratio
        );
    }

    fn variables_updated(&mut self) -> bool {
        false
    }
}

//! V4L2 device layer: physical capture and virtual output.
//!
//! Both sides stream through four memory-mapped kernel buffers. The capture
//! side dequeues, decodes into the pipeline's RGB frame and re-queues; the
//! output side paces frames on a monotonic cursor advanced by `1/fps`, then
//! encodes into the dequeued kernel buffer.
//!
//! A driver rejecting the pixel format is fatal; a driver adjusting the
//! resolution or frame rate is logged and tolerated.

pub mod camera;
pub mod vcam;

pub use self::camera::Camera;
pub use self::vcam::VirtualCamera;

use v4l::{Device, Format};

use crate::config::DeviceConfig;
use crate::error::{Error, Result};

/// Build the `v4l` format for a device config.
fn format_for(cfg: &DeviceConfig) -> Format {
    Format::new(
        cfg.width as u32,
        cfg.height as u32,
        v4l::FourCC::new(&cfg.fourcc.0),
    )
}

/// Check the format a driver actually accepted against the request.
fn verify_format(actual: &Format, requested: &Format, path: &str) -> Result<()> {
    if actual.fourcc != requested.fourcc {
        return Err(Error::Device(format!(
            "{path}: pixel format {} rejected (driver offered {})",
            requested.fourcc, actual.fourcc
        )));
    }
    if actual.width != requested.width || actual.height != requested.height {
        log::warn!(
            "{path}: resolution {}x{} adjusted to {}x{} by the driver",
            requested.width,
            requested.height,
            actual.width,
            actual.height
        );
    }
    Ok(())
}

fn open_device(path: &std::path::Path) -> Result<Device> {
    Device::with_path(path)
        .map_err(|e| Error::Device(format!("failed to open {}: {e}", path.display())))
}

//! Configuration types for the daemon.
//!
//! Precedence: compiled-in defaults, then `/etc/spotlight.conf`, then CLI
//! flags; both the file and CLI layers funnel through
//! [`PipelineConfig::set`] so every key is parsed exactly once, as the field
//! it maps to. Mode, resolutions and device paths are frozen after the
//! pipeline is constructed.

pub mod cli;
pub mod file;

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Path of the optional system-wide configuration file.
pub const CONF_FILE: &str = "/etc/spotlight.conf";

/// Feather radius of the mask Gaussian.
pub const MASK_FILTER_RADIUS: usize = 2;
/// Radius handed to the (currently unused) edge Laplacian.
pub const EDGE_FILTER_RADIUS: usize = 3;
pub const BLUR_FILTER_RADIUS: usize = 3;
pub const BLUR_FILTER_COMPONENTS: usize = 2;
pub const BLUR_FILTER_TRANSITION: f32 = 0.4;

/// JPEG quality of the MJPEG codec.
pub const JPEG_QUALITY: u8 = 95;

/// Four-character pixel format code, stored as its ASCII bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Fourcc(pub [u8; 4]);

impl Fourcc {
    pub const MJPG: Fourcc = Fourcc(*b"MJPG");
    pub const YUYV: Fourcc = Fourcc(*b"YUYV");

    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(Error::Config(format!(
                "FOURCC must be exactly 4 characters, got '{s}'"
            )));
        }
        Ok(Fourcc([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fourcc({self})")
    }
}

/// Composition program selected at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Blur,
    Image,
    /// Reserved for moving backgrounds; rejected at pipeline construction.
    Video,
}

impl Mode {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blur" => Ok(Mode::Blur),
            "image" => Ok(Mode::Image),
            "video" => Ok(Mode::Video),
            other => Err(Error::Config(format!(
                "unknown mode '{other}' (expected blur, image or video)"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Blur => write!(f, "blur"),
            Mode::Image => write!(f, "image"),
            Mode::Video => write!(f, "video"),
        }
    }
}

/// Geometry and pixel format of one side of the pipe. Capture and output
/// sides are independent; mismatched resolutions are bridged by the resize
/// stages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceConfig {
    pub fourcc: Fourcc,
    pub width: usize,
    pub height: usize,
    pub fps: f64,
}

impl DeviceConfig {
    #[inline]
    pub fn pixels(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub mode: Mode,
    /// Forwarded to the inference backend as an internal hint; the pipeline
    /// itself stays single-threaded.
    pub num_threads: usize,

    pub in_dev: PathBuf,
    pub input: DeviceConfig,

    pub out_dev: PathBuf,
    pub output: DeviceConfig,

    /// Background image, meaningful in image mode only.
    pub bg_img: PathBuf,

    pub segm_model: PathBuf,
    pub face_model: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Blur,
            num_threads: 1,
            in_dev: PathBuf::from("/dev/video0"),
            input: DeviceConfig {
                fourcc: Fourcc::MJPG,
                width: 1280,
                height: 720,
                fps: 30.0,
            },
            out_dev: PathBuf::from("/dev/video10"),
            output: DeviceConfig {
                fourcc: Fourcc::MJPG,
                width: 1280,
                height: 720,
                fps: 30.0,
            },
            bg_img: PathBuf::from("assets/background.png"),
            segm_model: PathBuf::from("models/segm/segm_lite_v681.tflite"),
            face_model: PathBuf::from("models/face/face_smpl_320p.tflite"),
        }
    }
}

impl PipelineConfig {
    #[inline]
    pub fn inp_pixels(&self) -> usize {
        self.input.pixels()
    }

    #[inline]
    pub fn out_pixels(&self) -> usize {
        self.output.pixels()
    }

    /// Assign one configuration key. Keys are the long CLI flag names
    /// without the leading `--`; values are parsed as the field's native
    /// type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "mode" => self.mode = Mode::parse(value)?,
            "n-threads" => self.num_threads = parse_num(key, value)?,
            "in-dev" => self.in_dev = PathBuf::from(value),
            "in-fmt" => self.input.fourcc = Fourcc::parse(value)?,
            "in-w" => self.input.width = parse_num(key, value)?,
            "in-h" => self.input.height = parse_num(key, value)?,
            "in-fps" => self.input.fps = parse_float(key, value)?,
            "out-dev" => self.out_dev = PathBuf::from(value),
            "out-fmt" => self.output.fourcc = Fourcc::parse(value)?,
            "out-w" => self.output.width = parse_num(key, value)?,
            "out-h" => self.output.height = parse_num(key, value)?,
            "out-fps" => self.output.fps = parse_float(key, value)?,
            "bg-img" => self.bg_img = PathBuf::from(value),
            other => {
                return Err(Error::Config(format!("unknown configuration key '{other}'")));
            }
        }
        Ok(())
    }
}

fn parse_num(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("invalid integer '{value}' for '{key}'")))
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("invalid number '{value}' for '{key}'")))
}

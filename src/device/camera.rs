//! Physical capture device.

use std::path::Path;

use log::warn;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::capture::Parameters;
use v4l::video::Capture;
use v4l::Device;

use super::{format_for, open_device, verify_format};
use crate::config::{DeviceConfig, JPEG_QUALITY};
use crate::error::{Error, Result};
use crate::formats::{codec_for, FrameCodec};

const N_BUFFERS: u32 = 4;

pub struct Camera {
    stream: MmapStream<'static>,
    codec: Box<dyn FrameCodec>,
    // keeps the fd owner alive behind the stream, dropped after it
    _dev: Device,
}

impl Camera {
    /// Open a capture node, apply the format and frame rate, and start
    /// streaming with four mmap buffers.
    pub fn open(path: &Path, cfg: &DeviceConfig) -> Result<Self> {
        let dev = open_device(path)?;
        let path_str = path.display().to_string();

        let requested = format_for(cfg);
        let actual = Capture::set_format(&dev, &requested)
            .map_err(|e| Error::Device(format!("{path_str}: failed to set format: {e}")))?;
        verify_format(&actual, &requested, &path_str)?;

        // The kernel interface takes an integer time-per-frame denominator.
        if cfg.fps.fract() != 0.0 {
            warn!(
                "{path_str}: fractional frame rate {} truncated to {}",
                cfg.fps, cfg.fps as u32
            );
        }
        match Capture::set_params(&dev, &Parameters::with_fps(cfg.fps as u32)) {
            Ok(params) => {
                if params.interval.denominator != cfg.fps as u32 || params.interval.numerator != 1
                {
                    warn!(
                        "{path_str}: frame rate {} rejected, driver keeps {}/{}",
                        cfg.fps, params.interval.denominator, params.interval.numerator
                    );
                }
            }
            Err(e) => warn!("{path_str}: failed to set frame rate: {e}"),
        }

        let codec = codec_for(cfg.fourcc, cfg.width, cfg.height, JPEG_QUALITY)?;
        let stream = MmapStream::with_buffers(&dev, Type::VideoCapture, N_BUFFERS)
            .map_err(|e| Error::Device(format!("{path_str}: failed to map buffers: {e}")))?;

        Ok(Self {
            stream,
            codec,
            _dev: dev,
        })
    }

    /// Block until the next frame, decode it into `out` (8-bit interleaved
    /// RGB) and hand the kernel buffer back. The raw device buffer is not
    /// held across pipeline work.
    pub fn capture(&mut self, out: &mut [u8]) -> Result<()> {
        let (buf, meta) = CaptureStream::next(&mut self.stream)
            .map_err(|e| Error::Device(format!("capture dequeue failed: {e}")))?;

        let used = (meta.bytesused as usize).min(buf.len());
        let payload = if used > 0 { &buf[..used] } else { buf };
        self.codec.decode(payload, out)
    }
}

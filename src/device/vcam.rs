//! Virtual output device (v4l2loopback-style).

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::OutputStream;
use v4l::video::Output;
use v4l::Device;

use super::{format_for, open_device, verify_format};
use crate::config::{DeviceConfig, JPEG_QUALITY};
use crate::error::{Error, Result};
use crate::formats::{codec_for, FrameCodec};

const N_BUFFERS: u32 = 4;

pub struct VirtualCamera {
    stream: MmapStream<'static>,
    codec: Box<dyn FrameCodec>,
    /// Scheduled instant of the next frame, advanced by `spf` per write.
    next_frame: Instant,
    spf: Duration,
    _dev: Device,
}

impl VirtualCamera {
    pub fn open(path: &Path, cfg: &DeviceConfig) -> Result<Self> {
        let dev = open_device(path)?;
        let path_str = path.display().to_string();

        let requested = format_for(cfg);
        let actual = Output::set_format(&dev, &requested)
            .map_err(|e| Error::Device(format!("{path_str}: failed to set format: {e}")))?;
        verify_format(&actual, &requested, &path_str)?;

        let codec = codec_for(cfg.fourcc, cfg.width, cfg.height, JPEG_QUALITY)?;
        let stream = MmapStream::with_buffers(&dev, Type::VideoOutput, N_BUFFERS)
            .map_err(|e| Error::Device(format!("{path_str}: failed to map buffers: {e}")))?;

        Ok(Self {
            stream,
            codec,
            next_frame: Instant::now(),
            spf: Duration::from_secs_f64(1.0 / cfg.fps),
            _dev: dev,
        })
    }

    /// Sleep until the scheduled next-frame instant, then encode `frame`
    /// (8-bit interleaved RGB) into the dequeued kernel buffer and queue it.
    pub fn write(&mut self, frame: &[u8]) -> Result<()> {
        let (buf, meta) = OutputStream::next(&mut self.stream)
            .map_err(|e| Error::Device(format!("output dequeue failed: {e}")))?;

        self.next_frame += self.spf;
        let now = Instant::now();
        if self.next_frame > now {
            thread::sleep(self.next_frame - now);
        }

        let used = self.codec.encode(frame, buf)?;
        meta.bytesused = used as u32;
        Ok(())
    }
}

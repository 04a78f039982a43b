//! Frame codecs bridging device pixel formats and the pipeline's RGB.
//!
//! The pipeline works exclusively on 8-bit interleaved RGB; the device layer
//! picks a codec by fourcc and converts in both directions.

pub mod mjpeg;
pub mod yuyv;

pub use self::mjpeg::Mjpeg;
pub use self::yuyv::Yuyv;

use crate::config::Fourcc;
use crate::error::{Error, Result};

pub trait FrameCodec: Send {
    /// Decode one device frame into `3 * w * h` RGB bytes.
    fn decode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<()>;

    /// Encode `3 * w * h` RGB bytes into a device buffer. Returns the byte
    /// count written.
    fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize>;
}

/// Select the codec for a device fourcc.
pub fn codec_for(
    fourcc: Fourcc,
    width: usize,
    height: usize,
    quality: u8,
) -> Result<Box<dyn FrameCodec>> {
    match fourcc {
        Fourcc::MJPG => Ok(Box::new(Mjpeg::new(width, height, quality))),
        Fourcc::YUYV => Ok(Box::new(Yuyv::new(width, height))),
        other => Err(Error::Config(format!(
            "unsupported pixel format '{other}' (expected MJPG or YUYV)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_selection_follows_the_fourcc() {
        assert!(codec_for(Fourcc::MJPG, 64, 64, 95).is_ok());
        assert!(codec_for(Fourcc::YUYV, 64, 64, 95).is_ok());
        assert!(matches!(
            codec_for(Fourcc(*b"NV12"), 64, 64, 95),
            Err(Error::Config(_))
        ));
    }
}

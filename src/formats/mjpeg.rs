//! Motion-JPEG codec: one standalone JPEG per frame.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat};

use super::FrameCodec;
use crate::error::{Error, Result};

pub struct Mjpeg {
    width: usize,
    height: usize,
    quality: u8,
    jpeg_buf: Vec<u8>,
}

impl Mjpeg {
    pub fn new(width: usize, height: usize, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
            jpeg_buf: Vec::new(),
        }
    }
}

impl FrameCodec for Mjpeg {
    fn decode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        let img = image::load_from_memory_with_format(src, ImageFormat::Jpeg)
            .map_err(|e| Error::Device(format!("MJPEG decode failed: {e}")))?
            .into_rgb8();

        if (img.width() as usize, img.height() as usize) != (self.width, self.height) {
            return Err(Error::Device(format!(
                "MJPEG frame is {}x{}, device configured for {}x{}",
                img.width(),
                img.height(),
                self.width,
                self.height
            )));
        }

        dst[..3 * self.width * self.height].copy_from_slice(img.as_raw());
        Ok(())
    }

    fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        self.jpeg_buf.clear();
        let encoder = JpegEncoder::new_with_quality(&mut self.jpeg_buf, self.quality);
        encoder
            .encode(
                &src[..3 * self.width * self.height],
                self.width as u32,
                self.height as u32,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| Error::Device(format!("MJPEG encode failed: {e}")))?;

        if self.jpeg_buf.len() > dst.len() {
            return Err(Error::Device(format!(
                "encoded frame ({} bytes) exceeds the device buffer ({} bytes)",
                self.jpeg_buf.len(),
                dst.len()
            )));
        }
        dst[..self.jpeg_buf.len()].copy_from_slice(&self.jpeg_buf);
        Ok(self.jpeg_buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip_stays_close() {
        let (w, h) = (32usize, 16usize);
        let mut codec = Mjpeg::new(w, h, 95);

        // smooth gradient: JPEG at quality 95 should reproduce it closely
        let mut rgb = vec![0u8; 3 * w * h];
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 3;
                rgb[i] = (x * 8) as u8;
                rgb[i + 1] = (y * 16) as u8;
                rgb[i + 2] = 128;
            }
        }

        let mut device_buf = vec![0u8; 64 * 1024];
        let used = codec.encode(&rgb, &mut device_buf).unwrap();
        assert!(used > 0 && used < device_buf.len());

        let mut decoded = vec![0u8; 3 * w * h];
        codec.decode(&device_buf[..used], &mut decoded).unwrap();
        for (a, b) in rgb.iter().zip(decoded.iter()) {
            assert!((*a as i32 - *b as i32).abs() < 24, "{a} vs {b}");
        }
    }

    #[test]
    fn truncated_frames_are_device_errors() {
        let mut codec = Mjpeg::new(8, 8, 95);
        let mut dst = vec![0u8; 3 * 64];
        assert!(matches!(
            codec.decode(&[0xff, 0xd8, 0x00], &mut dst),
            Err(Error::Device(_))
        ));
    }
}

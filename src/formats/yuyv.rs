//! Packed YUYV (YUY2) 4:2:2 codec, BT.601 coefficients.
//!
//! Each 4-byte group `Y0 U Y1 V` encodes two horizontally adjacent pixels
//! that share one chroma pair.

use super::FrameCodec;
use crate::error::{Error, Result};

pub struct Yuyv {
    width: usize,
    height: usize,
}

impl Yuyv {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    fn frame_bytes(&self) -> usize {
        2 * self.width * self.height
    }
}

#[inline]
fn clamp_u8(v: f32) -> u8 {
    (v + 0.5).clamp(0.0, 255.0) as u8
}

#[inline]
fn yuv_to_rgb(y: f32, u: f32, v: f32) -> [u8; 3] {
    [
        clamp_u8(y + 1.402 * v),
        clamp_u8(y - 0.344 * u - 0.714 * v),
        clamp_u8(y + 1.772 * u),
    ]
}

impl FrameCodec for Yuyv {
    fn decode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        if src.len() < self.frame_bytes() {
            return Err(Error::Device(format!(
                "YUYV frame is {} bytes, expected {}",
                src.len(),
                self.frame_bytes()
            )));
        }

        let mut out = 0usize;
        for group in src[..self.frame_bytes()].chunks_exact(4) {
            let y0 = group[0] as f32;
            let u = group[1] as f32 - 128.0;
            let y1 = group[2] as f32;
            let v = group[3] as f32 - 128.0;

            for y in [y0, y1] {
                let rgb = yuv_to_rgb(y, u, v);
                dst[out..out + 3].copy_from_slice(&rgb);
                out += 3;
            }
        }
        Ok(())
    }

    fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let needed = self.frame_bytes();
        if dst.len() < needed {
            return Err(Error::Device(format!(
                "device buffer is {} bytes, YUYV frame needs {}",
                dst.len(),
                needed
            )));
        }

        let mut out = 0usize;
        for pair in src[..3 * self.width * self.height].chunks_exact(6) {
            let (r0, g0, b0) = (pair[0] as f32, pair[1] as f32, pair[2] as f32);
            let (r1, g1, b1) = (pair[3] as f32, pair[4] as f32, pair[5] as f32);

            let y0 = 0.299 * r0 + 0.587 * g0 + 0.114 * b0;
            let y1 = 0.299 * r1 + 0.587 * g1 + 0.114 * b1;

            // chroma from the averaged pixel pair
            let (r, g, b) = ((r0 + r1) * 0.5, (g0 + g1) * 0.5, (b0 + b1) * 0.5);
            let u = -0.169 * r - 0.331 * g + 0.5 * b + 128.0;
            let v = 0.5 * r - 0.419 * g - 0.081 * b + 128.0;

            dst[out] = clamp_u8(y0);
            dst[out + 1] = clamp_u8(u);
            dst[out + 2] = clamp_u8(y1);
            dst[out + 3] = clamp_u8(v);
            out += 4;
        }
        Ok(needed)
    }
}

//! Joint bilateral filter.
//!
//! Smooths `inp_s` while preserving the edges of a guide image `inp_g`. The
//! spatial kernel is a 2-D Gaussian of radius `ceil(3 * sigma_s)`; the range
//! kernel is a 256-bin LUT over the guide's channel-wise absolute
//! difference. Guide, source and output must share the channel count.

use crate::image::{reflect, Sample};

pub struct JointBilateralFilter {
    pub sigma_s: f32,
    pub sigma_r: f32,
    krad: usize,
    kernel_s: Vec<f32>,
    kernel_r: [f32; 256],
    width: usize,
    height: usize,
    channels: usize,
}

impl JointBilateralFilter {
    pub fn new(sigma_s: f32, sigma_r: f32, width: usize, height: usize, channels: usize) -> Self {
        let krad = (3.0 * sigma_s).ceil() as usize;
        let ksize = 2 * krad + 1;

        let scale_s = 1.0 / (2.0 * sigma_s * sigma_s);
        let mut kernel_s = Vec::with_capacity(ksize * ksize);
        let r = krad as isize;
        for i in -r..=r {
            for j in -r..=r {
                kernel_s.push((-((i * i + j * j) as f32) * scale_s).exp());
            }
        }

        let scale_r = 1.0 / (2.0 * sigma_r * sigma_r);
        let mut kernel_r = [0f32; 256];
        for (i, bin) in kernel_r.iter_mut().enumerate() {
            *bin = (-((i * i) as f32) * scale_r).exp();
        }

        Self {
            sigma_s,
            sigma_r,
            krad,
            kernel_s,
            kernel_r,
            width,
            height,
            channels,
        }
    }

    pub fn invoke<I: Sample, G: Sample, O: Sample>(&self, inp_s: &[I], inp_g: &[G], out: &mut [O]) {
        let r = self.krad as isize;
        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let guide_center = inp_g[idx].to_f32();
                    let mut k_idx = 0usize;
                    let mut nom = 0.0f32;
                    let mut denom = 0.0f32;
                    for yk in -r..=r {
                        let yi = reflect(y as isize + yk, self.height);
                        for xk in -r..=r {
                            let xi = reflect(x as isize + xk, self.width);
                            let n = (yi * self.width + xi) * self.channels + c;

                            let diff = (guide_center - inp_g[n].to_f32()).abs() as usize;
                            let g_r = self.kernel_r[diff.min(255)];
                            let g_s = self.kernel_s[k_idx];
                            k_idx += 1;

                            nom += g_r * g_s * inp_s[n].to_f32();
                            denom += g_r * g_s;
                        }
                    }
                    // denom >= the centre weight, which is always 1
                    out[idx] = O::from_f32(nom / denom);
                    idx += 1;
                }
            }
        }
    }
}

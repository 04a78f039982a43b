//! Uniform `k x k` averaging filter.
//!
//! Besides the slice-to-slice form, the filter exposes an accessor-based
//! overload taking a `read(index) -> f32` getter and a `write(index, value)`
//! setter. The guided filter uses it to average the products `I*I` and `I*P`
//! without materializing them.

use crate::image::{reflect, Sample};

pub struct BoxFilter {
    pub radius: usize,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    kernel_value: f32,
}

impl BoxFilter {
    pub fn new(radius: usize, width: usize, height: usize, channels: usize) -> Self {
        let kernel_size = 2 * radius + 1;
        Self {
            radius,
            width,
            height,
            channels,
            kernel_value: 1.0 / (kernel_size * kernel_size) as f32,
        }
    }

    /// Uniform average of the `(2r+1)^2` neighbourhood with edge reflection.
    pub fn invoke<I: Sample, O: Sample>(&self, inp: &[I], out: &mut [O]) {
        self.invoke_with(|idx| inp[idx].to_f32(), |idx, val| out[idx] = O::from_f32(val));
    }

    /// Accessor form: `read` produces the value at a linear index, `write`
    /// consumes `(index, filtered_value)` in row-major output order.
    pub fn invoke_with<R, W>(&self, read: R, mut write: W)
    where
        R: Fn(usize) -> f32,
        W: FnMut(usize, f32),
    {
        let radius = self.radius as isize;
        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let mut sum = 0.0f32;
                    for yk in -radius..=radius {
                        let yi = reflect(y as isize + yk, self.height);
                        for xk in -radius..=radius {
                            let xi = reflect(x as isize + xk, self.width);
                            sum += read((yi * self.width + xi) * self.channels + c);
                        }
                    }
                    write(idx, self.kernel_value * sum);
                    idx += 1;
                }
            }
        }
    }

    /// Kernel weight of a single tap; `(2r+1)^2` taps sum to one.
    pub fn kernel_value(&self) -> f32 {
        self.kernel_value
    }
}

//! Pixel primitives shared by the filters and the compositor.
//!
//! Every function reads and writes flat interleaved slices described by
//! explicit `(width, height, channels)`; none of them allocates beyond the
//! per-call interpolation tables of `resize_bilinear`.

use super::frame::Sample;

/// Edge-reflect an index into `[0, limit)` without repeating the boundary
/// pixel: `-1 → 0`, `-2 → 1`, `limit → limit - 1`, `limit + 1 → limit - 2`.
/// One reflection suffices as long as `|i| < limit` on the low side and
/// `i < 2 * limit` on the high side.
#[inline]
pub fn reflect(i: isize, limit: usize) -> usize {
    let lim = limit as isize;
    let r = if i < 0 {
        -i - 1
    } else if i >= lim {
        2 * lim - i - 1
    } else {
        i
    };
    r as usize
}

/// Elementwise `out[i] = inp[i] * alpha + beta` with a saturating store for
/// 8-bit outputs.
pub fn scale<I: Sample, O: Sample>(
    inp: &[I],
    out: &mut [O],
    width: usize,
    height: usize,
    channels: usize,
    alpha: f32,
    beta: f32,
) {
    let n = channels * width * height;
    debug_assert!(inp.len() >= n && out.len() >= n);

    for i in 0..n {
        out[i] = O::from_f32(inp[i].to_f32() * alpha + beta);
    }
}

/// In-place variant of [`scale`] for buffers that are both source and
/// destination (the compositor re-scales its model input around inference).
pub fn scale_in_place<T: Sample>(buf: &mut [T], alpha: f32, beta: f32) {
    for v in buf.iter_mut() {
        *v = T::from_f32(v.to_f32() * alpha + beta);
    }
}

/// ITU-R BT.601 luma: `y = 0.299 R + 0.587 G + 0.114 B`.
pub fn rgb_to_gray<I: Sample, O: Sample>(inp: &[I], out: &mut [O], width: usize, height: usize) {
    let pixels = width * height;
    debug_assert!(inp.len() >= 3 * pixels && out.len() >= pixels);

    for i in 0..pixels {
        let y = 0.299 * inp[3 * i].to_f32()
            + 0.587 * inp[3 * i + 1].to_f32()
            + 0.114 * inp[3 * i + 2].to_f32();
        out[i] = O::from_f32(y);
    }
}

/// Broadcast a single channel to three.
pub fn gray_to_rgb<I: Sample, O: Sample>(inp: &[I], out: &mut [O], width: usize, height: usize) {
    let pixels = width * height;
    debug_assert!(inp.len() >= pixels && out.len() >= 3 * pixels);

    for i in 0..pixels {
        let v = O::from_f32(inp[i].to_f32());
        out[3 * i] = v;
        out[3 * i + 1] = v;
        out[3 * i + 2] = v;
    }
}

/// Nearest-neighbour resize. Samples at `floor(x * in/out)` with no
/// half-pixel offset, so the ratio `out == in` is the identity.
pub fn resize_nn<I: Sample, O: Sample>(
    inp: &[I],
    out: &mut [O],
    inp_width: usize,
    inp_height: usize,
    out_width: usize,
    out_height: usize,
    channels: usize,
) {
    debug_assert!(inp.len() >= channels * inp_width * inp_height);
    debug_assert!(out.len() >= channels * out_width * out_height);

    let scale_x = inp_width as f32 / out_width as f32;
    let scale_y = inp_height as f32 / out_height as f32;

    let mut dst = 0usize;
    for y in 0..out_height {
        let yi = (y as f32 * scale_y) as usize;
        let src_row = yi * inp_width * channels;
        for x in 0..out_width {
            let xi = (x as f32 * scale_x) as usize;
            let src = src_row + xi * channels;
            for c in 0..channels {
                out[dst] = O::from_f32(inp[src + c].to_f32());
                dst += 1;
            }
        }
    }
}

/// Bilinear resize with endpoint-aligned scale factors
/// (`(in - 1) / (out - 1)`, or 0 when the output axis has one element).
///
/// Per-column `(x0, x1, frac)` tables are precomputed per call and reused by
/// every row. The `ceil` neighbour never exceeds `in - 1` because the scale
/// factor maps the last output column onto the last input column exactly.
pub fn resize_bilinear<I: Sample, O: Sample>(
    inp: &[I],
    out: &mut [O],
    inp_width: usize,
    inp_height: usize,
    out_width: usize,
    out_height: usize,
    channels: usize,
) {
    debug_assert!(inp.len() >= channels * inp_width * inp_height);
    debug_assert!(out.len() >= channels * out_width * out_height);

    let scale_x = if out_width > 1 {
        (inp_width - 1) as f32 / (out_width - 1) as f32
    } else {
        0.0
    };
    let scale_y = if out_height > 1 {
        (inp_height - 1) as f32 / (out_height - 1) as f32
    } else {
        0.0
    };

    // the scale factors map the last output sample onto the last input
    // sample; the min() guards the one-ulp case where the product rounds up
    let mut x0 = vec![0usize; out_width];
    let mut x1 = vec![0usize; out_width];
    let mut xf = vec![0f32; out_width];
    for x in 0..out_width {
        let xs = x as f32 * scale_x;
        x0[x] = (xs.floor() as usize).min(inp_width - 1);
        x1[x] = (xs.ceil() as usize).min(inp_width - 1);
        xf[x] = xs - xs.floor();
    }

    let mut dst = 0usize;
    for y in 0..out_height {
        let ys = y as f32 * scale_y;
        let y0 = (ys.floor() as usize).min(inp_height - 1);
        let y1 = (ys.ceil() as usize).min(inp_height - 1);
        let yf = ys - ys.floor();

        let row0 = y0 * inp_width * channels;
        let row1 = y1 * inp_width * channels;
        for x in 0..out_width {
            let p00 = row0 + x0[x] * channels;
            let p10 = row0 + x1[x] * channels;
            let p01 = row1 + x0[x] * channels;
            let p11 = row1 + x1[x] * channels;
            for c in 0..channels {
                let i0 = inp[p00 + c].to_f32() + (inp[p10 + c].to_f32() - inp[p00 + c].to_f32()) * xf[x];
                let i1 = inp[p01 + c].to_f32() + (inp[p11 + c].to_f32() - inp[p01 + c].to_f32()) * xf[x];
                out[dst] = O::from_f32(i0 + (i1 - i0) * yf);
                dst += 1;
            }
        }
    }
}

/// Per-pixel blend `out = m * fg + (1 - m) * bg`; the mask value is shared
/// across channels.
pub fn alpha_blend<F: Sample, B: Sample, O: Sample>(
    fg: &[F],
    bg: &[B],
    out: &mut [O],
    mask: &[f32],
    width: usize,
    height: usize,
    channels: usize,
) {
    let pixels = width * height;
    debug_assert!(mask.len() >= pixels);
    debug_assert!(fg.len() >= pixels * channels && bg.len() >= pixels * channels);
    debug_assert!(out.len() >= pixels * channels);

    let mut i = 0usize;
    for p in 0..pixels {
        let m_alpha = mask[p];
        let m_beta = 1.0 - m_alpha;
        for _ in 0..channels {
            out[i] = O::from_f32(m_alpha * fg[i].to_f32() + m_beta * bg[i].to_f32());
            i += 1;
        }
    }
}

/// Alpha blend with background spill at detected edges:
/// `out = (1 - e) * (m * fg + (1 - m) * bg) + e * bg`.
///
/// Capability hook for an edge-aware composite; not called by the live
/// blur/image programs.
pub fn light_wrap<F: Sample, B: Sample, O: Sample>(
    fg: &[F],
    bg: &[B],
    out: &mut [O],
    edge: &[f32],
    mask: &[f32],
    width: usize,
    height: usize,
    channels: usize,
) {
    let pixels = width * height;
    debug_assert!(mask.len() >= pixels && edge.len() >= pixels);
    debug_assert!(fg.len() >= pixels * channels && bg.len() >= pixels * channels);
    debug_assert!(out.len() >= pixels * channels);

    let mut i = 0usize;
    for p in 0..pixels {
        let m_alpha = mask[p];
        let m_beta = 1.0 - m_alpha;
        let e_alpha = edge[p];
        let e_beta = 1.0 - e_alpha;
        for _ in 0..channels {
            let fgv = fg[i].to_f32();
            let bgv = bg[i].to_f32();
            out[i] = O::from_f32(e_beta * (m_alpha * fgv + m_beta * bgv) + e_alpha * bgv);
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_mirrors_without_repeating_the_edge() {
        assert_eq!(reflect(-1, 10), 0);
        assert_eq!(reflect(-2, 10), 1);
        assert_eq!(reflect(0, 10), 0);
        assert_eq!(reflect(9, 10), 9);
        assert_eq!(reflect(10, 10), 9);
        assert_eq!(reflect(11, 10), 8);
    }

    #[test]
    fn scale_round_trips_u8_through_unit_range() {
        let inp: Vec<u8> = (0..=255).collect();
        let mut unit = vec![0f32; 256];
        let mut back = vec![0u8; 256];
        scale(&inp, &mut unit, 256, 1, 1, 1.0 / 255.0, 0.0);
        scale(&unit, &mut back, 256, 1, 1, 255.0, 0.0);
        assert_eq!(inp, back);
    }

    #[test]
    fn bilinear_resize_to_same_shape_is_identity() {
        let inp: Vec<u8> = (0..5 * 4 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let mut out = vec![0u8; inp.len()];
        resize_bilinear(&inp, &mut out, 5, 4, 5, 4, 3);
        assert_eq!(inp, out);
    }

    #[test]
    fn nearest_resize_to_same_shape_is_identity() {
        let inp: Vec<u8> = (0..6 * 3 * 1).map(|i| (i * 31 % 256) as u8).collect();
        let mut out = vec![0u8; inp.len()];
        resize_nn(&inp, &mut out, 6, 3, 6, 3, 1);
        assert_eq!(inp, out);
    }

    #[test]
    fn nearest_downscale_picks_block_origins() {
        // 4x2 -> 2x1: samples at x = 0, 2 of row 0
        let inp: Vec<u8> = vec![10, 20, 30, 40, 50, 60, 70, 80];
        let mut out = vec![0u8; 2];
        resize_nn(&inp, &mut out, 4, 2, 2, 1, 1);
        assert_eq!(out, vec![10, 30]);
    }

    #[test]
    fn alpha_blend_endpoints_are_exact() {
        let fg: Vec<u8> = vec![10, 20, 30, 40, 50, 60];
        let bg: Vec<u8> = vec![200, 190, 180, 170, 160, 150];
        let mut out = vec![0u8; 6];

        alpha_blend(&fg, &bg, &mut out, &[1.0, 1.0], 2, 1, 3);
        assert_eq!(out, fg);

        alpha_blend(&fg, &bg, &mut out, &[0.0, 0.0], 2, 1, 3);
        assert_eq!(out, bg);
    }

    #[test]
    fn light_wrap_with_zero_edge_matches_alpha_blend() {
        let fg: Vec<u8> = vec![100, 110, 120];
        let bg: Vec<u8> = vec![0, 10, 20];
        let mask = [0.25f32];
        let edge = [0.0f32];
        let mut wrapped = vec![0u8; 3];
        let mut blended = vec![0u8; 3];
        light_wrap(&fg, &bg, &mut wrapped, &edge, &mask, 1, 1, 3);
        alpha_blend(&fg, &bg, &mut blended, &mask, 1, 1, 3);
        assert_eq!(wrapped, blended);
    }

    #[test]
    fn full_edge_returns_background() {
        let fg: Vec<u8> = vec![100, 110, 120];
        let bg: Vec<u8> = vec![7, 8, 9];
        let mut out = vec![0u8; 3];
        light_wrap(&fg, &bg, &mut out, &[1.0], &[0.9], 1, 1, 3);
        assert_eq!(out, bg);
    }

    #[test]
    fn gray_conversions_agree_on_neutral_pixels() {
        let rgb: Vec<u8> = vec![128, 128, 128, 17, 17, 17];
        let mut gray = vec![0u8; 2];
        rgb_to_gray(&rgb, &mut gray, 2, 1);
        assert_eq!(gray, vec![128, 17]);

        let mut back = vec![0u8; 6];
        gray_to_rgb(&gray, &mut back, 2, 1);
        assert_eq!(back, rgb);
    }
}

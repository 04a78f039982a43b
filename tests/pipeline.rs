mod common;

use std::path::PathBuf;

use common::scripted_model::ScriptedModel;
use spotlight::config::{Mode, PipelineConfig};
use spotlight::pipeline::background::load_background;
use spotlight::{Error, Pipeline};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Small geometry keeping the bokeh pass fast: 64x64 frames around a 32x32
/// model.
fn test_config(mode: Mode) -> PipelineConfig {
    let mut cfg = PipelineConfig::default();
    cfg.mode = mode;
    cfg.input.width = 64;
    cfg.input.height = 64;
    cfg.output.width = 64;
    cfg.output.height = 64;
    cfg
}

fn gradient_frame(pixels: usize) -> Vec<u8> {
    (0..3 * pixels).map(|i| (i * 13 % 256) as u8).collect()
}

#[test]
fn all_black_input_stays_black_in_blur_mode() {
    init_logging();
    let cfg = test_config(Mode::Blur);
    let model = ScriptedModel::uniform(32, 32, false);
    let mut pipeline = Pipeline::new(&cfg, model).unwrap();

    let inp = vec![0u8; 3 * cfg.inp_pixels()];
    let mut out = vec![255u8; 3 * cfg.out_pixels()];
    pipeline.invoke(&inp, &mut out).unwrap();

    assert!(out.iter().all(|&v| v == 0), "expected a solid black frame");
}

#[test]
fn all_foreground_mask_passes_the_input_through_exactly() {
    init_logging();
    let cfg = test_config(Mode::Blur);
    let model = ScriptedModel::uniform(32, 32, true);
    let mut pipeline = Pipeline::new(&cfg, model).unwrap();

    let inp = gradient_frame(cfg.inp_pixels());
    let mut out = vec![0u8; 3 * cfg.out_pixels()];
    pipeline.invoke(&inp, &mut out).unwrap();

    assert_eq!(out, inp);
}

#[test]
fn all_background_mask_in_image_mode_yields_the_background() {
    init_logging();
    let bg_path = write_test_background();

    let mut cfg = test_config(Mode::Image);
    cfg.bg_img = bg_path.clone();
    let model = ScriptedModel::uniform(32, 32, false);
    let mut pipeline = Pipeline::new(&cfg, model).unwrap();

    let inp = gradient_frame(cfg.inp_pixels());
    let mut out = vec![0u8; 3 * cfg.out_pixels()];
    pipeline.invoke(&inp, &mut out).unwrap();

    let expected = load_background(&bg_path, cfg.output.width, cfg.output.height).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn split_mask_keeps_the_foreground_half_intact() {
    init_logging();
    let cfg = test_config(Mode::Blur);

    // left half foreground, right half background
    let mask: Vec<bool> = (0..32 * 32).map(|i| i % 32 < 16).collect();
    let model = ScriptedModel::from_mask(32, 32, &mask);
    let mut pipeline = Pipeline::new(&cfg, model).unwrap();

    let inp = gradient_frame(cfg.inp_pixels());
    let mut out = vec![0u8; 3 * cfg.out_pixels()];
    pipeline.invoke(&inp, &mut out).unwrap();

    // away from the feathered seam the foreground half is untouched
    for y in 0..64usize {
        for x in 0..24usize {
            for c in 0..3usize {
                let i = (y * 64 + x) * 3 + c;
                assert_eq!(out[i], inp[i], "foreground pixel changed at ({x},{y},{c})");
            }
        }
    }
}

#[test]
fn video_mode_fails_with_unsupported() {
    init_logging();
    let cfg = test_config(Mode::Video);
    let model = ScriptedModel::uniform(32, 32, false);
    assert!(matches!(
        Pipeline::new(&cfg, model),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn missing_background_image_fails_at_construction() {
    init_logging();
    let mut cfg = test_config(Mode::Image);
    cfg.bg_img = PathBuf::from("/nonexistent/background.png");
    let model = ScriptedModel::uniform(32, 32, false);
    assert!(matches!(
        Pipeline::new(&cfg, model),
        Err(Error::Resource(_))
    ));
}

#[test]
fn repeated_invocations_are_deterministic() {
    init_logging();
    let cfg = test_config(Mode::Blur);
    let mask: Vec<bool> = (0..32 * 32).map(|i| i % 7 == 0).collect();
    let model = ScriptedModel::from_mask(32, 32, &mask);
    let mut pipeline = Pipeline::new(&cfg, model).unwrap();

    let inp = gradient_frame(cfg.inp_pixels());
    let mut first = vec![0u8; 3 * cfg.out_pixels()];
    let mut second = vec![0u8; 3 * cfg.out_pixels()];
    pipeline.invoke(&inp, &mut first).unwrap();
    pipeline.invoke(&inp, &mut second).unwrap();

    assert_eq!(first, second);
}

/// Write a 16x16 quadrant-coloured PNG into the target tmp dir.
fn write_test_background() -> PathBuf {
    let mut img = image::RgbImage::new(16, 16);
    for (x, y, px) in img.enumerate_pixels_mut() {
        px.0 = match (x < 8, y < 8) {
            (true, true) => [255, 0, 0],
            (false, true) => [0, 255, 0],
            (true, false) => [0, 0, 255],
            (false, false) => [255, 255, 0],
        };
    }
    let path = std::env::temp_dir().join("spotlight_test_background.png");
    img.save(&path).expect("failed to write test background");
    path
}

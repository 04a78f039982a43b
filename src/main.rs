use std::env;
use std::path::Path;

use spotlight::config::{cli, file, CONF_FILE};
use spotlight::{Error, PipelineConfig};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    // defaults -> config file -> CLI, later layers win
    let mut cfg = PipelineConfig::default();
    file::apply_file(Path::new(CONF_FILE), &mut cfg);
    cli::apply_args(env::args().skip(1), &mut cfg)?;

    serve(cfg)
}

#[cfg(feature = "tflite")]
fn serve(cfg: PipelineConfig) -> Result<(), Error> {
    use log::{debug, info};
    use spotlight::device::{Camera, VirtualCamera};
    use spotlight::image::FrameBuf;
    use spotlight::model::TfliteModel;
    use spotlight::Pipeline;

    let model = TfliteModel::open(&cfg.segm_model, cfg.num_threads)?;
    let mut pipeline = Pipeline::new(&cfg, model)?;
    let mut cam = Camera::open(&cfg.in_dev, &cfg.input)?;
    let mut vcam = VirtualCamera::open(&cfg.out_dev, &cfg.output)?;

    let mut inp = FrameBuf::<u8>::new(cfg.input.width, cfg.input.height, 3);
    let mut out = FrameBuf::<u8>::new(cfg.output.width, cfg.output.height, 3);

    info!(
        "spotlight running: {} -> {} ({} mode)",
        cfg.in_dev.display(),
        cfg.out_dev.display(),
        cfg.mode
    );

    loop {
        cam.capture(inp.as_mut_slice())?;
        let timing = pipeline.invoke(inp.as_slice(), out.as_mut_slice())?;
        vcam.write(out.as_slice())?;
        debug!("frame composited in {:.1} ms", timing.total_ms);
    }
}

#[cfg(not(feature = "tflite"))]
fn serve(_cfg: PipelineConfig) -> Result<(), Error> {
    Err(Error::Resource(
        "spotlight was built without an inference backend; \
         rebuild with `--features tflite` to run the daemon"
            .to_string(),
    ))
}

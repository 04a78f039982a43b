//! Command-line argument parsing.
//!
//! Each recognized flag maps onto exactly one configuration field; values
//! are parsed by [`PipelineConfig::set`]. Unlike the config file, a
//! malformed CLI value is fatal.

use super::PipelineConfig;
use crate::error::{Error, Result};

/// Apply CLI flags (without the program name) on top of `cfg`.
pub fn apply_args<I>(args: I, cfg: &mut PipelineConfig) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let key = match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            "--mode" | "-m" => "mode",
            "--n-threads" | "-n" => "n-threads",
            "--in-dev" | "-i" => "in-dev",
            "--in-fmt" => "in-fmt",
            "--in-w" => "in-w",
            "--in-h" => "in-h",
            "--in-fps" => "in-fps",
            "--out-dev" | "-o" => "out-dev",
            "--out-fmt" => "out-fmt",
            "--out-w" => "out-w",
            "--out-h" => "out-h",
            "--out-fps" => "out-fps",
            "--bg-img" | "-b" => "bg-img",
            other => {
                return Err(Error::Config(format!(
                    "unknown option '{other}'\n{}",
                    usage()
                )));
            }
        };

        let value = args
            .next()
            .ok_or_else(|| Error::Config(format!("'{arg}' expects a value\n{}", usage())))?;
        cfg.set(key, &value)?;
    }
    Ok(())
}

pub fn usage() -> String {
    "Usage: spotlight [options]\n\n\
     Options:\n  \
     -m, --mode <blur|image|video>   composition mode (default blur)\n  \
     -n, --n-threads <int>           inference thread hint\n  \
     -i, --in-dev <path>             capture device (default /dev/video0)\n      \
     --in-fmt <FOURCC>           capture pixel format (default MJPG)\n      \
     --in-w, --in-h <int>        capture resolution (default 1280x720)\n      \
     --in-fps <float>            capture frame rate (default 30)\n  \
     -o, --out-dev <path>            output device (default /dev/video10)\n      \
     --out-fmt <FOURCC>          output pixel format (default MJPG)\n      \
     --out-w, --out-h <int>      output resolution (default 1280x720)\n      \
     --out-fps <float>           output frame rate (default 30)\n  \
     -b, --bg-img <path>             background PNG for image mode\n"
        .to_string()
}

//! Plain-text configuration file support.
//!
//! One `key = value` per line, `#` starts a comment, blank lines are
//! ignored. A missing file keeps the defaults; malformed lines are logged
//! and skipped so a single typo cannot take the daemon down.

use std::fs;
use std::path::Path;

use log::warn;

use super::PipelineConfig;

/// Apply `path` on top of `cfg`. Never fails: absence and per-line parse
/// errors degrade to warnings.
pub fn apply_file(path: &Path, cfg: &mut PipelineConfig) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            warn!("no configuration file at {}, using defaults", path.display());
            return;
        }
    };
    apply_lines(&text, cfg, &path.display().to_string());
}

fn apply_lines(text: &str, cfg: &mut PipelineConfig, origin: &str) {
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!("{origin}:{}: not a 'key = value' line, skipping", lineno + 1);
            continue;
        };

        if let Err(err) = cfg.set(key.trim(), value.trim()) {
            warn!("{origin}:{}: {err}, skipping", lineno + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Fourcc, Mode};

    #[test]
    fn parses_keys_comments_and_blank_lines() {
        let text = "\
# spotlight config
mode = image

in-w = 640
in-h = 480
in-fmt = YUYV
";
        let mut cfg = PipelineConfig::default();
        apply_lines(text, &mut cfg, "test.conf");
        assert_eq!(cfg.mode, Mode::Image);
        assert_eq!(cfg.input.width, 640);
        assert_eq!(cfg.input.height, 480);
        assert_eq!(cfg.input.fourcc, Fourcc::YUYV);
    }

    #[test]
    fn malformed_lines_do_not_poison_the_rest() {
        let text = "\
mode image
in-w = many
out-w = 1920
unknown-key = 1
";
        let mut cfg = PipelineConfig::default();
        apply_lines(text, &mut cfg, "test.conf");
        // the one well-formed line still lands
        assert_eq!(cfg.output.width, 1920);
        // the broken ones left the defaults alone
        assert_eq!(cfg.mode, Mode::Blur);
        assert_eq!(cfg.input.width, 1280);
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut cfg = PipelineConfig::default();
        apply_file(Path::new("/nonexistent/spotlight.conf"), &mut cfg);
        assert_eq!(cfg.input.width, 1280);
    }
}

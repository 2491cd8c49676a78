//! Command-line arguments shared by the binaries.
//!
//! Parsed by hand: there are only a few flags and no subcommands.

use anyhow::{anyhow, Result};

use crate::types::TICK_MS;

#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub seed: u32,
    /// Frames to simulate before stopping; headless only
    pub frames: u32,
    /// Wall-clock milliseconds handed to each headless frame
    pub frame_ms: f64,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            seed: 1,
            frames: 3_000,
            frame_ms: TICK_MS,
        }
    }
}

/// Parse flags after the program name.
///
/// `tool` prefixes error messages. With `headless == false` only `--seed`
/// is accepted.
pub fn parse_run_args(tool: &str, args: &[String], headless: bool) -> Result<RunArgs> {
    let mut out = RunArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--seed" => {
                let v = value(tool, args, &mut i, flag)?;
                out.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("{}: invalid --seed value: {}", tool, v))?;
            }
            "--frames" if headless => {
                let v = value(tool, args, &mut i, flag)?;
                out.frames = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("{}: invalid --frames value: {}", tool, v))?;
            }
            "--frame-ms" if headless => {
                let v = value(tool, args, &mut i, flag)?;
                out.frame_ms = v
                    .parse::<f64>()
                    .ok()
                    .filter(|ms| ms.is_finite() && *ms > 0.0)
                    .ok_or_else(|| anyhow!("{}: invalid --frame-ms value: {}", tool, v))?;
            }
            other => {
                return Err(anyhow!("{}: unknown argument: {}", tool, other));
            }
        }
        i += 1;
    }
    Ok(out)
}

fn value<'a>(tool: &str, args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{}: missing value for {}", tool, flag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_defaults_without_flags() {
        assert_eq!(parse_run_args("t", &[], true).unwrap(), RunArgs::default());
    }

    #[test]
    fn test_parses_headless_flags() {
        let parsed =
            parse_run_args("t", &args(&["--seed", "9", "--frames", "40", "--frame-ms", "16"]), true)
                .unwrap();
        assert_eq!(parsed.seed, 9);
        assert_eq!(parsed.frames, 40);
        assert_eq!(parsed.frame_ms, 16.0);
    }

    #[test]
    fn test_rejects_missing_and_bad_values() {
        let err = parse_run_args("t", &args(&["--seed"]), true).unwrap_err();
        assert!(err.to_string().contains("missing value for --seed"));
        assert!(parse_run_args("t", &args(&["--frame-ms", "-3"]), true).is_err());
    }

    #[test]
    fn test_interactive_rejects_headless_flags() {
        let err = parse_run_args("t", &args(&["--frames", "3"]), false).unwrap_err();
        assert!(err.to_string().contains("unknown argument: --frames"));
    }
}

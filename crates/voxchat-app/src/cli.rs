//! CLI argument definitions for the voxchat binary.
//!
//! Uses `clap` with derive macros.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voxchat - speak into a chat editor, with spoken punctuation.
#[derive(Parser, Debug)]
#[command(name = "voxchat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the normalized form of a spoken transcript.
    Normalize {
        /// Transcript words; joined with single spaces.
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Drive a session with a JSON Lines script of recognition events.
    Replay {
        /// Script file, one recognition event per line.
        script: PathBuf,

        /// Insert only, never press send.
        #[arg(long = "no-auto-send")]
        no_auto_send: bool,

        /// Replace the editor content on every chunk instead of appending.
        #[arg(long = "replace")]
        replace: bool,

        /// Legacy mode: non-continuous engine, replace, no auto-restart.
        #[arg(long = "single-shot")]
        single_shot: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOXCHAT_CONFIG env var > ~/.voxchat/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VOXCHAT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voxchat").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voxchat").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalize() {
        let args = CliArgs::parse_from(["voxchat", "normalize", "hello", "comma", "world"]);
        match args.command {
            Command::Normalize { text } => assert_eq!(text, vec!["hello", "comma", "world"]),
            other => panic!("Expected Normalize, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_replay_flags() {
        let args = CliArgs::parse_from([
            "voxchat",
            "-l",
            "debug",
            "replay",
            "script.jsonl",
            "--no-auto-send",
            "--single-shot",
        ]);
        assert_eq!(args.resolve_log_level("info"), "debug");
        match args.command {
            Command::Replay {
                script,
                no_auto_send,
                replace,
                single_shot,
            } => {
                assert_eq!(script, PathBuf::from("script.jsonl"));
                assert!(no_auto_send);
                assert!(!replace);
                assert!(single_shot);
            }
            other => panic!("Expected Replay, got {:?}", other),
        }
    }

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs::parse_from(["voxchat", "-c", "/tmp/vox.toml", "normalize", "x"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/vox.toml"));
        assert_eq!(args.resolve_log_level("warn"), "warn");
    }
}

//! Command-line configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_SETTINGS_FILE: &str = ".cache/settings.json";

/// Narrate a page aloud, one item at a time, with highlighting.
#[derive(Parser, Debug, Clone)]
#[command(name = "page-narrator", version, about)]
pub struct Args {
    /// Page document (JSON content tree)
    #[arg(long)]
    pub page: PathBuf,

    /// Directory holding `translations_<lang>.json` files
    #[arg(long, default_value = ".")]
    pub translations_dir: PathBuf,

    /// Initial language code
    #[arg(long, default_value = "es")]
    pub lang: String,

    /// Directory that audio paths in the translation files are relative to
    #[arg(long)]
    pub audio_root: Option<PathBuf>,

    /// Start with easy-read narration enabled
    #[arg(long)]
    pub easy_read: bool,

    /// Start with image descriptions narrated
    #[arg(long)]
    pub describe_images: bool,

    /// Where the speed preference is stored
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings_file: PathBuf,

    /// Give up on an item that neither finishes nor fails within this many seconds
    #[arg(long)]
    pub item_timeout_secs: Option<u64>,
}

impl Args {
    pub fn audio_root(&self) -> PathBuf {
        self.audio_root
            .clone()
            .unwrap_or_else(|| self.translations_dir.clone())
    }

    pub fn item_timeout(&self) -> Option<Duration> {
        self.item_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

use crate::fixer_core::normalize::NormalizeOptions;
use clap::Parser;
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Repair takeout metadata sidecar names so exiftool can pair them with their photos"
)]
pub struct Cli {
    /// Takeout directory to repair (searched recursively)
    #[arg(required = true)]
    pub root_dir: PathBuf,

    /// Show what would be changed without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Copy the original photo's sidecar to edited copies (e.g. IMG_1-edited.jpg)
    #[arg(long)]
    pub copy_edited: bool,

    /// Write a sidecar from the filename timestamp for photos that have none
    #[arg(long)]
    pub infer_missing: bool,

    /// Enable file logging to takeout-fixer.log
    #[arg(long = "log")]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            dry_run: self.dry_run,
            copy_edited: self.copy_edited,
            infer_missing: self.infer_missing,
        }
    }
}

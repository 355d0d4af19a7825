use anyhow::Result;
use clap::Parser;
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fmt::Display;
use std::fs::File;
use takeout_fixer::fixer_core::{Cli, RuleSet, normalize};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("takeout-fixer.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    let options = cli.normalize_options();
    let rules = RuleSet::builtin()?;
    let report = normalize(&cli.root_dir, &rules, &options)?;

    if options.dry_run {
        println!("DRY RUN: no files were changed");
    }

    println!("Total files found in {}: {}", cli.root_dir.display(), report.files_scanned);

    print_numbered("errors", &report.problems);

    let fixes: Vec<String> = report
        .renames
        .iter()
        .map(|r| format!("{} moved to {} ({})", file_name(&r.from), file_name(&r.to), r.rule))
        .chain(
            report
                .copies
                .iter()
                .map(|c| format!("{} copied to {}", file_name(&c.from), file_name(&c.to))),
        )
        .chain(report.generated.iter().map(|g| format!("{} written", file_name(g))))
        .collect();
    print_numbered("fixes", &fixes);

    let missing: Vec<_> = report.missing_sidecars.iter().map(|p| p.display()).collect();
    if !missing.is_empty() {
        println!("\nMetadata not found for {} files:", missing.len());
        for (index, file) in missing.iter().enumerate() {
            println!("[{}/{}] {}", index + 1, missing.len(), file);
        }
    }

    println!("\nDone!");
    if report.fix_count() == 0 {
        println!("  No sidecars needed fixing");
    }
    println!("  {} sidecars renamed", report.renames.len());
    if !report.duplicates.is_empty() {
        println!("  {} duplicates skipped", report.duplicates.len());
    }
    if !report.copies.is_empty() {
        println!("  {} sidecars copied", report.copies.len());
    }
    if !report.generated.is_empty() {
        println!("  {} sidecars generated", report.generated.len());
    }
    let conflicts = report.conflicts().count();
    if conflicts > 0 {
        println!("  {} conflicts skipped", conflicts);
    }

    Ok(())
}

fn print_numbered<T: Display>(label: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }
    println!("\nProcess finalized with {} {}:", items.len(), label);
    for (index, item) in items.iter().enumerate() {
        println!("[{}/{}] {}", index + 1, items.len(), item);
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

use crate::fixer_core::error::{FixerError, Result};
use crate::fixer_core::infer::{TimeInference, inferred_metadata, write_sidecar};
use crate::fixer_core::media::is_media;
use crate::fixer_core::rules::RuleSet;
use crate::fixer_core::sidecar::{
    canonical_sidecar_path, is_canonical_sidecar, original_for_edited,
};
use base64::{Engine, engine::general_purpose};
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a normalization run is allowed to do besides renaming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Report what would change without touching the tree.
    pub dry_run: bool,
    /// Give edited photo copies the sidecar of their original.
    pub copy_edited: bool,
    /// Generate sidecars from filename timestamps for photos without one.
    pub infer_missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedSidecar {
    pub from: PathBuf,
    pub to: PathBuf,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedSidecar {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Everything a run did, planned, or had to skip.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub files_scanned: usize,
    pub renames: Vec<RenamedSidecar>,
    /// Malformed sidecars left in place because an identical canonical one exists.
    pub duplicates: Vec<PathBuf>,
    pub copies: Vec<CopiedSidecar>,
    pub generated: Vec<PathBuf>,
    /// Non-fatal problems, in the order they were found.
    pub problems: Vec<FixerError>,
    /// Photos that still have no canonical sidecar.
    pub missing_sidecars: Vec<PathBuf>,
}

impl NormalizeReport {
    pub fn conflicts(&self) -> impl Iterator<Item = &FixerError> {
        self.problems.iter().filter(|p| p.is_conflict())
    }

    pub fn fix_count(&self) -> usize {
        self.renames.len() + self.copies.len() + self.generated.len()
    }
}

/// View of the tree that also reflects changes a dry run only planned.
struct PlannedTree {
    dry_run: bool,
    /// Planned path -> real file holding its content.
    created: HashMap<PathBuf, PathBuf>,
    removed: HashSet<PathBuf>,
}

impl PlannedTree {
    fn new(dry_run: bool) -> Self {
        PlannedTree {
            dry_run,
            created: HashMap::new(),
            removed: HashSet::new(),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.created.contains_key(path) || (!self.removed.contains(path) && path.exists())
    }

    fn content_path<'a>(&'a self, path: &'a Path) -> &'a Path {
        self.created.get(path).map(PathBuf::as_path).unwrap_or(path)
    }

    fn record_rename(&mut self, from: &Path, to: &Path) {
        if self.dry_run {
            let content = self.content_path(from).to_path_buf();
            self.removed.insert(from.to_path_buf());
            self.created.insert(to.to_path_buf(), content);
        }
    }

    fn record_create(&mut self, path: &Path, content: &Path) {
        if self.dry_run {
            let content = self.content_path(content).to_path_buf();
            self.created.insert(path.to_path_buf(), content);
        }
    }
}

/// Walk `root` and repair every sidecar whose name the tagging step would not match.
pub fn normalize(
    root: &Path,
    rules: &RuleSet,
    options: &NormalizeOptions,
) -> Result<NormalizeReport> {
    if !root.exists() {
        return Err(FixerError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(FixerError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|source| FixerError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut report = NormalizeReport::default();

    log::info!("Phase 1: Scanning {}", root.display());
    let files = collect_files(root, &mut report);
    report.files_scanned = files.len();

    if let Err(e) = fix_files(&files, rules, options, &mut report) {
        log_completed_fixes(&report);
        return Err(e);
    }

    Ok(report)
}

fn fix_files(
    files: &[PathBuf],
    rules: &RuleSet,
    options: &NormalizeOptions,
    report: &mut NormalizeReport,
) -> Result<()> {
    let mut tree = PlannedTree::new(options.dry_run);

    let photos: Vec<&PathBuf> = files.iter().filter(|p| is_media(p)).collect();
    log::info!("Found {} files, {} photos and videos", files.len(), photos.len());

    log::info!("Phase 2: Renaming malformed sidecars");
    let bar = progress_bar(files.len());
    for path in files {
        if let Err(e) = fix_sidecar_name(path, rules, &mut tree, report) {
            bar.abandon();
            return Err(e);
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    log::info!("{} sidecars renamed", report.renames.len());

    if options.copy_edited {
        log::info!("Phase 3: Copying sidecars to edited photos");
        for photo in &photos {
            copy_edited_sidecar(photo, &mut tree, report)?;
        }
    }

    if options.infer_missing {
        log::info!("Phase 4: Inferring missing sidecars");
        let inference = TimeInference::new()?;
        for photo in &photos {
            generate_sidecar(photo, &inference, &mut tree, report)?;
        }
    }

    report.missing_sidecars = photos
        .iter()
        .filter(|photo| match canonical_sidecar_path(photo) {
            Some(sidecar) => !tree.exists(&sidecar),
            None => true,
        })
        .map(|photo| photo.to_path_buf())
        .collect();

    Ok(())
}

/// List what a run changed on disk before a fatal error stopped it.
fn log_completed_fixes(report: &NormalizeReport) {
    let done = report.fix_count();
    if done == 0 {
        return;
    }

    log::error!("{} fixes were applied before the run stopped:", done);
    for rename in &report.renames {
        log::error!("  {} moved to {}", rename.from.display(), rename.to.display());
    }
    for copy in &report.copies {
        log::error!("  {} copied to {}", copy.from.display(), copy.to.display());
    }
    for generated in &report.generated {
        log::error!("  {} written", generated.display());
    }
}

/// Collect every regular file under `root`, in file-name order.
fn collect_files(root: &Path, report: &mut NormalizeReport) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                report.problems.push(FixerError::Walk(e));
            }
        }
    }

    files
}

fn fix_sidecar_name(
    path: &Path,
    rules: &RuleSet,
    tree: &mut PlannedTree,
    report: &mut NormalizeReport,
) -> Result<()> {
    let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
        log::debug!("Skipping non UTF-8 filename: {}", path.display());
        return Ok(());
    };

    if is_canonical_sidecar(filename) {
        log::debug!("Already canonical: {}", path.display());
        return Ok(());
    }

    let Some(rewrite) = rules.rewrite(filename) else {
        return Ok(());
    };

    let target = path.with_file_name(&rewrite.filename);
    log::debug!("Rule '{}' matched {} -> {}", rewrite.rule, filename, rewrite.filename);

    if tree.exists(&target) {
        if same_contents(tree.content_path(path), tree.content_path(&target))? {
            log::info!(
                "{} already exists with identical content, leaving {} in place",
                target.display(),
                path.display()
            );
            report.duplicates.push(path.to_path_buf());
        } else {
            let conflict = FixerError::NameConflict {
                sidecar: path.to_path_buf(),
                target,
            };
            log::warn!("{}", conflict);
            report.problems.push(conflict);
        }
        return Ok(());
    }

    if !tree.dry_run {
        rename_file(path, &target)?;
    }
    tree.record_rename(path, &target);
    log::info!("{} moved to {}", filename, rewrite.filename);

    report.renames.push(RenamedSidecar {
        from: path.to_path_buf(),
        to: target,
        rule: rewrite.rule,
    });
    Ok(())
}

fn copy_edited_sidecar(
    photo: &Path,
    tree: &mut PlannedTree,
    report: &mut NormalizeReport,
) -> Result<()> {
    let Some(original) = original_for_edited(photo) else {
        return Ok(());
    };
    let (Some(edited_sidecar), Some(original_sidecar)) =
        (canonical_sidecar_path(photo), canonical_sidecar_path(&original))
    else {
        return Ok(());
    };

    if tree.exists(&edited_sidecar) {
        return Ok(());
    }

    if !tree.exists(&original_sidecar) {
        let problem = FixerError::MissingOriginal {
            edited: photo.to_path_buf(),
            expected: original_sidecar,
        };
        log::warn!("{}", problem);
        report.problems.push(problem);
        return Ok(());
    }

    if !tree.dry_run {
        fs::copy(tree.content_path(&original_sidecar), &edited_sidecar)?;
    }
    tree.record_create(&edited_sidecar, &original_sidecar);
    log::info!(
        "{} copied to {}",
        original_sidecar.display(),
        edited_sidecar.display()
    );

    report.copies.push(CopiedSidecar {
        from: original_sidecar,
        to: edited_sidecar,
    });
    Ok(())
}

fn generate_sidecar(
    photo: &Path,
    inference: &TimeInference,
    tree: &mut PlannedTree,
    report: &mut NormalizeReport,
) -> Result<()> {
    let Some(sidecar) = canonical_sidecar_path(photo) else {
        return Ok(());
    };
    if tree.exists(&sidecar) {
        return Ok(());
    }

    let taken_at = match inference.capture_time(photo) {
        Ok(Some(taken_at)) => taken_at,
        Ok(None) => {
            let problem = FixerError::Uninferable(photo.to_path_buf());
            log::warn!("{}", problem);
            report.problems.push(problem);
            return Ok(());
        }
        Err(e @ FixerError::InvalidDate(_)) => {
            log::warn!("{}", e);
            report.problems.push(e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let metadata = inferred_metadata(photo, taken_at)?;
    if !tree.dry_run {
        write_sidecar(&sidecar, &metadata)?;
    }
    tree.record_create(&sidecar, &sidecar);
    log::info!("{} written", sidecar.display());

    report.generated.push(sidecar);
    Ok(())
}

fn rename_file(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => FixerError::PermissionDenied {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        },
        _ => FixerError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        },
    })
}

fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(hash_file(a)? == hash_file(b)?)
}

/// Calculate the SHA256 hash of a file at the given path and returns it as base64.
fn hash_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(general_purpose::STANDARD.encode(hasher.finalize()))
}

fn progress_bar(len: usize) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(len as u64).with_style(style);
    bar.set_message("Checking sidecar names");
    bar
}

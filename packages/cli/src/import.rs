use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use console::style;
use walkdir::WalkDir;

use crate::client::{ApiClient, ImageSummary};

pub struct ImportOptions {
    pub dir: PathBuf,
    pub folder: String,
    pub extensions: Vec<String>,
    pub recursive: bool,
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim().trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Files under `options.dir` with one of the wanted extensions, sorted by path.
pub fn collect_files(options: &ImportOptions) -> anyhow::Result<Vec<PathBuf>> {
    if !options.dir.is_dir() {
        bail!("{} is not a directory", options.dir.display());
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(&options.dir)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to scan {}", options.dir.display()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), &options.extensions) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Catalog operations the importer needs.
pub trait ImportTarget {
    fn find_by_title(&self, title: &str) -> anyhow::Result<Option<ImageSummary>>;

    fn upload(
        &self,
        path: &Path,
        folder: &str,
        title: &str,
        description: &str,
    ) -> anyhow::Result<ImageSummary>;
}

impl ImportTarget for ApiClient {
    fn find_by_title(&self, title: &str) -> anyhow::Result<Option<ImageSummary>> {
        ApiClient::find_by_title(self, title)
    }

    fn upload(
        &self,
        path: &Path,
        folder: &str,
        title: &str,
        description: &str,
    ) -> anyhow::Result<ImageSummary> {
        ApiClient::upload(self, path, folder, title, description)
    }
}

/// Per-file outcome counts of one import run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Catalog title for a file: extension stripped, `_` and `-` read as spaces.
///
/// Matches the title the server derives for an upload without one.
pub fn title_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let title = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}

/// Upload `files` one by one, skipping those whose title is already catalogued.
pub fn import_files<T: ImportTarget>(
    target: &T,
    files: &[PathBuf],
    folder: &str,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let title = title_from_filename(&name);

        match target.find_by_title(&title) {
            Ok(Some(_)) => {
                summary.skipped += 1;
                println!("  {} Skipping {} (already exists)", style("⏭").yellow(), name);
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                summary.failed += 1;
                println!("  {} {}: {:#}", style("✗").red(), name, e);
                continue;
            }
        }

        let description = format!("Imported from {name}");
        match target.upload(path, folder, &title, &description) {
            Ok(image) => {
                summary.imported += 1;
                println!(
                    "  {} {} -> {} ({})",
                    style("✓").green(),
                    name,
                    image.title,
                    image.id
                );
            }
            Err(e) => {
                summary.failed += 1;
                println!("  {} {}: {:#}", style("✗").red(), name, e);
            }
        }
    }

    summary
}

pub fn run<T: ImportTarget>(target: &T, options: &ImportOptions) -> anyhow::Result<()> {
    let files = collect_files(options)?;
    if files.is_empty() {
        println!("No matching images in {}", options.dir.display());
        return Ok(());
    }

    println!(
        "Importing {} images into '{}'",
        files.len(),
        options.folder
    );

    let summary = import_files(target, &files, &options.folder);

    println!();
    println!("  Imported: {}", summary.imported);
    println!("  Skipped:  {}", summary.skipped);
    println!("  Failed:   {}", summary.failed);

    if summary.failed > 0 {
        bail!("{} of {} files failed to import", summary.failed, files.len());
    }
    Ok(())
}

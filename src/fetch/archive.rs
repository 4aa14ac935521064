use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Unpacks every member of `zip_path` into `target_dir`. A corrupt archive
/// or I/O error is logged and reported as `false`, not propagated.
pub fn extract(zip_path: &Path, target_dir: &Path) -> bool {
    let attempt = || -> Result<()> {
        std::fs::create_dir_all(target_dir)
            .with_context(|| format!("creating {}", target_dir.display()))?;
        let file =
            File::open(zip_path).with_context(|| format!("opening {}", zip_path.display()))?;
        let mut archive = zip::ZipArchive::new(file).context("reading zip archive")?;
        archive
            .extract(target_dir)
            .context("extracting zip archive")?;
        Ok(())
    };

    match attempt() {
        Ok(()) => {
            info!(
                "Extracted {} to {}",
                zip_path.display(),
                target_dir.display()
            );
            true
        }
        Err(e) => {
            error!("Extraction failed: {:#}", e);
            false
        }
    }
}

/// Finds a CSV in `dir` whose file name contains `pattern`
/// (case-insensitive). Falls back to the first CSV present; `None` means the
/// dataset is unavailable for this run.
pub fn find_csv(dir: &Path, pattern: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;

    let mut csv_files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    // read_dir order is platform-dependent
    csv_files.sort();

    let needle = pattern.to_lowercase();
    csv_files
        .iter()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .cloned()
        .or_else(|| csv_files.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in members {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_and_find_csv() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("ai-models.zip");
        write_zip(
            &zip_path,
            &[
                ("readme.txt", "docs"),
                ("ai-models.csv", "Model,Domain\nGPT-X,Language\n"),
            ],
        );

        let target = dir.path().join("out");
        assert!(extract(&zip_path, &target));

        let found = find_csv(&target, "models").unwrap();
        assert_eq!(found.file_name().unwrap(), "ai-models.csv");
    }

    #[test]
    fn test_find_csv_falls_back_to_first_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x\n").unwrap();

        let found = find_csv(dir.path(), "benchmark").unwrap();
        assert_eq!(found.file_name().unwrap(), "a.csv");
    }

    #[test]
    fn test_find_csv_none_when_no_csv_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert!(find_csv(dir.path(), "models").is_none());
    }

    #[test]
    fn test_extract_empty_archive_yields_no_csv() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("empty.zip");
        write_zip(&zip_path, &[]);

        let target = dir.path().join("out");
        assert!(extract(&zip_path, &target));
        assert!(find_csv(&target, "models").is_none());
    }

    #[test]
    fn test_extract_reports_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("bad.zip");
        std::fs::write(&zip_path, b"not a zip at all").unwrap();

        assert!(!extract(&zip_path, &dir.path().join("out")));
    }
}

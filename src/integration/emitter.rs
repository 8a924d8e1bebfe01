//! Result emitter: writes a report as JSON without ever leaving a partial file.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::Result;
use crate::integration::Report;

/// Serialize a report to pretty JSON.
pub fn to_json_string(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Create a uniquely named staging file next to `path`.
fn staging_file(path: &Path, parent: &Path) -> io::Result<NamedTempFile> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let mut prefix = file_name.to_os_string();
    prefix.push(".");
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".partial")
        .tempfile_in(parent)
}

/// Write a report to `path`.
///
/// The report is written to a uniquely named sibling staging file first and
/// renamed into place once complete, so concurrent writers never share a
/// staging file. The staging file is removed if writing fails. The parent
/// directory must already exist.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("directory {} does not exist", parent.display()),
        )
        .into());
    }

    let mut staged = staging_file(path, parent)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
    }
    staged.persist(path).map_err(|err| err.error)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::{Recording, evaluate_recording};
    use crate::tracker::EngineConfig;

    fn report() -> Report {
        let recording = Recording::from_json(
            r#"{"frames": [{"frame": 0, "objects": [{"position": [0.0, 0.0]}]}]}"#,
        )
        .unwrap();
        evaluate_recording(&recording, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_report(&report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, report());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_concurrent_staging_files_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let other_writer = staging_file(&path, dir.path()).unwrap();
        std::fs::write(other_writer.path(), "in progress").unwrap();

        write_report(&report(), &path).unwrap();

        assert_ne!(other_writer.path(), path.as_path());
        assert_eq!(
            std::fs::read_to_string(other_writer.path()).unwrap(),
            "in progress"
        );
        let parsed: Report = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report());
    }

    #[test]
    fn test_missing_directory_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.json");
        assert!(write_report(&report(), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_json_is_deterministic() {
        assert_eq!(
            to_json_string(&report()).unwrap(),
            to_json_string(&report()).unwrap()
        );
    }
}

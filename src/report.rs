use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Error;
use crate::session::{FileType, MissingFileRecord};
use crate::utils::path::extract_path_components;

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    file_type: &'a str,
    display_name: &'a str,
    original_path: &'a str,
    parent_dir: String,
    file_name: String,
    extension: String,
    used: bool,
    materials: String,
    objects: String,
    nodes: String,
    library: &'a str,
}

/// Flat-text report, grouped by file type in a fixed order.
pub fn render_text<W: Write>(
    out: &mut W,
    records: &[MissingFileRecord],
    scene_file: Option<&Path>,
) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{}", rule)?;
    writeln!(out, "MISSING FILES REPORT")?;
    match scene_file {
        Some(path) => writeln!(out, "Scene File: {}", path.display())?,
        None => writeln!(out, "Scene File: (unsaved)")?,
    }
    writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    let mut number = 0;
    for file_type in FileType::ALL {
        let group: Vec<&MissingFileRecord> =
            records.iter().filter(|r| r.file_type == file_type).collect();
        if group.is_empty() {
            continue;
        }
        writeln!(out, "--- {} ({}) ---", file_type, group.len())?;
        writeln!(out)?;
        for record in group {
            number += 1;
            writeln!(out, "{}. MISSING FILE:", number)?;
            writeln!(out, "   File Name: {}", record.display_name)?;
            writeln!(out, "   File Type: {}", record.file_type)?;
            writeln!(out, "   Original Path: {}", record.original_path)?;
            writeln!(
                out,
                "   Status: {}",
                if record.is_used() { "used" } else { "unused" }
            )?;
            writeln!(out, "   Used in Materials: {}", record.materials_label())?;
            writeln!(out, "   Assigned to Objects: {}", record.objects_label())?;
            writeln!(out, "   Node Names: {}", record.nodes_label())?;
            if record.is_linked {
                writeln!(out, "   Library: {}", record.library_path)?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out, "{}", rule)?;
    writeln!(out, "Total missing files: {}", records.len())?;
    writeln!(out, "{}", rule)?;
    Ok(())
}

/// One CSV row per record.
pub fn render_csv<W: Write>(out: W, records: &[MissingFileRecord]) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        let parts = extract_path_components(&record.original_path);
        writer
            .serialize(CsvRow {
                file_type: record.file_type.label(),
                display_name: &record.display_name,
                original_path: &record.original_path,
                parent_dir: parts.parent_dir,
                file_name: parts.base_filename,
                extension: parts.extension,
                used: record.is_used(),
                materials: record.materials_label(),
                objects: record.objects_label(),
                nodes: record.nodes_label(),
                library: &record.library_path,
            })
            .map_err(io::Error::from)?;
    }
    writer.flush()
}

/// Write the report to `destination`, or to the configured file name next to
/// the scene document. Returns the path written.
pub fn write_report(
    records: &[MissingFileRecord],
    scene_file: Option<&Path>,
    destination: Option<&Path>,
    report_file_name: &str,
    format: ReportFormat,
) -> Result<PathBuf, Error> {
    let path = match destination {
        Some(path) => path.to_path_buf(),
        None => scene_file
            .and_then(Path::parent)
            .map(|dir| dir.join(report_file_name))
            .ok_or(Error::SaveLocationUnknown)?,
    };

    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&path)?);
        match format {
            ReportFormat::Text => render_text(&mut out, records, scene_file)?,
            ReportFormat::Csv => render_csv(&mut out, records)?,
        }
        out.flush()
    };
    write().map_err(|source| Error::WriteFailed {
        path: path.clone(),
        source,
    })?;

    info!("Report exported to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn records() -> Vec<MissingFileRecord> {
        let mut wood = MissingFileRecord::new("//textures/wood.png", "wood", FileType::Image);
        wood.referencing_materials.insert("Floor".into());
        wood.referencing_objects.insert("Floor".into());
        let hum = MissingFileRecord::new("//audio/hum.wav", "hum", FileType::Sound);
        vec![hum, wood]
    }

    #[test]
    fn test_text_groups_by_type() {
        let mut out = Vec::new();
        render_text(&mut out, &records(), Some(Path::new("/shots/a.json"))).unwrap();
        let text = String::from_utf8(out).unwrap();

        let image_at = text.find("--- IMAGE (1) ---").unwrap();
        let sound_at = text.find("--- SOUND (1) ---").unwrap();
        assert!(image_at < sound_at);
        assert!(text.contains("Scene File: /shots/a.json"));
        assert!(text.contains("1. MISSING FILE:\n   File Name: wood"));
        assert!(text.contains("Assigned to Objects: (unused)"));
        assert!(text.contains("Total missing files: 2"));
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut out = Vec::new();
        render_csv(&mut out, &records()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("file_type,display_name,original_path,parent_dir"));
        assert!(lines[2].contains("//textures,wood.png,.png,true"));
    }

    #[test]
    fn test_default_destination_next_to_scene() {
        let tmp = tempdir().unwrap();
        let scene = tmp.path().join("shot.json");
        let path = write_report(
            &records(),
            Some(&scene),
            None,
            "missing_files_report.txt",
            ReportFormat::Text,
        )
        .unwrap();
        assert_eq!(path, tmp.path().join("missing_files_report.txt"));
        assert!(path.is_file());
    }

    #[test]
    fn test_unsaved_scene_without_destination() {
        let err = write_report(&records(), None, None, "r.txt", ReportFormat::Text).unwrap_err();
        assert!(matches!(err, Error::SaveLocationUnknown));
    }
}

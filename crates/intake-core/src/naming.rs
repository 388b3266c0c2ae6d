//! Naming rules for the upload trees.
//!
//! Originals live at `<original_dir>/YYYY/MM/DD/<slot>.<ext>`; normalized outputs reuse
//! the same date bucket and slot under `<processed_dir>`.

use chrono::NaiveDate;

/// Slot that follows the highest committed slot of a directory.
pub fn next_slot(highest: Option<i64>) -> i64 {
    highest.map_or(1, |slot| slot + 1)
}

/// `YYYY/MM/DD` bucket for uploads received on `date`.
pub fn date_bucket(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

pub fn join_key(prefix: &str, rest: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let rest = rest.trim_start_matches('/');
    if prefix.is_empty() {
        rest.to_string()
    } else if rest.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, rest)
    }
}

/// Lowercased extension of `filename` without the leading dot.
pub fn extension(filename: &str) -> Option<String> {
    let name = base_name(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Filename without directory components or extension.
pub fn file_stem(filename: &str) -> &str {
    let name = base_name(filename);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Last path component, accepting both separators since browsers differ.
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Stored name for `original_filename` at `slot`: `<slot>.<ext>`, or just `<slot>`.
pub fn slot_file_name(slot: i64, original_filename: &str) -> String {
    match extension(original_filename) {
        Some(ext) => format!("{}.{}", slot, ext),
        None => slot.to_string(),
    }
}

/// Directory for normalized outputs mirroring `original_directory`.
pub fn processed_directory(
    original_directory: &str,
    original_dir: &str,
    processed_dir: &str,
) -> String {
    let prefix = format!("{}/", original_dir.trim_matches('/'));
    let bucket = original_directory
        .strip_prefix(prefix.as_str())
        .unwrap_or(original_directory);
    join_key(processed_dir, bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_slot_starts_at_one() {
        assert_eq!(next_slot(None), 1);
        assert_eq!(next_slot(Some(1)), 2);
        assert_eq!(next_slot(Some(41)), 42);
    }

    #[test]
    fn test_date_bucket_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(date_bucket(date), "2026/03/07");
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension("Photo.PNG"), Some("png".to_string()));
        assert_eq!(extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension("README"), None);
        assert_eq!(extension(".bashrc"), None);
        assert_eq!(extension("dir.v2/notes"), None);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("b.txt"), "b");
        assert_eq!(file_stem("uploads/original/3.png"), "3");
        assert_eq!(file_stem("C:\\docs\\report.final.md"), "report.final");
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn test_slot_file_name() {
        assert_eq!(slot_file_name(7, "a.PNG"), "7.png");
        assert_eq!(slot_file_name(8, "Makefile"), "8");
    }

    #[test]
    fn test_processed_directory_mirrors_bucket() {
        assert_eq!(
            processed_directory("original/2026/10/19", "original", "processed"),
            "processed/2026/10/19"
        );
        assert_eq!(
            processed_directory("elsewhere/x", "original", "processed/"),
            "processed/elsewhere/x"
        );
        assert_eq!(
            processed_directory("originals/2026", "original", "processed"),
            "processed/originals/2026"
        );
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("original/", "/2026"), "original/2026");
        assert_eq!(join_key("", "a"), "a");
        assert_eq!(join_key("a", ""), "a");
    }
}

use std::path::{Path, PathBuf};

/// Tag the export service puts between the photo filename and `.json`.
pub const METADATA_TAG: &str = "supplemental-metadata";

/// Suffix the tagging command expects after the full photo filename.
pub const CANONICAL_SUFFIX: &str = ".supplemental-metadata.json";

/// Stem suffixes the export service appends to edited copies of a photo.
pub const EDITED_MARKERS: &[&str] = &["-edited", "-editada", "-bearbeitet", "-modifié"];

/// Get the canonical sidecar filename for a photo filename.
///
/// Example: canonical_sidecar_name("IMG_0001.jpg") -> "IMG_0001.jpg.supplemental-metadata.json"
pub fn canonical_sidecar_name(photo_filename: &str) -> String {
    format!("{}{}", photo_filename, CANONICAL_SUFFIX)
}

/// Get the canonical sidecar path next to a photo.
pub fn canonical_sidecar_path(photo_path: &Path) -> Option<PathBuf> {
    let filename = photo_path.file_name()?.to_str()?;
    Some(photo_path.with_file_name(canonical_sidecar_name(filename)))
}

/// Check whether a filename already carries the canonical sidecar suffix.
pub fn is_canonical_sidecar(filename: &str) -> bool {
    filename.len() > CANONICAL_SUFFIX.len() && filename.ends_with(CANONICAL_SUFFIX)
}

/// Find the unedited photo an edited copy was derived from.
///
/// Example: "IMG_0001-edited.jpg" -> "IMG_0001.jpg"
pub fn original_for_edited(photo_path: &Path) -> Option<PathBuf> {
    let stem = photo_path.file_stem()?.to_str()?;
    let original_stem = EDITED_MARKERS
        .iter()
        .find_map(|marker| stem.strip_suffix(marker))
        .filter(|s| !s.is_empty())?;

    let filename = match photo_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", original_stem, ext),
        None => original_stem.to_string(),
    };

    Some(photo_path.with_file_name(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_sidecar_name() {
        assert_eq!(
            canonical_sidecar_name("IMG_0001.jpg"),
            "IMG_0001.jpg.supplemental-metadata.json"
        );
        assert_eq!(
            canonical_sidecar_path(Path::new("Photos from 2021/20210529_155539(1).jpg")),
            Some(PathBuf::from(
                "Photos from 2021/20210529_155539(1).jpg.supplemental-metadata.json"
            ))
        );
    }

    #[test]
    fn test_is_canonical_sidecar() {
        assert!(is_canonical_sidecar("IMG_0001.jpg.supplemental-metadata.json"));
        assert!(!is_canonical_sidecar("IMG_0001.jpg.suppl.json"));
        assert!(!is_canonical_sidecar(".supplemental-metadata.json"));
        assert!(!is_canonical_sidecar("IMG_0001.jpg.SUPPLEMENTAL-METADATA.json"));
    }

    #[test]
    fn test_original_for_edited() {
        assert_eq!(
            original_for_edited(Path::new("album/IMG_0001-edited.jpg")),
            Some(PathBuf::from("album/IMG_0001.jpg"))
        );
        assert_eq!(
            original_for_edited(Path::new("IMG_0002-editada.HEIC")),
            Some(PathBuf::from("IMG_0002.HEIC"))
        );
        assert_eq!(original_for_edited(Path::new("IMG_0003.jpg")), None);
        assert_eq!(original_for_edited(Path::new("-edited.jpg")), None);
    }
}

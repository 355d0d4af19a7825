use crate::fixer_core::error::{FixerError, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Date format the export service uses for the `formatted` fields.
const SIDECAR_DATE_FORMAT: &[time::format_description::FormatItem] =
    time::macros::format_description!(
        "[month repr:short] [day padding:none], [year], [hour repr:12 padding:none]:[minute]:[second] [period] UTC"
    );

/// Sidecar content written for a photo the export left without one.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InferredMetadata {
    pub title: String,
    pub description: String,
    pub image_views: String,
    pub creation_time: SidecarTime,
    pub photo_taken_time: SidecarTime,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SidecarTime {
    pub timestamp: String,
    pub formatted: String,
}

impl SidecarTime {
    pub fn new(taken_at: PrimitiveDateTime) -> Result<Self> {
        let utc = taken_at.assume_utc();
        Ok(SidecarTime {
            timestamp: utc.unix_timestamp().to_string(),
            formatted: utc.format(SIDECAR_DATE_FORMAT)?,
        })
    }
}

/// Infers capture times from the naming schemes cameras and phone apps use.
pub struct TimeInference {
    // 20210529_155539
    date_underscore_time: Regex,
    // CameraZOOM-20131224200623261
    date_time_millis: Regex,
    // DJI_20250308180700_0070_D
    delimited_date_time: Regex,
    // Photos from 2024/
    year_folder: Regex,
}

impl TimeInference {
    pub fn new() -> Result<Self> {
        Ok(TimeInference {
            date_underscore_time: Regex::new(r"(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})")?,
            date_time_millis: Regex::new(r"(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(\d{3})")?,
            delimited_date_time: Regex::new(r"_(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})_")?,
            year_folder: Regex::new(r"^Photos from (\d{4})$")?,
        })
    }

    /// Try to detect when a photo was taken from its filename, falling back
    /// to the year of a `Photos from YYYY` folder.
    ///
    /// A filename that matches a pattern but spells an impossible date is an
    /// error rather than a fallthrough.
    pub fn capture_time(&self, photo_path: &Path) -> Result<Option<PrimitiveDateTime>> {
        let stem = photo_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let invalid = || FixerError::InvalidDate(photo_path.to_path_buf());

        for pattern in [
            &self.date_underscore_time,
            &self.date_time_millis,
            &self.delimited_date_time,
        ] {
            if let Some(caps) = pattern.captures(stem) {
                return date_time_from(&caps).map(Some).ok_or_else(invalid);
            }
        }

        let folder = photo_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if let Some(caps) = self.year_folder.captures(folder) {
            let year: i32 = caps[1].parse().map_err(|_| invalid())?;
            let date = Date::from_calendar_date(year, Month::January, 1).map_err(|_| invalid())?;
            return Ok(Some(date.midnight()));
        }

        Ok(None)
    }
}

/// Build a date-time from six or seven numeric capture groups
/// (year, month, day, hour, minute, second and optional milliseconds).
fn date_time_from(caps: &Captures) -> Option<PrimitiveDateTime> {
    let field = |i: usize| caps.get(i).map(|m| m.as_str());

    let year: i32 = field(1)?.parse().ok()?;
    let month = Month::try_from(field(2)?.parse::<u8>().ok()?).ok()?;
    let day: u8 = field(3)?.parse().ok()?;
    let hour: u8 = field(4)?.parse().ok()?;
    let minute: u8 = field(5)?.parse().ok()?;
    let second: u8 = field(6)?.parse().ok()?;
    let millis: u16 = match field(7) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    let date = Date::from_calendar_date(year, month, day).ok()?;
    let time = Time::from_hms_milli(hour, minute, second, millis).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

/// Build the metadata the tagging step needs for a photo taken at `taken_at`.
pub fn inferred_metadata(
    photo_path: &Path,
    taken_at: PrimitiveDateTime,
) -> Result<InferredMetadata> {
    let filename = photo_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let stem = photo_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let time = SidecarTime::new(taken_at)?;

    Ok(InferredMetadata {
        title: filename,
        description: format!("Metadata inferred from {}", stem),
        image_views: "1".to_string(),
        creation_time: time.clone(),
        photo_taken_time: time,
    })
}

/// Write a generated sidecar. Fails if `sidecar_path` already exists.
pub fn write_sidecar(sidecar_path: &Path, metadata: &InferredMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(sidecar_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

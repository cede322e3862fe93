use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

static PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Z]+)="([^"]*)""#).expect("valid device property pattern"));

/// One block device parsed from a properties listing.
///
/// The engine only ever requires [`DeviceRecord::mount_point`] for devices it
/// acts on; the remaining fields exist so callers can present a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub name: String,
    pub model: Option<String>,
    pub size: Option<String>,
    pub removable: bool,
    pub mount_point: Option<PathBuf>,
}

/// Parses a listing of one `KEY="value"` properties line per device.
pub fn parse_device_records(listing: &str) -> Vec<DeviceRecord> {
    listing.lines().filter_map(parse_line).collect()
}

/// Like [`parse_device_records`], keeping only removable devices.
pub fn removable_devices(listing: &str) -> Vec<DeviceRecord> {
    parse_device_records(listing)
        .into_iter()
        .filter(|device| device.removable)
        .collect()
}

fn parse_line(line: &str) -> Option<DeviceRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut name = None;
    let mut model = None;
    let mut size = None;
    let mut removable = false;
    let mut mount_point = None;
    for caps in PROPERTY.captures_iter(line) {
        let value = caps[2].to_string();
        match &caps[1] {
            "NAME" => name = Some(value),
            "MODEL" => model = non_empty(value),
            "SIZE" => size = non_empty(value),
            "RM" => removable = value == "1",
            "MOUNTPOINT" => mount_point = non_empty(value).map(PathBuf::from),
            _ => {}
        }
    }

    Some(DeviceRecord {
        name: name?,
        model,
        size,
        removable,
        mount_point,
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

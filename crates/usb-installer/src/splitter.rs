use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use ul_filetypes::MediaKind;

/// Largest file the destination filesystem accepts in one piece.
pub const SPLIT_THRESHOLD: u64 = 700 * 1024 * 1024;

/// Titles whose image fits in one piece are CD class, everything larger is
/// DVD class.
pub fn classify(size: u64) -> MediaKind {
    if size <= SPLIT_THRESHOLD {
        MediaKind::Cd
    } else {
        MediaKind::Dvd
    }
}

/// Copies `source` to `dest`, splitting into numbered part files when the
/// source exceeds the single-file limit. Returns the source size in bytes.
pub fn copy_or_split(source: &Path, dest: &Path) -> io::Result<u64> {
    copy_with_limit(source, dest, SPLIT_THRESHOLD)
}

/// [`copy_or_split`] with an explicit limit. Concatenating the produced parts
/// in numeric order reproduces the source byte for byte.
pub fn copy_with_limit(source: &Path, dest: &Path, limit: u64) -> io::Result<u64> {
    let size = fs::metadata(source)?.len();
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if size <= limit {
        fs::copy(source, dest)?;
        return Ok(size);
    }

    let mut reader = File::open(source)?;
    let mut remaining = size;
    let mut part = 0u32;
    while remaining > 0 {
        let take = remaining.min(limit);
        let mut chunk = (&mut reader).take(take);
        let mut out = File::create(part_path(dest, part))?;
        let written = io::copy(&mut chunk, &mut out)?;
        if written < take {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} shrank while being split", source.display()),
            ));
        }
        remaining -= take;
        part += 1;
    }
    Ok(size)
}

// Part numbers widen to three digits past 99; numeric order still
// reconstructs the file even though lexicographic order breaks there.
fn part_path(dest: &Path, part: u32) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".part{part:02}"));
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_up_to_the_threshold_are_cd_class() {
        assert_eq!(classify(0), MediaKind::Cd);
        assert_eq!(classify(SPLIT_THRESHOLD), MediaKind::Cd);
    }

    #[test]
    fn sizes_past_the_threshold_are_dvd_class() {
        assert_eq!(classify(SPLIT_THRESHOLD + 1), MediaKind::Dvd);
    }
}

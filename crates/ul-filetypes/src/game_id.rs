/// Marker preceding the boot executable path embedded in a disc image.
const BOOT_PATH_MARKER: &[u8] = b"cdrom0:\\";

/// Identifier reported when no boot path can be located.
pub const UNKNOWN_GAME_ID: &str = "UNKNOWN_ID";

/// The boot path always sits within the first 5 MiB of an image; callers
/// never need to read more than this.
pub const GAME_ID_SCAN_WINDOW: u64 = 5 * 1024 * 1024;

/// Extracts the game identifier from the leading bytes of a disc image.
///
/// The identifier starts right after the boot path marker and runs until the
/// first NUL, `;`, `\` or space. A window that ends mid-identifier yields the
/// bytes accumulated so far.
pub fn game_id_from_bytes(window: &[u8]) -> String {
    let at = match find_marker(window) {
        Some(at) => at,
        None => return UNKNOWN_GAME_ID.to_string(),
    };
    let tail = &window[at + BOOT_PATH_MARKER.len()..];
    let end = tail
        .iter()
        .position(|&b| matches!(b, 0 | b';' | b'\\' | b' '))
        .unwrap_or(tail.len());
    decode_permissive(&tail[..end])
}

fn find_marker(window: &[u8]) -> Option<usize> {
    window
        .windows(BOOT_PATH_MARKER.len())
        .position(|candidate| candidate == BOOT_PATH_MARKER)
}

// Identification must never fail; undecodable sequences are dropped rather
// than surfaced.
fn decode_permissive(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}

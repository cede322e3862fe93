use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Size of one catalog record on disk.
pub const UL_ENTRY_SIZE: usize = 64;

const GAME_ID_LEN: usize = 8;
const NAME_LEN: usize = 32;
const FLAG_OFFSET: usize = 40;

/// Title classification stored in the catalog's type flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Cd,
    Dvd,
}

impl MediaKind {
    pub fn flag(self) -> u8 {
        match self {
            MediaKind::Cd => 0x00,
            MediaKind::Dvd => 0x01,
        }
    }

    /// Any nonzero flag on disk counts as DVD.
    pub fn from_flag(flag: u8) -> Self {
        if flag == 0 {
            MediaKind::Cd
        } else {
            MediaKind::Dvd
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Cd => "CD",
            MediaKind::Dvd => "DVD",
        }
    }
}

/// One installed title as recorded in `ul.cfg`.
///
/// Records are exactly [`UL_ENTRY_SIZE`] bytes: the identifier in the first
/// 8, the display name in the next 32 (both zero-padded), the type flag at
/// offset 40 and zero fill to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlEntry {
    pub game_id: String,
    pub name: String,
    pub media: MediaKind,
}

impl UlEntry {
    pub fn to_bytes(&self) -> [u8; UL_ENTRY_SIZE] {
        let mut record = [0u8; UL_ENTRY_SIZE];
        copy_field(&mut record[..GAME_ID_LEN], self.game_id.as_bytes());
        copy_field(
            &mut record[GAME_ID_LEN..GAME_ID_LEN + NAME_LEN],
            self.name.as_bytes(),
        );
        record[FLAG_OFFSET] = self.media.flag();
        record
    }

    pub fn from_bytes(record: &[u8; UL_ENTRY_SIZE]) -> Self {
        Self {
            game_id: field_string(&record[..GAME_ID_LEN]),
            name: field_string(&record[GAME_ID_LEN..GAME_ID_LEN + NAME_LEN]),
            media: MediaKind::from_flag(record[FLAG_OFFSET]),
        }
    }
}

fn copy_field(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
}

fn field_string(field: &[u8]) -> String {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Reads every complete record from the catalog, in file order.
///
/// A missing catalog reads as empty; a trailing partial record is discarded,
/// never parsed.
pub fn read_ul_cfg(path: &Path) -> std::io::Result<Vec<UlEntry>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut entries = Vec::new();
    let mut record = [0u8; UL_ENTRY_SIZE];
    while read_record(&mut file, &mut record)? {
        entries.push(UlEntry::from_bytes(&record));
    }
    Ok(entries)
}

fn read_record(file: &mut File, record: &mut [u8; UL_ENTRY_SIZE]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < UL_ENTRY_SIZE {
        let n = file.read(&mut record[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(true)
}

/// Appends `entry` by rewriting the whole record set from the start.
///
/// Rewriting keeps the catalog well formed even after an interrupted write:
/// the partial tail is dropped on read and therefore healed here.
pub fn append_ul_cfg(path: &Path, entry: &UlEntry) -> std::io::Result<()> {
    let mut entries = read_ul_cfg(path)?;
    entries.push(entry.clone());

    let mut bytes = Vec::with_capacity(entries.len() * UL_ENTRY_SIZE);
    for entry in &entries {
        bytes.extend_from_slice(&entry.to_bytes());
    }
    fs::write(path, bytes)
}

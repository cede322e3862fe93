use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use ul_filetypes::{
    append_ul_cfg, game_id_from_bytes, MediaKind, UlEntry, GAME_ID_SCAN_WINDOW, UNKNOWN_GAME_ID,
};

pub mod devices;
pub mod job;
pub mod progress;
pub mod splitter;
pub mod system;

pub use job::{InstallEvent, InstallJob};
pub use progress::BatchProgress;
pub use splitter::{classify, copy_or_split, SPLIT_THRESHOLD};

/// Installer settings, optionally read from `installer.toml` next to the
/// images.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory under the mount point that receives extracted titles.
    pub device_dir: String,
    /// Catalog file name under the mount point.
    pub catalog_name: String,
    /// Where job-scoped staging directories are created.
    pub staging_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_dir: "DVD".to_string(),
            catalog_name: "ul.cfg".to_string(),
            staging_root: std::env::temp_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct ConfigFile {
    install: InstallSection,
}

#[derive(Debug, Deserialize, Serialize)]
struct InstallSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    device_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    staging_root: Option<PathBuf>,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let defaults = Config::default();
        let ConfigFile { install } = file;
        Self {
            device_dir: install.device_dir.unwrap_or(defaults.device_dir),
            catalog_name: install.catalog.unwrap_or(defaults.catalog_name),
            staging_root: install.staging_root.unwrap_or(defaults.staging_root),
        }
    }
}

/// Loads `installer.toml` from `folder`, falling back to defaults when the
/// file is absent.
pub fn load_config(folder: &Path) -> Result<Config, Error> {
    let config_file = folder.join("installer.toml");
    if !config_file.exists() {
        return Ok(Config::default());
    }
    let str = fs::read_to_string(&config_file)?;
    let config_file =
        toml::from_str::<ConfigFile>(&str).map_err(|e| Error::ConfigError(e.to_string()))?;
    Ok(config_file.into())
}

/// Expands one disc image into a staging directory.
///
/// Implementations run synchronously and may take arbitrarily long; the
/// engine never times them out.
pub trait Unpacker {
    fn unpack(&self, image: &Path, destination: &Path) -> io::Result<()>;
}

/// One selected disc image, sized once during preparation.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub source: PathBuf,
    pub size: u64,
    pub ordinal: usize,
}

/// A title that reached the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledTitle {
    pub game_id: String,
    pub name: String,
    pub media: MediaKind,
}

/// What one batch run accomplished.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub installed: Vec<InstalledTitle>,
    pub skipped: Vec<PathBuf>,
    pub cancelled: bool,
}

/// Recursively collects disc images under `folder`, sorted by path.
pub fn discover_images(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_image = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("iso"))
            .unwrap_or(false);
        if is_image {
            images.push(entry.into_path());
        }
    }
    images.sort();
    Ok(images)
}

pub fn install_batch(images: &[PathBuf], mount: &Path) -> Result<BatchSummary, Error> {
    install_batch_with_config(images, mount, Config::default())
}

pub fn install_batch_with_config(
    images: &[PathBuf],
    mount: &Path,
    config: Config,
) -> Result<BatchSummary, Error> {
    let unpacker = system::SevenZipUnpacker::default();
    let (events, _) = mpsc::channel();
    let cancel = AtomicBool::new(false);
    install_batch_with_config_and_unpacker(images, mount, config, &unpacker, &events, &cancel)
}

/// Runs the whole batch: classify, identify, unpack, copy, catalog, clean up,
/// one job at a time.
///
/// Jobs are strictly sequential; `cancel` is polled once per job boundary and
/// never interrupts a job in flight. Completed jobs stay on the device after
/// cancellation. Progress events are emitted after every copied file; the
/// completion event is emitted once, unless a fatal error ends the run early.
pub fn install_batch_with_config_and_unpacker<U: Unpacker>(
    images: &[PathBuf],
    mount: &Path,
    config: Config,
    unpacker: &U,
    events: &mpsc::Sender<InstallEvent>,
    cancel: &AtomicBool,
) -> Result<BatchSummary, Error> {
    let jobs = prepare_jobs(images)?;
    let total: u64 = jobs.iter().map(|job| job.size).sum();
    let mut progress = BatchProgress::new(total);

    let destination = mount.join(&config.device_dir);
    fs::create_dir_all(&destination).map_err(Error::DestinationWrite)?;

    let catalog = mount.join(&config.catalog_name);
    let mut summary = BatchSummary::default();

    for job in &jobs {
        if cancel.load(Ordering::Relaxed) {
            summary.cancelled = true;
            break;
        }

        let media = splitter::classify(job.size);
        let game_id = read_game_id(&job.source);
        let name = job
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| game_id.clone());

        println!("+ {} {}", "Installing", name.green());

        let staging = config.staging_root.join(format!("usb-installer_{game_id}"));
        if let Err(err) = stage_image(unpacker, &job.source, &staging) {
            eprintln!(
                "{} {} {}",
                "Image".dimmed(),
                name.dimmed(),
                format!("could not be unpacked, skipping: {err}").dimmed()
            );
            let _ = fs::remove_dir_all(&staging);
            summary.skipped.push(job.source.clone());
            continue;
        }

        copy_tree(&staging, &destination, job.ordinal, &mut progress, events);

        let entry = UlEntry {
            game_id: game_id.clone(),
            name: name.clone(),
            media,
        };
        let appended = append_ul_cfg(&catalog, &entry);
        let _ = fs::remove_dir_all(&staging);
        appended.map_err(Error::CatalogWrite)?;

        summary.installed.push(InstalledTitle {
            game_id,
            name,
            media,
        });
    }

    let _ = events.send(InstallEvent::Finished);
    Ok(summary)
}

fn prepare_jobs(images: &[PathBuf]) -> Result<Vec<ImageJob>, Error> {
    images
        .iter()
        .enumerate()
        .map(|(ordinal, source)| {
            let size = fs::metadata(source)?.len();
            Ok(ImageJob {
                source: source.clone(),
                size,
                ordinal,
            })
        })
        .collect()
}

/// Clears any leftover staging for the same title, then unpacks into it.
fn stage_image<U: Unpacker>(unpacker: &U, image: &Path, staging: &Path) -> io::Result<()> {
    if staging.exists() {
        fs::remove_dir_all(staging)?;
    }
    fs::create_dir_all(staging)?;
    unpacker.unpack(image, staging)
}

/// Replicates the staged tree under `destination`, splitting oversized files
/// and emitting both progress signals after every completed file.
fn copy_tree(
    staging: &Path,
    destination: &Path,
    ordinal: usize,
    progress: &mut BatchProgress,
    events: &mpsc::Sender<InstallEvent>,
) {
    for entry in WalkDir::new(staging) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("{} {err}", "Skipping unreadable entry:".dimmed());
                continue;
            }
        };
        let rel = match entry.path().strip_prefix(staging) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = destination.join(rel);

        if entry.file_type().is_dir() {
            // Best effort; a file below will surface anything fatal.
            let _ = fs::create_dir_all(&target);
        } else if entry.file_type().is_file() {
            match splitter::copy_or_split(entry.path(), &target) {
                Ok(bytes) => {
                    progress.advance(bytes);
                    let _ = events.send(InstallEvent::JobProgress {
                        ordinal,
                        percent: progress.percent(),
                    });
                    let _ = events.send(InstallEvent::BatchProgress(progress.aggregate()));
                }
                Err(err) => {
                    eprintln!(
                        "{} {} {}",
                        "File".dimmed(),
                        entry.path().display().to_string().dimmed(),
                        format!("could not be copied, skipping: {err}").dimmed()
                    );
                }
            }
        }
    }
}

// Identification is never fatal: any read failure maps to the sentinel.
fn read_game_id(image: &Path) -> String {
    match read_scan_window(image) {
        Ok(window) => game_id_from_bytes(&window),
        Err(_) => UNKNOWN_GAME_ID.to_string(),
    }
}

fn read_scan_window(image: &Path) -> io::Result<Vec<u8>> {
    let file = fs::File::open(image)?;
    let mut window = Vec::new();
    file.take(GAME_ID_SCAN_WINDOW).read_to_end(&mut window)?;
    Ok(window)
}

#[derive(Debug)]
pub enum Error {
    NotRoot,
    DestinationWrite(std::io::Error),
    CatalogWrite(std::io::Error),
    ConfigError(String),
    IOError(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotRoot => write!(f, "this operation requires root privileges"),
            Error::DestinationWrite(err) => write!(f, "destination is not writable: {err}"),
            Error::CatalogWrite(err) => write!(f, "could not update the title catalog: {err}"),
            Error::ConfigError(err) => write!(f, "{err}"),
            Error::IOError(err) => write!(f, "{err:?}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

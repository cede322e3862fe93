//! Process-backed implementations of the capabilities the engine consumes.
//!
//! Everything here shells out to platform tooling. The engine core only sees
//! the narrow traits and record types, so tests substitute in-memory fakes
//! and never depend on any tool's argument syntax.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::devices::{removable_devices, DeviceRecord};
use crate::{Error, Unpacker};

/// Expands disc images with the system `7z` binary.
#[derive(Default)]
pub struct SevenZipUnpacker;

impl Unpacker for SevenZipUnpacker {
    fn unpack(&self, image: &Path, destination: &Path) -> io::Result<()> {
        let status = Command::new("7z")
            .arg("x")
            .arg(image)
            .arg(format!("-o{}", destination.display()))
            .arg("-y")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("7z exited with {status} for {}", image.display()),
            ))
        }
    }
}

/// Lists removable block devices via `lsblk`.
pub fn list_removable_devices() -> io::Result<Vec<DeviceRecord>> {
    let output = Command::new("lsblk")
        .args(["-o", "NAME,MODEL,SIZE,RM,MOUNTPOINT", "-P"])
        .output()?;
    if !output.status.success() {
        return Err(io::Error::new(io::ErrorKind::Other, "lsblk failed"));
    }
    Ok(removable_devices(&String::from_utf8_lossy(&output.stdout)))
}

/// Resolves a writable mount point for `device`, mounting it read-write
/// under `/media/<user>/<name>` when nothing is mounted yet.
pub fn mount_device(device: &DeviceRecord) -> io::Result<PathBuf> {
    if let Some(mount) = &device.mount_point {
        return Ok(mount.clone());
    }

    let user = std::env::var("SUDO_USER")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "root".to_string());
    let mount = PathBuf::from("/media").join(user).join(&device.name);
    fs::create_dir_all(&mount)?;

    let status = Command::new("mount")
        .args(["-o", "rw"])
        .arg(format!("/dev/{}", device.name))
        .arg(&mount)
        .status()?;
    if status.success() {
        Ok(mount)
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("could not mount /dev/{}", device.name),
        ))
    }
}

/// Destroys all data on `name` and creates a fresh FAT32 filesystem.
pub fn format_device(name: &str) -> io::Result<()> {
    // Partitions may be mounted individually; a shell glob covers them all.
    let _ = Command::new("sh")
        .arg("-c")
        .arg(format!("umount /dev/{name}* 2>/dev/null"))
        .status();

    let status = Command::new("mkfs.vfat")
        .args(["-F", "32"])
        .arg(format!("/dev/{name}"))
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("mkfs.vfat failed for /dev/{name}"),
        ))
    }
}

/// Raw block devices and system mount points need root; probe once during
/// startup instead of failing halfway through a batch.
pub fn ensure_root() -> Result<(), Error> {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        if unsafe { libc::geteuid() } != 0 {
            return Err(Error::NotRoot);
        }
    }
    Ok(())
}

use std::env;
use std::path::Path;
use std::process;

use ul_filetypes::read_ul_cfg;

fn main() -> std::io::Result<()> {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example inspect -- <path-to-ul.cfg>");
        process::exit(1);
    });

    let entries = read_ul_cfg(Path::new(&path))?;
    if entries.is_empty() {
        eprintln!("No titles recorded.");
    }
    for entry in entries {
        println!(
            "{} - {} ({})",
            entry.game_id,
            entry.name,
            entry.media.label()
        );
    }

    Ok(())
}

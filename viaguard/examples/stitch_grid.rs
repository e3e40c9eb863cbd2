//! Stitch a via grid over a board, skipping keep-out zones.

use viaguard::prelude::*;
use viaguard::parse_pcb;
use std::path::Path;

fn main() -> Result<(), KeepoutError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/keepout_board.kicad_pcb".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example stitch_grid [path/to/board.kicad_pcb]");
        std::process::exit(1);
    }

    let board = parse_pcb(path)?;
    let checker = KeepOutChecker::new(&board, true);
    println!("Keep-out zones: {}", checker.zone_count());

    let options = CheckOptions::default();
    let via_size = options.via_size_nm();
    let pitch_mm = 2.5;

    let mut placed = 0;
    let mut skipped = 0;
    for ix in 0..40 {
        for iy in 0..24 {
            let position = Position::from_mm(ix as f64 * pitch_mm, iy as f64 * pitch_mm);
            if checker.is_via_allowed(position, via_size, options.check_edges) {
                placed += 1;
            } else {
                skipped += 1;
            }
        }
    }

    println!("Placed {} vias, skipped {} in keep-outs", placed, skipped);
    Ok(())
}

//! Integration tests for ViaGuard library

use viaguard::prelude::*;
use viaguard::{is_via_allowed_at_position, parse_pcb, HostZone, LayerId, ZoneOrigin};
use std::io::Write;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_collects_board_and_footprint_keepouts() {
    init_tracing();
    let board = parse_pcb(&fixture_path("keepout_board.kicad_pcb")).expect("Should parse board");
    let checker = KeepOutChecker::new(&board, true);

    // Mounting hole keepout (board) and J1 keepout (footprint); the track-only
    // rule area and the GND pour are not via keep-outs
    assert_eq!(checker.zone_count(), 2);

    let origins: Vec<&ZoneOrigin> = checker.zones().iter().map(|z| &z.origin).collect();
    assert_eq!(origins[0], &ZoneOrigin::Board { index: 0 });
    assert_eq!(
        origins[1],
        &ZoneOrigin::Footprint { index: 0, reference: "J1".to_string() }
    );
}

#[test]
fn test_placement_decisions() {
    let board = parse_pcb(&fixture_path("keepout_board.kicad_pcb")).expect("Should parse board");
    let checker = KeepOutChecker::new(&board, false);
    let via = 600_000;

    assert!(!checker.allows_via(Position::from_mm(15.0, 15.0), via), "inside board keepout");
    assert!(!checker.allows_via(Position::from_mm(60.0, 30.0), via), "inside footprint keepout");
    assert!(checker.allows_via(Position::from_mm(35.0, 15.0), via), "track-only rule area");
    assert!(checker.allows_via(Position::from_mm(50.0, 50.0), via), "open copper");
}

#[test]
fn test_edge_sampling_against_file_zone() {
    let board = parse_pcb(&fixture_path("keepout_board.kicad_pcb")).expect("Should parse board");
    let checker = KeepOutChecker::new(&board, false);

    // 0.2mm right of the keepout edge with a 0.3mm radius
    let position = Position::from_mm(20.2, 15.0);
    assert!(!checker.is_via_allowed(position, 600_000, true));
    assert!(checker.is_via_allowed(position, 600_000, false));
    assert!(checker.is_via_allowed(position, 200_000, true));
}

#[test]
fn test_footprint_keepout_only_on_front() {
    let board = parse_pcb(&fixture_path("keepout_board.kicad_pcb")).expect("Should parse board");
    let zone = &board.footprints[0].zones[0];

    assert_eq!(zone.layers.names(), vec!["F.Cu".to_string()]);
    let inside = Position::from_mm(60.0, 30.0);
    assert!(zone.hit_test_filled_area(LayerId::F_CU, inside).unwrap());
    assert!(!zone.hit_test_filled_area(LayerId::B_CU, inside).unwrap());
}

#[test]
fn test_board_without_keepouts() {
    let board = parse_pcb(&fixture_path("no_keepouts.kicad_pcb")).expect("Should parse board");
    let checker = KeepOutChecker::new(&board, false);

    assert_eq!(checker.zone_count(), 0);
    for size in [0, 400_000, 800_000] {
        assert!(checker.allows_via(Position::from_mm(5.0, 5.0), size));
    }
}

#[test]
fn test_one_shot_helper_matches_checker() {
    let board = parse_pcb(&fixture_path("keepout_board.kicad_pcb")).expect("Should parse board");
    let checker = KeepOutChecker::new(&board, false);

    for (x, y) in [(15.0, 15.0), (20.2, 15.0), (50.0, 50.0), (60.0, 30.0)] {
        let position = Position::from_mm(x, y);
        assert_eq!(
            is_via_allowed_at_position(&board, position, 600_000, None, false),
            checker.allows_via(position, 600_000)
        );
        assert_eq!(
            is_via_allowed_at_position(&board, position, 600_000, Some(&checker), false),
            checker.allows_via(position, 600_000)
        );
    }
}

#[test]
fn test_audit_vias() {
    let report = KeepoutCore::audit_vias(&fixture_path("keepout_board.kicad_pcb"), &CheckOptions::default())
        .expect("Should audit board");

    assert_eq!(report.zone_count, 2);
    assert_eq!(report.vias.len(), 5);

    let denied: Vec<&str> = report.violations().map(|v| v.uuid.as_str()).collect();
    assert_eq!(
        denied,
        vec![
            "a0000000-0000-4000-8000-000000000001",
            "a0000000-0000-4000-8000-000000000002",
            "a0000000-0000-4000-8000-000000000004",
        ]
    );
    assert_eq!(report.vias[0].net_name.as_deref(), Some("GND"));
}

#[test]
fn test_audit_without_edges() {
    let options = CheckOptions {
        check_edges: false,
        ..Default::default()
    };
    let report = KeepoutCore::audit_vias(&fixture_path("keepout_board.kicad_pcb"), &options)
        .expect("Should audit board");

    // The via grazing the keepout edge passes once edges are ignored
    assert_eq!(report.violation_count(), 2);
}

#[test]
fn test_list_zones() {
    let zones = KeepoutCore::list_zones(&fixture_path("keepout_board.kicad_pcb")).expect("Should list zones");

    assert_eq!(zones.len(), 3);
    assert_eq!(zones[0].name.as_deref(), Some("Mounting hole keepout"));
    assert!(zones[0].prohibits_vias);
    assert_eq!(zones[1].name.as_deref(), Some("Antenna track keepout"));
    assert!(!zones[1].prohibits_vias);
    assert_eq!(zones[2].name.as_deref(), Some("J1 no vias"));
}

#[test]
fn test_checker_keeps_zones_after_board_edit() {
    let content = std::fs::read_to_string(fixture_path("no_keepouts.kicad_pcb")).unwrap();
    let before = viaguard::PcbParser::parse_pcb_str(&content, "before.kicad_pcb").unwrap();
    let checker = KeepOutChecker::new(&before, false);

    // Add a keepout over the existing via and save the edited board
    let edited = content.trim_end().trim_end_matches(')').to_string()
        + r#"  (zone (net 0) (layers "F.Cu" "B.Cu") (name "late keepout")
    (keepout (tracks allowed) (vias not_allowed) (pads allowed) (copperpour allowed) (footprints allowed))
    (polygon (pts (xy 4 4) (xy 6 4) (xy 6 6) (xy 4 6))))
)
"#;
    let mut file = tempfile::Builder::new().suffix(".kicad_pcb").tempfile().unwrap();
    file.write_all(edited.as_bytes()).unwrap();

    let after = parse_pcb(file.path()).expect("Should parse edited board");
    let position = Position::from_mm(5.0, 5.0);

    // The old checker still sees the board as it was
    assert!(checker.allows_via(position, 800_000));
    let fresh = KeepOutChecker::new(&after, false);
    assert_eq!(fresh.zone_count(), 1);
    assert!(!fresh.allows_via(position, 800_000));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        parse_pcb(&fixture_path("legacy.brd")),
        Err(KeepoutError::Parse(_))
    ));
    assert!(matches!(
        parse_pcb(&PathBuf::from("not_a_real_file.kicad_pcb")),
        Err(KeepoutError::Io(_))
    ));
}

//! ViaGuard CLI - KiCad via keep-out checks from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use viaguard::{
    AuditReport, CheckOptions, KeepoutCore, PlacementVerdict, Position, ZoneSummary,
};

#[derive(Parser)]
#[command(name = "viaguard")]
#[command(about = "KiCad via keep-out zone checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Log keep-out collection and check diagnostics to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check candidate via positions against a board's keep-out zones
    Check {
        /// Path to .kicad_pcb file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Candidate position in millimetres, as X,Y (repeatable)
        #[arg(long = "at", value_name = "X,Y", value_parser = parse_point_mm, required = true)]
        at: Vec<Position>,

        /// Via diameter in millimetres
        #[arg(long, value_name = "MM", default_value_t = 0.6)]
        via_size: f64,

        /// Only test the via center, not its rim
        #[arg(long)]
        no_edges: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any position is denied
        #[arg(long)]
        fail_on_deny: bool,
    },

    /// Check every via already on the board
    Audit {
        /// Path to .kicad_pcb file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only test via centers, not their rims
        #[arg(long)]
        no_edges: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any via sits in a keep-out
        #[arg(long)]
        fail_on_violation: bool,
    },

    /// List rule areas and whether they forbid vias
    Zones {
        /// Path to .kicad_pcb file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
}

fn parse_point_mm(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad X '{}': {}", x, e))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad Y '{}': {}", y, e))?;
    Position::try_from_mm(x, y)
        .ok_or_else(|| format!("'{}' is out of the board coordinate range (about +/-2147 mm)", s))
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let exit_code = match cli.command {
        Commands::Check {
            file,
            at,
            via_size,
            no_edges,
            format,
            fail_on_deny,
        } => {
            let options = CheckOptions {
                debug: cli.debug,
                check_edges: !no_edges,
                via_size_mm: via_size,
            };
            handle_check(&file, &at, &options, format, fail_on_deny)
        }
        Commands::Audit {
            file,
            no_edges,
            format,
            fail_on_violation,
        } => {
            let options = CheckOptions {
                debug: cli.debug,
                check_edges: !no_edges,
                ..Default::default()
            };
            handle_audit(&file, &options, format, fail_on_violation)
        }
        Commands::Zones { file, format } => handle_zones(&file, format),
    };

    process::exit(exit_code);
}

fn handle_check(
    file: &PathBuf,
    positions: &[Position],
    options: &CheckOptions,
    format: OutputFormat,
    fail_on_deny: bool,
) -> i32 {
    if !options.via_size_mm.is_finite() || options.via_size_mm < 0.0 {
        eprintln!("Error: --via-size must be a non-negative number of millimetres");
        return 1;
    }

    match KeepoutCore::check_positions(file, positions, options) {
        Ok(verdicts) => {
            match format {
                OutputFormat::Human => output_check_human(file, &verdicts, options),
                OutputFormat::Json => output_check_json(file, &verdicts, options),
                OutputFormat::Github => output_check_github(file, &verdicts),
            }
            if fail_on_deny && verdicts.iter().any(|v| !v.allowed) {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_audit(
    file: &PathBuf,
    options: &CheckOptions,
    format: OutputFormat,
    fail_on_violation: bool,
) -> i32 {
    match KeepoutCore::audit_vias(file, options) {
        Ok(report) => {
            match format {
                OutputFormat::Human => output_audit_human(&report),
                OutputFormat::Json => output_audit_json(&report),
                OutputFormat::Github => output_audit_github(&report),
            }
            if fail_on_violation && report.has_violations() {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_zones(file: &PathBuf, format: OutputFormat) -> i32 {
    match KeepoutCore::list_zones(file) {
        Ok(zones) => {
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&zones).unwrap_or_default())
                }
                OutputFormat::Human => output_zones_human(file, &zones),
                OutputFormat::Github => output_zones_github(file, &zones),
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn fmt_mm(position: &Position) -> String {
    format!("({:.3}, {:.3}) mm", position.x_mm(), position.y_mm())
}

fn output_check_human(file: &PathBuf, verdicts: &[PlacementVerdict], options: &CheckOptions) {
    println!("\nFile: {}", file.display());
    println!("{}", "─".repeat(60));
    println!(
        "  Via size: {:.3} mm{}",
        options.via_size_mm,
        if options.check_edges { "" } else { " (center only)" }
    );
    println!();

    for verdict in verdicts {
        let label = if verdict.allowed { "ALLOWED" } else { "DENIED " };
        println!("  {}  {}", label, fmt_mm(&verdict.position));
    }

    let denied = verdicts.iter().filter(|v| !v.allowed).count();
    println!("\n  Summary:");
    println!("    Allowed: {}", verdicts.len() - denied);
    println!("    Denied:  {}", denied);
}

fn output_check_json(file: &PathBuf, verdicts: &[PlacementVerdict], options: &CheckOptions) {
    let denied = verdicts.iter().filter(|v| !v.allowed).count();
    let output = serde_json::json!({
        "file": file.display().to_string(),
        "via_size_mm": options.via_size_mm,
        "check_edges": options.check_edges,
        "results": verdicts.iter().map(|v| {
            serde_json::json!({
                "x_mm": v.position.x_mm(),
                "y_mm": v.position.y_mm(),
                "allowed": v.allowed,
            })
        }).collect::<Vec<_>>(),
        "summary": {
            "allowed": verdicts.len() - denied,
            "denied": denied,
        }
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

fn output_check_github(file: &PathBuf, verdicts: &[PlacementVerdict]) {
    for verdict in verdicts.iter().filter(|v| !v.allowed) {
        println!(
            "::error file={}::Via at {} intrudes into a keep-out zone",
            file.display(),
            fmt_mm(&verdict.position)
        );
    }
}

fn output_audit_human(report: &AuditReport) {
    println!("\nFile: {}", report.file.display());
    println!("{}", "─".repeat(60));

    if report.zone_count == 0 {
        println!("  No via keep-out zones on this board");
    }

    if report.has_violations() {
        println!("\n  VIOLATIONS:");
        for via in report.violations() {
            println!(
                "    - Via at {} ({:.3} mm) inside keep-out",
                fmt_mm(&via.position),
                via.size as f64 / 1_000_000.0
            );
            if let Some(ref net) = via.net_name {
                println!("      Net: {}", net);
            }
        }
    } else if report.zone_count > 0 {
        println!("  No vias inside keep-out zones");
    }

    println!("\n  Summary:");
    println!("    Keep-out zones: {}", report.zone_count);
    println!("    Vias checked:   {}", report.vias.len());
    println!("    Violations:     {}", report.violation_count());
}

fn output_audit_json(report: &AuditReport) {
    let output = serde_json::json!({
        "file": report.file.display().to_string(),
        "zone_count": report.zone_count,
        "vias": report.vias,
        "summary": {
            "checked": report.vias.len(),
            "violations": report.violation_count(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

fn output_audit_github(report: &AuditReport) {
    for via in report.violations() {
        println!(
            "::error file={}::Via {} at {} sits in a keep-out zone",
            report.file.display(),
            via.uuid,
            fmt_mm(&via.position)
        );
    }
}

fn output_zones_human(file: &PathBuf, zones: &[ZoneSummary]) {
    println!("\nFile: {}", file.display());
    println!("{}", "─".repeat(60));

    if zones.is_empty() {
        println!("  No rule areas found");
        return;
    }

    for zone in zones {
        let status = if zone.prohibits_vias { "NO VIAS" } else { "vias ok" };
        println!(
            "  [{}] {} ({})",
            status,
            zone.name.as_deref().unwrap_or("<unnamed>"),
            zone.origin
        );
        println!("      Layers: {}", zone.layers.join(", "));
    }
}

fn output_zones_github(file: &PathBuf, zones: &[ZoneSummary]) {
    for zone in zones.iter().filter(|z| z.prohibits_vias) {
        println!(
            "::notice file={}::Via keep-out {} ({}) on {}",
            file.display(),
            zone.name.as_deref().unwrap_or("<unnamed>"),
            zone.origin,
            zone.layers.join(", ")
        );
    }
}

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sprite_chroma_key::{
    default_output_path, ChromaKey, Coverage, KeyConfig, KeyMode, ProcessResult,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Remove every green pixel, including green inside the subject
    AllGreen,
    /// Remove only green connected to the image edges
    Background,
}

impl From<Mode> for KeyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::AllGreen => KeyMode::AllGreen,
            Mode::Background => KeyMode::Background,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sprite-key",
    about = "Remove green-screen backgrounds from sprite sheets",
    version,
    after_help = "Defaults per mode:\n  \
                  all-green:  --g-min 1   --delta 0  --ratio 1.0\n  \
                  background: --g-min 120 --delta 40 --ratio 1.25\n\n\
                  Set RUST_LOG for detailed logging (e.g. RUST_LOG=sprite_chroma_key=debug)."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_clean.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Which green pixels count as background
    #[arg(long, value_enum, default_value_t = Mode::AllGreen)]
    mode: Mode,

    /// Minimum green channel to key out (0-255)
    #[arg(long, allow_negative_numbers = true)]
    g_min: Option<i32>,

    /// Minimum G - max(R,B) to key out
    #[arg(long, allow_negative_numbers = true)]
    delta: Option<i32>,

    /// Minimum G / max(R,B) ratio to key out
    #[arg(long, allow_negative_numbers = true)]
    ratio: Option<f64>,

    /// Disable green spill suppression on edge pixels
    #[arg(long)]
    no_despill: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

/// Filter used when `RUST_LOG` is unset. `--quiet` wins over `--verbose`.
fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "info,sprite_chroma_key=debug"
    } else {
        "warn"
    }
}

fn init_logging(cli: &Cli) {
    let default_level = default_filter(cli.verbose, cli.quiet);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = KeyConfig::for_mode(cli.mode.into())
        .with_overrides(cli.g_min, cli.delta, cli.ratio)
        .with_despill(!cli.no_despill);

    let key = match ChromaKey::new(config) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if cli.verbose && !cli.quiet {
        let t = &key.config().thresholds;
        eprintln!(
            "Mode: {:?} (g_min={}, delta={}, ratio={}, despill={})",
            key.config().mode,
            t.g_min,
            t.delta,
            t.ratio,
            key.config().despill
        );
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: sprite-key <input_dir> -o <output_dir>");
            process::exit(1);
        };
        key.process_directory(input_path, &output_dir)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![key.process_file(input_path, &output_path)]
    };

    let mut fail_count = 0u32;
    for r in &results {
        print_result(r, cli.quiet);
        if !r.success {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {}", results.len() - fail_count as usize);
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, quiet: bool) {
    let Some(stats) = result.stats.filter(|_| result.success) else {
        eprintln!("[FAIL] {}: {}", result.path.display(), result.message);
        return;
    };
    if quiet {
        return;
    }

    println!("Input:  {}", result.path.display());
    println!("Output: {}", result.output.display());
    println!(
        "Removed background pixels: {} / {} ({:.2}%)",
        stats.removed,
        stats.total,
        stats.fraction() * 100.0
    );

    match stats.coverage() {
        Coverage::None => eprintln!(
            "Warning: no pixels were removed; thresholds may be too strict"
        ),
        Coverage::Full => eprintln!(
            "Warning: every pixel was removed; thresholds may be too loose"
        ),
        Coverage::Partial => {}
    }
}

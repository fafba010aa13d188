use anyhow::Result;
use atlas_core::model::{Origin, RegionFilter};
use clap::{Parser, Subcommand};
use size_atlas::commands::{
    check_profile_command, compare_command, summary_command, top_command, CompareInputs,
};
use size_atlas::init_logging;

/// Symbol-size analyzer for embedded build variants.
///
/// This CLI is a thin wrapper around `atlas-core` (exposed in code as `atlas_core`).
/// It reads `nm --print-size` listings and origin profiles from disk; all
/// parsing, classification and comparison happens in the library.
#[derive(Parser, Debug)]
#[command(
    name = "size-atlas",
    version,
    about = "Symbol-size analyzer for embedded build variants",
    long_about = None
)]
struct Cli {
    /// Log level (error, warn, info, debug, trace). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show per-section and per-origin size totals of one variant.
    Summary {
        /// Symbol listing produced by `nm --print-size`.
        #[arg(long)]
        listing: String,

        /// Optional `nm --print-size --demangle` listing of the same binary.
        #[arg(long)]
        demangled: Option<String>,

        /// Origin profile (YAML or JSON). Without one every symbol is native.
        #[arg(long)]
        profile: Option<String>,

        /// Variant label. Defaults to the listing's file stem.
        #[arg(long)]
        label: Option<String>,

        /// Memory region used for the origin breakdown (rom, ram, both).
        #[arg(long, default_value = "both")]
        region: RegionFilter,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the largest symbols of one variant.
    Top {
        /// Symbol listing produced by `nm --print-size`.
        #[arg(long)]
        listing: String,

        /// Optional `nm --print-size --demangle` listing of the same binary.
        #[arg(long)]
        demangled: Option<String>,

        /// Origin profile (YAML or JSON).
        #[arg(long)]
        profile: Option<String>,

        /// Only keep symbols of these origins (repeatable). Defaults to all.
        #[arg(long = "origin")]
        origins: Vec<Origin>,

        /// Only keep symbols in this memory region (rom, ram, both).
        #[arg(long, default_value = "both")]
        region: RegionFilter,

        /// Maximum number of symbols to list.
        #[arg(long, default_value_t = 20)]
        count: usize,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compare a base variant against a target variant.
    Compare {
        /// Base symbol listing.
        #[arg(long)]
        base: String,

        /// Target symbol listing.
        #[arg(long)]
        target: String,

        /// Demangled listing paired with the base listing.
        #[arg(long)]
        base_demangled: Option<String>,

        /// Demangled listing paired with the target listing.
        #[arg(long)]
        target_demangled: Option<String>,

        /// Origin profile applied to both variants.
        #[arg(long)]
        profile: Option<String>,

        /// Base label. Defaults to the base listing's file stem.
        #[arg(long)]
        base_label: Option<String>,

        /// Target label. Defaults to the target listing's file stem.
        #[arg(long)]
        target_label: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Validate an origin profile and print its rules.
    CheckProfile {
        /// Profile file (YAML or JSON).
        #[arg(long)]
        profile: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Summary { listing, demangled, profile, label, region, json } => summary_command(
            &listing,
            demangled.as_deref(),
            profile.as_deref(),
            label,
            region,
            json,
        )?,
        Command::Top { listing, demangled, profile, origins, region, count, json } => top_command(
            &listing,
            demangled.as_deref(),
            profile.as_deref(),
            origins,
            region,
            Some(count),
            json,
        )?,
        Command::Compare {
            base,
            target,
            base_demangled,
            target_demangled,
            profile,
            base_label,
            target_label,
            json,
        } => {
            let inputs = CompareInputs {
                base,
                target,
                base_demangled,
                target_demangled,
                base_label,
                target_label,
            };
            compare_command(inputs, profile.as_deref(), json)?
        }
        Command::CheckProfile { profile, json } => check_profile_command(&profile, json)?,
    }

    Ok(())
}

//! DGS Variants CLI
//!
//! Commands: build, variant, agp, check, indent
//! Operator output goes to stdout, logs to stderr (RUST_LOG filters them).
//! `check` returns 2 when the manifest references missing files.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use dgs_variants::{
    agp::{self, AgpRotation},
    indent,
    manifest::{ManifestCheck, DEFAULT_MANIFEST},
    pipeline::{self, BuildPipeline},
    BuildReport, PlaceholderRules, Recipe, SectionRules, VariantParams, VariantStyle,
};

#[derive(Parser)]
#[command(name = "dgs-variants")]
#[command(about = "Generate height and rotation variants of DGS scenery objects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every variant of a recipe into the library
    Build {
        /// Recipe JSON (default: built-in Safedock T2-24 recipe)
        #[arg(short, long)]
        recipe: Option<PathBuf>,

        /// Override the library root
        #[arg(short, long)]
        target_dir: Option<PathBuf>,

        /// Print the build report as JSON
        #[arg(long)]
        json: bool,

        /// Skip the library check
        #[arg(long)]
        no_check: bool,
    },

    /// Generate a single variant
    Variant {
        /// Master template
        #[arg(short, long)]
        template: PathBuf,

        /// Sign height in meters
        #[arg(short = 'H', long)]
        height: f64,

        /// Add the 180 degree rotation
        #[arg(short, long)]
        mirrored: bool,

        #[arg(short, long, value_enum, default_value_t = StyleArg::Section)]
        style: StyleArg,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print an AGP descriptor
    Agp {
        /// OBJ file name referenced by the descriptor
        #[arg(short, long)]
        object: String,

        #[arg(short, long)]
        mirrored: bool,
    },

    /// Check that every file exported by the library manifest exists
    Check {
        /// Library root
        #[arg(short, long, default_value = "../openSAM-pkg/openSAM_Library")]
        target_dir: PathBuf,

        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: String,
    },

    /// Re-indent ANIM_begin/ANIM_end scopes, output to stdout
    Indent {
        file: PathBuf,

        #[arg(long, default_value_t = indent::DEFAULT_STEP)]
        step: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    /// LOD sections get ANIM scopes and a translation
    Section,
    /// `$DH` placeholders are substituted in place
    Placeholder,
}

impl From<StyleArg> for VariantStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Section => VariantStyle::Section(SectionRules::default()),
            StyleArg::Placeholder => VariantStyle::Placeholder(PlaceholderRules::default()),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dgs_variants=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { recipe, target_dir, json, no_check } => {
            build(recipe, target_dir, json, no_check)
        }

        Commands::Variant { template, height, mirrored, style, output } => {
            let style = VariantStyle::from(style);
            let lines = match pipeline::render_variant(&template, &style, VariantParams::new(height, mirrored)) {
                Ok(lines) => lines,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let written = match &output {
                Some(path) => fs::write(path, lines.to_text()),
                None => std::io::stdout().write_all(lines.to_text().as_bytes()),
            };
            if let Err(e) = written {
                eprintln!("error: failed to write variant: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }

        Commands::Agp { object, mirrored } => {
            print!("{}", agp::descriptor(&object, AgpRotation::from_mirrored(mirrored)));
            ExitCode::SUCCESS
        }

        Commands::Check { target_dir, manifest } => match ManifestCheck::run(&target_dir, &manifest) {
            Ok(check) => {
                for line in check.report_lines() {
                    println!("{}", line);
                }
                ExitCode::from(check.exit_status())
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },

        Commands::Indent { file, step } => match fs::read_to_string(&file) {
            Ok(text) => {
                print!("{}", indent::reindent_text(&text, step));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to read {}: {}", file.display(), e);
                ExitCode::FAILURE
            }
        },
    }
}

fn build(recipe: Option<PathBuf>, target_dir: Option<PathBuf>, json: bool, no_check: bool) -> ExitCode {
    let mut recipe = match recipe {
        Some(path) => match Recipe::load(&path) {
            Ok(r) => r,
            Err(e) => return fail(json, &e.to_string()),
        },
        None => Recipe::safedock_t2_24(),
    };
    if let Some(dir) = target_dir {
        recipe.target_dir = dir;
    }

    let mut pipeline = BuildPipeline::new(recipe);
    if no_check {
        pipeline = pipeline.without_check();
    }

    let report = match pipeline.build() {
        Ok(report) => report,
        Err(e) => return fail(json, &e.to_string()),
    };

    if json {
        let output = serde_json::json!({
            "success": true,
            "report": &report,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => return fail(json, &e.to_string()),
        }
    } else {
        print_report(&report);
    }

    // advisory only
    if report.library_complete() == Some(false) {
        tracing::warn!("library manifest references missing files");
    }
    ExitCode::SUCCESS
}

fn print_report(report: &BuildReport) {
    for line in report.operator_lines() {
        println!("{}", line);
    }
}

fn fail(json: bool, message: &str) -> ExitCode {
    if json {
        let output = serde_json::json!({
            "success": false,
            "error": message,
        });
        println!("{}", output);
    } else {
        eprintln!("error: {}", message);
    }
    ExitCode::FAILURE
}

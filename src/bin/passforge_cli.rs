//! PassForge CLI - Bridge interface for the pass designer
//!
//! Commands: styles, templates, new, validate, preview, stamps, export
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure, 1 on usage or I/O errors

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use passforge_core::{
    layout_definition, AppleRenderer, ExportError, ExportGate, GoogleRenderer, PassDraft, PassStyle,
    PreviewRenderer, StampConfig, TemplateCatalog,
};

#[derive(Parser)]
#[command(name = "passforge-cli")]
#[command(about = "PassForge CLI - Wallet Pass Designer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra directory of JSON templates, added to the built-in catalog
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List pass styles and their layout rules
    Styles,

    /// List available templates
    Templates,

    /// Create a draft from a template
    New {
        /// Template ID
        #[arg(short, long)]
        template: String,
    },

    /// Validate a draft
    Validate {
        /// Path to draft JSON
        #[arg(short, long)]
        draft: PathBuf,
    },

    /// Render a platform preview of a draft
    Preview {
        /// Path to draft JSON
        #[arg(short, long)]
        draft: PathBuf,

        /// Target platform
        #[arg(short, long, value_enum)]
        platform: PlatformArg,
    },

    /// Apply stamp progress to a draft
    Stamps {
        /// Path to draft JSON
        #[arg(short, long)]
        draft: PathBuf,

        /// Stamps collected so far
        #[arg(short, long)]
        current: u32,

        /// Stamps needed for the reward, clamped to 1..=100
        #[arg(short = 'n', long)]
        total: u32,

        /// Glyph for a collected stamp
        #[arg(long, default_value = "🟢")]
        icon: String,

        /// Glyph for a missing stamp
        #[arg(long, default_value = "⚪")]
        inactive_icon: String,
    },

    /// Validate and export a draft
    Export {
        /// Path to draft JSON
        #[arg(short, long)]
        draft: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Apple,
    Google,
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => fail(format!("Failed to serialize output: {}", e)),
    }
}

fn fail(message: String) -> ExitCode {
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn load_draft(path: &Path) -> Result<PassDraft, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid draft: {}", e))
}

fn load_catalog(dir: Option<&Path>) -> Result<TemplateCatalog, String> {
    let mut catalog = TemplateCatalog::builtin();
    if let Some(dir) = dir {
        let added = catalog
            .extend_from_dir(dir)
            .map_err(|e| format!("Failed to load templates: {}", e))?;
        tracing::debug!(added, dir = %dir.display(), "templates loaded");
    }
    Ok(catalog)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Styles => {
            let styles: Vec<_> = PassStyle::ALL.into_iter().map(layout_definition).collect();
            print_json(&styles)
        }

        Commands::Templates => {
            let catalog = match load_catalog(cli.templates_dir.as_deref()) {
                Ok(c) => c,
                Err(e) => return fail(e),
            };
            let templates: Vec<_> = catalog
                .list()
                .iter()
                .map(|t| serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "version": t.template_version,
                    "style": t.style(),
                    "deprecated": t.deprecated,
                }))
                .collect();
            print_json(&templates)
        }

        Commands::New { template } => {
            let catalog = match load_catalog(cli.templates_dir.as_deref()) {
                Ok(c) => c,
                Err(e) => return fail(e),
            };
            match catalog.create_draft(&template) {
                Some(draft) => print_json(&draft),
                None => fail(format!("Template not found: {}", template)),
            }
        }

        Commands::Validate { draft } => {
            let draft = match load_draft(&draft) {
                Ok(d) => d,
                Err(e) => return fail(e),
            };
            let result = ExportGate::new().validate(&draft);
            let code = print_json(&result);
            if result.valid {
                code
            } else {
                ExitCode::from(2)  // Validation failure
            }
        }

        Commands::Preview { draft, platform } => {
            let draft = match load_draft(&draft) {
                Ok(d) => d,
                Err(e) => return fail(e),
            };
            match platform {
                PlatformArg::Apple => print_json(&AppleRenderer.render(&draft)),
                PlatformArg::Google => print_json(&GoogleRenderer.render(&draft)),
            }
        }

        Commands::Stamps { draft, current, total, icon, inactive_icon } => {
            let draft = match load_draft(&draft) {
                Ok(d) => d,
                Err(e) => return fail(e),
            };
            let config = StampConfig::new(icon, inactive_icon, total, current);
            match draft.synthesize_stamps(config) {
                Ok(updated) => print_json(&updated),
                Err(e) => fail(e.to_string()),
            }
        }

        Commands::Export { draft } => {
            let draft = match load_draft(&draft) {
                Ok(d) => d,
                Err(e) => return fail(e),
            };
            match ExportGate::new().export(&draft) {
                Ok(ticket) => print_json(&serde_json::json!({
                    "success": true,
                    "ticket": ticket,
                })),
                Err(ExportError::Blocked(validation)) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": "Export blocked by validation errors",
                        "validation": validation,
                    });
                    println!("{}", output);
                    ExitCode::from(2)  // Export blocked (validation)
                }
                Err(e) => fail(e.to_string()),
            }
        }
    }
}

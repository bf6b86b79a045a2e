use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Confirm;
use sha2::{Digest, Sha256};

use tegel_core::artifacts::{ArtifactStatus, GenerationReport};
use tegel_core::config::GeneratorConfig;
use tegel_core::dispatcher::Dispatcher;
use tegel_core::error::TegelError;
use tegel_core::params::Params;
use tegel_core::sink::{
    FileSinkProvider, MemorySinkProvider, OverwritePolicy, OverwritePrompt,
};

use crate::output;

#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    /// Backend name (e.g. `expr`); overrides "name" in the config
    #[arg(short, long)]
    pub name: Option<String>,

    /// Generate an AST visitor class
    #[arg(short, long, overrides_with = "no_ast_visitor")]
    pub ast_visitor: bool,

    /// Do not generate the AST visitor class, even if the config enables it
    #[arg(long)]
    pub no_ast_visitor: bool,

    /// Output directory (created if it does not exist)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Node name to generate a visit method for (repeatable; replaces the built-in list)
    #[arg(long = "node", value_name = "NODE")]
    pub nodes: Vec<String>,

    /// Overwrite existing files without asking
    #[arg(long, conflicts_with = "no_clobber")]
    pub force: bool,

    /// Never overwrite existing files
    #[arg(long)]
    pub no_clobber: bool,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Asks on the terminal before replacing an existing artifact.
struct TerminalPrompt;

impl OverwritePrompt for TerminalPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> tegel_core::error::Result<bool> {
        Confirm::new()
            .with_prompt(format!("{} already exists, overwrite?", path.display()))
            .default(true)
            .interact()
            .map_err(|e| TegelError::Io(std::io::Error::other(e.to_string())))
    }
}

/// Generate the declaration and definition files of a backend.
///
/// Flags override the config file, which overrides the built-in defaults. An
/// artifact whose overwrite is declined is skipped; the command only fails when
/// no artifact at all could be written.
pub fn run(config_path: &Path, args: BackendArgs) -> Result<()> {
    let config = merge(GeneratorConfig::load_or_default(config_path)?, &args);
    tracing::debug!("effective configuration: {config:?}");
    let request = config.to_request()?;

    output::print_header(&format!("tegel backend: {}", request.name));
    output::print_key_value("AST visitor", if request.ast_visitor { "yes" } else { "no" });
    output::print_key_value("Nodes", &request.nodes.len().to_string());

    let params = request.into_params()?;

    if args.dry_run {
        return dry_run(&params);
    }

    let dir = config.output_dir();
    output::print_key_value("Output", &dir.display().to_string());

    let prompt: Box<dyn OverwritePrompt> = if args.force {
        Box::new(OverwritePolicy::Always)
    } else if args.no_clobber || !console::user_attended() {
        Box::new(OverwritePolicy::Never)
    } else {
        Box::new(TerminalPrompt)
    };

    let provider = FileSinkProvider::create(&dir, prompt)?;
    let mut dispatcher = Dispatcher::new(provider);
    let report = dispatcher.generate(&params)?;

    print_report(&report, &dir);
    conclude(&report)
}

fn merge(mut config: GeneratorConfig, args: &BackendArgs) -> GeneratorConfig {
    if let Some(name) = &args.name {
        config.name = Some(name.clone());
    }
    if args.ast_visitor {
        config.ast_visitor = true;
    } else if args.no_ast_visitor {
        config.ast_visitor = false;
    }
    if let Some(dir) = &args.dir {
        config.output_directory = Some(dir.clone());
    }
    if !args.nodes.is_empty() {
        config.nodes = Some(args.nodes.clone());
    }
    config
}

fn dry_run(params: &Params) -> Result<()> {
    let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
    let report = dispatcher.generate(params)?;
    let provider = dispatcher.into_provider();

    for outcome in &report.artifacts {
        if let Some(contents) = provider.get(&outcome.path) {
            output::print_header(&format!("{} ({})", outcome.path.display(), outcome.kind));
            print!("{contents}");
        }
    }
    conclude(&report)
}

fn print_report(report: &GenerationReport, dir: &Path) {
    println!();
    for outcome in &report.artifacts {
        let path = dir.join(&outcome.path);
        match &outcome.status {
            ArtifactStatus::Written { bytes } => {
                output::print_success(&format!("{} ({})", path.display(), outcome.kind));
                output::print_key_value("Size", &format!("{bytes} bytes"));
                match digest(&path) {
                    Ok(hash) => output::print_key_value("SHA-256", &hash),
                    Err(e) => output::print_warning(&format!("{e:#}")),
                }
            }
            ArtifactStatus::Skipped => {
                output::print_skipped(&format!("{} already exists", path.display()));
            }
            ArtifactStatus::Failed(reason) => {
                output::print_error(&format!("Can't create {}: {reason}", path.display()));
            }
        }
    }
}

fn digest(path: &Path) -> Result<String> {
    let contents =
        std::fs::read(path).with_context(|| format!("reading back {}", path.display()))?;
    Ok(hex::encode(Sha256::digest(&contents)))
}

fn conclude(report: &GenerationReport) -> Result<()> {
    if report.is_total_failure() {
        anyhow::bail!("no artifacts were generated");
    }
    if report.is_partial() {
        output::print_warning(&format!(
            "partial success: {} of {} artifacts written",
            report.written().count(),
            report.artifacts.len()
        ));
    }
    Ok(())
}

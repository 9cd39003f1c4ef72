//! Command-line surface.

use crate::overrides::load_overrides;
use crate::report::ResolutionReport;
use crate::service::{LockServiceRegistry, ModuleDeclarations};
use clap::{Args, Parser, Subcommand};
use gradle_lock_core::{LockError, ModulePath, OverrideMap, Result};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gradle-lock",
    version,
    about = "Pin dynamic dependency versions in Gradle build scripts",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Resolution report exported from the Gradle build
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = "resolution-report.json"
    )]
    pub report: PathBuf,

    /// Module whose manifests are processed
    #[arg(long, global = true, value_name = "PATH", default_value = ":")]
    pub project: String,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the resolved version next to every dynamic declaration
    Update(UpdateArgs),
    /// Remove every lock clause
    Strip,
    /// Split multi-coordinate declarations so each can be locked
    Prepare,
    /// List declarations with the version resolution requests
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// JSON file of versions that win over resolution
    #[arg(long, value_name = "FILE")]
    pub overrides: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Report what is requested when lock clauses are ignored
    #[arg(long)]
    pub ignore_locks: bool,

    /// Only list declarations for this configuration
    #[arg(long, value_name = "NAME")]
    pub configuration: Option<String>,
}

pub fn run(cli: &Cli, registry: &LockServiceRegistry) -> Result<()> {
    let report = ResolutionReport::load(&cli.report)?;
    let module = ModulePath::new(&cli.project);
    if !report.contains(&module) {
        return Err(LockError::UnknownModule(module.to_string()));
    }
    let service = registry.for_module(&module);

    match &cli.command {
        Command::Update(args) => {
            let overrides = match &args.overrides {
                Some(path) => load_overrides(path)?,
                None => OverrideMap::new(),
            };
            let written = service.update_locks(&report, &overrides)?;
            summarize("Updated", &written);
        }
        Command::Strip => {
            let written = service.strip_locks(&report)?;
            summarize("Stripped", &written);
        }
        Command::Prepare => {
            let written = service.prepare_for_locks(&report)?;
            summarize("Prepared", &written);
        }
        Command::Show(args) => {
            let listing = service.show(&report, args.ignore_locks)?;
            print!("{}", render(&listing, args.configuration.as_deref()));
        }
    }
    Ok(())
}

fn summarize(action: &str, written: &[PathBuf]) {
    if written.is_empty() {
        tracing::info!("No manifest changed");
    } else {
        tracing::info!("{} {} manifest(s)", action, written.len());
    }
}

/// One block per manifest, one line per declaration.
pub fn render(listing: &[ModuleDeclarations], configuration: Option<&str>) -> String {
    let mut out = String::new();
    for module in listing {
        let _ = writeln!(out, "{} ({})", module.module, module.manifest.display());
        for decl in &module.declarations {
            if configuration.is_some_and(|name| decl.scope.name() != name) {
                continue;
            }
            let _ = write!(
                out,
                "  {} {} {}",
                decl.scope,
                decl.module,
                decl.requested.as_deref().unwrap_or("-")
            );
            if decl.locked.is_some() && decl.locked != decl.requested {
                let _ = write!(out, " (lock {} ignored)", decl.locked.as_deref().unwrap_or(""));
            }
            if decl.force {
                out.push_str(" [force]");
            }
            if decl.ignored {
                out.push_str(" [ignore]");
            }
            out.push('\n');
        }
    }
    out
}

//! designkit CLI - Project scaffolding for designkit component libraries

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use designkit_core::target::{compile_project, TargetKind};
use designkit_core::templates::pack_archive;
use designkit_core::{CreateArgs, CreatedProject, ProductConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// designkit product configuration
#[derive(Clone)]
pub struct DesignkitConfig;

impl ProductConfig for DesignkitConfig {
    fn name(&self) -> &'static str {
        "designkit"
    }

    fn display_name(&self) -> &'static str {
        "designkit"
    }

    fn version(&self) -> &'static str {
        CLI_VERSION
    }

    fn default_archive_base(&self) -> &'static str {
        "https://cdn.designkit.dev/releases"
    }

    fn archive_base_env(&self) -> &'static str {
        "DESIGNKIT_TEMPLATE_URL"
    }

    fn docs_url(&self) -> &'static str {
        "https://designkit.dev/docs"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install designkit-tools --force"
    }

    fn next_steps(&self, project: &CreatedProject) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(project.root.as_path()) {
            let shown = current
                .as_deref()
                .and_then(|cwd| project.root.strip_prefix(cwd).ok())
                .unwrap_or(&project.root);
            steps.push(format!("cd {}", shown.display()));
        }

        if !project.install.is_done() {
            steps.push(project.manager.install_command());
        }

        steps.push(project.manager.run_command("build"));
        steps.push(format!("Read the docs at {}", self.docs_url()));

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "designkit")]
#[command(about = "CLI for scaffolding designkit projects")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new designkit project
    Create(CliCreateArgs),
    /// Compile the components of a project for a target platform
    Compile(CompileArgs),
    /// Package a template directory as a project archive (for development use)
    Pack(PackArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Package name of the new project
    pub project_name: Option<String>,

    /// Use the bundled minimal template instead of downloading the example project
    #[arg(long)]
    pub bare: bool,

    /// Local directory to use as the bare template (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Do not install dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Do not initialize a git repository
    #[arg(long = "skip-git")]
    pub skip_git: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            project_name: args.project_name,
            bare: args.bare,
            template_dir: args.template_dir,
            skip_install: args.skip_install,
            skip_git: args.skip_git,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Project root containing components.yaml
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output directory for the target
    #[arg(long, default_value = "dist")]
    pub dest: PathBuf,

    /// Target platform
    #[arg(long, value_enum, default_value_t = TargetKind::Log)]
    pub target: TargetKind,
}

#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Template directory to package
    #[arg(long = "template-dir")]
    pub template_dir: PathBuf,

    /// Archive to write
    #[arg(long, default_value = "project.tgz")]
    pub out: PathBuf,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);
    let config = DesignkitConfig;

    match args.command {
        Some(Command::Create(create_args)) => {
            let result = designkit_core::run(&config, create_args.into()).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::Compile(compile_args)) => {
            let handler = compile_args.target.handler();
            let names = compile_project(&compile_args.root, &compile_args.dest, handler.as_ref())
                .with_context(|| format!("Failed to compile {}", compile_args.root.display()))?;
            println!("Compiled {} components for {}", names.len(), handler.name());
            Ok(())
        }
        Some(Command::Pack(pack_args)) => {
            let count = pack_archive(&pack_args.template_dir, &pack_args.out)?;
            println!("Packed {} files into {}", count, pack_args.out.display());
            Ok(())
        }
        None => {
            // No subcommand provided, default to create behavior (interactive mode)
            let result = designkit_core::run(&config, CreateArgs::default()).await;

            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}

//! Charm-style CLI prompts using cliclack

use crate::naming::package_name_problems;
use crate::product::ProductConfig;
use crate::project::ProjectRequest;
use crate::runtime::SystemEnvironment;
use crate::templates::ArchiveSource;
use crate::workflow::{CreatedProject, Progress, ProjectCreator, Stage};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Package name of the new project; prompted for when absent
    pub project_name: Option<String>,

    /// Use the bundled template instead of downloading the example project
    pub bare: bool,

    /// Local directory to use as the bare template (for development use)
    pub template_dir: Option<PathBuf>,

    /// Skip installing dependencies
    pub skip_install: bool,

    /// Skip git repository initialization
    pub skip_git: bool,
}

/// Run the create command with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<()> {
    cliclack::intro(format!("{} create", config.display_name()))?;

    // Step 1: Project name
    let package_name = select_name(&args)?;

    // Step 2: Template source
    let working_directory =
        std::env::current_dir().context("Failed to read the current directory")?;
    let bare = args.bare || args.template_dir.is_some();
    describe_template(config, &args, bare)?;

    let request = ProjectRequest::new(package_name, working_directory)
        .bare(bare)
        .template_dir(args.template_dir.clone())
        .skip_install(args.skip_install)
        .skip_git(args.skip_git);

    // Step 3: Create project
    let env = SystemEnvironment;
    let mut progress = CliProgress::default();
    let created = match ProjectCreator::new(config, &env)
        .create(&request, &mut progress)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            progress.fail();
            cliclack::log::error(e.to_string())?;
            cliclack::outro_cancel("Project was not created.")?;
            return Err(e.into());
        }
    };

    // Step 4: Show next steps
    print_next_steps(config, &created)?;

    Ok(())
}

fn select_name(args: &CreateArgs) -> Result<String> {
    if let Some(name) = &args.project_name {
        cliclack::log::info(format!("Project name: {}", name))?;
        return Ok(name.clone());
    }

    let name: String = cliclack::input("What is your project named?")
        .placeholder("my-designkit-app")
        .validate(|input: &String| {
            let problems = package_name_problems(input);
            if problems.is_empty() {
                Ok(())
            } else {
                Err(problems.join("; "))
            }
        })
        .interact()?;

    Ok(name)
}

fn describe_template<C: ProductConfig>(config: &C, args: &CreateArgs, bare: bool) -> Result<()> {
    match (&args.template_dir, bare) {
        (Some(path), _) => {
            cliclack::log::info(format!("Using local bare template from {}", path.display()))?
        }
        (None, true) => cliclack::log::info("Using the bundled bare template")?,
        (None, false) => {
            let location = ArchiveSource::from_config(config, config.version())
                .map(|source| source.location())
                .unwrap_or_else(|_| config.default_archive_base().to_string());
            cliclack::log::info(format!("Using remote template {}", location))?
        }
    }
    Ok(())
}

/// Spinner per stage; the install stage streams its own output instead
#[derive(Default)]
struct CliProgress {
    spinner: Option<cliclack::ProgressBar>,
    stage: Option<Stage>,
}

impl CliProgress {
    fn fail(&mut self) {
        if let (Some(spinner), Some(stage)) = (self.spinner.take(), self.stage) {
            spinner.error(format!("{} failed", stage));
        }
    }
}

impl Progress for CliProgress {
    fn stage_started(&mut self, stage: Stage) {
        self.stage = Some(stage);
        match stage {
            Stage::Install => {
                let _ = cliclack::log::step(format!("{}...", stage));
            }
            Stage::InitVcs => {}
            _ => {
                let spinner = cliclack::spinner();
                spinner.start(format!("{}...", stage));
                self.spinner = Some(spinner);
            }
        }
    }

    fn stage_finished(&mut self, stage: Stage, detail: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(if detail.is_empty() {
                stage.description().to_string()
            } else {
                detail.to_string()
            }),
            None if !detail.is_empty() => {
                let _ = cliclack::log::success(detail);
            }
            None => {}
        }
    }

    fn warning(&mut self, message: &str) {
        let _ = cliclack::log::warning(message);
    }
}

fn print_next_steps<C: ProductConfig>(config: &C, created: &CreatedProject) -> Result<()> {
    let steps = config.next_steps(created);

    cliclack::log::success(format!(
        "Created {} at {}",
        created.package_name,
        created.root.display()
    ))?;

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy designing!")?;

    Ok(())
}

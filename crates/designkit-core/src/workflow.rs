//! Project creation workflow
//!
//! Stages run strictly in order:
//! Validate -> ProbeManager -> ValidateRoot -> Acquire -> Substitute ->
//! Install -> InitVcs. Any failure up to Substitute aborts creation. Install
//! and git init are best-effort: their failures become warnings and the
//! project still counts as created.

use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use crate::project::{prepare_root, ProjectRequest};
use crate::runtime::{package_manager, try_git_init, HostEnvironment, PackageManager};
use crate::templates::{self, BareTemplate, TemplateFetcher};
use crate::tokens::TokenSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A step of project creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    ProbeManager,
    ValidateRoot,
    Acquire,
    Substitute,
    Install,
    InitVcs,
}

impl Stage {
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Validate => "Checking project name",
            Stage::ProbeManager => "Detecting package manager",
            Stage::ValidateRoot => "Preparing project directory",
            Stage::Acquire => "Fetching template",
            Stage::Substitute => "Applying project name",
            Stage::Install => "Installing dependencies",
            Stage::InitVcs => "Initializing git repository",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Observer for workflow progress
pub trait Progress {
    fn stage_started(&mut self, _stage: Stage) {}

    fn stage_finished(&mut self, _stage: Stage, _detail: &str) {}

    fn warning(&mut self, _message: &str) {}
}

/// Progress observer that reports nothing
#[derive(Debug, Default)]
pub struct Silent;

impl Progress for Silent {}

/// Outcome of a best-effort step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped,
    Failed(String),
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done)
    }
}

/// Report of a created project
#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub package_name: String,
    pub root: PathBuf,
    pub manager: PackageManager,
    pub files: Vec<String>,
    pub install: StepOutcome,
    pub git: StepOutcome,
    /// Non-fatal problems, each with a remediation hint
    pub warnings: Vec<String>,
}

/// Runs project creation against a host environment
pub struct ProjectCreator<'a, C: ProductConfig, E: HostEnvironment> {
    config: &'a C,
    env: &'a E,
    fetcher: Option<TemplateFetcher>,
}

impl<'a, C: ProductConfig, E: HostEnvironment> ProjectCreator<'a, C, E> {
    pub fn new(config: &'a C, env: &'a E) -> Self {
        Self {
            config,
            env,
            fetcher: None,
        }
    }

    /// Use this fetcher for the remote template instead of the product's
    pub fn with_fetcher(mut self, fetcher: TemplateFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Create the project described by `request`
    pub async fn create<P: Progress>(
        &self,
        request: &ProjectRequest,
        progress: &mut P,
    ) -> Result<CreatedProject> {
        progress.stage_started(Stage::Validate);
        request.validate()?;
        progress.stage_finished(Stage::Validate, &request.package_name);

        progress.stage_started(Stage::ProbeManager);
        let manager_info = package_manager::probe(self.env, &request.working_directory)?;
        let manager = manager_info.manager;
        progress.stage_finished(
            Stage::ProbeManager,
            &format!(
                "Using {} ({})",
                manager,
                manager_info.version.as_deref().unwrap_or("unknown")
            ),
        );

        let root = request.root();
        progress.stage_started(Stage::ValidateRoot);
        prepare_root(&root)?;
        progress.stage_finished(Stage::ValidateRoot, &root.display().to_string());

        let mut warnings = Vec::new();
        let version_pin = templates::version_pin(self.config.version());

        // The template is materialized and substituted in a scratch
        // directory; only the finished files reach the root.
        let staging = tempfile::TempDir::new()
            .map_err(|e| ScaffoldError::io("Failed to create a temporary directory", e))?;

        progress.stage_started(Stage::Acquire);
        let (staged, tokens) = if request.bare {
            let staged = self
                .acquire_bare(request, staging.path(), &mut warnings)
                .await?;
            (staged, TokenSet::bare(&request.package_name, &version_pin))
        } else {
            let staged = self.acquire_remote(staging.path()).await?;
            (staged, TokenSet::full(&request.package_name, &version_pin))
        };
        progress.stage_finished(Stage::Acquire, "Template ready");
        for warning in &warnings {
            progress.warning(warning);
        }

        progress.stage_started(Stage::Substitute);
        let summary = tokens.apply_to_tree(&staged)?;
        let report = templates::copy_tree(&staged, &root).await?;
        progress.stage_finished(
            Stage::Substitute,
            &format!(
                "Wrote {} files ({} rewritten, {} renamed)",
                report.written.len(),
                summary.files_rewritten,
                summary.paths_renamed
            ),
        );
        for kept in &report.kept {
            let warning = format!(
                "Kept the existing {}; the template's version was not written",
                kept
            );
            progress.warning(&warning);
            warnings.push(warning);
        }
        let files = report.written;

        let install = if request.skip_install {
            StepOutcome::Skipped
        } else {
            progress.stage_started(Stage::Install);
            match package_manager::install(self.env, manager, &root).await {
                Ok(()) => {
                    progress.stage_finished(Stage::Install, "Dependencies installed");
                    StepOutcome::Done
                }
                Err(hint) => {
                    progress.warning(&hint);
                    warnings.push(hint.clone());
                    StepOutcome::Failed(hint)
                }
            }
        };

        let git = if request.skip_git {
            StepOutcome::Skipped
        } else {
            progress.stage_started(Stage::InitVcs);
            if try_git_init(self.env, &root) {
                progress.stage_finished(Stage::InitVcs, "Initialized a git repository");
                StepOutcome::Done
            } else {
                progress.stage_finished(Stage::InitVcs, "");
                StepOutcome::Skipped
            }
        };

        info!("Created {} at {}", request.package_name, root.display());
        Ok(CreatedProject {
            package_name: request.package_name.clone(),
            root,
            manager,
            files,
            install,
            git,
            warnings,
        })
    }

    /// Write the bare template into `staging`, returning the staged root
    async fn acquire_bare(
        &self,
        request: &ProjectRequest,
        staging: &Path,
        warnings: &mut Vec<String>,
    ) -> Result<PathBuf> {
        let template = BareTemplate::from_dir(request.template_dir.clone())
            .load()
            .await?;
        debug!("Using bare template '{}'", template.manifest.name);

        if let Some(warning) = templates::check_compatibility(
            self.config.version(),
            &template.manifest.version,
            self.config.upgrade_command(),
        ) {
            warnings.push(warning);
        }

        let copied = templates::copy_template(&template, staging).await?;
        debug!("Staged {} template files", copied.len());
        Ok(staging.to_path_buf())
    }

    /// Download and extract the remote template into `staging`
    async fn acquire_remote(&self, staging: &Path) -> Result<PathBuf> {
        match &self.fetcher {
            Some(fetcher) => fetcher.fetch_into(staging).await,
            None => {
                TemplateFetcher::from_config(self.config)?
                    .fetch_into(staging)
                    .await
            }
        }
    }
}

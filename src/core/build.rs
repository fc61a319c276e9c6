use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::env::{self, Settings};
use crate::env_file;
use crate::error::{Error, Result};
use crate::utils::command::{run_checked, ProcessRunner};

/// Tools that must answer `-v` before a build is attempted.
pub const REQUIRED_TOOLS: [&str; 3] = ["node", "npm", "npx"];

/// Static export directory produced by the build, relative to the project.
pub const OUTPUT_DIR: &str = "out";

/// Environment file the build tool reads in production mode.
pub const ENV_FILE: &str = ".env.production";

/// Dependency cache directory; its presence allows skipping install.
pub const DEPENDENCY_DIR: &str = "node_modules";

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub project_dir: String,
    pub output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_api: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
    pub installed: bool,
}

/// Resolve and validate the configured project directory.
pub fn project_dir(settings: &Settings) -> Result<PathBuf> {
    if settings.project_dir.is_empty() {
        return Err(Error::config_missing_key(env::PROJECT_DIR, None));
    }

    let expanded = shellexpand::tilde(&settings.project_dir).into_owned();
    let dir = PathBuf::from(expanded);
    if !dir.exists() {
        return Err(Error::config_invalid_value(
            env::PROJECT_DIR,
            Some(settings.project_dir.clone()),
            format!("NEXTJS_DIR not found: {}", dir.display()),
        ));
    }
    Ok(dir)
}

/// Location of the build output for the configured project.
pub fn output_dir(settings: &Settings) -> Result<PathBuf> {
    Ok(project_dir(settings)?.join(OUTPUT_DIR))
}

/// Install decision: skipping is honored only when the dependency cache
/// is already present.
pub fn should_install(skip_requested: bool, cache_present: bool) -> bool {
    !(skip_requested && cache_present)
}

/// Ensure the toolchain, write the build-time API base, build, and check the
/// static export exists.
pub fn run(settings: &Settings, runner: &dyn ProcessRunner) -> Result<BuildReport> {
    let project = project_dir(settings)?;

    let public_api = settings.public_api().map(str::to_string);
    if public_api.is_none() {
        crate::log_status!(
            "build",
            "WARN: {} is empty; your site may not know where to fetch tiles.",
            env::PUBLIC_PORTFOLIO_API
        );
    }

    for tool in REQUIRED_TOOLS {
        runner.probe(tool, &["-v"], &project)?;
    }

    let installed = should_install(settings.skip_install, project.join(DEPENDENCY_DIR).exists());
    if installed {
        run_checked(runner, "npm", &["ci"], &project)?;
    } else {
        crate::log_status!("build", "skipping npm ci ({} present)", DEPENDENCY_DIR);
    }

    let env_file = match &public_api {
        Some(api) => {
            let path = project.join(ENV_FILE);
            env_file::merge_into_file(&path, env::PUBLIC_PORTFOLIO_API, api)?;
            crate::log_status!("build", "wrote {}", path.display());
            Some(path.display().to_string())
        }
        None => None,
    };

    run_checked(runner, "npm", &["run", "build"], &project)?;

    let out = project.join(OUTPUT_DIR);
    require_output(&out)?;
    crate::log_status!("build", "ok: built {}", out.display());

    Ok(BuildReport {
        project_dir: project.display().to_string(),
        output_dir: out.display().to_string(),
        public_api,
        env_file,
        installed,
    })
}

fn require_output(out: &Path) -> Result<()> {
    if out.is_dir() {
        Ok(())
    } else {
        Err(Error::build_output_missing(out.display().to_string()))
    }
}

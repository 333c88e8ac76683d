use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use git_release::cli::{run_release_workflow, ReleaseOptions, WorkflowResult};
use git_release::config;
use git_release::git::Git2Repository;
use git_release::github::GitHubClient;
use git_release::logging::{init_tracing, LogFormat, LogLevel};
use git_release::ui;
use git_release::version::VersionBump;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    version,
    about = "Compute the next semantic version, bump tracked files and publish a GitHub release"
)]
struct Args {
    #[arg(long, env = "GITHUB_REPOSITORY", help = "Repository in owner/name form")]
    repository: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, default_value = "")]
    github_token: String,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, value_enum, help = "Override the bump inferred from changes")]
    bump: Option<VersionBump>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Mark the release as a pre-release")]
    pre_release: bool,

    #[arg(long, help = "Create the release as a draft")]
    draft: bool,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(long, default_value = "github-actions[bot]")]
    commit_user: String,

    #[arg(
        long,
        default_value = "41898282+github-actions[bot]@users.noreply.github.com"
    )]
    commit_email: String,

    #[arg(long, default_value = ".", help = "Repository checkout to release from")]
    workdir: PathBuf,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,

    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://github.com")]
    server_url: String,

    #[arg(long, default_value = "origin", help = "Remote the bump commit is pushed to")]
    remote: String,

    #[arg(long, value_enum, default_value_t = LogLevel::default())]
    log_level: LogLevel,

    #[arg(long, value_enum, default_value_t = LogFormat::default())]
    log_format: LogFormat,
}

impl Args {
    fn options(&self) -> ReleaseOptions {
        ReleaseOptions {
            repository: self.repository.clone(),
            github_token: self.github_token.clone(),
            commit_user: self.commit_user.clone(),
            commit_email: self.commit_email.clone(),
            config_path: self.config.clone(),
            bump: self.bump,
            dry_run: self.dry_run,
            pre_release: self.pre_release,
            draft: self.draft,
            workdir: self.workdir.clone(),
            api_url: self.api_url.clone(),
            server_url: self.server_url.clone(),
            remote: self.remote.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level, args.log_format)?;

    let options = args.options();

    let config = match config::load_config(options.config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let repo = Git2Repository::open(&options.workdir).with_context(|| {
        format!(
            "Failed to open git repository at {}",
            options.workdir.display()
        )
    })?;
    let client = GitHubClient::new(&options.api_url, &options.repository, &options.github_token)?;

    // Ask before writing anything when a person is watching
    if !options.dry_run && !args.force && ui::is_interactive() {
        let preview_options = ReleaseOptions {
            dry_run: true,
            ..options.clone()
        };
        let preview = run_release_workflow(&preview_options, &config, &repo, &client)?;
        report(&preview, true);

        if !ui::confirm_action(&format!("Publish release {}?", preview.tag_name))? {
            println!("Operation cancelled by user.");
            return Ok(());
        }
    }

    ui::display_status(&format!("Preparing release for {}", options.repository));
    let result = match run_release_workflow(&options, &config, &repo, &client) {
        Ok(result) => result,
        Err(e) => {
            ui::display_error(&format!("Release failed: {}", e));
            std::process::exit(1);
        }
    };

    report(&result, options.dry_run);

    if let Some(sha) = &result.bump_commit {
        ui::display_success(&format!(
            "Pushed version bump commit {} to {}",
            sha, config.branch.base_branch
        ));
    }
    match &result.release_url {
        Some(url) => ui::display_success(&format!("Published {} at {}", result.tag_name, url)),
        None => ui::display_status(&format!(
            "Dry run: release {} was not published",
            result.tag_name
        )),
    }

    Ok(())
}

fn report(result: &WorkflowResult, dry_run: bool) {
    for warning in &result.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_release_preview(result);
    ui::display_diffs(&result.patch.diffs, dry_run);
}

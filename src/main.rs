use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use github_source::config::{self, DEFAULT_API_URL, ProjectConfig};
use github_source::source::{AsyncCache, GitHubSource, HttpTransport, Keyfile, Resolution};

/// Exit status when the rate limit was exhausted and no result is available
const EXIT_SUPPRESSED: u8 = 2;

#[derive(Parser)]
#[command(name = "github-source")]
#[command(version, about = "Resolve the current upstream version of a GitHub project")]
struct Cli {
    /// Repository in owner/name form
    repository: String,

    /// Project name used in log output (defaults to the repository)
    #[arg(long)]
    name: Option<String>,

    /// API token; overrides the keyfile
    #[arg(long)]
    token: Option<String>,

    /// Keyfile with {"keys": {"github": "..."}}
    #[arg(long)]
    keyfile: Option<PathBuf>,

    /// Use the most recent tag (GraphQL, requires a token)
    #[arg(long)]
    use_latest_tag: bool,

    /// Tag-name filter for --use-latest-tag
    #[arg(long)]
    query: Option<String>,

    /// Use the latest release
    #[arg(long)]
    use_latest_release: bool,

    /// Include prereleases with --use-latest-release (GraphQL, requires a token)
    #[arg(long)]
    include_prereleases: bool,

    /// Branch for the commits strategy
    #[arg(long)]
    branch: Option<String>,

    /// Path filter for the commits strategy
    #[arg(long)]
    path: Option<String>,

    /// List every tag
    #[arg(long)]
    use_max_tag: bool,

    /// GitHub API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Also write logs to a file (default location when no path is given)
    #[arg(long)]
    log_file: Option<Option<PathBuf>>,
}

impl Cli {
    fn project_config(&self) -> ProjectConfig {
        ProjectConfig {
            repository: self.repository.clone(),
            token: self.token.clone(),
            use_latest_tag: self.use_latest_tag,
            query: self.query.clone(),
            use_latest_release: self.use_latest_release,
            include_prereleases: self.include_prereleases,
            branch: self.branch.clone(),
            path: self.path.clone(),
            use_max_tag: self.use_max_tag,
        }
    }

    fn load_keyfile(&self) -> anyhow::Result<Keyfile> {
        match &self.keyfile {
            Some(path) => Keyfile::load(path)
                .with_context(|| format!("Failed to load keyfile {:?}", path)),
            None => {
                let path = config::keyfile_path();
                if path.exists() {
                    Keyfile::load(&path)
                        .with_context(|| format!("Failed to load keyfile {:?}", path))
                } else {
                    Ok(Keyfile::default())
                }
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let keys = cli.load_keyfile()?;
    let config = cli.project_config();
    let name = cli.name.clone().unwrap_or_else(|| cli.repository.clone());

    let cache = AsyncCache::new(Arc::new(HttpTransport::new()));
    let source = GitHubSource::new(&cli.api_url);

    let resolution = source.get_version(&name, &config, &cache, &keys).await?;

    let output = match resolution {
        Resolution::Single(result) => serde_json::to_string_pretty(&result)?,
        Resolution::Multiple(results) => serde_json::to_string_pretty(&results)?,
        Resolution::Suppressed(_) => {
            warn!("{}: no result available until the rate limit resets", name);
            return Ok(ExitCode::from(EXIT_SUPPRESSED));
        }
    };
    println!("{}", output);

    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let log_file = cli
        .log_file
        .clone()
        .map(|path| path.unwrap_or_else(config::log_path));
    let _guard = github_source::logging::init(cli.json_logs, log_file.as_deref())?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

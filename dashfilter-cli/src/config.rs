//! Loading of inputs: config, dataset and filter tree.

use std::path::{Path, PathBuf};

use dashfilter_query::QueryBlock;
use dashfilter_schema::config::CONFIG_FILE_NAME;
use dashfilter_schema::{Dataset, FilterConfig};
use tracing::debug;

use crate::cli::InputArgs;
use crate::error::{CliError, CliResult};

/// Everything a command needs, loaded from [`InputArgs`].
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Effective configuration, with environment and timezone overrides applied.
    pub config: FilterConfig,
    /// The dataset.
    pub dataset: Dataset,
    /// The filter tree.
    pub block: QueryBlock,
}

impl Inputs {
    /// Load all inputs.
    pub async fn load(args: &InputArgs) -> CliResult<Self> {
        let mut config = load_config(args.config.as_deref(), args.env.as_deref()).await?;
        if let Some(tz) = args.timezone {
            config.display.timezone = tz;
        }
        let dataset = load_dataset(&args.dataset).await?;
        let block = load_filters(&args.filters).await?;
        Ok(Self {
            config,
            dataset,
            block,
        })
    }
}

/// Load the config from `path`, or from `./dashfilter.toml` when present.
pub async fn load_config(path: Option<&Path>, env: Option<&str>) -> CliResult<FilterConfig> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = std::env::current_dir()?.join(CONFIG_FILE_NAME);
            if !tokio::fs::try_exists(&default).await.unwrap_or(false) {
                debug!("No config file found, using defaults");
                return Ok(FilterConfig::default());
            }
            default
        }
    };

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
    let config = FilterConfig::from_str(&content)?;
    debug!(path = %path.display(), "Loaded config");

    Ok(match env {
        Some(env) => config.with_environment(env)?,
        None => config,
    })
}

/// Load a dataset definition.
pub async fn load_dataset(path: &Path) -> CliResult<Dataset> {
    let content = tokio::fs::read_to_string(path).await?;
    let dataset = Dataset::from_str_with_ext(&content, path)?;
    debug!(dataset = dataset.name(), columns = dataset.len(), "Loaded dataset");
    Ok(dataset)
}

/// Load a canonical filter tree.
pub async fn load_filters(path: &Path) -> CliResult<QueryBlock> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

use anyhow::Result;
use tracing::debug;

use survey_coverage::Config;

use crate::cli::Cli;

pub mod maps;
pub mod run;
pub mod stats;

/// The `--config` file if given, defaults otherwise.
fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            Config::from_json_file(path)
        }
        None => Ok(Config::default()),
    }
}

use std::path::PathBuf;

use clap::Parser;

/// 根据分层的 key=value 配置生成训练/测试脚本
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Argument tokens: `key=value`, `###` or configuration file/directory paths.
    /// Flags may appear anywhere; put tokens starting with `-` after `--`.
    pub tokens: Vec<String>,
    /// Root directory for `scripts_evals/` and the dispatch script.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Lookup tables file (TOML, or YAML by extension) replacing the built-in tables.
    #[arg(long)]
    pub tables: Option<PathBuf>,
    /// Write the built-in lookup tables to this path and exit.
    #[arg(long)]
    pub write_default_tables: Option<PathBuf>,
    /// Override the configuration name taken from the last configuration file read.
    #[arg(long)]
    pub modelspace: Option<String>,
    /// Print the resolved parameters as JSON before generating scripts.
    #[arg(long, default_value_t = false)]
    pub print_params: bool,
    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

// src/main.rs
mod arg_parser;
mod cli;
mod commands;
mod config;
mod file_utils;
mod models;
mod script_emitter;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use arg_parser::resolve_args;
use cli::CliArgs;
use config::{load_tables, write_default_tables};
use models::{CatfogError, ParameterMap};
use script_emitter::{EmissionReport, ScriptEmitter};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level())?;

    run(&args)?;
    Ok(())
}

fn init_logging(level: tracing::Level) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("catfog={}", level).parse()?);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

/// 以美观的JSON格式输出解析后的参数
fn print_params<W: Write>(params: &ParameterMap, out: &mut W) -> Result<()> {
    writeln!(out, "{}", params.to_pretty_json()?)?;
    Ok(())
}

fn run(args: &CliArgs) -> Result<Option<EmissionReport>> {
    if let Some(path) = &args.write_default_tables {
        write_default_tables(path)?;
        return Ok(None);
    }

    let tables = load_tables(args.tables.as_deref())?;

    // 解析参数：命令行 token → (key, value) → 参数映射
    let resolution = resolve_args(args.tokens.as_slice(), None)?;
    let params = ParameterMap::from_pairs(resolution.pairs);
    debug!("Resolved {} parameter keys", params.len());

    if args.print_params {
        print_params(&params, &mut io::stdout().lock())?;
    }

    let datasets = params.require("dataset")?;
    let models = params.require("model")?;

    let modelspace = args
        .modelspace
        .clone()
        .or(resolution.config_name)
        .ok_or(CatfogError::MissingModelspace)?;
    info!("Config {}: {} dataset(s), {} model(s)", modelspace, datasets.len(), models.len());

    let emitter = ScriptEmitter::new(&tables, &modelspace, &args.output_dir);
    let report = emitter.emit(datasets, models)?;

    for chained in &report.chained {
        debug!("{} after weight extraction on {}: {}", chained.model, chained.dataset, chained.command);
    }
    info!(
        "Wrote {} model script(s) and {}",
        report.model_scripts.len(),
        report.dispatch_script.display()
    );

    Ok(Some(report))
}

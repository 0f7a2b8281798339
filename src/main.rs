mod cli;

use anyhow::{Context, Result};
use calikit::{generate, init_logging, output, Configuration, WriterSink, BUILD_DATE, VERSION};
use clap::Parser;
use cli::{Cli, Commands, Format, Mode};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.json, &args.log_level)?;
    debug!("calikit {} built {}", VERSION, BUILD_DATE);

    match args.cmd {
        Commands::Generate {
            config,
            output,
            stdout,
        } => run_generate(&config, output.as_deref(), stdout, args.json),
        Commands::Defaults { mode, format } => run_defaults(mode, format),
    }
}

fn run_generate(config_path: &Path, out: Option<&Path>, stdout: bool, json: bool) -> Result<()> {
    let config = Configuration::load_from_file(config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;
    info!(
        "Loaded {} calibration for {} firmware",
        config.calibration.short_name(),
        config.machine.firmware
    );

    let summary = if stdout {
        let handle = io::stdout().lock();
        let mut sink = WriterSink::new(io::BufWriter::new(handle));
        generate(&config, &mut sink).context("Failed to generate program")?
    } else {
        let path = output::resolve_output_path(&config, out);
        output::write_program(&config, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?
    };

    if json {
        let text = serde_json::to_string(&summary)?;
        eprintln!("{}", text);
    }
    Ok(())
}

fn run_defaults(mode: Mode, format: Format) -> Result<()> {
    let config = match mode {
        Mode::PressureAdvance => Configuration::pressure_advance_default(),
        Mode::Acceleration => Configuration::acceleration_default(),
    };
    let text = match format {
        Format::Toml => config.to_toml_string()?,
        Format::Json => serde_json::to_string_pretty(&config)?,
    };
    let mut out = io::stdout().lock();
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}

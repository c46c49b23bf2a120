use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use scoutplot::chart_export::{write_chart, write_chart_json};
use scoutplot::error_display::user_message_from_report;
use scoutplot::sheet::{list_sheets, read_upload};
use scoutplot::{
    describe, explore, export_size, AppConfig, Args, ConfigManager, ExploreRequest,
    ExploreSettings, APP_NAME,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        let path = config_manager.write_default_config(args.force)?;
        println!("Configuration file written to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

/// `--debug` wins, then RUST_LOG, then the config file level.
fn log_filter(args: &Args, config: &AppConfig) -> EnvFilter {
    if args.debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let format = args.output_format();
    if format.is_image() && args.output.is_none() {
        return Err(eyre!(
            "{} output needs a file: pass --output chart.{}",
            format.extension().to_uppercase(),
            format.extension()
        ));
    }

    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("A spreadsheet path is required"))?;
    let content = read_upload(path)?;

    if args.list_sheets {
        for name in list_sheets(&content)? {
            println!("{}", name);
        }
        return Ok(());
    }

    let request = ExploreRequest::from(args);
    let settings = ExploreSettings::from_args_and_config(args, config);

    if args.describe {
        println!("{}", describe(&content, &request, &settings)?);
        return Ok(());
    }

    let exploration = explore(&content, &request, &settings)?;
    info!(
        sheet = exploration.sheet.as_str(),
        rows = exploration.rows,
        target = exploration.target.as_deref().unwrap_or_default(),
        "chart built"
    );

    match &args.output {
        Some(output) => {
            write_chart(output, &exploration.chart, format, export_size(args, config)?)?;
            info!(path = %output.display(), "chart written");
        }
        None => write_chart_json(std::io::stdout().lock(), &exploration.chart)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(APP_NAME)?;
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&args, &config))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {}", user_message_from_report(&e, args.path.as_deref()));
        std::process::exit(1);
    }
    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod report;

const MODULES: &[&str] = &["common", "fio", "fio_basic", "default_plots"];

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, default_value_t = false)]
    no_progress: bool,
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered runs
    Ls {
        /// Folder holding the run directories
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        #[arg(short, long)]
        config_file: Option<PathBuf>,
    },
    /// Write per-run and combined summaries and plots
    Report {
        /// Folder holding the run directories
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        #[arg(short, long)]
        config_file: Option<PathBuf>,
        /// Output directory name, overrides the config
        #[arg(short, long)]
        output_dir: Option<String>,
        /// Do not generate plots
        #[arg(long, default_value_t = false)]
        skip_plot: bool,
    },
    /// Print the combined summary as csv
    Print {
        /// Folder holding the run directories
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        #[arg(short, long)]
        config_file: Option<PathBuf>,
    },
}

/// Whether a `-l` directive sets the level of `module` itself, not just a crate sharing its prefix
fn targets_module(directive: &str, module: &str) -> bool {
    directive
        .strip_prefix(module)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("fio_report={log_level}"));

    if !args.log.is_empty() {
        for log in &args.log {
            env_filter = env_filter.add_directive(log.parse()?);
        }
    }

    for module in MODULES {
        if !args.log.iter().any(|x| targets_module(x, module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    match args.command {
        Commands::Ls { root, config_file } => {
            let config = report::load_config(&root, config_file.as_deref()).await?;
            report::list_runs(&root, &config).await?
        }
        Commands::Report {
            root,
            config_file,
            output_dir,
            skip_plot,
        } => {
            let mut config = report::load_config(&root, config_file.as_deref()).await?;
            if let Some(output_dir) = output_dir {
                config.settings.output_dir = output_dir;
            }
            if let Err(err) = report::run_report(&root, &config, args.no_progress, skip_plot).await
            {
                error!("{err:#?}");
                return Err(err);
            }
        }
        Commands::Print { root, config_file } => {
            let config = report::load_config(&root, config_file.as_deref()).await?;
            report::print_summary(&root, &config).await?
        }
    };

    Ok(())
}

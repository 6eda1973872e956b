mod cli;
mod error_fmt;
mod watch;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE, json_mode};
use crate::watch::WatchOpts;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => report_and_exit(&err, 2),
    };
    init_tracing(&cli, &cfg.logging);

    if let Err(err) = run(&cli, &cfg) {
        report_and_exit(&err, error_fmt::exit_code_for_error(&err));
    }
}

fn run(cli: &Cli, cfg: &rigtel_config::Config) -> eyre::Result<()> {
    let calib_rows = match &cli.calibration {
        Some(path) => Some(
            rigtel_config::load_calibration_csv(path)
                .wrap_err_with(|| format!("loading calibration CSV {path:?}"))?,
        ),
        None => None,
    };

    match &cli.cmd {
        Commands::Watch {
            interval_ms,
            duration_s,
            simulate,
            port,
            baud,
            points,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            watch::run_watch(
                cfg,
                calib_rows.as_deref(),
                WatchOpts {
                    interval_ms: *interval_ms,
                    duration_s: *duration_s,
                    simulate: *simulate,
                    port: port.clone(),
                    baud: *baud,
                    points: *points,
                },
                shutdown,
            )
        }
        Commands::Ports => watch::run_ports(),
        Commands::SelfCheck => watch::run_self_check(cfg),
    }
}

fn load_config(cli: &Cli) -> eyre::Result<rigtel_config::Config> {
    let cfg = if cli.config.exists() {
        let text = std::fs::read_to_string(&cli.config)
            .wrap_err_with(|| format!("reading config {:?}", cli.config))?;
        rigtel_config::load_toml(&text)
            .map_err(|e| eyre::eyre!("parsing config {:?}: {}", cli.config, e))?
    } else {
        rigtel_config::Config::default()
    };
    cfg.validate()?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: &rigtel_config::Logging) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG wins; otherwise the --log-level flag (config level is the
    // fallback of last resort).
    let level = logging
        .level
        .clone()
        .filter(|_| cli.log_level == "info")
        .unwrap_or_else(|| cli.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs always go to stderr; stdout is reserved for readings.
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(console);

    if let Some(file) = &logging.file {
        let path = std::path::Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rigtel.log".to_string());
        let dir = dir.unwrap_or_else(|| std::path::Path::new("."));

        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            Some("never") | None => tracing_appender::rolling::never(dir, name),
            Some(other) => {
                eprintln!("unknown logging.rotation '{other}', defaulting to never");
                tracing_appender::rolling::never(dir, name)
            }
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        registry
            .with(fmt::layer().json().with_writer(writer).with_ansi(false))
            .init();
    } else {
        registry.init();
    }
}

fn report_and_exit(err: &eyre::Report, code: i32) -> ! {
    if json_mode() {
        eprintln!("{}", error_fmt::format_error_json(err));
    } else {
        eprintln!("{}", error_fmt::humanize(err));
    }
    std::process::exit(code);
}

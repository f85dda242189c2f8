use anyhow::Context;
use joigo::cli::init::{self, InitConfig, InitResult};
use joigo::cli::output::Output;
use joigo::cli::{commands, Cli, Commands};
use joigo::state::NoticeLevel;
use joigo::utils::config::LoggingConfig;
use joigo::{AppState, JoigoConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Commands::Init {
        path,
        force,
        api_url,
        supabase_url,
        currency,
    } = &cli.command
    {
        let result = init::run(
            InitConfig {
                path: path.clone(),
                force: *force,
                api_url: api_url.clone(),
                supabase_url: supabase_url.clone(),
                language: cli.language.unwrap_or_default(),
                currency: *currency,
            },
            &output,
        );
        if result != InitResult::Success {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut config = JoigoConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging, cli.verbose);
    if let Some(language) = cli.language {
        config.ui.language = language;
    }

    let app = AppState::from_config(config).context("Failed to start Joigo client")?;
    let mut notices = app.notifications.subscribe();

    let result = commands::execute(cli.command, &app, &output).await;

    let mut reported = false;
    while let Ok(notice) = notices.try_recv() {
        reported |= notice.level == NoticeLevel::Error;
        output.notice(&notice);
    }

    if let Err(e) = result {
        if !reported {
            output.error(&e.to_string());
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` wins
/// over the configured level.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose {
        "joigo=debug".to_string()
    } else {
        logging.level.clone()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

use std::{io::IsTerminal, time::Duration};

use anyhow::{Context, anyhow, bail};
use chrono::Local;
use citywx_core::{Config, Query, RequestState, View, WeatherController, provider_from_config};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::sync::watch;

use crate::render;

const SPINNER_TICK: Duration = Duration::from_millis(80);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citywx", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the default city.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Print the report as JSON instead of the panel.
        #[arg(long)]
        json: bool,
    },

    /// Look up cities one after another until Esc or Ctrl-C.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => show(&load_config()?, city, json).await,
            Command::Interactive => interactive(&load_config()?).await,
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    tracing::debug!(
        default_city = %config.default_city,
        base_url = %config.base_url,
        has_api_key = config.api_key.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    // Read the file only; an env override must not be persisted.
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let key = Password::new("OpenWeather API key (leave blank to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.api_key = Some(key.trim().to_string());
    }

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    let city = Query::parse(&city).map_err(|_| anyhow!("Default city must not be empty"))?;
    config.default_city = city.to_string();

    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(config: &Config, city: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut settings = config.controller_settings();
    if let Some(city) = city {
        let query = Query::parse(&city).map_err(|_| anyhow!("City name must not be empty"))?;
        settings.default_city = query.to_string();
    }
    if json {
        // Nothing is animated in JSON mode.
        settings.success_delay = Duration::ZERO;
    }

    let provider = provider_from_config(config)?;
    let mut controller = WeatherController::spawn(provider, settings);
    let mut rx = controller.subscribe();
    let query = controller.view().query;

    let view = wait_until_settled(&mut rx, &query, !json).await;
    controller.shutdown().await;
    let view = view?;

    match &view.state {
        RequestState::Ready(report) if json => {
            println!("{}", render::render_json(report).context("Failed to serialize report")?);
        }
        RequestState::Ready(_) => print_view(&view),
        RequestState::Failed(info) => {
            if json {
                let out = render::render_error_json(info).context("Failed to serialize error")?;
                println!("{out}");
            }
            bail!("{}", render::capitalize_words(&info.message))
        }
        RequestState::Idle | RequestState::Loading => {
            bail!("Weather lookup for {query} did not finish")
        }
    }

    Ok(())
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let mut controller = WeatherController::spawn(provider, config.controller_settings());
    let mut rx = controller.subscribe();

    let result = prompt_loop(&controller, &mut rx).await;
    controller.shutdown().await;
    result
}

async fn prompt_loop(
    controller: &WeatherController,
    rx: &mut watch::Receiver<View>,
) -> anyhow::Result<()> {
    let initial = controller.view().query;
    let view = wait_until_settled(rx, &initial, true).await?;
    print_view(&view);

    loop {
        let input = tokio::task::spawn_blocking(|| {
            Text::new("City:").with_placeholder("Enter your city…").prompt()
        })
        .await
        .context("Prompt task failed")?;

        let text = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(err) => return Err(err).context("Failed to read city"),
        };

        controller.submit_query(text.as_str())?;

        let view = match Query::parse(&text) {
            Ok(query) => wait_until_settled(rx, &query, true).await?,
            Err(_) => rx
                .wait_for(|v| v.shake)
                .await
                .context("Weather controller stopped unexpectedly")?
                .clone(),
        };
        print_view(&view);
    }
}

/// Waits until `query` is current and its lookup finished, drawing a spinner
/// on stderr meanwhile.
async fn wait_until_settled(
    rx: &mut watch::Receiver<View>,
    query: &Query,
    animate: bool,
) -> anyhow::Result<View> {
    let animate = animate && std::io::stderr().is_terminal();
    let mut ticker = tokio::time::interval(SPINNER_TICK);
    let mut tick = 0usize;

    loop {
        {
            let view = rx.borrow_and_update();
            if view.query == *query && view.state.is_settled() {
                if animate {
                    eprint!("\r\x1b[2K");
                }
                return Ok(view.clone());
            }
        }

        if animate {
            eprint!("\r\x1b[2K{}", render::render_loading(query, tick));
        }

        tokio::select! {
            changed = rx.changed() => changed.context("Weather controller stopped unexpectedly")?,
            _ = ticker.tick() => tick += 1,
        }
    }
}

fn print_view(view: &View) {
    let today = Local::now().date_naive();
    println!("{}\n", render::render_view(view, today, 0));
}

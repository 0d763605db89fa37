use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use earthcast_core::{
    AppState, City, CityStore, Config, EndpointId, GeocodingFetcher, StatePersistence,
    TomlStateFile, WeatherFetcher, dashboard,
};
use inquire::{Select, Text};
use std::sync::Arc;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "earthcast", version, about = "EarthCast weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current city and every saved city (the default).
    Home,

    /// List matching places for a query.
    Search { query: String },

    /// Look up a city and add it to the saved list.
    Add { name: String },

    /// Remove a city from the saved list.
    Remove { name: String },

    /// Detailed forecast for a saved city, a place name, or coordinates.
    Info {
        /// Place name; saved cities are matched first.
        name: Option<String>,

        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },

    /// Set the current city from a position.
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Edit endpoints and the client identification header.
    Configure,
}

/// Long-lived clients and stores shared by the commands.
struct App {
    geocoder: GeocodingFetcher,
    weather: Arc<WeatherFetcher>,
    store: CityStore,
    state_file: TomlStateFile,
}

impl App {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        let store = CityStore::open(config.database_path()?)?;
        tracing::debug!("Using city database {}", store.path().display());

        Ok(Self {
            geocoder: GeocodingFetcher::from_config(&config),
            weather: Arc::new(WeatherFetcher::from_config(&config)),
            store,
            state_file: TomlStateFile::default_location()?,
        })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Configure skips App::load so a broken config file can still be edited.
        match self.command.unwrap_or(Command::Home) {
            Command::Home => home(&App::load()?).await,
            Command::Search { query } => search(&App::load()?, &query).await,
            Command::Add { name } => add(&App::load()?, &name).await,
            Command::Remove { name } => remove(&App::load()?, &name),
            Command::Info { name, lat, lon } => info(&App::load()?, name, lat.zip(lon)).await,
            Command::Locate { lat, lon } => locate(&App::load()?, lat, lon).await,
            Command::Configure => configure(Config::load_repairable()?),
        }
    }
}

async fn home(app: &App) -> Result<()> {
    let mut state = app.state_file.load()?;

    if state.first_run {
        println!("Welcome to EarthCast!");
        println!(
            "Add a city with `earthcast add <name>` or set your position with `earthcast locate`.\n"
        );
        state.complete_welcome();
        app.state_file.save(&state)?;
    }

    if let Some(current) = &state.current_city {
        let city = City::new(
            current.name.clone(),
            f64::from(current.latitude),
            f64::from(current.longitude),
        );
        println!("Current location");
        dashboard::fetch_each(app.weather.clone(), vec![city], |cf| {
            println!("{}", render::card(&cf.summary()));
        })
        .await;
        println!();
    }

    let saved = app.store.list()?;
    if saved.is_empty() {
        println!("No saved cities yet.");
        return Ok(());
    }

    println!("Saved cities");
    dashboard::fetch_each(app.weather.clone(), saved, |cf| {
        println!("{}", render::card(&cf.summary()));
    })
    .await;

    Ok(())
}

async fn search(app: &App, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(());
    }

    let suggestions = app.geocoder.suggest(query).await;
    if suggestions.is_empty() {
        println!("No matches for '{query}'.");
    }
    for city in suggestions {
        println!("{}", city.display_name());
    }
    Ok(())
}

async fn add(app: &App, name: &str) -> Result<()> {
    match app.geocoder.search_by_name(name, &app.store).await {
        Some(city) => println!("{} fetched and stored", city.name),
        None => println!("City not found: {name}"),
    }
    Ok(())
}

fn remove(app: &App, name: &str) -> Result<()> {
    if app.store.delete(name)? {
        println!("Deleted {name}");
    } else {
        println!("{name} is not in the saved list");
    }
    Ok(())
}

async fn info(app: &App, name: Option<String>, coords: Option<(f64, f64)>) -> Result<()> {
    let (label, lat, lon) = match (name, coords) {
        (name, Some((lat, lon))) => (name.unwrap_or_else(|| "--".to_string()), lat, lon),
        (Some(name), None) => {
            let city = resolve_city(app, &name).await?;
            (city.name, city.latitude, city.longitude)
        }
        (None, None) => {
            let state = app.state_file.load()?;
            let current = state
                .current_city
                .ok_or_else(|| anyhow!("No current city. Pass a name or --lat/--lon."))?;
            (
                current.name,
                f64::from(current.latitude),
                f64::from(current.longitude),
            )
        }
    };

    match app.weather.fetch_forecast(lat, lon).await {
        Some(bundle) => print!("{}", render::info(&label, &bundle)),
        None => println!("No weather data for {label}"),
    }
    Ok(())
}

/// Saved city, current city, or a fresh (unsaved) lookup, in that order.
async fn resolve_city(app: &App, name: &str) -> Result<City> {
    if let Some(city) = app
        .store
        .list()?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
    {
        return Ok(city);
    }

    let state: AppState = app.state_file.load()?;
    if let Some(current) = state.current_city.filter(|c| c.name.eq_ignore_ascii_case(name)) {
        return Ok(City::new(
            current.name,
            f64::from(current.latitude),
            f64::from(current.longitude),
        ));
    }

    app.geocoder
        .try_search(name)
        .await
        .with_context(|| format!("Failed to look up '{name}'"))?
        .ok_or_else(|| anyhow!("City not found: {name}"))
}

async fn locate(app: &App, lat: f64, lon: f64) -> Result<()> {
    let Some(name) = app.geocoder.reverse_geocode(lat, lon).await else {
        println!("Could not find nearest city");
        return Ok(());
    };

    let mut state = app.state_file.load()?;
    state.set_current_city(name.clone(), lat, lon);
    app.state_file.save(&state)?;

    if let Some(bundle) = app.weather.fetch_forecast(lat, lon).await {
        let cf = dashboard::CityForecast {
            city: City::new(name.clone(), lat, lon),
            forecast: bundle,
        };
        println!("{}", render::card(&cf.summary()));
    }
    println!("Location updated: {name}");
    Ok(())
}

const USER_AGENT_CHOICE: &str = "user-agent";

fn configure(mut config: Config) -> Result<()> {
    let mut choices: Vec<&str> = EndpointId::all().iter().map(|id| id.as_str()).collect();
    choices.push(USER_AGENT_CHOICE);

    let choice = Select::new("What do you want to configure?", choices).prompt()?;

    if choice == USER_AGENT_CHOICE {
        let value = Text::new("User-Agent header:")
            .with_default(config.user_agent())
            .prompt()?;
        config.user_agent = Some(value.trim().to_string()).filter(|v| !v.is_empty());
    } else {
        let id = EndpointId::try_from(choice)?;
        let value = Text::new(&format!("URL for the {id} endpoint (empty to reset):"))
            .with_default(config.endpoint_url(id))
            .prompt()?;

        let value = value.trim();
        if value.is_empty() || value == id.default_url() {
            config.reset_endpoint(id);
        } else {
            config.set_endpoint_url(id, value.to_string());
        }
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use roster_sync::cache::CacheFactory;
use roster_sync::config::AppConfig;
use roster_sync::gateway::GatewayFactory;
use roster_sync::logging::init_tracing;
use roster_sync::roster::{LoadOutcome, RosterManager};
use roster_sync::validation::{validate_form, validate_into_input, RegistrationForm};

const DEFAULT_CONFIG: &str = "roster.yaml";

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Registrant roster with remote sync and offline cache")]
struct Args {
    /// Configuration file path (default: roster.yaml)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Log level (overrides config file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every registrant as JSON
    List,
    /// Print the number of registrants
    Count,
    /// Validate a registration form without submitting it
    Validate(FormArgs),
    /// Validate and register a new registrant
    Register(FormArgs),
    /// Remove a registrant by id
    Remove { id: u64 },
}

#[derive(clap::Args, Debug)]
struct FormArgs {
    /// Whole form as a JSON object; individual flags override its fields
    #[arg(long)]
    json: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Birth date as YYYY-MM-DD
    #[arg(long)]
    date_of_birth: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
}

impl FormArgs {
    fn into_form(self) -> Result<RegistrationForm, Box<dyn std::error::Error>> {
        let mut form = match &self.json {
            Some(raw) => RegistrationForm::from_json(&serde_json::from_str(raw)?),
            None => RegistrationForm::default(),
        };

        let overrides = [
            (&mut form.first_name, self.first_name),
            (&mut form.last_name, self.last_name),
            (&mut form.email, self.email),
            (&mut form.date_of_birth, self.date_of_birth),
            (&mut form.city, self.city),
            (&mut form.postal_code, self.postal_code),
        ];
        for (slot, value) in overrides {
            if value.is_some() {
                *slot = value;
            }
        }
        Ok(form)
    }
}

fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if path == DEFAULT_CONFIG && !Path::new(DEFAULT_CONFIG).exists() {
        eprintln!("No {} found, using default configuration:", DEFAULT_CONFIG);
        eprintln!("   - SQLite roster store at roster.db");
        eprintln!("   - SQLite cache at roster-cache.db");
        return Ok(AppConfig::default_config());
    }
    AppConfig::load_from_file(path)
        .map_err(|e| format!("Failed to load configuration: {}", e).into())
}

async fn open_roster(config: &AppConfig) -> Result<RosterManager, Box<dyn std::error::Error>> {
    let gateway = GatewayFactory::create(&config.gateway).await?;
    let cache = CacheFactory::create(&config.cache)?;
    let mut roster = RosterManager::new(gateway, cache).with_slot(config.cache.slot.clone());

    match roster.load().await {
        LoadOutcome::Synced { count } => info!(count, "roster ready"),
        LoadOutcome::Degraded {
            count,
            from_cache,
            failure,
        } => {
            eprintln!("Warning: {}", failure.message);
            eprintln!(
                "Working offline with {} registrant(s){}",
                count,
                if from_cache { " from cache" } else { "" }
            );
        }
    }
    Ok(roster)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(config.logging.level.as_str());
    init_tracing(level)?;

    match args.command {
        Command::List => {
            let roster = open_roster(&config).await?;
            print_json(&roster.registrants())?;
        }
        Command::Count => {
            let roster = open_roster(&config).await?;
            println!("{}", roster.count());
        }
        Command::Validate(form) => {
            let result = validate_form(&form.into_form()?);
            print_json(&result)?;
            if !result.is_valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Register(form) => {
            let form = form.into_form()?;
            let input = match validate_into_input(&form, Local::now().date_naive()) {
                Ok(input) => input,
                Err(result) => {
                    print_json(&result)?;
                    return Ok(ExitCode::FAILURE);
                }
            };

            let mut roster = open_roster(&config).await?;
            let result = roster.add(&input).await;
            print_json(&result.to_json())?;
            if !result.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Remove { id } => {
            let mut roster = open_roster(&config).await?;
            if let Err(failure) = roster.remove(id).await {
                eprintln!("{}", failure.message);
                return Ok(ExitCode::FAILURE);
            }
            println!("Removed registrant {}", id);
        }
    }

    Ok(ExitCode::SUCCESS)
}

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use runtime::{AppConfig, CliArgs, EntryMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use user_records::contract::model::{Field, RecordId, UserRecord};
use user_records::domain::dates::SystemClock;
use user_records::domain::form::SubmitOutcome;
use user_records::domain::list::{DeleteOutcome, FetchOutcome};
use user_records::domain::mode::EntryPoint;
use user_records::domain::ports::Confirmer;
use user_records::infra::http::TracedClient;
use user_records::UserRecords;

mod console;

use console::{prompt_line, AutoConfirmer, ConsoleNotifier, StdinConfirmer};

/// User Records - register, list, edit and delete user records
#[derive(Parser, Debug)]
#[command(name = "user-records")]
#[command(about = "User Records - register, list, edit and delete user records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the record store (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the gender options offered by the store
    Genders,
    /// Fetch and print all users
    List,
    /// Register a new user; missing values are asked for
    Register {
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit an existing user; without field flags every editable field is asked for
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a user after confirmation
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Values for the fields that stay editable after creation.
#[derive(Args, Debug, Default)]
struct FieldArgs {
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    about: Option<String>,
}

impl FieldArgs {
    fn into_values(self) -> Vec<(Field, Option<String>)> {
        vec![
            (Field::Dob, self.dob),
            (Field::Password, self.password),
            (Field::ConfirmPassword, self.confirm_password),
            (Field::Gender, self.gender),
            (Field::About, self.about),
        ]
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let assume_yes = matches!(cli.command, Some(Commands::Delete { yes: true, .. }));
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        base_url: cli.base_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
        assume_yes,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    let base_dir = std::env::current_dir().context("Failed to resolve working directory")?;
    runtime::logging::init_logging_from_config(&logging_config, &base_dir);
    tracing::info!("User Records starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let command = match cli.command {
        Some(command) => command,
        None => match config.ui.initial_mode {
            EntryMode::Create => Commands::Register {
                name: None,
                fields: FieldArgs::default(),
            },
            EntryMode::List => Commands::List,
        },
    };

    let app = build_app(&config, entry_point(&command))?;
    match command {
        Commands::Genders => genders(&app).await,
        Commands::List => list(&app).await,
        Commands::Register { name, fields } => register(&app, name, fields).await,
        Commands::Edit { id, fields } => edit(&app, RecordId::new(id), fields).await,
        Commands::Delete { id, .. } => delete(&app, RecordId::new(id)).await,
    }
}

fn entry_point(command: &Commands) -> EntryPoint {
    match command {
        Commands::Genders | Commands::Register { .. } => EntryPoint::Create,
        Commands::List | Commands::Edit { .. } | Commands::Delete { .. } => EntryPoint::List,
    }
}

fn build_app(config: &AppConfig, entry: EntryPoint) -> Result<UserRecords> {
    let base_url = config.api.base_url()?;
    let timeout = (config.api.timeout_sec > 0)
        .then(|| Duration::from_secs(config.api.timeout_sec));
    let client = TracedClient::with_timeout(timeout).context("Failed to build HTTP client")?;

    let confirmer: Arc<dyn Confirmer> = if config.ui.assume_yes {
        Arc::new(AutoConfirmer)
    } else {
        Arc::new(StdinConfirmer)
    };

    tracing::info!(base_url = %base_url, "Using record store");
    Ok(UserRecords::over_http(
        client,
        base_url,
        Arc::new(ConsoleNotifier),
        confirmer,
        Arc::new(SystemClock),
        entry,
    ))
}

async fn genders(app: &UserRecords) -> Result<()> {
    for gender in app.form().load_gender_options().await {
        println!("{gender}");
    }
    Ok(())
}

async fn list(app: &UserRecords) -> Result<()> {
    fetch(app).await?;
    print_records(&app.list().records());
    Ok(())
}

async fn register(app: &UserRecords, name: Option<String>, fields: FieldArgs) -> Result<()> {
    let form = app.form();
    form.start_create();
    let genders = form.load_gender_options().await;

    let mut values = vec![(Field::Name, name)];
    values.extend(fields.into_values());

    for (field, value) in values {
        let value = match value {
            Some(value) => value,
            None => prompt_line(&field_label(field, &genders)).await?,
        };
        form.on_field_change(field, &value)?;
    }

    submit(app).await
}

async fn edit(app: &UserRecords, id: RecordId, fields: FieldArgs) -> Result<()> {
    fetch(app).await?;
    if !app.list().begin_edit(&id, app.form())? {
        bail!("No user with id '{id}'");
    }
    let form = app.form();
    let genders = form.load_gender_options().await;

    let values = fields.into_values();
    let interactive = values.iter().all(|(_, value)| value.is_none());
    for (field, value) in values {
        let value = match value {
            Some(value) => value,
            None if interactive => {
                let current = form.draft().get(field).to_string();
                let label = match field {
                    Field::Password | Field::ConfirmPassword => {
                        format!("{} (empty keeps current)", field_label(field, &genders))
                    }
                    _ => format!("{} [{current}]", field_label(field, &genders)),
                };
                let answer = prompt_line(&label).await?;
                if answer.is_empty() {
                    continue;
                }
                answer
            }
            None => continue,
        };
        form.on_field_change(field, &value)?;
    }

    submit(app).await
}

async fn delete(app: &UserRecords, id: RecordId) -> Result<()> {
    fetch(app).await?;
    match app.list().delete_record(&id).await {
        DeleteOutcome::Deleted => {
            println!("User {id} deleted");
            Ok(())
        }
        DeleteOutcome::Declined => {
            println!("Delete cancelled");
            Ok(())
        }
        DeleteOutcome::NotFound => bail!("No user with id '{id}'"),
        DeleteOutcome::Busy => bail!("A delete for user '{id}' is already in progress"),
        DeleteOutcome::Failed => bail!("Delete failed"),
    }
}

async fn fetch(app: &UserRecords) -> Result<()> {
    match app.list().fetch_all().await {
        FetchOutcome::Loaded(count) => {
            tracing::debug!("Loaded {count} users");
            Ok(())
        }
        FetchOutcome::Failed => bail!("Could not load users"),
        other => bail!("User fetch did not complete: {other:?}"),
    }
}

async fn submit(app: &UserRecords) -> Result<()> {
    match app.form().on_submit().await {
        SubmitOutcome::Created => Ok(()),
        SubmitOutcome::Updated(record) => {
            print_records(std::slice::from_ref(&record));
            Ok(())
        }
        SubmitOutcome::Invalid => {
            let errors = app.form().errors();
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            bail!("{} field(s) are invalid", errors.len())
        }
        SubmitOutcome::Busy => bail!("A submission is already in progress"),
        SubmitOutcome::NotShown => bail!("The form is not open"),
        SubmitOutcome::Conflict | SubmitOutcome::Failed => {
            bail!("The record store rejected the request")
        }
    }
}

fn field_label(field: Field, genders: &[String]) -> String {
    match field {
        Field::Name => "Name".to_string(),
        Field::Age => "Age".to_string(),
        Field::Dob => "Date of Birth (YYYY-MM-DD)".to_string(),
        Field::Password => "Password".to_string(),
        Field::ConfirmPassword => "Confirm Password".to_string(),
        Field::Gender => format!("Gender ({})", genders.join("/")),
        Field::About => "About".to_string(),
    }
}

fn print_records(records: &[UserRecord]) {
    if records.is_empty() {
        println!("No users found");
        return;
    }
    println!(
        "{:<26} {:<24} {:>4} {:<10} {:<8}",
        "ID", "NAME", "AGE", "DOB", "GENDER"
    );
    for r in records {
        println!(
            "{:<26} {:<24} {:>4} {:<10} {:<8}",
            r.id.as_str(),
            r.name,
            r.age,
            r.dob.to_string(),
            r.gender
        );
    }
}

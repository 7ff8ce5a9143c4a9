//! CLI application for the polling-center locator database.

mod seed;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use votings_auth::{authenticate, register_user, Argon2Hasher, Registration};
use votings_db::config::DEFAULT_DATABASE_URL;
use votings_db::models::NewComment;
use votings_db::repository::{comments_for_center, insert_comment, nearest_polling_centers};
use votings_db::{DbConfig, DbPool, PollingCenter};
use votings_telemetry::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "votings")]
#[command(about = "Manage the polling-center locator database")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Database URL or path
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Log every SQL statement
    #[arg(long, global = true, env = "VOTINGS_ECHO")]
    echo: bool,

    /// Log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (json or pretty)
    #[arg(long, global = true, default_value = "json")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Import state polling hours from CSV
    ImportHours {
        /// CSV with state_name,state_abbrev,state_hours
        #[arg(long)]
        csv: String,
    },
    /// Import political parties from CSV
    ImportParties {
        /// CSV with political_party,political_party_abbr
        #[arg(long)]
        csv: String,
    },
    /// Import polling centers from CSV
    ImportCenters {
        /// CSV with lat,lng,hours_of_operation
        #[arg(long)]
        csv: String,
    },
    /// Register a user account
    Register {
        #[arg(long)]
        party_id: i64,
        #[arg(long)]
        state_id: i64,
        #[arg(long)]
        address: String,
        #[arg(long)]
        fname: String,
        #[arg(long)]
        lname: String,
        #[arg(long)]
        email: String,
        /// Plaintext password, hashed before storage
        #[arg(long, env = "VOTINGS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phonenum: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Check a user's credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VOTINGS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Post a comment on a polling center
    Comment {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        polling_id: i64,
        #[arg(long)]
        text: String,
    },
    /// List comments for a polling center as JSON
    Comments {
        #[arg(long)]
        polling_id: i64,
    },
    /// List the polling centers nearest to a point as JSON
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[derive(Serialize)]
struct NearbyCenter {
    #[serde(flatten)]
    center: PollingCenter,
    distance_km: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.log_level.as_deref(), cli.global.log_format)?;

    let db = connect_to_db(&cli.global).await?;

    match cli.command {
        Commands::Migrate => {}
        Commands::ImportHours { csv } => {
            let count = seed::import_polling_hours(&db, seed::open_csv(&csv)?).await?;
            println!("Imported {} polling hour rows", count);
        }
        Commands::ImportParties { csv } => {
            let count = seed::import_parties(&db, seed::open_csv(&csv)?).await?;
            println!("Imported {} parties", count);
        }
        Commands::ImportCenters { csv } => {
            let count = seed::import_polling_centers(&db, seed::open_csv(&csv)?).await?;
            println!("Imported {} polling centers", count);
        }
        Commands::Register {
            party_id,
            state_id,
            address,
            fname,
            lname,
            email,
            password,
            phonenum,
            lat,
            lng,
        } => {
            let registration = Registration {
                party_id,
                address,
                state: state_id,
                fname,
                lname,
                email,
                password,
                phonenum,
                lat,
                lng,
            };
            let user = register_user(&db, &Argon2Hasher::new(), registration).await?;
            println!("{}", user);
        }
        Commands::Login { email, password } => {
            match authenticate(&db, &Argon2Hasher::new(), &email, &password).await? {
                Some(user) => println!("Authenticated {}", user),
                None => {
                    warn!("Login failed");
                    anyhow::bail!("Invalid email or password");
                }
            }
        }
        Commands::Comment {
            user_id,
            polling_id,
            text,
        } => {
            let comment = insert_comment(
                &db,
                &NewComment {
                    user_id,
                    polling_id,
                    comment: text,
                },
            )
            .await?;
            println!("{}", comment);
        }
        Commands::Comments { polling_id } => {
            let comments = comments_for_center(&db, polling_id).await?;
            println!("{}", serde_json::to_string_pretty(&comments)?);
        }
        Commands::Nearest { lat, lng, limit } => {
            let nearby: Vec<NearbyCenter> = nearest_polling_centers(&db, lat, lng, limit)
                .await?
                .into_iter()
                .map(|(center, distance_km)| NearbyCenter {
                    center,
                    distance_km,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&nearby)?);
        }
    }

    Ok(())
}

/// Open the database and bring the schema up to date.
async fn connect_to_db(args: &GlobalArgs) -> anyhow::Result<DbPool> {
    let config = DbConfig::new(&args.database_url).with_echo(args.echo);
    let db = DbPool::connect(&config).await?;
    db.migrate().await?;
    info!("Database ready");
    Ok(db)
}

use std::io::Write;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oraclex::config::{DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DashboardConfig, DateSource, Variant, parse_date};
use oraclex::dashboard::{Dashboard, DashboardError, FeedPoll, Registration};
use oraclex::net::api::HttpOracleApi;
use oraclex::net::types::ApiError;
use oraclex::{render, shell};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error("registration rejected: {0}")]
    Rejected(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "oraclex", about = "Solar asset oracle dashboard")]
struct Cli {
    #[arg(long, env = "ORACLEX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// `polling` (audit log + today's result) or `push` (time-warp + live feed).
    #[arg(long, env = "ORACLEX_VARIANT", default_value = "polling")]
    variant: Variant,

    #[arg(long, env = "ORACLEX_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    timeout: u64,

    /// Override "today" (YYYY-MM-DD) for daily lookups.
    #[arg(long, env = "ORACLEX_TODAY", value_parser = parse_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered assets.
    List,
    /// Show one asset's detail view.
    Show {
        /// List position or bond id.
        bond: String,
        #[arg(long, default_value_t = false)]
        penalties: bool,
    },
    /// Follow an asset's live feed until Ctrl-C (push variant).
    Watch { bond: String },
    /// Register a new asset.
    Register(RegisterArgs),
    /// Submit today's production reading (push variant).
    Log { bond: String, actual_energy: String },
    /// Show an asset's penalty summary.
    Penalties { bond: String },
    /// Interactive session on stdin/stdout.
    Shell,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    capacity_kw: Option<String>,
    #[arg(long)]
    threshold: Option<String>,
    #[arg(long)]
    lat: Option<String>,
    #[arg(long)]
    lon: Option<String>,
    #[arg(long)]
    interest_rate: Option<String>,
    #[arg(long)]
    contract_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::new(cli.base_url, cli.variant);
    config.http_timeout = Duration::from_secs(cli.timeout);
    if let Some(today) = cli.today {
        config.dates = DateSource::Fixed(today);
    }

    let api = HttpOracleApi::new(&config.base_url, config.http_timeout)?;
    tracing::debug!(base_url = api.base_url(), variant = config.variant.as_str(), "starting");
    let mut dash = Dashboard::new(Box::new(api), config);
    dash.load_registry().await;

    let result = match cli.command {
        Command::List => {
            print!("{}", render::screen(&dash));
            Ok(())
        }
        Command::Show { bond, penalties } => run_show(&mut dash, &bond, penalties).await,
        Command::Watch { bond } => run_watch(&mut dash, &bond).await,
        Command::Register(args) => run_register(&mut dash, args).await,
        Command::Log { bond, actual_energy } => run_log(&mut dash, &bond, actual_energy).await,
        Command::Penalties { bond } => run_show(&mut dash, &bond, true).await,
        Command::Shell => run_shell(&mut dash).await,
    };
    dash.shutdown();
    result
}

async fn open_bond(dash: &mut Dashboard, key: &str) -> Result<(), CliError> {
    let bond_id = dash
        .registry
        .resolve(key)
        .map(|bond| bond.id.clone())
        .ok_or_else(|| DashboardError::UnknownBond(key.to_owned()))?;
    dash.select(&bond_id).await?;
    Ok(())
}

async fn run_show(dash: &mut Dashboard, key: &str, penalties: bool) -> Result<(), CliError> {
    open_bond(dash, key).await?;
    if penalties {
        dash.load_penalty_summary().await?;
    }
    dash.drain_feed();
    print!("{}", render::screen(dash));
    Ok(())
}

async fn run_watch(dash: &mut Dashboard, key: &str) -> Result<(), CliError> {
    if dash.variant() != Variant::Push {
        return Err(DashboardError::PushOnly.into());
    }
    open_bond(dash, key).await?;
    print!("{}", render::screen(dash));

    loop {
        let poll = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            poll = dash.poll_feed() => poll,
        };
        match poll {
            FeedPoll::Applied => print!("{}", render::screen(dash)),
            FeedPoll::Ignored => {}
            FeedPoll::Ended => {
                print!("{}", render::screen(dash));
                eprintln!("live feed closed by server");
                break;
            }
        }
    }
    Ok(())
}

async fn run_register(dash: &mut Dashboard, args: RegisterArgs) -> Result<(), CliError> {
    dash.open_registration();
    let fields = [
        ("name", Some(args.name)),
        ("capacity_kw", args.capacity_kw),
        ("threshold", args.threshold),
        ("lat", args.lat),
        ("lon", args.lon),
        ("interest_rate", args.interest_rate),
        ("contract_address", args.contract_address),
    ];
    if let Some(draft) = dash.draft.as_mut() {
        for (field, value) in fields {
            if let Some(value) = value {
                draft.set_field(field, &value).map_err(DashboardError::from)?;
            }
        }
    }

    match dash.submit_registration().await? {
        Registration::Created => {
            print!("{}", render::screen(dash));
            Ok(())
        }
        Registration::Rejected => {
            let alert = dash.ui.alert.take().unwrap_or_default();
            Err(CliError::Rejected(alert))
        }
    }
}

async fn run_log(dash: &mut Dashboard, key: &str, actual_energy: String) -> Result<(), CliError> {
    if dash.variant() != Variant::Push {
        return Err(DashboardError::PushOnly.into());
    }
    // A fresh socket has delivered nothing yet, so today's proof cannot be
    // inferred here; the shell's detail view shows it once the feed catches up.
    open_bond(dash, key).await?;
    dash.ui.manual_input = actual_energy;
    if dash.submit_manual_log().await? {
        println!("reading submitted");
    } else {
        println!("not a number; nothing sent");
    }
    Ok(())
}

async fn run_shell(dash: &mut Dashboard) -> Result<(), CliError> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    shell::run(dash, input, &mut out).await?;
    out.flush()?;
    Ok(())
}

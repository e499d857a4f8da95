//! CLI command definitions and dispatch.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use roomly_domain::{
    AnonymousReason, BootstrapOutcome, Endpoints, HotelSearchQuery, LoginCredentials,
    ReportPeriod, routes,
};
use roomly_infrastructure::{
    FileSessionStore, FlagStoreError, ReqwestTransport, RoomlyConfig, SystemClock,
};

use crate::app::Roomly;
use crate::error::AppError;
use crate::shell::{AppShell, route_allowed};

/// Roomly: command-line client for the hotel booking backend
#[derive(Debug, Parser)]
#[command(name = "roomly", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login(LoginArgs),
    /// Sign out and stop restoring the session on start
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Search hotels with availability
    Search(SearchArgs),
    /// Show the session state after the startup restore
    Status,
    /// Manage your hotels (requires HOTEL_MANAGER)
    Owner(OwnerArgs),
}

/// Arguments for `owner`
#[derive(Debug, Args)]
pub struct OwnerArgs {
    /// Owner console action
    #[command(subcommand)]
    pub command: OwnerCommand,
}

/// Owner console commands
#[derive(Debug, Subcommand)]
pub enum OwnerCommand {
    /// List your hotels
    Hotels,
    /// Show one hotel
    Hotel {
        /// Hotel id
        id: i64,
    },
    /// Make a hotel bookable
    Activate {
        /// Hotel id
        id: i64,
    },
    /// Stop taking bookings for a hotel
    Deactivate {
        /// Hotel id
        id: i64,
    },
    /// Bookings made at a hotel
    Bookings {
        /// Hotel id
        id: i64,
    },
    /// Booking and revenue report for a date range
    Report {
        /// Hotel id
        id: i64,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Rooms of a hotel
    Rooms {
        /// Hotel id
        id: i64,
    },
    /// Day-by-day inventory of a room
    Inventory {
        /// Room id
        room: i64,
    },
}

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,
    /// Account password
    #[arg(long)]
    pub password: String,
}

/// Arguments for `search`
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// City to search in
    #[arg(long)]
    pub city: String,
    /// Check-in date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,
    /// Check-out date (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,
    /// Number of rooms
    #[arg(long, default_value_t = 1)]
    pub rooms: u32,
}

impl Cli {
    /// Execute the CLI command against the configured backend.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, storage or backend failure.
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = RoomlyConfig::load(self.config.as_deref())?;
        tracing::debug!(base_url = %config.base_url, "configuration loaded");

        let transport = Arc::new(
            ReqwestTransport::new(config.base_url()?, &config.user_agent)?
                .with_timeout(config.request_timeout()),
        );
        let store = Arc::new(FileSessionStore::new(
            config.session_file().ok_or(FlagStoreError::NoConfigDir)?,
        ));
        if let Some(snapshot) = store.cookies().await?
            && let Err(error) = transport.import_cookies(&snapshot)
        {
            tracing::warn!(%error, "ignoring unreadable saved cookies");
        }

        let roomly = Roomly::assemble(
            transport.clone(),
            store.clone(),
            Arc::new(SystemClock::new()),
            Endpoints::default(),
        );
        let mut events = roomly.session.events().subscribe();
        let mut shell = AppShell::new(self.command.start_route());

        let mut output = Vec::new();
        let result = self.command.run(&roomly, &mut output).await;
        std::io::stdout().write_all(&output)?;

        shell.drain(&mut events);
        for notice in shell.notices() {
            eprintln!("{notice}");
        }
        store.save_cookies(transport.export_cookies()?).await?;
        result
    }
}

impl Commands {
    /// Route the command corresponds to in the web client.
    #[must_use]
    pub const fn start_route(&self) -> &'static str {
        match self {
            Self::Login(_) => routes::LOGIN,
            Self::Owner(_) => routes::OWNER_PREFIX,
            _ => routes::HOME,
        }
    }

    /// Run the command, writing human-readable output to `out`.
    ///
    /// Every command except `login` first waits for the startup restore.
    ///
    /// # Errors
    ///
    /// Returns backend and output failures.
    pub async fn run(&self, roomly: &Roomly, out: &mut impl Write) -> Result<(), AppError> {
        if !matches!(self, Self::Login(_)) {
            roomly.auto_login.run(self.start_route()).await;
        }

        match self {
            Self::Login(args) => {
                let credentials = LoginCredentials::new(&args.email, &args.password);
                let profile = roomly.auth.login(&credentials).await?;
                writeln!(out, "Signed in as {} <{}>", profile.name, profile.email)?;
            }
            Self::Logout => {
                roomly.auth.logout().await?;
                writeln!(out, "Signed out")?;
            }
            Self::Whoami => match roomly.auto_login.wait_ready().await {
                BootstrapOutcome::LoggedIn(profile) => {
                    writeln!(out, "{} <{}>", profile.name, profile.email)?;
                    if !profile.roles.is_empty() {
                        writeln!(out, "roles: {}", profile.roles.join(", "))?;
                    }
                }
                other => writeln!(out, "Not signed in ({})", describe(&other))?,
            },
            Self::Search(args) => {
                let query = HotelSearchQuery::new(&args.city, args.from, args.to, args.rooms)?;
                let hotels = roomly.bookings.search_hotels(&query).await?;
                print_json(out, &hotels)?;
            }
            Self::Status => {
                let outcome = roomly.auto_login.wait_ready().await;
                writeln!(out, "session: {}", describe(&outcome))?;
                if let Some(since) = roomly.session.established_at().await {
                    writeln!(out, "since: {}", since.to_rfc3339())?;
                }
                if let Some(token) = roomly.session.tokens().get().await {
                    writeln!(out, "token: {}", token.redacted())?;
                }
            }
            Self::Owner(args) => {
                if !route_allowed(self.start_route(), &roomly.session.state().await) {
                    return Err(AppError::Forbidden(
                        "the owner console requires the HOTEL_MANAGER role".to_string(),
                    ));
                }
                args.command.run(roomly, out).await?;
            }
        }
        Ok(())
    }
}

impl OwnerCommand {
    async fn run(&self, roomly: &Roomly, out: &mut impl Write) -> Result<(), AppError> {
        let owner = &roomly.owner;
        match self {
            Self::Hotels => print_json(out, &owner.hotels().await?)?,
            Self::Hotel { id } => print_json(out, &owner.hotel(*id).await?)?,
            Self::Activate { id } => {
                owner.activate_hotel(*id).await?;
                writeln!(out, "Hotel {id} activated")?;
            }
            Self::Deactivate { id } => {
                owner.deactivate_hotel(*id).await?;
                writeln!(out, "Hotel {id} deactivated")?;
            }
            Self::Bookings { id } => print_json(out, &owner.hotel_bookings(*id).await?)?,
            Self::Report { id, from, to } => {
                let period = ReportPeriod::new(*from, *to)?;
                print_json(out, &owner.hotel_report(*id, &period).await?)?;
            }
            Self::Rooms { id } => print_json(out, &owner.rooms(*id).await?)?,
            Self::Inventory { room } => print_json(out, &owner.room_inventory(*room).await?)?,
        }
        Ok(())
    }
}

fn print_json(out: &mut impl Write, value: &serde_json::Value) -> std::io::Result<()> {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    writeln!(out, "{rendered}")
}

fn describe(outcome: &BootstrapOutcome) -> String {
    match outcome {
        BootstrapOutcome::LoggedIn(profile) => format!("signed in as {}", profile.email),
        BootstrapOutcome::Skipped => "restore skipped".to_string(),
        BootstrapOutcome::Anonymous(AnonymousReason::LoggedOutFlag) => "logged out".to_string(),
        BootstrapOutcome::Anonymous(AnonymousReason::RefreshRejected(why)) => {
            format!("no session to restore: {why}")
        }
        BootstrapOutcome::Anonymous(AnonymousReason::ProfileUnavailable(why)) => {
            format!("profile unavailable: {why}")
        }
    }
}

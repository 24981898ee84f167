//! These structs provide the CLI interface for the carteira CLI.

use crate::model::{
    AnalyticsParams, GroupBy, Period, SearchParams, SearchPeriod, SheetType, SortDirection,
    SortKey,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// carteira: A command-line tool for personal finance spreadsheets.
///
/// The purpose of this program is to work with your financial spreadsheets
/// (investments, income and expenses) stored in the hosted carteira backend:
/// list and search them, compute chart-ready analytics, and rename,
/// duplicate or delete them.
///
/// Run `carteira init` first to point the tool at your backend.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. You will need the base URL
    /// of your hosted backend and the API key it gave you; both are
    /// validated before anything is written.
    Init(InitArgs),
    /// List sheets of one type, with optional search, period filter and sorting.
    List(ListArgs),
    /// Compute the four analytics series: cash flow, expenses by category,
    /// investment growth and goals vs actual.
    Analytics(AnalyticsArgs),
    /// Rename a sheet.
    Rename(RenameArgs),
    /// Duplicate a sheet, rows included.
    Duplicate(DuplicateArgs),
    /// Delete a sheet permanently.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// none, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where carteira configuration is held. Defaults to ~/carteira
    #[arg(long, env = "CARTEIRA_HOME", default_value_t = default_carteira_home())]
    carteira_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, carteira_home: PathBuf) -> Self {
        Self {
            log_level,
            carteira_home: carteira_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn carteira_home(&self) -> &DisplayPath {
        &self.carteira_home
    }
}

/// Args for the `carteira init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the hosted backend service, e.g.
    /// https://abcdefghijkl.supabase.co
    #[arg(long)]
    backend_url: String,

    /// The API key used to authenticate with the backend.
    #[arg(long)]
    api_key: String,
}

impl InitArgs {
    pub fn new(backend_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Args for the `carteira list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The type of sheets to list.
    #[arg(value_enum)]
    sheet_type: SheetType,

    /// Keep only sheets whose name contains this text (case-insensitive).
    #[arg(long)]
    query: Option<String>,

    /// Keep only sheets created in this month (1-12). Requires --year.
    #[arg(long, requires = "year")]
    month: Option<u32>,

    /// Keep only sheets created in this year. Requires --month.
    #[arg(long, requires = "month")]
    year: Option<i32>,

    /// Sort key. When omitted, sheets come most recently created first.
    #[arg(long, value_enum)]
    sort_by: Option<SortKey>,

    /// Sort direction, used together with --sort-by.
    #[arg(long, value_enum, default_value_t)]
    direction: SortDirection,
}

impl ListArgs {
    pub fn sheet_type(&self) -> SheetType {
        self.sheet_type
    }

    /// Converts the CLI flags into the service-layer search parameters.
    pub fn search_params(&self) -> SearchParams {
        let period = match (self.month, self.year) {
            (Some(month), Some(year)) => SearchPeriod::Month { month, year },
            _ => SearchPeriod::All,
        };
        SearchParams {
            query: self.query.clone(),
            period,
            sort_by: self.sort_by,
            direction: self.direction,
        }
    }
}

/// Relative period windows accepted on the command line.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum PeriodArg {
    #[value(name = "6months")]
    #[serde(rename = "6months")]
    SixMonths,
    #[value(name = "1year")]
    #[serde(rename = "1year")]
    OneYear,
    #[default]
    #[value(name = "all")]
    #[serde(rename = "all")]
    All,
}

serde_plain::derive_display_from_serialize!(PeriodArg);
serde_plain::derive_fromstr_from_deserialize!(PeriodArg);

/// Args for the `carteira analytics` command.
#[derive(Debug, Parser, Clone)]
pub struct AnalyticsArgs {
    /// Relative window to analyze. Ignored when --start and --end are given.
    #[arg(long, value_enum, default_value_t)]
    period: PeriodArg,

    /// Start of an explicit date range (YYYY-MM-DD). Requires --end.
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// End of an explicit date range (YYYY-MM-DD). Requires --start.
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// How to bucket the data. Only 'month' produces a time axis.
    #[arg(long, value_enum, default_value_t)]
    group_by: GroupBy,
}

impl AnalyticsArgs {
    /// Converts the CLI flags into the service-layer analytics parameters.
    pub fn params(&self) -> AnalyticsParams {
        let period = match (self.start, self.end) {
            (Some(start), Some(end)) => Period::Range { start, end },
            _ => match self.period {
                PeriodArg::SixMonths => Period::SixMonths,
                PeriodArg::OneYear => Period::OneYear,
                PeriodArg::All => Period::All,
            },
        };
        AnalyticsParams {
            period,
            group_by: self.group_by,
        }
    }
}

/// Args for the `carteira rename` command.
#[derive(Debug, Parser, Clone)]
pub struct RenameArgs {
    /// The id of the sheet to rename.
    id: String,

    /// The new name for the sheet.
    name: String,
}

impl RenameArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `carteira duplicate` command.
#[derive(Debug, Parser, Clone)]
pub struct DuplicateArgs {
    /// The id of the sheet to duplicate.
    id: String,
}

impl DuplicateArgs {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `carteira delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the sheet to delete.
    id: String,

    /// Confirm the deletion. Without this flag nothing is deleted.
    #[arg(long)]
    yes: bool,
}

impl DeleteArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

fn default_carteira_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("carteira"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --carteira-home or CARTEIRA_HOME instead of relying on the \
                default carteira home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("carteira")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

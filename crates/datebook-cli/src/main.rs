//! `datebook` CLI: manage recurring tasks and events from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # A one-off task (tasks are points in time)
//! datebook add "Call bank" --start "2024-03-05 09:00"
//!
//! # A weekly event for the next year
//! datebook add "Yoga" --start "2024-03-05 18:00" --end "2024-03-05 19:00" --every 1 --unit week
//!
//! # Every other Friday
//! datebook add "Payroll" --start "2024-03-05 10:00" --on fri --every-other
//!
//! # What's on a given day, or the next two weeks
//! datebook day 2024-03-08
//! datebook agenda --from 2024-03-04 --days 14
//!
//! # Drop this and all later occurrences of a series
//! datebook delete <ID> --scope future
//!
//! # Round-trip through iCalendar
//! datebook export -o backup.ics
//! datebook --calendar Home import -i backup.ics
//! ```

mod config;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datebook_core::civil;
use datebook_core::{
    CalendarDirectory, CivilDateTime, Datebook, DeleteScope, IntervalUnit, JsonFileStore,
    NewOccurrence, Occurrence, OccurrenceEdit, OccurrenceKind, RecurrenceRule, SortMode,
    WeekdayOrdinal,
};

const DEFAULT_LOG_FILTER: &str = "datebook=warn,datebook_core=warn";

#[derive(Parser)]
#[command(
    name = "datebook",
    version,
    about = "Recurring tasks and events in a local datebook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.config/datebook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the calendar files
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Calendar to operate on
    #[arg(long, global = true)]
    calendar: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task or event, optionally repeating
    Add {
        title: String,
        /// Start as "YYYY-MM-DD HH:MM" (or "YYYY-MM-DD" for midnight)
        #[arg(long)]
        start: String,
        /// End of an event; implies --kind event
        #[arg(long)]
        end: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Group name or id (defaults to the first group by name)
        #[arg(long)]
        group: Option<String>,
        /// Repeat every N units
        #[arg(long, conflicts_with = "on")]
        every: Option<String>,
        /// Unit for --every
        #[arg(long, value_enum, conflicts_with = "on")]
        unit: Option<UnitArg>,
        /// Repeat on this weekday (mon..sun)
        #[arg(long, value_parser = parse_weekday)]
        on: Option<Weekday>,
        /// With --on, only every second such weekday
        #[arg(long, requires = "on")]
        every_other: bool,
    },
    /// Change a single occurrence
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete an occurrence, or part of its series
    Delete {
        id: String,
        #[arg(long, value_enum, default_value = "this")]
        scope: ScopeArg,
    },
    /// Flip an occurrence between done and not done
    Toggle { id: String },
    /// Refile an occurrence under another group
    Move { id: String, group: String },
    /// List what falls on one day (defaults to today)
    Day { date: Option<String> },
    /// List each day of a range
    Agenda {
        /// First day (defaults to today)
        #[arg(long)]
        from: Option<String>,
        /// Last day, inclusive
        #[arg(long, conflicts_with = "days")]
        to: Option<String>,
        /// Number of days to show
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Show occurrences grouped into columns
    Board,
    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommand),
    /// Manage named calendars
    #[command(subcommand)]
    Calendar(CalendarCommand),
    /// Append events from an iCalendar file
    Import {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Write the calendar as iCalendar
    Export {
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
enum GroupCommand {
    List,
    Add {
        name: String,
        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },
    Edit {
        /// Group name or id
        group: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a group; its items become unassigned
    Delete { group: String },
    /// Set how the group's board column is ordered
    Sort {
        group: String,
        #[arg(value_enum)]
        mode: SortArg,
    },
}

#[derive(Subcommand)]
enum CalendarCommand {
    List,
    Create { name: String },
    Delete { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Task,
    Event,
}

impl From<KindArg> for OccurrenceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Task => OccurrenceKind::Task,
            KindArg::Event => OccurrenceKind::Event,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Day,
    Week,
    Month,
    Year,
}

impl From<UnitArg> for IntervalUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Day => IntervalUnit::Day,
            UnitArg::Week => IntervalUnit::Week,
            UnitArg::Month => IntervalUnit::Month,
            UnitArg::Year => IntervalUnit::Year,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    This,
    Future,
    All,
}

impl From<ScopeArg> for DeleteScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::This => DeleteScope::ThisOnly,
            ScopeArg::Future => DeleteScope::ThisAndFuture,
            ScopeArg::All => DeleteScope::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Date,
    Alpha,
}

impl From<SortArg> for SortMode {
    fn from(mode: SortArg) -> Self {
        match mode {
            SortArg::Date => SortMode::ByDate,
            SortArg::Alpha => SortMode::Alphabetical,
        }
    }
}

/// Resolved locations for this invocation.
struct Session {
    calendars: CalendarDirectory,
    calendar: String,
}

impl Session {
    fn open(&self) -> Result<Datebook<JsonFileStore>> {
        let store = self
            .calendars
            .open(&self.calendar)
            .with_context(|| format!("Failed to open calendar '{}'", self.calendar))?;
        Datebook::open(store)
            .with_context(|| format!("Failed to load calendar '{}'", self.calendar))
    }
}

/// Initialize tracing on stderr so stdout stays clean for listings and exports
fn init_tracing(configured: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .ok()
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    init_tracing(config.log_filter.as_deref());

    let data_dir = match &cli.data_dir {
        Some(dir) => config::expand_path(dir),
        None => config.data_dir()?,
    };
    let ctx = Session {
        calendars: CalendarDirectory::new(data_dir),
        calendar: cli
            .calendar
            .clone()
            .unwrap_or_else(|| config.calendar().to_string()),
    };
    tracing::debug!(dir = %ctx.calendars.dir().display(), calendar = %ctx.calendar, "resolved calendar");

    match cli.command {
        Commands::Add {
            title,
            start,
            end,
            kind,
            group,
            every,
            unit,
            on,
            every_other,
        } => {
            let mut book = ctx.open()?;
            let start = parse_timestamp(&start)?;
            let end = end.as_deref().map(parse_timestamp).transpose()?;
            let kind = match (kind, end) {
                (Some(kind), _) => kind.into(),
                (None, Some(_)) => OccurrenceKind::Event,
                (None, None) => OccurrenceKind::Task,
            };

            let recurrence = match (on, every, unit) {
                (Some(weekday), _, _) => {
                    let ordinal = if every_other {
                        WeekdayOrdinal::EveryOther
                    } else {
                        WeekdayOrdinal::Every
                    };
                    Some(RecurrenceRule::weekday(ordinal, weekday))
                }
                (None, None, None) => None,
                (None, every, unit) => Some(RecurrenceRule::interval_from_input(
                    every.as_deref().unwrap_or("1"),
                    unit.map_or(IntervalUnit::Day, IntervalUnit::from),
                )),
            };

            let group_id = group
                .as_deref()
                .map(|g| resolve_group(&book, g))
                .transpose()?;
            let new = NewOccurrence {
                title,
                kind,
                group_id,
                start,
                end: end.unwrap_or(start),
                recurrence,
            };

            let ids = book.create(new)?;
            book.save().context("Failed to save calendar")?;
            if ids.len() == 1 {
                println!("Created {}", ids[0]);
            } else {
                println!("Created {} occurrences (first: {})", ids.len(), ids[0]);
            }
        }
        Commands::Edit {
            id,
            title,
            kind,
            group,
            start,
            end,
        } => {
            let mut book = ctx.open()?;
            let edit = OccurrenceEdit {
                title,
                kind: kind.map(OccurrenceKind::from),
                group_id: group
                    .as_deref()
                    .map(|g| resolve_group(&book, g))
                    .transpose()?,
                start: start.as_deref().map(parse_timestamp).transpose()?,
                end: end.as_deref().map(parse_timestamp).transpose()?,
            };
            if edit.is_empty() {
                bail!("Nothing to change. Pass at least one of --title, --kind, --group, --start, --end");
            }
            if !book.edit(&id, &edit)? {
                bail!("No item with id '{}'", id);
            }
            book.save().context("Failed to save calendar")?;
            println!("Updated {}", id);
        }
        Commands::Delete { id, scope } => {
            let mut book = ctx.open()?;
            let removed = book.delete(&id, scope.into());
            if removed == 0 {
                bail!("No item with id '{}'", id);
            }
            book.save().context("Failed to save calendar")?;
            println!("Deleted {} item(s)", removed);
        }
        Commands::Toggle { id } => {
            let mut book = ctx.open()?;
            let Some(done) = book.toggle_completed(&id) else {
                bail!("No item with id '{}'", id);
            };
            book.save().context("Failed to save calendar")?;
            println!("{} is now {}", id, if done { "done" } else { "not done" });
        }
        Commands::Move { id, group } => {
            let mut book = ctx.open()?;
            let group_id = resolve_group(&book, &group)?;
            if !book.move_to_group(&id, &group_id)? {
                bail!("No item with id '{}'", id);
            }
            book.save().context("Failed to save calendar")?;
            println!("Moved {} to {}", id, book.group_name(&group_id));
        }
        Commands::Day { date } => {
            let book = ctx.open()?;
            let date = parse_day_or_today(date.as_deref())?;
            println!("{}", date.format("%A, %B %-d, %Y"));
            let items = book.day(date);
            if items.is_empty() {
                println!("  Nothing scheduled");
            }
            for occ in items {
                println!("  {}", format_line(occ));
            }
        }
        Commands::Agenda { from, to, days } => {
            let book = ctx.open()?;
            let from = parse_day_or_today(from.as_deref())?;
            let to = match to {
                Some(to) => parse_day(&to)?,
                None => civil::add_days(from, i64::from(days.max(1)) - 1)
                    .context("Agenda range is out of bounds")?,
            };
            for day in book.agenda(from, to) {
                println!("{} {}", weekday_abbrev(day.date.weekday()), day.date);
                for occ in day.occurrences {
                    println!("  {}", format_line(occ));
                }
            }
        }
        Commands::Board => {
            let book = ctx.open()?;
            for column in book.board() {
                println!("{} ({})", column.name, column.color);
                for occ in column.items {
                    let mark = if occ.completed { "x" } else { " " };
                    println!("  [{}] {} {}  {}", mark, occ.start, occ.title, occ.id);
                }
            }
        }
        Commands::Group(command) => run_group(&ctx, command)?,
        Commands::Calendar(command) => run_calendar(&ctx, command)?,
        Commands::Import { input } => {
            let mut book = ctx.open()?;
            let content = read_input(input.as_deref())?;
            let count = book
                .import_ics(&content)
                .context("Failed to import iCalendar data")?;
            book.save().context("Failed to save calendar")?;
            println!("Imported {} item(s)", count);
        }
        Commands::Export { output } => {
            let book = ctx.open()?;
            write_output(output.as_deref(), &book.export_ics())?;
        }
    }

    Ok(())
}

fn run_group(ctx: &Session, command: GroupCommand) -> Result<()> {
    let mut book = ctx.open()?;
    match command {
        GroupCommand::List => {
            for group in book.groups() {
                println!(
                    "{}  {}  {}  sort={}",
                    group.id,
                    group.display_color(),
                    group.name,
                    group.sort_mode.as_str()
                );
            }
            return Ok(());
        }
        GroupCommand::Add { name, color } => {
            let id = book.add_group(&name, color.as_deref())?;
            println!("Created group {}", id);
        }
        GroupCommand::Edit { group, name, color } => {
            let id = resolve_group(&book, &group)?;
            book.update_group(&id, name.as_deref(), color.as_deref())?;
            println!("Updated group {}", id);
        }
        GroupCommand::Delete { group } => {
            let id = resolve_group(&book, &group)?;
            book.delete_group(&id);
            println!("Deleted group {}", id);
        }
        GroupCommand::Sort { group, mode } => {
            let id = resolve_group(&book, &group)?;
            book.set_sort_mode(&id, mode.into());
            println!("Group {} now sorts by {}", id, SortMode::from(mode).as_str());
        }
    }
    book.save().context("Failed to save calendar")
}

fn run_calendar(ctx: &Session, command: CalendarCommand) -> Result<()> {
    match command {
        CalendarCommand::List => {
            for name in ctx.calendars.list()? {
                let marker = if name == ctx.calendar { "*" } else { " " };
                println!("{} {}", marker, name);
            }
        }
        CalendarCommand::Create { name } => {
            ctx.calendars.create(&name)?;
            println!("Created calendar '{}'", name.trim());
        }
        CalendarCommand::Delete { name } => {
            ctx.calendars.delete(&name)?;
            println!("Deleted calendar '{}'", name);
        }
    }
    Ok(())
}

/// A group id, or the id of the group with that exact name.
fn resolve_group<S: datebook_core::ItemStore>(book: &Datebook<S>, reference: &str) -> Result<String> {
    if let Some(group) = book.group(reference).or_else(|| book.group_by_name(reference)) {
        return Ok(group.id.clone());
    }
    let known: Vec<&str> = book.groups().iter().map(|g| g.name.as_str()).collect();
    bail!(
        "Unknown group: '{}'. Available groups: {}",
        reference,
        known.join(", ")
    )
}

/// Tasks render as `• HH:MM Title`, events as `Title (HH:MM - HH:MM)`.
fn format_line(occ: &Occurrence) -> String {
    let line = match occ.kind {
        OccurrenceKind::Task => format!("• {} {}", occ.start.clock(), occ.title),
        OccurrenceKind::Event => format!(
            "{} ({} - {})",
            occ.title,
            occ.start.clock(),
            occ.end.clock()
        ),
    };
    let done = if occ.completed { " [done]" } else { "" };
    format!("{}{}  {}", line, done, occ.id)
}

fn parse_timestamp(text: &str) -> Result<CivilDateTime> {
    CivilDateTime::parse(text)
        .or_else(|| civil::parse_date(text).map(CivilDateTime::start_of_day))
        .with_context(|| {
            format!(
                "Invalid time '{}': expected \"YYYY-MM-DD HH:MM\" or \"YYYY-MM-DD\"",
                text
            )
        })
}

fn parse_day(text: &str) -> Result<NaiveDate> {
    civil::parse_date(text)
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", text))
}

fn parse_day_or_today(text: Option<&str>) -> Result<NaiveDate> {
    match text {
        Some(text) => parse_day(text),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn parse_weekday(text: &str) -> std::result::Result<Weekday, String> {
    text.parse::<Weekday>()
        .map_err(|_| format!("'{}' is not a weekday (mon, tue, ... sun)", text))
}

fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use pomoplan_core::{
    Clock, FixedClock, PlanManager, PlanOutcome, PlanParams, Preference, Schedule, Scheduler,
    SystemClock, day_views, next_pending, parse_date, progress_on,
};
use pomoplan_ingest::load_topics;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod calendar;
mod config;
mod extract;
mod state;
mod timer_cmd;

use config::{Config, load_config};
use state::JsonFileStore;
use timer_cmd::TimerCommand;

#[derive(Parser, Debug)]
#[command(
    name = "pomoplan",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("POMOPLAN_BUILD_INFO"), ")"),
    about = "Turn a syllabus into a Pomodoro study plan"
)]
struct Cli {
    /// Plan owner (defaults to config [planner].owner)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new study plan from a topics file (replaces any existing plan)
    Plan {
        /// Topics file (.json extraction output, .csv, or markdown outline)
        #[arg(long)]
        topics: PathBuf,

        /// Exam date (YYYY-MM-DD)
        #[arg(long)]
        exam: String,

        #[command(flatten)]
        opts: PlanOpts,
    },

    /// Regenerate the plan with edited parameters, keeping completed topics
    Replan {
        /// New topics file (defaults to the stored topics)
        #[arg(long)]
        topics: Option<PathBuf>,

        /// New exam date (defaults to the stored one)
        #[arg(long)]
        exam: Option<String>,

        #[command(flatten)]
        opts: PlanOpts,
    },

    /// Print the plan grouped by day
    Show {
        /// Only this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Print the raw task JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Today's progress and next session
    Today {
        #[arg(long)]
        today: Option<String>,
    },

    /// Mark a task completed (index as shown by `show`, or every task with a label)
    Complete {
        #[arg(required_unless_present = "label")]
        index: Option<usize>,

        #[arg(long, conflicts_with_all = ["index", "undo"])]
        label: Option<String>,

        /// Mark it not completed instead
        #[arg(long, default_value_t = false)]
        undo: bool,
    },

    /// Export the plan as an ICS calendar
    ExportIcs {
        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// IANA timezone (defaults to config [calendar].timezone)
        #[arg(long)]
        tz: Option<String>,
    },

    /// Upload a syllabus to the extraction service and print its topics
    Extract {
        #[arg(long)]
        file: PathBuf,

        /// Override config [extraction].url
        #[arg(long)]
        url: Option<String>,

        /// Write topics JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Pomodoro timer for a single task
    Timer {
        #[command(subcommand)]
        command: TimerCommand,
    },

    /// Manage ~/.pomoplan/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(clap::Args, Debug)]
struct PlanOpts {
    /// Study hours per day (1-12)
    #[arg(long)]
    hours: Option<f64>,

    /// morning (08:00) or afternoon (14:00)
    #[arg(long)]
    preference: Option<Preference>,

    /// Plan as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    today: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective configuration
    Show,
}

type Manager = PlanManager<JsonFileStore, FixedClock>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let cfg = load_config()?;
    let owner = cli.owner.clone().unwrap_or_else(|| cfg.planner.owner.clone());

    match cli.command {
        Command::Plan { topics, exam, opts } => {
            let mut m = manager(&cfg, opts.today.as_deref())?;
            let params = PlanParams {
                topics: load_topics(&topics)?,
                exam_date: parse_date(&exam)?,
                study_hours_per_day: opts.hours.unwrap_or(cfg.planner.hours_per_day),
                preference: opts.preference.unwrap_or(cfg.planner.preference),
            };
            let out = m.generate(&owner, params)?;
            report(&out, false);
        }

        Command::Replan { topics, exam, opts } => {
            let mut m = manager(&cfg, opts.today.as_deref())?;
            let prev = m.load(&owner).context("nothing to replan; run `pomoplan plan` first")?;
            let params = PlanParams {
                topics: match topics {
                    Some(p) => load_topics(&p)?,
                    None => prev.params.topics,
                },
                exam_date: match exam {
                    Some(e) => parse_date(&e)?,
                    None => prev.params.exam_date,
                },
                study_hours_per_day: opts.hours.unwrap_or(prev.params.study_hours_per_day),
                preference: opts.preference.unwrap_or(prev.params.preference),
            };
            let out = m.replan(&owner, params)?;
            report(&out, true);
        }

        Command::Show { date, json } => {
            let m = manager(&cfg, None)?;
            let plan = m.load(&owner)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan.tasks)?);
            } else {
                let only = date.as_deref().map(parse_date).transpose()?;
                print_schedule(&plan.tasks, only);
            }
        }

        Command::Today { today } => {
            let m = manager(&cfg, today.as_deref())?;
            let day = resolve_today(today.as_deref())?;
            let plan = m.load(&owner)?;
            print_today(&plan.tasks, day);
        }

        Command::Complete { index, label, undo } => {
            let mut m = manager(&cfg, None)?;
            if let Some(label) = label {
                let n = m.complete_label(&owner, &label)?;
                println!("Marked {n} task(s) labeled '{label}' completed");
            } else if let Some(index) = index {
                let plan = m.set_completed(&owner, index, !undo)?;
                if let Some(t) = plan.tasks.get(index) {
                    let mark = if t.completed { "x" } else { " " };
                    println!("[{mark}] {} {} {}", t.date, t.start_display(), t.label);
                }
            }
        }

        Command::ExportIcs { out, tz } => {
            let m = manager(&cfg, None)?;
            let plan = m.load(&owner)?;
            let tz = tz.unwrap_or_else(|| cfg.calendar.timezone.clone());
            let events = calendar::schedule_to_events(
                &plan.tasks,
                &tz,
                &cfg.calendar.event_prefix,
                cfg.calendar.skip_breaks,
            )?;
            let ics = calendar::events_to_ics(&events);
            match out {
                Some(p) => {
                    std::fs::write(&p, ics).with_context(|| format!("write {}", p.display()))?;
                    println!("Wrote {} events to {}", events.len(), p.display());
                }
                None => print!("{ics}"),
            }
        }

        Command::Extract { file, url, out } => {
            let mut section = cfg.extraction.clone();
            if let Some(u) = url {
                section.url = u;
            }
            let topics = extract::extract_topics(&section, &file).await?;
            if topics.is_empty() {
                bail!("extraction service found no topics in {}", file.display());
            }
            let json = serde_json::to_string_pretty(&topics)?;
            match out {
                Some(p) => {
                    std::fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
                    println!("Wrote {} topics to {}", topics.len(), p.display());
                }
                None => println!("{json}"),
            }
        }

        Command::Timer { command } => {
            let mut m = manager(&cfg, None)?;
            timer_cmd::run(command, &mut m, &owner, &state::session_path()?, Utc::now())?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default = if verbose {
        "pomoplan_cli=debug,pomoplan_core=debug,pomoplan_ingest=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr so `export-ics` / `show --json` stay pipeable.
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn resolve_today(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(SystemClock.today()),
    }
}

fn manager(cfg: &Config, today: Option<&str>) -> Result<Manager> {
    let scheduler = Scheduler::new(cfg.pomodoro).context("config [pomodoro]")?;
    Ok(
        PlanManager::new(JsonFileStore::open_default()?, FixedClock(resolve_today(today)?))
            .with_scheduler(scheduler)
            .with_policy(cfg.policy()),
    )
}

fn summary_line(out: &PlanOutcome, replanned: bool) -> String {
    let tasks = &out.plan.tasks;
    let focus = tasks.iter().filter(|t| t.is_focus()).count();
    let days = tasks.by_date().len();
    if replanned {
        format!(
            "Replanned {focus} sessions over {days} day(s) ({} carried over as completed)",
            tasks.completed_count()
        )
    } else {
        format!("Generated {focus} sessions over {days} day(s)")
    }
}

fn report(out: &PlanOutcome, replanned: bool) {
    let tasks = &out.plan.tasks;
    println!("{}", summary_line(out, replanned));
    if let (Some(first), Some(last)) = (tasks.first_date(), tasks.last_date()) {
        println!("Study days: {first} .. {last}; exam {}", out.plan.params.exam_date);
    }
    for w in &out.warnings {
        eprintln!("warning: {w}");
    }
}

fn print_schedule(schedule: &Schedule, only: Option<NaiveDate>) {
    if schedule.is_empty() {
        println!("No study plan generated yet.");
        return;
    }
    for day in day_views(schedule) {
        if only.is_some_and(|d| d != day.date) {
            continue;
        }
        println!(
            "## {} ({}/{} done, {} min focus)",
            day.date, day.completed, day.total(), day.focus_minutes
        );
        for (i, t) in &day.tasks {
            let mark = if t.completed { "x" } else { " " };
            println!(
                "{i:>4} [{mark}] {}-{}  {}",
                t.start_display(),
                t.end_display(),
                t.label
            );
        }
        println!();
    }
}

fn print_today(schedule: &Schedule, day: NaiveDate) {
    let p = progress_on(schedule, day);
    println!("# {day}");
    println!("Tasks completed: {} / {}", p.completed, p.total);
    println!("Study time: {:.2} hours", p.study_hours());
    match next_pending(schedule, day) {
        Some((i, t)) => println!(
            "Next: #{i} {} {} ({} min)",
            t.start_display(),
            t.label,
            t.duration_minutes
        ),
        None if p.total == 0 => println!("Nothing scheduled today."),
        None => println!("All done for today."),
    }
}

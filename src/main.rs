use chrono::Datelike;
use clap::{Parser, Subcommand};

use daybook::command::{Command, NoticeLevel, Outcome, dispatch};
use daybook::config::DaybookConfig;
use daybook::core::stats::{DayStatus, month_calendar};
use daybook::core::{DateKey, Identity, Section, TaskDraft};
use daybook::store::{JsonFileBackend, Store};

#[derive(Parser)]
#[command(name = "daybook", version, about = "Daily tasks, streaks and completion stats")]
struct Cli {
    /// Day to act on (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    date: Option<DateKey>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show the day's tasks by section
    Show,
    /// Add a task of your own
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        title: String,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a task done or not done
    Toggle { section: Section, task: String },
    /// Delete a task you added
    Delete { section: Section, task: String },
    /// Save the day's reflection
    Reflect { text: String },
    /// Day, week and month completion with the current streak
    Stats,
    /// The Sunday-start week around the day
    Week,
    /// Month-to-date summary and calendar
    Month,
    /// Write a JSON backup
    Export,
    /// Delete all stored data
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(config: &DaybookConfig) {
    // Logs go to the systemd user journal (`journalctl --user -t daybook -f`).
    // daybook records at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("daybook") {
                let max = if daybook::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    daybook::set_debug_logging(config.debug_logging);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("daybook".to_string()),
        Err(e) => {
            eprintln!("daybook: journal logging unavailable: {e}");
            return;
        }
    };
    if let Err(e) = log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })) {
        eprintln!("daybook: could not install logger: {e}");
        return;
    }
    // Global max must be Debug so daybook debug logs can pass through when toggled
    log::set_max_level(log::LevelFilter::Debug);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = DaybookConfig::load();
    init_logging(&config);

    config.ensure_directories()?;
    let backend = JsonFileBackend::new(config.snapshot_path());
    let mut store = Store::open(Box::new(backend)).with_streak_lookback(config.streak_lookback_days);
    let date = cli.date.unwrap_or_else(DateKey::today);

    match cli.command.unwrap_or(Cmd::Show) {
        Cmd::Show => {
            report(&dispatch(&mut store, date, Command::EnsureDay));
            print_day(&store, date);
        }
        Cmd::Add { category, title, time, description } => {
            let mut draft = TaskDraft::new(title, category);
            draft.time = time;
            draft.description = description;
            report(&dispatch(&mut store, date, Command::AddTask(draft)));
        }
        Cmd::Toggle { section, task } => {
            let Some(task) = resolve(&store, date, section, &task) else {
                return Ok(());
            };
            report(&dispatch(&mut store, date, Command::ToggleTask { section, task }));
        }
        Cmd::Delete { section, task } => {
            let Some(task) = resolve(&store, date, section, &task) else {
                return Ok(());
            };
            report(&dispatch(&mut store, date, Command::DeleteTask { section, task }));
        }
        Cmd::Reflect { text } => {
            report(&dispatch(&mut store, date, Command::SaveReflection(text)));
        }
        Cmd::Stats => {
            let outcome = dispatch(&mut store, date, Command::RefreshStats);
            report(&outcome);
            let s = outcome.stats;
            println!("Today:           {}%", s.today);
            println!("This week:       {}%", s.week);
            println!("This month:      {}%", s.month);
            println!("Current streak:  {} days", s.current_streak);
            println!("Total completed: {}", s.total_completed);
        }
        Cmd::Week => {
            report(&dispatch(&mut store, date, Command::RefreshStats));
            for day in store.week_overview(date).days {
                let marker = if day.is_perfect() { " *" } else { "" };
                println!(
                    "{} {}  {:>3}% complete  {} tasks{}",
                    day.date.date().format("%a"),
                    day.date,
                    day.percentage,
                    day.task_count,
                    marker
                );
            }
        }
        Cmd::Month => {
            report(&dispatch(&mut store, date, Command::RefreshStats));
            let summary = store.month_summary(date);
            println!("{}", date.date().format("%B %Y"));
            println!("Perfect days:       {}", summary.perfect_days);
            println!("Average completion: {}%", summary.average_completion);
            println!("Total tasks:        {}", summary.total_tasks);
            println!("Current streak:     {}", summary.current_streak);
            let cells: Vec<String> = month_calendar(&store.snapshot().tasks, date)
                .into_iter()
                .map(|(key, status)| {
                    let mark = match status {
                        DayStatus::Perfect => '#',
                        DayStatus::Partial => '+',
                        DayStatus::Empty => '.',
                    };
                    format!("{:>2}{}", key.date().day(), mark)
                })
                .collect();
            for week in cells.chunks(7) {
                println!("{}", week.join(" "));
            }
        }
        Cmd::Export => {
            let outcome = dispatch(&mut store, date, Command::Export);
            if let Some(export) = &outcome.export {
                let path = config.export_path(date);
                std::fs::write(&path, &export.contents)?;
                log::info!("Exported planner data to {}", path.display());
                println!("{}", path.display());
            }
            report(&outcome);
        }
        Cmd::Reset { yes } => {
            if !yes {
                eprintln!("Refusing to reset without --yes. This cannot be undone.");
                return Ok(());
            }
            report(&dispatch(&mut store, date, Command::Reset));
        }
    }

    Ok(())
}

fn resolve(store: &Store, date: DateKey, section: Section, raw: &str) -> Option<Identity> {
    let tasks = store.get_day(date).map(|d| d.section(section)).unwrap_or_default();
    let identity = Identity::resolve(tasks, raw);
    if identity.is_none() {
        eprintln!("No task {raw:?} in {section} on {date}");
    }
    identity
}

fn report(outcome: &Outcome) {
    for notice in outcome.notice.iter().chain(outcome.warning.iter()) {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", notice.text),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.text),
        }
    }
}

fn print_day(store: &Store, date: DateKey) {
    let view = store.day_view(date);
    println!(
        "{}  {}% ({}/{})",
        date.date().format("%A, %B %-d, %Y"),
        view.percentage,
        view.completed,
        view.total
    );
    for section in &view.sections {
        if section.tasks.is_empty() {
            continue;
        }
        let badge = section.badge;
        println!();
        println!("{} [{}/{}]", section.section.heading(), badge.completed, badge.total);
        for task in &section.tasks {
            let check = if task.completed { "x" } else { " " };
            let manual = match (&task.id, task.is_manual) {
                (Some(id), true) => format!("  yours, id {id}"),
                _ => String::new(),
            };
            println!("  [{}] {} {} <{}>{}", check, task.time, task.title, task.category, manual);
            if let Some(description) = &task.description {
                println!("        {}", description);
            }
        }
    }
    if !view.reflection.is_empty() {
        println!();
        println!("Reflection: {}", view.reflection);
    }
}

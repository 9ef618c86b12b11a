//! Home Dashboard - CLI entry point
//!
//! Launches the terminal dashboard by default. Subcommands run one refresh
//! cycle, or manage the stored preferences and the configuration file
//! without opening the TUI.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use home_dashboard::config::{default, xdg, Config, ConfigError, ConfigLoader};
use home_dashboard::scheduler::Scheduler;
use home_dashboard::store::Preferences;
use home_dashboard::tui::App;
use home_dashboard::widgets::{descriptor, WidgetId, WidgetRegistry};
use home_dashboard::{logging, renderer, Theme};
use home_feeds::FeedClient;

/// Terminal home dashboard
#[derive(Parser)]
#[command(name = "homedash")]
#[command(version, about = "Terminal home dashboard with swappable widgets")]
struct Cli {
    /// Configuration file (defaults to the XDG config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands for the homedash CLI
#[derive(Subcommand)]
enum Commands {
    /// Launch the terminal dashboard (default)
    Tui,

    /// Refresh every visible widget once and print the result
    Refresh,

    /// Show or hide widgets
    Widgets {
        #[command(subcommand)]
        action: WidgetsAction,
    },

    /// Manage reminder tasks
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },

    /// Manage today's local calendar events
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },

    /// Manage calendar API credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },

    /// Show or change the colour theme
    Theme {
        /// New theme; prints the current one when omitted
        mode: Option<ThemeMode>,
    },

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the `widgets` subcommand.
#[derive(Subcommand)]
enum WidgetsAction {
    /// List widgets and whether they are shown
    List,
    /// Show a widget
    Show {
        /// Widget id (e.g. transit, calendar)
        id: WidgetId,
    },
    /// Hide a widget
    Hide {
        /// Widget id (e.g. transit, calendar)
        id: WidgetId,
    },
}

/// Actions for the `tasks` subcommand.
#[derive(Subcommand)]
enum TasksAction {
    /// List tasks with their numbers
    List,
    /// Add a task
    Add {
        /// Task text
        text: String,
    },
    /// Mark a task done, or not done again
    Toggle {
        /// Task number from `tasks list`
        number: usize,
    },
    /// Delete a task
    Remove {
        /// Task number from `tasks list`
        number: usize,
    },
}

/// Actions for the `events` subcommand.
#[derive(Subcommand)]
enum EventsAction {
    /// List today's local events
    List,
    /// Add a local event for today
    Add {
        /// Event text
        text: String,
    },
    /// Delete one of today's local events
    Remove {
        /// Event id from `events list`
        id: i64,
    },
}

/// Actions for the `credentials` subcommand.
#[derive(Subcommand)]
enum CredentialsAction {
    /// Store the calendar API key and calendar id
    Set {
        /// Calendar API key
        #[arg(long)]
        api_key: String,
        /// Calendar id (usually an email address)
        #[arg(long)]
        calendar_id: String,
    },
    /// Remove stored credentials
    Clear,
    /// Show stored credentials with the key masked
    Show,
}

/// Argument of the `theme` subcommand.
#[derive(Clone, Copy, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    if let Commands::Config { action } = command {
        return run_config_command(action, cli.config.as_deref());
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(format!("Config error: {e}")),
    };

    if let Commands::Tui = command {
        return run_tui(config);
    }

    logging::init_stderr(config.logging.level);
    let prefs = Preferences::open(&config.storage.path());
    match command {
        Commands::Refresh => run_refresh_command(&config, &prefs),
        Commands::Widgets { action } => run_widgets_command(action, &prefs),
        Commands::Tasks { action } => run_tasks_command(action, &prefs),
        Commands::Events { action } => run_events_command(action, &prefs),
        Commands::Credentials { action } => run_credentials_command(action, &prefs),
        Commands::Theme { mode } => run_theme_command(mode, &prefs),
        Commands::Tui | Commands::Config { .. } => ExitCode::SUCCESS,
    }
}

/// Prints `message` to stderr and returns failure.
fn fail(message: impl Display) -> ExitCode {
    eprintln!("{message}");
    ExitCode::FAILURE
}

fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = ConfigLoader::load(path)?;
    config.validate()?;
    Ok(config)
}

fn feed_client(config: &Config) -> Result<FeedClient, String> {
    let timeout = config
        .endpoints
        .request_timeout()
        .map_err(|e| e.to_string())?;
    FeedClient::new(config.endpoints.to_endpoints(), timeout).map_err(|e| e.to_string())
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

fn run_tui(config: Config) -> ExitCode {
    let log_file = config.logging.file();
    if let Err(e) = logging::init_file(config.logging.level, &log_file) {
        eprintln!("Warning: cannot open log file {}: {e}", log_file.display());
    }

    let client = match feed_client(&config) {
        Ok(client) => client,
        Err(e) => return fail(format!("Error: {e}")),
    };
    let prefs = Preferences::open(&config.storage.path());
    let registry = WidgetRegistry::from_config(&config);
    let mut app = match App::new(prefs, registry, client) {
        Ok(app) => app,
        Err(e) => return fail(format!("Error: {e}")),
    };
    app.photo = config.photo.path();

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => return fail(format!("Error: cannot start runtime: {e}")),
    };
    let result = rt.block_on(async {
        let scheduler = Scheduler::from_config(&config.dashboard)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
        app.run(scheduler).await
    });
    if let Err(e) = result {
        return fail(format!("TUI error: {e}"));
    }
    ExitCode::SUCCESS
}

fn run_refresh_command(config: &Config, prefs: &Preferences) -> ExitCode {
    let client = match feed_client(config) {
        Ok(client) => client,
        Err(e) => return fail(format!("Error: {e}")),
    };
    let registry = WidgetRegistry::from_config(config);
    let plan = match renderer::plan_from_store(&registry, prefs) {
        Ok(plan) => plan,
        Err(e) => return fail(format!("Error: {e}")),
    };
    let ctx = renderer::snapshot(prefs, client, config.photo.path(), None, Local::now());
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => return fail(format!("Error: cannot start runtime: {e}")),
    };
    let report = rt.block_on(renderer::run_cycle(&registry, &plan.shown, &ctx));

    println!("{}", report.greeting);
    for (_, view) in &report.views {
        println!();
        println!("== {} ==", view.title);
        for line in view.to_plain_lines() {
            println!("{line}");
        }
    }
    ExitCode::SUCCESS
}

fn run_widgets_command(action: WidgetsAction, prefs: &Preferences) -> ExitCode {
    let (id, visible) = match action {
        WidgetsAction::List => {
            let visibility = match prefs.load_visibility() {
                Ok(map) => map,
                Err(e) => return fail(format!("Error: {e}")),
            };
            for id in WidgetId::ALL {
                let state = if visibility.is_visible(id) {
                    "shown"
                } else {
                    "hidden"
                };
                println!("{:<14}{:<16}{state}", id.as_str(), descriptor(id).display_name);
            }
            return ExitCode::SUCCESS;
        }
        WidgetsAction::Show { id } => (id, true),
        WidgetsAction::Hide { id } => (id, false),
    };
    match prefs.set_widget_visible(id, visible) {
        Ok(_) => {
            let verb = if visible { "Showing" } else { "Hiding" };
            println!("{verb} {}", descriptor(id).display_name);
            ExitCode::SUCCESS
        }
        Err(e) => fail(format!("Error: {e}")),
    }
}

/// Converts a 1-based task number to an index.
fn task_index(number: usize) -> Option<usize> {
    number.checked_sub(1)
}

fn run_tasks_command(action: TasksAction, prefs: &Preferences) -> ExitCode {
    match action {
        TasksAction::List => {
            let tasks = prefs.tasks();
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for (index, task) in tasks.iter().enumerate() {
                let mark = if task.completed { "x" } else { " " };
                println!("{}. [{mark}] {}", index + 1, task.text);
            }
            ExitCode::SUCCESS
        }
        TasksAction::Add { text } => match prefs.add_task(&text) {
            Ok(Some(task)) => {
                println!("Added task {}: {}", prefs.tasks().len(), task.text);
                ExitCode::SUCCESS
            }
            Ok(None) => fail("Error: task text is empty"),
            Err(e) => fail(format!("Error: {e}")),
        },
        TasksAction::Toggle { number } => {
            let result = match task_index(number) {
                Some(index) => prefs.toggle_task(index),
                None => Ok(None),
            };
            match result {
                Ok(Some(task)) => {
                    let state = if task.completed { "done" } else { "not done" };
                    println!("Task {number} marked {state}: {}", task.text);
                    ExitCode::SUCCESS
                }
                Ok(None) => fail(format!("Error: no task {number}")),
                Err(e) => fail(format!("Error: {e}")),
            }
        }
        TasksAction::Remove { number } => {
            let result = match task_index(number) {
                Some(index) => prefs.remove_task(index),
                None => Ok(None),
            };
            match result {
                Ok(Some(task)) => {
                    println!("Removed task {number}: {}", task.text);
                    ExitCode::SUCCESS
                }
                Ok(None) => fail(format!("Error: no task {number}")),
                Err(e) => fail(format!("Error: {e}")),
            }
        }
    }
}

fn run_events_command(action: EventsAction, prefs: &Preferences) -> ExitCode {
    let now = Local::now();
    let today = now.date_naive();
    match action {
        EventsAction::List => {
            let events = prefs.local_events(today);
            if events.is_empty() {
                println!("Nothing planned for today.");
            }
            for event in events {
                println!("{}  {}", event.id, event.text);
            }
            ExitCode::SUCCESS
        }
        EventsAction::Add { text } => {
            match prefs.add_local_event(today, &text, now.timestamp_millis()) {
                Ok(Some(event)) => {
                    println!("Added event {}: {}", event.id, event.text);
                    ExitCode::SUCCESS
                }
                Ok(None) => fail("Error: event text is empty"),
                Err(e) => fail(format!("Error: {e}")),
            }
        }
        EventsAction::Remove { id } => match prefs.remove_local_event(today, id) {
            Ok(true) => {
                println!("Removed event {id}");
                ExitCode::SUCCESS
            }
            Ok(false) => fail(format!("Error: no event {id} today")),
            Err(e) => fail(format!("Error: {e}")),
        },
    }
}

/// Shows the first four characters of a secret.
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}…")
}

fn run_credentials_command(action: CredentialsAction, prefs: &Preferences) -> ExitCode {
    let result = match action {
        CredentialsAction::Set {
            api_key,
            calendar_id,
        } => {
            if api_key.trim().is_empty() || calendar_id.trim().is_empty() {
                return fail("Error: both --api-key and --calendar-id are required");
            }
            prefs
                .set_credentials(&api_key, &calendar_id)
                .map(|()| "Calendar credentials saved")
        }
        CredentialsAction::Clear => prefs
            .clear_credentials()
            .map(|()| "Calendar credentials cleared"),
        CredentialsAction::Show => {
            let (api_key, calendar_id) = prefs.raw_credentials();
            println!("API key:     {}", mask(&api_key));
            let calendar_id = if calendar_id.is_empty() {
                "(not set)".to_string()
            } else {
                calendar_id
            };
            println!("Calendar ID: {calendar_id}");
            return ExitCode::SUCCESS;
        }
    };
    match result {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(format!("Error: {e}")),
    }
}

fn run_theme_command(mode: Option<ThemeMode>, prefs: &Preferences) -> ExitCode {
    let result = match mode {
        None => Ok(prefs.theme()),
        Some(ThemeMode::Toggle) => prefs.toggle_theme(),
        Some(ThemeMode::Dark) => prefs.set_theme(Theme::Dark).map(|()| Theme::Dark),
        Some(ThemeMode::Light) => prefs.set_theme(Theme::Light).map(|()| Theme::Light),
    };
    match result {
        Ok(theme) => {
            println!("{theme}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(format!("Error: {e}")),
    }
}

fn run_config_command(action: ConfigAction, path: Option<&Path>) -> ExitCode {
    let result = match action {
        ConfigAction::Init { force } => default::create_default_config(force).map(|path| {
            println!("Created configuration at {}", path.display());
        }),
        ConfigAction::Path => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(xdg::config_path);
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Validate => load_config(path).map(|config| {
            println!("Configuration is valid");
            println!("{config:#?}");
        }),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(format!("Config error: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_launches_tui() {
        let cli = Cli::try_parse_from(["homedash"]).expect("parses");
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["homedash", "refresh", "--config", "/tmp/dash.toml"])
            .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/dash.toml")));
        assert!(matches!(cli.command, Some(Commands::Refresh)));
    }

    #[test]
    fn widget_ids_are_parsed() {
        let cli = Cli::try_parse_from(["homedash", "widgets", "hide", "news"]).expect("parses");
        match cli.command {
            Some(Commands::Widgets {
                action: WidgetsAction::Hide { id },
            }) => assert_eq!(id, WidgetId::News),
            _ => panic!("unexpected command variant"),
        }
        assert!(Cli::try_parse_from(["homedash", "widgets", "show", "stocks"]).is_err());
    }

    #[test]
    fn credentials_set_requires_both_flags() {
        assert!(Cli::try_parse_from(["homedash", "credentials", "set", "--api-key", "k"]).is_err());
    }

    #[test]
    fn theme_accepts_toggle() {
        let cli = Cli::try_parse_from(["homedash", "theme", "toggle"]).expect("parses");
        assert!(matches!(
            cli.command,
            Some(Commands::Theme {
                mode: Some(ThemeMode::Toggle)
            })
        ));
    }

    #[test]
    fn task_numbers_are_one_based() {
        assert_eq!(task_index(1), Some(0));
        assert_eq!(task_index(0), None);
    }

    #[test]
    fn mask_keeps_four_characters() {
        assert_eq!(mask("AIzaSyExample"), "AIza…");
        assert_eq!(mask(""), "(not set)");
        assert_eq!(mask("ab"), "ab…");
    }
}

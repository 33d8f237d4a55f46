use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use inbox::application::Inbox;
use inbox::config::InboxConfig;
use inbox::core::task::{Category, TaskId};
use inbox::message::Message;
use inbox::sync::StoreError;
use inbox::sync::rest::RestClient;
use inbox::view;

const JOURNAL_SOCKET: &str = "/run/systemd/journal/socket";

#[derive(Parser)]
#[command(name = "inbox", version, about = "GTD inbox backed by a remote task store")]
struct Cli {
    /// Config file (defaults to ~/.config/inbox/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level for this run
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the task list (the default)
    List {
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Add a task
    Add {
        #[arg(short, long, default_value_t = Category::NextActions)]
        category: Category,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Delete tasks by id
    Delete {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Move a task to another category
    Move { id: TaskId, category: Category },
    /// Mark tasks completed
    Done {
        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Show the active configuration
    Config {
        /// Write the defaults to the config file if it does not exist yet
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(InboxConfig::default_path);
    let config = InboxConfig::load(&config_path)?;

    inbox::set_debug_logging(config.debug_logging || cli.debug);
    init_logging();

    let inbox = match cli.command.unwrap_or(Command::List { category: None }) {
        Command::Config { init } => return show_config(&config, &config_path, init),
        Command::List { category } => {
            let inbox = loaded_inbox(&config).await?;
            print!("{}", view::render(inbox.list(), category));
            return Ok(());
        }
        Command::Add { category, text } => {
            let mut inbox = loaded_inbox(&config).await?;
            inbox.create(&text.join(" "), category).await;
            inbox
        }
        Command::Delete { ids } => {
            let mut inbox = loaded_inbox(&config).await?;
            inbox.dispatch_all(ids.into_iter().map(Message::Delete)).await;
            inbox
        }
        Command::Move { id, category } => {
            let mut inbox = loaded_inbox(&config).await?;
            inbox.update_category(id, category).await;
            inbox
        }
        Command::Done { undo, ids } => {
            let mut inbox = loaded_inbox(&config).await?;
            inbox
                .dispatch_all(ids.into_iter().map(|id| Message::ToggleCompleted(id, !undo)))
                .await;
            inbox
        }
    };

    print!("{}", view::render(inbox.list(), None));
    Ok(())
}

async fn loaded_inbox(config: &InboxConfig) -> Result<Inbox<RestClient>, StoreError> {
    let mut inbox = Inbox::from_config(config)?;
    inbox.load().await;
    Ok(inbox)
}

fn show_config(
    config: &InboxConfig,
    path: &Path,
    init: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if init && !path.exists() {
        config.save(path)?;
        log::info!("Wrote default config to {}", path.display());
    }
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Log to the systemd user journal (`journalctl --user -t inbox -f`) when it
/// is reachable, otherwise to stderr. Inbox targets pass at info (debug when
/// enabled), everything else at warn.
fn init_logging() {
    use log::Log;

    enum Sink {
        Journal(systemd_journal_logger::JournalLog),
        Stderr,
    }

    struct Filtered {
        sink: Sink,
    }

    impl log::Log for Filtered {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            let own_max = match (&self.sink, inbox::debug_logging()) {
                (_, true) => log::LevelFilter::Debug,
                (Sink::Journal(_), false) => log::LevelFilter::Info,
                // Keep the terminal quiet unless something went wrong.
                (Sink::Stderr, false) => log::LevelFilter::Warn,
            };
            if metadata.target().starts_with("inbox") {
                metadata.level() <= own_max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }

        fn log(&self, record: &log::Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            match &self.sink {
                Sink::Journal(journal) => journal.log(record),
                Sink::Stderr => eprintln!("inbox: {}: {}", record.level(), record.args()),
            }
        }

        fn flush(&self) {
            if let Sink::Journal(journal) = &self.sink {
                journal.flush();
            }
        }
    }

    let sink = if Path::new(JOURNAL_SOCKET).exists() {
        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => Sink::Journal(journal.with_syslog_identifier("inbox".to_string())),
            Err(_) => Sink::Stderr,
        }
    } else {
        Sink::Stderr
    };

    if log::set_boxed_logger(Box::new(Filtered { sink })).is_ok() {
        // Global max must be Debug so inbox debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

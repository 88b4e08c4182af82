//! # Taskscope
//!
//! A terminal task manager with a fast search: type a query and narrow the
//! list by status, priority, category and due date. The CLI is for quick
//! entry and scripting; the TUI searches as you type.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! taskscope
//! # or explicitly
//! taskscope ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `/`: Search (Enter applies, Esc clears)
//! *   `s` / `p` / `g` / `r`: Cycle the status / priority / category / due-date filter
//! *   `x`: Clear the search and all filters
//! *   `a`: Add new task
//! *   `Space`: Toggle done
//! *   `f`: Toggle favorite
//! *   `d`: Delete selected task
//! *   `t`: Toggle light/dark theme
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskscope add "Write report" --priority high --due 2025-12-01 --category Work
//! taskscope list --query report --status pending --range week
//! taskscope done <ID>
//! taskscope category add Work --icon briefcase --color "#3B82F6"
//! ```
//!
//! ## Data Storage
//!
//! Data is saved as JSON in your local data directory
//! (`~/.local/share/taskscope/` on Linux). Override it with
//! `TASKSCOPE_DATA_DIR`. Logging is controlled by `TASKSCOPE_LOG`
//! (an `env_logger` filter, default `warn`).

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use log::debug;

use taskscope::commands::*;
use taskscope::config::Config;
use taskscope::models::{TaskPriority, TaskStatus};
use taskscope::storage::Storage;
use taskscope::theme::Theme;
use taskscope::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskscope")]
#[command(about = "Terminal task manager with search and filters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short = 'm', long)]
        content: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        /// Due date, YYYY-MM-DD or "YYYY-MM-DD HH:MM"
        #[arg(short, long)]
        due: Option<String>,
        /// Category id or name (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,
        /// Mark as favorite
        #[arg(short, long)]
        favorite: bool,
    },
    /// Search and list tasks
    List {
        /// Text to find in title or description
        #[arg(short, long)]
        query: Option<String>,
        /// pending, done, missed or all
        #[arg(short, long)]
        status: Option<String>,
        /// low, medium, high or all
        #[arg(short, long)]
        priority: Option<String>,
        /// Category id or name, or all
        #[arg(short, long)]
        category: Option<String>,
        /// today, week, month, overdue or all
        #[arg(short, long)]
        range: Option<String>,
        /// Only favorites
        #[arg(short, long)]
        favorites: bool,
    },
    /// List tasks due today
    Today,
    /// Mark a task as done
    Done { id: u64 },
    /// Set a task's status
    Status { id: u64, status: TaskStatus },
    /// Set a task's priority
    Priority { id: u64, priority: TaskPriority },
    /// Toggle a task's favorite flag
    Favorite { id: u64 },
    /// Remove a task
    Remove { id: u64 },
    /// Edit a task
    Edit {
        id: u64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'm', long)]
        content: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<TaskStatus>,
        /// New priority
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        /// New due date
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        /// Replace categories (repeatable)
        #[arg(short, long = "category")]
        categories: Option<Vec<String>>,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Inspect or clear the assistant history
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },
    /// Show or change the theme
    Theme {
        /// light, dark or system
        theme: Option<Theme>,
        /// Switch to the opposite of the applied theme
        #[arg(long, conflicts_with = "theme")]
        toggle: bool,
    },
    /// Reset the database (delete all tasks, categories and chat history)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Add a new category
    Add {
        name: String,
        /// Hex color, e.g. #3B82F6
        #[arg(short, long)]
        color: Option<String>,
        /// Icon name, e.g. briefcase
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// List categories with task counts
    List {
        /// Filter by name
        search: Option<String>,
    },
    /// Edit a category
    Edit {
        /// Category id or name
        category: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Remove a category and detach it from tasks
    Remove {
        /// Category id or name
        category: String,
    },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// Print the conversation
    History {
        /// Show generated summaries instead
        #[arg(short, long)]
        summaries: bool,
    },
    /// Clear messages, summaries, or both
    Clear {
        #[arg(long, conflicts_with = "summaries")]
        messages: bool,
        #[arg(long)]
        summaries: bool,
    },
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let storage = Storage::new(config.data_dir.clone());
    match cli.command {
        Some(Commands::Add { title, content, priority, due, categories, favorite }) => {
            cmd_add(&storage, title, content, priority, due, categories, favorite, false).map(|_| ())
        }
        Some(Commands::List { query, status, priority, category, range, favorites }) => {
            let query = ListQuery { query, status, priority, category, range, favorites };
            cmd_list(&storage, &query)
        }
        Some(Commands::Today) => cmd_today(&storage),
        Some(Commands::Done { id }) => cmd_done(&storage, id, false),
        Some(Commands::Status { id, status }) => cmd_status(&storage, id, status, false),
        Some(Commands::Priority { id, priority }) => cmd_priority(&storage, id, priority, false),
        Some(Commands::Favorite { id }) => cmd_favorite(&storage, id, false),
        Some(Commands::Remove { id }) => cmd_remove(&storage, id, false),
        Some(Commands::Edit { id, title, content, status, priority, due, clear_due, categories }) => {
            let args = EditArgs { title, content, status, priority, due, clear_due, categories };
            cmd_edit(&storage, id, args, false)
        }
        Some(Commands::Category { command }) => match command {
            CategoryCommands::Add { name, color, icon } => {
                cmd_category_add(&storage, name, color, icon, false).map(|_| ())
            }
            CategoryCommands::List { search } => cmd_category_list(&storage, search),
            CategoryCommands::Edit { category, name, color, icon } => {
                cmd_category_edit(&storage, category, name, color, icon, false)
            }
            CategoryCommands::Remove { category } => cmd_category_remove(&storage, category, false),
        },
        Some(Commands::Chat { command }) => match command {
            ChatCommands::History { summaries } => cmd_chat_history(&storage, summaries),
            ChatCommands::Clear { messages, summaries } => {
                let what = match (messages, summaries) {
                    (true, _) => ChatClear::Messages,
                    (_, true) => ChatClear::Summaries,
                    _ => ChatClear::All,
                };
                cmd_chat_clear(&storage, what, false)
            }
        },
        Some(Commands::Theme { theme, toggle }) => cmd_theme(&storage, config, theme, toggle, false).map(|_| ()),
        Some(Commands::Reset { force }) => cmd_reset(&storage, force),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "taskscope", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(storage, config),
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .init();
    debug!("data directory: {}", config.data_dir.display());

    let cli = Cli::parse();
    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

//! Session state and `%` command handling for Parlor.
//!
//! The engine owns a [`Session`] (history, verbose flag, model and system
//! message) and a [`Dispatcher`] that routes command lines to handlers. All
//! terminal, shell, desktop and network effects go through the [`Host`]
//! trait, which the binary implements and tests replace with recorders.
//!
//! ```text
//! line ──► Dispatcher::dispatch
//!           ├── "%%code" ──► Host::run("shell", code)
//!           └── "%kw args" ──► alias rewrite ──► Command::parse ──► handlers
//!                                                   └── %edit ──► EditWorkflow
//!                                                                  ├── opener
//!                                                                  └── watcher task
//! ```

mod command;
mod config;
mod dispatch;
mod edit;
mod error;
mod handlers;
mod host;
mod info;
mod opener;
mod reply;
mod respond;
mod session;
mod watcher;


pub use command::{
    COMMAND_PREFIX, Command, CommandSpec, Invocation, SHELL_ESCAPE, command_specs, help_markdown,
    parse_line,
};
pub use config::{
    ApiConfig, AppConfig, ConfigError, DEFAULT_MODEL, DEFAULT_SYSTEM_MESSAGE, EditConfig,
    ParlorConfig, config_path, expand_env_vars, parlor_dir, storage_path,
};
pub use dispatch::{DispatchOptions, Dispatcher};
pub use edit::{
    EditError, EditOptions, EditOutcome, EditState, EditWorkflow, MONITORING_PROMPT,
    SCRATCH_FILE_NAME, SUBMITTED_NOTICE,
};
pub use error::CommandError;
pub use handlers::TOKENS_DISCLAIMER;
pub use host::{Ack, Host, HostFut, NoticeSink};
pub use info::system_report;
pub use opener::{Opener, open_path, open_with, platform_opener};
pub use reply::split_reply;
pub use respond::{ChatResponder, chat_messages};
pub use session::Session;
pub use watcher::{EDITED_NOTICE, WatchReport, watch_modifications};

pub use parlor_context::{
    Estimate, EstimateError, History, PersistError, TiktokenEstimator, TokenEstimator,
};
pub use parlor_providers::{ChatClient, ChatMessage, DEFAULT_BASE_URL, ProviderError};
pub use parlor_types::{Message, MessageKind, Role};

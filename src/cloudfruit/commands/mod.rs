use crate::config::AppConfig;
use crate::model::{FruitItem, Record, Subscription};
use std::path::PathBuf;

pub mod account;
pub mod config;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod subscription;
pub mod update;

/// Where the CLI keeps its container and scratch files.
#[derive(Debug, Clone)]
pub struct CloudPaths {
    /// Root of the file-backed container (also holds `config.json`)
    pub container: PathBuf,
    /// Directory for transient upload files
    pub cache: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Records the service confirmed writing or deleting
    pub affected_records: Vec<Record>,
    /// `None` when the fruit query did not complete
    pub listed_fruits: Option<Vec<FruitItem>>,
    pub subscriptions: Vec<Subscription>,
    pub config: Option<AppConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_records(mut self, records: Vec<Record>) -> Self {
        self.affected_records = records;
        self
    }

    pub fn with_listed_fruits(mut self, fruits: Vec<FruitItem>) -> Self {
        self.listed_fruits = Some(fruits);
        self
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<Subscription>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Appends the outcome of a follow-up command.
    pub fn merge(&mut self, other: CmdResult) {
        if other.listed_fruits.is_some() {
            self.listed_fruits = other.listed_fruits;
        }
        self.subscriptions.extend(other.subscriptions);
        self.messages.extend(other.messages);
    }

    /// Whether the service confirmed the requested write.
    pub fn is_confirmed(&self) -> bool {
        !self.affected_records.is_empty()
    }
}

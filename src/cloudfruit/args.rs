use clap::{Parser, Subcommand};

/// Returns the version string, including the git hash for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "cloudfruit", version = get_version())]
#[command(about = "Fruit records, accounts and push subscriptions against a record container", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Container directory (defaults to the user data dir, or $CLOUDFRUIT_CONTAINER)
    #[arg(short, long, global = true)]
    pub container: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the container with a signed-in account
    Init {
        /// Given name reported for the current user
        #[arg(long)]
        name: Option<String>,
    },

    /// Show account status, discoverability and user name
    Status,

    /// Add a fruit (with the sample image attached)
    #[command(alias = "a")]
    Add {
        /// Name of the fruit
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// List fruits, newest first
    #[command(alias = "ls")]
    List,

    /// Rename a fruit to the placeholder name
    #[command(alias = "u")]
    Update {
        /// Index of the fruit as shown by `list`
        index: usize,
    },

    /// Delete a fruit
    #[command(alias = "rm")]
    Delete {
        /// Index of the fruit as shown by `list`
        index: usize,
    },

    /// Request notification permissions
    Permission,

    /// Subscribe to new fruit notifications
    Subscribe,

    /// Unsubscribe from new fruit notifications
    Unsubscribe,

    /// List push subscriptions in the container
    Subscriptions,

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., results-limit)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

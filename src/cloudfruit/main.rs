use chrono::{DateTime, Utc};
use clap::Parser;
use cloudfruit::api::{
    AccountFacade, CloudPaths, CmdMessage, ConfigAction, FruitsFacade, FruitsOptions,
    MessageLevel, SubscriptionFacade,
};
use cloudfruit::commands::create::SampleImage;
use cloudfruit::commands::{config, init};
use cloudfruit::config::{AppConfig, KEYS};
use cloudfruit::container::fs::FileContainer;
use cloudfruit::error::{CloudError, Result};
use cloudfruit::model::{FruitItem, Subscription};
use cloudfruit::notifications::LocalNotificationCenter;
use colored::*;
use directories::ProjectDirs;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

const CONTAINER_ENV: &str = "CLOUDFRUIT_CONTAINER";
const CACHE_ENV: &str = "CLOUDFRUIT_CACHE";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

struct AppContext {
    paths: CloudPaths,
    config: AppConfig,
}

impl AppContext {
    fn container(&self) -> FileContainer {
        FileContainer::new(self.paths.container.clone())
    }

    fn fruits_options(&self) -> FruitsOptions {
        let mut options = FruitsOptions::new(self.paths.cache.clone());
        options.results_limit = self.config.results_limit;
        if let Some(path) = &self.config.sample_image {
            options.image = SampleImage::File(path.clone());
        }
        options
    }

    fn fruits(&self) -> FruitsFacade<FileContainer> {
        FruitsFacade::new(self.container(), self.fruits_options())
    }

    fn subscriptions(&self) -> SubscriptionFacade<FileContainer, LocalNotificationCenter> {
        SubscriptionFacade::new(
            self.container(),
            LocalNotificationCenter::new(self.config.notifications_granted),
        )
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = init_context(&cli)?;
    log::debug!("Using container at {}", ctx.paths.container.display());

    match cli.command {
        Some(Commands::Init { name }) => handle_init(&ctx, name),
        Some(Commands::Status) => handle_status(&ctx),
        Some(Commands::Add { name }) => handle_add(&ctx, name.join(" ")),
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Update { index }) => handle_update(&ctx, index),
        Some(Commands::Delete { index }) => handle_delete(&ctx, index),
        Some(Commands::Permission) => handle_permission(&ctx),
        Some(Commands::Subscribe) => handle_subscribe(&ctx),
        Some(Commands::Unsubscribe) => handle_unsubscribe(&ctx),
        Some(Commands::Subscriptions) => handle_subscriptions(&ctx),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let proj_dirs = ProjectDirs::from("com", "cloudfruit", "cloudfruit");

    let container = match (&cli.container, std::env::var_os(CONTAINER_ENV)) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => PathBuf::from(dir),
        (None, None) => proj_dirs
            .as_ref()
            .map(|d| d.data_dir().to_path_buf())
            .ok_or_else(|| CloudError::Store("Could not determine data dir".to_string()))?,
    };
    let container = std::path::absolute(&container).map_err(CloudError::Io)?;

    let cache = match std::env::var_os(CACHE_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => proj_dirs
            .as_ref()
            .map(|d| d.cache_dir().to_path_buf())
            .unwrap_or_else(|| container.join("cache")),
    };

    let config = AppConfig::load(&container)?;
    Ok(AppContext {
        paths: CloudPaths { container, cache },
        config,
    })
}

fn handle_init(ctx: &AppContext, name: Option<String>) -> Result<()> {
    let result = init::run(&ctx.paths, name)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_status(ctx: &AppContext) -> Result<()> {
    let facade = AccountFacade::new(ctx.container());
    let state = facade.state();

    println!(
        "IS SIGNED IN: {}",
        yes_no(state.is_signed_in, state.is_signed_in.to_string().to_uppercase())
    );
    if !state.error.is_empty() {
        println!("{}", state.error.red());
    }
    println!(
        "Permission: {}",
        yes_no(
            state.permission_status,
            state.permission_status.to_string().to_uppercase()
        )
    );
    println!("NAME: {}", state.user_name.bold());
    Ok(())
}

fn yes_no(flag: bool, text: String) -> ColoredString {
    if flag {
        text.green()
    } else {
        text.yellow()
    }
}

fn handle_add(ctx: &AppContext, name: String) -> Result<()> {
    let mut facade = ctx.fruits();
    facade.set_text(name);
    let result = facade.add_text();
    if result.is_confirmed() {
        print_fruits(facade.fruits());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let (facade, result) = FruitsFacade::open(ctx.container(), ctx.fruits_options());
    print_fruits(facade.fruits());
    print_messages(&result.messages);
    Ok(())
}

fn handle_update(ctx: &AppContext, index: usize) -> Result<()> {
    let mut facade = ctx.fruits();
    let item = facade.fruits()[listed_position(facade.fruits(), index)?].clone();

    let result = facade.update(&item);
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &AppContext, index: usize) -> Result<()> {
    let mut facade = ctx.fruits();
    let position = listed_position(facade.fruits(), index)?;
    let result = facade.delete_at(position)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_permission(ctx: &AppContext) -> Result<()> {
    let result = ctx.subscriptions().request_push_permission();
    print_messages(&result.messages);
    Ok(())
}

fn handle_subscribe(ctx: &AppContext) -> Result<()> {
    let result = ctx.subscriptions().subscribe();
    print_messages(&result.messages);
    Ok(())
}

fn handle_unsubscribe(ctx: &AppContext) -> Result<()> {
    let result = ctx.subscriptions().unsubscribe();
    print_messages(&result.messages);
    Ok(())
}

fn handle_subscriptions(ctx: &AppContext) -> Result<()> {
    let result = ctx.subscriptions().subscriptions()?;
    print_subscriptions(&result.subscriptions);
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = ConfigAction::from_args(key, value);
    let show_all = matches!(action, ConfigAction::Show(None));

    let result = config::run(&ctx.paths, action)?;
    if show_all {
        if let Some(config) = &result.config {
            for key in KEYS {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}

/// Display indexes start at 1.
fn to_position(index: usize) -> Result<usize> {
    index
        .checked_sub(1)
        .ok_or_else(|| CloudError::Api("Indexes start at 1".to_string()))
}

/// Resolves a displayed index against the listed fruits.
fn listed_position(fruits: &[FruitItem], index: usize) -> Result<usize> {
    let position = to_position(index)?;
    if position >= fruits.len() {
        return Err(CloudError::Api(format!("Index {} not found", index)));
    }
    Ok(position)
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const IMAGE_MARKER: &str = "▣";

fn print_fruits(fruits: &[FruitItem]) {
    if fruits.is_empty() {
        println!("No fruits found.");
        return;
    }

    for (i, fruit) in fruits.iter().enumerate() {
        let idx_str = format!("{}. ", i + 1);
        let marker = if fruit.image_url.is_some() {
            format!("{} ", IMAGE_MARKER)
        } else {
            "  ".to_string()
        };
        let time_ago = fruit
            .record
            .created_at
            .map(format_time_ago)
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

        let fixed_width = 4 + idx_str.width() + marker.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let name = truncate_to_width(&fruit.name, available);
        let padding = available.saturating_sub(name.width());

        println!(
            "    {}{}{}{}{}",
            idx_str.yellow(),
            name,
            " ".repeat(padding),
            marker,
            time_ago.dimmed()
        );
    }
}

fn print_subscriptions(subscriptions: &[Subscription]) {
    if subscriptions.is_empty() {
        println!("No subscriptions found.");
        return;
    }

    for subscription in subscriptions {
        let title = subscription
            .notification_info
            .title
            .as_deref()
            .unwrap_or("(no title)");
        println!(
            "{}  {} {}",
            subscription.id.bold(),
            subscription.record_type.dimmed(),
            title
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

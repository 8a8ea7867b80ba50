//! # API Facades
//!
//! Three independent facades sit on top of the command layer, one per screen
//! of the walkthrough:
//!
//! - [`AccountFacade`]: account status, discoverability, the user's name
//! - [`FruitsFacade`]: the local fruit list and its create/read/update/delete
//! - [`SubscriptionFacade`]: notification permission and the push subscription
//!
//! ## Explicit Containers
//!
//! Each facade is handed the [`Container`] it talks to. There is no shared
//! default instance; pass `&mut container` to let facades take turns on one
//! container, or give each its own handle (a `FileContainer` is just a path).
//!
//! ## State and Completions
//!
//! Facades own the state a view would render (`AccountState`, the fruit list,
//! the input text). Methods take `&mut self`, so every completion updates that
//! state on the caller's thread, one at a time. Remote failures are logged and
//! swallowed per operation (see the command modules); the facades never retry.

use crate::commands::account::{self, AccountState};
use crate::commands::create::{self, SampleImage};
use crate::commands::{delete, list, subscription, update};
use crate::container::Container;
use crate::error::Result;
use crate::model::{AccountStatus, ApplicationPermissionStatus, FruitItem, RecordId};
use crate::notifications::NotificationCenter;
use crate::query::DEFAULT_RESULTS_LIMIT;
use std::path::PathBuf;

pub struct AccountFacade<C: Container> {
    container: C,
    state: AccountState,
}

impl<C: Container> AccountFacade<C> {
    /// Builds the facade and issues all four account calls.
    pub fn new(mut container: C) -> Self {
        let state = account::run(&mut container);
        Self { container, state }
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn check_account_status(&mut self) -> AccountStatus {
        account::check_status(&self.container, &mut self.state)
    }

    pub fn request_discoverability_permission(&mut self) -> ApplicationPermissionStatus {
        account::request_permission(&mut self.container, &mut self.state)
    }

    pub fn resolve_current_user_id(&self) -> Option<RecordId> {
        account::fetch_user_record_id(&self.container)
    }

    pub fn resolve_display_name(&mut self, user_record_id: &RecordId) -> Option<String> {
        account::discover_user(&self.container, user_record_id, &mut self.state)
    }

    pub fn container(&self) -> &C {
        &self.container
    }
}

/// How the fruit facade prepares uploads and queries.
#[derive(Debug, Clone)]
pub struct FruitsOptions {
    pub cache_dir: PathBuf,
    pub image: SampleImage,
    pub results_limit: usize,
}

impl FruitsOptions {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            image: SampleImage::Bundled,
            results_limit: DEFAULT_RESULTS_LIMIT,
        }
    }
}

pub struct FruitsFacade<C: Container> {
    container: C,
    options: FruitsOptions,
    text: String,
    fruits: Vec<FruitItem>,
}

impl<C: Container> FruitsFacade<C> {
    /// Builds the facade and fetches the current fruits.
    pub fn new(container: C, options: FruitsOptions) -> Self {
        Self::open(container, options).0
    }

    /// Like [`FruitsFacade::new`], also handing back the initial fetch.
    pub fn open(container: C, options: FruitsOptions) -> (Self, CmdResult) {
        let mut facade = Self {
            container,
            options,
            text: String::new(),
            fruits: Vec::new(),
        };
        let loaded = facade.refresh();
        (facade, loaded)
    }

    pub fn fruits(&self) -> &[FruitItem] {
        &self.fruits
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Submits the current input text.
    pub fn add_text(&mut self) -> CmdResult {
        let name = self.text.clone();
        self.submit(&name)
    }

    /// Saves a new fruit; on success clears the input and refetches.
    pub fn submit(&mut self, name: &str) -> CmdResult {
        let mut result = create::run(
            &mut self.container,
            name,
            &self.options.image,
            &self.options.cache_dir,
        );
        if result.is_confirmed() {
            self.text.clear();
            result.merge(self.refresh());
        }
        result
    }

    /// Replaces the local list with the first page of the query.
    ///
    /// A failed query leaves the list as it was.
    pub fn refresh(&mut self) -> CmdResult {
        let result = list::run(&self.container, self.options.results_limit);
        if let Some(items) = &result.listed_fruits {
            self.fruits = items.clone();
        }
        result
    }

    /// Renames the fruit to the placeholder and refetches on success.
    pub fn update(&mut self, item: &FruitItem) -> CmdResult {
        let mut result = update::run(&mut self.container, item);
        if result.is_confirmed() {
            self.text.clear();
            result.merge(self.refresh());
        }
        result
    }

    /// Deletes the fruit currently at `index` (0-based).
    pub fn delete_at(&mut self, index: usize) -> Result<CmdResult> {
        delete::run(&mut self.container, &mut self.fruits, index)
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }
}

pub struct SubscriptionFacade<C: Container, N: NotificationCenter> {
    container: C,
    notifications: N,
}

impl<C: Container, N: NotificationCenter> SubscriptionFacade<C, N> {
    pub fn new(container: C, notifications: N) -> Self {
        Self {
            container,
            notifications,
        }
    }

    pub fn request_push_permission(&mut self) -> CmdResult {
        subscription::request_permission(&mut self.notifications)
    }

    pub fn subscribe(&mut self) -> CmdResult {
        subscription::subscribe(&mut self.container)
    }

    pub fn unsubscribe(&mut self) -> CmdResult {
        subscription::unsubscribe(&mut self.container)
    }

    pub fn subscriptions(&self) -> Result<CmdResult> {
        subscription::list(&self.container)
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn notifications(&self) -> &N {
        &self.notifications
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CloudPaths, CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::memory::{Fault, InMemoryContainer};
    use crate::notifications::LocalNotificationCenter;
    use tempfile::TempDir;

    fn fruits_facade<'a>(
        container: &'a mut InMemoryContainer,
        cache: &TempDir,
    ) -> FruitsFacade<&'a mut InMemoryContainer> {
        FruitsFacade::new(container, FruitsOptions::new(cache.path().to_path_buf()))
    }

    #[test]
    fn account_facade_loads_on_construction() {
        let container = InMemoryContainer::new().with_given_name("Frank");
        let facade = AccountFacade::new(container);

        assert!(facade.state().is_signed_in);
        assert!(facade.state().permission_status);
        assert_eq!(facade.state().user_name, "Frank");
    }

    #[test]
    fn account_facade_calls_are_repeatable() {
        let mut facade = AccountFacade::new(InMemoryContainer::new().with_given_name("Frank"));
        assert_eq!(facade.check_account_status(), AccountStatus::Available);
        assert_eq!(
            facade.request_discoverability_permission(),
            ApplicationPermissionStatus::Granted
        );
        let id = facade.resolve_current_user_id().unwrap();
        assert_eq!(facade.resolve_display_name(&id).as_deref(), Some("Frank"));
    }

    #[test]
    fn submit_then_refresh_puts_newest_first() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        let mut facade = fruits_facade(&mut container, &cache);

        facade.submit("Banana");
        facade.submit("Apple");

        assert_eq!(facade.fruits()[0].name, "Apple");
        assert_eq!(facade.fruits()[1].name, "Banana");
        assert!(facade.fruits()[0].image_url.is_some());
    }

    #[test]
    fn open_fetches_exactly_once() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        fruits_facade(&mut container, &cache).submit("Apple");
        let before = container.query_count();

        let (facade, loaded) =
            FruitsFacade::open(&mut container, FruitsOptions::new(cache.path().to_path_buf()));

        assert_eq!(loaded.listed_fruits.map(|f| f.len()), Some(1));
        assert_eq!(facade.fruits().len(), 1);
        drop(facade);
        assert_eq!(container.query_count(), before + 1);
    }

    #[test]
    fn add_text_clears_input_on_success() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        let mut facade = fruits_facade(&mut container, &cache);

        facade.set_text("Mango");
        let result = facade.add_text();

        assert!(result.is_confirmed());
        assert_eq!(facade.text(), "");
        assert_eq!(facade.fruits().len(), 1);
    }

    #[test]
    fn failed_submit_keeps_input() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        container.fail(Fault::SaveRecord);
        let mut facade = fruits_facade(&mut container, &cache);

        facade.set_text("Mango");
        facade.add_text();

        assert_eq!(facade.text(), "Mango");
        assert!(facade.fruits().is_empty());
    }

    #[test]
    fn failed_refresh_keeps_stale_list() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        let mut facade = fruits_facade(&mut container, &cache);
        facade.submit("Apple");

        facade.container_mut().fail(Fault::Query);
        let result = facade.refresh();

        assert!(result.listed_fruits.is_none());
        assert_eq!(facade.fruits().len(), 1);
    }

    #[test]
    fn update_round_trips_placeholder() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        let mut facade = fruits_facade(&mut container, &cache);
        facade.submit("Apple");

        let item = facade.fruits()[0].clone();
        facade.update(&item);

        assert_eq!(facade.fruits().len(), 1);
        assert_eq!(facade.fruits()[0].name, update::PLACEHOLDER_NAME);
        assert_eq!(facade.fruits()[0].record.id, item.record.id);
    }

    #[test]
    fn delete_at_commits_after_confirmation() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();
        let mut facade = fruits_facade(&mut container, &cache);
        facade.submit("Apple");
        facade.submit("Banana");

        facade.container_mut().fail(Fault::DeleteRecord);
        facade.delete_at(0).unwrap();
        assert_eq!(facade.fruits().len(), 2);

        facade.container_mut().recover(Fault::DeleteRecord);
        facade.delete_at(0).unwrap();
        assert_eq!(facade.fruits().len(), 1);
        assert_eq!(facade.fruits()[0].name, "Apple");
    }

    #[test]
    fn facades_can_share_one_container() {
        let cache = TempDir::new().unwrap();
        let mut container = InMemoryContainer::new();

        fruits_facade(&mut container, &cache).submit("Apple");
        let mut subscriptions =
            SubscriptionFacade::new(&mut container, LocalNotificationCenter::new(true));
        subscriptions.subscribe();

        assert_eq!(container.record_count(), 1);
        assert_eq!(
            container.subscription_count(subscription::FRUIT_ADDED_SUBSCRIPTION_ID),
            1
        );
    }

    #[test]
    fn subscription_facade_dispatches() {
        let mut facade =
            SubscriptionFacade::new(InMemoryContainer::new(), LocalNotificationCenter::new(true));

        facade.request_push_permission();
        assert!(facade.notifications().is_registered());

        facade.subscribe();
        assert_eq!(facade.subscriptions().unwrap().subscriptions.len(), 1);
        facade.unsubscribe();
        assert!(facade.subscriptions().unwrap().subscriptions.is_empty());
    }
}

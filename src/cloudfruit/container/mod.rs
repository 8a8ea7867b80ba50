//! # Container Layer
//!
//! A container is the single access point to the record service: account
//! status, identity discovery, the public record database (records, assets,
//! queries) and push subscriptions. The [`Container`] trait keeps the facades
//! decoupled from where the service actually lives.
//!
//! ## Implementations
//!
//! - [`fs::FileContainer`]: a directory playing the service for the CLI
//!   - `records.json`, `subscriptions.json` and `account.json`
//!   - uploaded assets copied to `assets/asset-{uuid}`
//!
//! - [`memory::InMemoryContainer`]: in-process service for tests
//!   - no persistence
//!   - injectable faults for every remote call
//!
//! ## Handles, Not Singletons
//!
//! Nothing in the crate reaches for a process-wide default container. Facades
//! receive one when they are built. `&mut C` is itself a container, so several
//! facades can take turns on the same instance.
//!
//! ## Server Semantics
//!
//! Both implementations follow the same rules:
//! - saving a record assigns `created_at` on first save and `modified_at` on
//!   every save; creation times handed out by one container strictly increase
//! - saving uploads every asset field and returns the record with asset URLs
//!   pointing at the container's copy
//! - saving a record or a subscription whose id exists overwrites it
//! - deleting an unknown record or subscription fails

use crate::error::Result;
use crate::model::{
    AccountStatus, ApplicationPermission, ApplicationPermissionStatus, Record, RecordId,
    Subscription, UserIdentity,
};
use crate::query::{QueryOperation, QueryResultSink};
use chrono::{DateTime, Duration, Utc};

pub mod fs;
pub mod memory;

/// Abstract interface to the record service.
pub trait Container {
    /// Status of the account the device is signed in with.
    fn account_status(&self) -> Result<AccountStatus>;

    /// Ask the user to grant an application permission.
    fn request_application_permission(
        &mut self,
        permission: ApplicationPermission,
    ) -> Result<ApplicationPermissionStatus>;

    /// Record id of the current user, if the service knows one.
    fn fetch_user_record_id(&self) -> Result<Option<RecordId>>;

    /// Identity for a user record id, if the user is discoverable.
    fn discover_user_identity(&self, user_record_id: &RecordId) -> Result<Option<UserIdentity>>;

    /// Save a record (create or overwrite), uploading its assets.
    fn save_record(&mut self, record: &Record) -> Result<Record>;

    fn fetch_record(&self, id: &RecordId) -> Result<Record>;

    /// Delete a record, returning the id of what was removed.
    fn delete_record(&mut self, id: &RecordId) -> Result<RecordId>;

    /// Run a query operation, pushing its results into `sink`.
    ///
    /// Failures are reported through the sink, never returned.
    fn add_query_operation(&self, operation: &QueryOperation, sink: &mut dyn QueryResultSink);

    /// Save a subscription (create or overwrite).
    fn save_subscription(&mut self, subscription: &Subscription) -> Result<Subscription>;

    fn delete_subscription(&mut self, id: &str) -> Result<String>;

    fn fetch_all_subscriptions(&self) -> Result<Vec<Subscription>>;
}

impl<C: Container + ?Sized> Container for &mut C {
    fn account_status(&self) -> Result<AccountStatus> {
        (**self).account_status()
    }

    fn request_application_permission(
        &mut self,
        permission: ApplicationPermission,
    ) -> Result<ApplicationPermissionStatus> {
        (**self).request_application_permission(permission)
    }

    fn fetch_user_record_id(&self) -> Result<Option<RecordId>> {
        (**self).fetch_user_record_id()
    }

    fn discover_user_identity(&self, user_record_id: &RecordId) -> Result<Option<UserIdentity>> {
        (**self).discover_user_identity(user_record_id)
    }

    fn save_record(&mut self, record: &Record) -> Result<Record> {
        (**self).save_record(record)
    }

    fn fetch_record(&self, id: &RecordId) -> Result<Record> {
        (**self).fetch_record(id)
    }

    fn delete_record(&mut self, id: &RecordId) -> Result<RecordId> {
        (**self).delete_record(id)
    }

    fn add_query_operation(&self, operation: &QueryOperation, sink: &mut dyn QueryResultSink) {
        (**self).add_query_operation(operation, sink)
    }

    fn save_subscription(&mut self, subscription: &Subscription) -> Result<Subscription> {
        (**self).save_subscription(subscription)
    }

    fn delete_subscription(&mut self, id: &str) -> Result<String> {
        (**self).delete_subscription(id)
    }

    fn fetch_all_subscriptions(&self) -> Result<Vec<Subscription>> {
        (**self).fetch_all_subscriptions()
    }
}

/// Creation time for the next new record, strictly after `latest`.
pub(crate) fn next_creation_time(latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match latest {
        Some(latest) if now <= latest => latest + Duration::microseconds(1),
        _ => now,
    }
}

/// Stamps server timestamps on a record about to be stored.
///
/// `existing` is the stored version with the same id, if any.
pub(crate) fn stamp(
    record: &mut Record,
    existing: Option<&Record>,
    latest_creation: Option<DateTime<Utc>>,
) {
    record.created_at = match existing.and_then(|r| r.created_at) {
        Some(created) => Some(created),
        None => Some(next_creation_time(latest_creation)),
    };
    record.modified_at = Some(Utc::now());
}

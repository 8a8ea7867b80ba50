use super::{stamp, Container};
use crate::error::{CloudError, Result};
use crate::model::{
    AccountStatus, ApplicationPermission, ApplicationPermissionStatus, NameComponents, Record,
    RecordId, Subscription, UserIdentity,
};
use crate::query::{evaluate, QueryOperation, QueryResultSink};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fs;
use url::Url;
use uuid::Uuid;

/// Remote calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    AccountStatus,
    UserRecordId,
    SaveRecord,
    DeleteRecord,
    Query,
    SaveSubscription,
    DeleteSubscription,
}

/// In-memory container for testing and development.
/// Does NOT persist data.
pub struct InMemoryContainer {
    status: AccountStatus,
    permission_response: ApplicationPermissionStatus,
    permission: ApplicationPermissionStatus,
    user: Option<UserIdentity>,
    records: HashMap<RecordId, Record>,
    assets: HashMap<String, Vec<u8>>,
    subscriptions: HashMap<String, Subscription>,
    faults: HashSet<Fault>,
    queries: Cell<usize>,
}

impl Default for InMemoryContainer {
    fn default() -> Self {
        Self {
            status: AccountStatus::Available,
            permission_response: ApplicationPermissionStatus::Granted,
            permission: ApplicationPermissionStatus::InitialState,
            user: Some(UserIdentity {
                user_record_id: RecordId::new(),
                name_components: None,
            }),
            records: HashMap::new(),
            assets: HashMap::new(),
            subscriptions: HashMap::new(),
            faults: HashSet::new(),
            queries: Cell::new(0),
        }
    }
}

impl InMemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Answer given when an application permission is requested.
    pub fn with_permission_response(mut self, response: ApplicationPermissionStatus) -> Self {
        self.permission_response = response;
        self
    }

    pub fn with_given_name(mut self, given_name: &str) -> Self {
        if let Some(user) = self.user.as_mut() {
            user.name_components = Some(NameComponents {
                given_name: Some(given_name.to_string()),
                family_name: None,
            });
        }
        self
    }

    pub fn without_user(mut self) -> Self {
        self.user = None;
        self
    }

    pub fn fail(&mut self, fault: Fault) {
        self.faults.insert(fault);
    }

    pub fn recover(&mut self, fault: Fault) {
        self.faults.remove(&fault);
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn subscription_count(&self, id: &str) -> usize {
        self.subscriptions.keys().filter(|k| k.as_str() == id).count()
    }

    /// Number of query operations run so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    pub fn permission(&self) -> ApplicationPermissionStatus {
        self.permission
    }

    /// Bytes of an uploaded asset.
    pub fn asset_data(&self, url: &Url) -> Option<&[u8]> {
        self.assets.get(url.as_str()).map(Vec::as_slice)
    }

    fn check(&self, fault: Fault) -> Result<()> {
        if self.faults.contains(&fault) {
            return Err(CloudError::ServiceUnavailable(format!(
                "{:?} is unavailable",
                fault
            )));
        }
        Ok(())
    }

    fn upload_assets(&mut self, record: &mut Record) -> Result<()> {
        for asset in record.assets_mut() {
            if asset.file_url.scheme() == "memory" {
                continue;
            }
            let path = asset.file_url.to_file_path().map_err(|_| {
                CloudError::Store(format!("Cannot upload asset from {}", asset.file_url))
            })?;
            let data = fs::read(path)?;
            let url = Url::parse(&format!("memory://assets/{}", Uuid::new_v4()))?;
            self.assets.insert(url.to_string(), data);
            asset.file_url = url;
        }
        Ok(())
    }
}

impl Container for InMemoryContainer {
    fn account_status(&self) -> Result<AccountStatus> {
        self.check(Fault::AccountStatus)?;
        Ok(self.status)
    }

    fn request_application_permission(
        &mut self,
        _permission: ApplicationPermission,
    ) -> Result<ApplicationPermissionStatus> {
        if self.permission == ApplicationPermissionStatus::InitialState {
            self.permission = self.permission_response;
        }
        Ok(self.permission)
    }

    fn fetch_user_record_id(&self) -> Result<Option<RecordId>> {
        self.check(Fault::UserRecordId)?;
        Ok(self.user.as_ref().map(|u| u.user_record_id.clone()))
    }

    fn discover_user_identity(&self, user_record_id: &RecordId) -> Result<Option<UserIdentity>> {
        if self.permission != ApplicationPermissionStatus::Granted {
            return Ok(None);
        }
        Ok(self
            .user
            .as_ref()
            .filter(|u| &u.user_record_id == user_record_id)
            .cloned())
    }

    fn save_record(&mut self, record: &Record) -> Result<Record> {
        self.check(Fault::SaveRecord)?;
        let mut stored = record.clone();
        self.upload_assets(&mut stored)?;
        let latest = self.records.values().filter_map(|r| r.created_at).max();
        stamp(&mut stored, self.records.get(&record.id), latest);
        self.records.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn fetch_record(&self, id: &RecordId) -> Result<Record> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| CloudError::RecordNotFound(id.clone()))
    }

    fn delete_record(&mut self, id: &RecordId) -> Result<RecordId> {
        self.check(Fault::DeleteRecord)?;
        self.records
            .remove(id)
            .map(|r| r.id)
            .ok_or_else(|| CloudError::RecordNotFound(id.clone()))
    }

    fn add_query_operation(&self, operation: &QueryOperation, sink: &mut dyn QueryResultSink) {
        self.queries.set(self.queries.get() + 1);
        if let Err(e) = self.check(Fault::Query) {
            sink.query_completed(Err(e));
            return;
        }
        let candidates: Vec<Record> = self.records.values().cloned().collect();
        let page = evaluate(operation, candidates, |r| r);
        for record in page.matches {
            let id = record.id.clone();
            sink.record_matched(&id, Ok(record));
        }
        sink.query_completed(Ok(page.cursor));
    }

    fn save_subscription(&mut self, subscription: &Subscription) -> Result<Subscription> {
        self.check(Fault::SaveSubscription)?;
        self.subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(subscription.clone())
    }

    fn delete_subscription(&mut self, id: &str) -> Result<String> {
        self.check(Fault::DeleteSubscription)?;
        self.subscriptions
            .remove(id)
            .map(|s| s.id)
            .ok_or_else(|| CloudError::SubscriptionNotFound(id.to_string()))
    }

    fn fetch_all_subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut all: Vec<_> = self.subscriptions.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{FieldValue, FRUITS_RECORD_TYPE, NAME_FIELD};

    pub struct ContainerFixture {
        pub container: InMemoryContainer,
    }

    impl Default for ContainerFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ContainerFixture {
        pub fn new() -> Self {
            Self {
                container: InMemoryContainer::new(),
            }
        }

        /// Saves fruits in order, so the last name is the newest record.
        pub fn with_fruits(mut self, names: &[&str]) -> Self {
            for name in names {
                let mut record = Record::new(FRUITS_RECORD_TYPE);
                record.set(NAME_FIELD, FieldValue::String(name.to_string()));
                self.container.save_record(&record).unwrap();
            }
            self
        }

        /// Saves a `Fruits` record with no name field.
        pub fn with_nameless_fruit(mut self) -> Self {
            let record = Record::new(FRUITS_RECORD_TYPE);
            self.container.save_record(&record).unwrap();
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::ContainerFixture;
    use super::*;
    use crate::model::{Asset, FieldValue, FRUITS_RECORD_TYPE, IMAGE_FIELD, NAME_FIELD};
    use crate::query::{Predicate, Query, QueryCursor};

    #[derive(Default)]
    struct Collect {
        ids: Vec<RecordId>,
        completed: Option<Result<Option<QueryCursor>>>,
    }

    impl QueryResultSink for Collect {
        fn record_matched(&mut self, id: &RecordId, _result: Result<Record>) {
            self.ids.push(id.clone());
        }

        fn query_completed(&mut self, result: Result<Option<QueryCursor>>) {
            self.completed = Some(result);
        }
    }

    #[test]
    fn save_assigns_server_fields() {
        let mut container = InMemoryContainer::new();
        let mut record = Record::new(FRUITS_RECORD_TYPE);
        record.set(NAME_FIELD, FieldValue::String("Pear".into()));

        let saved = container.save_record(&record).unwrap();
        assert!(saved.created_at.is_some());
        assert!(saved.modified_at.is_some());
        assert_eq!(container.fetch_record(&record.id).unwrap(), saved);
    }

    #[test]
    fn save_uploads_assets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pear.png");
        fs::write(&path, b"pear").unwrap();

        let mut container = InMemoryContainer::new();
        let mut record = Record::new(FRUITS_RECORD_TYPE);
        record.set(IMAGE_FIELD, FieldValue::Asset(Asset::from_path(&path).unwrap()));

        let saved = container.save_record(&record).unwrap();
        let url = &saved.asset(IMAGE_FIELD).unwrap().file_url;
        assert_eq!(url.scheme(), "memory");
        assert_eq!(container.asset_data(url), Some(&b"pear"[..]));
    }

    #[test]
    fn delete_unknown_record_fails() {
        let mut container = InMemoryContainer::new();
        assert!(matches!(
            container.delete_record(&RecordId::from("missing")),
            Err(CloudError::RecordNotFound(_))
        ));
    }

    #[test]
    fn query_fault_completes_with_error() {
        let mut fixture = ContainerFixture::new().with_fruits(&["Fig"]);
        fixture.container.fail(Fault::Query);

        let mut sink = Collect::default();
        let op = QueryOperation::new(Query::new(FRUITS_RECORD_TYPE, Predicate::All));
        fixture.container.add_query_operation(&op, &mut sink);

        assert!(sink.ids.is_empty());
        assert!(matches!(sink.completed, Some(Err(_))));
    }

    #[test]
    fn permission_answer_sticks() {
        let mut container = InMemoryContainer::new()
            .with_permission_response(ApplicationPermissionStatus::Denied);
        let first = container
            .request_application_permission(ApplicationPermission::UserDiscoverability)
            .unwrap();
        assert_eq!(first, ApplicationPermissionStatus::Denied);
        assert_eq!(container.permission(), ApplicationPermissionStatus::Denied);
    }
}

use super::{stamp, Container};
use crate::error::{CloudError, Result};
use crate::model::{
    AccountStatus, ApplicationPermission, ApplicationPermissionStatus, FieldValue, NameComponents,
    Record, RecordId, Subscription, UserIdentity,
};
use crate::query::{evaluate, QueryOperation, QueryResultSink};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

const ACCOUNT_FILE: &str = "account.json";
const RECORDS_FILE: &str = "records.json";
const SUBSCRIPTIONS_FILE: &str = "subscriptions.json";
const ASSETS_DIR: &str = "assets";

/// The account the container reports, stored in `account.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub status: AccountStatus,
    pub user_record_id: Option<RecordId>,
    #[serde(default)]
    pub name_components: Option<NameComponents>,
    /// Current answer to the discoverability permission.
    #[serde(default)]
    pub discoverability: ApplicationPermissionStatus,
    /// Answer given the first time the permission is requested.
    #[serde(default = "default_grant")]
    pub grant_discoverability: bool,
}

fn default_grant() -> bool {
    true
}

impl AccountProfile {
    pub fn signed_in(given_name: Option<String>) -> Self {
        Self {
            status: AccountStatus::Available,
            user_record_id: Some(RecordId::new()),
            name_components: given_name.map(|given| NameComponents {
                given_name: Some(given),
                family_name: None,
            }),
            discoverability: ApplicationPermissionStatus::InitialState,
            grant_discoverability: true,
        }
    }
}

/// A container backed by a local directory.
///
/// Every call re-reads the files it needs, so separate processes sharing a
/// root see each other's writes (last writer wins).
#[derive(Debug, Clone)]
pub struct FileContainer {
    root: PathBuf,
}

impl FileContainer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_initialized(&self) -> bool {
        self.root.join(ACCOUNT_FILE).exists()
    }

    /// Creates the directory layout and writes the account profile.
    pub fn initialize(&self, profile: &AccountProfile) -> Result<()> {
        self.ensure_dir(&self.root.join(ASSETS_DIR))?;
        self.save_account(profile)
    }

    pub fn load_account(&self) -> Result<Option<AccountProfile>> {
        let path = self.root.join(ACCOUNT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(CloudError::Io)?;
        let profile = serde_json::from_str(&content).map_err(CloudError::Serialization)?;
        Ok(Some(profile))
    }

    pub fn save_account(&self, profile: &AccountProfile) -> Result<()> {
        self.write_json(ACCOUNT_FILE, profile)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(CloudError::Io)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(path).map_err(CloudError::Io)?;
        serde_json::from_str(&content).map_err(CloudError::Serialization)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(value).map_err(CloudError::Serialization)?;
        fs::write(self.root.join(name), content).map_err(CloudError::Io)?;
        Ok(())
    }

    fn load_records(&self) -> Result<BTreeMap<RecordId, Record>> {
        self.read_json(RECORDS_FILE)
    }

    fn save_records(&self, records: &BTreeMap<RecordId, Record>) -> Result<()> {
        self.write_json(RECORDS_FILE, records)
    }

    fn load_subscriptions(&self) -> Result<BTreeMap<String, Subscription>> {
        self.read_json(SUBSCRIPTIONS_FILE)
    }

    fn save_subscriptions(&self, subscriptions: &BTreeMap<String, Subscription>) -> Result<()> {
        self.write_json(SUBSCRIPTIONS_FILE, subscriptions)
    }

    fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    /// Canonical form of `assets/`, matching the URLs handed out on upload.
    fn canonical_assets_dir(&self) -> PathBuf {
        let dir = self.assets_dir();
        fs::canonicalize(&dir).unwrap_or(dir)
    }

    fn is_stored_asset(&self, url: &Url) -> bool {
        let assets_dir = self.canonical_assets_dir();
        url.to_file_path()
            .map(|p| p.starts_with(assets_dir))
            .unwrap_or(false)
    }

    /// Copies every not-yet-uploaded asset into `assets/`.
    fn upload_assets(&self, record: &mut Record) -> Result<()> {
        let assets_dir = self.assets_dir();
        for asset in record.assets_mut() {
            if self.is_stored_asset(&asset.file_url) {
                continue;
            }
            let source = asset.file_url.to_file_path().map_err(|_| {
                CloudError::Store(format!("Cannot upload asset from {}", asset.file_url))
            })?;
            self.ensure_dir(&assets_dir)?;
            let target = assets_dir.join(format!("asset-{}", Uuid::new_v4()));
            fs::copy(&source, &target).map_err(CloudError::Io)?;
            let target = fs::canonicalize(&target).map_err(CloudError::Io)?;
            asset.file_url = Url::from_file_path(&target).map_err(|_| {
                CloudError::Store(format!("Invalid asset path: {}", target.display()))
            })?;
        }
        Ok(())
    }

    /// A stored record whose asset files have gone missing cannot be served.
    fn check_assets(record: &Record) -> Result<()> {
        for value in record.fields.values() {
            if let FieldValue::Asset(asset) = value {
                let exists = asset
                    .file_url
                    .to_file_path()
                    .map(|p| p.exists())
                    .unwrap_or(false);
                if !exists {
                    return Err(CloudError::Store(format!(
                        "Asset missing for record {}: {}",
                        record.id, asset.file_url
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Container for FileContainer {
    fn account_status(&self) -> Result<AccountStatus> {
        Ok(self
            .load_account()?
            .map(|p| p.status)
            .unwrap_or(AccountStatus::NoAccount))
    }

    fn request_application_permission(
        &mut self,
        _permission: ApplicationPermission,
    ) -> Result<ApplicationPermissionStatus> {
        let Some(mut profile) = self.load_account()? else {
            return Ok(ApplicationPermissionStatus::CouldNotComplete);
        };
        if profile.discoverability == ApplicationPermissionStatus::InitialState {
            profile.discoverability = if profile.grant_discoverability {
                ApplicationPermissionStatus::Granted
            } else {
                ApplicationPermissionStatus::Denied
            };
            self.save_account(&profile)?;
        }
        Ok(profile.discoverability)
    }

    fn fetch_user_record_id(&self) -> Result<Option<RecordId>> {
        Ok(self.load_account()?.and_then(|p| p.user_record_id))
    }

    fn discover_user_identity(&self, user_record_id: &RecordId) -> Result<Option<UserIdentity>> {
        let Some(profile) = self.load_account()? else {
            return Ok(None);
        };
        if profile.discoverability != ApplicationPermissionStatus::Granted
            || profile.user_record_id.as_ref() != Some(user_record_id)
        {
            return Ok(None);
        }
        Ok(Some(UserIdentity {
            user_record_id: user_record_id.clone(),
            name_components: profile.name_components,
        }))
    }

    fn save_record(&mut self, record: &Record) -> Result<Record> {
        let mut records = self.load_records()?;
        let mut stored = record.clone();
        self.upload_assets(&mut stored)?;
        let latest = records.values().filter_map(|r| r.created_at).max();
        stamp(&mut stored, records.get(&record.id), latest);
        records.insert(stored.id.clone(), stored.clone());
        self.save_records(&records)?;
        Ok(stored)
    }

    fn fetch_record(&self, id: &RecordId) -> Result<Record> {
        self.load_records()?
            .remove(id)
            .ok_or_else(|| CloudError::RecordNotFound(id.clone()))
    }

    fn delete_record(&mut self, id: &RecordId) -> Result<RecordId> {
        let mut records = self.load_records()?;
        let Some(removed) = records.remove(id) else {
            return Err(CloudError::RecordNotFound(id.clone()));
        };
        self.save_records(&records)?;

        // Stored asset files belong to exactly one record.
        for value in removed.fields.values() {
            if let FieldValue::Asset(asset) = value {
                if !self.is_stored_asset(&asset.file_url) {
                    continue;
                }
                if let Ok(path) = asset.file_url.to_file_path() {
                    if path.exists() {
                        fs::remove_file(path).map_err(CloudError::Io)?;
                    }
                }
            }
        }
        Ok(removed.id)
    }

    fn add_query_operation(&self, operation: &QueryOperation, sink: &mut dyn QueryResultSink) {
        let records = match self.load_records() {
            Ok(records) => records,
            Err(e) => {
                sink.query_completed(Err(e));
                return;
            }
        };
        let candidates: Vec<Record> = records.into_values().collect();
        let page = evaluate(operation, candidates, |r| r);
        for record in page.matches {
            let id = record.id.clone();
            let result = Self::check_assets(&record).map(|_| record);
            sink.record_matched(&id, result);
        }
        sink.query_completed(Ok(page.cursor));
    }

    fn save_subscription(&mut self, subscription: &Subscription) -> Result<Subscription> {
        let mut subscriptions = self.load_subscriptions()?;
        subscriptions.insert(subscription.id.clone(), subscription.clone());
        self.save_subscriptions(&subscriptions)?;
        Ok(subscription.clone())
    }

    fn delete_subscription(&mut self, id: &str) -> Result<String> {
        let mut subscriptions = self.load_subscriptions()?;
        let Some(removed) = subscriptions.remove(id) else {
            return Err(CloudError::SubscriptionNotFound(id.to_string()));
        };
        self.save_subscriptions(&subscriptions)?;
        Ok(removed.id)
    }

    fn fetch_all_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.load_subscriptions()?.into_values().collect())
    }
}

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use url::Url;
use uuid::Uuid;

pub const FRUITS_RECORD_TYPE: &str = "Fruits";
pub const NAME_FIELD: &str = "name";
pub const IMAGE_FIELD: &str = "image";

/// Server-side unique name of a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to binary data held by the service.
///
/// Before a save the URL points at the local file to upload; records returned
/// by a container point at the container's own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub file_url: Url,
}

impl Asset {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_url = Url::from_file_path(path).map_err(|_| {
            CloudError::Store(format!("Asset path must be absolute: {}", path.display()))
        })?;
        Ok(Self { file_url })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Asset(Asset),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub record_type: String,
    /// Assigned by the container on first save.
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            record_type: record_type.into(),
            created_at: None,
            modified_at: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn string(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn asset(&self, field: &str) -> Option<&Asset> {
        match self.fields.get(field) {
            Some(FieldValue::Asset(a)) => Some(a),
            _ => None,
        }
    }

    pub fn assets_mut(&mut self) -> impl Iterator<Item = &mut Asset> {
        self.fields.values_mut().filter_map(|value| match value {
            FieldValue::Asset(a) => Some(a),
            _ => None,
        })
    }
}

/// View-facing projection of a `Fruits` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FruitItem {
    pub name: String,
    pub image_url: Option<Url>,
    pub record: Record,
}

impl FruitItem {
    pub fn from_record(record: Record) -> Result<Self> {
        let name = record
            .string(NAME_FIELD)
            .ok_or_else(|| CloudError::MissingField(NAME_FIELD.to_string()))?
            .to_string();
        let image_url = record.asset(IMAGE_FIELD).map(|a| a.file_url.clone());
        Ok(Self {
            name,
            image_url,
            record,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Available,
    NoAccount,
    Restricted,
    CouldNotDetermine,
    TemporarilyUnavailable,
    Unknown,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 6] = [
        AccountStatus::Available,
        AccountStatus::NoAccount,
        AccountStatus::Restricted,
        AccountStatus::CouldNotDetermine,
        AccountStatus::TemporarilyUnavailable,
        AccountStatus::Unknown,
    ];

    /// The failure a non-available status stands for.
    pub fn error(&self) -> Option<CloudError> {
        match self {
            AccountStatus::Available => None,
            AccountStatus::NoAccount => Some(CloudError::AccountNotFound),
            AccountStatus::CouldNotDetermine => Some(CloudError::AccountNotDetermined),
            AccountStatus::Restricted => Some(CloudError::AccountRestricted),
            AccountStatus::TemporarilyUnavailable => {
                Some(CloudError::AccountTemporarilyUnavailable)
            }
            AccountStatus::Unknown => Some(CloudError::AccountUnknown),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationPermission {
    UserDiscoverability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationPermissionStatus {
    #[default]
    InitialState,
    CouldNotComplete,
    Denied,
    Granted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameComponents {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_record_id: RecordId,
    pub name_components: Option<NameComponents>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTrigger {
    FiresOnRecordCreation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationInfo {
    pub title: Option<String>,
    pub alert_body: Option<String>,
    pub sound_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub record_type: String,
    pub predicate: crate::query::Predicate,
    pub triggers: Vec<SubscriptionTrigger>,
    pub notification_info: NotificationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unavailable_status_maps_to_its_own_error() {
        let messages: Vec<String> = AccountStatus::ALL
            .iter()
            .filter_map(|s| s.error())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(messages.len(), 5);
        let mut unique = messages.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        assert!(AccountStatus::Available.error().is_none());
    }

    #[test]
    fn fruit_item_requires_a_name() {
        let record = Record::new(FRUITS_RECORD_TYPE);
        assert!(matches!(
            FruitItem::from_record(record),
            Err(CloudError::MissingField(_))
        ));
    }

    #[test]
    fn fruit_item_picks_up_image_url() {
        let mut record = Record::new(FRUITS_RECORD_TYPE);
        record.set(NAME_FIELD, FieldValue::String("Apple".into()));
        let url = Url::parse("file:///tmp/apple.png").unwrap();
        record.set(
            IMAGE_FIELD,
            FieldValue::Asset(Asset {
                file_url: url.clone(),
            }),
        );

        let item = FruitItem::from_record(record).unwrap();
        assert_eq!(item.name, "Apple");
        assert_eq!(item.image_url, Some(url));
    }

    #[test]
    fn field_values_serialize_tagged() {
        let json = serde_json::to_string(&FieldValue::String("Kiwi".into())).unwrap();
        assert_eq!(json, r#"{"type":"string","value":"Kiwi"}"#);
    }
}

use crate::commands::{CmdMessage, CmdResult};
use crate::container::Container;
use crate::error::{CloudError, Result};
use crate::model::{NotificationInfo, Subscription, SubscriptionTrigger, FRUITS_RECORD_TYPE};
use crate::notifications::{AuthorizationOptions, NotificationCenter};
use crate::query::Predicate;

pub const FRUIT_ADDED_SUBSCRIPTION_ID: &str = "fruit_added_to_database";

/// Push subscription firing whenever any fruit is created.
pub fn fruit_added_subscription() -> Subscription {
    Subscription {
        id: FRUIT_ADDED_SUBSCRIPTION_ID.to_string(),
        record_type: FRUITS_RECORD_TYPE.to_string(),
        predicate: Predicate::All,
        triggers: vec![SubscriptionTrigger::FiresOnRecordCreation],
        notification_info: NotificationInfo {
            title: Some("There's a new fruit!".to_string()),
            alert_body: Some("Open the app to check your fruits.".to_string()),
            sound_name: Some("default".to_string()),
        },
    }
}

/// Asks for alert, sound and badge permission; registers for pushes if granted.
pub fn request_permission<N: NotificationCenter>(notifications: &mut N) -> CmdResult {
    let mut result = CmdResult::default();
    match notifications.request_authorization(AuthorizationOptions::all()) {
        Ok(true) => {
            log::info!("Notification permissions granted");
            if let Err(e) = notifications.register_for_remote_notifications() {
                log::error!("Registering for remote notifications failed: {}", e);
                return result;
            }
            result.add_message(CmdMessage::success("Notification permissions granted."));
        }
        Ok(false) => {
            let denied = CloudError::PermissionDenied("notifications".to_string());
            log::warn!("{}", denied);
            result.add_message(CmdMessage::warning(format!("{}.", denied)));
        }
        Err(e) => log::error!("Notification permission request failed: {}", e),
    }
    result
}

pub fn subscribe<C: Container>(container: &mut C) -> CmdResult {
    let mut result = CmdResult::default();
    match container.save_subscription(&fruit_added_subscription()) {
        Ok(saved) => {
            log::info!("Subscribed as {}", saved.id);
            result.add_message(CmdMessage::success("Subscribed to new fruit notifications."));
            result.with_subscriptions(vec![saved])
        }
        Err(e) => {
            log::error!("Subscribing failed: {}", e);
            result
        }
    }
}

pub fn unsubscribe<C: Container>(container: &mut C) -> CmdResult {
    let mut result = CmdResult::default();
    match container.delete_subscription(FRUIT_ADDED_SUBSCRIPTION_ID) {
        Ok(id) => {
            log::info!("Deleted subscription {}", id);
            result.add_message(CmdMessage::success(
                "Unsubscribed from new fruit notifications.",
            ));
        }
        Err(e) => log::error!("Unsubscribing failed: {}", e),
    }
    result
}

pub fn list<C: Container>(container: &C) -> Result<CmdResult> {
    let subscriptions = container.fetch_all_subscriptions()?;
    Ok(CmdResult::default().with_subscriptions(subscriptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::container::memory::{Fault, InMemoryContainer};
    use crate::notifications::LocalNotificationCenter;

    #[test]
    fn granted_permission_registers_device() {
        let mut center = LocalNotificationCenter::new(true);
        let result = request_permission(&mut center);

        assert_eq!(center.authorized(), Some(AuthorizationOptions::all()));
        assert!(center.is_registered());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn denied_permission_does_not_register() {
        let mut center = LocalNotificationCenter::new(false);
        let result = request_permission(&mut center);

        assert!(center.authorized().is_none());
        assert!(!center.is_registered());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert_eq!(
            result.messages[0].content,
            "Permission denied: notifications."
        );
    }

    #[test]
    fn subscribing_twice_keeps_one_subscription() {
        let mut container = InMemoryContainer::new();
        assert_eq!(subscribe(&mut container).subscriptions.len(), 1);
        assert_eq!(subscribe(&mut container).subscriptions.len(), 1);

        assert_eq!(container.subscription_count(FRUIT_ADDED_SUBSCRIPTION_ID), 1);
        let all = list(&container).unwrap().subscriptions;
        assert_eq!(all, vec![fruit_added_subscription()]);
    }

    #[test]
    fn unsubscribe_removes_the_subscription() {
        let mut container = InMemoryContainer::new();
        subscribe(&mut container);
        let result = unsubscribe(&mut container);

        assert_eq!(result.messages.len(), 1);
        assert_eq!(container.subscription_count(FRUIT_ADDED_SUBSCRIPTION_ID), 0);
    }

    #[test]
    fn unsubscribe_without_subscription_is_swallowed() {
        let mut container = InMemoryContainer::new();
        let result = unsubscribe(&mut container);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn failed_remote_unsubscribe_is_swallowed() {
        let mut container = InMemoryContainer::new();
        subscribe(&mut container);
        container.fail(Fault::DeleteSubscription);

        let result = unsubscribe(&mut container);
        assert!(result.messages.is_empty());
        assert_eq!(container.subscription_count(FRUIT_ADDED_SUBSCRIPTION_ID), 1);

        container.recover(Fault::DeleteSubscription);
        unsubscribe(&mut container);
        assert_eq!(container.subscription_count(FRUIT_ADDED_SUBSCRIPTION_ID), 0);
    }

    #[test]
    fn failed_subscribe_is_swallowed() {
        let mut container = InMemoryContainer::new();
        container.fail(Fault::SaveSubscription);
        let result = subscribe(&mut container);

        assert!(result.subscriptions.is_empty());
        assert_eq!(container.subscription_count(FRUIT_ADDED_SUBSCRIPTION_ID), 0);
    }

    #[test]
    fn subscription_fires_on_creation_only() {
        let subscription = fruit_added_subscription();
        assert_eq!(
            subscription.triggers,
            vec![SubscriptionTrigger::FiresOnRecordCreation]
        );
        assert_eq!(subscription.record_type, "Fruits");
    }
}

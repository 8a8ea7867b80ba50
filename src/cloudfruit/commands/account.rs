//! Account status, discoverability and the current user's name.
//!
//! Every call here is a separate round-trip whose result only touches its own
//! fields of [`AccountState`]. Failures never propagate: status failures end
//! up in `state.error`, everything else is logged and leaves state alone.

use crate::container::Container;
use crate::model::{AccountStatus, ApplicationPermission, ApplicationPermissionStatus, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    pub permission_status: bool,
    pub is_signed_in: bool,
    pub error: String,
    pub user_name: String,
}

/// Issues all four account calls in start order.
pub fn run<C: Container>(container: &mut C) -> AccountState {
    let mut state = AccountState::default();
    check_status(container, &mut state);
    request_permission(container, &mut state);
    if let Some(id) = fetch_user_record_id(container) {
        discover_user(container, &id, &mut state);
    }
    state
}

/// A status query that fails outright counts as `CouldNotDetermine`.
pub fn check_status<C: Container>(container: &C, state: &mut AccountState) -> AccountStatus {
    let status = match container.account_status() {
        Ok(status) => status,
        Err(e) => {
            log::error!("Account status query failed: {}", e);
            AccountStatus::CouldNotDetermine
        }
    };

    match status.error() {
        None => state.is_signed_in = true,
        Some(e) => state.error = e.to_string(),
    }
    status
}

pub fn request_permission<C: Container>(
    container: &mut C,
    state: &mut AccountState,
) -> ApplicationPermissionStatus {
    let status =
        match container.request_application_permission(ApplicationPermission::UserDiscoverability)
        {
            Ok(status) => status,
            Err(e) => {
                log::error!("Discoverability request failed: {}", e);
                ApplicationPermissionStatus::CouldNotComplete
            }
        };

    if status == ApplicationPermissionStatus::Granted {
        state.permission_status = true;
    }
    status
}

pub fn fetch_user_record_id<C: Container>(container: &C) -> Option<RecordId> {
    match container.fetch_user_record_id() {
        Ok(id) => id,
        Err(e) => {
            log::error!("Fetching user record id failed: {}", e);
            None
        }
    }
}

pub fn discover_user<C: Container>(
    container: &C,
    user_record_id: &RecordId,
    state: &mut AccountState,
) -> Option<String> {
    let identity = match container.discover_user_identity(user_record_id) {
        Ok(identity) => identity,
        Err(e) => {
            log::error!("User discovery failed: {}", e);
            return None;
        }
    };

    let name = identity
        .and_then(|i| i.name_components)
        .and_then(|n| n.given_name)?;
    state.user_name = name.clone();
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::memory::{Fault, InMemoryContainer};
    use crate::error::CloudError;

    #[test]
    fn available_account_is_signed_in() {
        let mut container = InMemoryContainer::new().with_given_name("Frank");
        let state = run(&mut container);

        assert!(state.is_signed_in);
        assert!(state.error.is_empty());
        assert!(state.permission_status);
        assert_eq!(state.user_name, "Frank");
    }

    #[test]
    fn each_status_has_exactly_one_outcome() {
        let mut errors = Vec::new();
        for status in AccountStatus::ALL {
            let container = InMemoryContainer::new().with_account_status(status);
            let mut state = AccountState::default();
            assert_eq!(check_status(&container, &mut state), status);

            if status == AccountStatus::Available {
                assert!(state.is_signed_in);
                assert!(state.error.is_empty());
            } else {
                assert!(!state.is_signed_in);
                assert!(!state.error.is_empty());
                errors.push(state.error);
            }
        }

        errors.sort();
        errors.dedup();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn failed_status_query_is_not_determined() {
        let mut container = InMemoryContainer::new();
        container.fail(Fault::AccountStatus);
        let mut state = AccountState::default();

        let status = check_status(&container, &mut state);
        assert_eq!(status, AccountStatus::CouldNotDetermine);
        assert_eq!(
            state,
            AccountState {
                error: CloudError::AccountNotDetermined.to_string(),
                ..AccountState::default()
            }
        );
    }

    #[test]
    fn denied_permission_leaves_state_untouched() {
        let mut container = InMemoryContainer::new()
            .with_permission_response(ApplicationPermissionStatus::Denied)
            .with_given_name("Frank");
        let state = run(&mut container);

        assert!(!state.permission_status);
        // Not discoverable, so no name either.
        assert!(state.user_name.is_empty());
    }

    #[test]
    fn missing_user_id_is_silent() {
        let mut container = InMemoryContainer::new().without_user();
        let state = run(&mut container);

        assert!(state.is_signed_in);
        assert!(state.user_name.is_empty());
    }

    #[test]
    fn failed_user_id_lookup_is_silent() {
        let mut container = InMemoryContainer::new().with_given_name("Frank");
        container.fail(Fault::UserRecordId);
        let state = run(&mut container);

        assert!(state.user_name.is_empty());
        assert!(state.permission_status);
    }

    #[test]
    fn identity_without_given_name_is_a_no_op() {
        let mut container = InMemoryContainer::new();
        let mut state = AccountState {
            user_name: "previous".into(),
            ..AccountState::default()
        };
        request_permission(&mut container, &mut state);
        let id = fetch_user_record_id(&container).unwrap();

        assert_eq!(discover_user(&container, &id, &mut state), None);
        assert_eq!(state.user_name, "previous");
    }
}

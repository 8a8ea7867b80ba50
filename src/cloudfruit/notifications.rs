//! Local notification permissions and remote-notification registration.
//!
//! The OS prompt is outside the library; [`NotificationCenter`] is the seam.
//! [`LocalNotificationCenter`] answers with a preconfigured decision, which is
//! what the CLI and the tests use.

use crate::error::{CloudError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub sound: bool,
    pub badge: bool,
}

impl AuthorizationOptions {
    pub fn all() -> Self {
        Self {
            alert: true,
            sound: true,
            badge: true,
        }
    }
}

pub trait NotificationCenter {
    /// Ask the user for permission to show notifications.
    fn request_authorization(&mut self, options: AuthorizationOptions) -> Result<bool>;

    /// Register the device with the push service.
    fn register_for_remote_notifications(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct LocalNotificationCenter {
    grant: bool,
    authorized: Option<AuthorizationOptions>,
    registered: bool,
}

impl LocalNotificationCenter {
    pub fn new(grant: bool) -> Self {
        Self {
            grant,
            ..Self::default()
        }
    }

    pub fn authorized(&self) -> Option<AuthorizationOptions> {
        self.authorized
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl NotificationCenter for LocalNotificationCenter {
    fn request_authorization(&mut self, options: AuthorizationOptions) -> Result<bool> {
        if self.grant {
            self.authorized = Some(options);
        }
        Ok(self.grant)
    }

    fn register_for_remote_notifications(&mut self) -> Result<()> {
        if self.authorized.is_none() {
            return Err(CloudError::PermissionDenied(
                "remote notifications need authorization first".to_string(),
            ));
        }
        self.registered = true;
        Ok(())
    }
}

impl<N: NotificationCenter + ?Sized> NotificationCenter for &mut N {
    fn request_authorization(&mut self, options: AuthorizationOptions) -> Result<bool> {
        (**self).request_authorization(options)
    }

    fn register_for_remote_notifications(&mut self) -> Result<()> {
        (**self).register_for_remote_notifications()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_requires_authorization() {
        let mut center = LocalNotificationCenter::new(true);
        assert!(matches!(
            center.register_for_remote_notifications(),
            Err(CloudError::PermissionDenied(_))
        ));
        assert!(!center.is_registered());

        assert!(center
            .request_authorization(AuthorizationOptions::all())
            .unwrap());
        center.register_for_remote_notifications().unwrap();
        assert!(center.is_registered());
    }
}

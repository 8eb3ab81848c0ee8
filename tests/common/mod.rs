//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use deeplink_router::config::ProtocolConfig;
use deeplink_router::extensions::ExtensionCatalog;
use deeplink_router::presenter::{ExtensionInstaller, InstallRequest, Notification, NotificationSink};
use deeplink_router::routing::{ProcessKind, ProtocolRouter};

/// Collects every notification and install request.
#[derive(Debug, Default)]
pub struct Recorder {
    notifications: Mutex<Vec<Notification>>,
    installs: Mutex<Vec<InstallRequest>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn installs(&self) -> Vec<InstallRequest> {
        self.installs.lock().unwrap().clone()
    }
}

impl NotificationSink for Recorder {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

impl ExtensionInstaller for Recorder {
    fn install(&self, request: InstallRequest) {
        self.installs.lock().unwrap().push(request);
    }
}

/// Router with an empty registry and default protocol.
pub fn router(process: ProcessKind, catalog: &ExtensionCatalog) -> ProtocolRouter {
    ProtocolRouter::new(process, ProtocolConfig::default(), Arc::new(catalog.clone()))
}

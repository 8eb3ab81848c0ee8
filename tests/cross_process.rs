//! Main → renderer deep link flow through a running application.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use deeplink_router::config::CoordinatorConfig;
use deeplink_router::coordinator::RendererCoordinator;
use deeplink_router::extensions::{ExtensionCatalog, ExtensionId};
use deeplink_router::lifecycle::Application;
use deeplink_router::presenter::{InstallRequest, Notification, NotificationPresenter};
use deeplink_router::routing::{ProcessKind, ProtocolRouter};

use common::{router, Recorder};

fn main_router(catalog: &ExtensionCatalog, installs: Arc<AtomicUsize>) -> ProtocolRouter {
    let mut main = router(ProcessKind::Main, catalog);
    main.add_handler("/extensions/install/:publisher?/:name", move |_| {
        installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();
    main
}

fn start(windows: usize, catalog: &ExtensionCatalog, recorder: &Arc<Recorder>, main: ProtocolRouter) -> Application {
    let config = CoordinatorConfig {
        windows,
        ..CoordinatorConfig::default()
    };
    Application::start(&config, main, |id| {
        let mut renderer = router(ProcessKind::Renderer, catalog);
        renderer
            .add_handler("/landing", |_| Ok(()))?
            .add_handler("/cluster/:clusterId/settings", |_| Ok(()))?;
        let presenter = NotificationPresenter::new(recorder.clone()).with_installer(recorder.clone());
        Ok(RendererCoordinator::new(id, renderer, Arc::new(presenter)))
    })
    .unwrap()
}

#[tokio::test]
async fn test_main_only_route_is_silent_in_renderer() {
    let catalog = ExtensionCatalog::new();
    let recorder = Recorder::new();
    let installs = Arc::new(AtomicUsize::new(0));
    let app = start(1, &catalog, &recorder, main_router(&catalog, installs.clone()));

    app.open_url("app://app/extensions/install/acme/widget");
    app.open_url("app://app/cluster/abc/settings");
    app.close().await;

    assert_eq!(installs.load(Ordering::SeqCst), 1);
    assert!(recorder.notifications().is_empty());
}

#[tokio::test]
async fn test_every_window_presents_unknown_action() {
    let catalog = ExtensionCatalog::new();
    let recorder = Recorder::new();
    let app = start(3, &catalog, &recorder, main_router(&catalog, Arc::new(AtomicUsize::new(0))));

    app.open_url("app://app/totally/unknown/path");
    app.close().await;

    let notifications = recorder.notifications();
    assert_eq!(notifications.len(), 3);
    for notification in notifications {
        assert_eq!(
            notification,
            Notification::Info(
                "Unknown action `app://app/totally/unknown/path`. Are you on the latest version?".into()
            )
        );
    }
}

#[tokio::test]
async fn test_unknown_extension_offers_install() {
    let catalog = ExtensionCatalog::new();
    let recorder = Recorder::new();
    let app = start(1, &catalog, &recorder, main_router(&catalog, Arc::new(AtomicUsize::new(0))));

    app.open_url("app://extension/acme/widget/open?version=1.2.0");
    app.close().await;

    let notifications = recorder.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message().starts_with("Missing extension for action"));
    assert_eq!(
        recorder.installs(),
        vec![InstallRequest {
            extension: ExtensionId::new(Some("acme"), "widget"),
            version: Some("1.2.0".into()),
        }]
    );
}

#[tokio::test]
async fn test_malformed_link_is_reported_as_error() {
    let catalog = ExtensionCatalog::new();
    let recorder = Recorder::new();
    let app = start(2, &catalog, &recorder, main_router(&catalog, Arc::new(AtomicUsize::new(0))));

    app.open_url("other://app/landing");
    app.close().await;

    let notifications = recorder.notifications();
    assert_eq!(notifications.len(), 2);
    assert!(matches!(&notifications[0], Notification::Error(m) if m.starts_with("Failed to route `other://app/landing`")));
}

#[tokio::test]
async fn test_links_are_presented_in_arrival_order() {
    let catalog = ExtensionCatalog::new();
    let recorder = Recorder::new();
    let app = start(1, &catalog, &recorder, main_router(&catalog, Arc::new(AtomicUsize::new(0))));

    for i in 0..5 {
        app.open_url(format!("app://app/missing/{}", i));
    }
    app.close().await;

    let messages: Vec<String> = recorder
        .notifications()
        .iter()
        .map(|n| n.message().to_string())
        .collect();
    assert_eq!(messages.len(), 5);
    for (i, message) in messages.iter().enumerate() {
        assert!(message.contains(&format!("app://app/missing/{}", i)));
    }
}

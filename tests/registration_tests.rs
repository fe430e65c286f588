mod common;

use broker::infrastructure::json_file::FileConfig;
use broker::{BrokerError, BrokerEvents, ConfigProvider, HandlerInfo, ObjectType, RegistrationError, Registry};
use common::*;
use parking_lot::Mutex;
use std::fs;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_registration_events() {
    let fx = fixture();
    fx.registry.register(Arc::new(StringHandler::integer())).unwrap();
    fx.registry.register(Arc::new(StringHandler::nan())).unwrap();
    assert_eq!(RecordingEvents::count(&fx.events.registered), 2);

    fx.registry.register(Arc::new(StringHandler::alphanumeric())).unwrap();
    assert!(fx.registry.unregister(ALPHANUMERIC_ID));
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 1);

    // Nothing removed, nothing fired.
    assert!(!fx.registry.unregister(ALPHANUMERIC_ID));
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 1);
}

#[test]
fn test_rejected_registration_fires_nothing() {
    let fx = fixture();
    fx.config.set_disabled(INTEGER_ID, true);
    assert_eq!(
        fx.registry.register(Arc::new(StringHandler::integer())),
        Err(RegistrationError::Disabled(INTEGER_ID.to_string()))
    );
    assert_eq!(RecordingEvents::count(&fx.events.registered), 0);
    assert!(fx.registry.handlers().is_empty());
}

#[test]
fn test_same_id_supersedes_previous_handler() {
    let fx = fixture();
    let first = Arc::new(StringHandler::new("shared", 0, |s| s.starts_with('a')));
    let second = Arc::new(StringHandler::new("shared", 0, |s| s.starts_with('b')));

    fx.registry.register(first).unwrap();
    fx.registry.register(second).unwrap();

    assert_eq!(fx.registry.len(), 1);
    assert!(fx.registry.is_registered("shared"));
    assert_eq!(fx.registry.ranking(ObjectType::of::<String>()).len(), 1);
    assert!(fx.registry.for_purchase(player(), "apple".to_string()).is_none());
    assert!(fx.registry.for_purchase(player(), "banana".to_string()).is_some());

    assert_eq!(RecordingEvents::count(&fx.events.registered), 2);
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 1);
}

#[test]
fn test_reregistration_picks_up_new_priority() {
    let fx = fixture();
    fx.registry.register(Arc::new(StringHandler::catch_all())).unwrap();
    fx.registry.register(Arc::new(StringHandler::integer())).unwrap();
    assert_eq!(
        fx.registry.for_purchase(player(), "1".to_string()).unwrap().info().id(),
        INTEGER_ID
    );

    fx.config.set_priority(CATCH_ALL_ID, 99);
    fx.registry.register(Arc::new(StringHandler::catch_all())).unwrap();
    assert_eq!(
        fx.registry.for_purchase(player(), "1".to_string()).unwrap().info().id(),
        CATCH_ALL_ID
    );
}

#[test]
fn test_reload_applies_configuration_changes() {
    let fx = fixture();
    fx.registry.register(Arc::new(StringHandler::integer())).unwrap();
    fx.registry.register(Arc::new(StringHandler::catch_all())).unwrap();

    fx.config.set_disabled(INTEGER_ID, true);
    // Disablement only takes effect on reload.
    assert!(fx.registry.is_registered(INTEGER_ID));

    fx.registry.reload().unwrap();
    assert!(!fx.registry.is_registered(INTEGER_ID));
    assert!(fx.registry.is_registered(CATCH_ALL_ID));
    assert_eq!(
        fx.registry.for_purchase(player(), "5".to_string()).unwrap().info().id(),
        CATCH_ALL_ID
    );
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 1);

    fx.config.set_disabled(INTEGER_ID, false);
    fx.registry.reload().unwrap();
    assert!(fx.registry.is_registered(INTEGER_ID));
    assert_eq!(
        fx.registry.for_purchase(player(), "5".to_string()).unwrap().info().id(),
        INTEGER_ID
    );
}

#[test]
fn test_disabled_handler_returns_after_reenable() {
    let fx = fixture();
    fx.config.set_disabled(NAN_ID, true);
    assert!(fx.registry.register(Arc::new(StringHandler::nan())).is_err());

    fx.config.set_disabled(NAN_ID, false);
    fx.registry.reload().unwrap();
    assert!(fx.registry.is_registered(NAN_ID));
}

#[test]
fn test_explicit_unregister_survives_reload() {
    let fx = fixture();
    fx.registry.register(Arc::new(StringHandler::integer())).unwrap();
    fx.registry.unregister(INTEGER_ID);
    fx.registry.reload().unwrap();
    assert!(!fx.registry.is_registered(INTEGER_ID));
}

#[test]
fn test_reload_keeps_handler_references() {
    let fx = fixture();
    let handler = Arc::new(StringHandler::integer());
    fx.registry.register(handler.clone()).unwrap();
    fx.registry.reload().unwrap();

    let record = fx.registry.for_purchase(player(), "3".to_string()).unwrap().buy_one();
    assert!(record.complete());
    assert_eq!(handler.completed(), 1);
}

#[test]
fn test_reload_from_file_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broker.json");
    let config = Arc::new(FileConfig::open(&path).unwrap());
    let provider: Arc<dyn ConfigProvider> = config.clone();
    let registry = Registry::new(provider);

    registry.register(Arc::new(StringHandler::integer())).unwrap();
    registry.register(Arc::new(StringHandler::catch_all())).unwrap();
    assert!(config.is_dirty());
    config.save().unwrap();
    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains(INTEGER_ID));

    let edited = saved.replace(&format!("\"{}\": 10", INTEGER_ID), &format!("\"{}\": \"disabled\"", INTEGER_ID));
    fs::write(&path, edited).unwrap();
    registry.reload().unwrap();

    assert!(!registry.is_registered(INTEGER_ID));
    assert_eq!(
        registry.for_purchase(player(), "12".to_string()).unwrap().info().id(),
        CATCH_ALL_ID
    );
}

#[test]
fn test_failed_reload_leaves_registry_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broker.json");
    let config = Arc::new(FileConfig::open(&path).unwrap());
    let registry = Registry::new(config.clone());
    registry.register(Arc::new(StringHandler::integer())).unwrap();

    fs::write(&path, "not json at all").unwrap();
    assert!(matches!(registry.reload(), Err(BrokerError::ConfigError(_))));
    assert!(registry.is_registered(INTEGER_ID));
}

#[test]
fn test_handlers_snapshot() {
    let fx = fixture();
    fx.registry.register(Arc::new(StringHandler::nan())).unwrap();
    fx.registry.register(Arc::new(DecimalHandler)).unwrap();

    let ids: Vec<_> = fx.registry.handlers().into_iter().map(|h| h.id().to_string()).collect();
    assert_eq!(ids, vec![DECIMAL_ID.to_string(), NAN_ID.to_string()]);
    let info = fx.registry.info(NAN_ID).unwrap();
    assert_eq!(info.provider(), "tests");
    assert!(info.object_type().is::<String>());
    assert!(fx.registry.info("missing").is_none());
}

#[test]
fn test_concurrent_registration_and_dispatch() {
    let fx = fixture();
    let registry = Arc::new(fx.registry);
    registry.register(Arc::new(StringHandler::catch_all())).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    registry.register(Arc::new(StringHandler::integer())).unwrap();
                    registry.unregister(INTEGER_ID);
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let id = registry
                        .for_purchase(player(), "9".to_string())
                        .map(|m| m.info().id().to_string());
                    assert!(matches!(id.as_deref(), Some(INTEGER_ID) | Some(CATCH_ALL_ID)));
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }
    assert!(registry.is_registered(CATCH_ALL_ID));
}

#[test]
fn test_reload_requeries_declared_priority() {
    let fx = fixture();
    let handler = Arc::new(StringHandler::integer());
    fx.registry.register(handler.clone()).unwrap();
    fx.registry.register(Arc::new(StringHandler::catch_all())).unwrap();

    handler.declare_priority(-50);
    // Registration materialised the old declared priority as an override.
    assert!(fx.config.clear_priority(INTEGER_ID));
    fx.registry.reload().unwrap();

    let ranking = fx.registry.ranking(ObjectType::of::<String>());
    let order: Vec<_> = ranking.iter().map(|r| (r.info.id(), r.priority)).collect();
    assert_eq!(order, vec![(CATCH_ALL_ID, -10), (INTEGER_ID, -50)]);
    assert_eq!(
        fx.registry.for_purchase(player(), "1".to_string()).unwrap().info().id(),
        CATCH_ALL_ID
    );
}

#[test]
fn test_rejected_reregistration_is_not_restored_by_reload() {
    let fx = fixture();
    let active = Arc::new(StringHandler::integer());
    fx.registry.register(active.clone()).unwrap();

    fx.config.set_disabled(INTEGER_ID, true);
    let rejected = Arc::new(StringHandler::integer());
    assert_eq!(
        fx.registry.register(rejected.clone()),
        Err(RegistrationError::Disabled(INTEGER_ID.to_string()))
    );
    assert!(fx.registry.is_registered(INTEGER_ID));

    fx.config.set_disabled(INTEGER_ID, false);
    fx.registry.reload().unwrap();

    let record = fx.registry.for_purchase(player(), "2".to_string()).unwrap().buy_one();
    assert!(record.complete());
    assert_eq!(active.completed(), 1);
    assert_eq!(rejected.completed(), 0);
}

#[test]
fn test_reload_announces_only_changes() {
    let fx = fixture();
    fx.registry.register(Arc::new(StringHandler::integer())).unwrap();
    fx.registry.register(Arc::new(StringHandler::catch_all())).unwrap();
    assert_eq!(RecordingEvents::count(&fx.events.registered), 2);

    fx.registry.reload().unwrap();
    assert_eq!(RecordingEvents::count(&fx.events.registered), 2);
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 0);

    fx.config.set_priority(CATCH_ALL_ID, 40);
    fx.config.set_disabled(INTEGER_ID, true);
    fx.registry.reload().unwrap();
    assert_eq!(RecordingEvents::count(&fx.events.registered), 2);
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 1);

    fx.config.set_disabled(INTEGER_ID, false);
    fx.registry.reload().unwrap();
    assert_eq!(RecordingEvents::count(&fx.events.registered), 3);
    assert_eq!(RecordingEvents::count(&fx.events.unregistered), 1);
}

/// Stalls inside the first registration callback and logs every event.
struct StallingLog {
    entered: Mutex<Option<mpsc::Sender<()>>>,
    log: Mutex<Vec<String>>,
}

impl BrokerEvents for StallingLog {
    fn on_registered(&self, info: &HandlerInfo) {
        if let Some(entered) = self.entered.lock().take() {
            entered.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(100));
        }
        self.log.lock().push(format!("registered {}", info.id()));
    }

    fn on_unregistered(&self, info: &HandlerInfo) {
        self.log.lock().push(format!("unregistered {}", info.id()));
    }
}

#[test]
fn test_events_follow_mutation_order() {
    let fx = fixture();
    let registry = Arc::new(fx.registry);
    let (entered_tx, entered_rx) = mpsc::channel();
    let subscriber = Arc::new(StallingLog {
        entered: Mutex::new(Some(entered_tx)),
        log: Mutex::new(Vec::new()),
    });
    registry.events().subscribe(subscriber.clone());

    let registering = {
        let registry = registry.clone();
        std::thread::spawn(move || registry.register(Arc::new(StringHandler::integer())).unwrap())
    };
    entered_rx.recv().unwrap();
    assert!(registry.unregister(INTEGER_ID));
    registering.join().unwrap();

    assert!(!registry.is_registered(INTEGER_ID));
    assert_eq!(
        *subscriber.log.lock(),
        vec![format!("registered {}", INTEGER_ID), format!("unregistered {}", INTEGER_ID)]
    );
}

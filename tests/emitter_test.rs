use std::sync::Arc;

use event_emitter::{config, EmitterConfig, EmitterError, EventEmitter, EventName, Listener, Value};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl Recorder {
    fn listener(&self, tag: &str) -> Listener {
        let calls = self.calls.clone();
        let tag = tag.to_string();
        Listener::new(move |_, args| {
            calls.lock().push((tag.clone(), args.to_vec()));
            Ok(())
        })
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().clone()
    }

    fn calls_for(&self, tag: &str) -> Vec<Vec<Value>> {
        self.calls()
            .into_iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, args)| args)
            .collect()
    }
}

#[test]
fn test_on_then_once_scenario() {
    let emitter = EventEmitter::new();
    let recorder = Recorder::default();
    let a = recorder.listener("A");
    let b = recorder.listener("B");

    emitter.on("data", &a).unwrap();
    assert!(emitter.emit("data", &[Value::from(1)]).unwrap());
    assert_eq!(recorder.calls_for("A"), vec![vec![Value::from(1)]]);

    emitter.once("data", &b).unwrap();
    emitter.emit("data", &[Value::from(2)]).unwrap();
    emitter.emit("data", &[Value::from(3)]).unwrap();

    assert_eq!(
        recorder.calls_for("A"),
        vec![
            vec![Value::from(1)],
            vec![Value::from(2)],
            vec![Value::from(3)]
        ]
    );
    assert_eq!(recorder.calls_for("B"), vec![vec![Value::from(2)]]);
    assert_eq!(emitter.listener_count("data"), 1);
}

#[test]
fn test_capacity_scenario() {
    let emitter = EventEmitter::new();
    let recorder = Recorder::default();
    emitter.set_max_listeners(1).unwrap();

    emitter.on("x", recorder.listener("A")).unwrap();
    let result = emitter.on("x", recorder.listener("B"));

    assert_eq!(
        result.err(),
        Some(EmitterError::Capacity {
            event: "x".to_string(),
            max: 1
        })
    );
    assert_eq!(emitter.listener_count("x"), 1);
}

#[test]
fn test_capacity_with_error_listener_scenario() {
    let emitter = EventEmitter::with_max_listeners(1).unwrap();
    let recorder = Recorder::default();
    emitter.on("error", recorder.listener("error")).unwrap();
    emitter.on("x", recorder.listener("A")).unwrap();

    let returned = emitter.on("x", recorder.listener("B")).unwrap();
    assert!(std::ptr::eq(returned, &emitter));
    assert_eq!(emitter.listener_count("x"), 1);
    assert_eq!(
        recorder.calls_for("error"),
        vec![vec![Value::Error(EmitterError::Capacity {
            event: "x".to_string(),
            max: 1
        })]]
    );
}

#[test]
fn test_chaining_returns_same_emitter() {
    let emitter = EventEmitter::new();
    let listener = Listener::new(|_, _| Ok(()));

    let chained = emitter
        .on("a", &listener)
        .and_then(|e| e.add_listener("b", &listener))
        .and_then(|e| e.once("c", &listener))
        .and_then(|e| e.prepend_listener("a", &listener))
        .and_then(|e| e.prepend_once_listener("b", &listener))
        .and_then(|e| e.remove_listener("c", &listener))
        .and_then(|e| e.set_max_listeners(5))
        .unwrap();

    assert!(std::ptr::eq(chained, &emitter));
    assert_eq!(
        emitter.event_names(),
        vec![EventName::from("a"), EventName::from("b")]
    );
    assert_eq!(emitter.listener_count("a"), 2);
    assert_eq!(emitter.listener_count("b"), 2);
    assert_eq!(emitter.max_listeners(), 5);
}

#[test]
fn test_meta_events_observe_full_lifecycle() {
    let emitter = EventEmitter::new();
    let recorder = Recorder::default();
    let on_new = recorder.listener("new");
    let on_remove = recorder.listener("remove");
    emitter
        .on("newListener", &on_new)
        .unwrap()
        .on("removeListener", &on_remove)
        .unwrap();

    let listener = recorder.listener("data");
    emitter.once("data", &listener).unwrap();
    emitter.emit("data", &[Value::from("payload")]).unwrap();

    assert_eq!(
        recorder.calls(),
        vec![
            (
                "new".to_string(),
                vec![Value::from("removeListener"), Value::from(&on_remove)]
            ),
            (
                "new".to_string(),
                vec![Value::from("data"), Value::from(&listener)]
            ),
            (
                "remove".to_string(),
                vec![Value::from("data"), Value::from(&listener)]
            ),
            ("data".to_string(), vec![Value::from("payload")]),
        ]
    );
    assert_eq!(emitter.listener_count("data"), 0);
}

#[test]
fn test_distinct_listeners_with_same_behavior_are_independent() {
    let emitter = EventEmitter::new();
    let recorder = Recorder::default();
    let first = recorder.listener("same");
    let second = recorder.listener("same");

    emitter.on("data", &first).unwrap().on("data", &second).unwrap();
    emitter.remove_listener("data", &first).unwrap();

    assert_eq!(emitter.listeners("data"), vec![second.clone()]);
    emitter.remove_listener("data", &first).unwrap();
    assert_eq!(emitter.listener_count("data"), 1);
}

#[test]
fn test_remove_all_listeners_empties_event_names() {
    let emitter = EventEmitter::new();
    let listener = Listener::new(|_, _| Ok(()));
    for name in ["a", "b", "error", "newListener", "removeListener"] {
        emitter.on(name, &listener).unwrap();
    }

    emitter.remove_all_listeners(None).unwrap();
    assert!(emitter.event_names().is_empty());
    assert_eq!(emitter.listener_count("a"), 0);
}

#[test]
fn test_emitter_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emitter.json");
    std::fs::write(&path, r#"{ "max_listeners": 2 }"#).unwrap();

    let config: EmitterConfig = config::from_file(&path).unwrap();
    let emitter = EventEmitter::with_config(&config).unwrap();
    let listener = Listener::new(|_, _| Ok(()));

    emitter.on("a", &listener).unwrap().on("a", &listener).unwrap();
    assert!(matches!(
        emitter.on("a", &listener),
        Err(EmitterError::Capacity { max: 2, .. })
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config: EmitterConfig = config::from_json_str(r#"{ "max_listeners": 0 }"#).unwrap();
    assert_eq!(
        EventEmitter::with_config(&config).err().map(|e| e.to_string()),
        Some("max listeners must be a positive integer, got 0".to_string())
    );
}

#[test]
fn test_emitter_shared_across_threads() {
    let emitter = Arc::new(EventEmitter::new());
    let recorder = Recorder::default();
    emitter.on("data", recorder.listener("data")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let emitter = emitter.clone();
            std::thread::spawn(move || emitter.emit("data", &[Value::from(i)]).unwrap())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(recorder.calls_for("data").len(), 4);
}

//! End-to-end pipeline tests driving a real [`SyncEngine`] against a real
//! temp directory, a fixture [`SourceParser`], and [`InMemoryGraphSink`].
//! Exercises the scenarios and invariants from the external-interfaces
//! contract: change suppression on an untouched file, new-file upsert,
//! moved-function diff, batch coalescing, retry-then-drop, pause
//! idempotence, and fingerprint round-trip across restart.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use syncgraph_core::errors::SinkError;
use syncgraph_core::traits::{GraphSink, ParseError, SourceParser};
use syncgraph_core::types::{
    ClassEntity, ConstantEntity, CssRuleEntity, Entity, ExtendsRelationship,
    FunctionCallRelationship, FunctionEntity, ImplementsRelationship, ImportEntity,
    InterfaceEntity, JsxElementEntity, Language, ParsedFile, ReferenceRelationship, TypeEntity,
    TypeUsageRelationship, VariableEntity,
};
use syncgraph_core::EngineConfig;
use syncgraph_engine::{ControlEvent, ControlEventKind, SyncEngine};
use syncgraph_storage::InMemoryGraphSink;

/// One function per file, named after the file stem, spanning the whole
/// file. Deterministic and cheap: enough to exercise the diff/apply path
/// without a real tree-sitter grammar.
struct FixtureParser;

impl SourceParser for FixtureParser {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let contents = fs::read_to_string(path).map_err(|e| ParseError::Io(path.to_path_buf(), e))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let line_count = contents.lines().count().max(1) as u32;

        Ok(ParsedFile {
            path: path.to_string_lossy().into_owned(),
            language: Some(Language::TypeScript),
            functions: vec![FunctionEntity {
                name: stem,
                file_path: path.to_string_lossy().into_owned(),
                start_line: 1,
                end_line: line_count,
                signature: "()".to_string(),
                is_async: false,
                is_exported: true,
            }],
            ..Default::default()
        })
    }
}

fn wait_until<F: Fn() -> bool>(timeout: Duration, poll: Duration, cond: F) -> bool {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if cond() {
            return true;
        }
        std::thread::sleep(poll);
    }
    cond()
}

fn base_config(root: &Path) -> EngineConfig {
    EngineConfig {
        root: Some(root.to_path_buf()),
        ..Default::default()
    }
}

#[test]
fn new_file_is_upserted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".gitkeep"), "").unwrap();

    let sink = Arc::new(InMemoryGraphSink::new());
    let engine = SyncEngine::new(base_config(dir.path()), Arc::new(FixtureParser), sink.clone());
    engine.start().unwrap();

    fs::write(dir.path().join("widget.ts"), "export function widget() {}\n").unwrap();

    let seen = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.has_function("widget", &dir.path().join("widget.ts").to_string_lossy())
    });

    engine.stop().unwrap();
    assert!(seen, "expected widget.ts's function to be upserted");
}

#[test]
fn untouched_file_does_not_retrigger_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("stable.ts");
    fs::write(&file, "export function stable() {}\n").unwrap();

    let sink = Arc::new(InMemoryGraphSink::new());
    let engine = SyncEngine::new(base_config(dir.path()), Arc::new(FixtureParser), sink.clone());
    engine.start().unwrap();

    wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.has_function("stable", &file.to_string_lossy())
    });
    let before = sink.total_upserts();

    // Rewrite with identical content: the content hash is unchanged, so
    // the change gate must suppress this event entirely regardless of the
    // mtime bump.
    fs::write(&file, "export function stable() {}\n").unwrap();

    std::thread::sleep(Duration::from_millis(500));
    engine.stop().unwrap();

    assert_eq!(sink.total_upserts(), before, "identical content must not re-upsert");
}

#[test]
fn pause_suppresses_events_resume_reenables() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".gitkeep"), "").unwrap();

    let sink = Arc::new(InMemoryGraphSink::new());
    let engine = SyncEngine::new(base_config(dir.path()), Arc::new(FixtureParser), sink.clone());
    engine.start().unwrap();
    engine.pause();
    assert!(engine.is_paused());

    fs::write(dir.path().join("ignored.ts"), "export function ignored() {}\n").unwrap();
    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(sink.total_upserts(), 0, "paused engine must not process events");

    engine.resume();
    fs::write(dir.path().join("awake.ts"), "export function awake() {}\n").unwrap();
    let seen = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.has_function("awake", &dir.path().join("awake.ts").to_string_lossy())
    });

    engine.stop().unwrap();
    assert!(seen, "resumed engine must process subsequent events");
}

#[test]
fn fingerprint_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("persisted.ts");
    fs::write(&file, "export function persisted() {}\n").unwrap();

    let sink_a = Arc::new(InMemoryGraphSink::new());
    let engine_a = SyncEngine::new(base_config(dir.path()), Arc::new(FixtureParser), sink_a.clone());
    engine_a.start().unwrap();
    wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink_a.has_function("persisted", &file.to_string_lossy())
    });
    engine_a.stop().unwrap();

    let state_path = dir.path().join(syncgraph_core::constants::STATE_FILE_NAME);
    assert!(state_path.exists(), "fingerprint state must persist on stop");

    // A second engine over the same root, same unchanged file, must not
    // re-upsert on startup quiescence.
    let sink_b = Arc::new(InMemoryGraphSink::new());
    let engine_b = SyncEngine::new(base_config(dir.path()), Arc::new(FixtureParser), sink_b.clone());
    engine_b.start().unwrap();
    std::thread::sleep(Duration::from_millis(500));
    engine_b.stop().unwrap();

    assert_eq!(sink_b.total_upserts(), 0, "restart over unchanged tree must be quiescent");
}

#[test]
fn batching_coalesces_rapid_writes_into_fewer_flushes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".gitkeep"), "").unwrap();

    let sink = Arc::new(InMemoryGraphSink::new());
    let config = EngineConfig {
        root: Some(dir.path().to_path_buf()),
        enable_batching: Some(true),
        batch_size: Some(3),
        batch_flush_interval_secs: Some(2),
        ..Default::default()
    };
    let engine = SyncEngine::new(config, Arc::new(FixtureParser), sink.clone());
    engine.start().unwrap();

    for i in 0..3 {
        fs::write(dir.path().join(format!("f{i}.ts")), format!("export function f{i}() {{}}\n")).unwrap();
    }

    let seen = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.total_upserts() >= 3
    });

    let stats = engine.stats();
    engine.stop().unwrap();

    assert!(seen, "all three files must eventually be upserted");
    assert!(
        stats.batch_metrics.map(|b| b.total_batches).unwrap_or(0) >= 1,
        "coalescer must report at least one flush"
    );
}

/// Two functions per file: "keep" never changes, "moved" changes its
/// `end_line` (read from the file's first line) on every edit. Lets S3
/// distinguish "only the changed entity was re-upserted" (diff mode) from
/// "every entity in the file was re-upserted" (full-file mode).
struct TwoFunctionParser;

impl SourceParser for TwoFunctionParser {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let contents = fs::read_to_string(path).map_err(|e| ParseError::Io(path.to_path_buf(), e))?;
        let moved_end_line: u32 = contents
            .lines()
            .next()
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(10);
        let file_path = path.to_string_lossy().into_owned();

        Ok(ParsedFile {
            path: file_path.clone(),
            language: Some(Language::TypeScript),
            functions: vec![
                FunctionEntity {
                    name: "keep".to_string(),
                    file_path: file_path.clone(),
                    start_line: 10,
                    end_line: 15,
                    signature: "()".to_string(),
                    is_async: false,
                    is_exported: true,
                },
                FunctionEntity {
                    name: "moved".to_string(),
                    file_path,
                    start_line: 20,
                    end_line: moved_end_line,
                    signature: "()".to_string(),
                    is_async: false,
                    is_exported: true,
                },
            ],
            ..Default::default()
        })
    }
}

/// Records every `upsert_function` call's identity key. Every other
/// operation is a plain no-op, matching [`syncgraph_storage::NullGraphSink`]'s
/// shape for the kinds this test doesn't exercise.
#[derive(Default)]
struct RecordingSink {
    function_calls: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn calls_for(&self, key: &str) -> usize {
        self.function_calls.lock().unwrap().iter().filter(|k| *k == key).count()
    }
}

impl GraphSink for RecordingSink {
    fn upsert_file(&self, _path: &str, _language: Language) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_function(&self, entity: &FunctionEntity) -> Result<(), SinkError> {
        self.function_calls.lock().unwrap().push(entity.identity_key());
        Ok(())
    }

    fn upsert_class(&self, _entity: &ClassEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_interface(&self, _entity: &InterfaceEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_type(&self, _entity: &TypeEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_variable(&self, _entity: &VariableEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_constant(&self, _entity: &ConstantEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_import(&self, _entity: &ImportEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_css_rule(&self, _entity: &CssRuleEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_jsx_element(&self, _entity: &JsxElementEntity) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_function_call(&self, _rel: &FunctionCallRelationship) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_type_usage(&self, _rel: &TypeUsageRelationship) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_extends(&self, _rel: &ExtendsRelationship) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_implements(&self, _rel: &ImplementsRelationship) -> Result<(), SinkError> {
        Ok(())
    }

    fn upsert_reference(&self, _rel: &ReferenceRelationship) -> Result<(), SinkError> {
        Ok(())
    }

    fn create_indexes(&self) -> Result<(), SinkError> {
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[test]
fn diff_mode_only_reupserts_the_changed_function() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("two.ts");
    let key_keep = format!("keep:{}", file.to_string_lossy());
    let key_moved = format!("moved:{}", file.to_string_lossy());

    fs::write(&file, "30\n").unwrap();

    let sink = Arc::new(RecordingSink::default());
    let config = EngineConfig {
        root: Some(dir.path().to_path_buf()),
        enable_diff: Some(true),
        ..Default::default()
    };
    let engine = SyncEngine::new(config, Arc::new(TwoFunctionParser), sink.clone());
    engine.start().unwrap();

    wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.calls_for(&key_moved) >= 1
    });
    assert_eq!(sink.calls_for(&key_keep), 1, "first observation upserts both functions");
    assert_eq!(sink.calls_for(&key_moved), 1);

    // Only "moved"'s end_line changes; "keep" is byte-for-byte identical
    // as far as the parser is concerned.
    fs::write(&file, "45\n").unwrap();

    let reupserted = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.calls_for(&key_moved) >= 2
    });
    engine.stop().unwrap();

    assert!(reupserted, "the structurally-changed function must be re-upserted");
    assert_eq!(
        sink.calls_for(&key_keep), 1,
        "diff mode must not re-upsert an entity whose structural fields are unchanged"
    );
}

#[test]
fn full_file_mode_reupserts_every_function_on_any_change() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("two.ts");
    let key_keep = format!("keep:{}", file.to_string_lossy());
    let key_moved = format!("moved:{}", file.to_string_lossy());

    fs::write(&file, "30\n").unwrap();

    let sink = Arc::new(RecordingSink::default());
    // enable_diff left unset (false): every processed event re-upserts
    // the whole file's entity set.
    let engine = SyncEngine::new(base_config(dir.path()), Arc::new(TwoFunctionParser), sink.clone());
    engine.start().unwrap();

    wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.calls_for(&key_moved) >= 1
    });

    fs::write(&file, "45\n").unwrap();

    let reupserted = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.calls_for(&key_keep) >= 2
    });
    engine.stop().unwrap();

    assert!(
        reupserted,
        "full-file mode must re-upsert the untouched function too, unlike diff mode"
    );
}

#[test]
fn file_removal_cleans_up_tracker_differ_and_publishes_remove_event() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("gone.ts");
    fs::write(&file, "export function gone() {}\n").unwrap();

    let sink = Arc::new(InMemoryGraphSink::new());
    let config = EngineConfig {
        root: Some(dir.path().to_path_buf()),
        enable_diff: Some(true),
        ..Default::default()
    };
    let engine = SyncEngine::new(config, Arc::new(FixtureParser), sink.clone());

    let events: Arc<Mutex<Vec<ControlEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let events_for_sub = Arc::clone(&events);
    engine.set_event_subscriber(Arc::new(move |event: ControlEvent| {
        events_for_sub.lock().unwrap().push(event);
    }));

    engine.start().unwrap();
    wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        sink.has_function("gone", &file.to_string_lossy())
    });
    assert!(engine.list_monitored().contains(&file));
    assert_eq!(engine.stats().cache_size, Some(1));

    fs::remove_file(&file).unwrap();

    let cleaned = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
        !engine.list_monitored().contains(&file)
    });
    let stats_after = engine.stats();
    engine.stop().unwrap();

    assert!(cleaned, "tracker must drop the removed path's fingerprint");
    assert_eq!(stats_after.cache_size, Some(0), "differ must drop the removed path's cache entry");
    assert!(
        events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.kind == ControlEventKind::Remove && e.file_path.as_ref() == Some(&file)),
        "a remove control event must be published for the deleted file"
    );
}

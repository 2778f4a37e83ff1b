//! Integration tests for the gdbstub command.
//!
//! These drive `GdbStubCommand::execute` end to end against mock transports
//! and a recording engine.

use async_trait::async_trait;
use gdbstub_cmd::error::{EINVAL, ENODEV, ENOTSUP};
use gdbstub_cmd::{
    exit_code, Engine, GdbStubCommand, Result, SessionEnd, StubError, Transport,
    TransportDescriptor, TransportInit, TransportRegistry,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of what the mocks observed
#[derive(Default)]
struct Journal {
    instantiated: AtomicUsize,
    init_args: Mutex<Vec<Vec<String>>>,
}

/// Mock transport; `fail_with` makes its initializer fail
struct MockTransport {
    name: &'static str,
    has_init: bool,
    fail_with: Option<fn() -> StubError>,
    journal: Arc<Journal>,
}

#[async_trait]
impl TransportInit for MockTransport {
    async fn init(&mut self, args: &[String]) -> Result<()> {
        self.journal.init_args.lock().unwrap().push(args.to_vec());
        match self.fail_with {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    fn initializer(&mut self) -> Option<&mut dyn TransportInit> {
        if self.has_init {
            Some(self)
        } else {
            None
        }
    }

    async fn recv(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }

    async fn send(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Engine that records which transport it was given and returns at once
#[derive(Default)]
struct RecordingEngine {
    started: Vec<&'static str>,
}

#[async_trait]
impl Engine for RecordingEngine {
    async fn start(&mut self, transport: Box<dyn Transport>) -> Result<SessionEnd> {
        self.started.push(transport.name());
        Ok(SessionEnd::Detached)
    }
}

fn mock(
    journal: &Arc<Journal>,
    name: &'static str,
    has_init: bool,
    fail_with: Option<fn() -> StubError>,
) -> TransportDescriptor {
    let journal = journal.clone();
    TransportDescriptor::new(name, move || {
        journal.instantiated.fetch_add(1, Ordering::SeqCst);
        MockTransport {
            name,
            has_init,
            fail_with,
            journal: journal.clone(),
        }
    })
}

fn setup() -> (TransportRegistry, Arc<Journal>) {
    let journal = Arc::new(Journal::default());
    let mut registry = TransportRegistry::new();
    registry.register(mock(&journal, "serial", false, None)).unwrap();
    registry.register(mock(&journal, "udp", true, None)).unwrap();
    registry
        .register(mock(
            &journal,
            "broken",
            true,
            Some(|| StubError::NoSuchDevice("eth9".into())),
        ))
        .unwrap();
    registry
        .register(mock(
            &journal,
            "denied",
            true,
            Some(|| StubError::Io(std::io::Error::from_raw_os_error(13))),
        ))
        .unwrap();
    (registry, journal)
}

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Test that every registered name resolves and unregistered ones don't.
#[test]
fn test_lookup_matches_registrations() {
    let (registry, _) = setup();
    for name in ["serial", "udp", "broken", "denied"] {
        assert_eq!(registry.lookup(name).unwrap().name(), name);
    }
    for name in ["bogus", "SERIAL", "ud", ""] {
        assert!(registry.lookup(name).is_none());
    }
}

/// `gdbstub serial`: no initializer, engine starts, status 0.
#[tokio::test]
async fn test_serial_without_initializer() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "serial"]), &mut engine)
        .await;

    assert!(result.is_ok());
    assert_eq!(exit_code(&result), 0);
    assert_eq!(engine.started, vec!["serial"]);
    assert!(journal.init_args.lock().unwrap().is_empty());
}

/// Trailing arguments to a transport without initializer are ignored.
#[tokio::test]
async fn test_trailing_args_ignored_without_initializer() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "serial", "extra", "--flag"]), &mut engine)
        .await;

    assert!(result.is_ok());
    assert_eq!(engine.started, vec!["serial"]);
    assert!(journal.init_args.lock().unwrap().is_empty());
}

/// `gdbstub udp eth0`: initializer gets exactly the trailing arguments.
#[tokio::test]
async fn test_udp_initializer_receives_arguments() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "udp", "eth0"]), &mut engine)
        .await;

    assert!(result.is_ok());
    assert_eq!(engine.started, vec!["udp"]);
    assert_eq!(*journal.init_args.lock().unwrap(), vec![argv(&["eth0"])]);
}

/// Transport arguments that look like options are forwarded verbatim.
#[tokio::test]
async fn test_transport_options_forwarded_verbatim() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "udp", "-x", "--port=1"]), &mut engine)
        .await
        .unwrap();

    assert_eq!(
        *journal.init_args.lock().unwrap(),
        vec![argv(&["-x", "--port=1"])]
    );
}

/// `gdbstub bogus`: not supported, nothing instantiated or started.
#[tokio::test]
async fn test_unknown_transport_not_supported() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "bogus", "eth0"]), &mut engine)
        .await;

    assert_eq!(exit_code(&result), -ENOTSUP);
    match result {
        Err(StubError::NoSuchTransport(name)) => assert_eq!(name, "bogus"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(journal.instantiated.load(Ordering::SeqCst), 0);
    assert!(journal.init_args.lock().unwrap().is_empty());
    assert!(engine.started.is_empty());
}

/// `gdbstub` with no transport fails option parsing before anything else.
#[tokio::test]
async fn test_missing_transport_is_option_error() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub"]), &mut engine)
        .await;

    assert!(matches!(result, Err(StubError::Options(_))));
    assert_eq!(exit_code(&result), -EINVAL);
    assert_eq!(journal.instantiated.load(Ordering::SeqCst), 0);
    assert!(engine.started.is_empty());
}

/// Unknown command-level options are rejected before lookup.
#[tokio::test]
async fn test_unknown_option_rejected() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "--bogus", "serial"]), &mut engine)
        .await;

    assert!(matches!(result, Err(StubError::Options(_))));
    assert_eq!(journal.instantiated.load(Ordering::SeqCst), 0);
    assert!(engine.started.is_empty());
}

/// `--help` is answered by the option parser.
#[tokio::test]
async fn test_help_requested() {
    let (registry, _) = setup();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "--help"]), &mut engine)
        .await;

    assert!(matches!(result, Err(StubError::HelpRequested)));
    assert!(engine.started.is_empty());
}

/// Initializer failures propagate their own code and stop the session.
#[tokio::test]
async fn test_initializer_failure_propagates_code() {
    let (registry, journal) = setup();
    let mut engine = RecordingEngine::default();
    let command = GdbStubCommand::new(&registry);

    let result = command
        .execute(&argv(&["gdbstub", "broken", "eth9"]), &mut engine)
        .await;
    assert!(matches!(result, Err(StubError::NoSuchDevice(_))));
    assert_eq!(exit_code(&result), -ENODEV);

    let result = command
        .execute(&argv(&["gdbstub", "denied"]), &mut engine)
        .await;
    assert_eq!(exit_code(&result), -13);

    assert_eq!(journal.init_args.lock().unwrap().len(), 2);
    assert!(engine.started.is_empty());
}

/// Engine errors are returned to the caller.
#[tokio::test]
async fn test_engine_error_propagates() {
    struct FailingEngine;

    #[async_trait]
    impl Engine for FailingEngine {
        async fn start(&mut self, _transport: Box<dyn Transport>) -> Result<SessionEnd> {
            Err(StubError::Protocol("boom".into()))
        }
    }

    let (registry, _) = setup();
    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "serial"]), &mut FailingEngine)
        .await;
    assert!(matches!(result, Err(StubError::Protocol(_))));
}

/// The built-in udp transport binds and reaches the engine.
#[cfg(feature = "udp")]
#[tokio::test]
async fn test_builtin_udp_on_loopback() {
    let registry = TransportRegistry::builtin();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "udp", "127.0.0.1:0"]), &mut engine)
        .await;

    assert!(result.is_ok());
    assert_eq!(engine.started, vec!["udp"]);
}

/// The built-in udp transport rejects a missing interface argument.
#[cfg(feature = "udp")]
#[tokio::test]
async fn test_builtin_udp_requires_interface() {
    let registry = TransportRegistry::builtin();
    let mut engine = RecordingEngine::default();

    let result = GdbStubCommand::new(&registry)
        .execute(&argv(&["gdbstub", "udp"]), &mut engine)
        .await;

    assert!(matches!(result, Err(StubError::InvalidArgument(_))));
    assert_eq!(exit_code(&result), -EINVAL);
    assert!(engine.started.is_empty());
}

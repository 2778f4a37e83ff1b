//! The `gdbstub` command
//!
//! ```text
//! gdbstub <transport> [<transport-options>...]
//! ```
//!
//! Resolves the named transport, runs its initializer (if it has one) with
//! the remaining arguments, then hands the transport to the debugging engine.
//! Every failure is terminal for the invocation.

use crate::engine::Engine;
use crate::error::{Result, StubError};
use crate::options::{parse_options, CommandDescriptor, OptionDescriptor, ParsedArgs, MAX_ARGUMENTS};
use crate::registry::TransportRegistry;
use crate::transport::TransportDescriptor;
use log::{debug, info};

/// Options recognised by `gdbstub` (none yet)
pub const GDBSTUB_OPTIONS: &[OptionDescriptor] = &[];

/// `gdbstub` command descriptor
pub const GDBSTUB_COMMAND: CommandDescriptor = CommandDescriptor {
    name: "gdbstub",
    options: GDBSTUB_OPTIONS,
    min_args: 1,
    max_args: MAX_ARGUMENTS,
    usage: "<transport> [<options>...]",
    description: "Start remote debugging using one of the following transports:\n  \
                  serial           use serial port (if compiled in)\n  \
                  udp <interface>  use UDP over network interface (if compiled in)",
};

/// Parsed `gdbstub` options
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GdbStubOptions {}

impl GdbStubOptions {
    fn from_parsed(_parsed: &ParsedArgs) -> Self {
        Self {}
    }
}

/// The `gdbstub` command, bound to a transport registry
pub struct GdbStubCommand<'a> {
    registry: &'a TransportRegistry,
}

impl<'a> GdbStubCommand<'a> {
    pub fn new(registry: &'a TransportRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a transport name, reporting unknown names to the user
    pub fn parse_transport(&self, name: &str) -> Result<&'a TransportDescriptor> {
        self.registry.lookup(name).ok_or_else(|| {
            let err = StubError::NoSuchTransport(name.to_string());
            eprintln!("{}", err);
            err
        })
    }

    /// Run the command. `argv[0]` is the command name.
    ///
    /// Returns only on failure or if the engine gives control back.
    pub async fn execute(&self, argv: &[String], engine: &mut dyn Engine) -> Result<()> {
        let parsed = parse_options(argv, &GDBSTUB_COMMAND)?;
        let _opts = GdbStubOptions::from_parsed(&parsed);

        let (name, args) = parsed
            .positionals
            .split_first()
            .ok_or_else(|| StubError::Options("gdbstub: missing transport".into()))?;

        let descriptor = self.parse_transport(name)?;
        let mut transport = descriptor.instantiate();

        if let Some(init) = transport.initializer() {
            debug!("Initialising {} transport with {:?}", name, args);
            init.init(args).await?;
        }

        info!("Starting GDB stub on {} transport", descriptor.name());
        let end = engine.start(transport).await?;
        debug!("Engine returned control: {:?}", end);

        Ok(())
    }
}

/// Status code for a command result: 0 on success, negative on failure
pub fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

/// Process exit status for a command result.
///
/// Exit statuses are unsigned, so failures exit with the errno magnitude.
/// `--help` is a successful invocation.
pub fn process_status(result: &Result<()>) -> i32 {
    match result {
        Err(StubError::HelpRequested) => 0,
        _ => exit_code(result).saturating_abs(),
    }
}

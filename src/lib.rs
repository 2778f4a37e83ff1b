//! gdbstub - start a remote debugging session over a pluggable transport
//!
//! The `gdbstub` command looks up a transport by name in a registry built
//! at startup, initialises it with any remaining arguments and hands it to a
//! debugging engine that runs the protocol loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use gdbstub_cmd::{GdbStubCommand, StubEngine, TransportRegistry};
//!
//! #[tokio::main]
//! async fn main() -> gdbstub_cmd::Result<()> {
//!     let registry = TransportRegistry::builtin();
//!     let argv: Vec<String> = ["gdbstub", "udp", "eth0"]
//!         .iter()
//!         .map(|s| s.to_string())
//!         .collect();
//!
//!     // Does not return while the debugger is attached
//!     GdbStubCommand::new(&registry)
//!         .execute(&argv, &mut StubEngine::new())
//!         .await
//! }
//! ```

pub mod command;
pub mod engine;
pub mod error;
pub mod options;
pub mod protocol;
pub mod registry;
pub mod transport;

// Re-export commonly used types
pub use command::{exit_code, process_status, GdbStubCommand, GDBSTUB_COMMAND};
pub use engine::{Engine, SessionEnd, StubEngine};
pub use error::{Result, StubError};
pub use options::{parse_options, CommandDescriptor, OptionDescriptor, ParsedArgs, MAX_ARGUMENTS};
pub use registry::TransportRegistry;
pub use transport::{Transport, TransportDescriptor, TransportInit};

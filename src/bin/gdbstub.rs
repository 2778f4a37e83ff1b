//! gdbstub binary - start a remote debugging session

use gdbstub_cmd::{process_status, GdbStubCommand, StubEngine, StubError, TransportRegistry};
use log::{debug, error};

#[tokio::main]
async fn main() {
    // Initialize logger (stderr, so stdio stays free for the serial transport)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = std::iter::once("gdbstub".to_string())
        .chain(std::env::args().skip(1))
        .collect();

    let registry = TransportRegistry::builtin();
    debug!(
        "Compiled-in transports: {}",
        registry.names().collect::<Vec<_>>().join(", ")
    );

    let mut engine = StubEngine::new();
    let result = GdbStubCommand::new(&registry).execute(&argv, &mut engine).await;

    match &result {
        // Already reported by the option parser or the dispatcher
        Ok(()) | Err(StubError::HelpRequested) | Err(StubError::NoSuchTransport(_)) => {}
        Err(StubError::Options(msg)) => debug!("{}", msg),
        Err(e) => error!("{}", e),
    }

    std::process::exit(process_status(&result));
}

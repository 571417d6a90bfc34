//! IPC command types, global command bus, and Unix socket listener.
//!
//! Commands are parsed on the listener thread, pushed onto an async channel,
//! and drained by the main event loop, which is the only place the overlay
//! model is mutated. `status` is answered from a snapshot the loop publishes
//! after every model change, so it never needs a round-trip.

use async_channel::{Receiver, Sender};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use crate::model::{OpenReason, OverlayModel, OverlayState};

/// An IPC command destined for the main thread.
#[derive(Debug, Clone, PartialEq)]
pub enum IpcCommand {
    Open(OpenReason),
    Close,
    Toggle,
    /// Dim (`false`) or restore (`true`) the closed shape
    SetVisible(bool),
    /// Re-read the config file
    Reload,
}

/// Async channel pair for IPC → main loop communication.
struct IpcCommandBus {
    tx: Sender<IpcCommand>,
    rx: Receiver<IpcCommand>,
}

static IPC_COMMAND_BUS: OnceLock<IpcCommandBus> = OnceLock::new();

fn command_bus() -> &'static IpcCommandBus {
    IPC_COMMAND_BUS.get_or_init(|| {
        let (tx, rx) = async_channel::unbounded();
        IpcCommandBus { tx, rx }
    })
}

/// Returns a receiver for the event loop's drain step.
pub fn subscribe_ipc_commands() -> Receiver<IpcCommand> {
    command_bus().rx.clone()
}

fn push_ipc_command(cmd: IpcCommand) {
    let _ = command_bus().tx.try_send(cmd);
}

// ---------------------------------------------------------------------------
// Status snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct StatusSnapshot {
    state: OverlayState,
    reason: OpenReason,
    visible: bool,
}

static STATUS: Mutex<StatusSnapshot> = Mutex::new(StatusSnapshot {
    state: OverlayState::Closed,
    reason: OpenReason::Unknown,
    visible: true,
});

/// Records the model's state for `status` replies.
pub fn publish_status(model: &OverlayModel) {
    if let Ok(mut status) = STATUS.lock() {
        *status = StatusSnapshot {
            state: model.state(),
            reason: model.open_reason(),
            visible: model.is_visible(),
        };
    }
}

fn status_json() -> String {
    let Ok(status) = STATUS.lock() else {
        return "ERR: status lock poisoned".to_string();
    };
    serde_json::json!({
        "version": crate::VERSION,
        "running": true,
        "state": status.state.as_str(),
        "reason": status.reason.as_str(),
        "visible": status.visible,
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

/// Parses a command line into a bus command. `Ok(None)` is a query that is
/// answered directly.
fn parse_command(command: &str) -> Result<Option<IpcCommand>, String> {
    let mut tokens = command.split_whitespace();
    let verb = tokens.next().unwrap_or("");
    let arg = tokens.next();

    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected argument '{}'", extra));
    }

    let cmd = match (verb, arg) {
        ("open", None) => IpcCommand::Open(OpenReason::Click),
        ("open", Some(reason)) => match reason.parse::<OpenReason>() {
            Ok(OpenReason::Unknown) | Err(_) => {
                return Err(format!(
                    "open takes click|drag|boot, got '{}'",
                    reason
                ))
            }
            Ok(reason) => IpcCommand::Open(reason),
        },
        ("close", None) => IpcCommand::Close,
        ("toggle", None) => IpcCommand::Toggle,
        ("dim", None) => IpcCommand::SetVisible(false),
        ("show", None) => IpcCommand::SetVisible(true),
        ("reload", None) => IpcCommand::Reload,
        ("status", None) => return Ok(None),
        ("", _) => return Err("empty command".to_string()),
        (verb @ ("close" | "toggle" | "dim" | "show" | "reload" | "status"), Some(arg)) => {
            return Err(format!("{} takes no arguments, got '{}'", verb, arg))
        }
        (other, _) => return Err(format!("unknown command '{}'", other)),
    };
    Ok(Some(cmd))
}

/// Parses and dispatches a single IPC command string, returning a response.
pub fn handle_ipc_command(command: &str) -> String {
    match parse_command(command.trim()) {
        Ok(Some(cmd)) => {
            log::debug!("IPC command: {:?}", cmd);
            push_ipc_command(cmd);
            "OK".to_string()
        }
        Ok(None) => status_json(),
        Err(message) => format!("ERR: {}", message),
    }
}

// ---------------------------------------------------------------------------
// Unix socket listener
// ---------------------------------------------------------------------------

/// How long a client may take to send its command line.
const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Starts the IPC listener on a Unix socket, spawning a background thread.
pub fn start_ipc_listener(socket_path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = match UnixListener::bind(socket_path) {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
            if UnixStream::connect(socket_path).is_ok() {
                eprintln!("TopNotch is already running.");
                std::process::exit(0);
            }
            let _ = std::fs::remove_file(socket_path);
            UnixListener::bind(socket_path)?
        }
        Err(err) => return Err(err),
    };

    std::thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            if let Err(e) = serve_client(stream) {
                log::debug!("IPC client dropped: {}", e);
            }
        }
    });

    Ok(())
}

/// Answers one command line. A client that stalls is cut off after
/// [`CLIENT_READ_TIMEOUT`] so it cannot hold up the ones behind it.
fn serve_client(stream: UnixStream) -> std::io::Result<()> {
    stream.set_read_timeout(Some(CLIENT_READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let response = handle_ipc_command(&line);
    let mut stream = reader.into_inner();
    writeln!(stream, "{}", response)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

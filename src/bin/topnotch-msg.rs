//! Command-line client for a running TopNotch instance.
//!
//! Sends its arguments as one command line over the IPC socket and prints
//! the single-line reply. Exits non-zero when the overlay is unreachable or
//! answers with `ERR`.

use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

const USAGE: &str = "Usage: topnotch-msg <command> [args...]

Commands:
  open [click|drag|boot]   Open the panel (reason defaults to click)
  close                    Close the panel
  toggle                   Open if closed, close if opened
  dim                      Dim the closed shape
  show                     Restore the closed shape
  reload                   Reload configuration
  status                   Print overlay status as JSON";

/// The overlay answers from a background thread; anything slower is stuck.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("topnotch.sock")
}

/// Writes `command` to the socket and returns the trimmed reply.
fn send_command(socket: &Path, command: &str) -> io::Result<String> {
    let mut stream = UnixStream::connect(socket)?;
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    writeln!(stream, "{}", command)?;

    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    Ok(reply.trim().to_string())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    let socket = socket_path();
    match send_command(&socket, &args.join(" ")) {
        Ok(reply) => {
            println!("{}", reply);
            if reply.starts_with("ERR") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Cannot reach TopNotch at {}: {}", socket.display(), e);
            eprintln!("Is TopNotch running?");
            ExitCode::FAILURE
        }
    }
}

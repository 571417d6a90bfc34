// Off macOS only the platform-neutral core is built, for tests
#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

mod animation;
mod config;
mod ipc;
mod model;
mod overlay;
mod render;

#[cfg(target_os = "macos")]
mod app;
#[cfg(target_os = "macos")]
mod view;
#[cfg(target_os = "macos")]
mod window;

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

fn socket_path() -> std::path::PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    std::path::PathBuf::from(runtime_dir).join("topnotch.sock")
}

/// Removes the Unix socket file on process exit.
fn install_socket_cleanup() {
    let socket = socket_path();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = std::fs::remove_file(&socket);
        std::process::exit(0);
    }) {
        log::warn!("Failed to install signal handler: {}", e);
    }
}

fn print_help() {
    println!(
        "topnotch {}
A dynamic island around the MacBook camera notch

USAGE:
    topnotch [OPTIONS]

OPTIONS:
    -h, --help       Print this help message
    -v, --version    Print version information

ENVIRONMENT:
    RUST_LOG         Set log level (error, warn, info, debug, trace)

CONFIG:
    ~/.config/topnotch/config.toml

EXAMPLES:
    topnotch                    Run with default config
    RUST_LOG=debug topnotch     Run with debug logging
    topnotch-msg toggle         Open or close a running instance",
        VERSION
    );
}

#[cfg(target_os = "macos")]
fn run_overlay() {
    let Some(mtm) = objc2::MainThreadMarker::new() else {
        log::error!("TopNotch must be started on the main thread");
        std::process::exit(1);
    };
    let Some(app) = app::App::new(mtm) else {
        std::process::exit(1);
    };
    app.run(mtm);
}

#[cfg(not(target_os = "macos"))]
fn run_overlay() {
    log::error!("TopNotch needs macOS and a notched display");
    std::process::exit(1);
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if !args.is_empty() {
        // Only the first argument is processed (flags don't combine)
        match args[0].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-v" | "--version" => {
                println!("topnotch {}", VERSION);
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[0]);
                eprintln!("Try 'topnotch --help' for more information.");
                std::process::exit(1);
            }
        }
    }

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    logger
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:>5} {}] {}",
                chrono::Utc::now().to_rfc3339(),
                record.level(),
                record.target(),
                record.args()
            )?;
            buf.flush()
        })
        .init();

    log::info!("Starting TopNotch v{}", VERSION);

    if let Err(err) = ipc::start_ipc_listener(&socket_path()) {
        log::warn!("Failed to start IPC listener: {}", err);
    }
    install_socket_cleanup();

    run_overlay();
}

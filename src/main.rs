mod config;
mod fs;
mod handlers;
mod http;
mod mime;
mod pages;
mod router;
mod server;
mod upload;

use clap::{CommandFactory, Parser};
use config::ServerConfig;
use server::Server;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

/// Small HTTP server for testing file uploads.
///
/// Serves the chosen directory and accepts file uploads on /oj_upload.
/// Uploaded files are echoed to standard output unless an output directory
/// is given, in which case they are saved there under collision-safe names.
#[derive(Parser, Debug)]
#[command(name = "oddjob", version, about)]
struct Args {
    /// Directory to serve
    #[arg(short = 'r', long = "root", value_name = "DIR", default_value = ".")]
    server_root: PathBuf,

    /// Save uploads to DIR instead of echoing them to standard output
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    save_directory: Option<PathBuf>,

    /// Serve to clients other than localhost
    #[arg(short = 'a', long = "allow-all")]
    allow_all: bool,

    /// Simulated network delay in seconds applied to each upload
    #[arg(short = 'd', long = "delay", value_name = "SECONDS", default_value_t = 0)]
    network_delay: u64,

    /// Port to listen on
    #[arg(short = 'p', long = "port", default_value_t = config::DEFAULT_PORT)]
    port: u16,
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // The rendered help doubles as the usage text on the info page.
    let usage = Args::command().render_help().to_string();
    let args = Args::parse();

    let config = ServerConfig {
        server_root: args.server_root,
        save_directory: args.save_directory,
        usage_message: Some(usage),
        allow_all: args.allow_all,
        network_delay: args.network_delay,
        port: args.port,
    };

    let server = match Server::bind(&config, program_name()) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to start server: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        eprintln!("Server error: {}", e);
        process::exit(1);
    }
}

/// Basename the server was invoked as, shown on the info page.
fn program_name() -> String {
    env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "oddjob".to_string())
}

//! `valentine` - a scripted greeting experience for the terminal

use clap::Parser;

use valentine::cli::args::{Cli, Commands};
use valentine::cli::commands;
use valentine::error::ExitCode;
use valentine::observability::{LogFormat, LogTarget, StopReason, init_logging};
use valentine::render::terminal;
use valentine::session::ShutdownSignal;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        // The session owns the terminal, so it only logs to a file.
        let target = match &cli.command {
            Commands::Run(args) => args
                .log_file
                .clone()
                .map_or(LogTarget::Off, LogTarget::File),
            _ => LogTarget::Stderr,
        };
        if let Err(e) = init_logging(LogFormat::Human, cli.verbose, cli.color, &target) {
            eprintln!("error: cannot open log file: {e}");
            std::process::exit(ExitCode::IO_ERROR);
        }
    }

    let shutdown = ShutdownSignal::new();

    // Spawn signal handler for graceful shutdown
    let signal = shutdown.clone();
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => signal.trigger(StopReason::Interrupted),
            _ = sigterm.recv() => signal.trigger(StopReason::Terminated),
        }

        // Inside the alternate screen the notice would be lost or garble the frame.
        if !terminal::is_held() {
            eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");
        }

        let code = tokio::select! {
            _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
            _ = sigterm.recv() => ExitCode::TERMINATED,
        };
        // process::exit skips the guard's Drop.
        terminal::force_restore();
        std::process::exit(code);
    });

    match commands::dispatch(cli, &shutdown).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

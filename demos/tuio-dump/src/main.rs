//! TUIO Dump
//!
//! Binds a TUIO server and logs every cursor, object, refresh and error
//! event until interrupted. Set `RUST_LOG=debug` to also see frame commits
//! and late frames.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tuio_core::TuioEvent;
use tuio_runtime::{ServerConfig, TuioServer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Log TUIO 1.1 cursor and object events")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3333")]
    listen: SocketAddr,

    /// Minimum cursor displacement reported as movement
    #[arg(long, default_value_t = 0.0)]
    movement_threshold: f32,

    /// Frame regression treated as a sender restart
    #[arg(long, default_value_t = 100)]
    late_frame_window: i32,

    /// Refresh interval for unsequenced frames, in milliseconds
    #[arg(long, default_value_t = 100)]
    refresh_ms: u64,

    /// Skip refresh events in the output
    #[arg(long)]
    quiet_refresh: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        bind_addr: args.listen,
        movement_threshold: args.movement_threshold,
        late_frame_window: args.late_frame_window,
        time_refresh_interval: Duration::from_millis(args.refresh_ms),
        ..ServerConfig::default()
    };

    let server = TuioServer::new(config)?;
    let (_, mut events) = server.subscribe();
    let addr = server.connect().await?;
    info!(%addr, "waiting for TUIO messages, press ctrl-c to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(event) => log_event(&event, args.quiet_refresh),
                None => break,
            },
        }
    }

    server.disconnect().await;
    info!(
        objects = server.object_count(),
        cursors = server.cursors().len(),
        "shutdown"
    );
    Ok(())
}

fn log_event(event: &TuioEvent, quiet_refresh: bool) {
    match event {
        TuioEvent::CursorAdded(c) => info!(session = %c.session_id, x = c.x, y = c.y, "cursor added"),
        TuioEvent::CursorUpdated(c) => info!(session = %c.session_id, x = c.x, y = c.y, "cursor updated"),
        TuioEvent::CursorRemoved(c) => info!(session = %c.session_id, "cursor removed"),
        TuioEvent::ObjectAdded(o) => info!(
            session = %o.session_id,
            symbol = %o.symbol_id,
            x = o.x,
            y = o.y,
            angle = o.angle,
            "object added"
        ),
        TuioEvent::ObjectUpdated(o) => info!(
            session = %o.session_id,
            symbol = %o.symbol_id,
            x = o.x,
            y = o.y,
            angle = o.angle,
            x_speed = o.x_speed,
            y_speed = o.y_speed,
            "object updated"
        ),
        TuioEvent::ObjectRemoved(o) => info!(session = %o.session_id, symbol = %o.symbol_id, "object removed"),
        TuioEvent::Refresh(time) if !quiet_refresh => info!(millis = time.as_millis(), "refresh"),
        TuioEvent::Refresh(_) => {}
        TuioEvent::Error(e) => warn!(error = %e, "error"),
    }
}

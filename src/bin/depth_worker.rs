//! Reference depth worker.
//!
//! Binds the depth and coordination endpoints on loopback, announces the
//! bound ports as one JSON line on stdout, then serves synthetic depth maps
//! until its stdin is closed. Logs go to stderr.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use realenv::runtime::codec::{read_frame, write_frame};
use realenv::runtime::{ChannelError, DepthReply, DepthRequest, SyncReply, SyncRequest, WorkerReady};
use realenv::synthetic::depth_for_pose;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Serves synthetic depth maps to a realenv environment")]
struct Args {
    /// Port for depth requests, 0 picks a free one.
    #[arg(long, default_value_t = 0)]
    depth_port: u16,

    /// Port for render coordination, 0 picks a free one.
    #[arg(long, default_value_t = 0)]
    sync_port: u16,

    #[arg(long, default_value_t = 32)]
    width: u32,

    #[arg(long, default_value_t = 24)]
    height: u32,

    /// Stop answering after this many depth requests.
    #[arg(long)]
    stall_after: Option<u64>,

    /// Keep running after stdin is closed.
    #[arg(long)]
    ignore_stdin_close: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Arc::new(Args::parse());

    let depth = TcpListener::bind((Ipv4Addr::LOCALHOST, args.depth_port))
        .await
        .with_context(|| format!("binding depth port {}", args.depth_port))?;
    let sync = TcpListener::bind((Ipv4Addr::LOCALHOST, args.sync_port))
        .await
        .with_context(|| format!("binding sync port {}", args.sync_port))?;

    let ready = WorkerReady {
        depth_port: depth.local_addr()?.port(),
        sync_port: sync.local_addr()?.port(),
    };
    println!("{}", serde_json::to_string(&ready)?);
    info!(?ready, "depth worker listening");

    let served = Arc::new(AtomicU64::new(0));
    tokio::spawn(accept_depth(depth, Arc::clone(&args), served));
    tokio::spawn(accept_sync(sync));

    wait_for_stdin_close().await;
    if args.ignore_stdin_close {
        warn!("stdin closed; ignoring");
        std::future::pending::<()>().await;
    }
    info!("stdin closed; exiting");
    Ok(())
}

async fn wait_for_stdin_close() {
    let mut stdin = tokio::io::stdin();
    let mut buf = [0u8; 256];
    loop {
        match stdin.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}

async fn accept_depth(listener: TcpListener, args: Arc<Args>, served: Arc<AtomicU64>) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                debug!(%peer, "depth client connected");
                let (args, served) = (Arc::clone(&args), Arc::clone(&served));
                tokio::spawn(async move {
                    if let Err(e) = serve_depth(socket, &args, &served).await {
                        warn!(error = %e, "depth client dropped");
                    }
                });
            }
            Err(e) => warn!(error = %e, "depth accept failed"),
        }
    }
}

async fn serve_depth(mut socket: TcpStream, args: &Args, served: &AtomicU64) -> Result<(), ChannelError> {
    while let Some(request) = read_frame::<_, DepthRequest>(&mut socket).await? {
        let count = served.fetch_add(1, Ordering::SeqCst) + 1;
        if args.stall_after.is_some_and(|limit| count > limit) {
            warn!(count, "stalling depth channel");
            std::future::pending::<()>().await;
        }

        let DepthRequest::Render { pose } = request;
        let reply = DepthReply::Depth(depth_for_pose(pose.as_ref(), args.width, args.height));
        write_frame(&mut socket, &reply).await?;
    }
    Ok(())
}

async fn accept_sync(listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                debug!(%peer, "sync client connected");
                tokio::spawn(async move {
                    if let Err(e) = serve_sync(socket).await {
                        warn!(error = %e, "sync client dropped");
                    }
                });
            }
            Err(e) => warn!(error = %e, "sync accept failed"),
        }
    }
}

async fn serve_sync(mut socket: TcpStream) -> Result<(), ChannelError> {
    while let Some(request) = read_frame::<_, SyncRequest>(&mut socket).await? {
        let reply = match request {
            SyncRequest::Hello { model_id, scale_up } => {
                info!(%model_id, scale_up, "render process synchronized");
                SyncReply::Ready
            }
            SyncRequest::Pose(_) => SyncReply::Ack,
        };
        write_frame(&mut socket, &reply).await?;
    }
    Ok(())
}

//! The single-threaded terminal loop.
//!
//! Selects over stdin commands, the sync tick, finished sync requests and
//! the payment timers. Network calls run on spawned tasks and report back
//! over a channel; all state changes happen here.

use std::time::{Duration, Instant};

use posterm_core::TransactionRecord;
use posterm_sync::{SyncClient, SyncError, SyncPayload};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};

use crate::app::{Effect, TerminalApp};
use crate::events::parse_command;
use crate::render::Renderer;

/// How often the loop checks whether a sync is due.
const TICK: Duration = Duration::from_millis(500);

/// Upper bound on waiting for transaction posts at shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

type SyncResult = (u64, Result<SyncPayload, SyncError>);

/// Runs until `quit`, end of input or Ctrl-C.
///
/// An approved sale still on screen at exit is settled first, and
/// transaction posts get [`DRAIN_TIMEOUT`] to finish.
pub(crate) async fn run_terminal(
    mut app: TerminalApp,
    renderer: &Renderer,
    client: Option<SyncClient>,
) {
    let (sync_tx, mut sync_rx) = mpsc::unbounded_channel::<SyncResult>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut posts = JoinSet::new();
    let mut sync_task = SyncSlot::default();
    let mut input_open = true;

    println!("{}", renderer.draw(&app));

    loop {
        let deadline = app.next_deadline();
        let effects = tokio::select! {
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(event)) => app.handle(event, Instant::now()),
                    Ok(None) => Vec::new(),
                    Err(e) => vec![Effect::Print(e.to_string())],
                },
                Ok(None) => {
                    tracing::info!("input closed");
                    input_open = false;
                    // Let a pending payment play out before exiting.
                    if deadline.is_none() {
                        break;
                    }
                    Vec::new()
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!(error = %e, "skipping unreadable input line");
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!(error = %e, "stdin failed; no further input");
                    input_open = false;
                    if deadline.is_none() {
                        break;
                    }
                    Vec::new()
                }
            },
            _ = ticker.tick() => app.on_tick(Instant::now()),
            Some((generation, result)) = sync_rx.recv() => {
                app.apply_sync(generation, result, Instant::now())
            }
            () = sleep_until(deadline), if deadline.is_some() => {
                app.on_deadline(Instant::now())
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        };

        let mut quit = false;
        for effect in effects {
            match effect {
                Effect::StartSync(generation) => {
                    sync_task.replace(spawn_sync(client.as_ref(), generation, sync_tx.clone()));
                }
                Effect::PostTransaction(record) => {
                    spawn_post(&mut posts, client.as_ref(), record);
                }
                Effect::Render => println!("{}", renderer.draw(&app)),
                Effect::Print(message) => println!("{message}"),
                Effect::Quit => quit = true,
            }
        }
        if quit || (!input_open && app.next_deadline().is_none()) {
            break;
        }
    }

    sync_task.replace(None);
    for effect in app.settle() {
        match effect {
            Effect::PostTransaction(record) => spawn_post(&mut posts, client.as_ref(), record),
            Effect::Render => println!("{}", renderer.draw(&app)),
            _ => {}
        }
    }

    if !posts.is_empty() {
        tracing::info!(pending = posts.len(), "waiting for transaction posts");
        if tokio::time::timeout(DRAIN_TIMEOUT, async { while posts.join_next().await.is_some() {} })
            .await
            .is_err()
        {
            tracing::warn!(pending = posts.len(), "gave up waiting for transaction posts");
        }
    }
}

/// The in-flight sync request. Only the newest generation is ever applied,
/// so starting another one aborts whatever is still running.
#[derive(Default)]
struct SyncSlot(Option<AbortHandle>);

impl SyncSlot {
    fn replace(&mut self, next: Option<AbortHandle>) {
        if let Some(stale) = std::mem::replace(&mut self.0, next) {
            stale.abort();
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    if let Some(at) = deadline {
        tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
    }
}

fn spawn_sync(
    client: Option<&SyncClient>,
    generation: u64,
    tx: mpsc::UnboundedSender<SyncResult>,
) -> Option<AbortHandle> {
    let client = client.cloned()?;
    let task = tokio::spawn(async move {
        tracing::debug!(generation, "sync started");
        let result = client.fetch_sync().await;
        // The loop may already have exited.
        let _ = tx.send((generation, result));
    });
    Some(task.abort_handle())
}

fn spawn_post(posts: &mut JoinSet<()>, client: Option<&SyncClient>, record: TransactionRecord) {
    let Some(client) = client.cloned() else {
        tracing::info!(reference = %record.reference, total = %record.total, "offline; transaction not reported");
        return;
    };
    posts.spawn(async move {
        match client.post_transaction(&record).await {
            Ok(ack) => tracing::info!(
                reference = %record.reference,
                backend_reference = ack.reference.as_deref().unwrap_or("-"),
                "transaction recorded"
            ),
            Err(e) => tracing::warn!(
                reference = %record.reference,
                error = %e,
                "failed to record transaction"
            ),
        }
    });
}

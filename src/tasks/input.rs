use std::io::BufRead;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{self, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::Action;

/// Turn key names read line by line from `reader` into actions.
///
/// End of input is forwarded as [`Action::Exit`]. Unknown keys are logged
/// and ignored.
pub async fn run<Rd>(reader: Rd, to_scheduler: Sender<Action>, cancel: CancellationToken) -> Result<()>
where
    Rd: BufRead + Send + 'static,
{
    let (line_tx, mut line_rx) = mpsc::channel::<String>(16);
    // Blocking reads cannot be cancelled, so they get a detached thread
    // instead of the blocking pool.
    std::thread::Builder::new()
        .name("input-reader".into())
        .spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;

    loop {
        select! {
            _ = cancel.cancelled() => break,
            maybe_line = line_rx.recv() => {
                let Some(line) = maybe_line else {
                    info!("input closed");
                    let _ = to_scheduler.send(Action::Exit).await;
                    break;
                };
                match line.parse::<Action>() {
                    Ok(action) => {
                        debug!(?action, key = %line.trim(), "input");
                        if to_scheduler.send(action).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("{err}"),
                }
            }
        }
    }
    Ok(())
}

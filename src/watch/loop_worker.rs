use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::feed::{CardId, FeedDocument};
use crate::settings::SettingsNotice;

use super::event::{Effect, WatchEvent};
use super::session::WatchSession;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

// Import the logging macros (exported at crate root)
use crate::{log_info, log_warn};

/// Native event loop: one consumer over host signals, the sweep ticker,
/// settings notices and due skips. Runs until cancelled and hands the session
/// back for inspection.
pub async fn watch_loop<D: FeedDocument>(
    mut session: WatchSession<D>,
    mut host_rx: mpsc::UnboundedReceiver<WatchEvent>,
    mut settings_rx: broadcast::Receiver<SettingsNotice>,
    observe_tx: mpsc::UnboundedSender<CardId>,
    cancel_token: CancellationToken,
) -> WatchSession<D> {
    let (advance_tx, mut advance_rx) = mpsc::unbounded_channel();

    let period = session.config().sweep_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let effects = session.start();
    dispatch(effects, &observe_tx, &advance_tx);
    log_info!("Extension active ✔");

    let mut settings_open = true;

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("watch loop shutting down");
                break;
            }
            Some(card) = advance_rx.recv() => WatchEvent::AdvanceDue(card),
            notice = settings_rx.recv(), if settings_open => match notice {
                Ok(notice) => WatchEvent::SettingsChanged(notice),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log_warn!("missed {missed} settings notice(s)");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    log_warn!("settings source closed; keeping current settings");
                    settings_open = false;
                    continue;
                }
            },
            Some(event) = host_rx.recv() => event,
            _ = ticker.tick() => WatchEvent::Sweep,
        };

        let effects = session.handle(event);
        dispatch(effects, &observe_tx, &advance_tx);
    }

    session
}

fn dispatch(
    effects: Vec<Effect>,
    observe_tx: &mpsc::UnboundedSender<CardId>,
    advance_tx: &mpsc::UnboundedSender<CardId>,
) {
    for effect in effects {
        match effect {
            Effect::Observe(card) => {
                let _ = observe_tx.send(card);
            }
            Effect::ScheduleAdvance { card, delay } => {
                let advance_tx = advance_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = advance_tx.send(card);
                });
            }
        }
    }
}

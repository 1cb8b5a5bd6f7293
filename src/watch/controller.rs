use anyhow::{anyhow, bail, Context, Result};
use log::info;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::feed::{CardId, FeedDocument};
use crate::settings::SettingsNotice;

use super::event::WatchEvent;
use super::loop_worker::watch_loop;
use super::session::WatchSession;

/// Owns a running native [`watch_loop`] task.
pub struct WatchController<D> {
    handle: Option<JoinHandle<WatchSession<D>>>,
    cancel_token: Option<CancellationToken>,
    host_tx: Option<mpsc::UnboundedSender<WatchEvent>>,
}

impl<D> Default for WatchController<D> {
    fn default() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            host_tx: None,
        }
    }
}

impl<D> WatchController<D>
where
    D: FeedDocument + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the loop. Returns the stream of cards the session wants
    /// intersection reports for.
    pub fn start(
        &mut self,
        session: WatchSession<D>,
        settings_rx: broadcast::Receiver<SettingsNotice>,
    ) -> Result<mpsc::UnboundedReceiver<CardId>> {
        if self.handle.is_some() {
            bail!("watch loop already active");
        }

        let cancel_token = CancellationToken::new();
        let (host_tx, host_rx) = mpsc::unbounded_channel();
        let (observe_tx, observe_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(watch_loop(
            session,
            host_rx,
            settings_rx,
            observe_tx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.host_tx = Some(host_tx);
        Ok(observe_rx)
    }

    /// Forward an intersection or mutation report from the host.
    pub fn send(&self, event: WatchEvent) -> Result<()> {
        let tx = self
            .host_tx
            .as_ref()
            .ok_or_else(|| anyhow!("watch loop not running"))?;
        tx.send(event).map_err(|_| anyhow!("watch loop has exited"))
    }

    /// Cancel the loop and return its final session.
    pub async fn stop(&mut self) -> Result<Option<WatchSession<D>>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
            info!("Stop signal sent to watch loop");
        }
        self.host_tx = None;

        match self.handle.take() {
            Some(handle) => handle
                .await
                .context("watch loop task failed to join")
                .map(Some),
            None => Ok(None),
        }
    }
}

use anyhow::Result;
use tokio::sync::{mpsc::Receiver, oneshot};
use tracing::{debug, error, info};

use crate::{config::settings::Settings, host::HostPage, render::html::DisplayFragment};

/// Signals the host emits and the add-on reacts to.
#[derive(Debug)]
pub enum HostSignal {
    /// The host is assembling `page`. The fragment to append, if any, goes back through `reply`.
    ContentRequested {
        page: Option<HostPage>,
        reply: oneshot::Sender<Option<DisplayFragment>>,
    },
    /// An item was answered. Arguments the host passes along are irrelevant.
    ActivityRecorded,
    SessionEnded,
    SettingsSaved(Settings),
}

impl HostSignal {
    pub fn name(&self) -> &'static str {
        match self {
            HostSignal::ContentRequested { .. } => "content-requested",
            HostSignal::ActivityRecorded => "activity-recorded",
            HostSignal::SessionEnded => "session-ended",
            HostSignal::SettingsSaved(_) => "settings-saved",
        }
    }
}

/// Reacts to host signals. Each call runs to completion before the next signal is looked at.
pub trait SignalHandler {
    fn handle(&mut self, signal: HostSignal) -> Result<()>;
}

/// Feeds signals one by one into a [SignalHandler]. Stops once every sender is gone.
pub struct SignalModule<Handler> {
    receiver: Receiver<HostSignal>,
    handler: Handler,
}

impl<H: SignalHandler> SignalModule<H> {
    pub fn new(receiver: Receiver<HostSignal>, handler: H) -> Self {
        Self { receiver, handler }
    }

    /// Returns the handler once the host stopped sending signals.
    pub async fn run(mut self) -> H {
        while let Some(signal) = self.receiver.recv().await {
            let name = signal.name();
            debug!("Processing signal {name}");
            match self.handler.handle(signal) {
                Ok(_) => {
                    info!("Processed signal {name}")
                }
                Err(e) => {
                    error!("Error processing signal {name}: {e:?}")
                }
            }
        }

        self.receiver.close();
        self.handler
    }
}

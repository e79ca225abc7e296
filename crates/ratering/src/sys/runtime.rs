use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use ratekit::control::Command;
use std::thread;
use tokio::runtime::Runtime;

pub fn start_background_services(
    events: Sender<AppEvent>,
    commands_tx: Sender<Command>,
    commands_rx: Receiver<Command>,
) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            {
                let commands_tx = commands_tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(commands_tx).await;
                });
            }

            {
                let commands_tx = commands_tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(commands_tx).await;
                });
            }

            crate::sys::director::run_director(commands_rx, events).await;
        });
    });
}

use anyhow::anyhow;
use async_channel::Sender;
use ratekit::control::{Command, SOCKET_PATH};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Reads one command per line until the client hangs up.
async fn handle_client(stream: UnixStream, commands: Sender<Command>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(stream).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim().parse::<Command>() {
            Ok(command) => commands
                .send(command)
                .await
                .map_err(|_| anyhow!("command channel closed"))?,
            Err(_) => log::warn!("Unknown command on control socket: {:?}", line),
        }
    }
    Ok(())
}

pub async fn run_server(commands: Sender<Command>) {
    // Cleanup old socket if it exists
    if fs_err::metadata(SOCKET_PATH).is_ok() {
        let _ = fs_err::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let commands = commands.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, commands).await {
                        log::error!("Control client error: {}", e);
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

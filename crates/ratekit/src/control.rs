use std::io::Write;
use std::os::unix::net::UnixStream;
use strum::{Display as StrumDisplay, EnumString};

pub const SOCKET_PATH: &str = "/tmp/ratering.sock";

/// One line of the badge's control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Command {
    Show,
    Hide,
    /// Reload rating data and replay the animations.
    Reload,
}

pub fn send(command: Command) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to ratering at {}: {}. Is ratering running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", command)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_lines() {
        assert_eq!("show".parse::<Command>().unwrap(), Command::Show);
        assert_eq!("RELOAD".parse::<Command>().unwrap(), Command::Reload);
        assert!("launch".parse::<Command>().is_err());
        assert_eq!(Command::Hide.to_string(), "hide");
    }
}

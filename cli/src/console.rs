//! Line-oriented command console

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use otp_core::domain::value_objects::{BackendState, VerifyOtpResult};
use otp_core::services::OtpService;

const PROMPT: &[u8] = b"otp> ";

const HELP: &str = "commands:
  send <number>           issue and dispatch a code
  verify <number> <code>  check a code
  status                  show the active store backend
  help                    show this help
  quit                    exit";

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send { identifier: String },
    Verify { identifier: String, code: String },
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; blank lines yield `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("send", [identifier]) => Command::Send {
                identifier: identifier.to_string(),
            },
            ("verify", [identifier, code]) => Command::Verify {
                identifier: identifier.to_string(),
                code: code.to_string(),
            },
            ("status", []) => Command::Status,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            ("send", _) => return Err("usage: send <number>".to_string()),
            ("verify", _) => return Err("usage: verify <number> <code>".to_string()),
            (other, _) => return Err(format!("unknown command '{}', try 'help'", other)),
        };

        Ok(Some(command))
    }
}

#[derive(Serialize)]
struct SendResponse<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
}

#[derive(Serialize)]
struct StatusResponse {
    backend: BackendState,
}

/// Run a command against the service and render the reply
pub async fn execute(service: &OtpService, command: &Command) -> String {
    match command {
        Command::Send { identifier } => {
            let result = service.send(identifier).await;
            to_json(&SendResponse {
                success: result.success,
                message: &result.message,
                expires_in: result.success.then(|| service.expires_in_seconds()),
            })
        }
        Command::Verify { identifier, code } => {
            let result: VerifyOtpResult = service.verify(identifier, code).await;
            to_json(&result)
        }
        Command::Status => to_json(&StatusResponse {
            backend: service.backend_state(),
        }),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// Read commands until `quit`, end of input or Ctrl-C
pub async fn run<R, W>(service: &OtpService, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT).await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(service, &command).await,
            Err(message) => message,
        };

        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }

    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

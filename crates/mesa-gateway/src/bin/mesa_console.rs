//! Mesa Console: chat with the restaurant assistant from a terminal.
//! Same config and backend selection as the gateway; one session per run.
//! Commands: `/history`, `/quit`.

use anyhow::Context;
use mesa_core::{select_responder, ChatConfig, ChatSession, Role, USER_FACING_FAILURE};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ChatConfig::load().context("loading chat config")?;
    let mut session = ChatSession::new(select_responder(&config).context("initializing chat backend")?);

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            format!(
                "🤖 Asistente del restaurante ({}). Escribe /quit para salir.\n",
                session.mode()
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/salir" => break,
            "/history" => {
                for turn in session.conversation().snapshot() {
                    let who = match turn.role() {
                        Role::User => "tú",
                        Role::Assistant => "bot",
                    };
                    stdout
                        .write_all(format!("[{}] {}: {}\n", turn.at().format("%H:%M:%S"), who, turn.text()).as_bytes())
                        .await?;
                }
                continue;
            }
            _ => {}
        }

        let reply = match session.respond(input).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!("[MESA] Turn failed: {}", err);
                USER_FACING_FAILURE.to_string()
            }
        };
        stdout.write_all(format!("{}\n\n", reply).as_bytes()).await?;
    }

    Ok(())
}

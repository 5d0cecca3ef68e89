use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::OpenAiBackend;
use crate::chat::PhasedChat;
use crate::core::{AppConfig, logging};

/// Runs a phase based session in the terminal until interrupted.
/// Typing `/clear` starts the session over.
pub async fn run(id: &str, config: AppConfig) -> Result<()> {
    logging::init("warn");

    let mut rl = DefaultEditor::new()?;
    let chat = PhasedChat::new(
        Arc::new(OpenAiBackend::new(&config)),
        &config.system_message,
    );

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if line == "/clear" {
                    chat.clear();
                    println!("Session cleared.\n");
                    continue;
                }
                let resp = chat.respond(id, line).await?;
                println!("{}\n", resp);
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

//! Interactive console loop: reads queries from stdin until EOF or the
//! quit sentinel, forwarding each one to the agent.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::agent::Agent;

/// True when the trimmed input should end the session. An empty line
/// counts the same as `quit`.
pub fn is_quit(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("quit")
}

/// Run the chat loop over stdin until the user quits. A failed turn is
/// reported and the loop keeps going.
pub async fn run_chat_loop(agent: Agent) -> Result<()> {
    chat_loop(agent, BufReader::new(tokio::io::stdin())).await
}

async fn chat_loop<R>(mut agent: Agent, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("\n");
    println!("MCP PokeBot started!");
    println!("Type your query or 'quit' to exit");

    let mut lines = input.lines();
    loop {
        print!("\nQuery: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_quit(&line) {
            break;
        }

        match agent.process_query(line.trim()).await {
            Ok(_) => println!("\n"),
            Err(e) => println!("\nError occurred: {}", e),
        }
    }

    Ok(())
}

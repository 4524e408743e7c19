//! Console play against the agent
//!
//! The human plays White by typing UCI moves (`e2e4`, `e7e8q`). Besides
//! moves, the session understands:
//!
//! - `moves` - list the legal moves
//! - `new` - start a fresh game
//! - `quit` - leave the session
//!
//! End of input behaves like `quit`. The agent learns from its own replies as
//! in the web shell; saving the table is left to the caller.

use std::io::{BufRead, Write};

use chess_agent::{AgentError, ChessAgent, RulesEngine};
use tracing::debug;

use crate::core::error::{CoreError, CoreResult};

/// Counters for one console session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub games_started: usize,
    pub human_moves: usize,
    pub agent_moves: usize,
}

macro_rules! say {
    ($out:expr, $($arg:tt)*) => {
        writeln!($out, $($arg)*).map_err(CoreError::Console)?
    };
}

/// Run an interactive session reading commands from `input`
pub fn run_session<R, I, O>(agent: &ChessAgent<R>, input: I, mut output: O) -> CoreResult<SessionSummary>
where
    R: RulesEngine,
    I: BufRead,
    O: Write,
{
    let rules = agent.rules();
    let mut summary = SessionSummary {
        games_started: 1,
        ..SessionSummary::default()
    };
    let mut pos = agent.new_game();

    say!(output, "New game. You play White. Commands: moves, new, quit.");
    say!(output, "{}", rules.to_fen(&pos));

    for line in input.lines() {
        let line = line.map_err(CoreError::Console)?;
        let command = line.trim();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "new" => {
                pos = agent.new_game();
                summary.games_started += 1;
                say!(output, "New game.");
                say!(output, "{}", rules.to_fen(&pos));
                continue;
            }
            "moves" => {
                let moves: Vec<String> = agent
                    .legal_moves(&pos)
                    .into_iter()
                    .map(|id| id.to_string())
                    .collect();
                say!(output, "{}", moves.join(" "));
                continue;
            }
            _ => {}
        }

        pos = match agent.apply_human_move(&pos, command) {
            Ok(next) => next,
            Err(AgentError::InvalidAction { .. }) => {
                say!(output, "Illegal move: {}", command);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        summary.human_moves += 1;

        let status = agent.status(&pos);
        if let Some(message) = status.result_message() {
            say!(output, "{}", message);
            continue;
        }

        let reply = agent.agent_respond(&pos)?;
        summary.agent_moves += 1;
        debug!("[PLAY] Agent value for {}: {:.4}", reply.action, reply.q_value);
        pos = reply.position;

        say!(output, "Agent plays {}", reply.action);
        say!(output, "{}", rules.to_fen(&pos));
        if let Some(message) = agent.status(&pos).result_message() {
            say!(output, "{}", message);
        }
    }

    say!(output, "Goodbye.");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chess_agent::{AgentConfig, NullSink, QTable};

    fn agent() -> ChessAgent {
        let config = AgentConfig {
            seed: Some(3),
            ..AgentConfig::default()
        };
        ChessAgent::new(config, QTable::new(), Arc::new(NullSink)).expect("valid config")
    }

    fn play(agent: &ChessAgent, script: &str) -> (SessionSummary, String) {
        let mut out = Vec::new();
        let summary = run_session(agent, script.as_bytes(), &mut out).expect("session runs");
        (summary, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn test_move_gets_a_reply() {
        let agent = agent();
        let (summary, out) = play(&agent, "e2e4\nquit\n");
        assert_eq!(summary.human_moves, 1);
        assert_eq!(summary.agent_moves, 1);
        assert!(out.contains("Agent plays"));
        assert_eq!(agent.stats().entries, 1);
    }

    #[test]
    fn test_illegal_move_is_reported() {
        let agent = agent();
        let (summary, out) = play(&agent, "e2e5\n");
        assert_eq!(summary.human_moves, 0);
        assert!(out.contains("Illegal move: e2e5"));
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn test_moves_lists_opening_moves() {
        let agent = agent();
        let (_, out) = play(&agent, "moves\n");
        let listing = out.lines().nth(2).expect("listing line");
        assert_eq!(listing.split_whitespace().count(), 20);
        assert!(listing.contains("g1f3"));
    }

    #[test]
    fn test_new_restarts_game() {
        let agent = agent();
        let (summary, out) = play(&agent, "d2d4\nnew\nquit\n");
        assert_eq!(summary.games_started, 2);
        assert!(out.contains("New game.\nrnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let agent = agent();
        let (summary, _) = play(&agent, "quit\ne2e4\n");
        assert_eq!(summary.human_moves, 0);
    }
}

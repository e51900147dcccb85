//! Two computer opponents play a full battle.
//!
//! Configuration comes from `ARENA_*` variables; the roster defaults to the
//! bundled sample.
//!
//! ```text
//! RUST_LOG=arena_battle=debug cargo run -p arena-server --example ai_duel
//! ```

use std::path::PathBuf;

use anyhow::Result;
use arena_battle::Entrant;
use arena_server::{Arena, ArenaConfig, TurnOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut config = ArenaConfig::from_env()?;
    if config.roster_path.is_none() {
        config.roster_path = Some(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../team/data/characters.json"
        )));
    }
    let arena = Arena::from_config(config)?;

    let battle = arena
        .create_battle(Entrant::ai("AI_leaf", [1, 2, 3]), Entrant::ai("AI_sand", [4, 5, 1]))
        .await?;

    let mut turns = 0;
    loop {
        match arena.process_turn(&battle.id).await? {
            TurnOutcome::Resolved(report) => {
                turns += report.turns_resolved;
                if report.turns_resolved == 0 {
                    break;
                }
            }
            TurnOutcome::Skipped(_) => break,
        }
    }

    if let Some(battle) = arena.battle(&battle.id)? {
        tracing::info!(
            turn = battle.turn,
            extra_turns = turns,
            winner = battle.winner.as_deref().unwrap_or("none"),
            "duel over"
        );
    }
    Ok(())
}

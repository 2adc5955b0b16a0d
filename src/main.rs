use anyhow::Result;
use mirror_booth::core::cancel;
use mirror_booth::sequencer::Sequencer;
use mirror_booth::stage::memory::MemoryStage;
use mirror_booth::stage::term::TerminalStage;
use mirror_booth::{load_booth_config, Booth, BoothError, Language, OutcomeChoice, RunOutcome};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let headless = std::env::args().any(|a| a == "--headless");

    // Raw mode owns stdout, so logs go to stderr; quiet by default on the
    // kiosk, RUST_LOG opens it up.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(if headless { "mirror_booth=info" } else { "warn" })
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_booth_config();
    let (abort, token) = cancel::cancel_pair();

    if headless {
        // Scripted dry run: primary deck, protect pick, no terminal needed.
        // Useful to sanity-check a custom script file before it hits the
        // shop floor.
        let stage = Arc::new(MemoryStage::new());
        stage.push_language(Language::Primary);
        stage.push_choice(OutcomeChoice::Protect);
        stage.push_flip();
        let booth = Booth::new(stage.clone(), &config);
        let outcome = Sequencer::new(booth, token).run().await;
        info!("headless run finished: {:?}", outcome);
        for event in stage.events() {
            println!("{:>8.3}s  {:?}", event.at.as_secs_f64(), event.kind);
        }
        return Ok(());
    }

    let stage = TerminalStage::new(abort)?;
    let booth = Booth::new(stage.clone(), &config);
    let sequencer = Sequencer::new(booth, token.clone());

    match sequencer.run().await {
        Ok(RunOutcome::Decided(choice)) => {
            info!("run ended with verdict for {:?}", choice);
            // Leave the verdict on screen until the staff resets the booth.
            token.cancelled().await;
        }
        Ok(RunOutcome::CardShown) => {
            info!("run ended on the reward card");
            token.cancelled().await;
        }
        Err(BoothError::Cancelled) | Err(BoothError::InputClosed) => {
            info!("run aborted");
        }
    }

    drop(sequencer);
    drop(stage); // restores the terminal
    Ok(())
}

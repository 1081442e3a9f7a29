use clap::Parser;
use flexi_logger::Logger;
use std::sync::Arc;

use gomoku_zero::servers::{WebConfig, WebServer};
use gomoku_zero::services::{AiEngine, ModelSlot, TurnOrchestrator};

#[derive(Parser, Debug)]
#[command(name = "gomoku_zero")]
struct Config {
    /// Port for the HTTP server
    #[arg(short = 'p', long, default_value_t = 8080)]
    port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Legacy parameter bundle (safetensors, 16 positional arrays)
    #[arg(long, default_value = "best_policy_8_8_5.safetensors")]
    model_file: String,

    /// Board width
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Board height
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Stones in a row needed to win
    #[arg(long, default_value_t = 5)]
    n_in_row: usize,

    /// MCTS playouts per move. Kept low: the numpy-era model plays fine at
    /// 64 and web clients time out well before 400.
    #[arg(short = 's', long, default_value_t = 64)]
    num_playouts: usize,

    /// PUCT exploration constant
    #[arg(long, default_value_t = 5.0)]
    c_puct: f64,

    /// Directory with the frontend assets
    #[arg(long, default_value = "static")]
    static_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    // The AI is published exactly once, before the listener starts. A failed
    // load leaves the slot empty: move requests get 503 while the status and
    // static endpoints keep serving.
    let slot = Arc::new(ModelSlot::new());
    match AiEngine::load(
        &config.model_file,
        config.width,
        config.height,
        config.c_puct,
        config.num_playouts,
    ) {
        Ok(engine) => {
            let orchestrator = TurnOrchestrator::new(
                config.width,
                config.height,
                config.n_in_row,
                Box::new(engine),
            );
            slot.publish(Arc::new(orchestrator));
            log::info!(
                "model ready ({}x{} board, {} in a row, {} playouts)",
                config.width,
                config.height,
                config.n_in_row,
                config.num_playouts
            );
        }
        Err(e) => {
            log::error!("model load failed ({e}); serving without AI");
        }
    }

    let web_config = WebConfig {
        port: config.port,
        host: config.host,
        static_dir: config.static_dir,
    };
    WebServer::new(web_config, slot).start().await?;
    Ok(())
}

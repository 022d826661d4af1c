use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use cortex::audio::clip::SpeechClip;
use cortex::audio::playback::{Playback, PlaybackSink};
use cortex::config::Config;
use cortex::kernel::cycle::CycleResult;
use cortex::kernel::phase::Pacing;
use cortex::services::llm::backend::InferenceBackend;
use cortex::services::llm::client::GeminiClient;
use cortex::vision::heatmap::render_heatmap;
use cortex::vision::input::ImageInput;
use cortex::Session;

/// Active inference brain simulation driven by a generative vision model.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file; environment variables override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, default_value = "cortex=info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run perception cycles on an image, carrying the belief state forward.
    Simulate {
        image: PathBuf,

        #[arg(long, default_value_t = 1)]
        cycles: u32,

        /// Skip the animation dwell times between phases.
        #[arg(long)]
        no_pacing: bool,

        /// Synthesize the last narrative and play it.
        #[arg(long)]
        speak: bool,

        /// Write the synthesized narrative to this WAV file.
        #[arg(long, value_name = "PATH")]
        wav: Option<PathBuf>,

        /// Write the prediction-error heatmap of the input to this PNG file.
        #[arg(long, value_name = "PATH")]
        heatmap: Option<PathBuf>,

        /// Print each result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Synthesize arbitrary text to a WAV file.
    Speak {
        text: String,

        #[arg(long, value_name = "PATH")]
        wav: PathBuf,
    },

    /// Render the heatmap of an image without calling the service.
    Heatmap { image: PathBuf, out: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env();

    match cli.command {
        Commands::Simulate {
            image,
            cycles,
            no_pacing,
            speak,
            wav,
            heatmap,
            json,
        } => {
            let input = ImageInput::from_path(&image)
                .with_context(|| format!("loading {}", image.display()))?;

            if let Some(out) = heatmap {
                write_heatmap(&image, &out)?;
            }

            let pacing = if no_pacing { Pacing::instant() } else { config.pacing };
            let backend = Arc::new(GeminiClient::new(&config));
            let session = Session::new(backend, pacing, config.alpha);

            let mut phases = session.subscribe();
            let printer = tokio::spawn(async move {
                loop {
                    match phases.recv().await {
                        Ok(event) => println!("[PHASE] {}", event.to.label()),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            tracing::info!("Cortex session active. {} cycle(s) queued.", cycles);
            for _ in 0..cycles {
                let result = session.run_cycle(&input).await?;
                print_result(&result, json)?;
            }

            for line in &session.snapshot().simulation_log {
                println!("[LOG] {}", line);
            }

            if speak || wav.is_some() {
                match session.speak().await? {
                    Some(clip) => deliver(clip, wav, speak, config.player.clone()).await?,
                    None => tracing::warn!("nothing to speak"),
                }
            }

            let t = session.telemetry();
            tracing::info!(
                completed = t.cycle_stats.completed,
                failed = t.cycle_stats.failed,
                avg_error = t.cycle_stats.avg_prediction_error,
                transitions = t.phase_stats.transitions,
                "session summary"
            );

            drop(session);
            let _ = printer.await;
        }
        Commands::Speak { text, wav } => {
            let backend = GeminiClient::new(&config);
            let audio = backend.synthesize(&text).await?;
            let clip = SpeechClip::from_base64(&audio)?;
            clip.write_wav(&wav)?;
            println!("Wrote {:.1}s of speech to {}", clip.duration().as_secs_f32(), wav.display());
        }
        Commands::Heatmap { image, out } => {
            write_heatmap(&image, &out)?;
        }
    }

    Ok(())
}

fn write_heatmap(image: &Path, out: &Path) -> anyhow::Result<()> {
    let decoded = image::open(image).with_context(|| format!("decoding {}", image.display()))?;
    render_heatmap(&decoded)
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("Heatmap written to {}", out.display());
    Ok(())
}

fn print_result(result: &CycleResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    let m = &result.metrics;
    println!("OBJECT:      {} ({})", result.bottom_up.it.object_label, result.bottom_up.it.category);
    println!("PREDICTION:  {}", result.top_down.pfc.prediction);
    println!("ERROR:       {:.3}  (similarity {:.3})", m.prediction_error, m.cosine_similarity);
    println!("BELIEF Δ:    {:.3}  -> {:?}", m.belief_update_delta, result.new_belief_state.as_slice());
    println!("FIRING RATE: {} Hz", result.conscious.firing_rate);
    println!("MOTOR:       {} -> {}", result.motor.action, result.motor.target);
    println!("NARRATIVE:   {}", result.conscious.narrative);
    Ok(())
}

async fn deliver(
    clip: SpeechClip,
    wav: Option<PathBuf>,
    play: bool,
    player: Option<String>,
) -> anyhow::Result<()> {
    if let Some(path) = wav {
        clip.write_wav(&path)?;
        println!("Narrative audio written to {}", path.display());
    }
    if play {
        let sink = match player {
            Some(cmd) => PlaybackSink::Command(cmd),
            None => {
                tracing::warn!("no CORTEX_PLAYER configured, playing silently");
                PlaybackSink::Silent
            }
        };
        let playback = Playback::new(sink);
        let handle = playback.start(clip)?;
        let outcome = tokio::select! {
            res = handle => res??,
            _ = tokio::signal::ctrl_c() => {
                playback.stop();
                tracing::info!("playback interrupted");
                return Ok(());
            }
        };
        tracing::info!(?outcome, "playback done");
    }
    Ok(())
}

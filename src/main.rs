use anyhow::Result;
use clap::{Parser, Subcommand};
use gemini_studio::media;
use gemini_studio::models::{ChatRole, ChatTranscript, Config, ImageInput};
use gemini_studio::playback::WavPlayer;
use gemini_studio::story::{ContinueOutcome, ReadAloudOutcome, StorySession};
use gemini_studio::studio::Studio;
use gemini_studio::Error;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-studio")]
#[command(about = "Chat, describe images, and write illustrated stories with Gemini")]
struct CliArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Multi-turn chat read from stdin, one message per line.
    Chat,
    /// Ask a question about an image.
    Analyze {
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        #[arg(long, default_value = "Describe this image in detail.")]
        prompt: String,
    },
    /// Write the opening of a story inspired by an image.
    Story {
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        #[arg(long, default_value = "Fantasy")]
        genre: String,
        #[arg(long, default_value = "Descriptive")]
        style: String,
        /// Number of paragraphs to add after the opening.
        #[arg(long = "continue", value_name = "N", default_value_t = 0)]
        continuations: usize,
        /// Narrate the finished story.
        #[arg(long)]
        read_aloud: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting gemini-studio");
    let studio = Studio::from_config(&config);

    match args.mode {
        Mode::Chat => run_chat(&studio).await?,
        Mode::Analyze { image, prompt } => {
            let Some(image) = load_image_or_report(&image).await else {
                std::process::exit(1);
            };
            println!("{}", studio.analyze_image(&prompt, &image).await);
        }
        Mode::Story {
            image,
            genre,
            style,
            continuations,
            read_aloud,
        } => {
            let Some(image) = load_image_or_report(&image).await else {
                std::process::exit(1);
            };
            let player = WavPlayer::new(&config.output_dir)
                .with_command(config.player_command.as_deref());
            let options = StoryOptions {
                genre,
                style,
                continuations,
                read_aloud,
            };
            if !run_story(&studio, &player, image, options).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn load_image_or_report(path: &Path) -> Option<ImageInput> {
    match media::load_image(path).await {
        Ok(image) => Some(image),
        Err(Error::ImageTooLarge { .. }) => {
            eprintln!("Image size should be less than 4MB.");
            None
        }
        Err(e) => {
            error!("Failed to encode {}: {}", path.display(), e);
            eprintln!("Could not read the image. Please try another file.");
            None
        }
    }
}

async fn run_chat(studio: &Studio) -> Result<()> {
    let mut transcript = ChatTranscript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if !message.is_empty() {
            transcript.push(ChatRole::User, message);
            let reply = studio.send_chat_turn(message).await;
            transcript.push(ChatRole::Model, reply.as_str());
            stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    info!("Chat ended after {} messages", transcript.len());
    Ok(())
}

struct StoryOptions {
    genre: String,
    style: String,
    continuations: usize,
    read_aloud: bool,
}

/// Returns `false` when the story could not be generated.
async fn run_story(
    studio: &Studio,
    player: &WavPlayer,
    image: ImageInput,
    options: StoryOptions,
) -> bool {
    let session = StorySession::new();

    let state = match session
        .generate(studio, image, &options.genre, &options.style)
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to generate story. Please try again.");
            return false;
        }
    };

    println!("{}\n", state.story);
    println!("Inspiration:");
    for prompt in &state.inspiration_prompts {
        println!("  - {}", prompt);
    }

    for _ in 0..options.continuations {
        match session.continue_story(studio).await {
            Ok(ContinueOutcome::Appended(paragraph)) => println!("\n{}", paragraph),
            Ok(ContinueOutcome::Failed(message)) => {
                eprintln!("{}", message);
                break;
            }
            Err(e) => {
                error!("{}", e);
                break;
            }
        }
    }

    if options.read_aloud {
        match session.read_aloud(studio, player).await {
            Ok(ReadAloudOutcome::Played) => info!("Narration finished"),
            Ok(ReadAloudOutcome::NoAudio) => {
                eprintln!("Could not generate audio for the story.")
            }
            Err(e) => {
                error!("Playback failed: {}", e);
                eprintln!("Failed to play audio. Please try again.");
            }
        }
    }

    true
}

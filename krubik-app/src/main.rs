use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use krubik_app::render::{render_moves, render_net, Style};
use krubik_app::{
    Changes, Config, CubeStore, Language, Playback, PlaybackState, RuntimeConfig, SolveClient,
    SolveSession, SubmitError, Text,
};
use krubik_model::{validate, CubeState, Face};
use log::info;
use owo_colors::OwoColorize;

#[derive(Parser)]
#[command(name = "krubik", version, about = "Edit, check and solve Rubik's cube states")]
struct Cli {
    /// TOML file with runtime settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Language for messages, e.g. `en` or `ru`.
    #[arg(long, global = true)]
    lang: Option<String>,
    /// Solve endpoint URL.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a 54 character state.
    Validate { state: String },
    /// Print the unfolded cube.
    Preview { state: Option<String> },
    /// Ask the solver for a solution and play it back.
    Solve {
        state: String,
        /// Print the moves once instead of stepping through them.
        #[arg(long)]
        no_playback: bool,
    },
    /// Recolor facelets and print the resulting state.
    Set {
        /// Starting state; the solved cube if omitted.
        state: Option<String>,
        /// Edit as FACE:INDEX:COLOR, e.g. `U:0:R`. May be repeated.
        #[arg(long = "edit", required = true)]
        edits: Vec<Edit>,
    },
}

#[derive(Clone, Debug)]
struct Edit {
    face: Face,
    index: usize,
    color: char,
}

impl FromStr for Edit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (face, index, color) = match parts.as_slice() {
            [face, index, color] => (*face, *index, *color),
            _ => return Err(format!("expected FACE:INDEX:COLOR, got {:?}", s)),
        };
        let face = face.parse::<Face>().map_err(|e| e.to_string())?;
        let index = index
            .parse::<usize>()
            .map_err(|e| format!("bad index {:?}: {}", index, e))?;
        let mut chars = color.chars();
        let color = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(format!("expected a single color letter, got {:?}", color)),
        };
        Ok(Edit { face, index, color })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let flags = RuntimeConfig {
        api_url: cli.endpoint,
        language: cli.lang,
        ..RuntimeConfig::default()
    };
    let runtime = match &cli.config {
        Some(path) => flags.or(RuntimeConfig::from_file(path)?),
        None => flags,
    };
    let config = Config::load(runtime)?;

    let style = if cli.plain || !io::stdout().is_terminal() {
        Style::Plain
    } else {
        Style::Color
    };
    let lang = config.language;

    match cli.command {
        Command::Validate { state } => {
            let validation = validate(&state);
            if validation.is_valid() {
                println!("{}", lang.text(Text::Valid));
            } else {
                eprintln!("{}", lang.describe_all(validation.errors()));
                process::exit(1);
            }
        }
        Command::Preview { state } => {
            let cube = parse_or_solved(state.as_deref(), lang);
            println!("{}", lang.text(Text::PreviewHeading));
            print!("{}", render_net(&cube, style));
        }
        Command::Set { state, edits } => {
            let store = CubeStore::new();
            store.set_faces(parse_or_solved(state.as_deref(), lang));
            for edit in &edits {
                store.set_facelet(edit.face, edit.index, edit.color)?;
            }
            let state = store.serialize();
            print!("{}", render_net(&store.faces(), style));
            println!("{}", state);
            let validation = validate(&state);
            if !validation.is_valid() {
                eprintln!("{}", lang.describe_all(validation.errors()));
            }
        }
        Command::Solve { state, no_playback } => {
            let cube = parse_or_solved(Some(&state), lang);
            solve(cube, &config, style, no_playback).await?;
        }
    }
    Ok(())
}

/// Parse a state, or exit with the localized validation errors.
fn parse_or_solved(state: Option<&str>, lang: Language) -> CubeState {
    let state = match state {
        Some(state) => state,
        None => return CubeState::new(),
    };
    match state.parse::<CubeState>() {
        Ok(cube) => cube,
        Err(invalid) => {
            eprintln!("{}", lang.describe_all(invalid.errors()));
            process::exit(1);
        }
    }
}

async fn solve(
    cube: CubeState,
    config: &Config,
    style: Style,
    no_playback: bool,
) -> Result<(), Box<dyn Error>> {
    let lang = config.language;
    let store = Arc::new(CubeStore::new());
    store.set_faces(cube);
    let session = SolveSession::new(Arc::clone(&store), SolveClient::new(config)?);

    let playback = Arc::new(Playback::new(config.playback_interval));
    let player = Arc::clone(&playback);
    let _solution = store.subscribe(Changes::SOLUTION, move |snapshot, _| {
        player.load(snapshot.solution.clone());
    });
    let _status = store.subscribe(Changes::STATUS, move |snapshot, _| {
        info!("Solver status: {}", snapshot.status);
    });

    println!("{}", lang.status(store.status()));
    let result = match session.submit(lang).await {
        Ok(result) => result,
        Err(err) => {
            let message = match &err {
                SubmitError::Busy => lang.text(Text::Busy).to_string(),
                SubmitError::Superseded => lang.text(Text::Superseded).to_string(),
                _ => store.error().unwrap_or_else(|| err.to_string()),
            };
            eprintln!("{}: {}", lang.status(store.status()), message);
            process::exit(1);
        }
    };

    println!("{}", lang.status(store.status()));
    println!("{}", lang.source(result.source));
    if no_playback || result.is_already_solved() {
        print!("{}", render_moves(&playback.snapshot(), lang, style));
        return Ok(());
    }

    let mut updates = playback.subscribe();
    playback.play();
    loop {
        let snapshot = updates.borrow_and_update().clone();
        let state = match (snapshot.state, style) {
            (PlaybackState::Playing, Style::Color) => lang.text(Text::Play).green().to_string(),
            (PlaybackState::Playing, Style::Plain) => lang.text(Text::Play).to_string(),
            (_, Style::Color) => lang.text(Text::Pause).yellow().to_string(),
            (_, Style::Plain) => lang.text(Text::Pause).to_string(),
        };
        println!("[{}]", state);
        print!("{}", render_moves(&snapshot, lang, style));
        if snapshot.is_finished() {
            break;
        }
        updates.changed().await?;
    }
    Ok(())
}

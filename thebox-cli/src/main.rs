mod console;
mod names;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;

use console::{ConsoleChoices, ConsoleGate, ConsoleSink, EventFormat};
use names::FlatFileNames;
use thebox_game::{
    AdvanceGate, AlwaysChoose, Choice, ChoiceProvider, DEFAULT_BOX_ITEM_COUNT, GameConfig,
    GameSession, NoPause, RandomChoices,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AutoChoice {
    /// Always retrieve a missing house item
    Retrieve,
    /// Always take a gift from The Box
    Gift,
    /// Flip a seeded coin
    Random,
}

#[derive(Debug, Parser)]
#[command(name = "thebox", version)]
#[command(about = "The Box - a party elimination game played one day at a time")]
struct Args {
    /// Number of items in the box
    #[arg(long, default_value_t = DEFAULT_BOX_ITEM_COUNT)]
    box_items: u32,

    /// File listing one player name per line
    #[arg(long, default_value = "players.csv")]
    players: PathBuf,

    /// File listing one house item per line
    #[arg(long, default_value = "house-objects.csv")]
    house_items: PathBuf,

    /// Seed for a replayable game (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many days instead of playing forever
    #[arg(long)]
    max_days: Option<u32>,

    /// Answer the retrieve-or-gift question automatically
    #[arg(long, value_enum)]
    auto: Option<AutoChoice>,

    /// Do not wait for enter between days
    #[arg(long)]
    no_pause: bool,

    /// How events are printed
    #[arg(long, value_enum, default_value_t = EventFormat::Text)]
    events: EventFormat,

    /// Verbose output (daily status at debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let seed = args.seed.unwrap_or_else(rand::random);
    let source = FlatFileNames::new(&args.players, &args.house_items);
    let mut session = GameSession::from_source(
        &source,
        GameConfig::with_box_item_count(args.box_items),
        seed,
    )
    .with_context(|| {
        format!(
            "setting up the game from {} and {}",
            args.players.display(),
            args.house_items.display()
        )
    })?;
    if let Some(max_days) = args.max_days {
        session = session.with_max_turns(max_days);
    }

    announce_seed(args.events, seed)?;

    let mut choices = build_choices(args.auto, args.events, seed);
    let mut gate: Box<dyn AdvanceGate> = if args.no_pause {
        Box::new(NoPause)
    } else {
        Box::new(ConsoleGate::new(io::stdin(), prompt_writer(args.events)))
    };
    let mut sink = ConsoleSink::new(io::stdout(), args.events);

    let report = match session.play(choices.as_mut(), gate.as_mut(), &mut sink) {
        Ok(report) => report,
        Err(err) if err.is_fatal() => {
            match serde_json::to_string(&session.snapshot()) {
                Ok(state) => log::error!("state at failure: {state}"),
                Err(json_err) => log::error!("state at failure not serializable: {json_err}"),
            }
            return Err(err).context("the game stopped on a bookkeeping error");
        }
        Err(err) => return Err(err).context("the game could not continue"),
    };
    log::info!("game ended after {} days", report.turns_played);
    if args.events == EventFormat::Text {
        println!();
        println!(
            "{}",
            format!("The Box closes after day {}.", report.turns_played).cyan()
        );
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Prompts and the day gate share stdout with prose but stay off it when
/// stdout carries JSON lines.
fn prompt_writer(format: EventFormat) -> Box<dyn Write> {
    match format {
        EventFormat::Text => Box::new(io::stdout()),
        EventFormat::Json => Box::new(io::stderr()),
    }
}

fn announce_seed(format: EventFormat, seed: u64) -> Result<()> {
    let line = format!("Seed {seed} (replay with --seed {seed})");
    match format {
        EventFormat::Text => writeln!(io::stdout(), "{}", line.dimmed())?,
        EventFormat::Json => writeln!(io::stderr(), "{line}")?,
    }
    Ok(())
}

fn build_choices(
    auto: Option<AutoChoice>,
    format: EventFormat,
    seed: u64,
) -> Box<dyn ChoiceProvider> {
    match auto {
        None => Box::new(ConsoleChoices::new(io::stdin(), prompt_writer(format))),
        Some(AutoChoice::Retrieve) => Box::new(AlwaysChoose(Choice::Retrieve)),
        Some(AutoChoice::Gift) => Box::new(AlwaysChoose(Choice::Gift)),
        Some(AutoChoice::Random) => Box::new(RandomChoices::from_user_seed(seed)),
    }
}

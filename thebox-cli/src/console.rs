//! Terminal collaborators: event printing, the retrieve-or-gift prompt and
//! the "press enter" gate.
use colored::Colorize;
use std::io::{self, BufRead, Write};

use thebox_game::{
    AdvanceGate, Choice, ChoiceContext, ChoiceProvider, DayMode, Event, EventKind, EventSink,
    HouseItem, Phase,
};

/// Line-oriented input shared by the prompt and the gate.
pub trait LineReader {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl LineReader for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]>> LineReader for io::Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventFormat {
    /// Readable sentences, like a game host would say them
    Text,
    /// One JSON object per event
    Json,
}

/// Prints events as prose or JSON lines.
pub struct ConsoleSink<W: Write> {
    out: W,
    format: EventFormat,
}

impl<W: Write> ConsoleSink<W> {
    pub const fn new(out: W, format: EventFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: Event) {
        let written = match self.format {
            EventFormat::Text => render_text(&event)
                .into_iter()
                .try_for_each(|line| writeln!(self.out, "{line}")),
            EventFormat::Json => match serde_json::to_string(&event) {
                Ok(json) => writeln!(self.out, "{json}"),
                Err(err) => {
                    log::warn!("event not serializable: {err}");
                    Ok(())
                }
            },
        };
        if let Err(err) = written.and_then(|()| self.out.flush()) {
            log::warn!("could not write event: {err}");
        }
    }
}

fn join(items: &[HouseItem]) -> String {
    items
        .iter()
        .map(HouseItem::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable lines for one event.
pub fn render_text(event: &Event) -> Vec<String> {
    match &event.kind {
        EventKind::Welcome { players } => vec![
            String::new(),
            "WELCOME TO THE BOX".bright_cyan().bold().to_string(),
            format!(
                "Today's players are: {}. Who will be the last one standing?",
                players.join(", ")
            ),
            "Let the game begin! May The Box be with you!".to_string(),
        ],
        EventKind::DayStarted { mode } => {
            let header = format!("DAY {}", event.day());
            let header = match mode {
                DayMode::Normal => header.bold().to_string(),
                DayMode::Hardcore => format!("{header} (HARDCORE)").red().bold().to_string(),
            };
            vec![String::new(), "==========================".cyan().to_string(), header]
        }
        EventKind::PhaseStarted { phase } => vec![String::new(), format!("It's {phase}!")],
        EventKind::LuckyPlayer { player } => {
            vec![format!("{} is our lucky player!", player.green().bold())]
        }
        EventKind::ChoiceRequested { .. } => {
            vec!["Will they retrieve a lost item or claim a gift from The Box?".to_string()]
        }
        EventKind::ChoiceMade { player, choice } => {
            vec![format!("{player} picks: {choice}").dimmed().to_string()]
        }
        EventKind::FullHouseGift { .. } => {
            vec!["They have all the items, so The Box rewards them with a gift!".to_string()]
        }
        EventKind::UnluckyPlayer { player, phase } => match phase {
            Phase::FivePm => vec![format!(
                "Oh, {} is out of luck. They lose an item!",
                player.red().bold()
            )],
            Phase::NinePm => vec![format!("Unlucky {}...", player.red().bold())],
        },
        EventKind::HouseItemLost {
            player,
            item,
            remaining,
        } => vec![format!(
            "{player} loses the {}. They now have: {}.",
            item.as_str().yellow(),
            join(remaining)
        )],
        EventKind::HouseItemRetrieved { player, item, held } => vec![format!(
            "{player} retrieves the {}. They now have: {}.",
            item.as_str().green(),
            join(held)
        )],
        EventKind::NothingToLose { player } => {
            vec![format!("{player} cannot lose anything because they have nothing!")]
        }
        EventKind::NothingToRetrieve { player } => {
            vec![format!("{player} cannot retrieve any items because they have everything!")]
        }
        EventKind::BoxItemGranted {
            player,
            item,
            window,
            ..
        } => vec![format!(
            "{player} got a {} from The Box! It will expire in {window} turns",
            item.to_string().magenta()
        )],
        EventKind::BoxItemExpired { player, item } => {
            vec![format!("{player}'s {item} expired!")]
        }
        EventKind::BoxEmpty { player } => {
            vec![format!("The Box is empty, so {player} gets nothing this time.")]
        }
    }
}

/// Asks on the terminal until the answer is 1 or 2.
pub struct ConsoleChoices<R: LineReader, W: Write> {
    input: R,
    out: W,
    closed: bool,
}

impl<R: LineReader, W: Write> ConsoleChoices<R, W> {
    pub const fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            closed: false,
        }
    }

    fn prompt(&mut self) -> io::Result<Option<Choice>> {
        loop {
            writeln!(
                self.out,
                "Type your preference: (1 = retrieve item, 2 = gift from The Box)"
            )?;
            self.out.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.parse::<Choice>() {
                Ok(choice) => return Ok(Some(choice)),
                Err(err) => log::debug!("re-prompting: {err}"),
            }
        }
    }
}

impl<R: LineReader, W: Write> ChoiceProvider for ConsoleChoices<R, W> {
    fn choose(&mut self, ctx: &ChoiceContext<'_>) -> Choice {
        if !self.closed {
            match self.prompt() {
                Ok(Some(choice)) => return choice,
                Ok(None) => log::warn!("input closed; gifting from now on"),
                Err(err) => log::warn!("could not read a choice ({err}); gifting from now on"),
            }
            self.closed = true;
        }
        log::debug!("{} gets a gift on turn {}", ctx.player.name(), ctx.turn);
        Choice::Gift
    }
}

/// Waits for enter between days. Reports itself closed once input ends.
pub struct ConsoleGate<R: LineReader, W: Write> {
    input: R,
    out: W,
    closed: bool,
}

impl<R: LineReader, W: Write> ConsoleGate<R, W> {
    pub const fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            closed: false,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn wait(&mut self) -> io::Result<bool> {
        writeln!(self.out, "\nPress enter to advance to the next day!")?;
        self.out.flush()?;
        let mut line = String::new();
        Ok(self.input.read_line(&mut line)? > 0)
    }
}

impl<R: LineReader, W: Write> AdvanceGate for ConsoleGate<R, W> {
    fn advance(&mut self, finished_turn: u32) {
        if self.closed {
            return;
        }
        match self.wait() {
            Ok(true) => return,
            Ok(false) => log::info!("input closed after day {finished_turn}"),
            Err(err) => log::warn!("could not read from the terminal: {err}"),
        }
        self.closed = true;
        if let Err(err) = writeln!(self.out, "Input closed after day {finished_turn}. Goodbye!")
            .and_then(|()| self.out.flush())
        {
            log::warn!("could not write to the terminal: {err}");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use thebox_game::{BoxItemId, EventId, Player};

    fn event(kind: EventKind) -> Event {
        Event {
            id: EventId::new(3, 0),
            kind,
        }
    }

    fn plain(lines: Vec<String>) -> String {
        lines.join("\n")
    }

    #[test]
    fn renders_reference_phrasing() {
        colored::control::set_override(false);
        let lost = plain(render_text(&event(EventKind::HouseItemLost {
            player: "Ada".into(),
            item: HouseItem::new("lamp"),
            remaining: vec![HouseItem::new("mug"), HouseItem::new("rug")],
        })));
        assert_eq!(lost, "Ada loses the lamp. They now have: mug, rug.");

        let granted = plain(render_text(&event(EventKind::BoxItemGranted {
            player: "Bo".into(),
            item: BoxItemId(12),
            expires_on: 7,
            window: 4,
        })));
        assert_eq!(granted, "Bo got a #12 from The Box! It will expire in 4 turns");

        let day = plain(render_text(&event(EventKind::DayStarted {
            mode: DayMode::Hardcore,
        })));
        assert!(day.ends_with("DAY 3 (HARDCORE)"));
    }

    #[test]
    fn json_sink_writes_one_line_per_event() {
        let mut sink = ConsoleSink::new(Vec::new(), EventFormat::Json);
        sink.emit(event(EventKind::NothingToLose { player: "Cy".into() }));
        sink.emit(event(EventKind::PhaseStarted {
            phase: Phase::NinePm,
        }));
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["kind"], "nothing_to_lose");
        assert_eq!(first["player"], "Cy");
    }

    #[test]
    fn prompt_repeats_until_valid_answer() {
        let player = Player::new("Ada", &[]);
        let ctx = ChoiceContext {
            turn: 1,
            player: &player,
            box_available: 1,
        };
        let mut out = Vec::new();
        let mut choices = ConsoleChoices::new(Cursor::new("x\n3\n1\n"), &mut out);
        assert_eq!(choices.choose(&ctx), Choice::Retrieve);
        drop(choices);
        let prompts = String::from_utf8(out)
            .unwrap()
            .matches("Type your preference")
            .count();
        assert_eq!(prompts, 3);
    }

    #[test]
    fn closed_input_falls_back_to_gifts() {
        let player = Player::new("Bo", &[]);
        let ctx = ChoiceContext {
            turn: 2,
            player: &player,
            box_available: 0,
        };
        let mut choices = ConsoleChoices::new(Cursor::new(""), Vec::new());
        assert_eq!(choices.choose(&ctx), Choice::Gift);
        assert_eq!(choices.choose(&ctx), Choice::Gift);
    }

    #[test]
    fn gate_waits_for_a_line_and_notices_close() {
        let mut gate = ConsoleGate::new(Cursor::new("\n"), Vec::new());
        gate.advance(1);
        assert!(!gate.is_closed());
        gate.advance(2);
        assert!(gate.is_closed());
        gate.advance(3);
        let out = String::from_utf8(gate.into_inner()).unwrap();
        assert_eq!(out.matches("Press enter").count(), 2);
        assert!(out.ends_with("Input closed after day 2. Goodbye!\n"));
    }
}

//! Line-oriented practice loop for the terminal.
//!
//! Input commands and finished generation requests arrive as [`Event`]s.
//! Generation runs on spawned tasks and reports back over a channel with
//! its [`RequestTicket`], so a reply for a problem the user has already
//! left is dropped by the session instead of being shown.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::MathTextPipeline;
use crate::data::Difficulty;
use crate::render::{Renderer, TerminalRenderer};
use crate::service::{GenerationMode, TextGenerator};
use crate::session::{AnswerFeedback, RequestTicket, ToggleOutcome, TutorSession};
use crate::utils::error::{TutorError, TutorResult};

const HELP: &str = "\
commands:
  next | prev                 move between problems
  category <name|all>         filter by category
  difficulty <level|all>      filter by difficulty
  answer <A-E|number|text>    select an answer choice
  submit                      check the selected answer
  hint | solution             show or hide generated help
  show                        print the current problem again
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// `None` clears the filter
    Category(Option<String>),
    Difficulty(Option<Difficulty>),
    Answer(String),
    Submit,
    Toggle(GenerationMode),
    Show,
    Help,
    Quit,
}

fn filter_value(arg: &str) -> Option<&str> {
    (!arg.is_empty() && !arg.eq_ignore_ascii_case("all")).then_some(arg)
}

impl FromStr for Command {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (word, arg) = match s.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (s, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "n" | "next" => Command::Next,
            "p" | "prev" | "previous" => Command::Previous,
            "category" | "cat" => Command::Category(filter_value(arg).map(str::to_string)),
            "difficulty" | "diff" => {
                let difficulty = filter_value(arg)
                    .map(str::parse::<Difficulty>)
                    .transpose()
                    .map_err(|_| TutorError::command(format!("unknown difficulty '{}'", arg)))?;
                Command::Difficulty(difficulty)
            }
            "answer" | "a" if !arg.is_empty() => Command::Answer(arg.to_string()),
            "submit" => Command::Submit,
            "hint" | "h" => Command::Toggle(GenerationMode::Hint),
            "solution" | "s" => Command::Toggle(GenerationMode::Solution),
            "show" | "" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => {
                return Err(TutorError::command(format!(
                    "unknown command '{}' (try 'help')",
                    s
                )))
            }
        };
        Ok(command)
    }
}

#[derive(Debug)]
pub enum Event {
    Input(Command),
    Generated {
        ticket: RequestTicket,
        result: TutorResult<String>,
    },
}

enum Incoming {
    Line(Option<String>),
    Event(Event),
}

pub struct PracticeLoop<G, W> {
    session: TutorSession,
    generator: Arc<G>,
    pipeline: MathTextPipeline,
    renderer: TerminalRenderer,
    out: W,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl<G: TextGenerator, W: Write> PracticeLoop<G, W> {
    pub fn new(session: TutorSession, generator: Arc<G>, out: W) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            generator,
            pipeline: MathTextPipeline::new(),
            renderer: TerminalRenderer::default(),
            out,
            tx,
            rx,
        }
    }

    pub fn with_renderer(mut self, renderer: TerminalRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn session(&self) -> &TutorSession {
        &self.session
    }

    /// Read commands from `input` until `quit` or end of input, then wait
    /// for outstanding generation requests. Returns the output sink.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> TutorResult<W> {
        let mut lines = input.lines();
        let mut input_open = true;
        self.show()?;

        loop {
            if !input_open && !self.has_pending() {
                break;
            }
            let incoming = tokio::select! {
                line = lines.next_line(), if input_open => Incoming::Line(line?),
                Some(event) = self.rx.recv() => Incoming::Event(event),
            };
            let event = match incoming {
                Incoming::Event(event) => event,
                Incoming::Line(None) => {
                    input_open = false;
                    continue;
                }
                Incoming::Line(Some(line)) => match line.parse::<Command>() {
                    Ok(command) => Event::Input(command),
                    Err(err) => {
                        writeln!(self.out, "{}", err)?;
                        continue;
                    }
                },
            };
            if !self.handle(event)? {
                break;
            }
        }
        Ok(self.out)
    }

    fn has_pending(&self) -> bool {
        self.session.hint().is_loading() || self.session.solution().is_loading()
    }

    /// Apply one event. Returns `false` when the loop should stop.
    pub fn handle(&mut self, event: Event) -> TutorResult<bool> {
        match event {
            Event::Generated { ticket, result } => {
                if self.session.complete(ticket, result) {
                    self.show_slot(ticket.mode)?;
                }
            }
            Event::Input(command) => return self.handle_command(command),
        }
        Ok(true)
    }

    fn handle_command(&mut self, command: Command) -> TutorResult<bool> {
        match command {
            Command::Next => {
                self.session.next();
                self.show()?;
            }
            Command::Previous => {
                self.session.previous();
                self.show()?;
            }
            Command::Category(category) => {
                self.session.set_category(category);
                self.show()?;
            }
            Command::Difficulty(difficulty) => {
                self.session.set_difficulty(difficulty);
                self.show()?;
            }
            Command::Answer(choice) => self.select(&choice)?,
            Command::Submit => self.submit()?,
            Command::Toggle(mode) => self.toggle(mode)?,
            Command::Show => self.show()?,
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn toggle(&mut self, mode: GenerationMode) -> TutorResult<()> {
        let outcome = match self.session.toggle(mode) {
            Ok(outcome) => outcome,
            Err(TutorError::NoCurrentProblem) => {
                writeln!(self.out, "No problems match the current filters.")?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        match outcome {
            ToggleOutcome::Hidden => writeln!(self.out, "({} hidden)", mode)?,
            ToggleOutcome::Busy => writeln!(self.out, "(still generating {})", mode)?,
            ToggleOutcome::Requested { ticket, problem } => {
                writeln!(self.out, "(generating {}...)", mode)?;
                debug!(?ticket, "spawning generation");
                let generator = Arc::clone(&self.generator);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = generator.generate(&problem, ticket.mode).await;
                    // the loop may already be gone
                    let _ = tx.send(Event::Generated { ticket, result });
                });
            }
        }
        Ok(())
    }

    /// Resolve `A`-`E`, a one-based number, or the choice text itself.
    fn resolve_choice(&self, input: &str) -> Option<String> {
        let choices = self.session.current_problem()?.choices.as_ref()?;
        let index = match input.as_bytes() {
            [letter @ b'A'..=b'E'] | [b'(', letter @ b'A'..=b'E', b')'] => {
                Some(usize::from(letter - b'A'))
            }
            _ => input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)),
        };
        index
            .and_then(|i| choices.get(i))
            .or_else(|| choices.iter().find(|c| c.as_str() == input))
            .cloned()
    }

    fn select(&mut self, input: &str) -> TutorResult<()> {
        let Some(choice) = self.resolve_choice(input) else {
            writeln!(self.out, "No such choice: {}", input)?;
            return Ok(());
        };
        match self.session.select_answer(choice.as_str()) {
            Ok(true) => {
                let rendered = self.render_text(&choice);
                writeln!(self.out, "Selected: {}", rendered)?;
            }
            Ok(false) => writeln!(self.out, "Answer already submitted.")?,
            Err(TutorError::NoCurrentProblem) => {
                writeln!(self.out, "No problems match the current filters.")?
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn submit(&mut self) -> TutorResult<()> {
        if self.session.is_submitted() {
            writeln!(self.out, "Answer already submitted.")?;
            return Ok(());
        }
        match self.session.submit_answer() {
            Ok(Some(AnswerFeedback::Correct)) => writeln!(self.out, "✓ Correct!")?,
            Ok(Some(AnswerFeedback::Incorrect { correct_answer })) => match correct_answer {
                Some(answer) => {
                    let rendered = self.render_text(&answer);
                    writeln!(self.out, "✗ Incorrect. The correct answer is {}.", rendered)?
                }
                None => writeln!(self.out, "✗ Incorrect.")?,
            },
            Ok(None) => writeln!(self.out, "Select an answer first.")?,
            Err(TutorError::NoCurrentProblem) => {
                writeln!(self.out, "No problems match the current filters.")?
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn render_text(&self, text: &str) -> String {
        self.renderer
            .render_segments(&self.pipeline.render_math_text(text))
    }

    fn show(&mut self) -> TutorResult<()> {
        let Some(problem) = self.session.current_problem() else {
            writeln!(self.out, "No problems match the current filters.")?;
            return Ok(());
        };
        let (position, total) = self.session.position().unwrap_or((0, 0));
        let mut text = format!(
            "\n[{}/{}] {} · {}\n{}\n",
            position,
            total,
            problem.category,
            problem.difficulty,
            self.render_text(&problem.problem)
        );
        if let Some(image) = &problem.image {
            text.push_str(&format!("[{}: {}]\n", problem.image_alt_text(), image));
        }
        if let Some(choices) = &problem.choices {
            for (letter, choice) in ('A'..='Z').zip(choices) {
                text.push_str(&format!("  {}) {}\n", letter, self.render_text(choice)));
            }
        }
        write!(self.out, "{}", text)?;
        Ok(())
    }

    fn show_slot(&mut self, mode: GenerationMode) -> TutorResult<()> {
        let slot = self.session.slot(mode);
        if let Some(error) = &slot.error {
            writeln!(self.out, "{}", error)?;
            return Ok(());
        }
        let Some(text) = slot.shown_text() else {
            return Ok(());
        };
        let rendered = match mode {
            GenerationMode::Hint => format!("💡 Hint: {}", self.render_text(text)),
            GenerationMode::Solution => {
                let lines = self.pipeline.format_solution(text);
                format!("Solution:\n{}", self.renderer.render_lines(&lines))
            }
        };
        writeln!(self.out, "{}", rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!("next".parse::<Command>().expect("ok"), Command::Next);
        assert_eq!(" P ".parse::<Command>().expect("ok"), Command::Previous);
        assert_eq!(
            "category Integrals".parse::<Command>().expect("ok"),
            Command::Category(Some("Integrals".into()))
        );
        assert_eq!(
            "category all".parse::<Command>().expect("ok"),
            Command::Category(None)
        );
        assert_eq!(
            "difficulty hard".parse::<Command>().expect("ok"),
            Command::Difficulty(Some(Difficulty::Hard))
        );
        assert_eq!(
            "answer (B)".parse::<Command>().expect("ok"),
            Command::Answer("(B)".into())
        );
        assert_eq!(
            "hint".parse::<Command>().expect("ok"),
            Command::Toggle(GenerationMode::Hint)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("dance".parse::<Command>().is_err());
        assert!("difficulty extreme".parse::<Command>().is_err());
        assert!("answer".parse::<Command>().is_err());
    }
}

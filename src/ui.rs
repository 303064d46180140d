// UI layer: the interactive prompt loop and the automated demo. Both are
// generic over the sender, the input source and the output sink so the same
// flow runs against a terminal or a scripted test.

use crate::api::ChoiceSender;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// The two values the servlet understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    One,
    Two,
}

impl Choice {
    pub const ALL: [Choice; 2] = [Choice::One, Choice::Two];

    pub fn as_str(self) -> &'static str {
        match self {
            Choice::One => "1",
            Choice::Two => "2",
        }
    }
}

/// What a line typed by the operator means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Choice(Choice),
    Quit,
    Invalid,
}

/// Classify one line of operator input. Surrounding whitespace is ignored;
/// `quit` matches in any letter case.
pub fn parse_input(line: &str) -> Command {
    let line = line.trim();
    if line.eq_ignore_ascii_case("quit") {
        return Command::Quit;
    }
    match line {
        "1" => Command::Choice(Choice::One),
        "2" => Command::Choice(Choice::Two),
        _ => Command::Invalid,
    }
}

/// Source of operator input. `Ok(None)` means end of input. A read failing
/// with `ErrorKind::Interrupted` is treated as Ctrl-C.
pub trait Prompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Prompts on the real terminal with `dialoguer`, or reads plain lines when
/// stdin is piped.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        TerminalPrompt {
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.interactive {
            // console reports Ctrl-C in raw mode as ErrorKind::Interrupted
            let line: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?;
            return Ok(Some(line));
        }
        let stdin = io::stdin();
        LinePrompt::new(stdin.lock()).read_line(prompt)
    }
}

/// Reads one line per prompt from any `BufRead`, without echoing a prompt.
pub struct LinePrompt<R> {
    reader: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        LinePrompt { reader }
    }
}

impl<R: BufRead> Prompt for LinePrompt<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Ctrl-C flag shared with the signal handler. Checked between iterations,
/// so an in-flight request always finishes (or times out) first.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default SIGINT behavior with raising this flag.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let interrupt = Self::new();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.raise())?;
        debug!("interrupt handler installed");
        Ok(interrupt)
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

fn report_interrupt<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Received interrupt signal.")
}

/// Scope guard over a sender: the sender is closed exactly once, either by
/// `close` or when the guard is dropped on an early exit.
pub struct Session<C: ChoiceSender> {
    sender: C,
    closed: bool,
}

impl<C: ChoiceSender> Session<C> {
    pub fn open(sender: C) -> Self {
        Session {
            sender,
            closed: false,
        }
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.sender.close();
        }
    }
}

impl<C: ChoiceSender> Deref for Session<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.sender
    }
}

impl<C: ChoiceSender> Drop for Session<C> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Which top-level routine the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Demo,
}

impl Mode {
    /// `--demo` as the first argument selects the demo; anything else,
    /// including no argument, is interactive. Expects the program name to
    /// already be skipped.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match args.into_iter().next() {
            Some(arg) if arg.as_ref() == "--demo" => Mode::Demo,
            _ => Mode::Interactive,
        }
    }
}

const CHOICE_PROMPT: &str = "Enter choice (1 or 2), or 'quit' to exit";

/// Main interactive loop. Keeps prompting until `quit`, end of input or
/// Ctrl-C. Request failures are printed and the loop continues.
pub fn interactive_loop<C, P, W>(
    sender: &C,
    prompt: &mut P,
    out: &mut W,
    interrupt: &Interrupt,
) -> io::Result<()>
where
    C: ChoiceSender,
    P: Prompt,
    W: Write,
{
    writeln!(out, "=== Servlet Desktop Client ===")?;
    writeln!(out, "This client will send HTTP requests to the servlet API.")?;
    writeln!(
        out,
        "Make sure the servlet application is running on {}",
        sender.target()
    )?;
    writeln!(out)?;

    loop {
        if interrupt.is_raised() {
            report_interrupt(out)?;
            break;
        }
        let line = match prompt.read_line(CHOICE_PROMPT) {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("end of input, leaving interactive loop");
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                report_interrupt(out)?;
                break;
            }
            Err(e) => return Err(e),
        };
        // Ctrl-C while blocked on piped input
        if interrupt.is_raised() {
            report_interrupt(out)?;
            break;
        }

        let choice = match parse_input(&line) {
            Command::Quit => break,
            Command::Invalid => {
                writeln!(out, "Invalid choice. Please enter 1 or 2.")?;
                continue;
            }
            Command::Choice(choice) => choice,
        };

        match sender.send_choice(choice.as_str(), out) {
            Ok(response) => {
                writeln!(out, "Servlet response: '{}'", response)?;
                writeln!(out)?;
            }
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
                writeln!(out, "Make sure the servlet application is running.")?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// One round of the automated demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCheck {
    pub choice: Choice,
    pub response: String,
    pub matched: bool,
}

/// What the automated demo observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoReport {
    pub checks: Vec<DemoCheck>,
    /// Set when a request failed and the remaining choices were skipped.
    pub failure: Option<String>,
    pub interrupted: bool,
}

impl DemoReport {
    pub fn all_matched(&self) -> bool {
        self.failure.is_none()
            && !self.interrupted
            && self.checks.len() == Choice::ALL.len()
            && self.checks.iter().all(|c| c.matched)
    }
}

/// Send "1" then "2" and compare each trimmed response with what was sent.
/// A mismatch is only reported; a request failure or Ctrl-C stops the run.
pub fn demo_automated<C, W>(
    sender: &C,
    out: &mut W,
    interrupt: &Interrupt,
) -> io::Result<DemoReport>
where
    C: ChoiceSender,
    W: Write,
{
    writeln!(out, "=== Automated Demo ===")?;
    let mut report = DemoReport::default();

    for choice in Choice::ALL {
        if interrupt.is_raised() {
            report_interrupt(out)?;
            report.interrupted = true;
            break;
        }
        let expected = choice.as_str();
        writeln!(out)?;
        writeln!(out, "Testing choice: {}", expected)?;

        let response = match sender.send_choice(expected, out) {
            Ok(response) => response,
            Err(e) => {
                writeln!(out, "Demo failed: {}", e)?;
                report.failure = Some(e.to_string());
                break;
            }
        };
        writeln!(out, "Response: '{}'", response)?;

        let actual = response.trim();
        let matched = actual == expected;
        if matched {
            writeln!(out, "✓ Response matches expected value")?;
        } else {
            writeln!(out, "✗ Expected '{}', got '{}'", expected, actual)?;
        }
        report.checks.push(DemoCheck {
            choice,
            response,
            matched,
        });
    }

    info!(
        checks = report.checks.len(),
        failed = report.failure.is_some(),
        interrupted = report.interrupted,
        "automated demo finished"
    );
    Ok(report)
}

/// Run the selected routine inside a session and close it afterwards, on
/// every exit path.
pub fn run<C, P, W>(
    mode: Mode,
    sender: C,
    prompt: &mut P,
    out: &mut W,
    interrupt: &Interrupt,
) -> io::Result<()>
where
    C: ChoiceSender,
    P: Prompt,
    W: Write,
{
    let session = Session::open(sender);
    let result = match mode {
        Mode::Interactive => interactive_loop(&*session, prompt, out, interrupt),
        Mode::Demo => demo_automated(&*session, out, interrupt).map(|_| ()),
    };
    session.close();
    writeln!(out, "Client terminated.")?;
    result
}

/*!
Interactive prompting. When a field has a prompt configured and no value was
given on the command line, the parse engine asks a [`Prompter`] for it. The
engine only invokes the prompter; the retry loop belongs to the prompter.
*/

use std::{
    io::{self, BufRead, BufReader, Stdin, Stdout, Write},
    sync::{Mutex, PoisonError},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
    tty::IsTty as _,
};
use tracing::warn;

use crate::{
    errors::MaxAttemptsExceeded,
    parser::ParserFn,
    schema::ArgumentSpec,
    value::{Raw, Value},
};

/// Everything a prompter needs to ask for one field
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    pub field: &'a str,
    pub text: &'a str,
    pub parser: &'a ParserFn,
    pub default: Option<&'a Value>,
    pub hide_input: bool,
    pub max_attempts: u32,
}

impl<'a> PromptRequest<'a> {
    /// The request for a field with a prompt, using the field's own parser,
    /// input hiding, and attempt limit
    pub(crate) fn for_field(spec: &'a ArgumentSpec, text: &'a str, default: Option<&'a Value>) -> Self {
        Self {
            field: spec.name(),
            text,
            parser: spec.parser(),
            default,
            hide_input: spec.hide_input(),
            max_attempts: spec.max_attempts(),
        }
    }

    /// The prompt line as shown to the user, such as `Continue [Y/n]: `
    #[must_use]
    pub fn display(&self) -> String {
        match (self.default, self.hide_input) {
            (Some(Value::Bool(true)), _) => format!("{} [Y/n]: ", self.text),
            (Some(Value::Bool(false)), _) => format!("{} [y/N]: ", self.text),
            (Some(default), false) => format!("{} [{default}]: ", self.text),
            _ => format!("{}: ", self.text),
        }
    }
}

/// Collects a value for a field interactively. Prompters are shared with
/// deferred values, which may be resolved on any thread.
pub trait Prompter: Send + Sync {
    fn prompt(&self, request: &PromptRequest<'_>) -> Result<Value, MaxAttemptsExceeded>;
}

/// What a key press does to a hidden answer being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keystroke {
    Continue,
    Submit,
    Abandon,
}

fn apply_key(answer: &mut String, key: KeyEvent) -> Keystroke {
    if key.kind != KeyEventKind::Press {
        return Keystroke::Continue;
    }

    match key.code {
        KeyCode::Enter => Keystroke::Submit,
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Keystroke::Abandon
        }
        KeyCode::Char(c) => {
            answer.push(c);
            Keystroke::Continue
        }
        KeyCode::Backspace => {
            answer.pop();
            Keystroke::Continue
        }
        _ => Keystroke::Continue,
    }
}

/// Raw mode for as long as this is alive. The terminal doesn't echo keys in
/// raw mode.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(error) = terminal::disable_raw_mode() {
            warn!(%error, "failed to restore the terminal after a hidden prompt");
        }
    }
}

/// Read one answer from the terminal without echoing it. `None` means the
/// user gave up with ctrl-c or ctrl-d.
fn read_secret() -> io::Result<Option<String>> {
    let _raw = RawMode::enable()?;
    let mut answer = String::new();

    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut answer, key) {
                Keystroke::Continue => {}
                Keystroke::Submit => return Ok(Some(answer)),
                Keystroke::Abandon => return Ok(None),
            }
        }
    }
}

/**
A [`Prompter`] that reads answers line by line from a reader and writes the
prompt to a writer. Empty answers select the default, if there is one; invalid
answers print the parse error and ask again, until the request's attempts run
out.

The [`stdio`][TerminalPrompter::stdio] prompter reads hidden answers straight
from the terminal with echo turned off. Other readers aren't terminals, so
their answers are read as usual.
*/
#[derive(Debug)]
pub struct TerminalPrompter<R, W> {
    io: Mutex<(R, W)>,
    terminal: bool,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
            terminal: false,
        }
    }

    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TerminalPrompter<BufReader<Stdin>, Stdout> {
    /// Prompt on stdout and read answers from stdin
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            terminal: true,
            ..Self::new(BufReader::new(io::stdin()), io::stdout())
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Read one answer. `Ok(None)` means the prompt was abandoned.
    fn read_answer(&self, input: &mut R, output: &mut W, hide_input: bool) -> io::Result<Option<String>> {
        if hide_input && self.terminal && io::stdin().is_tty() {
            let answer = read_secret()?;

            // Enter wasn't echoed either
            writeln!(output)?;
            return Ok(answer);
        }

        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompter for TerminalPrompter<R, W> {
    fn prompt(&self, request: &PromptRequest<'_>) -> Result<Value, MaxAttemptsExceeded> {
        let mut guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        let (input, output) = &mut *guard;
        let prompt = request.display();

        for attempt in 1..=request.max_attempts {
            if let Err(error) = write!(output, "{prompt}").and_then(|()| output.flush()) {
                warn!(field = request.field, %error, "failed to write prompt");
            }

            let answer = match self.read_answer(input, output, request.hide_input) {
                Ok(Some(answer)) => answer,
                Ok(None) => return Err(MaxAttemptsExceeded { attempts: attempt }),
                Err(error) => {
                    warn!(field = request.field, %error, "failed to read prompt answer");
                    String::new()
                }
            };

            if answer.is_empty() {
                match request.default {
                    Some(default) => return Ok(default.clone()),
                    None => {
                        let _ = writeln!(output, "A value is required.");
                        continue;
                    }
                }
            }

            match request.parser.parse(&Raw::scalar(answer.as_str())) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let shown = match request.hide_input {
                        true => "<hidden>".to_owned(),
                        false => format!("{answer:?}"),
                    };
                    let _ = writeln!(
                        output,
                        "Unable to parse {shown}, please provide a valid value.\n  -> {error}"
                    );
                }
            }
        }

        Err(MaxAttemptsExceeded {
            attempts: request.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{parser::compile, ty::Ty};

    fn ask(
        answers: &str,
        ty: Ty,
        default: Option<&Value>,
        max_attempts: u32,
    ) -> (Result<Value, MaxAttemptsExceeded>, String) {
        let prompter = TerminalPrompter::new(Cursor::new(answers.to_owned()), Vec::new());
        let parser = compile(&ty).unwrap();

        let result = prompter.prompt(&PromptRequest {
            field: "field",
            text: "Value",
            parser: &parser,
            default,
            hide_input: false,
            max_attempts,
        });

        let (_, output) = prompter.into_inner();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn parses_the_answer() {
        let (result, output) = ask("42\n", Ty::Int, None, 3);

        assert_eq!(result, Ok(Value::Int(42)));
        assert_eq!(output, "Value: ");
    }

    #[test]
    fn empty_answer_uses_the_default() {
        let default = Value::Bool(true);
        let (result, output) = ask("\n", Ty::Bool, Some(&default), 3);

        assert_eq!(result, Ok(Value::Bool(true)));
        assert_eq!(output, "Value [Y/n]: ");
    }

    #[test]
    fn retries_until_valid() {
        let (result, output) = ask("\nabc\n7\n", Ty::Int, None, 5);

        assert_eq!(result, Ok(Value::Int(7)));
        assert!(output.contains("A value is required."));
        assert!(output.contains(r#"Unable to parse "abc""#));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let (result, _) = ask("a\nb\nc\n4\n", Ty::Int, None, 3);

        assert_eq!(result, Err(MaxAttemptsExceeded { attempts: 3 }));
    }

    #[test]
    fn hidden_prompts_never_show_the_default() {
        let parser = compile(&Ty::Str).unwrap();
        let default = Value::Str("hunter2".to_owned());

        let request = PromptRequest {
            field: "password",
            text: "Password",
            parser: &parser,
            default: Some(&default),
            hide_input: true,
            max_attempts: 1,
        };

        assert_eq!(request.display(), "Password: ");
    }

    #[test]
    fn hidden_answers_from_a_reader_add_nothing_to_the_output() {
        let prompter = TerminalPrompter::new(Cursor::new("hunter2\n".to_owned()), Vec::new());
        let parser = compile(&Ty::Str).unwrap();

        let result = prompter.prompt(&PromptRequest {
            field: "password",
            text: "Password",
            parser: &parser,
            default: None,
            hide_input: true,
            max_attempts: 1,
        });

        let (_, output) = prompter.into_inner();
        assert_eq!(result, Ok(Value::Str("hunter2".to_owned())));
        assert_eq!(String::from_utf8(output).unwrap(), "Password: ");
    }

    #[test]
    fn typing_a_hidden_answer() {
        let mut answer = String::new();
        let keys = [
            KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('b'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT),
            KeyEvent::new(KeyCode::Left, KeyModifiers::NONE),
        ];

        for key in keys {
            assert_eq!(apply_key(&mut answer, key), Keystroke::Continue);
        }
        assert_eq!(answer, "aC");

        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(apply_key(&mut answer, enter), Keystroke::Submit);
    }

    #[test]
    fn ctrl_c_abandons_a_hidden_answer() {
        let mut answer = "abc".to_owned();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(apply_key(&mut answer, key), Keystroke::Abandon);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut answer = String::new();
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('x'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );

        assert_eq!(apply_key(&mut answer, release), Keystroke::Continue);
        assert_eq!(answer, "");
    }
}

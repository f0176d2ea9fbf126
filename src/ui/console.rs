use std::{
    io::{self, Stdout, Write},
    sync::Mutex,
};

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

/// Display shared by the reader thread and the input loop.
pub trait Console: Send + Sync {
    /// Shows the input prompt.
    fn prompt(&self) -> io::Result<()>;
    /// Shows bytes received from the mailbox, then redraws the prompt.
    fn incoming(&self, bytes: &[u8]) -> io::Result<()>;
    /// Shows a one-line notice for the operator.
    fn notice(&self, line: &str) -> io::Result<()>;
}

/// Terminal console: every write erases the current line first so a pending
/// prompt never leaves fragments behind.
pub struct TerminalConsole<W> {
    prompt: String,
    out: Mutex<W>,
}

impl TerminalConsole<Stdout> {
    pub fn stdout(prompt: String) -> Self {
        Self::new(prompt, io::stdout())
    }
}

impl<W: Write> TerminalConsole<W> {
    pub fn new(prompt: String, out: W) -> Self {
        Self {
            prompt,
            out: Mutex::new(out),
        }
    }

    fn with_out<F>(&self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("console writer poisoned"))?;
        render(&mut out)?;
        out.flush()
    }
}

#[cfg(test)]
impl TerminalConsole<Vec<u8>> {
    pub fn buffered(prompt: &str) -> Self {
        Self::new(prompt.to_owned(), Vec::new())
    }

    pub fn contents(&self) -> String {
        let out = self.out.lock().expect("console writer should not be poisoned");
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl<W: Write + Send> Console for TerminalConsole<W> {
    fn prompt(&self) -> io::Result<()> {
        self.with_out(|out| queue!(out, Print(&self.prompt)))
    }

    fn incoming(&self, bytes: &[u8]) -> io::Result<()> {
        self.with_out(|out| {
            queue!(out, MoveToColumn(0), Clear(ClearType::UntilNewLine))?;
            out.write_all(bytes)?;
            queue!(out, Print(&self.prompt))
        })
    }

    fn notice(&self, line: &str) -> io::Result<()> {
        self.with_out(|out| {
            queue!(
                out,
                MoveToColumn(0),
                Clear(ClearType::UntilNewLine),
                Print(line),
                Print("\n")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_erases_line_then_redraws_prompt() {
        let console = TerminalConsole::buffered("[demo] bob > ");

        console.incoming(b"[demo] alice: hi\n").expect("render");

        let shown = console.contents();
        let message_at = shown.find("[demo] alice: hi\n").expect("message shown");
        assert!(shown[..message_at].contains("\x1b[K"));
        assert!(shown.ends_with("[demo] bob > "));
    }

    #[test]
    fn prompt_is_printed_verbatim() {
        let console = TerminalConsole::buffered("[demo] bob > ");

        console.prompt().expect("prompt");

        assert_eq!(console.contents(), "[demo] bob > ");
    }

    #[test]
    fn notice_ends_with_newline() {
        let console = TerminalConsole::buffered("> ");

        console.notice("Welcome to demo!").expect("notice");

        assert!(console.contents().ends_with("Welcome to demo!\n"));
    }
}

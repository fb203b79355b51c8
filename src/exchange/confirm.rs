//! External-confirmation port.
//!
//! An exchange suspends exactly once: after the prompt is on disk, until
//! someone confirms a response has been saved. Interactive runs wait for the
//! operator to press Enter; tests and automated backends plug in a closure
//! that receives the exchange's file locations.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;

use super::ExchangeFiles;

/// Blocks until the response file is claimed to be in place.
///
/// There is no timeout: implementations may wait indefinitely.
#[allow(async_fn_in_trait)]
pub trait Confirmation {
    async fn confirm(&self, message: &str, files: &ExchangeFiles) -> io::Result<()>;
}

/// Prints `message` to stdout and waits for one line from `R`.
///
/// The line's content is ignored; only its submission matters. The reader is
/// kept for the life of the confirmation, so lines buffered ahead (piped
/// input) are consumed one per exchange instead of being discarded. Hitting
/// EOF first is an error since no confirmation can ever arrive.
pub struct LineConfirmation<R> {
    lines: Mutex<Lines<BufReader<R>>>,
}

pub type StdinConfirmation = LineConfirmation<tokio::io::Stdin>;

impl<R: AsyncRead + Unpin> LineConfirmation<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(reader).lines()),
        }
    }
}

impl StdinConfirmation {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin> Confirmation for LineConfirmation<R> {
    async fn confirm(&self, message: &str, _files: &ExchangeFiles) -> io::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(message.as_bytes()).await?;
        stdout.flush().await?;

        match self.lines.lock().await.next_line().await? {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed before the response was confirmed",
            )),
        }
    }
}

/// Confirms by running a closure, e.g. one that writes the response file to
/// `files.response`.
pub struct FnConfirmation<F>(pub F);

impl<F> Confirmation for FnConfirmation<F>
where
    F: Fn(&ExchangeFiles) -> io::Result<()>,
{
    async fn confirm(&self, message: &str, files: &ExchangeFiles) -> io::Result<()> {
        tracing::debug!(message, response = %files.response.display(), "Confirming exchange programmatically");
        (self.0)(files)
    }
}

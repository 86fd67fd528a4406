//! Bearer token acquisition.
//!
//! The token is obtained exactly once at startup, before any request is made.
//! Two sources exist and the CLI picks one of them:
//!
//! - [`PromptSource`]: asks the operator on the terminal
//! - [`FileSource`]: reads a single-line text file
//!
//! Neither source retries or falls back to the other. An empty or unreadable
//! result is reported as [`AgentError::MissingCredential`].

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::{AgentError, Result};

/// Text written before reading the token interactively.
pub const PROMPT: &str = "Please Enter your TOKEN: ";

/// An opaque, non-empty bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Builds a token from raw input, trimming surrounding whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<redacted, {} chars>)", self.0.len())
    }
}

/// Something that can hand out the session token.
pub trait CredentialSource {
    /// Obtains the token or fails with [`AgentError::MissingCredential`].
    fn obtain(&self) -> Result<Token>;
}

/// Reads the token from an interactive prompt.
///
/// Generic over its reader and writer so tests can drive it with in-memory
/// buffers; [`PromptSource::stdio`] wires it to the terminal. The stdio
/// variant holds the stdin lock for as long as the source lives, so drop it
/// once the token has been read.
pub struct PromptSource<R, W> {
    io: RefCell<(R, W)>,
}

impl<R: BufRead, W: Write> PromptSource<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: RefCell::new((reader, writer)),
        }
    }
}

impl PromptSource<std::io::StdinLock<'static>, std::io::Stdout> {
    /// A prompt bound to the process stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> CredentialSource for PromptSource<R, W> {
    fn obtain(&self) -> Result<Token> {
        let mut io = self.io.borrow_mut();
        let (reader, writer) = &mut *io;

        write!(writer, "{PROMPT}")
            .and_then(|_| writer.flush())
            .map_err(|e| AgentError::MissingCredential(format!("failed to write prompt: {e}")))?;

        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| AgentError::MissingCredential(format!("failed to read token: {e}")))?;

        if read == 0 {
            log::error!("Token prompt reached end of input");
            return Err(AgentError::MissingCredential("no input on prompt".into()));
        }

        Token::parse(&line).ok_or_else(|| {
            log::error!("Empty token entered on prompt");
            AgentError::MissingCredential("empty token entered".into())
        })
    }
}

/// Reads the token from a local text file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileSource {
    fn obtain(&self) -> Result<Token> {
        log::info!("Reading token file={}", self.path.display());

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            log::error!("Failed to read token file={}: {}", self.path.display(), e);
            AgentError::MissingCredential(format!("cannot read {}: {e}", self.path.display()))
        })?;

        Token::parse(&contents).ok_or_else(|| {
            log::error!("Token file is empty file={}", self.path.display());
            AgentError::MissingCredential(format!("{} is empty", self.path.display()))
        })
    }
}

//! Command lines for the interactive session
//!
//! Terminals paste dropped files as shell-quoted paths (or `file://` URIs),
//! so arguments are split with quote and backslash handling.

use std::path::PathBuf;
use crate::error::{Error, Result};

/// One line typed into the session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Files dropped onto the window
    Add(Vec<PathBuf>),
    /// Show the collected images
    List,
    /// Empty the collection
    Clear,
    /// Generate a PDF with the given file name (may be blank)
    Generate(String),
    Help,
    Quit,
    /// Blank line
    Empty,
}

/// Usage text for the session prompt
pub const HELP: &str = "\
Commands:
  add <image>...      add images (drag files into the terminal)
  list                show collected images
  clear               remove all images
  generate <name>     build <name>.pdf from the collected images
  help                show this help
  quit                leave the session";

/// Parse one session line
pub fn parse_command(line: &str) -> Result<Command> {
    let words = split_words(line)?;
    let Some((first, rest)) = words.split_first() else {
        return Ok(Command::Empty);
    };

    let command = match first.to_ascii_lowercase().as_str() {
        "add" | "a" => Command::Add(rest.iter().map(|word| local_path(word)).collect()),
        "list" | "ls" | "l" => Command::List,
        "clear" | "c" => Command::Clear,
        "generate" | "gen" | "g" => Command::Generate(rest.join(" ")),
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => {
            return Err(Error::General(format!(
                "Unknown command '{}', type 'help' for a list of commands",
                other
            )))
        }
    };

    Ok(command)
}

/// Split a line into words, honouring quotes and backslash escapes
pub fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(Error::General("Unclosed single quote".to_string())),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(Error::General("Unclosed double quote".to_string())),
                        },
                        Some(c) => current.push(c),
                        None => return Err(Error::General("Unclosed double quote".to_string())),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}

/// Turn a dropped word into a local path, decoding `file://` URIs
fn local_path(word: &str) -> PathBuf {
    match word.strip_prefix("file://") {
        Some(rest) => PathBuf::from(percent_decode(rest)),
        None => PathBuf::from(word),
    }
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(value);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

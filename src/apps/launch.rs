use crate::core::error::{Error, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Expand a desktop-entry `Exec` line for a single URI.
///
/// `%u %U %f %F` become the URI, `%%` becomes `%`, every other field code is
/// dropped. If the line has no URI code the URI is appended.
pub fn expand_exec(exec: &str, uri: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut used_uri = false;

    for word in split_words(exec)? {
        match word.as_str() {
            "%u" | "%U" | "%f" | "%F" => {
                args.push(uri.to_string());
                used_uri = true;
                continue;
            }
            "%i" | "%c" | "%k" => continue,
            _ => {}
        }

        let mut expanded = String::with_capacity(word.len());
        let mut chars = word.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                expanded.push(ch);
                continue;
            }
            match chars.next() {
                Some('%') => expanded.push('%'),
                Some('u' | 'U' | 'f' | 'F') => {
                    expanded.push_str(uri);
                    used_uri = true;
                }
                _ => {}
            }
        }
        if !expanded.is_empty() {
            args.push(expanded);
        }
    }

    if args.is_empty() {
        return Err(Error::Launch(format!("Empty Exec line: {:?}", exec)));
    }
    if !used_uri {
        args.push(uri.to_string());
    }

    Ok(args)
}

/// Start the program of an `Exec` line on `uri` without waiting for it
pub fn spawn_exec(exec: &str, uri: &str) -> Result<()> {
    let args = expand_exec(exec, uri)?;
    debug!("Launching {:?}", args);

    Command::new(&args[0])
        .args(&args[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Launch(format!("Failed to start {}: {}", args[0], e)))?;

    Ok(())
}

/// Split on whitespace, honouring double quotes and backslash escapes inside them
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err(Error::Launch(format!("Unbalanced quote in Exec line: {:?}", line)));
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

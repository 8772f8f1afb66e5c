//! Reader for GLib-style key files: `profiles.ini` descriptors and `.desktop` entries.
//!
//! Groups keep file order. A key that appears twice in a group keeps its last
//! value, and a group header that repeats continues the earlier group.

use crate::core::error::{Error, Result};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct KeyFile {
    groups: Vec<Group>,
}

#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    entries: Vec<(String, String)>,
}

impl KeyFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Parsing(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut groups: Vec<Group> = Vec::new();
        let mut current: Option<usize> = None;

        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let index = match groups.iter().position(|g| g.name == name) {
                    Some(index) => index,
                    None => {
                        groups.push(Group {
                            name: name.to_string(),
                            entries: Vec::new(),
                        });
                        groups.len() - 1
                    }
                };
                current = Some(index);
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::Parsing(format!("line {}: expected key=value", number + 1))
            })?;

            // Keys outside of any group are tolerated and dropped
            let Some(index) = current else {
                continue;
            };

            let key = key.trim_end().to_string();
            let value = unescape(value.trim_start());
            let entries = &mut groups[index].entries;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Booleans as GLib reads them: `true`/`false`/`1`/`0`
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

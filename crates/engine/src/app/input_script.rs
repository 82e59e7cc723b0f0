use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::input::{InputAction, InputAxis, InputCollector};

/// One scheduled device event from an input script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedEvent {
    Press(InputAction),
    Release(InputAction),
    Tap(InputAction),
    Axis(InputAxis, f32),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptEntry {
    pub at_seconds: f32,
    pub event: ScriptedEvent,
}

#[derive(Debug, Error)]
pub enum InputScriptError {
    #[error("failed to read input script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("input script line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Replays a time-ordered list of device events into an [`InputCollector`].
///
/// Script format is one event per line, `#` comments and blank lines ignored:
///
/// ```text
/// 1.5 tap left
/// 2.0 press up
/// 2.4 release up
/// 3.0 axis horizontal 0.8
/// 9.0 quit
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    entries: Vec<ScriptEntry>,
    cursor: usize,
}

impl InputScript {
    pub fn from_entries(entries: Vec<ScriptEntry>) -> Self {
        Self { entries, cursor: 0 }
    }

    pub fn load(path: &Path) -> Result<Self, InputScriptError> {
        let content = fs::read_to_string(path).map_err(|source| InputScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, InputScriptError> {
        let mut entries = Vec::new();
        let mut last_at = 0.0f32;
        for (index, raw_line) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let entry = parse_entry(trimmed).map_err(|message| InputScriptError::Parse {
                line,
                message,
            })?;
            if entry.at_seconds < last_at {
                return Err(InputScriptError::Parse {
                    line,
                    message: format!(
                        "time {} is earlier than previous entry at {last_at}",
                        entry.at_seconds
                    ),
                });
            }
            last_at = entry.at_seconds;
            entries.push(entry);
        }
        Ok(Self::from_entries(entries))
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Feeds every entry scheduled at or before `now_seconds`. Returns how
    /// many entries were applied.
    pub fn apply_due(&mut self, now_seconds: f32, collector: &mut InputCollector) -> usize {
        let mut applied = 0usize;
        while let Some(entry) = self.entries.get(self.cursor) {
            if entry.at_seconds > now_seconds {
                break;
            }
            match entry.event {
                ScriptedEvent::Press(action) => collector.handle_action(action, true),
                ScriptedEvent::Release(action) => collector.handle_action(action, false),
                ScriptedEvent::Tap(action) => collector.tap_action(action),
                ScriptedEvent::Axis(axis, value) => collector.set_axis(axis, value),
                ScriptedEvent::Quit => collector.mark_quit_requested(),
            }
            self.cursor += 1;
            applied += 1;
        }
        applied
    }
}

fn parse_entry(line: &str) -> Result<ScriptEntry, String> {
    let mut parts = line.split_whitespace();
    let at_token = parts.next().ok_or_else(|| "missing time".to_string())?;
    let at_seconds = at_token
        .parse::<f32>()
        .map_err(|_| format!("invalid time '{at_token}' (expected seconds)"))?;
    if !at_seconds.is_finite() || at_seconds < 0.0 {
        return Err(format!("time must be a non-negative number, got {at_token}"));
    }

    let verb = parts
        .next()
        .ok_or_else(|| "missing event after time".to_string())?;
    let event = match verb {
        "press" => ScriptedEvent::Press(parse_action(parts.next())?),
        "release" => ScriptedEvent::Release(parse_action(parts.next())?),
        "tap" => ScriptedEvent::Tap(parse_action(parts.next())?),
        "axis" => {
            let axis_token = parts
                .next()
                .ok_or_else(|| "axis requires a name and a value".to_string())?;
            let axis = InputAxis::from_token(axis_token)
                .ok_or_else(|| format!("unknown axis '{axis_token}'"))?;
            let value_token = parts
                .next()
                .ok_or_else(|| "axis requires a value".to_string())?;
            let value = value_token
                .parse::<f32>()
                .map_err(|_| format!("invalid axis value '{value_token}'"))?;
            ScriptedEvent::Axis(axis, value)
        }
        "quit" => ScriptedEvent::Quit,
        other => return Err(format!("unknown event '{other}'")),
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected trailing token '{extra}'"));
    }

    Ok(ScriptEntry { at_seconds, event })
}

fn parse_action(token: Option<&str>) -> Result<InputAction, String> {
    let token = token.ok_or_else(|| "missing action name".to_string())?;
    InputAction::from_token(token).ok_or_else(|| format!("unknown action '{token}'"))
}

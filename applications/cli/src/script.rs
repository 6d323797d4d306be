//! Session scripts
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! play dQw4w9WgXcQ start=30 end=90 title="Ballade No. 1"
//! wait 2s
//! skip -10
//! mode immersive
//! status
//! ```

use crate::error::{CliError, Result};
use preludio_playback::{PlayRequest, PlayerMode, Provider};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// One host action
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play(PlayRequest),
    /// Play whatever the `%%audio_*` directives in a file describe
    PlayContent(PathBuf),
    Pause,
    Toggle,
    /// Absolute seek, seconds
    Seek(f64),
    /// Relative seek inside the trimmed window; `None` uses the configured step
    Skip(Option<f64>),
    Volume(u8),
    Mode(PlayerMode),
    /// Drag the immersive seek bar to a window-relative position and release
    Scrub(f64),
    /// Follow the attribution link
    Open,
    Wait(Duration),
    Dismiss,
    Status,
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Err(CliError::command("empty command"));
        };

        let command = match name.as_str() {
            "play" => Command::Play(parse_play(args)?),
            "play-content" => Command::PlayContent(PathBuf::from(single(name, args)?)),
            "pause" => no_args(name, args, Command::Pause)?,
            "toggle" => no_args(name, args, Command::Toggle)?,
            "seek" => Command::Seek(parse_number(single(name, args)?)?),
            "skip" => match args {
                [] => Command::Skip(None),
                [delta] => Command::Skip(Some(parse_number(delta)?)),
                _ => return Err(CliError::command("skip takes at most one argument")),
            },
            "volume" => {
                let level = single(name, args)?;
                Command::Volume(
                    level
                        .parse()
                        .map_err(|_| CliError::command(format!("invalid volume: {level}")))?,
                )
            }
            "mode" => Command::Mode(single(name, args)?.parse().map_err(CliError::Command)?),
            "scrub" => Command::Scrub(parse_number(single(name, args)?)?),
            "open" => no_args(name, args, Command::Open)?,
            "wait" => Command::Wait(parse_duration(single(name, args)?)?),
            "dismiss" => no_args(name, args, Command::Dismiss)?,
            "status" => no_args(name, args, Command::Status)?,
            other => return Err(CliError::command(format!("unknown command: {other}"))),
        };

        Ok(command)
    }
}

/// Parse a whole script; errors carry the 1-based line number
pub fn parse_script(text: &str) -> Result<Vec<Command>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            line.parse().map_err(|e: CliError| CliError::Script {
                line: index + 1,
                message: match e {
                    CliError::Command(message) => message,
                    other => other.to_string(),
                },
            })
        })
        .collect()
}

fn parse_play(args: &[String]) -> Result<PlayRequest> {
    let Some((source_id, options)) = args.split_first() else {
        return Err(CliError::command("play needs a source id"));
    };

    let mut provider = Provider::default();
    let mut start = None;
    let mut end = None;
    let mut request = PlayRequest::default();

    for option in options {
        let (key, value) = option
            .split_once('=')
            .ok_or_else(|| CliError::command(format!("expected key=value, got {option}")))?;
        match key {
            "provider" => provider = value.parse().map_err(CliError::Command)?,
            "start" => start = Some(parse_number(value)?),
            "end" => end = Some(parse_number(value)?),
            "title" => request.title = Some(value.to_string()),
            "composer" => request.composer_name = Some(value.to_string()),
            "performer" => request.performer = Some(value.to_string()),
            "image" => request.image = Some(value.to_string()),
            "url" => request.source_url = Some(value.to_string()),
            "label" => request.provider_label = Some(value.to_string()),
            other => return Err(CliError::command(format!("unknown play option: {other}"))),
        }
    }

    Ok(PlayRequest {
        source_id: source_id.clone(),
        provider,
        start_seconds: start,
        end_seconds: end,
        ..request
    })
}

fn single<'a>(name: &str, args: &'a [String]) -> Result<&'a str> {
    match args {
        [value] => Ok(value),
        _ => Err(CliError::command(format!("{name} takes exactly one argument"))),
    }
}

fn no_args(name: &str, args: &[String], command: Command) -> Result<Command> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CliError::command(format!("{name} takes no arguments")))
    }
}

fn parse_number(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::command(format!("invalid number: {value}")))
}

/// `250ms`, `2s` or bare seconds
fn parse_duration(value: &str) -> Result<Duration> {
    let invalid = || CliError::command(format!("invalid duration: {value}"));
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.parse::<u64>().map(Duration::from_millis).map_err(|_| invalid());
    }
    let secs = value.strip_suffix('s').unwrap_or(value);
    let secs = parse_number(secs).map_err(|_| invalid())?;
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

/// Split on whitespace, keeping double-quoted runs together
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.trim().chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(CliError::command("unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

//! Command table
//!
//! Built once and never mutated. Every alias is its own row bound to a
//! canonical handler, and lookups are exact string matches on the token.

use std::collections::HashMap;
use std::fmt::Write as _;

/// Handler bound to one or more command names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// `help`
    Help,
    /// `clear`
    Clear,
    /// `p`: toggle pause when loaded, otherwise `play`
    PlayOrToggle,
    /// `>`: resume when paused, otherwise `play`
    ResumeOrPlay,
    /// `play`
    Play,
    /// `resume`, `res`
    Resume,
    /// `pause`, `ps`, `#`
    Pause,
    /// `seek`
    Seek,
    /// `volume`, `vol`
    Volume,
    /// `stop`
    Stop,
    /// `next`, `n`, `>>`
    Next,
    /// `playl`, `playlist`, `pl`
    Playlist,
    /// `exit`
    Exit,
}

/// One row of the command table
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Handler
    pub id: CommandId,
    /// Token that selects this row
    pub name: &'static str,
    /// Help body; empty for hidden rows
    pub description: &'static str,
    /// Hidden rows are not listed by `help`
    pub hidden: bool,
    /// Visible commands this row is listed as an alias of
    pub alias_of: &'static [&'static str],
}

const fn visible(id: CommandId, name: &'static str, description: &'static str) -> CommandSpec {
    CommandSpec {
        id,
        name,
        description,
        hidden: false,
        alias_of: &[],
    }
}

const fn alias(id: CommandId, name: &'static str, alias_of: &'static [&'static str]) -> CommandSpec {
    CommandSpec {
        id,
        name,
        description: "",
        hidden: true,
        alias_of,
    }
}

/// Every command row, in help order
pub const COMMANDS: &[CommandSpec] = &[
    visible(CommandId::Help, "help", "    desc:\n    Display this help text."),
    visible(CommandId::Clear, "clear", "    desc:\n    Clear the console."),
    alias(CommandId::PlayOrToggle, "p", &["play", "pause", "resume"]),
    alias(CommandId::ResumeOrPlay, ">", &["play", "resume"]),
    visible(
        CommandId::Play,
        "play",
        "    args: [trackName] [trackName...]\n        trackName: The name of the music item to play, or a query for one.\n    desc:\n    Plays a track.",
    ),
    visible(CommandId::Resume, "resume", "    desc:\n    Resumes playback."),
    alias(CommandId::Resume, "res", &["resume"]),
    visible(CommandId::Pause, "pause", "    desc:\n    Pauses playback."),
    alias(CommandId::Pause, "ps", &["pause"]),
    alias(CommandId::Pause, "#", &["pause"]),
    visible(
        CommandId::Seek,
        "seek",
        "    args: [seconds]\n        seconds: Point in the track to seek to.\n    desc:\n    Seeks to a point in the music track currently playing.",
    ),
    visible(
        CommandId::Volume,
        "volume",
        "    args: [linVolume]\n        linVolume: Volume as a linear quantity. 1.0 is as-is. > 1.0 will amplify.\n    desc:\n    Set the volume of playback.",
    ),
    alias(CommandId::Volume, "vol", &["volume"]),
    visible(CommandId::Stop, "stop", "    desc:\n    Stops playback of the current track."),
    visible(
        CommandId::Next,
        "next",
        "    desc:\n    Play the next track according to the playlist mode.",
    ),
    alias(CommandId::Next, "n", &["next"]),
    alias(CommandId::Next, ">>", &["next"]),
    visible(
        CommandId::Playlist,
        "playl",
        "    args: [flag]
        flag:
        Flag is one of -
        --next [alias: -n]: Play the next track on the list.
        --shuffle [alias: -sh]: Set the playlist to shuffle mode.
        --sequential [alias: --seq, -sq]: Set the playlist to sequential mode.
        --queued [alias: -q]: Set the playlist to queued mode.
        --push [alias: -p]: Push a track to the end of the playlist music queue.
        --list [alias: -l]: List the tracks in the playlist music queue.
        --index [alias: -i]: Set the track to play in the playlist music queue.
        --loop [alias: -lp]:
            Set the queue to loop. If no bool argument is given, the state is toggled.
            args: [opt: state]
                state: Should the playlist loop. i.e. true, 1, false, 0
        --remove [alias: -r]: Remove a track from the playlist music queue.
        --clear [alias: -c]: Clear the playlist music queue.
    desc:
    Playlist related commands.",
    ),
    alias(CommandId::Playlist, "playlist", &["playl"]),
    alias(CommandId::Playlist, "pl", &["playl"]),
    visible(CommandId::Exit, "exit", "    desc:\n    Exit this interface."),
];

/// Flags accepted by `playl`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFlag {
    /// `--next`, `-n`
    Next,
    /// `--shuffle`, `-sh`
    Shuffle,
    /// `--sequential`, `--seq`, `-sq`
    Sequential,
    /// `--queued`, `-q`
    Queued,
    /// `--push`, `-p`
    Push,
    /// `--list`, `-l`
    List,
    /// `--index`, `-i`
    Index,
    /// `--remove`, `-r`
    Remove,
    /// `--loop`, `-lp`
    Loop,
    /// `--clear`, `-c`
    Clear,
}

impl PlaylistFlag {
    /// Match a flag token
    pub fn from_token(token: &str) -> Option<Self> {
        let flag = match token {
            "--next" | "-n" => Self::Next,
            "--shuffle" | "-sh" => Self::Shuffle,
            "--sequential" | "--seq" | "-sq" => Self::Sequential,
            "--queued" | "-q" => Self::Queued,
            "--push" | "-p" => Self::Push,
            "--list" | "-l" => Self::List,
            "--index" | "-i" => Self::Index,
            "--remove" | "-r" => Self::Remove,
            "--loop" | "-lp" => Self::Loop,
            "--clear" | "-c" => Self::Clear,
            _ => return None,
        };
        Some(flag)
    }
}

/// Immutable command lookup
#[derive(Debug, Clone)]
pub struct CommandTable {
    rows: &'static [CommandSpec],
    by_name: HashMap<&'static str, usize>,
    help: String,
}

impl CommandTable {
    /// Build the table over [`COMMANDS`]
    pub fn new() -> Self {
        Self::from_rows(COMMANDS)
    }

    fn from_rows(rows: &'static [CommandSpec]) -> Self {
        let mut by_name = HashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if let Some(previous) = by_name.insert(row.name, index) {
                tracing::warn!(
                    "Command {:?} shadows {:?} in the command table",
                    row.name,
                    rows[previous].name
                );
            }
        }

        Self {
            rows,
            by_name,
            help: render_help(rows),
        }
    }

    /// Find the row for `token`
    pub fn lookup(&self, token: &str) -> Option<&CommandSpec> {
        self.by_name.get(token).map(|&index| &self.rows[index])
    }

    /// Every row, in help order
    pub fn rows(&self) -> &[CommandSpec] {
        self.rows
    }

    /// Rendered `help` output
    pub fn help_text(&self) -> &str {
        &self.help
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

fn render_help(rows: &[CommandSpec]) -> String {
    let mut aliases: HashMap<&str, Vec<&str>> = HashMap::new();
    for row in rows {
        for target in row.alias_of {
            aliases.entry(*target).or_default().push(row.name);
        }
    }

    let mut help = String::from("Help Text\n");
    for row in rows.iter().filter(|r| !r.hidden) {
        help.push_str(row.name);
        if let Some(names) = aliases.get(row.name) {
            let _ = write!(help, " [alias: {}]", names.join(", "));
        }
        help.push('\n');
        help.push_str(row.description);
        help.push('\n');
    }
    help
}

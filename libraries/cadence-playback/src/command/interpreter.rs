//! Command interpreter
//!
//! Turns one committed input line into operations on the [`Player`]. Every
//! handler checks its own arity first and performs no mutation when a check
//! fails; all outcomes are reported through the [`LineSink`].

use super::parse::{join_query, parse_bool, parse_f32, parse_index, tokenize};
use super::table::{CommandId, CommandTable, PlaylistFlag};
use crate::console::LineSink;
use crate::error::Result;
use crate::history::InputHistory;
use crate::player::Player;
use crate::types::PlaylistMode;

const NOT_PLAYING: &str =
    "Not currently playing music! Use \"play\" and \"stop\" to change media.";
const EXTRA_PLAYL_ARGS: &str = "Extra arguments given to \"playl\"!";

/// Whether the loop should keep running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands
    Continue,
    /// `exit` was entered
    Exit,
}

/// Line-oriented command interpreter
#[derive(Debug, Clone)]
pub struct Interpreter {
    table: CommandTable,
    history: InputHistory,
}

impl Interpreter {
    /// Create an interpreter remembering up to `history_size` lines
    pub fn new(history_size: usize) -> Self {
        Self {
            table: CommandTable::new(),
            history: InputHistory::new(history_size),
        }
    }

    /// Command table
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Input history
    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    /// Execute one committed line
    pub fn submit(&mut self, line: &str, player: &mut Player, out: &mut dyn LineSink) -> Flow {
        if !line.trim().is_empty() {
            self.history.push(line);
        }

        let tokens = tokenize(line);
        let Some(&name) = tokens.first() else {
            return Flow::Continue;
        };

        let Some(command) = self.table.lookup(name) else {
            if !name.chars().all(char::is_whitespace) {
                out.error("Unknown command! Enter \"help\" to view a list of available commands!");
            }
            return Flow::Continue;
        };

        tracing::debug!(command = command.name, args = tokens.len() - 1, "dispatching command");

        match command.id {
            CommandId::Help => out.write_line(self.table.help_text()),
            CommandId::Clear => out.clear(),
            CommandId::PlayOrToggle => play_or_toggle(&tokens, player, out),
            CommandId::ResumeOrPlay => resume_or_play(&tokens, player, out),
            CommandId::Play => play(&tokens, player, out),
            CommandId::Resume => resume(&tokens, player, out),
            CommandId::Pause => pause(&tokens, player, out),
            CommandId::Seek => seek(&tokens, player, out),
            CommandId::Volume => volume(&tokens, player, out),
            CommandId::Stop => stop(&tokens, player, out),
            CommandId::Next => {
                if tokens.len() > 1 {
                    out.error(&format!("Extra arguments given to \"{}\"!", command.name));
                } else {
                    player.next(out);
                }
            }
            CommandId::Playlist => playlist(&tokens, player, out),
            CommandId::Exit => {
                player.shutdown();
                return Flow::Exit;
            }
        }

        Flow::Continue
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(100)
    }
}

fn report(result: Result<()>, out: &mut dyn LineSink) {
    if let Err(e) = result {
        tracing::error!("Transport failure: {}", e);
        out.error(&e.to_string());
    }
}

fn play_or_toggle(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() == 1 && player.is_playing() {
        report(player.toggle_pause(), out);
    } else {
        play(tokens, player, out);
    }
}

fn resume_or_play(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() == 1 && player.is_playing() && player.is_paused() {
        report(player.resume(), out);
    } else {
        play(tokens, player, out);
    }
}

fn play(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() < 2 {
        out.error("Track title argument must be given to \"play\"!");
        return;
    }
    player.play_query(&join_query(&tokens[1..]), out);
}

fn resume(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() > 1 {
        out.error("\"resume\" takes no arguments!");
    } else if player.is_playing() {
        report(player.resume(), out);
    } else {
        out.error(NOT_PLAYING);
    }
}

fn pause(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() > 1 {
        out.error("\"pause\" takes no arguments!");
    } else if player.is_playing() {
        report(player.pause(), out);
    } else {
        out.error(NOT_PLAYING);
    }
}

fn seek(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    match tokens.len() {
        0 | 1 => {
            out.error("Seek position argument (in seconds) must be given to \"seek\"!");
            return;
        }
        2 => {}
        _ => {
            out.error("Extra arguments given to \"seek\"!");
            return;
        }
    }

    if !player.is_playing() {
        out.error(NOT_PLAYING);
        return;
    }

    let Some(seconds) = parse_f32(tokens[1]) else {
        out.error("Invalid position argument given to \"seek\"!");
        return;
    };

    if !player.seek_seconds(seconds) {
        out.error("Seek query out of duration of media!");
    }
}

fn volume(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    match tokens.len() {
        0 | 1 => {
            out.error("Volume argument (linear) must be given to \"volume\"!");
            return;
        }
        2 => {}
        _ => {
            out.error("Extra arguments given to \"volume\"!");
            return;
        }
    }

    match parse_f32(tokens[1]) {
        Some(gain) => player.set_volume(gain),
        None => out.error("Invalid volume argument given to \"volume\"!"),
    }
}

fn stop(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() > 1 {
        out.error("\"stop\" takes no arguments!");
    } else if player.is_playing() {
        player.stop();
    } else {
        out.error("Not currently playing music! Use \"play\" to start media.");
    }
}

fn playlist(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() < 2 {
        out.error("\"playl\" takes at least a flag argument!");
        return;
    }

    let Some(flag) = PlaylistFlag::from_token(tokens[1]) else {
        out.warn("Unknown flag argument given to \"playl\".");
        return;
    };

    match flag {
        PlaylistFlag::Next => {
            if tokens.len() > 2 {
                out.error(EXTRA_PLAYL_ARGS);
            } else {
                player.next(out);
            }
        }
        PlaylistFlag::Shuffle => set_mode(tokens, PlaylistMode::Shuffle, player, out),
        PlaylistFlag::Sequential => set_mode(tokens, PlaylistMode::Sequential, player, out),
        PlaylistFlag::Queued => set_mode(tokens, PlaylistMode::Queued, player, out),
        PlaylistFlag::Push => push(tokens, player, out),
        PlaylistFlag::List => list(tokens, player, out),
        PlaylistFlag::Index => index(tokens, player, out),
        PlaylistFlag::Remove => remove(tokens, player, out),
        PlaylistFlag::Loop => set_loop(tokens, player, out),
        PlaylistFlag::Clear => {
            if tokens.len() > 2 {
                out.error(EXTRA_PLAYL_ARGS);
            } else {
                player.clear_queue();
                out.info("Clearing playlist queue.");
            }
        }
    }
}

fn set_mode(tokens: &[&str], mode: PlaylistMode, player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() > 2 {
        out.error(EXTRA_PLAYL_ARGS);
        return;
    }
    player.set_mode(mode);
    out.info(&format!("Playlist mode set to {}.", mode));
}

fn push(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() < 3 {
        out.error("\"playl --push\" requires at least a one-word music track query!");
        return;
    }

    match player.push(&join_query(&tokens[2..])) {
        Ok(track) => out.info(&format!("Adding \"{}\" to playlist music queue.", track.name)),
        Err(e) => {
            tracing::debug!("{}", e);
            out.error("Music query doesn't exist!");
        }
    }
}

fn list(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() > 2 {
        out.error(EXTRA_PLAYL_ARGS);
    } else if player.queue().is_empty() {
        out.info("<Empty Playlist>");
    } else {
        let listing = player.queue().listing();
        out.write_line(&format!("[log.info]\n{}", listing.trim_end()));
    }
}

/// Validate the 1-based index argument of `--index`/`--remove`
fn index_argument(tokens: &[&str], flag: &str, player: &Player, out: &mut dyn LineSink) -> Option<usize> {
    if tokens.len() > 3 {
        out.error(EXTRA_PLAYL_ARGS);
        return None;
    }
    if tokens.len() < 3 {
        out.error(&format!("\"playl {}\" requires an index argument!", flag));
        return None;
    }

    let Some(index) = parse_index(tokens[2]) else {
        out.error(&format!("Invalid index argument given to \"playl {}\"!", flag));
        return None;
    };
    if index < 1 || index > player.queue().len() {
        out.error(&format!("Index argument given to \"playl {}\" out of range!", flag));
        return None;
    }

    Some(index - 1)
}

fn index(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if let Some(i) = index_argument(tokens, "--index", player, out) {
        report(player.set_position(i, out), out);
    }
}

fn remove(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    if tokens.len() == 3 && player.queue().is_empty() {
        out.error("Playlist music queue is empty!");
        return;
    }

    if let Some(i) = index_argument(tokens, "--remove", player, out) {
        match player.remove(i, out) {
            Ok(track) => out.info(&format!("Removed \"{}\" from playlist music queue.", track.name)),
            Err(e) => out.error(&e.to_string()),
        }
    }
}

fn set_loop(tokens: &[&str], player: &mut Player, out: &mut dyn LineSink) {
    let looping = match tokens.len() {
        2 => !player.looping(),
        3 => match parse_bool(tokens[2]) {
            Some(value) => value,
            None => {
                out.error("Unknown boolean argument given to \"playl\"!");
                return;
            }
        },
        _ => {
            out.error(EXTRA_PLAYL_ARGS);
            return;
        }
    };

    player.set_looping(looping);
    out.info(&format!("Playlist queue looping set to {}!", looping));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleBuffer, ERROR_PREFIX};
    use crate::source::scripted::ScriptedEngine;
    use crate::types::PlaybackConfig;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        engine: ScriptedEngine,
        player: Player,
        interpreter: Interpreter,
        out: ConsoleBuffer,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().join("music");
            fs::create_dir_all(&root).unwrap();
            for file in files {
                fs::write(root.join(file), b"fake audio").unwrap();
            }
            let engine = ScriptedEngine::new();
            let config = PlaybackConfig {
                music_root: root,
                ..PlaybackConfig::default()
            };
            Self {
                _temp: temp,
                player: Player::with_seed(Box::new(engine.clone()), &config, 1),
                engine,
                interpreter: Interpreter::default(),
                out: ConsoleBuffer::new(),
            }
        }

        fn run(&mut self, line: &str) -> Flow {
            self.interpreter.submit(line, &mut self.player, &mut self.out)
        }

        fn last(&self) -> &str {
            self.out.lines().last().map_or("", String::as_str)
        }

        fn errors(&self) -> usize {
            self.out.count_prefixed(ERROR_PREFIX)
        }
    }

    #[test]
    fn unknown_command_reports_error() {
        let mut f = Fixture::new(&[]);
        assert_eq!(f.run("dance"), Flow::Continue);
        assert_eq!(
            f.last(),
            "[log.error] Unknown command! Enter \"help\" to view a list of available commands!"
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        let mut f = Fixture::new(&[]);
        f.run("");
        f.run("    ");
        f.run("\t");
        assert_eq!(f.out.lines().len(), 1);
        assert!(f.interpreter.history().is_empty());
    }

    #[test]
    fn every_line_goes_to_history() {
        let mut f = Fixture::new(&[]);
        f.run("dance");
        f.run("dance");
        f.run("help");
        assert_eq!(f.interpreter.history().get_all(), vec!["dance", "help"]);
    }

    #[test]
    fn p_toggles_when_loaded() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("p intro");
        assert!(f.engine.is_running());
        f.run("p");
        assert!(f.player.is_paused());
        f.run("p");
        assert!(!f.player.is_paused());
        assert_eq!(f.errors(), 0);
    }

    #[test]
    fn p_without_track_needs_title() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("p");
        assert_eq!(
            f.last(),
            "[log.error] Track title argument must be given to \"play\"!"
        );
    }

    #[test]
    fn chevron_resumes_only_when_paused() {
        let mut f = Fixture::new(&["Intro.mp3", "Other.mp3"]);
        f.run("> intro");
        f.run("#");
        assert!(f.player.is_paused());
        f.run(">");
        assert!(!f.player.is_paused());

        // Running: falls through to play, which needs a title
        f.run(">");
        assert_eq!(f.errors(), 1);
        assert_eq!(f.player.session().track_name(), "Intro");
    }

    #[test]
    fn pause_requires_playing() {
        let mut f = Fixture::new(&[]);
        f.run("pause");
        f.run("res");
        assert_eq!(f.errors(), 2);
        assert!(f.last().contains("Not currently playing music!"));
    }

    #[test]
    fn arity_errors_do_not_mutate() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("play intro");
        f.run("pause now");
        assert!(!f.player.is_paused());
        f.run("seek");
        f.run("seek 1 2");
        f.run("vol");
        f.run("vol 1 2");
        f.run("stop now");
        f.run("next please");
        assert_eq!(f.errors(), 7);
        assert!(f.player.is_playing());
        assert_eq!(f.player.volume(), 1.0);
    }

    #[test]
    fn seek_is_strict() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("play intro");
        f.run("seek 2.5");
        assert_eq!(f.player.session().cursor_frame(), 2500);

        f.run("seek 2.5s");
        assert_eq!(f.last(), "[log.error] Invalid position argument given to \"seek\"!");
        f.run("seek 99");
        assert_eq!(f.last(), "[log.error] Seek query out of duration of media!");
        f.run("seek -1");
        assert_eq!(f.player.session().cursor_frame(), 2500);
    }

    #[test]
    fn volume_is_unclamped() {
        let mut f = Fixture::new(&[]);
        f.run("volume 2.5");
        assert_eq!(f.player.volume(), 2.5);
        f.run("vol abc");
        assert_eq!(f.player.volume(), 2.5);
        assert_eq!(f.errors(), 1);
    }

    #[test]
    fn stop_requires_playing() {
        let mut f = Fixture::new(&[]);
        f.run("stop");
        assert_eq!(
            f.last(),
            "[log.error] Not currently playing music! Use \"play\" to start media."
        );
    }

    #[test]
    fn playlist_flags_dispatch() {
        let mut f = Fixture::new(&["Intro.mp3", "Other.mp3"]);
        f.run("playl");
        assert_eq!(f.last(), "[log.error] \"playl\" takes at least a flag argument!");

        f.run("pl --wat");
        assert_eq!(f.last(), "[log.warn] Unknown flag argument given to \"playl\".");

        f.run("playlist -q");
        assert_eq!(f.player.mode(), PlaylistMode::Queued);
        assert_eq!(f.last(), "[log.info] Playlist mode set to queued.");
        f.run("pl -sh extra");
        assert_eq!(f.player.mode(), PlaylistMode::Queued);
        f.run("pl --seq");
        assert_eq!(f.player.mode(), PlaylistMode::Sequential);
    }

    #[test]
    fn push_list_and_clear() {
        let mut f = Fixture::new(&["Intro.mp3", "Other.mp3"]);
        f.run("pl -l");
        assert_eq!(f.last(), "[log.info] <Empty Playlist>");

        f.run("pl -p");
        assert_eq!(f.errors(), 1);
        f.run("pl -p oth");
        assert_eq!(f.last(), "[log.info] Adding \"Other\" to playlist music queue.");
        f.run("pl --push nothing here");
        assert_eq!(f.last(), "[log.error] Music query doesn't exist!");
        assert_eq!(f.player.queue().len(), 1);

        f.run("pl -p intro");
        f.run("pl -i 2");
        f.run("pl --list");
        assert_eq!(f.last(), "[log.info]\n1. Other\n2. Intro < You Are Here");

        f.run("pl -c");
        assert!(f.player.queue().is_empty());
        assert_eq!(f.player.queue().cursor(), None);
        assert_eq!(f.last(), "[log.info] Clearing playlist queue.");
    }

    #[test]
    fn index_validation() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("pl -p intro");
        f.run("pl -i");
        f.run("pl -i x");
        f.run("pl -i 0");
        f.run("pl -i 2");
        f.run("pl -i 1 2");
        assert_eq!(f.errors(), 5);
        assert_eq!(f.player.queue().cursor(), None);
        assert_eq!(
            f.out.lines()[f.out.lines().len() - 2],
            "[log.error] Index argument given to \"playl --index\" out of range!"
        );
    }

    #[test]
    fn remove_validation() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("pl -r 1");
        assert_eq!(f.last(), "[log.error] Playlist music queue is empty!");
        f.run("pl -p intro");
        f.run("pl -r 3");
        assert_eq!(
            f.last(),
            "[log.error] Index argument given to \"playl --remove\" out of range!"
        );
        f.run("pl -r 1");
        assert_eq!(f.last(), "[log.info] Removed \"Intro\" from playlist music queue.");
        assert!(f.player.queue().is_empty());
    }

    #[test]
    fn loop_toggle_and_set() {
        let mut f = Fixture::new(&[]);
        f.run("pl -lp");
        assert!(f.player.looping());
        assert_eq!(f.last(), "[log.info] Playlist queue looping set to true!");
        f.run("pl --loop 0");
        assert!(!f.player.looping());
        f.run("pl --loop t");
        assert!(f.player.looping());
        f.run("pl --loop maybe");
        assert!(f.player.looping());
        assert_eq!(f.last(), "[log.error] Unknown boolean argument given to \"playl\"!");
        f.run("pl --loop 1 2");
        assert_eq!(f.last(), "[log.error] Extra arguments given to \"playl\"!");
    }

    #[test]
    fn clear_resets_console() {
        let mut f = Fixture::new(&[]);
        f.run("help");
        f.run("clear");
        assert_eq!(f.out.lines().len(), 1);
    }

    #[test]
    fn exit_stops_playback() {
        let mut f = Fixture::new(&["Intro.mp3"]);
        f.run("play intro");
        assert_eq!(f.run("exit"), Flow::Exit);
        assert!(!f.player.is_playing());
        assert!(!f.engine.is_running());
    }
}

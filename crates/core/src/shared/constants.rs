pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_DIR_NAME: &str = "FacePlay";

pub const EYEBROW_RAISE: &str = "eyebrow_raise";
pub const WINK: &str = "wink";
pub const SMILE: &str = "smile";

pub const DEFAULT_DETECTION_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_EXPRESSION_THRESHOLD: f64 = 0.15;
pub const DEFAULT_COOLDOWN_SECS: f64 = 2.0;

/// An eye counts as "still open" for wink detection above this openness ratio.
pub const DEFAULT_WINK_OPEN_RATIO: f64 = 0.25;

/// Minimum gap between the "closed" and "still open" ratios when the open
/// ratio is derived from `expression_threshold`.
pub const WINK_OPEN_MARGIN: f64 = 0.1;

/// How often a held expression's state is re-sampled for `hold_local`.
pub const DEFAULT_HOLD_SAMPLE_SECS: f64 = 1.5;

/// EMA weight given to each neutral frame when updating a running baseline.
pub const DEFAULT_BASELINE_ALPHA: f64 = 0.05;

/// Neutral eyebrow-to-eye-center distance relative to inter-ocular distance.
pub const EYEBROW_BASELINE_PRIOR: f64 = 0.35;

/// Neutral mouth width relative to inter-ocular distance.
pub const SMILE_BASELINE_PRIOR: f64 = 0.80;

pub const DEFAULT_EYEBROW_URL: &str = "https://www.youtube.com/watch?v=VlZdCpPXLns";
pub const DEFAULT_SMILE_URL: &str = "https://www.youtube.com/watch?v=DDQCO3Vykts";
pub const DEFAULT_MUSIC_FILE: &str = "default_music.mp3";

pub const DEFAULT_QUIT_KEY: &str = "q";

/// A command-line audio player: program, leading arguments, and the extra
/// arguments that make it repeat the file forever (empty if it cannot).
pub struct PlayerCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub loop_args: &'static [&'static str],
}

/// Audio players tried in order; the media path is appended.
pub const AUDIO_PLAYERS: &[PlayerCommand] = &[
    PlayerCommand {
        program: "mpg123",
        args: &["--quiet"],
        loop_args: &["--loop", "-1"],
    },
    PlayerCommand {
        program: "ffplay",
        args: &["-nodisp", "-autoexit", "-loglevel", "quiet"],
        loop_args: &["-loop", "0"],
    },
    PlayerCommand {
        program: "paplay",
        args: &[],
        loop_args: &[],
    },
    PlayerCommand {
        program: "aplay",
        args: &["--quiet"],
        loop_args: &[],
    },
];

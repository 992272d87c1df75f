//! Log line formats accepted by `--log-format`.

use strum::{Display, EnumString};

/// Rendering used for events written to the log file.
///
/// Parsing ignores ASCII case; rendering produces the lowercase flag value
/// that is forwarded to a detached child.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level.
    Json,
    /// Single-line text with timestamp, level, and target.
    #[default]
    Compact,
}

use regex::Regex;
use std::sync::OnceLock;

/// Pattern matching a team-label prefix: everything up to and including the
/// last colon on a line. Greedy, so `"Red team: base:Alice"` keeps only
/// `"Alice"`. Whitespace around the colon is handled by the later trims.
const TEAM_PREFIX_PATTERN: &str = "^.*:";

static TEAM_PREFIX: OnceLock<Regex> = OnceLock::new();

fn team_prefix() -> &'static Regex {
    TEAM_PREFIX.get_or_init(|| Regex::new(TEAM_PREFIX_PATTERN).expect("valid literal pattern"))
}

/// Extracts candidate usernames from one line of OCR output.
///
/// Returns 0, 1, or 2 candidates:
/// - 0 when the line is empty, only a team-label prefix, or only a tick marker
/// - 2 when the name ends in `Y`/`y`, which cannot be told apart from the
///   tick glyph Tesseract mis-reads as that letter (literal reading first,
///   stripped variant second)
/// - 1 otherwise
///
/// Never fails, performs no I/O.
pub fn extract_users(line: &str) -> Vec<String> {
    // Drop the team-label prefix.
    let segment = team_prefix().replace(line, "");
    let mut name = strip_tick_marker(segment.trim());

    // Tesseract emits stray bytes for non-Latin decoration glyphs; they break
    // URL construction downstream, so drop them rather than substituting a
    // replacement character.
    name.retain(|c| c.is_ascii() && !c.is_ascii_control());

    let name = name.trim();
    if name.is_empty() {
        return Vec::new();
    }

    log::debug!("Found user <{}>", name);

    let mut users = vec![name.to_string()];

    // A trailing Y may be a real letter or the tick glyph; emit both readings
    // unless stripping would leave an empty name.
    if let Some(stripped) = name.strip_suffix(['Y', 'y'])
        && !stripped.is_empty()
    {
        users.push(stripped.to_string());
    }

    users
}

/// Removes a trailing tick marker: one or more spaces followed by a single
/// lower-case `v` (Tesseract's other common mis-read of the tick glyph).
/// A segment that is nothing but the marker collapses to the empty string.
fn strip_tick_marker(name: &str) -> String {
    if name == "v" {
        return String::new();
    }
    if let Some(rest) = name.strip_suffix('v')
        && rest.ends_with(' ')
    {
        return rest.trim_end().to_string();
    }
    name.to_string()
}

/// Applies [`extract_users`] to every logical line of an OCR transcript.
///
/// Line order is preserved and duplicates are kept; two players with
/// colliding OCR-visible names are the caller's problem to resolve.
pub fn scan_transcript(transcript: &str) -> impl Iterator<Item = String> + '_ {
    transcript.lines().flat_map(extract_users)
}

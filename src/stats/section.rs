//! Stat-block decoding for scraped profile pages.
//!
//! The profile page renders one game mode per section; the section for a
//! mode starts at its title and runs until the next mode's title. Between
//! the two titles the page emits alternating value/label lines ("712" on one
//! line, "Deaths" on the next). This positional layout is brittle by
//! construction, so it is isolated here: a page redesign means rewriting
//! this module and nothing else.

/// Ordered label → value mapping recovered from one stat block.
///
/// Values stay string-encoded; numeric conversion happens during table
/// assembly. An empty record means "no statistics available" and is not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatRecord {
    entries: Vec<(String, String)>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from (label, value) pairs. Test and stub helper.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, label: &str, value: &str) {
        self.entries.push((label.to_string(), value.to_string()));
    }

    /// Looks up a value by its statistic label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

/// Decodes the stat block bounded by `start_marker` and `end_marker`.
///
/// Tolerated anomalies (an unpaired trailing line) are reported through
/// `log::debug!`; use [`parse_with_hook`] to observe them directly.
pub fn parse(text: &str, start_marker: &str, end_marker: &str) -> StatRecord {
    parse_with_hook(text, start_marker, end_marker, &mut |message| {
        log::debug!("{}", message);
    })
}

/// Like [`parse`], with an explicit observer for tolerated anomalies.
///
/// The span runs from the first occurrence of `start_marker` through the
/// nearest following `end_marker` and may cross newlines. No span means no
/// statistics (page layout changed, or the player does not exist) and yields
/// an empty record. Within the span, blank lines are layout artifacts; the
/// first and last remaining lines restate the section titles. The rest are
/// value/label pairs in reversed adjacent order. An odd remainder drops the
/// unpaired line and reports it to `hook`.
pub fn parse_with_hook(
    text: &str,
    start_marker: &str,
    end_marker: &str,
    hook: &mut dyn FnMut(&str),
) -> StatRecord {
    let mut record = StatRecord::new();

    let Some(start) = text.find(start_marker) else {
        return record;
    };
    let after_start = start + start_marker.len();
    let Some(end) = text[after_start..].find(end_marker) else {
        return record;
    };
    let span = &text[start..after_start + end + end_marker.len()];

    let lines: Vec<&str> = span.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return record;
    }

    // Drop the section title and the next section's title.
    let body = &lines[1..lines.len() - 1];

    if body.len() % 2 != 0 {
        hook(&format!(
            "stat block between {:?} and {:?} has an unpaired line {:?}; dropping it",
            start_marker,
            end_marker,
            body[body.len() - 1].trim()
        ));
    }

    // Value first, label second.
    for pair in body.chunks_exact(2) {
        record.insert(pair[1].trim(), pair[0].trim());
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = "\
noise before\n\
BedWars\n\
391\n\
Wins\n\
1259\n\
Kills\n\
\n\
712\n\
Deaths\n\
SkyWars\n\
more noise\n";

    #[test]
    fn test_parse_decodes_reversed_pairs() {
        let record = parse(BLOB, "BedWars", "SkyWars");
        assert_eq!(record.get("Wins"), Some("391"));
        assert_eq!(record.get("Kills"), Some("1259"));
        assert_eq!(record.get("Deaths"), Some("712"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_parse_synthetic_round_trip() {
        let blob = "<start>\nA\n\nLabel1\nB\nLabel2\n<end>";
        let record = parse(blob, "<start>", "<end>");
        assert_eq!(record.get("Label1"), Some("A"));
        assert_eq!(record.get("Label2"), Some("B"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_parse_preserves_discovery_order() {
        let record = parse(BLOB, "BedWars", "SkyWars");
        let labels: Vec<&str> = record.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Wins", "Kills", "Deaths"]);
    }

    #[test]
    fn test_parse_without_start_marker_is_empty() {
        assert!(parse(BLOB, "TTT", "SkyWars").is_empty());
    }

    #[test]
    fn test_parse_without_end_marker_is_empty() {
        assert!(parse(BLOB, "BedWars", "QuickMaths").is_empty());
    }

    #[test]
    fn test_parse_stops_at_nearest_end_marker() {
        let blob = "S\n1\nA\nE\n2\nB\nE";
        let record = parse(blob, "S", "E");
        assert_eq!(record.get("A"), Some("1"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_parse_empty_section() {
        assert!(parse("S\nE", "S", "E").is_empty());
        assert!(parse("S\n\n\nE", "S", "E").is_empty());
    }

    #[test]
    fn test_parse_odd_remainder_dropped_and_reported() {
        let blob = "S\n1\nA\nstray\nE";
        let mut anomalies = Vec::new();
        let record = parse_with_hook(blob, "S", "E", &mut |m| anomalies.push(m.to_string()));

        assert_eq!(record.get("A"), Some("1"));
        assert_eq!(record.len(), 1);
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].contains("stray"));
    }

    #[test]
    fn test_parse_trims_values_and_labels() {
        let blob = "S\n  42  \n  Wins  \nE";
        let record = parse(blob, "S", "E");
        assert_eq!(record.get("Wins"), Some("42"));
    }

    #[test]
    fn test_record_from_pairs_lookup() {
        let record = StatRecord::from_pairs([("Wins", "391"), ("Deaths", "712")]);
        assert_eq!(record.get("Wins"), Some("391"));
        assert_eq!(record.get("Kills"), None);
        assert!(!record.is_empty());
    }
}

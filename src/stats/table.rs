//! Table assembly: one uniform row per username plus the derived K/D column.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::error::StatsError;
use super::section::StatRecord;

/// Cell value for every column of a row whose stats could not be retrieved.
pub const ABSENT: &str = "-";

/// Label of the derived kill/death ratio column.
pub const KD_COLUMN: &str = "K/D";

const KILLS_COLUMN: &str = "Kills";
const DEATHS_COLUMN: &str = "Deaths";

/// One row of the stats table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub username: String,
    /// Cell values in column order, including the trailing K/D cell.
    pub cells: Vec<String>,
}

/// Rectangular stats table: every row has the same column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTable {
    /// Configured statistic names plus the derived K/D column.
    pub columns: Vec<String>,
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    /// Sorts rows ascending by the derived K/D column.
    ///
    /// The sort is stable, so ties keep their input order. Absent rows have
    /// no ratio and sort last.
    pub fn sort_by_kd(&mut self) {
        let kd_index = self.columns.len() - 1;
        self.rows.sort_by(|a, b| {
            match (parse_kd(&a.cells[kd_index]), parse_kd(&b.cells[kd_index])) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }
}

fn parse_kd(cell: &str) -> Option<f64> {
    if cell == ABSENT {
        None
    } else {
        cell.parse().ok()
    }
}

/// Result of aggregation: the table plus any per-row integrity failures.
///
/// A username whose record failed an integrity check gets no row; the
/// corresponding error carries the username and offending column.
#[derive(Debug)]
pub struct AggregateOutcome {
    pub table: StatsTable,
    pub integrity_errors: Vec<StatsError>,
}

/// Builds one uniform row per username from the fetch capability.
///
/// Duplicate usernames refer to the same profile and collapse to a single
/// row in first-occurrence order; each distinct name is fetched once.
/// Transport errors abort the batch immediately. Schema violations are
/// collected per row and do not stop the remaining usernames.
pub fn aggregate<F>(
    usernames: &[String],
    columns: &[String],
    mut fetch: F,
) -> Result<AggregateOutcome, StatsError>
where
    F: FnMut(&str) -> Result<StatRecord, StatsError>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut records: HashMap<&str, StatRecord> = HashMap::new();

    for user in usernames {
        if records.contains_key(user.as_str()) {
            continue;
        }
        let record = fetch(user)?;
        order.push(user.as_str());
        records.insert(user.as_str(), record);
    }

    let mut table_columns = columns.to_vec();
    table_columns.push(KD_COLUMN.to_string());

    let mut rows = Vec::with_capacity(order.len());
    let mut integrity_errors = Vec::new();

    for user in order {
        let record = &records[user];
        if record.is_empty() {
            log::debug!("No stats found for user <{}>", user);
            rows.push(StatsRow {
                username: user.to_string(),
                cells: vec![ABSENT.to_string(); table_columns.len()],
            });
            continue;
        }

        match build_row(user, record, columns) {
            Ok(row) => rows.push(row),
            Err(e) => integrity_errors.push(e),
        }
    }

    Ok(AggregateOutcome {
        table: StatsTable {
            columns: table_columns,
            rows,
        },
        integrity_errors,
    })
}

/// Builds one populated row. A record missing a configured column means the
/// profile page format changed upstream; never silently defaulted.
fn build_row(user: &str, record: &StatRecord, columns: &[String]) -> Result<StatsRow, StatsError> {
    let mut cells = Vec::with_capacity(columns.len() + 1);

    for column in columns {
        let value = record.get(column).ok_or_else(|| StatsError::DataIntegrity {
            user: user.to_string(),
            column: column.clone(),
        })?;
        cells.push(value.to_string());
    }

    let kills = parse_count(user, record, KILLS_COLUMN)?;
    let deaths = parse_count(user, record, DEATHS_COLUMN)?;
    cells.push(kill_death_ratio(kills, deaths));

    Ok(StatsRow {
        username: user.to_string(),
        cells,
    })
}

fn parse_count(user: &str, record: &StatRecord, column: &str) -> Result<u64, StatsError> {
    let integrity_error = || StatsError::DataIntegrity {
        user: user.to_string(),
        column: column.to_string(),
    };
    let value = record.get(column).ok_or_else(integrity_error)?;
    value.trim().parse().map_err(|_| integrity_error())
}

/// Kills per death, rounded half-up to two decimals.
///
/// Division is done in integer hundredths so that exact halves (401 kills /
/// 200 deaths = 2.005) round up instead of falling to binary floating point
/// representation. Zero deaths yields 0.00, not an error.
fn kill_death_ratio(kills: u64, deaths: u64) -> String {
    if deaths == 0 {
        return "0.00".to_string();
    }
    let hundredths = (kills * 200 + deaths) / (deaths * 2);
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

impl fmt::Display for StatsTable {
    /// Renders an aligned text table with a `Player` column first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = Vec::with_capacity(self.columns.len() + 1);
        widths.push(
            self.rows
                .iter()
                .map(|r| r.username.len())
                .chain(std::iter::once("Player".len()))
                .max()
                .unwrap_or(0),
        );
        for (i, column) in self.columns.iter().enumerate() {
            widths.push(
                self.rows
                    .iter()
                    .map(|r| r.cells[i].len())
                    .chain(std::iter::once(column.len()))
                    .max()
                    .unwrap_or(0),
            );
        }

        write!(f, "{:<width$}", "Player", width = widths[0])?;
        for (i, column) in self.columns.iter().enumerate() {
            write!(f, "  {:>width$}", column, width = widths[i + 1])?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:<width$}", row.username, width = widths[0])?;
            for (i, cell) in row.cells.iter().enumerate() {
                write!(f, "  {:>width$}", cell, width = widths[i + 1])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Writes the table as CSV with a leading `player` column.
pub fn write_csv(table: &StatsTable, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writeln!(file, "player,{}", table.columns.join(","))
        .context("Failed to write CSV header")?;
    for row in &table.rows {
        writeln!(file, "{},{}", row.username, row.cells.join(","))
            .context("Failed to write CSV row")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn columns() -> Vec<String> {
        ["Wins", "Kills", "Games", "Beds destroyed", "Deaths"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn full_record() -> StatRecord {
        StatRecord::from_pairs([
            ("Wins", "391"),
            ("Kills", "1259"),
            ("Games", "1069"),
            ("Beds destroyed", "725"),
            ("Deaths", "712"),
        ])
    }

    fn users(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aggregate_populated_and_absent_rows() {
        let outcome = aggregate(&users(&["Ann", "Bob"]), &columns(), |user| {
            Ok(if user == "Ann" {
                full_record()
            } else {
                StatRecord::new()
            })
        })
        .unwrap();

        let table = outcome.table;
        assert!(outcome.integrity_errors.is_empty());
        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.columns[5], "K/D");
        assert_eq!(table.rows.len(), 2);

        // 1259 / 712 = 1.76825... → 1.77
        assert_eq!(
            table.rows[0].cells,
            vec!["391", "1259", "1069", "725", "712", "1.77"]
        );
        assert_eq!(table.rows[1].username, "Bob");
        assert_eq!(table.rows[1].cells, vec![ABSENT; 6]);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let fetch = |user: &str| {
            Ok(if user == "Ann" {
                full_record()
            } else {
                StatRecord::new()
            })
        };
        let first = aggregate(&users(&["Ann", "Bob"]), &columns(), fetch).unwrap();
        let second = aggregate(&users(&["Ann", "Bob"]), &columns(), fetch).unwrap();
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn test_zero_deaths_yields_zero_ratio() {
        let record = StatRecord::from_pairs([
            ("Wins", "391"),
            ("Kills", "1259"),
            ("Games", "1069"),
            ("Beds destroyed", "725"),
            ("Deaths", "0"),
        ]);
        let outcome = aggregate(&users(&["Ann"]), &columns(), |_| Ok(record.clone())).unwrap();

        assert_eq!(outcome.table.rows[0].cells[5], "0.00");
        assert!(outcome.integrity_errors.is_empty());
    }

    #[test]
    fn test_ratio_rounds_half_up() {
        // 401 / 200 = 2.005 exactly
        assert_eq!(kill_death_ratio(401, 200), "2.01");
        assert_eq!(kill_death_ratio(1259, 712), "1.77");
        assert_eq!(kill_death_ratio(1, 3), "0.33");
        assert_eq!(kill_death_ratio(2, 3), "0.67");
        assert_eq!(kill_death_ratio(10, 4), "2.50");
    }

    #[test]
    fn test_missing_column_is_integrity_error_not_batch_abort() {
        let broken = StatRecord::from_pairs([
            ("Wins", "391"),
            ("Kills", "1259"),
            ("Games", "1069"),
            ("Beds destroyed", "725"),
            // "Deaths" missing: upstream format change
        ]);
        let outcome = aggregate(&users(&["Ann", "Bob"]), &columns(), |user| {
            Ok(if user == "Ann" {
                broken.clone()
            } else {
                full_record()
            })
        })
        .unwrap();

        // Bob's row survives, Ann's failure is surfaced.
        assert_eq!(outcome.table.rows.len(), 1);
        assert_eq!(outcome.table.rows[0].username, "Bob");
        assert_eq!(outcome.integrity_errors.len(), 1);
        assert!(matches!(
            &outcome.integrity_errors[0],
            StatsError::DataIntegrity { user, column } if user == "Ann" && column == "Deaths"
        ));
    }

    #[test]
    fn test_non_numeric_kills_is_integrity_error() {
        let broken = StatRecord::from_pairs([
            ("Wins", "391"),
            ("Kills", "lots"),
            ("Games", "1069"),
            ("Beds destroyed", "725"),
            ("Deaths", "712"),
        ]);
        let outcome = aggregate(&users(&["Ann"]), &columns(), |_| Ok(broken.clone())).unwrap();

        assert!(outcome.table.rows.is_empty());
        assert!(matches!(
            &outcome.integrity_errors[0],
            StatsError::DataIntegrity { column, .. } if column == "Kills"
        ));
    }

    #[test]
    fn test_transport_error_aborts_batch() {
        let result = aggregate(&users(&["Ann", "Bob"]), &columns(), |user| {
            Err(StatsError::Transport {
                user: user.to_string(),
                message: "connection refused".to_string(),
            })
        });
        assert!(matches!(result, Err(StatsError::Transport { .. })));
    }

    #[test]
    fn test_duplicate_usernames_collapse_to_one_row() {
        let mut fetch_count = 0;
        let outcome = aggregate(&users(&["Ann", "Ann", "Bob", "Ann"]), &columns(), |_| {
            fetch_count += 1;
            Ok(full_record())
        })
        .unwrap();

        assert_eq!(fetch_count, 2);
        assert_eq!(outcome.table.rows.len(), 2);
        assert_eq!(outcome.table.rows[0].username, "Ann");
        assert_eq!(outcome.table.rows[1].username, "Bob");
    }

    #[test]
    fn test_sort_by_kd_absent_rows_last() {
        let records: Vec<(&str, StatRecord)> = vec![
            (
                "High",
                StatRecord::from_pairs([
                    ("Wins", "1"),
                    ("Kills", "30"),
                    ("Games", "1"),
                    ("Beds destroyed", "1"),
                    ("Deaths", "10"),
                ]),
            ),
            ("Unknown", StatRecord::new()),
            (
                "Low",
                StatRecord::from_pairs([
                    ("Wins", "1"),
                    ("Kills", "10"),
                    ("Games", "1"),
                    ("Beds destroyed", "1"),
                    ("Deaths", "10"),
                ]),
            ),
        ];
        let names: Vec<String> = records.iter().map(|(n, _)| n.to_string()).collect();
        let outcome = aggregate(&names, &columns(), |user| {
            Ok(records
                .iter()
                .find(|(n, _)| *n == user)
                .map(|(_, r)| r.clone())
                .unwrap_or_default())
        })
        .unwrap();

        let mut table = outcome.table;
        table.sort_by_kd();

        let order: Vec<&str> = table.rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(order, vec!["Low", "High", "Unknown"]);
    }

    #[test]
    fn test_sort_by_kd_is_stable_on_ties() {
        let record = full_record();
        let outcome = aggregate(&users(&["First", "Second"]), &columns(), |_| {
            Ok(record.clone())
        })
        .unwrap();

        let mut table = outcome.table;
        table.sort_by_kd();

        assert_eq!(table.rows[0].username, "First");
        assert_eq!(table.rows[1].username, "Second");
    }

    #[test]
    fn test_display_renders_header_and_rows() {
        let outcome = aggregate(&users(&["Ann"]), &columns(), |_| Ok(full_record())).unwrap();
        let rendered = outcome.table.to_string();

        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Player"));
        assert!(header.ends_with("K/D"));
        assert!(lines.next().unwrap().starts_with("Ann"));
    }

    #[test]
    fn test_write_csv() {
        let outcome = aggregate(&users(&["Ann", "Bob"]), &columns(), |user| {
            Ok(if user == "Ann" {
                full_record()
            } else {
                StatRecord::new()
            })
        })
        .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        write_csv(&outcome.table, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "player,Wins,Kills,Games,Beds destroyed,Deaths,K/D");
        assert_eq!(lines[1], "Ann,391,1259,1069,725,712,1.77");
        assert_eq!(lines[2], "Bob,-,-,-,-,-,-");
    }
}

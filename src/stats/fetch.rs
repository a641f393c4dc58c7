//! HTTP retrieval of player profile pages.

use scraper::Html;
use std::time::Duration;

use super::error::StatsError;
use super::section::{self, StatRecord};

/// The stats site serves a different page to non-browser user agents.
const USER_AGENT: &str = "Mozilla/5.0";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Client that downloads a player's profile page and decodes the stat block.
pub struct StatsClient {
    client: reqwest::blocking::Client,
    base_url: String,
    start_marker: String,
    end_marker: String,
}

impl StatsClient {
    /// Creates a client for the given base URL (the username is appended per
    /// fetch). Fails fast on a non-HTTP URL, before any fetch is attempted.
    pub fn new(base_url: &str, start_marker: &str, end_marker: &str) -> Result<Self, StatsError> {
        let lower = base_url.to_ascii_lowercase();
        if !lower.starts_with("http://") && !lower.starts_with("https://") {
            return Err(StatsError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StatsError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            start_marker: start_marker.to_string(),
            end_marker: end_marker.to_string(),
        })
    }

    /// Fetches the statistics for one user.
    ///
    /// Transport failures (connection errors, non-2xx status) are returned as
    /// [`StatsError::Transport`]. A page with no stat block is not an error
    /// and yields an empty record.
    pub fn fetch(&self, user: &str) -> Result<StatRecord, StatsError> {
        let url = format!("{}{}", self.base_url, user);
        log::info!("Retrieving stats for user <{}>", user);
        log::debug!("Opening {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StatsError::Transport {
                user: user.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Transport {
                user: user.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.text().map_err(|e| StatsError::Transport {
            user: user.to_string(),
            message: e.to_string(),
        })?;

        let text = html_to_text(&body);
        let mut hook = |message: &str| log::warn!("user <{}>: {}", user, message);
        Ok(section::parse_with_hook(
            &text,
            &self.start_marker,
            &self.end_marker,
            &mut hook,
        ))
    }
}

/// Reduces an HTML document to its text content, one text node per line.
///
/// The stat block renders each value and label in its own element, so
/// joining text nodes with newlines reproduces the line structure the
/// section parser expects.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

//! Configuration and CLI argument handling

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::FixedOffset;
use clap::Parser;

use crate::{schedule::ScheduleSettings, state::EngineTiming};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-board")]
#[command(about = "A clock-corrected recurring countdown board kept in sync with a schedule backend")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Endpoint delivering `{delaySeconds, timers}`
    #[arg(long, default_value = "http://localhost:3000/api/data")]
    pub schedule_url: String,

    /// Time authority returning an ISO-8601 `dateTime`
    #[arg(long, default_value = "https://timeapi.io/api/Time/current/zone?timeZone=Asia/Tokyo")]
    pub time_url: String,

    /// Hour of day all timers are anchored to
    #[arg(long, default_value = "21", value_parser = clap::value_parser!(u32).range(0..=23))]
    pub base_hour: u32,

    /// UTC offset of the schedule's time zone, in minutes
    #[arg(long, default_value = "540", allow_hyphen_values = true)]
    pub utc_offset_minutes: i32,

    /// Schedule refresh interval in milliseconds
    #[arg(long, default_value = "5000")]
    pub fetch_interval_ms: u64,

    /// Countdown refresh interval in milliseconds
    #[arg(long, default_value = "100")]
    pub tick_interval_ms: u64,

    /// Deadline for each upstream request in milliseconds
    #[arg(long, default_value = "10000")]
    pub request_timeout_ms: u64,

    /// Fade time of the finished start card in milliseconds
    #[arg(long, default_value = "600")]
    pub fade_ms: u64,

    /// Label of the countdown to the base hour itself
    #[arg(long, default_value = "Until start")]
    pub start_label: String,

    /// Port to bind the display API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Start with audio cues disabled
    #[arg(long)]
    pub muted: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Zone in which the base hour is evaluated
    pub fn zone(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC offset of {} minutes is out of range", self.utc_offset_minutes))
    }

    pub fn schedule_settings(&self) -> Result<ScheduleSettings> {
        Ok(ScheduleSettings {
            base_hour: self.base_hour,
            zone: self.zone()?,
            start_label: self.start_label.clone(),
        })
    }

    pub fn timing(&self) -> Result<EngineTiming> {
        if self.fetch_interval_ms == 0 || self.tick_interval_ms == 0 {
            return Err(anyhow!("fetch and tick intervals must be positive"));
        }
        Ok(EngineTiming {
            fetch_interval: Duration::from_millis(self.fetch_interval_ms),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            fade: Duration::from_millis(self.fade_ms),
        })
    }

    /// Upper bound on a single schedule or time request
    pub fn request_timeout(&self) -> Result<Duration> {
        if self.request_timeout_ms == 0 {
            return Err(anyhow!("request timeout must be positive"));
        }
        Ok(Duration::from_millis(self.request_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("countdown-board").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.base_hour, 21);
        assert_eq!(config.zone().unwrap().local_minus_utc(), 9 * 3600);
        let timing = config.timing().unwrap();
        assert_eq!(timing.fetch_interval, Duration::from_millis(5000));
        assert_eq!(timing.tick_interval, Duration::from_millis(100));
        assert_eq!(timing.fade, Duration::from_millis(600));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn base_hour_is_range_checked() {
        assert!(Config::try_parse_from(["countdown-board", "--base-hour", "24"]).is_err());
        assert_eq!(parse(&["--base-hour", "0"]).base_hour, 0);
    }

    #[test]
    fn negative_offset_is_accepted() {
        let config = parse(&["--utc-offset-minutes", "-300"]);
        assert_eq!(config.zone().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn absurd_offset_is_rejected() {
        assert!(parse(&["--utc-offset-minutes", "2000"]).zone().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(parse(&["--tick-interval-ms", "0"]).timing().is_err());
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        assert!(parse(&["--request-timeout-ms", "0"]).request_timeout().is_err());
        assert_eq!(
            parse(&["--request-timeout-ms", "2500"]).request_timeout().unwrap(),
            Duration::from_millis(2500)
        );
    }
}

//! Live train position scraper.
//!
//! Periodically reads train positions from a stateful status web page,
//! turns each train's free-text status into a typed position, and publishes
//! one consolidated snapshot per cycle for a dashboard and an LED display.

pub mod domain;
pub mod parse;
pub mod publish;
pub mod scrape;
pub mod webdriver;

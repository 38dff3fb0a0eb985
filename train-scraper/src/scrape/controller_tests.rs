//! Tests for route/direction navigation and the full scrape cycle.

use super::*;
use crate::domain::{Action, UNKNOWN_STATION};
use crate::scrape::mock::{MockSessionFactory, MockSite, MockTable};
use crate::scrape::{RetryPolicy, RetryScheduler, ScrapeCycle, aggregate};
use chrono::TimeZone;
use std::sync::Arc;
use std::time::Duration;

fn observed_at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 19, 22, 47, 31).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn controller() -> NavigationController {
    NavigationController::new(NavigationConfig::default())
}

fn find<'a>(results: &'a [RouteScrape], route: &str, direction: Direction) -> &'a RouteScrape {
    results
        .iter()
        .find(|r| r.route == route && r.direction == direction)
        .unwrap_or_else(|| panic!("no result for {route} {direction}"))
}

#[tokio::test]
async fn walks_every_route_up_then_down() {
    let site = MockSite::new(["Tokaido", "Tohoku", "Joetsu"]);

    let results = controller().run(&site, observed_at()).await.unwrap();

    let expected: Vec<(String, Direction)> = ["Tokaido", "Tohoku", "Joetsu"]
        .iter()
        .flat_map(|r| [(r.to_string(), Direction::Up), (r.to_string(), Direction::Down)])
        .collect();
    assert_eq!(site.fetches(), expected);
    assert_eq!(results.len(), 6);
}

#[tokio::test]
async fn timed_out_direction_keeps_sibling() {
    let site = MockSite::new(["Joetsu"])
        .with_rows(
            "Joetsu",
            Direction::Up,
            &[
                ("Toki 301", "Running between TAKASAKI and JOMO-KOGEN"),
                ("Tanigawa 401", "Stopped at ECHIGO-YUZAWA"),
            ],
        )
        .with_table("Joetsu", Direction::Down, MockTable::TimedOut);

    let results = controller().run(&site, observed_at()).await.unwrap();

    let up = find(&results, "Joetsu", Direction::Up);
    assert_eq!(up.outcome, StepOutcome::Table { rows: 2 });
    assert_eq!(up.records.len(), 2);

    let down = find(&results, "Joetsu", Direction::Down);
    assert_eq!(down.outcome, StepOutcome::TimedOut);
    assert!(down.records.is_empty());

    let snapshot = aggregate(results);
    assert_eq!(snapshot.records_for("Joetsu", Direction::Up).count(), 2);
    assert_eq!(snapshot.records_for("Joetsu", Direction::Down).count(), 0);
    assert!(snapshot.routes().contains_key("Joetsu"));
}

#[tokio::test]
async fn failures_are_isolated_per_step() {
    let site = MockSite::new(["Tokaido", "Sanyo"])
        .with_table("Tokaido", Direction::Up, MockTable::Fails("stale element".into()))
        .with_table("Tokaido", Direction::Down, MockTable::Panics)
        .with_rows("Sanyo", Direction::Up, &[("Mizuho 601", "Stopped at OKAYAMA")])
        .with_rows("Sanyo", Direction::Down, &[("Sakura 540", "Stopped at HIROSHIMA")]);

    let results = controller().run(&site, observed_at()).await.unwrap();

    assert_eq!(results.len(), 4);
    assert!(matches!(
        find(&results, "Tokaido", Direction::Up).outcome,
        StepOutcome::Failed(_)
    ));
    assert!(matches!(
        find(&results, "Tokaido", Direction::Down).outcome,
        StepOutcome::Failed(_)
    ));
    assert_eq!(find(&results, "Sanyo", Direction::Up).records.len(), 1);
    assert_eq!(find(&results, "Sanyo", Direction::Down).records.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_step_is_bounded() {
    let site = MockSite::new(["Hokuriku"])
        .with_table("Hokuriku", Direction::Up, MockTable::Hangs)
        .with_rows("Hokuriku", Direction::Down, &[("Kagayaki 501", "Stopped at NAGANO")]);
    let controller = NavigationController::new(
        NavigationConfig::default().with_iteration_timeout(Duration::from_secs(30)),
    );

    let results = controller.run(&site, observed_at()).await.unwrap();

    assert_eq!(find(&results, "Hokuriku", Direction::Up).outcome, StepOutcome::TimedOut);
    assert_eq!(find(&results, "Hokuriku", Direction::Down).records.len(), 1);
}

#[tokio::test]
async fn parses_and_filters_rows() {
    let site = MockSite::new(["Tokaido"]).with_rows(
        "Tokaido",
        Direction::Up,
        &[
            ("Nozomi  21", "Running between KYOTO and MAIBARA"),
            ("Kodama 799", "Service Ended"),
            ("Hikari 650", "Departed Nagoya at 22:40"),
            ("Nozomi 99", "???"),
        ],
    );

    let results = controller().run(&site, observed_at()).await.unwrap();
    let records = &find(&results, "Tokaido", Direction::Up).records;

    assert_eq!(records.len(), 3);

    assert_eq!(records[0].name, "Nozomi 21");
    assert_eq!(records[0].route, "Tokaido");
    assert_eq!(records[0].direction, Direction::Up);
    assert_eq!(records[0].position.station_a(), "KYOTO");
    assert_eq!(records[0].position.station_b(), Some("MAIBARA"));
    assert_eq!(records[0].event_time, hm(22, 47));

    assert_eq!(records[1].name, "Hikari 650");
    assert_eq!(records[1].position.action(), Action::Departed);
    assert_eq!(records[1].event_time, hm(22, 40));

    assert_eq!(records[2].name, "Nozomi 99");
    assert_eq!(records[2].position.station_a(), UNKNOWN_STATION);
    assert_eq!(records[2].position.action(), Action::Unknown);
}

#[tokio::test]
async fn discovery_failure_is_fatal_without_fallback() {
    let site = MockSite::new(["Tokaido"]).with_broken_discovery();

    let result = controller().run(&site, observed_at()).await;

    assert!(result.is_err());
    assert!(site.fetches().is_empty());
}

#[tokio::test]
async fn discovery_failure_uses_fallback() {
    let site = MockSite::new(["Tokaido"])
        .with_broken_discovery()
        .with_rows("Kyushu", Direction::Down, &[("Tsubame 301", "Stopped at KUMAMOTO")]);
    let controller = controller().with_fallback(StaticRouteCatalog::new([(
        "Kyushu",
        "https://example.test/kyushu",
    )]));

    let results = controller.run(&site, observed_at()).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(find(&results, "Kyushu", Direction::Down).records.len(), 1);
}

#[test]
fn empty_fallback_is_ignored() {
    let controller = controller().with_fallback(StaticRouteCatalog::default());
    assert!(controller.fallback.is_none());
}

fn cycle(site: &Arc<MockSite>, max_attempts: u32) -> ScrapeCycle<MockSessionFactory> {
    ScrapeCycle::new(
        MockSessionFactory::new(Arc::clone(site)),
        controller(),
        RetryScheduler::new(RetryPolicy::new(max_attempts, Duration::ZERO)),
    )
}

#[tokio::test]
async fn cycle_retries_with_fresh_sessions() {
    let site = Arc::new(
        MockSite::new(["Tohoku"])
            .with_rows("Tohoku", Direction::Up, &[("Hayabusa 5", "Stopped at SENDAI")])
            .with_failing_discoveries(2),
    );

    let outcome = cycle(&site, 3).run().await;

    let snapshot = outcome.value.expect("third attempt succeeds");
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(snapshot.records_for("Tohoku", Direction::Up).count(), 1);
    assert_eq!(site.opened(), 3);
    assert_eq!(site.closed(), 3);
}

#[tokio::test]
async fn cycle_survives_session_start_failures() {
    let site = Arc::new(
        MockSite::new(["Tohoku"])
            .with_rows("Tohoku", Direction::Down, &[("Komachi 20", "Stopped at MORIOKA")])
            .with_failing_opens(1),
    );

    let outcome = cycle(&site, 3).run().await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.attempts, 2);
    assert_eq!(site.opened(), 1);
    assert_eq!(site.closed(), 1);
}

#[tokio::test]
async fn cycle_exhausted_returns_no_snapshot() {
    let site = Arc::new(MockSite::new(["Tohoku"]).with_failing_discoveries(5));

    let outcome = cycle(&site, 3).run().await;

    assert!(outcome.value.is_none());
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.failures.len(), 3);
    assert_eq!(site.opened(), 3);
    assert_eq!(site.closed(), 3);
    assert!(site.fetches().is_empty());
}

#[tokio::test]
async fn cycle_closes_session_when_navigation_panics() {
    let site = Arc::new(MockSite::new(["Tohoku"]).with_panicking_discovery());

    let outcome = cycle(&site, 2).run().await;

    assert!(outcome.value.is_none());
    assert_eq!(outcome.attempts, 2);
    assert!(matches!(outcome.failures[0], ScrapeError::Session(_)));
    assert_eq!(site.opened(), 2);
    assert_eq!(site.closed(), 2);
}

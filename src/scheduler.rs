/*
 *  scheduler.rs
 *
 *  wxoled - weather at a glance
 *	(c) 2025-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

//! The display loop.
//!
//! One task owns everything: it refetches when the snapshot is stale, renders
//! the screens of the active [`Plan`] and pushes them to the panel, sleeping
//! between screens. Fetch and render never overlap.

use chrono::{Local, NaiveDateTime};
use clap::ValueEnum;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::display::{DisplayDriver, DisplayError};
use crate::frame::MonoFrame;
use crate::screens::{Projection, RenderError, Renderer, ScreenSpec};
use crate::weather::{Endpoint, FetchError, WeatherSnapshot, WeatherSource};

const SCREEN_DWELL: Duration = Duration::from_secs(4);
const SUMMARY_DWELL: Duration = Duration::from_secs(8);
const ALTERNATE_DWELL: Duration = Duration::from_secs(10);
const TOGGLE_INTERVAL: Duration = Duration::from_secs(10);
const TOGGLE_POLL: Duration = Duration::from_millis(100);
const SUMMARY_DAYS: u32 = 3;

const TITLE_NOW: &str = "Jetzt:";
const TITLE_DAYS: &str = "nächste Tage";
const TITLE_CLOCK: &str = "Uhrzeit";

/// Named loop configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Now, +1h, +2h, +3h, +6h, then the next three days.
    #[default]
    Rotation,
    /// Weather or clock, switching every ten seconds.
    Toggle,
    /// Weather then clock, ten seconds each.
    Alternating,
}

impl Preset {
    /// Only the rotation needs forecasts.
    pub fn endpoint(self) -> Endpoint {
        match self {
            Preset::Rotation => Endpoint::OneCall,
            Preset::Toggle | Preset::Alternating => Endpoint::Current,
        }
    }

    pub fn plan(self) -> Plan {
        match self {
            Preset::Rotation => {
                let hours = [
                    (1, "in einer Stunde:"),
                    (2, "in 2 Stunden:"),
                    (3, "in 3 Stunden:"),
                    (6, "in 6 Stunden:"),
                ];
                let mut steps = vec![Step::new(ScreenSpec::conditions(TITLE_NOW, Projection::Current), SCREEN_DWELL)];
                steps.extend(hours.iter().map(|&(n, title)| {
                    Step::new(ScreenSpec::conditions(title, Projection::HoursAhead(n)), SCREEN_DWELL)
                }));
                steps.push(Step::new(ScreenSpec::daily(TITLE_DAYS, SUMMARY_DAYS), SUMMARY_DWELL));
                Plan::Sequence(steps)
            }
            Preset::Alternating => Plan::Sequence(vec![
                Step::new(ScreenSpec::conditions(TITLE_NOW, Projection::Current), ALTERNATE_DWELL),
                Step::new(ScreenSpec::clock(TITLE_CLOCK), ALTERNATE_DWELL),
            ]),
            Preset::Toggle => Plan::Toggle {
                weather: ScreenSpec::conditions(TITLE_NOW, Projection::Current),
                time: ScreenSpec::clock(TITLE_CLOCK),
                interval: TOGGLE_INTERVAL,
                poll: TOGGLE_POLL,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub screen: ScreenSpec,
    pub dwell: Duration,
}

impl Step {
    pub fn new(screen: ScreenSpec, dwell: Duration) -> Self {
        Step { screen, dwell }
    }
}

/// What one loop iteration shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Every step in order, each held for its dwell.
    Sequence(Vec<Step>),
    /// One of two screens, flipped every `interval`, redrawn every `poll`.
    Toggle {
        weather: ScreenSpec,
        time: ScreenSpec,
        interval: Duration,
        poll: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Weather,
    Time,
}

impl DisplayMode {
    pub fn flipped(self) -> Self {
        match self {
            DisplayMode::Weather => DisplayMode::Time,
            DisplayMode::Time => DisplayMode::Weather,
        }
    }
}

/// When to hit the weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub interval: Duration,
    /// Earlier retry after a failed fetch; without it a stale snapshot is
    /// kept for a full interval.
    pub retry_after_failure: Option<Duration>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy { interval: Duration::from_secs(6 * 60 * 60), retry_after_failure: None }
    }
}

impl FetchPolicy {
    pub fn is_due(&self, state: &LoopState, now: Instant) -> bool {
        let Some(last) = state.last_fetch else {
            return true;
        };
        if state.snapshot.is_none() {
            return true;
        }
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.interval {
            return true;
        }
        state.last_fetch_failed && self.retry_after_failure.is_some_and(|retry| elapsed >= retry)
    }
}

/// Everything the loop carries between iterations.
#[derive(Debug, Clone)]
pub struct LoopState {
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    pub last_fetch: Option<Instant>,
    pub last_fetch_failed: bool,
    pub mode: DisplayMode,
    pub last_toggle: Instant,
}

impl LoopState {
    pub fn new(now: Instant) -> Self {
        LoopState {
            snapshot: None,
            last_fetch: None,
            last_fetch_failed: false,
            mode: DisplayMode::Weather,
            last_toggle: now,
        }
    }

    /// The attempt time is recorded either way; a failure keeps the old snapshot.
    ///
    /// The first snapshot starts the toggle over in weather mode, so time spent
    /// idle without data does not count towards the first flip.
    pub fn record_fetch(&mut self, result: Result<WeatherSnapshot, FetchError>, now: Instant) -> bool {
        self.last_fetch = Some(now);
        match result {
            Ok(snapshot) => {
                if self.snapshot.is_none() {
                    self.mode = DisplayMode::Weather;
                    self.last_toggle = now;
                }
                self.snapshot = Some(Arc::new(snapshot));
                self.last_fetch_failed = false;
                true
            }
            Err(e) => {
                error!("Error getting weather data: {}", e);
                if let Some(stale) = &self.snapshot {
                    warn!("Keeping weather data from {}", stale.fetched_at.format("%H:%M"));
                }
                self.last_fetch_failed = true;
                false
            }
        }
    }

    /// Flip the mode once if `interval` has passed since the last flip.
    pub fn toggle_if_due(&mut self, interval: Duration, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_toggle) < interval {
            return false;
        }
        self.mode = self.mode.flipped();
        self.last_toggle = now;
        debug!("display mode now {:?}", self.mode);
        true
    }
}

/// How an iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No snapshot, slept `idle_sleep`.
    IdleNoData,
    /// Every screen of the plan went out.
    Displayed,
    /// A screen could not be rendered or pushed; the rest was skipped.
    Failed,
}

#[derive(Debug, Error)]
enum ShowError {
    #[error("render: {0}")]
    Render(RenderError),
    #[error("display: {0}")]
    Display(DisplayError),
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct Scheduler<S, D> {
    source: S,
    driver: D,
    renderer: Renderer,
    plan: Plan,
    policy: FetchPolicy,
    idle_sleep: Duration,
    state: LoopState,
    last_frame: Option<MonoFrame>,
    clock: fn() -> NaiveDateTime,
}

impl<S: WeatherSource, D: DisplayDriver> Scheduler<S, D> {
    pub fn new(
        source: S,
        driver: D,
        renderer: Renderer,
        plan: Plan,
        policy: FetchPolicy,
        idle_sleep: Duration,
    ) -> Self {
        Scheduler {
            source,
            driver,
            renderer,
            plan,
            policy,
            idle_sleep,
            state: LoopState::new(Instant::now()),
            last_frame: None,
            clock: local_now,
        }
    }

    /// Wall clock used for the clock screen.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn fetch_due(&self, now: Instant) -> bool {
        self.policy.is_due(&self.state, now)
    }

    pub fn record_fetch(&mut self, result: Result<WeatherSnapshot, FetchError>, now: Instant) -> bool {
        self.state.record_fetch(result, now)
    }

    /// Refetch if due. Returns true when a fetch was attempted.
    pub async fn refresh(&mut self) -> bool {
        let now = Instant::now();
        if !self.fetch_due(now) {
            return false;
        }
        let result = self.source.fetch().await;
        self.record_fetch(result, now);
        true
    }

    /// Render `screen` and push it unless the panel already shows that frame.
    fn present(
        renderer: &mut Renderer,
        driver: &mut D,
        last_frame: &mut Option<MonoFrame>,
        screen: &ScreenSpec,
        snapshot: Option<&WeatherSnapshot>,
        now: NaiveDateTime,
    ) -> Result<(), ShowError> {
        let frame = renderer.render(screen, snapshot, now).map_err(ShowError::Render)?;
        if last_frame.as_ref() == Some(&frame) {
            return Ok(());
        }
        driver.show(&frame).map_err(ShowError::Display)?;
        *last_frame = Some(frame);
        Ok(())
    }

    /// One pass: refresh, then show the plan (or idle without data).
    pub async fn run_iteration(&mut self) -> Phase {
        self.refresh().await;

        let Some(snapshot) = self.state.snapshot.clone() else {
            debug!("No weather data, sleeping {:?}", self.idle_sleep);
            sleep(self.idle_sleep).await;
            return Phase::IdleNoData;
        };

        match &self.plan {
            Plan::Sequence(steps) => {
                for step in steps {
                    let shown = Self::present(
                        &mut self.renderer,
                        &mut self.driver,
                        &mut self.last_frame,
                        &step.screen,
                        Some(&snapshot),
                        (self.clock)(),
                    );
                    sleep(step.dwell).await;
                    if let Err(e) = shown {
                        error!("Error displaying weather data: {} ({})", e, step.screen.title);
                        return Phase::Failed;
                    }
                }
                Phase::Displayed
            }
            Plan::Toggle { weather, time, interval, poll } => {
                let screen = match self.state.mode {
                    DisplayMode::Weather => weather,
                    DisplayMode::Time => time,
                };
                let shown = Self::present(
                    &mut self.renderer,
                    &mut self.driver,
                    &mut self.last_frame,
                    screen,
                    Some(&snapshot),
                    (self.clock)(),
                );
                self.state.toggle_if_due(*interval, Instant::now());
                sleep(*poll).await;
                match shown {
                    Ok(()) => Phase::Displayed,
                    Err(e) => {
                        error!("Error displaying {}: {}", screen.title, e);
                        Phase::Failed
                    }
                }
            }
        }
    }

    /// Loop until `shutdown` resolves. An iteration in progress is dropped.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Display loop stopping");
                    break;
                }
                _ = self.run_iteration() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MockDriver;
    use crate::icons::IconResolver;
    use crate::weather::{DailyForecast, HourlyForecast};
    use chrono::NaiveDate;
    use std::collections::VecDeque;

    const HOUR: Duration = Duration::from_secs(3600);
    const MINUTE: Duration = Duration::from_secs(60);

    fn snapshot(description: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            description: description.to_string(),
            temperature_celsius: 13.2,
            humidity_percent: 80,
            icon_code: "10d".to_string(),
            hourly: (0..8)
                .map(|i| HourlyForecast {
                    hours_ahead: i,
                    temperature_celsius: 10.0 + i as f64,
                    humidity_percent: 50 + i as u8,
                    description: format!("Stunde {i}"),
                    icon_code: "03d".to_string(),
                })
                .collect(),
            daily: (0..4)
                .map(|i| DailyForecast {
                    day_offset: i,
                    temp_max: 18.0 + i as f64,
                    temp_min: 5.0,
                    icon_code: "01d".to_string(),
                })
                .collect(),
            fetched_at: Local::now(),
        }
    }

    /// Answers from a script: true is a good fetch, false a failed one.
    struct ScriptedSource {
        script: VecDeque<bool>,
        calls: usize,
    }

    impl ScriptedSource {
        fn new(script: &[bool]) -> Self {
            ScriptedSource { script: script.iter().copied().collect(), calls: 0 }
        }
    }

    impl WeatherSource for ScriptedSource {
        async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError> {
            self.calls += 1;
            match self.script.pop_front() {
                Some(true) => Ok(snapshot(&format!("Fetch {}", self.calls))),
                Some(false) => Err(FetchError::Invalid("service down".to_string())),
                None => Err(FetchError::Missing("script")),
            }
        }
    }

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(12, 30, 0).unwrap()
    }

    fn scheduler(script: &[bool], plan: Plan, policy: FetchPolicy) -> Scheduler<ScriptedSource, MockDriver> {
        let icons = std::env::temp_dir().join(format!("wxoled-sched-no-icons-{}", std::process::id()));
        Scheduler::new(
            ScriptedSource::new(script),
            MockDriver::new_with_size(128, 64).unwrap(),
            Renderer::new(IconResolver::new(icons), 128, 64),
            plan,
            policy,
            Duration::from_secs(10),
        )
        .with_clock(fixed_clock)
    }

    /// Paused clock, so only timer granularity separates the two.
    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    fn show_count(s: &Scheduler<ScriptedSource, MockDriver>) -> usize {
        s.driver().state().lock().unwrap().show_count
    }

    #[test]
    fn test_presets() {
        match Preset::Rotation.plan() {
            Plan::Sequence(steps) => {
                let titles: Vec<&str> = steps.iter().map(|s| s.screen.title.as_str()).collect();
                assert_eq!(
                    titles,
                    vec!["Jetzt:", "in einer Stunde:", "in 2 Stunden:", "in 3 Stunden:", "in 6 Stunden:", "nächste Tage"]
                );
                assert!(steps[..5].iter().all(|s| s.dwell == Duration::from_secs(4)));
                assert_eq!(steps[5].dwell, Duration::from_secs(8));
                assert_eq!(steps[4].screen, ScreenSpec::conditions("in 6 Stunden:", Projection::HoursAhead(6)));
            }
            other => panic!("rotation should be a sequence, got {other:?}"),
        }
        assert!(matches!(Preset::Toggle.plan(), Plan::Toggle { interval, poll, .. }
            if interval == Duration::from_secs(10) && poll == Duration::from_millis(100)));
        assert_eq!(Preset::Rotation.endpoint(), Endpoint::OneCall);
        assert_eq!(Preset::Alternating.endpoint(), Endpoint::Current);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_due_boundaries() {
        let policy = FetchPolicy::default();
        let t0 = Instant::now();
        let mut state = LoopState::new(t0);
        assert!(policy.is_due(&state, t0));

        state.record_fetch(Ok(snapshot("a")), t0);
        assert!(!policy.is_due(&state, t0 + 5 * HOUR + 59 * MINUTE));
        assert!(policy.is_due(&state, t0 + 6 * HOUR + MINUTE));
        assert!(policy.is_due(&state, t0 + 6 * HOUR));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_stale_snapshot() {
        let t0 = Instant::now();
        let mut state = LoopState::new(t0);
        state.record_fetch(Ok(snapshot("alt")), t0);

        let t1 = t0 + 6 * HOUR;
        assert!(!state.record_fetch(Err(FetchError::Invalid("x".into())), t1));
        assert_eq!(state.snapshot.as_ref().unwrap().description, "alt");
        assert_eq!(state.last_fetch, Some(t1));

        let default_policy = FetchPolicy::default();
        assert!(!default_policy.is_due(&state, t1 + 10 * MINUTE));
        assert!(default_policy.is_due(&state, t1 + 6 * HOUR));

        let eager = FetchPolicy { retry_after_failure: Some(5 * MINUTE), ..FetchPolicy::default() };
        assert!(!eager.is_due(&state, t1 + 4 * MINUTE));
        assert!(eager.is_due(&state, t1 + 5 * MINUTE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_flips_at_most_once() {
        let t0 = Instant::now();
        let mut state = LoopState::new(t0);
        let interval = Duration::from_secs(10);

        assert!(!state.toggle_if_due(interval, t0 + Duration::from_secs(9)));
        assert_eq!(state.mode, DisplayMode::Weather);

        // 25s late still means one flip
        assert!(state.toggle_if_due(interval, t0 + Duration::from_secs(25)));
        assert_eq!(state.mode, DisplayMode::Time);
        assert!(!state.toggle_if_due(interval, t0 + Duration::from_secs(25)));
        assert!(state.toggle_if_due(interval, t0 + Duration::from_secs(35)));
        assert_eq!(state.mode, DisplayMode::Weather);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_snapshot_restarts_toggle() {
        let t0 = Instant::now();
        let mut state = LoopState::new(t0);
        let t1 = t0 + Duration::from_secs(25);
        state.record_fetch(Err(FetchError::Invalid("down".into())), t0);
        state.record_fetch(Ok(snapshot("a")), t1);

        assert_eq!(state.mode, DisplayMode::Weather);
        assert_eq!(state.last_toggle, t1);
        assert!(!state.toggle_if_due(Duration::from_secs(10), t1 + Duration::from_secs(9)));

        // later snapshots leave the toggle alone
        let t2 = t1 + Duration::from_secs(12);
        assert!(state.toggle_if_due(Duration::from_secs(10), t2));
        state.record_fetch(Ok(snapshot("b")), t2 + Duration::from_secs(1));
        assert_eq!(state.mode, DisplayMode::Time);
        assert_eq!(state.last_toggle, t2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_holds_weather_after_idle_start() {
        let mut s = scheduler(&[false, false, true], Preset::Toggle.plan(), FetchPolicy::default());

        assert_eq!(s.run_iteration().await, Phase::IdleNoData);
        assert_eq!(s.run_iteration().await, Phase::IdleNoData);

        // a full interval of weather before the clock
        for _ in 0..100 {
            assert_eq!(s.run_iteration().await, Phase::Displayed);
            assert_eq!(s.state().mode, DisplayMode::Weather);
        }
        s.run_iteration().await;
        assert_eq!(s.state().mode, DisplayMode::Time);
        assert_eq!(show_count(&s), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_iteration() {
        let mut s = scheduler(&[true], Preset::Rotation.plan(), FetchPolicy::default());
        let start = Instant::now();

        assert_eq!(s.run_iteration().await, Phase::Displayed);
        assert_elapsed(start, Duration::from_secs(5 * 4 + 8));
        assert_eq!(show_count(&s), 6);
        assert_eq!(s.source().calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_only_after_interval() {
        let plan = Preset::Toggle.plan();
        let mut s = scheduler(&[true, true], plan, FetchPolicy::default());

        s.run_iteration().await;
        assert_eq!(s.source().calls, 1);

        tokio::time::advance(5 * HOUR + 59 * MINUTE).await;
        s.run_iteration().await;
        assert_eq!(s.source().calls, 1);

        tokio::time::advance(2 * MINUTE).await;
        s.run_iteration().await;
        assert_eq!(s.source().calls, 2);
        assert_eq!(s.state().snapshot.as_ref().unwrap().description, "Fetch 2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_data_sleeps_and_retries() {
        let mut s = scheduler(&[false, false, true], Preset::Rotation.plan(), FetchPolicy::default());

        let start = Instant::now();
        assert_eq!(s.run_iteration().await, Phase::IdleNoData);
        assert_elapsed(start, Duration::from_secs(10));
        assert_eq!(show_count(&s), 0);

        assert_eq!(s.run_iteration().await, Phase::IdleNoData);
        assert_eq!(s.run_iteration().await, Phase::Displayed);
        assert_eq!(s.source().calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_error_skips_rest_of_sequence() {
        let plan = Plan::Sequence(vec![
            Step::new(ScreenSpec::conditions("Jetzt:", Projection::Current), Duration::from_secs(4)),
            Step::new(ScreenSpec::conditions("in 12 Stunden:", Projection::HoursAhead(12)), Duration::from_secs(4)),
            Step::new(ScreenSpec::clock("Uhrzeit"), Duration::from_secs(4)),
        ]);
        let mut s = scheduler(&[true], plan, FetchPolicy::default());
        let start = Instant::now();

        assert_eq!(s.run_iteration().await, Phase::Failed);
        assert_elapsed(start, Duration::from_secs(8));
        assert_eq!(show_count(&s), 1);

        // the loop carries on
        assert_eq!(s.run_iteration().await, Phase::Failed);
        assert_eq!(show_count(&s), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_failure_is_not_fatal() {
        let mut s = scheduler(&[true], Preset::Alternating.plan(), FetchPolicy::default());
        s.driver().state().lock().unwrap().simulate_show_failure = true;

        assert_eq!(s.run_iteration().await, Phase::Failed);

        s.driver().state().lock().unwrap().simulate_show_failure = false;
        assert_eq!(s.run_iteration().await, Phase::Displayed);
        assert_eq!(show_count(&s), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_loop_switches_screens() {
        let mut s = scheduler(&[true], Preset::Toggle.plan(), FetchPolicy::default());

        // 10s worth of 100ms polls: weather pushed once, then the clock
        for _ in 0..101 {
            s.run_iteration().await;
        }
        assert_eq!(s.state().mode, DisplayMode::Time);
        assert_eq!(show_count(&s), 1);

        s.run_iteration().await;
        assert_eq!(show_count(&s), 2);
        let state = s.driver().state();
        let state = state.lock().unwrap();
        assert_ne!(state.shown[0], state.shown[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stops_on_shutdown() {
        let mut s = scheduler(&[true], Preset::Rotation.plan(), FetchPolicy::default());
        s.run_until(sleep(Duration::from_secs(30))).await;
        assert_eq!(s.source().calls, 1);
        assert!(show_count(&s) >= 6);
    }
}

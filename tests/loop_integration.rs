/*
 *  tests/loop_integration.rs
 *
 *  Integration tests: HTTP fetch through to frames on the mock panel
 *
 *  wxoled - weather at a glance
 *  (c) 2025-26 Stuart Hunter
 */

use std::path::PathBuf;
use std::time::Duration;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use wxoled::display::{DisplayDriver, DisplayDriverFactory, MockDriver};
use wxoled::icons::IconResolver;
use wxoled::screens::FontRole;
use wxoled::weather::{Endpoint, WeatherRequest};
use wxoled::{FetchPolicy, MonoFrame, Phase, Plan, Projection, Renderer, Scheduler, ScreenSpec, Step, WeatherClient};

const ONECALL: &str = r#"{
  "lat": 48.1833, "lon": 16.2844, "timezone": "Europe/Vienna",
  "current": {"dt": 1700000000, "temp": 13.2, "humidity": 80,
              "weather": [{"id": 500, "main": "Rain", "description": "Regen", "icon": "10d"}]},
  "hourly": [
    {"dt": 1700000000, "temp": 13.2, "humidity": 80, "weather": [{"description": "Regen", "icon": "10d"}]},
    {"dt": 1700003600, "temp": 12.4, "humidity": 82, "weather": [{"description": "Regen", "icon": "10d"}]},
    {"dt": 1700007200, "temp": 11.0, "humidity": 85, "weather": [{"description": "Nebel", "icon": "50d"}]}
  ],
  "daily": []
}"#;

const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <circle cx="32" cy="32" r="24" fill="#222"/>
</svg>"##;

/// Serves `responses` in order, one connection each.
async fn serve(responses: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => raw.extend_from_slice(&chunk[..n]),
                }
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
        }
    });
    base
}

fn client(base: String, endpoint: Endpoint) -> WeatherClient {
    WeatherClient::new(WeatherRequest {
        api_base: base,
        endpoint,
        api_key: "test".to_string(),
        latitude: 48.1833,
        longitude: 16.2844,
        lang: "de".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

fn icon_dir(name: &str, with_icon: bool) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wxoled-it-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    if with_icon {
        std::fs::write(dir.join("10d.svg"), ICON).unwrap();
    }
    dir
}

fn quick(screen: ScreenSpec) -> Step {
    Step::new(screen, Duration::from_millis(5))
}

/// Every lit pixel of `s` drawn alone at `at` is lit in `frame`.
fn shows(frame: &MonoFrame, s: &str, at: Point, role: FontRole) -> bool {
    let mut alone = MonoFrame::new(frame.width(), frame.height());
    Text::with_baseline(s, at, MonoTextStyle::new(role.font(), BinaryColor::On), Baseline::Top)
        .draw(&mut alone)
        .unwrap();
    alone.lit_pixels().all(|p| frame.is_on(p.0.x as u32, p.0.y as u32))
}

fn mock() -> MockDriver {
    let mut driver = MockDriver::new_with_size(128, 64).unwrap();
    driver.init().unwrap();
    driver
}

#[tokio::test]
async fn test_current_screen_end_to_end() {
    let base = serve(vec![("200 OK", ONECALL.to_string())]).await;
    let driver = mock();
    let state = driver.state();
    let plan = Plan::Sequence(vec![
        quick(ScreenSpec::conditions("Jetzt:", Projection::Current)),
        quick(ScreenSpec::conditions("in einer Stunde:", Projection::HoursAhead(1))),
    ]);
    let mut scheduler = Scheduler::new(
        client(base, Endpoint::OneCall),
        driver,
        Renderer::new(IconResolver::new(icon_dir("e2e", true)), 128, 64),
        plan,
        FetchPolicy::default(),
        Duration::from_millis(10),
    );

    assert_eq!(scheduler.run_iteration().await, Phase::Displayed);

    let state = state.lock().unwrap();
    assert_eq!(state.show_count, 2);
    let now = &state.shown[0];
    assert!(shows(now, "Jetzt:", Point::new(0, 0), FontRole::Title));
    assert!(shows(now, "Regen", Point::new(0, 16), FontRole::Body));
    assert!(shows(now, "14°C", Point::new(48, 32), FontRole::Value));
    assert!(shows(now, "80%", Point::new(48, 48), FontRole::Value));

    // icon drawn in its 32x32 box, centre lit, corners dark
    let icon_box = Rectangle::new(Point::new(8, 32), Size::new(32, 32));
    assert!(now.count_on_in(&icon_box) > 100);
    assert!(now.is_on(8 + 16, 32 + 16));
    assert!(!now.is_on(8, 32));

    let next_hour = &state.shown[1];
    assert!(shows(next_hour, "13°C", Point::new(48, 32), FontRole::Value));
    assert!(shows(next_hour, "82%", Point::new(48, 48), FontRole::Value));
}

#[tokio::test]
async fn test_missing_icon_leaves_box_dark() {
    let base = serve(vec![("200 OK", ONECALL.to_string())]).await;
    let driver = mock();
    let state = driver.state();
    let mut scheduler = Scheduler::new(
        client(base, Endpoint::OneCall),
        driver,
        Renderer::new(IconResolver::new(icon_dir("noicon", false)), 128, 64),
        Plan::Sequence(vec![quick(ScreenSpec::conditions("Jetzt:", Projection::Current))]),
        FetchPolicy::default(),
        Duration::from_millis(10),
    );

    assert_eq!(scheduler.run_iteration().await, Phase::Displayed);
    let state = state.lock().unwrap();
    let icon_box = Rectangle::new(Point::new(8, 32), Size::new(32, 32));
    assert_eq!(state.shown[0].count_on_in(&icon_box), 0);
    assert!(shows(&state.shown[0], "14°C", Point::new(48, 32), FontRole::Value));
}

#[tokio::test]
async fn test_server_error_then_recovery() {
    let base = serve(vec![
        ("503 Service Unavailable", "{}".to_string()),
        ("200 OK", ONECALL.to_string()),
    ])
    .await;
    let driver = mock();
    let state = driver.state();
    let mut scheduler = Scheduler::new(
        client(base, Endpoint::OneCall),
        driver,
        Renderer::new(IconResolver::new(icon_dir("retry", false)), 128, 64),
        Plan::Sequence(vec![quick(ScreenSpec::daily("nächste Tage", 3))]),
        FetchPolicy::default(),
        Duration::from_millis(10),
    );

    assert_eq!(scheduler.run_iteration().await, Phase::IdleNoData);
    assert!(scheduler.state().last_fetch_failed);
    assert_eq!(state.lock().unwrap().show_count, 0);

    // snapshot arrives, but it has no daily forecasts
    assert_eq!(scheduler.run_iteration().await, Phase::Failed);
    assert!(!scheduler.state().last_fetch_failed);
    assert_eq!(scheduler.state().snapshot.as_ref().unwrap().description, "Regen");
    assert_eq!(state.lock().unwrap().show_count, 0);
}

#[tokio::test]
async fn test_factory_mock_captures_frames() {
    let frames = std::env::temp_dir().join(format!("wxoled-it-frames-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&frames);
    let config = wxoled::config::DisplayConfig {
        driver: Some(wxoled::config::DriverKind::Mock),
        frames_dir: Some(frames.clone()),
        ..Default::default()
    };
    let mut driver = DisplayDriverFactory::create_from_config(&config).unwrap();
    DisplayDriverFactory::bring_up(&mut driver, &config).unwrap();

    let mut renderer = Renderer::new(IconResolver::new(icon_dir("frames", false)), 128, 64);
    let at = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(21, 45, 0).unwrap();
    let frame = renderer.render(&ScreenSpec::clock("Uhrzeit"), None, at).unwrap();
    driver.show(&frame).unwrap();

    let pbm = std::fs::read_to_string(frames.join("frame-000001.pbm")).unwrap();
    assert!(pbm.starts_with("P1\n128 64\n"));
    assert!(shows(&frame, "Mo 19/10", Point::new(0, 44), FontRole::Value));
}

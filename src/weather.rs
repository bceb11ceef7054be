/*
 *  weather.rs
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
use chrono::{DateTime, Local, Utc};
use log::{debug, info};
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Which OpenWeatherMap resource to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Present conditions only.
    Current,
    /// Present conditions plus hourly and daily forecasts.
    OneCall,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "/data/2.5/weather",
            Endpoint::OneCall => "/data/2.5/onecall",
        }
    }
}

/// Everything the screens need from one successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub description: String,
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
    pub icon_code: String,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub fetched_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub hours_ahead: u32,
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
    pub description: String,
    pub icon_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub day_offset: u32,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon_code: String,
}

impl WeatherSnapshot {
    pub fn hour(&self, hours_ahead: u32) -> Option<&HourlyForecast> {
        self.hourly.iter().find(|h| h.hours_ahead == hours_ahead)
    }

    pub fn day(&self, day_offset: u32) -> Option<&DailyForecast> {
        self.daily.iter().find(|d| d.day_offset == day_offset)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather service answered {0}")]
    Status(StatusCode),
    #[error("JSON deserialization error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing weather data: {0}")]
    Missing(&'static str),
    #[error("invalid weather data: {0}")]
    Invalid(String),
}

/// Anything the loop can pull a snapshot from.
#[allow(async_fn_in_trait)]
pub trait WeatherSource {
    async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError>;
}

// wire format, only the fields we read

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    weather: Vec<OwmCondition>,
    main: OwmMain,
}

#[derive(Debug, Deserialize)]
struct OwmPoint {
    temp: f64,
    humidity: f64,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmDayTemp {
    max: f64,
    min: f64,
}

#[derive(Debug, Deserialize)]
struct OwmDay {
    temp: OwmDayTemp,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmOneCallResponse {
    current: OwmPoint,
    #[serde(default)]
    hourly: Vec<OwmPoint>,
    #[serde(default)]
    daily: Vec<OwmDay>,
}

fn first_condition(conditions: Vec<OwmCondition>, what: &'static str) -> Result<OwmCondition, FetchError> {
    conditions.into_iter().next().ok_or(FetchError::Missing(what))
}

fn humidity(value: f64) -> Result<u8, FetchError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value.round() as u8)
    } else {
        Err(FetchError::Invalid(format!("humidity {value} outside 0..=100")))
    }
}

/// Parse a `/data/2.5/weather` body.
pub fn parse_current(body: &str, fetched_at: DateTime<Local>) -> Result<WeatherSnapshot, FetchError> {
    let raw: OwmCurrentResponse = serde_json::from_str(body)?;
    let condition = first_condition(raw.weather, "weather[0]")?;
    Ok(WeatherSnapshot {
        description: condition.description,
        temperature_celsius: raw.main.temp,
        humidity_percent: humidity(raw.main.humidity)?,
        icon_code: condition.icon,
        hourly: Vec::new(),
        daily: Vec::new(),
        fetched_at,
    })
}

/// Parse a `/data/2.5/onecall` body. `hourly[i]` is i hours ahead, `daily[i]` is i days ahead.
pub fn parse_onecall(body: &str, fetched_at: DateTime<Local>) -> Result<WeatherSnapshot, FetchError> {
    let raw: OwmOneCallResponse = serde_json::from_str(body)?;
    let current = first_condition(raw.current.weather, "current.weather[0]")?;

    let hourly = raw
        .hourly
        .into_iter()
        .enumerate()
        .map(|(i, point)| {
            let condition = first_condition(point.weather, "hourly.weather[0]")?;
            Ok(HourlyForecast {
                hours_ahead: i as u32,
                temperature_celsius: point.temp,
                humidity_percent: humidity(point.humidity)?,
                description: condition.description,
                icon_code: condition.icon,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    let daily = raw
        .daily
        .into_iter()
        .enumerate()
        .map(|(i, day)| {
            let condition = first_condition(day.weather, "daily.weather[0]")?;
            Ok(DailyForecast {
                day_offset: i as u32,
                temp_max: day.temp.max,
                temp_min: day.temp.min,
                icon_code: condition.icon,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    Ok(WeatherSnapshot {
        description: current.description,
        temperature_celsius: raw.current.temp,
        humidity_percent: humidity(raw.current.humidity)?,
        icon_code: current.icon,
        hourly,
        daily,
        fetched_at,
    })
}

pub fn parse_response(endpoint: Endpoint, body: &str, fetched_at: DateTime<Local>) -> Result<WeatherSnapshot, FetchError> {
    match endpoint {
        Endpoint::Current => parse_current(body, fetched_at),
        Endpoint::OneCall => parse_onecall(body, fetched_at),
    }
}

/// Connection settings for [`WeatherClient`].
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub api_base: String,
    pub endpoint: Endpoint,
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub lang: String,
    pub timeout: Duration,
}

/// OpenWeatherMap client, one GET per fetch and no retries.
#[derive(Debug)]
pub struct WeatherClient {
    client: Client,
    request: WeatherRequest,
}

impl WeatherClient {
    pub fn new(request: WeatherRequest) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, header::HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(request.timeout)
            .build()?;

        Ok(WeatherClient { client, request })
    }

    pub fn endpoint(&self) -> Endpoint {
        self.request.endpoint
    }

    /// Full request URL; `cache_buster` lands in the `_` parameter.
    pub fn request_url(&self, cache_buster: i64) -> Result<Url, FetchError> {
        let r = &self.request;
        let base = format!("{}{}", r.api_base.trim_end_matches('/'), r.endpoint.path());
        let params = [
            ("lat", r.latitude.to_string()),
            ("lon", r.longitude.to_string()),
            ("appid", r.api_key.clone()),
            ("units", "metric".to_string()),
            ("lang", r.lang.clone()),
            ("_", cache_buster.to_string()),
        ];
        Url::parse_with_params(&base, &params)
            .map_err(|e| FetchError::Invalid(format!("bad API base {:?}: {e}", r.api_base)))
    }
}

impl WeatherSource for WeatherClient {
    async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError> {
        info!("Fetching weather data from {}...", self.request.endpoint.path());
        let url = self.request_url(Utc::now().timestamp())?;

        // reqwest errors carry the URL, and with it the appid
        let response = self.client.get(url).send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await.map_err(|e| e.without_url())?;
        debug!("weather response: {} bytes", body.len());

        let snapshot = parse_response(self.request.endpoint, &body, Local::now())?;
        info!(
            "Weather data fetched successfully: {} {:.1}°C {}%",
            snapshot.description, snapshot.temperature_celsius, snapshot.humidity_percent
        );
        Ok(snapshot)
    }
}

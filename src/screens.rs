/*
 *  screens.rs
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

//! Screen layouts for the 128x64 panel.
//!
//! A [`Renderer`] turns a [`ScreenSpec`], the current snapshot (if any) and the
//! local time into a [`MonoFrame`]. Nothing here touches the panel; apart from
//! icon file reads, the same inputs always give the same frame.

use chrono::{Datelike, NaiveDateTime};
use embedded_graphics::{
    mono_font::{
        iso_8859_1::{FONT_10X20, FONT_6X13, FONT_7X14_BOLD, FONT_9X15_BOLD},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use std::fmt::Debug;
use thiserror::Error;

use crate::frame::MonoFrame;
use crate::icons::IconResolver;
use crate::weather::WeatherSnapshot;

pub const CONDITIONS_ICON_SIZE: u32 = 32;
pub const DAILY_ICON_SIZE: u32 = 16;

// conditions layout
const TITLE_AT: Point = Point::new(0, 0);
const DESCRIPTION_AT: Point = Point::new(0, 16);
const CONDITIONS_ICON_AT: Point = Point::new(8, 32);
const TEMPERATURE_AT: Point = Point::new(48, 32);
const HUMIDITY_AT: Point = Point::new(48, 48);

// daily layout, per row i the y is ROW_PITCH * i
const ROW_PITCH: i32 = 16;
const DAILY_ICON_X: i32 = 0;
const DAILY_MAX_X: i32 = 24;
const DAILY_MIN_X: i32 = 76;

const CLOCK_TIME_Y: i32 = 18;
const CLOCK_DATE_Y: i32 = 44;

/// Two-letter German weekday tokens, Monday first.
pub const WEEKDAY_TOKENS: [&str; 7] = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];

/// Weekday token by ordinal from Monday. Panics on an ordinal past Sunday.
pub fn weekday_token(ordinal: usize) -> &'static str {
    match WEEKDAY_TOKENS.get(ordinal) {
        Some(token) => token,
        None => panic!("weekday ordinal {ordinal} out of range 0..7"),
    }
}

/// Rounded up, and never shown as `-0`.
pub fn format_temp(celsius: f64) -> String {
    format!("{}°C", celsius.ceil() as i64)
}

pub fn format_humidity(percent: u8) -> String {
    format!("{percent}%")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Title,
    Body,
    Value,
    Clock,
}

impl FontRole {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            FontRole::Title => &FONT_7X14_BOLD,
            FontRole::Body => &FONT_6X13,
            FontRole::Value => &FONT_9X15_BOLD,
            FontRole::Clock => &FONT_10X20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Current,
    HoursAhead(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenContent {
    Conditions(Projection),
    DailySummary { days: u32 },
    Clock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSpec {
    pub title: String,
    pub content: ScreenContent,
}

impl ScreenSpec {
    pub fn conditions(title: &str, projection: Projection) -> Self {
        ScreenSpec { title: title.to_string(), content: ScreenContent::Conditions(projection) }
    }

    pub fn daily(title: &str, days: u32) -> Self {
        ScreenSpec { title: title.to_string(), content: ScreenContent::DailySummary { days } }
    }

    pub fn clock(title: &str) -> Self {
        ScreenSpec { title: title.to_string(), content: ScreenContent::Clock }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no weather data to render")]
    NoData,
    #[error("no forecast {0} hours ahead")]
    MissingHour(u32),
    #[error("wanted {wanted} forecast days, snapshot has {available}")]
    MissingDays { wanted: u32, available: u32 },
    #[error("drawing failed: {0}")]
    Draw(String),
}

/// The fields a conditions screen shows, from now or from an hourly slot.
struct Conditions<'a> {
    description: &'a str,
    temperature_celsius: f64,
    humidity_percent: u8,
    icon_code: &'a str,
}

fn conditions(snapshot: &WeatherSnapshot, projection: Projection) -> Result<Conditions<'_>, RenderError> {
    match projection {
        Projection::Current => Ok(Conditions {
            description: &snapshot.description,
            temperature_celsius: snapshot.temperature_celsius,
            humidity_percent: snapshot.humidity_percent,
            icon_code: &snapshot.icon_code,
        }),
        Projection::HoursAhead(n) => {
            let hour = snapshot.hour(n).ok_or(RenderError::MissingHour(n))?;
            Ok(Conditions {
                description: &hour.description,
                temperature_celsius: hour.temperature_celsius,
                humidity_percent: hour.humidity_percent,
                icon_code: &hour.icon_code,
            })
        }
    }
}

fn text<D>(target: &mut D, s: &str, at: Point, role: FontRole) -> Result<(), RenderError>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: Debug,
{
    let style = MonoTextStyle::new(role.font(), BinaryColor::On);
    Text::with_baseline(s, at, style, Baseline::Top)
        .draw(target)
        .map_err(|e| RenderError::Draw(format!("text {s:?}: {e:?}")))?;
    Ok(())
}

pub struct Renderer {
    icons: IconResolver,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(icons: IconResolver, width: u32, height: u32) -> Self {
        Renderer { icons, width, height }
    }

    pub fn render(
        &mut self,
        screen: &ScreenSpec,
        snapshot: Option<&WeatherSnapshot>,
        now: NaiveDateTime,
    ) -> Result<MonoFrame, RenderError> {
        let mut frame = MonoFrame::new(self.width, self.height);
        match &screen.content {
            ScreenContent::Conditions(projection) => {
                let snapshot = snapshot.ok_or(RenderError::NoData)?;
                self.draw_conditions(&mut frame, &screen.title, snapshot, *projection)?;
            }
            ScreenContent::DailySummary { days } => {
                let snapshot = snapshot.ok_or(RenderError::NoData)?;
                self.draw_daily(&mut frame, &screen.title, snapshot, *days)?;
            }
            ScreenContent::Clock => draw_clock(&mut frame, &screen.title, now)?,
        }
        Ok(frame)
    }

    fn draw_conditions(
        &mut self,
        frame: &mut MonoFrame,
        title: &str,
        snapshot: &WeatherSnapshot,
        projection: Projection,
    ) -> Result<(), RenderError> {
        let c = conditions(snapshot, projection)?;
        text(frame, title, TITLE_AT, FontRole::Title)?;
        text(frame, c.description, DESCRIPTION_AT, FontRole::Body)?;
        text(frame, &format_temp(c.temperature_celsius), TEMPERATURE_AT, FontRole::Value)?;
        text(frame, &format_humidity(c.humidity_percent), HUMIDITY_AT, FontRole::Value)?;
        self.icons
            .resolve(c.icon_code, CONDITIONS_ICON_SIZE)
            .draw(frame, CONDITIONS_ICON_AT)
            .map_err(|e| RenderError::Draw(format!("{e:?}")))
    }

    fn draw_daily(
        &mut self,
        frame: &mut MonoFrame,
        title: &str,
        snapshot: &WeatherSnapshot,
        days: u32,
    ) -> Result<(), RenderError> {
        // day 0 is today, rows start tomorrow
        let rows = (1..=days)
            .map(|offset| snapshot.day(offset))
            .collect::<Option<Vec<_>>>()
            .ok_or(RenderError::MissingDays {
                wanted: days,
                available: snapshot.daily.iter().filter(|d| d.day_offset >= 1).count() as u32,
            })?;

        text(frame, title, TITLE_AT, FontRole::Title)?;
        for (i, day) in rows.iter().enumerate() {
            let y = ROW_PITCH * (i as i32 + 1);
            text(frame, &format_temp(day.temp_max), Point::new(DAILY_MAX_X, y), FontRole::Body)?;
            text(frame, &format_temp(day.temp_min), Point::new(DAILY_MIN_X, y), FontRole::Body)?;
            self.icons
                .resolve(&day.icon_code, DAILY_ICON_SIZE)
                .draw(frame, Point::new(DAILY_ICON_X, y))
                .map_err(|e| RenderError::Draw(format!("{e:?}")))?;
        }
        Ok(())
    }
}

fn draw_clock(frame: &mut MonoFrame, title: &str, now: NaiveDateTime) -> Result<(), RenderError> {
    text(frame, title, TITLE_AT, FontRole::Title)?;

    let hhmm = now.format("%H:%M").to_string();
    let glyph_w = FontRole::Clock.font().character_size.width as i32;
    let x = (frame.width() as i32 - glyph_w * hhmm.chars().count() as i32).max(0) / 2;
    text(frame, &hhmm, Point::new(x, CLOCK_TIME_Y), FontRole::Clock)?;

    let token = weekday_token(now.weekday().num_days_from_monday() as usize);
    let date = format!("{} {}", token, now.format("%d/%m"));
    text(frame, &date, Point::new(0, CLOCK_DATE_Y), FontRole::Value)
}

/*
 *  lib.rs
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

//! Weather and clock screens for small monochrome OLED panels.

pub mod config;
pub mod display;
pub mod frame;
pub mod icons;
pub mod scheduler;
pub mod screens;
pub mod svgimage;
pub mod weather;

pub use frame::MonoFrame;
pub use scheduler::{FetchPolicy, LoopState, Phase, Plan, Preset, Scheduler, Step};
pub use screens::{Projection, RenderError, Renderer, ScreenContent, ScreenSpec};
pub use weather::{FetchError, WeatherClient, WeatherSnapshot, WeatherSource};

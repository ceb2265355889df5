// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{error::Error, fmt, sync::Arc};

use tracing::{debug, info};

use crate::beat::Strength;

pub mod mock;
pub mod trackpad;

/// A haptic device that can fire a single tap.
pub trait Actuator: fmt::Display + std::marker::Send + std::marker::Sync {
    /// Returns the name of the device.
    fn name(&self) -> String;

    /// Fires one tap at the given strength and intensity.
    fn actuate(&self, strength: Strength, intensity: f64) -> Result<(), Box<dyn Error>>;
}

/// Gets the actuator with the given name, or probes the platform for a
/// trackpad if no name is given. Returns None if nothing is available.
pub fn get_device(name: Option<&str>) -> Option<Arc<dyn Actuator>> {
    if let Some(name) = name {
        if name.starts_with("mock") {
            return Some(Arc::new(mock::Device::get(name)));
        }
    }

    match trackpad::Device::find() {
        Some(device) => {
            info!(device = %device, "Found haptic trackpad.");
            Some(Arc::new(device))
        }
        None => {
            debug!("No haptic device available.");
            None
        }
    }
}

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
use std::{
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use tokio::time::Instant;
use tracing::info;

use crate::beat::Strength;

/// A single recorded tap.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuation {
    pub strength: Strength,
    pub intensity: f64,
    pub at: Instant,
}

/// A mock device. Doesn't actually vibrate anything, just records what it was asked to do.
#[derive(Clone)]
pub struct Device {
    name: String,
    actuations: Arc<Mutex<Vec<Actuation>>>,
    failing: Arc<AtomicBool>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            actuations: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    /// Gets every actuation so far.
    pub fn actuations(&self) -> Vec<Actuation> {
        self.actuations
            .lock()
            .expect("unable to get actuations lock")
            .clone()
    }

    #[cfg(test)]
    /// Makes every following actuation fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

impl super::Actuator for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn actuate(&self, strength: Strength, intensity: f64) -> Result<(), Box<dyn Error>> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(format!("mock device {} failed to actuate", self.name).into());
        }

        info!(
            device = self.name,
            strength = strength.level(),
            intensity,
            "Actuating."
        );
        self.actuations
            .lock()
            .expect("unable to get actuations lock")
            .push(Actuation {
                strength,
                intensity,
                at: Instant::now(),
            });
        Ok(())
    }
}

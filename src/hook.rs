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
use std::fmt;
use std::io::Read;

use serde::Deserialize;
use tracing::{debug, error};

use crate::config::Agent;
use crate::haptic::HapticEngine;

/// The lifecycle events that can be mapped to patterns in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The agent finished its turn.
    Stop,
    /// The agent needs the user, e.g. for a permission request.
    Prompt,
}

impl LifecycleEvent {
    /// The key used for this event in the config's `events` map.
    pub fn key(&self) -> &'static str {
        match self {
            LifecycleEvent::Stop => "stop",
            LifecycleEvent::Prompt => "prompt",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Invalid hook payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The JSON a Claude Code hook receives on stdin.
#[derive(Deserialize, Debug)]
pub struct ClaudeHookInput {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub transcript_path: String,
    #[serde(default)]
    pub cwd: String,
    pub hook_event_name: String,
    pub notification_type: Option<String>,
}

impl ClaudeHookInput {
    /// Maps the hook to a lifecycle event. Other hooks are ignored.
    pub fn event(&self) -> Option<LifecycleEvent> {
        match self.hook_event_name.as_str() {
            "Stop" => Some(LifecycleEvent::Stop),
            "Notification" => Some(LifecycleEvent::Prompt),
            _ => None,
        }
    }
}

/// An event from the OpenCode plugin bus.
#[derive(Deserialize, Debug)]
pub struct OpenCodeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

impl OpenCodeEvent {
    /// Maps the event to a lifecycle event. Other events are ignored.
    pub fn event(&self) -> Option<LifecycleEvent> {
        match self.event_type.as_str() {
            "session.idle" => Some(LifecycleEvent::Stop),
            "permission.updated" | "question.asked" => Some(LifecycleEvent::Prompt),
            _ => None,
        }
    }
}

/// OpenCode hands plugins `{ "event": {...} }`, but a bare event is accepted too.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OpenCodePayload {
    Wrapped { event: OpenCodeEvent },
    Bare(OpenCodeEvent),
}

impl OpenCodePayload {
    fn into_event(self) -> OpenCodeEvent {
        match self {
            OpenCodePayload::Wrapped { event } => event,
            OpenCodePayload::Bare(event) => event,
        }
    }
}

/// Parses a hook payload for the given agent and maps it to a lifecycle event.
pub fn event_from_payload(
    agent: Agent,
    payload: &str,
) -> Result<Option<LifecycleEvent>, HookError> {
    let event = match agent {
        Agent::Claude => {
            let input: ClaudeHookInput = serde_json::from_str(payload)?;
            debug!(
                session_id = input.session_id,
                hook_event_name = input.hook_event_name,
                notification_type = input.notification_type,
                "Received Claude hook."
            );
            input.event()
        }
        Agent::Opencode => {
            let event = serde_json::from_str::<OpenCodePayload>(payload)?.into_event();
            debug!(event_type = event.event_type, "Received OpenCode event.");
            event.event()
        }
    };

    if event.is_none() {
        debug!("Hook is not mapped to a lifecycle event.");
    }
    Ok(event)
}

/// Reads a hook payload and plays the mapped event. Hooks must never fail the
/// agent, so errors are logged and dropped.
pub async fn handle_hook<R: Read>(engine: &HapticEngine, agent: Agent, mut reader: R) {
    let mut payload = String::new();
    if let Err(e) = reader.read_to_string(&mut payload) {
        error!(err = %e, "Unable to read hook payload.");
        return;
    }

    match event_from_payload(agent, &payload) {
        Ok(Some(event)) => {
            debug!(event = %event, "Triggering event.");
            engine.trigger_for_event(event.key()).await;
        }
        Ok(None) => {}
        Err(e) => error!(err = %e, "Unable to handle hook."),
    }
}

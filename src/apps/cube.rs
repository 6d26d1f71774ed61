//! Rotating cube driven by a client-side 3D widget.
//!
//! The widget lives entirely in the browser. State changes here are mirrored
//! to it through `setColor` / `setSpeed` commands relayed over the event
//! stream.

use crate::error::ReduceError;
use crate::executor::{CommandRegistry, RegistryError};
use crate::message::{Command, Message};
use crate::mvi::{AppState, Intent, Reducer, Transition};
use crate::runtime::EventBus;
use crate::view::{Node, View};

use super::text_value;

pub const SET_COLOR: &str = "setColor";
pub const SET_SPEED: &str = "setSpeed";

#[derive(Debug, Clone, PartialEq)]
pub struct CubeState {
    pub color: String,
    pub rotation_speed: f64,
}

impl Default for CubeState {
    fn default() -> Self {
        Self {
            color: "#ff0000".to_string(),
            rotation_speed: 1.0,
        }
    }
}

impl AppState for CubeState {}

pub enum CubeIntent {
    ChangeColor(String),
    ChangeSpeed(f64),
}

impl Intent for CubeIntent {
    fn from_message(message: &Message) -> Result<Option<Self>, ReduceError> {
        let action = message.action.as_str();
        let intent = match action {
            "changeColor" => {
                let color = text_value(message)?.to_ascii_lowercase();
                if !is_hex_color(&color) {
                    return Err(ReduceError::invalid(action, "expected a #rrggbb color"));
                }
                CubeIntent::ChangeColor(color)
            }
            "changeSpeed" => {
                let speed = message
                    .value
                    .as_ref()
                    .ok_or_else(|| ReduceError::MissingValue {
                        action: action.to_string(),
                    })?
                    .to_f64()
                    .filter(|speed| speed.is_finite() && *speed >= 0.0)
                    .ok_or_else(|| {
                        ReduceError::invalid(action, "speed must be a non-negative number")
                    })?;
                CubeIntent::ChangeSpeed(speed)
            }
            _ => return Ok(None),
        };
        Ok(Some(intent))
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cube;

impl Reducer for Cube {
    type State = CubeState;
    type Intent = CubeIntent;

    fn reduce(&self, state: &CubeState, intent: CubeIntent) -> Result<Transition<CubeState>, ReduceError> {
        match intent {
            CubeIntent::ChangeColor(color) => {
                let command = Command::new(SET_COLOR).with_field("color", color.as_str());
                Ok(Transition::with_command(
                    CubeState {
                        color,
                        ..state.clone()
                    },
                    command,
                ))
            }
            CubeIntent::ChangeSpeed(speed) => Ok(Transition::with_command(
                CubeState {
                    rotation_speed: speed,
                    ..state.clone()
                },
                Command::new(SET_SPEED).with_field("speed", speed),
            )),
        }
    }
}

impl View<CubeState> for Cube {
    fn view(&self, state: &CubeState) -> Node {
        Node::element("div").children([
            Node::element("h1").with_text("Rotating Cube"),
            Node::element("scene-3d")
                .attr("id", "cube")
                .attr("color", state.color.as_str())
                .attr("speed", state.rotation_speed.to_string()),
            Node::element("div").attr("id", "controls").children([
                Node::element("input")
                    .attr("id", "color-input")
                    .attr("type", "color")
                    .attr("value", state.color.as_str())
                    .attr("onChange", "changeColor"),
                Node::element("input")
                    .attr("id", "speed-input")
                    .attr("type", "range")
                    .attr("min", "0")
                    .attr("max", "10")
                    .attr("step", "0.1")
                    .attr("value", state.rotation_speed.to_string())
                    .attr("onChange", "changeSpeed"),
            ]),
            Node::element("p")
                .attr("id", "status")
                .with_text(format!("Color: {}, Speed: {}", state.color, state.rotation_speed)),
        ])
    }
}

/// Both commands are widget calls executed by the client.
pub fn registry(bus: &EventBus) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.relay_to_client(SET_COLOR, bus)?;
    registry.relay_to_client(SET_SPEED, bus)?;
    Ok(registry)
}

//! Name + wall-clock demo.
//!
//! `newTime` asks the host for the current time through the `getTime`
//! command; the handler answers with a `setTime` message. Once both a name
//! and a time are known, changing the name asks the client to show an alert.

use chrono::Local;

use crate::error::ReduceError;
use crate::executor::{CommandRegistry, RegistryError};
use crate::message::{Command, Message};
use crate::mvi::{AppState, Intent, Reducer, Transition};
use crate::runtime::EventBus;
use crate::view::{Node, View};

use super::text_value;

pub const GET_TIME: &str = "getTime";
pub const SHOW_MESSAGE: &str = "showMessage";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockState {
    pub name: String,
    pub time: String,
}

impl AppState for ClockState {}

pub enum ClockIntent {
    ChangeName(String),
    NewTime,
    SetTime(String),
}

impl Intent for ClockIntent {
    fn from_message(message: &Message) -> Result<Option<Self>, ReduceError> {
        let intent = match message.action.as_str() {
            "changeName" => ClockIntent::ChangeName(text_value(message)?),
            "newTime" => ClockIntent::NewTime,
            "setTime" => ClockIntent::SetTime(text_value(message)?),
            _ => return Ok(None),
        };
        Ok(Some(intent))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Clock;

impl Reducer for Clock {
    type State = ClockState;
    type Intent = ClockIntent;

    fn reduce(&self, state: &ClockState, intent: ClockIntent) -> Result<Transition<ClockState>, ReduceError> {
        match intent {
            ClockIntent::ChangeName(name) => {
                let next = ClockState {
                    name,
                    time: state.time.clone(),
                };
                if next.name.is_empty() || next.time.is_empty() {
                    return Ok(Transition::next(next));
                }
                let alert = Command::new(SHOW_MESSAGE).with_field(
                    "message",
                    format!("Name: {}, Time: {}", next.name, next.time),
                );
                Ok(Transition::with_command(next, alert))
            }
            ClockIntent::NewTime => Ok(Transition::with_command(
                state.clone(),
                Command::new(GET_TIME),
            )),
            ClockIntent::SetTime(time) => Ok(Transition::next(ClockState {
                name: state.name.clone(),
                time,
            })),
        }
    }
}

impl View<ClockState> for Clock {
    fn view(&self, state: &ClockState) -> Node {
        Node::element("div").children([
            Node::element("div").children([
                Node::element("input")
                    .attr("id", "name-input")
                    .attr("type", "text")
                    .attr("placeholder", "Enter name")
                    .attr("value", state.name.as_str()),
                Node::element("button")
                    .attr("onClick", "changeName")
                    .attr("getValue", "name-input")
                    .with_text("Change Name"),
                Node::element("button")
                    .attr("onClick", "newTime")
                    .with_text("Current Time"),
            ]),
            Node::element("p")
                .attr("id", "name")
                .with_text(format!("Name: {}", state.name)),
            Node::element("p")
                .attr("id", "time")
                .with_text(format!("Time: {}", state.time)),
        ])
    }
}

/// `getTime` answers with the host's local time; `showMessage` goes to the
/// client.
pub fn registry(bus: &EventBus) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register_async(GET_TIME, |_| async {
        let time = Local::now().format("%H:%M:%S").to_string();
        Some(Message::new("setTime").with_value(time))
    })?;
    registry.relay_to_client(SHOW_MESSAGE, bus)?;
    Ok(registry)
}

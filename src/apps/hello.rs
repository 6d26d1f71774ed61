//! Greeting form: the smallest possible application.

use crate::error::ReduceError;
use crate::message::Message;
use crate::mvi::{AppState, Intent, Reducer, Transition};
use crate::view::{Node, View};

use super::text_value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloState {
    pub name: String,
    pub greeting: String,
}

impl AppState for HelloState {}

pub enum HelloIntent {
    Greet { name: String },
}

impl Intent for HelloIntent {
    fn from_message(message: &Message) -> Result<Option<Self>, ReduceError> {
        match message.action.as_str() {
            "greet" => Ok(Some(HelloIntent::Greet {
                name: text_value(message)?,
            })),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Hello;

impl Reducer for Hello {
    type State = HelloState;
    type Intent = HelloIntent;

    fn reduce(&self, _state: &HelloState, intent: HelloIntent) -> Result<Transition<HelloState>, ReduceError> {
        match intent {
            HelloIntent::Greet { name } => Ok(Transition::next(HelloState {
                greeting: format!("Hello {}!", name),
                name,
            })),
        }
    }
}

impl View<HelloState> for Hello {
    fn view(&self, state: &HelloState) -> Node {
        Node::element("div").children([
            Node::element("h1").with_text("FastTEA Hello Example"),
            Node::element("input")
                .attr("id", "input")
                .attr("type", "text")
                .attr("name", "name")
                .attr("placeholder", "Enter your name")
                .attr("value", state.name.as_str()),
            Node::element("button")
                .attr("onClick", "greet")
                .attr("getValue", "input")
                .with_text("Greet"),
            Node::element("p").attr("id", "greeting").with_text(state.greeting.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvi::apply;

    #[test]
    fn greet_sets_name_and_greeting() {
        let state = HelloState::default();
        let next = apply(&Hello, &Message::new("greet").with_value("Ada"), &state).unwrap();
        assert_eq!(next.state.name, "Ada");
        assert_eq!(next.state.greeting, "Hello Ada!");
        assert!(next.command.is_none());
    }

    #[test]
    fn greet_without_value_fails() {
        let err = apply(&Hello, &Message::new("greet"), &HelloState::default()).unwrap_err();
        assert!(matches!(err, ReduceError::MissingValue { .. }));
    }

    #[test]
    fn view_shows_greeting() {
        let state = HelloState {
            name: "Ada".into(),
            greeting: "Hello Ada!".into(),
        };
        let tree = Hello.view(&state);
        assert_eq!(tree.find_by_id("greeting").unwrap().text_content(), "Hello Ada!");
        assert_eq!(tree.find_by_id("input").unwrap().get_attr("value"), Some("Ada"));
        assert_eq!(tree, Hello.view(&state));
    }
}

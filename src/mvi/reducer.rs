//! Reducer trait for MVI architecture.

use super::intent::Intent;
use super::state::AppState;
use super::transition::Transition;
use crate::error::ReduceError;
use crate::message::Message;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: `(State, Intent) -> (State, Command?)`.
/// Effects are described by the returned command and executed elsewhere.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: AppState;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Process an intent and return the next state.
    ///
    /// Rules that do not apply to the current state return it unchanged.
    /// An `Err` leaves the session on its previous state.
    fn reduce(
        &self,
        state: &Self::State,
        intent: Self::Intent,
    ) -> Result<Transition<Self::State>, ReduceError>;
}

/// Decode `message` and run it through `reducer`.
///
/// Unknown actions yield the unchanged state with no command.
pub fn apply<R: Reducer>(
    reducer: &R,
    message: &Message,
    state: &R::State,
) -> Result<Transition<R::State>, ReduceError> {
    match R::Intent::from_message(message)? {
        Some(intent) => reducer.reduce(state, intent),
        None => Ok(Transition::unchanged(state)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Command;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i64,
    }

    impl AppState for Counter {}

    enum CounterIntent {
        Add(i64),
        Report,
    }

    impl Intent for CounterIntent {
        fn from_message(message: &Message) -> Result<Option<Self>, ReduceError> {
            match message.action.as_str() {
                "add" => {
                    let amount = message
                        .value
                        .as_ref()
                        .and_then(|v| v.to_i64())
                        .ok_or_else(|| ReduceError::MissingValue {
                            action: message.action.clone(),
                        })?;
                    Ok(Some(CounterIntent::Add(amount)))
                }
                "report" => Ok(Some(CounterIntent::Report)),
                _ => Ok(None),
            }
        }
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Intent = CounterIntent;

        fn reduce(
            &self,
            state: &Counter,
            intent: CounterIntent,
        ) -> Result<Transition<Counter>, ReduceError> {
            match intent {
                CounterIntent::Add(amount) => Ok(Transition::next(Counter {
                    value: state.value + amount,
                })),
                CounterIntent::Report => Ok(Transition::with_command(
                    state.clone(),
                    Command::new("report").with_field("value", state.value),
                )),
            }
        }
    }

    #[test]
    fn unmatched_action_is_noop() {
        let state = Counter { value: 7 };
        let result = apply(&CounterReducer, &Message::new("unknown"), &state).unwrap();
        assert_eq!(result, Transition::unchanged(&state));
    }

    #[test]
    fn apply_is_deterministic() {
        let state = Counter { value: 1 };
        let message = Message::new("add").with_value(2);
        let first = apply(&CounterReducer, &message, &state).unwrap();
        let second = apply(&CounterReducer, &message, &state).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.state.value, 3);
        assert_eq!(state.value, 1, "input snapshot must stay intact");
    }

    #[test]
    fn decode_errors_propagate() {
        let state = Counter { value: 0 };
        let result = apply(&CounterReducer, &Message::new("add"), &state);
        assert_eq!(
            result,
            Err(ReduceError::MissingValue {
                action: "add".into()
            })
        );
    }

    #[test]
    fn commands_are_returned_not_executed() {
        let state = Counter { value: 4 };
        let result = apply(&CounterReducer, &Message::new("report"), &state).unwrap();
        assert_eq!(result.state, state);
        assert_eq!(result.command.map(|c| c.action), Some("report".to_string()));
    }
}

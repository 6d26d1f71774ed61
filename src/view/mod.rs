//! Declarative view tree and the projector contract.
//!
//! The runtime never renders HTML. A [`View`] turns a state snapshot into a
//! [`Node`] tree that an external renderer (the browser client) serializes.

mod node;

pub use node::Node;

/// Pure projection of a state snapshot.
///
/// Two calls with equal states must produce equal trees: no clocks, no
/// randomness, no dependence on earlier calls.
pub trait View<S>: Send + Sync + 'static {
    fn view(&self, state: &S) -> Node;
}

//! Event handling for MarketDeck.
//!
//! Terminal input is read from crossterm's async event stream and mapped to
//! store actions.

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, Modifiers};

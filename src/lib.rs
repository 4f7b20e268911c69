//! Window overview grid and home launcher swipe transitions for a tablet shell.
//!
//! The library is driven from outside: the embedding shell implements the collaborator
//! traits in [`window`], [`display`] and [`split_view`], forwards input and window
//! notifications, and calls the `advance_animations()` methods once per frame.

pub mod animation;
pub mod display;
pub mod home_launcher;
pub mod layout;
pub mod overview;
pub mod services;
pub mod split_view;
pub mod utils;
pub mod window;

#[cfg(test)]
mod testing;

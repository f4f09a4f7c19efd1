//! Edit screen controller.
//!
//! Split the same way as the rest of the UI code:
//!   * `state`    : screen model, render snapshot, form facts
//!   * `intent`   : everything that can happen to the screen
//!   * `effects`  : declarative side effects and store tasks
//!   * `reducer`  : pure `intent -> state + effects`
//!   * `executor` : runs store tasks in the background
//!   * `screen`   : the event loop tying it together
pub mod effects;
pub mod executor;
pub mod intent;
pub mod reducer;
pub mod screen;
pub mod state;

pub use intent::Intent;
pub use screen::{ProductEditScreen, ScreenDeps, ID_PARAM};
pub use state::{EditView, ScreenState};

//! Scripted UI session for the headless screen.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "step": "input", "field": "productName", "value": "ab" },
//!   { "step": "blur", "field": "productName" },
//!   { "step": "wait_ms", "ms": 900 },
//!   { "step": "save" }
//! ]
//! ```
//!
//! After every step the current view and display messages are captured as a
//! [`Frame`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::warn;

use forms::DisplayMessages;

use crate::core::{EditView, ProductEditScreen};

/// Pause after each step so the screen loop can pick it up.
const STEP_PAUSE: Duration = Duration::from_millis(20);
/// Upper bound for waiting on an outstanding store call.
const SETTLE_LIMIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Input { field: String, value: Value },
    Blur { field: String },
    WaitMs { ms: u64 },
    Save,
    Delete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Input { field, value } => write!(f, "input {field}={value}"),
            Step::Blur { field } => write!(f, "blur {field}"),
            Step::WaitMs { ms } => write!(f, "wait {ms}ms"),
            Step::Save => f.write_str("save"),
            Step::Delete => f.write_str("delete"),
        }
    }
}

pub fn parse(json: &str) -> Result<Vec<Step>, serde_json::Error> {
    serde_json::from_str(json)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub step: String,
    pub view: EditView,
    pub messages: DisplayMessages,
}

impl Frame {
    pub fn capture(step: impl Into<String>, screen: &ProductEditScreen) -> Self {
        Self {
            step: step.into(),
            view: screen.current_view(),
            messages: screen.current_messages(),
        }
    }
}

/// Wait until no store call is outstanding.
pub async fn settle(screen: &ProductEditScreen) {
    let mut view = screen.view();
    if timeout(SETTLE_LIMIT, view.wait_for(|v| !v.state.is_busy()))
        .await
        .is_err()
    {
        warn!("screen still busy after {SETTLE_LIMIT:?}");
    }
}

/// Play `steps` against the screen, handing a frame per step to `out`.
pub async fn replay(screen: &ProductEditScreen, steps: &[Step], mut out: impl FnMut(Frame)) {
    for step in steps {
        match step {
            Step::Input { field, value } => screen.input(field, value.clone()),
            Step::Blur { field } => screen.blur(field),
            Step::WaitMs { ms } => sleep(Duration::from_millis(*ms)).await,
            Step::Save => screen.save(),
            Step::Delete => screen.delete(),
        }
        sleep(STEP_PAUSE).await;
        settle(screen).await;
        out(Frame::capture(step.to_string(), screen));
    }
}

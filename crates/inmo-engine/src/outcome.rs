//! Result types the engine hands back to the gateway.

use inmo_core::command::CommandSpec;

/// What one inbound text produced: something to show the user and,
/// optionally, a command for the dispatcher.
#[derive(Debug, Clone)]
pub struct EngineReply {
    pub text: String,
    pub execute: Option<CommandSpec>,
}

impl EngineReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            execute: None,
        }
    }

    pub fn with_command(text: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            text: text.into(),
            execute: Some(spec),
        }
    }
}

/// Where the action goes after consuming one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Re-prompt the same step (validation failure) or plain display.
    Stay,
    /// Move to the given step.
    Advance(u32),
    /// Action complete; the engine clears the action state.
    Finish,
}

/// One step's outcome inside an action flow.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub text: String,
    pub execute: Option<CommandSpec>,
    pub transition: Transition,
}

impl StepResult {
    /// Re-prompt the current step with an error or informational line.
    pub fn stay(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            execute: None,
            transition: Transition::Stay,
        }
    }

    /// Store accepted, next prompt.
    pub fn advance(step: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            execute: None,
            transition: Transition::Advance(step),
        }
    }

    /// Display-only command (e.g. a listing) plus a move to a waiting step.
    pub fn advance_with_command(step: u32, text: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            text: text.into(),
            execute: Some(spec),
            transition: Transition::Advance(step),
        }
    }

    /// Terminal step: exactly one executable command from the accumulated data.
    pub fn finish(text: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            text: text.into(),
            execute: Some(spec),
            transition: Transition::Finish,
        }
    }

    /// Terminal step with nothing to execute.
    pub fn finish_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            execute: None,
            transition: Transition::Finish,
        }
    }
}

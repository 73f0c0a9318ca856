use serde::{Deserialize, Serialize};

use super::Message;

/// One tool invocation decided by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    pub tool_call_id: String,
    pub log: String,
    /// The model message that requested this action. Replayed into the
    /// scratchpad on the next planning step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_log: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFinish {
    pub output: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Action(Vec<AgentAction>),
    Finish(AgentFinish),
}

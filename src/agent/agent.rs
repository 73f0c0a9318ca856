use std::sync::Arc;

use async_trait::async_trait;

use super::AgentError;
use crate::{
    prompt::PromptArgs,
    schemas::agent::{AgentAction, AgentEvent},
    tools::Tool,
};

#[async_trait]
pub trait Agent: Send + Sync {
    /// Decides the next step from the user inputs and the `(action, observation)`
    /// pairs gathered so far.
    async fn plan(
        &self,
        intermediate_steps: &[(AgentAction, String)],
        inputs: PromptArgs,
    ) -> Result<AgentEvent, AgentError>;

    fn get_tools(&self) -> Vec<Arc<dyn Tool>>;
}

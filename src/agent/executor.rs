use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use super::{agent::Agent, AgentError};
use crate::{
    prompt::PromptArgs,
    prompt_args,
    schemas::agent::{AgentAction, AgentEvent},
    tools::Tool,
};

pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// Result of one executor run: the question, the final answer and, when
/// requested, the `(action, observation)` pairs that led to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutput {
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intermediate_steps: Vec<(AgentAction, String)>,
}

pub struct AgentExecutor<A>
where
    A: Agent,
{
    agent: A,
    max_iterations: Option<usize>,
    break_if_error: bool,
    return_intermediate_steps: bool,
}

impl<A> AgentExecutor<A>
where
    A: Agent,
{
    pub fn from_agent(agent: A) -> Self {
        Self {
            agent,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            break_if_error: false,
            return_intermediate_steps: false,
        }
    }

    /// `None` lets the agent loop until it finishes on its own.
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_break_if_error(mut self, break_if_error: bool) -> Self {
        self.break_if_error = break_if_error;
        self
    }

    pub fn with_return_intermediate_steps(mut self, return_intermediate_steps: bool) -> Self {
        self.return_intermediate_steps = return_intermediate_steps;
        self
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.agent.get_tools().iter().map(|t| t.name()).collect()
    }

    fn get_name_to_tools(&self) -> HashMap<String, Arc<dyn Tool>> {
        let mut name_to_tool = HashMap::new();
        for tool in self.agent.get_tools().iter() {
            log::debug!("Loading Tool:{}", tool.name());
            name_to_tool.insert(tool.name().trim().replace(' ', "_"), tool.clone());
        }
        name_to_tool
    }

    /// Answers a single question.
    pub async fn invoke(&self, input: &str) -> Result<AgentOutput, AgentError> {
        self.call(prompt_args! { "input" => input }).await
    }

    /// Runs the agent loop until it finishes or the iteration limit is hit.
    /// `input_variables` must carry every variable the agent prompt needs.
    pub async fn call(&self, input_variables: PromptArgs) -> Result<AgentOutput, AgentError> {
        let input = match input_variables.get("input") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => return Err(AgentError::MissingInputVariable("input".to_string())),
        };
        let name_to_tools = self.get_name_to_tools();
        let mut steps: Vec<(AgentAction, String)> = Vec::new();
        let mut iterations = 0;

        log::info!("> Entering new AgentExecutor chain...");
        while self.max_iterations.map_or(true, |max| iterations < max) {
            iterations += 1;
            match self.agent.plan(&steps, input_variables.clone()).await? {
                AgentEvent::Action(actions) => {
                    for action in actions {
                        log::info!("{}", action.log.trim());
                        let observation = self.run_tool(&name_to_tools, &action).await?;
                        log::info!("{}", observation);
                        steps.push((action, observation));
                    }
                }
                AgentEvent::Finish(finish) => {
                    log::info!("{}", finish.output);
                    log::info!("> Finished chain.");
                    return Ok(self.output(input, finish.output, steps));
                }
            }
        }

        log::warn!("Agent stopped after {} iterations", iterations);
        Ok(self.output(input, ITERATION_LIMIT_OUTPUT.to_string(), steps))
    }

    async fn run_tool(
        &self,
        name_to_tools: &HashMap<String, Arc<dyn Tool>>,
        action: &AgentAction,
    ) -> Result<String, AgentError> {
        let Some(tool) = name_to_tools.get(&action.tool.trim().replace(' ', "_")) else {
            let mut names: Vec<&str> = name_to_tools.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                names.join(", ")
            ));
        };

        match tool.call(&action.tool_input).await {
            Ok(observation) => Ok(observation),
            Err(e) => {
                log::info!("The tool returned the following error: {}", e);
                if self.break_if_error {
                    Err(AgentError::ToolError(e.to_string()))
                } else {
                    Ok(format!("The tool returned the following error: {}", e))
                }
            }
        }
    }

    fn output(
        &self,
        input: String,
        output: String,
        steps: Vec<(AgentAction, String)>,
    ) -> AgentOutput {
        AgentOutput {
            input,
            output,
            intermediate_steps: if self.return_intermediate_steps {
                steps
            } else {
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        agent::create_openai_tools_agent,
        language_models::GenerateResult,
        llm::MockLLM,
        prompt::openai_functions_agent_prompt,
        schemas::{MessageType, ToolCall},
        tools::ToolError,
    };

    struct Search;

    #[async_trait]
    impl Tool for Search {
        fn name(&self) -> String {
            "langsmith_search".to_string()
        }

        fn description(&self) -> String {
            "Search for information about LangSmith.".to_string()
        }

        async fn run(&self, input: Value) -> Result<String, ToolError> {
            match input.as_str() {
                Some("fail") => Err(ToolError::ExecutionError("index offline".to_string())),
                Some(q) => Ok(format!("LangSmith docs about {q}")),
                None => Err(ToolError::InvalidInputError("not a string".to_string())),
            }
        }
    }

    fn executor(llm: MockLLM) -> AgentExecutor<crate::agent::OpenAiToolsAgent> {
        let agent = create_openai_tools_agent(
            llm,
            vec![Arc::new(Search) as Arc<dyn Tool>],
            openai_functions_agent_prompt(),
        )
        .unwrap();
        AgentExecutor::from_agent(agent)
    }

    fn call(id: &str, tool: &str, query: &str) -> GenerateResult {
        GenerateResult::with_tool_calls(vec![ToolCall::new(
            id,
            tool,
            json!({ "query": query }).to_string(),
        )])
    }

    #[tokio::test]
    async fn test_runs_tool_then_finishes() {
        let llm = MockLLM::new(vec![
            call("call_1", "langsmith_search", "tracing"),
            GenerateResult::text("LangSmith is a platform for LLM apps."),
        ]);
        let output = executor(llm.clone())
            .with_return_intermediate_steps(true)
            .invoke("What is LangSmith?")
            .await
            .unwrap();

        assert_eq!(output.input, "What is LangSmith?");
        assert_eq!(output.output, "LangSmith is a platform for LLM apps.");
        assert_eq!(output.intermediate_steps.len(), 1);
        assert_eq!(output.intermediate_steps[0].1, "LangSmith docs about tracing");

        let second = &llm.calls()[1].messages;
        let last = second.last().unwrap();
        assert_eq!(last.message_type, MessageType::ToolMessage);
        assert_eq!(last.content, "LangSmith docs about tracing");
        assert_eq!(last.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_the_model() {
        let llm = MockLLM::new(vec![
            call("call_1", "google", "LangSmith"),
            GenerateResult::text("done"),
        ]);
        let output = executor(llm.clone())
            .with_return_intermediate_steps(true)
            .invoke("What is LangSmith?")
            .await
            .unwrap();

        assert_eq!(
            output.intermediate_steps[0].1,
            "google is not a valid tool, try one of [langsmith_search]."
        );
        assert_eq!(output.output, "done");
    }

    #[tokio::test]
    async fn test_tool_error_becomes_observation_or_aborts() {
        let llm = MockLLM::new(vec![
            call("call_1", "langsmith_search", "fail"),
            GenerateResult::text("sorry"),
        ]);
        let output = executor(llm)
            .with_return_intermediate_steps(true)
            .invoke("q")
            .await
            .unwrap();
        assert!(output.intermediate_steps[0]
            .1
            .starts_with("The tool returned the following error"));

        let llm = MockLLM::new(vec![call("call_1", "langsmith_search", "fail")]);
        let err = executor(llm)
            .with_break_if_error(true)
            .invoke("q")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolError(_)));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let llm = MockLLM::new(vec![
            call("call_1", "langsmith_search", "a"),
            call("call_2", "langsmith_search", "b"),
        ]);
        let output = executor(llm.clone())
            .with_max_iterations(Some(2))
            .invoke("loop forever")
            .await
            .unwrap();

        assert_eq!(output.output, ITERATION_LIMIT_OUTPUT);
        assert_eq!(llm.call_count(), 2);
        assert!(output.intermediate_steps.is_empty());
    }

    #[tokio::test]
    async fn test_output_serializes_input_and_output() {
        let llm = MockLLM::new(vec![GenerateResult::text("Hi!")]);
        let output = executor(llm).invoke("Hello").await.unwrap();
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"input": "Hello", "output": "Hi!"})
        );
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let err = executor(MockLLM::default()).invoke("Hello").await.unwrap_err();
        assert!(matches!(err, AgentError::LLMError(_)));
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{Agent, AgentError};
use crate::{
    language_models::{llm::LLM, options::CallOptions},
    prompt::{ChatPromptTemplate, PromptArgs},
    schemas::{
        agent::{AgentAction, AgentEvent, AgentFinish},
        FunctionDefinition, Message, ToolCall,
    },
    tools::Tool,
};

pub const AGENT_SCRATCHPAD: &str = "agent_scratchpad";

/// Agent driven by OpenAI tool calling.
///
/// Every plan step renders the prompt with the tool-call history as
/// `agent_scratchpad`. A reply with tool calls becomes one action per call;
/// a reply without any is the final answer.
pub struct OpenAiToolsAgent {
    llm: Box<dyn LLM>,
    tools: Vec<Arc<dyn Tool>>,
    prompt: ChatPromptTemplate,
}

/// Wires `llm`, `tools` and `prompt` into an [`OpenAiToolsAgent`].
///
/// The tools are offered to the model as function definitions on every call.
/// Fails when `tools` is empty or the prompt has no `agent_scratchpad` slot.
pub fn create_openai_tools_agent<L: Into<Box<dyn LLM>>>(
    llm: L,
    tools: Vec<Arc<dyn Tool>>,
    prompt: ChatPromptTemplate,
) -> Result<OpenAiToolsAgent, AgentError> {
    if tools.is_empty() {
        return Err(AgentError::NoTools);
    }
    if !prompt.has_variable(AGENT_SCRATCHPAD) {
        return Err(AgentError::MissingInputVariable(
            AGENT_SCRATCHPAD.to_string(),
        ));
    }

    let functions = tools
        .iter()
        .map(|tool| FunctionDefinition::from_langchain_tool(tool.as_ref()))
        .collect();
    let mut llm: Box<dyn LLM> = llm.into();
    llm.add_options(CallOptions::new().with_functions(functions));

    Ok(OpenAiToolsAgent { llm, tools, prompt })
}

impl OpenAiToolsAgent {
    pub fn prompt(&self) -> &ChatPromptTemplate {
        &self.prompt
    }

    /// Replays the steps as the model saw them: each requesting assistant
    /// message once, followed by one tool message per observation.
    pub fn construct_scratchpad(intermediate_steps: &[(AgentAction, String)]) -> Vec<Message> {
        let mut messages: Vec<Message> = Vec::new();
        let mut last_request: Option<&Message> = None;
        for (action, observation) in intermediate_steps {
            match &action.message_log {
                Some(request) if last_request != Some(request) => {
                    messages.push(request.clone());
                    last_request = Some(request);
                }
                Some(_) => {}
                None => {
                    messages.push(Message::new_ai_message("").with_tool_calls(vec![
                        ToolCall::new(&action.tool_call_id, &action.tool, &action.tool_input),
                    ]));
                    last_request = None;
                }
            }
            messages.push(Message::new_tool_message(
                observation.as_str(),
                action.tool_call_id.as_str(),
            ));
        }
        messages
    }
}

#[async_trait]
impl Agent for OpenAiToolsAgent {
    async fn plan(
        &self,
        intermediate_steps: &[(AgentAction, String)],
        inputs: PromptArgs,
    ) -> Result<AgentEvent, AgentError> {
        let mut inputs = inputs;
        inputs.insert(
            AGENT_SCRATCHPAD.to_string(),
            json!(Self::construct_scratchpad(intermediate_steps)),
        );
        let messages = self.prompt.format_messages(&inputs)?;

        let result = self.llm.generate(&messages).await?;
        log::debug!("Model replied: {:?}", result);

        if !result.has_tool_calls() {
            return Ok(AgentEvent::Finish(AgentFinish {
                output: result.generation,
            }));
        }

        let request = Message::new_ai_message(result.generation.as_str())
            .with_tool_calls(result.tool_calls.clone());
        let actions = result
            .tool_calls
            .into_iter()
            .map(|call| {
                let tool_input = if call.arguments.trim().is_empty() {
                    "{}".to_string()
                } else {
                    call.arguments
                };
                AgentAction {
                    log: format!(
                        "\nInvoking: `{}` with `{}`\n{}\n",
                        call.name, tool_input, result.generation
                    ),
                    tool: call.name,
                    tool_input,
                    tool_call_id: call.id,
                    message_log: Some(request.clone()),
                }
            })
            .collect();
        Ok(AgentEvent::Action(actions))
    }

    fn get_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::{
        language_models::GenerateResult,
        llm::MockLLM,
        prompt::openai_functions_agent_prompt,
        prompt_args,
        schemas::MessageType,
        tools::ToolError,
    };

    struct Calculator;

    #[async_trait]
    impl Tool for Calculator {
        fn name(&self) -> String {
            "calculator".to_string()
        }

        fn description(&self) -> String {
            "Adds numbers.".to_string()
        }

        async fn run(&self, _input: Value) -> Result<String, ToolError> {
            Ok("4".to_string())
        }
    }

    fn tools() -> Vec<Arc<dyn Tool>> {
        vec![Arc::new(Calculator)]
    }

    #[test]
    fn test_rejects_empty_tools_and_bad_prompt() {
        assert!(matches!(
            create_openai_tools_agent(MockLLM::default(), vec![], openai_functions_agent_prompt()),
            Err(AgentError::NoTools)
        ));

        let prompt = ChatPromptTemplate::new(vec![crate::prompt::MessageTemplate::Human(
            "{input}".to_string(),
        )]);
        assert!(matches!(
            create_openai_tools_agent(MockLLM::default(), tools(), prompt),
            Err(AgentError::MissingInputVariable(_))
        ));
    }

    #[tokio::test]
    async fn test_tool_calls_become_actions() {
        let llm = MockLLM::new(vec![GenerateResult::with_tool_calls(vec![ToolCall::new(
            "call_1",
            "calculator",
            r#"{"query": "2+2"}"#,
        )])]);
        let agent =
            create_openai_tools_agent(llm.clone(), tools(), openai_functions_agent_prompt())
                .unwrap();

        let event = agent
            .plan(&[], prompt_args! { "input" => "What is 2+2?" })
            .await
            .unwrap();

        let AgentEvent::Action(actions) = event else {
            panic!("expected an action");
        };
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tool, "calculator");
        assert_eq!(actions[0].tool_input, r#"{"query": "2+2"}"#);
        assert_eq!(actions[0].tool_call_id, "call_1");

        let calls = llm.calls();
        assert_eq!(calls[0].functions, vec!["calculator"]);
        assert_eq!(calls[0].messages.len(), 2);
        assert_eq!(calls[0].messages[1].content, "What is 2+2?");
    }

    #[tokio::test]
    async fn test_plain_reply_finishes() {
        let llm = MockLLM::new(vec![GenerateResult::text("4")]);
        let agent = create_openai_tools_agent(llm, tools(), openai_functions_agent_prompt()).unwrap();

        let event = agent
            .plan(&[], prompt_args! { "input" => "What is 2+2?" })
            .await
            .unwrap();
        assert_eq!(
            event,
            AgentEvent::Finish(AgentFinish {
                output: "4".to_string()
            })
        );
    }

    #[test]
    fn test_scratchpad_replays_request_once() {
        let request = Message::new_ai_message("").with_tool_calls(vec![
            ToolCall::new("a", "calculator", "{}"),
            ToolCall::new("b", "calculator", "{}"),
        ]);
        let action = |id: &str| AgentAction {
            tool: "calculator".to_string(),
            tool_input: "{}".to_string(),
            tool_call_id: id.to_string(),
            log: String::new(),
            message_log: Some(request.clone()),
        };
        let steps = vec![(action("a"), "1".to_string()), (action("b"), "2".to_string())];

        let scratchpad = OpenAiToolsAgent::construct_scratchpad(&steps);
        let types: Vec<MessageType> = scratchpad.iter().map(|m| m.message_type).collect();
        assert_eq!(
            types,
            vec![
                MessageType::AIMessage,
                MessageType::ToolMessage,
                MessageType::ToolMessage
            ]
        );
        assert_eq!(scratchpad[2].tool_call_id.as_deref(), Some("b"));
    }
}

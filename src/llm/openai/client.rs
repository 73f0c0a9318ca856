use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, FunctionCall,
        FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;

use crate::{
    language_models::{llm::LLM, options::CallOptions, GenerateResult, LLMError, TokenUsage},
    schemas::{FunctionDefinition, Message, MessageType, ToolCall},
};

pub const GPT_3_5_TURBO_0125: &str = "gpt-3.5-turbo-0125";

/// Chat-completions client for OpenAI and API-compatible servers.
#[derive(Clone)]
pub struct OpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    options: CallOptions,
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new(OpenAIConfig::default())
    }
}

impl OpenAI {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
            model: GPT_3_5_TURBO_0125.to_string(),
            options: CallOptions::default(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_openai_messages(
        &self,
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, LLMError> {
        messages.iter().map(to_openai_message).collect()
    }

    fn build_request(&self, messages: &[Message]) -> Result<CreateChatCompletionRequest, LLMError> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(self.to_openai_messages(messages)?);

        if let Some(temperature) = self.options.temperature {
            request.temperature(temperature);
        }
        if let Some(max_tokens) = self.options.max_tokens {
            request.max_completion_tokens(max_tokens);
        }
        if let Some(functions) = self.options.functions.as_ref().filter(|f| !f.is_empty()) {
            let tools = functions
                .iter()
                .map(to_openai_tool)
                .collect::<Result<Vec<_>, _>>()?;
            request.tools(tools);
        }

        Ok(request.build()?)
    }
}

fn to_openai_message(message: &Message) -> Result<ChatCompletionRequestMessage, LLMError> {
    let converted: ChatCompletionRequestMessage = match message.message_type {
        MessageType::SystemMessage => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        MessageType::HumanMessage => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        MessageType::AIMessage => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if !message.content.is_empty() {
                builder.content(message.content.clone());
            }
            if !message.tool_calls.is_empty() {
                builder.tool_calls(
                    message
                        .tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            builder.build()?.into()
        }
        MessageType::ToolMessage => {
            let tool_call_id = message.tool_call_id.clone().ok_or_else(|| {
                LLMError::OtherError("tool message without tool_call_id".to_string())
            })?;
            ChatCompletionRequestToolMessageArgs::default()
                .content(message.content.clone())
                .tool_call_id(tool_call_id)
                .build()?
                .into()
        }
    };
    Ok(converted)
}

fn to_openai_tool(function: &FunctionDefinition) -> Result<ChatCompletionTool, LLMError> {
    let function = FunctionObjectArgs::default()
        .name(function.name.clone())
        .description(function.description.clone())
        .parameters(function.parameters.clone())
        .build()?;
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(function)
        .build()?)
}

#[async_trait]
impl LLM for OpenAI {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        let request = self.build_request(messages)?;
        log::debug!(
            "OpenAI request: model={}, messages={}",
            self.model,
            messages.len()
        );
        let response = self.client.chat().create(request).await?;

        let tokens = response
            .usage
            .as_ref()
            .map(|usage| TokenUsage::new(usage.prompt_tokens, usage.completion_tokens));

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ContentNotFound("/choices/0".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect();

        Ok(GenerateResult {
            tokens,
            generation: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }

    fn add_options(&mut self, options: CallOptions) {
        self.options.merge_options(options)
    }
}

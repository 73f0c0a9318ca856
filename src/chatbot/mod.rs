//! Application assembly: the three research tools, the OpenAI tools agent and
//! the single-turn question/answer loop served by the web UI.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_openai::config::OpenAIConfig;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{
    agent::{create_openai_tools_agent, AgentExecutor, AgentOutput, OpenAiToolsAgent},
    config::{Settings, ToolSettings},
    embedding::{Embedder, OpenAiEmbedder},
    error::{ChatbotError, Result},
    language_models::{llm::LLM, options::CallOptions},
    llm::openai::OpenAI,
    prompt::{ChatPromptTemplate, PromptHub},
    retrievers::{ArxivRetriever, WebPageIndex, WikipediaRetriever},
    tools::{create_retriever_tool, ArxivQueryRun, Tool, WikipediaQueryRun},
};

pub const LANGSMITH_TOOL_NAME: &str = "langsmith_search";
pub const LANGSMITH_TOOL_DESCRIPTION: &str =
    "Search for information about LangSmith. For any questions about LangSmith, you must use this tool!";

pub const KEY_LOADED_MESSAGE: &str = "OPENAI_API_KEY loaded successfully.";
pub const KEY_MISSING_MESSAGE: &str = "OPENAI_API_KEY not found. Please set it in the .env file.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Loaded,
    Missing,
}

impl CredentialStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, CredentialStatus::Loaded)
    }

    /// Banner shown above the question form.
    pub fn message(&self) -> &'static str {
        match self {
            CredentialStatus::Loaded => KEY_LOADED_MESSAGE,
            CredentialStatus::Missing => KEY_MISSING_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    Idle,
    Processing,
}

/// Marks a turn as in flight; the chatbot returns to idle when it drops,
/// whether the turn succeeded or not.
struct TurnGuard<'a> {
    processing: &'a AtomicBool,
}

impl<'a> TurnGuard<'a> {
    fn enter(processing: &'a AtomicBool) -> Result<Self> {
        processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ChatbotError::Busy)?;
        Ok(Self { processing })
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.processing.store(false, Ordering::Release);
    }
}

/// Builds the research tools in the order they are offered to the model:
/// `wikipedia`, `arxiv_search`, `langsmith_search`.
pub fn build_tools(settings: &ToolSettings, index: Arc<WebPageIndex>) -> Vec<Arc<dyn Tool>> {
    let wikipedia = WikipediaRetriever::new()
        .with_api_url(&settings.wikipedia_api_url)
        .with_max_docs(settings.top_k_results);
    let arxiv = ArxivRetriever::new()
        .with_api_url(&settings.arxiv_api_url)
        .with_max_docs(settings.top_k_results);

    vec![
        Arc::new(WikipediaQueryRun::new(
            wikipedia,
            settings.doc_content_chars_max,
        )),
        Arc::new(ArxivQueryRun::new(arxiv, settings.doc_content_chars_max)),
        Arc::new(create_retriever_tool(
            index,
            LANGSMITH_TOOL_NAME,
            LANGSMITH_TOOL_DESCRIPTION,
        )),
    ]
}

pub struct Chatbot {
    executor: AgentExecutor<OpenAiToolsAgent>,
    index: Arc<WebPageIndex>,
    credential: CredentialStatus,
    processing: AtomicBool,
}

impl Chatbot {
    /// Wires the OpenAI chat model and embedder from `settings`, pulls the
    /// agent prompt from the hub (falling back to the built-in copy) and
    /// assembles the executor.
    ///
    /// A missing API key does not fail assembly; the credential status reports
    /// it and each model call fails on its own.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new();
        match &settings.openai_api_key {
            Some(key) => openai_config = openai_config.with_api_key(key.expose_secret()),
            None => log::error!("{}", KEY_MISSING_MESSAGE),
        }
        if let Some(api_base) = &settings.model.api_base {
            openai_config = openai_config.with_api_base(api_base);
        }

        let llm = OpenAI::new(openai_config.clone())
            .with_model(&settings.model.name)
            .with_options(CallOptions::new().with_temperature(settings.model.temperature));
        let embedder =
            OpenAiEmbedder::new(openai_config).with_model(&settings.model.embedding_model);
        let prompt = PromptHub::new(&settings.agent.hub_api_url)
            .pull_or_default(&settings.agent.prompt_handle)
            .await;

        Self::assemble(llm, Arc::new(embedder), prompt, settings)
    }

    /// Same wiring as [`Self::from_settings`] with the model, embedder and
    /// prompt supplied by the caller.
    pub fn assemble<L: Into<Box<dyn LLM>>>(
        llm: L,
        embedder: Arc<dyn Embedder>,
        prompt: ChatPromptTemplate,
        settings: &Settings,
    ) -> Result<Self> {
        let index = Arc::new(WebPageIndex::new(
            settings.index.to_index_config(),
            embedder,
        ));
        let tools = build_tools(&settings.tools, index.clone());
        let agent = create_openai_tools_agent(llm, tools, prompt)?;
        let executor = AgentExecutor::from_agent(agent)
            .with_max_iterations(Some(settings.agent.max_iterations));

        let credential = if settings.has_openai_api_key() {
            CredentialStatus::Loaded
        } else {
            CredentialStatus::Missing
        };

        log::info!(
            "Chatbot ready with tools: {}",
            executor.tool_names().join(", ")
        );
        Ok(Self {
            executor,
            index,
            credential,
            processing: AtomicBool::new(false),
        })
    }

    pub fn credential_status(&self) -> CredentialStatus {
        self.credential
    }

    pub fn state(&self) -> TurnState {
        if self.processing.load(Ordering::Acquire) {
            TurnState::Processing
        } else {
            TurnState::Idle
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.executor.tool_names()
    }

    pub fn index(&self) -> &Arc<WebPageIndex> {
        &self.index
    }

    /// Answers one question.
    ///
    /// Blank input is ignored and returns `Ok(None)` without calling the
    /// model. Only one question is answered at a time; a submission that
    /// arrives while another is being answered gets [`ChatbotError::Busy`].
    pub async fn ask(&self, question: &str) -> Result<Option<AgentOutput>> {
        let question = question.trim();
        if question.is_empty() {
            log::debug!("Ignoring empty question");
            return Ok(None);
        }

        let _turn = TurnGuard::enter(&self.processing)?;
        log::info!("Question: {}", question);
        let output = self.executor.invoke(question).await?;
        Ok(Some(output))
    }

    /// Builds the LangSmith documentation index now.
    pub async fn warm_index(&self) -> Result<()> {
        self.index.warm().await?;
        Ok(())
    }

    /// Builds the index on a background task. A failure is logged; the next
    /// `langsmith_search` call retries the build.
    pub fn spawn_index_warmup(self: &Arc<Self>) -> JoinHandle<()> {
        let chatbot = Arc::clone(self);
        tokio::spawn(async move {
            match chatbot.warm_index().await {
                Ok(()) => log::info!(
                    "LangSmith index ready ({} chunks)",
                    chatbot.index.chunk_count().unwrap_or_default()
                ),
                Err(e) => log::warn!("LangSmith index not built yet: {}", e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        embedding::MockEmbedder, language_models::GenerateResult, llm::MockLLM,
        prompt::openai_functions_agent_prompt,
    };

    fn chatbot(llm: MockLLM, settings: &Settings) -> Chatbot {
        Chatbot::assemble(
            llm,
            Arc::new(MockEmbedder),
            openai_functions_agent_prompt(),
            settings,
        )
        .unwrap()
    }

    #[test]
    fn test_credential_messages() {
        assert_eq!(
            CredentialStatus::Missing.message(),
            "OPENAI_API_KEY not found. Please set it in the .env file."
        );
        assert_eq!(
            CredentialStatus::Loaded.message(),
            "OPENAI_API_KEY loaded successfully."
        );
        assert!(!CredentialStatus::Missing.is_loaded());
    }

    #[test]
    fn test_credential_status_follows_settings() {
        let mut settings = Settings::default();
        assert_eq!(
            chatbot(MockLLM::default(), &settings).credential_status(),
            CredentialStatus::Missing
        );

        settings.openai_api_key = Some(SecretString::from("sk-test".to_string()));
        assert_eq!(
            chatbot(MockLLM::default(), &settings).credential_status(),
            CredentialStatus::Loaded
        );
    }

    #[test]
    fn test_three_tools_in_order() {
        let bot = chatbot(MockLLM::default(), &Settings::default());
        assert_eq!(
            bot.tool_names(),
            vec!["wikipedia", "arxiv_search", "langsmith_search"]
        );
        assert!(!bot.index().is_ready());
    }

    #[tokio::test]
    async fn test_empty_question_skips_the_agent() {
        let llm = MockLLM::default();
        let bot = chatbot(llm.clone(), &Settings::default());

        assert!(bot.ask("").await.unwrap().is_none());
        assert!(bot.ask("   \n").await.unwrap().is_none());
        assert_eq!(llm.call_count(), 0);
        assert_eq!(bot.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_returns_to_idle_after_failure() {
        let llm = MockLLM::default();
        let bot = chatbot(llm.clone(), &Settings::default());

        assert!(bot.ask("Hello").await.is_err());
        assert_eq!(bot.state(), TurnState::Idle);

        llm.push_response(GenerateResult::text("Hi there!"));
        let output = bot.ask("Hello").await.unwrap().unwrap();
        assert_eq!(output.output, "Hi there!");
    }

    #[test]
    fn test_turn_guard_rejects_second_turn() {
        let processing = AtomicBool::new(false);
        let first = TurnGuard::enter(&processing).unwrap();
        assert!(matches!(
            TurnGuard::enter(&processing),
            Err(ChatbotError::Busy)
        ));
        drop(first);
        assert!(TurnGuard::enter(&processing).is_ok());
    }

    #[tokio::test]
    async fn test_question_during_a_turn_is_busy() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let llm = MockLLM::new(vec![GenerateResult::text("LangSmith is a platform.")])
            .with_gate(entered.clone(), release.clone());
        let bot = Arc::new(chatbot(llm.clone(), &Settings::default()));

        let first = tokio::spawn({
            let bot = bot.clone();
            async move { bot.ask("What is LangSmith?").await }
        });
        entered.notified().await;
        assert_eq!(bot.state(), TurnState::Processing);

        assert!(matches!(
            bot.ask("Are you there?").await,
            Err(ChatbotError::Busy)
        ));
        assert_eq!(llm.call_count(), 1);

        release.notify_one();
        let output = first.await.unwrap().unwrap().unwrap();
        assert_eq!(output.output, "LangSmith is a platform.");
        assert_eq!(bot.state(), TurnState::Idle);
    }
}

//! Chat prompt templates and the LangChain prompt hub client.

use std::collections::HashMap;

use serde_json::Value;

mod error;
pub use error::*;

mod template;
pub use template::*;

mod hub;
pub use hub::*;

/// Values substituted into a prompt, keyed by variable name.
pub type PromptArgs = HashMap<String, Value>;

/// Builds [`PromptArgs`] from `key => value` pairs; values go through `serde_json::json!`.
///
/// ```rust
/// use langchain_chatbot::prompt_args;
///
/// let args = prompt_args! { "input" => "What is LangSmith?" };
/// assert_eq!(args["input"], "What is LangSmith?");
/// ```
#[macro_export]
macro_rules! prompt_args {
    ( $($key:expr => $value:expr),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut args = $crate::prompt::PromptArgs::new();
        $(
            args.insert($key.to_string(), serde_json::json!($value));
        )*
        args
    }};
}

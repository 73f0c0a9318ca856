use serde_json::Value;

use super::{PromptArgs, PromptError};
use crate::schemas::Message;

/// One entry of a [`ChatPromptTemplate`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessageTemplate {
    System(String),
    Human(String),
    AI(String),
    /// Splices in a list of messages passed under `variable_name`.
    Placeholder {
        variable_name: String,
        optional: bool,
    },
}

impl MessageTemplate {
    pub fn placeholder<S: Into<String>>(variable_name: S) -> Self {
        Self::Placeholder {
            variable_name: variable_name.into(),
            optional: false,
        }
    }

    pub fn optional_placeholder<S: Into<String>>(variable_name: S) -> Self {
        Self::Placeholder {
            variable_name: variable_name.into(),
            optional: true,
        }
    }
}

/// An ordered list of message templates rendered into chat messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPromptTemplate {
    messages: Vec<MessageTemplate>,
}

impl ChatPromptTemplate {
    pub fn new(messages: Vec<MessageTemplate>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }

    /// Variables that must be supplied to [`Self::format_messages`].
    pub fn input_variables(&self) -> Vec<String> {
        let mut variables = Vec::new();
        for message in &self.messages {
            let names = match message {
                MessageTemplate::System(t) | MessageTemplate::Human(t) | MessageTemplate::AI(t) => {
                    template_variables(t)
                }
                MessageTemplate::Placeholder {
                    variable_name,
                    optional: false,
                } => vec![variable_name.clone()],
                MessageTemplate::Placeholder { .. } => vec![],
            };
            for name in names {
                if !variables.contains(&name) {
                    variables.push(name);
                }
            }
        }
        variables
    }

    /// True if `name` is used by a template or a placeholder, optional or not.
    pub fn has_variable(&self, name: &str) -> bool {
        self.messages.iter().any(|m| match m {
            MessageTemplate::Placeholder { variable_name, .. } => variable_name == name,
            MessageTemplate::System(t) | MessageTemplate::Human(t) | MessageTemplate::AI(t) => {
                template_variables(t).iter().any(|v| v == name)
            }
        })
    }

    pub fn format_messages(&self, args: &PromptArgs) -> Result<Vec<Message>, PromptError> {
        let mut messages = Vec::new();
        for template in &self.messages {
            match template {
                MessageTemplate::System(t) => {
                    messages.push(Message::new_system_message(format_fstring(t, args)?))
                }
                MessageTemplate::Human(t) => {
                    messages.push(Message::new_human_message(format_fstring(t, args)?))
                }
                MessageTemplate::AI(t) => {
                    messages.push(Message::new_ai_message(format_fstring(t, args)?))
                }
                MessageTemplate::Placeholder {
                    variable_name,
                    optional,
                } => match args.get(variable_name) {
                    Some(value) => {
                        let spliced: Vec<Message> = serde_json::from_value(value.clone())
                            .map_err(|_| {
                                PromptError::InvalidPlaceholderValue(variable_name.clone())
                            })?;
                        messages.extend(spliced);
                    }
                    None if *optional => {}
                    None => return Err(PromptError::MissingVariable(variable_name.clone())),
                },
            }
        }
        Ok(messages)
    }
}

fn invalid(template: &str, reason: &str) -> PromptError {
    PromptError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}

enum Segment {
    Literal(String),
    Variable(String),
}

fn parse_fstring(template: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(invalid(template, "unclosed '{'")),
                        Some(c) => name.push(c),
                    }
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(invalid(template, "empty variable name"));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' => return Err(invalid(template, "single '}'")),
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Substitutes `{name}` with the matching argument. `{{` and `}}` are literal braces.
/// String values are inserted as-is, other JSON values in their JSON form.
pub fn format_fstring(template: &str, args: &PromptArgs) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    for segment in parse_fstring(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Variable(name) => match args.get(&name) {
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None => return Err(PromptError::MissingVariable(name)),
            },
        }
    }
    Ok(out)
}

/// Variable names referenced by an f-string template, in order of first use.
/// A malformed template has none.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse_fstring(template).unwrap_or_default() {
        if let Segment::Variable(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

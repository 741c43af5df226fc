use crate::agent::ContextBuilder;
use crate::errors::OrchestrationError;
use crate::session::{ConversationMemory, Message};
use crate::tools::{ToolResult, Toolbox};
use crate::traits::{ChatMessage, ChatModel, ChatRequest, ChatResponse, ToolCall};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_MAX_ITERATIONS: usize = 10;

const TOOL_CALL_OPEN_TAG: &str = "<tool_call>";
const TOOL_CALL_CLOSE_TAG: &str = "</tool_call>";

#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
}

enum Directive {
    Answer(String),
    Invoke {
        call: ToolCall,
        invocation: ToolInvocation,
        preamble: String,
        surplus: usize,
    },
    Malformed { raw: String, reason: String },
}

enum StepOutcome {
    Continue,
    Finished(String),
}

pub struct ReasoningLoop {
    model: Arc<dyn ChatModel>,
    context_builder: ContextBuilder,
    toolbox: Arc<Toolbox>,
    max_iterations: usize,
}

impl ReasoningLoop {
    pub fn new(
        model: Arc<dyn ChatModel>,
        context_builder: ContextBuilder,
        toolbox: Arc<Toolbox>,
    ) -> Self {
        Self {
            model,
            context_builder,
            toolbox,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run one turn. On success the memory gains exactly two messages, the
    /// user message and the final answer; on failure it is left untouched.
    /// Tool calls and observations live only in a scratch transcript that
    /// is dropped when the turn ends.
    pub async fn run(
        &self,
        memory: &mut ConversationMemory,
        user_message: &str,
    ) -> Result<String, OrchestrationError> {
        let mut scratch = self
            .context_builder
            .build_messages(memory.messages(), user_message);

        let mut answer = None;
        for iteration in 1..=self.max_iterations {
            debug!(iteration, max = self.max_iterations, "reasoning step");
            match self.step(&mut scratch).await? {
                StepOutcome::Continue => {}
                StepOutcome::Finished(text) => {
                    answer = Some(text);
                    break;
                }
            }
        }

        let answer = match answer {
            Some(text) => text,
            None => {
                warn!(
                    max = self.max_iterations,
                    "iteration cap reached, forcing a final answer"
                );
                self.force_answer(&mut scratch).await?
            }
        };

        memory.append(Message::user(user_message));
        memory.append(Message::assistant(answer.clone()));
        Ok(answer)
    }

    async fn step(
        &self,
        scratch: &mut Vec<ChatMessage>,
    ) -> Result<StepOutcome, OrchestrationError> {
        let request = ChatRequest {
            messages: scratch,
            tools: Some(self.toolbox.registry().describe_all()),
        };
        let response = self
            .model
            .chat(request)
            .await
            .map_err(OrchestrationError::Model)?;

        match parse_directive(&response) {
            Directive::Answer(text) => Ok(StepOutcome::Finished(text)),
            Directive::Invoke {
                call,
                invocation,
                preamble,
                surplus,
            } => {
                debug!(tool = %invocation.name, "dispatching tool call");
                let result = self.act(&invocation).await;

                let mut observation = serde_json::to_string(&result).unwrap_or_default();
                if surplus > 0 {
                    let _ = write!(
                        observation,
                        "\n({surplus} additional tool call(s) were ignored; invoke one tool per step)"
                    );
                }

                scratch.push(ChatMessage::assistant_with_tool_calls(
                    preamble,
                    vec![call.clone()],
                ));
                scratch.push(ChatMessage::tool_result(call.id, observation));
                Ok(StepOutcome::Continue)
            }
            Directive::Malformed { raw, reason } => {
                debug!(%reason, "model output could not be parsed");
                if !raw.trim().is_empty() {
                    scratch.push(ChatMessage::assistant(raw));
                }
                scratch.push(ChatMessage::user(format!(
                    "Your last reply could not be used: {reason}. Reply with either a final answer in plain text, or one tool call inside <tool_call> tags."
                )));
                Ok(StepOutcome::Continue)
            }
        }
    }

    async fn act(&self, invocation: &ToolInvocation) -> ToolResult {
        match self.toolbox.registry().resolve(&invocation.name) {
            Ok(spec) => self.toolbox.invoke(spec.kind, &invocation.arguments).await,
            Err(_) => {
                let available: Vec<&str> = self
                    .toolbox
                    .registry()
                    .describe_all()
                    .iter()
                    .map(|spec| spec.name.as_str())
                    .collect();
                ToolResult::failure(format!(
                    "no such tool '{}'; available tools: {}",
                    invocation.name,
                    available.join(", ")
                ))
            }
        }
    }

    async fn force_answer(
        &self,
        scratch: &mut Vec<ChatMessage>,
    ) -> Result<String, OrchestrationError> {
        scratch.push(ChatMessage::user(
            "You have used all of your reasoning steps. Give your best final answer from what you have gathered so far. Do not call any tools.",
        ));

        let request = ChatRequest {
            messages: scratch,
            tools: None,
        };
        let response = self
            .model
            .chat(request)
            .await
            .map_err(OrchestrationError::Model)?;

        let (text, _) = parse_tool_calls_fallback(response.text_or_empty());
        if text.trim().is_empty() {
            return Err(OrchestrationError::NoAnswer(self.max_iterations));
        }
        Ok(text)
    }
}

fn parse_directive(response: &ChatResponse) -> Directive {
    if response.has_tool_calls() {
        let call = response.tool_calls[0].clone();
        let surplus = response.tool_calls.len() - 1;
        let preamble = response.text.clone().unwrap_or_default();

        return match invocation_from_call(&call) {
            Ok(invocation) => Directive::Invoke {
                call,
                invocation,
                preamble,
                surplus,
            },
            Err(reason) => Directive::Malformed {
                raw: preamble,
                reason,
            },
        };
    }

    let Some(text) = response.text.as_deref() else {
        return Directive::Malformed {
            raw: String::new(),
            reason: "the reply was empty".into(),
        };
    };

    let (plain, mut calls) = parse_tool_calls_fallback(text);

    if !calls.is_empty() {
        let call = calls.remove(0);
        let surplus = calls.len();

        return match invocation_from_call(&call) {
            Ok(invocation) => Directive::Invoke {
                call,
                invocation,
                preamble: plain,
                surplus,
            },
            Err(reason) => Directive::Malformed {
                raw: text.to_string(),
                reason,
            },
        };
    }

    // A tag the model opened but never turned into a valid call is an
    // attempted tool use, not an answer.
    if text.contains(TOOL_CALL_OPEN_TAG) {
        return Directive::Malformed {
            raw: text.to_string(),
            reason: "the <tool_call> block did not contain a valid JSON invocation".into(),
        };
    }

    if plain.trim().is_empty() {
        return Directive::Malformed {
            raw: String::new(),
            reason: "the reply was empty".into(),
        };
    }

    Directive::Answer(plain)
}

fn invocation_from_call(call: &ToolCall) -> Result<ToolInvocation, String> {
    match serde_json::from_str(&call.arguments) {
        Ok(arguments) => Ok(ToolInvocation {
            name: call.name.clone(),
            arguments,
        }),
        Err(e) => Err(format!(
            "the arguments for '{}' were not valid JSON: {e}",
            call.name
        )),
    }
}

fn parse_tool_calls_fallback(response: &str) -> (String, Vec<ToolCall>) {
    let mut text_parts = Vec::new();
    let mut calls = Vec::new();
    let mut remaining = response;

    while let Some(start) = remaining.find(TOOL_CALL_OPEN_TAG) {
        let before = &remaining[..start];
        if !before.trim().is_empty() {
            text_parts.push(before.trim().to_string());
        }

        let after_open = &remaining[start + TOOL_CALL_OPEN_TAG.len()..];
        let Some(close) = after_open.find(TOOL_CALL_CLOSE_TAG) else {
            // unclosed tag: the tail stays in the text part
            remaining = &remaining[start..];
            break;
        };

        for value in extract_json_values(&after_open[..close]) {
            if let Some(call) = parse_tool_call_value(&value) {
                calls.push(call);
            }
        }
        remaining = &after_open[close + TOOL_CALL_CLOSE_TAG.len()..];
    }

    if !remaining.trim().is_empty() {
        text_parts.push(remaining.trim().to_string());
    }

    (text_parts.join("\n"), calls)
}

// braces inside string literals do not count toward depth
fn extract_json_values(text: &str) -> Vec<Value> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_string => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start
                            && let Ok(value) = serde_json::from_str::<Value>(&text[s..=i])
                        {
                            values.push(value);
                        }
                        start = None;
                    }
                }
            }
            _ => {}
        }
    }

    values
}

fn parse_tool_call_value(value: &Value) -> Option<ToolCall> {
    let name = value.get("name")?.as_str()?.to_string();
    let arguments = value.get("arguments")?;
    let arguments = serde_json::to_string(arguments).ok()?;
    let id = format!("call_{:x}", md5::compute(arguments.as_bytes()));

    Some(ToolCall {
        id,
        name,
        arguments,
    })
}

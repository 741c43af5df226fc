use crate::agent::ToolSpec;
use crate::session::Message;
use crate::traits::ChatMessage;
use std::fmt::Write;

const SYSTEM_PERSONA: &str = "You are an expert travel booking assistant. You help customers search \
for flights, search for hotels, and create bookings.

Guidelines:
1. Be friendly, professional, and helpful.
2. Ask clarifying questions when a request is ambiguous.
3. Present options clearly with prices and key details, and point out the best value.
4. Collect the customer's full name and email address and confirm the details before creating a booking.
5. After creating a booking, always give the customer the booking reference.

Your goal is to make travel booking as easy and pleasant as possible.";

pub struct ContextBuilder {
    tool_specs: Vec<ToolSpec>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            tool_specs: Vec::new(),
        }
    }

    pub fn with_tool_specs(mut self, tool_specs: Vec<ToolSpec>) -> Self {
        self.tool_specs = tool_specs;
        self
    }

    pub fn build_system_prompt(&self) -> String {
        let mut parts = vec![SYSTEM_PERSONA.to_string()];

        if !self.tool_specs.is_empty() {
            parts.push(self.get_tool_instructions());
        }

        parts.push(self.get_runtime_context());

        parts.join("\n\n---\n\n")
    }

    fn get_tool_instructions(&self) -> String {
        let mut instructions = String::new();
        instructions.push_str("## Tool Use Protocol\n\n");
        instructions.push_str("To use a tool, wrap a JSON object in <tool_call> tags:\n\n");
        instructions.push_str(
            "```\n<tool_call>\n{\"name\": \"tool_name\", \"arguments\": {\"param\": \"value\"}}\n</tool_call>\n```\n\n",
        );
        instructions.push_str(
            "Invoke one tool at a time and wait for its result before deciding your next step. \
             When you have everything you need, reply with the final answer in plain text and no tool call.\n\n",
        );
        instructions.push_str("### Available Tools\n\n");

        for tool in &self.tool_specs {
            let _ = writeln!(
                instructions,
                "**{}**: {}\nParameters: `{}`\n",
                tool.name, tool.description, tool.parameters
            );
        }

        instructions
    }

    fn get_runtime_context(&self) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M (%A)");
        format!(
            "## Runtime Context\n\n### Current Date\n{}\n\nResolve relative dates (\"tomorrow\", \"next week\") against this date before searching.",
            timestamp
        )
    }

    pub fn build_messages(&self, history: &[Message], user_message: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.build_system_prompt())];
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(user_message));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{CreateBookingTool, FlightSearchTool, HotelSearchTool};

    fn builder_with_tools() -> ContextBuilder {
        ContextBuilder::new().with_tool_specs(vec![
            FlightSearchTool::spec(),
            HotelSearchTool::spec(),
            CreateBookingTool::spec(),
        ])
    }

    #[test]
    fn system_prompt_lists_every_tool() {
        let prompt = builder_with_tools().build_system_prompt();

        assert!(prompt.contains("travel booking assistant"));
        assert!(prompt.contains("## Tool Use Protocol"));
        assert!(prompt.contains("**search_flights**"));
        assert!(prompt.contains("**search_hotels**"));
        assert!(prompt.contains("**create_booking**"));
        assert!(prompt.contains("### Current Date"));
    }

    #[test]
    fn system_prompt_without_tools_skips_protocol_section() {
        let prompt = ContextBuilder::new().build_system_prompt();
        assert!(!prompt.contains("## Tool Use Protocol"));
        assert!(prompt.contains("### Current Date"));
    }

    #[test]
    fn build_messages_wraps_history_between_system_and_user() {
        let history = vec![
            Message::user("I want to go to Paris"),
            Message::assistant("When would you like to travel?"),
        ];

        let messages = builder_with_tools().build_messages(&history, "next Friday");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "I want to go to Paris");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "next Friday");
    }
}

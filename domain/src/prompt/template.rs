//! Prompt templates for the deliberation flow

use crate::clustering::theme::{AnswerEntry, ClusterMode};

/// Name and persona of someone in a discussion circle
#[derive(Debug, Clone, Copy)]
pub struct ParticipantRef<'a> {
    pub name: &'a str,
    pub persona: &'a str,
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Numbered list of trace entries, `[1] ...` per line
    fn numbered(entries: &[String]) -> String {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("[{}] {}", i + 1, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn recent(entries: &[String], n: usize) -> &[String] {
        &entries[entries.len().saturating_sub(n)..]
    }

    /// System prompt for an individual think call
    pub fn think_system(
        name: &str,
        persona: &str,
        trace: &[String],
        question: &str,
        extra_context: Option<&str>,
    ) -> String {
        let trace_context = if trace.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nYour previous thoughts and experiences:\n{}",
                Self::numbered(trace)
            )
        };
        let extra = match extra_context {
            Some(context) if !context.trim().is_empty() => format!("\n\n{}", context.trim()),
            _ => String::new(),
        };

        format!(
            r#"You are {name}. {persona}

Someone has come to you for advice. They are asking the community for their perspectives. Think about their question carefully from your unique perspective, then give them your honest advice.{trace_context}{extra}

Their question is: "{question}"

Respond with a JSON object containing:
- "reasoning": Your internal thought process (2-4 sentences of pondering from your character's perspective)
- "answer": Your advice to the person asking (1-3 sentences, speak directly to them using "you", give a clear position)

Respond ONLY with valid JSON, no markdown."#
        )
    }

    /// System prompt for one turn of a group discussion
    pub fn discuss_system(
        participants: &[ParticipantRef<'_>],
        question: &str,
        conversation_so_far: &str,
        speaker: ParticipantRef<'_>,
        speaker_trace: &[String],
    ) -> String {
        let names = participants
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(", ");
        let trace_context = if speaker_trace.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nYour previous thoughts:\n{}",
                Self::numbered(Self::recent(speaker_trace, 3))
            )
        };
        let conversation_context = if conversation_so_far.is_empty() {
            "\n\nYou are the first to speak.".to_string()
        } else {
            format!("\n\nThe conversation so far:\n{conversation_so_far}")
        };
        let name = speaker.name;
        let persona = speaker.persona;

        format!(
            r#"You are {name}. {persona}

You are in a group discussion with: {names}.
The topic is: "{question}"{trace_context}{conversation_context}

Respond naturally as {name}. Share your opinion in 1-3 sentences. Be conversational, not formal. Don't repeat what others have said unless you're responding to it.

Respond with a JSON object:
- "speaker": "{name}"
- "message": your response

Respond ONLY with valid JSON, no markdown."#
        )
    }

    /// System prompt for grouping answers into themes
    pub fn cluster_system(answers: &[AnswerEntry], question: &str, mode: ClusterMode) -> String {
        let answer_list = answers
            .iter()
            .map(|a| format!("[{}]: {}", a.agent_id, a.answer))
            .collect::<Vec<_>>()
            .join("\n");
        let assignment = match mode {
            ClusterMode::Exclusive => format!(
                "Each answer must belong to exactly ONE theme. Do not count the same answer in multiple themes. The total of all counts must equal exactly {}.",
                answers.len()
            ),
            ClusterMode::Overlap => {
                "An answer may touch on several themes; count it toward every theme it clearly supports.".to_string()
            }
        };

        format!(
            r#"You are analyzing crowd responses to the question: "{question}"

Here are all the individual answers (each prefixed with the agent's ID in brackets):
{answer_list}

Group these answers into common themes. {assignment}

If the question is a yes/no question, make sure "Yes" and "No" are themes.

Respond with a JSON object:
{{
  "themes": [
    {{ "label": "Theme name", "count": number, "agentIds": ["id1", "id2"], "sentiment": "positive" | "negative" | "neutral" }}
  ]
}}

The "agentIds" array MUST contain the exact agent IDs (from the brackets) of each agent whose answer belongs to that theme. The count must equal the length of the agentIds array.

Keep theme labels concise (2-5 words). Order by count descending. Respond ONLY with valid JSON, no markdown."#
        )
    }

    /// System prompt for a one-on-one chat with an agent
    pub fn chat_system(name: &str, persona: &str, trace: &[String], answer: Option<&str>) -> String {
        let trace_context = if trace.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nYour recent thoughts:\n{}",
                Self::numbered(Self::recent(trace, 3))
            )
        };
        let answer_context = match answer {
            Some(answer) if !answer.is_empty() => {
                format!("\n\nYour current position on the main question: \"{answer}\"")
            }
            _ => String::new(),
        };

        format!(
            r#"You are {name}. {persona}{trace_context}{answer_context}

A person wants to talk to you. Respond in character, naturally and conversationally, in 1-3 sentences.

Respond with a JSON object:
- "reply": your response

Respond ONLY with valid JSON, no markdown."#
        )
    }

    /// System prompt for pulling personal facts out of a conversation
    pub fn extract_system() -> &'static str {
        r#"Extract factual information about the USER from this conversation. Only extract facts that the user has directly stated or clearly implied about themselves. Each fact should be a standalone statement about the user.

Examples of good extractions:
- "User is a software engineer"
- "User lives in New York"
- "User has two children"
- "User is interested in climate change"

Do NOT extract:
- Opinions the user asked about (those are questions, not facts about them)
- Facts about other people or topics
- Speculative or uncertain information

Respond with a JSON object: { "memories": ["fact1", "fact2", ...] }
If no personal facts can be extracted, return { "memories": [] }"#
    }

    /// User message accompanying [`Self::extract_system`]
    pub fn extract_user(question: &str, conversation: &str) -> String {
        format!("Question asked: \"{question}\"\n\nConversation:\n{conversation}")
    }

    /// Extra context line for a follow-up think round
    pub fn follow_up_context(messages: &[String]) -> String {
        match messages {
            [single] => format!("The person asking followed up: \"{single}\""),
            many => {
                let list = many
                    .iter()
                    .map(|m| format!("- \"{m}\""))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("The person asking followed up:\n{list}")
            }
        }
    }

    /// Extra context built from recalled memories
    pub fn memory_context(memories: &[String]) -> Option<String> {
        if memories.is_empty() {
            return None;
        }
        let list = memories
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("Things you know about the person asking:\n{list}"))
    }
}

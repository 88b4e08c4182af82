//! Assistant sidebar state: the chat transcript, generated summaries, and the
//! bookkeeping around requests sent to the [`Assistant`].

use chrono::{DateTime, Duration, Local, NaiveDate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ChatError, StorageError};
use crate::models::{Task, TaskPriority};
use crate::storage::Storage;

const PROCESSING: &str = "Processing your request...";
const GENERIC_REPLY: &str = "I understand you'd like help with that. I specialize in task management - try asking me to create tasks, summarize your progress, or organize your schedule!";
const PROCESSED: &str = "I've processed your request successfully!";

/// Phrases that mark a message as a request to create a task.
pub const TASK_KEYWORDS: [&str; 19] = [
    "task",
    "todo",
    "remind",
    "schedule",
    "create",
    "add",
    "do",
    "need to",
    "have to",
    "should",
    "must",
    "plan",
    "appointment",
    "meeting",
    "deadline",
    "due",
    "finish",
    "complete",
    "work on",
];

/// The AI endpoints the sidebar talks to.
pub trait Assistant {
    /// Parses natural language into a new task and creates it.
    fn parse_and_create_task(&self, input: &str) -> Result<Task, ApiError>;
    /// Free-form chat, optionally scoped to some tasks or a day.
    fn chat(&self, input: &str, task_ids: &[u64], date: Option<NaiveDate>) -> Result<AssistantReply, ApiError>;
    fn summarize_tasks(&self, task_ids: &[u64]) -> Result<String, ApiError>;
    fn summarize_daily(&self, date: NaiveDate) -> Result<String, ApiError>;
    fn summarize_all(&self) -> Result<String, ApiError>;
}

/// What the chat endpoint answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    Text(String),
    TaskCreated(Task),
    /// Any other structured payload, e.g. a categorization result.
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Local>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub task_created: bool,
    #[serde(default)]
    pub task_id: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Daily,
    All,
    Selected,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Daily => "daily",
            SummaryKind::All => "all",
            SummaryKind::Selected => "selected",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SummaryKind,
    pub title: String,
    pub content: String,
    pub timestamp: DateTime<Local>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub task_ids: Vec<u64>,
}

/// Which summary to ask the assistant for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryRequest {
    Daily(NaiveDate),
    All,
    Selected(Vec<u64>),
}

impl SummaryRequest {
    pub fn kind(&self) -> SummaryKind {
        match self {
            SummaryRequest::Daily(_) => SummaryKind::Daily,
            SummaryRequest::All => SummaryKind::All,
            SummaryRequest::Selected(_) => SummaryKind::Selected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatTab {
    #[default]
    Chat,
    Summaries,
}

/// The persisted part of a chat session.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub summaries: Vec<Summary>,
    #[serde(default)]
    pub is_open: bool,
}

pub fn is_task_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    TASK_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

fn priority_marker(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "🔥",
        TaskPriority::Medium => "⚡",
        TaskPriority::Low => "📝",
    }
}

/// Renders a created task as the assistant's confirmation message.
pub fn describe_created_task(task: &Task) -> String {
    let mut out = String::from("✅ **Task Created Successfully!**\n\n");
    out.push_str(&format!("📋 **Title:** {}\n", task.title));
    if let Some(content) = task.content.as_deref().filter(|c| !c.is_empty()) {
        out.push_str(&format!("📝 **Description:** {}\n", content));
    }
    if let Some(due) = task.due_date {
        out.push_str(&format!(
            "📅 **Due Date:** {} at {}\n",
            due.format("%Y-%m-%d"),
            due.format("%H:%M")
        ));
    }
    out.push_str(&format!(
        "{} **Priority:** {}\n",
        priority_marker(task.priority),
        task.priority
    ));
    if !task.categories.is_empty() {
        let names: Vec<&str> = task.categories.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!("🏷️ **Categories:** {}\n", names.join(", ")));
    }
    out
}

fn chat_error_message(err: &ApiError) -> String {
    match err.status {
        404 => "The AI service is temporarily unavailable. Please try again later.".to_string(),
        400 => "I couldn't understand your request. Could you please rephrase it?".to_string(),
        _ if !err.message.is_empty() => err.message.clone(),
        _ => "Sorry, I couldn't process your request. Please try again.".to_string(),
    }
}

/// State of the assistant sidebar.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    summaries: Vec<Summary>,
    input: String,
    is_loading: bool,
    is_open: bool,
    active_tab: ChatTab,
    expanded_summary: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        ChatSession::default()
    }

    pub fn from_history(history: ChatHistory) -> Self {
        ChatSession {
            messages: history.messages,
            summaries: history.summaries,
            is_open: history.is_open,
            ..ChatSession::default()
        }
    }

    /// Restores the session saved in `chat.json`; unreadable data starts a fresh one.
    pub fn load(storage: &Storage) -> Self {
        match storage.load_chat() {
            Ok(history) => ChatSession::from_history(history),
            Err(e) => {
                warn!("failed to load chat history: {}", e);
                ChatSession::new()
            }
        }
    }

    pub fn history(&self) -> ChatHistory {
        ChatHistory {
            messages: self.messages.clone(),
            summaries: self.summaries.clone(),
            is_open: self.is_open,
        }
    }

    pub fn save(&self, storage: &Storage) -> Result<(), StorageError> {
        storage.save_chat(&self.history())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn has_summaries(&self) -> bool {
        !self.summaries.is_empty()
    }

    /// The first five summaries, newest first.
    pub fn recent_summaries(&self) -> Vec<&Summary> {
        let mut recent: Vec<&Summary> = self.summaries.iter().take(5).collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open_sidebar(&mut self) {
        self.is_open = true;
    }

    pub fn close_sidebar(&mut self) {
        self.is_open = false;
    }

    pub fn toggle_sidebar(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn active_tab(&self) -> ChatTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ChatTab) {
        self.active_tab = tab;
    }

    pub fn expanded_summary(&self) -> Option<&str> {
        self.expanded_summary.as_deref()
    }

    pub fn toggle_summary(&mut self, id: &str) {
        if self.expanded_summary.as_deref() == Some(id) {
            self.expanded_summary = None;
        } else {
            self.expanded_summary = Some(id.to_string());
        }
    }

    /// Appends a message and returns its id.
    pub fn add_message(&mut self, sender: Sender, content: impl Into<String>) -> String {
        let message = ChatMessage {
            id: new_id("msg"),
            sender,
            content: content.into(),
            timestamp: Local::now(),
            is_loading: false,
            error: false,
            task_created: false,
            task_id: None,
        };
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    fn add_placeholder(&mut self) -> String {
        let id = self.add_message(Sender::Ai, PROCESSING);
        self.update_message(&id, |m| m.is_loading = true);
        id
    }

    /// Applies `f` to the message with `id`. Returns `false` if there is none.
    pub fn update_message<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut ChatMessage),
    {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                f(m);
                true
            }
            None => false,
        }
    }

    pub fn remove_message(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    /// Takes the trimmed input for sending, or `None` if there is nothing to send.
    fn take_input(&mut self) -> Option<String> {
        let text = self.input.trim();
        if text.is_empty() || self.is_loading {
            return None;
        }
        let text = text.to_string();
        self.input.clear();
        Some(text)
    }

    /// Sends the input box: task-like requests are turned into tasks, anything
    /// else gets the canned help reply. Returns the id of the assistant's answer.
    pub fn send_message<S: Assistant + ?Sized>(&mut self, assistant: &S) -> Option<String> {
        let text = self.take_input()?;
        self.add_message(Sender::User, text.as_str());
        let reply_id = self.add_placeholder();
        self.is_loading = true;

        if is_task_request(&text) {
            match assistant.parse_and_create_task(&text) {
                Ok(task) => {
                    self.update_message(&reply_id, |m| {
                        m.content = format!("I've created a task for you: \"{}\"", task.title);
                        m.is_loading = false;
                        m.task_created = true;
                        m.task_id = Some(task.id);
                    });
                }
                Err(e) => {
                    warn!("assistant task creation failed: {}", e);
                    let content = if e.message.is_empty() {
                        "Sorry, I couldn't create a task from that. Could you try rephrasing?".to_string()
                    } else {
                        e.message
                    };
                    self.update_message(&reply_id, |m| {
                        m.content = content;
                        m.is_loading = false;
                        m.error = true;
                    });
                }
            }
        } else {
            self.update_message(&reply_id, |m| {
                m.content = GENERIC_REPLY.to_string();
                m.is_loading = false;
            });
        }

        self.is_loading = false;
        Some(reply_id)
    }

    /// Sends the input box to the general chat endpoint.
    pub fn send_ai_message<S: Assistant + ?Sized>(
        &mut self,
        assistant: &S,
        task_ids: &[u64],
        date: Option<NaiveDate>,
    ) -> Option<String> {
        let text = self.take_input()?;
        self.add_message(Sender::User, text.as_str());
        let reply_id = self.add_placeholder();
        self.is_loading = true;

        match assistant.chat(&text, task_ids, date) {
            Ok(reply) => {
                let (content, task_id) = match reply {
                    AssistantReply::Text(s) => (s, None),
                    AssistantReply::TaskCreated(task) => (describe_created_task(&task), Some(task.id)),
                    AssistantReply::Other => (PROCESSED.to_string(), None),
                };
                self.update_message(&reply_id, |m| {
                    m.content = content;
                    m.is_loading = false;
                    m.task_created = task_id.is_some();
                    m.task_id = task_id;
                });
            }
            Err(e) => {
                warn!("assistant chat failed: {}", e);
                let content = chat_error_message(&e);
                self.update_message(&reply_id, |m| {
                    m.content = content;
                    m.is_loading = false;
                    m.error = true;
                });
            }
        }

        self.is_loading = false;
        Some(reply_id)
    }

    /// Asks the assistant for a summary and files it.
    ///
    /// The new summary goes to the front of the list, is echoed into the chat,
    /// and the summaries tab becomes active. On failure an apology is added
    /// to the chat and the error returned.
    pub fn generate_summary<S: Assistant + ?Sized>(
        &mut self,
        assistant: &S,
        request: SummaryRequest,
    ) -> Result<Summary, ChatError> {
        let kind = request.kind();
        self.is_loading = true;
        let result = self.request_summary(assistant, request);
        self.is_loading = false;

        match result {
            Ok(summary) => {
                self.summaries.insert(0, summary.clone());
                self.add_message(Sender::Ai, format!("{}\n\n{}", summary.title, summary.content));
                self.active_tab = ChatTab::Summaries;
                debug!("generated {} summary {}", kind.as_str(), summary.id);
                Ok(summary)
            }
            Err(e) => {
                warn!("summary generation failed: {}", e);
                let detail = match &e {
                    ChatError::Api(api) if !api.message.is_empty() => api.message.clone(),
                    ChatError::Api(_) => "Please try again.".to_string(),
                    other => other.to_string(),
                };
                self.add_message(
                    Sender::Ai,
                    format!("Sorry, I couldn't generate the {} summary. {}", kind.as_str(), detail),
                );
                Err(e)
            }
        }
    }

    fn request_summary<S: Assistant + ?Sized>(
        &self,
        assistant: &S,
        request: SummaryRequest,
    ) -> Result<Summary, ChatError> {
        let kind = request.kind();
        let (title, content, date, task_ids) = match request {
            SummaryRequest::Daily(date) => {
                let content = assistant.summarize_daily(date)?;
                (
                    format!("Daily Summary - {}", date.format("%a %b %d %Y")),
                    content,
                    Some(date),
                    Vec::new(),
                )
            }
            SummaryRequest::All => {
                let content = assistant.summarize_all()?;
                ("All Tasks Summary".to_string(), content, None, Vec::new())
            }
            SummaryRequest::Selected(ids) => {
                if ids.is_empty() {
                    return Err(ChatError::NoTasksSelected);
                }
                let content = assistant.summarize_tasks(&ids)?;
                (format!("Summary of {} Selected Tasks", ids.len()), content, None, ids)
            }
        };
        Ok(Summary {
            id: new_id("summary"),
            kind,
            title,
            content,
            timestamp: Local::now(),
            date,
            task_ids,
        })
    }

    pub fn quick_summarize_today<S: Assistant + ?Sized>(&mut self, assistant: &S) -> Result<Summary, ChatError> {
        self.generate_summary(assistant, SummaryRequest::Daily(Local::now().date_naive()))
    }

    pub fn quick_summarize_all<S: Assistant + ?Sized>(&mut self, assistant: &S) -> Result<Summary, ChatError> {
        self.generate_summary(assistant, SummaryRequest::All)
    }

    pub fn quick_summarize_selected<S: Assistant + ?Sized>(
        &mut self,
        assistant: &S,
        task_ids: Vec<u64>,
    ) -> Result<Summary, ChatError> {
        self.generate_summary(assistant, SummaryRequest::Selected(task_ids))
    }

    pub fn remove_summary(&mut self, id: &str) -> bool {
        let before = self.summaries.len();
        self.summaries.retain(|s| s.id != id);
        self.summaries.len() != before
    }

    pub fn clear_summaries(&mut self) {
        self.summaries.clear();
        self.expanded_summary = None;
    }

    pub fn clear_chat(&mut self) {
        self.messages.clear();
    }

    pub fn clear_all(&mut self) {
        self.clear_chat();
        self.clear_summaries();
    }
}

pub fn format_time(at: DateTime<Local>) -> String {
    at.format("%I:%M %p").to_string()
}

/// "Today", "Yesterday", or the calendar date, relative to `now`.
pub fn format_date(at: DateTime<Local>, now: DateTime<Local>) -> String {
    let day = at.date_naive();
    let today = now.date_naive();
    if day == today {
        "Today".to_string()
    } else if Some(day) == today.pred_opt() {
        "Yesterday".to_string()
    } else {
        day.format("%Y-%m-%d").to_string()
    }
}

/// Coarse age of `at` as seen from `now`, e.g. "5m ago".
pub fn format_relative_time(at: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed < Duration::minutes(1) {
        return "Just now".to_string();
    }
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{}d ago", days);
    }
    at.date_naive().format("%Y-%m-%d").to_string()
}

mod common;

use chrono::{Duration, Local, NaiveDate};
use rstest::rstest;
use tempfile::TempDir;

use common::{task, with_due, at};
use taskscope::chat::*;
use taskscope::error::{ApiError, ChatError};
use taskscope::models::Task;
use taskscope::storage::Storage;

/// Assistant with canned answers.
#[derive(Default)]
struct FakeAssistant {
    fail_with: Option<ApiError>,
    reply: Option<AssistantReply>,
}

impl FakeAssistant {
    fn failing(status: u16, message: &str) -> Self {
        FakeAssistant { fail_with: Some(ApiError::new(status, message)), reply: None }
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Assistant for FakeAssistant {
    fn parse_and_create_task(&self, input: &str) -> Result<Task, ApiError> {
        self.check()?;
        Ok(task(42, input))
    }

    fn chat(&self, input: &str, _task_ids: &[u64], _date: Option<NaiveDate>) -> Result<AssistantReply, ApiError> {
        self.check()?;
        Ok(self.reply.clone().unwrap_or_else(|| AssistantReply::Text(format!("echo: {}", input))))
    }

    fn summarize_tasks(&self, task_ids: &[u64]) -> Result<String, ApiError> {
        self.check()?;
        Ok(format!("{} tasks reviewed", task_ids.len()))
    }

    fn summarize_daily(&self, date: NaiveDate) -> Result<String, ApiError> {
        self.check()?;
        Ok(format!("day {}", date))
    }

    fn summarize_all(&self) -> Result<String, ApiError> {
        self.check()?;
        Ok("everything".to_string())
    }
}

#[rstest]
#[case("Remind me to call mom", true)]
#[case("I NEED TO buy milk", true)]
#[case("Hello there", false)]
#[case("what's the weather", false)]
fn test_task_keyword_detection(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(is_task_request(text), expected);
}

#[test]
fn test_send_message_creates_task_for_task_requests() {
    let mut session = ChatSession::new();
    session.set_input("  add a task to water plants ");
    let reply_id = session.send_message(&FakeAssistant::default()).unwrap();

    assert_eq!(session.input(), "");
    assert!(!session.is_loading());
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].content, "add a task to water plants");

    let reply = &messages[1];
    assert_eq!(reply.id, reply_id);
    assert_eq!(reply.sender, Sender::Ai);
    assert!(reply.task_created);
    assert_eq!(reply.task_id, Some(42));
    assert!(!reply.is_loading);
    assert_eq!(reply.content, "I've created a task for you: \"add a task to water plants\"");
}

#[test]
fn test_send_message_failure_marks_reply_as_error() {
    let mut session = ChatSession::new();
    session.set_input("schedule dentist");
    session.send_message(&FakeAssistant::failing(500, "")).unwrap();
    let reply = &session.messages()[1];
    assert!(reply.error);
    assert_eq!(reply.content, "Sorry, I couldn't create a task from that. Could you try rephrasing?");
}

#[test]
fn test_send_message_without_task_keywords_gets_help_text() {
    let mut session = ChatSession::new();
    session.set_input("hello");
    session.send_message(&FakeAssistant::default()).unwrap();
    let reply = &session.messages()[1];
    assert!(!reply.task_created);
    assert!(reply.content.starts_with("I understand you'd like help"));
}

#[test]
fn test_blank_input_is_not_sent() {
    let mut session = ChatSession::new();
    session.set_input("   ");
    assert!(session.send_message(&FakeAssistant::default()).is_none());
    assert!(!session.has_messages());
}

#[rstest]
#[case(404, "ignored", "The AI service is temporarily unavailable. Please try again later.")]
#[case(400, "ignored", "I couldn't understand your request. Could you please rephrase it?")]
#[case(500, "quota exceeded", "quota exceeded")]
#[case(500, "", "Sorry, I couldn't process your request. Please try again.")]
fn test_ai_chat_error_messages(#[case] status: u16, #[case] message: &str, #[case] expected: &str) {
    let mut session = ChatSession::new();
    session.set_input("how am I doing?");
    session.send_ai_message(&FakeAssistant::failing(status, message), &[], None).unwrap();
    let reply = &session.messages()[1];
    assert!(reply.error);
    assert_eq!(reply.content, expected);
}

#[test]
fn test_ai_chat_task_reply_is_described() {
    let now = Local::now().naive_local();
    let created = with_due(task(7, "Book flights"), now + Duration::days(3));
    let assistant = FakeAssistant { fail_with: None, reply: Some(AssistantReply::TaskCreated(created)) };
    let mut session = ChatSession::new();
    session.set_input("book flights friday");
    session.send_ai_message(&assistant, &[1, 2], None).unwrap();

    let reply = &session.messages()[1];
    assert_eq!(reply.task_id, Some(7));
    assert!(reply.content.contains("**Title:** Book flights"));
    assert!(reply.content.contains("**Due Date:**"));
}

#[test]
fn test_describe_created_task_lists_fields() {
    let mut t = with_due(task(1, "Pay rent"), at(2024, 4, 1, 9, 30));
    t.content = Some("Transfer to landlord".to_string());
    let t = common::in_category(t, "3", "Home");
    let text = describe_created_task(&t);
    assert!(text.contains("📋 **Title:** Pay rent"));
    assert!(text.contains("📝 **Description:** Transfer to landlord"));
    assert!(text.contains("📅 **Due Date:** 2024-04-01 at 09:30"));
    assert!(text.contains("⚡ **Priority:** MEDIUM"));
    assert!(text.contains("🏷️ **Categories:** Home"));
}

#[test]
fn test_summaries_are_filed_newest_first() {
    let mut session = ChatSession::new();
    let assistant = FakeAssistant::default();
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let daily = session.generate_summary(&assistant, SummaryRequest::Daily(date)).unwrap();
    assert_eq!(daily.kind, SummaryKind::Daily);
    assert_eq!(daily.title, "Daily Summary - Fri Mar 15 2024");
    assert_eq!(daily.date, Some(date));

    let selected = session.quick_summarize_selected(&assistant, vec![1, 2, 3]).unwrap();
    assert_eq!(selected.title, "Summary of 3 Selected Tasks");
    assert_eq!(selected.content, "3 tasks reviewed");

    assert_eq!(session.summaries()[0].id, selected.id);
    assert_eq!(session.summaries()[1].id, daily.id);
    assert_eq!(session.active_tab(), ChatTab::Summaries);
    // each summary is echoed into the chat
    assert_eq!(session.messages().len(), 2);
}

#[test]
fn test_selected_summary_needs_tasks() {
    let mut session = ChatSession::new();
    let err = session
        .generate_summary(&FakeAssistant::default(), SummaryRequest::Selected(Vec::new()))
        .unwrap_err();
    assert!(matches!(err, ChatError::NoTasksSelected));
    assert!(!session.has_summaries());
    assert_eq!(
        session.messages()[0].content,
        "Sorry, I couldn't generate the selected summary. no tasks selected for summary"
    );
}

#[test]
fn test_failed_summary_reports_api_message() {
    let mut session = ChatSession::new();
    let err = session.quick_summarize_all(&FakeAssistant::failing(503, "busy")).unwrap_err();
    assert!(matches!(err, ChatError::Api(_)));
    assert_eq!(session.messages()[0].content, "Sorry, I couldn't generate the all summary. busy");
    assert!(!session.is_loading());
}

#[test]
fn test_clearing_and_removing() {
    let mut session = ChatSession::new();
    let assistant = FakeAssistant::default();
    let summary = session.quick_summarize_all(&assistant).unwrap();
    let msg = session.add_message(Sender::User, "note");

    session.toggle_summary(&summary.id);
    assert_eq!(session.expanded_summary(), Some(summary.id.as_str()));
    session.toggle_summary(&summary.id);
    assert_eq!(session.expanded_summary(), None);

    assert!(session.remove_message(&msg));
    assert!(!session.remove_message(&msg));
    assert!(session.remove_summary(&summary.id));

    session.quick_summarize_all(&assistant).unwrap();
    session.clear_summaries();
    assert!(!session.has_summaries());
    assert!(session.has_messages());
    session.clear_all();
    assert!(!session.has_messages());
}

#[test]
fn test_sidebar_toggles() {
    let mut session = ChatSession::new();
    assert!(!session.is_open());
    session.toggle_sidebar();
    assert!(session.is_open());
    session.close_sidebar();
    assert!(!session.is_open());
    session.open_sidebar();
    session.set_active_tab(ChatTab::Summaries);
    assert_eq!(session.active_tab(), ChatTab::Summaries);
}

#[test]
fn test_history_survives_save_and_load() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path());

    let mut session = ChatSession::new();
    session.add_message(Sender::User, "first");
    session.quick_summarize_all(&FakeAssistant::default()).unwrap();
    session.open_sidebar();
    session.save(&storage).unwrap();

    let restored = ChatSession::load(&storage);
    assert_eq!(restored.history(), session.history());
    assert!(restored.is_open());
}

#[test]
fn test_unreadable_history_starts_fresh() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("chat.json"), "[oops").unwrap();
    let restored = ChatSession::load(&Storage::new(dir.path()));
    assert!(!restored.has_messages());
}

#[test]
fn test_recent_summaries_caps_at_five() {
    let mut session = ChatSession::new();
    let assistant = FakeAssistant::default();
    for _ in 0..7 {
        session.quick_summarize_all(&assistant).unwrap();
    }
    let recent = session.recent_summaries();
    assert_eq!(recent.len(), 5);
    assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[rstest]
#[case(Duration::seconds(30), "Just now")]
#[case(Duration::minutes(5), "5m ago")]
#[case(Duration::hours(3), "3h ago")]
#[case(Duration::days(2), "2d ago")]
fn test_relative_time(#[case] age: Duration, #[case] expected: &str) {
    let now = Local::now();
    assert_eq!(format_relative_time(now - age, now), expected);
}

#[test]
fn test_format_date_names_recent_days() {
    let now = Local::now();
    assert_eq!(format_date(now, now), "Today");
    assert_eq!(format_date(now - Duration::days(1), now), "Yesterday");
    let old = now - Duration::days(30);
    assert_eq!(format_date(old, now), old.date_naive().format("%Y-%m-%d").to_string());
}

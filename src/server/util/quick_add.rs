//! Natural-language task drafts for quick add.
//!
//! Understands short English and Greek phrases such as
//! `create task 'Replace valve' for &Acme due tomorrow at 3pm urgent`. Parsing is pure:
//! the caller supplies `now` and resolves names against the database afterwards.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{
    quick_add::{EntityKind, Intent},
    task::Priority,
};

/// A symbol-prefixed reference such as `@Maria` or `#WO-1042`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMatch {
    pub kind: EntityKind,
    pub value: String,
    pub symbol: char,
    /// Byte offset of the symbol.
    pub start: usize,
    /// Byte offset just past the matched value.
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTask {
    pub intent: Intent,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub assignees: Vec<String>,
    pub work_order: Option<String>,
    pub project: Option<String>,
    pub client: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub entities: Vec<EntityMatch>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateOffset {
    Days(i64),
    Next(Weekday),
    WeekAfterNext(Weekday),
}

const SYMBOLS: [(char, EntityKind); 5] = [
    ('@', EntityKind::Personnel),
    ('#', EntityKind::WorkOrder),
    ('/', EntityKind::Task),
    ('+', EntityKind::Project),
    ('&', EntityKind::Client),
];

/// Two-word phrases come first so `next monday` is not read as plain `monday`.
const DATE_PHRASES: [(&str, DateOffset); 22] = [
    ("next week", DateOffset::Days(7)),
    ("next monday", DateOffset::WeekAfterNext(Weekday::Mon)),
    ("επόμενη εβδομάδα", DateOffset::Days(7)),
    ("επόμενη δευτέρα", DateOffset::WeekAfterNext(Weekday::Mon)),
    ("today", DateOffset::Days(0)),
    ("tomorrow", DateOffset::Days(1)),
    ("monday", DateOffset::Next(Weekday::Mon)),
    ("tuesday", DateOffset::Next(Weekday::Tue)),
    ("wednesday", DateOffset::Next(Weekday::Wed)),
    ("thursday", DateOffset::Next(Weekday::Thu)),
    ("friday", DateOffset::Next(Weekday::Fri)),
    ("saturday", DateOffset::Next(Weekday::Sat)),
    ("sunday", DateOffset::Next(Weekday::Sun)),
    ("σήμερα", DateOffset::Days(0)),
    ("αύριο", DateOffset::Days(1)),
    ("δευτέρα", DateOffset::Next(Weekday::Mon)),
    ("τρίτη", DateOffset::Next(Weekday::Tue)),
    ("τετάρτη", DateOffset::Next(Weekday::Wed)),
    ("πέμπτη", DateOffset::Next(Weekday::Thu)),
    ("παρασκευή", DateOffset::Next(Weekday::Fri)),
    ("σάββατο", DateOffset::Next(Weekday::Sat)),
    ("κυριακή", DateOffset::Next(Weekday::Sun)),
];

const STOP_WORDS: [&str; 33] = [
    "create", "task", "add", "new", "make", "schedule", "for", "in", "with", "about", "due",
    "at", "on", "the", "and", "δημιούργησε", "εργασία", "προσθήκη", "νέα", "κάνε",
    "προγραμμάτισε", "φτιάξε", "για", "σε", "με", "μέχρι", "στις", "μία", "μια", "ένα", "το",
    "η", "ο",
];

const ACTION_WORDS: [&str; 6] = ["create", "add", "make", "schedule", "update", "modify"];

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static CREATE_INTENT: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)create\s+(?:a\s+)?task|add\s+(?:a\s+)?task|new\s+task|make\s+(?:a\s+)?task|schedule\s+(?:a\s+)?task|δημιούργησε\s+(?:μία\s+|μια\s+)?εργασία|προσθήκη\s+(?:μίας\s+|μιας\s+)?εργασίας|νέα\s+εργασία|κάνε\s+(?:μία\s+|μια\s+)?εργασία|προγραμμάτισε\s+(?:μία\s+|μια\s+)?εργασία|φτιάξε\s+(?:μία\s+|μια\s+)?εργασία")
});
static UPDATE_INTENT: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)update\s+task|modify\s+task|change\s+task|edit\s+task|ενημέρωση\s+εργασίας|τροποποίηση\s+εργασίας|αλλαγή\s+εργασίας|επεξεργασία\s+εργασίας")
});
static TASK_WORD: Lazy<Regex> = Lazy::new(|| re(r"\btask\b"));

static ENTITY_VALUE: Lazy<Regex> =
    Lazy::new(|| re(r"^[\p{Latin}\p{Greek}0-9][\p{Latin}\p{Greek}0-9\s\-.]{0,30}"));
static ENTITY_END: Lazy<Regex> =
    Lazy::new(|| re(r"^(?:\s+(?:for|in|with|due|at|για|σε|με|μέχρι|στις)\b|\s*$)"));

static QUOTED: Lazy<Regex> = Lazy::new(|| re(r#"["']([^"']+)["']"#));
static TIME_AT: Lazy<Regex> = Lazy::new(|| re(r"(?i)\s+at\s+\d{1,2}:?\d{0,2}\s*(?:am|pm)?"));
static TIME_AMPM_SUFFIX: Lazy<Regex> = Lazy::new(|| re(r"(?i)\s+\d{1,2}\s*(?:am|pm)"));
static DATE_WORDS: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:today|tomorrow|monday|tuesday|wednesday|thursday|friday|saturday|sunday|next\s+week|σήμερα|αύριο|δευτέρα|τρίτη|τετάρτη|πέμπτη|παρασκευή|σάββατο|κυριακή|επόμενη\s+εβδομάδα)\b")
});
static COMMAND_WORDS: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:create|add|new|make|schedule|task|title|for|in|with|about|due|at|on|a|an|the|δημιούργησε|προσθήκη|νέα|κάνε|προγραμμάτισε|φτιάξε|εργασία|για|σε|με|μέχρι|στις|μία|μια|ένα|το|η|ο)\b")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| re(r"\s+"));
static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| re(r"^\d+$"));
static TIME_WORD: Lazy<Regex> = Lazy::new(|| re(r"(?i)^\d+:?\d*\s*(?:am|pm)?$"));

static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| re(r#"(?i)(?:description|details?|notes?):\s*["']?([^"']+)["']?"#));

static PRIORITIES: Lazy<[(Priority, Regex); 4]> = Lazy::new(|| {
    [
        (
            Priority::Urgent,
            re(r"(?i)\b(?:urgent|asap|immediately|critical|επείγον|άμεσα|κρίσιμο|επειγόντως)\b"),
        ),
        (
            Priority::High,
            re(r"(?i)\b(?:high\s+priority|important|high|υψηλή\s+προτεραιότητα|σημαντικό|υψηλό)\b"),
        ),
        (
            Priority::Medium,
            re(r"(?i)\b(?:medium\s+priority|normal|medium|μεσαία\s+προτεραιότητα|κανονικό|μεσαίο)\b"),
        ),
        (
            Priority::Low,
            re(r"(?i)\b(?:low\s+priority|low|when\s+possible|χαμηλή\s+προτεραιότητα|χαμηλό|όταν\s+είναι\s+δυνατό)\b"),
        ),
    ]
});

static TIME_HM_AMPM: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(\d{1,2}):(\d{2})\s*(am|pm)\b"));
static TIME_H_AMPM: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(\d{1,2})\s*(am|pm)\b"));
static TIME_24H: Lazy<Regex> = Lazy::new(|| re(r"\b(\d{1,2}):(\d{2})\b"));

static DUE_KEYWORD: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(?:due|by|deadline)\s+"));
static START_KEYWORD: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(?:start|begin|from)\s+"));

/// `(anywhere, anchored)` pattern pair per date phrase, in `DATE_PHRASES` order.
static DATE_PATTERNS: Lazy<Vec<(Regex, Regex, DateOffset)>> = Lazy::new(|| {
    DATE_PHRASES
        .iter()
        .map(|(phrase, offset)| {
            let body = phrase.replace(' ', r"\s+");
            (
                re(&format!(r"(?i)\b{}\b", body)),
                re(&format!(r"(?i)^{}\b", body)),
                *offset,
            )
        })
        .collect()
});

static HOURS: Lazy<Regex> = Lazy::new(|| re(r"(?i)(\d+(?:\.\d+)?)\s*(?:hours?|hrs?|h)\b"));

/// Parses free text into a task draft relative to `now`.
pub fn parse(text: &str, now: DateTime<Utc>) -> ParsedTask {
    let lower = text.trim().to_lowercase();

    let intent = detect_intent(&lower);
    let entities = extract_entities(text);
    let time = extract_time(&lower);

    let first_of = |kind: EntityKind| {
        entities
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.value.clone())
    };

    ParsedTask {
        intent,
        title: extract_title(text, &entities),
        description: extract_description(text),
        priority: extract_priority(&lower),
        assignees: entities
            .iter()
            .filter(|e| e.kind == EntityKind::Personnel)
            .map(|e| e.value.clone())
            .collect(),
        work_order: first_of(EntityKind::WorkOrder),
        project: first_of(EntityKind::Project),
        client: first_of(EntityKind::Client),
        due_date: extract_date(&lower, &DUE_KEYWORD, time, now),
        start_date: extract_date(&lower, &START_KEYWORD, time, now),
        estimated_hours: extract_hours(&lower),
        confidence: confidence(&lower, intent, entities.len()),
        entities,
    }
}

fn detect_intent(lower: &str) -> Intent {
    if CREATE_INTENT.is_match(lower) {
        return Intent::CreateTask;
    }
    if UPDATE_INTENT.is_match(lower) {
        return Intent::UpdateTask;
    }
    if TASK_WORD.is_match(lower)
        && ["for", "in", "with", "about"]
            .iter()
            .any(|w| lower.contains(w))
    {
        return Intent::CreateTask;
    }
    Intent::Unknown
}

/// Finds symbol-prefixed entities, one symbol kind at a time.
///
/// Each value is the shortest run of at most 31 value characters that is followed by a
/// stop word or the end of the text. Matches of one kind never overlap.
fn extract_entities(text: &str) -> Vec<EntityMatch> {
    let mut entities = Vec::new();

    for (symbol, kind) in SYMBOLS {
        let mut cursor = 0;

        'scan: while let Some(offset) = text[cursor..].find(symbol) {
            let start = cursor + offset;
            let value_start = start + symbol.len_utf8();
            cursor = value_start;

            let Some(candidate) = ENTITY_VALUE.find(&text[value_start..]) else {
                continue;
            };

            for (idx, c) in candidate.as_str().char_indices() {
                let end = value_start + idx + c.len_utf8();
                if ENTITY_END.is_match(&text[end..]) {
                    entities.push(EntityMatch {
                        kind,
                        value: text[value_start..end].trim().to_string(),
                        symbol,
                        start,
                        end,
                    });
                    cursor = end;
                    continue 'scan;
                }
            }
        }
    }

    entities
}

fn extract_title(text: &str, entities: &[EntityMatch]) -> String {
    if let Some(quoted) = QUOTED.captures(text).and_then(|c| c.get(1)) {
        return quoted.as_str().trim().to_string();
    }

    let mut spans: Vec<(usize, usize)> = entities.iter().map(|e| (e.start, e.end)).collect();
    spans.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    let mut clean = text.to_string();
    let mut floor = usize::MAX;
    for (start, end) in spans {
        if end <= floor {
            clean.replace_range(start..end, "");
            floor = start;
        }
    }

    let clean = TIME_AT.replace_all(&clean, "");
    let clean = TIME_AMPM_SUFFIX.replace_all(&clean, "");
    let clean = DATE_WORDS.replace_all(&clean, "");
    let clean = COMMAND_WORDS.replace_all(&clean, "");
    let clean = WHITESPACE.replace_all(&clean, " ");
    let clean = clean.trim();

    if clean.chars().count() > 2 && !ALL_DIGITS.is_match(clean) {
        let title = clean.split_whitespace().take(5).collect::<Vec<_>>().join(" ");
        if !title.is_empty() {
            return title;
        }
    }

    if let Some(entity) = entities.iter().find(|e| {
        matches!(
            e.kind,
            EntityKind::WorkOrder | EntityKind::Project | EntityKind::Client
        ) && e.value.chars().count() > 2
    }) {
        return entity.value.clone();
    }

    text.split_whitespace()
        .find(|word| {
            word.chars().count() > 3
                && !STOP_WORDS.contains(&word.to_lowercase().as_str())
                && !word.starts_with(['@', '#', '/', '+', '&'])
                && !TIME_WORD.is_match(word)
        })
        .map(str::to_string)
        .unwrap_or_else(|| "New Task".to_string())
}

fn extract_description(text: &str) -> Option<String> {
    DESCRIPTION
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty())
}

fn extract_priority(lower: &str) -> Priority {
    PRIORITIES
        .iter()
        .find(|(_, pattern)| pattern.is_match(lower))
        .map(|(priority, _)| *priority)
        .unwrap_or_default()
}

/// First valid `(hour, minute)` from `3:30pm`, `3pm` or `15:30` style times.
fn extract_time(lower: &str) -> Option<(u32, u32)> {
    let with_minutes = TIME_HM_AMPM.captures(lower).and_then(|c| {
        to_24h(
            c.get(1)?.as_str().parse().ok()?,
            c.get(2)?.as_str().parse().ok()?,
            c.get(3).map(|m| m.as_str()),
        )
    });
    if with_minutes.is_some() {
        return with_minutes;
    }

    let hour_only = TIME_H_AMPM.captures(lower).and_then(|c| {
        to_24h(
            c.get(1)?.as_str().parse().ok()?,
            0,
            c.get(2).map(|m| m.as_str()),
        )
    });
    if hour_only.is_some() {
        return hour_only;
    }

    TIME_24H.captures(lower).and_then(|c| {
        to_24h(
            c.get(1)?.as_str().parse().ok()?,
            c.get(2)?.as_str().parse().ok()?,
            None,
        )
    })
}

fn to_24h(hour: u32, minute: u32, period: Option<&str>) -> Option<(u32, u32)> {
    let hour = match period.map(str::to_lowercase).as_deref() {
        Some("pm") if hour != 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    };

    (hour <= 23 && minute <= 59).then_some((hour, minute))
}

fn extract_date(
    lower: &str,
    keyword: &Regex,
    time: Option<(u32, u32)>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    for m in keyword.find_iter(lower) {
        let rest = &lower[m.end()..];
        if let Some((_, _, offset)) = DATE_PATTERNS
            .iter()
            .find(|(_, anchored, _)| anchored.is_match(rest))
        {
            return resolve_date(*offset, time, now);
        }
    }

    DATE_PATTERNS
        .iter()
        .find(|(anywhere, _, _)| anywhere.is_match(lower))
        .and_then(|(_, _, offset)| resolve_date(*offset, time, now))
}

/// Days until the next `target`, strictly after today.
fn days_until(now: DateTime<Utc>, target: Weekday) -> i64 {
    let today = now.weekday().num_days_from_monday() as i64;
    let ahead = (target.num_days_from_monday() as i64 - today).rem_euclid(7);
    if ahead == 0 {
        7
    } else {
        ahead
    }
}

fn resolve_date(
    offset: DateOffset,
    time: Option<(u32, u32)>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let days = match offset {
        DateOffset::Days(days) => days,
        DateOffset::Next(weekday) => days_until(now, weekday),
        DateOffset::WeekAfterNext(weekday) => 7 + days_until(now, weekday),
    };
    let date = now.checked_add_signed(Duration::days(days))?;

    match time {
        None => Some(date),
        Some((hour, minute)) => date
            .date_naive()
            .and_hms_opt(hour, minute, 0)
            .map(|naive| naive.and_utc()),
    }
}

fn extract_hours(lower: &str) -> Option<f64> {
    HOURS
        .captures(lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn confidence(lower: &str, intent: Intent, entity_count: usize) -> f64 {
    let mut score = 0.0;

    if intent != Intent::Unknown {
        score += 0.4;
    }
    score += f64::min(0.3, entity_count as f64 * 0.1);
    if TASK_WORD.is_match(lower) {
        score += 0.2;
    }
    if ACTION_WORDS.iter().any(|w| lower.contains(w)) {
        score += 0.1;
    }

    f64::min(1.0, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Wednesday 2025-01-08 10:00 UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 0, 0).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Tests a full English command with a quoted title, client, date, time and priority.
    ///
    /// Expected: quoted title wins, client stops before `due`, due date is tomorrow 15:00
    #[test]
    fn parses_full_english_command() {
        let parsed = parse(
            "Create task 'Replace water heater' for &Acme Plumbing due tomorrow at 3pm high priority",
            now(),
        );

        assert_eq!(parsed.intent, Intent::CreateTask);
        assert_eq!(parsed.title, "Replace water heater");
        assert_eq!(parsed.client.as_deref(), Some("Acme Plumbing"));
        assert_eq!(parsed.priority, Priority::High);
        assert_eq!(parsed.due_date, Some(at(9, 15, 0)));
        // No start keyword, so the standalone date applies to the start as well.
        assert_eq!(parsed.start_date, Some(at(9, 15, 0)));
        assert!(approx(parsed.confidence, 0.8));
    }

    /// Tests that assignee names run to the end of the text and are removed from the title.
    #[test]
    fn extracts_assignee_and_builds_title() {
        let parsed = parse("Add task fix leaking sink @Maria Lopez", now());

        assert_eq!(parsed.assignees, vec!["Maria Lopez".to_string()]);
        assert_eq!(parsed.title, "fix leaking sink");
        assert_eq!(parsed.priority, Priority::Medium);
        assert_eq!(parsed.due_date, None);
        assert_eq!(parsed.entities[0].symbol, '@');
    }

    /// Tests Greek input with a 24-hour time.
    ///
    /// Expected: `15:30` keeps its minutes and `επείγον` is urgent
    #[test]
    fn parses_greek_command_with_24h_time() {
        let parsed = parse(
            "Δημιούργησε εργασία επισκευή λέβητα αύριο στις 15:30 επείγον",
            now(),
        );

        assert_eq!(parsed.intent, Intent::CreateTask);
        assert_eq!(parsed.priority, Priority::Urgent);
        assert_eq!(parsed.due_date, Some(at(9, 15, 30)));
        assert!(parsed.title.starts_with("επισκευή λέβητα"));
        assert!(approx(parsed.confidence, 0.4));
    }

    /// Tests that priority words and entity stop words only match whole words.
    ///
    /// Expected: `follow` is not `low`, and `Industrial` does not stop at `in`
    #[test]
    fn matches_keywords_as_whole_words() {
        let parsed = parse("Add task follow up with &Acme Industrial", now());

        assert_eq!(parsed.priority, Priority::Medium);
        assert_eq!(parsed.client.as_deref(), Some("Acme Industrial"));
    }

    /// Tests that weekdays always resolve to a future date, keeping the current time.
    #[test]
    fn resolves_weekdays_strictly_in_future() {
        let friday = parse("new task boiler check friday", now());
        let wednesday = parse("new task boiler check wednesday", now());
        let next_monday = parse("add task gutter cleaning next monday", now());

        assert_eq!(friday.title, "boiler check");
        assert_eq!(friday.due_date, Some(at(10, 10, 0)));
        assert_eq!(wednesday.due_date, Some(at(15, 10, 0)));
        assert_eq!(next_monday.due_date, Some(at(20, 10, 0)));
    }

    /// Tests that a keyword followed by a date beats the table order.
    #[test]
    fn keyword_dates_take_priority() {
        let parsed = parse("create task roof repair start today due friday", now());

        assert_eq!(parsed.due_date, Some(at(10, 10, 0)));
        assert_eq!(parsed.start_date, Some(at(8, 10, 0)));
    }

    #[test]
    fn parses_minutes_with_meridiem() {
        let parsed = parse("add task call client tomorrow at 3:30pm", now());

        assert_eq!(parsed.due_date, Some(at(9, 15, 30)));
    }

    #[test]
    fn extracts_hours_and_description() {
        let parsed = parse(
            "create task install thermostat 2.5 hours notes: bring ladder",
            now(),
        );

        assert_eq!(parsed.estimated_hours, Some(2.5));
        assert_eq!(parsed.description.as_deref(), Some("bring ladder"));
    }

    /// Tests entity values stopping at a stop word and the entity title fallback.
    #[test]
    fn falls_back_to_entity_title() {
        let parsed = parse("create task #WO-1042 for &Acme", now());

        assert_eq!(parsed.work_order.as_deref(), Some("WO-1042"));
        assert_eq!(parsed.client.as_deref(), Some("Acme"));
        assert_eq!(parsed.title, "WO-1042");
        assert!(approx(parsed.confidence, 0.9));
    }

    #[test]
    fn falls_back_to_new_task() {
        assert_eq!(parse("add task", now()).title, "New Task");
    }

    #[test]
    fn detects_update_and_fallback_intents() {
        assert_eq!(
            parse("update task paint fence", now()).intent,
            Intent::UpdateTask
        );
        assert_eq!(
            parse("task for the garage door", now()).intent,
            Intent::CreateTask
        );

        let unknown = parse("hello there", now());
        assert_eq!(unknown.intent, Intent::Unknown);
        assert!(approx(unknown.confidence, 0.0));
    }

    /// Tests that priority words must be whole words.
    ///
    /// Expected: `follow` does not read as `low`
    #[test]
    fn priority_requires_whole_words() {
        assert_eq!(
            parse("add task follow up with client", now()).priority,
            Priority::Medium
        );
        assert_eq!(
            parse("add task fix gate asap", now()).priority,
            Priority::Urgent
        );
    }
}

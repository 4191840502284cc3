//! Date buckets for the session sidebar.

use chrono::{DateTime, TimeZone};

use super::model::ChatSession;

/// Number of days (before yesterday included) covered by "Previous 7 days".
const PREVIOUS_DAYS_WINDOW: i64 = 7;

/// Sessions bucketed by creation date relative to "now".
///
/// Only `today`, `yesterday` and `previous_seven_days` make up the default
/// grouped view. Sessions outside those buckets land in `omitted`; they are
/// not deleted, just not shown by the default view.
#[derive(Debug, Default)]
pub struct SessionGroups<'a> {
    pub today: Vec<&'a ChatSession>,
    pub yesterday: Vec<&'a ChatSession>,
    pub previous_seven_days: Vec<&'a ChatSession>,
    pub omitted: Vec<&'a ChatSession>,
}

impl<'a> SessionGroups<'a> {
    /// The named buckets in display order, skipping empty ones.
    pub fn labeled(&self) -> Vec<(&'static str, &[&'a ChatSession])> {
        [
            ("Today", self.today.as_slice()),
            ("Yesterday", self.yesterday.as_slice()),
            ("Previous 7 days", self.previous_seven_days.as_slice()),
        ]
        .into_iter()
        .filter(|(_, sessions)| !sessions.is_empty())
        .collect()
    }

    /// Number of sessions visible in the grouped view.
    pub fn visible_len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.previous_seven_days.len()
    }
}

/// Buckets sessions by their creation date, truncated to midnight in the
/// timezone of `now`.
pub fn group_sessions<'a, Tz: TimeZone>(
    sessions: &'a [ChatSession],
    now: &DateTime<Tz>,
) -> SessionGroups<'a> {
    let timezone = now.timezone();
    let today = now.date_naive();
    let mut groups = SessionGroups::default();

    for session in sessions {
        let created = session.created_at.with_timezone(&timezone).date_naive();
        match (today - created).num_days() {
            0 => groups.today.push(session),
            1 => groups.yesterday.push(session),
            days if (2..=PREVIOUS_DAYS_WINDOW).contains(&days) => {
                groups.previous_seven_days.push(session)
            }
            _ => groups.omitted.push(session),
        }
    }

    groups
}

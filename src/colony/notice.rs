use std::{collections::VecDeque, fmt, time::Duration};

use serde::Serialize;

use crate::colony::ledger::Amounts;

const DEFAULT_LIFETIME: Duration = Duration::from_millis(2000);

/// Player-facing messages. The presentation layer decides how they look.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    PlaceBuilding { name: String },
    PendingReplaced { previous: String },
    InsufficientResources,
    UpgradeUnaffordable { cost: Amounts },
    Locked { reason: String },
    InvalidPlacement { x: i32, y: i32 },
    Upgraded { level: u32 },
    MaxLevel { level: u32 },
    FirstMaterials,
    Starving,
    QuestComplete { text: String },
    Event { text: String },
}

impl NoticeKind {
    fn lifetime(&self) -> Duration {
        match self {
            NoticeKind::Starving => Duration::from_millis(3000),
            NoticeKind::FirstMaterials => Duration::from_millis(2500),
            _ => DEFAULT_LIFETIME,
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::PlaceBuilding { name } => write!(f, "Place: {name}"),
            NoticeKind::PendingReplaced { previous } => {
                write!(f, "{previous} was not placed and is replaced")
            }
            NoticeKind::InsufficientResources => write!(f, "Not enough resources!"),
            NoticeKind::UpgradeUnaffordable { .. } => {
                write!(f, "Not enough resources to upgrade!")
            }
            NoticeKind::Locked { reason } => write!(f, "Locked: {reason}"),
            NoticeKind::InvalidPlacement { x, y } => write!(f, "Cannot build at ({x}, {y})"),
            NoticeKind::Upgraded { level } => write!(f, "Building upgraded to level {level}!"),
            NoticeKind::MaxLevel { level } => write!(f, "Already at max level {level}"),
            NoticeKind::FirstMaterials => write!(f, "You gathered your first materials!"),
            NoticeKind::Starving => write!(f, "Colonists are dying of hunger or thirst..."),
            NoticeKind::QuestComplete { text } => write!(f, "Quest complete: {text}"),
            NoticeKind::Event { text } => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    #[serde(flatten)]
    pub kind: NoticeKind,
    pub text: String,
    #[serde(skip)]
    pub remaining: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn push(&mut self, kind: NoticeKind) {
        tracing::debug!("Notice: {}", kind);
        self.queue.push_back(Notice {
            text: kind.to_string(),
            remaining: kind.lifetime(),
            kind,
        });
    }

    /// Age every notice by `dt` and drop the expired ones.
    pub fn update(&mut self, dt: Duration) {
        for notice in &mut self.queue {
            notice.remaining = notice.remaining.saturating_sub(dt);
        }
        self.queue.retain(|notice| !notice.remaining.is_zero());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_expire() {
        let mut notices = Notices::default();
        notices.push(NoticeKind::InsufficientResources);
        notices.push(NoticeKind::Starving);

        notices.update(Duration::from_millis(2000));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices.last().unwrap().kind, NoticeKind::Starving);

        notices.update(Duration::from_millis(1000));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_notice_serializes_flat() {
        let mut notices = Notices::default();
        notices.push(NoticeKind::Upgraded { level: 2 });
        let json = serde_json::to_value(notices.last().unwrap()).unwrap();
        assert_eq!(json["kind"], "upgraded");
        assert_eq!(json["level"], 2);
        assert_eq!(json["text"], "Building upgraded to level 2!");
    }
}

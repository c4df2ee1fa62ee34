use tracing::warn;

use crate::domain::notification::Notification;
use crate::store::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Notification slice: wire records newest first, plus the resync status.
#[derive(Debug, Clone, Default)]
pub struct NotificationsSlice {
    pub records: Vec<String>,
    pub status: FetchStatus,
    pub error: Option<String>,
}

impl NotificationsSlice {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn decoded(&self) -> Vec<Notification> {
        self.records
            .iter()
            .filter_map(|record| Notification::decode(record))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<Notification> {
        self.decoded()
            .into_iter()
            .find(|notification| notification.id == id)
    }
}

pub(crate) fn reduce(slice: &mut NotificationsSlice, action: &Action) {
    match action {
        Action::AddNotification { record } => add(slice, record),
        Action::DeleteNotification { id } => {
            slice.records.retain(|record| {
                Notification::decode_id(record)
                    .map(|decoded| decoded != *id)
                    .unwrap_or(true)
            });
        }
        Action::ClearNotifications => slice.records.clear(),
        Action::FetchNotificationsPending => slice.status = FetchStatus::Loading,
        Action::FetchNotificationsSucceeded { records } => {
            slice.status = FetchStatus::Succeeded;
            slice.error = None;
            slice.records = records
                .iter()
                .filter(|record| {
                    let valid = Notification::decode(record).is_some();
                    if !valid {
                        warn!(record = %record, "discarding malformed notification record");
                    }
                    valid
                })
                .cloned()
                .collect();
        }
        Action::FetchNotificationsFailed { error } => {
            slice.status = FetchStatus::Failed;
            slice.error = Some(error.clone());
        }
        _ => {}
    }
}

fn add(slice: &mut NotificationsSlice, record: &str) {
    let Some(id) = Notification::decode_id(record) else {
        warn!(record = %record, "discarding malformed notification record");
        return;
    };
    let duplicate = slice
        .records
        .iter()
        .any(|existing| Notification::decode_id(existing).as_deref() == Some(id.as_str()));
    if !duplicate {
        slice.records.insert(0, record.to_string());
    }
}

use chrono::NaiveDate;
use tokio::sync::watch;

/// The UI's navigation cursor.
///
/// The UI moves it with [`DateCursor::navigate`]; a finished walk moves it
/// with [`DateCursor::commit_resolved`], which only applies while the cursor
/// still points at the date the walk started from. A walk that completes
/// after the user has moved on therefore never drags the view back.
#[derive(Debug)]
pub struct DateCursor {
    tx: watch::Sender<NaiveDate>,
}

impl DateCursor {
    pub fn new(initial: NaiveDate) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> NaiveDate {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NaiveDate> {
        self.tx.subscribe()
    }

    pub fn navigate(&self, date: NaiveDate) {
        self.tx.send_if_modified(|current| {
            if *current == date {
                return false;
            }
            *current = date;
            true
        });
    }

    /// Returns true if the cursor now points at `final_date`.
    pub fn commit_resolved(
        &self,
        requested: NaiveDate,
        final_date: NaiveDate,
    ) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|current| {
            if *current != requested {
                return false;
            }
            applied = true;
            if *current == final_date {
                return false;
            }
            *current = final_date;
            true
        });
        applied
    }
}

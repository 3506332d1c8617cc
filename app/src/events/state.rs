//! Event screen state.

use eventos_data::{Comment, Event, EventId, Rating, SampleCatalog};

/// One of the three event lists the screens show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventList {
    /// Every event, ascending by date.
    All,
    /// Events after now, ascending by date.
    Upcoming,
    /// Events before now, most recent first.
    Past,
}

impl EventList {
    /// Sort `events` into this list's display order.
    pub fn sort(self, events: &mut [Event]) {
        match self {
            Self::All | Self::Upcoming => events.sort_by(|a, b| a.date.cmp(&b.date)),
            Self::Past => events.sort_by(|a, b| b.date.cmp(&a.date)),
        }
    }

    /// The demo events belonging to this list.
    #[must_use]
    pub fn samples(self, catalog: &SampleCatalog) -> Vec<Event> {
        match self {
            Self::All => catalog.all(),
            Self::Upcoming => catalog.upcoming().to_vec(),
            Self::Past => catalog.past().to_vec(),
        }
    }
}

/// Which parts of the screen are waiting on the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    /// The all-events list.
    pub events: bool,
    /// The upcoming list.
    pub upcoming: bool,
    /// The past list.
    pub past: bool,
    /// The current event and its comments.
    pub details: bool,
    /// A create or update in flight.
    pub saving: bool,
}

impl LoadingFlags {
    /// Returns `true` if anything is loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.events || self.upcoming || self.past || self.details || self.saving
    }

    /// The flag for one list.
    pub fn list_mut(&mut self, list: EventList) -> &mut bool {
        match list {
            EventList::All => &mut self.events,
            EventList::Upcoming => &mut self.upcoming,
            EventList::Past => &mut self.past,
        }
    }
}

/// Everything the event screens render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventState {
    /// All events.
    pub events: Vec<Event>,
    /// Upcoming events.
    pub upcoming_events: Vec<Event>,
    /// Past events.
    pub past_events: Vec<Event>,
    /// The event whose details were last requested.
    pub selected_event: Option<EventId>,
    /// The event being viewed.
    pub current_event: Option<Event>,
    /// Comments on the viewed event, newest first.
    pub comments: Vec<Comment>,
    /// The signed-in user's rating of the viewed event.
    pub user_rating: Option<Rating>,
    /// Loading indicators.
    pub loading: LoadingFlags,
    /// Error banner.
    pub error_message: Option<String>,
}

impl EventState {
    /// Returns `true` if anything is loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// The held rows of one list.
    #[must_use]
    pub fn list(&self, list: EventList) -> &[Event] {
        match list {
            EventList::All => &self.events,
            EventList::Upcoming => &self.upcoming_events,
            EventList::Past => &self.past_events,
        }
    }

    /// Mutable access to one list.
    pub fn list_mut(&mut self, list: EventList) -> &mut Vec<Event> {
        match list {
            EventList::All => &mut self.events,
            EventList::Upcoming => &mut self.upcoming_events,
            EventList::Past => &mut self.past_events,
        }
    }

    /// The event on the details screen: the requested one, else the loaded one.
    #[must_use]
    pub fn viewed_id(&self) -> Option<&EventId> {
        self.selected_event
            .as_ref()
            .or_else(|| self.current_event.as_ref().map(|event| &event.id))
    }

    /// Returns `true` if `event_id` is the event being viewed.
    #[must_use]
    pub fn is_viewing(&self, event_id: &EventId) -> bool {
        self.viewed_id() == Some(event_id)
    }

    /// Returns `true` unless the details screen shows some other event.
    ///
    /// Outcomes for an event the user navigated away from must not touch
    /// the details, comments or rating on screen.
    #[must_use]
    pub fn accepts(&self, event_id: &EventId) -> bool {
        self.viewed_id().is_none_or(|viewed| viewed == event_id)
    }
}

/// Decide what a list shows after a fetch.
///
/// Fetched rows win, topped up with demo rows not already present when
/// `merge_samples` is set. An empty fetch keeps whatever was held, and only
/// falls back to the demo rows when nothing was.
#[must_use]
pub fn resolve_list(
    list: EventList,
    fetched: Vec<Event>,
    held: &[Event],
    samples: &[Event],
    merge_samples: bool,
) -> Vec<Event> {
    let mut rows = if !fetched.is_empty() {
        let mut rows = fetched;
        if merge_samples {
            let missing: Vec<Event> = samples
                .iter()
                .filter(|sample| rows.iter().all(|row| row.id != sample.id))
                .cloned()
                .collect();
            rows.extend(missing);
        }
        rows
    } else if !held.is_empty() {
        return held.to_vec();
    } else {
        samples.to_vec()
    };
    list.sort(&mut rows);
    rows
}

//! Built-in demo events.
//!
//! Shown when the backend is empty or unreachable, and used to seed the
//! local repository. Dates are relative to the moment the catalog is built
//! so two events are always upcoming and one is always past.

use crate::model::{Event, EventId, UserId};
use chrono::{DateTime, Duration, Utc};

/// The fixed set of demo events, anchored at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCatalog {
    upcoming: Vec<Event>,
    past: Vec<Event>,
}

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    offset_days: i64,
    time: &'static str,
    location: &'static str,
    organizer_id: &'static str,
    organizer_name: &'static str,
    attendees: &'static [&'static str],
    average_rating: f64,
    total_ratings: u32,
}

const UPCOMING: [Seed; 2] = [
    Seed {
        id: "sample-entrepreneurs-fair",
        title: "Entrepreneurs Fair",
        description: "A local fair supporting small businesses, with stands, inspiring talks and networking.",
        offset_days: 1,
        time: "10:00 AM",
        location: "Central Park",
        organizer_id: "demo_organizer",
        organizer_name: "Local Community",
        attendees: &["demo_user"],
        average_rating: 4.6,
        total_ratings: 32,
    },
    Seed {
        id: "sample-beach-cleanup",
        title: "Beach Cleanup",
        description: "A community morning cleaning the beach and raising awareness about caring for the coast.",
        offset_days: 2,
        time: "8:00 AM",
        location: "Blue Beach",
        organizer_id: "demo_environment",
        organizer_name: "Ocean Guardians",
        attendees: &["demo_user", "demo_friend"],
        average_rating: 4.9,
        total_ratings: 18,
    },
];

const PAST: [Seed; 1] = [Seed {
    id: "sample-food-festival",
    title: "Food Festival",
    description: "Traditional dishes and live music to raise funds for the neighborhood.",
    offset_days: -3,
    time: "5:00 PM",
    location: "Cultural Center",
    organizer_id: "demo_foodies",
    organizer_name: "Neighborhood Flavors",
    attendees: &["demo_user"],
    average_rating: 4.8,
    total_ratings: 45,
}];

impl Seed {
    fn build(&self, now: DateTime<Utc>) -> Event {
        Event {
            id: EventId::new(self.id),
            title: self.title.to_string(),
            description: self.description.to_string(),
            date: now + Duration::days(self.offset_days),
            time: self.time.to_string(),
            location: self.location.to_string(),
            organizer_id: UserId::new(self.organizer_id),
            organizer_name: self.organizer_name.to_string(),
            created_at: now,
            attendees: self.attendees.iter().copied().map(UserId::new).collect(),
            image_url: None,
            average_rating: self.average_rating,
            total_ratings: self.total_ratings,
        }
    }
}

impl SampleCatalog {
    /// Build the catalog relative to `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            upcoming: UPCOMING.iter().map(|seed| seed.build(now)).collect(),
            past: PAST.iter().map(|seed| seed.build(now)).collect(),
        }
    }

    /// Demo events dated after the anchor.
    #[must_use]
    pub fn upcoming(&self) -> &[Event] {
        &self.upcoming
    }

    /// Demo events dated before the anchor.
    #[must_use]
    pub fn past(&self) -> &[Event] {
        &self.past
    }

    /// Every demo event, upcoming first.
    #[must_use]
    pub fn all(&self) -> Vec<Event> {
        self.upcoming.iter().chain(&self.past).cloned().collect()
    }

    /// Look up a demo event by id.
    #[must_use]
    pub fn find(&self, id: &EventId) -> Option<&Event> {
        self.upcoming.iter().chain(&self.past).find(|event| &event.id == id)
    }
}

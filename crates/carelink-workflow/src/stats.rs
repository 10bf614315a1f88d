//! Aggregates over requests and reviews.

use carelink_core::models::review::Review;
use carelink_core::models::service_request::{RequestStatus, ServiceRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub pending: usize,
    /// Pending or in progress.
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

impl RequestCounts {
    pub fn tally<'a>(requests: impl IntoIterator<Item = &'a ServiceRequest>) -> Self {
        requests
            .into_iter()
            .fold(Self::default(), |mut counts, request| {
                counts.total += 1;
                match request.status {
                    RequestStatus::Pending => {
                        counts.pending += 1;
                        counts.active += 1;
                    }
                    RequestStatus::InProgress => counts.active += 1,
                    RequestStatus::Completed => counts.completed += 1,
                }
                counts
            })
    }
}

/// Mean rating, or `0.0` with no reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(sum) / reviews.len() as f64
}

/// Anything carrying a creation time, for "most recent" listings.
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for ServiceRequest {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Timestamped for Review {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Sort newest first. Items without a timestamp sort last.
pub fn sort_newest_first<T: Timestamped>(items: &mut [T]) {
    // `None < Some(_)`, so a descending sort puts unset timestamps last.
    items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

/// The `n` newest items, newest first.
pub fn recent<T: Timestamped>(mut items: Vec<T>, n: usize) -> Vec<T> {
    sort_newest_first(&mut items);
    items.truncate(n);
    items
}

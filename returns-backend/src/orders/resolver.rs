//! Return order listing over the carrier tracking endpoint
//!
//! The tracking endpoint has no "list my return orders" call, so a fixed set
//! of filters is probed in order and the first one that yields records wins.
//! The records are then narrowed, classified and paginated in memory.

use chrono::{DateTime, Utc};

use returns_common::{FilterType, OrderPage, TrackingFilter, TrackingRecord};

use super::classify::is_reverse_order;
use super::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, paginate};
use super::presenter::to_order_view;
use super::probe::{Probe, try_in_order};
use crate::carrier::CarrierClient;

/// Reverse initiated, reverse approved, reverse pickup done
pub const PROBE_STATUS_CODES: &[&str] = &["R085", "R087", "R100"];

const REVERSE_ORDER_TYPE: &str = "REVERSE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilters {
    pub page: usize,
    pub limit: usize,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl Default for ListFilters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            status: None,
            search: None,
        }
    }
}

impl ListFilters {
    fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// What a search term looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// All digits
    AirwayBill,
    /// Starts with `#`
    OrderNumber,
    FreeText,
}

impl SearchKind {
    pub fn of(search: &str) -> Self {
        if !search.is_empty() && search.chars().all(|c| c.is_ascii_digit()) {
            SearchKind::AirwayBill
        } else if search.starts_with('#') {
            SearchKind::OrderNumber
        } else {
            SearchKind::FreeText
        }
    }
}

/// Filter tried right after the empty payload.
pub fn initial_filter(search: Option<&str>) -> TrackingFilter {
    match search.map(|s| (s, SearchKind::of(s))) {
        Some((s, SearchKind::AirwayBill)) => TrackingFilter::by(FilterType::AirwayBill, s),
        Some((s, SearchKind::OrderNumber)) => TrackingFilter::by(FilterType::OrderNumber, s),
        _ => TrackingFilter::by(FilterType::OrderType, REVERSE_ORDER_TYPE),
    }
}

/// Probe order, duplicates removed (first occurrence kept).
pub fn strategies(search: Option<&str>) -> Vec<TrackingFilter> {
    let candidates = std::iter::once(TrackingFilter::all())
        .chain(std::iter::once(initial_filter(search)))
        .chain(
            PROBE_STATUS_CODES
                .iter()
                .map(|code| TrackingFilter::by(FilterType::StatusCode, *code)),
        )
        .chain(std::iter::once(TrackingFilter::by(
            FilterType::OrderType,
            REVERSE_ORDER_TYPE,
        )));

    let mut unique: Vec<TrackingFilter> = Vec::new();
    for filter in candidates {
        if !unique.contains(&filter) {
            unique.push(filter);
        }
    }
    unique
}

/// Result of probing the carrier
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome<T> {
    Found { strategy: TrackingFilter, data: T },
    /// At least one strategy answered, none had records
    Empty,
    /// Every strategy failed
    UpstreamError(String),
}

impl<T> ResolveOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolveOutcome<U> {
        match self {
            ResolveOutcome::Found { strategy, data } => ResolveOutcome::Found {
                strategy,
                data: f(data),
            },
            ResolveOutcome::Empty => ResolveOutcome::Empty,
            ResolveOutcome::UpstreamError(reason) => ResolveOutcome::UpstreamError(reason),
        }
    }
}

/// Probe `strategies` in order and stop at the first one with records.
pub async fn resolve_tracking(
    client: &CarrierClient,
    strategies: &[TrackingFilter],
) -> ResolveOutcome<Vec<TrackingRecord>> {
    let probe = try_in_order(
        strategies,
        |filter| async move {
            tracing::info!("Fetching orders with strategy: {}", filter.label());
            client.track(filter).await
        },
        |response| response.has_data(),
    )
    .await;

    match probe {
        Probe::Accepted { strategy, value, .. } => {
            tracing::info!(
                "Strategy {} found {} orders",
                strategy.label(),
                value.tracking.len()
            );
            ResolveOutcome::Found {
                strategy: strategy.clone(),
                data: value.tracking,
            }
        }
        Probe::Exhausted { rejected, failed } => {
            for (filter, e) in &failed {
                tracing::warn!("Strategy {} failed: {}", filter.label(), e);
            }
            if !rejected.is_empty() {
                tracing::info!("No strategy returned tracking data");
                ResolveOutcome::Empty
            } else {
                let reason = failed
                    .iter()
                    .map(|(filter, e)| format!("{}: {}", filter.label(), e))
                    .collect::<Vec<_>>()
                    .join("; ");
                tracing::error!("All tracking strategies failed");
                ResolveOutcome::UpstreamError(reason)
            }
        }
    }
}

fn matches_free_text(record: &TrackingRecord, term: &str) -> bool {
    let lowered = term.to_lowercase();
    record.orderno.contains(term)
        || record
            .tracking_history
            .iter()
            .any(|h| h.remarks.to_lowercase().contains(&lowered))
}

/// Status filter, free-text search, then (without a search) reverse
/// classification.
pub fn narrow(records: Vec<TrackingRecord>, filters: &ListFilters) -> Vec<TrackingRecord> {
    let status = filters.status().map(str::to_uppercase);
    let search = filters.search();

    records
        .into_iter()
        .filter(|r| {
            status
                .as_deref()
                .is_none_or(|s| r.latest_status.to_uppercase().contains(s))
        })
        .filter(|r| match search {
            Some(term) if SearchKind::of(term) == SearchKind::FreeText => {
                matches_free_text(r, term)
            }
            _ => true,
        })
        .filter(|r| search.is_some() || is_reverse_order(r))
        .collect()
}

/// One page of return orders for the dashboard table.
pub async fn list_return_orders(
    client: &CarrierClient,
    filters: &ListFilters,
    now: DateTime<Utc>,
) -> ResolveOutcome<OrderPage> {
    let strategies = strategies(filters.search());

    resolve_tracking(client, &strategies).await.map(|records| {
        let total_received = records.len();
        let records = narrow(records, filters);
        tracing::debug!(
            "{} of {} tracking records kept after filtering",
            records.len(),
            total_received
        );

        let (slice, pagination) = paginate(&records, filters.page, filters.limit);
        OrderPage {
            orders: slice.iter().map(|r| to_order_view(r, now)).collect(),
            pagination,
        }
    })
}

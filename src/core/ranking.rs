use std::cmp::Ordering;

use crate::core::{filters, geo};
use crate::models::{Coordinate, Event, EventFilters, Organizer, OrganizerFilters};

/// Anything with a place on the map; lets the pipeline treat events and
/// organizers uniformly.
pub trait Geolocated {
    fn coordinate(&self) -> Coordinate;
}

impl Geolocated for Event {
    fn coordinate(&self) -> Coordinate {
        self.location.coordinate()
    }
}

impl Geolocated for Organizer {
    fn coordinate(&self) -> Coordinate {
        self.location.coordinate()
    }
}

/// A candidate with its derived distance, when an origin was supplied.
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub item: T,
    pub distance: Option<f64>,
}

/// Sort keys for event listings. Unknown keys keep the candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSortKey {
    Distance,
    Date,
    Rating,
    Price,
    Unspecified,
}

impl EventSortKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "distance" => EventSortKey::Distance,
            "date" => EventSortKey::Date,
            "rating" => EventSortKey::Rating,
            "price" => EventSortKey::Price,
            _ => EventSortKey::Unspecified,
        }
    }
}

/// Sort keys for organizer listings. Unknown keys keep the candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizerSortKey {
    Distance,
    Rating,
    Events,
    Name,
    Unspecified,
}

impl OrganizerSortKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "distance" => OrganizerSortKey::Distance,
            "rating" => OrganizerSortKey::Rating,
            "events" => OrganizerSortKey::Events,
            "name" => OrganizerSortKey::Name,
            _ => OrganizerSortKey::Unspecified,
        }
    }
}

/// Attach distances and apply the max-distance bound.
///
/// Without an origin no distance exists, so the bound cannot exclude anyone.
/// With an origin, candidates strictly beyond the bound are dropped; a
/// candidate exactly at the bound is kept.
pub fn annotate_within<T: Geolocated>(
    items: Vec<T>,
    origin: Option<Coordinate>,
    max_distance: Option<f64>,
) -> Vec<Ranked<T>> {
    items
        .into_iter()
        .filter_map(|item| {
            let distance = origin.map(|from| geo::distance_miles(from, item.coordinate()));
            if let (Some(d), Some(bound)) = (distance, max_distance) {
                if d > bound {
                    return None;
                }
            }
            Some(Ranked { item, distance })
        })
        .collect()
}

fn by_distance<T>(a: &Ranked<T>, b: &Ranked<T>) -> Ordering {
    // Missing distances sort last.
    let da = a.distance.unwrap_or(f64::INFINITY);
    let db = b.distance.unwrap_or(f64::INFINITY);
    da.partial_cmp(&db).unwrap_or(Ordering::Equal)
}

/// Full event pipeline: filter, annotate, bound, sort, truncate.
///
/// Sorts are stable, so candidates that compare equal keep their input order.
pub fn rank_events(events: Vec<Event>, params: &EventFilters) -> Vec<Ranked<Event>> {
    let candidates: Vec<Event> = events
        .into_iter()
        .filter(|event| filters::event_matches(event, params))
        .collect();

    let mut ranked = annotate_within(candidates, params.origin(), params.max_distance);

    match EventSortKey::parse(&params.sort_by) {
        EventSortKey::Distance => ranked.sort_by(by_distance),
        EventSortKey::Date => ranked.sort_by(|a, b| a.item.date.cmp(&b.item.date)),
        EventSortKey::Rating => ranked.sort_by(|a, b| {
            b.item
                .rating
                .partial_cmp(&a.item.rating)
                .unwrap_or(Ordering::Equal)
        }),
        EventSortKey::Price => ranked.sort_by(|a, b| {
            a.item
                .price
                .min
                .partial_cmp(&b.item.price.min)
                .unwrap_or(Ordering::Equal)
        }),
        EventSortKey::Unspecified => {}
    }

    ranked.truncate(params.limit);
    ranked
}

/// Full organizer pipeline: filter, annotate, bound, sort, truncate.
pub fn rank_organizers(
    organizers: Vec<Organizer>,
    params: &OrganizerFilters,
) -> Vec<Ranked<Organizer>> {
    let candidates: Vec<Organizer> = organizers
        .into_iter()
        .filter(|organizer| filters::organizer_matches(organizer, params))
        .collect();

    let mut ranked = annotate_within(candidates, params.origin(), params.max_distance);

    match OrganizerSortKey::parse(&params.sort_by) {
        OrganizerSortKey::Distance => ranked.sort_by(by_distance),
        OrganizerSortKey::Rating => ranked.sort_by(|a, b| {
            b.item
                .rating
                .partial_cmp(&a.item.rating)
                .unwrap_or(Ordering::Equal)
        }),
        OrganizerSortKey::Events => {
            ranked.sort_by(|a, b| b.item.total_events.cmp(&a.item.total_events))
        }
        OrganizerSortKey::Name => ranked.sort_by(|a, b| a.item.name.cmp(&b.item.name)),
        OrganizerSortKey::Unspecified => {}
    }

    ranked.truncate(params.limit);
    ranked
}

use crate::models::{Event, EventFilters, Organizer, OrganizerFilters};

/// Whether an event passes every set filter dimension.
///
/// Dimensions combine with AND; the text search matches if ANY of its target
/// fields contains the needle. Unset dimensions impose no constraint.
pub fn event_matches(event: &Event, filters: &EventFilters) -> bool {
    if let Some(search) = filters.search.as_deref() {
        let needle = search.to_lowercase();
        let hit = event.title.to_lowercase().contains(&needle)
            || event.description.to_lowercase().contains(&needle)
            || event.category.as_str().to_lowercase().contains(&needle)
            || event.location.name.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }

    if let Some(category) = filters.category {
        if event.category != category {
            return false;
        }
    }

    if let Some(min_price) = filters.min_price {
        if event.price.min < min_price {
            return false;
        }
    }

    if let Some(max_price) = filters.max_price {
        if event.price.max > max_price {
            return false;
        }
    }

    if let Some(min_rating) = filters.min_rating {
        if event.rating < min_rating {
            return false;
        }
    }

    true
}

/// Whether an organizer passes every set filter dimension.
///
/// The text search matches on name or description substring, or on exact
/// membership of the needle in the organizer's category list. The category
/// filter matches when the two sets intersect.
pub fn organizer_matches(organizer: &Organizer, filters: &OrganizerFilters) -> bool {
    if let Some(search) = filters.search.as_deref() {
        let needle = search.to_lowercase();
        let hit = organizer.name.to_lowercase().contains(&needle)
            || organizer.description.to_lowercase().contains(&needle)
            || organizer.categories.iter().any(|c| c.as_str() == search);
        if !hit {
            return false;
        }
    }

    if let Some(wanted) = filters.category_list() {
        if !organizer.categories.iter().any(|c| wanted.contains(c)) {
            return false;
        }
    }

    if let Some(min_rating) = filters.min_rating {
        if organizer.rating < min_rating {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, EventCategory, Location, PriceRange};
    use chrono::Utc;

    fn location(name: &str) -> Location {
        Location {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            lat: 37.77,
            lng: -122.42,
            city: Some("San Francisco".to_string()),
            state: Some("CA".to_string()),
        }
    }

    fn event(title: &str, category: EventCategory, min: f64, max: f64, rating: f64) -> Event {
        Event {
            id: "e1".to_string(),
            title: title.to_string(),
            description: "An evening to remember".to_string(),
            date: "2025-09-01".to_string(),
            time: "19:00".to_string(),
            location: location("The Fillmore"),
            category,
            price: PriceRange {
                min,
                max,
                currency: "USD".to_string(),
            },
            image: None,
            organizer_id: "o1".to_string(),
            attendees: 0,
            rating,
            reviews: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn organizer(name: &str, categories: Vec<EventCategory>, rating: f64) -> Organizer {
        Organizer {
            id: "o1".to_string(),
            name: name.to_string(),
            description: "Puts on shows".to_string(),
            photo: None,
            location: location("HQ"),
            categories,
            contact: Contact {
                email: "org@example.com".to_string(),
                phone: None,
            },
            rating,
            total_events: 0,
            recent_events: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filters_pass_everything() {
        let e = event("Jazz Night", EventCategory::Music, 10.0, 40.0, 4.5);
        assert!(event_matches(&e, &EventFilters::default()));

        let o = organizer("Jazz Inc", vec![EventCategory::Music], 4.5);
        assert!(organizer_matches(&o, &OrganizerFilters::default()));
    }

    #[test]
    fn search_matches_any_text_field() {
        let e = event("Jazz Night", EventCategory::Music, 10.0, 40.0, 4.5);

        for needle in ["jazz", "REMEMBER", "music", "fillmore"] {
            let mut filters = EventFilters::default();
            filters.search = Some(needle.to_string());
            assert!(event_matches(&e, &filters), "needle {:?}", needle);
        }

        let mut filters = EventFilters::default();
        filters.search = Some("opera".to_string());
        assert!(!event_matches(&e, &filters));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let e = event("Jazz Night", EventCategory::Music, 25.0, 75.0, 4.5);

        let mut filters = EventFilters::default();
        filters.category = Some(EventCategory::Music);
        filters.min_rating = Some(4.0);
        assert!(event_matches(&e, &filters));

        // One failing dimension fails the whole match.
        filters.min_rating = Some(4.8);
        assert!(!event_matches(&e, &filters));
    }

    #[test]
    fn price_bounds_are_independent() {
        let e = event("Jazz Night", EventCategory::Music, 25.0, 75.0, 4.5);

        let mut filters = EventFilters::default();
        filters.min_price = Some(20.0);
        assert!(event_matches(&e, &filters));
        filters.min_price = Some(30.0);
        assert!(!event_matches(&e, &filters));

        let mut filters = EventFilters::default();
        filters.max_price = Some(75.0);
        assert!(event_matches(&e, &filters));
        filters.max_price = Some(50.0);
        assert!(!event_matches(&e, &filters));
    }

    #[test]
    fn adding_filters_never_grows_the_result() {
        let events = vec![
            event("Jazz Night", EventCategory::Music, 10.0, 40.0, 4.5),
            event("Food Fair", EventCategory::FoodDrink, 0.0, 0.0, 3.5),
            event("Rock Show", EventCategory::Music, 30.0, 90.0, 5.0),
        ];

        let loose = EventFilters::default();
        let mut tighter = EventFilters::default();
        tighter.category = Some(EventCategory::Music);
        let mut tightest = tighter.clone();
        tightest.min_rating = Some(4.8);

        let count = |f: &EventFilters| events.iter().filter(|e| event_matches(e, f)).count();
        assert!(count(&loose) >= count(&tighter));
        assert!(count(&tighter) >= count(&tightest));
    }

    #[test]
    fn organizer_search_category_membership_is_exact() {
        let o = organizer("Bay Shows", vec![EventCategory::Music], 4.5);

        let mut filters = OrganizerFilters::default();
        filters.search = Some("Music".to_string());
        assert!(organizer_matches(&o, &filters));

        // Substring of a category label is not membership; name/description
        // still match on substring though.
        filters.search = Some("Mus".to_string());
        assert!(!organizer_matches(&o, &filters));

        filters.search = Some("bay".to_string());
        assert!(organizer_matches(&o, &filters));
    }

    #[test]
    fn organizer_category_filter_intersects() {
        let o = organizer(
            "Bay Shows",
            vec![EventCategory::Music, EventCategory::ArtsCulture],
            4.5,
        );

        let mut filters = OrganizerFilters::default();
        filters.categories = Some("Music,Business".to_string());
        assert!(organizer_matches(&o, &filters));

        filters.categories = Some("Business".to_string());
        assert!(!organizer_matches(&o, &filters));
    }
}

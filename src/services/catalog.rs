use std::sync::{Arc, Mutex};

use serde_json::Value;
use uuid::Uuid;

use crate::core::{geo, ranking};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Coordinate, CreateEventRequest, CreateOrganizerRequest, Event, EventFilters, EventResponse,
    EventReview, Organizer, OrganizerFilters, OrganizerPatch, OrganizerResponse, ReviewRequest,
    RsvpResponse, SaveEventResponse, User,
};
use crate::services::store::{Collection, Repository, StoreError};

/// Event and organizer operations on top of the document store.
///
/// Pure pipeline work (filter/annotate/sort) is delegated to `core`; this
/// layer owns the store round trips and the read-time organizer join.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn Repository>,
}

fn decode<T: serde::de::DeserializeOwned>(collection: Collection, doc: Value) -> ApiResult<T> {
    serde_json::from_value(doc).map_err(|e| {
        ApiError::Store(StoreError::Corrupt {
            collection: collection.as_str(),
            reason: e.to_string(),
        })
    })
}

fn encode<T: serde::Serialize>(entity: &T) -> ApiResult<Value> {
    serde_json::to_value(entity).map_err(|e| ApiError::Internal(e.to_string()))
}

impl Catalog {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Listing pipeline: filter, distance-annotate, bound, sort, truncate,
    /// then join each surviving event's organizer (lookup failure non-fatal).
    pub async fn list_events(&self, params: &EventFilters) -> ApiResult<Vec<EventResponse>> {
        let docs = self.store.find_all(Collection::Events).await?;
        let events: Vec<Event> = docs
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect();

        let ranked = ranking::rank_events(events, params);
        tracing::debug!("event listing: {} results after ranking", ranked.len());

        let mut responses = Vec::with_capacity(ranked.len());
        for entry in ranked {
            let organizer = self.lookup_organizer(&entry.item.organizer_id).await?;
            responses.push(EventResponse {
                event: entry.item,
                distance: entry.distance,
                organizer,
            });
        }
        Ok(responses)
    }

    /// Single fetch: distance annotation and organizer join only; the
    /// max-distance bound does not apply here.
    pub async fn get_event(
        &self,
        event_id: &str,
        origin: Option<Coordinate>,
    ) -> ApiResult<EventResponse> {
        let doc = self
            .store
            .find_by_id(Collection::Events, event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("event".to_string()))?;
        let event: Event = decode(Collection::Events, doc)?;

        let distance = origin.map(|from| geo::distance_miles(from, event.location.coordinate()));
        let organizer = self.lookup_organizer(&event.organizer_id).await?;

        Ok(EventResponse {
            event,
            distance,
            organizer,
        })
    }

    /// Create an event. The referenced organizer must exist; a missing
    /// organizer blocks creation rather than leaving a dangling reference.
    pub async fn create_event(&self, user: &User, req: CreateEventRequest) -> ApiResult<Event> {
        if self
            .store
            .find_by_id(Collection::Organizers, &req.organizer_id)
            .await?
            .is_none()
        {
            return Err(ApiError::NotFound("organizer".to_string()));
        }

        let now = chrono::Utc::now();
        let event = Event {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            description: req.description,
            date: req.date,
            time: req.time,
            location: req.location,
            category: req.category,
            price: req.price,
            image: req.image,
            organizer_id: req.organizer_id,
            attendees: 0,
            rating: 5.0,
            reviews: vec![],
            created_at: now,
            updated_at: now,
        };

        let stored = self
            .store
            .insert(Collection::Events, encode(&event)?)
            .await?;
        let event: Event = decode(Collection::Events, stored)?;

        self.store
            .append_to_list(
                Collection::Users,
                &user.id,
                "createdEvents",
                Value::from(event.id.clone()),
            )
            .await?;

        // Atomic counter bump, not read-then-write.
        self.store
            .increment(Collection::Organizers, &event.organizer_id, "totalEvents", 1)
            .await?;
        self.store
            .append_to_list(
                Collection::Organizers,
                &event.organizer_id,
                "recentEvents",
                Value::from(event.id.clone()),
            )
            .await?;

        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }

    /// Append a review and recompute the event rating in one atomic store
    /// operation, so concurrent reviews never compute from a stale list.
    pub async fn add_review(
        &self,
        event_id: &str,
        user_name: &str,
        req: ReviewRequest,
    ) -> ApiResult<EventReview> {
        let review = EventReview {
            id: Uuid::new_v4().to_string(),
            user: user_name.to_string(),
            rating: req.rating,
            comment: req.comment,
            date: chrono::Utc::now(),
        };
        let review_value = encode(&review)?;

        let updated = self
            .store
            .update_with(
                Collection::Events,
                event_id,
                Box::new(move |doc| {
                    let Some(obj) = doc.as_object_mut() else {
                        return;
                    };
                    let reviews = obj
                        .entry("reviews".to_string())
                        .or_insert_with(|| Value::Array(vec![]));
                    if let Some(items) = reviews.as_array_mut() {
                        items.push(review_value);
                        let ratings: Vec<f64> = items
                            .iter()
                            .filter_map(|r| r.get("rating").and_then(Value::as_f64))
                            .collect();
                        if !ratings.is_empty() {
                            let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
                            obj.insert(
                                "rating".to_string(),
                                Value::from((mean * 10.0).round() / 10.0),
                            );
                        }
                    }
                }),
            )
            .await?;

        if !updated {
            return Err(ApiError::NotFound("event".to_string()));
        }
        tracing::debug!(event_id, "review added");
        Ok(review)
    }

    /// RSVP: atomic attendee increment.
    pub async fn rsvp(&self, event_id: &str) -> ApiResult<RsvpResponse> {
        let attendees = self
            .store
            .increment(Collection::Events, event_id, "attendees", 1)
            .await?
            .ok_or_else(|| ApiError::NotFound("event".to_string()))?;
        Ok(RsvpResponse {
            event_id: event_id.to_string(),
            attendees: attendees.max(0) as u32,
        })
    }

    /// Toggle an event in the user's saved list. The toggle decision is made
    /// inside the store lock so two rapid clicks cannot double-add.
    pub async fn toggle_saved(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> ApiResult<SaveEventResponse> {
        if self
            .store
            .find_by_id(Collection::Events, event_id)
            .await?
            .is_none()
        {
            return Err(ApiError::NotFound("event".to_string()));
        }

        let outcome: Arc<Mutex<Option<(String, usize)>>> = Arc::new(Mutex::new(None));
        let outcome_in = Arc::clone(&outcome);
        let event_id_owned = event_id.to_string();

        let updated = self
            .store
            .update_with(
                Collection::Users,
                user_id,
                Box::new(move |doc| {
                    let Some(obj) = doc.as_object_mut() else {
                        return;
                    };
                    let saved = obj
                        .entry("savedEvents".to_string())
                        .or_insert_with(|| Value::Array(vec![]));
                    if let Some(items) = saved.as_array_mut() {
                        let before = items.len();
                        items.retain(|v| v.as_str() != Some(event_id_owned.as_str()));
                        let action = if items.len() == before {
                            items.push(Value::from(event_id_owned.clone()));
                            "saved"
                        } else {
                            "removed"
                        };
                        if let Ok(mut slot) = outcome_in.lock() {
                            *slot = Some((action.to_string(), items.len()));
                        }
                    }
                }),
            )
            .await?;

        if !updated {
            return Err(ApiError::NotFound("user".to_string()));
        }

        let (action, count) = outcome
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or_else(|| ApiError::Internal("saved-events toggle produced no outcome".into()))?;

        Ok(SaveEventResponse {
            event_id: event_id.to_string(),
            action,
            saved_events_count: count,
        })
    }

    /// The user's saved events, distance-annotated when an origin is given.
    /// Dangling saved ids are skipped.
    pub async fn saved_events(
        &self,
        user: &User,
        origin: Option<Coordinate>,
    ) -> ApiResult<Vec<EventResponse>> {
        let mut responses = Vec::with_capacity(user.saved_events.len());
        for event_id in &user.saved_events {
            let Some(doc) = self.store.find_by_id(Collection::Events, event_id).await? else {
                continue;
            };
            let event: Event = decode(Collection::Events, doc)?;
            let distance =
                origin.map(|from| geo::distance_miles(from, event.location.coordinate()));
            let organizer = self.lookup_organizer(&event.organizer_id).await?;
            responses.push(EventResponse {
                event,
                distance,
                organizer,
            });
        }
        Ok(responses)
    }

    /// Events in the same category within 50 miles, nearest first, with the
    /// original event excluded.
    pub async fn similar_events(
        &self,
        event_id: &str,
        origin: Option<Coordinate>,
        limit: usize,
    ) -> ApiResult<Vec<EventResponse>> {
        let original = self.get_event(event_id, None).await?;

        let mut params = EventFilters::default();
        params.category = Some(original.event.category);
        params.max_distance = Some(50.0);
        params.sort_by = "distance".to_string();
        params.user_lat = origin.map(|c| c.lat);
        params.user_lng = origin.map(|c| c.lng);
        // Fetch a few extra so dropping the original still fills the limit.
        params.limit = limit + 5;

        let mut similar = self.list_events(&params).await?;
        similar.retain(|r| r.event.id != event_id);
        similar.truncate(limit);
        Ok(similar)
    }

    pub async fn list_organizers(
        &self,
        params: &OrganizerFilters,
    ) -> ApiResult<Vec<OrganizerResponse>> {
        let docs = self.store.find_all(Collection::Organizers).await?;
        let organizers: Vec<Organizer> = docs
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect();

        let ranked = ranking::rank_organizers(organizers, params);
        Ok(ranked
            .into_iter()
            .map(|entry| OrganizerResponse {
                organizer: entry.item,
                distance: entry.distance,
            })
            .collect())
    }

    pub async fn get_organizer(
        &self,
        organizer_id: &str,
        origin: Option<Coordinate>,
    ) -> ApiResult<OrganizerResponse> {
        let doc = self
            .store
            .find_by_id(Collection::Organizers, organizer_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("organizer".to_string()))?;
        let organizer: Organizer = decode(Collection::Organizers, doc)?;
        let distance =
            origin.map(|from| geo::distance_miles(from, organizer.location.coordinate()));
        Ok(OrganizerResponse {
            organizer,
            distance,
        })
    }

    pub async fn create_organizer(&self, req: CreateOrganizerRequest) -> ApiResult<Organizer> {
        let now = chrono::Utc::now();
        let organizer = Organizer {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            description: req.description,
            photo: req.photo,
            location: req.location,
            categories: req.categories,
            contact: req.contact,
            rating: 5.0,
            total_events: 0,
            recent_events: vec![],
            created_at: now,
            updated_at: now,
        };
        let stored = self
            .store
            .insert(Collection::Organizers, encode(&organizer)?)
            .await?;
        tracing::info!(organizer_id = %organizer.id, "organizer created");
        decode(Collection::Organizers, stored)
    }

    /// Apply an allow-listed patch; unknown fields were already rejected at
    /// deserialization time.
    pub async fn update_organizer(
        &self,
        organizer_id: &str,
        patch: OrganizerPatch,
    ) -> ApiResult<Organizer> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = patch.name {
            fields.insert("name".to_string(), Value::from(name));
        }
        if let Some(description) = patch.description {
            fields.insert("description".to_string(), Value::from(description));
        }
        if let Some(photo) = patch.photo {
            fields.insert("photo".to_string(), Value::from(photo));
        }
        if let Some(location) = patch.location {
            fields.insert("location".to_string(), encode(&location)?);
        }
        if let Some(categories) = patch.categories {
            fields.insert("categories".to_string(), encode(&categories)?);
        }
        if let Some(contact) = patch.contact {
            fields.insert("contact".to_string(), encode(&contact)?);
        }

        let updated = self
            .store
            .update(Collection::Organizers, organizer_id, fields)
            .await?;
        if !updated {
            return Err(ApiError::NotFound("organizer".to_string()));
        }

        let doc = self
            .store
            .find_by_id(Collection::Organizers, organizer_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("organizer".to_string()))?;
        decode(Collection::Organizers, doc)
    }

    /// All of one organizer's events; nearest first when an origin is given.
    pub async fn organizer_events(
        &self,
        organizer_id: &str,
        origin: Option<Coordinate>,
    ) -> ApiResult<Vec<EventResponse>> {
        if self
            .store
            .find_by_id(Collection::Organizers, organizer_id)
            .await?
            .is_none()
        {
            return Err(ApiError::NotFound("organizer".to_string()));
        }

        let docs = self
            .store
            .find_eq(Collection::Events, "organizer_id", &Value::from(organizer_id))
            .await?;
        let events: Vec<Event> = docs
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect();

        let mut ranked = ranking::annotate_within(events, origin, None);
        if origin.is_some() {
            ranked.sort_by(|a, b| {
                let da = a.distance.unwrap_or(f64::INFINITY);
                let db = b.distance.unwrap_or(f64::INFINITY);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok(ranked
            .into_iter()
            .map(|entry| EventResponse {
                event: entry.item,
                distance: entry.distance,
                organizer: None,
            })
            .collect())
    }

    /// Top-rated organizers near the given origin.
    pub async fn top_nearby(
        &self,
        origin: Coordinate,
        max_distance: Option<f64>,
        limit: usize,
    ) -> ApiResult<Vec<OrganizerResponse>> {
        let mut params = OrganizerFilters::default();
        params.min_rating = Some(4.0);
        params.max_distance = max_distance.or(Some(25.0));
        params.user_lat = Some(origin.lat);
        params.user_lng = Some(origin.lng);
        params.sort_by = "rating".to_string();
        params.limit = limit;
        self.list_organizers(&params).await
    }

    /// Non-fatal organizer join: a missing or malformed organizer document
    /// degrades the result instead of failing the request.
    async fn lookup_organizer(&self, organizer_id: &str) -> ApiResult<Option<Organizer>> {
        let Some(doc) = self
            .store
            .find_by_id(Collection::Organizers, organizer_id)
            .await?
        else {
            tracing::warn!(organizer_id, "organizer missing during join");
            return Ok(None);
        };
        Ok(serde_json::from_value(doc).ok())
    }
}

use std::collections::BTreeMap;

use foundation::handles::Generation;
use foundation::ids::FeatureId;
use layers::geometry::Geometry;
use layers::record::FeatureRecord;
use thiserror::Error as ThisError;
use tracing::debug;

use crate::request::GeometryTicket;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CacheError {
    #[error("geometry for {identity} was requested in {ticket}, cache is at {current}")]
    StaleGeneration {
        identity: FeatureId,
        ticket: Generation,
        current: Generation,
    },

    #[error("feature {0} is not cached")]
    UnknownIdentity(FeatureId),
}

#[derive(Debug, Clone)]
struct Tagged<T> {
    value: T,
    generation: Generation,
}

/// Identity-indexed store of records and lazily fetched geometry.
///
/// Notes:
/// - Entries are keyed in a `BTreeMap`, so one identity maps to at most one
///   record and traversal order is stable.
/// - Every entry is tagged with the generation it was written in. A rebuild
///   calls [`FeatureCache::begin_generation`] before any new `put`.
#[derive(Debug, Default)]
pub struct FeatureCache {
    generation: Generation,
    records: BTreeMap<FeatureId, Tagged<FeatureRecord>>,
    geometries: BTreeMap<FeatureId, Tagged<Geometry>>,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Drops every entry and advances to the next generation.
    pub fn begin_generation(&mut self) -> Generation {
        self.clear();
        self.generation = self.generation.next();
        debug!(generation = %self.generation, "feature cache generation started");
        self.generation
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.geometries.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Stores `record`, replacing any record with the same identity.
    ///
    /// A record loaded with geometry also seeds the geometry map.
    pub fn put(&mut self, record: FeatureRecord) -> Option<FeatureRecord> {
        if let Some(geometry) = &record.geometry {
            self.geometries.insert(
                record.identity.clone(),
                Tagged {
                    value: geometry.clone(),
                    generation: self.generation,
                },
            );
        }
        self.records
            .insert(
                record.identity.clone(),
                Tagged {
                    value: record,
                    generation: self.generation,
                },
            )
            .map(|old| old.value)
    }

    pub fn get(&self, identity: &FeatureId) -> Option<&FeatureRecord> {
        self.records
            .get(identity)
            .filter(|e| e.generation == self.generation)
            .map(|e| &e.value)
    }

    pub fn contains(&self, identity: &FeatureId) -> bool {
        self.get(identity).is_some()
    }

    pub fn geometry(&self, identity: &FeatureId) -> Option<&Geometry> {
        self.geometries
            .get(identity)
            .filter(|e| e.generation == self.generation)
            .map(|e| &e.value)
    }

    pub fn put_geometry(&mut self, identity: FeatureId, geometry: Geometry) {
        self.geometries.insert(
            identity,
            Tagged {
                value: geometry,
                generation: self.generation,
            },
        );
    }

    pub fn issue_ticket(&self, identity: FeatureId) -> GeometryTicket {
        GeometryTicket {
            identity,
            generation: self.generation,
        }
    }

    /// Stores a fetched geometry if its ticket still belongs to this generation.
    pub fn put_geometry_for(
        &mut self,
        ticket: GeometryTicket,
        geometry: Geometry,
    ) -> Result<(), CacheError> {
        if ticket.generation != self.generation {
            return Err(CacheError::StaleGeneration {
                identity: ticket.identity,
                ticket: ticket.generation,
                current: self.generation,
            });
        }
        if !self.contains(&ticket.identity) {
            return Err(CacheError::UnknownIdentity(ticket.identity));
        }
        self.put_geometry(ticket.identity, geometry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheError, FeatureCache};
    use foundation::ids::FeatureId;
    use layers::geometry::Geometry;
    use layers::record::FeatureRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_record_per_identity() {
        let mut cache = FeatureCache::new();
        cache.begin_generation();
        assert!(cache.put(FeatureRecord::new(1).with_attribute("v", "a")).is_none());
        let old = cache.put(FeatureRecord::new(1).with_attribute("v", "b"));
        assert_eq!(old.unwrap().attribute_text("v"), "a");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&FeatureId::Int(1)).unwrap().attribute_text("v"), "b");
    }

    #[test]
    fn record_with_geometry_seeds_geometry_map() {
        let mut cache = FeatureCache::new();
        cache.put(FeatureRecord::new(5).with_geometry(Geometry::point(1.0, 2.0)));
        assert_eq!(cache.geometry(&FeatureId::Int(5)), Some(&Geometry::point(1.0, 2.0)));
        assert_eq!(cache.geometry_count(), 1);
    }

    #[test]
    fn begin_generation_discards_everything() {
        let mut cache = FeatureCache::new();
        let g1 = cache.begin_generation();
        cache.put(FeatureRecord::new(1));
        cache.put_geometry(FeatureId::Int(1), Geometry::point(0.0, 0.0));

        let g2 = cache.begin_generation();
        assert!(g2 > g1);
        assert!(cache.is_empty());
        assert!(cache.geometry(&FeatureId::Int(1)).is_none());
    }

    #[test]
    fn ticket_from_old_generation_is_rejected() {
        let mut cache = FeatureCache::new();
        cache.begin_generation();
        cache.put(FeatureRecord::new(2).with_attribute("name", "old"));
        let ticket = cache.issue_ticket(FeatureId::Int(2));

        // Identity 2 is reused by a different record in the next generation.
        let current = cache.begin_generation();
        cache.put(FeatureRecord::new(2).with_attribute("name", "new"));

        let err = cache
            .put_geometry_for(ticket.clone(), Geometry::point(9.0, 9.0))
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::StaleGeneration {
                identity: FeatureId::Int(2),
                ticket: ticket.generation,
                current,
            }
        );
        assert!(cache.geometry(&FeatureId::Int(2)).is_none());
    }

    #[test]
    fn ticket_for_unlisted_identity_is_rejected() {
        let mut cache = FeatureCache::new();
        cache.begin_generation();
        let ticket = cache.issue_ticket(FeatureId::Int(7));
        assert_eq!(
            cache.put_geometry_for(ticket, Geometry::point(0.0, 0.0)),
            Err(CacheError::UnknownIdentity(FeatureId::Int(7)))
        );
    }

    #[test]
    fn current_ticket_stores_geometry() {
        let mut cache = FeatureCache::new();
        cache.begin_generation();
        cache.put(FeatureRecord::new(3));
        let ticket = cache.issue_ticket(FeatureId::Int(3));
        cache
            .put_geometry_for(ticket, Geometry::point(3.0, 4.0))
            .unwrap();
        assert_eq!(cache.geometry(&FeatureId::Int(3)), Some(&Geometry::point(3.0, 4.0)));
    }
}

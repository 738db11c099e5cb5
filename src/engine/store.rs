// engine/store.rs — Entity-Relationship Store.
// Holds the in-memory contact graph: typed entities with mergeable
// observations, plus typed directed relationships between them.
//
// Responsibilities:
//   - Entity upsert (insert-or-replace by id)
//   - Observation upsert with same-kind field merge
//   - Relationship insert with endpoint validation (no dedup)
//   - Pure read queries (by kind, outgoing/incoming edges)
//   - Serialized batch apply for analysis write-backs
//   - Explicit load/save through the storage layer
//
// The store has no internal locking: callers own the snapshot and all
// mutation is synchronous against it.

use crate::atoms::constants::{ENTITIES_FILE, RELATIONSHIPS_FILE};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Entity, EntityKind, Observation, Relationship};
use crate::engine::storage::Storage;
use log::info;
use std::collections::HashMap;

#[derive(Default)]
pub struct ContactStore {
    entities: HashMap<String, Entity>,
    relationships: Vec<Relationship>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn get(&self, entity_id: &str) -> Option<&Entity> {
        self.entities.get(entity_id)
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Insert or replace an entity by id. Observation shape is not
    /// validated here; the tagged union already constrains it.
    pub fn upsert_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    /// Merge an observation into the entity's same-kind slot, or append it
    /// if the entity has no observation of that kind yet.
    pub fn upsert_observation(
        &mut self,
        entity_id: &str,
        observation: Observation,
    ) -> EngineResult<()> {
        let entity = self
            .entities
            .get_mut(entity_id)
            .ok_or_else(|| EngineError::entity_not_found(entity_id))?;

        let kind = observation.kind();
        match entity.observations.iter_mut().find(|o| o.kind() == kind) {
            Some(existing) => existing.merge(observation),
            None => entity.observations.push(observation),
        }
        Ok(())
    }

    /// Add a typed directed edge. Both endpoints must already exist.
    /// Identical triples are allowed to coexist — no deduplication.
    pub fn add_relationship(&mut self, from: &str, rel_type: &str, to: &str) -> EngineResult<()> {
        if !self.entities.contains_key(from) {
            return Err(EngineError::Validation(format!(
                "relationship source '{from}' is not in the store"
            )));
        }
        if !self.entities.contains_key(to) {
            return Err(EngineError::Validation(format!(
                "relationship target '{to}' is not in the store"
            )));
        }
        self.relationships.push(Relationship {
            from: from.to_string(),
            rel_type: rel_type.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }

    /// Apply a batch of per-contact observation write-backs serially.
    /// Workers may have computed the observations concurrently; this single
    /// sequential apply step is what keeps concurrent analysis from losing
    /// updates. Each contact's merge is atomic, never interleaved mid-merge.
    pub fn apply_batch(
        &mut self,
        updates: impl IntoIterator<Item = (String, Observation)>,
    ) -> EngineResult<usize> {
        let mut applied = 0;
        for (entity_id, observation) in updates {
            self.upsert_observation(&entity_id, observation)?;
            applied += 1;
        }
        Ok(applied)
    }

    // ── Queries (pure reads) ───────────────────────────────────────────

    /// All entities of a kind, in unspecified order.
    pub fn query_by_kind(&self, kind: EntityKind) -> Vec<&Entity> {
        self.entities.values().filter(|e| e.kind == kind).collect()
    }

    /// Outgoing relationships from an entity, optionally filtered by type.
    pub fn outgoing(&self, entity_id: &str, rel_type: Option<&str>) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.from == entity_id)
            .filter(|r| rel_type.map_or(true, |t| r.rel_type == t))
            .collect()
    }

    /// Incoming relationships to an entity, optionally filtered by type.
    pub fn incoming(&self, entity_id: &str, rel_type: Option<&str>) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.to == entity_id)
            .filter(|r| rel_type.map_or(true, |t| r.rel_type == t))
            .collect()
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Load a snapshot from storage. Missing files yield an empty store.
    pub fn load(storage: &Storage) -> EngineResult<Self> {
        let entities: Vec<Entity> = storage.load_json(ENTITIES_FILE)?;
        let relationships: Vec<Relationship> = storage.load_json(RELATIONSHIPS_FILE)?;

        let store = Self {
            entities: entities.into_iter().map(|e| (e.id.clone(), e)).collect(),
            relationships,
        };
        info!(
            "[store] Loaded {} entities, {} relationships",
            store.entities.len(),
            store.relationships.len()
        );
        Ok(store)
    }

    /// Flush the snapshot. Entity order in the file is not significant;
    /// it is sorted by id so repeated saves of equal state diff cleanly.
    pub fn save(&self, storage: &Storage) -> EngineResult<()> {
        let mut entities: Vec<&Entity> = self.entities.values().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        storage.save_json(ENTITIES_FILE, &entities)?;
        storage.save_json(RELATIONSHIPS_FILE, &self.relationships)?;
        info!(
            "[store] Saved {} entities, {} relationships",
            entities.len(),
            self.relationships.len()
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::{CommunicationMetrics, ContactDetails};

    fn contact(id: &str, name: &str) -> Entity {
        Entity {
            id: id.to_string(),
            name: name.to_string(),
            kind: EntityKind::Contact,
            observations: Vec::new(),
        }
    }

    #[test]
    fn test_upsert_observation_merges_same_kind() {
        let mut store = ContactStore::new();
        store.upsert_entity(contact("c1", "Larry Velez"));

        store
            .upsert_observation(
                "c1",
                Observation::CommunicationMetrics(CommunicationMetrics {
                    email_count: Some(10),
                    response_rate: Some(0.4),
                    ..Default::default()
                }),
            )
            .expect("first upsert");
        store
            .upsert_observation(
                "c1",
                Observation::CommunicationMetrics(CommunicationMetrics {
                    email_count: Some(11),
                    ..Default::default()
                }),
            )
            .expect("second upsert");

        let entity = store.get("c1").expect("entity");
        assert_eq!(entity.observations.len(), 1, "same kind must not duplicate");
        let metrics = entity.communication_metrics().expect("metrics");
        assert_eq!(metrics.email_count, Some(11));
        assert_eq!(metrics.response_rate, Some(0.4), "unset field preserved");
    }

    #[test]
    fn test_upsert_observation_unknown_entity() {
        let mut store = ContactStore::new();
        let err = store
            .upsert_observation(
                "ghost",
                Observation::ContactDetails(ContactDetails::default()),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_add_relationship_validates_endpoints() {
        let mut store = ContactStore::new();
        store.upsert_entity(contact("c1", "Larry"));

        let err = store.add_relationship("c1", "works_at", "org-missing").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(store.relationship_count(), 0);
    }

    #[test]
    fn test_relationships_are_not_deduplicated() {
        let mut store = ContactStore::new();
        store.upsert_entity(contact("c1", "Larry"));
        store.upsert_entity(Entity {
            id: "org1".into(),
            name: "Sinu".into(),
            kind: EntityKind::Organization,
            observations: Vec::new(),
        });

        store.add_relationship("c1", "works_at", "org1").expect("first");
        store.add_relationship("c1", "works_at", "org1").expect("duplicate");

        assert_eq!(store.outgoing("c1", Some("works_at")).len(), 2);
        assert_eq!(store.incoming("org1", None).len(), 2);
    }

    #[test]
    fn test_query_by_kind() {
        let mut store = ContactStore::new();
        store.upsert_entity(contact("c1", "Larry"));
        store.upsert_entity(Entity {
            id: "cat1".into(),
            name: "investors".into(),
            kind: EntityKind::Category,
            observations: Vec::new(),
        });

        assert_eq!(store.query_by_kind(EntityKind::Contact).len(), 1);
        assert_eq!(store.query_by_kind(EntityKind::Category).len(), 1);
        assert!(store.query_by_kind(EntityKind::Organization).is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::open(dir.path()).expect("storage");

        let mut store = ContactStore::new();
        let mut larry = contact("c1", "Larry Velez");
        larry.observations.push(Observation::ContactDetails(ContactDetails {
            emails: vec!["larry@sinu.com".into()],
            ..Default::default()
        }));
        store.upsert_entity(larry);
        store.upsert_entity(Entity {
            id: "org1".into(),
            name: "Sinu".into(),
            kind: EntityKind::Organization,
            observations: Vec::new(),
        });
        store.add_relationship("c1", "works_at", "org1").expect("relationship");

        store.save(&storage).expect("save");
        let loaded = ContactStore::load(&storage).expect("load");

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.relationship_count(), 1);
        assert_eq!(
            loaded.get("c1").expect("c1").primary_email(),
            Some("larry@sinu.com")
        );
        assert_eq!(
            loaded.outgoing("c1", None),
            store.outgoing("c1", None),
            "relationships must survive the round trip"
        );
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use crate::model::{
    AssociationQuery, DataModel, ElementType, Entity, EntityAssociation, ExtInclusion, Id,
    NewEntityAssociation,
};
use crate::store::traits::{MdrSession, MdrStore};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    data_models: BTreeMap<Id, DataModel>,
    entities: BTreeMap<Id, Entity>,
    inclusions: Vec<ExtInclusion>,
    associations: BTreeMap<Id, EntityAssociation>,
    next_association_id: Id,
}

impl MemoryState {
    fn allocate_association_id(&mut self) -> Id {
        self.next_association_id += 1;
        self.next_association_id
    }
}

/// In-process store for tests and local runs without PostgreSQL.
///
/// Each session works on a snapshot of the shared state and publishes it on
/// commit, so an uncommitted session leaves the store untouched. Concurrent
/// sessions are last-commit-wins.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_data_model(&self, data_model: DataModel) {
        self.state
            .lock()
            .data_models
            .insert(data_model.id, data_model);
    }

    pub fn insert_entity(&self, entity: Entity) {
        self.state.lock().entities.insert(entity.id, entity);
    }

    /// Record that an extension model includes a base element.
    pub fn include_in_extension(&self, ext_data_model_id: Id, element_type: ElementType, element_id: Id) {
        let mut state = self.state.lock();
        let id = state.inclusions.len() as Id + 1;
        state.inclusions.push(ExtInclusion {
            id,
            ext_data_model_id,
            element_type,
            included_element_id: element_id,
            deleted: false,
        });
    }

    /// Raw row access, soft-deleted rows included.
    pub fn association(&self, id: Id) -> Option<EntityAssociation> {
        self.state.lock().associations.get(&id).cloned()
    }

    pub fn association_count(&self) -> usize {
        self.state.lock().associations.len()
    }
}

#[async_trait::async_trait]
impl MdrStore for MemoryStore {
    type Session = MemorySession;

    async fn begin(&self) -> Result<MemorySession> {
        let working = self.state.lock().clone();
        Ok(MemorySession {
            shared: Arc::clone(&self.state),
            working,
        })
    }
}

#[derive(Debug)]
pub struct MemorySession {
    shared: Arc<Mutex<MemoryState>>,
    working: MemoryState,
}

#[async_trait::async_trait]
impl MdrSession for MemorySession {
    async fn get_entity(&mut self, id: Id) -> Result<Option<Entity>> {
        Ok(self.working.entities.get(&id).cloned())
    }

    async fn find_entity_id(&mut self, name: &str, data_model_id: Id) -> Result<Option<Id>> {
        Ok(self
            .working
            .entities
            .values()
            .find(|e| e.is_active() && e.name == name && e.data_model_id == data_model_id)
            .map(|e| e.id))
    }

    async fn get_data_model(&mut self, id: Id) -> Result<Option<DataModel>> {
        Ok(self.working.data_models.get(&id).cloned())
    }

    async fn find_data_model_id(&mut self, name: &str, version: Option<&str>) -> Result<Option<Id>> {
        Ok(self
            .working
            .data_models
            .values()
            .filter(|dm| !dm.deleted && dm.name == name)
            .find(|dm| match version {
                Some(version) => dm.data_model_version.as_deref() == Some(version),
                None => true,
            })
            .map(|dm| dm.id))
    }

    async fn included_element_ids(
        &mut self,
        ext_data_model_id: Id,
        element_type: ElementType,
    ) -> Result<Vec<Id>> {
        Ok(self
            .working
            .inclusions
            .iter()
            .filter(|inc| {
                !inc.deleted
                    && inc.ext_data_model_id == ext_data_model_id
                    && inc.element_type == element_type
            })
            .map(|inc| inc.included_element_id)
            .collect())
    }

    async fn get_association(&mut self, id: Id) -> Result<Option<EntityAssociation>> {
        Ok(self.working.associations.get(&id).cloned())
    }

    async fn find_associations(&mut self, query: &AssociationQuery) -> Result<Vec<EntityAssociation>> {
        let entities = &self.working.entities;
        Ok(self
            .working
            .associations
            .values()
            .filter(|a| query.matches(a, |id| entities.get(&id).cloned()))
            .cloned()
            .collect())
    }

    async fn insert_association(&mut self, association: NewEntityAssociation) -> Result<EntityAssociation> {
        let id = self.working.allocate_association_id();
        let association = association.into_association(id);
        self.working.associations.insert(id, association.clone());
        Ok(association)
    }

    async fn save_association(&mut self, association: &EntityAssociation) -> Result<()> {
        let slot = self
            .working
            .associations
            .get_mut(&association.id)
            .ok_or_else(|| anyhow!("Entity association {} vanished before save", association.id))?;
        *slot = association.clone();
        Ok(())
    }

    async fn delete_association(&mut self, id: Id) -> Result<bool> {
        Ok(self.working.associations.remove(&id).is_some())
    }

    async fn commit(self) -> Result<()> {
        *self.shared.lock() = self.working;
        Ok(())
    }
}

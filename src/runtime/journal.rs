use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::GameError;
use crate::domain::ActorId;

/// Latest checkpoint of every actor, stored as bincode.
///
/// A checkpoint outlives the task that wrote it, so a new incarnation of the
/// same actor id picks up where the previous one stopped.
#[derive(Default)]
pub struct Journal {
    checkpoints: Mutex<HashMap<ActorId, Vec<u8>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the checkpoint of `actor`.
    pub fn save<T: Serialize>(&self, actor: &ActorId, state: &T) -> Result<(), GameError> {
        let bytes = bincode::serialize(state).map_err(|e| GameError::Journal(e.to_string()))?;
        self.lock()?.insert(actor.clone(), bytes);
        Ok(())
    }

    /// Latest checkpoint of `actor`, if it ever saved one.
    pub fn load<T: DeserializeOwned>(&self, actor: &ActorId) -> Result<Option<T>, GameError> {
        let checkpoints = self.lock()?;
        match checkpoints.get(actor) {
            Some(bytes) => bincode::deserialize(bytes)
                .map(Some)
                .map_err(|e| GameError::Journal(format!("checkpoint of {}: {}", actor, e))),
            None => Ok(None),
        }
    }

    pub fn contains(&self, actor: &ActorId) -> bool {
        self.lock().map(|c| c.contains_key(actor)).unwrap_or(false)
    }

    pub fn remove(&self, actor: &ActorId) -> Result<(), GameError> {
        self.lock()?.remove(actor);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ActorId, Vec<u8>>>, GameError> {
        self.checkpoints
            .lock()
            .map_err(|_| GameError::Journal("journal lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerStatus;

    #[test]
    fn save_and_load() {
        let journal = Journal::new();
        let id = ActorId::from("p1");
        assert_eq!(journal.load::<PlayerStatus>(&id).unwrap(), None);
        journal.save(&id, &PlayerStatus::Attacking).unwrap();
        journal.save(&id, &PlayerStatus::Waiting).unwrap();
        assert_eq!(journal.load(&id).unwrap(), Some(PlayerStatus::Waiting));
        journal.remove(&id).unwrap();
        assert!(!journal.contains(&id));
    }

    #[test]
    fn load_wrong_type_fails() {
        let journal = Journal::new();
        let id = ActorId::from("p1");
        journal.save(&id, &1u8).unwrap();
        assert!(matches!(
            journal.load::<String>(&id),
            Err(GameError::Journal(_))
        ));
    }
}

//! Session registry
//!
//! Owns any number of independent [`Emulator`] sessions in an indexed
//! arena. Handles carry a generation so an id kept after `remove` never
//! reaches whatever session later reuses the slot. Removing or reaping a
//! session hands ownership back to the caller.

use crate::emu::Emulator;
use crate::error::Fault;

/// Handle to a session in a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    session: Option<Emulator>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: Emulator) -> SessionId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.session = Some(session);
            return SessionId { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, session: Some(session) });
        SessionId { index, generation: 0 }
    }

    fn slot(&self, id: SessionId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    pub fn get(&self, id: SessionId) -> Option<&Emulator> {
        self.slot(id)?.session.as_ref()
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Emulator> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?
            .session
            .as_mut()
    }

    /// Take a session out of the registry. The id goes stale.
    pub fn remove(&mut self, id: SessionId) -> Option<Emulator> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let session = slot.session.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.session.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.session.is_some())
            .map(|(index, slot)| SessionId { index: index as u32, generation: slot.generation })
            .collect()
    }

    /// Advance every running session by one frame. Sessions that fault are
    /// stopped and listed with their fault.
    pub fn run_frame_all(&mut self) -> Vec<(SessionId, Fault)> {
        let mut faults = Vec::new();
        for id in self.ids() {
            let Some(session) = self.get_mut(id) else {
                continue;
            };
            if !session.is_running() {
                continue;
            }
            // the session reports the fault to its own diagnostics
            if let Err(fault) = session.run_frame() {
                faults.push((id, fault));
            }
        }
        faults
    }

    /// Remove every stopped session and return them for teardown.
    pub fn reap_stopped(&mut self) -> Vec<(SessionId, Emulator)> {
        let stopped: Vec<SessionId> = self
            .ids()
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|session| !session.is_running()))
            .collect();

        stopped
            .into_iter()
            .filter_map(|id| self.remove(id).map(|session| (id, session)))
            .collect()
    }
}

//! The per-input-context state Hub tracks: attached components, the active
//! consumer per message type, and cached UI state pulled on attach.

// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::message::{CandidateList, CommandList, Composition, InputCaret, MessageType};
use crate::util::{ComponentId, InputContextId};

/// One input context: an attachment point components bind to in order to
/// participate in key routing, composition, and candidate UI for a given
/// focus target.
#[derive(Debug, Clone)]
pub struct InputContext {
    pub id: InputContextId,
    pub owner: ComponentId,
    pub focused: bool,
    pub attached: HashSet<ComponentId>,
    /// Active consumer per message type. `ComponentId::BROADCAST` is never
    /// stored here; "no active consumer" is the absence of an entry.
    pub active_consumer: HashMap<MessageType, ComponentId>,
    pub active_hotkey_list: Option<u32>,
    pub cached_composition: Option<Composition>,
    pub cached_candidate_list: Option<CandidateList>,
    pub cached_command_list: Option<CommandList>,
    pub cached_input_caret: Option<InputCaret>,
}

impl InputContext {
    pub fn new(id: InputContextId, owner: ComponentId) -> Self {
        Self {
            id,
            owner,
            focused: false,
            attached: HashSet::new(),
            active_consumer: HashMap::new(),
            active_hotkey_list: None,
            cached_composition: None,
            cached_candidate_list: None,
            cached_command_list: None,
            cached_input_caret: None,
        }
    }

    /// The component currently assigned to handle `message_type`, if any.
    pub fn active_consumer_for(&self, message_type: MessageType) -> Option<ComponentId> {
        self.active_consumer.get(&message_type).copied()
    }

    /// Assign `component` as the active consumer for `message_type`,
    /// returning the previous holder if one existed.
    pub fn assign_active_consumer(
        &mut self,
        message_type: MessageType,
        component: ComponentId,
    ) -> Option<ComponentId> {
        self.active_consumer.insert(message_type, component)
    }

    /// Clear the active consumer for `message_type` if it is currently
    /// `component`; no-op otherwise.
    pub fn resign_active_consumer(&mut self, message_type: MessageType, component: ComponentId) {
        if self.active_consumer.get(&message_type) == Some(&component) {
            self.active_consumer.remove(&message_type);
        }
    }

    /// Drop every active-consumer entry pointing at `component`, used when
    /// a component detaches from this context without resigning explicitly.
    pub fn clear_consumer(&mut self, component: ComponentId) {
        self.active_consumer.retain(|_, holder| *holder != component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::KnownMessageType;

    #[test]
    fn assign_and_resign_active_consumer() {
        let mut ctx = InputContext::new(InputContextId::new(1), ComponentId::new(1));
        let mt = MessageType::Known(KnownMessageType::SendKeyEvent);
        assert_eq!(ctx.assign_active_consumer(mt, ComponentId::new(2)), None);
        assert_eq!(ctx.active_consumer_for(mt), Some(ComponentId::new(2)));
        ctx.resign_active_consumer(mt, ComponentId::new(2));
        assert_eq!(ctx.active_consumer_for(mt), None);
    }

    #[test]
    fn clear_consumer_removes_all_entries_for_component() {
        let mut ctx = InputContext::new(InputContextId::new(1), ComponentId::new(1));
        let a = MessageType::Known(KnownMessageType::SendKeyEvent);
        let b = MessageType::Known(KnownMessageType::SetComposition);
        ctx.assign_active_consumer(a, ComponentId::new(5));
        ctx.assign_active_consumer(b, ComponentId::new(5));
        ctx.clear_consumer(ComponentId::new(5));
        assert_eq!(ctx.active_consumer_for(a), None);
        assert_eq!(ctx.active_consumer_for(b), None);
    }
}

//! Hub's routing tables. Every field here is touched only from Hub's own
//! driver task; no lock guards any of it.

// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::hub::error::HubError;
use crate::hub::input_context::InputContext;
use crate::message::{ComponentInfo, HotkeyList, MessageType};
use crate::util::{ComponentId, InputContextId};

/// Hub's single-writer registries: components, input contexts, hotkey
/// lists, and the bookkeeping needed to allocate fresh ids.
#[derive(Debug, Default)]
pub struct Registries {
    components_by_id: HashMap<ComponentId, ComponentInfo>,
    components_by_string_id: HashMap<String, ComponentId>,
    produces_index: HashMap<MessageType, HashSet<ComponentId>>,
    consumes_index: HashMap<MessageType, HashSet<ComponentId>>,
    input_contexts: HashMap<InputContextId, InputContext>,
    focused_icid: Option<InputContextId>,
    hotkey_lists: HashMap<u32, HotkeyList>,
    next_component_id: u32,
    next_icid: u32,
}

impl Registries {
    pub fn new() -> Self {
        let mut registries = Self {
            next_component_id: 1,
            next_icid: 1,
            ..Default::default()
        };
        // Every component starts out attached here until it joins a context
        // of its own; Hub owns it, so it never falls to the allocator and
        // never gets deleted.
        registries
            .input_contexts
            .insert(InputContextId::NONE, InputContext::new(InputContextId::NONE, ComponentId::DEFAULT));
        registries
    }

    // -- components ---------------------------------------------------

    pub fn allocate_component_id(&mut self) -> ComponentId {
        let id = ComponentId::new(self.next_component_id);
        self.next_component_id += 1;
        id
    }

    pub fn register_component(&mut self, info: ComponentInfo) -> Result<(), HubError> {
        if self.components_by_string_id.contains_key(&info.string_id) {
            return Err(HubError::DuplicateStringId(info.string_id.clone()));
        }
        for mt in &info.produce_message {
            self.produces_index.entry(*mt).or_default().insert(info.id);
        }
        for mt in &info.consume_message {
            self.consumes_index.entry(*mt).or_default().insert(info.id);
        }
        self.components_by_string_id.insert(info.string_id.clone(), info.id);
        self.components_by_id.insert(info.id, info);
        Ok(())
    }

    pub fn deregister_component(&mut self, id: ComponentId) -> Option<ComponentInfo> {
        let info = self.components_by_id.remove(&id)?;
        self.components_by_string_id.remove(&info.string_id);
        for mt in &info.produce_message {
            if let Some(set) = self.produces_index.get_mut(mt) {
                set.remove(&id);
            }
        }
        for mt in &info.consume_message {
            if let Some(set) = self.consumes_index.get_mut(mt) {
                set.remove(&id);
            }
        }
        for ctx in self.input_contexts.values_mut() {
            ctx.attached.remove(&id);
            ctx.clear_consumer(id);
        }
        Some(info)
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.components_by_id.get(&id)
    }

    pub fn component_by_string_id(&self, string_id: &str) -> Option<&ComponentInfo> {
        self.components_by_string_id
            .get(string_id)
            .and_then(|id| self.components_by_id.get(id))
    }

    pub fn components_consuming(&self, mt: MessageType) -> impl Iterator<Item = ComponentId> + '_ {
        self.consumes_index
            .get(&mt)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn all_components(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.components_by_id.values()
    }

    // -- input contexts -------------------------------------------------

    pub fn allocate_icid(&mut self) -> InputContextId {
        let id = InputContextId::new(self.next_icid);
        self.next_icid += 1;
        id
    }

    pub fn create_input_context(&mut self, owner: ComponentId) -> InputContextId {
        let id = self.allocate_icid();
        self.input_contexts.insert(id, InputContext::new(id, owner));
        id
    }

    pub fn delete_input_context(&mut self, id: InputContextId) -> Option<InputContext> {
        if id == InputContextId::NONE {
            return None;
        }
        if self.focused_icid == Some(id) {
            self.focused_icid = None;
        }
        self.input_contexts.remove(&id)
    }

    pub fn input_context(&self, id: InputContextId) -> Option<&InputContext> {
        self.input_contexts.get(&id)
    }

    pub fn input_context_mut(&mut self, id: InputContextId) -> Option<&mut InputContext> {
        self.input_contexts.get_mut(&id)
    }

    pub fn focused_icid(&self) -> Option<InputContextId> {
        self.focused_icid
    }

    /// Move global focus to `id`, returning the previously-focused context
    /// (if any) so the caller can notify it of the loss.
    pub fn set_focus(&mut self, id: InputContextId) -> Result<Option<InputContextId>, HubError> {
        if !self.input_contexts.contains_key(&id) {
            return Err(HubError::UnknownInputContext(id));
        }
        let previous = self.focused_icid;
        if let Some(prev) = previous {
            if let Some(ctx) = self.input_contexts.get_mut(&prev) {
                ctx.focused = false;
            }
        }
        if let Some(ctx) = self.input_contexts.get_mut(&id) {
            ctx.focused = true;
        }
        self.focused_icid = Some(id);
        Ok(previous)
    }

    pub fn clear_focus(&mut self, id: InputContextId) {
        if self.focused_icid == Some(id) {
            self.focused_icid = None;
        }
        if let Some(ctx) = self.input_contexts.get_mut(&id) {
            ctx.focused = false;
        }
    }

    // -- hotkey lists ----------------------------------------------------
    //
    // Hotkey list ids are caller-supplied (the `id` field on the submitted
    // `HotkeyList`), not Hub-allocated: `ActivateHotkeyList`'s payload is
    // just the id of a list the caller already named in an earlier
    // `AddHotkeyList`, and both are `NoReply` operations with no round trip
    // for Hub to hand an id back on.

    pub fn add_hotkey_list(&mut self, list: HotkeyList) {
        self.hotkey_lists.insert(list.id, list);
    }

    pub fn remove_hotkey_list(&mut self, id: u32) -> Option<HotkeyList> {
        self.hotkey_lists.remove(&id)
    }

    pub fn hotkey_list(&self, id: u32) -> Option<&HotkeyList> {
        self.hotkey_lists.get(&id)
    }

    /// Ids of every hotkey list currently active on some input context,
    /// deduplicated.
    pub fn active_hotkey_list_ids(&self) -> HashSet<u32> {
        self.input_contexts
            .values()
            .filter_map(|ctx| ctx.active_hotkey_list)
            .collect()
    }

    /// Activate `id` on `icid`. Fails if either the list or the input
    /// context is unknown.
    pub fn activate_hotkey_list(&mut self, icid: InputContextId, id: u32) -> Result<(), HubError> {
        if !self.hotkey_lists.contains_key(&id) {
            return Err(HubError::UnknownHotkeyList(id));
        }
        let ctx = self
            .input_contexts
            .get_mut(&icid)
            .ok_or(HubError::UnknownInputContext(icid))?;
        ctx.active_hotkey_list = Some(id);
        Ok(())
    }

    /// Clear `icid`'s active hotkey list, if any, returning the id that was
    /// active.
    pub fn deactivate_hotkey_list(&mut self, icid: InputContextId) -> Option<u32> {
        self.input_contexts.get_mut(&icid)?.active_hotkey_list.take()
    }

    /// Clear every input context's active-hotkey-list reference to `id`
    /// (used when `id` is removed out from under an activation), returning
    /// the ids of the contexts that had it active.
    pub fn clear_hotkey_list_references(&mut self, id: u32) -> Vec<InputContextId> {
        let mut affected = Vec::new();
        for ctx in self.input_contexts.values_mut() {
            if ctx.active_hotkey_list == Some(id) {
                ctx.active_hotkey_list = None;
                affected.push(ctx.id);
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn info(id: u32, string_id: &str) -> ComponentInfo {
        ComponentInfo {
            id: ComponentId::new(id),
            string_id: string_id.to_string(),
            name: string_id.to_string(),
            produce_message: HashSet::new(),
            consume_message: HashSet::new(),
        }
    }

    #[test]
    fn duplicate_string_id_rejected() {
        let mut reg = Registries::new();
        reg.register_component(info(1, "ime.a")).unwrap();
        let err = reg.register_component(info(2, "ime.a")).unwrap_err();
        assert!(matches!(err, HubError::DuplicateStringId(_)));
    }

    #[test]
    fn deregister_removes_from_all_indices() {
        let mut reg = Registries::new();
        reg.register_component(info(1, "ime.a")).unwrap();
        assert!(reg.component(ComponentId::new(1)).is_some());
        reg.deregister_component(ComponentId::new(1));
        assert!(reg.component(ComponentId::new(1)).is_none());
        assert!(reg.component_by_string_id("ime.a").is_none());
    }

    #[test]
    fn focus_moves_between_contexts() {
        let mut reg = Registries::new();
        let a = reg.create_input_context(ComponentId::new(1));
        let b = reg.create_input_context(ComponentId::new(1));
        reg.set_focus(a).unwrap();
        assert!(reg.input_context(a).unwrap().focused);
        let previous = reg.set_focus(b).unwrap();
        assert_eq!(previous, Some(a));
        assert!(!reg.input_context(a).unwrap().focused);
        assert!(reg.input_context(b).unwrap().focused);
    }

    #[test]
    fn set_focus_on_unknown_context_errors() {
        let mut reg = Registries::new();
        let err = reg.set_focus(InputContextId::new(999)).unwrap_err();
        assert!(matches!(err, HubError::UnknownInputContext(_)));
    }

    #[test]
    fn allocated_ids_never_reuse_default() {
        let mut reg = Registries::new();
        let id = reg.allocate_component_id();
        assert_ne!(id, ComponentId::DEFAULT);
    }

    #[test]
    fn none_context_is_seeded_and_cannot_be_deleted() {
        let mut reg = Registries::new();
        assert!(reg.input_context(InputContextId::NONE).is_some());
        let deleted = reg.delete_input_context(InputContextId::NONE);
        assert!(deleted.is_none());
        assert!(reg.input_context(InputContextId::NONE).is_some());
    }

    fn binding(keycode: u32, action_id: u32) -> crate::message::HotkeyBinding {
        crate::message::HotkeyBinding {
            keycode,
            modifiers: 0,
            action_id,
        }
    }

    #[test]
    fn activate_hotkey_list_rejects_unknown_list() {
        let mut reg = Registries::new();
        let icid = reg.create_input_context(ComponentId::new(1));
        let err = reg.activate_hotkey_list(icid, 99).unwrap_err();
        assert!(matches!(err, HubError::UnknownHotkeyList(99)));
    }

    #[test]
    fn activate_and_deactivate_hotkey_list() {
        let mut reg = Registries::new();
        let icid = reg.create_input_context(ComponentId::new(1));
        reg.add_hotkey_list(HotkeyList {
            id: 1,
            bindings: vec![binding(0x41, 1)],
        });
        reg.activate_hotkey_list(icid, 1).unwrap();
        assert_eq!(reg.input_context(icid).unwrap().active_hotkey_list, Some(1));
        assert_eq!(reg.active_hotkey_list_ids(), HashSet::from([1]));

        let previous = reg.deactivate_hotkey_list(icid);
        assert_eq!(previous, Some(1));
        assert_eq!(reg.input_context(icid).unwrap().active_hotkey_list, None);
    }

    #[test]
    fn removing_an_active_hotkey_list_clears_every_reference() {
        let mut reg = Registries::new();
        let a = reg.create_input_context(ComponentId::new(1));
        let b = reg.create_input_context(ComponentId::new(1));
        reg.add_hotkey_list(HotkeyList {
            id: 1,
            bindings: vec![binding(0x41, 1)],
        });
        reg.activate_hotkey_list(a, 1).unwrap();
        reg.activate_hotkey_list(b, 1).unwrap();

        reg.remove_hotkey_list(1);
        let affected = reg.clear_hotkey_list_references(1);
        assert_eq!(affected.len(), 2);
        assert_eq!(reg.input_context(a).unwrap().active_hotkey_list, None);
        assert_eq!(reg.input_context(b).unwrap().active_hotkey_list, None);
    }
}

//! The router: owns every registry and decides, for each incoming envelope,
//! who receives it.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::{trace, warn};

// Layer 3: Internal module imports
use crate::hub::connector::Connector;
use crate::hub::error::HubError;
use crate::hub::registry::Registries;
use crate::message::types::{KnownMessageType, BROADCAST_FALLBACK_TYPES};
use crate::message::{
    ComponentInfo, Envelope, ErrorCode, HotkeyList, InputContextInfo, KeyEvent, MessageType,
    Payload, ReplyMode, Variable,
};
use crate::monitoring::{HubEvent, HubEventKind, Monitor};
use crate::util::{ComponentId, InputContextId};

/// Owns Hub's routing state and decides delivery for every envelope handed
/// to [`Hub::handle`]. A single owning task drives this type; nothing here
/// is internally synchronized.
pub struct Hub<M: Monitor<HubEvent>> {
    registries: Registries,
    connectors: HashMap<ComponentId, Arc<dyn Connector>>,
    monitor: M,
}

impl<M: Monitor<HubEvent>> Hub<M> {
    pub fn new(monitor: M) -> Self {
        Self {
            registries: Registries::new(),
            connectors: HashMap::new(),
            monitor,
        }
    }

    /// Attach a connector under `id`, making it eligible to receive
    /// deliveries once it completes registration.
    pub fn attach_connector(&mut self, id: ComponentId, connector: Arc<dyn Connector>) {
        self.connectors.insert(id, connector);
    }

    /// Detach the connector for `id`, deregistering any component state it
    /// held.
    pub fn detach_connector(&mut self, id: ComponentId) {
        self.connectors.remove(&id);
        if let Some(info) = self.registries.deregister_component(id) {
            self.record(HubEventKind::ComponentDeregistered { component_id: id });
            let _ = info;
        }
    }

    /// Record a monitoring event. `Monitor::record` is async only so its
    /// trait shape matches `snapshot`/`reset`; every implementation in this
    /// crate completes synchronously, so driving it with `block_on` here
    /// keeps Hub's own dispatch path (and tests) free of a runtime dependency.
    fn record(&self, kind: HubEventKind) {
        let event = HubEvent {
            timestamp: chrono::Utc::now(),
            event_kind: kind,
            metadata: HashMap::new(),
        };
        let _ = futures::executor::block_on(self.monitor.record(event));
    }

    fn deliver_to(&self, target: ComponentId, envelope: Envelope) {
        if let Some(connector) = self.connectors.get(&target) {
            connector.deliver(envelope);
        } else {
            warn!(target = %target, message_type = envelope.message_type.id(), "dropping envelope for unknown connector");
        }
    }

    /// Build and deliver the `IsReply`/`Error` envelope answering a failed
    /// `NeedReply` request; for `NoReply` requests, just log and drop.
    fn fail(&self, envelope: &Envelope, code: ErrorCode, message: impl Into<String>) {
        match envelope.reply_mode {
            ReplyMode::NeedReply => {
                let reply = envelope.reply(envelope.message_type, Payload::error(code, message));
                self.deliver_to(envelope.source, reply);
            }
            _ => {
                warn!(
                    source = %envelope.source,
                    message_type = envelope.message_type.id(),
                    "dropping undeliverable envelope: {}",
                    message.into()
                );
            }
        }
    }

    /// Process one envelope to completion. Hub never panics: every error
    /// path here resolves into a reply or a logged drop, never a propagated
    /// `Result`.
    pub fn handle(&mut self, envelope: Envelope) {
        if envelope.message_type.is_system_reserved()
            && !matches!(
                envelope.message_type,
                MessageType::Known(KnownMessageType::AttachHubHost)
                    | MessageType::Known(KnownMessageType::DetachHubHost)
            )
        {
            self.record(HubEventKind::ReservedRangeViolation {
                component_id: envelope.source,
                message_type_id: envelope.message_type.id(),
            });
            self.fail(
                &envelope,
                ErrorCode::InvalidMessage,
                "message type is reserved for internal use",
            );
            return;
        }

        match envelope.message_type {
            MessageType::Known(KnownMessageType::RegisterComponent) => self.on_register(envelope),
            MessageType::Known(KnownMessageType::DeregisterComponent) => {
                self.on_deregister(envelope)
            }
            MessageType::Known(KnownMessageType::QueryComponent) => self.on_query_component(envelope),
            MessageType::Known(KnownMessageType::CreateInputContext) => {
                self.on_create_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::DeleteInputContext) => {
                self.on_delete_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::QueryInputContext) => {
                self.on_query_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::FocusInputContext) => {
                self.on_focus_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::BlurInputContext) => {
                self.on_blur_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::AttachToInputContext) => {
                self.on_attach_to_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::DetachFromInputContext) => {
                self.on_detach_from_input_context(envelope)
            }
            MessageType::Known(KnownMessageType::AssignActiveConsumer) => {
                self.on_assign_active_consumer(envelope)
            }
            MessageType::Known(KnownMessageType::ResignActiveConsumer) => {
                self.on_resign_active_consumer(envelope)
            }
            MessageType::Known(KnownMessageType::RequestConsumer) => {
                self.on_request_consumer(envelope)
            }
            MessageType::Known(KnownMessageType::ActivateComponent) => {
                self.on_activate_component(envelope)
            }
            MessageType::Known(KnownMessageType::QueryActiveConsumer) => {
                self.on_query_active_consumer(envelope)
            }
            MessageType::Known(KnownMessageType::SendKeyEvent) => self.on_send_key_event(envelope),
            MessageType::Known(KnownMessageType::AddHotkeyList) => self.on_add_hotkey_list(envelope),
            MessageType::Known(KnownMessageType::RemoveHotkeyList) => {
                self.on_remove_hotkey_list(envelope)
            }
            MessageType::Known(KnownMessageType::CheckHotkeyConflict) => {
                self.on_check_hotkey_conflict(envelope)
            }
            MessageType::Known(KnownMessageType::ActivateHotkeyList) => {
                self.on_activate_hotkey_list(envelope)
            }
            MessageType::Known(KnownMessageType::DeactivateHotkeyList) => {
                self.on_deactivate_hotkey_list(envelope)
            }
            MessageType::Known(KnownMessageType::QueryActiveHotkeyList) => {
                self.on_query_active_hotkey_list(envelope)
            }
            _ => self.dispatch(envelope),
        }
    }

    fn on_register(&mut self, envelope: Envelope) {
        let mut info = match &envelope.payload {
            Payload::ComponentInfo(info) => info.clone(),
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected ComponentInfo");
                return;
            }
        };
        let id = self.registries.allocate_component_id();
        info.id = id;
        let string_id = info.string_id.clone();
        match self.registries.register_component(info.clone()) {
            Ok(()) => {
                // Every component starts out attached to the shared NONE
                // context rather than a private one of its own; it joins a
                // real input context later via AttachToInputContext.
                if let Some(ctx) = self.registries.input_context_mut(InputContextId::NONE) {
                    ctx.attached.insert(id);
                }
                self.record(HubEventKind::ComponentRegistered {
                    component_id: id,
                    string_id,
                });
                let reply = envelope.reply(
                    MessageType::Known(KnownMessageType::ComponentCreated),
                    Payload::ComponentInfo(info.clone()),
                );
                self.deliver_to(envelope.source, reply);
                self.notify_attached_except(
                    InputContextId::NONE,
                    id,
                    MessageType::Known(KnownMessageType::ComponentCreated),
                    Payload::ComponentInfo(info),
                );
            }
            Err(err) => self.fail(&envelope, ErrorCode::InvalidArgument, err.to_string()),
        }
    }

    fn on_deregister(&mut self, envelope: Envelope) {
        let target = envelope.source;
        if self.registries.deregister_component(target).is_some() {
            self.connectors.remove(&target);
            self.record(HubEventKind::ComponentDeregistered {
                component_id: target,
            });
            if envelope.reply_mode == ReplyMode::NeedReply {
                let reply = envelope.reply(
                    MessageType::Known(KnownMessageType::ComponentDeleted),
                    Payload::Empty,
                );
                self.deliver_to(envelope.source, reply);
            }
        } else {
            self.fail(&envelope, ErrorCode::ComponentNotFound, "unknown component");
        }
    }

    fn on_query_component(&self, envelope: Envelope) {
        match self.registries.component(envelope.target) {
            Some(info) => {
                let reply = envelope.reply(envelope.message_type, Payload::ComponentInfo(info.clone()));
                self.deliver_to(envelope.source, reply);
            }
            None => self.fail(&envelope, ErrorCode::ComponentNotFound, "unknown component"),
        }
    }

    fn on_create_input_context(&mut self, envelope: Envelope) {
        let icid = self.registries.create_input_context(envelope.source);
        if let Some(ctx) = self.registries.input_context_mut(icid) {
            ctx.attached.insert(envelope.source);
        }
        self.record(HubEventKind::InputContextCreated {
            icid,
            owner: envelope.source,
        });
        let reply = envelope.reply(
            MessageType::Known(KnownMessageType::InputContextCreated),
            Payload::Uint32Array(vec![icid.value()]),
        );
        self.deliver_to(envelope.source, reply);
        self.notify_attached_except(
            icid,
            envelope.source,
            MessageType::Known(KnownMessageType::InputContextCreated),
            Payload::Uint32Array(vec![icid.value()]),
        );
    }

    fn on_delete_input_context(&mut self, envelope: Envelope) {
        match self.registries.delete_input_context(envelope.icid) {
            Some(_) => {
                self.record(HubEventKind::InputContextDeleted { icid: envelope.icid });
                if envelope.reply_mode == ReplyMode::NeedReply {
                    let reply = envelope.reply(
                        MessageType::Known(KnownMessageType::InputContextDeleted),
                        Payload::Empty,
                    );
                    self.deliver_to(envelope.source, reply);
                }
            }
            None => self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context"),
        }
    }

    fn on_query_input_context(&self, envelope: Envelope) {
        match self.registries.input_context(envelope.icid) {
            Some(ctx) => {
                let info = InputContextInfo {
                    id: ctx.id,
                    owner: ctx.owner,
                    focused: ctx.focused,
                    attached: ctx.attached.iter().copied().collect(),
                };
                let reply = envelope.reply(envelope.message_type, Payload::InputContextInfo(info));
                self.deliver_to(envelope.source, reply);
            }
            None => self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context"),
        }
    }

    fn on_focus_input_context(&mut self, envelope: Envelope) {
        match self.registries.set_focus(envelope.icid) {
            Ok(previous) => {
                self.record(HubEventKind::FocusChanged {
                    previous,
                    current: envelope.icid,
                });
                if let Some(prev) = previous {
                    self.notify_attached(
                        prev,
                        MessageType::Known(KnownMessageType::InputContextLostFocus),
                    );
                }
                self.notify_attached(
                    envelope.icid,
                    MessageType::Known(KnownMessageType::InputContextGotFocus),
                );
            }
            Err(err) => self.fail(&envelope, ErrorCode::InputContextNotFound, err.to_string()),
        }
    }

    fn on_blur_input_context(&mut self, envelope: Envelope) {
        self.registries.clear_focus(envelope.icid);
        self.notify_attached(
            envelope.icid,
            MessageType::Known(KnownMessageType::InputContextLostFocus),
        );
    }

    fn notify_attached(&self, icid: InputContextId, message_type: MessageType) {
        self.notify_attached_except(icid, ComponentId::DEFAULT, message_type, Payload::Empty);
    }

    /// Broadcast `message_type` to every component attached to `icid` except
    /// `exclude`, which is typically the component that already received the
    /// same news as a point-to-point reply.
    fn notify_attached_except(
        &self,
        icid: InputContextId,
        exclude: ComponentId,
        message_type: MessageType,
        payload: Payload,
    ) {
        let Some(ctx) = self.registries.input_context(icid) else {
            return;
        };
        for component in ctx.attached.iter().copied() {
            if component == exclude {
                continue;
            }
            let notice = Envelope::new(
                message_type,
                ComponentId::DEFAULT,
                component,
                icid,
                payload.clone(),
            );
            self.deliver_to(component, notice);
        }
    }

    fn on_attach_to_input_context(&mut self, envelope: Envelope) {
        let icid = envelope.icid;
        let source = envelope.source;
        let Some(ctx) = self.registries.input_context_mut(icid) else {
            self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context");
            return;
        };
        ctx.attached.insert(source);
        if envelope.reply_mode == ReplyMode::NeedReply {
            let reply = envelope.reply(
                MessageType::Known(KnownMessageType::ComponentAttached),
                Payload::Empty,
            );
            self.deliver_to(source, reply);
        }
        self.notify_attached_except(
            icid,
            source,
            MessageType::Known(KnownMessageType::ComponentAttached),
            Payload::Uint32Array(vec![source.value()]),
        );
    }

    fn on_detach_from_input_context(&mut self, envelope: Envelope) {
        let icid = envelope.icid;
        let source = envelope.source;
        let Some(ctx) = self.registries.input_context_mut(icid) else {
            self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context");
            return;
        };
        ctx.attached.remove(&source);
        ctx.clear_consumer(source);
        if envelope.reply_mode == ReplyMode::NeedReply {
            let reply = envelope.reply(
                MessageType::Known(KnownMessageType::DetachedFromInputContext),
                Payload::Empty,
            );
            self.deliver_to(source, reply);
        }
        self.notify_attached_except(
            icid,
            source,
            MessageType::Known(KnownMessageType::ComponentDetached),
            Payload::Uint32Array(vec![source.value()]),
        );
    }

    fn on_assign_active_consumer(&mut self, envelope: Envelope) {
        let message_type = match &envelope.payload {
            Payload::Uint32Array(ids) if !ids.is_empty() => {
                match MessageType::try_from(ids[0]) {
                    Ok(mt) => mt,
                    Err(_) => unreachable!("MessageType conversion is infallible"),
                }
            }
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected a message type id");
                return;
            }
        };
        let icid = envelope.icid;
        let consumer = envelope.source;
        let Some(ctx) = self.registries.input_context_mut(icid) else {
            self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context");
            return;
        };
        ctx.assign_active_consumer(message_type, consumer);
        self.record(HubEventKind::ActiveConsumerChanged {
            icid,
            message_type: format!("{:?}", message_type),
            consumer: Some(consumer),
        });
        if envelope.reply_mode == ReplyMode::NeedReply {
            let reply = envelope.reply(
                MessageType::Known(KnownMessageType::ActiveConsumerChanged),
                Payload::Empty,
            );
            self.deliver_to(consumer, reply);
        }
        self.broadcast_active_consumer_changed(icid, consumer, message_type, Some(consumer));
    }

    fn on_resign_active_consumer(&mut self, envelope: Envelope) {
        let message_type = match &envelope.payload {
            Payload::Uint32Array(ids) if !ids.is_empty() => {
                match MessageType::try_from(ids[0]) {
                    Ok(mt) => mt,
                    Err(_) => unreachable!("MessageType conversion is infallible"),
                }
            }
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected a message type id");
                return;
            }
        };
        let icid = envelope.icid;
        let source = envelope.source;
        let was_consumer = match self.registries.input_context_mut(icid) {
            Some(ctx) => {
                let held = ctx.active_consumer_for(message_type) == Some(source);
                ctx.resign_active_consumer(message_type, source);
                held
            }
            None => false,
        };
        if was_consumer {
            self.record(HubEventKind::ActiveConsumerChanged {
                icid,
                message_type: format!("{:?}", message_type),
                consumer: None,
            });
            self.broadcast_active_consumer_changed(icid, source, message_type, None);
        }
    }

    fn on_query_active_consumer(&self, envelope: Envelope) {
        let message_type = match &envelope.payload {
            Payload::Uint32Array(ids) if !ids.is_empty() => match MessageType::try_from(ids[0]) {
                Ok(mt) => mt,
                Err(_) => unreachable!("MessageType conversion is infallible"),
            },
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected a message type id");
                return;
            }
        };
        let consumer = self
            .registries
            .input_context(envelope.icid)
            .and_then(|ctx| ctx.active_consumer_for(message_type));
        let ids = consumer.map(|c| vec![c.value()]).unwrap_or_default();
        let reply = envelope.reply(envelope.message_type, Payload::Uint32Array(ids));
        self.deliver_to(envelope.source, reply);
    }

    /// Broadcast `ActiveConsumerChanged` to every other component attached
    /// to `icid`, carrying the message type and its new holder (`None` is
    /// encoded as `ComponentId::DEFAULT` when a consumer resigns). `exclude`
    /// is the component that already learned the news as a direct reply.
    fn broadcast_active_consumer_changed(
        &self,
        icid: InputContextId,
        exclude: ComponentId,
        message_type: MessageType,
        consumer: Option<ComponentId>,
    ) {
        let holder = consumer.unwrap_or(ComponentId::DEFAULT);
        self.notify_attached_except(
            icid,
            exclude,
            MessageType::Known(KnownMessageType::ActiveConsumerChanged),
            Payload::Uint32Array(vec![message_type.id(), holder.value()]),
        );
    }

    /// Explicit activation (`ActivateComponent`): promote `envelope.source`
    /// to active consumer for every message type it can consume that has no
    /// active consumer yet on `envelope.icid`. Never preempts an existing
    /// holder, including the input context's owner, and skips
    /// system-reserved types, which are never routed through the
    /// active-consumer table.
    fn on_activate_component(&mut self, envelope: Envelope) {
        let icid = envelope.icid;
        let source = envelope.source;
        let Some(info) = self.registries.component(source) else {
            self.fail(&envelope, ErrorCode::ComponentNotFound, "unknown component");
            return;
        };
        if self.registries.input_context(icid).is_none() {
            self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context");
            return;
        }
        let candidate_types: Vec<MessageType> = info.consume_message.iter().copied().collect();

        let mut activated = Vec::new();
        for message_type in candidate_types {
            if message_type.is_system_reserved() {
                continue;
            }
            let already_claimed = self
                .registries
                .input_context(icid)
                .is_some_and(|ctx| ctx.active_consumer_for(message_type).is_some());
            if already_claimed {
                continue;
            }
            if let Some(ctx) = self.registries.input_context_mut(icid) {
                ctx.assign_active_consumer(message_type, source);
            }
            self.record(HubEventKind::ActiveConsumerChanged {
                icid,
                message_type: format!("{:?}", message_type),
                consumer: Some(source),
            });
            self.broadcast_active_consumer_changed(icid, source, message_type, Some(source));
            activated.push(message_type.id());
        }

        if envelope.reply_mode == ReplyMode::NeedReply {
            let reply = envelope.reply(
                MessageType::Known(KnownMessageType::ComponentActivated),
                Payload::Uint32Array(activated),
            );
            self.deliver_to(source, reply);
        }
    }

    /// `RequestConsumer` asks Hub to recruit components to cover the listed
    /// message types that have no active consumer yet on `envelope.icid`.
    /// Hub cannot block mid-dispatch for a real `AttachToInputContext`
    /// round trip, so recruitment is optimistic: the first component
    /// anywhere that consumes the type is attached (if it wasn't already)
    /// and assigned as active consumer outright. A candidate that is the
    /// requester itself learns the outcome from the reply and is not also
    /// sent the out-of-band recruitment notices meant for a third party.
    /// Types with no consuming component anywhere are reported as
    /// unresolved.
    fn on_request_consumer(&mut self, envelope: Envelope) {
        let types: Vec<MessageType> = match &envelope.payload {
            Payload::Uint32Array(ids) => ids
                .iter()
                .filter_map(|id| MessageType::try_from(*id).ok())
                .collect(),
            _ => {
                self.fail(
                    &envelope,
                    ErrorCode::InvalidPayload,
                    "expected a list of message type ids",
                );
                return;
            }
        };
        let icid = envelope.icid;
        let source = envelope.source;
        if self.registries.input_context(icid).is_none() {
            self.fail(&envelope, ErrorCode::InputContextNotFound, "unknown input context");
            return;
        }

        let mut unresolved = Vec::new();
        for message_type in types {
            let covered = self
                .registries
                .input_context(icid)
                .is_some_and(|ctx| ctx.active_consumer_for(message_type).is_some());
            if covered {
                continue;
            }

            let candidate = self.registries.components_consuming(message_type).next();

            let Some(candidate_id) = candidate else {
                unresolved.push(message_type.id());
                continue;
            };

            let already_attached = self
                .registries
                .input_context(icid)
                .is_some_and(|ctx| ctx.attached.contains(&candidate_id));

            if let Some(ctx) = self.registries.input_context_mut(icid) {
                ctx.attached.insert(candidate_id);
                ctx.assign_active_consumer(message_type, candidate_id);
            }
            self.record(HubEventKind::ActiveConsumerChanged {
                icid,
                message_type: format!("{:?}", message_type),
                consumer: Some(candidate_id),
            });

            // The requester already knows it asked for this; only a
            // third-party candidate needs the out-of-band notices.
            if candidate_id != source {
                if !already_attached {
                    let attach_notice = Envelope::new(
                        MessageType::Known(KnownMessageType::AttachToInputContext),
                        ComponentId::DEFAULT,
                        candidate_id,
                        icid,
                        Payload::Empty,
                    );
                    self.deliver_to(candidate_id, attach_notice);
                }
                let activated_notice = Envelope::new(
                    MessageType::Known(KnownMessageType::ComponentActivated),
                    ComponentId::DEFAULT,
                    candidate_id,
                    icid,
                    Payload::Uint32Array(vec![message_type.id()]),
                );
                self.deliver_to(candidate_id, activated_notice);
            }
            if !already_attached {
                self.notify_attached_except(
                    icid,
                    candidate_id,
                    MessageType::Known(KnownMessageType::ComponentAttached),
                    Payload::Uint32Array(vec![candidate_id.value()]),
                );
            }
            self.broadcast_active_consumer_changed(icid, candidate_id, message_type, Some(candidate_id));
        }

        if envelope.reply_mode == ReplyMode::NeedReply {
            let reply = envelope.reply(envelope.message_type, Payload::Uint32Array(unresolved));
            self.deliver_to(source, reply);
        }
    }

    /// Route an arbitrary envelope that isn't one of Hub's own lifecycle
    /// operations: explicit target first, then the input context's active
    /// consumer, then broadcast-fallback types, else fail.
    fn dispatch(&mut self, envelope: Envelope) {
        if envelope.target != ComponentId::DEFAULT && envelope.target != ComponentId::BROADCAST {
            if self.registries.component(envelope.target).is_none() {
                self.fail(&envelope, ErrorCode::ComponentNotFound, "unknown target component");
                return;
            }
            self.deliver_to(envelope.target, envelope);
            return;
        }

        if envelope.target == ComponentId::BROADCAST {
            let targets: Vec<ComponentId> = self
                .registries
                .components_consuming(envelope.message_type)
                .collect();
            for target in targets {
                self.deliver_to(target, envelope.clone());
            }
            return;
        }

        if let Some(consumer) = self
            .registries
            .input_context(envelope.icid)
            .and_then(|ctx| ctx.active_consumer_for(envelope.message_type))
        {
            trace!(consumer = %consumer, message_type = envelope.message_type.id(), "dispatch to active consumer");
            self.deliver_to(consumer, envelope);
            return;
        }

        if let MessageType::Known(known) = envelope.message_type {
            if BROADCAST_FALLBACK_TYPES.contains(&known) {
                let targets: Vec<ComponentId> = self
                    .registries
                    .components_consuming(envelope.message_type)
                    .collect();
                for target in targets {
                    self.deliver_to(target, envelope.clone());
                }
                return;
            }
        }

        self.record(HubEventKind::DispatchFailed {
            message_type: format!("{:?}", envelope.message_type),
            reason: "no active consumer and not a broadcast-fallback type".to_string(),
        });
        self.fail(&envelope, ErrorCode::ComponentNotFound, "no consumer for this message type");
    }

    /// `SendKeyEvent` is the one message type Hub inspects before falling
    /// back to ordinary active-consumer dispatch: a key press may be
    /// claimed by the focused context's active hotkey list before it ever
    /// reaches an input method. Explicit-target and broadcast sends skip
    /// hotkey matching entirely and fall through to plain `dispatch`.
    fn on_send_key_event(&mut self, envelope: Envelope) {
        if envelope.target != ComponentId::DEFAULT {
            self.dispatch(envelope);
            return;
        }

        let key_event: Option<KeyEvent> = match &envelope.payload {
            Payload::KeyEvent(k) => Some(*k),
            _ => None,
        };

        if let Some(key_event) = key_event {
            if !key_event.is_key_up {
                if let Some(focused) = self.registries.focused_icid() {
                    if let Some(action_id) = self.match_hotkey(focused, key_event) {
                        self.dispatch_hotkey_action(focused, action_id);
                        if envelope.reply_mode == ReplyMode::NeedReply {
                            let reply = envelope.reply(
                                envelope.message_type,
                                Payload::Variable(Variable::Bool(true)),
                            );
                            self.deliver_to(envelope.source, reply);
                        }
                        return;
                    }
                }
            }
        }

        self.forward_as_process_key_event(envelope);
    }

    /// Look up `icid`'s active hotkey list and return the action bound to
    /// `key_event`'s chord, if any.
    fn match_hotkey(&self, icid: InputContextId, key_event: KeyEvent) -> Option<u32> {
        let list_id = self.registries.input_context(icid)?.active_hotkey_list?;
        let list = self.registries.hotkey_list(list_id)?;
        list.bindings
            .iter()
            .find(|binding| {
                binding.keycode == key_event.keycode && binding.modifiers == key_event.modifiers
            })
            .map(|binding| binding.action_id)
    }

    /// A matched hotkey is dispatched as an ordinary `DoCommand` on the
    /// owning icid, routed through the same active-consumer/broadcast rules
    /// as any other command.
    fn dispatch_hotkey_action(&mut self, icid: InputContextId, action_id: u32) {
        let command = Envelope::new(
            MessageType::Known(KnownMessageType::DoCommand),
            ComponentId::DEFAULT,
            ComponentId::DEFAULT,
            icid,
            Payload::Uint32Array(vec![action_id]),
        );
        self.dispatch(command);
    }

    /// No hotkey claimed this key: forward it to whichever component holds
    /// the active-consumer slot for `SendKeyEvent` on this icid, rewriting
    /// the message type to `ProcessKeyEvent` on the way out. The
    /// active-consumer slot stays keyed by `SendKeyEvent` (that's what
    /// `RequestConsumer`/`AssignActiveConsumer` name), only the delivered
    /// envelope's type changes.
    fn forward_as_process_key_event(&mut self, mut envelope: Envelope) {
        let Some(consumer) = self
            .registries
            .input_context(envelope.icid)
            .and_then(|ctx| ctx.active_consumer_for(envelope.message_type))
        else {
            self.record(HubEventKind::DispatchFailed {
                message_type: format!("{:?}", envelope.message_type),
                reason: "no active consumer for key routing".to_string(),
            });
            self.fail(&envelope, ErrorCode::ComponentNotFound, "no consumer for key events");
            return;
        };
        envelope.message_type = MessageType::Known(KnownMessageType::ProcessKeyEvent);
        self.deliver_to(consumer, envelope);
    }

    fn on_add_hotkey_list(&mut self, envelope: Envelope) {
        match &envelope.payload {
            Payload::HotkeyList(list) => {
                self.registries.add_hotkey_list(list.clone());
            }
            _ => self.fail(&envelope, ErrorCode::InvalidPayload, "expected a HotkeyList"),
        }
    }

    fn on_remove_hotkey_list(&mut self, envelope: Envelope) {
        let ids = match &envelope.payload {
            Payload::Uint32Array(ids) => ids.clone(),
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected hotkey list ids");
                return;
            }
        };
        for id in ids {
            if self.registries.remove_hotkey_list(id).is_some() {
                let affected = self.registries.clear_hotkey_list_references(id);
                for icid in affected {
                    self.notify_attached(
                        icid,
                        MessageType::Known(KnownMessageType::ActiveHotkeyListUpdated),
                    );
                }
            }
        }
    }

    /// Compares `candidate` against every hotkey list currently active on
    /// any input context and returns the colliding chords. Read-only: it
    /// never mutates `hotkey_lists` or any activation.
    fn on_check_hotkey_conflict(&self, envelope: Envelope) {
        let candidate = match &envelope.payload {
            Payload::HotkeyList(list) => list.clone(),
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected a HotkeyList");
                return;
            }
        };

        let mut seen = std::collections::HashSet::new();
        let mut colliding = Vec::new();
        for active_id in self.registries.active_hotkey_list_ids() {
            if active_id == candidate.id {
                continue;
            }
            let Some(active_list) = self.registries.hotkey_list(active_id) else {
                continue;
            };
            for binding in &candidate.bindings {
                let chord = (binding.keycode, binding.modifiers);
                if seen.contains(&chord) {
                    continue;
                }
                if active_list
                    .bindings
                    .iter()
                    .any(|other| other.keycode == binding.keycode && other.modifiers == binding.modifiers)
                {
                    seen.insert(chord);
                    colliding.push(binding.clone());
                }
            }
        }

        let reply = envelope.reply(
            envelope.message_type,
            Payload::HotkeyList(HotkeyList {
                id: candidate.id,
                bindings: colliding,
            }),
        );
        self.deliver_to(envelope.source, reply);
    }

    fn on_activate_hotkey_list(&mut self, envelope: Envelope) {
        let id = match &envelope.payload {
            Payload::Uint32Array(ids) if !ids.is_empty() => ids[0],
            _ => {
                self.fail(&envelope, ErrorCode::InvalidPayload, "expected a hotkey list id");
                return;
            }
        };
        let icid = envelope.icid;
        match self.registries.activate_hotkey_list(icid, id) {
            Ok(()) => self.notify_attached(
                icid,
                MessageType::Known(KnownMessageType::ActiveHotkeyListUpdated),
            ),
            Err(err) => self.fail(&envelope, ErrorCode::InvalidArgument, err.to_string()),
        }
    }

    fn on_deactivate_hotkey_list(&mut self, envelope: Envelope) {
        let icid = envelope.icid;
        if self.registries.deactivate_hotkey_list(icid).is_some() {
            self.notify_attached(
                icid,
                MessageType::Known(KnownMessageType::ActiveHotkeyListUpdated),
            );
        }
    }

    fn on_query_active_hotkey_list(&self, envelope: Envelope) {
        let list = self
            .registries
            .input_context(envelope.icid)
            .and_then(|ctx| ctx.active_hotkey_list)
            .and_then(|id| self.registries.hotkey_list(id))
            .cloned();
        let payload = match list {
            Some(list) => Payload::HotkeyList(list),
            None => Payload::Empty,
        };
        let reply = envelope.reply(envelope.message_type, payload);
        self.deliver_to(envelope.source, reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::NoopMonitor;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    struct RecordingConnector {
        id: ComponentId,
        received: Arc<StdMutex<Vec<Envelope>>>,
    }

    impl Connector for RecordingConnector {
        fn component_id(&self) -> ComponentId {
            self.id
        }

        fn deliver(&self, envelope: Envelope) {
            self.received.lock().unwrap().push(envelope);
        }
    }

    fn new_hub() -> Hub<NoopMonitor<HubEvent>> {
        Hub::new(NoopMonitor::new())
    }

    fn register_envelope(string_id: &str) -> Envelope {
        let info = ComponentInfo {
            id: ComponentId::DEFAULT,
            string_id: string_id.to_string(),
            name: string_id.to_string(),
            produce_message: HashSet::new(),
            consume_message: HashSet::new(),
        };
        Envelope::new(
            MessageType::Known(KnownMessageType::RegisterComponent),
            ComponentId::DEFAULT,
            ComponentId::DEFAULT,
            InputContextId::NONE,
            Payload::ComponentInfo(info),
        )
        .with_reply_mode(ReplyMode::NeedReply)
    }

    #[test]
    fn register_component_assigns_id_and_replies() {
        let mut hub = new_hub();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            id: ComponentId::DEFAULT,
            received: received.clone(),
        });
        hub.attach_connector(ComponentId::DEFAULT, connector);

        hub.handle(register_envelope("ime.test"));

        let replies = received.lock().unwrap();
        assert_eq!(replies.len(), 1);
        match &replies[0].payload {
            Payload::ComponentInfo(info) => {
                assert_ne!(info.id, ComponentId::DEFAULT);
                assert_eq!(info.string_id, "ime.test");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn unreachable_target_gets_error_reply() {
        let mut hub = new_hub();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), connector);

        let envelope = Envelope::new(
            MessageType::UserDefined(crate::message::types::USER_DEFINED_START),
            ComponentId::new(1),
            ComponentId::new(999),
            InputContextId::NONE,
            Payload::Empty,
        )
        .with_reply_mode(ReplyMode::NeedReply);
        hub.handle(envelope);

        let replies = received.lock().unwrap();
        assert_eq!(replies.len(), 1);
        match &replies[0].payload {
            Payload::Error { code, .. } => assert_eq!(*code, ErrorCode::ComponentNotFound),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn system_reserved_message_type_rejected() {
        let mut hub = new_hub();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), connector);

        let envelope = Envelope::new(
            MessageType::UserDefined(0x9000),
            ComponentId::new(1),
            ComponentId::DEFAULT,
            InputContextId::NONE,
            Payload::Empty,
        )
        .with_reply_mode(ReplyMode::NeedReply);
        hub.handle(envelope);

        let replies = received.lock().unwrap();
        assert_eq!(replies.len(), 1);
        match &replies[0].payload {
            Payload::Error { code, .. } => assert_eq!(*code, ErrorCode::InvalidMessage),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn active_consumer_receives_dispatch() {
        let mut hub = new_hub();
        let consumer_received = Arc::new(StdMutex::new(Vec::new()));
        let consumer = Arc::new(RecordingConnector {
            id: ComponentId::new(2),
            received: consumer_received.clone(),
        });
        hub.attach_connector(ComponentId::new(2), consumer);

        let icid = hub.registries.create_input_context(ComponentId::new(1));
        if let Some(ctx) = hub.registries.input_context_mut(icid) {
            ctx.assign_active_consumer(
                MessageType::Known(KnownMessageType::SendKeyEvent),
                ComponentId::new(2),
            );
        }

        let envelope = Envelope::new(
            MessageType::Known(KnownMessageType::SendKeyEvent),
            ComponentId::new(1),
            ComponentId::DEFAULT,
            icid,
            Payload::Empty,
        );
        hub.handle(envelope);

        let received = consumer_received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].message_type,
            MessageType::Known(KnownMessageType::ProcessKeyEvent),
            "with no hotkey match, SendKeyEvent is forwarded as ProcessKeyEvent"
        );
    }

    fn key_event_envelope(icid: InputContextId, keycode: u32, modifiers: u32) -> Envelope {
        Envelope::new(
            MessageType::Known(KnownMessageType::SendKeyEvent),
            ComponentId::new(1),
            ComponentId::DEFAULT,
            icid,
            Payload::KeyEvent(crate::message::KeyEvent {
                keycode,
                modifiers,
                is_key_up: false,
            }),
        )
        .with_reply_mode(ReplyMode::NeedReply)
    }

    #[test]
    fn matched_hotkey_dispatches_command_and_replies_true() {
        let mut hub = new_hub();
        let app_received = Arc::new(StdMutex::new(Vec::new()));
        let app = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: app_received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), app.clone());

        let hotkey_received = Arc::new(StdMutex::new(Vec::new()));
        let hotkey_manager = Arc::new(RecordingConnector {
            id: ComponentId::new(3),
            received: hotkey_received.clone(),
        });
        hub.attach_connector(ComponentId::new(3), hotkey_manager);

        let icid = hub.registries.create_input_context(ComponentId::new(1));
        hub.registries.set_focus(icid).unwrap();
        if let Some(ctx) = hub.registries.input_context_mut(icid) {
            ctx.assign_active_consumer(
                MessageType::Known(KnownMessageType::DoCommand),
                ComponentId::new(3),
            );
        }
        hub.registries.add_hotkey_list(crate::message::HotkeyList {
            id: 1,
            bindings: vec![crate::message::HotkeyBinding {
                keycode: 0x20,
                modifiers: 0,
                action_id: 42,
            }],
        });
        hub.registries.activate_hotkey_list(icid, 1).unwrap();

        hub.handle(key_event_envelope(icid, 0x20, 0));

        let commands = hotkey_received.lock().unwrap();
        assert_eq!(commands.len(), 1);
        match &commands[0].payload {
            Payload::Uint32Array(ids) => assert_eq!(ids, &vec![42]),
            other => panic!("unexpected payload: {other:?}"),
        }

        let replies = app_received.lock().unwrap();
        assert_eq!(replies.len(), 1);
        match &replies[0].payload {
            Payload::Variable(Variable::Bool(true)) => {}
            other => panic!("unexpected reply payload: {other:?}"),
        }
    }

    #[test]
    fn unmatched_key_event_forwards_as_process_key_event() {
        let mut hub = new_hub();
        let ime_received = Arc::new(StdMutex::new(Vec::new()));
        let ime = Arc::new(RecordingConnector {
            id: ComponentId::new(2),
            received: ime_received.clone(),
        });
        hub.attach_connector(ComponentId::new(2), ime);

        let icid = hub.registries.create_input_context(ComponentId::new(1));
        hub.registries.set_focus(icid).unwrap();
        if let Some(ctx) = hub.registries.input_context_mut(icid) {
            ctx.assign_active_consumer(
                MessageType::Known(KnownMessageType::SendKeyEvent),
                ComponentId::new(2),
            );
        }
        hub.registries.add_hotkey_list(crate::message::HotkeyList {
            id: 1,
            bindings: vec![crate::message::HotkeyBinding {
                keycode: 0x20,
                modifiers: 0,
                action_id: 42,
            }],
        });
        hub.registries.activate_hotkey_list(icid, 1).unwrap();

        hub.handle(key_event_envelope(icid, 0x41, 0));

        let received = ime_received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].message_type,
            MessageType::Known(KnownMessageType::ProcessKeyEvent)
        );
    }

    #[test]
    fn add_activate_query_and_deactivate_hotkey_list_round_trip() {
        let mut hub = new_hub();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), connector);
        let icid = hub.registries.create_input_context(ComponentId::new(1));

        let list = crate::message::HotkeyList {
            id: 7,
            bindings: vec![crate::message::HotkeyBinding {
                keycode: 0x41,
                modifiers: 0,
                action_id: 1,
            }],
        };
        hub.handle(Envelope::new(
            MessageType::Known(KnownMessageType::AddHotkeyList),
            ComponentId::new(1),
            ComponentId::DEFAULT,
            InputContextId::NONE,
            Payload::HotkeyList(list),
        ));
        assert!(hub.registries.hotkey_list(7).is_some());

        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::ActivateHotkeyList),
                ComponentId::new(1),
                ComponentId::DEFAULT,
                icid,
                Payload::Uint32Array(vec![7]),
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );
        assert_eq!(hub.registries.input_context(icid).unwrap().active_hotkey_list, Some(7));

        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::QueryActiveHotkeyList),
                ComponentId::new(1),
                ComponentId::DEFAULT,
                icid,
                Payload::Empty,
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );
        let replies = received.lock().unwrap();
        match &replies.last().unwrap().payload {
            Payload::HotkeyList(list) => assert_eq!(list.id, 7),
            other => panic!("unexpected payload: {other:?}"),
        }
        drop(replies);

        hub.handle(Envelope::new(
            MessageType::Known(KnownMessageType::DeactivateHotkeyList),
            ComponentId::new(1),
            ComponentId::DEFAULT,
            icid,
            Payload::Empty,
        ));
        assert_eq!(hub.registries.input_context(icid).unwrap().active_hotkey_list, None);
    }

    #[test]
    fn check_hotkey_conflict_reports_colliding_chords_only() {
        let mut hub = new_hub();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let connector = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), connector);

        let icid = hub.registries.create_input_context(ComponentId::new(1));
        hub.registries.add_hotkey_list(crate::message::HotkeyList {
            id: 1,
            bindings: vec![crate::message::HotkeyBinding {
                keycode: 0x41,
                modifiers: 0,
                action_id: 1,
            }],
        });
        hub.registries.activate_hotkey_list(icid, 1).unwrap();

        let candidate = crate::message::HotkeyList {
            id: 2,
            bindings: vec![
                crate::message::HotkeyBinding {
                    keycode: 0x41,
                    modifiers: 0,
                    action_id: 2,
                },
                crate::message::HotkeyBinding {
                    keycode: 0x42,
                    modifiers: 0,
                    action_id: 3,
                },
            ],
        };
        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::CheckHotkeyConflict),
                ComponentId::new(1),
                ComponentId::DEFAULT,
                InputContextId::NONE,
                Payload::HotkeyList(candidate),
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );

        let replies = received.lock().unwrap();
        match &replies[0].payload {
            Payload::HotkeyList(list) => {
                assert_eq!(list.bindings.len(), 1);
                assert_eq!(list.bindings[0].keycode, 0x41);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn registering_a_component_notifies_others_already_in_the_default_context() {
        let mut hub = new_hub();
        let first_received = Arc::new(StdMutex::new(Vec::new()));
        let first_connector = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: first_received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), first_connector);
        hub.handle(register_envelope("ime.first"));
        assert!(
            hub.registries
                .input_context(InputContextId::NONE)
                .unwrap()
                .attached
                .contains(&ComponentId::new(1))
        );

        hub.handle(register_envelope("ime.second"));

        let notices = first_received.lock().unwrap();
        assert_eq!(notices.len(), 1);
        match &notices[0].payload {
            Payload::ComponentInfo(info) => assert_eq!(info.string_id, "ime.second"),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn activate_component_claims_unclaimed_types_but_never_preempts() {
        let mut hub = new_hub();
        let consumer_received = Arc::new(StdMutex::new(Vec::new()));
        let consumer = Arc::new(RecordingConnector {
            id: ComponentId::new(5),
            received: consumer_received.clone(),
        });
        hub.attach_connector(ComponentId::new(5), consumer);

        let mut consume = HashSet::new();
        consume.insert(MessageType::Known(KnownMessageType::SendKeyEvent));
        consume.insert(MessageType::Known(KnownMessageType::SetComposition));
        hub.registries
            .register_component(ComponentInfo {
                id: ComponentId::new(5),
                string_id: "ime.candidate".to_string(),
                name: "candidate".to_string(),
                produce_message: HashSet::new(),
                consume_message: consume,
            })
            .unwrap();

        let icid = hub.registries.create_input_context(ComponentId::new(1));
        if let Some(ctx) = hub.registries.input_context_mut(icid) {
            ctx.assign_active_consumer(
                MessageType::Known(KnownMessageType::SetComposition),
                ComponentId::new(9),
            );
        }

        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::ActivateComponent),
                ComponentId::new(5),
                ComponentId::DEFAULT,
                icid,
                Payload::Empty,
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );

        let ctx = hub.registries.input_context(icid).unwrap();
        assert_eq!(
            ctx.active_consumer_for(MessageType::Known(KnownMessageType::SendKeyEvent)),
            Some(ComponentId::new(5))
        );
        assert_eq!(
            ctx.active_consumer_for(MessageType::Known(KnownMessageType::SetComposition)),
            Some(ComponentId::new(9)),
            "ActivateComponent must not preempt an existing active consumer"
        );

        let replies = consumer_received.lock().unwrap();
        assert_eq!(replies.len(), 1);
        match &replies[0].payload {
            Payload::Uint32Array(ids) => {
                assert_eq!(ids, &vec![MessageType::Known(KnownMessageType::SendKeyEvent).id()]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn request_consumer_recruits_unattached_candidate_and_reports_unresolved_types() {
        let mut hub = new_hub();
        let candidate_received = Arc::new(StdMutex::new(Vec::new()));
        let candidate = Arc::new(RecordingConnector {
            id: ComponentId::new(7),
            received: candidate_received.clone(),
        });
        hub.attach_connector(ComponentId::new(7), candidate);

        let requester_received = Arc::new(StdMutex::new(Vec::new()));
        let requester = Arc::new(RecordingConnector {
            id: ComponentId::new(1),
            received: requester_received.clone(),
        });
        hub.attach_connector(ComponentId::new(1), requester);

        let mut consume = HashSet::new();
        consume.insert(MessageType::Known(KnownMessageType::SendKeyEvent));
        hub.registries
            .register_component(ComponentInfo {
                id: ComponentId::new(7),
                string_id: "ime.candidate".to_string(),
                name: "candidate".to_string(),
                produce_message: HashSet::new(),
                consume_message: consume,
            })
            .unwrap();

        let icid = hub.registries.create_input_context(ComponentId::new(1));
        let unresolved_type = MessageType::UserDefined(crate::message::types::USER_DEFINED_START + 1);

        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::RequestConsumer),
                ComponentId::new(1),
                ComponentId::DEFAULT,
                icid,
                Payload::Uint32Array(vec![
                    MessageType::Known(KnownMessageType::SendKeyEvent).id(),
                    unresolved_type.id(),
                ]),
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );

        let ctx = hub.registries.input_context(icid).unwrap();
        assert_eq!(
            ctx.active_consumer_for(MessageType::Known(KnownMessageType::SendKeyEvent)),
            Some(ComponentId::new(7))
        );
        assert!(ctx.attached.contains(&ComponentId::new(7)));

        let replies = requester_received.lock().unwrap();
        assert_eq!(replies.len(), 1);
        match &replies[0].payload {
            Payload::Uint32Array(ids) => assert_eq!(ids, &vec![unresolved_type.id()]),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn request_consumer_for_an_already_attached_self_does_not_duplicate_notices() {
        let mut hub = new_hub();
        let ime = ComponentId::new(5);
        let ime_received = Arc::new(StdMutex::new(Vec::new()));
        hub.attach_connector(
            ime,
            Arc::new(RecordingConnector {
                id: ime,
                received: ime_received.clone(),
            }),
        );

        let mut consume = HashSet::new();
        consume.insert(MessageType::Known(KnownMessageType::SendKeyEvent));
        hub.registries
            .register_component(ComponentInfo {
                id: ime,
                string_id: "ime.self".to_string(),
                name: "self-recruiting ime".to_string(),
                produce_message: HashSet::new(),
                consume_message: consume,
            })
            .unwrap();

        let icid = hub.registries.create_input_context(ComponentId::DEFAULT);
        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::AttachToInputContext),
                ime,
                ComponentId::DEFAULT,
                icid,
                Payload::Empty,
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );
        ime_received.lock().unwrap().clear();

        hub.handle(
            Envelope::new(
                MessageType::Known(KnownMessageType::RequestConsumer),
                ime,
                ComponentId::DEFAULT,
                icid,
                Payload::Uint32Array(vec![MessageType::Known(KnownMessageType::SendKeyEvent).id()]),
            )
            .with_reply_mode(ReplyMode::NeedReply),
        );

        let ctx = hub.registries.input_context(icid).unwrap();
        assert_eq!(
            ctx.active_consumer_for(MessageType::Known(KnownMessageType::SendKeyEvent)),
            Some(ime)
        );

        let received = ime_received.lock().unwrap();
        assert_eq!(
            received.len(),
            1,
            "the requester is the recruited candidate, so it should see only its own reply"
        );
        match &received[0].payload {
            Payload::Uint32Array(ids) => assert!(ids.is_empty()),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}

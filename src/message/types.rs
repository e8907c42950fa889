//! The closed catalogue of message kinds routed by Hub.
//!
//! Ids are stable and must never be renumbered across compatible versions;
//! they mirror the original wire protocol's `DECLARE_IPC_MSG` ordinals so
//! that a future codec revision can stay bit-compatible.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

// Layer 3: Internal module imports
// (none)

/// Start of the range Hub reserves for itself; external components may not
/// send a message whose type falls in `SYSTEM_RESERVED_START..=SYSTEM_RESERVED_END`.
pub const SYSTEM_RESERVED_START: u32 = 0x8000;
/// End of Hub's internal reserved range (inclusive).
pub const SYSTEM_RESERVED_END: u32 = 0xFFFF;
/// Start of the range reserved for third-party, opaquely-routed message types.
pub const USER_DEFINED_START: u32 = 0x10000;

/// A message kind from the closed catalogue Hub understands natively.
///
/// Message types at or above [`USER_DEFINED_START`] are routed opaquely by
/// Hub (treated the same as any other explicit-target dispatch, but never
/// inspected for hotkey/active-consumer semantics) and are represented by
/// [`MessageType::UserDefined`] rather than a named variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum MessageType {
    /// A closed-catalogue message kind.
    Known(KnownMessageType),
    /// A third-party message type `>= USER_DEFINED_START`, routed opaquely.
    UserDefined(u32),
}

impl MessageType {
    /// The numeric id this message type serializes to on the wire.
    pub fn id(&self) -> u32 {
        match self {
            MessageType::Known(k) => *k as u32,
            MessageType::UserDefined(id) => *id,
        }
    }

    /// True if this id falls in Hub's internal reserved range and must never
    /// be accepted from an external component.
    pub fn is_system_reserved(&self) -> bool {
        matches!(self.id(), SYSTEM_RESERVED_START..=SYSTEM_RESERVED_END)
    }

    /// True if this is a third-party type Hub routes without interpreting.
    pub fn is_user_defined(&self) -> bool {
        self.id() >= USER_DEFINED_START
    }
}

impl From<MessageType> for u32 {
    fn from(value: MessageType) -> Self {
        value.id()
    }
}

impl TryFrom<u32> for MessageType {
    type Error = std::convert::Infallible;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match KnownMessageType::from_id(value) {
            Some(known) => MessageType::Known(known),
            None => MessageType::UserDefined(value),
        })
    }
}

/// Every named message kind in the closed catalogue (spec §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u32)]
pub enum KnownMessageType {
    // Component management (0x0001-0x000F)
    RegisterComponent = 0x0001,
    ComponentCreated = 0x0002,
    DeregisterComponent = 0x0003,
    ComponentDeleted = 0x0004,
    QueryComponent = 0x0005,

    // Input-context lifecycle (0x0020-0x002F)
    CreateInputContext = 0x0020,
    InputContextCreated = 0x0021,
    DeleteInputContext = 0x0022,
    InputContextDeleted = 0x0023,
    AttachToInputContext = 0x0024,
    DetachFromInputContext = 0x0025,
    DetachedFromInputContext = 0x0026,
    QueryInputContext = 0x0027,
    FocusInputContext = 0x0028,
    InputContextGotFocus = 0x0029,
    BlurInputContext = 0x002A,
    InputContextLostFocus = 0x002B,
    ComponentAttached = 0x002C,
    ComponentDetached = 0x002D,

    // Active consumer (0x0040-0x004F)
    ActivateComponent = 0x0040,
    AssignActiveConsumer = 0x0041,
    ResignActiveConsumer = 0x0042,
    QueryActiveConsumer = 0x0043,
    ComponentActivated = 0x0044,
    ComponentDeactivated = 0x0045,
    RequestConsumer = 0x0046,
    ActiveConsumerChanged = 0x0047,

    // Key events (0x0060-0x006F)
    SendKeyEvent = 0x0060,
    ProcessKeyEvent = 0x0061,
    SynthesizeKeyEvent = 0x0062,

    // Composition / text (0x0080-0x00AF)
    SetComposition = 0x0080,
    CancelComposition = 0x0081,
    CompleteComposition = 0x0082,
    CompositionChanged = 0x0083,
    QueryComposition = 0x0084,
    InsertText = 0x00A0,

    // Candidate list (0x00C0-0x00CF)
    SetCandidateList = 0x00C0,
    CandidateListChanged = 0x00C1,
    SetSelectedCandidate = 0x00C2,
    SelectedCandidateChanged = 0x00C3,
    SetCandidateListVisibility = 0x00C4,
    CandidateListVisibilityChanged = 0x00C5,
    CandidateListShown = 0x00C6,
    CandidateListHidden = 0x00C7,
    CandidateListPageDown = 0x00C8,
    CandidateListPageUp = 0x00C9,
    CandidateListScrollTo = 0x00CA,
    CandidateListPageResize = 0x00CB,
    SelectCandidate = 0x00CC,
    DoCandidateCommand = 0x00CD,
    QueryCandidateList = 0x00CE,

    // Input caret (0x00E0-0x00EF)
    UpdateInputCaret = 0x00E0,
    QueryInputCaret = 0x00E1,

    // Command list (0x0120-0x012F)
    SetCommandList = 0x0120,
    UpdateCommands = 0x0121,
    QueryCommandList = 0x0122,
    CommandListChanged = 0x0123,
    DoCommand = 0x0124,

    // Hotkeys (0x0140-0x014F)
    AddHotkeyList = 0x0140,
    RemoveHotkeyList = 0x0141,
    CheckHotkeyConflict = 0x0142,
    ActivateHotkeyList = 0x0143,
    DeactivateHotkeyList = 0x0144,
    QueryActiveHotkeyList = 0x0145,
    ActiveHotkeyListUpdated = 0x0146,

    // Input method switch (0x0160-0x016F)
    ListInputMethods = 0x0160,
    SwitchToInputMethod = 0x0161,
    SwitchToNextInputMethodInList = 0x0162,
    SwitchToPreviousInputMethod = 0x0163,
    InputMethodActivated = 0x0164,
    QueryActiveInputMethod = 0x0165,

    // Settings (0x0180-0x018F)
    SettingsSetValues = 0x0180,
    SettingsGetValues = 0x0181,
    SettingsSetArrayValue = 0x0182,
    SettingsGetArrayValue = 0x0183,
    SettingsAddChangeObserver = 0x0184,
    SettingsRemoveChangeObserver = 0x0185,
    SettingsChanged = 0x0186,

    // UI visibility (0x0200-0x020F)
    ShowCompositionUi = 0x0200,
    HideCompositionUi = 0x0201,
    ShowCandidateListUi = 0x0202,
    HideCandidateListUi = 0x0203,
    ShowToolbarUi = 0x0204,
    HideToolbarUi = 0x0205,
    ConversionModeChanged = 0x0206,
    EnableFakeInlineComposition = 0x0207,

    // Misc (0x0220-0x0241)
    SetTimer = 0x0220,
    KillTimer = 0x0221,
    NotifyTimer = 0x0222,
    Beep = 0x0240,
    HubServerQuit = 0x0241,

    // Plug-in manager (0x0260-0x026F)
    PluginQueryComponents = 0x0260,
    PluginStartComponents = 0x0261,
    PluginStopComponents = 0x0262,
    PluginUnload = 0x0263,
    PluginInstalled = 0x0264,
    PluginChanged = 0x0265,

    // Application UI (0x0280-0x0303)
    ShowMenu = 0x0280,
    ShowMessageBox = 0x0281,
    SetKeyboardLayout = 0x0300,
    ChangeKeyboardState = 0x0301,
    VirtualKeyboardStateChanged = 0x0302,
    EndOfPredefinedMessage = 0x0303,

    // Internal-only, never valid on the wire from an external component.
    // Allocated inside the reserved range; used between HubHost and its
    // Connectors to serialize attach/detach as ordinary queue entries.
    AttachHubHost = SYSTEM_RESERVED_START,
    DetachHubHost = 0x8001,
}

impl KnownMessageType {
    fn from_id(id: u32) -> Option<Self> {
        use KnownMessageType::*;
        Some(match id {
            0x0001 => RegisterComponent,
            0x0002 => ComponentCreated,
            0x0003 => DeregisterComponent,
            0x0004 => ComponentDeleted,
            0x0005 => QueryComponent,
            0x0020 => CreateInputContext,
            0x0021 => InputContextCreated,
            0x0022 => DeleteInputContext,
            0x0023 => InputContextDeleted,
            0x0024 => AttachToInputContext,
            0x0025 => DetachFromInputContext,
            0x0026 => DetachedFromInputContext,
            0x0027 => QueryInputContext,
            0x0028 => FocusInputContext,
            0x0029 => InputContextGotFocus,
            0x002A => BlurInputContext,
            0x002B => InputContextLostFocus,
            0x002C => ComponentAttached,
            0x002D => ComponentDetached,
            0x0040 => ActivateComponent,
            0x0041 => AssignActiveConsumer,
            0x0042 => ResignActiveConsumer,
            0x0043 => QueryActiveConsumer,
            0x0044 => ComponentActivated,
            0x0045 => ComponentDeactivated,
            0x0046 => RequestConsumer,
            0x0047 => ActiveConsumerChanged,
            0x0060 => SendKeyEvent,
            0x0061 => ProcessKeyEvent,
            0x0062 => SynthesizeKeyEvent,
            0x0080 => SetComposition,
            0x0081 => CancelComposition,
            0x0082 => CompleteComposition,
            0x0083 => CompositionChanged,
            0x0084 => QueryComposition,
            0x00A0 => InsertText,
            0x00C0 => SetCandidateList,
            0x00C1 => CandidateListChanged,
            0x00C2 => SetSelectedCandidate,
            0x00C3 => SelectedCandidateChanged,
            0x00C4 => SetCandidateListVisibility,
            0x00C5 => CandidateListVisibilityChanged,
            0x00C6 => CandidateListShown,
            0x00C7 => CandidateListHidden,
            0x00C8 => CandidateListPageDown,
            0x00C9 => CandidateListPageUp,
            0x00CA => CandidateListScrollTo,
            0x00CB => CandidateListPageResize,
            0x00CC => SelectCandidate,
            0x00CD => DoCandidateCommand,
            0x00CE => QueryCandidateList,
            0x00E0 => UpdateInputCaret,
            0x00E1 => QueryInputCaret,
            0x0120 => SetCommandList,
            0x0121 => UpdateCommands,
            0x0122 => QueryCommandList,
            0x0123 => CommandListChanged,
            0x0124 => DoCommand,
            0x0140 => AddHotkeyList,
            0x0141 => RemoveHotkeyList,
            0x0142 => CheckHotkeyConflict,
            0x0143 => ActivateHotkeyList,
            0x0144 => DeactivateHotkeyList,
            0x0145 => QueryActiveHotkeyList,
            0x0146 => ActiveHotkeyListUpdated,
            0x0160 => ListInputMethods,
            0x0161 => SwitchToInputMethod,
            0x0162 => SwitchToNextInputMethodInList,
            0x0163 => SwitchToPreviousInputMethod,
            0x0164 => InputMethodActivated,
            0x0165 => QueryActiveInputMethod,
            0x0180 => SettingsSetValues,
            0x0181 => SettingsGetValues,
            0x0182 => SettingsSetArrayValue,
            0x0183 => SettingsGetArrayValue,
            0x0184 => SettingsAddChangeObserver,
            0x0185 => SettingsRemoveChangeObserver,
            0x0186 => SettingsChanged,
            0x0200 => ShowCompositionUi,
            0x0201 => HideCompositionUi,
            0x0202 => ShowCandidateListUi,
            0x0203 => HideCandidateListUi,
            0x0204 => ShowToolbarUi,
            0x0205 => HideToolbarUi,
            0x0206 => ConversionModeChanged,
            0x0207 => EnableFakeInlineComposition,
            0x0220 => SetTimer,
            0x0221 => KillTimer,
            0x0222 => NotifyTimer,
            0x0240 => Beep,
            0x0241 => HubServerQuit,
            0x0260 => PluginQueryComponents,
            0x0261 => PluginStartComponents,
            0x0262 => PluginStopComponents,
            0x0263 => PluginUnload,
            0x0264 => PluginInstalled,
            0x0265 => PluginChanged,
            0x0280 => ShowMenu,
            0x0281 => ShowMessageBox,
            0x0300 => SetKeyboardLayout,
            0x0301 => ChangeKeyboardState,
            0x0302 => VirtualKeyboardStateChanged,
            0x0303 => EndOfPredefinedMessage,
            0x8000 => AttachHubHost,
            0x8001 => DetachHubHost,
            _ => return None,
        })
    }
}

/// Message types Hub broadcasts to every attached consumer when there is no
/// active consumer assigned, rather than replying with `ComponentNotFound`.
pub const BROADCAST_FALLBACK_TYPES: &[KnownMessageType] = &[
    KnownMessageType::CompositionChanged,
    KnownMessageType::CandidateListChanged,
    KnownMessageType::CommandListChanged,
];

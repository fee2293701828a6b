//! Remote channels and inbound bus events
//!
//! The wireless transport exposes one addressable endpoint per effect plus
//! three control endpoints. Writes arrive as [`BusEvent`]s through an
//! [`EventChannel`] and are drained by the frame loop during its poll step.

use core::fmt::Write as _;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use heapless::{String, Vec};

use crate::config::{MAX_EFFECTS, MAX_SETTINGS_SIZE};

/// Length of a rendered channel UUID
pub const UUID_LEN: usize = 36;

/// Service advertised while the selected effect does not accept audio
pub const SERVICE_UUID: &str = "e8942ca1-eef7-4a95-afeb-e3d07e8af52e";
/// Service advertised while a visualizer effect is selected
pub const SERVICE_UUID_AUDIO: &str = "e8942ca1-eef7-4a95-afeb-e3d07e8af52d";

const EFFECT_UUID_PREFIX: &str = "e8942ca1-d9e7-4c45-b96c-10cf850bfa";
const EFFECT_SELECT_UUID: &str = "e8942ca1-d9e7-4c45-b96c-10cf850bfb00";
const AUDIO_ACTIVITY_UUID: &str = "e8942ca1-d9e7-4c45-b96c-20cf850bfa00";
const FUNCTION_CALL_UUID: &str = "e8942ca1-d9e7-4c45-b96c-20cf850bfa01";

/// Largest payload accepted from the transport
pub const MAX_PAYLOAD: usize = MAX_SETTINGS_SIZE;

/// Inbound event queue capacity
const EVENT_CHANNEL_SIZE: usize = 8;

/// Addressable endpoint on the transport bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    /// Settings of the effect at the given registry index
    Effect(u8),
    /// Effect selection (write: index byte, read: device state record)
    EffectSelect,
    /// Audio band bitmask, write only
    AudioActivity,
    /// Function call header plus arguments
    FunctionCall,
}

impl ChannelId {
    /// Characteristic UUID of the channel
    pub fn uuid(self) -> String<UUID_LEN> {
        let mut uuid = String::new();
        // every rendered UUID is exactly UUID_LEN characters long
        let _ = match self {
            Self::Effect(index) => write!(uuid, "{}{:02}", EFFECT_UUID_PREFIX, index),
            Self::EffectSelect => uuid.write_str(EFFECT_SELECT_UUID),
            Self::AudioActivity => uuid.write_str(AUDIO_ACTIVITY_UUID),
            Self::FunctionCall => uuid.write_str(FUNCTION_CALL_UUID),
        };
        uuid
    }

    /// Resolve a characteristic UUID, ignoring ASCII case
    pub fn from_uuid(uuid: &str) -> Option<Self> {
        if uuid.eq_ignore_ascii_case(EFFECT_SELECT_UUID) {
            return Some(Self::EffectSelect);
        }
        if uuid.eq_ignore_ascii_case(AUDIO_ACTIVITY_UUID) {
            return Some(Self::AudioActivity);
        }
        if uuid.eq_ignore_ascii_case(FUNCTION_CALL_UUID) {
            return Some(Self::FunctionCall);
        }

        if uuid.len() != UUID_LEN {
            return None;
        }
        let (prefix, index) = uuid.split_at_checked(EFFECT_UUID_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(EFFECT_UUID_PREFIX)
            || !index.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let index: u8 = index.parse().ok()?;
        (usize::from(index) < MAX_EFFECTS).then_some(Self::Effect(index))
    }
}

/// Raw payload of a channel write
pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// Event delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A peer connected
    Connected,
    /// The peer disconnected
    Disconnected,
    /// A peer wrote to a channel
    Write { channel: ChannelId, payload: Payload },
}

impl BusEvent {
    /// Build a write event. Returns `None` when the payload exceeds [`MAX_PAYLOAD`].
    pub fn write(channel: ChannelId, payload: &[u8]) -> Option<Self> {
        Some(Self::Write {
            channel,
            payload: Vec::from_slice(payload).ok()?,
        })
    }
}

/// Type alias for the inbound event channel
pub type EventChannel = Channel<CriticalSectionRawMutex, BusEvent, EVENT_CHANNEL_SIZE>;

/// Type alias for the transport side of the event channel
pub type EventSender<'a> = Sender<'a, CriticalSectionRawMutex, BusEvent, EVENT_CHANNEL_SIZE>;

/// Type alias for the engine side of the event channel
pub type EventReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, BusEvent, EVENT_CHANNEL_SIZE>;

//! Outbound side of the wireless transport

use crate::channel::ChannelId;
use crate::effect::EffectName;

/// Operations the engine performs on the transport and device identity.
///
/// Implementations must not block; they are called from the frame loop.
pub trait Peripheral {
    /// Advertise the audio-capable or the regular service variant
    fn set_accepts_audio(&mut self, accepts: bool);

    /// Change the advertised local name
    fn set_local_name(&mut self, name: &str);

    /// Update the readable value of a channel
    fn publish(&mut self, channel: ChannelId, value: &[u8]);

    /// The selected effect changed. `previous` is `None` on boot.
    fn effect_changed(&mut self, _current: EffectName, _previous: Option<EffectName>) {}
}

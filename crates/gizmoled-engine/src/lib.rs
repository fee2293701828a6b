#![no_std]

//! GizmoLED effect engine
//!
//! Architecture layers:
//! - `registry` - effect table built once at boot, with live and default settings
//! - `schema` - typed parameter layout of the settings blobs
//! - `effect` - effect identities, [`EffectBehavior`] and the built-in effects
//! - `protocol` - validation and application of remote writes
//! - `animation` - per-frame state machine (transition, visualizer fallback)
//! - `storage` / `persistence` - debounced fixed-layout storage of the state
//! - `scheduler` - the control loop composing all of the above
//!
//! The engine is generic over the LED driver, the storage backend, the
//! transport and the effect behaviors, so it runs unchanged on the device
//! and on the host.

pub mod animation;
pub mod channel;
pub mod config;
pub mod driver;
pub mod effect;
pub mod engine;
pub mod peripheral;
pub mod persistence;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod schema;
pub mod state;
pub mod storage;

// Driver exports
pub use driver::LedDriver;

// Effect exports
pub use effect::{
    BuiltinEffect, ConnectionAnimation, ConnectionPulse, EffectBehavior, EffectKind, EffectName,
    Frame, builtin_declarations,
};

// Engine exports
pub use animation::AnimationPhase;
pub use config::EngineConfig;
pub use engine::{BootSource, EngineState};
pub use registry::{EffectDeclaration, EffectDescriptor, EffectRegistry, RegistryError};
pub use scheduler::FrameScheduler;

// Transport exports
pub use channel::{BusEvent, ChannelId, EventChannel, EventReceiver, EventSender};
pub use peripheral::Peripheral;
pub use protocol::FunctionCall;

// Storage exports
pub use persistence::{Persistence, PersistenceError, STORAGE_REGION_SIZE};
pub use storage::{EepromStorage, NorFlashStorage, StorageDriver, StorageError};

pub use schema::{ParamField, SettingsView, VarName, VarType};

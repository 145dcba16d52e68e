//! # FlixFluent Media
//!
//! Media backends for the FlixFluent player. A [`MediaBackend`] gives the
//! player one control surface over two very different kinds of playback: a
//! native media element that pushes notifications, and an embed widget that
//! has to be polled. Host bindings plug in through [`NativeHost`] and
//! [`EmbedHost`]; [`simulated`] provides in-process hosts.

#![warn(clippy::all)]

pub mod backend;
pub mod embedded;
pub mod error;
pub mod native;
pub mod simulated;
pub mod tracks;

// Re-export main types
pub use backend::{BackendEvent, BackendEventStream, BackendKind, MediaBackend};
pub use embedded::{
    ContainerHandle, EmbedCallbacks, EmbedErrorCode, EmbedHost, EmbedOptions, EmbedPlayer,
    EmbedPlayerState, EmbeddedBackend,
};
pub use error::{ErrorCategory, IntoMediaError, MediaError, MediaResult};
pub use native::{MediaElement, NativeBackend, NativeEventSink, NativeHost};
pub use simulated::{
    SimulatedEmbedHost, SimulatedEmbedPlayer, SimulatedMediaElement, SimulatedNativeHost,
    SimulatedOp,
};
pub use tracks::{TextTrack, TextTrackKind, TextTrackMode};

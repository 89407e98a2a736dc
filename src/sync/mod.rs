/// Remote synchronization
///
/// Local state is pushed to the remote profile store as one full envelope.
/// Pushes are debounced, gated on hydration and authentication, and backed
/// by a periodic heartbeat.

pub mod deferred;
pub mod envelope;
pub mod orchestrator;
pub mod remote;

pub use deferred::DeferredTask;
pub use envelope::{apply_profile, RemoteProfile, SyncEnvelope};
pub use orchestrator::{EnvelopeSource, SyncMode, SyncOrchestrator, SyncStatus, SyncTrigger};
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore};

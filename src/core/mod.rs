pub mod display;
pub mod engine;
pub mod queue;
mod session;

pub use display::{DisplayBuffer, MAXSIZE};
pub use engine::{CaptureEngine, EngineState, StopOutcome};
pub use queue::{CaptureEvent, DeliveryQueue, PacketSender};
pub use session::CaptureSession;

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod packet;

pub use crate::capture::{list_interfaces, validate, InterfaceInfo};
pub use crate::config::CaptureConfig;
pub use crate::core::{
    CaptureEngine, CaptureEvent, CaptureSession, DeliveryQueue, DisplayBuffer, EngineState, StopOutcome,
};
pub use crate::error::{CaptureTerminated, FilterError, StartError};
pub use crate::packet::{decompose, main_protocol, CapturedPacket, Layer, LayerKind, PacketSummary};

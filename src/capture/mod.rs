pub mod filter;
mod source;

pub use filter::{compile, validate, validate_for, CompiledFilter};
pub use source::{PacketSource, PcapSource, RawFrame};

use pcap::Device;

/// A capture-capable interface as reported by libpcap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub description: Option<String>,
    pub loopback: bool,
}

impl From<Device> for InterfaceInfo {
    fn from(device: Device) -> Self {
        Self {
            loopback: device.flags.is_loopback(),
            name: device.name,
            description: device.desc,
        }
    }
}

/// Lists available capture devices.
pub fn list_interfaces() -> Result<Vec<InterfaceInfo>, pcap::Error> {
    Ok(Device::list()?.into_iter().map(InterfaceInfo::from).collect())
}

/// The interface libpcap would pick when none is given.
pub fn default_interface() -> Result<Option<String>, pcap::Error> {
    Ok(Device::lookup()?.map(|device| device.name))
}

use sniffle::InterfaceInfo;

pub fn print_device_list(devices: &[InterfaceInfo]) {
    if devices.is_empty() {
        println!("No capture interfaces found (missing permissions?)");
        return;
    }

    println!("Available interfaces:");
    for (i, dev) in devices.iter().enumerate() {
        println!("  [{}] {}", i, device_label(dev));
    }
}

/// `name (description) [loopback]`, as shown in lists and menus.
pub fn device_label(device: &InterfaceInfo) -> String {
    let mut label = device.name.clone();
    if let Some(desc) = device.description.as_deref().filter(|d| !d.is_empty()) {
        label.push_str(&format!(" ({})", desc));
    }
    if device.loopback {
        label.push_str(" [loopback]");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_label() {
        let device = InterfaceInfo {
            name: "lo".into(),
            description: None,
            loopback: true,
        };
        assert_eq!(device_label(&device), "lo [loopback]");

        let device = InterfaceInfo {
            name: "eth0".into(),
            description: Some("Onboard NIC".into()),
            loopback: false,
        };
        assert_eq!(device_label(&device), "eth0 (Onboard NIC)");
    }
}

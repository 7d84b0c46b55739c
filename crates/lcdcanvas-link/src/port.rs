//! Opening the byte stream to the display.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

use crate::config::BaudRate;

/// Opens a port by name
pub trait PortOpener {
    type Port: Read + Write;

    fn open(
        &mut self,
        name: &str,
        baud: BaudRate,
        read_timeout: Duration,
    ) -> io::Result<Self::Port>;
}

/// Real serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    type Port = Box<dyn SerialPort>;

    fn open(
        &mut self,
        name: &str,
        baud: BaudRate,
        read_timeout: Duration,
    ) -> io::Result<Self::Port> {
        let port = serialport::new(name, baud.as_u32()).timeout(read_timeout).open()?;
        Ok(port)
    }
}

/// A serial port found on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub description: String,
}

/// Serial ports currently present
pub fn list_ports() -> io::Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| PortInfo {
            description: describe(&port.port_type),
            name: port.port_name,
        })
        .collect())
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => match (&usb.manufacturer, &usb.product) {
            (Some(manufacturer), Some(product)) => format!("USB {manufacturer} {product}"),
            (None, Some(product)) => format!("USB {product}"),
            _ => format!("USB {:04x}:{:04x}", usb.vid, usb.pid),
        },
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::Unknown => String::new(),
    }
}

// IoT gateway proxy: encrypted readings and challenge-response toggles
pub mod crypto;
pub mod gateway;

pub use crypto::{decrypt_envelope, seal_envelope, CryptoError, Envelope, PayloadKey, IV_LEN, TAG_LEN};
pub use gateway::{challenge_response, GatewayClient, GatewayError, Step};

/// Devices the gateway can switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Auto,
    Belt,
    Fan,
    Bulb,
    Feeder,
    Water,
}

impl Device {
    pub const ALL: [Device; 6] = [
        Device::Auto,
        Device::Belt,
        Device::Fan,
        Device::Bulb,
        Device::Feeder,
        Device::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Device::Auto => "auto",
            Device::Belt => "belt",
            Device::Fan => "fan",
            Device::Bulb => "bulb",
            Device::Feeder => "feeder",
            Device::Water => "water",
        }
    }

    /// Gateway path, also echoed back to the client as `device`
    pub fn endpoint(self) -> &'static str {
        match self {
            Device::Auto => "/toggle-auto",
            Device::Belt => "/toggle-belt",
            Device::Fan => "/toggle-fan",
            Device::Bulb => "/toggle-bulb",
            Device::Feeder => "/toggle-feeder",
            Device::Water => "/toggle-water",
        }
    }

    pub fn api_path(self) -> String {
        format!("/api{}", self.endpoint())
    }
}

/// Read-only sensor endpoints on the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reading {
    InitialState,
    CurrentData,
    HistoricalData,
}

impl Reading {
    pub const ALL: [Reading; 3] = [
        Reading::InitialState,
        Reading::CurrentData,
        Reading::HistoricalData,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Reading::InitialState => "/get-initial-state",
            Reading::CurrentData => "/get-current-data",
            Reading::HistoricalData => "/get-historical-data",
        }
    }

    pub fn api_path(self) -> String {
        format!("/api{}", self.endpoint())
    }
}

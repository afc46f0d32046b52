// WardCam: Wi-Fi Station Link
//
// Non-blocking wrapper over `EspWifi`: `begin_connect` only starts
// association, the connectivity guard polls `is_connected` with its own
// timeout.

use anyhow::anyhow;
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use esp_idf_sys::esp;

use crate::config::*;
use crate::platform::NetworkLink;

pub struct WifiLink {
    wifi: EspWifi<'static>,
    started: bool,
}

impl WifiLink {
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        let mut wifi = EspWifi::new(modem, sys_loop, Some(nvs))?;

        let auth_method = if WIFI_PASSWORD.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: WIFI_SSID
                .try_into()
                .map_err(|_| anyhow!("wifi ssid too long"))?,
            password: WIFI_PASSWORD
                .try_into()
                .map_err(|_| anyhow!("wifi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;

        Ok(Self {
            wifi,
            started: false,
        })
    }
}

impl NetworkLink for WifiLink {
    fn is_connected(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    fn begin_connect(&mut self) -> anyhow::Result<()> {
        if !self.started {
            self.wifi.start()?;
            // Modem sleep adds hundreds of ms to every capture request.
            esp!(unsafe { esp_idf_sys::esp_wifi_set_ps(esp_idf_sys::wifi_ps_type_t_WIFI_PS_NONE) })?;
            self.started = true;
            log::info!("WiFi started, connecting to `{}`", WIFI_SSID);
        }
        self.wifi.connect()?;
        Ok(())
    }
}

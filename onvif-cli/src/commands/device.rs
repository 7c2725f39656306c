use anyhow::Result;
use onvif_api::operations::GetDeviceInformationOperation;
use onvif_api::{OnvifClient, Service};

use crate::output::{field, Printer};

pub async fn info(client: &OnvifClient, printer: &Printer) -> Result<()> {
    let info = client.execute::<GetDeviceInformationOperation>(&()).await?;
    printer.emit(&info, || {
        vec![
            field("Manufacturer:", &info.manufacturer),
            field("Model:", &info.model),
            field("Firmware:", &info.firmware_version),
            field("Serial number:", &info.serial_number),
            field("Hardware id:", &info.hardware_id),
        ]
    })
}

pub async fn endpoints(client: &OnvifClient, printer: &Printer) -> Result<()> {
    client.resolve(Service::Device).await?;
    let endpoints = client.directory().known_endpoints();

    printer.emit(&endpoints, || {
        endpoints
            .iter()
            .map(|e| {
                let origin = if e.is_default { " (default path)" } else { "" };
                field(&format!("{}:", e.service), format!("{}{}", e.url, origin))
            })
            .collect()
    })
}

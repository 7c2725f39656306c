use std::time::Duration;

use anyhow::Result;
use onvif_api::operations::ptz::{
    ContinuousMoveRequest, GotoPresetRequest, ProfileRequest, StopRequest,
};
use onvif_api::operations::{
    ContinuousMoveOperation, GetPresetsOperation, GetStatusOperation, GotoHomePositionOperation,
    GotoPresetOperation, StopOperation,
};
use onvif_api::OnvifClient;

use crate::output::{field, or_dash, Printer};

pub async fn presets(client: &OnvifClient, printer: &Printer, profile: String) -> Result<()> {
    let response = client
        .execute::<GetPresetsOperation>(&ProfileRequest::new(profile))
        .await?;

    printer.emit(&response.presets, || {
        if response.presets.is_empty() {
            return vec!["no presets".to_string()];
        }
        response
            .presets
            .iter()
            .map(|p| format!("{:<8} {}", p.token, p.name))
            .collect()
    })
}

pub async fn goto(
    client: &OnvifClient,
    printer: &Printer,
    profile: String,
    preset: String,
) -> Result<()> {
    let request = GotoPresetRequest {
        profile_token: profile,
        preset_token: preset,
    };
    let ack = client.execute::<GotoPresetOperation>(&request).await?;
    printer.emit(&ack, || vec![format!("moving to preset {}", request.preset_token)])
}

pub async fn continuous_move(
    client: &OnvifClient,
    printer: &Printer,
    profile: String,
    (pan, tilt, zoom): (f32, f32, f32),
    duration_secs: Option<u64>,
) -> Result<()> {
    let request = ContinuousMoveRequest {
        profile_token: profile,
        pan,
        tilt,
        zoom,
        timeout: duration_secs.map(Duration::from_secs),
    };
    request.validate()?;

    let ack = client.execute::<ContinuousMoveOperation>(&request).await?;
    printer.emit(&ack, || {
        vec![format!("moving pan={pan} tilt={tilt} zoom={zoom}")]
    })
}

pub async fn stop(client: &OnvifClient, printer: &Printer, profile: String) -> Result<()> {
    let ack = client
        .execute::<StopOperation>(&StopRequest::all(profile))
        .await?;
    printer.emit(&ack, || vec!["stopped".to_string()])
}

pub async fn home(client: &OnvifClient, printer: &Printer, profile: String) -> Result<()> {
    let ack = client
        .execute::<GotoHomePositionOperation>(&ProfileRequest::new(profile))
        .await?;
    printer.emit(&ack, || vec!["moving to home position".to_string()])
}

pub async fn status(client: &OnvifClient, printer: &Printer, profile: String) -> Result<()> {
    let status = client
        .execute::<GetStatusOperation>(&ProfileRequest::new(profile))
        .await?;

    printer.emit(&status, || {
        vec![
            field("Pan:", or_dash(status.pan)),
            field("Tilt:", or_dash(status.tilt)),
            field("Zoom:", or_dash(status.zoom)),
            field("Pan/tilt moving:", or_dash(status.pan_tilt_moving.as_ref())),
            field("Zoom moving:", or_dash(status.zoom_moving.as_ref())),
        ]
    })
}

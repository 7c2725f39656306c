//! PTZ operations

use std::time::Duration;

use serde::Serialize;
use soap_client::{escape, find_all, find_descendant, find_text, Element};

use crate::error::{ApiError, Result};
use crate::operation::{iso_seconds, Acknowledged, OnvifOperation};
use crate::service::Service;

/// Request naming only a media profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub profile_token: String,
}

impl ProfileRequest {
    pub fn new(profile_token: impl Into<String>) -> Self {
        Self {
            profile_token: profile_token.into(),
        }
    }
}

fn profile_payload(profile_token: &str) -> String {
    format!("<ProfileToken>{}</ProfileToken>", escape(profile_token))
}

/// GetPresets operation
pub struct GetPresetsOperation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub token: String,
    pub name: String,
}

/// Response for GetPresets operation
#[derive(Debug, Clone, Serialize)]
pub struct GetPresetsResponse {
    pub presets: Vec<Preset>,
}

impl OnvifOperation for GetPresetsOperation {
    type Request = ProfileRequest;
    type Response = GetPresetsResponse;

    const SERVICE: Service = Service::Ptz;
    const ACTION: &'static str = "GetPresets";

    fn build_payload(request: &Self::Request) -> String {
        profile_payload(&request.profile_token)
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let presets = find_all(xml, "Preset")
            .into_iter()
            .filter_map(|preset| {
                Some(Preset {
                    token: preset.attributes.get("token")?.clone(),
                    name: find_text(preset, "Name").unwrap_or_default(),
                })
            })
            .collect();
        Ok(GetPresetsResponse { presets })
    }
}

/// GotoPreset operation
///
/// Eligible for preset recovery in the dispatcher.
pub struct GotoPresetOperation;

/// Request for GotoPreset operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoPresetRequest {
    pub profile_token: String,
    pub preset_token: String,
}

impl OnvifOperation for GotoPresetOperation {
    type Request = GotoPresetRequest;
    type Response = Acknowledged;

    const SERVICE: Service = Service::Ptz;
    const ACTION: &'static str = "GotoPreset";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "{}<PresetToken>{}</PresetToken>",
            profile_payload(&request.profile_token),
            escape(&request.preset_token)
        )
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(Acknowledged)
    }

    fn empty_response() -> Option<Self::Response> {
        Some(Acknowledged)
    }
}

/// ContinuousMove operation
pub struct ContinuousMoveOperation;

/// Request for ContinuousMove operation
///
/// Velocities are in the generic space, -1.0 to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousMoveRequest {
    pub profile_token: String,
    pub pan: f32,
    pub tilt: f32,
    pub zoom: f32,
    /// Device stops on its own after this long
    pub timeout: Option<Duration>,
}

impl ContinuousMoveRequest {
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in [("pan", self.pan), ("tilt", self.tilt), ("zoom", self.zoom)] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ApiError::Configuration(format!(
                    "{} velocity {} is outside -1.0..=1.0",
                    axis, value
                )));
            }
        }
        Ok(())
    }
}

impl OnvifOperation for ContinuousMoveOperation {
    type Request = ContinuousMoveRequest;
    type Response = Acknowledged;

    const SERVICE: Service = Service::Ptz;
    const ACTION: &'static str = "ContinuousMove";

    fn build_payload(request: &Self::Request) -> String {
        let mut payload = format!(
            "{}<Velocity><tt:PanTilt x=\"{}\" y=\"{}\"/><tt:Zoom x=\"{}\"/></Velocity>",
            profile_payload(&request.profile_token),
            request.pan,
            request.tilt,
            request.zoom
        );
        if let Some(timeout) = request.timeout {
            payload.push_str(&format!("<Timeout>{}</Timeout>", iso_seconds(timeout)));
        }
        payload
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(Acknowledged)
    }

    fn empty_response() -> Option<Self::Response> {
        Some(Acknowledged)
    }
}

/// Stop operation
pub struct StopOperation;

/// Request for Stop operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRequest {
    pub profile_token: String,
    pub pan_tilt: bool,
    pub zoom: bool,
}

impl StopRequest {
    /// Stop every axis
    pub fn all(profile_token: impl Into<String>) -> Self {
        Self {
            profile_token: profile_token.into(),
            pan_tilt: true,
            zoom: true,
        }
    }
}

impl OnvifOperation for StopOperation {
    type Request = StopRequest;
    type Response = Acknowledged;

    const SERVICE: Service = Service::Ptz;
    const ACTION: &'static str = "Stop";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "{}<PanTilt>{}</PanTilt><Zoom>{}</Zoom>",
            profile_payload(&request.profile_token),
            request.pan_tilt,
            request.zoom
        )
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(Acknowledged)
    }

    fn empty_response() -> Option<Self::Response> {
        Some(Acknowledged)
    }
}

/// GotoHomePosition operation
pub struct GotoHomePositionOperation;

impl OnvifOperation for GotoHomePositionOperation {
    type Request = ProfileRequest;
    type Response = Acknowledged;

    const SERVICE: Service = Service::Ptz;
    const ACTION: &'static str = "GotoHomePosition";

    fn build_payload(request: &Self::Request) -> String {
        profile_payload(&request.profile_token)
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(Acknowledged)
    }

    fn empty_response() -> Option<Self::Response> {
        Some(Acknowledged)
    }
}

/// GetStatus operation
pub struct GetStatusOperation;

/// Current position and movement state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PtzStatus {
    pub pan: Option<f32>,
    pub tilt: Option<f32>,
    pub zoom: Option<f32>,
    pub pan_tilt_moving: Option<String>,
    pub zoom_moving: Option<String>,
}

impl OnvifOperation for GetStatusOperation {
    type Request = ProfileRequest;
    type Response = PtzStatus;

    const SERVICE: Service = Service::Ptz;
    const ACTION: &'static str = "GetStatus";

    fn build_payload(request: &Self::Request) -> String {
        profile_payload(&request.profile_token)
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let coordinate = |parent: Option<&Element>, axis: &str, attr: &str| {
            parent
                .and_then(|p| p.get_child(axis))
                .and_then(|e| e.attributes.get(attr))
                .and_then(|v| v.parse::<f32>().ok())
        };

        let position = find_descendant(xml, "Position");
        let moving = find_descendant(xml, "MoveStatus");

        Ok(PtzStatus {
            pan: coordinate(position, "PanTilt", "x"),
            tilt: coordinate(position, "PanTilt", "y"),
            zoom: coordinate(position, "Zoom", "x"),
            pan_tilt_moving: moving.and_then(|m| find_text(m, "PanTilt")),
            zoom_moving: moving.and_then(|m| find_text(m, "Zoom")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soap_client::parse_document;

    #[test]
    fn test_goto_preset_payload() {
        let request = GotoPresetOperation::request(&GotoPresetRequest {
            profile_token: "Profile_1".to_string(),
            preset_token: "4".to_string(),
        });
        assert_eq!(
            request.render_body(Service::Ptz),
            "<GotoPreset xmlns=\"http://www.onvif.org/ver20/ptz/wsdl\"><ProfileToken>Profile_1</ProfileToken><PresetToken>4</PresetToken></GotoPreset>"
        );
        assert_eq!(request.find_value("ProfileToken").as_deref(), Some("Profile_1"));
    }

    #[test]
    fn test_continuous_move_payload() {
        let request = ContinuousMoveRequest {
            profile_token: "p".to_string(),
            pan: 0.5,
            tilt: -0.25,
            zoom: 0.0,
            timeout: Some(Duration::from_secs(2)),
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            ContinuousMoveOperation::build_payload(&request),
            "<ProfileToken>p</ProfileToken><Velocity><tt:PanTilt x=\"0.5\" y=\"-0.25\"/><tt:Zoom x=\"0\"/></Velocity><Timeout>PT2S</Timeout>"
        );
    }

    #[test]
    fn test_continuous_move_rejects_out_of_range() {
        let request = ContinuousMoveRequest {
            profile_token: "p".to_string(),
            pan: 1.5,
            tilt: 0.0,
            zoom: 0.0,
            timeout: None,
        };
        assert!(request.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_stop_payload() {
        assert_eq!(
            StopOperation::build_payload(&StopRequest::all("p")),
            "<ProfileToken>p</ProfileToken><PanTilt>true</PanTilt><Zoom>true</Zoom>"
        );
    }

    #[test]
    fn test_parse_presets() {
        let xml = parse_document(
            r#"<tptz:GetPresetsResponse xmlns:tptz="a" xmlns:tt="b">
                <tptz:Preset token="1"><tt:Name>Gate</tt:Name></tptz:Preset>
                <tptz:Preset token="2"><tt:Name>Yard</tt:Name></tptz:Preset>
                <tptz:Preset><tt:Name>broken</tt:Name></tptz:Preset>
              </tptz:GetPresetsResponse>"#,
        )
        .unwrap();
        let response = GetPresetsOperation::parse_response(&xml).unwrap();
        assert_eq!(
            response.presets,
            vec![
                Preset { token: "1".to_string(), name: "Gate".to_string() },
                Preset { token: "2".to_string(), name: "Yard".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_status() {
        let xml = parse_document(
            r#"<GetStatusResponse><PTZStatus>
                <Position><PanTilt x="0.25" y="-0.5"/><Zoom x="0.1"/></Position>
                <MoveStatus><PanTilt>IDLE</PanTilt><Zoom>MOVING</Zoom></MoveStatus>
              </PTZStatus></GetStatusResponse>"#,
        )
        .unwrap();
        let status = GetStatusOperation::parse_response(&xml).unwrap();
        assert_eq!(status.pan, Some(0.25));
        assert_eq!(status.tilt, Some(-0.5));
        assert_eq!(status.zoom, Some(0.1));
        assert_eq!(status.pan_tilt_moving.as_deref(), Some("IDLE"));
        assert_eq!(status.zoom_moving.as_deref(), Some("MOVING"));
    }
}

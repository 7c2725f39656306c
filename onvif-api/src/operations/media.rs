//! Media operations
//!
//! `GetProfiles` targets the logical media service and reads both response
//! versions. `GetStreamUri` differs in request shape between ver10 and
//! ver20, so each version has its own operation.

use serde::Serialize;
use soap_client::{escape, find_all, find_text, Element};

use crate::error::{ApiError, Result};
use crate::operation::OnvifOperation;
use crate::service::Service;

/// GetProfiles operation
pub struct GetProfilesOperation;

/// A media profile as listed by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaProfile {
    pub token: String,
    pub name: String,
    pub encoding: Option<String>,
    pub resolution: Option<(u32, u32)>,
}

/// Response for GetProfiles operation
#[derive(Debug, Clone, Serialize)]
pub struct GetProfilesResponse {
    pub profiles: Vec<MediaProfile>,
}

impl OnvifOperation for GetProfilesOperation {
    type Request = ();
    type Response = GetProfilesResponse;

    const SERVICE: Service = Service::Media;
    const ACTION: &'static str = "GetProfiles";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let profiles = find_all(xml, "Profiles")
            .into_iter()
            .filter_map(|profile| {
                let token = profile.attributes.get("token")?.clone();
                let name = profile
                    .get_child("Name")
                    .and_then(soap_client::text_of)
                    .unwrap_or_default();

                // ver10 nests VideoEncoderConfiguration, ver20 uses Configurations/VideoEncoder
                let encoder = find_all(profile, "VideoEncoderConfiguration")
                    .into_iter()
                    .chain(find_all(profile, "VideoEncoder"))
                    .next();
                let encoding = encoder
                    .and_then(|e| e.attributes.get("Encoding").cloned().or_else(|| find_text(e, "Encoding")));
                let resolution = encoder.and_then(|e| {
                    let width = find_text(e, "Width")?.parse().ok()?;
                    let height = find_text(e, "Height")?.parse().ok()?;
                    Some((width, height))
                });

                Some(MediaProfile {
                    token,
                    name,
                    encoding,
                    resolution,
                })
            })
            .collect();

        Ok(GetProfilesResponse { profiles })
    }
}

/// Request for both GetStreamUri versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetStreamUriRequest {
    pub profile_token: String,
    /// `RTSP`, `RtspOverHttp`, `HTTP`, ...
    pub protocol: String,
}

impl GetStreamUriRequest {
    pub fn rtsp(profile_token: impl Into<String>) -> Self {
        Self {
            profile_token: profile_token.into(),
            protocol: "RTSP".to_string(),
        }
    }
}

/// Response for both GetStreamUri versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamUri {
    pub uri: String,
}

fn parse_stream_uri(xml: &Element) -> Result<StreamUri> {
    find_text(xml, "Uri")
        .map(|uri| StreamUri { uri })
        .ok_or_else(|| ApiError::missing_field("GetStreamUri", "Uri"))
}

/// GetStreamUri for the ver10 media service
pub struct GetStreamUriOperation;

impl OnvifOperation for GetStreamUriOperation {
    type Request = GetStreamUriRequest;
    type Response = StreamUri;

    const SERVICE: Service = Service::Media1;
    const ACTION: &'static str = "GetStreamUri";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<StreamSetup><tt:Stream>RTP-Unicast</tt:Stream><tt:Transport><tt:Protocol>{}</tt:Protocol></tt:Transport></StreamSetup><ProfileToken>{}</ProfileToken>",
            escape(&request.protocol),
            escape(&request.profile_token)
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        parse_stream_uri(xml)
    }
}

/// GetStreamUri for the ver20 media service
pub struct GetStreamUri2Operation;

impl OnvifOperation for GetStreamUri2Operation {
    type Request = GetStreamUriRequest;
    type Response = StreamUri;

    const SERVICE: Service = Service::Media2;
    const ACTION: &'static str = "GetStreamUri";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<Protocol>{}</Protocol><ProfileToken>{}</ProfileToken>",
            escape(&request.protocol),
            escape(&request.profile_token)
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        parse_stream_uri(xml)
    }
}

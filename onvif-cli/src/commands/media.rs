use anyhow::Result;
use onvif_api::operations::media::GetStreamUriRequest;
use onvif_api::operations::GetProfilesOperation;
use onvif_api::OnvifClient;

use crate::output::{field, or_dash, Printer};

pub async fn profiles(client: &OnvifClient, printer: &Printer) -> Result<()> {
    let response = client.execute::<GetProfilesOperation>(&()).await?;

    printer.emit(&response.profiles, || {
        if response.profiles.is_empty() {
            return vec!["no media profiles".to_string()];
        }
        response
            .profiles
            .iter()
            .map(|p| {
                let resolution = p.resolution.map(|(w, h)| format!("{w}x{h}"));
                format!(
                    "{:<20} {:<24} {:<8} {}",
                    p.token,
                    p.name,
                    or_dash(p.encoding.as_ref()),
                    or_dash(resolution)
                )
            })
            .collect()
    })
}

pub async fn stream_uri(
    client: &OnvifClient,
    printer: &Printer,
    profile: String,
    protocol: String,
) -> Result<()> {
    let request = GetStreamUriRequest {
        profile_token: profile,
        protocol,
    };
    let uri = client.stream_uri(&request).await?;
    printer.emit(&uri, || vec![field("Stream URI:", &uri.uri)])
}

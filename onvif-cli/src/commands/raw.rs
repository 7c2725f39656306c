use anyhow::Result;
use onvif_api::{OnvifClient, ServiceRequest};
use serde::Serialize;

use crate::cli::RawArgs;
use crate::output::Printer;

#[derive(Serialize)]
struct RawReply<'a> {
    action: &'a str,
    status: u16,
    fields: &'a [(String, String)],
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<&'a str>,
}

/// Send one request built from the command line and print its fields
pub async fn send(client: &OnvifClient, printer: &Printer, args: RawArgs, verbose: bool) -> Result<()> {
    let service = args.service.into();
    let request = match args.body {
        Some(body) => ServiceRequest::raw(service, args.action, body),
        None => ServiceRequest::payload(service, args.action, args.payload),
    };

    let reply = match args.url {
        Some(url) => client.send_to_url(&url, &request).await?,
        None => client.send(request).await?,
    };

    let shown = RawReply {
        action: &reply.action,
        status: reply.status,
        fields: &reply.fields,
        raw: verbose.then_some(reply.raw.as_str()),
    };
    printer.emit(&shown, || {
        let mut lines: Vec<String> = reply.fields.iter().map(|(k, v)| format!("{k} = {v}")).collect();
        if lines.is_empty() {
            lines.push(format!("{} returned HTTP {}", reply.action, reply.status));
        }
        if verbose {
            lines.push(String::new());
            lines.push(reply.raw.clone());
        }
        lines
    })
}

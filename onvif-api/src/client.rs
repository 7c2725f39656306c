use std::sync::Arc;

use soap_client::{Credentials, SoapClient, Transport};

use crate::config::ClientConfig;
use crate::directory::{Endpoint, EndpointDirectory};
use crate::error::{ApiError, Result};
use crate::exchange::Exchange;
use crate::operation::OnvifOperation;
use crate::operations::media::{
    GetStreamUri2Operation, GetStreamUriOperation, GetStreamUriRequest, StreamUri,
};
use crate::operations::ptz::{GetPresetsOperation, ProfileRequest};
use crate::reply::SoapReply;
use crate::request::ServiceRequest;
use crate::service::Service;

const PRESET_ACTION: &str = "GotoPreset";

/// A client for executing ONVIF requests against one device
///
/// The client resolves each request's service through its
/// [`EndpointDirectory`], signs it with a fresh UsernameToken and applies two
/// bounded recovery behaviours:
///
/// - an optional wakeup chain before PTZ requests (see [`WakeupMode`](crate::WakeupMode))
/// - a single preset refresh and retry when `GotoPreset` reports an unknown token
///
/// Timeouts and transport failures are never retried.
///
/// Clones share the directory, so discovery runs at most once per device.
#[derive(Debug, Clone)]
pub struct OnvifClient {
    exchange: Exchange,
    directory: Arc<EndpointDirectory>,
    config: ClientConfig,
}

impl OnvifClient {
    /// Create a client for `host` using the reqwest transport
    pub fn new(host: &str, credentials: Option<Credentials>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let directory = EndpointDirectory::new(host)?;
        let transport = Arc::new(SoapClient::with_timeout(config.timeout));
        Self::with_transport(directory, transport, credentials, config)
    }

    /// Create a client with a custom directory and transport
    pub fn with_transport(
        directory: EndpointDirectory,
        transport: Arc<dyn Transport>,
        credentials: Option<Credentials>,
        config: ClientConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            exchange: Exchange::new(transport, credentials),
            directory: Arc::new(directory),
            config,
        })
    }

    pub fn directory(&self) -> &EndpointDirectory {
        &self.directory
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a logical service to its endpoint, discovering on first use
    pub async fn resolve(&self, service: Service) -> Result<Endpoint> {
        self.directory.resolve(service, &self.exchange).await
    }

    /// Perform one request against its logical service
    ///
    /// Faults and non-success statuses are returned as [`ApiError::Fault`].
    pub async fn send(&self, request: ServiceRequest) -> Result<SoapReply> {
        let endpoint = self.resolve(request.service).await?;

        if request.service.is_ptz() && self.config.wakeup.is_enabled() {
            self.run_wakeup(&endpoint).await;
        }

        let reply = self.call(&endpoint, &request).await?;

        if self.config.preset_recovery
            && request.action == PRESET_ACTION
            && reply.matches_missing_token()
        {
            return self.recover_preset(&endpoint, &request).await;
        }

        reply.into_result()
    }

    /// Perform one request against a server-issued absolute URL
    ///
    /// Used for subscription managers. Discovery, wakeup and preset recovery
    /// are all bypassed; WS-Addressing headers are added.
    pub async fn send_to_url(&self, url: &str, request: &ServiceRequest) -> Result<SoapReply> {
        let service = request.service.fallback();
        self.exchange
            .call(url, service, request, true)
            .await?
            .into_result()
    }

    /// Execute a typed operation against its service
    pub async fn execute<Op: OnvifOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        let reply = self.send(Op::request(request)).await?;
        read_typed::<Op>(&reply)
    }

    /// Execute a typed operation against an absolute URL
    pub async fn execute_at<Op: OnvifOperation>(
        &self,
        url: &str,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let reply = self.send_to_url(url, &Op::request(request)).await?;
        read_typed::<Op>(&reply)
    }

    /// Stream URI for a profile, using whichever media version the device offers
    pub async fn stream_uri(&self, request: &GetStreamUriRequest) -> Result<StreamUri> {
        let media = self.resolve(Service::Media).await?;
        match media.service {
            Service::Media2 => self.execute::<GetStreamUri2Operation>(request).await,
            _ => self.execute::<GetStreamUriOperation>(request).await,
        }
    }

    async fn call(&self, endpoint: &Endpoint, request: &ServiceRequest) -> Result<SoapReply> {
        self.exchange
            .call(&endpoint.url, endpoint.service, request, false)
            .await
    }

    /// Refresh presets once and retry the original request once
    ///
    /// A failed refresh, whether a fault or a transport error, is logged and
    /// the retry still goes out. Errors from the retry itself are returned.
    async fn recover_preset(&self, endpoint: &Endpoint, request: &ServiceRequest) -> Result<SoapReply> {
        let profile_token = request.find_value("ProfileToken").unwrap_or_default();
        tracing::warn!(
            action = %request.action,
            profile = %profile_token,
            "device reported an unknown preset token, refreshing presets"
        );

        let refresh = GetPresetsOperation::request(&ProfileRequest::new(profile_token));
        if let Err(e) = self
            .call(endpoint, &refresh)
            .await
            .and_then(SoapReply::into_result)
        {
            tracing::warn!(error = %e, "preset refresh failed");
        }

        tokio::time::sleep(self.config.settle_delay).await;

        let retry = self.call(endpoint, request).await?;
        if retry.matches_missing_token() {
            return Err(ApiError::RecoverableToken {
                action: request.action.clone(),
            });
        }
        retry.into_result()
    }

    /// Issue the configured warm-up chain; failures are logged only
    async fn run_wakeup(&self, endpoint: &Endpoint) {
        for step in self.config.wakeup.steps() {
            let request = ServiceRequest::payload(Service::Ptz, *step, "");
            match self.call(endpoint, &request).await.and_then(SoapReply::into_result) {
                Ok(_) => tracing::debug!(step, "wakeup step completed"),
                Err(e) => tracing::warn!(step, error = %e, "wakeup step failed"),
            }
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }
}

/// Typed response from a successful reply
fn read_typed<Op: OnvifOperation>(reply: &SoapReply) -> Result<Op::Response> {
    match (&reply.body, Op::empty_response()) {
        (Some(body), _) => Op::parse_response(body),
        (None, Some(empty)) => {
            tracing::debug!(action = %reply.action, status = reply.status, "reply carried no body, treating as acknowledged");
            Ok(empty)
        }
        (None, None) => reply.require_body().and_then(Op::parse_response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    use crate::operations::ptz::{
        ContinuousMoveOperation, ContinuousMoveRequest, GotoPresetOperation, GotoPresetRequest,
    };
    use crate::operation::Acknowledged;
    use crate::operations::GetDeviceInformationOperation;
    use crate::testing::{fault, ok, status, Scripted, ScriptedTransport};
    use crate::wakeup::WakeupMode;

    const CAPABILITIES: &str = r#"<tds:GetCapabilitiesResponse xmlns:tds="http://www.onvif.org/ver10/device/wsdl" xmlns:tt="http://www.onvif.org/ver10/schema">
        <tds:Capabilities>
          <tt:Device><tt:XAddr>http://cam/onvif/device_service</tt:XAddr></tt:Device>
          <tt:Events><tt:XAddr>http://cam/onvif/Events</tt:XAddr></tt:Events>
          <tt:Media><tt:XAddr>http://cam/onvif/Media</tt:XAddr></tt:Media>
          <tt:PTZ><tt:XAddr>http://cam/onvif/PTZ</tt:XAddr></tt:PTZ>
        </tds:Capabilities>
      </tds:GetCapabilitiesResponse>"#;

    fn services(entries: &[(&str, &str)]) -> String {
        let body: String = entries
            .iter()
            .map(|(ns, xaddr)| {
                format!(
                    "<tds:Service><tds:Namespace>{}</tds:Namespace><tds:XAddr>{}</tds:XAddr></tds:Service>",
                    ns, xaddr
                )
            })
            .collect();
        format!(
            "<tds:GetServicesResponse xmlns:tds=\"http://www.onvif.org/ver10/device/wsdl\">{}</tds:GetServicesResponse>",
            body
        )
    }

    fn client_with(
        transport: &Arc<ScriptedTransport>,
        directory: EndpointDirectory,
        config: ClientConfig,
    ) -> OnvifClient {
        OnvifClient::with_transport(
            directory,
            transport.clone(),
            Some(Credentials::new("admin", "secret")),
            config,
        )
        .unwrap()
    }

    fn discovering(transport: &Arc<ScriptedTransport>) -> OnvifClient {
        client_with(transport, EndpointDirectory::new("cam").unwrap(), ClientConfig::default())
    }

    fn preloaded(transport: &Arc<ScriptedTransport>, config: ClientConfig) -> OnvifClient {
        let directory = EndpointDirectory::with_endpoints(
            "cam",
            [
                (Service::Device, "http://cam/onvif/device_service".to_string()),
                (Service::Media2, "http://cam/onvif/Media2".to_string()),
                (Service::Ptz, "http://cam/onvif/PTZ".to_string()),
                (Service::Events, "http://cam/onvif/Events".to_string()),
            ],
        )
        .unwrap();
        client_with(transport, directory, config)
    }

    fn goto(preset: &str) -> GotoPresetRequest {
        GotoPresetRequest {
            profile_token: "main".to_string(),
            preset_token: preset.to_string(),
        }
    }

    #[tokio::test]
    async fn test_media_prefers_media2_over_media1() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GetCapabilities", fault(400, "ter:ActionNotSupported", "not supported"))
                .on(
                    "GetServices",
                    ok(&services(&[
                        ("http://www.onvif.org/ver10/media/wsdl", "http://cam/onvif/Media"),
                        ("http://www.onvif.org/ver20/media/wsdl", "http://cam/onvif/Media2"),
                    ])),
                ),
        );
        let client = discovering(&transport);

        let endpoint = client.resolve(Service::Media).await.unwrap();
        assert_eq!(endpoint.service, Service::Media2);
        assert_eq!(endpoint.url, "http://cam/onvif/Media2");
        assert!(!endpoint.is_default);
    }

    #[tokio::test]
    async fn test_media_uses_media1_when_media2_absent() {
        let transport = Arc::new(ScriptedTransport::new().on("GetCapabilities", ok(CAPABILITIES)));
        let client = discovering(&transport);

        let endpoint = client.resolve(Service::Media).await.unwrap();
        assert_eq!(endpoint.service, Service::Media1);
        assert_eq!(endpoint.url, "http://cam/onvif/Media");
        // capabilities covered Media, PTZ and Events
        assert_eq!(transport.count("GetServices"), 0);
    }

    #[tokio::test]
    async fn test_media_defaults_when_discovery_reports_none() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GetCapabilities", ok("<tds:GetCapabilitiesResponse/>"))
                .on("GetServices", ok(&services(&[]))),
        );
        let client = discovering(&transport);

        let endpoint = client.resolve(Service::Media).await.unwrap();
        assert_eq!(endpoint.url, "http://cam/onvif/media_service");
        assert!(endpoint.is_default);
        assert_eq!(transport.count("GetServices"), 1);
    }

    #[tokio::test]
    async fn test_ptz_resolves_to_exact_xaddr() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GetCapabilities", ok("<tds:GetCapabilitiesResponse/>"))
                .on(
                    "GetServices",
                    ok(&services(&[("http://www.onvif.org/ver20/ptz/wsdl", "http://h/onvif/PTZ")])),
                ),
        );
        let client = discovering(&transport);

        assert_eq!(client.resolve(Service::Ptz).await.unwrap().url, "http://h/onvif/PTZ");
    }

    #[tokio::test]
    async fn test_discovery_runs_once() {
        let transport = Arc::new(ScriptedTransport::new().on("GetCapabilities", ok(CAPABILITIES)));
        let client = discovering(&transport);

        client.resolve(Service::Ptz).await.unwrap();
        client.resolve(Service::Events).await.unwrap();
        client.clone().resolve(Service::Device).await.unwrap();

        assert_eq!(transport.count("GetCapabilities"), 1);
        assert!(client.directory().is_discovered());
    }

    #[tokio::test]
    async fn test_discovery_fails_when_both_listings_fault() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GetCapabilities", fault(500, "ter:Action", "boom"))
                .on("GetServices", fault(500, "ter:Action", "boom")),
        );
        let client = discovering(&transport);

        let err = client.resolve(Service::Ptz).await.unwrap_err();
        assert!(matches!(err, ApiError::Discovery(_)));
        assert!(!client.directory().is_discovered());

        // a failed discovery is retried on the next resolution
        let _ = client.resolve(Service::Ptz).await;
        assert_eq!(transport.count("GetCapabilities"), 2);
    }

    #[tokio::test]
    async fn test_discovery_transport_errors_propagate() {
        let transport = Arc::new(ScriptedTransport::new().on("GetCapabilities", Scripted::Refused));
        let client = discovering(&transport);

        let err = client.resolve(Service::Media).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { ref action, .. } if action == "GetCapabilities"));
        assert_eq!(transport.count("GetServices"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_recovery_refreshes_once_and_retries_once() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GotoPreset", fault(500, "ter:NoToken", "The requested preset token does not exist"))
                .on("GotoPreset", ok("<tptz:GotoPresetResponse/>"))
                .on("GetPresets", ok("<tptz:GetPresetsResponse/>")),
        );
        let client = preloaded(&transport, ClientConfig::default());

        client.execute::<GotoPresetOperation>(&goto("4")).await.unwrap();

        assert_eq!(transport.actions(), vec!["GotoPreset", "GetPresets", "GotoPreset"]);
        let calls = transport.calls();
        assert!(calls[1].envelope.contains("<ProfileToken>main</ProfileToken>"));
        assert!(calls[2].at - calls[1].at >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_recovery_is_not_repeated() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GotoPreset", fault(500, "ter:NoToken", "No such token"))
                .on("GetPresets", ok("<tptz:GetPresetsResponse/>")),
        );
        let client = preloaded(&transport, ClientConfig::default());

        let err = client.execute::<GotoPresetOperation>(&goto("9")).await.unwrap_err();
        assert!(matches!(err, ApiError::RecoverableToken { ref action } if action == "GotoPreset"));
        assert_eq!(transport.count("GetPresets"), 1);
        assert_eq!(transport.count("GotoPreset"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_refresh_transport_error_still_retries() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GotoPreset", fault(500, "ter:NoToken", "No such token"))
                .on("GotoPreset", ok("<tptz:GotoPresetResponse/>"))
                .on("GetPresets", Scripted::Refused),
        );
        let client = preloaded(&transport, ClientConfig::default());

        client.execute::<GotoPresetOperation>(&goto("4")).await.unwrap();
        assert_eq!(transport.actions(), vec!["GotoPreset", "GetPresets", "GotoPreset"]);
    }

    #[rstest]
    #[case::empty(status(200, ""))]
    #[case::not_xml(status(200, "OK"))]
    #[case::empty_body_element(ok(""))]
    #[tokio::test]
    async fn test_acknowledgement_accepts_reply_without_body(#[case] reply: Scripted) {
        let transport = Arc::new(ScriptedTransport::new().on("GotoPreset", reply));
        let client = preloaded(&transport, ClientConfig::default());

        let ack = client.execute::<GotoPresetOperation>(&goto("1")).await.unwrap();
        assert_eq!(ack, Acknowledged);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_raw_response_logged_at_debug() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let transport = Arc::new(
            ScriptedTransport::new().on("GotoPreset", ok("<tptz:GotoPresetResponse><tptz:Marker>seen</tptz:Marker></tptz:GotoPresetResponse>")),
        );
        let client = preloaded(&transport, ClientConfig::default());
        client.execute::<GotoPresetOperation>(&goto("1")).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("received response"));
        assert!(output.contains("<tptz:Marker>seen</tptz:Marker>"));
    }

    #[tokio::test]
    async fn test_query_without_body_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new().on("GetDeviceInformation", status(200, "")));
        let client = preloaded(&transport, ClientConfig::default());

        let err = client.execute::<GetDeviceInformationOperation>(&()).await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_preset_recovery_can_be_disabled() {
        let transport = Arc::new(
            ScriptedTransport::new().on("GotoPreset", fault(500, "ter:NoToken", "No such token")),
        );
        let client = preloaded(&transport, ClientConfig::default().with_preset_recovery(false));

        let err = client.execute::<GotoPresetOperation>(&goto("9")).await.unwrap_err();
        assert!(err.is_fault());
        assert_eq!(transport.actions(), vec!["GotoPreset"]);
    }

    #[tokio::test]
    async fn test_unknown_token_on_other_actions_is_not_recovered() {
        let transport = Arc::new(
            ScriptedTransport::new().on("GetDeviceInformation", fault(400, "ter:NoToken", "No such token")),
        );
        let client = preloaded(&transport, ClientConfig::default());

        let err = client.execute::<GetDeviceInformationOperation>(&()).await.unwrap_err();
        assert!(err.is_fault());
        assert_eq!(transport.count("GetPresets"), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().on("GotoPreset", Scripted::Timeout));
        let client = preloaded(&transport, ClientConfig::default());

        let err = client.execute::<GotoPresetOperation>(&goto("1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout { ref action, .. } if action == "GotoPreset"));
        assert_eq!(transport.actions(), vec!["GotoPreset"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_wakeup_runs_in_order_before_ptz_action() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on("GetServiceCapabilities", ok("<tptz:GetServiceCapabilitiesResponse/>"))
                .on("GetNodes", fault(500, "ter:Action", "busy"))
                .on("GetConfigurations", ok("<tptz:GetConfigurationsResponse/>"))
                .on("ContinuousMove", ok("<tptz:ContinuousMoveResponse/>")),
        );
        let config = ClientConfig::default()
            .with_wakeup(WakeupMode::Full)
            .with_settle_delay(Duration::from_millis(500));
        let client = preloaded(&transport, config);

        let request = ContinuousMoveRequest {
            profile_token: "main".to_string(),
            pan: 0.5,
            tilt: 0.0,
            zoom: 0.0,
            timeout: None,
        };
        client.execute::<ContinuousMoveOperation>(&request).await.unwrap();

        assert_eq!(
            transport.actions(),
            vec!["GetServiceCapabilities", "GetNodes", "GetConfigurations", "ContinuousMove"]
        );
        let calls = transport.calls();
        for pair in calls.windows(2) {
            assert!(pair[1].at - pair[0].at >= Duration::from_millis(500));
        }
        assert!(calls.iter().all(|c| c.url == "http://cam/onvif/PTZ"));
    }

    #[tokio::test]
    async fn test_wakeup_skipped_for_non_ptz_requests() {
        let transport = Arc::new(
            ScriptedTransport::new().on(
                "GetDeviceInformation",
                ok("<tds:GetDeviceInformationResponse><tds:Manufacturer>Acme</tds:Manufacturer></tds:GetDeviceInformationResponse>"),
            ),
        );
        let client = preloaded(&transport, ClientConfig::default().with_wakeup(WakeupMode::Short));

        let info = client.execute::<GetDeviceInformationOperation>(&()).await.unwrap();
        assert_eq!(info.manufacturer, "Acme");
        assert_eq!(transport.actions(), vec!["GetDeviceInformation"]);
    }

    #[tokio::test]
    async fn test_each_request_carries_fresh_digest_and_action_uri() {
        let transport = Arc::new(ScriptedTransport::new().on("GotoPreset", ok("<tptz:GotoPresetResponse/>")));
        let client = preloaded(&transport, ClientConfig::default());

        client.execute::<GotoPresetOperation>(&goto("1")).await.unwrap();
        client.execute::<GotoPresetOperation>(&goto("2")).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].soap_action, "http://www.onvif.org/ver20/ptz/wsdl/GotoPreset");
        assert!(calls[0].envelope.contains("<wsse:Username>admin</wsse:Username>"));
        assert!(!calls[0].envelope.contains("secret"));

        let nonce = |envelope: &str| {
            let start = envelope.find("<wsse:Nonce").unwrap();
            envelope[start..].split('>').nth(1).unwrap().to_string()
        };
        assert_ne!(nonce(&calls[0].envelope), nonce(&calls[1].envelope));
    }

    #[tokio::test]
    async fn test_anonymous_requests_omit_security_header() {
        let transport = Arc::new(ScriptedTransport::new().on("GetCapabilities", ok(CAPABILITIES)));
        let client = OnvifClient::with_transport(
            EndpointDirectory::new("cam").unwrap(),
            transport.clone(),
            None,
            ClientConfig::default(),
        )
        .unwrap();

        client.resolve(Service::Device).await.unwrap();
        assert!(!transport.calls()[0].envelope.contains("wsse:Security"));
    }

    #[tokio::test]
    async fn test_error_status_becomes_fault() {
        let transport = Arc::new(ScriptedTransport::new().on("GetDeviceInformation", status(401, "")));
        let client = preloaded(&transport, ClientConfig::default());

        let err = client.execute::<GetDeviceInformationOperation>(&()).await.unwrap_err();
        assert_eq!(err.http_status(), Some(401));
    }

    #[tokio::test]
    async fn test_send_to_url_adds_addressing_and_skips_discovery() {
        let transport = Arc::new(ScriptedTransport::new().on("Renew", ok("<wsnt:RenewResponse/>")));
        let client = discovering(&transport);

        let request = ServiceRequest::payload(Service::Events, "Renew", "");
        client
            .send_to_url("http://cam/onvif/Subscription?Idx=3", &request)
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].envelope.contains("<wsa:To s:mustUnderstand=\"1\">http://cam/onvif/Subscription?Idx=3</wsa:To>"));
        assert!(!client.directory().is_discovered());
    }

    #[tokio::test]
    async fn test_stream_uri_follows_media_version() {
        let transport = Arc::new(
            ScriptedTransport::new().on(
                "GetStreamUri",
                ok("<tr2:GetStreamUriResponse><tr2:Uri>rtsp://cam/main</tr2:Uri></tr2:GetStreamUriResponse>"),
            ),
        );
        let client = preloaded(&transport, ClientConfig::default());

        let uri = client
            .stream_uri(&crate::operations::media::GetStreamUriRequest::rtsp("main"))
            .await
            .unwrap();

        assert_eq!(uri.uri, "rtsp://cam/main");
        let call = &transport.calls()[0];
        assert_eq!(call.url, "http://cam/onvif/Media2");
        assert!(call.envelope.contains("<GetStreamUri xmlns=\"http://www.onvif.org/ver20/media/wsdl\"><Protocol>RTSP</Protocol>"));
    }
}

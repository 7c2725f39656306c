//! HTTP-level tests for the reqwest transport against a mock device

use std::time::Duration;

use mockito::{Matcher, Server};
use rstest::rstest;
use soap_client::{read_body, Credentials, Envelope, SoapBody, SoapClient, Transport, UsernameToken};

const ACTION: &str = "http://www.onvif.org/ver10/device/wsdl/GetDeviceInformation";

const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope" xmlns:tds="http://www.onvif.org/ver10/device/wsdl">
  <env:Body>
    <tds:GetDeviceInformationResponse>
      <tds:Manufacturer>Acme</tds:Manufacturer>
    </tds:GetDeviceInformationResponse>
  </env:Body>
</env:Envelope>"#;

#[tokio::test]
async fn test_post_returns_status_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/onvif/device_service")
        .match_header(
            "content-type",
            Matcher::Exact(format!(
                "application/soap+xml; charset=utf-8; action=\"{}\"",
                ACTION
            )),
        )
        .match_body(Matcher::Regex("<GetDeviceInformation".to_string()))
        .with_status(200)
        .with_body(RESPONSE)
        .create_async()
        .await;

    let client = SoapClient::new();
    let url = format!("{}/onvif/device_service", server.url());
    let envelope = Envelope::new(
        r#"<GetDeviceInformation xmlns="http://www.onvif.org/ver10/device/wsdl"/>"#,
    )
    .to_xml()
    .unwrap();

    let reply = client.post(&url, ACTION, envelope).await.unwrap();

    mock.assert_async().await;
    assert!(reply.is_success());
    let SoapBody::Response(el) = read_body(&reply.body).unwrap() else {
        panic!("expected a response body");
    };
    assert_eq!(el.name, "GetDeviceInformationResponse");
}

#[tokio::test]
async fn test_security_header_reaches_the_wire() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/onvif/device_service")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<wsse:Username>admin</wsse:Username>".to_string()),
            Matcher::Regex("#PasswordDigest".to_string()),
        ]))
        .with_status(200)
        .with_body(RESPONSE)
        .create_async()
        .await;

    let token = UsernameToken::generate(&Credentials::new("admin", "pw"), chrono::Utc::now());
    let envelope = Envelope::new("<GetDeviceInformation/>")
        .with_security(Some(&token))
        .to_xml()
        .unwrap();

    let url = format!("{}/onvif/device_service", server.url());
    SoapClient::new().post(&url, ACTION, envelope).await.unwrap();
    mock.assert_async().await;
}

#[rstest]
#[case(400)]
#[case(404)]
#[case(500)]
#[tokio::test]
async fn test_error_status_is_not_a_transport_error(#[case] status: usize) {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/onvif/ptz_service")
        .with_status(status)
        .with_body("<Envelope><Body/></Envelope>")
        .create_async()
        .await;

    let url = format!("{}/onvif/ptz_service", server.url());
    let reply = SoapClient::new()
        .post(&url, ACTION, String::new())
        .await
        .unwrap();

    assert_eq!(reply.status as usize, status);
    assert!(!reply.is_success());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = SoapClient::with_timeout(Duration::from_secs(2));
    let err = client
        .post("http://127.0.0.1:1/onvif/device_service", ACTION, String::new())
        .await
        .unwrap_err();

    assert!(!err.is_timeout());
    assert!(err.to_string().starts_with("transport error"));
}

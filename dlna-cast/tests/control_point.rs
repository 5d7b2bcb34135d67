//! ControlPoint tests against an in-process renderer

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dlna_api::{ApiError, DlnaClient};
use dlna_cast::{
    build_control_point, CastError, ControlPoint, DeviceCapabilities, MediaSource,
    PlaybackStatus, RendererStateStore, SubscriptionConfig, TvAction,
};
use dlna_stream::SubscriptionManager;
use mockito::{Matcher, Server};

const CALLBACK_URL: &str = "http://192.168.1.10:3400/callback";
const AVT: &str = "urn:schemas-upnp-org:service:AVTransport:1";
const RC: &str = "urn:schemas-upnp-org:service:RenderingControl:1";

const DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Living Room TV</friendlyName>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:AVTransport</serviceId>
        <controlURL>/ctrl</controlURL>
        <eventSubURL>/evt</eventSubURL>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:RenderingControl:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:RenderingControl</serviceId>
        <controlURL>rc</controlURL>
        <eventSubURL>rc_evt</eventSubURL>
      </service>
    </serviceList>
  </device>
</root>"#;

fn notify_body(transport_state: &str) -> String {
    format!(
        r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><LastChange>&lt;Event xmlns="urn:schemas-upnp-org:metadata-1-0/AVT/"&gt;&lt;InstanceID val="0"&gt;&lt;TransportState val="{}"/&gt;&lt;/InstanceID&gt;&lt;/Event&gt;</LastChange></e:property></e:propertyset>"#,
        transport_state
    )
}

fn soap_response(service: &str, action: &str, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body><u:{action}Response xmlns:u="{service}">{inner}</u:{action}Response></s:Body>
</s:Envelope>"#
    )
}

fn soap_action(service: &str, action: &str) -> String {
    format!("\"{}#{}\"", service, action)
}

fn movie() -> MediaSource {
    MediaSource::new(
        "http://192.168.1.10:3500/movie.mp4",
        "video/mp4",
        "http://192.168.1.10:3500/movie.srt",
    )
}

fn control_point_for(server: &Server, store: Arc<RendererStateStore>) -> ControlPoint {
    let capabilities = DeviceCapabilities::from_description(DESCRIPTION, &server.url()).unwrap();
    ControlPoint::builder(capabilities, CALLBACK_URL)
        .store(store)
        .media(movie())
        .build()
}

fn mock_subscribe(server: &mut Server, sid: &str) -> mockito::Mock {
    server
        .mock("SUBSCRIBE", "/evt")
        .match_header("CALLBACK", format!("<{}>", CALLBACK_URL).as_str())
        .match_header("NT", "upnp:event")
        .with_status(200)
        .with_header("SID", &format!("uuid:{}", sid))
        .with_header("TIMEOUT", "Second-300")
        .create()
}

fn mock_action(server: &mut Server, path: &str, service: &str, action: &str) -> mockito::Mock {
    server
        .mock("POST", path)
        .match_header("SOAPAction", soap_action(service, action).as_str())
        .with_status(200)
        .with_body(soap_response(service, action, ""))
        .create()
}

#[test]
fn test_build_control_point_from_description() {
    let cp = build_control_point(DESCRIPTION, "http://10.0.0.5:1400/desc.xml", CALLBACK_URL).unwrap();

    let caps = cp.capabilities();
    assert_eq!(caps.av_transport_control_url, "http://10.0.0.5:1400/ctrl");
    assert_eq!(caps.av_transport_event_url, "http://10.0.0.5:1400/evt");
    assert_eq!(caps.rendering_control_url.as_deref(), Some("http://10.0.0.5:1400/rc"));
    assert_eq!(caps.friendly_name, "Living Room TV");
    assert_eq!(cp.callback_url(), CALLBACK_URL);
}

#[test]
fn test_build_control_point_rejects_non_renderer() {
    let xml = r#"<root><device><friendlyName>NAS</friendlyName><serviceList>
      <service><serviceId>urn:upnp-org:serviceId:ContentDirectory</serviceId>
      <controlURL>/cd</controlURL><eventSubURL>/cd_evt</eventSubURL></service>
    </serviceList></device></root>"#;

    let result = build_control_point(xml, "http://10.0.0.5:1400/desc.xml", CALLBACK_URL);

    assert!(matches!(
        result,
        Err(CastError::Api(ApiError::IncompatibleDevice(_)))
    ));
}

#[test]
fn test_play1_subscribes_loads_and_plays() {
    let mut server = Server::new();
    let subscribe = mock_subscribe(&mut server, "dev-1");
    let load = server
        .mock("POST", "/ctrl")
        .match_header("SOAPAction", soap_action(AVT, "SetAVTransportURI").as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<CurrentURI>http://192.168.1.10:3500/movie.mp4</CurrentURI>".to_string()),
            Matcher::Regex("<InstanceID>0</InstanceID>".to_string()),
        ]))
        .with_status(200)
        .with_body(soap_response(AVT, "SetAVTransportURI", ""))
        .expect(1)
        .create();
    let play = server
        .mock("POST", "/ctrl")
        .match_header("SOAPAction", soap_action(AVT, "Play").as_str())
        .match_body(Matcher::Regex("<Speed>1</Speed>".to_string()))
        .with_status(200)
        .with_body(soap_response(AVT, "Play", ""))
        .expect(1)
        .create();
    let store = Arc::new(RendererStateStore::new());
    let cp = control_point_for(&server, Arc::clone(&store));

    cp.send_to_tv(TvAction::Play1).unwrap();

    subscribe.assert();
    load.assert();
    play.assert();
    assert!(store.is_member("dev-1"));
    assert_eq!(cp.sequence("dev-1").unwrap(), 0);
}

#[test]
fn test_play1_fails_when_subscribe_fails() {
    let mut server = Server::new();
    let load = server.mock("POST", "/ctrl").expect(0).create();
    let capabilities = DeviceCapabilities {
        friendly_name: "Unreachable events".to_string(),
        device_type: "urn:schemas-upnp-org:device:MediaRenderer:1".to_string(),
        av_transport_control_url: format!("{}/ctrl", server.url()),
        av_transport_event_url: "http://127.0.0.1:9/evt".to_string(),
        rendering_control_url: None,
        connection_manager_url: None,
    };
    let cp = ControlPoint::builder(capabilities, CALLBACK_URL)
        .media(movie())
        .build();

    let result = cp.send_to_tv(TvAction::Play1);

    assert!(matches!(result, Err(CastError::Subscription(_))));
    load.assert();
}

#[test]
fn test_play1_continues_when_subscription_refused() {
    let mut server = Server::new();
    let _refused = server.mock("SUBSCRIBE", "/evt").with_status(501).create();
    let load = mock_action(&mut server, "/ctrl", AVT, "SetAVTransportURI");
    let play = mock_action(&mut server, "/ctrl", AVT, "Play");
    let store = Arc::new(RendererStateStore::new());
    let cp = control_point_for(&server, Arc::clone(&store));

    cp.send_to_tv(TvAction::Play1).unwrap();

    load.assert();
    play.assert();
    assert!(store.is_empty());
}

#[test]
fn test_play_never_follows_failed_load() {
    let mut server = Server::new();
    let _subscribe = mock_subscribe(&mut server, "dev-1");
    let _load = server
        .mock("POST", "/ctrl")
        .match_header("SOAPAction", soap_action(AVT, "SetAVTransportURI").as_str())
        .with_status(500)
        .with_body(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault>
<faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring>
<detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>714</errorCode></UPnPError></detail>
</s:Fault></s:Body></s:Envelope>"#,
        )
        .create();
    let play = server
        .mock("POST", "/ctrl")
        .match_header("SOAPAction", soap_action(AVT, "Play").as_str())
        .expect(0)
        .create();
    let cp = control_point_for(&server, Arc::new(RendererStateStore::new()));

    let result = cp.send_to_tv(TvAction::Play1);

    assert!(matches!(
        result,
        Err(CastError::Api(ApiError::SoapFault(714)))
    ));
    play.assert();
}

#[test]
fn test_pause_and_play_have_no_subscription_side_effects() {
    let mut server = Server::new();
    let subscribe = server.mock("SUBSCRIBE", "/evt").expect(0).create();
    let pause = mock_action(&mut server, "/ctrl", AVT, "Pause");
    let play = mock_action(&mut server, "/ctrl", AVT, "Play");
    let store = Arc::new(RendererStateStore::new());
    let cp = control_point_for(&server, Arc::clone(&store));

    cp.send_action("Pause").unwrap();
    cp.send_action("Play").unwrap();

    pause.assert();
    play.assert();
    subscribe.assert();
    assert!(store.is_empty());
}

#[test]
fn test_first_stopped_event_is_not_reported() {
    let mut server = Server::new();
    let _subscribe = mock_subscribe(&mut server, "dev-1");
    let _load = mock_action(&mut server, "/ctrl", AVT, "SetAVTransportURI");
    let _play = mock_action(&mut server, "/ctrl", AVT, "Play");
    let cp = control_point_for(&server, Arc::new(RendererStateStore::new()));
    let transitions = cp.transitions();
    cp.send_to_tv(TvAction::Play1).unwrap();

    assert!(cp.on_notify("uuid:dev-1", &notify_body("STOPPED")).unwrap());
    assert_eq!(cp.sequence("dev-1").unwrap(), 1);
    assert!(transitions.try_recv().is_err());

    assert!(cp.on_notify("uuid:dev-1", &notify_body("PLAYING")).unwrap());
    let transition = transitions.try_recv().unwrap();
    assert_eq!(transition.status, PlaybackStatus::Playing);
    assert_eq!(transition.previous_state, "");
    assert_eq!(cp.sequence("dev-1").unwrap(), 2);
}

/// Renderer that grants one subscription, then drops every connection
fn spawn_flaky_renderer(sid: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/evt", listener.local_addr().unwrap());

    thread::spawn(move || {
        let mut incoming = listener.incoming();

        if let Some(Ok(mut stream)) = incoming.next() {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nSID: uuid:{}\r\nTIMEOUT: Second-300\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                sid
            );
            let _ = stream.write_all(response.as_bytes());
        }

        for stream in incoming {
            drop(stream);
        }
    });

    url
}

#[test]
fn test_stop_survives_failed_unsubscribes() {
    let mut server = Server::new();
    let _subscribe = mock_subscribe(&mut server, "dev-a");
    let _load = mock_action(&mut server, "/ctrl", AVT, "SetAVTransportURI");
    let _play = mock_action(&mut server, "/ctrl", AVT, "Play");
    let unsubscribe = server
        .mock("UNSUBSCRIBE", "/evt")
        .match_header("SID", "uuid:dev-a")
        .with_status(500)
        .expect(1)
        .create();
    let stop = server
        .mock("POST", "/ctrl")
        .match_header("SOAPAction", soap_action(AVT, "Stop").as_str())
        .with_status(200)
        .with_body(soap_response(AVT, "Stop", ""))
        .expect(1)
        .create();

    let store = Arc::new(RendererStateStore::new());
    let cp = control_point_for(&server, Arc::clone(&store));
    cp.send_to_tv(TvAction::Play1).unwrap();

    let second_device = SubscriptionManager::new(
        DlnaClient::new(),
        Arc::clone(&store),
        spawn_flaky_renderer("dev-b"),
        CALLBACK_URL,
        SubscriptionConfig::default(),
    );
    second_device.subscribe().unwrap();
    assert_eq!(store.tracked_sids(), vec!["dev-a".to_string(), "dev-b".to_string()]);

    cp.send_to_tv(TvAction::Stop).unwrap();

    unsubscribe.assert();
    stop.assert();
    assert!(store.is_empty());
    assert!(!cp.on_notify("uuid:dev-a", &notify_body("STOPPED")).unwrap());
    assert!(!cp.on_notify("uuid:dev-b", &notify_body("STOPPED")).unwrap());
}

#[test]
fn test_stop_reports_stop_failure() {
    let mut server = Server::new();
    let _stop = server
        .mock("POST", "/ctrl")
        .match_header("SOAPAction", soap_action(AVT, "Stop").as_str())
        .with_status(503)
        .create();
    let cp = control_point_for(&server, Arc::new(RendererStateStore::new()));

    assert!(matches!(
        cp.send_to_tv(TvAction::Stop),
        Err(CastError::Api(ApiError::HttpStatus(503)))
    ));
}

#[test]
fn test_mute_round_trip() {
    let mut server = Server::new();
    let set = server
        .mock("POST", "/rc")
        .match_header("SOAPAction", soap_action(RC, "SetMute").as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<Channel>Master</Channel>".to_string()),
            Matcher::Regex("<DesiredMute>1</DesiredMute>".to_string()),
        ]))
        .with_status(200)
        .with_body(soap_response(RC, "SetMute", ""))
        .expect(1)
        .create();
    let get = server
        .mock("POST", "/rc")
        .match_header("SOAPAction", soap_action(RC, "GetMute").as_str())
        .with_status(200)
        .with_body(soap_response(RC, "GetMute", "<CurrentMute>1</CurrentMute>"))
        .create();
    let cp = control_point_for(&server, Arc::new(RendererStateStore::new()));

    cp.set_mute(true).unwrap();
    assert!(cp.get_mute().unwrap());

    set.assert();
    get.assert();
}

#[test]
fn test_volume_round_trip() {
    let mut server = Server::new();
    let set = server
        .mock("POST", "/rc")
        .match_header("SOAPAction", soap_action(RC, "SetVolume").as_str())
        .match_body(Matcher::Regex("<DesiredVolume>35</DesiredVolume>".to_string()))
        .with_status(200)
        .with_body(soap_response(RC, "SetVolume", ""))
        .expect(1)
        .create();
    let _get = server
        .mock("POST", "/rc")
        .match_header("SOAPAction", soap_action(RC, "GetVolume").as_str())
        .with_status(200)
        .with_body(soap_response(RC, "GetVolume", "<CurrentVolume>35</CurrentVolume>"))
        .create();
    let cp = control_point_for(&server, Arc::new(RendererStateStore::new()));

    cp.set_volume(35).unwrap();
    assert_eq!(cp.get_volume().unwrap(), 35);
    set.assert();
}

#[test]
fn test_volume_out_of_range_sends_nothing() {
    let mut server = Server::new();
    let set = server.mock("POST", "/rc").expect(0).create();
    let cp = control_point_for(&server, Arc::new(RendererStateStore::new()));

    assert!(matches!(
        cp.set_volume(101),
        Err(CastError::Api(ApiError::InvalidParameter(_)))
    ));
    set.assert();
}

#[test]
fn test_renewal_is_cancelled_by_stop() {
    let mut server = Server::new();
    let _subscribe = server
        .mock("SUBSCRIBE", "/evt")
        .match_header("NT", "upnp:event")
        .with_status(200)
        .with_header("SID", "uuid:dev-1")
        .with_header("TIMEOUT", "Second-10")
        .create();
    let renewal = server
        .mock("SUBSCRIBE", "/evt")
        .match_header("SID", "uuid:dev-1")
        .expect(0)
        .create();
    let _load = mock_action(&mut server, "/ctrl", AVT, "SetAVTransportURI");
    let _play = mock_action(&mut server, "/ctrl", AVT, "Play");
    let _unsubscribe = server.mock("UNSUBSCRIBE", "/evt").with_status(200).create();
    let _stop = mock_action(&mut server, "/ctrl", AVT, "Stop");

    let capabilities = DeviceCapabilities::from_description(DESCRIPTION, &server.url()).unwrap();
    let cp = ControlPoint::builder(capabilities, CALLBACK_URL)
        .media(movie())
        .subscription_config(SubscriptionConfig {
            short_lease_delay: Duration::from_millis(500),
            ..Default::default()
        })
        .build();

    cp.send_to_tv(TvAction::Play1).unwrap();
    cp.send_to_tv(TvAction::Stop).unwrap();

    thread::sleep(Duration::from_millis(800));
    renewal.assert();
}

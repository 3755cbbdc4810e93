
use fixtures::{
    message, params, FakePlatform, FixedSession, HeldAlerts, RecordingNavigator, ScriptedAlerts,
};
use medconf_common::{DeviceToken, RegistrationState, SessionCredential, SessionProvider};
use medconf_config::{ApiConfig, AppConfig};
use medconf_push::{
    Collaborators, HttpTokenApi, PlatformEvent, PushEngine, Screen, SessionHub, TokenApi,
    TokenStore,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Setup {
    engine: Arc<PushEngine>,
    store: TokenStore,
    navigator: Arc<RecordingNavigator>,
    alerts: Arc<ScriptedAlerts>,
}

fn offline_api() -> Arc<dyn TokenApi> {
    Arc::new(
        HttpTokenApi::new(&ApiConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap(),
    )
}

fn server_api(server: &MockServer) -> Arc<dyn TokenApi> {
    Arc::new(
        HttpTokenApi::new(&ApiConfig {
            base_url: format!("{}/api", server.uri()),
            request_timeout_secs: 5,
        })
        .unwrap(),
    )
}

fn setup_with(
    store: TokenStore,
    platform: FakePlatform,
    answer: bool,
    sessions: Arc<dyn SessionProvider>,
    api: Arc<dyn TokenApi>,
) -> Setup {
    let navigator = Arc::new(RecordingNavigator::default());
    let alerts = Arc::new(ScriptedAlerts::answering(answer));
    let engine = PushEngine::new(
        Collaborators {
            store: store.clone(),
            platform: Arc::new(platform),
            api,
            sessions,
            alerts: alerts.clone(),
            navigator: navigator.clone(),
        },
        &AppConfig::default(),
    );
    Setup {
        engine: Arc::new(engine),
        store,
        navigator,
        alerts,
    }
}

fn setup(platform: FakePlatform, answer: bool) -> Setup {
    setup_with(
        TokenStore::in_memory(),
        platform,
        answer,
        Arc::new(FixedSession::signed_out()),
        offline_api(),
    )
}

fn no_session() -> watch::Receiver<Option<SessionCredential>> {
    let (_, rx) = watch::channel(None);
    rx
}

async fn wait_for_calls(navigator: &RecordingNavigator, count: usize) {
    for _ in 0..100 {
        if navigator.calls().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} navigation calls, saw {:?}", count, navigator.calls());
}

#[tokio::test]
async fn test_cold_start_notification_waits_for_navigation() {
    let platform = FakePlatform::granted("tok-1").launched_by(message(&[
        ("type", "new_event"),
        ("action", "view"),
        ("id", "evt-1"),
    ]));
    let s = setup(platform, true);
    let (_tx, rx) = mpsc::channel(8);

    let _listeners = s.engine.initialize(rx, no_session()).await;
    assert!(s.navigator.calls().is_empty());

    assert_eq!(s.engine.navigation_ready(), Some(Screen::EventDetails));
    assert_eq!(
        s.navigator.calls(),
        vec![(Screen::EventDetails, params(&[("eventId", "evt-1")]))]
    );

    // Readiness is signalled once; nothing is replayed twice.
    assert_eq!(s.engine.navigation_ready(), None);
    assert_eq!(s.navigator.calls().len(), 1);

    // Permission was granted during startup, so the token is cached.
    assert_eq!(
        s.store.device_token().await.unwrap(),
        Some(DeviceToken::new("tok-1"))
    );
}

#[tokio::test]
async fn test_cold_start_link_is_routed() {
    let platform =
        FakePlatform::granted("tok-1").launched_by_link("https://app.example.com/event/evt-9");
    let s = setup(platform, true);
    let (_tx, rx) = mpsc::channel(8);

    let _listeners = s.engine.initialize(rx, no_session()).await;
    s.engine.navigation_ready();

    assert_eq!(
        s.navigator.calls(),
        vec![(Screen::EventDetails, params(&[("eventId", "evt-9")]))]
    );
}

#[tokio::test]
async fn test_foreground_message_routes_only_after_view() {
    let s = setup(FakePlatform::granted("tok-1"), true);
    let (tx, rx) = mpsc::channel(8);
    let _listeners = s.engine.initialize(rx, no_session()).await;
    s.engine.navigation_ready();

    let mut push = message(&[
        ("type", "chat_message"),
        ("action", "open_chat"),
        ("sender_id", "u-9"),
        ("room_id", "r-1"),
        ("sender_name", "Dr. Lee"),
    ]);
    push.title = Some("Dr. Lee".to_string());
    push.body = Some("Are you at the keynote?".to_string());
    tx.send(PlatformEvent::ForegroundMessage(push)).await.unwrap();

    wait_for_calls(&s.navigator, 1).await;
    assert_eq!(
        s.navigator.calls(),
        vec![(
            Screen::Chat,
            params(&[("userId", "u-9"), ("roomId", "r-1"), ("senderName", "Dr. Lee")])
        )]
    );

    let prompts = s.alerts.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].title, "Dr. Lee");
    assert_eq!(prompts[0].message, "Are you at the keynote?");
    assert_eq!(prompts[0].confirm_label, "View");
    assert_eq!(prompts[0].cancel_label, "Dismiss");
}

#[tokio::test]
async fn test_dismissed_foreground_message_does_not_navigate() {
    let s = setup(FakePlatform::granted("tok-1"), false);
    s.engine.navigation_ready();

    s.engine
        .handle_event(PlatformEvent::ForegroundMessage(message(&[
            ("type", "meeting_invitation"),
            ("action", "view_invitation"),
        ])))
        .await;

    for _ in 0..100 {
        if !s.alerts.prompts().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(s.alerts.prompts().len(), 1);
    assert!(s.navigator.calls().is_empty());
}

#[tokio::test]
async fn test_opened_notification_routes_immediately() {
    let s = setup(FakePlatform::granted("tok-1"), false);
    s.engine.navigation_ready();

    s.engine
        .handle_event(PlatformEvent::NotificationOpened(message(&[
            ("type", "course_comment_reply"),
            ("action", "view_discussion"),
            ("courseId", "c-3"),
            ("video_id", "v-2"),
            ("commentId", "cm-8"),
        ])))
        .await;

    assert_eq!(
        s.navigator.calls(),
        vec![(
            Screen::CourseDetails,
            params(&[("courseId", "c-3"), ("videoId", "v-2"), ("commentId", "cm-8")])
        )]
    );
    // Background taps never show a banner.
    assert!(s.alerts.prompts().is_empty());
}

#[tokio::test]
async fn test_incomplete_payload_is_dropped() {
    let s = setup(FakePlatform::granted("tok-1"), true);
    s.engine.navigation_ready();

    s.engine
        .handle_event(PlatformEvent::NotificationOpened(message(&[
            ("type", "event_approved"),
            ("action", "view"),
        ])))
        .await;
    s.engine
        .handle_event(PlatformEvent::NotificationOpened(message(&[
            ("type", "sponsorship_response"),
            ("action", "respond"),
            ("id", "evt-1"),
        ])))
        .await;

    assert!(s.navigator.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_type_opens_home() {
    let s = setup(FakePlatform::granted("tok-1"), true);
    s.engine.navigation_ready();

    s.engine
        .handle_event(PlatformEvent::NotificationOpened(message(&[
            ("type", "conference_digest"),
            ("id", "d-1"),
        ])))
        .await;

    assert_eq!(s.navigator.screens(), vec![Screen::Home]);
}

#[tokio::test]
async fn test_latest_pending_intent_wins_before_ready() {
    let s = setup(FakePlatform::granted("tok-1"), true);

    s.engine
        .handle_event(PlatformEvent::NotificationOpened(message(&[
            ("type", "new_event"),
            ("action", "view"),
            ("id", "evt-1"),
        ])))
        .await;
    s.engine
        .handle_event(PlatformEvent::LinkOpened(
            "app://event/evt-2".to_string(),
        ))
        .await;

    assert!(s.navigator.calls().is_empty());
    s.engine.navigation_ready();
    assert_eq!(
        s.navigator.calls(),
        vec![(Screen::EventDetails, params(&[("eventId", "evt-2")]))]
    );
}

#[tokio::test]
async fn test_foreign_link_is_ignored() {
    let s = setup(FakePlatform::granted("tok-1"), true);
    s.engine.navigation_ready();

    s.engine
        .handle_event(PlatformEvent::LinkOpened(
            "https://other.example.org/event/evt-1".to_string(),
        ))
        .await;

    assert!(s.navigator.calls().is_empty());
}

#[tokio::test]
async fn test_token_refresh_event_resyncs_signed_in_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/fcm-token"))
        .and(body_json(json!({ "token": "tok-2" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1..)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/fcm-token"))
        .and(body_json(json!({ "token": "tok-1" })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let s = setup_with(
        TokenStore::in_memory(),
        FakePlatform::granted("tok-1"),
        true,
        Arc::new(FixedSession::signed_in("jwt-1")),
        server_api(&server),
    );
    let (tx, rx) = mpsc::channel(8);
    let _listeners = s.engine.initialize(rx, no_session()).await;

    tx.send(PlatformEvent::TokenRefreshed("tok-2".to_string()))
        .await
        .unwrap();

    for _ in 0..100 {
        if s.store.device_token().await.unwrap() == Some(DeviceToken::new("tok-2"))
            && s.engine.registrar().registration_state() == RegistrationState::SyncedWithServer
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        s.engine.registrar().get_token().await,
        Some(DeviceToken::new("tok-2"))
    );
}

#[tokio::test]
async fn test_teardown_stops_listening_but_keeps_token() {
    let s = setup(FakePlatform::granted("tok-1"), true);
    let (tx, rx) = mpsc::channel(8);
    let listeners = s.engine.initialize(rx, no_session()).await;
    assert!(listeners.is_active());

    listeners.teardown();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(tx
        .send(PlatformEvent::LinkOpened("app://event/evt-1".to_string()))
        .await
        .is_err());
    assert_eq!(
        s.store.device_token().await.unwrap(),
        Some(DeviceToken::new("tok-1"))
    );
}

#[tokio::test]
async fn test_app_start_resyncs_token_cached_by_previous_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/fcm-token"))
        .and(header("authorization", "Bearer jwt-1"))
        .and(body_json(json!({ "token": "tok-1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // Left behind by the previous run, whose sync never reached the backend.
    let store = TokenStore::in_memory();
    store.set_device_token(&DeviceToken::new("tok-1")).await.unwrap();
    store
        .set_session_credential(&SessionCredential::new("jwt-1"))
        .await
        .unwrap();

    let hub = SessionHub::restore(store.clone()).await;
    let platform = FakePlatform::granted("tok-1");
    let s = setup_with(
        store,
        platform,
        true,
        Arc::new(hub.provider()),
        server_api(&server),
    );
    let (_tx, rx) = mpsc::channel(8);
    let _listeners = s.engine.initialize(rx, hub.subscribe()).await;
    assert_ne!(
        s.engine.registrar().registration_state(),
        RegistrationState::Unregistered
    );

    for _ in 0..100 {
        if s.engine.registrar().registration_state() == RegistrationState::SyncedWithServer {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        s.engine.registrar().registration_state(),
        RegistrationState::SyncedWithServer
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    server.verify().await;
}

#[tokio::test]
async fn test_teardown_closes_open_banners() {
    let navigator = Arc::new(RecordingNavigator::default());
    let alerts = Arc::new(HeldAlerts::default());
    let engine = Arc::new(PushEngine::new(
        Collaborators {
            store: TokenStore::in_memory(),
            platform: Arc::new(FakePlatform::granted("tok-1")),
            api: offline_api(),
            sessions: Arc::new(FixedSession::signed_out()),
            alerts: alerts.clone(),
            navigator: navigator.clone(),
        },
        &AppConfig::default(),
    ));
    let (tx, rx) = mpsc::channel(8);
    let listeners = engine.initialize(rx, no_session()).await;
    engine.navigation_ready();

    let invitation = || {
        PlatformEvent::ForegroundMessage(message(&[
            ("type", "meeting_invitation"),
            ("action", "view_invitation"),
        ]))
    };

    // An answered banner navigates while the listeners are up.
    tx.send(invitation()).await.unwrap();
    wait_for_shown(&alerts, 1).await;
    alerts.release.notify_waiters();
    wait_for_calls(&navigator, 1).await;

    // One still waiting for an answer is closed by teardown.
    tx.send(invitation()).await.unwrap();
    wait_for_shown(&alerts, 2).await;
    listeners.teardown();
    tokio::time::sleep(Duration::from_millis(20)).await;
    alerts.release.notify_waiters();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(navigator.screens(), vec![Screen::MeetingInvitations]);
}

async fn wait_for_shown(alerts: &HeldAlerts, count: usize) {
    for _ in 0..100 {
        if alerts.shown_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} banners, saw {}", count, alerts.shown_count());
}

#[tokio::test]
async fn test_logout_removes_registration_then_session() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/fcm-token"))
        .and(header("authorization", "Bearer jwt-1"))
        .and(body_json(json!({ "token": "tok-1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = TokenStore::in_memory();
    let hub = SessionHub::new(store.clone());
    hub.establish(SessionCredential::new("jwt-1")).await.unwrap();
    store.set_device_token(&DeviceToken::new("tok-1")).await.unwrap();

    let s = setup_with(
        store.clone(),
        FakePlatform::granted("tok-1"),
        true,
        Arc::new(hub.provider()),
        server_api(&server),
    );

    s.engine.logout(&hub).await;

    assert_eq!(store.device_token().await.unwrap(), None);
    assert_eq!(store.session_credential().await.unwrap(), None);
    assert_eq!(*hub.subscribe().borrow(), None);
}

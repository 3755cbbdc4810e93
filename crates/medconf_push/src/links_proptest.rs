use proptest::prelude::*;

use crate::intent::IntentKind;
use crate::links::LinkResolver;
use crate::router::{route, RouteDecision, Screen};
use crate::share::ShareLinkBuilder;

fn resolver() -> LinkResolver {
    LinkResolver::new("app", "app.example.com")
}

fn assert_event_details(url: &str, id: &str) -> Result<(), TestCaseError> {
    let intent = resolver().resolve(url);
    prop_assert!(intent.is_some(), "{} did not resolve", url);
    let intent = intent.unwrap();
    prop_assert_eq!(intent.kind(), IntentKind::NewEvent);
    prop_assert_eq!(intent.entity_id(), Some(id));

    match route(&intent) {
        RouteDecision::Navigate { target, params } => {
            prop_assert_eq!(target, Screen::EventDetails);
            prop_assert_eq!(params.get("eventId").map(String::as_str), Some(id));
        }
        other => prop_assert!(false, "unexpected decision {:?}", other),
    }
    Ok(())
}

proptest! {
    #[test]
    fn built_event_links_resolve_back_to_the_same_event(id in "[a-zA-Z0-9-]{1,40}") {
        assert_event_details(&resolver().web_url("event", &id), &id)?;
        assert_event_details(&resolver().app_url("event", &id), &id)?;
    }

    #[test]
    fn shared_web_line_opens_the_shared_event(
        id in "[a-zA-Z0-9-]{1,40}",
        title in "[A-Za-z ]{0,30}",
    ) {
        let message = ShareLinkBuilder::new(resolver()).build("event", &id, &[("Event", &title)]);
        let web_line = message.lines().find(|line| line.starts_with("https://"));
        prop_assert!(web_line.is_some());
        assert_event_details(web_line.unwrap(), &id)?;
    }

    #[test]
    fn foreign_hosts_never_resolve(host in "[a-z]{1,12}\\.example\\.org", id in "[a-z0-9]{1,10}") {
        let url = format!("https://{}/event/{}", host, id);
        prop_assert!(resolver().resolve(&url).is_none());
    }
}

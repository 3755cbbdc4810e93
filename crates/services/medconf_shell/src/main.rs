// File: services/medconf_shell/src/main.rs
mod headless;
mod service_factory;

use medconf_common::{logging::parse_level, MedconfError, SessionCredential};
use medconf_config::load_config;
use medconf_push::{normalize, route, PlatformEvent};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use service_factory::ShellServiceFactory;

const USAGE: &str = "\
Usage: medconf-shell <command> [args]

  resolve <url>                      resolve a deep link and show its route
  route <json-payload>               normalize and route a push data payload
  share <type> <id> [Label=Value]... print the share message for an entity
  login <credential>                 store a session and register this device
  logout                             unregister this device and end the session
  verify                             ask the backend whether the cached token is known
  status                             show the local registration state
  listen                             read platform events as JSON lines from stdin";

#[tokio::main]
async fn main() -> Result<(), MedconfError> {
    let config = Arc::new(load_config().map_err(|e| MedconfError::ConfigError(e.to_string()))?);
    medconf_common::init_with_level(parse_level(&config.logging.level));

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let factory = ShellServiceFactory::new(config).await;

    match (command.as_str(), rest) {
        ("resolve", [url]) => resolve(&factory, url),
        ("route", [payload]) => route_payload(payload),
        ("share", [entity_type, entity_id, fields @ ..]) => {
            share(&factory, entity_type, entity_id, fields).await
        }
        ("login", [credential]) => login(&factory, credential).await,
        ("logout", []) => {
            factory.engine()?.logout(factory.sessions()).await;
            Ok(())
        }
        ("verify", []) => {
            let result = factory.registrar()?.verify_registration().await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        ("status", []) => {
            let status = factory.registrar()?.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        ("listen", []) => listen(&factory).await,
        _ => {
            println!("{}", USAGE);
            Err(MedconfError::ParseError(format!(
                "unrecognised command line: {}",
                args.join(" ")
            )))
        }
    }
}

fn resolve(factory: &ShellServiceFactory, url: &str) -> Result<(), MedconfError> {
    match factory.link_resolver().resolve(url) {
        Some(intent) => {
            let decision = route(&intent);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "intent": intent, "decision": decision }))?
            );
        }
        None => println!("not a link this app handles"),
    }
    Ok(())
}

/// Flattens a JSON object into the string map push payloads arrive as.
fn payload_map(raw: &str) -> Result<BTreeMap<String, String>, MedconfError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(fields) = value else {
        return Err(MedconfError::ParseError(
            "payload must be a JSON object".to_string(),
        ));
    };
    Ok(fields
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect())
}

fn route_payload(raw: &str) -> Result<(), MedconfError> {
    let intent = normalize(&payload_map(raw)?);
    let decision = route(&intent);
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "intent": intent, "decision": decision }))?
    );
    Ok(())
}

async fn share(
    factory: &ShellServiceFactory,
    entity_type: &str,
    entity_id: &str,
    fields: &[String],
) -> Result<(), MedconfError> {
    let pairs: Vec<(&str, &str)> = fields
        .iter()
        .filter_map(|field| field.split_once('='))
        .collect();
    if pairs.len() != fields.len() {
        warn!("Ignoring display fields without '='");
    }

    let outcome = factory
        .share_service()
        .share(entity_type, entity_id, &pairs)
        .await;
    info!("Share outcome: {:?}", outcome);
    Ok(())
}

async fn login(factory: &ShellServiceFactory, credential: &str) -> Result<(), MedconfError> {
    let credential = SessionCredential::new(credential);
    factory.sessions().establish(credential.clone()).await?;

    let state = factory.registrar()?.register_after_login(&credential).await;
    println!("{}", serde_json::to_string_pretty(&json!({ "state": state }))?);
    Ok(())
}

async fn listen(factory: &ShellServiceFactory) -> Result<(), MedconfError> {
    let engine = factory.engine()?;
    let (tx, rx) = mpsc::channel(32);
    let listeners = engine.initialize(rx, factory.sessions().subscribe()).await;
    engine.navigation_ready();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<PlatformEvent>(&line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    warn!("Event listener stopped; no longer reading input");
                    break;
                }
            }
            Err(err) => warn!("Skipping malformed event: {}", err),
        }
    }

    drop(tx);
    listeners.run_until_closed().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_map_stringifies_scalars() {
        let map = payload_map(r#"{"type":"new_event","action":"view","id":42}"#).unwrap();
        assert_eq!(map.get("id").map(String::as_str), Some("42"));
        assert_eq!(map.get("type").map(String::as_str), Some("new_event"));
    }

    #[test]
    fn test_payload_must_be_an_object() {
        assert!(matches!(
            payload_map("[1, 2]"),
            Err(MedconfError::ParseError(_))
        ));
        assert!(payload_map("{not json").is_err());
    }
}

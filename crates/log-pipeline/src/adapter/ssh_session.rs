//! SSH 세션 디코이 디코더
//!
//! 고정 스키마가 없는 JSON Lines를 읽습니다. 모든 최상위 필드를 그대로
//! 이벤트 필드로 옮기므로 `src_ip`, `session`, `input` 등은 있는 라인에서만 채워집니다.

use deceptinet_core::error::DeceptinetError;
use deceptinet_core::event::{EventFields, EventSource, HoneypotEvent, UNKNOWN_ACTOR, parse_timestamp};
use deceptinet_core::pipeline::EventDecoder;

use super::json::{flatten_into, get_scalar, parse_object};

/// SSH 세션 디코이 JSON Lines 디코더
#[derive(Debug, Clone, Copy, Default)]
pub struct SshSessionDecoder;

impl EventDecoder for SshSessionDecoder {
    fn format_name(&self) -> &str {
        "ssh_session"
    }

    fn decode(&self, line: &str) -> Result<HoneypotEvent, DeceptinetError> {
        let object = parse_object(line, self.format_name())?;

        let mut fields = EventFields::new();
        flatten_into(&mut fields, &object, "");

        let event_type = get_scalar(&object, "eventid").unwrap_or_default();
        let actor = match fields.get("src_ip") {
            "" => UNKNOWN_ACTOR.to_owned(),
            ip => ip.to_owned(),
        };
        let timestamp = get_scalar(&object, "timestamp").and_then(|raw| parse_timestamp(&raw));

        let mut event = HoneypotEvent::new(EventSource::SshSession, event_type)
            .with_actor(actor)
            .with_timestamp(timestamp);
        event.fields = fields;
        Ok(event)
    }
}

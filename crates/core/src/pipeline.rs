//! 파이프라인 trait -- 로그 형식 확장 포인트 정의

use crate::error::DeceptinetError;
use crate::event::HoneypotEvent;

/// 로그 라인 디코더 trait
///
/// 라인 단위 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 한 라인은 이벤트 하나가 되거나, 에러가 되어 건너뜁니다.
pub trait EventDecoder: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 한 라인을 이벤트로 디코딩
    fn decode(&self, line: &str) -> Result<HoneypotEvent, DeceptinetError>;
}

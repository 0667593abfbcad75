//! 길이 제한 라인 리더
//!
//! 한 줄이 비정상적으로 길어도 메모리를 무제한으로 쓰지 않도록,
//! `max_line_bytes`를 넘는 라인은 버퍼에 담지 않고 끝까지 소비만 합니다.

use std::io::{self, BufRead};

/// 리더가 돌려주는 한 라인
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    /// 정상 텍스트 라인 (개행 제외)
    Text(String),
    /// 최대 길이 초과 라인
    Oversized {
        /// 실제 라인 길이 (바이트)
        len: usize,
    },
    /// UTF-8이 아닌 라인
    InvalidUtf8,
}

/// 길이 제한 라인 리더
///
/// 빈 라인(공백뿐인 라인 포함)은 건너뛰고 돌려주지 않습니다.
pub struct LineReader<R> {
    inner: R,
    max_line_bytes: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner,
            max_line_bytes,
            buf: Vec::new(),
        }
    }

    /// 다음 라인을 읽습니다. EOF면 `Ok(None)`.
    ///
    /// CRLF 라인의 끝 `\r`은 길이 제한에 포함되지 않습니다.
    pub fn next_line(&mut self) -> io::Result<Option<RawLine>> {
        // 끝의 `\r` 한 바이트만큼 여유를 두고 버퍼링
        let buffer_limit = self.max_line_bytes.saturating_add(1);
        loop {
            self.buf.clear();
            let mut len = 0usize;
            let mut oversized = false;
            let mut saw_bytes = false;

            loop {
                let available = match self.inner.fill_buf() {
                    Ok(bytes) => bytes,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    break;
                }
                saw_bytes = true;

                let (chunk_len, newline) = match available.iter().position(|&b| b == b'\n') {
                    Some(pos) => (pos, true),
                    None => (available.len(), false),
                };
                len += chunk_len;

                if !oversized {
                    if self.buf.len() + chunk_len > buffer_limit {
                        oversized = true;
                        self.buf.clear();
                    } else {
                        self.buf.extend_from_slice(&available[..chunk_len]);
                    }
                }

                self.inner.consume(chunk_len + usize::from(newline));
                if newline {
                    break;
                }
            }

            if !saw_bytes {
                return Ok(None);
            }
            if !oversized && self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            if oversized || self.buf.len() > self.max_line_bytes {
                return Ok(Some(RawLine::Oversized { len }));
            }

            match std::str::from_utf8(&self.buf) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => return Ok(Some(RawLine::Text(text.to_owned()))),
                Err(_) => return Ok(Some(RawLine::InvalidUtf8)),
            }
        }
    }

    /// 설정된 최대 라인 길이
    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }
}

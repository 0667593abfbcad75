//! 빈도 테이블
//!
//! 키별 출현 횟수를 세고 상위 N개를 뽑습니다.
//! 동률은 먼저 나타난 키가 앞에 옵니다.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// 문자열 키 → 출현 횟수
///
/// 키는 처음 나타난 순서대로 보관되며, 순위 계산은 이 순서 위의 안정 정렬입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키의 횟수를 1 증가시키고 새 횟수를 반환합니다.
    pub fn increment(&mut self, key: &str) -> u64 {
        match self.index.get(key) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.1 += 1;
                entry.1
            }
            None => {
                self.index.insert(key.to_owned(), self.entries.len());
                self.entries.push((key.to_owned(), 1));
                1
            }
        }
    }

    /// 키의 횟수 (없으면 0)
    pub fn count(&self, key: &str) -> u64 {
        self.index.get(key).map_or(0, |&idx| self.entries[idx].1)
    }

    /// 서로 다른 키 수 (빈 키 포함)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 전체 횟수 합계
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// 공백이 아닌 서로 다른 키 수
    pub fn distinct_non_empty(&self) -> usize {
        self.entries
            .iter()
            .filter(|(key, _)| !key.trim().is_empty())
            .count()
    }

    /// 처음 나타난 순서대로 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// 횟수 내림차순 상위 `n`개. 동률은 먼저 나타난 키가 앞입니다.
    pub fn top_n(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<&(String, u64)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(key, count)| (key.clone(), *count))
            .collect()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

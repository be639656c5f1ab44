//! 종목명 → 티커 변환기.
//!
//! 공시된 종목명(예: "AMAZON.COM INC", "Meta Platforms")을 정규 티커로
//! 변환합니다. 테이블은 프로세스 시작 시 한 번 만들어지며 이후 변경되지
//! 않습니다. 전역 상태 대신 생성자 인자로 주입합니다.
//!
//! 퍼지/부분 매칭은 하지 않습니다. 단 하나의 예외는 총수익스왑(TRS)
//! 포지션입니다. 종목명에 `SWAP`이 포함되면 회사명 조각이나 티커가
//! 포함되어 있는지 확인하여 같은 티커 버킷으로 합산할 수 있게 합니다.

use std::collections::{HashMap, HashSet};

/// 추적 대상 7개 종목 (MAG7).
pub const MAG7_TICKERS: [&str; 7] = ["NVDA", "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA"];

/// 기본 종목명 변형 테이블.
const MAG7_NAME_VARIANTS: [(&str, &str); 9] = [
    ("NVIDIA", "NVDA"),
    ("Alphabet", "GOOGL"),
    ("AMAZON.COM INC", "AMZN"),
    ("Amazon", "AMZN"),
    ("Tesla", "TSLA"),
    ("Apple", "AAPL"),
    ("Microsoft", "MSFT"),
    ("Meta Platforms", "META"),
    ("Meta", "META"),
];

/// 스왑 종목명 스캔 순서와 회사명 조각. 먼저 일치하는 항목이 우선합니다.
const MAG7_SWAP_FRAGMENTS: [(&str, &str); 7] = [
    ("NVDA", "NVIDIA"),
    ("GOOGL", "ALPHABET"),
    ("AMZN", "AMAZON"),
    ("TSLA", "TESLA"),
    ("AAPL", "APPLE"),
    ("MSFT", "MICROSOFT"),
    ("META", "META"),
];

/// 표시용 대표 회사명.
const MAG7_DISPLAY_NAMES: [(&str, &str); 7] = [
    ("NVDA", "NVIDIA"),
    ("AAPL", "Apple"),
    ("MSFT", "Microsoft"),
    ("GOOGL", "Alphabet"),
    ("AMZN", "AMAZON.COM INC"),
    ("META", "Meta Platforms"),
    ("TSLA", "Tesla"),
];

/// 스왑 포지션 식별 키워드.
const SWAP_MARKER: &str = "SWAP";

/// 입력 정규화 (공백 제거 + 대문자).
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 종목명 → 티커 변환기.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    /// 정규화된 종목명 → 티커
    names: HashMap<String, String>,
    /// (티커, 회사명 조각) 스캔 목록
    swap_fragments: Vec<(String, Vec<String>)>,
    /// 정규 티커 집합
    tickers: HashSet<String>,
    /// 티커 → 표시용 이름
    display_names: HashMap<String, String>,
}

impl IdentityResolver {
    /// 임의의 테이블로 변환기를 생성합니다.
    ///
    /// `swap_fragments`의 순서가 스왑 스캔 우선순위가 됩니다.
    pub fn new<N, S>(names: N, swap_fragments: S) -> Self
    where
        N: IntoIterator<Item = (String, String)>,
        S: IntoIterator<Item = (String, Vec<String>)>,
    {
        let names: HashMap<String, String> = names
            .into_iter()
            .map(|(name, ticker)| (normalize_key(&name), normalize_key(&ticker)))
            .collect();

        let swap_fragments: Vec<(String, Vec<String>)> = swap_fragments
            .into_iter()
            .map(|(ticker, frags)| {
                (
                    normalize_key(&ticker),
                    frags.iter().map(|f| normalize_key(f)).collect(),
                )
            })
            .collect();

        let tickers = names
            .values()
            .cloned()
            .chain(swap_fragments.iter().map(|(t, _)| t.clone()))
            .collect();

        Self {
            names,
            swap_fragments,
            tickers,
            display_names: HashMap::new(),
        }
    }

    /// MAG7 기본 테이블로 변환기를 생성합니다.
    pub fn mag7() -> Self {
        let names = MAG7_NAME_VARIANTS
            .iter()
            .map(|(name, ticker)| (name.to_string(), ticker.to_string()));
        let swaps = MAG7_SWAP_FRAGMENTS
            .iter()
            .map(|(ticker, frag)| (ticker.to_string(), vec![frag.to_string()]));

        let mut resolver = Self::new(names, swaps);
        resolver.display_names = MAG7_DISPLAY_NAMES
            .iter()
            .map(|(t, n)| (t.to_string(), n.to_string()))
            .collect();
        resolver
    }

    /// 별칭을 추가한 새 변환기를 반환합니다.
    ///
    /// 설정 파일에서 읽은 추가 별칭을 적용할 때 사용합니다.
    pub fn with_aliases<I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, ticker) in aliases {
            let ticker = normalize_key(&ticker);
            self.tickers.insert(ticker.clone());
            self.names.insert(normalize_key(&name), ticker);
        }
        self
    }

    /// 종목명을 티커로 변환합니다.
    ///
    /// 알 수 없는 종목명은 `None`을 반환합니다. 에러가 아니며, 호출자는
    /// 해당 항목을 종목명 기준으로만 사용해야 합니다.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let key = normalize_key(name);
        if key.is_empty() {
            return None;
        }

        if let Some(ticker) = self.names.get(&key) {
            return Some(ticker.as_str());
        }

        if key.contains(SWAP_MARKER) {
            return self.resolve_swap(&key);
        }

        None
    }

    /// 스왑 종목명 안에서 티커 또는 회사명 조각을 찾습니다.
    fn resolve_swap(&self, key: &str) -> Option<&str> {
        self.swap_fragments
            .iter()
            .find(|(ticker, frags)| {
                key.contains(ticker.as_str()) || frags.iter().any(|f| key.contains(f.as_str()))
            })
            .map(|(ticker, _)| ticker.as_str())
    }

    /// 정규 티커인지 확인합니다 (대소문자 무시).
    pub fn is_tracked(&self, ticker: &str) -> bool {
        self.tickers.contains(&normalize_key(ticker))
    }

    /// 티커의 표시용 회사명.
    pub fn display_name(&self, ticker: &str) -> Option<&str> {
        self.display_names
            .get(&normalize_key(ticker))
            .map(String::as_str)
    }

    /// 등록된 종목명 변형 수.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// 테이블이 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.swap_fragments.is_empty()
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::mag7()
    }
}

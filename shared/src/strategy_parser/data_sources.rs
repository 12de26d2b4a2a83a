//! Detection of the external market-data APIs a strategy queries.

use super::model::DataSourceNode;
use super::rules::{all_matches, Rule};
use super::source::Source;

/// Sub-field label and the lower-case markers that reveal it.
type FieldMarkers = &'static [(&'static str, &'static [&'static str])];

const COINGECKO_FIELDS: FieldMarkers = &[
    ("Price", &["simple/price", "current_price", "/price", "\"price\"", "'price'", "prices"]),
    ("OHLC", &["/ohlc", "ohlc"]),
    ("Volume", &["total_volume", "volume"]),
    ("Chart", &["market_chart"]),
];

const TAAPI_FIELDS: FieldMarkers = &[
    ("SMA", &["/sma", "\"sma\"", "'sma'"]),
    ("RSI", &["/rsi", "\"rsi\"", "'rsi'"]),
    ("Fib", &["fibonacciretracement", "/fib", "\"fib"]),
    ("EMA", &["/ema", "\"ema\"", "'ema'"]),
];

const ORDERLY_FIELDS: FieldMarkers = &[("Klines", &["kline", "candles", "ohlcv"])];

const DATA_SOURCE_RULES: &[Rule<Source, DataSourceNode>] = &[
    Rule {
        name: "coingecko",
        applies: |src| src.contains("coingecko"),
        extract: |src| DataSourceNode::new("ds-coingecko", "CoinGecko", fields(src, COINGECKO_FIELDS)),
    },
    Rule {
        name: "taapi",
        applies: |src| src.uses_taapi(),
        extract: |src| DataSourceNode::new("ds-taapi", "TAAPI.io", fields(src, TAAPI_FIELDS)),
    },
    Rule {
        name: "orderly",
        applies: |src| src.contains("orderly"),
        extract: |src| DataSourceNode::new("ds-orderly", "Orderly Network", fields(src, ORDERLY_FIELDS)),
    },
];

/// Detected sub-fields; a recognised source always shows at least its
/// primary field.
fn fields(src: &Source, markers: FieldMarkers) -> Vec<String> {
    let detected: Vec<String> = markers
        .iter()
        .filter(|(_, needles)| src.contains_any(needles))
        .map(|(label, _)| label.to_string())
        .collect();
    if detected.is_empty() {
        markers
            .first()
            .map(|(label, _)| vec![label.to_string()])
            .unwrap_or_default()
    } else {
        detected
    }
}

pub fn default_source() -> DataSourceNode {
    DataSourceNode::new(
        "ds-default",
        "Exchange API",
        vec!["Price".to_string(), "Volume".to_string()],
    )
}

/// Never empty: code without a known fingerprint gets the generic exchange source.
pub(crate) fn extract_data_sources(src: &Source) -> Vec<DataSourceNode> {
    let sources = all_matches(DATA_SOURCE_RULES, src);
    if sources.is_empty() {
        vec![default_source()]
    } else {
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy_parser::patterns::patterns;

    fn extract(code: &str) -> Vec<DataSourceNode> {
        extract_data_sources(&Source::new(code, patterns().unwrap()))
    }

    #[test]
    fn test_fallback_source() {
        let sources = extract("print('hello')");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "ds-default");
        assert_eq!(sources[0].api, "Exchange API");
        assert_eq!(sources[0].fields, vec!["Price", "Volume"]);
    }

    #[test]
    fn test_coingecko_fields() {
        let sources = extract(
            "url = 'https://api.coingecko.com/api/v3/coins/bitcoin/market_chart'\nvols = data['total_volume']",
        );
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "ds-coingecko");
        assert_eq!(sources[0].fields, vec!["Volume", "Chart"]);
    }

    #[test]
    fn test_multiple_sources_in_fixed_order() {
        let sources = extract(
            "ORDERLY_URL = 'https://api-evm.orderly.org/v1/kline'\nTAAPI = 'https://api.taapi.io/rsi'\nCG = 'coingecko'",
        );
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["ds-coingecko", "ds-taapi", "ds-orderly"]);
        assert_eq!(sources[1].fields, vec!["RSI"]);
        assert_eq!(sources[2].fields, vec!["Klines"]);
        assert_eq!(sources[0].fields, vec!["Price"]);
    }

    #[test]
    fn test_ids_are_stable() {
        let code = "requests.get('https://api.taapi.io/sma')";
        assert_eq!(extract(code), extract(code));
    }
}

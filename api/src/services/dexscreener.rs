use aggregator::TokenMetadataProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::TokenMetadata;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::lenient::number_or_string;

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Option<Vec<TokenPair>>,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    #[serde(rename = "baseToken")]
    base_token: Option<BaseToken>,
    #[serde(rename = "priceUsd", default, deserialize_with = "number_or_string")]
    price_usd: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    fdv: Option<f64>,
    liquidity: Option<UsdAmount>,
    volume: Option<Window24h>,
    #[serde(rename = "priceChange")]
    price_change: Option<Window24h>,
}

#[derive(Debug, Deserialize)]
struct BaseToken {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsdAmount {
    #[serde(default, deserialize_with = "number_or_string")]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Window24h {
    #[serde(default, deserialize_with = "number_or_string")]
    h24: Option<f64>,
}

/// Token metadata from the DexScreener pairs endpoint. The first listed pair
/// is taken as representative.
pub struct DexScreenerClient {
    client: Client,
    api_base: String,
}

impl DexScreenerClient {
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TokenMetadataProvider for DexScreenerClient {
    async fn token_metadata(&self, mint: &str) -> Result<Option<TokenMetadata>> {
        let url = format!("{}/latest/dex/tokens/{}", self.api_base, mint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("dexscreener request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("dexscreener returned status {}", status));
        }

        let body: PairsResponse = response
            .json()
            .await
            .context("failed to decode dexscreener pairs response")?;
        let metadata = metadata_from_pairs(mint, body);
        if metadata.is_none() {
            debug!(mint, "dexscreener has no pairs for token");
        }
        Ok(metadata)
    }
}

fn metadata_from_pairs(mint: &str, body: PairsResponse) -> Option<TokenMetadata> {
    let pair = body.pairs?.into_iter().next()?;
    let fallback = TokenMetadata::placeholder(mint);
    let base = pair.base_token;
    let name = base
        .as_ref()
        .and_then(|b| b.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback.name);
    let symbol = base
        .and_then(|b| b.symbol)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback.symbol);

    Some(TokenMetadata {
        name,
        symbol,
        price_usd: pair.price_usd.unwrap_or(0.0),
        market_cap_usd: pair.fdv.unwrap_or(0.0),
        liquidity_usd: pair.liquidity.and_then(|l| l.usd).unwrap_or(0.0),
        volume_24h_usd: pair.volume.and_then(|v| v.h24).unwrap_or(0.0),
        price_change_24h_pct: pair.price_change.and_then(|p| p.h24).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn parse(raw: &str) -> Option<TokenMetadata> {
        metadata_from_pairs(BONK, serde_json::from_str(raw).expect("fixture json"))
    }

    #[test]
    fn first_pair_becomes_metadata() {
        let metadata = parse(
            r#"{
                "schemaVersion": "1.0.0",
                "pairs": [
                    {
                        "baseToken": {"address": "x", "name": "Bonk", "symbol": "Bonk"},
                        "priceUsd": "0.00002150",
                        "fdv": 1500000000,
                        "liquidity": {"usd": 2500000.5, "base": 1, "quote": 2},
                        "volume": {"h24": "880000", "h6": 1},
                        "priceChange": {"h24": -3.4}
                    },
                    {
                        "baseToken": {"name": "Other", "symbol": "OTH"},
                        "priceUsd": "9.0"
                    }
                ]
            }"#,
        )
        .expect("metadata");

        assert_eq!(metadata.name, "Bonk");
        assert_eq!(metadata.symbol, "Bonk");
        assert_eq!(metadata.price_usd, 0.0000215);
        assert_eq!(metadata.market_cap_usd, 1_500_000_000.0);
        assert_eq!(metadata.liquidity_usd, 2_500_000.5);
        assert_eq!(metadata.volume_24h_usd, 880_000.0);
        assert_eq!(metadata.price_change_24h_pct, -3.4);
    }

    #[test]
    fn missing_pairs_mean_no_record() {
        assert!(parse(r#"{"schemaVersion": "1.0.0", "pairs": null}"#).is_none());
        assert!(parse(r#"{"pairs": []}"#).is_none());
    }

    #[test]
    fn sparse_pair_falls_back_to_placeholder_fields() {
        let metadata = parse(r#"{"pairs": [{"priceUsd": "1.25"}]}"#).expect("metadata");
        assert_eq!(metadata.name, "Unknown Token");
        assert_eq!(metadata.symbol, "DEZX");
        assert_eq!(metadata.price_usd, 1.25);
        assert_eq!(metadata.liquidity_usd, 0.0);
    }
}

use aggregator::{SwapQuoteProvider, NATIVE_MINT, USDC_MINT};
use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::SwapSimulationResult;
use reqwest::Client;
use serde::Deserialize;

use super::lenient::number_or_string;

const USDC_DECIMALS: i32 = 6;
const DEFAULT_DECIMALS: u8 = 9;

const KNOWN_DECIMALS: &[(&str, u8)] = &[
    (USDC_MINT, 6),
    (NATIVE_MINT, 9),
    ("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", 6),
    ("mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So", 9),
    ("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 5),
    ("kinXdEcpDQeHPEuQnqmUgtYykqKGVFq6CeVX5iAHJq6", 5),
    ("DUSTawucrTsGU8hcqRdHDCbuYhCPADMLM2VcCb8VnFnQ", 9),
];

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "outAmount")]
    out_amount: String,
    #[serde(rename = "priceImpactPct", default, deserialize_with = "number_or_string")]
    price_impact_pct: Option<f64>,
    #[serde(rename = "slippageBps")]
    slippage_bps: Option<u32>,
}

/// Sell-side quotes into USDC from the Jupiter aggregator.
pub struct JupiterQuoteClient {
    client: Client,
    api_base: String,
    slippage_bps: u32,
}

impl JupiterQuoteClient {
    pub fn new(client: Client, api_base: impl Into<String>, slippage_bps: u32) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            slippage_bps,
        }
    }
}

#[async_trait]
impl SwapQuoteProvider for JupiterQuoteClient {
    async fn quote(&self, mint: &str, amount: f64) -> Result<SwapSimulationResult> {
        let base_units = to_base_units(amount, token_decimals(mint));
        if base_units == 0 {
            return Err(anyhow::anyhow!("amount {amount} rounds to zero base units"));
        }

        let url = format!("{}/quote", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("inputMint", mint.to_string()),
                ("outputMint", USDC_MINT.to_string()),
                ("amount", base_units.to_string()),
                ("slippageBps", self.slippage_bps.to_string()),
            ])
            .send()
            .await
            .context("jupiter quote request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("jupiter quote returned status {}", status));
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .context("failed to decode jupiter quote response")?;
        quote_to_simulation(quote, self.slippage_bps)
    }
}

pub fn token_decimals(mint: &str) -> u8 {
    KNOWN_DECIMALS
        .iter()
        .find(|(known, _)| *known == mint)
        .map(|(_, decimals)| *decimals)
        .unwrap_or(DEFAULT_DECIMALS)
}

/// UI amount to integer base units, rounded down.
pub fn to_base_units(amount: f64, decimals: u8) -> u64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    (amount * 10f64.powi(decimals as i32)).floor() as u64
}

fn quote_to_simulation(quote: QuoteResponse, requested_bps: u32) -> Result<SwapSimulationResult> {
    let out_units: u64 = quote
        .out_amount
        .trim()
        .parse()
        .with_context(|| format!("invalid jupiter outAmount {:?}", quote.out_amount))?;
    Ok(SwapSimulationResult {
        output_usd_amount: out_units as f64 / 10f64.powi(USDC_DECIMALS),
        price_impact_pct: quote.price_impact_pct.unwrap_or(0.0),
        slippage_bps: quote.slippage_bps.unwrap_or(requested_bps),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_table_defaults_to_nine() {
        assert_eq!(token_decimals(USDC_MINT), 6);
        assert_eq!(
            token_decimals("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
            5
        );
        assert_eq!(token_decimals("SomeUnlistedMint1111111111111111111111111111"), 9);
    }

    #[test]
    fn base_units_are_floored() {
        assert_eq!(to_base_units(1.5, 9), 1_500_000_000);
        assert_eq!(to_base_units(0.000019, 5), 1);
        assert_eq!(to_base_units(0.000009, 5), 0);
        assert_eq!(to_base_units(f64::NAN, 9), 0);
    }

    #[test]
    fn out_amount_is_read_as_usdc() {
        let quote: QuoteResponse = serde_json::from_str(
            r#"{"outAmount": "248000000", "priceImpactPct": "0.0123", "slippageBps": 50}"#,
        )
        .expect("fixture json");
        let simulation = quote_to_simulation(quote, 50).expect("simulation");
        assert_eq!(simulation.output_usd_amount, 248.0);
        assert_eq!(simulation.price_impact_pct, 0.0123);
        assert_eq!(simulation.slippage_bps, 50);
    }

    #[test]
    fn numeric_price_impact_and_missing_slippage() {
        let quote: QuoteResponse =
            serde_json::from_str(r#"{"outAmount": "1000000", "priceImpactPct": 0.5}"#)
                .expect("fixture json");
        let simulation = quote_to_simulation(quote, 75).expect("simulation");
        assert_eq!(simulation.output_usd_amount, 1.0);
        assert_eq!(simulation.price_impact_pct, 0.5);
        assert_eq!(simulation.slippage_bps, 75);
    }
}

//! Production adapter that talks to Pionex's REST API.
//! Implements the `ExchangeApi` trait consumed by the orchestration core.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::services::pionex::api::{
    AccountBalance, AssetBalance, ExchangeApi, Order, RawKline, Side, Ticker,
};
use crate::services::pionex::auth;
use crate::utils::errors::ApiError;

const BASE_URL: &str = "https://api.pionex.com";

pub struct PionexClient {
    http: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

/// Every Pionex payload carries a `result` flag; `false` plus `code` and
/// `message` is the structured error marker.
#[derive(Debug, Deserialize)]
struct PionexResponse<T> {
    result: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> PionexResponse<T> {
    fn into_data(self) -> Result<T, ApiError> {
        if !self.result {
            return Err(ApiError::Exchange {
                code: self.code.unwrap_or_else(|| "UNKNOWN".into()),
                message: self.message.unwrap_or_else(|| "request rejected".into()),
            });
        }
        self.data
            .ok_or_else(|| ApiError::Other("exchange response missing data".into()))
    }
}

#[derive(Debug, Deserialize)]
struct BalancesData {
    balances: Vec<RawBalance>,
}

#[derive(Debug, Deserialize)]
struct RawBalance {
    coin: String,
    free: String,
    frozen: String,
}

#[derive(Debug, Deserialize)]
struct TickersData {
    tickers: Vec<RawTicker>,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    symbol: String,
    close: String,
}

#[derive(Debug, Deserialize)]
struct KlinesData {
    klines: Vec<RawKline>,
}

/// The exchange quotes every decimal as a string; a string that does not
/// parse means the payload cannot be trusted, so the whole call fails
/// rather than feeding a default into downstream arithmetic.
fn parse_decimal(field: &str, value: &str) -> Result<f64, ApiError> {
    value
        .parse::<f64>()
        .map_err(|_| ApiError::Other(format!("exchange sent unparseable {field}: {value:?}")))
}

impl PionexClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: settings.pionex_api_key.clone(),
            api_secret: settings.pionex_api_secret.clone(),
            base_url: BASE_URL.to_string(),
        })
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = if params.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, auth::sorted_query(params))
        };
        let resp: PionexResponse<T> = self.http.get(&url).send().await?.json().await?;
        resp.into_data()
    }

    async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut params = params.to_vec();
        params.push(("timestamp", auth::current_timestamp()));
        let query = auth::sorted_query(&params);
        let path_with_query = format!("{}?{}", path, query);
        let sign = auth::sign_rest(&self.api_secret, "GET", &path_with_query, "");

        let resp: PionexResponse<T> = self
            .http
            .get(format!("{}{}", self.base_url, path_with_query))
            .header("PIONEX-KEY", &self.api_key)
            .header("PIONEX-SIGNATURE", sign)
            .send()
            .await?
            .json()
            .await?;
        resp.into_data()
    }

    async fn post_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ApiError> {
        let params = [("timestamp", auth::current_timestamp())];
        let query = auth::sorted_query(&params);
        let path_with_query = format!("{}?{}", path, query);
        let body_str = serde_json::to_string(body)?;
        let sign = auth::sign_rest(&self.api_secret, "POST", &path_with_query, &body_str);

        let resp: PionexResponse<T> = self
            .http
            .post(format!("{}{}", self.base_url, path_with_query))
            .header("PIONEX-KEY", &self.api_key)
            .header("PIONEX-SIGNATURE", sign)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        resp.into_data()
    }

    async fn fetch_balances(&self) -> Result<Vec<AssetBalance>, ApiError> {
        let data: BalancesData = self.get_signed("/api/v1/account/balances", &[]).await?;
        let mut balances = Vec::with_capacity(data.balances.len());
        for b in data.balances {
            balances.push(AssetBalance {
                free: parse_decimal("balance.free", &b.free)?,
                frozen: parse_decimal("balance.frozen", &b.frozen)?,
                currency: b.coin,
            });
        }
        Ok(balances)
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: &str,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<Order, ApiError> {
        let mut body = json!({
            "symbol": symbol,
            "side": side.to_string(),
            "type": order_type,
            "size": quantity.to_string(),
            "clientOrderId": Uuid::new_v4().to_string(),
        });
        if let Some(p) = price {
            body["price"] = json!(p.to_string());
        }

        log::info!("placing {order_type} {side} {quantity} {symbol} @ {price:?}");
        self.post_signed("/api/v1/trade/order", &body).await
    }
}

#[async_trait]
impl ExchangeApi for PionexClient {
    async fn get_account_balance(&self) -> Result<AccountBalance, ApiError> {
        Ok(AccountBalance::from_balances(self.fetch_balances().await?))
    }

    async fn get_positions(&self) -> Result<Vec<AssetBalance>, ApiError> {
        self.fetch_balances().await
    }

    async fn get_ticker_price(&self, symbol: &str) -> Result<Ticker, ApiError> {
        let data: TickersData = self
            .get_public("/api/v1/market/tickers", &[("symbol", symbol.to_string())])
            .await?;
        let t = data
            .tickers
            .into_iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| ApiError::Other(format!("no ticker returned for {symbol}")))?;
        Ok(Ticker {
            price: parse_decimal("ticker.close", &t.close)?,
            symbol: t.symbol,
        })
    }

    async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<RawKline>, ApiError> {
        let data: KlinesData = self
            .get_public(
                "/api/v1/market/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(data.klines)
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
    ) -> Result<Order, ApiError> {
        self.place_order(symbol, side, "MARKET", quantity, None).await
    }

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        price: f64,
    ) -> Result<Order, ApiError> {
        self.place_order(symbol, side, "LIMIT", quantity, Some(price)).await
    }
}

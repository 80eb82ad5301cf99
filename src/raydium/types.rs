use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumComputeParams {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: String,
    pub slippage_bps: u16,
    pub tx_version: &'static str,
}

/// Envelope shared by every Raydium trade API response.
#[derive(Debug, Clone, Deserialize)]
pub struct RaydiumEnvelope<T> {
    #[serde(default)]
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumComputeData {
    pub input_mint: String,
    pub input_amount: String,
    pub output_mint: String,
    pub output_amount: String,
    #[serde(default)]
    pub other_amount_threshold: Option<String>,
    pub slippage_bps: u16,
    #[serde(default)]
    pub price_impact_pct: Option<f64>,
    #[serde(default)]
    pub route_plan: Vec<RaydiumRoutePlanStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumRoutePlanStep {
    pub pool_id: String,
    pub input_mint: String,
    pub output_mint: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumTransactionRequest {
    pub compute_unit_price_micro_lamports: String,
    pub swap_response: serde_json::Value,
    pub tx_version: &'static str,
    pub wallet: String,
    pub wrap_sol: bool,
    pub unwrap_sol: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_account: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaydiumTransactionData {
    pub transaction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaydiumPriorityFeeData {
    pub default: RaydiumPriorityFeeTiers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaydiumPriorityFeeTiers {
    pub vh: u64,
    pub h: u64,
    pub m: u64,
}

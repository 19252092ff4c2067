//! Simulation routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::NaiveDate;
use parcela_core::price_begin::AmortizationRow;
use parcela_core::rates::parse_percentage;
use parcela_core::schedule::{
    BalloonPeriod, BalloonScheduling, CashFlowItem, KnownValue, KnownValues, Modality,
    SpecialOverrides,
};
use parcela_core::simulation::{
    PriceBeginOutcome, PriceBeginRequest, ScheduleOutcome, ScheduleRequest,
};
use parcela_shared::AppError;
use parcela_shared::types::{format_dmy, parse_date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;

/// Creates the simulation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/simulations/schedule", post(run_schedule))
        .route("/simulations/price-begin", post(run_price_begin))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a schedule simulation.
#[derive(Debug, Deserialize)]
pub struct ScheduleSimulationRequest {
    /// Property price (decimal string).
    pub total_price: String,
    /// Down payment (decimal string).
    #[serde(default)]
    pub down_payment: Option<String>,
    /// Monthly rate in percent, e.g. "0.89" or "0,89%".
    pub monthly_rate: String,
    /// Contract start date, `dd/mm/YYYY` or ISO.
    pub start_date: String,
    /// Installment count, or balloon count for balloon-only modalities.
    pub payment_count: u32,
    /// One of `monthly`, `monthly_with_balloons`, `annual_balloons`, `semiannual_balloons`.
    pub modality: String,
    /// `annual` or `semiannual`; required for `monthly_with_balloons`.
    #[serde(default)]
    pub balloon_period: Option<String>,
    /// `default`, `from_first_due_date` or `custom_months`.
    #[serde(default)]
    pub balloon_scheduling: Option<String>,
    /// Installment carrying the first balloon, for `from_first_due_date`.
    #[serde(default)]
    pub first_balloon_month: Option<u32>,
    /// Installments carrying balloons, for `custom_months`.
    #[serde(default)]
    pub balloon_months: Option<Vec<u32>>,
    /// Known installment value; solved when absent.
    #[serde(default)]
    pub installment_value: Option<String>,
    /// Known balloon value; solved when absent.
    #[serde(default)]
    pub balloon_value: Option<String>,
    /// Balloon ordinal to fixed value.
    #[serde(default)]
    pub special_balloons: Option<BTreeMap<u32, String>>,
}

/// Request body for a Price-Begin simulation.
#[derive(Debug, Deserialize)]
pub struct PriceBeginSimulationRequest {
    /// Property price (decimal string).
    pub total_price: String,
    /// Down payment (decimal string).
    #[serde(default)]
    pub down_payment: Option<String>,
    /// Contract date, `dd/mm/YYYY` or ISO.
    pub start_date: String,
    /// Number of payments.
    pub installment_count: u32,
    /// Monthly rate in percent; tiered by count when absent.
    #[serde(default)]
    pub monthly_rate: Option<String>,
}

/// Response for a schedule simulation.
#[derive(Debug, Serialize)]
pub struct ScheduleSimulationResponse {
    /// Unique identifier for this simulation run.
    pub simulation_id: Uuid,
    /// Hash of simulation parameters for caching.
    pub parameters_hash: String,
    /// Whether this result was returned from cache.
    pub cached: bool,
    /// Financed principal.
    pub principal: String,
    /// Monthly rate applied, in percent.
    pub monthly_rate: String,
    /// Derived rates.
    pub rates: RatesResponse,
    /// Day-count convention used.
    pub day_count: String,
    /// Uniform installment value.
    pub installment_value: Option<String>,
    /// Uniform balloon value.
    pub balloon_value: Option<String>,
    /// Whether a value was solved.
    pub solved: bool,
    /// Consistency warnings.
    pub warnings: Vec<String>,
    /// Dated payments.
    pub items: Vec<CashFlowItemResponse>,
    /// Total row.
    pub total: TotalResponse,
}

/// Derived rates as fractions.
#[derive(Debug, Serialize)]
pub struct RatesResponse {
    /// Monthly rate.
    pub monthly: String,
    /// Effective annual rate.
    pub annual: String,
    /// Effective semiannual rate.
    pub semiannual: String,
    /// Daily compound rate.
    pub daily: String,
}

/// One dated payment.
#[derive(Debug, Serialize)]
pub struct CashFlowItemResponse {
    /// Display label.
    pub label: String,
    /// `installment` or `balloon`.
    pub kind: String,
    /// Due date (`dd/mm/YYYY`).
    pub due_date: String,
    /// Days from contract start.
    pub elapsed_days: i64,
    /// Nominal value.
    pub nominal: String,
    /// Present value.
    pub present_value: String,
    /// Discount.
    pub discount: String,
    /// Whether the value was fixed by a special override.
    pub special: bool,
}

/// Total row.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    /// Sum of nominal values.
    pub nominal: String,
    /// Sum of present values.
    pub present_value: String,
    /// Aggregate discount.
    pub discount: String,
}

/// Response for a Price-Begin simulation.
#[derive(Debug, Serialize)]
pub struct PriceBeginSimulationResponse {
    /// Unique identifier for this simulation run.
    pub simulation_id: Uuid,
    /// Hash of simulation parameters for caching.
    pub parameters_hash: String,
    /// Whether this result was returned from cache.
    pub cached: bool,
    /// Financed principal.
    pub principal: String,
    /// Monthly rate applied, in percent.
    pub monthly_rate: String,
    /// Fixed payment.
    pub fixed_payment: String,
    /// Sum of payments.
    pub total_paid: String,
    /// Sum of interest.
    pub total_interest: String,
    /// Amortization rows.
    pub rows: Vec<AmortizationRowResponse>,
}

/// One amortization row.
#[derive(Debug, Serialize)]
pub struct AmortizationRowResponse {
    /// Payment number.
    pub number: u32,
    /// Display label.
    pub label: String,
    /// Due date (`dd/mm/YYYY`).
    pub due_date: String,
    /// Amount paid.
    pub payment: String,
    /// Interest portion.
    pub interest: String,
    /// Principal portion.
    pub amortization: String,
    /// Balance after payment.
    pub balance: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a Decimal as a string with 2 decimal places.
fn format_money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

fn bad_request(error: &str, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": error,
            "message": message
        })),
    )
        .into_response()
}

/// Maps an application error to a JSON error response.
fn error_response(e: AppError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "Simulation failed");
    }
    let message = match &e {
        AppError::NotFound(m)
        | AppError::Validation(m)
        | AppError::BusinessRule(m)
        | AppError::Config(m)
        | AppError::Internal(m) => m.clone(),
    };
    (
        status,
        Json(json!({
            "error": e.error_code().to_lowercase(),
            "message": message
        })),
    )
        .into_response()
}

/// Parses a decimal amount, accepting a comma as decimal separator.
fn parse_amount(field: &str, raw: &str) -> Result<Decimal, Response> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|_| bad_request("invalid_amount", format!("{field} is not a valid amount: {raw}")))
}

fn parse_optional_amount(field: &str, raw: Option<&str>) -> Result<Option<Decimal>, Response> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_amount(field, value).map(Some),
    }
}

fn parse_rate(raw: &str) -> Result<Decimal, Response> {
    parse_percentage(raw)
        .ok_or_else(|| bad_request("invalid_rate", format!("Monthly rate is not a valid percentage: {raw}")))
}

fn parse_start_date(raw: &str) -> Result<NaiveDate, Response> {
    parse_date(raw.trim())
        .map_err(|_| bad_request("invalid_date", format!("Start date must be dd/mm/YYYY or YYYY-MM-DD: {raw}")))
}

fn parse_modality(request: &ScheduleSimulationRequest) -> Result<Modality, Response> {
    match request.modality.as_str() {
        "monthly" => Ok(Modality::Monthly),
        "annual_balloons" => Ok(Modality::AnnualBalloons),
        "semiannual_balloons" => Ok(Modality::SemiannualBalloons),
        "monthly_with_balloons" => {
            let period = match request.balloon_period.as_deref() {
                Some("annual") => BalloonPeriod::Annual,
                Some("semiannual") => BalloonPeriod::Semiannual,
                other => {
                    return Err(bad_request(
                        "invalid_balloon_period",
                        format!("Balloon period must be annual or semiannual, got {other:?}"),
                    ));
                }
            };
            let scheduling = match request.balloon_scheduling.as_deref() {
                None | Some("default") => BalloonScheduling::DefaultPeriodic,
                Some("from_first_due_date") => BalloonScheduling::FromFirstDueDate {
                    first_month: request.first_balloon_month.ok_or_else(|| {
                        bad_request(
                            "missing_first_balloon_month",
                            "first_balloon_month is required for from_first_due_date".to_string(),
                        )
                    })?,
                },
                Some("custom_months") => BalloonScheduling::CustomMonths {
                    months: request.balloon_months.clone().unwrap_or_default(),
                },
                Some(other) => {
                    return Err(bad_request(
                        "invalid_balloon_scheduling",
                        format!("Unknown balloon scheduling: {other}"),
                    ));
                }
            };
            Ok(Modality::MonthlyWithBalloons { period, scheduling })
        }
        other => Err(bad_request(
            "invalid_modality",
            format!("Unknown modality: {other}"),
        )),
    }
}

fn to_schedule_request(request: &ScheduleSimulationRequest) -> Result<ScheduleRequest, Response> {
    let mut special_balloons = SpecialOverrides::new();
    for (ordinal, raw) in request.special_balloons.iter().flatten() {
        let value = parse_amount(&format!("Special balloon {ordinal}"), raw)?;
        special_balloons.insert(*ordinal, value);
    }

    Ok(ScheduleRequest {
        total_price: parse_amount("Total price", &request.total_price)?,
        down_payment: parse_optional_amount("Down payment", request.down_payment.as_deref())?
            .unwrap_or(Decimal::ZERO),
        monthly_rate: parse_rate(&request.monthly_rate)?,
        start_date: parse_start_date(&request.start_date)?,
        payment_count: request.payment_count,
        modality: parse_modality(request)?,
        known: KnownValues {
            installment: KnownValue::from(parse_optional_amount(
                "Installment value",
                request.installment_value.as_deref(),
            )?),
            balloon: KnownValue::from(parse_optional_amount(
                "Balloon value",
                request.balloon_value.as_deref(),
            )?),
        },
        special_balloons,
    })
}

fn to_price_begin_request(request: &PriceBeginSimulationRequest) -> Result<PriceBeginRequest, Response> {
    Ok(PriceBeginRequest {
        total_price: parse_amount("Total price", &request.total_price)?,
        down_payment: parse_optional_amount("Down payment", request.down_payment.as_deref())?
            .unwrap_or(Decimal::ZERO),
        start_date: parse_start_date(&request.start_date)?,
        installment_count: request.installment_count,
        monthly_rate: request.monthly_rate.as_deref().map(parse_rate).transpose()?,
    })
}

fn item_response(item: &CashFlowItem) -> CashFlowItemResponse {
    CashFlowItemResponse {
        label: item.label.clone(),
        kind: match item.kind {
            parcela_core::schedule::CashFlowKind::Installment => "installment".to_string(),
            parcela_core::schedule::CashFlowKind::Balloon => "balloon".to_string(),
        },
        due_date: format_dmy(item.due_date),
        elapsed_days: item.elapsed_days,
        nominal: format_money(item.nominal),
        present_value: format_money(item.present_value),
        discount: format_money(item.discount),
        special: item.special,
    }
}

fn schedule_response(outcome: ScheduleOutcome) -> ScheduleSimulationResponse {
    let schedule = outcome.schedule;
    ScheduleSimulationResponse {
        simulation_id: outcome.simulation_id,
        parameters_hash: outcome.parameters_hash,
        cached: outcome.cached,
        principal: format_money(schedule.principal),
        monthly_rate: schedule.monthly_rate.normalize().to_string(),
        rates: RatesResponse {
            monthly: outcome.rates.monthly.normalize().to_string(),
            annual: outcome.rates.annual.normalize().to_string(),
            semiannual: outcome.rates.semiannual.normalize().to_string(),
            daily: outcome.rates.daily.normalize().to_string(),
        },
        day_count: schedule.day_count.to_string(),
        installment_value: schedule.installment_value.map(format_money),
        balloon_value: schedule.balloon_value.map(format_money),
        solved: schedule.solved,
        items: schedule.items.iter().map(item_response).collect(),
        total: TotalResponse {
            nominal: format_money(schedule.total.nominal),
            present_value: format_money(schedule.total.present_value),
            discount: format_money(schedule.total.discount),
        },
        warnings: schedule.warnings,
    }
}

fn row_response(row: &AmortizationRow) -> AmortizationRowResponse {
    AmortizationRowResponse {
        number: row.number,
        label: row.label.clone(),
        due_date: format_dmy(row.due_date),
        payment: format_money(row.payment),
        interest: format_money(row.interest),
        amortization: format_money(row.amortization),
        balance: format_money(row.balance),
    }
}

fn price_begin_response(outcome: PriceBeginOutcome) -> PriceBeginSimulationResponse {
    let table = outcome.table;
    PriceBeginSimulationResponse {
        simulation_id: outcome.simulation_id,
        parameters_hash: outcome.parameters_hash,
        cached: outcome.cached,
        principal: format_money(table.principal),
        monthly_rate: table.monthly_rate.normalize().to_string(),
        fixed_payment: format_money(table.fixed_payment),
        total_paid: format_money(table.total_paid),
        total_interest: format_money(table.total_interest),
        rows: table.rows.iter().map(row_response).collect(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /simulations/schedule
async fn run_schedule(
    State(state): State<AppState>,
    Json(request): Json<ScheduleSimulationRequest>,
) -> Response {
    let request = match to_schedule_request(&request) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.simulations.run_schedule_cached(&request) {
        Ok(outcome) => {
            info!(
                simulation_id = %outcome.simulation_id,
                cached = outcome.cached,
                "Schedule simulation served"
            );
            (StatusCode::OK, Json(schedule_response(outcome))).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// POST /simulations/price-begin
async fn run_price_begin(
    State(state): State<AppState>,
    Json(request): Json<PriceBeginSimulationRequest>,
) -> Response {
    let request = match to_price_begin_request(&request) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.simulations.run_price_begin_cached(&request) {
        Ok(outcome) => {
            info!(
                simulation_id = %outcome.simulation_id,
                cached = outcome.cached,
                "Price-Begin simulation served"
            );
            (StatusCode::OK, Json(price_begin_response(outcome))).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("1000", dec!(1000))]
    #[case(" 1234,56 ", dec!(1234.56))]
    #[case("0.01", dec!(0.01))]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount("x", raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let response = parse_amount("Total price", "abc").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_format_money_pads_cents() {
        assert_eq!(format_money(dec!(25000)), "25000.00");
        assert_eq!(format_money(dec!(0.5)), "0.50");
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use parcela_shared::AppConfig;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        routes().with_state(state)
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_schedule_interest_free_monthly() {
        let state = AppState::from_config(AppConfig::default());
        let (status, json) = post_json(
            app(state),
            "/simulations/schedule",
            json!({
                "total_price": "120000",
                "down_payment": "20000",
                "monthly_rate": "0,89%",
                "start_date": "15/01/2025",
                "payment_count": 4,
                "modality": "monthly"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["principal"], "100000.00");
        assert_eq!(json["monthly_rate"], "0");
        assert_eq!(json["installment_value"], "25000.00");
        assert_eq!(json["items"].as_array().unwrap().len(), 4);
        assert_eq!(json["items"][0]["due_date"], "15/02/2025");
        assert_eq!(json["total"]["present_value"], "100000.00");
        assert_eq!(json["cached"], false);
    }

    #[tokio::test]
    async fn test_schedule_second_call_is_cached() {
        let state = AppState::from_config(AppConfig::default());
        let body = json!({
            "total_price": "200000",
            "down_payment": "0",
            "monthly_rate": "0.89",
            "start_date": "2025-01-15",
            "payment_count": 24,
            "modality": "monthly_with_balloons",
            "balloon_period": "annual",
            "installment_value": "5000",
            "special_balloons": { "1": "50000" }
        });

        let (status, first) = post_json(app(state.clone()), "/simulations/schedule", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["cached"], false);
        let balloons: Vec<&serde_json::Value> = first["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|i| i["kind"] == "balloon")
            .collect();
        assert_eq!(balloons.len(), 2);
        assert_eq!(balloons[0]["nominal"], "50000.00");
        assert_eq!(balloons[0]["special"], true);

        let (_, second) = post_json(app(state), "/simulations/schedule", body).await;
        assert_eq!(second["cached"], true);
        assert_eq!(first["parameters_hash"], second["parameters_hash"]);
    }

    #[tokio::test]
    async fn test_schedule_underdetermined_is_unprocessable() {
        let state = AppState::from_config(AppConfig::default());
        let (status, json) = post_json(
            app(state),
            "/simulations/schedule",
            json!({
                "total_price": "120000",
                "monthly_rate": "0.89",
                "start_date": "15/01/2025",
                "payment_count": 24,
                "modality": "monthly_with_balloons",
                "balloon_period": "semiannual"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "business_rule_violation");
    }

    #[tokio::test]
    async fn test_schedule_down_payment_at_price_is_rejected() {
        let state = AppState::from_config(AppConfig::default());
        let (status, json) = post_json(
            app(state),
            "/simulations/schedule",
            json!({
                "total_price": "100000",
                "down_payment": "100000",
                "monthly_rate": "0.89",
                "start_date": "15/01/2025",
                "payment_count": 12,
                "modality": "monthly"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[rstest::rstest]
    #[case(json!({"modality": "weekly"}), "invalid_modality")]
    #[case(json!({"modality": "monthly_with_balloons"}), "invalid_balloon_period")]
    #[case(json!({"monthly_rate": "abc"}), "invalid_rate")]
    #[case(json!({"start_date": "31/02/2025"}), "invalid_date")]
    #[case(json!({"payment_count": u32::MAX}), "validation_error")]
    #[tokio::test]
    async fn test_schedule_rejects_malformed_fields(#[case] patch: serde_json::Value, #[case] expected: &str) {
        let mut body = json!({
            "total_price": "100000",
            "monthly_rate": "0.89",
            "start_date": "15/01/2025",
            "payment_count": 12,
            "modality": "monthly"
        });
        for (key, value) in patch.as_object().unwrap() {
            body[key] = value.clone();
        }

        let state = AppState::from_config(AppConfig::default());
        let (status, json) = post_json(app(state), "/simulations/schedule", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], expected);
    }

    #[tokio::test]
    async fn test_price_begin_table() {
        let state = AppState::from_config(AppConfig::default());
        let (status, json) = post_json(
            app(state),
            "/simulations/price-begin",
            json!({
                "total_price": "47000",
                "down_payment": "10000",
                "start_date": "31/03/2025",
                "installment_count": 12,
                "monthly_rate": "0.395"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fixed_payment"], "3150.63");
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0]["interest"], "0.00");
        assert_eq!(rows[0]["due_date"], "31/03/2025");
        assert_eq!(rows[11]["balance"], "0.00");
        assert_eq!(json["total_interest"], "807.49");
    }

    #[tokio::test]
    async fn test_price_begin_too_many_installments() {
        let state = AppState::from_config(AppConfig::default());
        let (status, json) = post_json(
            app(state),
            "/simulations/price-begin",
            json!({
                "total_price": "47000",
                "start_date": "31/03/2025",
                "installment_count": 181
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use pricepilot_core::error::PricingError;
use pricepilot_core::traits::{ForecastStore, InventoryStore, RecommendationStore};
use pricepilot_core::types::{
    Recommendation, RecommendationFilter, RecommendationKind, RecommendationStatus,
};
use pricepilot_core::CancelToken;
use pricepilot_orchestrator::Pipeline;
use pricepilot_sync::SyncResult;

/// One catalog row joined with its latest forecast and pending price
/// recommendation, shaped for the dashboard.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub sku: String,
    pub region: String,
    pub name: String,
    pub category: String,
    pub current_price: Decimal,
    pub cost: Decimal,
    pub inventory: Decimal,
    pub recommended_price: Decimal,
    pub recommendation_reason: String,
    pub latest_demand_factor: Decimal,
    pub latest_competitor_price: Option<Decimal>,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductView>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct RunResponse {
    pub forecasted: usize,
    pub forecast_failures: usize,
    pub recommended: usize,
    pub recommendation_failures: usize,
    pub promos_created: usize,
    pub synced: usize,
}

/// Lists the catalog joined with the latest forecast and the newest pending
/// price recommendation per SKU/region.
///
/// # Errors
/// Returns a mapped status code if a store read fails.
pub async fn list_products(
    State(pipeline): State<Arc<Pipeline>>,
) -> Result<Json<ProductsResponse>, StatusCode> {
    let store = pipeline.store();
    let inventory = store.scan_inventory().await.map_err(status_for)?;
    let pending = store
        .scan_recommendations(
            &RecommendationFilter::kind(RecommendationKind::PriceAdjustment)
                .with_status(RecommendationStatus::PendingReview),
        )
        .await
        .map_err(status_for)?;

    let mut products = Vec::with_capacity(inventory.len());
    let mut recommendations = Vec::new();

    for record in inventory {
        let forecast = store.latest_forecast(&record.key).await.map_err(status_for)?;
        // Scan order is newest-first, so the first match is the latest.
        let latest_pending = pending.iter().find(|r| r.key == record.key);

        let (recommended_price, recommendation_reason) = match latest_pending {
            Some(rec) => (rec.recommended_price, rec.reason.clone()),
            None => (record.current_price, "No new recommendation.".to_string()),
        };
        if let Some(rec) = latest_pending {
            recommendations.push(rec.clone());
        }

        products.push(ProductView {
            sku: record.key.sku,
            region: record.key.region,
            name: record.name,
            category: record.category,
            current_price: record.current_price,
            cost: record.cost,
            inventory: record.stock_level,
            recommended_price,
            recommendation_reason,
            latest_demand_factor: forecast
                .as_ref()
                .map_or(Decimal::ONE, |f| f.demand_factor),
            latest_competitor_price: forecast.and_then(|f| f.competitor_price_snapshot),
        });
    }

    Ok(Json(ProductsResponse {
        products,
        recommendations,
    }))
}

/// Runs the full pipeline once and returns stage counts.
///
/// # Errors
/// Returns a mapped status code if a stage cannot scan its primary input set.
pub async fn trigger_run(
    State(pipeline): State<Arc<Pipeline>>,
) -> Result<Json<RunResponse>, StatusCode> {
    let cancel = CancelToken::new();
    let report = pipeline.run_once(&cancel).await.map_err(status_for)?;

    Ok(Json(RunResponse {
        forecasted: report.forecast.forecasted(),
        forecast_failures: report.forecast.failed(),
        recommended: report.recommendation.recommended(),
        recommendation_failures: report.recommendation.failed(),
        promos_created: report.recommendation.promos_created(),
        synced: report.sync.len(),
    }))
}

/// Approves a recommendation and immediately syncs it.
///
/// # Errors
/// Returns `404` for an unknown id, `409` if the status cannot advance to
/// `Applied`, and mapped store/external codes otherwise.
pub async fn apply_recommendation(
    State(pipeline): State<Arc<Pipeline>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncResult>, StatusCode> {
    let store = pipeline.store();
    store
        .get_recommendation(id)
        .await
        .map_err(status_for)?
        .ok_or(StatusCode::NOT_FOUND)?;

    store
        .update_status(id, RecommendationStatus::Applied)
        .await
        .map_err(status_for)?;

    let applied = store
        .get_recommendation(id)
        .await
        .map_err(status_for)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let result = pipeline.sync_engine().sync_one(&applied).await;
    Ok(Json(result))
}

fn status_for(err: PricingError) -> StatusCode {
    tracing::warn!(%err, "request failed");
    match err {
        PricingError::NotFound(_) => StatusCode::NOT_FOUND,
        PricingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PricingError::InvalidTransition { .. } => StatusCode::CONFLICT,
        PricingError::ExternalCallFailed(_) | PricingError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
        PricingError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricepilot_core::config::AppConfig;
    use pricepilot_core::types::{SkuRegion, SyncOutcome};
    use pricepilot_orchestrator::seed_demo_data;
    use rust_decimal_macros::dec;

    fn pipeline() -> Arc<Pipeline> {
        Arc::new(Pipeline::from_config(&AppConfig::default()).unwrap())
    }

    // ==================== Error Mapping Tests ====================

    #[test]
    fn error_mapping_covers_the_taxonomy() {
        assert_eq!(
            status_for(PricingError::not_found("missing")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(PricingError::invalid_input("bad id")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(PricingError::external("refused")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(PricingError::store("poisoned")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(PricingError::InvalidTransition {
                from: RecommendationStatus::Sent,
                to: RecommendationStatus::Applied,
            }),
            StatusCode::CONFLICT
        );
    }

    // ==================== Handler Tests ====================

    #[tokio::test]
    async fn list_products_joins_seeded_catalog() {
        let pipeline = pipeline();
        seed_demo_data(&pipeline.store()).await.unwrap();

        let Json(response) = list_products(State(pipeline)).await.unwrap();
        assert_eq!(response.products.len(), 5);
        assert!(response.recommendations.is_empty());

        let tv = response
            .products
            .iter()
            .find(|p| p.sku == "P001")
            .unwrap();
        assert_eq!(tv.current_price, dec!(999.99));
        assert_eq!(tv.recommended_price, tv.current_price);
        assert_eq!(tv.latest_demand_factor, Decimal::ONE);
    }

    #[tokio::test]
    async fn apply_of_unknown_id_is_not_found() {
        let pipeline = pipeline();
        let err = apply_recommendation(State(pipeline), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn apply_of_promotion_syncs_as_skipped() {
        let pipeline = pipeline();
        let store = pipeline.store();

        let rec = Recommendation::promotion(
            SkuRegion::new("P001", "US-EAST-1"),
            RecommendationKind::FlashSale,
            dec!(999.99),
            "tech_enthusiast",
            "Flash sale for tech enthusiasts",
            chrono::Utc::now(),
        );
        let id = rec.id;
        store.put_recommendation(rec).await.unwrap();

        let Json(result) = apply_recommendation(State(pipeline), Path(id))
            .await
            .unwrap();
        assert_eq!(result.outcome, SyncOutcome::Skipped);
    }
}

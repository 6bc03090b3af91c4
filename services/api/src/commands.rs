use crate::infra::{build_estimation_service, parse_date, InMemoryPredictionLog};
use chrono::{Local, NaiveDate};
use clap::Args;
use rent_estimate::config::AppConfig;
use rent_estimate::error::AppError;
use rent_estimate::estimation::{
    HousingType, ModelKey, ModelTable, PredictionRequest, PriceQuote, RentType,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// 연립다세대 (villa) or 오피스텔 (officetel)
    #[arg(long, value_parser = parse_housing_type)]
    pub(crate) housing_type: HousingType,
    /// 전세 (jeonse) or 월세 (wolse)
    #[arg(long, value_parser = parse_rent_type)]
    pub(crate) rent_type: RentType,
    /// Street address, e.g. "서울 광진구 화양동 5-1"
    #[arg(long)]
    pub(crate) address: String,
    /// Exclusive area in square metres
    #[arg(long)]
    pub(crate) area: f64,
    /// Floor number; basements are negative
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) floor: i32,
    /// Year of construction
    #[arg(long)]
    pub(crate) year_built: i32,
    /// Pricing date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn parse_housing_type(raw: &str) -> Result<HousingType, String> {
    HousingType::parse(raw)
        .ok_or_else(|| format!("unknown housing type '{raw}' (expected 연립다세대 or 오피스텔)"))
}

fn parse_rent_type(raw: &str) -> Result<RentType, String> {
    RentType::parse(raw).ok_or_else(|| format!("unknown rent type '{raw}' (expected 전세 or 월세)"))
}

pub(crate) async fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let EstimateArgs {
        housing_type,
        rent_type,
        address,
        area,
        floor,
        year_built,
        today,
    } = args;

    let config = AppConfig::load()?;
    let journal = Arc::new(InMemoryPredictionLog::default());
    let service = build_estimation_service(&config, journal)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let request = PredictionRequest {
        housing_type,
        rent_type,
        address,
        area,
        floor,
        year_built,
    };
    let quote = service.quote_on(request.clone(), today).await?;

    print!("{}", render_quote(&request, &quote, today));
    Ok(())
}

pub(crate) fn run_models() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let models = ModelTable::from_path(&config.estimation.model_path)?;

    print!(
        "{}",
        render_models(&config.estimation.model_path.display().to_string(), &models.keys())
    );
    Ok(())
}

fn render_quote(request: &PredictionRequest, quote: &PriceQuote, today: NaiveDate) -> String {
    let mut out = format!(
        "{} {} | {} | {:.1}㎡, {}층, {}년 준공 (as of {})\n",
        request.housing_type,
        request.rent_type,
        request.address.trim(),
        request.area,
        request.floor,
        request.year_built,
        today
    );
    match request.rent_type {
        RentType::Jeonse => {
            out.push_str(&format!("- 예상 전세 보증금: {:.2} 만원\n", quote.deposit_pred));
        }
        RentType::Wolse => {
            out.push_str(&format!(
                "- 예상 월세: {:.2} 만원 (보증금 {:.0} 만원 기준)\n",
                quote.monthly_pred, quote.deposit_pred
            ));
        }
    }
    out.push_str(&format!("- estimator: {}\n", quote.source.label()));
    out
}

fn render_models(path: &str, keys: &[ModelKey]) -> String {
    let mut out = format!("{} model(s) in {}\n", keys.len(), path);
    for key in keys {
        out.push_str(&format!("- {}\n", key));
    }
    out
}

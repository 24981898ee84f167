use crate::api::{backend, Mode};
use crate::commands::Out;
use crate::model::{AnalyticsParams, AnalyticsSeries};
use crate::services;
use crate::{Config, Result};

/// Computes the four chart series for the requested period and grouping.
pub async fn analytics(
    config: Config,
    mode: Mode,
    params: AnalyticsParams,
) -> Result<Out<Vec<AnalyticsSeries>>> {
    let backend = backend(&config, mode)?;
    let series = services::compute_analytics(backend.as_ref(), &params).await?;
    let titles: Vec<&str> = series.iter().map(|s| s.title.as_str()).collect();
    let message = format!(
        "{} séries calculadas para o período '{}': {}",
        series.len(),
        params.period.tag(),
        titles.join(", "),
    );
    Ok(Out::new(message, series))
}

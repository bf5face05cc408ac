//! End-to-end strategy run.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::StrategyError;
use crate::observability::record_strategy_run;

use super::data_source::{DataError, PriceDataSource};
use super::forecaster::{attach_forecasts, build_windows, daily_returns};
use super::look_ahead::LookAheadAudit;
use super::merge::merge_signals;
use super::parallel::ForecastExecutor;
use super::report::{DailySignalRecord, PerformanceSummary, StrategyReport};
use super::returns::{
    aggregate_daily_returns, bar_strategy_returns, cumulative_curve, final_cumulative,
};
use super::series::{DailyPrice, DateRange, IntradayBar, build_daily_series};
use super::signals::{SignalSettings, compute_daily_signals, compute_intraday_signals};

/// Parameters of a strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Estimation window for forecasts and realized variance.
    pub window: usize,
    /// Earliest daily row eligible for forecasting. Earlier rows only feed
    /// the trailing statistics.
    pub history_start: Option<NaiveDate>,
    /// Signal parameters.
    pub signals: SignalSettings,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            window: 180,
            history_start: NaiveDate::from_ymd_opt(2020, 1, 1),
            signals: SignalSettings::default(),
        }
    }
}

/// The intraday volatility-premium strategy.
#[derive(Clone)]
pub struct IntradayVolatilityStrategy {
    source: Arc<dyn PriceDataSource>,
    executor: Arc<ForecastExecutor>,
    settings: StrategySettings,
}

impl std::fmt::Debug for IntradayVolatilityStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntradayVolatilityStrategy")
            .field("source", &self.source.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl IntradayVolatilityStrategy {
    /// Create a strategy over a data source and forecast executor.
    #[must_use]
    pub fn new(
        source: Arc<dyn PriceDataSource>,
        executor: Arc<ForecastExecutor>,
        settings: StrategySettings,
    ) -> Self {
        Self {
            source,
            executor,
            settings,
        }
    }

    /// Run settings.
    #[must_use]
    pub const fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    /// Run the backtest over `range`.
    ///
    /// Missing or empty price data yields an empty report. The source is
    /// read once per call.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] if the run cannot complete.
    pub fn run(&self, range: DateRange) -> Result<StrategyReport, StrategyError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("strategy_run", %run_id, start = %range.start, end = %range.end);
        let _guard = span.enter();
        let started = Instant::now();

        let result = self.execute(range);
        let status = match &result {
            Ok(report) if report.is_empty() => "empty",
            Ok(_) => "success",
            Err(_) => "error",
        };
        record_strategy_run(status, started.elapsed());
        result
    }

    fn execute(&self, range: DateRange) -> Result<StrategyReport, StrategyError> {
        if range.start > range.end {
            info!("Start date after end date, nothing to run");
            return Ok(StrategyReport::empty());
        }

        let (prices, bars) = match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    error = %e,
                    "Price data unavailable, returning empty report"
                );
                return Ok(StrategyReport::empty());
            }
        };

        let window = self.settings.window;
        let series = build_daily_series(&prices, window);
        let daily_range = match self.settings.history_start {
            Some(floor) if floor > range.start => DateRange::new(floor, range.end),
            _ => range,
        };
        let daily = daily_range.clip_daily(&series);
        let intraday = range.clip_intraday(&bars);
        info!(daily_rows = daily.len(), intraday_bars = intraday.len(), "Series loaded");

        let returns = daily_returns(&daily);
        let windows = build_windows(&daily, &returns, window);
        let batch = self.executor.run(&windows);
        let forecasted = attach_forecasts(&daily, &batch.forecasts(), window);
        debug!(forecasted_days = forecasted.len(), "Forecasts attached");

        let daily_signals =
            compute_daily_signals(&forecasted, self.settings.signals.premium_std_window);
        let intraday_rows = compute_intraday_signals(&intraday, &self.settings.signals);
        let merged = merge_signals(&daily_signals, &intraday_rows);
        debug!(merged_bars = merged.len(), "Signals merged");

        let bar_returns = bar_strategy_returns(&merged);
        let strategy_returns = aggregate_daily_returns(&merged, &bar_returns);
        let curve = cumulative_curve(&strategy_returns);
        let cumulative_return = final_cumulative(&curve);

        let mut audit = LookAheadAudit::default();
        audit.check_windows(&daily, &windows, window);
        audit.check_daily_signals(&daily_signals);
        audit.check_bar_returns(&merged, &bar_returns);

        let summary = PerformanceSummary::compute(
            &strategy_returns,
            &curve,
            &merged,
            windows.len(),
            batch.coverage(),
            audit.violations.len(),
        );
        info!(
            trading_days = summary.trading_days,
            active_bars = summary.active_bars,
            cumulative_return,
            "Strategy run complete"
        );

        Ok(StrategyReport {
            daily_signals: daily_signals.iter().map(DailySignalRecord::from).collect(),
            strategy_returns,
            cumulative_curve: curve,
            cumulative_return,
            summary,
        })
    }

    fn load(&self) -> Result<(Vec<DailyPrice>, Vec<IntradayBar>), DataError> {
        let prices = self.source.load_daily()?;
        let bars = self.source.load_intraday()?;
        Ok((prices, bars))
    }
}

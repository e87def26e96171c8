//! End-to-end runs of the engines, compositions, labels and premiums.

use approx::assert_relative_eq;
use ndarray::{Array1, Array2};
use rstest::rstest;
use shiraz_eval::{
    Backtest, BacktestConfig, ComposeConfig, FamaMacBeth, InnerMetric, LabelBuilder, LabelSpec,
    MeanStat, PremiumConfig, RankingCadence, SeasonalFilter, compose_all, ols,
};
use shiraz_signals::{Orientation, RankerFactory, momentum::IndustryMomentumRanker};
use shiraz_traits::{
    Bucket, IndustryMembership, LocalDate, MarketData, Panel, SignalKind, Symbol, stats::Ddof,
};
use std::sync::Arc;

const INDUSTRIES: [&str; 3] = ["Banks", "Cement", "Steel"];

fn dates(n: usize) -> Vec<LocalDate> {
    (0..n)
        .map(|i| LocalDate::new(1398 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap())
        .collect()
}

fn symbols(n: usize) -> Vec<Symbol> {
    (0..n).map(|k| format!("S{k:02}")).collect()
}

/// Instruments are assigned to industries round-robin.
fn membership(symbols: &[Symbol]) -> Arc<IndustryMembership> {
    let entries = INDUSTRIES.iter().enumerate().map(|(g, name)| {
        let members = symbols
            .iter()
            .enumerate()
            .filter(|(k, _)| k % INDUSTRIES.len() == g)
            .map(|(_, s)| s.clone())
            .collect();
        (*name, members)
    });
    Arc::new(IndustryMembership::new(entries).unwrap())
}

/// Industry returns as the equal-weighted mean of their constituents.
fn industry_panel(dates: &[LocalDate], returns: &[Vec<f64>]) -> Panel {
    let columns = INDUSTRIES
        .iter()
        .enumerate()
        .map(|(g, name)| {
            let series = (0..dates.len())
                .map(|i| {
                    let members: Vec<f64> = returns
                        .iter()
                        .enumerate()
                        .filter(|(k, _)| k % INDUSTRIES.len() == g)
                        .map(|(_, r)| r[i])
                        .collect();
                    members.iter().sum::<f64>() / members.len() as f64
                })
                .collect();
            (name.to_string(), series)
        })
        .collect();
    Panel::from_columns(dates.to_vec(), columns).unwrap()
}

/// Twelve instruments with varied returns, caps and proximity ratios.
fn varied_market(n: usize) -> (MarketData, RankerFactory) {
    let dates = dates(n);
    let symbols = symbols(12);
    let returns: Vec<Vec<f64>> = (0..symbols.len())
        .map(|k| {
            (0..n)
                .map(|i| (((i * 7 + k * 11) % 13) as f64 - 6.0) / 100.0)
                .collect()
        })
        .collect();
    let caps = (0..symbols.len())
        .map(|k| (0..n).map(|i| 100.0 + 10.0 * k as f64 + i as f64).collect())
        .collect::<Vec<Vec<f64>>>();
    let ratios = (0..symbols.len())
        .map(|k| {
            (0..n)
                .map(|i| 0.5 + ((i * 3 + k * 5) % 11) as f64 / 22.0)
                .collect()
        })
        .collect::<Vec<Vec<f64>>>();

    let panel = |values: &[Vec<f64>]| {
        Panel::from_columns(
            dates.clone(),
            symbols.iter().cloned().zip(values.iter().cloned()).collect(),
        )
        .unwrap()
    };
    let data = MarketData::new(panel(&returns), panel(&caps))
        .unwrap()
        .with_industry_returns(industry_panel(&dates, &returns))
        .unwrap()
        .with_proximity(panel(&ratios))
        .unwrap();
    let factory = RankerFactory::new().with_membership(membership(&symbols));
    (data, factory)
}

/// Six instruments whose return equals their industry's, which is constant
/// per regime: Banks and Cement swap signs at row `switch`, Steel stays 1%.
fn regime_market(n: usize, switch: usize) -> (MarketData, Arc<IndustryMembership>) {
    let dates = dates(n);
    let symbols = symbols(6);
    let industry_return = |g: usize, i: usize| match (g, i < switch) {
        (0, true) | (1, false) => 0.05,
        (0, false) | (1, true) => -0.03,
        _ => 0.01,
    };
    let returns: Vec<Vec<f64>> = (0..symbols.len())
        .map(|k| (0..n).map(|i| industry_return(k % 3, i)).collect())
        .collect();
    let caps: Vec<Vec<f64>> = vec![vec![100.0; n]; symbols.len()];

    let panel = |values: &[Vec<f64>]| {
        Panel::from_columns(
            dates.clone(),
            symbols.iter().cloned().zip(values.iter().cloned()).collect(),
        )
        .unwrap()
    };
    let data = MarketData::new(panel(&returns), panel(&caps))
        .unwrap()
        .with_industry_returns(industry_panel(&dates, &returns))
        .unwrap();
    (data, membership(&symbols))
}

#[rstest]
#[case(1, 0.08)]
#[case(3, 0.24)]
fn test_industry_engine_constant_spread(#[case] holding: usize, #[case] expected: f64) {
    // No switch inside the panel: Banks always win, Cement always lose.
    let (data, membership) = regime_market(24, 100);
    let backtest = Backtest::industry_momentum(
        IndustryMomentumRanker::with_lookback(3, membership),
        holding,
        SeasonalFilter::All,
    );
    let result = backtest.run(&data).unwrap();

    assert_relative_eq!(result.winner.mean, 0.05 * holding as f64, epsilon = 1e-12);
    assert_relative_eq!(result.loser.mean, -0.03 * holding as f64, epsilon = 1e-12);
    assert_relative_eq!(result.spread.mean, expected, epsilon = 1e-12);
    assert!(result.spread.stat.is_nan());
}

#[test]
fn test_cadence_changes_results_across_a_regime_switch() {
    let (data, membership) = regime_market(20, 10);
    let engine = |cadence| {
        Backtest::new(
            Box::new(IndustryMomentumRanker::with_lookback(1, membership.clone())),
            BacktestConfig {
                holding: 1,
                cadence,
                seasonal: SeasonalFilter::All,
            },
        )
    };

    let once = engine(RankingCadence::PerEvaluation).run_series(&data).unwrap();
    let per_offset = engine(RankingCadence::PerHoldingOffset)
        .run_series(&data)
        .unwrap();

    // Evaluation starts at 2J+1 = 3; t = 11 sits at position 8.
    // Ranked at t (window row 10) Cement already leads; ranked at the
    // offset t-2 (window row 8) Banks still leads.
    assert_eq!(once.dates[8], data.dates()[11]);
    assert_relative_eq!(once.spread[8], 0.08, epsilon = 1e-12);
    assert_relative_eq!(per_offset.spread[8], -0.08, epsilon = 1e-12);

    // Far from the switch both cadences agree.
    assert_relative_eq!(once.spread[2], per_offset.spread[2], epsilon = 1e-12);
    assert_relative_eq!(once.spread[15], per_offset.spread[15], epsilon = 1e-12);
}

#[test]
fn test_label_rows_set_at_most_one_side() {
    let (data, factory) = varied_market(20);
    let spec = LabelSpec::new(2);
    let mut builder = LabelBuilder::new(&data, &factory, spec).unwrap();
    let rows: Vec<usize> = (0..data.n_periods()).collect();
    let panel = builder.panel(data.symbols(), &rows).unwrap();

    // Rows before 2J+1 are unavailable.
    assert_eq!(panel.len(), data.symbols().len() * (20 - 5));
    assert!(builder.row("S00", 4).unwrap().is_none());

    let values = panel.values();
    assert!(values.iter().all(|v| *v == 0.0 || *v == 1.0));

    let columns = panel.columns();
    let position = |name: String| columns.iter().position(|c| *c == name).unwrap();
    for r in 0..panel.len() {
        for kind in SignalKind::ALL {
            for lag in spec.offsets() {
                let high = values[[r, position(format!("{}H{lag}", kind.label_prefix()))]];
                let low = values[[r, position(format!("{}L{lag}", kind.label_prefix()))]];
                assert!(high + low <= 1.0, "row {r} {kind:?} lag {lag}");
            }
        }
    }
}

#[test]
fn test_label_rows_agree_with_rankers() {
    let (data, factory) = varied_market(20);
    let spec = LabelSpec::new(2);
    let mut builder = LabelBuilder::new(&data, &factory, spec).unwrap();
    let names = spec.columns();

    for kind in SignalKind::ALL {
        let ranker = factory.build(kind, spec.lags).unwrap();
        for t in [5, 11, 19] {
            for lag in spec.offsets() {
                let partition = ranker.rank(&data, t - lag).unwrap();
                for symbol in data.symbols() {
                    let row = builder.row(symbol, t).unwrap().unwrap();
                    let high = names
                        .iter()
                        .position(|c| *c == format!("{}H{lag}", kind.label_prefix()))
                        .unwrap();
                    let low = names
                        .iter()
                        .position(|c| *c == format!("{}L{lag}", kind.label_prefix()))
                        .unwrap();
                    let expected = match partition.bucket_of(symbol) {
                        Some(Bucket::Winners) => (1.0, 0.0),
                        Some(Bucket::Losers) => (0.0, 1.0),
                        Some(Bucket::Middles) | None => (0.0, 0.0),
                    };
                    assert_eq!((row[high], row[low]), expected, "{symbol} t={t} lag={lag}");
                }
            }
        }
    }
}

#[test]
fn test_all_nine_compositions() {
    let (data, factory) = varied_market(18);
    let config = ComposeConfig {
        outer_lookback: 2,
        inner_lookback: 2,
        inner_holding: 2,
        window: Some((5, 8)),
    };
    let grids = compose_all(&factory, &data, &config).unwrap();

    assert_eq!(grids.len(), 9);
    let titles: Vec<String> = grids.iter().map(|g| g.title()).collect();
    assert_eq!(titles[0], "JT x JT");
    assert_eq!(titles[5], "MG x FT");
    assert_eq!(titles[6], "FT x JT");

    for grid in &grids {
        assert_eq!(grid.rows.len(), 9);
        assert!(grid.get(Bucket::Middles, InnerMetric::Spread).is_some());
        let df = grid.to_dataframe().unwrap();
        assert_eq!(df.height(), 9);
        assert_eq!(df.width(), 6);
    }
}

fn assert_same(actual: f64, expected: f64, context: &str) {
    if expected.is_nan() {
        assert!(actual.is_nan(), "{context}: expected NaN, got {actual}");
    } else {
        assert_relative_eq!(actual, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_composition_cells_match_restricted_runs() {
    let (data, factory) = varied_market(18);
    let config = ComposeConfig {
        outer_lookback: 2,
        inner_lookback: 2,
        inner_holding: 2,
        window: Some((5, 8)),
    };
    let seasonal_free = data.without_seasonal_month().unwrap();

    for grid in compose_all(&factory, &data, &config).unwrap() {
        let outer = factory.build(grid.outer, 2).unwrap();
        let inner = Backtest::for_ranker(
            factory.build(grid.inner, 2).unwrap(),
            2,
            SeasonalFilter::All,
        );

        for (panel, excluded) in [(&data, false), (&seasonal_free, true)] {
            // cells[bucket][metric] holds one inner mean per outer date.
            let mut cells = vec![vec![Vec::new(); 3]; 3];
            for t in 5..8 {
                let partition = outer.rank(panel, t).unwrap();
                for (b, bucket) in Bucket::ALL.into_iter().enumerate() {
                    let members = partition.bucket(bucket);
                    let result = (!members.is_empty())
                        .then(|| inner.run(&panel.restrict(members).unwrap()).unwrap());
                    let values = result.map_or([f64::NAN; 3], |r| {
                        [r.winner.mean, r.loser.mean, r.spread.mean]
                    });
                    for (m, value) in values.into_iter().enumerate() {
                        cells[b][m].push(value);
                    }
                }
            }

            for (b, bucket) in Bucket::ALL.into_iter().enumerate() {
                for (m, metric) in InnerMetric::ALL.into_iter().enumerate() {
                    let row = grid.get(bucket, metric).unwrap();
                    let cell = if excluded { row.excluding_seasonal } else { row.all };
                    let values = &cells[b][m];
                    let expected = match metric {
                        InnerMetric::Spread => MeanStat::from_series(values, Ddof::Population),
                        InnerMetric::Winner | InnerMetric::Loser => MeanStat::mean_only(values),
                    };
                    let context = format!("{} {bucket} {metric} excluded={excluded}", grid.title());
                    assert_same(cell.mean, expected.mean, &context);
                    assert_same(cell.stat, expected.stat, &context);
                }
            }
        }
    }
}

#[rstest]
#[case(false, "Seasonal month included")]
#[case(true, "Seasonal month excluded")]
fn test_premium_table(#[case] exclude_seasonal: bool, #[case] label: &str) {
    let (data, factory) = varied_market(30);
    let estimator = FamaMacBeth::new(PremiumConfig {
        lags: 1,
        exclude_seasonal,
        ..Default::default()
    });
    let table = estimator.estimate(&data, &factory).unwrap();

    assert_eq!(table.label, label);
    let names: Vec<&str> = table.premiums.iter().map(|p| p.regressor.as_str()).collect();
    assert_eq!(
        names,
        vec!["size", "R_t-1", "JH2", "JL2", "MH2", "ML2", "FHH2", "FHL2", "Intercept"]
    );
    assert_eq!(table.diagnostics.instruments_fitted, 12);
    assert!(table.diagnostics.instruments_skipped.is_empty());
    assert!(table.diagnostics.dates_fitted > 0);
    assert!(table.get("Intercept").unwrap().n_dates > 0);
    assert_eq!(table.to_dataframe().unwrap().height(), 9);
}

#[test]
fn test_premiums_with_label_lag() {
    let (data, factory) = varied_market(30);
    let lagged = FamaMacBeth::new(PremiumConfig {
        lags: 1,
        lag: 2,
        ..Default::default()
    })
    .estimate(&data, &factory)
    .unwrap();
    assert_eq!(lagged.premiums.len(), 9);
    assert_eq!(lagged.diagnostics.instruments_fitted, 12);
}

/// Mean premiums from both regression stages assembled directly from label
/// rows and [`ols`], for a panel without missing values.
fn two_stage_premiums(
    data: &MarketData,
    factory: &RankerFactory,
    lags: usize,
    lag: usize,
) -> Vec<f64> {
    let spec = LabelSpec::new(lags);
    let mut labels = LabelBuilder::new(data, factory, spec).unwrap();
    let width = spec.width() + 3;
    let returns = data.returns().values();
    let caps = data.market_caps().values();
    let n = data.n_periods();

    let loadings: Vec<Vec<f64>> = data
        .symbols()
        .iter()
        .enumerate()
        .map(|(j, symbol)| {
            let y = Array1::from_iter((1..n).map(|r| returns[[r, j]]));
            let mut x = Array2::from_elem((n - 1, width), f64::NAN);
            for prev in 0..n - 1 {
                x[[prev, 0]] = caps[[prev, j]];
                x[[prev, 1]] = returns[[prev, j]];
                x[[prev, width - 1]] = 1.0;
                let row = prev
                    .checked_sub(lag)
                    .and_then(|at| labels.row(symbol, at).unwrap());
                if let Some(row) = row {
                    for (c, v) in row.iter().enumerate() {
                        x[[prev, 2 + c]] = *v;
                    }
                }
            }
            ols(y.view(), x.view()).unwrap().coefficients
        })
        .collect();

    let x = Array2::from_shape_fn((loadings.len(), width), |(j, k)| loadings[j][k]);
    let per_date: Vec<Vec<f64>> = (0..n)
        .map(|t| {
            let fit = ols(returns.row(t), x.view()).unwrap();
            let mut row = fit.coefficients;
            for &k in &fit.rank_deficient {
                row[k] = f64::NAN;
            }
            row
        })
        .collect();

    (0..width)
        .map(|k| {
            let finite: Vec<f64> = per_date
                .iter()
                .map(|r| r[k])
                .filter(|v| v.is_finite())
                .collect();
            finite.iter().sum::<f64>() / finite.len() as f64
        })
        .collect()
}

#[rstest]
#[case(0, Orientation::High)]
#[case(1, Orientation::High)]
#[case(0, Orientation::Low)]
#[case(2, Orientation::Low)]
fn test_premiums_match_two_stage_regressions(
    #[case] lag: usize,
    #[case] orientation: Orientation,
) {
    let (data, factory) = varied_market(30);
    let table = FamaMacBeth::new(PremiumConfig {
        lags: 1,
        lag,
        orientation,
        ..Default::default()
    })
    .estimate(&data, &factory)
    .unwrap();
    let expected = two_stage_premiums(&data, &factory.with_orientation(orientation), 1, lag);

    assert_eq!(table.premiums.len(), expected.len());
    for (premium, expected) in table.premiums.iter().zip(expected) {
        if expected.is_nan() {
            assert!(premium.premium.mean.is_nan(), "{}", premium.regressor);
        } else {
            assert_relative_eq!(premium.premium.mean, expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_premiums_require_membership() {
    let (data, _) = varied_market(20);
    let estimator = FamaMacBeth::new(PremiumConfig::default());
    assert!(estimator.estimate(&data, &RankerFactory::new()).is_err());
}

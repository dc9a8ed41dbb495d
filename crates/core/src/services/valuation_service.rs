use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::diagnostic::Diagnostic;
use crate::models::holdings::Holdings;
use crate::models::series::{PortfolioSeries, ValuePoint};
use crate::models::snapshot::PriceSnapshot;

/// Value of one snapshot, plus the held assets it had no price for.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotValuation {
    /// None when no held asset was priced in the snapshot
    pub total: Option<f64>,
    pub missing: Vec<String>,
}

/// Result of valuing a whole snapshot series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Valuation {
    pub series: PortfolioSeries,

    /// One `MissingAssetPrice` per (asset, snapshot) gap that survived forward-fill
    pub gaps: Vec<Diagnostic>,
}

/// Turns price snapshots + holdings into portfolio values.
///
/// Pure business logic, no I/O.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// `Σ quantity[a] * price[a]` over assets present in both.
    ///
    /// Held assets absent from the snapshot are skipped, not valued at zero.
    pub fn value_snapshot(&self, snapshot: &PriceSnapshot, holdings: &Holdings) -> SnapshotValuation {
        let mut total = 0.0;
        let mut priced = false;
        let mut missing = Vec::new();

        for (asset, quantity) in holdings.iter() {
            match snapshot.price(asset) {
                Some(price) if price.is_finite() => {
                    total += quantity * price;
                    priced = true;
                }
                _ => missing.push(asset.to_string()),
            }
        }

        SnapshotValuation {
            total: priced.then_some(total),
            missing,
        }
    }

    /// Fill missing prices of `assets` from the nearest preceding snapshot that
    /// has one. Never fills before an asset's first observation.
    ///
    /// Expects `snapshots` sorted ascending; returns a new series.
    pub fn forward_fill<'a, I>(&self, snapshots: &[PriceSnapshot], assets: I) -> Vec<PriceSnapshot>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut last_seen: BTreeMap<&str, Option<f64>> =
            assets.into_iter().map(|a| (a, None)).collect();
        let mut filled_count = 0usize;

        let filled = snapshots
            .iter()
            .map(|snapshot| {
                let mut snapshot = snapshot.clone();
                for (asset, last) in last_seen.iter_mut() {
                    match snapshot.price(asset) {
                        Some(price) => *last = Some(price),
                        None => {
                            if let Some(price) = *last {
                                snapshot.prices.insert((*asset).to_string(), price);
                                filled_count += 1;
                            }
                        }
                    }
                }
                snapshot
            })
            .collect();

        if filled_count > 0 {
            debug!(filled_count, "Forward-filled missing prices");
        }
        filled
    }

    /// Value every snapshot. Snapshots where no held asset is priced produce no point.
    pub fn value_series(
        &self,
        snapshots: &[PriceSnapshot],
        holdings: &Holdings,
        forward_fill: bool,
    ) -> Valuation {
        let sorted: Cow<'_, [PriceSnapshot]> =
            if snapshots.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
                Cow::Borrowed(snapshots)
            } else {
                let mut owned = snapshots.to_vec();
                owned.sort_by_key(|s| s.timestamp);
                Cow::Owned(owned)
            };

        let prepared: Cow<'_, [PriceSnapshot]> = if forward_fill {
            Cow::Owned(self.forward_fill(&sorted, holdings.assets()))
        } else {
            sorted
        };

        let mut points = Vec::with_capacity(prepared.len());
        let mut gaps = Vec::new();
        let mut gaps_per_asset: BTreeMap<String, usize> = BTreeMap::new();

        for snapshot in prepared.iter() {
            let valuation = self.value_snapshot(snapshot, holdings);
            for asset in valuation.missing {
                *gaps_per_asset.entry(asset.clone()).or_insert(0) += 1;
                gaps.push(Diagnostic::MissingAssetPrice {
                    asset,
                    timestamp: snapshot.timestamp,
                });
            }
            if let Some(value) = valuation.total {
                points.push(ValuePoint {
                    timestamp: snapshot.timestamp,
                    value,
                });
            }
        }

        for (asset, count) in &gaps_per_asset {
            warn!(asset = %asset, snapshots = count, "Held asset missing from snapshots; excluded from their valuation");
        }

        Valuation {
            series: PortfolioSeries::new(points),
            gaps,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

// Layout table: the 42 labelled simulation bounds imported from a 7×6 grid.
//
// Wire order (row-major, one row per line of the spreadsheet):
//   row 0  arterial hemoglobin        row 4  arterial partial pressure
//   row 1  venous hemoglobin          row 5  venous partial pressure
//   row 2  arterial saturation        row 6  flow rate
//   row 3  venous saturation
// Each row holds min, max for tier high, then medium, then low.
// Changing this order breaks every existing spreadsheet template.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};

use crate::constants::*;
use crate::error::{MonitorError, Result};
use crate::types::*;

/// Compound key of one layout cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    /// `None` for flow rate, which is not measured per vessel.
    pub vessel: Option<Vessel>,
    pub channel: Channel,
    pub tier: QualityTier,
    pub bound: BoundEnd,
}

impl LayoutKey {
    pub fn blood(vessel: Vessel, channel: Channel, tier: QualityTier, bound: BoundEnd) -> Self {
        Self {
            vessel: Some(vessel),
            channel,
            tier,
            bound,
        }
    }

    pub fn flow(tier: QualityTier, bound: BoundEnd) -> Self {
        Self {
            vessel: None,
            channel: Channel::FlowRate,
            tier,
            bound,
        }
    }

    /// Label text as it appears in the layout contract.
    pub fn label(&self) -> String {
        match self.vessel {
            Some(vessel) => format!(
                "{}_{}_{}_{}",
                vessel.as_str(),
                self.channel.as_str(),
                self.tier.as_str(),
                self.bound.as_str()
            ),
            None => format!(
                "{}_{}_{}",
                self.channel.as_str(),
                self.tier.as_str(),
                self.bound.as_str()
            ),
        }
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// All 42 keys in wire order.
pub fn layout_keys() -> Vec<LayoutKey> {
    let mut rows: Vec<(Option<Vessel>, Channel)> = Vec::with_capacity(LAYOUT_ROWS);
    for channel in Channel::BLOOD {
        for vessel in Vessel::ALL {
            rows.push((Some(vessel), channel));
        }
    }
    rows.push((None, Channel::FlowRate));

    let mut keys = Vec::with_capacity(LAYOUT_CELLS);
    for (vessel, channel) in rows {
        for tier in QualityTier::ALL {
            for bound in BoundEnd::ALL {
                keys.push(LayoutKey {
                    vessel,
                    channel,
                    tier,
                    bound,
                });
            }
        }
    }
    keys
}

/// All 42 labels in wire order.
pub fn layout_labels() -> Vec<String> {
    layout_keys().iter().map(LayoutKey::label).collect()
}

/// Label → value mapping built from one uploaded grid. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTable {
    values: BTreeMap<String, f64>,
}

impl LayoutTable {
    /// Build the table from a 7×6 grid.
    ///
    /// Any other shape (including ragged rows) fails with [`MonitorError::Shape`]
    /// and no table is produced.
    pub fn load(grid: &[Vec<f64>]) -> Result<Self> {
        check_shape(grid)?;

        let keys = layout_keys();
        let values: BTreeMap<String, f64> = keys
            .iter()
            .map(LayoutKey::label)
            .zip(grid.iter().flatten().copied())
            .collect();

        let table = Self { values };
        // every schema key must resolve now rather than at first lookup
        for key in &keys {
            table.value(*key)?;
        }

        info!("layout table loaded ({} labels)", table.values.len());
        Ok(table)
    }

    /// Table for the built-in demo grid.
    pub fn demo() -> Self {
        let values = layout_keys()
            .iter()
            .map(LayoutKey::label)
            .zip(DEMO_LAYOUT_GRID.iter().flatten().copied())
            .collect();
        Self { values }
    }

    /// Raw value by label text.
    pub fn get(&self, label: &str) -> Result<f64> {
        self.values
            .get(label)
            .copied()
            .ok_or_else(|| MonitorError::KeyNotFound(label.to_string()))
    }

    pub fn value(&self, key: LayoutKey) -> Result<f64> {
        self.get(&key.label())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn pair(&self, vessel: Option<Vessel>, channel: Channel, tier: QualityTier) -> Result<BoundPair> {
        let key = |bound| LayoutKey {
            vessel,
            channel,
            tier,
            bound,
        };
        Ok(BoundPair {
            low: self.value(key(BoundEnd::Min))?,
            high: self.value(key(BoundEnd::Max))?,
        })
    }

    fn reading_bounds(&self, vessel: Vessel, tier: QualityTier) -> Result<ReadingBounds> {
        Ok(ReadingBounds {
            hemoglobin: self.pair(Some(vessel), Channel::Hemoglobin, tier)?,
            saturation: self.pair(Some(vessel), Channel::Saturation, tier)?,
            partial_pressure: self.pair(Some(vessel), Channel::PartialPressure, tier)?,
        })
    }

    /// Bound pairs for every draw of one sampling event at `tier`.
    pub fn tier_bounds(&self, tier: QualityTier) -> Result<TierBounds> {
        Ok(TierBounds {
            arterial: self.reading_bounds(Vessel::Arterial, tier)?,
            venous: self.reading_bounds(Vessel::Venous, tier)?,
            flow: self.pair(None, Channel::FlowRate, tier)?,
        })
    }

    /// Values in wire order, reshaped to the 7×6 import grid.
    pub fn to_grid(&self) -> Result<Vec<Vec<f64>>> {
        let flat = layout_keys()
            .into_iter()
            .map(|key| self.value(key))
            .collect::<Result<Vec<f64>>>()?;
        Ok(flat.chunks(LAYOUT_COLS).map(<[f64]>::to_vec).collect())
    }

    /// `(label, value)` pairs in wire order.
    pub fn entries(&self) -> Result<Vec<(String, f64)>> {
        layout_keys()
            .into_iter()
            .map(|key| self.value(key).map(|v| (key.label(), v)))
            .collect()
    }
}

/// Reject anything but exactly 7 rows of 6 cells.
///
/// A grid with the wrong row count, or whose rows share a wrong width, reports
/// [`MonitorError::Shape`]. Seven rows of mixed widths report the first row that
/// is not 6 cells wide as [`MonitorError::RaggedShape`].
pub fn check_shape<T>(grid: &[Vec<T>]) -> Result<()> {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    let uniform = grid.iter().all(|row| row.len() == cols);
    if uniform && rows == LAYOUT_ROWS && cols == LAYOUT_COLS {
        return Ok(());
    }
    if uniform || rows != LAYOUT_ROWS {
        debug!("rejecting layout grid: {} rows, first row {} cells", rows, cols);
        return Err(MonitorError::Shape { rows, cols });
    }
    let (index, width) = grid
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, width)| width != LAYOUT_COLS)
        .unwrap_or((0, cols));
    debug!("rejecting layout grid: row {} has {} cells", index + 1, width);
    Err(MonitorError::RaggedShape {
        row: index + 1,
        cols: width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_grid(rows: usize, cols: usize) -> Vec<Vec<f64>> {
        vec![vec![0.0; cols]; rows]
    }

    fn counting_grid() -> Vec<Vec<f64>> {
        (0..LAYOUT_ROWS)
            .map(|r| (0..LAYOUT_COLS).map(|c| (r * LAYOUT_COLS + c) as f64).collect())
            .collect()
    }

    #[test]
    fn there_are_42_unique_labels() {
        let labels = layout_labels();
        assert_eq!(labels.len(), 42);
        let unique: std::collections::BTreeSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), 42);
    }

    #[test]
    fn label_order_matches_wire_contract() {
        let labels = layout_labels();
        assert_eq!(labels[0], "arterial_hemoglobin_high_min");
        assert_eq!(labels[1], "arterial_hemoglobin_high_max");
        assert_eq!(labels[2], "arterial_hemoglobin_medium_min");
        assert_eq!(labels[5], "arterial_hemoglobin_low_max");
        assert_eq!(labels[6], "venous_hemoglobin_high_min");
        assert_eq!(labels[12], "arterial_saturation_high_min");
        assert_eq!(labels[18], "venous_saturation_high_min");
        assert_eq!(labels[24], "arterial_partial_pressure_high_min");
        assert_eq!(labels[30], "venous_partial_pressure_high_min");
        assert_eq!(labels[36], "flow_rate_high_min");
        assert_eq!(labels[41], "flow_rate_low_max");
    }

    #[test]
    fn zero_grid_maps_every_label_to_zero() {
        let table = LayoutTable::load(&zero_grid(7, 6)).unwrap();
        assert_eq!(table.len(), 42);
        for label in layout_labels() {
            assert_eq!(table.get(&label).unwrap(), 0.0);
        }
    }

    #[test]
    fn wrong_shapes_fail() {
        for (rows, cols) in [(6, 6), (8, 6), (7, 5), (7, 7), (0, 0)] {
            match LayoutTable::load(&zero_grid(rows, cols)) {
                Err(MonitorError::Shape { rows: r, cols: c }) => {
                    assert_eq!((r, c), (rows, cols));
                }
                other => panic!("expected shape error for {}x{}, got {:?}", rows, cols, other),
            }
        }
    }

    #[test]
    fn ragged_grid_fails() {
        let mut grid = zero_grid(7, 6);
        grid[3].push(1.0);
        assert!(matches!(
            LayoutTable::load(&grid),
            Err(MonitorError::RaggedShape { row: 4, cols: 7 })
        ));
    }

    #[test]
    fn short_last_row_is_reported() {
        let mut grid = zero_grid(7, 6);
        grid[6].pop();
        let err = LayoutTable::load(&grid).unwrap_err();
        assert!(matches!(err, MonitorError::RaggedShape { row: 7, cols: 5 }));
        assert!(err.to_string().contains("row 7 has 5 columns"));
    }

    #[test]
    fn short_first_row_is_reported() {
        let mut grid = zero_grid(7, 6);
        grid[0].pop();
        assert!(matches!(
            check_shape(&grid),
            Err(MonitorError::RaggedShape { row: 1, cols: 5 })
        ));
    }

    #[test]
    fn values_follow_row_major_order() {
        let table = LayoutTable::load(&counting_grid()).unwrap();
        for (i, label) in layout_labels().iter().enumerate() {
            assert_eq!(table.get(label).unwrap(), i as f64);
        }
    }

    #[test]
    fn tier_bounds_pick_the_right_cells() {
        let table = LayoutTable::load(&counting_grid()).unwrap();
        let medium = table.tier_bounds(QualityTier::Medium).unwrap();
        assert_eq!(medium.arterial.hemoglobin, BoundPair { low: 2.0, high: 3.0 });
        assert_eq!(medium.venous.hemoglobin, BoundPair { low: 8.0, high: 9.0 });
        assert_eq!(medium.arterial.saturation, BoundPair { low: 14.0, high: 15.0 });
        assert_eq!(medium.venous.partial_pressure, BoundPair { low: 32.0, high: 33.0 });
        assert_eq!(medium.flow, BoundPair { low: 38.0, high: 39.0 });
    }

    #[test]
    fn typed_keys_resolve() {
        let table = LayoutTable::load(&counting_grid()).unwrap();
        let key = LayoutKey::blood(
            Vessel::Venous,
            Channel::Saturation,
            QualityTier::Low,
            BoundEnd::Max,
        );
        assert_eq!(key.label(), "venous_saturation_low_max");
        assert_eq!(table.value(key).unwrap(), 23.0);
        let flow = LayoutKey::flow(QualityTier::High, BoundEnd::Min);
        assert_eq!(table.value(flow).unwrap(), 36.0);
    }

    #[test]
    fn unknown_label_is_key_not_found() {
        let table = LayoutTable::demo();
        assert!(matches!(
            table.get("arterial_hemoglobin_best_min"),
            Err(MonitorError::KeyNotFound(_))
        ));
    }

    #[test]
    fn grid_round_trips_through_table() {
        let grid = counting_grid();
        let table = LayoutTable::load(&grid).unwrap();
        assert_eq!(table.to_grid().unwrap(), grid);
    }

    #[test]
    fn demo_table_is_complete() {
        let table = LayoutTable::demo();
        assert_eq!(table.len(), 42);
        let high = table.tier_bounds(QualityTier::High).unwrap();
        assert_eq!(high.flow, BoundPair { low: 380.0, high: 420.0 });
    }
}

//! Row grouping of detected regions.
//!
//! Regions arrive sorted by `(top, left)`. A region joins the current row
//! when its vertical center is within tolerance of the row's running mean;
//! the mean drifts toward its members as they join, which tolerates the
//! slight vertical creep of a skewed scan. Rows are emitted in the order
//! their bands were first opened, members sorted left-to-right.

use crate::processors::geometry::Region;

/// Groups regions into rows using a vertical-center tolerance.
pub fn group_into_rows(regions: &[Region], tolerance: f32) -> Vec<Vec<Region>> {
    let mut rows: Vec<RowBand> = Vec::new();

    for &region in regions {
        let center = region.center_y();
        match rows.last_mut() {
            Some(row) if (center - row.mean).abs() <= tolerance => row.push(region),
            _ => rows.push(RowBand::open(region)),
        }
    }

    rows.into_iter()
        .map(|row| {
            let mut members = row.members;
            members.sort_by_key(|r| r.x);
            members
        })
        .collect()
}

/// A row under construction: its members and the running mean of their
/// vertical centers.
struct RowBand {
    members: Vec<Region>,
    mean: f32,
    sum: f32,
}

impl RowBand {
    fn open(region: Region) -> Self {
        let center = region.center_y();
        Self {
            members: vec![region],
            mean: center,
            sum: center,
        }
    }

    fn push(&mut self, region: Region) {
        self.sum += region.center_y();
        self.members.push(region);
        self.mean = self.sum / self.members.len() as f32;
    }
}

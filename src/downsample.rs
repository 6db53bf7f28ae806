//! Downsampling of dense point series for rendering.
//!
//! Uses the LTTB (Largest Triangle Three Buckets) algorithm. The bucket size
//! follows the visible zoom window, so a fully zoomed-out plot keeps roughly
//! two points per pixel while a zoomed-in plot is passed through untouched.

use crate::series::{Point, TimeScale};

/// Bucket size for the current view: `trunc(domainSpan / rangeSpan / 2)`.
///
/// Zoomed in past one data point per pixel the formula yields zero or less,
/// which means no reduction (a bucket size of 1).
pub fn bucket_size_for_view(domain_span: f64, range_span: f64) -> usize {
    if range_span == 0.0 || !domain_span.is_finite() || !range_span.is_finite() {
        return 1;
    }

    let size = (domain_span / range_span / 2.0).trunc();
    if size <= 0.0 {
        1
    } else {
        size as usize
    }
}

/// Downsample data using the LTTB (Largest Triangle Three Buckets) algorithm.
///
/// `bucket_size` is the number of input points folded into one output point.
/// The first and last points are always kept unchanged. Pure function of its
/// inputs.
pub fn downsample_lttb(data: &[Point], bucket_size: usize) -> Vec<Point> {
    let n = data.len();
    if bucket_size <= 1 || n < 3 {
        return data.to_vec();
    }

    let target_points = (n / bucket_size).max(3);
    if target_points >= n {
        // No downsampling needed
        return data.to_vec();
    }

    let mut result = Vec::with_capacity(target_points);
    result.push(data[0]);

    // Width of each intermediate bucket, excluding the fixed endpoints
    let every = (n - 2) as f64 / (target_points - 2) as f64;

    let mut a_index = 0usize;

    for i in 0..(target_points - 2) {
        let bucket_start = (i as f64 * every).floor() as usize + 1;
        let bucket_end = (((i + 1) as f64 * every).floor() as usize + 1).min(n - 1);

        // Average point of the next bucket (the last point for the final bucket)
        let next_start = bucket_end;
        let next_end = (((i + 2) as f64 * every).floor() as usize + 1).min(n);
        let (avg_x, avg_y) = if next_start < next_end && i + 1 < target_points - 2 {
            let count = (next_end - next_start) as f64;
            let (sum_x, sum_y) = data[next_start..next_end]
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.index, sy + p.value));
            (sum_x / count, sum_y / count)
        } else {
            (data[n - 1].index, data[n - 1].value)
        };

        let a = data[a_index];
        let mut max_area = -1.0f64;
        let mut max_index = bucket_start;

        for (j, p) in data
            .iter()
            .enumerate()
            .take(bucket_end.max(bucket_start + 1))
            .skip(bucket_start)
        {
            let area = ((a.index - avg_x) * (p.value - a.value)
                - (a.index - p.index) * (avg_y - a.value))
                .abs();

            if area > max_area {
                max_area = area;
                max_index = j;
            }
        }

        result.push(data[max_index]);
        a_index = max_index;
    }

    result.push(data[n - 1]);

    result
}

/// Plot-side downsampling switch.
///
/// When disabled every call is an identity pass-through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Downsampler {
    pub enabled: bool,
}

impl Default for Downsampler {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Downsampler {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Reduce `data` for the given visible window
    pub fn apply(&self, data: &[Point], view: &TimeScale) -> Vec<Point> {
        if !self.enabled {
            return data.to_vec();
        }
        let bucket_size = bucket_size_for_view(view.domain_span(), view.range_span());
        downsample_lttb(data, bucket_size)
    }
}

//! Scales
//!
//! Mappings from data space to pixel space: a band scale for categories
//! and a linear scale for values, with d3-compatible "nice" rounding and
//! tick generation.

/// Headroom added above the largest observed value
pub const VALUE_HEADROOM: f64 = 1.1;

/// Maps discrete categories to evenly spaced bands
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl BandScale {
    /// Band scale with equal inner and outer padding (0 ≤ padding < 1)
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let padding = padding.clamp(0.0, 0.99);
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let extent = r1 - r0;

        // Never divide by less than one step, so 0 or 1 categories stay well-formed
        let step = extent / (n - padding + 2.0 * padding).max(1.0);
        let bandwidth = step * (1.0 - padding);
        let start = r0 + (extent - step * (n - padding)) / 2.0;

        Self {
            domain,
            range,
            padding,
            step,
            bandwidth,
            start,
        }
    }

    /// Left edge of the band for `value`
    pub fn position(&self, value: &str) -> Option<f64> {
        self.index_of(value).map(|i| self.start + self.step * i as f64)
    }

    /// Centre of the band for `value`
    pub fn center(&self, value: &str) -> Option<f64> {
        self.position(value).map(|x| x + self.bandwidth / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    fn index_of(&self, value: &str) -> Option<usize> {
        self.domain.iter().position(|d| d == value)
    }
}

/// Continuous linear mapping from a numeric domain to a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Value-axis scale for non-negative data: domain `[0, 1.1 × max]`,
    /// niced. Empty or all-zero data falls back to `[0, 1]`.
    pub fn for_values<I>(values: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let upper = padded_upper(values);
        Self::new((0.0, upper), range).nice(5)
    }

    /// Extend the domain to round tick boundaries (d3 `linear.nice`)
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        if stop < start {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut prev_step = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if prev_step == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prev_step = Some(step);
        }

        self.domain = if self.domain.1 < self.domain.0 {
            (stop, start)
        } else {
            (start, stop)
        };
        self
    }

    /// Map a domain value to the range
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` round tick values inside the domain (d3 `ticks`)
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut start, mut stop) = self.domain;
        if stop < start {
            std::mem::swap(&mut start, &mut stop);
        }
        if start == stop || count == 0 {
            return vec![start];
        }

        let step = tick_increment(start, stop, count);
        if step > 0.0 {
            let i0 = (start / step).ceil() as i64;
            let i1 = (stop / step).floor() as i64;
            (i0..=i1).map(|i| i as f64 * step).collect()
        } else if step < 0.0 {
            let inv = -step;
            let i0 = (start * inv).ceil() as i64;
            let i1 = (stop * inv).floor() as i64;
            (i0..=i1).map(|i| i as f64 / inv).collect()
        } else {
            Vec::new()
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

/// `1.1 × max`, or 1.0 when there is no positive value to scale against
pub fn padded_upper<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    match max {
        Some(m) if m > 0.0 => m * VALUE_HEADROOM,
        _ => 1.0,
    }
}

/// d3 `tickIncrement`: positive for steps ≥ 1, negative inverse below 1
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(1) as f64;
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }

    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_band_positions() {
        let scale = BandScale::new(categories(&["a", "b", "c", "d"]), (0.0, 400.0), 0.0);
        assert_eq!(scale.bandwidth(), 100.0);
        assert_eq!(scale.position("a"), Some(0.0));
        assert_eq!(scale.position("d"), Some(300.0));
        assert_eq!(scale.center("b"), Some(150.0));
        assert_eq!(scale.position("zzz"), None);
    }

    #[test]
    fn test_band_padding_keeps_bands_inside_range() {
        let scale = BandScale::new(categories(&["A", "B", "C"]), (0.0, 400.0), 0.3);
        let first = scale.position("A").unwrap();
        let last = scale.position("C").unwrap() + scale.bandwidth();
        assert!(first > 0.0);
        assert!(last < 400.0);
        assert!(((first - 0.0) - (400.0 - last)).abs() < 1e-9);
    }

    #[test]
    fn test_band_single_category() {
        let scale = BandScale::new(categories(&["only"]), (0.0, 460.0), 0.3);
        assert!(scale.bandwidth() > 0.0);
        assert!((scale.center("only").unwrap() - 230.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_empty_domain() {
        let scale = BandScale::new(Vec::new(), (0.0, 460.0), 0.2);
        assert!(scale.bandwidth().is_finite());
        assert_eq!(scale.position("x"), None);
    }

    #[test]
    fn test_value_domain_headroom() {
        let raw_upper = padded_upper(vec![5.3, 55.8, 42.1]);
        assert!(raw_upper >= 1.1 * 55.8 - 1e-9);

        let scale = LinearScale::for_values(vec![5.3, 55.8, 42.1], (240.0, 0.0));
        assert!(scale.domain().1 >= raw_upper);
        assert_eq!(scale.domain(), (0.0, 70.0));
    }

    #[test]
    fn test_value_domain_counts() {
        // 8650 * 1.1 = 9515 -> nice(5) -> 10000
        let scale = LinearScale::for_values(vec![2450.0, 8650.0], (240.0, 0.0));
        assert_eq!(scale.domain(), (0.0, 10000.0));
        assert_eq!(
            scale.ticks(5),
            vec![0.0, 2000.0, 4000.0, 6000.0, 8000.0, 10000.0]
        );
    }

    #[test]
    fn test_empty_values_fall_back() {
        let scale = LinearScale::for_values(Vec::new(), (240.0, 0.0));
        assert_eq!(scale.domain(), (0.0, 1.0));
        assert_eq!(scale.ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn test_scale_inverts_range() {
        let scale = LinearScale::new((0.0, 100.0), (240.0, 0.0));
        assert_eq!(scale.scale(0.0), 240.0);
        assert_eq!(scale.scale(100.0), 0.0);
        assert_eq!(scale.scale(50.0), 120.0);
    }

    #[test]
    fn test_tick_increment() {
        assert_eq!(tick_increment(0.0, 10.0, 5), 2.0);
        assert_eq!(tick_increment(0.0, 100.0, 10), 10.0);
        assert_eq!(tick_increment(0.0, 1.0, 5), -5.0);
        assert_eq!(tick_increment(0.0, 0.0, 5), 0.0);
    }
}

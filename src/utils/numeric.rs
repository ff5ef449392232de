// src/utils/numeric.rs

/// Elementwise arithmetic mean of equally long series.
///
/// Callers guarantee `rows` is non-empty and every row has `nt` entries.
pub fn mean_series<'a, I>(rows: I, nt: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sum = vec![0.0f64; nt];
    let mut count = 0usize;
    for row in rows {
        for (acc, v) in sum.iter_mut().zip(row) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        let n = count as f64;
        sum.iter_mut().for_each(|v| *v /= n);
    }
    sum
}

/// True when both series hold exactly the same bit patterns.
pub fn bit_identical(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Formats like C's `%.15e`: 16 significant digits, signed two-digit exponent.
pub fn format_sci(value: f64) -> String {
    let s = format!("{:.15e}", value);
    match s.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        // inf / NaN carry no exponent
        None => s,
    }
}

/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Arithmetic on probabilities stored as natural logarithms.
//!
//! PageRank mass is multiplied by factors smaller than one at every round, so
//! after many rounds the mass of peripheral nodes underflows any
//! floating-point format. Storing ln *p* instead of *p* turns products into
//! sums; sums of probabilities become the _log-sum-exp_ operation
//!
//! > ln(*eᵃ* + *eᵇ*) = max(*a*, *b*) + ln(1 + *e*^(min(*a*, *b*) − max(*a*, *b*)))
//!
//! which never overflows, as the exponent is never positive.
//!
//! Negative infinity (the logarithm of zero) is the identity element. The
//! operation is commutative and, up to rounding, associative, which is what
//! makes it safe to fold mass fragments in any order and any grouping.
//!
//! Masses are stored as [`f32`], as required by the checkpoint format, but
//! every operation is evaluated in [`f64`] and rounded once.

/// The logarithm of zero, that is, no mass at all.
pub const LOG_ZERO: f32 = f32::NEG_INFINITY;

/// Returns ln(*eᵃ* + *eᵇ*).
///
/// # Examples
///
/// ```
/// use pprank::log_prob::{LOG_ZERO, sum_log_probs};
///
/// let half = 0.5f32.ln();
/// assert!((sum_log_probs(half, half)).abs() < 1E-6);
/// assert_eq!(sum_log_probs(half, LOG_ZERO), half);
/// ```
#[inline]
pub fn sum_log_probs(a: f32, b: f32) -> f32 {
    if a == LOG_ZERO {
        return b;
    }
    if b == LOG_ZERO {
        return a;
    }
    let (max, min) = if a < b { (b, a) } else { (a, b) };
    let (max, min) = (max as f64, min as f64);
    (max + (min - max).exp().ln_1p()) as f32
}

/// Folds an iterator of log-domain masses with [`sum_log_probs`].
///
/// An empty iterator yields [`LOG_ZERO`].
pub fn sum_all_log_probs(masses: impl IntoIterator<Item = f32>) -> f32 {
    masses.into_iter().fold(LOG_ZERO, sum_log_probs)
}

/// Returns ln *x* rounded to an [`f32`].
#[inline]
pub fn ln(x: f64) -> f32 {
    x.ln() as f32
}

/// Returns *eˣ* for a log-domain mass.
#[inline]
pub fn exp(x: f32) -> f64 {
    (x as f64).exp()
}

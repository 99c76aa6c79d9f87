use core::{fmt, ops};

/// A TCP sequence number.
///
/// A sequence number is a monotonically advancing integer modulo
/// 2<sup>32</sup>. The stream position it stands for is recovered with
/// [`unwrap`], which lifts the 32-bit value to the 64-bit position closest to
/// a caller-provided checkpoint.
///
/// [`unwrap`]: #method.unwrap
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct SeqNumber(pub u32);

impl SeqNumber {
    /// Wrap an absolute stream position into sequence space relative to the
    /// zero point.
    pub fn wrap(position: u64, zero_point: SeqNumber) -> SeqNumber {
        SeqNumber(zero_point.0.wrapping_add(position as u32))
    }

    /// Lift this sequence number to the unique absolute position closest to
    /// `checkpoint`.
    ///
    /// Exactly one position in each 2<sup>32</sup>-aligned window wraps to
    /// this value; of the window containing the checkpoint and its two
    /// neighbors, the closest candidate wins. On equal distance the larger
    /// position is preferred. The operation inverts [`wrap`]:
    /// `wrap(a.unwrap(zp, k), zp) == a` for every checkpoint `k`.
    ///
    /// [`wrap`]: #method.wrap
    pub fn unwrap(self, zero_point: SeqNumber, checkpoint: u64) -> u64 {
        let offset = u64::from(self.0.wrapping_sub(zero_point.0));
        let candidate = (checkpoint & !0xffff_ffff) | offset;

        let distance = |position: u64| position.abs_diff(checkpoint);

        let mut best = candidate;
        if let Some(lower) = candidate.checked_sub(1 << 32) {
            if distance(lower) < distance(best) {
                best = lower;
            }
        }
        if let Some(upper) = candidate.checked_add(1 << 32) {
            if distance(upper) <= distance(best) {
                best = upper;
            }
        }
        best
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ops::Add<u64> for SeqNumber {
    type Output = SeqNumber;

    fn add(self, rhs: u64) -> SeqNumber {
        SeqNumber::wrap(rhs, self)
    }
}

impl ops::AddAssign<u64> for SeqNumber {
    fn add_assign(&mut self, rhs: u64) {
        *self = *self + rhs;
    }
}

//! Indicator (LED) trait

/// Something that can be lit, like an LED
///
/// Implementations hide the electrical polarity: `set_lit(true)` lights an
/// active-low LED by driving its pin low.
pub trait Indicator {
    /// Light or extinguish the indicator
    fn set_lit(&mut self, lit: bool);

    /// Check if the indicator is currently lit
    fn is_lit(&self) -> bool;

    /// Invert the current state
    fn invert(&mut self) {
        let lit = self.is_lit();
        self.set_lit(!lit);
    }
}

use serde::Serialize;

/// A count split into the three decimal places the HUD can show.
///
/// The ones digit is always shown; tens and hundreds only once the count
/// needs them. Counts of 1000 or more wrap (only `count % 1000` is shown).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterDigits {
    pub ones: u8,
    pub tens_visible: bool,
    pub tens: u8,
    pub hundreds_visible: bool,
    pub hundreds: u8,
}

pub fn digits(count: i64) -> CounterDigits {
    let count = count.max(0);
    CounterDigits {
        ones: (count % 10) as u8,
        tens_visible: count > 9,
        tens: ((count % 100) / 10) as u8,
        hundreds_visible: count > 99,
        hundreds: ((count % 1000) / 100) as u8,
    }
}

impl CounterDigits {
    pub fn value(&self) -> u32 {
        u32::from(self.ones) + 10 * u32::from(self.tens) + 100 * u32::from(self.hundreds)
    }

    /// Maps each visible digit through a glyph table, most significant first.
    pub fn render_with(&self, glyphs: &[char; 10]) -> String {
        let mut out = String::with_capacity(3);
        if self.hundreds_visible {
            out.push(glyphs[usize::from(self.hundreds)]);
        }
        if self.tens_visible {
            out.push(glyphs[usize::from(self.tens)]);
        }
        out.push(glyphs[usize::from(self.ones)]);
        out
    }
}

pub const ASCII_DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_digit_hides_upper_places() {
        let d = digits(7);
        assert_eq!(d.ones, 7);
        assert!(!d.tens_visible);
        assert!(!d.hundreds_visible);
        assert_eq!(d.render_with(&ASCII_DIGITS), "7");
    }

    #[test]
    fn boundaries_toggle_visibility() {
        assert!(!digits(9).tens_visible);
        assert!(digits(10).tens_visible);
        assert!(!digits(99).hundreds_visible);
        assert!(digits(100).hundreds_visible);
    }

    #[test]
    fn zero_in_middle_place_still_renders() {
        let d = digits(305);
        assert_eq!((d.hundreds, d.tens, d.ones), (3, 0, 5));
        assert_eq!(d.render_with(&ASCII_DIGITS), "305");
    }

    #[test]
    fn large_counts_wrap_to_three_places() {
        let d = digits(12_345);
        assert_eq!(d.value(), 345);
        assert!(d.hundreds_visible);
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(digits(-4), digits(0));
        assert_eq!(digits(-4).render_with(&ASCII_DIGITS), "0");
    }
}

//! Indicator and scroll-hint glyphs, plain ASCII or Unicode.

use crate::visualization::Indicator;

#[derive(Clone, Copy, Debug)]
pub struct Glyphs {
    pub match_mark: char,
    pub mismatch_mark: char,
    pub gap_mark: char,
    pub arrow_left: &'static str,
    pub arrow_right: &'static str,
}

impl Glyphs {
    pub fn indicator(&self, indicator: Indicator) -> char {
        match indicator {
            Indicator::Match => self.match_mark,
            Indicator::Mismatch => self.mismatch_mark,
            Indicator::Gap => self.gap_mark,
        }
    }
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        match_mark: '|',
        mismatch_mark: 'x',
        gap_mark: '-',
        arrow_left: "<",
        arrow_right: ">",
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        match_mark: '|',
        mismatch_mark: '×',
        gap_mark: '-',
        arrow_left: "←",
        arrow_right: "→",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_glyphs() {
        let ascii = select(false);
        assert_eq!(ascii.indicator(Indicator::Match), '|');
        assert_eq!(ascii.indicator(Indicator::Mismatch), 'x');
        assert_eq!(ascii.indicator(Indicator::Gap), '-');
        assert_eq!(select(true).indicator(Indicator::Mismatch), '×');
    }
}

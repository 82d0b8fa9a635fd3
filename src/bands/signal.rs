// =============================================================================
// Band signal classification
// =============================================================================
//
// Position of the latest close relative to a horizon's bands:
//
//   close >= upper          =>  BULLISH BREAKOUT
//   ma < close < upper      =>  BULLISH
//   lower < close <= ma     =>  BEARISH
//   close <= lower          =>  BEARISH BREAKDOWN
//
// Missing (or non-finite) levels classify as NO DATA.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSignal {
    NoData,
    BullishBreakout,
    Bullish,
    Bearish,
    BearishBreakdown,
}

impl BandSignal {
    pub fn is_bullish(self) -> bool {
        matches!(self, Self::Bullish | Self::BullishBreakout)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Self::Bearish | Self::BearishBreakdown)
    }
}

impl std::fmt::Display for BandSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "NO DATA"),
            Self::BullishBreakout => write!(f, "BULLISH BREAKOUT"),
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
            Self::BearishBreakdown => write!(f, "BEARISH BREAKDOWN"),
        }
    }
}

/// Classify `close` against the bands of one horizon.
pub fn classify_signal(
    close: f64,
    upper: Option<f64>,
    lower: Option<f64>,
    ma: Option<f64>,
) -> BandSignal {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    let (Some(upper), Some(lower), Some(ma)) = (finite(upper), finite(lower), finite(ma)) else {
        return BandSignal::NoData;
    };
    if !close.is_finite() {
        return BandSignal::NoData;
    }

    if close >= upper {
        BandSignal::BullishBreakout
    } else if close > ma {
        BandSignal::Bullish
    } else if close > lower {
        BandSignal::Bearish
    } else {
        BandSignal::BearishBreakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(close: f64) -> BandSignal {
        classify_signal(close, Some(110.0), Some(90.0), Some(100.0))
    }

    #[test]
    fn reference_cases() {
        assert_eq!(classify(105.0), BandSignal::Bullish);
        assert_eq!(classify(111.0), BandSignal::BullishBreakout);
        assert_eq!(classify(89.0), BandSignal::BearishBreakdown);
        assert_eq!(classify(95.0), BandSignal::Bearish);
    }

    #[test]
    fn boundaries() {
        assert_eq!(classify(110.0), BandSignal::BullishBreakout);
        assert_eq!(classify(100.0), BandSignal::Bearish);
        assert_eq!(classify(90.0), BandSignal::BearishBreakdown);
    }

    #[test]
    fn missing_levels_are_no_data() {
        assert_eq!(classify_signal(100.0, None, Some(90.0), Some(100.0)), BandSignal::NoData);
        assert_eq!(classify_signal(100.0, Some(110.0), None, Some(100.0)), BandSignal::NoData);
        assert_eq!(
            classify_signal(100.0, Some(f64::NAN), Some(90.0), Some(100.0)),
            BandSignal::NoData
        );
        assert_eq!(
            classify_signal(f64::NAN, Some(110.0), Some(90.0), Some(100.0)),
            BandSignal::NoData
        );
    }

    #[test]
    fn display_and_direction() {
        assert_eq!(BandSignal::BullishBreakout.to_string(), "BULLISH BREAKOUT");
        assert_eq!(BandSignal::NoData.to_string(), "NO DATA");
        assert!(BandSignal::Bullish.is_bullish());
        assert!(BandSignal::BearishBreakdown.is_bearish());
        assert!(!BandSignal::NoData.is_bullish() && !BandSignal::NoData.is_bearish());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&BandSignal::BearishBreakdown).unwrap();
        assert_eq!(json, "\"bearish_breakdown\"");
    }
}

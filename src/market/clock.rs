use crate::market::types::MarketStatus;

/// Advances every market's running countdown by `offset_ms` in place.
///
/// Open markets count down `time_to_close`, closed markets count down
/// `time_to_open`; the other field is left untouched. A negative offset rewinds.
/// Values may go below zero here; [`format_countdown`] floors them for display.
pub fn offset_market_time(markets: &mut [MarketStatus], offset_ms: i64) -> &mut [MarketStatus] {
    for market in markets.iter_mut() {
        if market.is_market_open {
            market.time_to_close = market.time_to_close.saturating_sub(offset_ms);
        } else {
            market.time_to_open = market.time_to_open.saturating_sub(offset_ms);
        }
    }
    markets
}

/// Renders milliseconds as `HH:MM:SS`, truncating partial seconds.
pub fn format_countdown(remaining_ms: i64) -> String {
    let total_seconds = remaining_ms.max(0) / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_markets() -> Vec<MarketStatus> {
        vec![
            MarketStatus::new("NASDAQ", true, 100, 100),
            MarketStatus::new("Munich", false, 100, 100),
        ]
    }

    #[test]
    fn offsets_only_the_running_countdown() {
        let mut markets = sample_markets();
        offset_market_time(&mut markets, 1);

        assert_eq!(markets[0].time_to_close, 99);
        assert_eq!(markets[0].time_to_open, 100);
        assert_eq!(markets[1].time_to_close, 100);
        assert_eq!(markets[1].time_to_open, 99);

        offset_market_time(&mut markets, -2);

        assert_eq!(markets[0].time_to_close, 101);
        assert_eq!(markets[0].time_to_open, 100);
        assert_eq!(markets[1].time_to_close, 100);
        assert_eq!(markets[1].time_to_open, 101);
    }

    #[test]
    fn does_not_clamp_at_zero() {
        let mut markets = vec![MarketStatus::new("NASDAQ", true, 500, 0)];
        offset_market_time(&mut markets, 1_000);
        assert_eq!(markets[0].time_to_close, -500);
    }

    #[test]
    fn returns_the_same_slice_for_chaining() {
        let mut markets = sample_markets();
        let remaining: Vec<i64> = offset_market_time(&mut markets, 10)
            .iter()
            .map(MarketStatus::remaining_ms)
            .collect();
        assert_eq!(remaining, vec![90, 90]);
    }

    #[test]
    fn formats_countdowns() {
        assert_eq!(format_countdown(224_000), "00:03:44");
        assert_eq!(format_countdown(1_450_000), "00:24:10");
        assert_eq!(format_countdown(1_000), "00:00:01");
        assert_eq!(format_countdown(999), "00:00:00");
        assert_eq!(format_countdown(-3_000), "00:00:00");
        assert_eq!(format_countdown(90_061_000), "25:01:01");
    }

    proptest! {
        #[test]
        fn offset_then_inverse_restores_values(
            raw in prop::collection::vec(
                (any::<bool>(), -1_000_000_000_i64..1_000_000_000, -1_000_000_000_i64..1_000_000_000),
                0..16,
            ),
            offset in -1_000_000_000_i64..1_000_000_000,
        ) {
            let original: Vec<MarketStatus> = raw
                .into_iter()
                .map(|(open, close, to_open)| MarketStatus::new("X", open, close, to_open))
                .collect();
            let mut markets = original.clone();

            offset_market_time(&mut markets, offset);
            offset_market_time(&mut markets, -offset);

            prop_assert_eq!(markets, original);
        }
    }
}

use super::domain::{BillCategory, RateSettings, Taka, RANK_LABOUR};

const TIFFIN_RATE: Taka = 50;
const DAILY_LABOUR_RATE: Taka = 600;
const HOLIDAY_LABOUR_RATE: Taka = 600;
const HOLIDAY_STAFF_RATE: Taka = 800;
const NIGHT_LABOUR_RATE: Taka = 150;

/// Amount payable for one entry of `rank` under the given settings.
pub fn rate(settings: &RateSettings, rank: &str) -> Taka {
    let labour = rank == RANK_LABOUR;
    match settings.category {
        BillCategory::Tiffin => TIFFIN_RATE,
        BillCategory::DailyLabour => DAILY_LABOUR_RATE,
        BillCategory::Holiday if labour => HOLIDAY_LABOUR_RATE,
        BillCategory::Holiday => HOLIDAY_STAFF_RATE,
        BillCategory::NightEntertainment if labour => NIGHT_LABOUR_RATE,
        BillCategory::NightEntertainment => settings.night_rate.amount(),
    }
}

/// Label-driven lookup used at the edges; unrecognized categories pay nothing.
pub fn rate_for_label(category: &str, rank: &str, settings: &RateSettings) -> Taka {
    match BillCategory::from_label(category) {
        Some(category) => rate(
            &RateSettings {
                category,
                night_rate: settings.night_rate,
            },
            rank,
        ),
        None => 0,
    }
}
